use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// Opaque customer identifier. Assigned once by the store at creation and
/// never reassigned afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub Uuid);

impl CustomerId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier supplied by a caller. Returns `None` for anything
    /// that cannot name a stored record.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub member_number: i64,
    pub interests: String,
}

impl Customer {
    pub fn from_draft(id: CustomerId, draft: CustomerDraft) -> Self {
        Self {
            id,
            name: draft.name,
            date_of_birth: draft.date_of_birth,
            member_number: draft.member_number,
            interests: draft.interests,
        }
    }
}

/// The business fields of a candidate record, before the store has assigned
/// an id. Used for both creation and full-record replacement; there is no
/// partial-field update shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDraft {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub member_number: i64,
    pub interests: String,
}

impl CustomerDraft {
    /// Every stored record carries all four business fields; a draft with a
    /// blank text field must never reach the store.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::BlankField("name"));
        }
        if self.interests.trim().is_empty() {
            return Err(DomainError::BlankField("interests"));
        }
        Ok(())
    }
}
