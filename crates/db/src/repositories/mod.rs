use async_trait::async_trait;
use thiserror::Error;

use clientele_core::domain::customer::{Customer, CustomerDraft, CustomerId};
use clientele_core::errors::DomainError;

pub mod customer;

pub use customer::SqlCustomerRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("no customer with id `{0}`")]
    NotFound(CustomerId),
    #[error("member number {0} is already assigned to another customer")]
    MemberNumberTaken(i64),
    #[error(transparent)]
    InvalidRecord(#[from] DomainError),
}

/// Listing order over the member-number column. Callers that render the
/// roster always ask for descending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MemberNumberOrder {
    #[default]
    Descending,
    Ascending,
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn list_all(&self, order: MemberNumberOrder) -> Result<Vec<Customer>, RepositoryError>;

    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError>;

    /// Assigns a fresh id and persists the draft. Fails with
    /// `MemberNumberTaken` when the member number is already in use and with
    /// `InvalidRecord` when a required field is blank.
    async fn create(&self, draft: CustomerDraft) -> Result<Customer, RepositoryError>;

    /// Replaces all business fields of the record at `id`. There is no
    /// partial-field update path.
    async fn update_by_id(
        &self,
        id: &CustomerId,
        draft: CustomerDraft,
    ) -> Result<Customer, RepositoryError>;

    /// Removes the record permanently. Deleting an id that does not exist
    /// (including one already deleted) reports `NotFound`, never success.
    async fn delete_by_id(&self, id: &CustomerId) -> Result<(), RepositoryError>;
}
