use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use clientele_core::domain::customer::{Customer, CustomerDraft, CustomerId};

use super::{CustomerRepository, MemberNumberOrder, RepositoryError};
use crate::DbPool;

pub struct SqlCustomerRepository {
    pool: DbPool,
}

impl SqlCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode_customer(row: &SqliteRow) -> Result<Customer, RepositoryError> {
    let raw_id: String = row.try_get("id")?;
    let id = CustomerId::parse(&raw_id).ok_or_else(|| {
        RepositoryError::Decode(format!("stored customer id `{raw_id}` is not a valid uuid"))
    })?;

    Ok(Customer {
        id,
        name: row.try_get("name")?,
        date_of_birth: row.try_get("date_of_birth")?,
        member_number: row.try_get("member_number")?,
        interests: row.try_get("interests")?,
    })
}

/// The member-number uniqueness check and the write are a single statement
/// against the unique index, so interleaved writers cannot both commit.
fn write_error(error: sqlx::Error, member_number: i64) -> RepositoryError {
    let unique_violation = matches!(
        &error,
        sqlx::Error::Database(db_error) if db_error.is_unique_violation()
    );
    if unique_violation {
        RepositoryError::MemberNumberTaken(member_number)
    } else {
        RepositoryError::Database(error)
    }
}

#[async_trait::async_trait]
impl CustomerRepository for SqlCustomerRepository {
    async fn list_all(&self, order: MemberNumberOrder) -> Result<Vec<Customer>, RepositoryError> {
        let sql = match order {
            MemberNumberOrder::Descending => {
                "SELECT id, name, date_of_birth, member_number, interests \
                 FROM customer ORDER BY member_number DESC"
            }
            MemberNumberOrder::Ascending => {
                "SELECT id, name, date_of_birth, member_number, interests \
                 FROM customer ORDER BY member_number ASC"
            }
        };

        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter().map(decode_customer).collect()
    }

    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, date_of_birth, member_number, interests \
             FROM customer WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(decode_customer).transpose()
    }

    async fn create(&self, draft: CustomerDraft) -> Result<Customer, RepositoryError> {
        draft.validate()?;

        let id = CustomerId::generate();
        let member_number = draft.member_number;

        sqlx::query(
            "INSERT INTO customer (id, name, date_of_birth, member_number, interests) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(&draft.name)
        .bind(draft.date_of_birth)
        .bind(draft.member_number)
        .bind(&draft.interests)
        .execute(&self.pool)
        .await
        .map_err(|error| write_error(error, member_number))?;

        Ok(Customer::from_draft(id, draft))
    }

    async fn update_by_id(
        &self,
        id: &CustomerId,
        draft: CustomerDraft,
    ) -> Result<Customer, RepositoryError> {
        draft.validate()?;

        let member_number = draft.member_number;

        let result = sqlx::query(
            "UPDATE customer \
             SET name = ?, date_of_birth = ?, member_number = ?, interests = ? \
             WHERE id = ?",
        )
        .bind(&draft.name)
        .bind(draft.date_of_birth)
        .bind(draft.member_number)
        .bind(&draft.interests)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|error| write_error(error, member_number))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(*id));
        }

        Ok(Customer::from_draft(*id, draft))
    }

    async fn delete_by_id(&self, id: &CustomerId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM customer WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(*id));
        }

        Ok(())
    }
}
