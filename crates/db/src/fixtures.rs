use sqlx::Executor;
use sqlx::Row;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Canonical demo roster loaded by `clientele seed` and exercised by
/// end-to-end checks.
const SEED_CUSTOMERS: &[SeedCustomerContract] = &[
    SeedCustomerContract {
        id: "7b1c6f2a-8e0d-4a53-9c1f-2d5aa1c90b11",
        name: "Ada Lovelace",
        member_number: 9,
    },
    SeedCustomerContract {
        id: "3f9e1d74-52c6-4b8a-b7d0-64f0c2a81e22",
        name: "Margaret Hamilton",
        member_number: 7,
    },
    SeedCustomerContract {
        id: "9d4b7e30-1a6f-4c2d-8e5b-07c3f6a2d933",
        name: "Grace Hopper",
        member_number: 5,
    },
    SeedCustomerContract {
        id: "5a2d9c18-6b3e-47f1-a0c4-91e8d5b3f744",
        name: "Alan Turing",
        member_number: 2,
    },
];

#[derive(Clone, Copy, Debug)]
struct SeedCustomerContract {
    id: &'static str,
    name: &'static str,
    member_number: i64,
}

#[derive(Clone, Debug)]
pub struct SeedCustomerInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub member_number: i64,
}

#[derive(Clone, Debug)]
pub struct SeedResult {
    pub customers_seeded: Vec<SeedCustomerInfo>,
}

#[derive(Clone, Debug)]
pub struct SeedVerification {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

/// Demo customer dataset with a fixed id/member-number contract.
pub struct DemoCustomerDataset;

impl DemoCustomerDataset {
    /// SQL fixture content for the demo roster.
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_customers.sql");

    /// Load the demo roster into the database. Reloading is idempotent.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let customers_seeded = SEED_CUSTOMERS
            .iter()
            .map(|customer| SeedCustomerInfo {
                id: customer.id,
                name: customer.name,
                member_number: customer.member_number,
            })
            .collect::<Vec<_>>();

        Ok(SeedResult { customers_seeded })
    }

    /// Verify that the seeded rows exist and match the contract.
    pub async fn verify(pool: &DbPool) -> Result<SeedVerification, RepositoryError> {
        let mut checks = Vec::new();

        for contract in SEED_CUSTOMERS {
            let row = sqlx::query(
                "SELECT name, member_number FROM customer WHERE id = ?",
            )
            .bind(contract.id)
            .fetch_optional(pool)
            .await?;

            let matches_contract = row
                .map(|row| {
                    row.try_get::<String, _>("name").ok().as_deref() == Some(contract.name)
                        && row.try_get::<i64, _>("member_number").ok()
                            == Some(contract.member_number)
                })
                .unwrap_or(false);
            checks.push((contract.name, matches_contract));
        }

        let seeded_total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM customer WHERE id IN (?, ?, ?, ?)",
        )
        .bind(SEED_CUSTOMERS[0].id)
        .bind(SEED_CUSTOMERS[1].id)
        .bind(SEED_CUSTOMERS[2].id)
        .bind(SEED_CUSTOMERS[3].id)
        .fetch_one(pool)
        .await?;
        checks.push(("seeded_row_count", seeded_total == SEED_CUSTOMERS.len() as i64));

        let all_present = checks.iter().all(|(_, passed)| *passed);
        Ok(SeedVerification { all_present, checks })
    }
}

#[cfg(test)]
mod tests {
    use super::DemoCustomerDataset;
    use crate::connect_with_settings;
    use crate::migrations;
    use crate::repositories::{CustomerRepository, MemberNumberOrder, SqlCustomerRepository};

    #[tokio::test]
    async fn load_then_verify_satisfies_the_contract() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("run migrations");

        let seeded = DemoCustomerDataset::load(&pool).await.expect("load fixtures");
        assert_eq!(seeded.customers_seeded.len(), 4);

        let verification = DemoCustomerDataset::verify(&pool).await.expect("verify fixtures");
        assert!(verification.all_present, "failed checks: {:?}", verification.checks);
    }

    #[tokio::test]
    async fn reloading_is_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("run migrations");

        DemoCustomerDataset::load(&pool).await.expect("first load");
        DemoCustomerDataset::load(&pool).await.expect("second load");

        let repository = SqlCustomerRepository::new(pool);
        let all = repository.list_all(MemberNumberOrder::Descending).await.expect("list");
        assert_eq!(all.len(), 4);

        let numbers: Vec<i64> = all.iter().map(|c| c.member_number).collect();
        assert_eq!(numbers, vec![9, 7, 5, 2]);
    }
}
