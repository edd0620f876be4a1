use std::collections::HashSet;

use clientele_db::{connect_with_settings, migrations, DemoCustomerDataset};
use clientele_db::repositories::{CustomerRepository, MemberNumberOrder, SqlCustomerRepository};

type SeedContractTestResult<T = ()> = Result<T, String>;

macro_rules! require {
    ($cond:expr) => {
        if !$cond {
            return Err(format!("assertion failed: `{}`", stringify!($cond)));
        }
    };
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($($arg)*));
        }
    };
}

const SEED_IDS: &[&str] = &[
    "7b1c6f2a-8e0d-4a53-9c1f-2d5aa1c90b11",
    "3f9e1d74-52c6-4b8a-b7d0-64f0c2a81e22",
    "9d4b7e30-1a6f-4c2d-8e5b-07c3f6a2d933",
    "5a2d9c18-6b3e-47f1-a0c4-91e8d5b3f744",
];

const SEED_MEMBER_NUMBERS: &[i64] = &[9, 7, 5, 2];

#[test]
fn seed_sql_fixture_matches_the_roster_contract() -> SeedContractTestResult {
    let fixture_sql = DemoCustomerDataset::SQL;

    for id in SEED_IDS {
        require!(
            fixture_sql.contains(&format!("'{id}'")),
            "seed SQL fixture should include customer id {id}"
        );
    }

    for member_number in SEED_MEMBER_NUMBERS {
        require!(
            fixture_sql.contains(&format!(", {member_number}, ")),
            "seed SQL fixture should include member number {member_number}"
        );
    }

    let mut member_numbers_seen = HashSet::new();
    for member_number in SEED_MEMBER_NUMBERS {
        require!(
            member_numbers_seen.insert(member_number),
            "duplicate member number in roster contract: {member_number}"
        );
    }

    require!(
        fixture_sql.matches("INSERT OR REPLACE INTO customer").count() == SEED_IDS.len(),
        "seed SQL fixture should insert exactly one row per roster entry"
    );
    Ok(())
}

#[tokio::test]
async fn seeded_roster_lists_in_api_order() {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("run migrations");
    DemoCustomerDataset::load(&pool).await.expect("load fixtures");

    let repository = SqlCustomerRepository::new(pool);
    let roster = repository.list_all(MemberNumberOrder::Descending).await.expect("list");

    let numbers: Vec<i64> = roster.iter().map(|customer| customer.member_number).collect();
    assert_eq!(numbers, SEED_MEMBER_NUMBERS);

    let ids: Vec<String> = roster.iter().map(|customer| customer.id.to_string()).collect();
    for id in SEED_IDS {
        assert!(ids.contains(&id.to_string()), "seeded id {id} should be listed");
    }
}
