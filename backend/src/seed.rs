use anyhow::{Context, Result};
use chrono::Days;
use rand::Rng;
use tracing::info;

use shared::{CreateCustomerRequest, Gender, BIRTH_DATE_FORMAT};

use crate::domain::CustomerService;
use crate::storage::CustomerRepository;
use crate::validation;

const FIRST_NAMES: [&str; 10] = [
    "Anna", "Marta", "James", "Grace", "Peter", "Judy", "Frank", "Sally", "Oliver", "Nina",
];
const LAST_NAMES: [&str; 10] = [
    "Connor",
    "Henderson",
    "Farley",
    "Smith",
    "Jeffries",
    "Carlin",
    "Anderson",
    "Brooks",
    "Marley",
    "McDougal",
];
const STREETS: [&str; 5] = [
    "Maple Street",
    "Oak Avenue",
    "Pine Road",
    "Elm Lane",
    "Cedar Court",
];

/// Populate the customers table with fake records when it is empty.
///
/// Rows go through the service so the usual validation and token issuance
/// apply. A second run against a non-empty table does nothing.
pub async fn seed_if_empty(
    repository: &CustomerRepository,
    service: &CustomerService,
    count: u32,
) -> Result<()> {
    let existing = repository
        .count()
        .await
        .context("failed to count existing customers")?;
    info!("Customer table holds {} rows", existing);
    if existing > 0 {
        return Ok(());
    }

    info!("Seeding {} fake customers", count);
    let (earliest, latest) = validation::birth_date_range();
    let span_days = latest.signed_duration_since(earliest).num_days() as u64;

    let mut rng = rand::rng();
    for i in 0..count {
        let first_name = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
        let last_name = LAST_NAMES[rng.random_range(0..LAST_NAMES.len())];
        let birth_date = earliest + Days::new(rng.random_range(0..=span_days));
        let gender = if rng.random_range(0..2) == 0 {
            Gender::Female
        } else {
            Gender::Male
        };

        let request = CreateCustomerRequest {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            birth_date: birth_date.format(BIRTH_DATE_FORMAT).to_string(),
            gender: gender.as_str().to_string(),
            // The index suffix keeps generated addresses unique
            email: format!(
                "{}.{}.{}@example.com",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                i
            ),
            address: format!(
                "{} {}",
                rng.random_range(1..200),
                STREETS[rng.random_range(0..STREETS.len())]
            ),
        };

        service
            .create(request)
            .await
            .with_context(|| format!("failed to seed customer {}", i))?;
    }

    info!("Seeded {} customers", count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;

    async fn setup_test() -> (CustomerRepository, CustomerService) {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        let repository = CustomerRepository::new(db);
        let service = CustomerService::new(repository.clone());
        (repository, service)
    }

    #[tokio::test]
    async fn test_seed_fills_an_empty_table() {
        let (repository, service) = setup_test().await;

        seed_if_empty(&repository, &service, 8)
            .await
            .expect("seeding should succeed");
        assert_eq!(repository.count().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_seed_is_skipped_when_rows_exist() {
        let (repository, service) = setup_test().await;

        seed_if_empty(&repository, &service, 5)
            .await
            .expect("first seeding should succeed");
        seed_if_empty(&repository, &service, 5)
            .await
            .expect("second seeding should be a no-op");

        assert_eq!(repository.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_seeded_rows_pass_through_the_service() {
        let (repository, service) = setup_test().await;

        seed_if_empty(&repository, &service, 3)
            .await
            .expect("seeding should succeed");

        let page = repository
            .query_list(
                0,
                shared::SortField::Email,
                shared::SortDirection::Asc,
                20,
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 3);
        for customer in &page {
            assert_eq!(customer.token.len(), crate::token::TOKEN_LENGTH);
            assert!(validation::is_valid_birth_date(customer.birth_date));
            assert!(validation::is_valid_email(&customer.email));
        }
    }
}
