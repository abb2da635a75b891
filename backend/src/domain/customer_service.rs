use std::str::FromStr;

use chrono::NaiveDate;
use tracing::{error, info};

use shared::{
    CreateCustomerRequest, Customer, CustomerListItem, CustomerListRequest, CustomerListResponse,
    Gender, SortDirection, SortField, UpdateCustomerRequest, BIRTH_DATE_FORMAT,
};

use crate::errors::{ServiceError, StoreError};
use crate::storage::{CustomerRepository, CustomerUpdate, NewCustomer};
use crate::token;
use crate::validation;

/// Customers shown per listing page
pub const PAGE_SIZE: i64 = 20;

/// Maximum accepted search string length
const MAX_SEARCH_LENGTH: usize = 100;

/// Service holding the customer business rules.
///
/// Input validation, token issuance, and the mapping of raw storage failures
/// to caller-visible error kinds all live here; the repository below it and
/// the transport above it stay free of both.
#[derive(Clone)]
pub struct CustomerService {
    repository: CustomerRepository,
}

impl CustomerService {
    pub fn new(repository: CustomerRepository) -> Self {
        Self { repository }
    }

    /// Create a new customer with a fresh concurrency token
    pub async fn create(&self, request: CreateCustomerRequest) -> Result<Customer, ServiceError> {
        info!("Creating customer: email={}", request.email);

        let birth_date = parse_birth_date(&request.birth_date)?;
        let gender = parse_gender(&request.gender)?;
        validate_names(&request.first_name, &request.last_name)?;
        validate_age(birth_date)?;
        validate_email(&request.email)?;

        let customer = NewCustomer {
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            birth_date,
            gender,
            email: request.email.trim().to_string(),
            address: request.address,
            token: token::generate_token(),
        };

        let id = match self.repository.create(&customer).await {
            Ok(id) => id,
            Err(StoreError::UniqueViolation) => return Err(ServiceError::EmailAlreadyUsed),
            Err(e) => return Err(internal(e)),
        };

        match self.repository.get_by_id(id).await {
            Ok(Some(stored)) => {
                info!("Created customer {} ({})", id, stored.email);
                Ok(stored)
            }
            Ok(None) => {
                error!("Customer {} missing right after insert", id);
                Err(ServiceError::Internal)
            }
            Err(e) => Err(internal(e)),
        }
    }

    /// Update a customer, guarded by its concurrency token
    pub async fn update(
        &self,
        id: i64,
        request: UpdateCustomerRequest,
    ) -> Result<(), ServiceError> {
        info!("Updating customer: id={}", id);

        if id <= 0 {
            return Err(ServiceError::InvalidInput(
                "customer id must be a positive integer".to_string(),
            ));
        }
        let birth_date = parse_birth_date(&request.birth_date)?;
        let gender = parse_gender(&request.gender)?;
        validate_names(&request.first_name, &request.last_name)?;
        validate_age(birth_date)?;
        if request.token.len() != token::TOKEN_LENGTH {
            return Err(ServiceError::InvalidInput(format!(
                "concurrency token must be exactly {} characters",
                token::TOKEN_LENGTH
            )));
        }

        let update = CustomerUpdate {
            id,
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            birth_date,
            gender,
            address: request.address,
            expected_token: request.token,
        };

        match self.repository.update(&update).await {
            Ok(_new_token) => Ok(()),
            // Either the id is gone or someone saved in between; both are
            // reported as a conflict rather than guessing which
            Err(StoreError::NoRowsModified) => Err(ServiceError::EditConflict),
            Err(e) => Err(internal(e)),
        }
    }

    /// Delete a customer by id
    pub async fn delete_by_id(&self, id: i64) -> Result<(), ServiceError> {
        info!("Deleting customer: id={}", id);

        match self.repository.delete_by_id(id).await {
            Ok(()) => Ok(()),
            Err(StoreError::NoRowsModified) => Err(ServiceError::NotFound),
            Err(e) => Err(internal(e)),
        }
    }

    /// Get the full customer record, including its current token
    pub async fn get_by_id(&self, id: i64) -> Result<Customer, ServiceError> {
        match self.repository.get_by_id(id).await {
            Ok(Some(customer)) => Ok(customer),
            Ok(None) => Err(ServiceError::NotFound),
            Err(e) => Err(internal(e)),
        }
    }

    /// Fetch one page of the customer listing, plain or searched
    pub async fn query_list(
        &self,
        request: CustomerListRequest,
    ) -> Result<CustomerListResponse, ServiceError> {
        if request.page < 0 {
            return Err(ServiceError::InvalidInput(
                "page must be a non-negative integer".to_string(),
            ));
        }
        let search = request.search.unwrap_or_default();
        if search.len() > MAX_SEARCH_LENGTH {
            return Err(ServiceError::InvalidInput(format!(
                "search value must be at most {} characters",
                MAX_SEARCH_LENGTH
            )));
        }
        let sort_field = SortField::from_str(&request.sort_by)
            .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;
        if request.sort_dir.is_empty() {
            return Err(ServiceError::BadSearchCriteria);
        }
        let sort_direction = SortDirection::from_str(&request.sort_dir)
            .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;

        let offset = request.page * PAGE_SIZE;
        let result = if search.trim().is_empty() {
            self.repository
                .query_list(offset, sort_field, sort_direction, PAGE_SIZE)
                .await
        } else {
            self.repository
                .search_query_list(offset, sort_field, sort_direction, PAGE_SIZE, &search)
                .await
        };

        let customers = result.map_err(internal)?;
        Ok(CustomerListResponse {
            customers: customers.into_iter().map(list_item).collect(),
        })
    }
}

fn list_item(customer: Customer) -> CustomerListItem {
    CustomerListItem {
        id: customer.id,
        first_name: customer.first_name,
        last_name: customer.last_name,
        birth_date: customer.birth_date.format(BIRTH_DATE_FORMAT).to_string(),
        gender: customer.gender,
        email: customer.email,
        address: customer.address,
    }
}

fn parse_birth_date(raw: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(raw, BIRTH_DATE_FORMAT).map_err(|_| {
        ServiceError::InvalidInput("birth date must be of format yyyy-mm-dd".to_string())
    })
}

fn parse_gender(raw: &str) -> Result<Gender, ServiceError> {
    Gender::from_str(raw).map_err(|e| ServiceError::InvalidInput(e.to_string()))
}

fn validate_names(first_name: &str, last_name: &str) -> Result<(), ServiceError> {
    if first_name.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "first name is required".to_string(),
        ));
    }
    if first_name.len() > validation::MAX_NAME_LENGTH {
        return Err(ServiceError::InvalidInput(format!(
            "first name must be at most {} characters",
            validation::MAX_NAME_LENGTH
        )));
    }
    if last_name.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "last name is required".to_string(),
        ));
    }
    if last_name.len() > validation::MAX_NAME_LENGTH {
        return Err(ServiceError::InvalidInput(format!(
            "last name must be at most {} characters",
            validation::MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

fn validate_age(birth_date: NaiveDate) -> Result<(), ServiceError> {
    if !validation::is_valid_birth_date(birth_date) {
        return Err(ServiceError::InvalidInput(format!(
            "customer age must be between {} and {} inclusive",
            validation::MIN_AGE,
            validation::MAX_AGE
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ServiceError> {
    if !validation::is_valid_email(email.trim()) {
        return Err(ServiceError::InvalidInput(
            "a valid email address is required".to_string(),
        ));
    }
    Ok(())
}

fn internal(err: StoreError) -> ServiceError {
    error!("Storage failure: {}", err);
    ServiceError::Internal
}
