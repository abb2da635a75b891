use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Date layout used for birth dates throughout the API (`YYYY-MM-DD`)
pub const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

/// A customer record.
///
/// The `token` field is an opaque random string regenerated on every
/// successful mutation. An edit form receives the current token together with
/// the record and sends it back with the update; if someone else saved in the
/// meantime the stored token no longer matches and the update is refused
/// instead of silently overwriting their changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Calendar date, no time component
    pub birth_date: NaiveDate,
    pub gender: Gender,
    /// Unique across all customers
    pub email: String,
    pub address: String,
    /// Concurrency token, rotated on every successful update
    pub token: String,
    /// Storage-assigned timestamp, never client supplied
    pub created_at: String,
    /// Storage-assigned timestamp, refreshed on every update
    pub updated_at: String,
}

/// Customer gender as captured on the intake form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "female" => Ok(Gender::Female),
            "male" => Ok(Gender::Male),
            _ => Err(ParseEnumError::new(value, "female, male")),
        }
    }
}

/// Column a customer listing may be ordered by.
///
/// Only these identifiers ever reach an ORDER BY clause; anything else is
/// rejected while parsing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    FirstName,
    LastName,
    BirthDate,
    Address,
    Email,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::FirstName => "first_name",
            SortField::LastName => "last_name",
            SortField::BirthDate => "birth_date",
            SortField::Address => "address",
            SortField::Email => "email",
        }
    }
}

impl FromStr for SortField {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "first_name" => Ok(SortField::FirstName),
            "last_name" => Ok(SortField::LastName),
            "birth_date" => Ok(SortField::BirthDate),
            "address" => Ok(SortField::Address),
            "email" => Ok(SortField::Email),
            _ => Err(ParseEnumError::new(
                value,
                "first_name, last_name, birth_date, address, email",
            )),
        }
    }
}

/// Direction of a customer listing sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(ParseEnumError::new(value, "asc, desc")),
        }
    }
}

/// Error returned when one of the enumerated form values fails to parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    value: String,
    expected: &'static str,
}

impl ParseEnumError {
    fn new(value: &str, expected: &'static str) -> Self {
        Self {
            value: value.to_string(),
            expected,
        }
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid value `{}`, expected one of: {}",
            self.value, self.expected
        )
    }
}

impl std::error::Error for ParseEnumError {}

/// Request for creating a new customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    pub first_name: String,
    pub last_name: String,
    /// ISO 8601 date (YYYY-MM-DD)
    pub birth_date: String,
    /// One of "female" or "male"
    pub gender: String,
    pub email: String,
    #[serde(default)]
    pub address: String,
}

/// Request for updating an existing customer.
///
/// Email is assigned at creation and never updated, so it does not appear
/// here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCustomerRequest {
    pub first_name: String,
    pub last_name: String,
    /// ISO 8601 date (YYYY-MM-DD)
    pub birth_date: String,
    /// One of "female" or "male"
    pub gender: String,
    #[serde(default)]
    pub address: String,
    /// Concurrency token received with the record being edited
    pub token: String,
}

/// Arguments for one page of the customer listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerListRequest {
    /// Zero-based page number
    pub page: i64,
    /// Optional substring search over first and last names
    pub search: Option<String>,
    /// Sort column, one of the [`SortField`] identifiers
    pub sort_by: String,
    /// Sort direction, "asc" or "desc"
    pub sort_dir: String,
}

/// One row of the customer listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerListItem {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Birth date formatted YYYY-MM-DD
    pub birth_date: String,
    pub gender: Gender,
    pub email: String,
    pub address: String,
}

/// Response containing one page of customers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerListResponse {
    pub customers: Vec<CustomerListItem>,
}

/// Response after creating a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerResponse {
    pub customer: Customer,
    pub success_message: String,
}

/// Response for operations that return no record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success_message: String,
}

/// Earliest and latest birth dates accepted right now, for bounding a date
/// picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthDateRangeResponse {
    /// Birth date of someone turning 60 today (YYYY-MM-DD)
    pub min_date: String,
    /// Birth date of someone turning 18 today (YYYY-MM-DD)
    pub max_date: String,
}
