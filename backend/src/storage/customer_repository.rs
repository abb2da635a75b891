use std::str::FromStr;

use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use shared::{Customer, Gender, SortDirection, SortField, BIRTH_DATE_FORMAT};

use crate::db::DbConnection;
use crate::errors::StoreError;
use crate::token;

const SELECT_COLUMNS: &str =
    "id, first_name, last_name, birth_date, gender, email, address, token, created_at, updated_at";

/// Field values for a customer row to be inserted
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub email: String,
    pub address: String,
    /// Initial concurrency token
    pub token: String,
}

/// Mutable customer fields plus the concurrency guard for a conditional
/// update. Email is assigned at creation and never rewritten.
#[derive(Debug, Clone)]
pub struct CustomerUpdate {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub address: String,
    /// Token the caller received with the record; the write only applies
    /// while the stored token still matches it
    pub expected_token: String,
}

/// Repository for customer rows
#[derive(Clone)]
pub struct CustomerRepository {
    db: DbConnection,
}

impl CustomerRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert a new customer and return the storage-assigned id
    pub async fn create(&self, customer: &NewCustomer) -> Result<i64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO customers (first_name, last_name, birth_date, gender, email, address, token)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(customer.birth_date.format(BIRTH_DATE_FORMAT).to_string())
        .bind(customer.gender.as_str())
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(&customer.token)
        .execute(self.db.pool())
        .await
        .map_err(classify_write_error)?;

        Ok(result.last_insert_rowid())
    }

    /// Get a customer by id
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Customer>, StoreError> {
        let query = format!("SELECT {} FROM customers WHERE id = ?", SELECT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        row.map(|r| customer_from_row(&r)).transpose()
    }

    /// Conditionally update a customer and rotate its token.
    ///
    /// The write is guarded by `WHERE id = ? AND token = ?`. Zero affected
    /// rows means either the id is absent or the token went stale; the two
    /// cases are deliberately not told apart. Returns the freshly assigned
    /// token on success.
    pub async fn update(&self, update: &CustomerUpdate) -> Result<String, StoreError> {
        let next_token = token::generate_token();
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET first_name = ?,
                last_name = ?,
                birth_date = ?,
                gender = ?,
                address = ?,
                token = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND token = ?
            "#,
        )
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(update.birth_date.format(BIRTH_DATE_FORMAT).to_string())
        .bind(update.gender.as_str())
        .bind(&update.address)
        .bind(&next_token)
        .bind(update.id)
        .bind(&update.expected_token)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NoRowsModified);
        }
        Ok(next_token)
    }

    /// Hard-delete a customer by id
    pub async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NoRowsModified);
        }
        Ok(())
    }

    /// Number of customer rows
    pub async fn count(&self) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM customers")
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.get("count"))
    }

    /// Fetch one page of customers ordered by an allow-listed column
    pub async fn query_list(
        &self,
        offset: i64,
        sort_field: SortField,
        sort_direction: SortDirection,
        limit: i64,
    ) -> Result<Vec<Customer>, StoreError> {
        let query = format!(
            "SELECT {} FROM customers ORDER BY {} {} LIMIT ? OFFSET ?",
            SELECT_COLUMNS,
            column_name(sort_field),
            sort_keyword(sort_direction),
        );

        let rows = sqlx::query(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(customer_from_row).collect()
    }

    /// Fetch one page of customers whose first or last name contains any
    /// whitespace-delimited token of `pattern`, case-insensitively.
    ///
    /// Tokens are lowercased and deduplicated before the predicate is built,
    /// and every token is bound as a parameter. A pattern that normalises to
    /// nothing filters nothing and falls back to the plain listing.
    pub async fn search_query_list(
        &self,
        offset: i64,
        sort_field: SortField,
        sort_direction: SortDirection,
        limit: i64,
        pattern: &str,
    ) -> Result<Vec<Customer>, StoreError> {
        let tokens = search_tokens(pattern);
        if tokens.is_empty() {
            return self
                .query_list(offset, sort_field, sort_direction, limit)
                .await;
        }

        let predicate = tokens
            .iter()
            .map(|_| "LOWER(first_name) LIKE '%' || ? || '%' OR LOWER(last_name) LIKE '%' || ? || '%'")
            .collect::<Vec<_>>()
            .join(" OR ");
        let query = format!(
            "SELECT {} FROM customers WHERE {} ORDER BY {} {} LIMIT ? OFFSET ?",
            SELECT_COLUMNS,
            predicate,
            column_name(sort_field),
            sort_keyword(sort_direction),
        );

        let mut statement = sqlx::query(&query);
        for token in &tokens {
            statement = statement.bind(token.as_str()).bind(token.as_str());
        }

        let rows = statement
            .bind(limit)
            .bind(offset)
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(customer_from_row).collect()
    }
}

/// Column identifier interpolated into ORDER BY. Restricted to the fixed
/// enum so no caller-supplied string ever reaches the statement text.
fn column_name(field: SortField) -> &'static str {
    match field {
        SortField::FirstName => "first_name",
        SortField::LastName => "last_name",
        SortField::BirthDate => "birth_date",
        SortField::Address => "address",
        SortField::Email => "email",
    }
}

fn sort_keyword(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    }
}

/// Split a raw search pattern into lowercased, deduplicated tokens
fn search_tokens(pattern: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for raw in pattern.split_whitespace() {
        let token = raw.to_lowercase();
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

fn classify_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            return StoreError::UniqueViolation;
        }
    }
    StoreError::Database(err)
}

fn customer_from_row(row: &SqliteRow) -> Result<Customer, StoreError> {
    let birth_date_raw: String = row.get("birth_date");
    let birth_date = NaiveDate::parse_from_str(&birth_date_raw, BIRTH_DATE_FORMAT)
        .map_err(|e| StoreError::Decode(format!("birth_date `{}`: {}", birth_date_raw, e)))?;

    let gender_raw: String = row.get("gender");
    let gender = Gender::from_str(&gender_raw).map_err(|e| StoreError::Decode(e.to_string()))?;

    Ok(Customer {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        birth_date,
        gender,
        email: row.get("email"),
        address: row.get("address"),
        token: row.get("token"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
