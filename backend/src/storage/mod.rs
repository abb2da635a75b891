//! Persistence layer for customer records.
//!
//! Repositories hand out typed [`StoreError`](crate::errors::StoreError)
//! values and leave the mapping to caller-visible error kinds to the domain
//! services.

mod customer_repository;

pub use customer_repository::{CustomerRepository, CustomerUpdate, NewCustomer};
