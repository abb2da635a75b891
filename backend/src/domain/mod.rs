//! Business rules for the customer registry.

mod customer_service;

pub use customer_service::{CustomerService, PAGE_SIZE};
