use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use shared::{
    BirthDateRangeResponse, CreateCustomerRequest, CustomerListRequest, CustomerResponse,
    MessageResponse, UpdateCustomerRequest, BIRTH_DATE_FORMAT,
};

use crate::domain::CustomerService;
use crate::errors::ServiceError;
use crate::validation;

/// Application state shared across request handlers.
/// Constructed once at startup and injected into the router.
#[derive(Clone)]
pub struct AppState {
    pub customer_service: CustomerService,
}

impl AppState {
    pub fn new(customer_service: CustomerService) -> Self {
        Self { customer_service }
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/customers", get(list_customers).post(create_customer))
        .route("/api/customers/birth-date-range", get(birth_date_range))
        .route(
            "/api/customers/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .with_state(state)
}

/// Query parameters for the customer listing
#[derive(Deserialize, Debug)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

/// JSON body returned for every failed request
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

fn error_response(err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::InvalidInput(_)
        | ServiceError::EmailAlreadyUsed
        | ServiceError::BadSearchCriteria => StatusCode::BAD_REQUEST,
        ServiceError::EditConflict => StatusCode::CONFLICT,
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorBody {
            code: err.code(),
            message: err.to_string(),
        }),
    )
        .into_response()
}

/// Axum handler for GET /api/customers
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    info!("GET /api/customers - query: {:?}", query);

    // The list page defaults to the first page, sorted by first name
    let request = CustomerListRequest {
        page: query.page.unwrap_or(0),
        search: query.search,
        sort_by: query.sort_by.unwrap_or_else(|| "first_name".to_string()),
        sort_dir: query.sort_dir.unwrap_or_else(|| "asc".to_string()),
    };

    match state.customer_service.query_list(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for POST /api/customers
pub async fn create_customer(
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> impl IntoResponse {
    info!("POST /api/customers - email: {}", request.email);

    match state.customer_service.create(request).await {
        Ok(customer) => (
            StatusCode::CREATED,
            Json(CustomerResponse {
                customer,
                success_message: "Customer was successfully created".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for GET /api/customers/:id
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/customers/{}", id);

    match state.customer_service.get_by_id(id).await {
        Ok(customer) => (StatusCode::OK, Json(customer)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for PUT /api/customers/:id
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateCustomerRequest>,
) -> impl IntoResponse {
    info!("PUT /api/customers/{}", id);

    match state.customer_service.update(id, request).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                success_message: "Customer was successfully edited".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for DELETE /api/customers/:id
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/customers/{}", id);

    match state.customer_service.delete_by_id(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                success_message: "Customer was successfully deleted".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Axum handler for GET /api/customers/birth-date-range, used to bound the
/// birth date picker on the intake and edit forms
pub async fn birth_date_range() -> impl IntoResponse {
    let (min_date, max_date) = validation::birth_date_range();
    Json(BirthDateRangeResponse {
        min_date: min_date.format(BIRTH_DATE_FORMAT).to_string(),
        max_date: max_date.format(BIRTH_DATE_FORMAT).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use crate::storage::CustomerRepository;

    async fn setup_test_state() -> AppState {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        AppState::new(CustomerService::new(CustomerRepository::new(db)))
    }

    fn create_request(email: &str) -> CreateCustomerRequest {
        CreateCustomerRequest {
            first_name: "Anna".to_string(),
            last_name: "Smith".to_string(),
            birth_date: "1990-04-12".to_string(),
            gender: "female".to_string(),
            email: email.to_string(),
            address: "12 Maple Street".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_customer_handler_returns_created() {
        let state = setup_test_state().await;

        let response = create_customer(State(state), Json(create_request("anna@example.com")))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_create_customer_handler_rejects_duplicate_email() {
        let state = setup_test_state().await;

        let first = create_customer(
            State(state.clone()),
            Json(create_request("anna@example.com")),
        )
        .await
        .into_response();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = create_customer(State(state), Json(create_request("anna@example.com")))
            .await
            .into_response();
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_customer_handler_missing_id_is_not_found() {
        let state = setup_test_state().await;

        let response = get_customer(State(state), Path(4711)).await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_customer_handler_conflict_status() {
        let state = setup_test_state().await;

        let created = state
            .customer_service
            .create(create_request("anna@example.com"))
            .await
            .expect("create should succeed");

        let request = UpdateCustomerRequest {
            first_name: "Annabel".to_string(),
            last_name: "Smith".to_string(),
            birth_date: "1990-04-12".to_string(),
            gender: "female".to_string(),
            address: String::new(),
            token: created.token.clone(),
        };

        let first = update_customer(
            State(state.clone()),
            Path(created.id),
            Json(request.clone()),
        )
        .await
        .into_response();
        assert_eq!(first.status(), StatusCode::OK);

        // Replaying the same token must be refused as a conflict
        let second = update_customer(State(state), Path(created.id), Json(request))
            .await
            .into_response();
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_delete_customer_handler_statuses() {
        let state = setup_test_state().await;

        let created = state
            .customer_service
            .create(create_request("anna@example.com"))
            .await
            .expect("create should succeed");

        let deleted = delete_customer(State(state.clone()), Path(created.id))
            .await
            .into_response();
        assert_eq!(deleted.status(), StatusCode::OK);

        let again = delete_customer(State(state), Path(created.id))
            .await
            .into_response();
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_customers_handler_defaults() {
        let state = setup_test_state().await;

        let response = list_customers(
            State(state),
            Query(ListQuery {
                page: None,
                search: None,
                sort_by: None,
                sort_dir: None,
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_customers_handler_rejects_unknown_sort() {
        let state = setup_test_state().await;

        let response = list_customers(
            State(state),
            Query(ListQuery {
                page: None,
                search: None,
                sort_by: Some("token".to_string()),
                sort_dir: None,
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
