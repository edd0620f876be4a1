//! Customer resource endpoints.
//!
//! Routes:
//! - `GET    /customer`       — list all customers, member number descending
//! - `POST   /customer`       — create a customer from a candidate record
//! - `PUT    /customer`       — replace the record named by the `_id` field
//! - `GET    /customer/{id}`  — fetch one customer
//! - `DELETE /customer/{id}`  — remove a customer
//!
//! Every error body is `{"error": "<message>"}`. Store failures surface as a
//! generic message; the full error goes to the log only.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use clientele_core::domain::customer::{Customer, CustomerDraft, CustomerId};
use clientele_db::repositories::{CustomerRepository, MemberNumberOrder, RepositoryError};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

#[derive(Clone)]
pub struct CustomerApiState {
    customers: Arc<dyn CustomerRepository>,
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// A candidate record: all business fields, no id.
#[derive(Debug, Deserialize)]
pub struct CustomerPayload {
    pub name: String,
    #[serde(rename = "dateOfBirth")]
    pub date_of_birth: NaiveDate,
    #[serde(rename = "memberNumber")]
    pub member_number: i64,
    pub interests: String,
}

/// A full record submitted for replacement, carrying the target `_id`.
#[derive(Debug, Deserialize)]
pub struct UpdateCustomerPayload {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: CustomerPayload,
}

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "dateOfBirth")]
    pub date_of_birth: NaiveDate,
    #[serde(rename = "memberNumber")]
    pub member_number: i64,
    pub interests: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteConfirmation {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id.to_string(),
            name: customer.name,
            date_of_birth: customer.date_of_birth,
            member_number: customer.member_number,
            interests: customer.interests,
        }
    }
}

impl From<CustomerPayload> for CustomerDraft {
    fn from(payload: CustomerPayload) -> Self {
        Self {
            name: payload.name,
            date_of_birth: payload.date_of_birth,
            member_number: payload.member_number,
            interests: payload.interests,
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(customers: Arc<dyn CustomerRepository>) -> Router {
    Router::new()
        .route("/customer", get(list_customers).post(create_customer).put(update_customer))
        .route("/customer/{id}", get(fetch_customer).delete(delete_customer))
        .with_state(CustomerApiState { customers })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn list_customers(
    State(state): State<CustomerApiState>,
) -> Result<Json<Vec<CustomerResponse>>, (StatusCode, Json<ApiError>)> {
    let customers = state
        .customers
        .list_all(MemberNumberOrder::Descending)
        .await
        .map_err(repository_error)?;

    Ok(Json(customers.into_iter().map(CustomerResponse::from).collect()))
}

async fn create_customer(
    State(state): State<CustomerApiState>,
    payload: Result<Json<CustomerPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<CustomerResponse>), (StatusCode, Json<ApiError>)> {
    let Json(payload) = payload.map_err(invalid_body)?;

    let created = state.customers.create(payload.into()).await.map_err(repository_error)?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn update_customer(
    State(state): State<CustomerApiState>,
    payload: Result<Json<UpdateCustomerPayload>, JsonRejection>,
) -> Result<Json<CustomerResponse>, (StatusCode, Json<ApiError>)> {
    let Json(payload) = payload.map_err(invalid_body)?;

    // A replacement must name its target; an unparseable id here is a caller
    // mistake, not a missing record.
    let Some(id) = CustomerId::parse(&payload.id) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError { error: format!("`{}` is not a valid customer id", payload.id) }),
        ));
    };

    let updated = state
        .customers
        .update_by_id(&id, payload.fields.into())
        .await
        .map_err(repository_error)?;

    Ok(Json(updated.into()))
}

async fn fetch_customer(
    Path(raw_id): Path<String>,
    State(state): State<CustomerApiState>,
) -> Result<Json<CustomerResponse>, (StatusCode, Json<ApiError>)> {
    // An unparseable id cannot name any stored record, so it reports
    // not-found the same way an unknown id does.
    let Some(id) = CustomerId::parse(&raw_id) else {
        return Err(not_found(&raw_id));
    };

    match state.customers.find_by_id(&id).await.map_err(repository_error)? {
        Some(customer) => Ok(Json(customer.into())),
        None => Err(not_found(&raw_id)),
    }
}

async fn delete_customer(
    Path(raw_id): Path<String>,
    State(state): State<CustomerApiState>,
) -> Result<Json<DeleteConfirmation>, (StatusCode, Json<ApiError>)> {
    let Some(id) = CustomerId::parse(&raw_id) else {
        return Err(not_found(&raw_id));
    };

    state.customers.delete_by_id(&id).await.map_err(repository_error)?;

    Ok(Json(DeleteConfirmation { message: "customer deleted".to_string() }))
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn repository_error(error: RepositoryError) -> (StatusCode, Json<ApiError>) {
    match error {
        RepositoryError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(ApiError { error: format!("no customer with id `{id}`") }),
        ),
        RepositoryError::MemberNumberTaken(member_number) => (
            StatusCode::CONFLICT,
            Json(ApiError {
                error: format!(
                    "member number {member_number} is already assigned to another customer"
                ),
            }),
        ),
        RepositoryError::InvalidRecord(validation) => {
            (StatusCode::BAD_REQUEST, Json(ApiError { error: validation.to_string() }))
        }
        RepositoryError::Database(_) | RepositoryError::Decode(_) => {
            error!(error = %error, "customer store operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError { error: "an internal storage error occurred".to_string() }),
            )
        }
    }
}

fn invalid_body(rejection: JsonRejection) -> (StatusCode, Json<ApiError>) {
    warn!(error = %rejection, "rejected malformed customer payload");
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError { error: "request body is not a valid customer record".to_string() }),
    )
}

fn not_found(raw_id: &str) -> (StatusCode, Json<ApiError>) {
    (StatusCode::NOT_FOUND, Json(ApiError { error: format!("no customer with id `{raw_id}`") }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use clientele_db::repositories::SqlCustomerRepository;
    use clientele_db::{connect_with_settings, migrations};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::router;

    async fn test_router() -> Router {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");
        migrations::run_pending(&pool).await.expect("run migrations");
        router(Arc::new(SqlCustomerRepository::new(pool)))
    }

    fn customer_body(name: &str, member_number: i64) -> Value {
        json!({
            "name": name,
            "dateOfBirth": "1990-01-01",
            "memberNumber": member_number,
            "interests": "chess",
        })
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(value) => builder
                .header("content-type", "application/json")
                .body(Body::from(value.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes =
            axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    #[tokio::test]
    async fn create_then_fetch_returns_the_same_record() {
        let router = test_router().await;

        let (status, created) =
            send(&router, "POST", "/customer", Some(customer_body("Ann", 1))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["name"], "Ann");
        assert_eq!(created["dateOfBirth"], "1990-01-01");
        assert_eq!(created["memberNumber"], 1);
        assert_eq!(created["interests"], "chess");
        let id = created["_id"].as_str().expect("generated id").to_string();
        assert!(!id.is_empty());

        let (status, fetched) = send(&router, "GET", &format!("/customer/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn create_assigns_a_fresh_id_per_record() {
        let router = test_router().await;

        let (_, first) = send(&router, "POST", "/customer", Some(customer_body("Ann", 1))).await;
        let (_, second) = send(&router, "POST", "/customer", Some(customer_body("Ben", 2))).await;

        assert_ne!(first["_id"], second["_id"]);
    }

    #[tokio::test]
    async fn duplicate_member_number_is_a_conflict() {
        let router = test_router().await;

        send(&router, "POST", "/customer", Some(customer_body("Ann", 1))).await;
        let (status, body) =
            send(&router, "POST", "/customer", Some(customer_body("Ben", 1))).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().expect("error message").contains("member number 1"));
    }

    #[tokio::test]
    async fn blank_name_is_a_bad_request() {
        let router = test_router().await;

        let (status, body) =
            send(&router, "POST", "/customer", Some(customer_body("   ", 1))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().expect("error message").contains("name"));
    }

    #[tokio::test]
    async fn missing_field_is_a_bad_request_with_error_envelope() {
        let router = test_router().await;

        let (status, body) = send(
            &router,
            "POST",
            "/customer",
            Some(json!({ "name": "Ann", "memberNumber": 1 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn list_is_ordered_by_member_number_descending() {
        let router = test_router().await;

        for (name, member_number) in [("Ann", 5), ("Ben", 2), ("Cal", 9)] {
            send(&router, "POST", "/customer", Some(customer_body(name, member_number))).await;
        }

        let (status, body) = send(&router, "GET", "/customer", None).await;
        assert_eq!(status, StatusCode::OK);

        let numbers: Vec<i64> = body
            .as_array()
            .expect("array body")
            .iter()
            .map(|record| record["memberNumber"].as_i64().expect("member number"))
            .collect();
        assert_eq!(numbers, vec![9, 5, 2]);
    }

    #[tokio::test]
    async fn empty_roster_lists_as_an_empty_array() {
        let router = test_router().await;

        let (status, body) = send(&router, "GET", "/customer", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids_fetch_as_not_found() {
        let router = test_router().await;

        let unknown = "1e8c7b4a-9f3d-4e2b-8a6c-5d0f1b2a3c4d";
        let (status, body) = send(&router, "GET", &format!("/customer/{unknown}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());

        let (status, body) = send(&router, "GET", "/customer/not-an-id", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn update_replaces_the_record() {
        let router = test_router().await;

        let (_, created) = send(&router, "POST", "/customer", Some(customer_body("Ann", 1))).await;
        let id = created["_id"].as_str().expect("id").to_string();

        let mut replacement = customer_body("Ann Example", 1);
        replacement["_id"] = json!(id);
        let (status, updated) = send(&router, "PUT", "/customer", Some(replacement)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["_id"], json!(id));
        assert_eq!(updated["name"], "Ann Example");
        assert_eq!(updated["memberNumber"], 1);

        let (_, fetched) = send(&router, "GET", &format!("/customer/{id}"), None).await;
        assert_eq!(fetched["name"], "Ann Example");
        assert_eq!(fetched["dateOfBirth"], "1990-01-01");
        assert_eq!(fetched["interests"], "chess");
    }

    #[tokio::test]
    async fn update_with_malformed_id_is_a_bad_request() {
        let router = test_router().await;

        let mut payload = customer_body("Ann", 1);
        payload["_id"] = json!("not-an-id");
        let (status, body) = send(&router, "PUT", "/customer", Some(payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().expect("error message").contains("not-an-id"));
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let router = test_router().await;

        let mut payload = customer_body("Ann", 1);
        payload["_id"] = json!("1e8c7b4a-9f3d-4e2b-8a6c-5d0f1b2a3c4d");
        let (status, body) = send(&router, "PUT", "/customer", Some(payload)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn update_to_taken_member_number_is_a_conflict_and_changes_nothing() {
        let router = test_router().await;

        send(&router, "POST", "/customer", Some(customer_body("Ann", 1))).await;
        let (_, ben) = send(&router, "POST", "/customer", Some(customer_body("Ben", 2))).await;

        let mut payload = customer_body("Ben", 1);
        payload["_id"] = ben["_id"].clone();
        let (status, _) = send(&router, "PUT", "/customer", Some(payload)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, all) = send(&router, "GET", "/customer", None).await;
        let names: Vec<&str> = all
            .as_array()
            .expect("array body")
            .iter()
            .map(|record| record["name"].as_str().expect("name"))
            .collect();
        let numbers: Vec<i64> = all
            .as_array()
            .expect("array body")
            .iter()
            .map(|record| record["memberNumber"].as_i64().expect("member number"))
            .collect();
        assert_eq!(names, vec!["Ben", "Ann"]);
        assert_eq!(numbers, vec![2, 1]);
    }

    #[tokio::test]
    async fn delete_confirms_then_reports_not_found() {
        let router = test_router().await;

        let (_, created) = send(&router, "POST", "/customer", Some(customer_body("Ann", 1))).await;
        let id = created["_id"].as_str().expect("id").to_string();

        let (status, body) = send(&router, "DELETE", &format!("/customer/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "customer deleted");

        let (status, _) = send(&router, "GET", &format!("/customer/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&router, "DELETE", &format!("/customer/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn delete_with_malformed_id_is_not_found() {
        let router = test_router().await;

        let (status, body) = send(&router, "DELETE", "/customer/not-an-id", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }
}
