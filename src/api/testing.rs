//! Request helpers shared by the route tests.

use rocket::{
    http::{ContentType, Header, Status},
    local::asynchronous::{Client, LocalResponse},
    serde::json::{serde_json, serde_json::json},
};
use serde::Serialize;

use crate::error::ErrorBody;
use crate::model::{
    api::{
        auth::{LoginRequest, RegisterRequest, AUTH_HEADER},
        student::{LoginResponse, RegisterResponse, StudentSummary},
    },
    db::Student,
    sqlite::Repo,
};

pub async fn post_json<'c, T: Serialize>(
    client: &'c Client,
    path: &'static str,
    body: &T,
) -> LocalResponse<'c> {
    client
        .post(path)
        .header(ContentType::JSON)
        .body(json!(body).to_string())
        .dispatch()
        .await
}

/// Register a student through the API, asserting success.
pub async fn register(client: &Client, request: &RegisterRequest) -> StudentSummary {
    let response = post_json(client, "/api/register", request).await;
    assert_eq!(Status::Created, response.status());
    let body: RegisterResponse =
        serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
    body.student
}

/// Log in as a registered student, returning their bearer token.
pub async fn login_token(client: &Client, request: &RegisterRequest) -> String {
    let response = post_json(client, "/api/login", &LoginRequest::for_registration(request)).await;
    assert_eq!(Status::Ok, response.status());
    let body: LoginResponse =
        serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
    body.token
}

/// Register a candidate and approve them directly in storage, as the
/// administration tool would.
pub async fn approved_candidate(
    client: &Client,
    students: &Repo<Student>,
    request: &RegisterRequest,
) -> StudentSummary {
    let candidate = register(client, request).await;
    students
        .set_approved(&candidate.registration_number, true)
        .await
        .unwrap();
    candidate
}

pub fn bearer(token: &str) -> Header<'static> {
    Header::new(AUTH_HEADER, format!("Bearer {token}"))
}

pub async fn error_of(response: LocalResponse<'_>) -> ErrorBody {
    serde_json::from_str(&response.into_string().await.unwrap()).unwrap()
}
