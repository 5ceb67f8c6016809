use rocket::{http::Status, serde::json::Json, Catcher, Request, Route};

use crate::error::ErrorBody;
use crate::model::api::auth::{AuthFailure, TokenError};

mod auth;
mod voting;

#[cfg(test)]
mod testing;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(auth::routes());
    routes.extend(voting::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![bad_request, unauthorized, not_found, unprocessable, fallback]
}

#[catch(400)]
fn bad_request() -> Json<ErrorBody> {
    Json(ErrorBody::new("Bad request"))
}

/// Authentication guards record why they failed before handing over to here.
#[catch(401)]
fn unauthorized(req: &Request) -> Json<ErrorBody> {
    let reason = AuthFailure::of(req).unwrap_or(TokenError::Missing);
    Json(ErrorBody::new(reason.message()))
}

#[catch(404)]
fn not_found() -> Json<ErrorBody> {
    Json(ErrorBody::new("Not found"))
}

#[catch(422)]
fn unprocessable() -> Json<ErrorBody> {
    Json(ErrorBody::new("Unprocessable request"))
}

#[catch(default)]
fn fallback(status: Status, _req: &Request) -> Json<ErrorBody> {
    let reason = status.reason().unwrap_or("Unknown error");
    Json(ErrorBody::new(reason))
}
