use rocket::{
    http::Status,
    outcome::try_outcome,
    request::{FromRequest, Outcome},
    Request,
};

use crate::error::Error;
use crate::model::{db::Student, sqlite::Repo};

use super::token::{AuthFailure, AuthToken, TokenError};

/// The authenticated student making the request. A route taking a [`Student`]
/// never runs unless the bearer token is valid and names an existing student.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for Student {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let token = try_outcome!(req.guard::<AuthToken>().await);

        // Infallible guard.
        let students = req.guard::<Repo<Student>>().await.unwrap();
        match students.find_by_id(token.id).await {
            Ok(Some(student)) => Outcome::Success(student),
            Ok(None) => AuthFailure::fail(req, TokenError::UnknownSubject),
            Err(e) => Outcome::Error((Status::InternalServerError, e)),
        }
    }
}
