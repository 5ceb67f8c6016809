use argon2::Error as Argon2Error;
use jsonwebtoken::errors::Error as JwtError;
use rocket::{
    http::{Status, StatusClass},
    response::{self, Responder},
    serde::json::Json,
    Request,
};
use serde::{Deserialize, Serialize};
use sqlx::Error as DbError;
use thiserror::Error;

use crate::logging::RequestId;
use crate::model::api::auth::TokenError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    MissingField(&'static str),
    #[error("Registration number already exists")]
    DuplicateRegistration,
    #[error("Password does not meet requirements")]
    WeakPassword(Vec<String>),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{}", .0.message())]
    InvalidToken(#[from] TokenError),
    #[error("You have already voted")]
    AlreadyVoted,
    #[error("Invalid candidate")]
    InvalidCandidate,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Argon2(#[from] Argon2Error),
}

impl Error {
    /// A missing-resource error for the described resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::MissingField(_)
            | Self::DuplicateRegistration
            | Self::WeakPassword(_)
            | Self::AlreadyVoted
            | Self::InvalidCandidate => Status::BadRequest,
            Self::InvalidCredentials | Self::InvalidToken(_) => Status::Unauthorized,
            Self::NotFound(_) => Status::NotFound,
            Self::Db(_) | Self::Jwt(_) | Self::Argon2(_) => Status::InternalServerError,
        }
    }

    /// The JSON body this error is reported with. Server faults are not
    /// described to the client.
    pub fn body(&self) -> ErrorBody {
        match self {
            Self::WeakPassword(details) => ErrorBody {
                error: self.to_string(),
                details: Some(details.clone()),
            },
            Self::Db(_) | Self::Jwt(_) | Self::Argon2(_) => {
                ErrorBody::new("Internal server error")
            }
            _ => ErrorBody::new(self.to_string()),
        }
    }
}

/// The JSON shape of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let id = RequestId::of(req);
        let status = self.status();
        if status.class() == StatusClass::ServerError {
            error!("req{id} failed: {self}");
        } else {
            warn!("req{id} rejected: {self:?}");
        }
        (status, Json(self.body())).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        for err in [
            Error::MissingField("Missing required fields"),
            Error::DuplicateRegistration,
            Error::WeakPassword(vec![]),
            Error::AlreadyVoted,
            Error::InvalidCandidate,
        ] {
            assert_eq!(err.status(), Status::BadRequest, "{err:?}");
        }
    }

    #[test]
    fn token_errors_collapse_to_unauthorized() {
        for kind in [
            TokenError::Malformed,
            TokenError::Expired,
            TokenError::BadSignature,
            TokenError::UnknownSubject,
        ] {
            let err = Error::from(kind);
            assert_eq!(err.status(), Status::Unauthorized);
            assert_eq!(err.body(), ErrorBody::new("Token is invalid"));
        }
        let missing = Error::from(TokenError::Missing);
        assert_eq!(missing.status(), Status::Unauthorized);
        assert_eq!(missing.body(), ErrorBody::new("Token is missing"));
    }

    #[test]
    fn weak_password_reports_details() {
        let err = Error::WeakPassword(vec!["too short".to_string()]);
        let body = err.body();
        assert_eq!(body.error, "Password does not meet requirements");
        assert_eq!(body.details, Some(vec!["too short".to_string()]));
    }

    #[test]
    fn server_faults_are_not_described() {
        let err = Error::Db(DbError::RowNotFound);
        assert_eq!(err.status(), Status::InternalServerError);
        assert_eq!(err.body(), ErrorBody::new("Internal server error"));
    }
}
