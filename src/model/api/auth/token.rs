use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{
    errors::{Error as JwtError, ErrorKind as JwtErrorKind},
    Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request, State,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::db::StudentId;

pub const AUTH_HEADER: &str = "Authorization";

/// An authentication token representing a specific student. The token is the
/// whole session: nothing is stored server-side, so it cannot be revoked
/// before it expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthToken {
    pub id: StudentId,
}

impl AuthToken {
    /// Create a new [`AuthToken`] for the given student.
    pub fn new(id: StudentId) -> Self {
        Self { id }
    }

    /// Sign this token, valid from now for the configured lifetime.
    pub fn issue(self, config: &Config) -> Result<String> {
        self.issue_at(Utc::now(), config)
    }

    /// Sign this token as if it had been issued at the given time.
    pub fn issue_at(self, issued_at: DateTime<Utc>, config: &Config) -> Result<String> {
        let claims = Claims {
            subject: self.id.to_string(),
            issued_at,
            expire_at: issued_at + config.auth_ttl(),
        };

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )?;
        Ok(token)
    }

    /// Check the signature and expiry of a token and recover the student ID.
    pub fn verify(token: &str, config: &Config) -> std::result::Result<Self, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact to the second.
        validation.leeway = 0;

        let claims = jsonwebtoken::decode(
            token,
            &DecodingKey::from_secret(config.jwt_secret()),
            &validation,
        )
        .map(|data: TokenData<Claims>| data.claims)?;

        let id = claims
            .subject
            .parse::<StudentId>()
            .map_err(|_| TokenError::Malformed)?;
        Ok(Self::new(id))
    }
}

/// Token claims: the subject plus issue and expiry datetimes.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(rename = "sub")]
    subject: String,
    #[serde(rename = "iat", with = "ts_seconds")]
    issued_at: DateTime<Utc>,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

/// Why a request failed to authenticate. Callers only ever see one of two
/// messages; the distinction is kept for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("no bearer token was supplied")]
    Missing,
    #[error("the token could not be decoded")]
    Malformed,
    #[error("the token has expired")]
    Expired,
    #[error("the token signature does not match")]
    BadSignature,
    #[error("the token subject does not exist")]
    UnknownSubject,
}

impl TokenError {
    /// The message reported to the client.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Missing => "Token is missing",
            _ => "Token is invalid",
        }
    }
}

impl From<JwtError> for TokenError {
    fn from(err: JwtError) -> Self {
        match err.into_kind() {
            JwtErrorKind::ExpiredSignature => Self::Expired,
            JwtErrorKind::InvalidSignature => Self::BadSignature,
            _ => Self::Malformed,
        }
    }
}

/// The reason the last authentication attempt on a request failed, if any.
/// Stored in the request-local cache so the `401` catcher can report it.
#[derive(Debug, Clone, Copy)]
pub struct AuthFailure(pub Option<TokenError>);

impl AuthFailure {
    /// Record a failure and build the matching guard outcome.
    pub fn fail<T>(req: &Request<'_>, kind: TokenError) -> Outcome<T, Error> {
        req.local_cache(|| AuthFailure(Some(kind)));
        warn!("Rejected bearer token: {kind}");
        Outcome::Error((Status::Unauthorized, Error::InvalidToken(kind)))
    }

    /// The recorded failure for this request, if any.
    pub fn of(req: &Request<'_>) -> Option<TokenError> {
        req.local_cache(|| AuthFailure(None)).0
    }
}

/// Extract the raw token from an `Authorization` header: the second
/// whitespace-separated segment, whatever the scheme name.
pub fn bearer_token(header: &str) -> Option<&str> {
    header.split_whitespace().nth(1)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthToken {
    type Error = Error;

    /// Get an [`AuthToken`] from the `Authorization` header and verify it.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        // Unwrap is safe as `Config` is always managed.
        let config = req.guard::<&State<Config>>().await.unwrap();

        let token = match req.headers().get_one(AUTH_HEADER).and_then(bearer_token) {
            Some(token) => token,
            None => return AuthFailure::fail(req, TokenError::Missing),
        };

        match Self::verify(token, config) {
            Ok(token) => Outcome::Success(token),
            Err(kind) => AuthFailure::fail(req, kind),
        }
    }
}
