mod password;
mod request;
mod token;
mod user;

pub use password::{check_password_policy, MIN_PASSWORD_LENGTH};
pub use request::{LoginRequest, RegisterRequest, StudentRegistration};
pub use token::{bearer_token, AuthFailure, AuthToken, TokenError, AUTH_HEADER};
