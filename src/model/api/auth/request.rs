use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A registration request, as received from a client. Every field is optional
/// here so that absent fields are reported as such rather than as a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: Option<String>,
    pub email_or_phone: Option<String>,
    pub registration_number: Option<String>,
    pub password: Option<String>,
    pub school: Option<String>,
    pub is_candidate: Option<bool>,
}

/// A registration with all required fields present. The password is still in
/// plaintext; it is checked and hashed by the student store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRegistration {
    pub full_name: String,
    pub email_or_phone: String,
    pub registration_number: String,
    pub password: String,
    pub school: String,
    pub is_candidate: bool,
}

impl TryFrom<RegisterRequest> for StudentRegistration {
    type Error = Error;

    fn try_from(req: RegisterRequest) -> Result<Self, Self::Error> {
        match (
            req.full_name,
            req.email_or_phone,
            req.registration_number,
            req.password,
        ) {
            (Some(full_name), Some(email_or_phone), Some(registration_number), Some(password)) => {
                Ok(Self {
                    full_name,
                    email_or_phone,
                    registration_number,
                    password,
                    school: req.school.unwrap_or_default(),
                    is_candidate: req.is_candidate.unwrap_or(false),
                })
            }
            _ => Err(Error::MissingField("Missing required fields")),
        }
    }
}

/// Login credentials, as received from a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub registration_number: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// The registration number and password, if both are present and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let registration_number = self.registration_number.as_deref().filter(|s| !s.is_empty())?;
        let password = self.password.as_deref().filter(|s| !s.is_empty())?;
        Some((registration_number, password))
    }
}
