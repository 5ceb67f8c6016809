use serde::{Deserialize, Serialize};

use crate::model::db::{Student, StudentId};

/// The short description of a student returned on registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: StudentId,
    pub full_name: String,
    pub registration_number: String,
}

impl From<Student> for StudentSummary {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            full_name: student.full_name,
            registration_number: student.registration_number,
        }
    }
}

/// A student's view of themselves, returned on login and by `/api/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub id: StudentId,
    pub full_name: String,
    pub registration_number: String,
    pub is_candidate: bool,
}

impl From<Student> for StudentProfile {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            full_name: student.full_name,
            registration_number: student.registration_number,
            is_candidate: student.is_candidate,
        }
    }
}

/// A votable candidate, as listed to voters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDescription {
    pub id: StudentId,
    pub full_name: String,
    pub registration_number: String,
    pub school: Option<String>,
}

impl From<Student> for CandidateDescription {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            full_name: student.full_name,
            registration_number: student.registration_number,
            school: student.school,
        }
    }
}

/// Response to a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub student: StudentSummary,
}

/// Response to a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub student: StudentProfile,
}
