use argon2::Config as HashConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{Error, Result};
use crate::model::{
    api::auth::{check_password_policy, StudentRegistration},
    sqlite::{is_unique_violation, Repo, SqlTable},
};

pub type StudentId = i64;

/// A student from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: StudentId,
    pub full_name: String,
    pub email_or_phone: String,
    pub registration_number: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub school: Option<String>,
    pub is_candidate: bool,
    pub is_approved: bool,
}

impl Student {
    /// Check whether the given password is correct.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> Result<bool> {
        Ok(argon2::verify_encoded(&self.password_hash, password.as_ref())?)
    }

    /// Can this student currently receive votes?
    pub fn is_votable(&self) -> bool {
        self.is_candidate && self.is_approved
    }
}

/// A student without an ID, ready to insert. Only ever holds a password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub full_name: String,
    pub email_or_phone: String,
    pub registration_number: String,
    pub password_hash: String,
    pub school: String,
    pub is_candidate: bool,
}

impl NewStudent {
    /// Hash the registration's password, dropping the plaintext.
    pub fn hash(registration: StudentRegistration) -> Result<Self> {
        // 16 bytes is recommended for password hashing:
        //  https://en.wikipedia.org/wiki/Argon2
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let password_hash = argon2::hash_encoded(
            registration.password.as_bytes(),
            &salt,
            &HashConfig::default(),
        )?;
        Ok(Self {
            full_name: registration.full_name,
            email_or_phone: registration.email_or_phone,
            registration_number: registration.registration_number,
            password_hash,
            school: registration.school,
            is_candidate: registration.is_candidate,
        })
    }
}

impl SqlTable for Student {
    const NAME: &'static str = "students";
}

impl Repo<Student> {
    /// Register a new student. Rejects a registration number that is already
    /// taken, then a password that fails the complexity policy.
    pub async fn register(&self, registration: StudentRegistration) -> Result<Student> {
        if self
            .find_by_registration_number(&registration.registration_number)
            .await?
            .is_some()
        {
            return Err(Error::DuplicateRegistration);
        }

        let failures = check_password_policy(&registration.password);
        if !failures.is_empty() {
            return Err(Error::WeakPassword(failures));
        }

        let student = NewStudent::hash(registration)?;
        let sql = format!(
            "INSERT INTO {} (full_name, email_or_phone, registration_number, password_hash, school, is_candidate, is_approved) \
             VALUES (?, ?, ?, ?, ?, ?, FALSE)",
            self.table()
        );
        let inserted = sqlx::query(&sql)
            .bind(&student.full_name)
            .bind(&student.email_or_phone)
            .bind(&student.registration_number)
            .bind(&student.password_hash)
            .bind(&student.school)
            .bind(student.is_candidate)
            .execute(&**self)
            .await;

        // Another registration may have taken the number since the check above.
        let new_id = match inserted {
            Ok(done) => done.last_insert_rowid(),
            Err(err) if is_unique_violation(&err) => return Err(Error::DuplicateRegistration),
            Err(err) => return Err(err.into()),
        };

        info!(
            "Registered student {new_id} ({}){}",
            student.registration_number,
            if student.is_candidate { " as candidate" } else { "" }
        );
        self.get_by_id(new_id).await
    }

    /// Check a registration number and password. Unknown numbers and wrong
    /// passwords fail identically.
    pub async fn authenticate(&self, registration_number: &str, password: &str) -> Result<Student> {
        let student = self
            .find_by_registration_number(registration_number)
            .await?
            .ok_or(Error::InvalidCredentials)?;
        if student.verify_password(password)? {
            Ok(student)
        } else {
            Err(Error::InvalidCredentials)
        }
    }

    /// Get the student with the given ID.
    pub async fn get_by_id(&self, id: StudentId) -> Result<Student> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Student with ID '{id}'")))
    }

    pub async fn find_by_id(&self, id: StudentId) -> Result<Option<Student>> {
        let sql = format!("SELECT * FROM {} WHERE id = ?", self.table());
        let student = sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .fetch_optional(&**self)
            .await?;
        Ok(student)
    }

    pub async fn find_by_registration_number(
        &self,
        registration_number: &str,
    ) -> Result<Option<Student>> {
        let sql = format!(
            "SELECT * FROM {} WHERE registration_number = ?",
            self.table()
        );
        let student = sqlx::query_as::<_, Student>(&sql)
            .bind(registration_number)
            .fetch_optional(&**self)
            .await?;
        Ok(student)
    }

    /// All candidates that have been approved, in registration order.
    pub async fn approved_candidates(&self) -> Result<Vec<Student>> {
        self.candidates_with_approval(true).await
    }

    /// All candidates still awaiting approval, in registration order.
    pub async fn pending_candidates(&self) -> Result<Vec<Student>> {
        self.candidates_with_approval(false).await
    }

    async fn candidates_with_approval(&self, approved: bool) -> Result<Vec<Student>> {
        let sql = format!(
            "SELECT * FROM {} WHERE is_candidate = TRUE AND is_approved = ? ORDER BY id",
            self.table()
        );
        let candidates = sqlx::query_as::<_, Student>(&sql)
            .bind(approved)
            .fetch_all(&**self)
            .await?;
        Ok(candidates)
    }

    /// Approve or revoke a candidate. Only the administration tool does this;
    /// no API route can. Students who did not stand as candidates are not found.
    pub async fn set_approved(&self, registration_number: &str, approved: bool) -> Result<Student> {
        let sql = format!(
            "UPDATE {} SET is_approved = ? WHERE registration_number = ? AND is_candidate = TRUE",
            self.table()
        );
        let result = sqlx::query(&sql)
            .bind(approved)
            .bind(registration_number)
            .execute(&**self)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!(
                "Candidate with registration number '{registration_number}'"
            )));
        }

        info!(
            "Candidate {registration_number} {}",
            if approved { "approved" } else { "revoked" }
        );
        self.find_by_registration_number(registration_number)
            .await?
            .ok_or_else(|| Error::not_found(format!("Student '{registration_number}'")))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{api::auth::RegisterRequest, sqlite::Db};

    use super::*;

    async fn students() -> Repo<Student> {
        Repo::from_db(&Db::in_memory().await.unwrap())
    }

    fn registration(req: RegisterRequest) -> StudentRegistration {
        req.try_into().unwrap()
    }

    #[rocket::async_test]
    async fn register_stores_only_hash() {
        let students = students().await;
        let student = students
            .register(registration(RegisterRequest::example_voter()))
            .await
            .unwrap();

        assert_eq!(student.full_name, "Ada Obi");
        assert_eq!(student.school.as_deref(), Some("School of Computing"));
        assert!(!student.is_candidate);
        assert!(!student.is_approved);
        assert_ne!(student.password_hash, "Abcdef1!");
        assert!(student.password_hash.starts_with("$argon2"));
        assert!(student.verify_password("Abcdef1!").unwrap());
        assert!(!student.verify_password("Abcdef1?").unwrap());
    }

    #[rocket::async_test]
    async fn duplicate_registration_rejected() {
        let students = students().await;
        students
            .register(registration(RegisterRequest::example_voter()))
            .await
            .unwrap();

        let mut again = RegisterRequest::example_voter();
        again.full_name = Some("Someone Else".to_string());
        let err = students.register(registration(again)).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateRegistration));
    }

    #[rocket::async_test]
    async fn duplicate_checked_before_password() {
        let students = students().await;
        students
            .register(registration(RegisterRequest::example_voter()))
            .await
            .unwrap();

        let mut again = RegisterRequest::example_voter();
        again.password = Some("abc".to_string());
        let err = students.register(registration(again)).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateRegistration));
    }

    #[rocket::async_test]
    async fn weak_password_rejected() {
        let students = students().await;
        let mut req = RegisterRequest::example_voter();
        req.password = Some("abc".to_string());
        let err = students.register(registration(req)).await.unwrap_err();
        assert!(matches!(err, Error::WeakPassword(ref details) if details.len() == 4));

        // Nothing was stored.
        assert!(students
            .find_by_registration_number("2021/CS/0001")
            .await
            .unwrap()
            .is_none());
    }

    #[rocket::async_test]
    async fn authenticate_checks_password() {
        let students = students().await;
        let registered = students
            .register(registration(RegisterRequest::example_voter()))
            .await
            .unwrap();

        let student = students
            .authenticate("2021/CS/0001", "Abcdef1!")
            .await
            .unwrap();
        assert_eq!(student, registered);

        let wrong_password = students
            .authenticate("2021/CS/0001", "Abcdef1?")
            .await
            .unwrap_err();
        let unknown_number = students
            .authenticate("1999/XX/9999", "Abcdef1!")
            .await
            .unwrap_err();
        assert!(matches!(wrong_password, Error::InvalidCredentials));
        assert!(matches!(unknown_number, Error::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_number.to_string());
    }

    #[rocket::async_test]
    async fn get_by_id_not_found() {
        let students = students().await;
        let err = students.get_by_id(99).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[rocket::async_test]
    async fn only_approved_candidates_listed() {
        let students = students().await;
        students
            .register(registration(RegisterRequest::example_voter()))
            .await
            .unwrap();
        let first = students
            .register(registration(RegisterRequest::example_candidate()))
            .await
            .unwrap();
        let second = students
            .register(registration(RegisterRequest::example_candidate2()))
            .await
            .unwrap();

        // Candidates start unapproved.
        assert!(students.approved_candidates().await.unwrap().is_empty());
        assert_eq!(students.pending_candidates().await.unwrap().len(), 2);

        students
            .set_approved(&second.registration_number, true)
            .await
            .unwrap();
        students
            .set_approved(&first.registration_number, true)
            .await
            .unwrap();
        let approved = students.approved_candidates().await.unwrap();
        let ids = approved.iter().map(|s| s.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![first.id, second.id]);
        assert!(approved.iter().all(Student::is_votable));

        students
            .set_approved(&first.registration_number, false)
            .await
            .unwrap();
        let approved = students.approved_candidates().await.unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, second.id);
    }

    #[rocket::async_test]
    async fn non_candidates_cannot_be_approved() {
        let students = students().await;
        students
            .register(registration(RegisterRequest::example_voter()))
            .await
            .unwrap();
        let err = students
            .set_approved("2021/CS/0001", true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(students.approved_candidates().await.unwrap().is_empty());
    }
}
