use rocket::{http::Status, response::status::Custom, serde::json::Json, Route, State};

use crate::{
    config::Config,
    error::{Error, Result},
    model::{
        api::{
            auth::{AuthToken, LoginRequest, RegisterRequest, StudentRegistration},
            student::{LoginResponse, RegisterResponse, StudentProfile},
        },
        db::Student,
        sqlite::Repo,
    },
};

pub fn routes() -> Vec<Route> {
    routes![register, login, me]
}

/// Bodies that fail to parse are treated like empty ones, so the client is
/// told which fields are missing rather than that the JSON was bad.
#[post("/register", data = "<request>")]
async fn register(
    request: Option<Json<RegisterRequest>>,
    students: Repo<Student>,
) -> Result<Custom<Json<RegisterResponse>>> {
    let registration: StudentRegistration = request
        .map(|json| json.into_inner())
        .unwrap_or_default()
        .try_into()?;

    let student = students.register(registration).await?;

    Ok(Custom(
        Status::Created,
        Json(RegisterResponse {
            message: "Registration successful".to_string(),
            student: student.into(),
        }),
    ))
}

#[post("/login", data = "<request>")]
async fn login(
    request: Option<Json<LoginRequest>>,
    students: Repo<Student>,
    config: &State<Config>,
) -> Result<Json<LoginResponse>> {
    let request = request.map(|json| json.into_inner()).unwrap_or_default();
    let (registration_number, password) = request
        .credentials()
        .ok_or(Error::MissingField("Missing credentials"))?;

    let student = students
        .authenticate(registration_number, password)
        .await?;
    let token = AuthToken::new(student.id).issue(config)?;

    Ok(Json(LoginResponse {
        token,
        student: student.into(),
    }))
}

#[get("/me")]
fn me(student: Student) -> Json<StudentProfile> {
    Json(student.into())
}
