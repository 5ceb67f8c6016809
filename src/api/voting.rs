use rocket::{http::Status, response::status::Custom, serde::json::Json, Route};

use crate::error::{Error, Result};
use crate::model::{
    api::{
        student::CandidateDescription,
        vote::{Message, VoteRequest},
    },
    db::{Student, Vote},
    sqlite::Repo,
};

pub fn routes() -> Vec<Route> {
    routes![candidates, vote]
}

#[get("/candidates")]
async fn candidates(
    _student: Student,
    students: Repo<Student>,
) -> Result<Json<Vec<CandidateDescription>>> {
    let candidates = students
        .approved_candidates()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(candidates))
}

#[post("/vote", data = "<request>")]
async fn vote(
    voter: Student,
    request: Option<Json<VoteRequest>>,
    votes: Repo<Vote>,
) -> Result<Custom<Json<Message>>> {
    let candidate_id = request
        .and_then(|json| json.candidate())
        .ok_or(Error::MissingField("Missing candidate ID"))?;

    votes.cast(voter.id, candidate_id).await?;

    Ok(Custom(
        Status::Created,
        Json(Message::new("Vote recorded successfully")),
    ))
}
