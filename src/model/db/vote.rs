use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection};

use crate::error::{Error, Result};
use crate::model::{
    db::student::{Student, StudentId},
    sqlite::{is_unique_violation, Repo, SqlTable},
};

pub type VoteId = i64;

/// A vote from the database. Votes are never changed or deleted once cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Vote {
    pub id: VoteId,
    pub voter_id: StudentId,
    pub candidate_id: StudentId,
    pub timestamp: DateTime<Utc>,
}

impl SqlTable for Vote {
    const NAME: &'static str = "votes";
}

impl Repo<Vote> {
    /// Cast the voter's one vote for the given candidate.
    ///
    /// The checks and the insert run under SQLite's write lock, taken before
    /// the first read, so concurrent casts queue on the busy timeout instead
    /// of failing. The unique index on `voter_id` still rejects any second
    /// vote that bypasses this path.
    pub async fn cast(&self, voter_id: StudentId, candidate_id: StudentId) -> Result<Vote> {
        let mut conn = self.acquire().await?;

        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
        match cast_locked(&mut conn, voter_id, candidate_id).await {
            Ok(vote) => {
                if let Err(err) = sqlx::query("COMMIT").execute(&mut *conn).await {
                    // Never hand a connection back to the pool mid-transaction.
                    let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                    return Err(err.into());
                }
                info!("Student {voter_id} voted for candidate {candidate_id}");
                Ok(vote)
            }
            Err(err) => {
                if let Err(rollback_err) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                    error!("Failed to roll back vote by student {voter_id}: {rollback_err}");
                }
                Err(err)
            }
        }
    }

    /// Has this student already cast their vote?
    pub async fn has_voted(&self, voter_id: StudentId) -> Result<bool> {
        let mut conn = self.acquire().await?;
        has_voted(&mut conn, voter_id).await
    }

    /// The vote cast by this student, if any.
    pub async fn find_by_voter(&self, voter_id: StudentId) -> Result<Option<Vote>> {
        let sql = format!("SELECT * FROM {} WHERE voter_id = ?", self.table());
        let vote = sqlx::query_as::<_, Vote>(&sql)
            .bind(voter_id)
            .fetch_optional(&**self)
            .await?;
        Ok(vote)
    }

    /// How many votes the given candidate has received.
    pub async fn count_for(&self, candidate_id: StudentId) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE candidate_id = ?",
            self.table()
        );
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(candidate_id)
            .fetch_one(&**self)
            .await?;
        Ok(count)
    }
}

/// The body of [`Repo::<Vote>::cast`], run inside an immediate transaction.
async fn cast_locked(
    conn: &mut SqliteConnection,
    voter_id: StudentId,
    candidate_id: StudentId,
) -> Result<Vote> {
    if has_voted(conn, voter_id).await? {
        return Err(Error::AlreadyVoted);
    }

    let candidate = find_student(conn, candidate_id).await?;
    if !candidate.as_ref().map_or(false, Student::is_votable) {
        return Err(Error::InvalidCandidate);
    }

    let sql = format!(
        "INSERT INTO {} (voter_id, candidate_id, timestamp) VALUES (?, ?, ?)",
        Vote::NAME
    );
    let inserted = sqlx::query(&sql)
        .bind(voter_id)
        .bind(candidate_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await;
    let vote_id = match inserted {
        Ok(done) => done.last_insert_rowid(),
        Err(err) if is_unique_violation(&err) => return Err(Error::AlreadyVoted),
        Err(err) => return Err(err.into()),
    };

    let sql = format!("SELECT * FROM {} WHERE id = ?", Vote::NAME);
    let vote = sqlx::query_as::<_, Vote>(&sql)
        .bind(vote_id)
        .fetch_one(conn)
        .await?;
    Ok(vote)
}

async fn has_voted(conn: &mut SqliteConnection, voter_id: StudentId) -> Result<bool> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE voter_id = ?", Vote::NAME);
    let count = sqlx::query_scalar::<_, i64>(&sql)
        .bind(voter_id)
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

async fn find_student(conn: &mut SqliteConnection, id: StudentId) -> Result<Option<Student>> {
    let sql = format!("SELECT * FROM {} WHERE id = ?", Student::NAME);
    let student = sqlx::query_as::<_, Student>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(student)
}
