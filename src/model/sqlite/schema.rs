use sqlx::{Error as DbError, SqlitePool};

const STUDENTS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS students (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name           VARCHAR(100) NOT NULL,
    email_or_phone      VARCHAR(100) NOT NULL,
    registration_number VARCHAR(50)  NOT NULL UNIQUE,
    password_hash       VARCHAR(128) NOT NULL,
    school              VARCHAR(100),
    is_candidate        BOOLEAN      NOT NULL DEFAULT FALSE,
    is_approved         BOOLEAN      NOT NULL DEFAULT FALSE
)";

const VOTES_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS votes (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    voter_id     INTEGER NOT NULL REFERENCES students (id),
    candidate_id INTEGER NOT NULL REFERENCES students (id),
    timestamp    DATETIME NOT NULL
)";

// One vote per voter, even when two casts race past the pre-check.
const VOTER_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS votes_voter_id ON votes (voter_id)";

const CANDIDATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS votes_candidate_id ON votes (candidate_id)";

/// Ensure that all the required tables and indexes exist on the given database.
///
/// This operation is idempotent.
pub async fn ensure_schema_exists(pool: &SqlitePool) -> Result<(), DbError> {
    debug!("Ensuring tables and indexes exist");

    let mut tx = pool.begin().await?;
    for statement in [STUDENTS_TABLE, VOTES_TABLE, VOTER_INDEX, CANDIDATE_INDEX] {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await
}
