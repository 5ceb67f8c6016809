mod errors;
mod repo;
mod schema;

pub use errors::is_unique_violation;
pub use repo::{Db, Repo, SqlTable};
pub use schema::ensure_schema_exists;
