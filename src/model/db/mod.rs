//! Database row types and the queries over them.
//!
//! Each row type implements [`SqlTable`](crate::model::sqlite::SqlTable), and
//! its queries live on [`Repo<T>`](crate::model::sqlite::Repo) next to it.

pub mod student;
pub mod vote;

pub use student::{NewStudent, Student, StudentId};
pub use vote::{Vote, VoteId};
