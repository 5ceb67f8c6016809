use serde::{Deserialize, Serialize};

use crate::model::db::StudentId;

/// A request to vote, as received from a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub candidate_id: Option<StudentId>,
}

impl VoteRequest {
    /// The requested candidate. Zero is treated as absent.
    pub fn candidate(&self) -> Option<StudentId> {
        self.candidate_id.filter(|id| *id != 0)
    }
}

/// A plain confirmation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_candidate_is_missing() {
        assert_eq!(VoteRequest { candidate_id: Some(4) }.candidate(), Some(4));
        assert_eq!(VoteRequest { candidate_id: Some(0) }.candidate(), None);
        assert_eq!(VoteRequest::default().candidate(), None);
    }
}
