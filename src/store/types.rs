//! Resource types shared by the stores and the HTTP layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A comment attached to a talk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub message: String,
}

/// A proposed talk. Comments keep their append order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Talk {
    pub title: String,
    pub presenter: String,
    pub summary: String,
    pub comments: Vec<Comment>,
}

/// Body of `PUT /talks/{title}`. The title comes from the path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TalkProposal {
    pub presenter: String,
    pub summary: String,
}

impl TalkProposal {
    /// Build a fresh talk with no comments.
    pub fn into_talk(self, title: &str) -> Talk {
        Talk {
            title: title.to_string(),
            presenter: self.presenter,
            summary: self.summary,
            comments: Vec::new(),
        }
    }
}

/// A glossary entry, also the body of `PUT /glossary/{wordPair}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryEntry {
    pub word_pair: String,
    pub local: String,
    pub foreign: String,
}

/// Talks as of one version of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TalkSnapshot {
    pub version: u64,
    pub talks: Arc<[Talk]>,
}
