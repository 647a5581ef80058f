//! Client for the skill-sharing talk board.

pub mod client;

pub use client::{Comment, GlossaryEntry, PollResult, SdkError, SkillShareClient, Talk};
