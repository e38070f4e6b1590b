//! Shared deterministic types for the orchestration core.
//!
//! These types define stable contracts between the model-backed components and
//! the orchestrator. They carry no I/O and decode straight from validated model
//! replies.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Structured plan parsed from the planner's semi-structured reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub project: String,
    pub reply: String,
    pub focus: String,
    /// Step index (1-based, as numbered by the model) to step text.
    pub steps: BTreeMap<u32, String>,
    pub summary: String,
}

impl Plan {
    /// True when the parser recognized no field at all.
    pub fn is_empty(&self) -> bool {
        self.project.is_empty()
            && self.reply.is_empty()
            && self.focus.is_empty()
            && self.steps.is_empty()
            && self.summary.is_empty()
    }
}

/// Next action chosen for a goal.
///
/// Known handlers get their own variant; anything else is kept verbatim so the
/// orchestrator can skip it explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Action {
    Investigate,
    Feature,
    Report,
    Unrecognized(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Investigate => "investigate",
            Action::Feature => "feature",
            Action::Report => "report",
            Action::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for Action {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "investigate" => Action::Investigate,
            "feature" => Action::Feature,
            "report" => Action::Report,
            _ => Action::Unrecognized(raw),
        }
    }
}

/// Action selector reply: what to do with a goal and why.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActionDecision {
    #[serde(rename = "response")]
    pub rationale: String,
    pub action: Action,
}

/// Research decision for the current piece. Only `"more"` widens the piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ResearchAction {
    More,
    Stop,
}

impl From<String> for ResearchAction {
    fn from(raw: String) -> Self {
        if raw == "more" {
            ResearchAction::More
        } else {
            ResearchAction::Stop
        }
    }
}

/// One research reply: a partial answer plus whether more context is wanted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResearchStep {
    pub draft: String,
    pub action: ResearchAction,
}

/// Goal extractor reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GoalList {
    pub list: Vec<String>,
}

/// Final synthesis reply for an investigation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InvestigationReply {
    pub result: String,
}

/// Title and ordered section titles of a document to write.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentStructure {
    pub title: String,
    pub sections: Vec<String>,
}

/// Knowledge keys a section needs before it can be written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SectionKnowledgeRequest {
    pub need_more_data: Vec<String>,
}

impl SectionKnowledgeRequest {
    /// Requested keys without repeats, in first-mention order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::with_capacity(self.need_more_data.len());
        for key in &self.need_more_data {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
        keys
    }
}
