//! Top-level run: plan the objective, then work through its goals in order.
//!
//! Each goal gets an action. `investigate` stores the goal's investigation
//! result in the run's knowledge store, `feature` and `report` write a
//! document from that knowledge, and any other action skips the goal. Goal
//! order is trusted to put every investigation before the documents that need
//! it; nothing checks the dependency order up front.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::agents::AgentContext;
use crate::agents::action::select_action;
use crate::agents::goals::extract_goals;
use crate::agents::planner::{PlannedObjective, plan};
use crate::core::knowledge::KnowledgeStore;
use crate::core::language::Language;
use crate::core::retry::RetryPolicy;
use crate::core::types::Action;
use crate::investigate::investigate;
use crate::io::config::BranConfig;
use crate::io::corpus::{RuleSentencizer, load_corpus};
use crate::io::model::ChatModel;
use crate::io::prompt::PromptEngine;
use crate::write::{Brief, write_document};

/// Settings fixed for the life of one orchestrator.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub language: Language,
    pub retry: RetryPolicy,
    /// Fail when the planner reply has no recognizable field.
    pub strict_plan: bool,
    /// Directory receiving `{title}.md` documents.
    pub output_dir: PathBuf,
}

impl RunSettings {
    pub fn new(language: Language, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            language,
            retry: RetryPolicy::default(),
            strict_plan: false,
            output_dir: output_dir.into(),
        }
    }

    pub fn from_config(cfg: &BranConfig, language: Language) -> Self {
        Self {
            language,
            retry: cfg.retry.policy(),
            strict_plan: cfg.strict_plan,
            output_dir: cfg.output_dir.clone(),
        }
    }
}

/// Why a goal produced neither knowledge nor a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The action has no handler.
    UnrecognizedAction,
    /// The goal was already investigated earlier in this run.
    AlreadyInvestigated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedGoal {
    pub goal: String,
    pub action: String,
    pub reason: SkipReason,
}

/// Everything one `execute` call produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub planned: PlannedObjective,
    pub goals: Vec<String>,
    pub knowledge: KnowledgeStore,
    /// Written documents, in goal order. Documents whose structure had no
    /// sections are not listed.
    pub documents: Vec<PathBuf>,
    pub skipped: Vec<SkippedGoal>,
}

/// Drives objectives through planning, investigation and writing.
///
/// Holds only immutable collaborators; the knowledge store and the chunk
/// iterator live inside a single `execute` call.
pub struct Orchestrator<M> {
    model: M,
    prompts: PromptEngine,
    chunks: Vec<String>,
    settings: RunSettings,
}

impl<M: ChatModel> Orchestrator<M> {
    pub fn new(model: M, chunks: Vec<String>, settings: RunSettings) -> Self {
        Self {
            model,
            prompts: PromptEngine::new(),
            chunks,
            settings,
        }
    }

    /// Build from configuration, loading the corpus before any goal is processed.
    pub fn from_config(model: M, cfg: &BranConfig, language: Language) -> Result<Self> {
        let data_path = cfg
            .corpus
            .data_path
            .as_deref()
            .context("corpus.data_path is not set (DATA_PATH)")?;
        let chunks = load_corpus(
            data_path,
            language,
            &RuleSentencizer,
            cfg.corpus.sentences_per_chunk,
        )?;
        Ok(Self::new(
            model,
            chunks,
            RunSettings::from_config(cfg, language),
        ))
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn output_dir(&self) -> &Path {
        &self.settings.output_dir
    }

    /// Run one objective to completion.
    #[instrument(skip_all, fields(language = %self.settings.language))]
    pub fn execute(&self, objective: &str) -> Result<RunOutcome> {
        let agents = AgentContext::new(&self.model, &self.prompts, self.settings.language)
            .with_retry(self.settings.retry);

        let planned = plan(&agents, objective, self.settings.strict_plan)?;
        let goals = extract_goals(&agents, &planned.text)?;

        let mut knowledge = KnowledgeStore::new();
        let mut documents = Vec::new();
        let mut skipped = Vec::new();

        for goal in &goals {
            info!(goal = %goal, "considering goal");
            let decision = select_action(&agents, &planned.text, goal)?;
            match decision.action {
                Action::Investigate if knowledge.contains(goal) => {
                    warn!(goal = %goal, "goal already investigated, skipping");
                    skipped.push(SkippedGoal {
                        goal: goal.clone(),
                        action: Action::Investigate.as_str().to_string(),
                        reason: SkipReason::AlreadyInvestigated,
                    });
                }
                Action::Investigate => {
                    let result = investigate(&agents, goal, &self.chunks)
                        .with_context(|| format!("investigate {goal:?}"))?;
                    knowledge.insert(goal.as_str(), result)?;
                }
                Action::Feature | Action::Report => {
                    let brief = Brief {
                        objective,
                        plan: &planned.text,
                        goal,
                    };
                    let written =
                        write_document(&agents, &brief, &knowledge, &self.settings.output_dir)
                            .with_context(|| format!("write document for {goal:?}"))?;
                    documents.extend(written);
                }
                Action::Unrecognized(action) => {
                    info!(goal = %goal, action = %action, "no handler for action, skipping");
                    skipped.push(SkippedGoal {
                        goal: goal.clone(),
                        action,
                        reason: SkipReason::UnrecognizedAction,
                    });
                }
            }
        }

        let snapshot =
            serde_json::to_string_pretty(&knowledge).context("serialize knowledge snapshot")?;
        debug!(knowledge = %snapshot, "knowledge snapshot");
        info!(
            goals = goals.len(),
            investigated = knowledge.len(),
            documents = documents.len(),
            skipped = skipped.len(),
            "run complete"
        );

        Ok(RunOutcome {
            planned,
            goals,
            knowledge,
            documents,
            skipped,
        })
    }
}
