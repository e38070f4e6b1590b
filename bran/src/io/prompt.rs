//! Prompt templates and rendering.
//!
//! Every model-backed component owns one embedded minijinja template. All
//! templates receive the run's `language`.

use anyhow::{Context, Result};
use minijinja::Environment;
use serde::Serialize;

const PLANNER_TEMPLATE: &str = include_str!("prompts/planner.md");
const GOAL_LIST_TEMPLATE: &str = include_str!("prompts/goal_list.md");
const ACTION_TEMPLATE: &str = include_str!("prompts/action.md");
const RESEARCH_TEMPLATE: &str = include_str!("prompts/research.md");
const SUMMARY_TEMPLATE: &str = include_str!("prompts/summary.md");
const INVESTIGATION_TEMPLATE: &str = include_str!("prompts/investigation.md");
const STRUCTURE_TEMPLATE: &str = include_str!("prompts/structure.md");
const KNOWLEDGE_TEMPLATE: &str = include_str!("prompts/knowledge.md");
const SECTION_TEMPLATE: &str = include_str!("prompts/section.md");

/// Identifies one embedded prompt template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Planner,
    GoalList,
    Action,
    Research,
    Summary,
    Investigation,
    Structure,
    Knowledge,
    Section,
}

impl Template {
    pub const ALL: [Template; 9] = [
        Template::Planner,
        Template::GoalList,
        Template::Action,
        Template::Research,
        Template::Summary,
        Template::Investigation,
        Template::Structure,
        Template::Knowledge,
        Template::Section,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Template::Planner => "planner",
            Template::GoalList => "goal_list",
            Template::Action => "action",
            Template::Research => "research",
            Template::Summary => "summary",
            Template::Investigation => "investigation",
            Template::Structure => "structure",
            Template::Knowledge => "knowledge",
            Template::Section => "section",
        }
    }

    fn source(&self) -> &'static str {
        match self {
            Template::Planner => PLANNER_TEMPLATE,
            Template::GoalList => GOAL_LIST_TEMPLATE,
            Template::Action => ACTION_TEMPLATE,
            Template::Research => RESEARCH_TEMPLATE,
            Template::Summary => SUMMARY_TEMPLATE,
            Template::Investigation => INVESTIGATION_TEMPLATE,
            Template::Structure => STRUCTURE_TEMPLATE,
            Template::Knowledge => KNOWLEDGE_TEMPLATE,
            Template::Section => SECTION_TEMPLATE,
        }
    }
}

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        for template in Template::ALL {
            env.add_template(template.name(), template.source())
                .expect("embedded prompt templates should be valid");
        }
        Self { env }
    }

    /// Render `template` with `ctx` (built with `minijinja::context!`).
    pub fn render<S: Serialize>(&self, template: Template, ctx: S) -> Result<String> {
        let rendered = self
            .env
            .get_template(template.name())?
            .render(ctx)
            .with_context(|| format!("render {} prompt", template.name()))?;
        Ok(rendered.trim().to_string())
    }
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::new()
    }
}
