//! Research, summary and synthesis calls behind the investigation loop.

use std::sync::LazyLock;

use anyhow::Result;
use minijinja::context;

use crate::core::types::{InvestigationReply, ResearchStep};
use crate::investigate::ResearchSteps;
use crate::io::model::ChatModel;
use crate::io::prompt::Template;

use super::contract::ResponseSchema;
use super::{AgentContext, embedded_schema};

static RESEARCH_SCHEMA: LazyLock<ResponseSchema> = LazyLock::new(|| {
    embedded_schema(
        "research_step",
        include_str!("../../schemas/research_step.schema.json"),
    )
});

static INVESTIGATION_SCHEMA: LazyLock<ResponseSchema> = LazyLock::new(|| {
    embedded_schema(
        "investigation",
        include_str!("../../schemas/investigation.schema.json"),
    )
});

impl<M: ChatModel + ?Sized> ResearchSteps for AgentContext<'_, M> {
    fn research(&self, goal: &str, context: &str, piece: &str) -> Result<ResearchStep> {
        self.ask_json(
            "research",
            Template::Research,
            &RESEARCH_SCHEMA,
            context! {
                goal => goal,
                context => context,
                piece => piece,
                language => self.language(),
            },
        )
    }

    fn summarize(&self, summary: &str, new_lines: &str) -> Result<String> {
        self.ask_plain(
            "summary",
            Template::Summary,
            context! {
                summary => summary,
                new_lines => new_lines,
                language => self.language(),
            },
        )
    }

    fn synthesize(&self, goal: &str, notes: &str) -> Result<String> {
        let reply: InvestigationReply = self.ask_json(
            "investigation",
            Template::Investigation,
            &INVESTIGATION_SCHEMA,
            context! {
                goal => goal,
                context => notes,
                language => self.language(),
            },
        )?;
        Ok(reply.result)
    }
}
