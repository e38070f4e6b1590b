//! Planner: turns an objective into the plan every later prompt is based on.

use anyhow::Result;
use minijinja::context;
use tracing::{info, instrument};

use crate::core::plan_parser::{parse_plan, parse_plan_strict};
use crate::core::types::Plan;
use crate::io::model::ChatModel;
use crate::io::prompt::Template;

use super::AgentContext;

/// Planner reply kept verbatim alongside its parsed form.
///
/// Later prompts receive `text`; `plan` is the structured view of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedObjective {
    pub text: String,
    pub plan: Plan,
}

/// Ask for a plan. Any reply is accepted; `strict` rejects one with no recognized field.
#[instrument(skip_all, fields(strict = strict))]
pub fn plan<M: ChatModel + ?Sized>(
    ctx: &AgentContext<'_, M>,
    objective: &str,
    strict: bool,
) -> Result<PlannedObjective> {
    let text = ctx.ask_raw(
        "planner",
        Template::Planner,
        context! {
            prompt => objective,
            language => ctx.language(),
        },
    )?;
    let plan = if strict {
        parse_plan_strict(&text)?
    } else {
        parse_plan(&text)
    };
    info!(
        project = %plan.project,
        focus = %plan.focus,
        steps = plan.steps.len(),
        "plan ready"
    );
    if !plan.reply.is_empty() {
        info!(reply = %plan.reply, "planner reply");
    }
    Ok(PlannedObjective { text, plan })
}
