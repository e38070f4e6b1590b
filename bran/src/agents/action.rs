//! Action selector: what to do with one goal.

use std::sync::LazyLock;

use anyhow::Result;
use minijinja::context;
use tracing::{info, instrument};

use crate::core::types::ActionDecision;
use crate::io::model::ChatModel;
use crate::io::prompt::Template;

use super::contract::ResponseSchema;
use super::{AgentContext, embedded_schema};

static ACTION_SCHEMA: LazyLock<ResponseSchema> = LazyLock::new(|| {
    embedded_schema(
        "action_decision",
        include_str!("../../schemas/action_decision.schema.json"),
    )
});

/// Choose the next action for `goal`. The action string is not checked against
/// known handlers here.
#[instrument(skip_all, fields(goal = %goal))]
pub fn select_action<M: ChatModel + ?Sized>(
    ctx: &AgentContext<'_, M>,
    plan_text: &str,
    goal: &str,
) -> Result<ActionDecision> {
    let decision: ActionDecision = ctx.ask_json(
        "action",
        Template::Action,
        &ACTION_SCHEMA,
        context! {
            step_by_step_plan => plan_text,
            current_item => goal,
            language => ctx.language(),
        },
    )?;
    info!(
        action = decision.action.as_str(),
        rationale = %decision.rationale,
        "action selected"
    );
    Ok(decision)
}
