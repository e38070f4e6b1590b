//! Goal extractor: the ordered list of goals the orchestrator works through.

use std::sync::LazyLock;

use anyhow::Result;
use minijinja::context;
use tracing::info;

use crate::core::types::GoalList;
use crate::io::model::ChatModel;
use crate::io::prompt::Template;

use super::contract::ResponseSchema;
use super::{AgentContext, embedded_schema};

static GOAL_LIST_SCHEMA: LazyLock<ResponseSchema> = LazyLock::new(|| {
    embedded_schema(
        "goal_list",
        include_str!("../../schemas/goal_list.schema.json"),
    )
});

/// Extract goals from the planner's reply, in processing order.
pub fn extract_goals<M: ChatModel + ?Sized>(
    ctx: &AgentContext<'_, M>,
    plan_text: &str,
) -> Result<Vec<String>> {
    let goals: GoalList = ctx.ask_json(
        "goal list",
        Template::GoalList,
        &GOAL_LIST_SCHEMA,
        context! {
            context => plan_text,
            language => ctx.language(),
        },
    )?;
    info!(count = goals.list.len(), "goals extracted");
    Ok(goals.list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::prompt::PromptEngine;
    use crate::test_support::{ScriptedModel, agent_context};

    #[test]
    fn keeps_reply_order_after_retrying() {
        let model = ScriptedModel::new([
            "{\"goals\": [\"a\"]}",
            "```json\n{\"list\": [\"gather facts\", \"write bio\"]}\n```",
        ]);
        let prompts = PromptEngine::new();

        let goals = extract_goals(&agent_context(&model, &prompts), "Plan text").expect("goals");

        assert_eq!(goals, vec!["gather facts", "write bio"]);
        assert_eq!(model.calls(), 2);
        assert!(model.prompts()[0].contains("Plan text"));
    }
}
