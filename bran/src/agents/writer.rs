//! Writer calls: document structure, section dependencies and section text.

use std::sync::LazyLock;

use anyhow::Result;
use minijinja::context;

use crate::core::types::{DocumentStructure, SectionKnowledgeRequest};
use crate::io::model::ChatModel;
use crate::io::prompt::Template;
use crate::write::{Brief, DocumentSteps};

use super::contract::ResponseSchema;
use super::{AgentContext, embedded_schema};

static STRUCTURE_SCHEMA: LazyLock<ResponseSchema> = LazyLock::new(|| {
    embedded_schema(
        "document_structure",
        include_str!("../../schemas/document_structure.schema.json"),
    )
});

static KNOWLEDGE_SCHEMA: LazyLock<ResponseSchema> = LazyLock::new(|| {
    embedded_schema(
        "section_knowledge",
        include_str!("../../schemas/section_knowledge.schema.json"),
    )
});

impl<M: ChatModel + ?Sized> DocumentSteps for AgentContext<'_, M> {
    fn structure(&self, brief: &Brief<'_>) -> Result<DocumentStructure> {
        self.ask_json(
            "structure",
            Template::Structure,
            &STRUCTURE_SCHEMA,
            context! {
                objective => brief.objective,
                plan => brief.plan,
                step => brief.goal,
                language => self.language(),
            },
        )
    }

    fn required_knowledge(
        &self,
        brief: &Brief<'_>,
        keys: &[&str],
        section: &str,
    ) -> Result<SectionKnowledgeRequest> {
        self.ask_json(
            "section knowledge",
            Template::Knowledge,
            &KNOWLEDGE_SCHEMA,
            context! {
                objective => brief.objective,
                plan => brief.plan,
                step => brief.goal,
                section => section,
                knowledge_keys => keys,
                language => self.language(),
            },
        )
    }

    fn write_section(
        &self,
        brief: &Brief<'_>,
        section: &str,
        knowledge: &[&str],
    ) -> Result<String> {
        self.ask_text(
            "section",
            Template::Section,
            context! {
                objective => brief.objective,
                plan => brief.plan,
                step => brief.goal,
                section => section,
                knowledge => knowledge,
                language => self.language(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::prompt::PromptEngine;
    use crate::test_support::{ScriptedModel, agent_context};

    fn brief() -> Brief<'static> {
        Brief {
            objective: "write a one-page bio",
            plan: "Plan:\n- [ ] Step 1: gather facts",
            goal: "write bio",
        }
    }

    #[test]
    fn structure_needs_title_and_sections() {
        let model = ScriptedModel::new([
            "{\"title\": \"Bio\"}",
            "{\"title\": \"Bio\", \"sections\": [\"Intro\", \"Career\"]}",
        ]);
        let prompts = PromptEngine::new();

        let structure = agent_context(&model, &prompts)
            .structure(&brief())
            .expect("structure");
        assert_eq!(structure.title, "Bio");
        assert_eq!(structure.sections, vec!["Intro", "Career"]);
        assert_eq!(model.calls(), 2);
    }

    #[test]
    fn knowledge_prompt_lists_keys_not_values() {
        let model = ScriptedModel::new(["{\"need_more_data\": [\"gather facts\"]}"]);
        let prompts = PromptEngine::new();

        let request = agent_context(&model, &prompts)
            .required_knowledge(&brief(), &["gather facts", "find dates"], "Intro")
            .expect("knowledge");

        assert_eq!(request.keys(), vec!["gather facts"]);
        let prompt = &model.prompts()[0];
        assert!(prompt.contains("- gather facts\n- find dates"));
    }

    #[test]
    fn section_text_loses_markdown_fence() {
        let model = ScriptedModel::new(["```md\n# Intro\nBorn 1990.\n```"]);
        let prompts = PromptEngine::new();

        let text = agent_context(&model, &prompts)
            .write_section(&brief(), "Intro", &["Subject born 1990."])
            .expect("section");

        assert_eq!(text, "# Intro\nBorn 1990.");
        assert!(model.prompts()[0].contains("Subject born 1990."));
    }
}
