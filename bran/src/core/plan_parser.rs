//! Line-oriented parser for the planner's reply.
//!
//! The planner answers in labelled blocks rather than JSON:
//!
//! ```text
//! Project Name: Bio
//! Your Reply to the Human Prompter: Sure, here is the plan.
//! Current Focus: Collect facts first.
//! Plan:
//! - [ ] Step 1: Gather facts about the subject
//! - [ ] Step 2: Write the bio
//! Summary: Two steps.
//! ```
//!
//! A running section cursor decides which field a trailing line extends.
//! Parsing never fails; [`parse_plan_strict`] reports a reply in which nothing
//! was recognized.

use crate::core::types::Plan;

const PROJECT_LABEL: &str = "Project Name:";
const REPLY_LABEL: &str = "Your Reply to the Human Prompter:";
const FOCUS_LABEL: &str = "Current Focus:";
const PLAN_LABEL: &str = "Plan:";
const SUMMARY_LABEL: &str = "Summary:";
const STEP_BULLET: &str = "- [ ] Step";

/// Returned by strict parsing when no plan field was recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("planner reply contained no recognizable plan fields")]
pub struct EmptyPlanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Idle,
    Project,
    Reply,
    Focus,
    Plans,
    Summary,
}

/// Parse a planner reply, leniently.
///
/// Unlabelled lines before any section are dropped. Blank lines are ignored.
/// Every accumulated field is trimmed at the end.
pub fn parse_plan(text: &str) -> Plan {
    let mut plan = Plan::default();
    let mut section = Section::Idle;
    let mut current_step: Option<u32> = None;

    for line in text.lines() {
        let line = line.trim();

        if let Some(value) = line.strip_prefix(PROJECT_LABEL) {
            section = Section::Project;
            plan.project = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix(REPLY_LABEL) {
            section = Section::Reply;
            plan.reply = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix(FOCUS_LABEL) {
            section = Section::Focus;
            plan.focus = value.trim().to_string();
        } else if line.starts_with(PLAN_LABEL) {
            section = Section::Plans;
        } else if let Some(value) = line.strip_prefix(SUMMARY_LABEL) {
            section = Section::Summary;
            plan.summary = value.trim().to_string();
        } else if line.is_empty() {
            continue;
        } else {
            match section {
                Section::Idle | Section::Project => {}
                Section::Reply => append_words(&mut plan.reply, line),
                Section::Focus => append_words(&mut plan.focus, line),
                Section::Plans => {
                    if let Some((index, text)) = parse_step_bullet(line) {
                        current_step = Some(index);
                        plan.steps.insert(index, text.to_string());
                    } else if let Some(index) = current_step {
                        if let Some(step) = plan.steps.get_mut(&index) {
                            append_words(step, line);
                        }
                    }
                }
                Section::Summary => append_words(&mut plan.summary, &line.replace("```", "")),
            }
        }
    }

    plan.project = plan.project.trim().to_string();
    plan.reply = plan.reply.trim().to_string();
    plan.focus = plan.focus.trim().to_string();
    plan.summary = plan.summary.trim().to_string();
    for step in plan.steps.values_mut() {
        *step = step.trim().to_string();
    }
    plan
}

/// Parse a planner reply, failing when no field at all was recognized.
pub fn parse_plan_strict(text: &str) -> Result<Plan, EmptyPlanError> {
    let plan = parse_plan(text);
    if plan.is_empty() {
        return Err(EmptyPlanError);
    }
    Ok(plan)
}

/// Split `- [ ] Step N: text` into `(N, text)`.
///
/// `N` is the last whitespace-separated token before the first colon.
fn parse_step_bullet(line: &str) -> Option<(u32, &str)> {
    if !line.starts_with(STEP_BULLET) {
        return None;
    }
    let (prefix, text) = line.split_once(':')?;
    let index = prefix.split_whitespace().last()?.parse().ok()?;
    Some((index, text.trim()))
}

fn append_words(field: &mut String, line: &str) {
    field.push(' ');
    field.push_str(line);
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Project Name: Subject Bio
Your Reply to the Human Prompter: Sure,
I will write a short biography.
Current Focus: Facts first.
Plan:
- [ ] Step 1: Gather facts about
  the subject's early life
- [ ] Step 2: Write the bio
- [ ] Step 3: Proofread
Summary: Three steps
```
";

    #[test]
    fn parses_all_sections() {
        let plan = parse_plan(SAMPLE);
        assert_eq!(plan.project, "Subject Bio");
        assert_eq!(plan.reply, "Sure, I will write a short biography.");
        assert_eq!(plan.focus, "Facts first.");
        assert_eq!(
            plan.steps.get(&1).map(String::as_str),
            Some("Gather facts about the subject's early life")
        );
        assert_eq!(plan.steps.get(&2).map(String::as_str), Some("Write the bio"));
        assert_eq!(plan.summary, "Three steps");
    }

    #[test]
    fn parsing_is_idempotent() {
        assert_eq!(parse_plan(SAMPLE), parse_plan(SAMPLE));
    }

    #[test]
    fn step_indices_are_contiguous() {
        let mut text = String::from("Plan:\n");
        for i in 1..=12 {
            text.push_str(&format!("- [ ] Step {i}: do thing {i}\n"));
        }
        let plan = parse_plan(&text);
        let keys: Vec<u32> = plan.steps.keys().copied().collect();
        assert_eq!(keys, (1..=12).collect::<Vec<_>>());
        assert_eq!(plan.steps[&12], "do thing 12");
    }

    #[test]
    fn drops_lines_outside_any_section() {
        let plan = parse_plan("Hello there\nProject Name: X\nstray line under project\n");
        assert_eq!(plan.project, "X");
        assert!(plan.reply.is_empty());
        assert!(plan.steps.is_empty());
    }

    #[test]
    fn step_text_keeps_later_colons() {
        let plan = parse_plan("Plan:\n- [ ] Step 4: Research: sources\n");
        assert_eq!(plan.steps[&4], "Research: sources");
    }

    #[test]
    fn continuation_before_first_bullet_is_dropped() {
        let plan = parse_plan("Plan:\nintro words\n- [ ] Step 1: go\n");
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[&1], "go");
    }

    #[test]
    fn strict_mode_reports_unrecognized_reply() {
        assert_eq!(parse_plan_strict("nothing useful"), Err(EmptyPlanError));
        assert!(parse_plan_strict(SAMPLE).is_ok());
        assert!(parse_plan("nothing useful").is_empty());
    }
}
