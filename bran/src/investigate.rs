//! Investigation of one goal against the corpus chunks.
//!
//! The research loop walks the chunks once. Each chunk opens a new piece; while
//! the research step asks for more, the piece absorbs the following chunk from
//! the same iterator, so a chunk is never revisited as a piece of its own. Every
//! finished piece contributes its draft to the notes and is folded into the
//! rolling summary that serves as the context for the next piece. The notes are
//! then synthesized into the goal's answer.

use anyhow::Result;
use tracing::{debug, info, instrument};

use crate::core::types::{ResearchAction, ResearchStep};

/// Model-backed steps of an investigation.
pub trait ResearchSteps {
    /// Draft an answer to `goal` from `context` and the current `piece`.
    fn research(&self, goal: &str, context: &str, piece: &str) -> Result<ResearchStep>;
    /// Fold `new_lines` into the running `summary`.
    fn summarize(&self, summary: &str, new_lines: &str) -> Result<String>;
    /// Combine newline-joined `notes` into the final answer for `goal`.
    fn synthesize(&self, goal: &str, notes: &str) -> Result<String>;
}

/// Research `goal` over `chunks` and return the synthesized result.
#[instrument(skip_all, fields(goal = %goal, chunks = chunks.len()))]
pub fn investigate<R: ResearchSteps + ?Sized>(
    steps: &R,
    goal: &str,
    chunks: &[String],
) -> Result<String> {
    let mut remaining = chunks.iter();
    let mut context = String::new();
    let mut notes: Vec<String> = Vec::new();

    while let Some(first) = remaining.next() {
        let mut piece = first.clone();
        let draft = loop {
            let step = steps.research(goal, &context, &piece)?;
            if step.action != ResearchAction::More {
                break step.draft;
            }
            match remaining.next() {
                Some(next) => {
                    piece.push('\n');
                    piece.push_str(next);
                }
                // Nothing left to widen with.
                None => break step.draft,
            }
        };
        context = steps.summarize(&context, &piece)?;
        notes.push(draft);
    }

    let notes = notes.join("\n");
    debug!(notes = %notes, "research notes");
    let result = steps.synthesize(goal, &notes)?;
    info!(result_bytes = result.len(), "investigation complete");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::numbered_chunks;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays research decisions and records every piece and summary call.
    #[derive(Default)]
    struct ScriptedResearch {
        decisions: RefCell<VecDeque<ResearchAction>>,
        pieces: RefCell<Vec<String>>,
        summarized: RefCell<Vec<String>>,
        contexts: RefCell<Vec<String>>,
        notes: RefCell<Option<String>>,
    }

    impl ScriptedResearch {
        fn new(decisions: impl IntoIterator<Item = ResearchAction>) -> Self {
            Self {
                decisions: RefCell::new(decisions.into_iter().collect()),
                ..Self::default()
            }
        }
    }

    impl ResearchSteps for ScriptedResearch {
        fn research(&self, _goal: &str, context: &str, piece: &str) -> Result<ResearchStep> {
            self.pieces.borrow_mut().push(piece.to_string());
            self.contexts.borrow_mut().push(context.to_string());
            let action = self
                .decisions
                .borrow_mut()
                .pop_front()
                .unwrap_or(ResearchAction::Stop);
            Ok(ResearchStep {
                draft: format!("draft of [{}]", piece.replace('\n', "+")),
                action,
            })
        }

        fn summarize(&self, summary: &str, new_lines: &str) -> Result<String> {
            self.summarized.borrow_mut().push(new_lines.to_string());
            Ok(format!("{summary}|{}", new_lines.replace('\n', "+")))
        }

        fn synthesize(&self, goal: &str, notes: &str) -> Result<String> {
            *self.notes.borrow_mut() = Some(notes.to_string());
            Ok(format!("{goal}: done"))
        }
    }

    fn summarized_chunks(research: &ScriptedResearch) -> Vec<String> {
        research
            .summarized
            .borrow()
            .iter()
            .flat_map(|piece| piece.split('\n').map(str::to_string).collect::<Vec<_>>())
            .collect()
    }

    #[test]
    fn every_chunk_is_consumed_exactly_once() {
        use ResearchAction::{More, Stop};
        let chunks = numbered_chunks(7);
        let patterns: [&[ResearchAction]; 4] = [
            &[],
            &[More, More, Stop, Stop, More, Stop],
            &[More, More, More, More, More, More, More, More],
            &[Stop, More, Stop, More, More, Stop, Stop],
        ];

        for pattern in patterns {
            let research = ScriptedResearch::new(pattern.iter().copied());
            investigate(&research, "goal", &chunks).expect("investigate");
            assert_eq!(summarized_chunks(&research), chunks, "pattern {pattern:?}");
        }
    }

    #[test]
    fn more_widens_the_piece_with_the_next_chunk() {
        use ResearchAction::{More, Stop};
        let research = ScriptedResearch::new([More, Stop, Stop]);

        investigate(&research, "goal", &numbered_chunks(3)).expect("investigate");

        assert_eq!(
            *research.pieces.borrow(),
            vec!["chunk-0", "chunk-0\nchunk-1", "chunk-2"]
        );
        assert_eq!(
            *research.contexts.borrow(),
            vec!["", "", "|chunk-0+chunk-1"]
        );
    }

    #[test]
    fn exhausted_chunks_accept_the_last_draft() {
        let research = ScriptedResearch::new([ResearchAction::More, ResearchAction::More]);

        let result = investigate(&research, "facts", &numbered_chunks(2)).expect("investigate");

        assert_eq!(result, "facts: done");
        assert_eq!(research.pieces.borrow().len(), 2);
        assert_eq!(
            research.notes.borrow().as_deref(),
            Some("draft of [chunk-0+chunk-1]")
        );
    }

    #[test]
    fn notes_are_newline_joined_in_piece_order() {
        let research = ScriptedResearch::new([]);

        investigate(&research, "goal", &numbered_chunks(2)).expect("investigate");

        assert_eq!(
            research.notes.borrow().as_deref(),
            Some("draft of [chunk-0]\ndraft of [chunk-1]")
        );
    }

    #[test]
    fn empty_corpus_still_synthesizes() {
        let research = ScriptedResearch::new([]);

        let result = investigate(&research, "goal", &[]).expect("investigate");

        assert_eq!(result, "goal: done");
        assert!(research.pieces.borrow().is_empty());
        assert_eq!(research.notes.borrow().as_deref(), Some(""));
    }
}
