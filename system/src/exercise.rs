use crate::message::{AnswerValue, GradingDetails};
use crate::{BlockId, PageIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The student's exercise state for one open lesson. The student side is the
/// only writer; the teacher side holds a mirrored copy of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseState {
    answers: HashMap<BlockId, AnswerValue>,
    checked: HashMap<BlockId, bool>,
    details: HashMap<BlockId, GradingDetails>,
    current_page: PageIndex,
}

impl ExerciseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_answer(&mut self, block_id: BlockId, value: AnswerValue) {
        self.answers.insert(block_id, value);
        // Editing an answer invalidates its previous grading.
        self.checked.remove(&block_id);
        self.details.remove(&block_id);
    }

    pub fn mark_checked(&mut self, block_id: BlockId, details: Option<GradingDetails>) {
        self.checked.insert(block_id, true);
        match details {
            Some(details) => {
                self.details.insert(block_id, details);
            }
            None => {
                self.details.remove(&block_id);
            }
        }
    }

    pub fn reset_block(&mut self, block_id: &BlockId) {
        self.answers.remove(block_id);
        self.checked.remove(block_id);
        self.details.remove(block_id);
    }

    pub fn set_page(&mut self, page: PageIndex) {
        self.current_page = page;
    }

    pub fn answer(&self, block_id: &BlockId) -> Option<&AnswerValue> {
        self.answers.get(block_id)
    }

    pub fn is_checked(&self, block_id: &BlockId) -> bool {
        self.checked.get(block_id).copied().unwrap_or(false)
    }

    pub fn details(&self, block_id: &BlockId) -> Option<&GradingDetails> {
        self.details.get(block_id)
    }

    pub fn current_page(&self) -> PageIndex {
        self.current_page
    }

    /// Every block id this state holds anything for.
    pub fn touched_block_ids(&self) -> impl Iterator<Item = &BlockId> {
        self.answers
            .keys()
            .chain(self.checked.keys())
            .chain(self.details.keys())
    }
}

/// Full dump of a student's exercise state, sent to resynchronize a teacher
/// observer. Applied as a whole-state overwrite, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSnapshot {
    state: ExerciseState,
}

impl ExerciseSnapshot {
    pub fn state(&self) -> &ExerciseState {
        &self.state
    }

    pub fn into_state(self) -> ExerciseState {
        self.state
    }
}

impl From<&ExerciseState> for ExerciseSnapshot {
    fn from(state: &ExerciseState) -> Self {
        Self {
            state: state.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correct() -> GradingDetails {
        GradingDetails {
            is_correct: Some(true),
            expected: None,
        }
    }

    #[test]
    fn it_invalidates_grading_when_answer_changes() {
        let mut state = ExerciseState::new();
        let block_id = uuid::Uuid::new_v4();

        state.set_answer(block_id, AnswerValue::Text("Paris".into()));
        state.mark_checked(block_id, Some(correct()));
        assert!(state.is_checked(&block_id));

        state.set_answer(block_id, AnswerValue::Text("London".into()));
        assert!(!state.is_checked(&block_id));
        assert!(state.details(&block_id).is_none());
    }

    #[test]
    fn it_clears_everything_for_a_reset_block() {
        let mut state = ExerciseState::new();
        let block_id = uuid::Uuid::new_v4();

        state.set_answer(block_id, AnswerValue::Text("Paris".into()));
        state.mark_checked(block_id, None);
        state.reset_block(&block_id);

        assert!(state.answer(&block_id).is_none());
        assert!(!state.is_checked(&block_id));
        assert_eq!(state.touched_block_ids().count(), 0);
    }
}
