use crate::exercise::ExerciseState;
use crate::lesson::Lesson;
use crate::message::LiveEvent;
use crate::presence::PresenceTracker;
use crate::{BlockId, PageIndex, Role};
use std::collections::HashSet;

/// Blocks whose rendering became stale after an event was mirrored.
pub struct MirrorResult {
    pub invalidated_block_ids: HashSet<BlockId>,
}

impl MirrorResult {
    fn empty() -> Self {
        Self {
            invalidated_block_ids: HashSet::new(),
        }
    }

    fn single(block_id: BlockId) -> Self {
        let mut invalidated_block_ids = HashSet::new();
        invalidated_block_ids.insert(block_id);
        Self {
            invalidated_block_ids,
        }
    }
}

/// The read-only observer side of a live lesson. Mirrors the student's
/// exercise state from incoming events; a state snapshot replaces the whole
/// mirrored state since the snapshot is authoritative and supersedes any
/// partial history.
pub struct TeacherMirrorDocument {
    lesson: Lesson,
    state: ExerciseState,
    presence: PresenceTracker,
}

impl TeacherMirrorDocument {
    pub fn new(lesson: Lesson) -> Self {
        log::debug!("TeacherMirrorDocument created: {}", lesson.id);
        Self {
            lesson,
            state: ExerciseState::new(),
            presence: PresenceTracker::new(),
        }
    }

    pub fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    pub fn state(&self) -> &ExerciseState {
        &self.state
    }

    pub fn current_page(&self) -> PageIndex {
        self.state.current_page()
    }

    pub fn is_connected(&self) -> bool {
        self.presence.is_connected()
    }

    pub fn peer_connected(&self) -> bool {
        self.presence.peer_connected()
    }

    pub fn connect_started(&mut self) {
        self.presence.connect_started();
    }

    pub fn transport_connected(&mut self, peer_present: bool) {
        self.presence.transport_connected();
        if peer_present {
            self.presence.peer_observed();
        }
    }

    pub fn transport_lost(&mut self) {
        self.presence.transport_lost();
    }

    /// Idempotent.
    pub fn disconnect(&mut self) {
        self.presence.disconnected();
    }

    pub fn handle_live_event(&mut self, event: LiveEvent) -> MirrorResult {
        match event {
            LiveEvent::AnswerChange { block_id, value } => {
                if !self.lesson.contains_block(&block_id) {
                    log::warn!("answer change for unknown block {}", block_id);
                    return MirrorResult::empty();
                }
                self.state.set_answer(block_id, value);
                MirrorResult::single(block_id)
            }
            LiveEvent::Check { block_id, details } => {
                if !self.lesson.contains_block(&block_id) {
                    log::warn!("check for unknown block {}", block_id);
                    return MirrorResult::empty();
                }
                self.state.mark_checked(block_id, details);
                MirrorResult::single(block_id)
            }
            LiveEvent::Reset { block_id } => {
                if !self.lesson.contains_block(&block_id) {
                    log::warn!("reset for unknown block {}", block_id);
                    return MirrorResult::empty();
                }
                self.state.reset_block(&block_id);
                MirrorResult::single(block_id)
            }
            LiveEvent::PageChange { page } => {
                self.state.set_page(self.clamp_page(page));
                MirrorResult::empty()
            }
            LiveEvent::StateSnapshot(snapshot) => {
                // Full overwrite, never a merge. Everything previously or
                // newly touched needs a redraw.
                let mut invalidated_block_ids = self
                    .state
                    .touched_block_ids()
                    .cloned()
                    .collect::<HashSet<_>>();
                self.state = snapshot.into_state();
                let page = self.state.current_page();
                self.state.set_page(self.clamp_page(page));
                for block_id in self.state.touched_block_ids() {
                    invalidated_block_ids.insert(block_id.clone());
                }
                MirrorResult {
                    invalidated_block_ids,
                }
            }
            LiveEvent::PeerJoined { role } => {
                if role == Role::Teacher {
                    log::warn!("another teacher appeared in the session");
                }
                self.presence.peer_observed();
                MirrorResult::empty()
            }
            LiveEvent::PeerLeft { .. } => {
                self.presence.peer_lost();
                MirrorResult::empty()
            }
            LiveEvent::SessionEnded => {
                self.disconnect();
                MirrorResult::empty()
            }
            // Teacher-originated command kinds are never mirrored back here.
            event => {
                log::warn!("teacher received non-student event: {:?}", event.kind());
                MirrorResult::empty()
            }
        }
    }

    fn clamp_page(&self, page: PageIndex) -> PageIndex {
        let total = self.lesson.total_pages();
        if total == 0 {
            0
        } else if page < total {
            page
        } else {
            log::warn!("page {} clamped to {}", page, total - 1);
            total - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson::{Block, BlockKind, LessonPage};
    use crate::message::{AnswerValue, GradingDetails};

    fn text(s: &str) -> AnswerValue {
        AnswerValue::Text(s.into())
    }

    fn correct() -> GradingDetails {
        GradingDetails {
            is_correct: Some(true),
            expected: None,
        }
    }

    fn lesson_with_block() -> (Lesson, BlockId) {
        let mut lesson = Lesson::new("Vocabulaire".into());
        let block = Block::new(BlockKind::FillInGap, "Capital of France?".into());
        let block_id = block.id;
        lesson.pages.push(LessonPage {
            blocks: vec![block],
        });
        (lesson, block_id)
    }

    #[test]
    fn it_mirrors_a_checked_answer_without_recomputation() {
        let (lesson, block_id) = lesson_with_block();
        let mut mirror = TeacherMirrorDocument::new(lesson);

        mirror.handle_live_event(LiveEvent::AnswerChange {
            block_id,
            value: text("Paris"),
        });
        let result = mirror.handle_live_event(LiveEvent::Check {
            block_id,
            details: Some(correct()),
        });

        assert!(result.invalidated_block_ids.contains(&block_id));
        assert!(mirror.state().is_checked(&block_id));
        assert_eq!(mirror.state().details(&block_id), Some(&correct()));
    }

    #[test]
    fn it_clamps_out_of_range_page_changes() {
        let (lesson, _) = lesson_with_block();
        let mut mirror = TeacherMirrorDocument::new(lesson);
        mirror.handle_live_event(LiveEvent::PageChange { page: 42 });
        assert_eq!(mirror.current_page(), 0);
    }

    #[test]
    fn it_overwrites_the_whole_state_on_snapshot() {
        let (lesson, block_id) = lesson_with_block();
        let mut mirror = TeacherMirrorDocument::new(lesson.clone());

        // Stale local history that the snapshot must supersede.
        mirror.handle_live_event(LiveEvent::AnswerChange {
            block_id,
            value: text("Lyon"),
        });

        let mut student_state = ExerciseState::new();
        student_state.set_answer(block_id, text("Paris"));
        student_state.mark_checked(block_id, Some(correct()));
        let result = mirror.handle_live_event(LiveEvent::StateSnapshot(
            crate::ExerciseSnapshot::from(&student_state),
        ));

        assert!(result.invalidated_block_ids.contains(&block_id));
        assert_eq!(mirror.state().answer(&block_id), Some(&text("Paris")));
        assert!(mirror.state().is_checked(&block_id));
    }

    #[test]
    fn it_drops_events_for_unknown_blocks() {
        let (lesson, _) = lesson_with_block();
        let mut mirror = TeacherMirrorDocument::new(lesson);
        let stranger = uuid::Uuid::new_v4();
        let result = mirror.handle_live_event(LiveEvent::AnswerChange {
            block_id: stranger,
            value: text("?"),
        });
        assert!(result.invalidated_block_ids.is_empty());
        assert!(mirror.state().answer(&stranger).is_none());

        let result = mirror.handle_live_event(LiveEvent::Reset { block_id: stranger });
        assert!(result.invalidated_block_ids.is_empty());
    }
}
