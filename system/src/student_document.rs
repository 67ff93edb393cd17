use crate::exercise::{ExerciseSnapshot, ExerciseState};
use crate::lesson::Lesson;
use crate::message::{AnswerValue, GradingDetails, LiveCommand, LiveEvent, MediaAction};
use crate::presence::PresenceTracker;
use crate::{BlockId, PageIndex, Role};

#[derive(Debug, Eq, PartialEq)]
pub enum DocumentError {
    UnknownBlock,
    PageOutOfRange,
}

/// Transient overlay cursor driven by the teacher. Latest value wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeerCursor {
    pub x: f32,
    pub y: f32,
}

/// What the student UI should do after an incoming event was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum StudentEffect {
    Media { block_id: BlockId, action: MediaAction },
    Scroll { percent: f32 },
    CursorChanged,
    PeerPresenceChanged,
    SessionEnded,
    Ignored,
}

pub struct EventOutcome {
    pub effect: StudentEffect,
    /// Commands to broadcast to the peer as a consequence of the event.
    pub outgoing: Vec<LiveCommand>,
}

/// The authoritative side of a live lesson. Owns the exercise state; every
/// local mutation yields the `LiveCommand` to broadcast so the teacher
/// mirror can follow. On a peer-joined transition it yields a full state
/// snapshot instead of replaying history.
pub struct StudentLessonDocument {
    lesson: Lesson,
    state: ExerciseState,
    presence: PresenceTracker,
    peer_cursor: Option<PeerCursor>,
}

impl StudentLessonDocument {
    pub fn new(lesson: Lesson) -> Self {
        log::debug!("StudentLessonDocument created: {}", lesson.id);
        Self {
            lesson,
            state: ExerciseState::new(),
            presence: PresenceTracker::new(),
            peer_cursor: None,
        }
    }

    /// Restore prior answers (e.g. from the result store) before going live.
    pub fn with_state(lesson: Lesson, state: ExerciseState) -> Self {
        Self {
            lesson,
            state,
            presence: PresenceTracker::new(),
            peer_cursor: None,
        }
    }

    pub fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    pub fn state(&self) -> &ExerciseState {
        &self.state
    }

    pub fn snapshot(&self) -> ExerciseSnapshot {
        ExerciseSnapshot::from(&self.state)
    }

    pub fn peer_cursor(&self) -> Option<&PeerCursor> {
        self.peer_cursor.as_ref()
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

    /// Transport handshake finished. If the teacher is already in the
    /// session, this is a peer-joined transition and the initial snapshot
    /// must go out immediately.
    pub fn transport_connected(&mut self, peer_present: bool) -> Option<LiveCommand> {
        self.presence.transport_connected();
        if peer_present && self.presence.peer_observed() {
            Some(LiveCommand::StateSnapshot(self.snapshot()))
        } else {
            None
        }
    }

    pub fn transport_lost(&mut self) {
        self.presence.transport_lost();
        self.peer_cursor = None;
    }

    /// Idempotent.
    pub fn disconnect(&mut self) {
        self.presence.disconnected();
        self.peer_cursor = None;
    }

    pub fn set_answer(
        &mut self,
        block_id: BlockId,
        value: AnswerValue,
    ) -> Result<LiveCommand, DocumentError> {
        if !self.lesson.contains_block(&block_id) {
            return Err(DocumentError::UnknownBlock);
        }
        self.state.set_answer(block_id, value.clone());
        Ok(LiveCommand::AnswerChange { block_id, value })
    }

    pub fn check(
        &mut self,
        block_id: BlockId,
        details: Option<GradingDetails>,
    ) -> Result<LiveCommand, DocumentError> {
        if !self.lesson.contains_block(&block_id) {
            return Err(DocumentError::UnknownBlock);
        }
        self.state.mark_checked(block_id, details.clone());
        Ok(LiveCommand::Check { block_id, details })
    }

    pub fn reset(&mut self, block_id: BlockId) -> Result<LiveCommand, DocumentError> {
        if !self.lesson.contains_block(&block_id) {
            return Err(DocumentError::UnknownBlock);
        }
        self.state.reset_block(&block_id);
        Ok(LiveCommand::Reset { block_id })
    }

    pub fn change_page(&mut self, page: PageIndex) -> Result<LiveCommand, DocumentError> {
        if !self.lesson.contains_page(page) {
            return Err(DocumentError::PageOutOfRange);
        }
        self.state.set_page(page);
        Ok(LiveCommand::PageChange { page })
    }

    pub fn end_session(&mut self) -> LiveCommand {
        self.disconnect();
        LiveCommand::EndSession
    }

    pub fn handle_live_event(&mut self, event: LiveEvent) -> EventOutcome {
        match event {
            LiveEvent::MediaControl { block_id, action } => {
                if self.lesson.contains_block(&block_id) {
                    EventOutcome {
                        effect: StudentEffect::Media { block_id, action },
                        outgoing: Vec::new(),
                    }
                } else {
                    log::warn!("media control for unknown block {}", block_id);
                    self.ignored()
                }
            }
            LiveEvent::ScrollTo { percent, page } => {
                let mut outgoing = Vec::new();
                if let Some(page) = page {
                    let clamped = self.clamp_page(page);
                    if let Some(clamped) = clamped {
                        if clamped != self.state.current_page() {
                            self.state.set_page(clamped);
                            // The student stays the page-change broadcaster
                            // even when the switch was teacher-driven.
                            outgoing.push(LiveCommand::PageChange { page: clamped });
                        }
                    }
                }
                EventOutcome {
                    effect: StudentEffect::Scroll { percent },
                    outgoing,
                }
            }
            LiveEvent::CursorMove { x, y } => {
                self.peer_cursor = Some(PeerCursor { x, y });
                EventOutcome {
                    effect: StudentEffect::CursorChanged,
                    outgoing: Vec::new(),
                }
            }
            LiveEvent::CursorHide => {
                self.peer_cursor = None;
                EventOutcome {
                    effect: StudentEffect::CursorChanged,
                    outgoing: Vec::new(),
                }
            }
            LiveEvent::PeerJoined { role } => {
                if role == Role::Student {
                    log::warn!("another student appeared in the session");
                }
                let mut outgoing = Vec::new();
                if self.presence.peer_observed() {
                    outgoing.push(LiveCommand::StateSnapshot(self.snapshot()));
                }
                EventOutcome {
                    effect: StudentEffect::PeerPresenceChanged,
                    outgoing,
                }
            }
            LiveEvent::PeerLeft { .. } => {
                self.presence.peer_lost();
                self.peer_cursor = None;
                EventOutcome {
                    effect: StudentEffect::PeerPresenceChanged,
                    outgoing: Vec::new(),
                }
            }
            LiveEvent::SessionEnded => {
                self.disconnect();
                EventOutcome {
                    effect: StudentEffect::SessionEnded,
                    outgoing: Vec::new(),
                }
            }
            // Exercise state events never originate from the teacher.
            event => {
                log::warn!("student received non-teacher event: {:?}", event.kind());
                self.ignored()
            }
        }
    }

    fn ignored(&self) -> EventOutcome {
        EventOutcome {
            effect: StudentEffect::Ignored,
            outgoing: Vec::new(),
        }
    }

    fn clamp_page(&self, page: PageIndex) -> Option<PageIndex> {
        let total = self.lesson.total_pages();
        if total == 0 {
            None
        } else if page < total {
            Some(page)
        } else {
            log::warn!("page {} clamped to {}", page, total - 1);
            Some(total - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson::{Block, BlockKind, LessonPage};

    fn two_page_lesson() -> Lesson {
        let mut lesson = Lesson::new("Géographie".into());
        lesson.pages.push(LessonPage {
            blocks: vec![Block::new(BlockKind::FillInGap, "Capital of France?".into())],
        });
        lesson.pages.push(LessonPage { blocks: vec![] });
        lesson
    }

    fn live_student(lesson: Lesson) -> StudentLessonDocument {
        let mut doc = StudentLessonDocument::new(lesson);
        doc.connect_started();
        doc.transport_connected(false);
        doc
    }

    #[test]
    fn it_sends_one_snapshot_per_peer_joined_transition() {
        let mut doc = live_student(two_page_lesson());

        let outcome = doc.handle_live_event(LiveEvent::PeerJoined {
            role: Role::Teacher,
        });
        assert_eq!(outcome.outgoing.len(), 1);
        assert!(matches!(
            outcome.outgoing[0],
            LiveCommand::StateSnapshot(_)
        ));

        // A duplicated presence burst must not duplicate the snapshot.
        let outcome = doc.handle_live_event(LiveEvent::PeerJoined {
            role: Role::Teacher,
        });
        assert!(outcome.outgoing.is_empty());

        // After the teacher leaves and rejoins, one more snapshot.
        doc.handle_live_event(LiveEvent::PeerLeft {
            role: Role::Teacher,
        });
        let outcome = doc.handle_live_event(LiveEvent::PeerJoined {
            role: Role::Teacher,
        });
        assert_eq!(outcome.outgoing.len(), 1);
    }

    #[test]
    fn it_rejects_out_of_range_page_changes() {
        let mut doc = live_student(two_page_lesson());
        assert_eq!(doc.change_page(5), Err(DocumentError::PageOutOfRange));
        assert_eq!(doc.state().current_page(), 0);
        assert!(doc.change_page(1).is_ok());
        assert_eq!(doc.state().current_page(), 1);
    }

    #[test]
    fn it_shows_and_hides_the_teacher_cursor() {
        let mut doc = live_student(two_page_lesson());
        doc.handle_live_event(LiveEvent::CursorMove { x: 50.0, y: 50.0 });
        assert_eq!(doc.peer_cursor(), Some(&PeerCursor { x: 50.0, y: 50.0 }));

        doc.handle_live_event(LiveEvent::CursorHide);
        assert!(doc.peer_cursor().is_none());
    }

    #[test]
    fn it_follows_a_scroll_with_page_switch_and_rebroadcasts_the_page() {
        let mut doc = live_student(two_page_lesson());
        let outcome = doc.handle_live_event(LiveEvent::ScrollTo {
            percent: 30.0,
            page: Some(1),
        });
        assert_eq!(doc.state().current_page(), 1);
        assert!(matches!(
            outcome.outgoing[..],
            [LiveCommand::PageChange { page: 1 }]
        ));

        // Out-of-range follow target clamps instead of crashing.
        let outcome = doc.handle_live_event(LiveEvent::ScrollTo {
            percent: 80.0,
            page: Some(9),
        });
        assert_eq!(doc.state().current_page(), 1);
        assert!(outcome.outgoing.is_empty());
    }

    #[test]
    fn it_ignores_exercise_events_from_the_peer() {
        let mut doc = live_student(two_page_lesson());
        let block_id = doc.lesson().pages[0].blocks[0].id;
        let outcome = doc.handle_live_event(LiveEvent::AnswerChange {
            block_id,
            value: AnswerValue::Text("forged".into()),
        });
        assert_eq!(outcome.effect, StudentEffect::Ignored);
        assert!(doc.state().answer(&block_id).is_none());
    }
}
