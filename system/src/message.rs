use crate::exercise::ExerciseSnapshot;
use crate::{BlockId, CommandId, ConnectionId, LiveSessionId, PageIndex, Role};
use serde::{Deserialize, Serialize};

/// FatalError makes connection be closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FatalError {
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum CommandResult {
    SystemEvent(SystemEvent),
    Error(SystemError),
}

#[derive(Debug, Serialize, Deserialize)]
pub enum IdentifiableEvent {
    ByMyself {
        command_id: CommandId,
        result: CommandResult,
    },
    BySystem {
        system_event: SystemEvent,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdentifiableCommand {
    pub command_id: CommandId,
    pub system_command: SystemCommand,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SystemCommand {
    JoinSession {
        live_session_id: LiveSessionId,
        role: Role,
    },
    LeaveSession,
    LiveCommand(LiveCommand),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SystemEvent {
    JoinedSession {
        session_snapshot: SessionSnapshot,
        peer_present: bool,
    },
    LeftSession,
    SessionStateChanged(SessionSnapshot),
    LiveEvent(LiveEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SystemError {
    /// The live session id does not match the one the admin issued.
    InvalidSessionId,
    /// The lesson exists but live mode has not been opened for it.
    LessonNotLive,
    /// The requested role is already taken by another connection.
    RoleOccupied,
    /// The sender's role may not originate this command.
    NotPermitted,
    /// Page index outside the lesson's page range.
    PageOutOfRange,
    FatalError(FatalError),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum MediaAction {
    Play,
    Pause,
    Seek(f64),
}

/// A student's answer to one exercise block. The wire format is bincode,
/// which is not self-describing, so answers are a closed union rather than
/// free-form JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnswerValue {
    Text(String),
    Texts(Vec<String>),
    Choice(u32),
    Choices(Vec<u32>),
    Bool(bool),
}

impl AnswerValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<u32> {
        match self {
            Self::Choice(c) => Some(*c),
            _ => None,
        }
    }
}

/// Server-side grading outcome attached to a check. Mirrored verbatim; the
/// teacher side never recomputes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingDetails {
    pub is_correct: Option<bool>,
    /// Revealed expected answer, present after an incorrect check.
    pub expected: Option<AnswerValue>,
}

/// Live commands sent by a participant, relayed by the server to the single
/// peer. Authority is role-bound: the student owns exercise state, the
/// teacher owns cursor/scroll/media driving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiveCommand {
    MediaControl {
        block_id: BlockId,
        action: MediaAction,
    },
    ScrollTo {
        percent: f32,
        page: Option<PageIndex>,
    },
    AnswerChange {
        block_id: BlockId,
        value: AnswerValue,
    },
    Check {
        block_id: BlockId,
        details: Option<GradingDetails>,
    },
    Reset {
        block_id: BlockId,
    },
    PageChange {
        page: PageIndex,
    },
    StateSnapshot(ExerciseSnapshot),
    CursorMove {
        x: f32,
        y: f32,
    },
    CursorHide,
    EndSession,
}

impl LiveCommand {
    /// Role authority check. Commands a role may not originate are dropped
    /// by the relay, never forwarded.
    pub fn permitted_for(&self, role: Role) -> bool {
        match self {
            LiveCommand::AnswerChange { .. }
            | LiveCommand::Check { .. }
            | LiveCommand::Reset { .. }
            | LiveCommand::PageChange { .. }
            | LiveCommand::StateSnapshot(_) => role == Role::Student,
            LiveCommand::MediaControl { .. }
            | LiveCommand::ScrollTo { .. }
            | LiveCommand::CursorMove { .. }
            | LiveCommand::CursorHide => role == Role::Teacher,
            LiveCommand::EndSession => true,
        }
    }
}

/// Live events delivered to a participant: the peer's mirrored commands plus
/// presence changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LiveEvent {
    MediaControl {
        block_id: BlockId,
        action: MediaAction,
    },
    ScrollTo {
        percent: f32,
        page: Option<PageIndex>,
    },
    AnswerChange {
        block_id: BlockId,
        value: AnswerValue,
    },
    Check {
        block_id: BlockId,
        details: Option<GradingDetails>,
    },
    Reset {
        block_id: BlockId,
    },
    PageChange {
        page: PageIndex,
    },
    StateSnapshot(ExerciseSnapshot),
    CursorMove {
        x: f32,
        y: f32,
    },
    CursorHide,
    PeerJoined {
        role: Role,
    },
    PeerLeft {
        role: Role,
    },
    SessionEnded,
}

impl LiveEvent {
    pub fn from_command(command: LiveCommand) -> Self {
        match command {
            LiveCommand::MediaControl { block_id, action } => {
                LiveEvent::MediaControl { block_id, action }
            }
            LiveCommand::ScrollTo { percent, page } => LiveEvent::ScrollTo { percent, page },
            LiveCommand::AnswerChange { block_id, value } => {
                LiveEvent::AnswerChange { block_id, value }
            }
            LiveCommand::Check { block_id, details } => LiveEvent::Check { block_id, details },
            LiveCommand::Reset { block_id } => LiveEvent::Reset { block_id },
            LiveCommand::PageChange { page } => LiveEvent::PageChange { page },
            LiveCommand::StateSnapshot(snapshot) => LiveEvent::StateSnapshot(snapshot),
            LiveCommand::CursorMove { x, y } => LiveEvent::CursorMove { x, y },
            LiveCommand::CursorHide => LiveEvent::CursorHide,
            LiveCommand::EndSession => LiveEvent::SessionEnded,
        }
    }

    pub fn kind(&self) -> LiveEventKind {
        match self {
            LiveEvent::MediaControl { .. } => LiveEventKind::MediaControl,
            LiveEvent::ScrollTo { .. } => LiveEventKind::ScrollTo,
            LiveEvent::AnswerChange { .. } => LiveEventKind::AnswerChange,
            LiveEvent::Check { .. } => LiveEventKind::Check,
            LiveEvent::Reset { .. } => LiveEventKind::Reset,
            LiveEvent::PageChange { .. } => LiveEventKind::PageChange,
            LiveEvent::StateSnapshot(_) => LiveEventKind::StateSnapshot,
            LiveEvent::CursorMove { .. } => LiveEventKind::CursorMove,
            LiveEvent::CursorHide => LiveEventKind::CursorHide,
            LiveEvent::PeerJoined { .. } => LiveEventKind::PeerJoined,
            LiveEvent::PeerLeft { .. } => LiveEventKind::PeerLeft,
            LiveEvent::SessionEnded => LiveEventKind::SessionEnded,
        }
    }
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum LiveEventKind {
    MediaControl,
    ScrollTo,
    AnswerChange,
    Check,
    Reset,
    PageChange,
    StateSnapshot,
    CursorMove,
    CursorHide,
    PeerJoined,
    PeerLeft,
    SessionEnded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub participants: Vec<(ConnectionId, Role)>,
}

impl SessionSnapshot {
    pub fn role_present(&self, role: Role) -> bool {
        self.participants.iter().any(|(_, r)| *r == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::ExerciseState;

    #[test]
    fn it_binds_each_command_kind_to_its_originating_role() {
        let block_id = uuid::Uuid::new_v4();

        let student_only = vec![
            LiveCommand::AnswerChange {
                block_id,
                value: AnswerValue::Text("Paris".into()),
            },
            LiveCommand::Check {
                block_id,
                details: None,
            },
            LiveCommand::Reset { block_id },
            LiveCommand::PageChange { page: 0 },
            LiveCommand::StateSnapshot(ExerciseSnapshot::from(&ExerciseState::new())),
        ];
        for command in &student_only {
            assert!(command.permitted_for(Role::Student), "{:?}", command);
            assert!(!command.permitted_for(Role::Teacher), "{:?}", command);
        }

        let teacher_only = vec![
            LiveCommand::MediaControl {
                block_id,
                action: MediaAction::Play,
            },
            LiveCommand::ScrollTo {
                percent: 10.0,
                page: None,
            },
            LiveCommand::CursorMove { x: 1.0, y: 2.0 },
            LiveCommand::CursorHide,
        ];
        for command in &teacher_only {
            assert!(command.permitted_for(Role::Teacher), "{:?}", command);
            assert!(!command.permitted_for(Role::Student), "{:?}", command);
        }

        // Either side may end the session.
        assert!(LiveCommand::EndSession.permitted_for(Role::Teacher));
        assert!(LiveCommand::EndSession.permitted_for(Role::Student));
    }
}
