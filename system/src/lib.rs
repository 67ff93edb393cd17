pub extern crate bincode;
pub extern crate serde;
pub extern crate serde_json;
pub extern crate uuid;

mod exercise;
mod lesson;
mod message;
mod presence;
mod reconnect;
mod router;
mod student_document;
mod teacher_mirror;
mod types;

pub use exercise::{ExerciseSnapshot, ExerciseState};
pub use lesson::{Block, BlockKind, Lesson, LessonPage};
pub use message::{
    AnswerValue, CommandResult, FatalError, GradingDetails, IdentifiableCommand,
    IdentifiableEvent, LiveCommand, LiveEvent, LiveEventKind, MediaAction, SessionSnapshot,
    SystemCommand, SystemError, SystemEvent,
};
pub use presence::{ConnectionPhase, PresenceTracker};
pub use reconnect::ReconnectBackoff;
pub use router::{LiveEventHandler, LiveEventRouter};
pub use student_document::{
    DocumentError, EventOutcome, PeerCursor, StudentEffect, StudentLessonDocument,
};
pub use teacher_mirror::{MirrorResult, TeacherMirrorDocument};
pub use types::{
    BlockId, CommandId, ConnectionId, LessonId, LiveSessionId, PageIndex, Role,
};
