use serde::{Deserialize, Serialize};

pub type ConnectionId = u16;
pub type CommandId = u16;
pub type LessonId = uuid::Uuid;
pub type LiveSessionId = uuid::Uuid;
pub type BlockId = uuid::Uuid;
pub type PageIndex = u32;

/// The two logical roles of a live lesson session. The student is the sole
/// authority for exercise state; the teacher observes and drives the cursor.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    pub fn peer(&self) -> Role {
        match self {
            Role::Teacher => Role::Student,
            Role::Student => Role::Teacher,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Role::Teacher => write!(f, "teacher"),
            Role::Student => write!(f, "student"),
        }
    }
}
