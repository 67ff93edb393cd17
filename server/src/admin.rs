use system::{LessonId, LiveSessionId, PageIndex};
use tokio::sync::oneshot::Sender;

#[derive(Debug)]
pub enum AdminCommand {
    GetSessionState {
        lesson_id: LessonId,
        tx: Sender<LessonLiveDescription>,
    },
    OpenLiveSession {
        lesson_id: LessonId,
        total_pages: PageIndex,
        tx: Sender<LiveSessionId>,
    },
    CloseLiveSession {
        lesson_id: LessonId,
        tx: Sender<bool>,
    },
}

#[derive(Debug)]
pub enum LessonLiveDescription {
    Live {
        live_session_id: LiveSessionId,
        teacher_present: bool,
        student_present: bool,
    },
    Offline,
}
