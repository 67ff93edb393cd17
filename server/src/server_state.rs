use crate::session::Session;
use std::collections::HashMap;
use std::num::Wrapping;
use system::uuid::Uuid;
use system::{ConnectionId, LessonId, LiveSessionId, PageIndex, Role};

#[derive(Debug, Clone)]
pub enum ConnectionState {
    /// Connected to the socket for a lesson, not yet joined to its session.
    Pending(LessonId),
    Joined(LessonId, Role),
}

#[derive(Debug)]
pub enum ServerError {
    LessonNotLive,
    InvalidSessionId,
    RoleOccupied,
    InvalidCommandForState,
}

pub struct ServerState {
    pub connection_id_source: Wrapping<ConnectionId>,
    pub connection_states: HashMap<ConnectionId, ConnectionState>,

    /// Live sessions keyed by lesson, opened and closed by the admin.
    pub sessions: HashMap<LessonId, Session>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            connection_id_source: Wrapping(0),
            connection_states: HashMap::new(),
            sessions: HashMap::new(),
        }
    }

    pub fn create_connection(&mut self, lesson_id: LessonId) -> ConnectionId {
        let connection_id = self.new_connection_id();
        self.connection_states
            .insert(connection_id, ConnectionState::Pending(lesson_id));
        connection_id
    }

    pub fn disconnect(&mut self, connection_id: &ConnectionId) {
        self.connection_states.remove(connection_id);
    }

    /// Opening live mode for an already-live lesson keeps the existing
    /// session so a console refresh cannot cut off participants.
    pub fn open_live_session(
        &mut self,
        lesson_id: LessonId,
        total_pages: PageIndex,
    ) -> LiveSessionId {
        if let Some(session) = self.sessions.get(&lesson_id) {
            return session.live_session_id;
        }
        let live_session_id = Uuid::new_v4();
        self.sessions
            .insert(lesson_id, Session::new(live_session_id, total_pages));
        log::info!("Live session {} opened for lesson {}", live_session_id, lesson_id);
        live_session_id
    }

    pub fn close_live_session(&mut self, lesson_id: &LessonId) -> Option<Session> {
        let session = self.sessions.remove(lesson_id);
        if let Some(ref session) = session {
            for (connection_id, _) in session.participants() {
                if let Some(state) = self.connection_states.get_mut(&connection_id) {
                    *state = ConnectionState::Pending(*lesson_id);
                }
            }
            log::info!("Live session {} closed", session.live_session_id);
        }
        session
    }

    pub fn join_session(
        &mut self,
        connection_id: &ConnectionId,
        live_session_id: &LiveSessionId,
        role: Role,
    ) -> Result<LessonId, ServerError> {
        let lesson_id = match self.connection_states.get(connection_id) {
            Some(ConnectionState::Pending(lesson_id)) => *lesson_id,
            _ => return Err(ServerError::InvalidCommandForState),
        };
        let session = self
            .sessions
            .get_mut(&lesson_id)
            .ok_or(ServerError::LessonNotLive)?;
        if &session.live_session_id != live_session_id {
            return Err(ServerError::InvalidSessionId);
        }
        let slot = session.slot_mut(role);
        if slot.is_some() {
            return Err(ServerError::RoleOccupied);
        }
        *slot = Some(*connection_id);
        self.connection_states
            .insert(*connection_id, ConnectionState::Joined(lesson_id, role));
        log::info!(
            "Connection {} joined lesson {} as {}",
            connection_id,
            lesson_id,
            role
        );
        Ok(lesson_id)
    }

    /// Frees the role slot but keeps the session open for a rejoin.
    pub fn leave_session(&mut self, connection_id: &ConnectionId) -> Option<(LessonId, Role)> {
        let (lesson_id, role) = match self.connection_states.get(connection_id) {
            Some(ConnectionState::Joined(lesson_id, role)) => (*lesson_id, *role),
            _ => return None,
        };
        if let Some(session) = self.sessions.get_mut(&lesson_id) {
            *session.slot_mut(role) = None;
        }
        self.connection_states
            .insert(*connection_id, ConnectionState::Pending(lesson_id));
        Some((lesson_id, role))
    }

    pub fn peer_of(&self, lesson_id: &LessonId, role: Role) -> Option<ConnectionId> {
        self.sessions
            .get(lesson_id)
            .and_then(|session| session.slot(role.peer()))
    }

    fn new_connection_id(&mut self) -> ConnectionId {
        self.connection_id_source += Wrapping(1);
        self.connection_id_source.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_lesson(state: &mut ServerState) -> (LessonId, LiveSessionId) {
        let lesson_id = Uuid::new_v4();
        let live_session_id = state.open_live_session(lesson_id, 3);
        (lesson_id, live_session_id)
    }

    #[test]
    fn it_rejects_joining_a_lesson_that_is_not_live() {
        let mut state = ServerState::new();
        let connection_id = state.create_connection(Uuid::new_v4());
        let result = state.join_session(&connection_id, &Uuid::new_v4(), Role::Student);
        assert!(matches!(result, Err(ServerError::LessonNotLive)));
    }

    #[test]
    fn it_rejects_a_stale_live_session_id() {
        let mut state = ServerState::new();
        let (lesson_id, _) = live_lesson(&mut state);
        let connection_id = state.create_connection(lesson_id);
        let result = state.join_session(&connection_id, &Uuid::new_v4(), Role::Student);
        assert!(matches!(result, Err(ServerError::InvalidSessionId)));
    }

    #[test]
    fn it_rejects_a_duplicate_role() {
        let mut state = ServerState::new();
        let (lesson_id, live_session_id) = live_lesson(&mut state);

        let first = state.create_connection(lesson_id);
        state
            .join_session(&first, &live_session_id, Role::Student)
            .expect("first student joins");

        let second = state.create_connection(lesson_id);
        let result = state.join_session(&second, &live_session_id, Role::Student);
        assert!(matches!(result, Err(ServerError::RoleOccupied)));
    }

    #[test]
    fn it_frees_the_role_slot_on_leave_but_keeps_the_session() {
        let mut state = ServerState::new();
        let (lesson_id, live_session_id) = live_lesson(&mut state);

        let connection_id = state.create_connection(lesson_id);
        state
            .join_session(&connection_id, &live_session_id, Role::Teacher)
            .expect("teacher joins");
        assert_eq!(
            state.leave_session(&connection_id),
            Some((lesson_id, Role::Teacher))
        );

        // The session survives, so the teacher can rejoin after a drop.
        assert!(state.sessions.contains_key(&lesson_id));
        state
            .join_session(&connection_id, &live_session_id, Role::Teacher)
            .expect("teacher rejoins");
    }

    #[test]
    fn it_reuses_the_session_when_live_mode_is_reopened() {
        let mut state = ServerState::new();
        let (lesson_id, live_session_id) = live_lesson(&mut state);
        assert_eq!(state.open_live_session(lesson_id, 3), live_session_id);
    }
}
