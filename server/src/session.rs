use system::{ConnectionId, LiveSessionId, PageIndex, Role, SessionSnapshot};

/// One live lesson session: two role slots bound to an admin-issued live
/// session id. A slot frees on disconnect so the same role can rejoin; the
/// session persists until a participant ends it or the admin closes live
/// mode.
pub struct Session {
    pub live_session_id: LiveSessionId,
    pub total_pages: PageIndex,
    pub teacher: Option<ConnectionId>,
    pub student: Option<ConnectionId>,
}

impl Session {
    pub fn new(live_session_id: LiveSessionId, total_pages: PageIndex) -> Self {
        Self {
            live_session_id,
            total_pages,
            teacher: None,
            student: None,
        }
    }

    pub fn slot(&self, role: Role) -> Option<ConnectionId> {
        match role {
            Role::Teacher => self.teacher,
            Role::Student => self.student,
        }
    }

    pub fn slot_mut(&mut self, role: Role) -> &mut Option<ConnectionId> {
        match role {
            Role::Teacher => &mut self.teacher,
            Role::Student => &mut self.student,
        }
    }

    pub fn role_of(&self, connection_id: &ConnectionId) -> Option<Role> {
        if self.teacher == Some(*connection_id) {
            Some(Role::Teacher)
        } else if self.student == Some(*connection_id) {
            Some(Role::Student)
        } else {
            None
        }
    }

    pub fn participants(&self) -> Vec<(ConnectionId, Role)> {
        let mut result = Vec::new();
        if let Some(connection_id) = self.teacher {
            result.push((connection_id, Role::Teacher));
        }
        if let Some(connection_id) = self.student {
            result.push((connection_id, Role::Student));
        }
        result
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            participants: self.participants(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.teacher.is_none() && self.student.is_none()
    }
}
