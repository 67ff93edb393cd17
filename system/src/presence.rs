/// Connection phase of one side of a live session.
///
/// `Disconnected → Connecting → ConnectedAlone → ConnectedWithPeer`. Losing
/// the peer falls back to `ConnectedAlone`; losing the transport falls back
/// to `Connecting`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ConnectionPhase {
    Disconnected,
    Connecting,
    ConnectedAlone,
    ConnectedWithPeer,
}

/// Tracks transport and peer presence for one side of a session and detects
/// the peer-joined edge. `peer_observed` reports `true` exactly once per
/// transition into `ConnectedWithPeer`, never per heartbeat.
#[derive(Debug)]
pub struct PresenceTracker {
    phase: ConnectionPhase,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self {
            phase: ConnectionPhase::Disconnected,
        }
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    pub fn is_connected(&self) -> bool {
        match self.phase {
            ConnectionPhase::ConnectedAlone | ConnectionPhase::ConnectedWithPeer => true,
            _ => false,
        }
    }

    pub fn peer_connected(&self) -> bool {
        self.phase == ConnectionPhase::ConnectedWithPeer
    }

    pub fn connect_started(&mut self) {
        self.phase = ConnectionPhase::Connecting;
    }

    pub fn transport_connected(&mut self) {
        if self.phase == ConnectionPhase::Connecting {
            self.phase = ConnectionPhase::ConnectedAlone;
        } else {
            log::warn!("transport connected while in {:?}", self.phase);
            self.phase = ConnectionPhase::ConnectedAlone;
        }
    }

    /// Transient transport loss. The peer may still be in the session; its
    /// presence is re-learned after reconnecting.
    pub fn transport_lost(&mut self) {
        if self.phase != ConnectionPhase::Disconnected {
            self.phase = ConnectionPhase::Connecting;
        }
    }

    /// The peer became observable. Returns `true` only on the transition
    /// into `ConnectedWithPeer`.
    pub fn peer_observed(&mut self) -> bool {
        match self.phase {
            ConnectionPhase::ConnectedAlone => {
                self.phase = ConnectionPhase::ConnectedWithPeer;
                true
            }
            ConnectionPhase::ConnectedWithPeer => false,
            phase => {
                log::warn!("peer observed while in {:?}", phase);
                false
            }
        }
    }

    pub fn peer_lost(&mut self) {
        if self.phase == ConnectionPhase::ConnectedWithPeer {
            self.phase = ConnectionPhase::ConnectedAlone;
        }
    }

    /// Explicit teardown. Idempotent.
    pub fn disconnected(&mut self) {
        self.phase = ConnectionPhase::Disconnected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_fires_peer_joined_once_per_transition() {
        let mut tracker = PresenceTracker::new();
        tracker.connect_started();
        tracker.transport_connected();

        assert!(tracker.peer_observed());
        // Repeated observations (heartbeats) must not re-fire.
        assert!(!tracker.peer_observed());
        assert!(!tracker.peer_observed());

        tracker.peer_lost();
        assert!(!tracker.peer_connected());
        assert!(tracker.peer_observed());
    }

    #[test]
    fn it_fires_peer_joined_again_after_reconnect() {
        let mut tracker = PresenceTracker::new();
        tracker.connect_started();
        tracker.transport_connected();
        assert!(tracker.peer_observed());

        tracker.transport_lost();
        assert!(!tracker.is_connected());

        tracker.transport_connected();
        assert!(tracker.peer_observed());
    }

    #[test]
    fn it_is_idempotent_on_disconnect() {
        let mut tracker = PresenceTracker::new();
        tracker.connect_started();
        tracker.transport_connected();

        tracker.disconnected();
        let phase = tracker.phase();
        tracker.disconnected();
        assert_eq!(tracker.phase(), phase);
        assert_eq!(tracker.phase(), ConnectionPhase::Disconnected);
    }
}
