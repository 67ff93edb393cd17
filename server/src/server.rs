use tokio::sync::mpsc::{channel, Sender};

use system::{
    CommandResult, ConnectionId, FatalError, IdentifiableCommand, IdentifiableEvent, LessonId,
    LiveCommand, LiveEvent, SystemCommand, SystemError, SystemEvent,
};

use crate::admin::{AdminCommand, LessonLiveDescription};
use crate::connection::ConnectionEvent;
use crate::connection_tx_storage::{ConnectionTx, ConnectionTxStorage};
use crate::server_state::{ConnectionState, ServerError, ServerState};

pub type ServerTx = Sender<ServerCommand>;

#[derive(Debug)]
pub enum ServerCommand {
    Connect {
        lesson_id: LessonId,
        tx: ConnectionTx,
    },
    Disconnect {
        from: ConnectionId,
    },
    IdentifiableCommand {
        from: ConnectionId,
        command: IdentifiableCommand,
    },
    AdminCommand(AdminCommand),
}

struct Server {
    server_state: ServerState,
    connections: ConnectionTxStorage,
}

impl Server {
    fn new() -> Self {
        Self {
            server_state: ServerState::new(),
            connections: ConnectionTxStorage::new(),
        }
    }

    async fn handle_server_command(&mut self, command: ServerCommand) {
        match command {
            ServerCommand::Connect { lesson_id, tx } => {
                let connection_id = self.server_state.create_connection(lesson_id);
                self.connections.insert(connection_id, tx);
                self.connections
                    .send(&connection_id, ConnectionEvent::Connected { connection_id })
                    .await;
            }
            ServerCommand::Disconnect { from } => {
                let _ = self.leave_session(&from).await;
                self.server_state.disconnect(&from);
                self.connections.remove(&from);
            }
            ServerCommand::IdentifiableCommand {
                from,
                command:
                    IdentifiableCommand {
                        command_id,
                        system_command,
                    },
            } => match self.handle_system_command(&from, system_command).await {
                Ok(system_event) => {
                    self.connections
                        .send(
                            &from,
                            ConnectionEvent::IdentifiableEvent(IdentifiableEvent::ByMyself {
                                command_id,
                                result: CommandResult::SystemEvent(system_event),
                            }),
                        )
                        .await
                }
                Err(system_error) => match system_error {
                    SystemError::FatalError(ref fatal_error) => {
                        log::warn!(
                            "Disconnecting a connection due to fatal error: {}",
                            fatal_error.reason
                        );
                        self.disconnect(&from).await;
                    }
                    system_error => {
                        self.connections
                            .send(
                                &from,
                                ConnectionEvent::IdentifiableEvent(IdentifiableEvent::ByMyself {
                                    command_id,
                                    result: CommandResult::Error(system_error),
                                }),
                            )
                            .await;
                    }
                },
            },
            ServerCommand::AdminCommand(admin_command) => {
                self.handle_admin_command(admin_command).await;
            }
        }
    }

    async fn handle_system_command(
        &mut self,
        from: &ConnectionId,
        command: SystemCommand,
    ) -> Result<SystemEvent, SystemError> {
        match command {
            SystemCommand::JoinSession {
                live_session_id,
                role,
            } => {
                let lesson_id = self
                    .server_state
                    .join_session(from, &live_session_id, role)
                    .map_err(|err| match err {
                        ServerError::LessonNotLive => SystemError::LessonNotLive,
                        ServerError::InvalidSessionId => SystemError::InvalidSessionId,
                        ServerError::RoleOccupied => SystemError::RoleOccupied,
                        ServerError::InvalidCommandForState => SystemError::FatalError(FatalError {
                            reason: "connection is already in a session".into(),
                        }),
                    })?;

                let session = self
                    .server_state
                    .sessions
                    .get(&lesson_id)
                    .expect("session must exist");
                let session_snapshot = session.snapshot();
                let peer = session.slot(role.peer());

                if let Some(peer_id) = peer {
                    self.send_system_event(
                        &peer_id,
                        SystemEvent::SessionStateChanged(session_snapshot.clone()),
                    )
                    .await;
                    self.send_system_event(
                        &peer_id,
                        SystemEvent::LiveEvent(LiveEvent::PeerJoined { role }),
                    )
                    .await;
                }

                Ok(SystemEvent::JoinedSession {
                    session_snapshot,
                    peer_present: peer.is_some(),
                })
            }
            SystemCommand::LeaveSession => {
                if self.leave_session(from).await.is_some() {
                    Ok(SystemEvent::LeftSession)
                } else {
                    Err(SystemError::FatalError(FatalError {
                        reason: "cannot leave session".into(),
                    }))
                }
            }
            SystemCommand::LiveCommand(live_command) => {
                self.handle_live_command(from, live_command).await
            }
        }
    }

    async fn handle_live_command(
        &mut self,
        from: &ConnectionId,
        command: LiveCommand,
    ) -> Result<SystemEvent, SystemError> {
        let (lesson_id, role) = match self.server_state.connection_states.get(from) {
            Some(ConnectionState::Joined(lesson_id, role)) => (*lesson_id, *role),
            _ => {
                return Err(SystemError::FatalError(FatalError {
                    reason: "connection isn't in any session".into(),
                }))
            }
        };

        if !command.permitted_for(role) {
            log::warn!("{} tried to send {:?}", role, command);
            return Err(SystemError::NotPermitted);
        }

        if let LiveCommand::PageChange { page } = command {
            let total_pages = self
                .server_state
                .sessions
                .get(&lesson_id)
                .map(|session| session.total_pages)
                .unwrap_or(0);
            if page >= total_pages {
                log::warn!("page change to {} outside [0, {})", page, total_pages);
                return Err(SystemError::PageOutOfRange);
            }
        }

        if let LiveCommand::EndSession = command {
            if let Some(session) = self.server_state.close_live_session(&lesson_id) {
                for (connection_id, _) in session.participants() {
                    if &connection_id != from {
                        self.send_system_event(
                            &connection_id,
                            SystemEvent::LiveEvent(LiveEvent::SessionEnded),
                        )
                        .await;
                    }
                }
            }
            return Ok(SystemEvent::LiveEvent(LiveEvent::SessionEnded));
        }

        let event = LiveEvent::from_command(command);
        if let Some(peer_id) = self.server_state.peer_of(&lesson_id, role) {
            self.send_system_event(&peer_id, SystemEvent::LiveEvent(event.clone()))
                .await;
        }
        Ok(SystemEvent::LiveEvent(event))
    }

    async fn handle_admin_command(&mut self, command: AdminCommand) {
        match command {
            AdminCommand::GetSessionState { lesson_id, tx } => {
                let description = match self.server_state.sessions.get(&lesson_id) {
                    Some(session) => LessonLiveDescription::Live {
                        live_session_id: session.live_session_id,
                        teacher_present: session.teacher.is_some(),
                        student_present: session.student.is_some(),
                    },
                    None => LessonLiveDescription::Offline,
                };
                if tx.send(description).is_err() {
                    log::warn!("admin receiver dropped");
                }
            }
            AdminCommand::OpenLiveSession {
                lesson_id,
                total_pages,
                tx,
            } => {
                let live_session_id = self.server_state.open_live_session(lesson_id, total_pages);
                if tx.send(live_session_id).is_err() {
                    log::warn!("admin receiver dropped");
                }
            }
            AdminCommand::CloseLiveSession { lesson_id, tx } => {
                let closed = match self.server_state.close_live_session(&lesson_id) {
                    Some(session) => {
                        for (connection_id, _) in session.participants() {
                            self.send_system_event(
                                &connection_id,
                                SystemEvent::LiveEvent(LiveEvent::SessionEnded),
                            )
                            .await;
                        }
                        true
                    }
                    None => false,
                };
                if tx.send(closed).is_err() {
                    log::warn!("admin receiver dropped");
                }
            }
        }
    }

    async fn send_system_event(&mut self, connection_id: &ConnectionId, event: SystemEvent) {
        self.connections
            .send(
                connection_id,
                ConnectionEvent::IdentifiableEvent(IdentifiableEvent::BySystem {
                    system_event: event,
                }),
            )
            .await;
    }

    async fn leave_session(&mut self, connection_id: &ConnectionId) -> Option<LessonId> {
        let (lesson_id, role) = self.server_state.leave_session(connection_id)?;
        let session_snapshot = self
            .server_state
            .sessions
            .get(&lesson_id)
            .expect("session must exist")
            .snapshot();
        if let Some(peer_id) = self.server_state.peer_of(&lesson_id, role) {
            self.send_system_event(
                &peer_id,
                SystemEvent::SessionStateChanged(session_snapshot),
            )
            .await;
            self.send_system_event(
                &peer_id,
                SystemEvent::LiveEvent(LiveEvent::PeerLeft { role }),
            )
            .await;
        }
        Some(lesson_id)
    }

    async fn disconnect(&mut self, connection_id: &ConnectionId) {
        self.leave_session(connection_id).await;
        self.server_state.disconnect(connection_id);
        self.connections
            .send(
                connection_id,
                ConnectionEvent::Disconnected {
                    connection_id: *connection_id,
                },
            )
            .await;
        self.connections.remove(connection_id);
    }
}

pub fn spawn_server() -> ServerTx {
    let (srv_tx, mut srv_rx) = channel::<ServerCommand>(16);

    tokio::spawn(async move {
        let mut server = Box::new(Server::new());

        while let Some(command) = srv_rx.recv().await {
            server.handle_server_command(command).await;
        }
    });

    return srv_tx;
}
