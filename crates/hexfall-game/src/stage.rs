//! Host-authoritative stage machine and roster.
//!
//! Every client keeps a [`Session`]. Only a host-role session hands out a
//! [`HostControl`], which is the sole way to write stage, timer and winner.
//! Observers apply the snapshots the host broadcasts.

use glam::Vec3;
use hexfall_core::net::messages::{NetMessage, PlayerUpdateMsg, SessionStateMsg};
use hexfall_core::player::{Player, PlayerId, PlayerProfile, PlayerUpdate};
use hexfall_core::session::{Role, SessionState, Stage, StageTimers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A host-only operation was attempted by an observer.
    NotHost,
    /// A host received a session snapshot from elsewhere.
    HostAuthoritative,
    StageMismatch { expected: Stage, actual: Stage },
    UnknownPlayer(PlayerId),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotHost => write!(f, "operation requires the host role"),
            Self::HostAuthoritative => {
                write!(f, "host owns the session state and ignores remote snapshots")
            },
            Self::StageMismatch { expected, actual } => {
                write!(f, "expected stage {expected}, session is in {actual}")
            },
            Self::UnknownPlayer(id) => write!(f, "unknown player {id}"),
        }
    }
}

impl std::error::Error for SessionError {}

/// A change made to the session, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StageChanged { from: Stage, to: Stage },
    TimerChanged(i32),
    WinnerChanged(Option<PlayerProfile>),
    PlayerUpdated {
        player_id: PlayerId,
        update: PlayerUpdate,
    },
}

impl SessionEvent {
    fn touches_session(&self) -> bool {
        !matches!(self, Self::PlayerUpdated { .. })
    }
}

/// Map host-side events to the messages peers need: one session snapshot when
/// any session field changed, then every per-player write in order.
pub fn replicate(state: &SessionState, events: &[SessionEvent]) -> Vec<NetMessage> {
    let mut out = Vec::new();
    if events.iter().any(SessionEvent::touches_session) {
        out.push(NetMessage::SessionState(SessionStateMsg {
            state: state.clone(),
        }));
    }
    for event in events {
        if let SessionEvent::PlayerUpdated { player_id, update } = event {
            out.push(NetMessage::PlayerUpdate(PlayerUpdateMsg {
                player_id: *player_id,
                update: update.clone(),
            }));
        }
    }
    out
}

/// Local view of the match: stage, timer, winner and the roster.
#[derive(Debug, Clone)]
pub struct Session {
    role: Role,
    state: SessionState,
    players: Vec<Player>,
    timers: StageTimers,
    last_dead: Option<PlayerProfile>,
}

impl Session {
    /// Timers that would never reach zero are replaced by the defaults.
    pub fn new(role: Role, timers: StageTimers) -> Self {
        let timers = match timers.validate() {
            Ok(()) => timers,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid stage timers, using defaults");
                StageTimers::default()
            },
        };
        let state = SessionState {
            timer: timers.lobby,
            ..SessionState::default()
        };
        Self {
            role,
            state,
            players: Vec::new(),
            timers,
            last_dead: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_host(&self) -> bool {
        self.role == Role::Host
    }

    /// Host election by the transport can move the role at any time.
    pub fn set_role(&mut self, role: Role) {
        if self.role != role {
            tracing::info!(from = ?self.role, to = ?role, "Session role changed");
            self.role = role;
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage
    }

    pub fn timers(&self) -> &StageTimers {
        &self.timers
    }

    /// Roster in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.state.is_alive()).count()
    }

    pub fn last_dead(&self) -> Option<&PlayerProfile> {
        self.last_dead.as_ref()
    }

    /// Record the most recently eliminated player. Any client may write it.
    pub fn record_last_dead(&mut self, profile: PlayerProfile) {
        tracing::debug!(name = %profile.name, "Recorded last eliminated player");
        self.last_dead = Some(profile);
    }

    /// Host-only write access. Observers get [`SessionError::NotHost`].
    pub fn host(&mut self) -> Result<HostControl<'_>, SessionError> {
        if self.role != Role::Host {
            return Err(SessionError::NotHost);
        }
        Ok(HostControl { session: self })
    }

    /// Add a player to the local roster. Returns false if already present.
    pub fn player_joined(&mut self, id: PlayerId, profile: PlayerProfile) -> bool {
        if self.player(id).is_some() {
            tracing::debug!(player_id = id, "Duplicate join ignored");
            return false;
        }
        tracing::info!(player_id = id, name = %profile.name, "Player joined");
        self.players.push(Player::new(id, profile));
        true
    }

    /// Remove a player from the local roster.
    pub fn player_quit(&mut self, id: PlayerId) -> Option<Player> {
        let idx = self.players.iter().position(|p| p.id == id)?;
        let player = self.players.remove(idx);
        tracing::info!(player_id = id, name = %player.profile.name, "Player left");
        Some(player)
    }

    /// Apply a replicated per-player write. Returns whether anything changed.
    pub fn apply_player_update(
        &mut self,
        id: PlayerId,
        update: &PlayerUpdate,
    ) -> Result<bool, SessionError> {
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(SessionError::UnknownPlayer(id))?;
        Ok(player.state.apply(update))
    }

    /// Adopt a snapshot broadcast by the host.
    pub fn apply_session_state(
        &mut self,
        state: SessionState,
    ) -> Result<Vec<SessionEvent>, SessionError> {
        if self.role == Role::Host {
            return Err(SessionError::HostAuthoritative);
        }
        let mut events = Vec::new();
        if state.stage != self.state.stage {
            events.push(SessionEvent::StageChanged {
                from: self.state.stage,
                to: state.stage,
            });
        }
        if state.timer != self.state.timer {
            events.push(SessionEvent::TimerChanged(state.timer));
        }
        if state.winner != self.state.winner {
            events.push(SessionEvent::WinnerChanged(state.winner.clone()));
        }
        self.state = state;
        Ok(events)
    }
}

/// Write access to a host-role [`Session`].
#[derive(Debug)]
pub struct HostControl<'a> {
    session: &'a mut Session,
}

impl HostControl<'_> {
    /// Leave the lobby: countdown from the configured start value.
    pub fn start_game(&mut self) -> Result<Vec<SessionEvent>, SessionError> {
        let s = &mut *self.session;
        if s.state.stage != Stage::Lobby {
            return Err(SessionError::StageMismatch {
                expected: Stage::Lobby,
                actual: s.state.stage,
            });
        }
        let mut events = Vec::new();
        s.state.solo_game = s.players.len() == 1;
        if s.state.winner.take().is_some() {
            events.push(SessionEvent::WinnerChanged(None));
        }
        self.enter(Stage::Countdown, &mut events);
        tracing::info!(
            players = self.session.players.len(),
            solo = self.session.state.solo_game,
            "Game started"
        );
        Ok(events)
    }

    /// One-second host tick. Does nothing in the lobby.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        let stage = self.session.state.stage;
        if stage == Stage::Lobby {
            return events;
        }
        let new_time = if stage == Stage::Game {
            self.session.state.timer + 1
        } else {
            self.session.state.timer - 1
        };

        if new_time == 0 {
            self.enter(stage.next(), &mut events);
            return events;
        }

        if stage == Stage::Game && self.session.alive_count() < self.session.state.win_threshold() {
            let winner = self
                .session
                .players
                .iter()
                .find(|p| p.state.is_alive())
                .map(|p| p.profile.clone());
            match &winner {
                Some(profile) => tracing::info!(winner = %profile.name, "Round won"),
                None => tracing::info!("Round ended with no survivors"),
            }
            self.session.state.winner = winner.clone();
            events.push(SessionEvent::WinnerChanged(winner));
            self.enter(Stage::Winner, &mut events);
            return events;
        }

        self.session.state.timer = new_time;
        events.push(SessionEvent::TimerChanged(new_time));
        events
    }

    /// Give a joined player their spawn point. Latecomers during a round start dead.
    pub fn admit_player(
        &mut self,
        id: PlayerId,
        starting_pos: Vec3,
    ) -> Result<Vec<SessionEvent>, SessionError> {
        let update = PlayerUpdate::Spawn {
            starting_pos,
            dead: self.session.state.stage == Stage::Game,
        };
        self.session.apply_player_update(id, &update)?;
        Ok(vec![SessionEvent::PlayerUpdated {
            player_id: id,
            update,
        }])
    }

    fn enter(&mut self, next: Stage, events: &mut Vec<SessionEvent>) {
        let s = &mut *self.session;
        let from = s.state.stage;
        if next.resets_players() {
            for player in &mut s.players {
                player.state.apply(&PlayerUpdate::Reset);
                events.push(SessionEvent::PlayerUpdated {
                    player_id: player.id,
                    update: PlayerUpdate::Reset,
                });
            }
        }
        s.state.stage = next;
        s.state.timer = s.timers.start_value(next);
        tracing::info!(%from, to = %next, timer = s.state.timer, "Stage transition");
        events.push(SessionEvent::StageChanged { from, to: next });
        events.push(SessionEvent::TimerChanged(s.state.timer));
    }
}
