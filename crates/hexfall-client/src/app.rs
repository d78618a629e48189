use std::collections::HashMap;
use std::time::Duration;

use hexfall_core::net::messages::{LastDeadMsg, NetMessage, PlayerUpdateMsg};
use hexfall_core::net::protocol::{decode_net_message, encode_net_message};
use hexfall_core::player::{PlayerId, PlayerProfile, PlayerUpdate};
use hexfall_core::session::{Role, Stage};
use hexfall_core::tile::TileKey;
use hexfall_game::arena::Arena;
use hexfall_game::config::HexfallConfig;
use hexfall_game::movement::PhysicsBody;
use hexfall_game::stage::{Session, SessionError, SessionEvent, replicate};
use hexfall_game::tiles::{HitOutcome, TileBoard};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::audio::{AudioGate, AudioSink, SoundCue};
use crate::camera::{CameraFraming, CameraRig};
use crate::controller::{LocalCharacter, RenderTransform};
use crate::input::{InputState, KeyBindings};
use crate::net_client::Transport;
use crate::ui::HudView;

/// Seconds of frame time per host tick.
const TICK_INTERVAL: f32 = 1.0;

/// What the renderer needs to react to after a frame.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FrameReport {
    pub stage_changes: Vec<(Stage, Stage)>,
    pub disabled_tiles: Vec<TileKey>,
    pub camera: Option<CameraFraming>,
    pub eliminated: bool,
}

/// One client: session replica, arena, local character and the services around them.
pub struct ClientApp<T: Transport, S: AudioSink> {
    local_id: PlayerId,
    config: HexfallConfig,
    session: Session,
    arena: Arena,
    tiles: TileBoard,
    audio: AudioGate<S>,
    input: InputState,
    bindings: KeyBindings,
    camera: CameraRig,
    transport: T,
    character: LocalCharacter,
    remotes: HashMap<PlayerId, RenderTransform>,
    local_pose: RenderTransform,
    rng: StdRng,
    clock: Duration,
    tick_accumulator: f32,
    pending_stage_changes: Vec<(Stage, Stage)>,
}

impl<T: Transport, S: AudioSink> ClientApp<T, S> {
    pub fn new(
        local_id: PlayerId,
        role: Role,
        config: HexfallConfig,
        transport: T,
        sink: S,
        seed: u64,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let arena = Arena::generate(config.arena.clone(), &mut rng);
        let tiles = TileBoard::new(&arena, config.tiles.clone());
        let character = LocalCharacter::new(config.movement.clone(), arena.elimination_height());
        Self {
            local_id,
            session: Session::new(role, config.timers),
            config,
            arena,
            tiles,
            audio: AudioGate::new(sink),
            input: InputState::new(),
            bindings: KeyBindings::default(),
            camera: CameraRig::new(),
            transport,
            character,
            remotes: HashMap::new(),
            local_pose: RenderTransform::default(),
            rng,
            clock: Duration::ZERO,
            tick_accumulator: 0.0,
            pending_stage_changes: Vec::new(),
        }
    }

    pub fn local_id(&self) -> PlayerId {
        self.local_id
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn tiles(&self) -> &TileBoard {
        &self.tiles
    }

    pub fn config(&self) -> &HexfallConfig {
        &self.config
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn audio(&self) -> &AudioGate<S> {
        &self.audio
    }

    pub fn toggle_audio(&mut self) {
        self.audio.toggle();
    }

    /// Transport-level host election.
    pub fn set_role(&mut self, role: Role) {
        self.session.set_role(role);
        self.tick_accumulator = 0.0;
    }

    /// Pose to draw for a player this frame.
    pub fn render_transform(&self, id: PlayerId) -> Option<&RenderTransform> {
        if id == self.local_id {
            return Some(&self.local_pose);
        }
        self.remotes.get(&id)
    }

    pub fn hud(&self) -> HudView {
        HudView::build(
            self.session.state(),
            self.session.is_host(),
            self.audio.is_enabled(),
            self.session.last_dead(),
        )
    }

    /// Run one frame: network, local movement, replication, host tick,
    /// tile fades, then stage reactions.
    pub fn frame(&mut self, dt: f32, body: &mut impl PhysicsBody) -> FrameReport {
        let mut report = FrameReport::default();
        self.clock += Duration::try_from_secs_f32(dt).unwrap_or_default();

        self.dispatch_incoming();
        self.step_local(body, &mut report);
        self.step_remotes();
        self.host_tick(dt);
        report.disabled_tiles = self.tiles.update(dt);
        self.react_to_stage_changes(body, &mut report);
        self.input.end_frame();
        report
    }

    /// Roster join, from the transport or a `PlayerJoined` message.
    pub fn on_player_join(&mut self, id: PlayerId, profile: PlayerProfile) {
        if !self.session.player_joined(id, profile) {
            return;
        }
        if id != self.local_id {
            self.remotes.insert(id, RenderTransform::default());
        }
        let starting_pos = self.arena.random_spawn(&mut self.rng);
        let Ok(mut host) = self.session.host() else {
            return;
        };
        match host.admit_player(id, starting_pos) {
            Ok(events) => self.broadcast_events(&events),
            Err(e) => tracing::warn!(player_id = id, error = %e, "Failed to admit player"),
        }
    }

    pub fn on_player_quit(&mut self, id: PlayerId) {
        self.session.player_quit(id);
        self.remotes.remove(&id);
    }

    /// Physics reports the local player touching a tile.
    pub fn on_tile_contact(&mut self, key: TileKey) {
        if self.session.stage() != Stage::Game {
            return;
        }
        if let Some(msg) = self.tiles.local_hit(key) {
            self.send(&NetMessage::TileHit(msg));
            self.audio.play(SoundCue::TileHit, false, self.clock);
        }
    }

    /// Host presses Start. The countdown gets a full second per step from here.
    pub fn start_game(&mut self) -> Result<(), SessionError> {
        let events = self.session.host()?.start_game()?;
        self.tick_accumulator = 0.0;
        self.note_stage_changes(&events);
        self.broadcast_events(&events);
        Ok(())
    }

    fn dispatch_incoming(&mut self) {
        for data in self.transport.drain_messages() {
            match decode_net_message(&data) {
                Ok(msg) => self.handle_message(msg),
                Err(e) => tracing::debug!(error = %e, "Dropping malformed message"),
            }
        }
    }

    fn handle_message(&mut self, msg: NetMessage) {
        match msg {
            NetMessage::PlayerJoined(m) => self.on_player_join(m.player_id, m.profile),
            NetMessage::PlayerQuit(m) => self.on_player_quit(m.player_id),
            NetMessage::PlayerUpdate(m) => {
                if let Err(e) = self.session.apply_player_update(m.player_id, &m.update) {
                    tracing::debug!(error = %e, "Dropping player update");
                }
            },
            NetMessage::SessionState(m) => match self.session.apply_session_state(m.state) {
                Ok(events) => {
                    if events
                        .iter()
                        .any(|e| matches!(e, SessionEvent::StageChanged { .. }))
                    {
                        self.tick_accumulator = 0.0;
                    }
                    self.note_stage_changes(&events);
                },
                Err(e) => tracing::debug!(error = %e, "Dropping session snapshot"),
            },
            NetMessage::LastDead(m) => self.session.record_last_dead(m.profile),
            NetMessage::TileHit(m) => {
                if self.tiles.apply_remote_hit(m.tile) == HitOutcome::AlreadyHit {
                    tracing::debug!(tile = %m.tile, "Duplicate tile hit");
                }
            },
        }
    }

    fn step_local(&mut self, body: &mut impl PhysicsBody, report: &mut FrameReport) {
        if self.session.stage() == Stage::Lobby {
            return;
        }
        let Some(player) = self.session.player(self.local_id) else {
            return;
        };
        let profile = player.profile.clone();
        let input = self.input.movement_input(&self.bindings);
        let frame = self.character.step(body, &input, &player.state);
        self.local_pose = RenderTransform::from_motion(&frame.motion);

        let motion = frame.motion.to_update();
        self.apply_local(motion);
        if frame.motion.jumped {
            self.audio.play(SoundCue::Jump, false, self.clock);
        }
        if frame.eliminated {
            tracing::info!(player_id = self.local_id, "Fell out of the arena");
            self.apply_local(PlayerUpdate::Eliminated);
            self.session.record_last_dead(profile.clone());
            self.send(&NetMessage::LastDead(LastDeadMsg { profile }));
            self.audio.play(SoundCue::Dead, true, self.clock);
            report.eliminated = true;
        }
    }

    /// Write a local player's update and replicate it.
    fn apply_local(&mut self, update: PlayerUpdate) {
        match self.session.apply_player_update(self.local_id, &update) {
            Ok(_) => self.send(&NetMessage::PlayerUpdate(PlayerUpdateMsg {
                player_id: self.local_id,
                update,
            })),
            Err(e) => tracing::debug!(error = %e, "Local player missing from roster"),
        }
    }

    fn step_remotes(&mut self) {
        for player in self.session.players() {
            if let Some(transform) = self.remotes.get_mut(&player.id) {
                transform.observe_remote(&player.state);
            }
        }
    }

    fn host_tick(&mut self, dt: f32) {
        if !self.session.is_host() {
            return;
        }
        self.tick_accumulator += dt;
        while self.tick_accumulator >= TICK_INTERVAL {
            self.tick_accumulator -= TICK_INTERVAL;
            let Ok(mut host) = self.session.host() else {
                return;
            };
            let events = host.tick();
            self.note_stage_changes(&events);
            self.broadcast_events(&events);
        }
    }

    fn react_to_stage_changes(&mut self, body: &mut impl PhysicsBody, report: &mut FrameReport) {
        for (from, to) in std::mem::take(&mut self.pending_stage_changes) {
            if to == Stage::Countdown {
                self.tiles.reset();
                let start = self
                    .session
                    .player(self.local_id)
                    .and_then(|p| p.state.starting_pos);
                self.character.respawn(body, start);
            }
            report.stage_changes.push((from, to));
        }
        report.camera = self.camera.sync(self.session.stage());
    }

    fn note_stage_changes(&mut self, events: &[SessionEvent]) {
        for event in events {
            if let SessionEvent::StageChanged { from, to } = event {
                self.pending_stage_changes.push((*from, *to));
            }
        }
    }

    fn broadcast_events(&mut self, events: &[SessionEvent]) {
        for msg in replicate(self.session.state(), events) {
            self.send(&msg);
        }
    }

    fn send(&mut self, msg: &NetMessage) {
        let data = match encode_net_message(msg) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode message");
                return;
            },
        };
        if let Err(e) = self.transport.send(&data) {
            tracing::warn!(error = %e, "Failed to send message");
        }
    }
}
