use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use hexfall_core::net::messages::{NetMessage, PlayerJoinedMsg, PlayerQuitMsg};
use hexfall_core::net::protocol::encode_net_message;
use hexfall_core::player::{PlayerId, PlayerProfile, PlayerUpdate};
use hexfall_core::session::{Role, Stage};
use hexfall_game::arena::Arena;
use hexfall_game::config::HexfallConfig;
use hexfall_game::stage::{Session, SessionEvent, replicate};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Commands sent to the stage ticker from the transport or a driver.
#[derive(Debug)]
pub enum HostCommand {
    PlayerJoined {
        player_id: PlayerId,
        profile: PlayerProfile,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    PlayerUpdate {
        player_id: PlayerId,
        update: PlayerUpdate,
    },
    LastDead {
        profile: PlayerProfile,
    },
    StartGame,
    Stop,
}

/// Output of the stage ticker.
#[derive(Debug, Clone)]
pub enum HostBroadcast {
    /// Encoded `NetMessage` ready for the transport.
    /// Uses `Bytes` for zero-copy cloning across peers.
    EncodedMessage(Bytes),
    StageChanged {
        from: Stage,
        to: Stage,
        timer: i32,
        winner: Option<PlayerProfile>,
    },
    /// The ticker has exited.
    Stopped,
}

/// Aborts the wrapped task when dropped.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Channels to a running ticker.
///
/// The task ends on `Stop`, when every command sender is dropped, or when the
/// handle itself is dropped (abort).
pub struct TickerHandle {
    pub commands: mpsc::UnboundedSender<HostCommand>,
    pub broadcasts: mpsc::UnboundedReceiver<HostBroadcast>,
    task: AbortOnDrop,
}

impl TickerHandle {
    pub fn send(&self, cmd: HostCommand) -> bool {
        self.commands.send(cmd).is_ok()
    }

    /// Wait for the ticker task to finish.
    pub async fn join(mut self) {
        if let Err(e) = (&mut self.task.0).await
            && !e.is_cancelled()
        {
            tracing::error!(error = %e, "Stage ticker panicked");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.0.is_finished()
    }
}

/// Spawn the host stage machine as a tokio task.
pub fn spawn_stage_ticker(
    config: HexfallConfig,
    tick_interval: Duration,
    seed: u64,
) -> TickerHandle {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (broadcast_tx, broadcast_rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        run_stage_ticker(config, tick_interval, seed, cmd_rx, broadcast_tx).await;
    });

    TickerHandle {
        commands: cmd_tx,
        broadcasts: broadcast_rx,
        task: AbortOnDrop(task),
    }
}

async fn run_stage_ticker(
    config: HexfallConfig,
    tick_interval: Duration,
    seed: u64,
    mut cmd_rx: mpsc::UnboundedReceiver<HostCommand>,
    broadcast_tx: mpsc::UnboundedSender<HostBroadcast>,
) {
    let mut rng = StdRng::seed_from_u64(seed);
    let arena = Arena::generate(config.arena.clone(), &mut rng);
    let mut session = Session::new(Role::Host, config.timers);
    let out = Broadcaster { tx: &broadcast_tx };

    // First tick one full interval from now, not immediately.
    let mut interval = tokio::time::interval_at(Instant::now() + tick_interval, tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(?tick_interval, "Stage ticker started");

    loop {
        tokio::select! {
            biased;

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(HostCommand::PlayerJoined { player_id, profile }) => {
                        if session.player_joined(player_id, profile.clone()) {
                            out.message(&NetMessage::PlayerJoined(PlayerJoinedMsg { player_id, profile }));
                            let spawn = arena.random_spawn(&mut rng);
                            let result = session
                                .host()
                                .and_then(|mut host| host.admit_player(player_id, spawn));
                            match result {
                                Ok(events) => out.events(&session, &events),
                                Err(e) => tracing::warn!(player_id, error = %e, "Admit failed"),
                            }
                        }
                    },
                    Some(HostCommand::PlayerLeft { player_id }) => {
                        if session.player_quit(player_id).is_some() {
                            out.message(&NetMessage::PlayerQuit(PlayerQuitMsg { player_id }));
                        }
                    },
                    Some(HostCommand::PlayerUpdate { player_id, update }) => {
                        if let Err(e) = session.apply_player_update(player_id, &update) {
                            tracing::debug!(error = %e, "Dropping player update");
                        }
                    },
                    Some(HostCommand::LastDead { profile }) => session.record_last_dead(profile),
                    Some(HostCommand::StartGame) => {
                        let result = session.host().and_then(|mut host| host.start_game());
                        match result {
                            Ok(events) => {
                                // Countdown steps are a full interval from the start.
                                interval.reset();
                                out.events(&session, &events);
                            },
                            Err(e) => tracing::warn!(error = %e, "Start rejected"),
                        }
                    },
                    Some(HostCommand::Stop) | None => break,
                }
            }
            _ = interval.tick() => {
                let events = session.host().map(|mut host| host.tick()).unwrap_or_default();
                out.events(&session, &events);
            }
        }
    }

    tracing::info!("Stage ticker stopped");
    let _ = broadcast_tx.send(HostBroadcast::Stopped);
}

struct Broadcaster<'a> {
    tx: &'a mpsc::UnboundedSender<HostBroadcast>,
}

impl Broadcaster<'_> {
    fn message(&self, msg: &NetMessage) {
        match encode_net_message(msg) {
            Ok(data) => {
                let _ = self.tx.send(HostBroadcast::EncodedMessage(Bytes::from(data)));
            },
            Err(e) => tracing::error!(error = %e, "Failed to encode broadcast"),
        }
    }

    fn events(&self, session: &Session, events: &[SessionEvent]) {
        for msg in replicate(session.state(), events) {
            self.message(&msg);
        }
        for event in events {
            if let SessionEvent::StageChanged { from, to } = event {
                let state = session.state();
                let _ = self.tx.send(HostBroadcast::StageChanged {
                    from: *from,
                    to: *to,
                    timer: state.timer,
                    winner: state.winner.clone(),
                });
            }
        }
    }
}
