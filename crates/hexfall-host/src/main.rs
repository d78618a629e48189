use std::time::Duration;

use tracing_subscriber::EnvFilter;

use hexfall_core::player::{PlayerColor, PlayerId, PlayerProfile, PlayerUpdate};
use hexfall_core::room::generate_room_code;
use hexfall_core::session::Stage;
use hexfall_host::config::HostConfig;
use hexfall_host::ticker::{HostBroadcast, HostCommand, spawn_stage_ticker};

fn bot_profile(index: usize) -> PlayerProfile {
    PlayerProfile::new(format!("Bot{}", index + 1), PlayerColor::for_index(index))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = HostConfig::load();
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid host configuration");
        std::process::exit(1);
    }

    let seed = config.seed.unwrap_or_else(rand::random);
    let room = generate_room_code(&mut rand::rng());
    tracing::info!(%room, seed, bots = config.bots, rounds = config.rounds, "Hexfall host starting");

    let mut ticker = spawn_stage_ticker(config.game.clone(), config.tick_interval(), seed);
    let bots: Vec<(PlayerId, PlayerProfile)> = (0..config.bots)
        .map(|i| (i as PlayerId + 1, bot_profile(i)))
        .collect();
    for (player_id, profile) in &bots {
        ticker.send(HostCommand::PlayerJoined {
            player_id: *player_id,
            profile: profile.clone(),
        });
    }
    ticker.send(HostCommand::StartGame);

    let fall_after = Duration::from_secs(config.bot_fall_after_secs);
    let mut rounds_played = 0;
    let mut messages = 0usize;
    while let Some(broadcast) = ticker.broadcasts.recv().await {
        match broadcast {
            HostBroadcast::EncodedMessage(data) => {
                messages += 1;
                tracing::trace!(bytes = data.len(), "Broadcast");
            },
            HostBroadcast::StageChanged {
                from,
                to,
                timer,
                winner,
            } => {
                tracing::info!(
                    %from,
                    %to,
                    timer,
                    winner = winner.as_ref().map(|w| w.name.as_str()),
                    "Stage changed"
                );
                match to {
                    Stage::Game => {
                        // Everyone but the first bot walks off the edge. A lone bot falls too.
                        tokio::time::sleep(fall_after).await;
                        let fallers = if bots.len() == 1 { &bots[..] } else { &bots[1..] };
                        for (player_id, profile) in fallers {
                            ticker.send(HostCommand::PlayerUpdate {
                                player_id: *player_id,
                                update: PlayerUpdate::Eliminated,
                            });
                            ticker.send(HostCommand::LastDead {
                                profile: profile.clone(),
                            });
                        }
                    },
                    Stage::Lobby => {
                        rounds_played += 1;
                        if rounds_played >= config.rounds {
                            ticker.send(HostCommand::Stop);
                        } else {
                            ticker.send(HostCommand::StartGame);
                        }
                    },
                    Stage::Countdown | Stage::Winner => {},
                }
            },
            HostBroadcast::Stopped => break,
        }
    }

    tracing::info!(rounds_played, messages, "Hexfall host finished");
    ticker.join().await;
}
