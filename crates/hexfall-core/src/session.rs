use serde::{Deserialize, Serialize};

use crate::player::PlayerProfile;

/// Phase of a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Lobby,
    Countdown,
    Game,
    Winner,
}

impl Stage {
    /// The stage entered when this stage's timer runs out.
    pub const fn next(self) -> Stage {
        match self {
            Self::Lobby => Self::Countdown,
            Self::Countdown => Self::Game,
            Self::Game => Self::Winner,
            Self::Winner => Self::Lobby,
        }
    }

    /// Entering this stage revives every player.
    pub const fn resets_players(self) -> bool {
        matches!(self, Self::Lobby | Self::Countdown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lobby => "lobby",
            Self::Countdown => "countdown",
            Self::Game => "game",
            Self::Winner => "winner",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timer value each stage starts with, in seconds.
///
/// The game stage counts up from its start value; the others count down and
/// advance when they hit zero. The lobby never ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageTimers {
    pub lobby: i32,
    pub countdown: i32,
    pub game: i32,
    pub winner: i32,
}

impl Default for StageTimers {
    fn default() -> Self {
        Self {
            lobby: -1,
            countdown: 3,
            game: 0,
            winner: 5,
        }
    }
}

impl StageTimers {
    pub fn start_value(&self, stage: Stage) -> i32 {
        match stage {
            Stage::Lobby => self.lobby,
            Stage::Countdown => self.countdown,
            Stage::Game => self.game,
            Stage::Winner => self.winner,
        }
    }

    /// Every ticking stage must be able to reach zero: countdown and winner
    /// start above it, game starts at or above it.
    pub fn validate(&self) -> Result<(), InvalidTimer> {
        let checks = [
            (Stage::Countdown, self.countdown, self.countdown > 0),
            (Stage::Game, self.game, self.game >= 0),
            (Stage::Winner, self.winner, self.winner > 0),
        ];
        match checks.into_iter().find(|(_, _, ok)| !ok) {
            Some((stage, value, _)) => Err(InvalidTimer { stage, value }),
            None => Ok(()),
        }
    }
}

/// A stage start value whose timer would never hit zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTimer {
    pub stage: Stage,
    pub value: i32,
}

impl std::fmt::Display for InvalidTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bound = if self.stage == Stage::Game { ">= 0" } else { "> 0" };
        write!(f, "timers.{} must be {bound}, got {}", self.stage, self.value)
    }
}

impl std::error::Error for InvalidTimer {}

/// Replicated session singleton. Only the host writes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub stage: Stage,
    pub timer: i32,
    pub winner: Option<PlayerProfile>,
    pub solo_game: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            stage: Stage::Lobby,
            timer: StageTimers::default().lobby,
            winner: None,
            solo_game: false,
        }
    }
}

impl SessionState {
    /// Survivors needed to keep a round going.
    pub fn win_threshold(&self) -> usize {
        if self.solo_game { 1 } else { 2 }
    }
}

/// Whether this process is the authoritative writer for session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Host,
    Observer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_cycle_back_to_lobby() {
        let mut stage = Stage::Lobby;
        let mut seen = Vec::new();
        for _ in 0..4 {
            stage = stage.next();
            seen.push(stage);
        }
        assert_eq!(
            seen,
            vec![Stage::Countdown, Stage::Game, Stage::Winner, Stage::Lobby]
        );
    }

    #[test]
    fn only_lobby_and_countdown_reset_players() {
        assert!(Stage::Lobby.resets_players());
        assert!(Stage::Countdown.resets_players());
        assert!(!Stage::Game.resets_players());
        assert!(!Stage::Winner.resets_players());
    }

    #[test]
    fn default_timers() {
        let timers = StageTimers::default();
        assert_eq!(timers.start_value(Stage::Lobby), -1);
        assert_eq!(timers.start_value(Stage::Countdown), 3);
        assert_eq!(timers.start_value(Stage::Game), 0);
        assert_eq!(timers.start_value(Stage::Winner), 5);
    }

    #[test]
    fn timers_that_never_reach_zero_are_invalid() {
        assert_eq!(StageTimers::default().validate(), Ok(()));
        let timers = StageTimers {
            countdown: 0,
            ..Default::default()
        };
        assert_eq!(
            timers.validate(),
            Err(InvalidTimer {
                stage: Stage::Countdown,
                value: 0
            })
        );
        let timers = StageTimers {
            game: -2,
            ..Default::default()
        };
        assert_eq!(timers.validate().map_err(|e| e.stage), Err(Stage::Game));
        let timers = StageTimers {
            winner: -1,
            ..Default::default()
        };
        assert_eq!(
            timers.validate().map_err(|e| e.to_string()),
            Err("timers.winner must be > 0, got -1".to_string())
        );
    }

    #[test]
    fn solo_threshold_is_one() {
        let mut state = SessionState::default();
        assert_eq!(state.win_threshold(), 2);
        state.solo_game = true;
        assert_eq!(state.win_threshold(), 1);
    }

    #[test]
    fn stage_display_matches_wire_names() {
        assert_eq!(Stage::Countdown.to_string(), "countdown");
    }
}
