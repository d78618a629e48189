use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Opaque identifier handed out by the transport for each connected client.
pub type PlayerId = u64;

/// Avatar color selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for PlayerColor {
    fn default() -> Self {
        Self::PALETTE[0]
    }
}

impl PlayerColor {
    /// Predefined palette colors handed to joining players.
    pub const PALETTE: &[PlayerColor] = &[
        PlayerColor {
            r: 255,
            g: 87,
            b: 87,
        }, // Red
        PlayerColor {
            r: 78,
            g: 205,
            b: 196,
        }, // Teal
        PlayerColor {
            r: 255,
            g: 195,
            b: 18,
        }, // Yellow
        PlayerColor {
            r: 130,
            g: 88,
            b: 255,
        }, // Purple
        PlayerColor {
            r: 46,
            g: 213,
            b: 115,
        }, // Green
        PlayerColor {
            r: 255,
            g: 148,
            b: 77,
        }, // Orange
        PlayerColor {
            r: 83,
            g: 152,
            b: 255,
        }, // Blue
        PlayerColor {
            r: 255,
            g: 107,
            b: 175,
        }, // Pink
    ];

    /// Palette color for the n-th player, wrapping around.
    pub fn for_index(index: usize) -> Self {
        Self::PALETTE[index % Self::PALETTE.len()]
    }

    /// CSS-style hex string, e.g. `#ff5757`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Public profile of a player, as shown in the lobby and on the podium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    pub color: PlayerColor,
    /// Avatar photo URL, when the transport provides one.
    pub photo: Option<String>,
}

impl PlayerProfile {
    pub fn new(name: impl Into<String>, color: PlayerColor) -> Self {
        Self {
            name: name.into(),
            color,
            photo: None,
        }
    }
}

/// Animation clip a character is playing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Animation {
    #[default]
    Idle,
    Run,
    JumpUp,
    Fall,
    Wave,
}

impl Animation {
    /// Clip name in the character rig.
    pub fn clip_name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Run => "run",
            Self::JumpUp => "jump_up",
            Self::Fall => "fall",
            Self::Wave => "wave",
        }
    }
}

/// Replicated per-player state.
///
/// Transform fields stay `None` until the owning client has simulated at
/// least one frame; readers must treat `None` as "nothing to show yet".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: Option<Vec3>,
    pub rotation: Option<Quat>,
    pub animation: Animation,
    pub dead: bool,
    pub starting_pos: Option<Vec3>,
}

/// A single write to a player's replicated state.
///
/// `Motion` and `Eliminated` come from the client that owns the player;
/// `Spawn` and `Reset` come from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerUpdate {
    Motion {
        position: Vec3,
        rotation: Quat,
        animation: Animation,
    },
    Eliminated,
    Spawn {
        starting_pos: Vec3,
        dead: bool,
    },
    Reset,
}

impl PlayerState {
    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Apply one replicated write. Returns true if anything changed.
    pub fn apply(&mut self, update: &PlayerUpdate) -> bool {
        let before = self.clone();
        match update {
            PlayerUpdate::Motion {
                position,
                rotation,
                animation,
            } => {
                self.position = Some(*position);
                self.rotation = Some(*rotation);
                self.animation = *animation;
            },
            PlayerUpdate::Eliminated => {
                self.dead = true;
            },
            PlayerUpdate::Spawn { starting_pos, dead } => {
                self.starting_pos = Some(*starting_pos);
                self.dead = *dead;
            },
            PlayerUpdate::Reset => {
                self.dead = false;
                self.position = None;
                self.rotation = None;
            },
        }
        *self != before
    }
}

/// A player on the local roster.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub profile: PlayerProfile,
    pub state: PlayerState,
}

impl Player {
    pub fn new(id: PlayerId, profile: PlayerProfile) -> Self {
        Self {
            id,
            profile,
            state: PlayerState::default(),
        }
    }
}
