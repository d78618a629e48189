use serde::{Deserialize, Serialize};

use crate::player::{PlayerId, PlayerProfile, PlayerUpdate};
use crate::session::SessionState;
use crate::tile::TileKey;

/// Network message type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageType {
    // Roster (transport notifications)
    PlayerJoined = 0x01,
    PlayerQuit = 0x02,
    PlayerUpdate = 0x03,

    // Session (host or forced writes)
    SessionState = 0x10,
    LastDead = 0x11,

    // Broadcast calls
    TileHit = 0x20,
}

impl MessageType {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(Self::PlayerJoined),
            0x02 => Some(Self::PlayerQuit),
            0x03 => Some(Self::PlayerUpdate),
            0x10 => Some(Self::SessionState),
            0x11 => Some(Self::LastDead),
            0x20 => Some(Self::TileHit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerJoinedMsg {
    pub player_id: PlayerId,
    pub profile: PlayerProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerQuitMsg {
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerUpdateMsg {
    pub player_id: PlayerId,
    pub update: PlayerUpdate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStateMsg {
    pub state: SessionState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastDeadMsg {
    pub profile: PlayerProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileHitMsg {
    pub tile: TileKey,
}

/// Every message exchanged between Hexfall peers.
#[derive(Debug, Clone, PartialEq)]
pub enum NetMessage {
    PlayerJoined(PlayerJoinedMsg),
    PlayerQuit(PlayerQuitMsg),
    PlayerUpdate(PlayerUpdateMsg),
    SessionState(SessionStateMsg),
    LastDead(LastDeadMsg),
    TileHit(TileHitMsg),
}

impl NetMessage {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::PlayerJoined(_) => MessageType::PlayerJoined,
            Self::PlayerQuit(_) => MessageType::PlayerQuit,
            Self::PlayerUpdate(_) => MessageType::PlayerUpdate,
            Self::SessionState(_) => MessageType::SessionState,
            Self::LastDead(_) => MessageType::LastDead,
            Self::TileHit(_) => MessageType::TileHit,
        }
    }
}
