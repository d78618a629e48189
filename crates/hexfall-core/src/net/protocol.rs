use serde::{Deserialize, Serialize};

use super::messages::{
    LastDeadMsg, MessageType, NetMessage, PlayerJoinedMsg, PlayerQuitMsg, PlayerUpdateMsg,
    SessionStateMsg, TileHitMsg,
};

/// Maximum message payload size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024; // 64 KiB

#[derive(Debug)]
pub enum ProtocolError {
    EmptyMessage,
    UnknownMessageType(u8),
    PayloadTooLarge(usize),
    SerializeError(String),
    DeserializeError(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "empty message"),
            Self::UnknownMessageType(b) => write!(f, "unknown message type: 0x{b:02x}"),
            Self::PayloadTooLarge(size) => {
                write!(
                    f,
                    "payload too large: {size} bytes (max {MAX_MESSAGE_SIZE})"
                )
            },
            Self::SerializeError(e) => write!(f, "serialize error: {e}"),
            Self::DeserializeError(e) => write!(f, "deserialize error: {e}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Encode a serializable payload with a 1-byte type prefix.
pub fn encode_message<T: Serialize>(
    msg_type: MessageType,
    payload: &T,
) -> Result<Vec<u8>, ProtocolError> {
    let payload_bytes =
        rmp_serde::to_vec(payload).map_err(|e| ProtocolError::SerializeError(e.to_string()))?;
    let total = 1 + payload_bytes.len();
    if total > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge(total));
    }
    let mut buf = Vec::with_capacity(total);
    buf.push(msg_type as u8);
    buf.extend_from_slice(&payload_bytes);
    Ok(buf)
}

/// Encode a `NetMessage` to wire format.
pub fn encode_net_message(msg: &NetMessage) -> Result<Vec<u8>, ProtocolError> {
    let msg_type = msg.message_type();
    match msg {
        NetMessage::PlayerJoined(m) => encode_message(msg_type, m),
        NetMessage::PlayerQuit(m) => encode_message(msg_type, m),
        NetMessage::PlayerUpdate(m) => encode_message(msg_type, m),
        NetMessage::SessionState(m) => encode_message(msg_type, m),
        NetMessage::LastDead(m) => encode_message(msg_type, m),
        NetMessage::TileHit(m) => encode_message(msg_type, m),
    }
}

/// Extract the message type byte from raw wire data.
pub fn decode_message_type(data: &[u8]) -> Result<MessageType, ProtocolError> {
    if data.is_empty() {
        return Err(ProtocolError::EmptyMessage);
    }
    MessageType::from_byte(data[0]).ok_or(ProtocolError::UnknownMessageType(data[0]))
}

/// Decode a MessagePack payload (bytes after the type prefix).
pub fn decode_payload<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, ProtocolError> {
    if data.is_empty() {
        return Err(ProtocolError::EmptyMessage);
    }
    rmp_serde::from_slice(&data[1..]).map_err(|e| ProtocolError::DeserializeError(e.to_string()))
}

/// Decode raw wire data into a `NetMessage`.
pub fn decode_net_message(data: &[u8]) -> Result<NetMessage, ProtocolError> {
    let msg_type = decode_message_type(data)?;
    Ok(match msg_type {
        MessageType::PlayerJoined => {
            NetMessage::PlayerJoined(decode_payload::<PlayerJoinedMsg>(data)?)
        },
        MessageType::PlayerQuit => NetMessage::PlayerQuit(decode_payload::<PlayerQuitMsg>(data)?),
        MessageType::PlayerUpdate => {
            NetMessage::PlayerUpdate(decode_payload::<PlayerUpdateMsg>(data)?)
        },
        MessageType::SessionState => {
            NetMessage::SessionState(decode_payload::<SessionStateMsg>(data)?)
        },
        MessageType::LastDead => NetMessage::LastDead(decode_payload::<LastDeadMsg>(data)?),
        MessageType::TileHit => NetMessage::TileHit(decode_payload::<TileHitMsg>(data)?),
    })
}
