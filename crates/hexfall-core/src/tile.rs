use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Grid coordinates of one hexagon: floor, row, column.
///
/// Renders as `"<floor>-<row>-<column>"`, the key carried by tile-hit
/// broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileKey {
    pub floor: u8,
    pub row: u8,
    pub column: u8,
}

impl TileKey {
    pub const fn new(floor: u8, row: u8, column: u8) -> Self {
        Self { floor, row, column }
    }
}

impl std::fmt::Display for TileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.floor, self.row, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileKeyError {
    WrongPartCount(usize),
    InvalidNumber(String),
}

impl std::fmt::Display for TileKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongPartCount(n) => write!(f, "expected 3 tile key parts, got {n}"),
            Self::InvalidNumber(part) => write!(f, "invalid tile coordinate: {part:?}"),
        }
    }
}

impl std::error::Error for TileKeyError {}

impl FromStr for TileKey {
    type Err = TileKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('-').collect();
        let [floor, row, column] = parts[..] else {
            return Err(TileKeyError::WrongPartCount(parts.len()));
        };
        let parse = |part: &str| {
            part.parse::<u8>()
                .map_err(|_| TileKeyError::InvalidNumber(part.to_string()))
        };
        Ok(Self::new(parse(floor)?, parse(row)?, parse(column)?))
    }
}
