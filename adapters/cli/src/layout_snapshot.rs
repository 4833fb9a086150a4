#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use warren_rendering::WallLayout;

const SNAPSHOT_DOMAIN: &str = "warren";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "warren:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of a generated wall layout and the grid geometry it belongs to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct WallLayoutSnapshot {
    /// Number of cells along each grid axis.
    pub side: u32,
    /// Length of a single cell edge expressed in world units.
    pub cell_size: f32,
    /// Seed the layout was generated from.
    pub seed: u64,
    /// Renderable wall set extracted from the grid.
    pub layout: WallLayout,
}

impl WallLayoutSnapshot {
    /// Encodes the snapshot into a single-line string suitable for handing
    /// to an external renderer.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let payload = SerializableSnapshot {
            cell_size: self.cell_size,
            seed: self.seed,
            layout: self.layout.clone(),
        };
        let json = serde_json::to_vec(&payload).expect("layout snapshot serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{SNAPSHOT_HEADER}:{}x{}:{encoded}", self.side, self.side)
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, SnapshotError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SnapshotError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(SnapshotError::MissingPrefix)?;
        let version = parts.next().ok_or(SnapshotError::MissingVersion)?;
        let dimensions = parts.next().ok_or(SnapshotError::MissingDimensions)?;
        let payload = parts.next().ok_or(SnapshotError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(SnapshotError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(version.to_owned()));
        }

        let side = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(SnapshotError::InvalidEncoding)?;
        let decoded: SerializableSnapshot =
            serde_json::from_slice(&bytes).map_err(SnapshotError::InvalidPayload)?;

        Ok(Self {
            side,
            cell_size: decoded.cell_size,
            seed: decoded.seed,
            layout: decoded.layout,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableSnapshot {
    cell_size: f32,
    seed: u64,
    layout: WallLayout,
}

/// Errors that can occur while decoding layout snapshot strings.
#[derive(Debug)]
pub(crate) enum SnapshotError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    MissingVersion,
    /// The encoded snapshot did not include grid dimensions.
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded snapshot.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "snapshot payload was empty"),
            Self::MissingPrefix => write!(f, "snapshot string is missing the prefix"),
            Self::MissingVersion => write!(f, "snapshot string is missing the version"),
            Self::MissingDimensions => write!(f, "snapshot string is missing the grid dimensions"),
            Self::MissingPayload => write!(f, "snapshot string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "snapshot prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "snapshot version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode snapshot payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse snapshot payload: {error}")
            }
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<u32, SnapshotError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| SnapshotError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| SnapshotError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| SnapshotError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || columns != rows {
        return Err(SnapshotError::InvalidDimensions(dimensions.to_owned()));
    }

    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use warren_core::CellCoord;
    use warren_rendering::{WallCap, WallOrientation, WallSegment};

    #[test]
    fn round_trip_empty_layout() {
        let snapshot = WallLayoutSnapshot {
            side: 8,
            cell_size: 1.0,
            seed: 42,
            layout: WallLayout::default(),
        };

        let encoded = snapshot.encode();
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:8x8:")));

        let decoded = WallLayoutSnapshot::decode(&encoded).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn round_trip_populated_layout() {
        let layout = WallLayout {
            segments: vec![WallSegment {
                cell: CellCoord::new(2, 3),
                orientation: WallOrientation::RowBoundary,
                position: Vec3::new(0.5, 0.0, 2.0),
                length: 1.0,
            }],
            caps: vec![
                WallCap {
                    position: Vec3::new(0.0, 0.0, 2.0),
                },
                WallCap {
                    position: Vec3::new(1.0, 0.0, 2.0),
                },
            ],
        };
        let snapshot = WallLayoutSnapshot {
            side: 12,
            cell_size: 2.0,
            seed: 7,
            layout,
        };

        let encoded = snapshot.encode();
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:12x12:")));

        let decoded = WallLayoutSnapshot::decode(&encoded).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn decode_rejects_foreign_prefixes() {
        assert!(matches!(
            WallLayoutSnapshot::decode("cavern:v1:4x4:AAAA"),
            Err(SnapshotError::InvalidPrefix(_))
        ));
    }

    #[test]
    fn decode_rejects_rectangular_dimensions() {
        assert!(matches!(
            WallLayoutSnapshot::decode("warren:v1:4x6:AAAA"),
            Err(SnapshotError::InvalidDimensions(_))
        ));
    }
}
