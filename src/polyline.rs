//! Polyline representation and decoding for route geometries.
//!
//! The optimizer returns each leg of the trip as an encoded polyline
//! (signed deltas, zig-zag folded, split into 5-bit chunks offset by 63).
//! Decoding happens once at the boundary; the rest of the crate works with
//! [`Polyline`] values.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::geo::{Bounds, Coordinate};

/// Decimal digits used by the server encoder (1e-5 degrees).
pub const DEFAULT_PRECISION: u32 = 5;

const MAX_PRECISION: u32 = 10;
const CHUNK_OFFSET: u8 = 63;
const CONTINUATION_BIT: i64 = 0x20;
const CHUNK_MASK: i64 = 0x1f;
const MAX_SHIFT: u32 = 60;

/// A route geometry as decoded coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points as `(longitude, latitude)` pairs.
    pub fn lon_lat(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(Coordinate::lon_lat).collect()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.points.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    #[error("invalid character {byte:#04x} at offset {offset}")]
    InvalidByte { offset: usize, byte: u8 },
    #[error("input ends inside a value at offset {offset}")]
    Truncated { offset: usize },
    #[error("value starting at offset {offset} overflows")]
    Overflow { offset: usize },
    #[error("precision {0} is outside 0..=10")]
    Precision(u32),
}

/// Decoder bound to the precision the server encodes with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolylineCodec {
    precision: u32,
    factor: f64,
}

impl Default for PolylineCodec {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            factor: 10f64.powi(DEFAULT_PRECISION as i32),
        }
    }
}

impl PolylineCodec {
    pub fn new(precision: u32) -> Result<Self, PolylineError> {
        if precision > MAX_PRECISION {
            return Err(PolylineError::Precision(precision));
        }
        Ok(Self {
            precision,
            factor: 10f64.powi(precision as i32),
        })
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Decodes an encoded polyline into its coordinate sequence.
    ///
    /// An empty string decodes to an empty polyline.
    pub fn decode(&self, encoded: &str) -> Result<Polyline, PolylineError> {
        let bytes = encoded.as_bytes();
        let mut offset = 0;
        let mut lat = 0i64;
        let mut lon = 0i64;
        let mut points = Vec::new();

        while offset < bytes.len() {
            let (dlat, next) = read_value(bytes, offset)?;
            if next >= bytes.len() {
                return Err(PolylineError::Truncated { offset: next });
            }
            let (dlon, next) = read_value(bytes, next)?;
            offset = next;

            lat = lat
                .checked_add(dlat)
                .ok_or(PolylineError::Overflow { offset })?;
            lon = lon
                .checked_add(dlon)
                .ok_or(PolylineError::Overflow { offset })?;

            points.push(Coordinate::new(
                lat as f64 / self.factor,
                lon as f64 / self.factor,
            ));
        }

        Ok(Polyline::new(points))
    }

    /// Decodes, degrading malformed input to an empty polyline.
    ///
    /// `layer` only labels the log event.
    pub fn decode_or_empty(&self, layer: &str, encoded: &str) -> Polyline {
        match self.decode(encoded) {
            Ok(polyline) => polyline,
            Err(err) => {
                warn!(layer, error = %err, "discarding malformed route geometry");
                Polyline::default()
            }
        }
    }
}

/// Reads one zig-zag encoded value starting at `start`.
fn read_value(bytes: &[u8], start: usize) -> Result<(i64, usize), PolylineError> {
    let mut result = 0i64;
    let mut shift = 0u32;
    let mut offset = start;

    loop {
        let Some(&byte) = bytes.get(offset) else {
            return Err(PolylineError::Truncated { offset });
        };
        if !(CHUNK_OFFSET..=126).contains(&byte) {
            return Err(PolylineError::InvalidByte { offset, byte });
        }
        if shift > MAX_SHIFT {
            return Err(PolylineError::Overflow { offset: start });
        }

        let chunk = i64::from(byte - CHUNK_OFFSET);
        result |= (chunk & CHUNK_MASK) << shift;
        shift += 5;
        offset += 1;

        if chunk & CONTINUATION_BIT == 0 {
            break;
        }
    }

    let value = if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    };
    Ok((value, offset))
}
