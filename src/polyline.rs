//! Route geometry as a decoded coordinate sequence.
//!
//! Routing providers ship overview geometry in the compact polyline format:
//! each coordinate is stored as a signed delta from the previous one, scaled
//! by 1e5, zig-zag encoded and split into 5-bit chunks offset by 63 so every
//! byte is printable ASCII. Decoding happens once at the gateway boundary;
//! everything downstream works on [`Polyline`].

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::model::GeoPoint;

const PRECISION: f64 = 1e5;

/// Chunks needed for any 32-bit value.
const MAX_CHUNKS: u32 = 7;

/// A directed path of coordinates, index 0 being the start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<GeoPoint>,
}

impl Polyline {
    /// Wraps already-decoded points, start first.
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    /// Decodes a 5-digit precision encoded polyline.
    ///
    /// An empty string decodes to an empty polyline; callers that need at
    /// least one point must check [`Polyline::is_empty`].
    pub fn decode(encoded: &str) -> Result<Self, DecodeError> {
        let bytes = encoded.as_bytes();
        let mut offset = 0;
        let mut lat = 0i64;
        let mut lng = 0i64;
        let mut points = Vec::new();

        while offset < bytes.len() {
            let (dlat, next) = read_value(bytes, offset)?;
            if next >= bytes.len() {
                return Err(DecodeError::Truncated { offset: next });
            }
            let (dlng, next) = read_value(bytes, next)?;
            offset = next;

            lat += dlat;
            lng += dlng;
            points.push(GeoPoint::new(lat as f64 / PRECISION, lng as f64 / PRECISION));
        }

        Ok(Self { points })
    }

    /// Encodes the points at 5-digit precision.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        let mut prev_lat = 0i64;
        let mut prev_lng = 0i64;

        for point in &self.points {
            let lat = (point.lat * PRECISION).round() as i64;
            let lng = (point.lng * PRECISION).round() as i64;
            write_value(lat - prev_lat, &mut out);
            write_value(lng - prev_lng, &mut out);
            prev_lat = lat;
            prev_lng = lng;
        }

        out
    }

    /// The path points in travel order.
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Reads one zig-zag varint starting at `start`, returning the value and the
/// offset just past it.
fn read_value(bytes: &[u8], start: usize) -> Result<(i64, usize), DecodeError> {
    let mut result = 0i64;
    let mut shift = 0u32;
    let mut offset = start;

    loop {
        let Some(&byte) = bytes.get(offset) else {
            return Err(DecodeError::Truncated { offset });
        };
        if !(63..=126).contains(&byte) {
            return Err(DecodeError::InvalidByte { byte, offset });
        }
        if shift / 5 >= MAX_CHUNKS {
            return Err(DecodeError::Overflow { offset: start });
        }

        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        offset += 1;

        if chunk < 0x20 {
            break;
        }
    }

    let value = if result & 1 == 1 { !(result >> 1) } else { result >> 1 };
    Ok((value, offset))
}

fn write_value(value: i64, out: &mut String) {
    let mut v = ((value << 1) ^ (value >> 63)) as u64;
    while v >= 0x20 {
        out.push(char::from((0x20 | (v & 0x1f)) as u8 + 63));
        v >>= 5;
    }
    out.push(char::from(v as u8 + 63));
}
