//! Encoded polyline format used by the directions service for route shapes.
//!
//! Each coordinate is stored as the delta from the previous point, scaled by
//! 1e5, zig-zag encoded and split into 5-bit chunks offset by 63.

use geo_types::{Coord, LineString};

use crate::{
    entities::Coordinates,
    error::{decode_error, Error},
};

const PRECISION: f64 = 1e5;
const CHUNK_BITS: u32 = 5;
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION: i64 = 0x20;
const OFFSET: u8 = 63;

pub fn decode(encoded: &str) -> Result<LineString<f64>, Error> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut points = Vec::new();

    while index < bytes.len() {
        lat += next_value(bytes, &mut index)?;
        lng += next_value(bytes, &mut index)?;

        points.push(Coord::from(Coordinates::new(
            lat as f64 / PRECISION,
            lng as f64 / PRECISION,
        )));
    }

    Ok(LineString::from(points))
}

pub fn encode(points: &[Coordinates]) -> String {
    let mut encoded = String::new();
    let mut previous = (0i64, 0i64);

    for point in points {
        let lat = (point.lat * PRECISION).round() as i64;
        let lng = (point.lng * PRECISION).round() as i64;

        push_value(lat - previous.0, &mut encoded);
        push_value(lng - previous.1, &mut encoded);

        previous = (lat, lng);
    }

    encoded
}

fn next_value(bytes: &[u8], index: &mut usize) -> Result<i64, Error> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = *bytes
            .get(*index)
            .ok_or_else(|| decode_error("truncated polyline"))?;

        if !(OFFSET..=126).contains(&byte) {
            return Err(decode_error("invalid polyline character"));
        }

        // 32-bit deltas never need more than 7 chunks
        if shift > 30 {
            return Err(decode_error("polyline value overflow"));
        }

        *index += 1;

        let chunk = (byte - OFFSET) as i64;
        result |= (chunk & CHUNK_MASK) << shift;
        shift += CHUNK_BITS;

        if chunk & CONTINUATION == 0 {
            break;
        }
    }

    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

fn push_value(value: i64, encoded: &mut String) {
    let mut value = if value < 0 { !(value << 1) } else { value << 1 };

    while value >= CONTINUATION {
        encoded.push(((CONTINUATION | (value & CHUNK_MASK)) as u8 + OFFSET) as char);
        value >>= CHUNK_BITS;
    }

    encoded.push((value as u8 + OFFSET) as char);
}

#[cfg(test)]
pub(crate) const FIXTURE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

#[cfg(test)]
pub(crate) fn fixture_points() -> Vec<Coordinates> {
    vec![
        Coordinates::new(38.5, -120.2),
        Coordinates::new(40.7, -120.95),
        Coordinates::new(43.252, -126.453),
    ]
}

#[test]
fn decode_fixture() {
    let line = decode(FIXTURE).unwrap();

    // x is longitude, y is latitude
    assert_eq!(line.0[0], Coord { x: -120.2, y: 38.5 });

    let points: Vec<Coordinates> = line.0.into_iter().map(Coordinates::from).collect();
    assert_eq!(points, fixture_points());
}

#[test]
fn decode_empty_path() {
    assert!(decode("").unwrap().0.is_empty());
}

#[test]
fn encode_fixture() {
    assert_eq!(encode(&fixture_points()), FIXTURE);
}

#[test]
fn decode_rejects_truncated_path() {
    // latitude of the first point without its longitude
    let err = decode("_p~iF").unwrap_err();
    assert_eq!(err.code, 102);

    // continuation bit set on the final chunk
    assert!(decode("_p~iF~ps|").is_err());
}

#[test]
fn decode_rejects_characters_outside_the_alphabet() {
    assert!(decode("_p~iF ps|U").is_err());
    assert!(decode("_p~iF~ps|U\u{e9}").is_err());
}
