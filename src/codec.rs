//! Position strings: the server's compact encoding of a set of points.
//!
//! Each point is two lowercase letters, column first, where `'a'` is 0.
//! `"aabc"` is the set `{(0, 0), (2, 1)}`.

use std::collections::BTreeSet;

use crate::board::Point;
use crate::constants::{COORD_ALPHABET_START, MAX_BOARD_SIZE};
use crate::error::DecodeError;

fn decode_coord(ch: char) -> Result<usize, DecodeError> {
    if !ch.is_ascii_lowercase() {
        return Err(DecodeError::InvalidCoordinate(ch));
    }
    Ok((ch as u8 - COORD_ALPHABET_START) as usize)
}

fn encode_coord(value: usize) -> char {
    (COORD_ALPHABET_START + value as u8) as char
}

/// Decode a position string into a set of points.
pub fn points_from_position_string(s: &str) -> Result<BTreeSet<Point>, DecodeError> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() % 2 != 0 {
        return Err(DecodeError::OddPositionString(chars.len()));
    }
    chars
        .chunks_exact(2)
        .map(|pair| {
            let column = decode_coord(pair[0])?;
            let row = decode_coord(pair[1])?;
            Ok(Point::new(row, column))
        })
        .collect()
}

/// Encode points into a position string, in row-major order.
///
/// Points beyond the alphabet cannot come from a supported board and are
/// skipped with a warning.
pub fn position_string_from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> String {
    let sorted: BTreeSet<&Point> = points.into_iter().collect();
    let mut s = String::with_capacity(sorted.len() * 2);
    for pt in sorted {
        if pt.row >= MAX_BOARD_SIZE || pt.column >= MAX_BOARD_SIZE {
            tracing::warn!(%pt, "point outside position-string alphabet, skipping");
            continue;
        }
        s.push(encode_coord(pt.column));
        s.push(encode_coord(pt.row));
    }
    s
}

/// `#[serde(with = "codec::position_string")]` for point sets carried as position strings.
pub mod position_string {
    use std::collections::BTreeSet;

    use serde::{Deserialize, Deserializer, Serializer};

    use crate::board::Point;

    pub fn serialize<S: Serializer>(points: &BTreeSet<Point>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::position_string_from_points(points))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeSet<Point>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::points_from_position_string(&s).map_err(serde::de::Error::custom)
    }
}

/// Like [`position_string`] for optional fields; `null` and a missing key are `None`.
pub mod optional_position_string {
    use std::collections::BTreeSet;

    use serde::{Deserialize, Deserializer, Serializer};

    use crate::board::Point;

    pub fn serialize<S: Serializer>(points: &Option<BTreeSet<Point>>, serializer: S) -> Result<S::Ok, S::Error> {
        match points {
            Some(points) => serializer.serialize_some(&super::position_string_from_points(points)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<BTreeSet<Point>>, D::Error> {
        let s: Option<String> = Option::deserialize(deserializer)?;
        s.map(|s| super::points_from_position_string(&s))
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_column_first() {
        let points = points_from_position_string("aabc").unwrap();
        let expected: BTreeSet<Point> = [Point::new(0, 0), Point::new(2, 1)].into_iter().collect();
        assert_eq!(points, expected);
    }

    #[test]
    fn test_empty_string_is_empty_set() {
        assert!(points_from_position_string("").unwrap().is_empty());
        assert_eq!(position_string_from_points(&BTreeSet::new()), "");
    }

    #[test]
    fn test_roundtrip() {
        let sets: [&[Point]; 4] = [
            &[],
            &[Point::new(0, 0)],
            &[Point::new(18, 18), Point::new(3, 15), Point::new(15, 3)],
            &[Point::new(24, 0), Point::new(0, 24), Point::new(12, 12)],
        ];
        for set in sets {
            let original: BTreeSet<Point> = set.iter().copied().collect();
            let encoded = position_string_from_points(&original);
            assert_eq!(encoded.len(), original.len() * 2);
            let decoded = points_from_position_string(&encoded).unwrap();
            assert_eq!(decoded, original, "roundtrip failed for {encoded:?}");
        }
    }

    #[test]
    fn test_encoding_is_order_independent() {
        let a = [Point::new(3, 4), Point::new(0, 1)];
        let b = [Point::new(0, 1), Point::new(3, 4)];
        assert_eq!(position_string_from_points(&a), position_string_from_points(&b));
        assert_eq!(position_string_from_points(&a), "baed");
    }

    #[test]
    fn test_malformed_strings() {
        assert!(matches!(
            points_from_position_string("abc"),
            Err(DecodeError::OddPositionString(3))
        ));
        assert!(matches!(
            points_from_position_string("a."),
            Err(DecodeError::InvalidCoordinate('.'))
        ));
        assert!(matches!(
            points_from_position_string("aA"),
            Err(DecodeError::InvalidCoordinate('A'))
        ));
    }
}
