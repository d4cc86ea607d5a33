//! Spatial value types
//!
//! Vectors and rotators are stored as comma-separated triples ("x,y,z").

use serde::{Deserialize, Serialize};
use std::fmt;

use super::text::{format_float, parse_float};

/// Split "a,b,c" into exactly three floats, dropping empty parts
fn parse_triple(text: &str) -> Option<[f64; 3]> {
    let parts: Vec<&str> = text.split(',').filter(|p| !p.trim().is_empty()).collect();
    if parts.len() != 3 {
        return None;
    }
    Some([parse_float(parts[0]), parse_float(parts[1]), parse_float(parts[2])])
}

/// Whether text splits into exactly three components
pub fn is_triple(text: &str) -> bool {
    text.split(',').filter(|p| !p.trim().is_empty()).count() == 3
}

/// Three-component position or direction
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Parse "x,y,z". Returns None unless there are exactly three parts.
    pub fn parse(text: &str) -> Option<Self> {
        parse_triple(text).map(|[x, y, z]| Self { x, y, z })
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", format_float(self.x), format_float(self.y), format_float(self.z))
    }
}

/// Orientation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotator {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Rotator {
    pub const ZERO: Rotator = Rotator { pitch: 0.0, yaw: 0.0, roll: 0.0 };

    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Parse "pitch,yaw,roll". Returns None unless there are exactly three parts.
    pub fn parse(text: &str) -> Option<Self> {
        parse_triple(text).map(|[pitch, yaw, roll]| Self { pitch, yaw, roll })
    }
}

impl fmt::Display for Rotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            format_float(self.pitch),
            format_float(self.yaw),
            format_float(self.roll)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_parse() {
        assert_eq!(Vector3::parse("1,2.5,-3"), Some(Vector3::new(1.0, 2.5, -3.0)));
        assert_eq!(Vector3::parse(" 1 , 2 , 3 "), Some(Vector3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_vector_wrong_arity() {
        assert_eq!(Vector3::parse("1,2"), None);
        assert_eq!(Vector3::parse("1,2,3,4"), None);
        assert_eq!(Vector3::parse(""), None);
    }

    #[test]
    fn test_empty_parts_are_dropped() {
        assert_eq!(Vector3::parse("1,,2,3"), Some(Vector3::new(1.0, 2.0, 3.0)));
        assert!(is_triple("1,,2,3,"));
    }

    #[test]
    fn test_rotator_display() {
        assert_eq!(Rotator::new(0.0, 90.0, 12.5).to_string(), "0.0,90.0,12.5");
    }
}
