use std::{fmt, str::FromStr};

use crate::error::{self, Error, ParseHailstoneError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vec3 {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Vec3 {
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }
}

impl FromStr for Vec3 {
    type Err = ParseHailstoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(str::trim)
            .map(|token| {
                token.parse::<i64>().map_err(|source| ParseHailstoneError::Int {
                    token: token.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        match parts[..] {
            [x, y, z] => Ok(Vec3 { x, y, z }),
            _ => Err(ParseHailstoneError::Arity { found: parts.len() }),
        }
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.z)
    }
}

/// A point moving at constant velocity: `location(t) = position + t * velocity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hailstone {
    pub position: Vec3,
    pub velocity: Vec3,
}

impl Hailstone {
    pub const fn new(position: Vec3, velocity: Vec3) -> Self {
        Self { position, velocity }
    }

    #[cfg(test)]
    pub(crate) fn location(&self, t: i64) -> Vec3 {
        Vec3 {
            x: self.position.x + t * self.velocity.x,
            y: self.position.y + t * self.velocity.y,
            z: self.position.z + t * self.velocity.z,
        }
    }
}

impl FromStr for Hailstone {
    type Err = ParseHailstoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (pos, vel) = s
            .split_once('@')
            .ok_or(ParseHailstoneError::MissingSeparator)?;

        Ok(Hailstone {
            position: pos.parse()?,
            velocity: vel.parse()?,
        })
    }
}

impl fmt::Display for Hailstone {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} @ {}", self.position, self.velocity)
    }
}

/// Parses one hailstone per non-blank line of the puzzle input.
pub fn parse_hailstones(input: &str) -> error::Result<Vec<Hailstone>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            line.parse::<Hailstone>()
                .map_err(|source| Error::Line { line: i + 1, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_single_line() {
        let hailstone: Hailstone = "19, 13, 30 @ -2, 1, -2".parse().unwrap();

        assert_eq!(hailstone.position, Vec3::new(19, 13, 30));
        assert_eq!(hailstone.velocity, Vec3::new(-2, 1, -2));
    }

    #[test]
    fn tolerates_padding_and_missing_spaces() {
        let padded: Hailstone = "20, 19, 15 @  1, -5, -3".parse().unwrap();
        assert_eq!(padded.velocity, Vec3::new(1, -5, -3));

        let tight: Hailstone = "19,13,30 @ -2,1,-2".parse().unwrap();
        assert_eq!(tight.position, Vec3::new(19, 13, 30));
    }

    #[test]
    fn rejects_two_velocity_components() {
        let err = "19, 13, 30 @ -2, 1".parse::<Hailstone>().unwrap_err();
        assert!(matches!(err, ParseHailstoneError::Arity { found: 2 }));
    }

    #[test]
    fn rejects_missing_separator() {
        let err = "19, 13, 30, -2, 1, -2".parse::<Hailstone>().unwrap_err();
        assert!(matches!(err, ParseHailstoneError::MissingSeparator));
    }

    #[test]
    fn rejects_non_integer() {
        let err = "19, 13.5, 30 @ -2, 1, -2".parse::<Hailstone>().unwrap_err();
        match err {
            ParseHailstoneError::Int { token, .. } => assert_eq!(token, "13.5"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn reports_line_number() {
        let input = "
19, 13, 30 @ -2,  1, -2
18, 19, 22 @ -1, -1
";
        match parse_hailstones(input).unwrap_err() {
            Error::Line { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn location_moves_along_velocity() {
        let hailstone: Hailstone = "19, 13, 30 @ -2, 1, -2".parse().unwrap();
        assert_eq!(hailstone.location(5), Vec3::new(9, 18, 20));
    }

    fn vec3() -> impl Strategy<Value = Vec3> {
        (any::<i64>(), any::<i64>(), any::<i64>()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    proptest! {
        #[test]
        fn display_then_parse_keeps_integers(position in vec3(), velocity in vec3()) {
            let hailstone = Hailstone::new(position, velocity);
            let reparsed: Hailstone = hailstone.to_string().parse().unwrap();
            prop_assert_eq!(reparsed, hailstone);
        }
    }
}
