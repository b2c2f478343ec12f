//! Resolution profiles and frame timing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base frame rate of the player; the pulldown divides it.
pub const BASE_FRAME_RATE: f64 = 30.0;

/// Fixed pixel-dimension preset selected by a small integer id.
///
/// All profiles are 20 tiles wide; they differ in tile rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResolutionProfile {
    /// 160x72 (20x9 tiles).
    #[default]
    Tall,
    /// 160x64 (20x8 tiles).
    Medium,
    /// 160x56 (20x7 tiles).
    Short,
}

impl ResolutionProfile {
    /// All profiles in id order.
    pub const ALL: [ResolutionProfile; 3] = [Self::Tall, Self::Medium, Self::Short];

    /// Look up a profile by id.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Tall),
            1 => Some(Self::Medium),
            2 => Some(Self::Short),
            _ => None,
        }
    }

    /// Look up a profile by id, falling back to profile 0 for unknown ids.
    pub fn resolve(id: u8) -> Self {
        Self::from_id(id).unwrap_or_default()
    }

    /// Identifier passed to the build tool.
    pub fn id(&self) -> u8 {
        match self {
            Self::Tall => 0,
            Self::Medium => 1,
            Self::Short => 2,
        }
    }

    /// Frame dimensions as (width, height) in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Tall => (160, 72),
            Self::Medium => (160, 64),
            Self::Short => (160, 56),
        }
    }
}

impl std::fmt::Display for ResolutionProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (width, height) = self.dimensions();
        write!(f, "{}x{} (config {})", width, height, self.id())
    }
}

/// Invalid timing multiplier.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("fps multiplier must be a positive finite number, got {0}")]
pub struct PulldownError(pub f64);

/// Timing multiplier applied as a divisor to [`BASE_FRAME_RATE`].
///
/// 1.0 plays at the base rate, 2.0 halves it, 0.5 doubles it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pulldown(f64);

impl Pulldown {
    pub fn new(value: f64) -> Result<Self, PulldownError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(PulldownError(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Working frame rate derived from the base rate.
    pub fn frame_rate(&self) -> f64 {
        BASE_FRAME_RATE / self.0
    }

    /// Render the multiplier for command lines, always with a decimal point.
    pub fn to_arg(&self) -> String {
        format!("{:?}", self.0)
    }
}

impl Default for Pulldown {
    fn default() -> Self {
        Self(1.0)
    }
}

impl std::fmt::Display for Pulldown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl std::str::FromStr for Pulldown {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a number", s))?;
        Pulldown::new(value).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_dimensions() {
        assert_eq!(ResolutionProfile::resolve(0).dimensions(), (160, 72));
        assert_eq!(ResolutionProfile::resolve(1).dimensions(), (160, 64));
        assert_eq!(ResolutionProfile::resolve(2).dimensions(), (160, 56));
    }

    #[test]
    fn unknown_profile_falls_back_to_default() {
        assert_eq!(ResolutionProfile::from_id(7), None);
        assert_eq!(ResolutionProfile::resolve(7).dimensions(), (160, 72));
        assert_eq!(ResolutionProfile::resolve(255), ResolutionProfile::Tall);
    }

    #[test]
    fn profile_ids_round_trip() {
        for profile in ResolutionProfile::ALL {
            assert_eq!(ResolutionProfile::from_id(profile.id()), Some(profile));
        }
    }

    #[test]
    fn frame_rate_derivation() {
        assert_eq!(Pulldown::new(1.0).unwrap().frame_rate(), 30.0);
        assert_eq!(Pulldown::new(0.5).unwrap().frame_rate(), 60.0);
        assert_eq!(Pulldown::new(2.0).unwrap().frame_rate(), 15.0);
    }

    #[test]
    fn rejects_non_positive_pulldown() {
        assert!(Pulldown::new(0.0).is_err());
        assert!(Pulldown::new(-1.0).is_err());
        assert!(Pulldown::new(f64::NAN).is_err());
        assert!("abc".parse::<Pulldown>().is_err());
        assert_eq!("0.5".parse::<Pulldown>().unwrap().value(), 0.5);
    }

    #[test]
    fn pulldown_arg_keeps_decimal_point() {
        assert_eq!(Pulldown::default().to_arg(), "1.0");
        assert_eq!(Pulldown::new(0.5).unwrap().to_arg(), "0.5");
    }

    #[test]
    fn display_shows_dimensions_and_id() {
        assert_eq!(ResolutionProfile::Medium.to_string(), "160x64 (config 1)");
    }
}
