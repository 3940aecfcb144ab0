use std::fmt;

/// Hit radius at difficulty 1, as a fraction of the play area's width/height.
pub const BASE_RADIUS: f64 = 0.03;

/// Player-controlled difficulty level, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Normalizes any integer into the supported range instead of rejecting it.
    pub fn clamped(level: i64) -> Self {
        Self(level.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Half-width of the square hit region. Inversely proportional to the level.
    pub fn tolerance(self) -> f64 {
        BASE_RADIUS / self.0 as f64
    }

    pub fn harder(self) -> Self {
        Self::clamped(self.0 as i64 + 1)
    }

    pub fn easier(self) -> Self {
        Self::clamped(self.0 as i64 - 1)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
