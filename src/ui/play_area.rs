use ratatui::layout::Rect;

use crate::difficulty::Difficulty;
use crate::session::NormalizedPoint;

/// Terminal rectangle the playing field was last drawn into.
/// Translates between mouse cells and normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayArea {
    rect: Rect,
}

impl PlayArea {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// False until the field has been drawn at least once with a non-empty size
    pub fn is_measured(&self) -> bool {
        self.rect.width > 0 && self.rect.height > 0
    }

    fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.rect.x
            && column < self.rect.x + self.rect.width
            && row >= self.rect.y
            && row < self.rect.y + self.rect.height
    }

    /// Maps a mouse position to the centre of its cell, as a fraction of the
    /// field. `None` when the field is unmeasured or the click fell outside it.
    pub fn normalize(&self, column: u16, row: u16) -> Option<NormalizedPoint> {
        if !self.is_measured() || !self.contains(column, row) {
            return None;
        }

        Some(NormalizedPoint::new(
            ((column - self.rect.x) as f64 + 0.5) / self.rect.width as f64,
            ((row - self.rect.y) as f64 + 0.5) / self.rect.height as f64,
        ))
    }

    /// Whether every possible target has a cell whose centre lands inside
    /// its hit region. A cell centre can be up to half a cell away from the
    /// target on each axis.
    pub fn can_reach_every_target(&self, difficulty: Difficulty) -> bool {
        if !self.is_measured() {
            return false;
        }
        let half_cell = 0.5 / self.rect.width.min(self.rect.height) as f64;
        half_cell < difficulty.tolerance()
    }

    /// Absolute cell containing a normalized point, clamped into the field
    pub fn cell_of(&self, point: NormalizedPoint) -> Option<(u16, u16)> {
        if !self.is_measured() {
            return None;
        }

        let to_offset = |fraction: f64, extent: u16| {
            let max = extent.saturating_sub(1) as f64;
            (fraction * extent as f64).floor().clamp(0.0, max) as u16
        };

        Some((
            self.rect.x + to_offset(point.x, self.rect.width),
            self.rect.y + to_offset(point.y, self.rect.height),
        ))
    }
}
