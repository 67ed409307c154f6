//! Two-color woven accent patterns built from square pieces ("cubes").
//!
//! A pattern only decides how many squares of each color a board needs;
//! turning squares into boards to buy is the job of
//! [`crate::requirements`].

use serde::{Deserialize, Serialize};

use crate::measure::ceil_div;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PatternNeeds {
    pub squares_wide: u64,
    pub squares_long: u64,
    pub total_squares: u64,
    pub main_pieces_needed: u64,
    pub accent_pieces_needed: u64,
}

impl PatternNeeds {
    fn from_grid(squares_wide: u64, squares_long: u64, main_pieces_needed: u64) -> Self {
        let total_squares = squares_wide.saturating_mul(squares_long);
        Self {
            squares_wide,
            squares_long,
            total_squares,
            main_pieces_needed,
            accent_pieces_needed: total_squares.saturating_sub(main_pieces_needed),
        }
    }
}

pub trait WovenPattern {
    fn name(&self) -> &str;

    fn required_colors(&self) -> usize {
        2
    }

    /// Edge length of one square piece.
    fn cube_size(&self) -> f64;

    fn calculate_needs(&self, width: f64, length: f64) -> PatternNeeds;
}

/// Squares along one side. A partial square still has to be cut.
fn squares_along(extent: f64, cube_size: f64) -> u64 {
    ceil_div(extent, cube_size)
}

/// Alternating squares, like a chess board. The top-left square is main.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Checkerboard {
    pub cube_size: f64,
}

impl WovenPattern for Checkerboard {
    fn name(&self) -> &str {
        "checkerboard"
    }

    fn cube_size(&self) -> f64 {
        self.cube_size
    }

    fn calculate_needs(&self, width: f64, length: f64) -> PatternNeeds {
        let wide = squares_along(width, self.cube_size);
        let long = squares_along(length, self.cube_size);
        PatternNeeds::from_grid(wide, long, wide.saturating_mul(long).div_ceil(2))
    }
}

/// 2x2 blocks of one color alternating with 2x2 blocks of the other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasketWeave {
    pub cube_size: f64,
}

impl BasketWeave {
    /// Cells in `0..n` whose block index is (even, odd).
    fn split(n: u64) -> (u64, u64) {
        let even = (n / 4) * 2 + (n % 4).min(2);
        (even, n - even)
    }
}

impl WovenPattern for BasketWeave {
    fn name(&self) -> &str {
        "basket weave"
    }

    fn cube_size(&self) -> f64 {
        self.cube_size
    }

    fn calculate_needs(&self, width: f64, length: f64) -> PatternNeeds {
        let wide = squares_along(width, self.cube_size);
        let long = squares_along(length, self.cube_size);
        let (we, wo) = Self::split(wide);
        let (le, lo) = Self::split(long);
        PatternNeeds::from_grid(
            wide,
            long,
            we.saturating_mul(le).saturating_add(wo.saturating_mul(lo)),
        )
    }
}

/// Pattern choice as it appears in requests and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum WeaveKind {
    Checkerboard(Checkerboard),
    BasketWeave(BasketWeave),
}

impl WeaveKind {
    pub fn parse(name: &str, cube_size: f64) -> Result<Self, String> {
        match name {
            "checkerboard" => Ok(WeaveKind::Checkerboard(Checkerboard { cube_size })),
            "basket-weave" => Ok(WeaveKind::BasketWeave(BasketWeave { cube_size })),
            _ => Err(format!(
                "invalid weave '{}', expected: checkerboard or basket-weave",
                name
            )),
        }
    }

    fn inner(&self) -> &dyn WovenPattern {
        match self {
            WeaveKind::Checkerboard(p) => p,
            WeaveKind::BasketWeave(p) => p,
        }
    }
}

impl WovenPattern for WeaveKind {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn required_colors(&self) -> usize {
        self.inner().required_colors()
    }

    fn cube_size(&self) -> f64 {
        self.inner().cube_size()
    }

    fn calculate_needs(&self, width: f64, length: f64) -> PatternNeeds {
        self.inner().calculate_needs(width, length)
    }
}
