use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};
use crate::measure::{floor_div, mean};
use crate::types::{AccessorySettings, ConstructionKind, DesignOption, Dimensions, WoodStockPiece};

pub const DEFAULT_SEGMENT_WIDTH: f64 = 2.0;
pub const DEFAULT_KERF_WIDTH: f64 = 0.125;

/// Most strips a single pattern may hold, and most cuts an end-grain
/// construction may make.
pub const MAX_PATTERN_LEN: u64 = 1_000_000;

fn default_segment_width() -> f64 {
    DEFAULT_SEGMENT_WIDTH
}

fn default_kerf_width() -> f64 {
    DEFAULT_KERF_WIDTH
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutSettings {
    /// Width of each cross-cut slice used for end-grain boards.
    #[serde(default = "default_segment_width")]
    pub segment_width: f64,
    /// Material removed by one pass of the blade.
    #[serde(default = "default_kerf_width")]
    pub kerf_width: f64,
    #[serde(default)]
    pub accessories: AccessorySettings,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            segment_width: DEFAULT_SEGMENT_WIDTH,
            kerf_width: DEFAULT_KERF_WIDTH,
            accessories: AccessorySettings::default(),
        }
    }
}

/// Each wood type repeated once per piece on hand, in stock order.
/// Blank wood types and empty quantities are skipped.
pub fn base_pattern(stock: &[WoodStockPiece]) -> Vec<String> {
    contributing(stock)
        .flat_map(|p| std::iter::repeat_n(p.wood_type.clone(), p.quantity as usize))
        .collect()
}

/// Length of [`base_pattern`] without building it.
pub fn total_quantity(stock: &[WoodStockPiece]) -> u64 {
    contributing(stock).map(|p| u64::from(p.quantity)).sum()
}

fn contributing(stock: &[WoodStockPiece]) -> impl Iterator<Item = &WoodStockPiece> {
    stock.iter().filter(|p| p.is_usable() && p.quantity > 0)
}

fn check_pattern_len(what: &str, count: u64) -> PlannerResult<()> {
    if count <= MAX_PATTERN_LEN {
        return Ok(());
    }
    tracing::warn!(what, count, limit = MAX_PATTERN_LEN, "refusing oversized layout");
    Err(PlannerError::TooLarge {
        what: what.to_string(),
        count,
        limit: MAX_PATTERN_LEN,
    })
}

/// Lays `base` out in `rows` rows, reversing every odd row so seams
/// stagger like brickwork.
fn brick_lay(base: &[String], rows: u32) -> Vec<String> {
    let mut pattern = Vec::with_capacity(base.len() * rows as usize);
    for row in 0..rows {
        if row % 2 == 1 {
            pattern.extend(base.iter().rev().cloned());
        } else {
            pattern.extend(base.iter().cloned());
        }
    }
    pattern
}

pub struct Generator<'a> {
    settings: LayoutSettings,
    stock: &'a [WoodStockPiece],
}

impl<'a> Generator<'a> {
    pub fn new(settings: LayoutSettings, stock: &'a [WoodStockPiece]) -> Self {
        Self { settings, stock }
    }

    /// All four constructions, or nothing when no piece names a wood type.
    /// Infeasible constructions are still returned, with zeroed dimensions.
    ///
    /// Fails with [`PlannerError::TooLarge`] when the stock quantity or the
    /// number of end-grain cuts would produce more than [`MAX_PATTERN_LEN`]
    /// strips or cuts.
    pub fn generate(&self) -> PlannerResult<Vec<DesignOption>> {
        if !self.stock.iter().any(WoodStockPiece::is_usable) {
            tracing::debug!("no usable wood types, skipping generation");
            return Ok(vec![]);
        }

        let strips = total_quantity(self.stock);
        check_pattern_len("laminated pattern", strips)?;
        // Face and edge grain share the longest piece as their length.
        let cut_count = floor_div(self.max_length(), self.settings.segment_width);
        check_pattern_len("end grain cut list", cut_count)?;
        check_pattern_len("end grain pattern", cut_count.saturating_mul(strips))?;
        let cut_count = cut_count as u32;

        let face = self.face_grain();
        let edge = self.edge_grain();
        let end_from_edge = self.end_grain(&edge, self.mean_of(|p| p.width), cut_count);
        let end_from_face = self.end_grain(&face, self.mean_of(|p| p.thickness), cut_count);

        let options = vec![face, edge, end_from_edge, end_from_face];
        for o in &options {
            tracing::debug!(
                kind = %o.construction_kind,
                dimensions = %o.dimensions,
                cuts = o.cut_count,
                kerf_loss = o.kerf_loss,
                strips = o.pattern.len(),
                "generated design option"
            );
        }
        Ok(options)
    }

    fn face_grain(&self) -> DesignOption {
        let first = contributing(self.stock).next();
        self.laminate(
            ConstructionKind::FaceGrain,
            self.summed(|p| p.width),
            first.map_or(0.0, |p| p.thickness),
        )
    }

    fn edge_grain(&self) -> DesignOption {
        let first = contributing(self.stock).next();
        self.laminate(
            ConstructionKind::EdgeGrain,
            self.summed(|p| p.thickness),
            first.map_or(0.0, |p| p.width),
        )
    }

    fn laminate(&self, kind: ConstructionKind, width: f64, thickness: f64) -> DesignOption {
        DesignOption {
            construction_kind: kind,
            dimensions: Dimensions::new(self.max_length(), width, thickness),
            cut_count: 0,
            kerf_loss: 0.0,
            pattern: base_pattern(self.stock),
            accessory_settings: self.settings.accessories,
        }
    }

    /// Cross-cuts `parent` into `cut_count` segments, turns each on end and
    /// reglues. `segment_length` is the parent dimension that becomes the
    /// new length of each segment.
    fn end_grain(
        &self,
        parent: &DesignOption,
        segment_length: f64,
        cut_count: u32,
    ) -> DesignOption {
        let kind = match parent.construction_kind {
            ConstructionKind::FaceGrain => ConstructionKind::EndGrainFromFaceGrain,
            _ => ConstructionKind::EndGrainFromEdgeGrain,
        };
        let kerf_loss = cut_count as f64 * self.settings.kerf_width;
        let thickness = if cut_count > 0 {
            self.settings.segment_width - kerf_loss / cut_count as f64
        } else {
            0.0
        };

        DesignOption {
            construction_kind: kind,
            dimensions: Dimensions::new(
                cut_count as f64 * segment_length,
                parent.dimensions.width,
                thickness,
            ),
            cut_count,
            kerf_loss,
            pattern: brick_lay(&parent.pattern, cut_count),
            accessory_settings: self.settings.accessories,
        }
    }

    fn summed(&self, dim: impl Fn(&WoodStockPiece) -> f64) -> f64 {
        contributing(self.stock)
            .map(|p| p.quantity as f64 * dim(p))
            .sum()
    }

    fn mean_of(&self, dim: impl Fn(&WoodStockPiece) -> f64) -> f64 {
        mean(contributing(self.stock).map(dim))
    }

    fn max_length(&self) -> f64 {
        contributing(self.stock)
            .map(|p| p.length)
            .fold(0.0, f64::max)
    }
}
