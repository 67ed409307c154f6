use serde::{Deserialize, Deserializer, Serialize};

/// Accepts `3` as well as `3.0` for whole-number fields; JSON produced by
/// browser number inputs often carries a trailing `.0`.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative whole number, got {value}"
        )));
    }
    Ok(value as u32)
}

/// One purchasable stock type and how many are on hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WoodStockPiece {
    pub wood_type: String,
    pub thickness: f64,
    pub width: f64,
    pub length: f64,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_override: Option<String>,
}

impl WoodStockPiece {
    pub fn new(wood_type: &str, thickness: f64, width: f64, length: f64, quantity: u32) -> Self {
        Self {
            wood_type: wood_type.to_string(),
            thickness,
            width,
            length,
            quantity,
            color_override: None,
        }
    }

    /// Pieces with a blank wood type never make it into a pattern.
    pub fn is_usable(&self) -> bool {
        !self.wood_type.trim().is_empty()
    }

    pub fn face_area(&self) -> f64 {
        self.width * self.length
    }
}

impl std::fmt::Display for WoodStockPiece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}x{}x{} (x{})",
            self.wood_type, self.thickness, self.width, self.length, self.quantity
        )
    }
}

/// Target board size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesiredBoard {
    pub width: f64,
    pub length: f64,
    pub thickness: f64,
}

impl DesiredBoard {
    pub fn new(width: f64, length: f64, thickness: f64) -> Self {
        Self {
            width,
            length,
            thickness,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.length
    }

    /// True when any dimension is zero, negative or not a number. Nothing
    /// can be planned for such a board.
    pub fn is_degenerate(&self) -> bool {
        [self.width, self.length, self.thickness]
            .iter()
            .any(|v| !v.is_finite() || *v <= 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub thickness: f64,
}

impl Dimensions {
    pub fn new(length: f64, width: f64, thickness: f64) -> Self {
        Self {
            length,
            width,
            thickness,
        }
    }

    pub fn area(&self) -> f64 {
        self.length * self.width
    }

    pub fn volume(&self) -> f64 {
        self.area() * self.thickness
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.3} L x {:.3} W x {:.3} T",
            self.length, self.width, self.thickness
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstructionKind {
    FaceGrain,
    EdgeGrain,
    EndGrainFromEdgeGrain,
    EndGrainFromFaceGrain,
}

impl ConstructionKind {
    pub fn is_end_grain(self) -> bool {
        matches!(
            self,
            ConstructionKind::EndGrainFromEdgeGrain | ConstructionKind::EndGrainFromFaceGrain
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            ConstructionKind::FaceGrain => "Face grain",
            ConstructionKind::EdgeGrain => "Edge grain",
            ConstructionKind::EndGrainFromEdgeGrain => "End grain (from edge grain)",
            ConstructionKind::EndGrainFromFaceGrain => "End grain (from face grain)",
        }
    }
}

impl std::fmt::Display for ConstructionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JuiceGroove {
    pub width: f64,
    pub depth: f64,
    pub inset: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandleHoles {
    pub diameter: f64,
    pub inset: f64,
}

/// Finishing options carried alongside a design. They are stored and
/// returned untouched; no computation reads them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AccessorySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub juice_groove: Option<JuiceGroove>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_holes: Option<HandleHoles>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignOption {
    pub construction_kind: ConstructionKind,
    pub dimensions: Dimensions,
    #[serde(default, deserialize_with = "deserialize_u32_from_number")]
    pub cut_count: u32,
    #[serde(default)]
    pub kerf_loss: f64,
    /// Wood type of every strip or segment, in gluing order, row by row.
    pub pattern: Vec<String>,
    #[serde(default)]
    pub accessory_settings: AccessorySettings,
}

impl DesignOption {
    /// Number of glued rows the pattern is laid out in.
    pub fn row_count(&self) -> usize {
        if self.construction_kind.is_end_grain() {
            self.cut_count as usize
        } else if self.pattern.is_empty() {
            0
        } else {
            1
        }
    }

    /// The pattern split into its rows. Empty when there are no rows.
    pub fn rows(&self) -> Vec<&[String]> {
        let rows = self.row_count();
        if rows == 0 || self.pattern.is_empty() {
            return Vec::new();
        }
        let row_len = self.pattern.len().div_ceil(rows);
        self.pattern.chunks(row_len).collect()
    }

    pub fn is_feasible(&self) -> bool {
        !self.pattern.is_empty()
            && self.dimensions.length > 0.0
            && self.dimensions.width > 0.0
            && self.dimensions.thickness > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorRole {
    Main,
    Accent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WoodTypeRequirement {
    /// Position of the entry in the stock list it was computed from.
    pub stock_index: usize,
    pub wood_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ColorRole>,
    /// Strips (plain) or squares (woven) that must be cut.
    pub pieces_needed: u64,
    pub pieces_per_board: u64,
    pub boards_needed: u64,
    pub boards_available: u64,
    pub sufficient: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternInfo {
    pub name: String,
    pub cube_size: f64,
    pub squares_wide: u64,
    pub squares_long: u64,
    pub total_squares: u64,
    pub main_pieces_needed: u64,
    pub accent_pieces_needed: u64,
    pub main_index: usize,
    pub accent_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRequirementReport {
    pub total_area: f64,
    pub per_wood_type: Vec<WoodTypeRequirement>,
    pub total_boards_needed: u64,
    pub total_boards_available: u64,
    pub overall_sufficient: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_info: Option<PatternInfo>,
}

impl StockRequirementReport {
    /// Totals are always recomputed from the breakdown so they cannot drift.
    pub fn from_entries(
        total_area: f64,
        per_wood_type: Vec<WoodTypeRequirement>,
        pattern_info: Option<PatternInfo>,
    ) -> Self {
        let total_boards_needed = saturating_sum(per_wood_type.iter().map(|r| r.boards_needed));
        let total_boards_available =
            saturating_sum(per_wood_type.iter().map(|r| r.boards_available));
        let overall_sufficient = per_wood_type.iter().all(|r| r.sufficient);
        Self {
            total_area,
            per_wood_type,
            total_boards_needed,
            total_boards_available,
            overall_sufficient,
            pattern_info,
        }
    }

    pub fn shortfall(&self) -> u64 {
        saturating_sum(
            self.per_wood_type
                .iter()
                .map(|r| r.boards_needed.saturating_sub(r.boards_available)),
        )
    }
}

fn saturating_sum(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_accepts_whole_floats() {
        let piece: WoodStockPiece = serde_json::from_str(
            r#"{"wood_type":"Maple","thickness":0.75,"width":2,"length":24,"quantity":10.0}"#,
        )
        .unwrap();
        assert_eq!(piece.quantity, 10);
        assert_eq!(piece.color_override, None);
    }

    #[test]
    fn test_quantity_rejects_fractions_and_negatives() {
        for q in ["2.5", "-1"] {
            let json = format!(
                r#"{{"wood_type":"Maple","thickness":0.75,"width":2,"length":24,"quantity":{q}}}"#
            );
            assert!(serde_json::from_str::<WoodStockPiece>(&json).is_err(), "{q}");
        }
    }

    #[test]
    fn test_blank_wood_type_is_unusable() {
        assert!(WoodStockPiece::new("Walnut", 1.0, 2.0, 3.0, 1).is_usable());
        assert!(!WoodStockPiece::new("   ", 1.0, 2.0, 3.0, 1).is_usable());
    }

    #[test]
    fn test_desired_board_degenerate() {
        assert!(!DesiredBoard::new(16.0, 14.0, 1.5).is_degenerate());
        assert!(DesiredBoard::new(16.0, 0.0, 1.5).is_degenerate());
        assert!(DesiredBoard::new(16.0, 14.0, f64::NAN).is_degenerate());
    }

    #[test]
    fn test_construction_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&ConstructionKind::EndGrainFromFaceGrain).unwrap();
        assert_eq!(json, r#""end-grain-from-face-grain""#);
    }

    #[test]
    fn test_rows_split_end_grain_pattern() {
        let option = DesignOption {
            construction_kind: ConstructionKind::EndGrainFromEdgeGrain,
            dimensions: Dimensions::new(4.0, 2.0, 1.0),
            cut_count: 2,
            kerf_loss: 0.25,
            pattern: ["A", "B", "B", "A"].iter().map(|s| s.to_string()).collect(),
            accessory_settings: AccessorySettings::default(),
        };
        let rows = option.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], ["B".to_string(), "A".to_string()]);
    }

    #[test]
    fn test_report_totals_from_entries() {
        let entry = |needed, available| WoodTypeRequirement {
            stock_index: 0,
            wood_type: "Oak".to_string(),
            role: None,
            pieces_needed: 0,
            pieces_per_board: 0,
            boards_needed: needed,
            boards_available: available,
            sufficient: available >= needed,
        };
        let report = StockRequirementReport::from_entries(1.0, vec![entry(3, 5), entry(4, 2)], None);
        assert_eq!(report.total_boards_needed, 7);
        assert_eq!(report.total_boards_available, 7);
        assert!(!report.overall_sufficient);
        assert_eq!(report.shortfall(), 2);

        let huge = StockRequirementReport::from_entries(
            1.0,
            vec![entry(u64::MAX, 0), entry(1, 0)],
            None,
        );
        assert_eq!(huge.total_boards_needed, u64::MAX);
        assert_eq!(huge.shortfall(), u64::MAX);
    }
}
