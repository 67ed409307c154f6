use crate::error::{PlannerError, PlannerResult};
use crate::measure::{ceil_div, floor_div, units_per};
use crate::types::{
    ColorRole, DesiredBoard, PatternInfo, StockRequirementReport, WoodStockPiece,
    WoodTypeRequirement,
};
use crate::weave::{PatternNeeds, WovenPattern};

/// A woven pattern plus the two stock entries that supply its colors.
#[derive(Clone, Copy)]
pub struct PatternSelection<'a> {
    pub pattern: &'a dyn WovenPattern,
    pub main_index: usize,
    pub accent_index: usize,
}

/// Boards to buy for `desired`, per stock entry.
///
/// Without a pattern every entry is costed as if the whole board were
/// built from it as edge-grain strips. With a pattern only the main and
/// accent entries are reported and the totals cover just those two.
pub fn calculate_requirements(
    desired: &DesiredBoard,
    stock: &[WoodStockPiece],
    selection: Option<PatternSelection<'_>>,
) -> PlannerResult<StockRequirementReport> {
    let total_area = desired.area();
    match selection {
        None => Ok(plain_requirements(desired, stock, total_area)),
        Some(sel) => woven_requirements(desired, stock, sel, total_area),
    }
}

fn plain_requirements(
    desired: &DesiredBoard,
    stock: &[WoodStockPiece],
    total_area: f64,
) -> StockRequirementReport {
    let degenerate = desired.is_degenerate();
    let entries = stock
        .iter()
        .enumerate()
        .map(|(i, piece)| {
            let strips_per_board = floor_div(piece.length, desired.width);
            let strips_needed = if degenerate {
                0
            } else {
                ceil_div(desired.length, piece.width)
            };
            requirement(i, piece, None, strips_needed, strips_per_board)
        })
        .collect();

    let report = StockRequirementReport::from_entries(total_area, entries, None);
    tracing::debug!(
        needed = report.total_boards_needed,
        available = report.total_boards_available,
        sufficient = report.overall_sufficient,
        "computed edge-grain stock requirements"
    );
    report
}

fn woven_requirements(
    desired: &DesiredBoard,
    stock: &[WoodStockPiece],
    sel: PatternSelection<'_>,
    total_area: f64,
) -> PlannerResult<StockRequirementReport> {
    let pattern = sel.pattern;
    let invalid = |reason: String| {
        tracing::warn!(pattern = pattern.name(), %reason, "rejected pattern selection");
        PlannerError::InvalidSelection {
            pattern: pattern.name().to_string(),
            reason,
        }
    };

    if stock.len() < pattern.required_colors() {
        return Err(invalid(format!(
            "needs {} stock entries, have {}",
            pattern.required_colors(),
            stock.len()
        )));
    }
    if sel.main_index == sel.accent_index {
        return Err(invalid(format!(
            "main and accent must differ (both are entry {})",
            sel.main_index
        )));
    }
    let (Some(main), Some(accent)) = (stock.get(sel.main_index), stock.get(sel.accent_index))
    else {
        return Err(invalid(format!(
            "entries {} and {} are not both in a stock list of {}",
            sel.main_index,
            sel.accent_index,
            stock.len()
        )));
    };

    let needs = if desired.is_degenerate() {
        PatternNeeds::default()
    } else {
        pattern.calculate_needs(desired.width, desired.length)
    };
    let cube = pattern.cube_size();

    let entries = vec![
        requirement(
            sel.main_index,
            main,
            Some(ColorRole::Main),
            needs.main_pieces_needed,
            floor_div(main.length, cube),
        ),
        requirement(
            sel.accent_index,
            accent,
            Some(ColorRole::Accent),
            needs.accent_pieces_needed,
            floor_div(accent.length, cube),
        ),
    ];

    let info = PatternInfo {
        name: pattern.name().to_string(),
        cube_size: cube,
        squares_wide: needs.squares_wide,
        squares_long: needs.squares_long,
        total_squares: needs.total_squares,
        main_pieces_needed: needs.main_pieces_needed,
        accent_pieces_needed: needs.accent_pieces_needed,
        main_index: sel.main_index,
        accent_index: sel.accent_index,
    };

    let report = StockRequirementReport::from_entries(total_area, entries, Some(info));
    tracing::debug!(
        pattern = pattern.name(),
        squares = needs.total_squares,
        needed = report.total_boards_needed,
        sufficient = report.overall_sufficient,
        "computed woven stock requirements"
    );
    Ok(report)
}

fn requirement(
    stock_index: usize,
    piece: &WoodStockPiece,
    role: Option<ColorRole>,
    pieces_needed: u64,
    pieces_per_board: u64,
) -> WoodTypeRequirement {
    let boards_needed = units_per(pieces_needed, pieces_per_board);
    let boards_available = u64::from(piece.quantity);
    WoodTypeRequirement {
        stock_index,
        wood_type: piece.wood_type.clone(),
        role,
        pieces_needed,
        pieces_per_board,
        boards_needed,
        boards_available,
        sufficient: boards_available >= boards_needed,
    }
}
