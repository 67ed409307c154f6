use crate::types::{DesignOption, WoodStockPiece};

const MAX_WIDTH: usize = 80;
const MAX_ROWS: usize = 24;
/// Cells are at least two characters wide, plus the closing border.
const MAX_COLS: usize = (MAX_WIDTH - 1) / 2;
const CELL_HEIGHT: usize = 2;

/// Top view of the gluing pattern: one boxed cell per strip, one line of
/// cells per glued row, followed by a legend.
pub fn render_option(option: &DesignOption) -> String {
    render_option_with_stock(option, &[])
}

/// Same as [`render_option`]; color overrides found in `stock` are listed
/// in the legend.
pub fn render_option_with_stock(option: &DesignOption, stock: &[WoodStockPiece]) -> String {
    let rows = option.rows();
    if rows.is_empty() {
        return format!("({}: nothing to lay out)\n", option.construction_kind);
    }

    let legend = Legend::from_pattern(&option.pattern);
    let cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let shown_cols = cols.min(MAX_COLS);
    let cell_w = (MAX_WIDTH / shown_cols.max(1)).clamp(2, 6);
    let shown_rows = rows.len().min(MAX_ROWS);

    let grid_w = shown_cols * cell_w;
    let grid_h = shown_rows * CELL_HEIGHT;
    let mut grid = vec![vec![' '; grid_w + 1]; grid_h + 1];

    for (ri, row) in rows.iter().take(shown_rows).enumerate() {
        for (ci, wood) in row.iter().take(shown_cols).enumerate() {
            let x = ci * cell_w;
            let y = ri * CELL_HEIGHT;
            draw_rect(&mut grid, x, y, cell_w, CELL_HEIGHT);
            let cx = x + cell_w / 2;
            let cy = y + CELL_HEIGHT / 2;
            if cell_w > 1 && cx > x && cx < x + cell_w {
                grid[cy][cx] = legend.symbol(wood);
            }
        }
    }

    let mut result = String::new();
    for line in &grid {
        let line: String = line.iter().collect();
        result.push_str(line.trim_end());
        result.push('\n');
    }
    if shown_cols < cols {
        result.push_str(&format!("... {} more strips per row\n", cols - shown_cols));
    }
    if shown_rows < rows.len() {
        result.push_str(&format!("... {} more rows\n", rows.len() - shown_rows));
    }
    for (symbol, wood) in &legend.entries {
        let color = stock
            .iter()
            .find(|p| &p.wood_type == wood)
            .and_then(|p| p.color_override.as_deref());
        match color {
            Some(c) => result.push_str(&format!("  {} = {} ({})\n", symbol, wood, c)),
            None => result.push_str(&format!("  {} = {}\n", symbol, wood)),
        }
    }
    result
}

/// Single-character symbols for wood types, in order of first appearance.
/// A wood type gets its initial when free, otherwise the next unused letter.
struct Legend {
    entries: Vec<(char, String)>,
}

impl Legend {
    fn from_pattern(pattern: &[String]) -> Self {
        let mut entries: Vec<(char, String)> = Vec::new();
        for wood in pattern {
            if entries.iter().any(|(_, w)| w == wood) {
                continue;
            }
            let taken = |c: char| entries.iter().any(|(s, _)| *s == c);
            let initial = wood
                .trim()
                .chars()
                .next()
                .map(|c| c.to_ascii_uppercase())
                .filter(|c| c.is_ascii_alphanumeric() && !taken(*c));
            let symbol = initial
                .or_else(|| ('A'..='Z').chain('0'..='9').find(|c| !taken(*c)))
                .unwrap_or('?');
            entries.push((symbol, wood.clone()));
        }
        Self { entries }
    }

    fn symbol(&self, wood: &str) -> char {
        self.entries
            .iter()
            .find(|(_, w)| w == wood)
            .map_or('?', |(s, _)| *s)
    }
}

#[allow(clippy::needless_range_loop)]
fn draw_rect(grid: &mut [Vec<char>], x: usize, y: usize, w: usize, h: usize) {
    let rows = grid.len();
    let cols = if rows > 0 { grid[0].len() } else { return };

    for i in x..=x + w {
        if i < cols {
            for j in [y, y + h] {
                if j < rows {
                    grid[j][i] = if grid[j][i] == '|' || grid[j][i] == '+' {
                        '+'
                    } else {
                        '-'
                    };
                }
            }
        }
    }

    for j in y..=y + h {
        if j < rows {
            for i in [x, x + w] {
                if i < cols {
                    grid[j][i] = if grid[j][i] == '-' || grid[j][i] == '+' {
                        '+'
                    } else {
                        '|'
                    };
                }
            }
        }
    }

    for &cx in &[x, x + w] {
        for &cy in &[y, y + h] {
            if cy < rows && cx < cols {
                grid[cy][cx] = '+';
            }
        }
    }
}
