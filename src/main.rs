use clap::{Parser, Subcommand};
use laminate_planner::construction::{
    DEFAULT_KERF_WIDTH, DEFAULT_SEGMENT_WIDTH, Generator, LayoutSettings,
};
use laminate_planner::error::check_dimension;
use laminate_planner::pattern::regenerate_pattern;
use laminate_planner::render;
use laminate_planner::requirements::{PatternSelection, calculate_requirements};
use laminate_planner::types::{DesignOption, DesiredBoard, StockRequirementReport, WoodStockPiece};
use laminate_planner::weave::WeaveKind;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "laminate_planner",
    about = "Laminated board layouts and stock requirements"
)]
struct Cli {
    /// Log engine decisions to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate face, edge and end grain constructions from stock
    Designs {
        /// Stock as TYPE:TxWxL:QTY[:COLOR] (e.g. Maple:0.75x2x24:10)
        #[arg(long = "stock", num_args = 1.., required = true)]
        stock: Vec<String>,

        /// Width of each end grain cross-cut slice
        #[arg(long, default_value_t = DEFAULT_SEGMENT_WIDTH)]
        segment_width: f64,

        /// Blade kerf width
        #[arg(long, default_value_t = DEFAULT_KERF_WIDTH)]
        kerf: f64,

        /// Show ASCII layout of each construction
        #[arg(long)]
        layout: bool,

        /// Print this many regenerated patterns per construction
        #[arg(long, default_value_t = 0)]
        shuffle: u32,

        /// Seed for regenerated patterns
        #[arg(long)]
        seed: Option<u64>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Compute how many stock boards a desired board needs
    Stock {
        /// Desired board as WxLxT (e.g. 16x14x1.5)
        #[arg(long)]
        board: String,

        /// Stock as TYPE:TxWxL:QTY[:COLOR]
        #[arg(long = "stock", num_args = 1.., required = true)]
        stock: Vec<String>,

        /// Woven accent pattern: checkerboard or basket-weave
        #[arg(long)]
        weave: Option<String>,

        /// Edge length of each woven square
        #[arg(long, default_value_t = 2.0)]
        cube_size: f64,

        /// Stock entry (0-based) used as the main color
        #[arg(long, default_value_t = 0)]
        main: usize,

        /// Stock entry (0-based) used as the accent color
        #[arg(long, default_value_t = 1)]
        accent: usize,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn parse_number(s: &str, field: &str, context: &str) -> Result<f64, String> {
    let value = s
        .parse::<f64>()
        .map_err(|_| format!("invalid {} in '{}'", field, context))?;
    check_dimension(field, value).map_err(|e| format!("{} in '{}'", e, context))?;
    Ok(value)
}

fn parse_triple(s: &str, names: [&str; 3]) -> Result<[f64; 3], String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 3 {
        return Err(format!(
            "invalid dimensions '{}', expected {}x{}x{}",
            s, names[0], names[1], names[2]
        ));
    }
    Ok([
        parse_number(parts[0], names[0], s)?,
        parse_number(parts[1], names[1], s)?,
        parse_number(parts[2], names[2], s)?,
    ])
}

fn parse_board(s: &str) -> Result<DesiredBoard, String> {
    let [width, length, thickness] = parse_triple(s, ["width", "length", "thickness"])?;
    Ok(DesiredBoard::new(width, length, thickness))
}

fn parse_stock(s: &str) -> Result<WoodStockPiece, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(format!("invalid stock '{}', expected TYPE:TxWxL:QTY[:COLOR]", s));
    }
    let [thickness, width, length] = parse_triple(parts[1], ["thickness", "width", "length"])?;
    let quantity = parts[2]
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    let mut piece = WoodStockPiece::new(parts[0], thickness, width, length, quantity);
    piece.color_override = parts.get(3).map(|c| c.to_string());
    Ok(piece)
}

fn parse_all<T>(items: &[String], parse: fn(&str) -> Result<T, String>) -> Vec<T> {
    items
        .iter()
        .map(|s| parse(s))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| fail(&e))
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => fail(&e.to_string()),
    }
}

fn summarize_pattern(pattern: &[String]) -> String {
    let mut runs: Vec<(&str, usize)> = Vec::new();
    for wood in pattern {
        match runs.last_mut() {
            Some((w, n)) if *w == wood.as_str() => *n += 1,
            _ => runs.push((wood.as_str(), 1)),
        }
    }
    runs.iter()
        .map(|(w, n)| if *n == 1 { w.to_string() } else { format!("{} x{}", w, n) })
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_option(option: &DesignOption, stock: &[WoodStockPiece], layout: bool) {
    let note = if option.is_feasible() { "" } else { " [infeasible]" };
    println!("{}{}:", option.construction_kind, note);
    println!("  Dimensions: {}", option.dimensions);
    if option.construction_kind.is_end_grain() {
        println!(
            "  Cuts: {}, kerf loss: {:.3}",
            option.cut_count, option.kerf_loss
        );
    }
    println!(
        "  Strips: {} in {} row{}",
        option.pattern.len(),
        option.row_count(),
        if option.row_count() == 1 { "" } else { "s" }
    );
    if let Some(first) = option.rows().first() {
        println!("  First row: {}", summarize_pattern(first));
    }
    if layout {
        print!("{}", render::render_option_with_stock(option, stock));
    }
}

fn print_report(report: &StockRequirementReport) {
    if let Some(info) = &report.pattern_info {
        println!(
            "Pattern: {} ({} x {} squares of {}, {} main / {} accent)",
            info.name,
            info.squares_wide,
            info.squares_long,
            info.cube_size,
            info.main_pieces_needed,
            info.accent_pieces_needed
        );
    }
    println!("Board area: {:.2}", report.total_area);
    for r in &report.per_wood_type {
        let role = match r.role {
            Some(role) => format!(" [{:?}]", role).to_lowercase(),
            None => String::new(),
        };
        let status = if r.sufficient { "ok" } else { "SHORT" };
        println!(
            "  #{} {}{}: {} pieces, {} per board -> {} board{} needed, {} on hand ({})",
            r.stock_index,
            r.wood_type,
            role,
            r.pieces_needed,
            r.pieces_per_board,
            r.boards_needed,
            if r.boards_needed == 1 { "" } else { "s" },
            r.boards_available,
            status
        );
    }
    println!(
        "Summary: {} board{} needed, {} available, {}",
        report.total_boards_needed,
        if report.total_boards_needed == 1 { "" } else { "s" },
        report.total_boards_available,
        if report.overall_sufficient {
            "stock is sufficient".to_string()
        } else {
            format!("short by {}", report.shortfall())
        }
    );
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    match cli.command {
        Command::Designs {
            stock,
            segment_width,
            kerf,
            layout,
            shuffle,
            seed,
            json,
        } => {
            let stock = parse_all(&stock, parse_stock);
            for (field, value) in [("segment width", segment_width), ("kerf", kerf)] {
                check_dimension(field, value).unwrap_or_else(|e| fail(&e.to_string()));
            }
            let settings = LayoutSettings {
                segment_width,
                kerf_width: kerf,
                ..LayoutSettings::default()
            };
            let options = Generator::new(settings, &stock)
                .generate()
                .unwrap_or_else(|e| fail(&e.to_string()));
            if options.is_empty() {
                fail("no stock entry has a wood type");
            }

            let mut rng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            };
            let variations: Vec<Vec<DesignOption>> = options
                .iter()
                .map(|o| {
                    (0..shuffle)
                        .map(|_| regenerate_pattern(o, &stock, &mut rng))
                        .collect()
                })
                .collect();

            if json {
                print_json(&serde_json::json!({
                    "options": options,
                    "variations": variations,
                }));
                return;
            }

            for (option, variants) in options.iter().zip(&variations) {
                print_option(option, &stock, layout);
                for (i, v) in variants.iter().enumerate() {
                    println!("  Variation {}:", i + 1);
                    if layout {
                        print!("{}", render::render_option_with_stock(v, &stock));
                    } else if let Some(first) = v.rows().first() {
                        println!("    First row: {}", summarize_pattern(first));
                    }
                }
                println!();
            }
        }
        Command::Stock {
            board,
            stock,
            weave,
            cube_size,
            main,
            accent,
            json,
        } => {
            let desired = parse_board(&board).unwrap_or_else(|e| fail(&e));
            let stock = parse_all(&stock, parse_stock);
            let weave = weave.map(|name| {
                check_dimension("cube size", cube_size).unwrap_or_else(|e| fail(&e.to_string()));
                WeaveKind::parse(&name, cube_size).unwrap_or_else(|e| fail(&e))
            });
            let selection = weave.as_ref().map(|w| PatternSelection {
                pattern: w,
                main_index: main,
                accent_index: accent,
            });

            let report = calculate_requirements(&desired, &stock, selection)
                .unwrap_or_else(|e| fail(&e.to_string()));

            if json {
                print_json(&report);
            } else {
                print_report(&report);
            }
        }
    }
}
