use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use laminate_planner::construction::{Generator, LayoutSettings};
use laminate_planner::error::{PlannerError, PlannerResult, check_dimension};
use laminate_planner::pattern::{FlipPolicy, regenerate_pattern, regenerate_pattern_with};
use laminate_planner::requirements::{PatternSelection, calculate_requirements};
use laminate_planner::types::{DesignOption, DesiredBoard, StockRequirementReport, WoodStockPiece};
use laminate_planner::weave::WeaveKind;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct DesignsRequest {
    stock: Vec<WoodStockPiece>,
    #[serde(default)]
    settings: LayoutSettings,
}

#[derive(Serialize)]
struct DesignsResponse {
    options: Vec<DesignOption>,
}

#[derive(Deserialize, Serialize)]
struct RegenerateRequest {
    option: DesignOption,
    stock: Vec<WoodStockPiece>,
    #[serde(default)]
    policy: Option<FlipPolicy>,
}

#[derive(Deserialize, Serialize)]
struct RequirementsRequest {
    desired: DesiredBoard,
    stock: Vec<WoodStockPiece>,
    #[serde(default)]
    pattern: Option<PatternRequest>,
}

#[derive(Deserialize, Serialize)]
struct PatternRequest {
    weave: WeaveKind,
    main_index: usize,
    accent_index: usize,
}

type ApiError = (StatusCode, String);

fn bad_request(e: PlannerError) -> ApiError {
    (StatusCode::BAD_REQUEST, e.to_string())
}

fn check_stock(stock: &[WoodStockPiece]) -> PlannerResult<()> {
    for (i, p) in stock.iter().enumerate() {
        check_dimension(&format!("stock[{i}].thickness"), p.thickness)?;
        check_dimension(&format!("stock[{i}].width"), p.width)?;
        check_dimension(&format!("stock[{i}].length"), p.length)?;
    }
    Ok(())
}

fn log_request<T: Serialize>(route: &str, req: &T) {
    tracing::info!(body = serde_json::to_string(req).unwrap_or_default(), "POST {route}");
}

async fn designs(Json(req): Json<DesignsRequest>) -> Result<Json<DesignsResponse>, ApiError> {
    log_request("/designs", &req);
    check_stock(&req.stock).map_err(bad_request)?;
    check_dimension("segment_width", req.settings.segment_width).map_err(bad_request)?;
    check_dimension("kerf_width", req.settings.kerf_width).map_err(bad_request)?;

    let options = Generator::new(req.settings, &req.stock)
        .generate()
        .map_err(bad_request)?;
    Ok(Json(DesignsResponse { options }))
}

async fn regenerate(Json(req): Json<RegenerateRequest>) -> Result<Json<DesignOption>, ApiError> {
    log_request("/designs/regenerate", &req);
    check_stock(&req.stock).map_err(bad_request)?;

    let mut rng = StdRng::from_entropy();
    let option = match req.policy {
        Some(policy) => regenerate_pattern_with(&req.option, &req.stock, policy, &mut rng),
        None => regenerate_pattern(&req.option, &req.stock, &mut rng),
    };
    Ok(Json(option))
}

async fn requirements(
    Json(req): Json<RequirementsRequest>,
) -> Result<Json<StockRequirementReport>, ApiError> {
    log_request("/requirements", &req);
    check_stock(&req.stock).map_err(bad_request)?;
    check_dimension("desired.width", req.desired.width).map_err(bad_request)?;
    check_dimension("desired.length", req.desired.length).map_err(bad_request)?;
    check_dimension("desired.thickness", req.desired.thickness).map_err(bad_request)?;

    let selection = req.pattern.as_ref().map(|p| PatternSelection {
        pattern: &p.weave,
        main_index: p.main_index,
        accent_index: p.accent_index,
    });

    calculate_requirements(&req.desired, &req.stock, selection)
        .map(Json)
        .map_err(|e| match e {
            PlannerError::InvalidSelection { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            other => bad_request(other),
        })
}

fn app() -> Router {
    Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/designs", post(designs))
        .route("/designs/regenerate", post(regenerate))
        .route("/requirements", post(requirements))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

fn main() {
    // Disabled when SENTRY_DSN is unset.
    let _sentry = sentry::init((
        std::env::var("SENTRY_DSN").ok(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    ));

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
        .block_on(serve());
}

async fn serve() {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app()).await.unwrap();
}
