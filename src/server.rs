use crate::config::AppConfig;
use crate::hover::{HoverMachine, PanelUpdate};
use crate::types::HospitalMark;
use anyhow::Result;
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use rstar::{RTree, RTreeObject, AABB};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

// hit slop covering the highlight stroke around a hovered circle
const STROKE_TOLERANCE: f64 = 1.0;

// Wrapper for RTree indexing
pub struct MarkIndex {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for MarkIndex {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

pub struct AppState {
    pub marks: Vec<HospitalMark>,
    pub tree: RTree<MarkIndex>,
    // one pointer, one hover state
    pub hover: Mutex<HoverMachine>,
}

#[derive(Deserialize)]
pub struct HoverParams {
    x: f64,
    y: f64,
}

pub async fn start_server(config: AppConfig, marks: Vec<HospitalMark>) -> Result<()> {
    println!("Building spatial index for {} hospital circles...", marks.len());
    let tree_items: Vec<MarkIndex> = marks
        .iter()
        .enumerate()
        .map(|(i, mark)| {
            let reach = mark.radius + STROKE_TOLERANCE;
            MarkIndex {
                index: i,
                aabb: AABB::from_corners(
                    [mark.x - reach, mark.y - reach],
                    [mark.x + reach, mark.y + reach],
                ),
            }
        })
        .collect();

    let tree = RTree::bulk_load(tree_items);

    let state = Arc::new(AppState {
        marks,
        tree,
        hover: Mutex::new(HoverMachine::new()),
    });

    let port = config.server.port;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    println!("Starting server on http://{}", addr);

    let app = Router::new()
        .route("/api/hover", get(hover_handler))
        .nest_service("/", ServeDir::new(&config.output.dir))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn hover_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HoverParams>,
) -> Json<PanelUpdate> {
    let hit = hit_test(&state, params.x, params.y);

    let mut hover = state.hover.lock().unwrap_or_else(|e| e.into_inner());
    let update = match hit {
        Some(index) => hover.pointer_enter(&state.marks[index].record),
        None => hover.pointer_leave(),
    };

    Json(update)
}

/// Point-in-circle lookup over the projected marks: candidates come from the
/// R-tree envelopes, the closest center within its drawn radius (plus stroke
/// tolerance) wins.
fn hit_test(state: &AppState, x: f64, y: f64) -> Option<usize> {
    let envelope = AABB::from_point([x, y]);
    let candidates = state.tree.locate_in_envelope_intersecting(&envelope);

    let mut best: Option<(usize, f64)> = None;
    for candidate in candidates {
        let mark = &state.marks[candidate.index];
        let distance = ((x - mark.x).powi(2) + (y - mark.y).powi(2)).sqrt();
        if distance <= mark.radius + STROKE_TOLERANCE {
            match best {
                Some((_, d)) if d <= distance => {}
                _ => best = Some((candidate.index, distance)),
            }
        }
    }

    best.map(|(index, _)| index)
}
