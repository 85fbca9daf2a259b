use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use validator::Validate;

use crate::api::health::HealthState;
use crate::catalog::{filter_games, filter_giveaways, paginate, sorted_by_title, unique_games, GameFilter, Page};
use crate::config::{Config, PAGE_SIZE};
use crate::db::DocumentStore;
use crate::display::{format_date, vote_label};
use crate::error::AppError;
use crate::fetcher::fetch_products;
use crate::refresh::refresh_once;
use crate::state::GiveawayCache;
use crate::tally::{tally, TallyEntry};
use crate::types::{GiveawayRecord, NewVote, Product, SavedGiveaway, VotableGame};

#[derive(Clone)]
pub struct ApiState {
    pub cfg: Arc<Config>,
    pub client: reqwest::Client,
    pub cache: Arc<GiveawayCache>,
    pub store: Arc<DocumentStore>,
    pub health: Arc<HealthState>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/giveaways", get(get_giveaways))
        .route("/giveaways/refresh", post(refresh_giveaways))
        .route("/giveaways/:id", get(get_giveaway))
        .route("/voting/games", get(get_voting_games))
        .route("/votes", post(post_vote))
        .route("/votes/results", get(get_vote_results))
        .route("/saved", get(get_saved).post(post_saved))
        .route("/saved/:key", delete(delete_saved))
        .route("/subscriptions", post(post_subscription))
        .route("/products", get(get_products))
        .route("/health", get(get_health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query / body structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct GiveawaysQuery {
    pub platform: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// How many items are currently shown; grows by PAGE_SIZE on "load more".
    pub visible: Option<usize>,
}

#[derive(Deserialize)]
pub struct VotingGamesQuery {
    pub platform: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct VoteRequest {
    #[validate(range(min = 1, message = "select a valid game"))]
    pub game_id: i64,
}

#[derive(Deserialize, Validate)]
pub struct SaveRequest {
    #[validate(range(min = 1))]
    pub giveaway_id: i64,
}

#[derive(Deserialize, Validate)]
pub struct SubscriptionRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub platform: String,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct GiveawayView {
    #[serde(flatten)]
    pub giveaway: GiveawayRecord,
    pub end_date_label: String,
}

#[derive(Serialize)]
pub struct ResultLine {
    #[serde(flatten)]
    pub entry: TallyEntry,
    pub votes_label: String,
    pub is_leader: bool,
}

#[derive(Serialize)]
pub struct ResultsResponse {
    pub total: usize,
    pub distinct_games: usize,
    pub ranking: Vec<ResultLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct SavedView {
    #[serde(flatten)]
    pub saved: SavedGiveaway,
    pub saved_label: String,
}

#[derive(Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ActionResponse {
    fn ok(message: &str, id: Option<String>) -> Json<Self> {
        Json(Self { success: true, message: message.to_string(), id })
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub upstream_ok: bool,
    pub giveaways_cached: usize,
    pub last_refresh_at_ms: u64,
    pub refresh_failures: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_giveaways(
    State(state): State<ApiState>,
    Query(params): Query<GiveawaysQuery>,
) -> Json<Page<GiveawayView>> {
    let records = state.cache.snapshot();
    let filter = GameFilter::new(params.platform.as_deref(), params.kind.as_deref());
    let filtered = filter_giveaways(&records, &filter);
    let page = paginate(&filtered, params.visible.unwrap_or(PAGE_SIZE));

    let now = Utc::now();
    Json(Page {
        items: page
            .items
            .into_iter()
            .map(|giveaway| GiveawayView {
                end_date_label: format_date(&giveaway.end_date, now),
                giveaway,
            })
            .collect(),
        visible: page.visible,
        total: page.total,
        has_more: page.has_more,
    })
}

async fn get_giveaway(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<GiveawayRecord>, AppError> {
    state
        .cache
        .find(id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("giveaway {id}")))
}

async fn refresh_giveaways(State(state): State<ApiState>) -> Result<Json<ActionResponse>, AppError> {
    let count = refresh_once(&state.client, &state.cfg, &state.cache, &state.health).await?;
    Ok(ActionResponse::ok(&format!("{count} giveaways loaded"), None))
}

async fn get_voting_games(
    State(state): State<ApiState>,
    Query(params): Query<VotingGamesQuery>,
) -> Json<Vec<VotableGame>> {
    let records = state.cache.snapshot();
    let games = sorted_by_title(&unique_games(&records));
    Json(filter_games(&games, params.platform.as_deref(), params.kind.as_deref()))
}

async fn post_vote(
    State(state): State<ApiState>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    req.validate()?;
    let game = state
        .cache
        .find(req.game_id)
        .ok_or_else(|| AppError::NotFound("game not found".to_string()))?;

    let vote_id = state.store.save_vote(&NewVote::from_record(&game)).await?;
    Ok(ActionResponse::ok("vote recorded", Some(vote_id)))
}

async fn get_vote_results(State(state): State<ApiState>) -> Result<Json<ResultsResponse>, AppError> {
    let votes = state.store.list_votes().await?;
    let result = tally(&votes);

    let message = result.is_empty().then(|| "no votes yet".to_string());
    let distinct_games = result.ranking.len();
    let leader = result.leader().map(|e| e.game_id);
    let ranking = result
        .ranking
        .into_iter()
        .map(|entry| ResultLine {
            votes_label: vote_label(entry.count),
            is_leader: Some(entry.game_id) == leader,
            entry,
        })
        .collect();

    Ok(Json(ResultsResponse {
        total: result.total,
        distinct_games,
        ranking,
        message,
    }))
}

async fn get_saved(State(state): State<ApiState>) -> Result<Json<Vec<SavedView>>, AppError> {
    let now = Utc::now();
    let saved = state
        .store
        .list_saved()
        .await?
        .into_iter()
        .map(|saved| SavedView {
            saved_label: format_date(&saved.saved_at, now),
            saved,
        })
        .collect();
    Ok(Json(saved))
}

async fn post_saved(
    State(state): State<ApiState>,
    Json(req): Json<SaveRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    req.validate()?;
    let giveaway = state
        .cache
        .find(req.giveaway_id)
        .ok_or_else(|| AppError::NotFound(format!("giveaway {}", req.giveaway_id)))?;

    let key = state.store.save_giveaway(&giveaway).await?;
    Ok(ActionResponse::ok("giveaway saved", Some(key)))
}

async fn delete_saved(
    State(state): State<ApiState>,
    Path(key): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    if !state.store.remove_saved(&key).await? {
        return Err(AppError::NotFound(format!("saved giveaway {key}")));
    }
    Ok(ActionResponse::ok("giveaway removed", None))
}

async fn post_subscription(
    State(state): State<ApiState>,
    Json(req): Json<SubscriptionRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    req.validate()?;
    state.store.save_subscription(req.email.trim(), &req.platform).await?;
    Ok(ActionResponse::ok("subscribed", None))
}

async fn get_products(State(state): State<ApiState>) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(fetch_products(&state.client, &state.cfg).await?))
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        upstream_ok: state.health.upstream_ok(),
        giveaways_cached: state.cache.len(),
        last_refresh_at_ms: state.health.last_refresh_at_ms(),
        refresh_failures: state.health.refresh_failures(),
    })
}
