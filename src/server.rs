//! HTTP JSON API for study sessions.
//!
//! Routes:
//! - `GET  /api/cards`           card summaries
//! - `POST /api/cards`           create a card
//! - `GET  /api/cards/{id}`      full card
//! - `GET  /api/review/due`      due cards with their progress
//! - `POST /api/review/answer`   grade a review
//! - `GET  /api/statistics`      aggregate statistics
//!
//! The service sits behind a single mutex, so two answers for the same
//! card can never interleave their load and save.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::config::Config;
use crate::flashcards::{
    CardWithProgress, Flashcard, FlashcardStorageError, ReviewOutcome, ReviewStats, StudyService,
};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Server state shared across requests.
pub struct ApiState {
    service: Mutex<StudyService>,
    due_limit: Option<usize>,
}

impl ApiState {
    pub fn new(service: StudyService, due_limit: Option<usize>) -> Self {
        Self {
            service: Mutex::new(service),
            due_limit,
        }
    }

    fn service(&self) -> MutexGuard<'_, StudyService> {
        self.service.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Error body returned as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<FlashcardStorageError> for ApiError {
    fn from(err: FlashcardStorageError) -> Self {
        let status = match err {
            FlashcardStorageError::CardNotFound(_) | FlashcardStorageError::ProgressNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            FlashcardStorageError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            FlashcardStorageError::Io(_) | FlashcardStorageError::Json(_) => {
                log::error!("Storage failure: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn parse_card_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|e| ApiError::bad_request(format!("Invalid card ID: {}", e)))
}

// ==================== Payloads ====================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSummary {
    pub id: Uuid,
    pub word: String,
    pub definition: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub translations: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardResponse {
    pub success: bool,
    pub message: String,
    pub card_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub interval: i32,
    pub repetitions: i32,
    pub ease_factor: f64,
    pub next_review_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueCard {
    #[serde(flatten)]
    pub card: Flashcard,
    pub progress: ProgressSummary,
}

impl From<CardWithProgress> for DueCard {
    fn from(item: CardWithProgress) -> Self {
        let progress = ProgressSummary {
            interval: item.progress.interval(),
            repetitions: item.progress.repetitions(),
            ease_factor: item.progress.ease_factor(),
            next_review_date: item.progress.next_review_date().map(|d| d.date_naive()),
        };
        Self {
            card: item.card,
            progress,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub card_id: Option<String>,
    /// Any number; missing or null counts as 0
    #[serde(default)]
    pub quality: Option<serde_json::Number>,
    /// Free-text answer typed by the learner; not graded
    #[serde(default)]
    pub user_answer: Option<String>,
}

impl AnswerRequest {
    /// Quality narrowed to `i32`; the scheduler clamps it to 0..=5
    pub fn quality(&self) -> i32 {
        let Some(number) = &self.quality else {
            return 0;
        };
        if let Some(value) = number.as_i64() {
            value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
        } else if number.as_u64().is_some() {
            i32::MAX
        } else {
            // float casts saturate, NaN becomes 0
            number.as_f64().map_or(0, |value| value as i32)
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub outcome: ReviewOutcome,
}

// ==================== Handlers ====================

async fn list_cards(State(state): State<Arc<ApiState>>) -> ApiResult<Vec<CardSummary>> {
    let cards = state.service().list_cards()?;
    Ok(Json(
        cards
            .into_iter()
            .map(|c| CardSummary {
                id: c.id,
                word: c.word,
                definition: c.definition,
            })
            .collect(),
    ))
}

async fn create_card(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<CreateCardRequest>, JsonRejection>,
) -> ApiResult<CreateCardResponse> {
    let Json(request) = payload?;
    let card = state.service().create_card(
        request.word,
        request.definition,
        request.translations,
        Utc::now(),
    )?;
    Ok(Json(CreateCardResponse {
        success: true,
        message: "Card created successfully".to_string(),
        card_id: card.id,
    }))
}

async fn get_card(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<Flashcard> {
    let card_id = parse_card_id(&id)?;
    Ok(Json(state.service().get_card(card_id)?))
}

async fn due_cards(State(state): State<Arc<ApiState>>) -> ApiResult<Vec<DueCard>> {
    let due = state.service().due_cards(Utc::now(), state.due_limit)?;
    Ok(Json(due.into_iter().map(DueCard::from).collect()))
}

async fn submit_answer(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> ApiResult<AnswerResponse> {
    let Json(request) = payload?;
    let quality = request.quality();
    let raw_id = request
        .card_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Card ID required"))?;
    let card_id = parse_card_id(&raw_id)?;

    if let Some(answer) = request.user_answer.as_deref().filter(|a| !a.is_empty()) {
        log::debug!("Card {} answered with {:?}", card_id, answer);
    }

    let outcome = state
        .service()
        .submit_answer(card_id, quality, Utc::now())?;
    Ok(Json(AnswerResponse {
        success: true,
        message: "Answer saved".to_string(),
        outcome,
    }))
}

async fn statistics(State(state): State<Arc<ApiState>>) -> ApiResult<ReviewStats> {
    Ok(Json(state.service().statistics(Utc::now())?))
}

async fn health() -> &'static str {
    "ok"
}

/// Build the API router around shared state
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/cards", get(list_cards).post(create_card))
        .route("/api/cards/{id}", get(get_card))
        .route("/api/review/due", get(due_cards))
        .route("/api/review/answer", post(submit_answer))
        .route("/api/statistics", get(statistics))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

/// Serve the API until Ctrl-C is received.
pub async fn serve(
    service: StudyService,
    config: &Config,
) -> Result<(), ServerError> {
    let state = Arc::new(ApiState::new(service, config.review.due_limit));
    let app = router(state);

    let listener = TcpListener::bind(&config.server.bind).await?;
    let addr = listener.local_addr()?;
    log::info!("Review API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("Review API shutting down");
        })
        .await?;

    Ok(())
}
