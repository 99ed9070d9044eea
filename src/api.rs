//! JSON API served under `/api`

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use crate::TripMateError;
use crate::agent::{PlanningAgent, TurnOutcome};
use crate::models::{BudgetTier, DateRange, TripQuery};
use crate::session::{Exchange, GREETING, SessionId, SessionStore, SharedSession};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<PlanningAgent>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    #[must_use]
    pub fn new(agent: PlanningAgent, sessions: SessionStore) -> Self {
        Self {
            agent: Arc::new(agent),
            sessions: Arc::new(sessions),
        }
    }
}

/// Error response with a JSON `{error}` body
pub struct ApiError(TripMateError);

impl From<TripMateError> for ApiError {
    fn from(e: TripMateError) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(TripMateError::validation(rejection.body_text()))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TripMateError::NotFound { .. } => StatusCode::NOT_FOUND,
            TripMateError::Validation { .. } => StatusCode::BAD_REQUEST,
            TripMateError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            TripMateError::Config { .. } | TripMateError::Llm { .. } | TripMateError::Io { .. } => {
                error!(error = %self.0, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorBody {
            error: self.0.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize, Deserialize)]
pub struct SessionCreated {
    pub id: SessionId,
    pub greeting: String,
}

#[derive(Serialize, Deserialize)]
pub struct MessagesResponse {
    pub id: SessionId,
    pub exchanges: Vec<Exchange>,
}

#[derive(Serialize, Deserialize)]
pub struct MessageRequest {
    pub content: String,
}

/// Trip form as submitted by the web UI
#[derive(Debug, Serialize, Deserialize)]
pub struct PlanRequest {
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_travelers")]
    pub travelers: u32,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub budget: BudgetTier,
}

fn default_travelers() -> u32 {
    1
}

impl TryFrom<PlanRequest> for TripQuery {
    type Error = TripMateError;

    fn try_from(form: PlanRequest) -> Result<Self, Self::Error> {
        let dates = DateRange::new(form.start_date, form.end_date)?;
        TripQuery::new(form.destination, dates, form.travelers, form.interests, form.budget)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", axum::routing::delete(destroy_session))
        .route("/sessions/{id}/messages", get(list_messages).post(post_message))
        .route("/sessions/{id}/plan", post(plan_trip))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}

async fn create_session(State(state): State<AppState>) -> ApiResult<(StatusCode, Json<SessionCreated>)> {
    let id = state.sessions.create().await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionCreated {
            id,
            greeting: GREETING.to_string(),
        }),
    ))
}

async fn lookup(state: &AppState, raw_id: &str) -> ApiResult<(SessionId, SharedSession)> {
    let not_found = || TripMateError::not_found(format!("Session '{raw_id}' not found"));
    let id: SessionId = raw_id.parse().map_err(|_| not_found())?;
    let session = state.sessions.get(id).await.ok_or_else(not_found)?;
    Ok((id, session))
}

async fn destroy_session(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let (id, _) = lookup(&state, &id).await?;
    if state.sessions.destroy(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(TripMateError::not_found(format!("Session '{id}' not found")).into())
    }
}

async fn list_messages(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<MessagesResponse>> {
    let (id, session) = lookup(&state, &id).await?;
    let session = session.lock().await;
    Ok(Json(MessagesResponse {
        id,
        exchanges: session.state.exchanges().to_vec(),
    }))
}

async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<MessageRequest>, JsonRejection>,
) -> ApiResult<Json<TurnOutcome>> {
    let Json(request) = body?;
    let content = request.content.trim();
    if content.is_empty() {
        return Err(TripMateError::validation("Message cannot be empty").into());
    }

    let (id, session) = lookup(&state, &id).await?;
    let mut session = session.lock().await;
    debug!(session = %id, "chat turn");
    session.touch();
    let outcome = state.agent.respond(&mut session.state, content).await;
    session.touch();
    Ok(Json(outcome))
}

async fn plan_trip(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<PlanRequest>, JsonRejection>,
) -> ApiResult<Json<TurnOutcome>> {
    let Json(form) = body?;
    let query = TripQuery::try_from(form)?;
    let (id, session) = lookup(&state, &id).await?;
    let mut session = session.lock().await;
    debug!(session = %id, destination = %query.destination, "trip form");
    session.touch();
    let outcome = state.agent.plan(&mut session.state, &query).await;
    session.touch();
    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_request_validation() {
        let form: PlanRequest = serde_json::from_value(serde_json::json!({
            "destination": "Kyoto",
            "start_date": "2027-04-01",
            "end_date": "2027-04-05",
            "interests": ["temples", " "],
            "budget": "luxury"
        }))
        .unwrap();
        let query = TripQuery::try_from(form).unwrap();
        assert_eq!(query.travelers, 1);
        assert_eq!(query.interests, vec!["temples"]);
        assert_eq!(query.budget, BudgetTier::Luxury);

        let form: PlanRequest = serde_json::from_value(serde_json::json!({
            "destination": "Kyoto",
            "start_date": "2027-04-05",
            "end_date": "2027-04-01"
        }))
        .unwrap();
        assert!(matches!(TripQuery::try_from(form), Err(TripMateError::Validation { .. })));
    }

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (TripMateError::not_found("x"), StatusCode::NOT_FOUND),
            (TripMateError::validation("x"), StatusCode::BAD_REQUEST),
            (TripMateError::service_unavailable("weather", "x"), StatusCode::SERVICE_UNAVAILABLE),
            (TripMateError::llm("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).into_response().status(), status);
        }
    }
}
