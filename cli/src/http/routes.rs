//! HTTP route handlers

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use chrono::Local;
use tracing::{info, warn};

use bft_core::api::{
    parse_suite_request, parse_test_request, OutcomeKind, RunId, RunStatus, SuiteVerdict,
    TestOutcome,
};

use crate::http::{
    error::HttpServerError,
    middleware::require_token,
    models::{HealthResponse, TESTS_RUNNING, TESTS_STILL_RUNNING},
    state::AppState,
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/test", get(run_test_handler).post(run_test_handler))
        .route("/suite", get(run_suite_handler).post(run_suite_handler))
        .route("/getResults/:run_id", get(get_results_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
        // health stays reachable without a token
        .route("/health", get(health_handler))
        .with_state(state)
}

/// GET|POST /test - runs a single test within the request
async fn run_test_handler(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Response, HttpServerError> {
    state.record_request("/test");
    info!("Processing a test request");

    let def = parse_test_request(&query, &body).map_err(|e| {
        state.record_error();
        HttpServerError::TestInput(e)
    })?;

    let outcome = match state.orchestrator.run_single(&def).await {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(test = %def.name, error = %err, "Test could not be executed");
            state.record_error();
            TestOutcome::error(def.name.clone(), err.to_string())
        }
    };

    let status = match outcome.outcome {
        OutcomeKind::Pass => StatusCode::OK,
        OutcomeKind::Fail => StatusCode::PRECONDITION_FAILED,
        OutcomeKind::Error => StatusCode::INTERNAL_SERVER_ERROR,
    };
    Ok((status, Json(outcome)).into_response())
}

/// GET|POST /suite - starts a suite run and answers 202 right away
async fn run_suite_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Response, HttpServerError> {
    state.record_request("/suite");
    info!("Processing a suite request");

    let suite = parse_suite_request(&query, &body).map_err(|err| {
        warn!(error = %err, "Could not get tests data from request");
        state.record_error();
        HttpServerError::SuiteInput(err)
    })?;
    let tests = suite.tests.len();

    let run_id = state.orchestrator.submit(suite);
    info!(run_id = %run_id, tests, "Successfully got all tests from the request");

    let location = results_location(&state, &headers, &run_id);

    Ok((
        StatusCode::ACCEPTED,
        [(header::LOCATION, location)],
        Json(TESTS_RUNNING),
    )
        .into_response())
}

/// GET /getResults/:run_id - polls a suite run
async fn get_results_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(run_id): Path<String>,
) -> Response {
    state.record_request("/getResults");
    let run_id = RunId::from(run_id);
    let store = state.orchestrator.store();

    match store.status(&run_id) {
        RunStatus::Unknown => HttpServerError::RunNotFound.into_response(),
        RunStatus::Running => (
            StatusCode::ACCEPTED,
            [
                (header::LOCATION, results_location(&state, &headers, &run_id)),
                (
                    header::RETRY_AFTER,
                    state.config.suite.retry_after_secs.to_string(),
                ),
            ],
            Json(TESTS_STILL_RUNNING),
        )
            .into_response(),
        RunStatus::Finished(record) => match record.verdict {
            SuiteVerdict::Error => {
                let response =
                    (StatusCode::INTERNAL_SERVER_ERROR, Json(record.as_ref())).into_response();
                // The error has been delivered; nothing is left to poll for.
                if store.expire(&run_id, &record) {
                    info!(run_id = %run_id, "Deleted errored suite results after delivery");
                }
                response
            }
            _ => (StatusCode::OK, Json(record.as_ref())).into_response(),
        },
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let counts = state.orchestrator.store().counts();
    let (uptime_seconds, requests_handled, errors_total, requests_by_path) = state
        .stats
        .read()
        .map(|s| {
            (
                s.uptime_seconds(),
                s.requests_total,
                s.errors_total,
                s.requests_by_path.clone(),
            )
        })
        .unwrap_or_default();

    Json(HealthResponse {
        status: "healthy".into(),
        uptime_seconds,
        requests_handled,
        errors_total,
        requests_by_path,
        active_runs: counts.running,
        finished_runs: counts.finished,
        timestamp: Local::now().to_rfc3339(),
    })
}

fn results_location(state: &AppState, headers: &HeaderMap, run_id: &RunId) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| {
            format!(
                "{}:{}",
                state.config.http_server.host, state.config.http_server.port
            )
        });
    format!("http://{host}/getResults/{run_id}")
}
