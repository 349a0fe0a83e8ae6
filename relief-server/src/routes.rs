use crate::live::live_reports;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use relief_core::store::StoreError;
use relief_core::{IncidentPatch, NewIncident, ValidationError};
use report_schema::{ReportDocument, ReportPatch, SubmitReport};

pub fn report_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/reports", get(list_reports).post(create_report))
        .route("/api/reports/live", get(live_reports))
        .route("/api/reports/:id", patch(update_report).delete(delete_report))
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    Invalid(ValidationError),
    Store(StoreError),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Invalid(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Invalid(err) | ApiError::Store(StoreError::Invalid(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::Store(StoreError::NotFound(id)) => {
                (StatusCode::NOT_FOUND, format!("report '{id}' not found"))
            }
            ApiError::Store(err) => {
                tracing::error!(error = %err, "store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "store unavailable".to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

async fn list_reports(State(state): State<AppState>) -> Result<Json<Vec<ReportDocument>>, ApiError> {
    Ok(Json(state.store.documents()?))
}

async fn create_report(
    State(state): State<AppState>,
    Json(payload): Json<SubmitReport>,
) -> Result<(StatusCode, Json<ReportDocument>), ApiError> {
    let new = NewIncident::from_submission(payload)?;
    let created = state.store.create(new)?;
    Ok((StatusCode::CREATED, Json(created.to_document())))
}

async fn update_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ReportPatch>,
) -> Result<StatusCode, ApiError> {
    let patch = IncidentPatch::from_wire(payload)?;
    state.store.update(&id, patch)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deleting an id that is already gone still answers 204.
async fn delete_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use futures::StreamExt;
    use relief_core::store::ReportStore;
    use tower::ServiceExt;

    fn db_path(name: &str) -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        format!("/tmp/relief-tests/{name}-{nanos}.db")
    }

    fn state(name: &str) -> AppState {
        AppState {
            store: ReportStore::open(&db_path(name)).expect("open"),
        }
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    fn flood_report() -> serde_json::Value {
        serde_json::json!({
            "type": "Flood",
            "location": "Test City",
            "description": "Test",
            "severity": "critical",
            "lat": 10.0,
            "lng": 20.0
        })
    }

    #[tokio::test]
    async fn create_then_list() {
        let state = state("http-create");
        let app = report_router(state.clone());

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/reports", flood_report()))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["status"], "pending");
        assert!(created["timestamp"].is_string());

        let response = app
            .oneshot(Request::get("/api/reports").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let listed = body_json(response).await;
        assert_eq!(listed.as_array().map(Vec::len), Some(1));
        assert_eq!(listed[0]["lat"], 10.0);
        assert_eq!(listed[0]["severity"], "critical");
    }

    #[tokio::test]
    async fn missing_required_fields_are_rejected() {
        let app = report_router(state("http-invalid"));
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/reports",
                serde_json::json!({ "type": "Fire", "location": "", "description": "smoke" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Please fill in all required fields.");
    }

    #[tokio::test]
    async fn unknown_type_is_rejected_not_stored() {
        let state = state("http-unknown-type");
        let app = report_router(state.clone());
        let mut report = flood_report();
        report["type"] = "Volcano".into();

        let response = app
            .oneshot(json_request("POST", "/api/reports", report))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "unknown type 'Volcano'");
        assert!(state.store.list().expect("list").is_empty());
    }

    #[tokio::test]
    async fn status_change_and_missing_report() {
        let state = state("http-patch");
        let app = report_router(state.clone());
        let created = state
            .store
            .create(
                NewIncident::from_submission(
                    serde_json::from_value(flood_report()).expect("submission"),
                )
                .expect("valid"),
            )
            .expect("create");

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/reports/{}", created.id),
                serde_json::json!({ "status": "resolved" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let stored = state.store.get(&created.id).expect("get").expect("exists");
        assert_eq!(stored.status, relief_core::Status::Resolved);

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                "/api/reports/does-not-exist",
                serde_json::json!({ "status": "verified" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(json_request(
                "PATCH",
                &format!("/api/reports/{}", created.id),
                serde_json::json!({ "status": "archived" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_twice_is_no_content() {
        let state = state("http-delete");
        let app = report_router(state.clone());
        let created = state
            .store
            .create(
                NewIncident::from_submission(
                    serde_json::from_value(flood_report()).expect("submission"),
                )
                .expect("valid"),
            )
            .expect("create");

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(
                    Request::delete(format!("/api/reports/{}", created.id))
                        .body(Body::empty())
                        .expect("request"),
                )
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
        }
        assert!(state.store.list().expect("list").is_empty());
    }

    #[tokio::test]
    async fn live_feed_pushes_snapshots() {
        let state = state("http-live");
        let app = report_router(state.clone());

        let response = app
            .oneshot(Request::get("/api/reports/live").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let mut frames = response.into_body().into_data_stream();

        let first = frames.next().await.expect("frame").expect("bytes");
        let first = String::from_utf8_lossy(&first).to_string();
        assert!(first.contains("event: snapshot"));
        assert!(first.contains("data: []"));

        state
            .store
            .create(
                NewIncident::from_submission(
                    serde_json::from_value(flood_report()).expect("submission"),
                )
                .expect("valid"),
            )
            .expect("create");

        let second = frames.next().await.expect("frame").expect("bytes");
        let second = String::from_utf8_lossy(&second).to_string();
        assert!(second.contains("Test City"));
        assert!(second.contains("\"status\":\"pending\""));
        assert_eq!(state.store.subscriber_count(), 1);

        drop(frames);
        assert_eq!(state.store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn health_check() {
        let app = report_router(state("http-health"));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
