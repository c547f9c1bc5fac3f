use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::Local;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use uuid::Uuid;

use crate::core::{
    ProjectionResult, ProjectionSummary, SavingsPlan, Scenario, ScenarioProjection, Session,
    ValidationErrors, export_csv, export_file_name, project, summarize, validate_plan,
};

#[derive(Clone, Default)]
pub struct AppState {
    session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    initial: Option<f64>,
    monthly: Option<f64>,
    years: Option<u32>,
    annual_percent: Option<f64>,
}

impl PlanPayload {
    fn apply_to(self, mut plan: SavingsPlan) -> SavingsPlan {
        if let Some(v) = self.initial {
            plan.initial = v;
        }
        if let Some(v) = self.monthly {
            plan.monthly = v;
        }
        if let Some(v) = self.years {
            plan.years = v;
        }
        if let Some(v) = self.annual_percent {
            plan.annual_percent = v;
        }
        plan
    }
}

#[derive(Debug, Default, Deserialize)]
struct NotesPayload {
    notes: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionResponse {
    plan: SavingsPlan,
    summary: ProjectionSummary,
    result: ProjectionResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioListResponse {
    active_scenario: Option<Uuid>,
    scenarios: Vec<Scenario>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComparisonEntry {
    scenario: Scenario,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ProjectionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<ScenarioProjection> for ComparisonEntry {
    fn from(slot: ScenarioProjection) -> Self {
        match slot.outcome {
            Ok(result) => ComparisonEntry {
                summary: Some(summarize(&slot.scenario.plan, &result)),
                scenario: slot.scenario,
                error: None,
            },
            Err(err) => ComparisonEntry {
                scenario: slot.scenario,
                summary: None,
                error: Some(err.to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct NotesResponse {
    notes: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/plan", get(plan_get_handler).post(plan_post_handler))
        .route(
            "/api/scenarios",
            get(scenarios_list_handler)
                .post(scenarios_save_handler)
                .delete(session_reset_handler),
        )
        .route("/api/scenarios/:id", delete(scenario_delete_handler))
        .route("/api/scenarios/:id/load", post(scenario_load_handler))
        .route("/api/compare", get(compare_handler))
        .route("/api/notes", get(notes_get_handler).put(notes_put_handler))
        .route("/api/export", get(export_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(AppState::new());

    let listener = TcpListener::bind(addr).await?;
    info!("projection API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/api/plan");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<PlanPayload>) -> Response {
    project_stateless(payload)
}

async fn project_post_handler(Json(payload): Json<PlanPayload>) -> Response {
    project_stateless(payload)
}

fn project_stateless(payload: PlanPayload) -> Response {
    let plan = payload.apply_to(SavingsPlan::default());
    projection_response(plan)
}

async fn plan_get_handler(State(state): State<AppState>) -> Response {
    let plan = state.session().plan();
    projection_response(plan)
}

/// Layers the payload over the session's active plan and stores it even when
/// invalid, so the caller sees every violation of what it is editing.
async fn plan_post_handler(
    State(state): State<AppState>,
    Json(payload): Json<PlanPayload>,
) -> Response {
    let plan = {
        let mut session = state.session();
        let plan = payload.apply_to(session.plan());
        session.set_plan(plan);
        plan
    };
    projection_response(plan)
}

async fn scenarios_list_handler(State(state): State<AppState>) -> Response {
    let session = state.session();
    json_response(StatusCode::OK, scenario_list(&session))
}

async fn scenarios_save_handler(State(state): State<AppState>) -> Response {
    let mut session = state.session();
    match session.save_scenario() {
        Ok(scenario) => {
            let scenario = scenario.clone();
            info!("saved scenario {} ({})", scenario.name, scenario.id);
            json_response(StatusCode::CREATED, scenario)
        }
        Err(errors) => validation_error_response(&errors),
    }
}

async fn session_reset_handler(State(state): State<AppState>) -> Response {
    let mut session = state.session();
    session.reset();
    info!("session reset");
    json_response(StatusCode::OK, scenario_list(&session))
}

async fn scenario_delete_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    let mut session = state.session();
    match session.remove_scenario(id) {
        Some(removed) => json_response(StatusCode::OK, removed),
        None => error_response(StatusCode::NOT_FOUND, &format!("No scenario {id}")),
    }
}

async fn scenario_load_handler(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let loaded = state.session().load_scenario(id);
    match loaded {
        Some(plan) => projection_response(plan),
        None => error_response(StatusCode::NOT_FOUND, &format!("No scenario {id}")),
    }
}

async fn compare_handler(State(state): State<AppState>) -> Response {
    let slots = state.session().book().compare();
    let entries: Vec<ComparisonEntry> = slots.into_iter().map(ComparisonEntry::from).collect();
    json_response(StatusCode::OK, entries)
}

async fn notes_get_handler(State(state): State<AppState>) -> Response {
    let notes = state.session().notes().to_string();
    json_response(StatusCode::OK, NotesResponse { notes })
}

async fn notes_put_handler(
    State(state): State<AppState>,
    Json(payload): Json<NotesPayload>,
) -> Response {
    let mut session = state.session();
    session.set_notes(&payload.notes);
    json_response(
        StatusCode::OK,
        NotesResponse {
            notes: session.notes().to_string(),
        },
    )
}

async fn export_handler(State(state): State<AppState>) -> Response {
    let (plan, scenarios) = {
        let session = state.session();
        (session.plan(), session.book().scenarios().to_vec())
    };

    if let Err(errors) = validate_plan(&plan) {
        return validation_error_response(&errors);
    }
    let result = match project(&plan.to_parameters()) {
        Ok(result) => result,
        Err(err) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, &err.to_string()),
    };

    let today = Local::now().date_naive();
    let body = export_csv(&result.rows, &scenarios, today);
    let disposition = format!("attachment; filename=\"{}\"", export_file_name(today));
    with_cache_control(
        (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            body,
        )
            .into_response(),
    )
}

fn scenario_list(session: &Session) -> ScenarioListResponse {
    ScenarioListResponse {
        active_scenario: session.book().active(),
        scenarios: session.book().scenarios().to_vec(),
    }
}

fn projection_response(plan: SavingsPlan) -> Response {
    if let Err(errors) = validate_plan(&plan) {
        return validation_error_response(&errors);
    }
    match project(&plan.to_parameters()) {
        Ok(result) => {
            debug!(
                "projected {} months, final balance {:.2}",
                result.rows.len(),
                result.final_balance
            );
            let summary = summarize(&plan, &result);
            json_response(
                StatusCode::OK,
                ProjectionResponse {
                    plan,
                    summary,
                    result,
                },
            )
        }
        Err(err) => error_response(StatusCode::UNPROCESSABLE_ENTITY, &err.to_string()),
    }
}

fn with_cache_control(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)).into_response())
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
            details: Vec::new(),
        },
    )
}

fn validation_error_response(errors: &ValidationErrors) -> Response {
    warn!("rejected parameters: {errors}");
    json_response(
        StatusCode::BAD_REQUEST,
        ErrorResponse {
            error: "Invalid parameters".to_string(),
            details: errors.messages(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Response) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .expect("valid request");
        let response = app.clone().oneshot(request).await.expect("infallible");
        (response.status(), response)
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        String::from_utf8(bytes.to_vec()).expect("utf-8 body")
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).expect("json body")
    }

    #[test]
    fn payload_layers_over_base_plan() {
        let payload: PlanPayload =
            serde_json::from_str(r#"{ "monthly": 350, "annualPercent": -4.5 }"#).expect("parses");
        let plan = payload.apply_to(SavingsPlan::default());
        assert_eq!(plan.initial, 1_000.0);
        assert_eq!(plan.monthly, 350.0);
        assert_eq!(plan.years, 10);
        assert_eq!(plan.annual_percent, -4.5);
    }

    #[tokio::test]
    async fn stateless_projection_uses_defaults() {
        let app = router(AppState::new());
        let (status, response) = send(&app, "GET", "/api/project?years=2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).expect("header"),
            "no-store"
        );

        let json = body_json(response).await;
        assert_eq!(json["plan"]["years"], 2);
        assert_eq!(json["result"]["rows"].as_array().expect("rows").len(), 24);
        assert_eq!(json["result"]["rows"][0]["monthLabel"], "Jan");
        assert_eq!(json["summary"]["totalContribution"], 5_800.0);
        assert!(json["summary"]["performance"].is_string());
    }

    #[tokio::test]
    async fn out_of_range_parameters_list_every_violation() {
        let app = router(AppState::new());
        let (status, response) = send(
            &app,
            "POST",
            "/api/project",
            Some(r#"{ "initial": -5, "monthly": 60000, "years": 51, "annualPercent": 75 }"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid parameters");
        let details = json["details"].as_array().expect("details");
        assert_eq!(details.len(), 4);
        assert_eq!(details[0], "initial must be between 0 and 1000000, got -5");
        assert!(details.iter().all(Value::is_string));
    }

    #[tokio::test]
    async fn scenario_lifecycle_round_trips_through_the_session() {
        let app = router(AppState::new());

        let (status, _) = send(
            &app,
            "POST",
            "/api/plan",
            Some(r#"{ "initial": 5000, "years": 20 }"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, response) = send(&app, "POST", "/api/scenarios", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let saved = body_json(response).await;
        assert_eq!(saved["name"], "Scenario 1");
        assert_eq!(saved["plan"]["initial"], 5_000.0);
        let id = saved["id"].as_str().expect("id").to_string();

        send(&app, "POST", "/api/plan", Some(r#"{ "initial": 1 }"#)).await;
        let (status, response) = send(&app, "POST", &format!("/api/scenarios/{id}/load"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json(response).await["plan"]["initial"], 5_000.0);

        let (_, response) = send(&app, "GET", "/api/scenarios", None).await;
        let listed = body_json(response).await;
        assert_eq!(listed["activeScenario"], id.as_str());
        assert_eq!(listed["scenarios"].as_array().expect("list").len(), 1);

        let (status, _) = send(&app, "DELETE", &format!("/api/scenarios/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "DELETE", &format!("/api/scenarios/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, response) = send(&app, "GET", "/api/scenarios", None).await;
        let listed = body_json(response).await;
        assert!(listed["activeScenario"].is_null());
    }

    #[tokio::test]
    async fn invalid_active_plan_cannot_be_saved() {
        let app = router(AppState::new());
        let (status, _) = send(&app, "POST", "/api/plan", Some(r#"{ "years": 0 }"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, response) = send(&app, "POST", "/api/scenarios", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("years"));
    }

    #[tokio::test]
    async fn compare_returns_one_entry_per_scenario_in_order() {
        let app = router(AppState::new());
        send(&app, "POST", "/api/scenarios", None).await;
        send(&app, "POST", "/api/plan", Some(r#"{ "years": 30 }"#)).await;
        send(&app, "POST", "/api/scenarios", None).await;

        let (status, response) = send(&app, "GET", "/api/compare", None).await;
        assert_eq!(status, StatusCode::OK);
        let json = body_json(response).await;
        let entries = json.as_array().expect("array");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["scenario"]["name"], "Scenario 1");
        assert_eq!(entries[1]["summary"]["months"], 360);
        assert!(entries[1].get("error").is_none());
    }

    #[tokio::test]
    async fn export_returns_csv_with_saved_scenarios() {
        let app = router(AppState::new());
        send(&app, "POST", "/api/scenarios", None).await;

        let (status, response) = send(&app, "GET", "/api/export", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).expect("header"),
            "text/csv; charset=utf-8"
        );
        let text = body_text(response).await;
        assert!(text.contains("Scenario 1,Initial: €1000,Monthly: €200,Years: 10,Rate: 8%"));
        assert_eq!(text.lines().count(), 7 + 120);
    }

    #[tokio::test]
    async fn notes_are_stored_and_capped() {
        let app = router(AppState::new());
        let long = "x".repeat(800);
        let (status, response) = send(
            &app,
            "PUT",
            "/api/notes",
            Some(&format!(r#"{{ "notes": "{long}" }}"#)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body_json(response).await["notes"].as_str().expect("notes").len(),
            500
        );

        let (status, response) = send(&app, "DELETE", "/api/scenarios", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body_json(response).await["scenarios"].as_array().expect("list").is_empty());
        let (_, response) = send(&app, "GET", "/api/notes", None).await;
        assert_eq!(body_json(response).await["notes"], "");
    }

    #[tokio::test]
    async fn unknown_routes_are_json_404s() {
        let app = router(AppState::new());
        let (status, response) = send(&app, "GET", "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Not found");
    }
}
