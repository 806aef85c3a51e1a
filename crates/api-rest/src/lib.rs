//! # API REST
//!
//! REST API implementation for care orchestration.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `api-shared` for wire types and `care-core` for everything else.

#![warn(rust_2018_idioms)]

use api_shared::{
    AlertReq, AlertRes, CloseGapReq, CloseGapRes, ErrorRes, HealthRes, HealthService, ProcessRes,
};
use axum::{
    body::Bytes,
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use care_core::actions::{record_alert, record_gap_closure};
use care_core::analytics::{
    provider_performance as load_provider_performance, CareManagementStats, FinancialModel,
    PopulationAnalytics, ProviderPerformance,
};
use care_core::config::fhir_base_url_from_env_value;
use care_core::constants::{DEFAULT_FINANCIAL_MODEL_PATH, DEFAULT_SAMPLES_DIR};
use care_core::{CareError, CareOrchestrator, CoreConfig, MemberDataSource, MemberRecord};
use care_uuid::{Clock, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Default bind address for the REST server.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:8003";

/// Application state for the REST API server
///
/// Shared by all request handlers. Data files are re-read per request; nothing here is mutated.
#[derive(Clone)]
pub struct AppState {
    cfg: Arc<CoreConfig>,
    orchestrator: CareOrchestrator,
    clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(cfg: Arc<CoreConfig>, orchestrator: CareOrchestrator) -> Self {
        Self::with_clock(cfg, orchestrator, Arc::new(SystemClock))
    }

    pub fn with_clock(
        cfg: Arc<CoreConfig>,
        orchestrator: CareOrchestrator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cfg,
            orchestrator,
            clock,
        }
    }

    fn members(&self) -> MemberDataSource {
        MemberDataSource::new(self.cfg.member_data_file())
    }
}

type ApiError = (StatusCode, Json<ErrorRes>);

fn internal_error(context: &str, err: &CareError, message: &str) -> ApiError {
    tracing::error!("{}: {}", context, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorRes::failure(message)),
    )
}

/// Maps an absent data file to 404 and anything else to 500, both as `{success: false, error}`.
fn data_error(context: &str, err: &CareError, not_found: &str, failed: &str) -> ApiError {
    if err.is_missing_data() {
        tracing::warn!("{}: {}", context, err);
        (StatusCode::NOT_FOUND, Json(ErrorRes::failure(not_found)))
    } else {
        internal_error(context, err, failed)
    }
}

/// Resolve [`CoreConfig`] from `CARE_SAMPLES_DIR`, `CARE_FINANCIAL_MODEL` and `FHIR_BASE_URL`.
pub fn core_config_from_env() -> anyhow::Result<CoreConfig> {
    let samples_dir =
        std::env::var("CARE_SAMPLES_DIR").unwrap_or_else(|_| DEFAULT_SAMPLES_DIR.into());
    let financial_model = std::env::var("CARE_FINANCIAL_MODEL")
        .unwrap_or_else(|_| DEFAULT_FINANCIAL_MODEL_PATH.into());
    let fhir_base_url = fhir_base_url_from_env_value(std::env::var("FHIR_BASE_URL").ok());

    let samples_path = PathBuf::from(&samples_dir);
    if !samples_path.is_dir() {
        tracing::warn!(
            "Samples directory does not exist: {} (list endpoints will serve fallback data)",
            samples_path.display()
        );
    }

    Ok(CoreConfig::new(
        samples_path,
        PathBuf::from(financial_model),
        fhir_base_url,
    )?)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        care_gaps,
        members,
        member,
        send_alert,
        close_gap,
        process,
        population_analytics,
        provider_performance,
        care_management_stats,
    ),
    components(schemas(
        HealthRes,
        ErrorRes,
        ProcessRes,
        AlertReq,
        AlertRes,
        CloseGapReq,
        CloseGapRes,
    ))
)]
pub struct ApiDoc;

/// Build the application router with CORS and Swagger UI.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/care-gaps", get(care_gaps))
        .route("/members", get(members))
        .route("/member/:memberId", get(member))
        .route("/member/:memberId/alert", post(send_alert))
        .route("/member/:memberId/close-gap", post(close_gap))
        .route("/process", post(process))
        .route("/population-analytics", get(population_analytics))
        .route("/provider-performance", get(provider_performance))
        .route("/care-management-stats", get(care_management_stats))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint
///
/// Always healthy while answering; reports whether the broker is connected and whether a FHIR
/// server is configured.
#[axum::debug_handler]
async fn health(State(state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health(
        state.orchestrator.publisher_connected(),
        state.cfg.fhir_configured(),
        state.clock.now(),
    ))
}

#[utoipa::path(
    get,
    path = "/care-gaps",
    responses(
        (status = 200, description = "Member/gap records, or the fallback record"),
        (status = 500, description = "Data file unreadable", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn care_gaps(State(state): State<AppState>) -> Result<Json<Vec<MemberRecord>>, ApiError> {
    state
        .members()
        .load_or_fallback()
        .map(Json)
        .map_err(|e| internal_error("Error serving care gaps", &e, "Failed to retrieve care gaps"))
}

#[utoipa::path(
    get,
    path = "/members",
    responses(
        (status = 200, description = "Member records, or the fallback record"),
        (status = 500, description = "Data file unreadable", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn members(State(state): State<AppState>) -> Result<Json<Vec<MemberRecord>>, ApiError> {
    state
        .members()
        .load_or_fallback()
        .map(Json)
        .map_err(|e| internal_error("Error serving members", &e, "Failed to retrieve members"))
}

#[utoipa::path(
    get,
    path = "/member/{memberId}",
    params(("memberId" = String, Path, description = "Exact member id")),
    responses(
        (status = 200, description = "The member record"),
        (status = 404, description = "Unknown member or no data file", body = ErrorRes),
        (status = 500, description = "Data file unreadable", body = ErrorRes)
    )
)]
/// Look up one member by exact id.
#[axum::debug_handler]
async fn member(
    State(state): State<AppState>,
    AxumPath(member_id): AxumPath<String>,
) -> Result<Json<MemberRecord>, ApiError> {
    match state.members().find(&member_id) {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorRes::message("Member not found")),
        )),
        Err(e) if e.is_missing_data() => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorRes::message("Data not available")),
        )),
        Err(e) => Err(internal_error(
            "Error getting member details",
            &e,
            "Failed to retrieve member details",
        )),
    }
}

#[utoipa::path(
    post,
    path = "/member/{memberId}/alert",
    params(("memberId" = String, Path, description = "Member to alert")),
    request_body = AlertReq,
    responses(
        (status = 200, description = "Alert acknowledged", body = AlertRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Acknowledge a manual alert. Nothing is sent or stored.
#[axum::debug_handler]
async fn send_alert(
    State(state): State<AppState>,
    AxumPath(member_id): AxumPath<String>,
    req: Option<Json<AlertReq>>,
) -> Json<AlertRes> {
    let Json(req) = req.unwrap_or_default();
    let alert = record_alert(&member_id, req.alert_type, req.message, state.clock.now());

    Json(AlertRes {
        success: true,
        message: "Alert sent successfully".into(),
        alert,
    })
}

#[utoipa::path(
    post,
    path = "/member/{memberId}/close-gap",
    params(("memberId" = String, Path, description = "Member whose gap is closed")),
    request_body = CloseGapReq,
    responses(
        (status = 200, description = "Closure acknowledged", body = CloseGapRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Acknowledge a care-gap closure. Nothing is stored.
#[axum::debug_handler]
async fn close_gap(
    State(state): State<AppState>,
    AxumPath(member_id): AxumPath<String>,
    req: Option<Json<CloseGapReq>>,
) -> Json<CloseGapRes> {
    let Json(req) = req.unwrap_or_default();
    let closure = record_gap_closure(
        &member_id,
        req.measure_type,
        req.closure_reason,
        req.evidence,
        state.clock.now(),
    );

    Json(CloseGapRes {
        success: true,
        message: "Care gap closed successfully".into(),
        closure,
    })
}

#[utoipa::path(
    post,
    path = "/process",
    request_body(
        content = String,
        description = "Orchestration request JSON",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Orchestration result", body = ProcessRes),
        (status = 500, description = "Malformed or incomplete request", body = ErrorRes)
    )
)]
/// Run one orchestration pass synchronously.
///
/// The body is parsed here rather than by the `Json` extractor so that malformed input gets the
/// same `{success: false, error}` body as a missing field.
#[axum::debug_handler]
async fn process(State(state): State<AppState>, body: Bytes) -> Result<Json<ProcessRes>, ApiError> {
    let failure = |error: String| {
        tracing::error!("Error in process endpoint: {}", error);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorRes::failure(error)),
        )
    };

    let value: serde_json::Value =
        serde_json::from_slice(&body).map_err(|e| failure(format!("invalid JSON body: {e}")))?;

    let result = state
        .orchestrator
        .process_json(value)
        .await
        .map_err(|e| failure(e.to_string()))?;

    Ok(Json(ProcessRes {
        success: true,
        result,
    }))
}

#[utoipa::path(
    get,
    path = "/population-analytics",
    responses(
        (status = 200, description = "Population, financial and risk analytics"),
        (status = 404, description = "No member data file", body = ErrorRes),
        (status = 500, description = "Data file unreadable", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn population_analytics(
    State(state): State<AppState>,
) -> Result<Json<PopulationAnalytics>, ApiError> {
    const FAILED: &str = "Failed to retrieve population analytics";
    const CONTEXT: &str = "Error serving population analytics";

    let members = state
        .members()
        .load()
        .map_err(|e| data_error(CONTEXT, &e, "Enhanced member data not found", FAILED))?;
    let model = FinancialModel::load(state.cfg.financial_model_file())
        .map_err(|e| internal_error(CONTEXT, &e, FAILED))?;

    Ok(Json(PopulationAnalytics::compute(&members, &model)))
}

#[utoipa::path(
    get,
    path = "/provider-performance",
    responses(
        (status = 200, description = "Provider network performance"),
        (status = 404, description = "No population analytics file", body = ErrorRes),
        (status = 500, description = "Data file unreadable", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn provider_performance(
    State(state): State<AppState>,
) -> Result<Json<ProviderPerformance>, ApiError> {
    load_provider_performance(&state.cfg.population_analytics_file())
        .map(Json)
        .map_err(|e| {
            data_error(
                "Error serving provider performance",
                &e,
                "Provider performance data not found",
                "Failed to retrieve provider performance data",
            )
        })
}

#[utoipa::path(
    get,
    path = "/care-management-stats",
    responses(
        (status = 200, description = "Counts and cost totals over the member file"),
        (status = 404, description = "No member data file", body = ErrorRes),
        (status = 500, description = "Data file unreadable", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn care_management_stats(
    State(state): State<AppState>,
) -> Result<Json<CareManagementStats>, ApiError> {
    state
        .members()
        .load()
        .map(|members| Json(CareManagementStats::from_members(&members)))
        .map_err(|e| {
            data_error(
                "Error calculating care management stats",
                &e,
                "Care management data not found",
                "Failed to calculate statistics",
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use care_core::{DisconnectedPublisher, EventPublisher, InMemoryPublisher, Topic};
    use care_uuid::{FixedClock, SequentialIdGenerator};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct Harness {
        dir: TempDir,
        publisher: Arc<InMemoryPublisher>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                dir: TempDir::new().expect("tempdir"),
                publisher: Arc::new(InMemoryPublisher::new()),
            }
        }

        fn write(&self, name: &str, value: &Value) {
            std::fs::write(
                self.dir.path().join(name),
                serde_json::to_vec(value).expect("json"),
            )
            .expect("write");
        }

        fn app_with(&self, publisher: Arc<dyn EventPublisher>) -> Router {
            let cfg = CoreConfig::new(
                self.dir.path().to_path_buf(),
                self.dir.path().join("financial_impact_model.json"),
                None,
            )
            .expect("config");
            let clock = Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap(),
            ));
            let orchestrator = CareOrchestrator::with_capabilities(
                publisher,
                clock.clone(),
                Arc::new(SequentialIdGenerator::new("id")),
            );
            router(AppState::with_clock(Arc::new(cfg), orchestrator, clock))
        }

        fn app(&self) -> Router {
            self.app_with(self.publisher.clone())
        }
    }

    async fn send(
        app: Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&value).expect("json"))
            }
            None => Body::empty(),
        };

        let response = app
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn members_fixture() -> Value {
        json!([
            {"member_id": "100", "name": "A", "measure_type": "CCS", "risk_level": "HIGH",
             "evidence_found": true, "evidence_source": "HL7_MDM_PDF",
             "cost_impact": {"intervention_cost": 85, "quality_bonus_impact": 65}},
            {"member_id": "200", "name": "B", "measure_type": "WCV", "risk_level": "LOW",
             "evidence_found": false}
        ])
    }

    #[tokio::test]
    async fn health_reports_dependencies() {
        let harness = Harness::new();
        let (status, body) = send(harness.app(), Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "care-orchestration");
        assert_eq!(body["rabbitmq_connected"], true);
        assert_eq!(body["fhir_configured"], false);
    }

    #[tokio::test]
    async fn list_endpoints_fall_back_without_data_file() {
        let harness = Harness::new();
        for uri in ["/care-gaps", "/members"] {
            let (status, body) = send(harness.app(), Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body[0]["member_id"], "99990001000000");
            assert_eq!(body[0]["name"], "Maria Rodriguez");
        }
    }

    #[tokio::test]
    async fn list_endpoints_fail_on_malformed_file() {
        let harness = Harness::new();
        std::fs::write(harness.dir.path().join("enhanced_member_data.json"), "[{")
            .expect("write");

        let (status, body) = send(harness.app(), Method::GET, "/members", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"success": false, "error": "Failed to retrieve members"}));
    }

    #[tokio::test]
    async fn list_endpoints_serve_loosely_typed_records_verbatim() {
        let harness = Harness::new();
        let records = json!([
            {"member_id": 12345678, "age": 35.5, "risk_level": "high"},
            {"name": "No id", "cost_impact": "n/a"}
        ]);
        harness.write("enhanced_member_data.json", &records);

        for uri in ["/care-gaps", "/members"] {
            let (status, body) = send(harness.app(), Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, records);
        }

        let (status, body) =
            send(harness.app(), Method::GET, "/care-management-stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_members"], 2);
        assert_eq!(body["high_risk"], 0);
        assert_eq!(body["cost_impact"]["total_intervention_cost"], 0.0);
    }

    #[tokio::test]
    async fn member_lookup_statuses() {
        let harness = Harness::new();

        let (status, body) = send(harness.app(), Method::GET, "/member/100", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Data not available"}));

        harness.write("enhanced_member_data.json", &members_fixture());

        let (status, body) = send(harness.app(), Method::GET, "/member/200", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "B");

        let (status, body) = send(harness.app(), Method::GET, "/member/300", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Member not found"}));
    }

    #[tokio::test]
    async fn alert_and_close_gap_are_acknowledged() {
        let harness = Harness::new();

        let (status, body) = send(
            harness.app(),
            Method::POST,
            "/member/100/alert",
            Some(json!({"alertType": "SMS", "message": "Please book"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Alert sent successfully");
        assert_eq!(body["alert"]["member_id"], "100");
        assert_eq!(body["alert"]["type"], "SMS");
        assert_eq!(body["alert"]["status"], "sent");

        let (status, body) = send(
            harness.app(),
            Method::POST,
            "/member/100/close-gap",
            Some(json!({
                "measureType": "CCS",
                "closureReason": "Screening done",
                "evidence": "lab"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Care gap closed successfully");
        assert_eq!(body["closure"]["measure_type"], "CCS");
        assert_eq!(body["closure"]["closed_by"], "Care Manager");
        assert_eq!(body["closure"]["status"], "closed");
    }

    #[tokio::test]
    async fn alert_without_body_still_succeeds() {
        let harness = Harness::new();
        let (status, body) = send(harness.app(), Method::POST, "/member/100/alert", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["alert"]["status"], "sent");
    }

    #[tokio::test]
    async fn process_runs_pipeline_and_publishes() {
        let harness = Harness::new();
        let (status, body) = send(
            harness.app(),
            Method::POST,
            "/process",
            Some(json!({
                "message_id": "msg-9",
                "member_id": "12345678",
                "member_age": 40,
                "risk_predictions": {"CCS": {"risk_level": "HIGH", "risk_probability": 0.85}},
                "high_risk_measures": ["CCS"]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["result"]["total_care_gaps"], 1);
        assert_eq!(body["result"]["fhir_resources"].as_array().map(Vec::len), Some(3));
        assert_eq!(body["result"]["care_gaps"][0]["priority"], "high");
        assert_eq!(
            harness.publisher.topics(),
            vec![Topic::CareGapCreated, Topic::CareAlertHigh]
        );
    }

    #[tokio::test]
    async fn process_succeeds_without_broker() {
        let harness = Harness::new();
        let app = harness.app_with(Arc::new(DisconnectedPublisher));
        let (status, body) = send(
            app,
            Method::POST,
            "/process",
            Some(json!({
                "message_id": "m",
                "member_id": "1",
                "member_age": 5,
                "risk_predictions": {"WCV": {"risk_level": "MEDIUM", "risk_probability": 0.4}},
                "high_risk_measures": []
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn process_rejects_incomplete_request() {
        let harness = Harness::new();
        let (status, body) = send(
            harness.app(),
            Method::POST,
            "/process",
            Some(json!({"message_id": "m"})),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().is_some_and(|e| e.contains("member_id")));
        assert!(harness.publisher.topics().is_empty());
    }

    #[tokio::test]
    async fn analytics_endpoints_need_data_files() {
        let harness = Harness::new();
        for (uri, error) in [
            ("/population-analytics", "Enhanced member data not found"),
            ("/care-management-stats", "Care management data not found"),
            ("/provider-performance", "Provider performance data not found"),
        ] {
            let (status, body) = send(harness.app(), Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body, json!({"success": false, "error": error}));
        }
    }

    #[tokio::test]
    async fn analytics_endpoints_compute_from_member_file() {
        let harness = Harness::new();
        harness.write("enhanced_member_data.json", &members_fixture());
        harness.write(
            "population_analytics.json",
            &json!({"provider_network_analysis": {"top_performing_providers": []}}),
        );

        let (status, body) = send(harness.app(), Method::GET, "/care-management-stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_members"], 2);
        assert_eq!(body["high_risk"], 1);
        assert_eq!(body["evidence_sources"]["NONE"], 1);
        assert_eq!(body["cost_impact"]["total_intervention_cost"], 85.0);

        let (status, body) = send(harness.app(), Method::GET, "/population-analytics", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["population_overview"]["measures"]["CCS"]["eligible_members"], 1);
        assert_eq!(body["riskDistribution"]["low"], 1);

        let (status, body) = send(harness.app(), Method::GET, "/provider-performance", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["top_performers"], json!([]));
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let harness = Harness::new();
        let (status, body) = send(harness.app(), Method::GET, "/api-docs/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"].get("/process").is_some());
    }
}
