use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info};
use uuid::Uuid;

use triage_core::{
    AssessmentSession, ClassificationClient, Classify, HospitalDirectory, InMemorySessionStore,
    Lang, OutcomeDisposition, SessionStore, TriageError, affordances_for,
    image::validate_image_payload, remedies, t,
};

use crate::auth::BearerAuth;
use crate::classifier::{GatewayError, VisionClassifier};
use crate::hospitals::StaticHospitalDirectory;
use crate::models::{
    AnalyzeRequest, AnalyzeResponse, AssessRequest, CaptureRequest, CreateSessionResponse,
    NearbyQuery, SessionSnapshot,
};

type ApiResult<T> = Result<Json<T>, ApiError>;
type ApiError = (StatusCode, Json<Value>);

// Delhi city centre, used when the caller shares no location
const DEFAULT_LAT: f64 = 28.6139;
const DEFAULT_LNG: f64 = 77.209;

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn unauthorized_error() -> ApiError {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Authentication required" })),
    )
}

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "session_id": id
        })),
    )
}

fn conflict_error(message: &str) -> ApiError {
    (StatusCode::CONFLICT, Json(json!({ "error": message })))
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub classify: Arc<dyn Classify>,
    pub gateway: Arc<VisionClassifier>,
    pub hospitals: Arc<dyn HospitalDirectory>,
    pub auth: BearerAuth,
}

pub async fn create_app() -> Router {
    let app_state = create_app_state();
    build_router(app_state)
}

fn create_app_state() -> AppState {
    let gateway = Arc::new(VisionClassifier::from_env().unwrap_or_else(|e| {
        error!("Failed to configure vision gateway: {}", e);
        std::process::exit(1);
    }));

    // Remote endpoint when configured, in-process gateway otherwise
    let classify: Arc<dyn Classify> = if let Ok(url) = std::env::var("CLASSIFIER_URL") {
        info!("Using remote classification endpoint at {}", url);
        let mut client = ClassificationClient::new(url);
        if let Ok(token) = std::env::var("SERVICE_TOKEN") {
            client = client.with_auth_token(token);
        }
        Arc::new(client)
    } else {
        info!("Using in-process vision gateway classifier (set CLASSIFIER_URL to go remote)");
        gateway.clone()
    };

    AppState {
        sessions: Arc::new(InMemorySessionStore::new()),
        classify,
        gateway,
        hospitals: Arc::new(StaticHospitalDirectory::new()),
        auth: BearerAuth::from_env(),
    }
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/assess", post(assess_image))
        .route("/hospitals", get(nearby_hospitals))
        .route("/triage", post(create_session))
        .route("/triage/{session_id}", get(get_session))
        .route("/triage/{session_id}/capture", post(capture_image))
        .route("/triage/{session_id}/analyze", post(analyze_session))
        .route("/triage/{session_id}/reset", post(reset_session))
        .layer(from_fn(correlation_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Middleware to add correlation ID to all requests
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Injury Triage Service",
        "version": "0.1.0",
        "description": "AI-assisted injury assessment with bilingual first-aid guidance",
        "endpoints": {
            "POST /assess": "Classify an injury photo (imageBase64)",
            "POST /triage": "Create a triage session",
            "POST /triage/{session_id}/capture": "Attach a captured image",
            "POST /triage/{session_id}/analyze": "Run the assessment pipeline",
            "POST /triage/{session_id}/reset": "Leave the flow and clear state",
            "GET /triage/{session_id}": "Session snapshot",
            "GET /hospitals": "Nearby hospitals sorted by distance",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// The classification endpoint: one image in, one assessment document out.
/// The document is passed through as the model produced it; consumers run
/// the defensive validation.
async fn assess_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AssessRequest>,
) -> ApiResult<Value> {
    if !state.auth.state_for(&headers).is_authenticated {
        return Err(unauthorized_error());
    }

    validate_image(&request.image_base64)?;
    info!(language = ?request.language, "Processing assess request");

    match state.gateway.assess(&request.image_base64).await {
        Ok(document) => Ok(Json(document)),
        Err(GatewayError::EmptyImage) => Err(bad_request_error("No image provided")),
        Err(GatewayError::RateLimited) => Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "Rate limit exceeded. Please try again in a moment." })),
        )),
        Err(GatewayError::QuotaExhausted) => Err((
            StatusCode::PAYMENT_REQUIRED,
            Json(json!({ "error": "AI credits exhausted. Please add credits." })),
        )),
        Err(e) => {
            error!("Classification failed: {}", e);
            Err(internal_error("Analysis failed", &e.to_string()))
        }
    }
}

fn validate_image(image_base64: &str) -> Result<(), ApiError> {
    match validate_image_payload(image_base64) {
        Ok(_) => Ok(()),
        Err(TriageError::EmptyImage) => Err(bad_request_error("No image provided")),
        Err(e) => Err(bad_request_error(&e.to_string())),
    }
}

async fn create_session(State(state): State<AppState>) -> ApiResult<CreateSessionResponse> {
    let session = AssessmentSession::new();
    let session_id = session.id.clone();

    save_session(&state, session).await?;
    info!("Triage session {} created", session_id);

    Ok(Json(CreateSessionResponse { session_id }))
}

async fn capture_image(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<CaptureRequest>,
) -> ApiResult<Value> {
    validate_image(&request.image_base64)?;

    let mut session = load_session(&state, &session_id).await?;
    session
        .begin_capture(request.image_base64)
        .map_err(|e| bad_request_error(&e.to_string()))?;
    save_session(&state, session).await?;

    Ok(Json(json!({
        "session_id": session_id,
        "status": "captured"
    })))
}

/// Drives the pipeline for one submission: mark the session in-flight, call
/// the classifier, then re-load the session and apply the outcome under the
/// stale-response guard.
async fn analyze_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<AnalyzeResponse> {
    if !state.auth.state_for(&headers).is_authenticated {
        return Err(unauthorized_error());
    }

    let mut session = load_session(&state, &session_id).await?;
    let Some(image) = session.captured_image().map(str::to_string) else {
        return Err(bad_request_error("No image captured for this session"));
    };
    let ticket = session
        .begin_analysis()
        .map_err(|e| bad_request_error(&e.to_string()))?;
    save_session(&state, session).await?;

    let outcome = state.classify.classify(&image, request.language).await;

    // The user may have re-captured or left the flow while the request was
    // in flight; apply against fresh state and discard if superseded.
    let mut session = load_session(&state, &session_id).await?;
    let disposition = match session.apply_outcome(ticket, outcome) {
        Ok(disposition) => disposition,
        Err(TriageError::StaleOutcome { .. }) => {
            info!("Session {} outcome arrived stale, discarding", session_id);
            return Err(conflict_error("Analysis superseded; outcome discarded"));
        }
        Err(e) => return Err(internal_error("Failed to apply outcome", &e.to_string())),
    };
    save_session(&state, session.clone()).await?;

    Ok(Json(build_analyze_response(
        session_id,
        &session,
        disposition,
        request.language,
    )))
}

fn build_analyze_response(
    session_id: String,
    session: &AssessmentSession,
    disposition: OutcomeDisposition,
    lang: Lang,
) -> AnalyzeResponse {
    let mut response = AnalyzeResponse {
        session_id,
        disposition,
        result: None,
        remedy_steps: Vec::new(),
        affordances: None,
        notice: None,
    };

    match disposition {
        OutcomeDisposition::ShowResult => {
            if let Some(result) = session.result() {
                response.remedy_steps = remedies::resolve_steps(result);
                response.affordances = Some(affordances_for(result.severity));
                response.result = Some(result.clone());
            }
        }
        OutcomeDisposition::NotAnInjuryNotice => {
            response.notice = Some(format!(
                "{}. {}",
                t("notInjuryTitle", lang),
                t("notInjuryBody", lang)
            ));
        }
        OutcomeDisposition::FailureNotice(_) => {
            response.notice = Some(format!(
                "{}. {}",
                t("analysisFailed", lang),
                t("retryHint", lang)
            ));
        }
    }

    response
}

async fn reset_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Value> {
    let mut session = load_session(&state, &session_id).await?;
    session.reset();
    save_session(&state, session).await?;

    Ok(Json(json!({
        "session_id": session_id,
        "status": "reset"
    })))
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SessionSnapshot> {
    let session = load_session(&state, &session_id).await?;
    Ok(Json(SessionSnapshot {
        session_id: session.id.clone(),
        has_captured_image: session.captured_image().is_some(),
        is_analyzing: session.is_analyzing(),
        result: session.result().cloned(),
    }))
}

async fn nearby_hospitals(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Json<Value> {
    let lat = query.lat.unwrap_or(DEFAULT_LAT);
    let lng = query.lng.unwrap_or(DEFAULT_LNG);
    let hospitals = state.hospitals.nearby(lat, lng).await;
    Json(json!({ "hospitals": hospitals }))
}

async fn load_session(state: &AppState, session_id: &str) -> Result<AssessmentSession, ApiError> {
    match state.sessions.get(session_id).await {
        Ok(Some(session)) => Ok(session),
        Ok(None) => Err(not_found_error("Session not found", session_id)),
        Err(e) => {
            error!("Failed to load session {}: {}", session_id, e);
            Err(internal_error("Failed to load session", &e.to_string()))
        }
    }
}

async fn save_session(state: &AppState, session: AssessmentSession) -> Result<(), ApiError> {
    state.sessions.save(session).await.map_err(|e| {
        error!("Failed to save session: {}", e);
        internal_error("Failed to save session", &e.to_string())
    })
}
