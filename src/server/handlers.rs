//! Request handlers for the device-control endpoints
//!
//! Every command endpoint walks the same stages: parse body, validate against
//! the action registry, check the rate limit, invoke, respond. Any stage may
//! short-circuit with its documented status; nothing reaches a device before
//! validation and admission both pass.

use crate::devices::DeviceController;
use crate::error::DenError;
use crate::invoker::CommandResult;
use crate::server::models::{
    AggregateStatusResponse, AppRequest, ButtonRequest, ButtonResponse, CastAppResponse,
    CastControlRequest, CastControlResponse, CastMediaRequest, CastMediaResponse,
    CastStatusResponse, CommandFailure, HealthResponse, KeyRequest, KeyResponse, PowerRequest,
    PowerResponse, Ps5StatusResponse, TvAppResponse, WakeResponse,
};
use crate::server::rate_limiter::RateLimiter;
use crate::server::SharedState;
use crate::validation::{self, CastAction, PowerAction};
use async_trait::async_trait;
use axum::extract::{FromRequest, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{debug, error};

/// JSON extractor reporting body problems in this API's error shape
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = DenError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(DenError::invalid_input(rejection.body_text())),
        }
    }
}

/// Rate-limit key for a request: first forwarded address, else a fixed local key
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "local".to_string())
}

async fn check_rate(limiter: &RateLimiter, headers: &HeaderMap) -> Result<(), DenError> {
    if limiter.admit(&client_key(headers)).await.is_allowed() {
        Ok(())
    } else {
        Err(DenError::rate_limited(
            "Too many requests, try again shortly",
        ))
    }
}

/// 500 carrying the normalized device error verbatim
fn command_failure(result: &CommandResult) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(CommandFailure {
            success: false,
            error: result.error_message(),
        }),
    )
        .into_response()
}

/// Fallback for panics escaping a handler; the client still gets the shape
/// every other failure uses.
pub fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "Unexpected internal error".to_string()
    };
    error!(panic = %detail, "handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": detail })),
    )
        .into_response()
}

// Service endpoints

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn aggregate_status(State(state): State<SharedState>) -> Json<AggregateStatusResponse> {
    let probes = state
        .controllers()
        .into_iter()
        .map(|controller| async move { controller.status().await });
    let devices = futures::future::join_all(probes).await;
    Json(AggregateStatusResponse { devices })
}

// Samsung TV endpoints

pub async fn tv_key(
    State(state): State<SharedState>,
    headers: HeaderMap,
    AppJson(body): AppJson<KeyRequest>,
) -> Result<Response, DenError> {
    let key_code = validation::tv_key_code(&body.key).ok_or_else(|| {
        DenError::invalid_input(format!(
            "Unknown key '{}'. Valid keys: {}",
            body.key,
            validation::tv_key_names().join(", ")
        ))
    })?;
    check_rate(&state.limits.key_press, &headers).await?;

    let result = state.tv.send_key(key_code).await;
    if result.success {
        Ok(Json(KeyResponse {
            success: true,
            key: body.key,
        })
        .into_response())
    } else {
        Ok(command_failure(&result))
    }
}

pub async fn tv_app(
    State(state): State<SharedState>,
    headers: HeaderMap,
    AppJson(body): AppJson<AppRequest>,
) -> Result<Response, DenError> {
    let app_id = validation::tv_app_id(&body.app).ok_or_else(|| {
        DenError::invalid_input(format!(
            "Unknown app '{}'. Valid apps: {}",
            body.app,
            validation::tv_app_names().join(", ")
        ))
    })?;
    check_rate(&state.limits.app_launch, &headers).await?;

    let result = state.tv.launch_app(app_id).await;
    if result.success {
        Ok(Json(TvAppResponse {
            success: true,
            app: body.app,
            app_id: app_id.to_string(),
        })
        .into_response())
    } else {
        Ok(command_failure(&result))
    }
}

pub async fn tv_status(State(state): State<SharedState>) -> Response {
    Json(state.tv.status().await).into_response()
}

pub async fn tv_wake(State(state): State<SharedState>) -> Result<Json<WakeResponse>, DenError> {
    state.tv.wake().await?;
    Ok(Json(WakeResponse {
        success: true,
        message: "Wake-on-LAN packet sent".to_string(),
        note: "The TV can take a few seconds to come up".to_string(),
    }))
}

// Chromecast endpoints

pub async fn cast_control(
    State(state): State<SharedState>,
    headers: HeaderMap,
    AppJson(body): AppJson<CastControlRequest>,
) -> Result<Response, DenError> {
    let action = CastAction::parse(&body.action).ok_or_else(|| {
        DenError::invalid_input(format!(
            "Unknown action '{}'. Valid actions: {}",
            body.action,
            CastAction::ALL.join(", ")
        ))
    })?;
    let value = validation::validate_cast_value(action, body.value)?;
    check_rate(&state.limits.cast_control, &headers).await?;

    let result = state.cast.control(action, value).await;
    if result.success {
        Ok(Json(CastControlResponse {
            success: true,
            action: action.as_str().to_string(),
            message: result.message,
        })
        .into_response())
    } else {
        Ok(command_failure(&result))
    }
}

pub async fn cast_media(
    State(state): State<SharedState>,
    headers: HeaderMap,
    AppJson(body): AppJson<CastMediaRequest>,
) -> Result<Response, DenError> {
    let url = validation::validate_cast_url(&body.url)?;
    let media_type = validation::validate_media_type(body.media_type.as_deref())?;
    check_rate(&state.limits.cast_control, &headers).await?;

    if let Some(title) = &body.title {
        debug!(title = %title, url = %url, "casting media");
    }
    let result = state.cast.cast_media(&url).await;
    if result.success {
        Ok(Json(CastMediaResponse {
            success: true,
            message: result.message,
            url: body.url,
            media_type: media_type.to_string(),
        })
        .into_response())
    } else {
        Ok(command_failure(&result))
    }
}

pub async fn cast_app(
    State(state): State<SharedState>,
    headers: HeaderMap,
    AppJson(body): AppJson<AppRequest>,
) -> Result<Response, DenError> {
    let app_id = validation::cast_app_id(&body.app).ok_or_else(|| {
        DenError::invalid_input(format!(
            "Unknown app '{}'. Valid apps: {}",
            body.app,
            validation::cast_app_names().join(", ")
        ))
    })?;
    check_rate(&state.limits.app_launch, &headers).await?;

    let result = state.cast.launch_app(app_id).await;
    if result.success {
        Ok(Json(CastAppResponse {
            success: true,
            app: body.app,
            message: result.message,
        })
        .into_response())
    } else {
        Ok(command_failure(&result))
    }
}

pub async fn cast_status(State(state): State<SharedState>) -> Json<CastStatusResponse> {
    let result = state.cast.scan().await;
    if result.success {
        Json(CastStatusResponse {
            success: true,
            devices: crate::devices::chromecast::parse_scan(&result.message),
            error: None,
        })
    } else {
        Json(CastStatusResponse {
            success: false,
            devices: Vec::new(),
            error: Some(result.error_message()),
        })
    }
}

// PS5 endpoints

pub async fn ps5_power(
    State(state): State<SharedState>,
    headers: HeaderMap,
    AppJson(body): AppJson<PowerRequest>,
) -> Result<Response, DenError> {
    let action = PowerAction::parse(&body.action).ok_or_else(|| {
        DenError::invalid_input(format!(
            "Unknown power action '{}'. Valid actions: wake, standby",
            body.action
        ))
    })?;
    check_rate(&state.limits.app_launch, &headers).await?;

    let result = state.ps5.power(action).await;
    if result.success {
        Ok(Json(PowerResponse {
            success: true,
            message: result.message,
        })
        .into_response())
    } else {
        Ok(command_failure(&result))
    }
}

pub async fn ps5_status(State(state): State<SharedState>) -> Json<Ps5StatusResponse> {
    let probe = state.ps5.probe().await;
    Json(Ps5StatusResponse {
        success: probe.success,
        online: probe.success,
        status: if probe.success {
            probe.message
        } else {
            "unreachable".to_string()
        },
        name: state.config.ps5.name.clone(),
        ip: state.config.ps5.host.clone(),
    })
}

pub async fn ps5_control(
    State(state): State<SharedState>,
    headers: HeaderMap,
    AppJson(body): AppJson<ButtonRequest>,
) -> Result<Response, DenError> {
    let button = validation::ps5_button(&body.button).ok_or_else(|| {
        DenError::invalid_input(format!(
            "Unknown button '{}'. Valid buttons: {}",
            body.button,
            validation::ps5_button_names().join(", ")
        ))
    })?;
    check_rate(&state.limits.key_press, &headers).await?;

    let result = state.ps5.press(button).await;
    if result.success {
        Ok(Json(ButtonResponse {
            success: true,
            button: button.to_string(),
            message: result.message,
        })
        .into_response())
    } else {
        Ok(command_failure(&result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::mock::RecordingInvoker;
    use crate::server::{router, AppState};
    use axum::body::Body;
    use axum::http::{header, Method, Request as HttpRequest};
    use axum::Router;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_config() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.tv.host = "192.168.1.20".to_string();
        config.tv.mac = Some("AA:BB:CC:DD:EE:FF".to_string());
        config.cast.host = "10.0.0.5".to_string();
        config.ps5.host = "192.168.1.22".to_string();
        config
    }

    fn test_app(invoker: Arc<RecordingInvoker>) -> Router {
        let state = Arc::new(AppState::new(test_config(), invoker).unwrap());
        router(state)
    }

    async fn send_json(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = HttpRequest::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn send_get(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = HttpRequest::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_unknown_action_rejected_before_invocation() {
        let invoker = Arc::new(RecordingInvoker::new());
        let app = test_app(invoker.clone());

        let (status, body) =
            send_json(&app, "/api/cast/control", r#"{"action":"explode"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("play"));
        assert_eq!(invoker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_volume_out_of_range_rejected_before_invocation() {
        let invoker = Arc::new(RecordingInvoker::new());
        let app = test_app(invoker.clone());

        let (status, body) = send_json(
            &app,
            "/api/cast/control",
            r#"{"action":"volume","value":150}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("0") && message.contains("100"));
        assert_eq!(invoker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_volume_without_value_rejected() {
        let invoker = Arc::new(RecordingInvoker::new());
        let app = test_app(invoker.clone());

        let (status, _body) =
            send_json(&app, "/api/cast/control", r#"{"action":"volume"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(invoker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_valid_volume_accepted() {
        let invoker = Arc::new(RecordingInvoker::new());
        let app = test_app(invoker.clone());

        let (status, body) = send_json(
            &app,
            "/api/cast/control",
            r#"{"action":"volume","value":50}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], Value::Bool(true));
        assert_eq!(body["action"], "volume");
        assert_eq!(invoker.call_count(), 1);
    }

    #[tokio::test]
    async fn test_tv_key_press_success() {
        let invoker = Arc::new(RecordingInvoker::new());
        let app = test_app(invoker.clone());

        let (status, body) = send_json(&app, "/api/tv/key", r#"{"key":"power"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], Value::Bool(true));
        assert_eq!(body["key"], "power");
        assert_eq!(invoker.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_tv_key_rejected() {
        let invoker = Arc::new(RecordingInvoker::new());
        let app = test_app(invoker.clone());

        let (status, body) = send_json(&app, "/api/tv/key", r#"{"key":"selfdestruct"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Valid keys"));
        assert_eq!(invoker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let invoker = Arc::new(RecordingInvoker::new());
        let app = test_app(invoker.clone());

        let (status, body) = send_json(&app, "/api/tv/key", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = send_json(&app, "/api/tv/key", "42").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send_json(&app, "/api/tv/key", r#"{"key":7}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(invoker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_device_failure_passes_message_through() {
        let invoker = Arc::new(RecordingInvoker::new());
        invoker.push_result(CommandResult::failure("Chromecast not found at 10.0.0.5"));
        let app = test_app(invoker.clone());

        let (status, body) = send_json(&app, "/api/cast/app", r#"{"app":"netflix"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], Value::Bool(false));
        assert_eq!(body["error"], "Chromecast not found at 10.0.0.5");
    }

    #[tokio::test]
    async fn test_sixth_request_in_window_rate_limited() {
        let invoker = Arc::new(RecordingInvoker::new());
        let app = test_app(invoker.clone());

        for _ in 0..5 {
            let (status, _) =
                send_json(&app, "/api/cast/control", r#"{"action":"mute"}"#).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, body) =
            send_json(&app, "/api/cast/control", r#"{"action":"mute"}"#).await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(body["error"].is_string());
        assert_eq!(invoker.call_count(), 5);
    }

    #[tokio::test]
    async fn test_rate_limit_keys_on_forwarded_address() {
        let invoker = Arc::new(RecordingInvoker::new());
        let app = test_app(invoker.clone());

        // Exhaust the window for one client
        for _ in 0..5 {
            send_json(&app, "/api/cast/control", r#"{"action":"mute"}"#).await;
        }

        // A different forwarded address still gets through
        let request = HttpRequest::builder()
            .method(Method::POST)
            .uri("/api/cast/control")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::from(r#"{"action":"mute"}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_repeated_mute_is_not_deduplicated() {
        let invoker = Arc::new(RecordingInvoker::new());
        let app = test_app(invoker.clone());

        let (first, _) = send_json(&app, "/api/cast/control", r#"{"action":"mute"}"#).await;
        let (second, _) = send_json(&app, "/api/cast/control", r#"{"action":"mute"}"#).await;

        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::OK);
        assert_eq!(invoker.call_count(), 2);
    }

    #[tokio::test]
    async fn test_cast_url_scheme_rejected() {
        let invoker = Arc::new(RecordingInvoker::new());
        let app = test_app(invoker.clone());

        let (status, body) = send_json(
            &app,
            "/api/cast/cast",
            r#"{"url":"ftp://example.com/a.mp4"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("http"));
        assert_eq!(invoker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cast_media_success_echoes_parameters() {
        let invoker = Arc::new(RecordingInvoker::new());
        let app = test_app(invoker.clone());

        let (status, body) = send_json(
            &app,
            "/api/cast/cast",
            r#"{"url":"https://example.com/a.mp4","type":"video","title":"A Movie"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["url"], "https://example.com/a.mp4");
        assert_eq!(body["type"], "video");
    }

    #[tokio::test]
    async fn test_ps5_power_action_validated() {
        let invoker = Arc::new(RecordingInvoker::new());
        let app = test_app(invoker.clone());

        let (status, body) = send_json(&app, "/api/ps5/power", r#"{"action":"reboot"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("wake"));
        assert_eq!(invoker.call_count(), 0);

        let (status, body) = send_json(&app, "/api/ps5/power", r#"{"action":"wake"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], Value::Bool(true));
    }

    #[tokio::test]
    async fn test_ps5_button_canonicalized() {
        let invoker = Arc::new(RecordingInvoker::new());
        let app = test_app(invoker.clone());

        let (status, body) = send_json(&app, "/api/ps5/control", r#"{"button":"Cross"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["button"], "cross");
    }

    #[tokio::test]
    async fn test_tv_status_degrades_instead_of_failing() {
        let invoker = Arc::new(RecordingInvoker::new());
        invoker.push_result(CommandResult::failure("connect refused"));
        let app = test_app(invoker.clone());

        let (status, body) = send_get(&app, "/api/tv/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["online"], Value::Bool(false));
        assert_eq!(body["ip"], "192.168.1.20");
    }

    #[tokio::test]
    async fn test_cast_status_reports_scan_results() {
        let invoker = Arc::new(RecordingInvoker::new());
        invoker.push_result(CommandResult::success(
            "10.0.0.5 - Living Room TV - Google Inc. Chromecast",
        ));
        let app = test_app(invoker.clone());

        let (status, body) = send_get(&app, "/api/cast/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], Value::Bool(true));
        assert_eq!(body["devices"][0]["name"], "Living Room TV");
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let invoker = Arc::new(RecordingInvoker::new());
        let app = test_app(invoker);

        let (status, body) = send_get(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_aggregate_status_covers_all_devices() {
        let invoker = Arc::new(RecordingInvoker::new());
        let app = test_app(invoker);

        let (status, body) = send_get(&app, "/api/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["devices"].as_array().unwrap().len(), 3);
    }
}
