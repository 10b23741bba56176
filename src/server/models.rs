//! Request and response schemas for the HTTP surface
//!
//! One explicit schema per endpoint; handlers narrow nothing by hand. Field
//! names mirror what the browser UI sends, so a couple of wire names
//! (`appId`, `type`) differ from their Rust spellings.

use crate::devices::chromecast::CastDevice;
use crate::devices::DeviceStatus;
use serde::{Deserialize, Serialize};

// Requests

#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct AppRequest {
    pub app: String,
}

#[derive(Debug, Deserialize)]
pub struct CastControlRequest {
    pub action: String,
    pub value: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CastMediaRequest {
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PowerRequest {
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct ButtonRequest {
    pub button: String,
}

// Responses

#[derive(Debug, Serialize)]
pub struct KeyResponse {
    pub success: bool,
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct TvAppResponse {
    pub success: bool,
    pub app: String,
    #[serde(rename = "appId")]
    pub app_id: String,
}

#[derive(Debug, Serialize)]
pub struct WakeResponse {
    pub success: bool,
    pub message: String,
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct CastControlResponse {
    pub success: bool,
    pub action: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CastMediaResponse {
    pub success: bool,
    pub message: String,
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: String,
}

#[derive(Debug, Serialize)]
pub struct CastAppResponse {
    pub success: bool,
    pub app: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CastStatusResponse {
    pub success: bool,
    pub devices: Vec<CastDevice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PowerResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct Ps5StatusResponse {
    pub success: bool,
    pub online: bool,
    pub status: String,
    pub name: String,
    pub ip: String,
}

#[derive(Debug, Serialize)]
pub struct ButtonResponse {
    pub success: bool,
    pub button: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AggregateStatusResponse {
    pub devices: Vec<DeviceStatus>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Body of a 500 produced by a failed device invocation
#[derive(Debug, Serialize)]
pub struct CommandFailure {
    pub success: bool,
    pub error: String,
}
