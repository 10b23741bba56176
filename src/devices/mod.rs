//! Device controllers for the living room
//!
//! Each controller is a thin capability layer over one vendor contract: it
//! turns a validated operation into an [`Invocation`](crate::invoker::Invocation)
//! and hands it to the shared invoker. Controllers never build shell text and
//! never retry; a command either completes within its deadline or is reported
//! as a single failure.

pub mod chromecast;
pub mod ps5;
pub mod samsung;

pub use chromecast::Chromecast;
pub use ps5::Ps5;
pub use samsung::SamsungTv;

use async_trait::async_trait;
use serde::Serialize;

/// Point-in-time view of one device, degraded rather than failing
#[derive(Debug, Clone, Serialize)]
pub struct DeviceStatus {
    pub name: String,
    pub ip: String,
    pub online: bool,
    pub status: String,
    pub checked_at: String,
}

impl DeviceStatus {
    /// Build a status snapshot stamped with the probe time
    pub fn new(name: &str, ip: &str, online: bool, status: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            ip: ip.to_string(),
            online,
            status: status.into(),
            checked_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Common read-only surface shared by every controller.
///
/// Command surfaces stay on the concrete types since each device speaks a
/// different vocabulary; status aggregation is the one cross-device view.
#[async_trait]
pub trait DeviceController: Send + Sync {
    /// Display name for status responses
    fn name(&self) -> &str;

    /// Probe the device. Never errors; unreachable devices report offline.
    async fn status(&self) -> DeviceStatus;
}
