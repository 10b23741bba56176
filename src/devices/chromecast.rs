//! Chromecast controller
//!
//! Commands go through a helper binary (`catt` by default) since the cast
//! protocol needs a session per command anyway and the helper already speaks
//! it. The helper contract is positional: `<helper> -d <host> <subcommand>
//! [arg]`. Failures come back either as a nonzero exit or as an `ERROR:`
//! sentinel line on stdout; both are absorbed by the normalizer.

use crate::config::CastConfig;
use crate::devices::{DeviceController, DeviceStatus};
use crate::invoker::{CommandInvoker, CommandResult, Invocation};
use crate::validation::CastAction;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

/// One cast device reported by a network scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CastDevice {
    pub ip: String,
    pub name: String,
    pub model: String,
}

/// Controller for one Chromecast
pub struct Chromecast {
    config: CastConfig,
    invoker: Arc<dyn CommandInvoker>,
}

impl Chromecast {
    /// Create a controller for the configured Chromecast
    pub fn new(config: CastConfig, invoker: Arc<dyn CommandInvoker>) -> Self {
        Self { config, invoker }
    }

    async fn run(&self, tail: Vec<String>) -> CommandResult {
        let mut args = vec!["-d".to_string(), self.config.host.clone()];
        args.extend(tail);
        self.invoker
            .invoke(
                Invocation::Process {
                    program: self.config.helper.clone(),
                    args,
                },
                self.config.command_timeout,
            )
            .await
    }

    /// Dispatch one playback-control action.
    ///
    /// `value` is already range-checked by the registry; it is formatted as a
    /// discrete argument, never spliced into command text.
    pub async fn control(&self, action: CastAction, value: Option<f64>) -> CommandResult {
        let tail = match action {
            CastAction::Play => vec!["play".to_string()],
            CastAction::Pause => vec!["pause".to_string()],
            CastAction::Stop => vec!["stop".to_string()],
            CastAction::Mute => vec!["mute".to_string()],
            CastAction::Unmute => vec!["unmute".to_string()],
            CastAction::VolUp => vec!["volumeup".to_string()],
            CastAction::VolDown => vec!["volumedown".to_string()],
            CastAction::Rewind => vec!["rewind".to_string()],
            CastAction::Forward => vec!["ffwd".to_string()],
            CastAction::Volume => vec![
                "volume".to_string(),
                format_value(value.unwrap_or_default()),
            ],
            CastAction::Seek => vec![
                "seek".to_string(),
                format_value(value.unwrap_or_default()),
            ],
        };
        self.run(tail).await
    }

    /// Cast a media URL to the device
    pub async fn cast_media(&self, url: &Url) -> CommandResult {
        self.run(vec!["cast".to_string(), url.as_str().to_string()])
            .await
    }

    /// Launch a receiver application by its registry ID
    pub async fn launch_app(&self, app_id: &str) -> CommandResult {
        self.run(vec!["start_app".to_string(), app_id.to_string()])
            .await
    }

    /// Scan the network for cast devices
    pub async fn scan(&self) -> CommandResult {
        self.run(vec!["scan".to_string()]).await
    }

    /// Probe the configured device
    pub async fn probe(&self) -> CommandResult {
        self.run(vec!["status".to_string()]).await
    }
}

#[async_trait]
impl DeviceController for Chromecast {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn status(&self) -> DeviceStatus {
        let probe = self.probe().await;
        let status = if probe.success {
            probe.message.clone()
        } else {
            probe.error_message()
        };
        DeviceStatus::new(&self.config.name, &self.config.host, probe.success, status)
    }
}

/// Parse scan output lines of the form `<ip> - <name> - <model>`
pub fn parse_scan(output: &str) -> Vec<CastDevice> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(3, " - ");
            let ip = parts.next()?.trim();
            let name = parts.next()?.trim();
            let model = parts.next()?.trim();
            if ip.is_empty() || ip.chars().any(|c| !c.is_ascii_digit() && c != '.') {
                return None;
            }
            Some(CastDevice {
                ip: ip.to_string(),
                name: name.to_string(),
                model: model.to_string(),
            })
        })
        .collect()
}

/// Format a registry-bounded value as a helper argument, trimming `.0`
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
