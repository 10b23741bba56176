//! Command invocation with a hard deadline
//!
//! One invocation is one dispatch to a device: a spawned helper process whose
//! streams are captured, or a single outbound HTTP or WebSocket exchange.
//! Every shape funnels through [`normalize`] into exactly one
//! [`CommandResult`], whether it completed, failed, or timed out.
//!
//! Parameters destined for a helper are passed as discrete positional
//! arguments. Nothing here builds shell text, so no combination of validated
//! action and value strings can alter the invoked command's structure.

pub mod normalize;

use crate::error::Result;
use async_trait::async_trait;
use futures_util::SinkExt;
use normalize::{normalize, RawSignal};
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};
use url::Url;

/// Message reported when an invocation misses its deadline
pub const TIMEOUT_MESSAGE: &str = "Operation timed out";

/// Uniform outcome of one device command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandResult {
    /// Successful completion with a message
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self {
            success: true,
            message: message.into(),
            error: None,
        }
    }

    /// Failed completion with an error message
    pub fn failure<S: Into<String>>(error: S) -> Self {
        Self {
            success: false,
            message: String::new(),
            error: Some(error.into()),
        }
    }

    /// Deadline expired before the operation completed
    pub fn timed_out() -> Self {
        Self::failure(TIMEOUT_MESSAGE)
    }

    /// The error message, or a generic fallback for malformed failures
    pub fn error_message(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "Command failed".to_string())
    }
}

/// One dispatch to an external device
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// Spawn a helper binary and capture its streams
    Process { program: String, args: Vec<String> },

    /// Single outbound GET
    HttpGet { url: Url },

    /// Single outbound POST with an optional JSON body
    HttpPost {
        url: Url,
        body: Option<serde_json::Value>,
    },

    /// Connect, deliver one message, close
    WsMessage {
        url: Url,
        payload: serde_json::Value,
    },
}

impl Invocation {
    /// Short description for log lines
    pub fn describe(&self) -> String {
        match self {
            Invocation::Process { program, args } => format!("{program} {}", args.join(" ")),
            Invocation::HttpGet { url } => format!("GET {url}"),
            Invocation::HttpPost { url, .. } => format!("POST {url}"),
            Invocation::WsMessage { url, .. } => format!("WS {url}"),
        }
    }
}

/// Seam between request handlers and the outside world.
///
/// Handlers and device controllers hold this as a trait object so tests can
/// substitute the recording fake from the `mock` module.
#[async_trait]
pub trait CommandInvoker: Send + Sync {
    /// Execute one invocation under a hard deadline.
    ///
    /// Resolves exactly once: with the normalized device outcome, or with the
    /// timeout result if the deadline fires first. On timeout the underlying
    /// process or connection is torn down best-effort.
    async fn invoke(&self, invocation: Invocation, deadline: Duration) -> CommandResult;
}

/// Production invoker backed by a shared HTTP client
pub struct Invoker {
    http: reqwest::Client,
}

impl Invoker {
    /// Create an invoker with a connect timeout shorter than any command deadline
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("den-remote/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(crate::error::DenError::Http)?;
        Ok(Self { http })
    }

    async fn run_process(&self, program: &str, args: &[String], deadline: Duration) -> CommandResult {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(program = program, error = %e, "failed to spawn helper");
                return CommandResult::failure(format!("Failed to run {program}: {e}"));
            }
        };

        // Dropping the in-flight future on the timeout branch kills the child
        // via kill_on_drop, so the deadline arm needs no explicit cleanup.
        match timeout(deadline, child.wait_with_output()).await {
            Ok(Ok(output)) => normalize(RawSignal::Process {
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
            Ok(Err(e)) => CommandResult::failure(format!("{program} did not complete: {e}")),
            Err(_) => {
                warn!(program = program, ?deadline, "helper timed out");
                CommandResult::timed_out()
            }
        }
    }

    async fn run_http(
        &self,
        url: Url,
        body: Option<serde_json::Value>,
        post: bool,
        deadline: Duration,
    ) -> CommandResult {
        let request = if post {
            let mut builder = self.http.post(url);
            if let Some(body) = body {
                builder = builder.json(&body);
            }
            builder
        } else {
            self.http.get(url)
        };

        let exchange = async {
            let response = request.send().await?;
            let success = response.status().is_success();
            let body = response.text().await.unwrap_or_default();
            Ok::<_, reqwest::Error>((success, body))
        };

        match timeout(deadline, exchange).await {
            Ok(Ok((success, body))) => normalize(RawSignal::Network { success, body }),
            Ok(Err(e)) if e.is_timeout() => CommandResult::timed_out(),
            Ok(Err(e)) => CommandResult::failure(format!("Request failed: {e}")),
            Err(_) => CommandResult::timed_out(),
        }
    }

    async fn run_ws(
        &self,
        url: Url,
        payload: serde_json::Value,
        deadline: Duration,
    ) -> CommandResult {
        let exchange = async {
            let (mut stream, _response) = connect_async(url.as_str()).await?;
            stream.send(Message::Text(payload.to_string())).await?;
            // Best-effort close; the message is already flushed.
            let _ = stream.close(None).await;
            Ok::<_, tokio_tungstenite::tungstenite::Error>(())
        };

        // The connection is dropped with the future on the deadline arm.
        match timeout(deadline, exchange).await {
            Ok(Ok(())) => normalize(RawSignal::Network {
                success: true,
                body: String::new(),
            }),
            Ok(Err(e)) => CommandResult::failure(format!("WebSocket send failed: {e}")),
            Err(_) => CommandResult::timed_out(),
        }
    }
}

#[async_trait]
impl CommandInvoker for Invoker {
    async fn invoke(&self, invocation: Invocation, deadline: Duration) -> CommandResult {
        debug!(invocation = %invocation.describe(), ?deadline, "dispatching");
        let result = match invocation {
            Invocation::Process { program, args } => {
                self.run_process(&program, &args, deadline).await
            }
            Invocation::HttpGet { url } => self.run_http(url, None, false, deadline).await,
            Invocation::HttpPost { url, body } => self.run_http(url, body, true, deadline).await,
            Invocation::WsMessage { url, payload } => self.run_ws(url, payload, deadline).await,
        };
        if !result.success {
            debug!(error = ?result.error, "dispatch failed");
        }
        result
    }
}
