//! PS5 controller
//!
//! Power transitions and button presses go through a helper binary
//! (`playactor` by default) that owns the remote-play session negotiation.
//! The helper contract is positional: `<helper> <subcommand> [button]
//! --host-address <host>`. Wake can take a while on a cold console, so this
//! device class carries the longest command deadline.

use crate::config::Ps5Config;
use crate::devices::{DeviceController, DeviceStatus};
use crate::invoker::{CommandInvoker, CommandResult, Invocation};
use crate::validation::PowerAction;
use async_trait::async_trait;
use std::sync::Arc;

/// Controller for one PS5
pub struct Ps5 {
    config: Ps5Config,
    invoker: Arc<dyn CommandInvoker>,
}

impl Ps5 {
    /// Create a controller for the configured console
    pub fn new(config: Ps5Config, invoker: Arc<dyn CommandInvoker>) -> Self {
        Self { config, invoker }
    }

    async fn run(&self, mut args: Vec<String>) -> CommandResult {
        args.push("--host-address".to_string());
        args.push(self.config.host.clone());
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

    /// Wake the console or put it into standby
    pub async fn power(&self, action: PowerAction) -> CommandResult {
        self.run(vec![action.as_str().to_string()]).await
    }

    /// Press one controller button in the active remote-play session.
    ///
    /// `button` is a registry token, never raw client input.
    pub async fn press(&self, button: &str) -> CommandResult {
        self.run(vec!["press".to_string(), button.to_string()]).await
    }

    /// Probe the console's power state
    pub async fn probe(&self) -> CommandResult {
        self.run(vec!["check".to_string()]).await
    }
}

#[async_trait]
impl DeviceController for Ps5 {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn status(&self) -> DeviceStatus {
        let probe = self.probe().await;
        let status = if probe.success {
            probe.message.clone()
        } else {
            "unreachable".to_string()
        };
        DeviceStatus::new(&self.config.name, &self.config.host, probe.success, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::RecordingInvoker;
    use pretty_assertions::assert_eq;

    fn controller() -> (Ps5, Arc<RecordingInvoker>) {
        let invoker = Arc::new(RecordingInvoker::new());
        let config = Ps5Config {
            host: "192.168.1.22".to_string(),
            ..Ps5Config::default()
        };
        (Ps5::new(config, invoker.clone()), invoker)
    }

    fn expect_args(invocation: &Invocation, expected: &[&str]) {
        match invocation {
            Invocation::Process { program, args } => {
                assert_eq!(program, "playactor");
                let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
                assert_eq!(args, &expected);
            }
            other => panic!("expected Process, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wake_invocation() {
        let (ps5, invoker) = controller();
        ps5.power(PowerAction::Wake).await;
        expect_args(
            &invoker.calls()[0],
            &["wake", "--host-address", "192.168.1.22"],
        );
    }

    #[tokio::test]
    async fn test_standby_invocation() {
        let (ps5, invoker) = controller();
        ps5.power(PowerAction::Standby).await;
        expect_args(
            &invoker.calls()[0],
            &["standby", "--host-address", "192.168.1.22"],
        );
    }

    #[tokio::test]
    async fn test_button_press_invocation() {
        let (ps5, invoker) = controller();
        ps5.press("cross").await;
        expect_args(
            &invoker.calls()[0],
            &["press", "cross", "--host-address", "192.168.1.22"],
        );
    }

    #[tokio::test]
    async fn test_status_reports_unreachable_console() {
        let (ps5, invoker) = controller();
        invoker.push_result(CommandResult::failure("no device found"));

        let status = ps5.status().await;
        assert!(!status.online);
        assert_eq!(status.status, "unreachable");
        assert_eq!(status.ip, "192.168.1.22");
    }
}
