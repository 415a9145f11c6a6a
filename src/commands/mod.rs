//! Command handlers for the `projectdesk` binary.

mod config;
mod create;
pub mod interactive;
mod ls;
mod resources;
mod rm;
mod set;
mod show;

pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use create::{cmd_create, cmd_update};
pub use ls::{LsOptions, cmd_ls};
pub use resources::cmd_resources;
pub use rm::cmd_rm;
pub use set::cmd_set;
pub use show::cmd_show;

use std::path::PathBuf;

use serde_json::Value;

use crate::config::Config;
use crate::controller::{ListController, LoadState};
use crate::display::{notification_line, to_json_string};
use crate::error::{DeskError, Result};
use crate::gateway::{AnyGateway, Fixture, HttpGateway};
use crate::notify::Notification;
use crate::record::RecordId;
use crate::render::RendererRegistry;
use crate::resources::{self as catalog, ResourceSpec};

/// JSON and text renditions of a command's result
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Print JSON when asked for (or when there is no text form)
    pub fn print(self, json: bool) -> Result<()> {
        match self.text {
            Some(text) if !json => println!("{text}"),
            _ => println!("{}", to_json_string(&self.json)?),
        }
        Ok(())
    }
}

/// Shared state for one command invocation
#[derive(Debug)]
pub struct CommandContext {
    pub config: Config,
    /// Serve resources from this JSON file instead of the backend
    pub fixture: Option<PathBuf>,
    pub colored: bool,
}

impl CommandContext {
    pub fn new(config: Config, fixture: Option<PathBuf>) -> Self {
        let colored = atty::is(atty::Stream::Stdout) && std::env::var_os("NO_COLOR").is_none();
        Self {
            config,
            fixture,
            colored,
        }
    }

    pub fn load(fixture: Option<PathBuf>) -> Result<Self> {
        Ok(Self::new(Config::load()?, fixture))
    }

    pub fn registry(&self) -> RendererRegistry {
        RendererRegistry::new(self.config.render_options())
    }

    pub fn gateway(&self, spec: ResourceSpec) -> Result<AnyGateway> {
        match &self.fixture {
            Some(path) => {
                tracing::debug!(path = %path.display(), resource = %spec.name, "using fixture");
                Ok(AnyGateway::Memory(Fixture::load(path)?.gateway(spec)?))
            }
            None => Ok(AnyGateway::Http(HttpGateway::from_config(&self.config, spec)?)),
        }
    }

    /// Controller for a resource with configured rendering and page size
    pub fn controller(&self, resource: &str) -> Result<ListController<AnyGateway>> {
        let spec = catalog::find(resource)?;
        let gateway = self.gateway(spec)?;
        ListController::new(gateway)
            .with_registry(self.registry())
            .with_page_size(self.config.page_size())
    }

    /// Controller with the collection loaded; a failed load is an error
    pub async fn loaded_controller(&self, resource: &str) -> Result<ListController<AnyGateway>> {
        let mut controller = self.controller(resource)?;
        controller.load().await;
        if let LoadState::Error(message) = controller.state() {
            return Err(DeskError::Other(format!("Failed to load {resource}: {message}")));
        }
        Ok(controller)
    }

    /// Write fixture-backed mutations back to the fixture file
    pub fn persist(&self, gateway: &AnyGateway) -> Result<()> {
        if let (Some(path), AnyGateway::Memory(memory)) = (&self.fixture, gateway) {
            let mut fixture = Fixture::load(path)?;
            fixture.store(memory);
            fixture.save(path)?;
        }
        Ok(())
    }

    /// Print non-error notifications to stderr; the last error becomes the
    /// command's error
    pub fn report(&self, notifications: Vec<Notification>) -> Result<()> {
        let mut failure = None;
        for notification in notifications {
            if notification.is_error() {
                failure = Some(notification.message);
            } else {
                eprintln!("{}", notification_line(&notification, self.colored));
            }
        }
        match failure {
            Some(message) => Err(DeskError::Other(message)),
            None => Ok(()),
        }
    }
}

/// Parse a user-supplied id against a resource's identity
pub fn parse_record_id(spec: &ResourceSpec, input: &str) -> Result<RecordId> {
    spec.identity.parse_id(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormModal;
    use crate::gateway::{MemoryGateway, Operation};
    use serde_json::json;

    #[tokio::test]
    async fn test_failed_refresh_after_create_is_not_a_command_failure() {
        let spec = catalog::find("users").unwrap();
        let mut controller = ListController::new(MemoryGateway::new(spec, Vec::new()));
        controller.load().await;
        controller.gateway().fail(Operation::List);

        let draft = crate::record::Record::from_value(json!({"name": "Rina"})).unwrap();
        let mut form = FormModal::create_with(draft);
        assert!(controller.save_form(&mut form).await.is_some());
        assert_eq!(controller.gateway().records().len(), 1);

        let ctx = CommandContext::new(Config::default(), None);
        assert!(ctx.report(controller.notifications_mut().drain()).is_ok());
    }

    #[test]
    fn test_report_fails_on_error_notification() {
        let ctx = CommandContext::new(Config::default(), None);
        let notifications = vec![
            Notification::success("Saved User"),
            Notification::error("Failed to save User: HTTP 500"),
        ];
        assert!(matches!(
            ctx.report(notifications),
            Err(DeskError::Other(message)) if message == "Failed to save User: HTTP 500"
        ));
    }
}
