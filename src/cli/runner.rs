//! CLI runner - executes commands

use crate::auth::{CommandInfo, OAUTH_COMMAND};
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{ConnectionConfig, ConnectorSettings};
use crate::connector::{Connector, SalesforceConnector};
use crate::error::{Error, Result, ResultExt};
use crate::invoker::ApiResponse;
use crate::read::{JsonLinesSink, ReadSession};
use crate::state::StateManager;
use chrono::Utc;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let settings = self.load_settings()?;
        let connector = SalesforceConnector::from_settings(&settings)?;

        match &self.cli.command {
            Commands::Discover => self.discover(&connector).await,
            Commands::Check => self.check(&connector).await,
            Commands::Read { table, page_size } => {
                let page_size = page_size.unwrap_or(settings.page_size);
                self.read(&connector, &settings, table, page_size).await
            }
            Commands::Stream {
                tables,
                page_size,
                follow,
            } => {
                let page_size = page_size.unwrap_or(settings.page_size);
                let interval = Duration::from_secs(settings.stream_read_interval_secs);
                self.stream(&connector, &settings, tables, page_size, *follow, interval)
                    .await
            }
            Commands::Oauth { code, redirect_uri } => {
                self.oauth(&connector, &settings, code, redirect_uri).await
            }
            Commands::Refresh => self.refresh(&connector, &settings).await,
        }
    }

    /// Load settings: inline JSON, then file, then defaults; env always applies
    fn load_settings(&self) -> Result<ConnectorSettings> {
        let settings = if let Some(json_str) = &self.cli.config_json {
            serde_json::from_str::<ConnectorSettings>(json_str)
                .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?
        } else if let Some(path) = &self.cli.config {
            ConnectorSettings::from_file(path)?
        } else {
            ConnectorSettings::default()
        };

        let settings = settings.with_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    /// Load state
    fn load_state(&self) -> Result<StateManager> {
        // Inline state takes precedence
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }

    /// Write token changes back to the settings file
    ///
    /// The file is re-read so environment overrides are not persisted.
    fn persist_connection(&self, before: &ConnectionConfig, after: ConnectionConfig) -> Result<()> {
        if *before == after {
            return Ok(());
        }
        let Some(path) = &self.cli.config else {
            debug!("No settings file to update");
            return Ok(());
        };

        let mut on_disk = ConnectorSettings::from_file(path)?;
        on_disk.connection = after;
        on_disk
            .save(path)
            .with_context(|| format!("Failed to update {}", path.display()))?;
        info!("Updated tokens in {}", path.display());
        Ok(())
    }

    /// List tables
    async fn discover(&self, connector: &SalesforceConnector) -> Result<()> {
        let tables = connector.discover_schema().await;
        self.output_message(&json!({
            "type": "CATALOG",
            "catalog": { "tables": tables }
        }));
        Ok(())
    }

    /// Probe read access
    async fn check(&self, connector: &SalesforceConnector) -> Result<()> {
        let items = connector.connection_test().await;
        let status = if items.iter().any(|i| i.test == "Read" && i.passed()) {
            "SUCCEEDED"
        } else {
            "FAILED"
        };

        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": { "status": status, "items": items }
        }));
        Ok(())
    }

    /// Full extraction of one table
    async fn read(
        &self,
        connector: &SalesforceConnector,
        settings: &ConnectorSettings,
        table: &str,
        page_size: u32,
    ) -> Result<()> {
        let state = self.load_state()?;
        let mut session = ReadSession::from_state(&state.snapshot().await);
        let sink = JsonLinesSink::new(std::io::stdout());
        let started = Instant::now();

        let outcome = connector
            .batch_read(&mut session, table, page_size, &sink)
            .await;
        self.persist_connection(&settings.connection, connector.connection().await)?;
        outcome?;

        state
            .record_batch_read(table, sink.count(), Utc::now())
            .await?;
        info!(
            "Read {} rows from {} in {:.1}s",
            sink.count(),
            table,
            started.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Change polling
    async fn stream(
        &self,
        connector: &SalesforceConnector,
        settings: &ConnectorSettings,
        tables: &[String],
        page_size: u32,
        follow: bool,
        interval: Duration,
    ) -> Result<()> {
        let state = self.load_state()?;
        let cancel = CancellationToken::new();
        let mut session =
            ReadSession::from_state(&state.snapshot().await).with_cancellation(cancel.clone());
        let sink = JsonLinesSink::new(std::io::stdout());

        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, finishing current poll");
                interrupt.cancel();
            }
        });

        let mut saved = settings.connection.clone();
        loop {
            let outcome = connector
                .stream_read(&mut session, tables, page_size, &sink)
                .await;
            let current = connector.connection().await;
            self.persist_connection(&saved, current.clone())?;
            saved = current;
            tolerate_transient(follow, outcome, interval)?;

            state.set_high_water_mark(session.high_water_mark()).await?;
            debug!("High-water mark now {}", session.high_water_mark());

            if !follow || cancel.is_cancelled() {
                break;
            }
            tokio::select! {
                () = tokio::time::sleep(interval) => {}
                () = cancel.cancelled() => break,
            }
        }

        info!("Reported {} change events", sink.count());
        Ok(())
    }

    /// Authorization-code exchange
    async fn oauth(
        &self,
        connector: &SalesforceConnector,
        settings: &ConnectorSettings,
        code: &str,
        redirect_uri: &str,
    ) -> Result<()> {
        let command = CommandInfo::new(OAUTH_COMMAND)
            .with_arg("code", code)
            .with_arg("redirect_uri", redirect_uri);

        let updated = connector.command_callback(&command).await?;
        let Some(connection) = updated else {
            warn!("OAuth command produced no connection update");
            return Ok(());
        };
        self.persist_connection(&settings.connection, connection.clone())?;

        self.output_message(&json!({
            "type": "CONNECTION",
            "connection": { "_endpoint": connection.endpoint, "authorized": true }
        }));
        Ok(())
    }

    /// Forced token refresh
    async fn refresh(
        &self,
        connector: &SalesforceConnector,
        settings: &ConnectorSettings,
    ) -> Result<()> {
        let expired = ApiResponse::new(401, json!([]));
        let refreshed = connector.update_token(&expired).await?;
        self.persist_connection(&settings.connection, connector.connection().await)?;

        self.output_message(&json!({
            "type": "TOKEN",
            "refreshed": refreshed.is_some()
        }));
        Ok(())
    }

    /// Output a message to stdout
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// In follow mode a transient poll failure waits for the next poll
fn tolerate_transient(follow: bool, outcome: Result<()>, interval: Duration) -> Result<()> {
    match outcome {
        Err(e) if follow && e.is_retryable() => {
            warn!("Poll failed, retrying in {}s: {e}", interval.as_secs());
            Ok(())
        }
        other => other,
    }
}
