//! Connector trait and the Salesforce implementation
//!
//! The host-facing surface: schema discovery, batch and incremental reads,
//! token handling and the connection test. [`SalesforceConnector`] owns the
//! client credentials and the shared connection config and routes every
//! network call through an [`Invoker`].

use crate::auth::{self, CommandInfo, TokenRefresh};
use crate::config::{ClientInfo, ConnectionConfig, ConnectorSettings, MAX_PAGE_SIZE};
use crate::diagnostics::{self, TestItem};
use crate::error::{Error, Result};
use crate::http::HttpInvoker;
use crate::invoker::{ApiResponse, Invoker};
use crate::read::{self, BatchSink, ReadSession, StreamSink};
use crate::schema::{self, TableSchema};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument};

// ============================================================================
// Connector Trait
// ============================================================================

/// Entry points a host drives
#[async_trait]
pub trait Connector: Send + Sync {
    /// Tables this connector can read, with their fields
    async fn discover_schema(&self) -> Vec<TableSchema>;

    /// Read every row of a table, one sink delivery per page
    async fn batch_read(
        &self,
        session: &mut ReadSession,
        table: &str,
        page_size: u32,
        sink: &dyn BatchSink,
    ) -> Result<()>;

    /// Report rows changed since the session's high-water mark
    async fn stream_read(
        &self,
        session: &mut ReadSession,
        tables: &[String],
        page_size: u32,
        sink: &dyn StreamSink,
    ) -> Result<()>;

    /// Handle a host command such as the OAuth code exchange
    async fn command_callback(&self, command: &CommandInfo) -> Result<Option<ConnectionConfig>>;

    /// React to a failed API response
    async fn update_token(&self, response: &ApiResponse) -> Result<Option<TokenRefresh>>;

    /// Probe read access to each entity
    async fn connection_test(&self) -> Vec<TestItem>;
}

// ============================================================================
// Salesforce Connector
// ============================================================================

/// Salesforce UI API connector
pub struct SalesforceConnector {
    client: ClientInfo,
    connection: Arc<RwLock<ConnectionConfig>>,
    invoker: Arc<dyn Invoker>,
}

impl SalesforceConnector {
    /// Create a connector over an existing invoker
    pub fn new(
        client: ClientInfo,
        connection: Arc<RwLock<ConnectionConfig>>,
        invoker: Arc<dyn Invoker>,
    ) -> Self {
        Self {
            client,
            connection,
            invoker,
        }
    }

    /// Create a connector talking to Salesforce over HTTPS
    pub fn from_settings(settings: &ConnectorSettings) -> Result<Self> {
        settings.validate()?;
        settings.client.validate()?;

        let connection = Arc::new(RwLock::new(settings.connection.clone()));
        let invoker = HttpInvoker::new(Arc::clone(&connection), &settings.http)?;

        Ok(Self::new(
            settings.client.clone(),
            connection,
            Arc::new(invoker),
        ))
    }

    /// Client credentials
    pub fn client(&self) -> &ClientInfo {
        &self.client
    }

    /// Snapshot of the current connection config
    pub async fn connection(&self) -> ConnectionConfig {
        self.connection.read().await.clone()
    }
}

fn check_table(table: &str) -> Result<()> {
    if !schema::is_known_table(table) {
        return Err(Error::invalid_value(
            "table",
            format!("'{table}' is not one of {}", schema::TABLES.join(", ")),
        ));
    }
    Ok(())
}

fn check_page_size(page_size: u32) -> Result<()> {
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(Error::invalid_value(
            "page_size",
            format!("must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"),
        ));
    }
    Ok(())
}

#[async_trait]
impl Connector for SalesforceConnector {
    async fn discover_schema(&self) -> Vec<TableSchema> {
        let connection = self.connection.read().await;
        schema::discover_schema(&connection)
    }

    #[instrument(skip(self, session, sink))]
    async fn batch_read(
        &self,
        session: &mut ReadSession,
        table: &str,
        page_size: u32,
        sink: &dyn BatchSink,
    ) -> Result<()> {
        check_table(table)?;
        check_page_size(page_size)?;
        read::batch_read(session, self.invoker.as_ref(), &self.client, table, page_size, sink)
            .await
    }

    #[instrument(skip(self, session, sink))]
    async fn stream_read(
        &self,
        session: &mut ReadSession,
        tables: &[String],
        page_size: u32,
        sink: &dyn StreamSink,
    ) -> Result<()> {
        tables.iter().try_for_each(|t| check_table(t))?;
        check_page_size(page_size)?;
        read::stream_read(session, self.invoker.as_ref(), &self.client, tables, page_size, sink)
            .await
    }

    #[instrument(skip(self, command), fields(command = %command.command))]
    async fn command_callback(&self, command: &CommandInfo) -> Result<Option<ConnectionConfig>> {
        // Work on a snapshot so no lock is held across the token call. The
        // exchange issues a whole new token set, so the last writer wins.
        let mut connection = self.connection().await;
        let updated =
            auth::command_callback(&mut connection, &self.client, self.invoker.as_ref(), command)
                .await?;

        if updated.is_some() {
            *self.connection.write().await = connection;
            info!("Connection updated from command");
        }
        Ok(updated)
    }

    #[instrument(skip(self, response), fields(http_code = response.http_code))]
    async fn update_token(&self, response: &ApiResponse) -> Result<Option<TokenRefresh>> {
        // A refresh only replaces the access token, so a concurrent OAuth
        // exchange is not overwritten with the stale snapshot
        let mut connection = self.connection().await;
        let refreshed =
            auth::update_token(&mut connection, &self.client, self.invoker.as_ref(), response)
                .await?;

        if let Some(refresh) = &refreshed {
            self.connection.write().await.authorization = Some(refresh.access_token.clone());
        }
        Ok(refreshed)
    }

    #[instrument(skip(self))]
    async fn connection_test(&self) -> Vec<TestItem> {
        diagnostics::connection_test(&self.client, self.invoker.as_ref()).await
    }
}

impl std::fmt::Debug for SalesforceConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesforceConnector")
            .field("client_id", &self.client.client_id)
            .field("auth_url", &self.client.auth_url)
            .finish_non_exhaustive()
    }
}
