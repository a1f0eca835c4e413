//! Scripted invoker for unit tests

use crate::config::ClientInfo;
use crate::error::{Error, Result};
use crate::invoker::{ApiResponse, Invoker, Operation};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One recorded dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub operation: Operation,
    pub intercepted: bool,
}

/// Invoker that replays canned responses in order and records every call
#[derive(Default)]
pub struct ScriptedInvoker {
    responses: Mutex<VecDeque<Result<ApiResponse>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: ApiResponse) -> Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.fail_with(Error::Other(message.to_string()))
    }

    pub fn fail_with(self, error: Error) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn operation_names(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.operation.name()).collect()
    }

    fn next(&self, operation: &Operation, intercepted: bool) -> Result<ApiResponse> {
        self.calls.lock().unwrap().push(Call {
            operation: operation.clone(),
            intercepted,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other(format!("no scripted response for '{operation}'"))))
    }
}

#[async_trait]
impl Invoker for ScriptedInvoker {
    async fn invoke(&self, operation: &Operation, _client: &ClientInfo) -> Result<ApiResponse> {
        self.next(operation, true)
    }

    async fn invoke_without_intercept(
        &self,
        operation: &Operation,
        _client: &ClientInfo,
    ) -> Result<ApiResponse> {
        self.next(operation, false)
    }
}

/// Wrap nodes into a successful UI API page response
pub fn page(table: &str, nodes: Vec<Value>, has_next: bool, end_cursor: &str) -> ApiResponse {
    let edges: Vec<Value> = nodes.into_iter().map(|node| json!({ "node": node })).collect();
    let mut query = serde_json::Map::new();
    query.insert(
        table.to_string(),
        json!({
            "edges": edges,
            "pageInfo": { "hasNextPage": has_next, "endCursor": end_cursor }
        }),
    );
    ApiResponse::new(200, json!({ "data": { "uiapi": { "query": query } } }))
}

/// A UI API node with the given id and timestamps
pub fn node(id: &str, last_modified: &str, created: &str) -> Value {
    json!({
        "Id": id,
        "Name": { "value": format!("Name {id}") },
        "LastModifiedDate": { "value": last_modified },
        "CreatedDate": { "value": created }
    })
}
