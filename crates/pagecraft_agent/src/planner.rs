//! Planner client.
//!
//! Sends the prompt and context snapshot to the planner service and extracts
//! the assistant message and raw action list from its reply. The action list
//! is validated separately.

use std::time::Duration;

use async_trait::async_trait;
use pagecraft_plan::PlanError;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::context::ProjectContext;
use crate::error::{AgentError, AgentResult};

/// Field names planners have used for the assistant message.
const MESSAGE_FIELDS: [&str; 4] = ["assistantMessage", "assistant_message", "message", "reply"];

/// Longest error body echoed back from a failed planner call.
const MAX_DETAIL_CHARS: usize = 500;

/// Request body sent to the planner.
#[derive(Debug, Clone, Serialize)]
pub struct PlanRequest<'a> {
    pub prompt: &'a str,
    pub context: &'a ProjectContext,
}

/// Planner reply before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerReply {
    pub assistant_message: Option<String>,
    /// Undecoded action list, checked by the plan validator
    pub actions: Value,
}

impl PlannerReply {
    /// Extract message and action list, accepting the known field-name variants.
    ///
    /// The action list may be top-level `actions`, a top-level `plan` list, or
    /// `plan.actions`. The message may sit at the top level or inside `plan`.
    pub fn from_json(body: &Value) -> Result<Self, PlanError> {
        let fields = body
            .as_object()
            .ok_or_else(|| PlanError::schema("planner response must be a JSON object"))?;

        let nested = fields.get("plan").and_then(Value::as_object);

        let actions = match (fields.get("actions"), fields.get("plan")) {
            (Some(actions), _) => actions.clone(),
            (None, Some(Value::Array(list))) => Value::Array(list.clone()),
            (None, Some(Value::Object(plan))) => plan.get("actions").cloned().ok_or_else(|| {
                PlanError::schema("planner response `plan` object has no `actions` list")
            })?,
            (None, Some(_)) => {
                return Err(PlanError::schema(
                    "planner response `plan` must be a list or an object",
                ))
            }
            (None, None) => {
                return Err(PlanError::schema(
                    "planner response has no action list (expected `actions` or `plan`)",
                ))
            }
        };

        let assistant_message = find_message(fields).or_else(|| nested.and_then(find_message));

        Ok(Self {
            assistant_message,
            actions,
        })
    }
}

fn find_message(fields: &Map<String, Value>) -> Option<String> {
    MESSAGE_FIELDS
        .iter()
        .find_map(|name| fields.get(*name).and_then(Value::as_str))
        .map(str::to_string)
}

/// Source of plans.
#[async_trait]
pub trait PlanSource: Send + Sync {
    /// Ask the planner at `endpoint` for a plan.
    async fn fetch_plan(
        &self,
        endpoint: &str,
        request: &PlanRequest<'_>,
    ) -> AgentResult<PlannerReply>;
}

/// Planner reached over HTTP.
pub struct HttpPlanner {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpPlanner {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    async fn post(&self, endpoint: &str, request: &PlanRequest<'_>) -> AgentResult<(u16, String)> {
        let response = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        Ok((status, body))
    }

    fn transport_error(&self, endpoint: &str, error: reqwest::Error) -> AgentError {
        if error.is_timeout() {
            AgentError::Timeout {
                after: self.timeout,
            }
        } else {
            AgentError::PlannerUnreachable {
                endpoint: endpoint.to_string(),
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl PlanSource for HttpPlanner {
    async fn fetch_plan(
        &self,
        endpoint: &str,
        request: &PlanRequest<'_>,
    ) -> AgentResult<PlannerReply> {
        info!("Requesting plan from {}", endpoint);

        let (status, body) = tokio::time::timeout(self.timeout, self.post(endpoint, request))
            .await
            .map_err(|_| {
                warn!("Planner at {} timed out after {:?}", endpoint, self.timeout);
                AgentError::Timeout {
                    after: self.timeout,
                }
            })??;

        if !(200..300).contains(&status) {
            warn!("Planner answered HTTP {}", status);
            return Err(AgentError::PlannerHttp {
                status,
                detail: error_detail(&body),
            });
        }

        let decoded: Value = serde_json::from_str(&body).map_err(|e| {
            PlanError::schema(format!("planner response is not valid JSON: {}", e))
        })?;
        debug!("Planner replied with {} bytes", body.len());

        Ok(PlannerReply::from_json(&decoded)?)
    }
}

/// Error detail from a failed planner call: the `detail` field of a JSON
/// error body if there is one, otherwise the body text itself.
fn error_detail(body: &str) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        match fields.get("detail") {
            Some(Value::String(detail)) => return detail.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "(empty body)".to_string();
    }
    trimmed.chars().take(MAX_DETAIL_CHARS).collect()
}
