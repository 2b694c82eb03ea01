//! Gear processing and fan-out, grounded on
//! `orchestrator::execution::workflow_engine`'s node-dispatch pattern for the
//! LLM invocation and on `engine-core::urlguard` for SSRF protection on
//! outbound `forwardOutputToGears` POSTs — the same guard the DAG engine
//! applies to `kind=http` nodes, reused here rather than reimplemented.

use std::sync::Arc;
use std::time::Duration;

use engine_core::urlguard::{self, AllowList};
use llm::{ChatMessage, LlmAdapter};
use serde_json::{json, Value};
use tracing::warn;
use url::Url;
use uuid::Uuid;

use crate::error::{GearError, Result};
use crate::model::{Gear, Source};

const FORWARD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct GearProcessor {
    llm: Arc<dyn LlmAdapter>,
    http: reqwest::Client,
    allow_list: AllowList,
    /// Used to resolve relative `outputUrls` against a configured public origin.
    public_origin: Option<String>,
}

impl GearProcessor {
    pub fn new(llm: Arc<dyn LlmAdapter>) -> Self {
        Self { llm, http: reqwest::Client::new(), allow_list: AllowList::default(), public_origin: None }
    }

    pub fn with_allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    pub fn with_public_origin(mut self, origin: impl Into<String>) -> Self {
        self.public_origin = Some(origin.into());
        self
    }

    /// `processInput(sourceId, payload) -> output`: stores the payload keyed
    /// by source, then invokes `process` over the accumulated `inputs` map.
    pub async fn process_input(&self, gear: &mut Gear, source_id: &str, payload: Value) -> Result<Value> {
        gear.inputs.insert(source_id.to_string(), payload);
        self.process(gear, None).await
    }

    /// `process(directInput?) -> output`: compose the prompt and invoke the
    /// LLM. `direct_input` is the backward-compatible single-source path and
    /// leaves `inputs` untouched; without it, the current `inputs` map is
    /// used instead. Fan-out to `outputUrls` is the caller's responsibility
    /// (see [`Self::forward_output_to_gears`]) so it can happen after the
    /// caller's own log write, per the log-before-fanout ordering.
    pub async fn process(&self, gear: &mut Gear, direct_input: Option<Value>) -> Result<Value> {
        let effective_input = match &direct_input {
            Some(v) => v.clone(),
            None => Value::Object(gear.inputs.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        };

        let mut messages: Vec<ChatMessage> = Vec::new();
        let system_prompt = gear.system_prompt();
        if !system_prompt.is_empty() {
            messages.push(ChatMessage::system(system_prompt));
        }
        messages.push(ChatMessage::user(stringify_input(&effective_input)));

        let completion = self.llm.complete(&messages).await?;
        let output = json!({ "content": completion });

        Ok(output)
    }

    /// POST `{source_gear:{id,label}, message_id, data}` to every configured
    /// output URL. Per-URL failures are logged and never propagate — this
    /// method cannot fail; fan-out failures are never surfaced to the
    /// caller.
    pub async fn forward_output_to_gears(&self, gear: &Gear, output: &Value) {
        for raw_url in &gear.output_urls {
            let resolved = match self.resolve_url(raw_url) {
                Ok(u) => u,
                Err(e) => {
                    warn!(gear_id = %gear.id, url = %raw_url, error = %e, "dropping unresolvable output URL");
                    continue;
                }
            };

            let body = json!({
                "source_gear": { "id": gear.id, "label": gear.label },
                "message_id": Uuid::new_v4().to_string(),
                "data": output,
            });

            let send = self
                .http
                .post(resolved)
                .header("content-type", "application/json")
                .json(&body)
                .send();

            match tokio::time::timeout(FORWARD_TIMEOUT, send).await {
                Ok(Ok(resp)) if !resp.status().is_success() => {
                    warn!(gear_id = %gear.id, url = %raw_url, status = %resp.status(), "forward rejected by downstream");
                }
                Ok(Err(e)) => warn!(gear_id = %gear.id, url = %raw_url, error = %e, "forward transport failure"),
                Err(_) => warn!(gear_id = %gear.id, url = %raw_url, "forward timed out"),
                Ok(Ok(_)) => {}
            }
        }
    }

    fn resolve_url(&self, raw: &str) -> Result<Url> {
        let absolute = if raw.starts_with("http://") || raw.starts_with("https://") {
            raw.to_string()
        } else {
            let origin = self
                .public_origin
                .as_deref()
                .ok_or_else(|| GearError::Storage(format!("relative output URL {raw} but no public origin configured")))?;
            format!("{}/{}", origin.trim_end_matches('/'), raw.trim_start_matches('/'))
        };

        urlguard::validate_http_url(&absolute, &self.allow_list).map_err(GearError::from)
    }
}

/// Non-string direct/accumulated input is passed to the LLM as its JSON
/// string form; the LLM's own response stringification rule is handled at
/// the call boundary, not here.
fn stringify_input(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
