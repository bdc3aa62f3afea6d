use anyhow::{Context, Result};
use assist_memory::{ConversationTurn, Metadata, Role, SessionStore};
use assist_search::{ContextService, QueryCategory};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::AssistantOptions;

static JSON_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```json\n([\s\S]*?)\n```").expect("valid regex"));

/// Everything a language model sees for one query
#[derive(Debug, Clone, Serialize)]
pub struct ModelRequest {
    pub system_prompt: String,
    pub user_query: String,
    pub context: String,
    pub history: Vec<ConversationTurn>,
}

impl ModelRequest {
    /// Final user turn: the query, prefixed by project context when present
    pub fn user_content(&self) -> String {
        if self.context.is_empty() {
            return self.user_query.clone();
        }
        format!(
            "Context from codebase:\n{}\n\nUser Query: {}\n\n\
             Please provide a helpful response following the guidelines in your system prompt. \
             If proposing a configuration, include it in a ```json code block.",
            self.context, self.user_query
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelReply {
    pub text: String,
    pub structured_config: Option<Value>,
}

/// Text generation backend
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply>;

    fn name(&self) -> &str;
}

/// Model that answers with the prompt it was given
///
/// Lets the whole pipeline run without network access.
#[derive(Debug, Default)]
pub struct DryRunModel;

#[async_trait]
impl LanguageModel for DryRunModel {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply> {
        Ok(ModelReply {
            text: request.user_content(),
            structured_config: None,
        })
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}

/// First ```json fenced block in `text`, if it parses
pub fn extract_json_block(text: &str) -> Option<Value> {
    let caps = JSON_BLOCK.captures(text)?;
    match serde_json::from_str(&caps[1]) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("Failed to parse JSON block from response: {err}");
            None
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssistantReply {
    pub session_id: String,
    pub text: String,
    pub query_type: QueryCategory,
    /// Files actually included in the model context
    pub context_files: Vec<String>,
    pub structured_config: Option<Value>,
    /// Messages ever recorded for the session
    pub conversation_length: u64,
    /// True when earlier turns were sent along
    pub has_history: bool,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssistantStatus {
    pub model: String,
    pub uptime_seconds: u64,
    pub request_count: u64,
    pub average_request_ms: u64,
    pub active_sessions: usize,
    pub total_messages: u64,
    pub indexed_files: usize,
}

/// Ties context selection, session memory and a language model together
pub struct Assistant {
    model: Box<dyn LanguageModel>,
    context: Arc<ContextService>,
    sessions: Arc<SessionStore>,
    options: AssistantOptions,
    started: Instant,
    requests: AtomicU64,
    busy_ms: AtomicU64,
}

impl Assistant {
    pub fn new(
        model: Box<dyn LanguageModel>,
        context: Arc<ContextService>,
        sessions: Arc<SessionStore>,
        options: AssistantOptions,
    ) -> Self {
        log::info!("Assistant initialized with {} model", model.name());
        Self {
            model,
            context,
            sessions,
            options,
            started: Instant::now(),
            requests: AtomicU64::new(0),
            busy_ms: AtomicU64::new(0),
        }
    }

    /// Answer `query` within a session, recording both turns
    ///
    /// A missing `session_id` starts a new session. If the model fails the
    /// user turn stays recorded and the error is returned.
    pub async fn process_query(
        &self,
        query: &str,
        session_id: Option<&str>,
        files: Option<&[String]>,
        include_history: bool,
    ) -> Result<AssistantReply> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();

        let session_id = match session_id {
            Some(id) if self.sessions.contains(id) => id.to_string(),
            other => self.sessions.create_session(other),
        };
        self.sessions
            .add_message(&session_id, Role::User, query, Metadata::new());

        let context = self.context.prepare_context(query, files);

        let mut history = Vec::new();
        if include_history && self.options.include_history {
            history = self.sessions.conversation_context(&session_id);
            if history.last().is_some_and(|t| t.role == Role::User) {
                history.pop();
            }
            log::info!(
                "Session {session_id}: {} turns of history",
                history.len()
            );
        }

        let request = ModelRequest {
            system_prompt: self.options.system_prompt.clone(),
            user_query: query.to_string(),
            context: context.text,
            history,
        };
        let has_history = !request.history.is_empty();

        let reply = self
            .model
            .generate(&request)
            .await
            .with_context(|| format!("{} model failed for session {session_id}", self.model.name()))?;

        let structured_config = reply
            .structured_config
            .or_else(|| extract_json_block(&reply.text));
        let query_type = QueryCategory::classify(query);

        let mut metadata = Metadata::new();
        metadata.insert("query_type".into(), query_type.as_str().into());
        metadata.insert(
            "json_config".into(),
            structured_config.clone().unwrap_or(Value::Null),
        );
        self.sessions
            .add_message(&session_id, Role::Assistant, &reply.text, metadata);

        let conversation_length = self
            .sessions
            .session_info(&session_id)
            .map_or(0, |info| info.message_count);

        #[allow(clippy::cast_possible_truncation)]
        let elapsed_ms = start.elapsed().as_millis() as u64;
        self.busy_ms.fetch_add(elapsed_ms, Ordering::Relaxed);
        log::info!("Processed {query_type} query in {elapsed_ms} ms");

        Ok(AssistantReply {
            session_id,
            text: reply.text,
            query_type,
            context_files: context.files,
            structured_config,
            conversation_length,
            has_history,
            elapsed_ms,
        })
    }

    pub fn status(&self) -> AssistantStatus {
        let requests = self.requests.load(Ordering::Relaxed);
        let busy_ms = self.busy_ms.load(Ordering::Relaxed);
        let store = self.sessions.stats();
        AssistantStatus {
            model: self.model.name().to_string(),
            uptime_seconds: self.started.elapsed().as_secs(),
            request_count: requests,
            average_request_ms: busy_ms.checked_div(requests).unwrap_or(0),
            active_sessions: store.active_sessions,
            total_messages: store.total_messages,
            indexed_files: self.context.index().len(),
        }
    }
}
