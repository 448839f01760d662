//! Chat session against an OpenAI-compatible endpoint.
//!
//! The session is the capability the conversation controller talks to: it
//! validates credentials up front, assembles request payloads from the
//! role-mapped history plus the guide persona, and owns the bookkeeping
//! that keeps exactly one response stream current (ids, cancel token).

use std::error::Error as StdError;
use std::fmt;

use tokio_util::sync::CancellationToken;

use crate::api::ChatMessage;
use crate::core::chat_stream::StreamParams;
use crate::core::message::Message;
use crate::core::persona::Persona;

#[derive(Debug)]
pub enum SessionError {
    /// No usable API key was found in the environment.
    MissingApiKey,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::MissingApiKey => write!(
                f,
                "No API key configured. Set SHERPA_API_KEY (or OPENAI_API_KEY) and restart."
            ),
        }
    }
}

impl StdError for SessionError {}

/// Everything needed to (re)establish a session. Built once at startup from
/// config, CLI flags, and the environment; `new_conversation` re-validates
/// it when it creates a fresh session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub persona: Persona,
}

pub struct ChatSession {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    persona: Persona,
    current_stream_id: u64,
    cancel_token: Option<CancellationToken>,
}

impl ChatSession {
    pub fn new(config: &SessionConfig) -> Result<Self, SessionError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(SessionError::MissingApiKey)?;

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            persona: config.persona.clone(),
            current_stream_id: 0,
            cancel_token: None,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Assemble the outbound payload: the persona's system message followed
    /// by the full prior history, role-mapped for the wire. The trailing
    /// empty model placeholder (if present) is excluded.
    pub fn build_api_messages(&self, history: &[Message]) -> Vec<ChatMessage> {
        let mut api_messages = Vec::with_capacity(history.len() + 1);
        api_messages.push(self.persona.system_message());

        for msg in history {
            if msg.is_model() && msg.content.is_empty() {
                continue;
            }
            api_messages.push(ChatMessage {
                role: msg.role.to_api_role().to_string(),
                content: msg.content.clone(),
            });
        }

        api_messages
    }

    /// Cancel whatever stream may be open and hand out a token + id for a
    /// new one. Events from earlier streams are discarded by id.
    pub fn begin_stream(&mut self) -> (CancellationToken, u64) {
        self.cancel_current_stream();

        self.current_stream_id += 1;

        let token = CancellationToken::new();
        self.cancel_token = Some(token.clone());

        (token, self.current_stream_id)
    }

    pub fn cancel_current_stream(&mut self) {
        if let Some(token) = &self.cancel_token {
            token.cancel();
        }
        self.cancel_token = None;
    }

    /// Retire the current stream id so trailing events (an `End` after an
    /// `Error`, chunks from a cancelled request) no longer match.
    pub fn invalidate_current_stream(&mut self) {
        self.cancel_current_stream();
        self.current_stream_id += 1;
    }

    pub fn is_current_stream(&self, stream_id: u64) -> bool {
        self.current_stream_id == stream_id
    }

    pub fn last_stream_id(&self) -> u64 {
        self.current_stream_id
    }

    /// Continue another session's id sequence so events from its streams
    /// can never be mistaken for this session's.
    pub fn resume_stream_ids(&mut self, last_issued: u64) {
        self.current_stream_id = self.current_stream_id.max(last_issued);
    }

    pub fn stream_params(
        &self,
        api_messages: Vec<ChatMessage>,
        cancel_token: CancellationToken,
        stream_id: u64,
    ) -> StreamParams {
        StreamParams {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            temperature: Some(self.persona.temperature),
            top_p: Some(self.persona.top_p),
            api_messages,
            cancel_token,
            stream_id,
        }
    }
}
