//! Conversation orchestration: submit, stream application, rollback.

use std::time::Instant;

use super::UiState;
use crate::core::chat_stream::StreamParams;
use crate::core::constants::REVEAL_INTERVAL;
use crate::core::message::{Message, MessageIdAllocator};
use crate::core::session::{ChatSession, SessionConfig};
use crate::core::transcript::TranscriptStore;
use crate::core::typewriter::Typewriter;

pub struct ConversationController<'a> {
    pub(super) session: &'a mut Option<ChatSession>,
    pub(super) session_config: &'a SessionConfig,
    pub(super) messages: &'a mut Vec<Message>,
    pub(super) ids: &'a mut MessageIdAllocator,
    pub(super) typewriter: &'a mut Option<Typewriter>,
    pub(super) ui: &'a mut UiState,
    pub(super) transcript: &'a TranscriptStore,
}

impl ConversationController<'_> {
    /// Take the input buffer and submit it. Returns the parameters for the
    /// stream the caller must spawn, or `None` when nothing was submitted
    /// (blank input, a response already pending, or no session).
    pub fn submit_input(&mut self, now: Instant) -> Option<StreamParams> {
        let text = self.ui.input.trim().to_string();
        let params = self.submit(&text, now)?;
        self.ui.input.clear();
        Some(params)
    }

    /// Append a user turn plus a model placeholder and open a stream for
    /// the reply. Single-flight: while a response is pending, further
    /// submissions are ignored.
    pub fn submit(&mut self, text: &str, now: Instant) -> Option<StreamParams> {
        let text = text.trim();
        if text.is_empty() || self.ui.is_streaming {
            return None;
        }
        let session = self.session.as_mut()?;

        self.ui.error = None;

        let user_id = self.ids.allocate();
        self.messages.push(Message::user(user_id, text));

        let placeholder_id = self.ids.allocate();
        self.messages.push(Message::model_placeholder(placeholder_id));
        self.transcript.save(self.messages);

        *self.typewriter = Some(Typewriter::animating(placeholder_id, REVEAL_INTERVAL));
        self.ui.is_streaming = true;
        self.ui.auto_scroll = true;
        self.ui.pulse_start = now;

        let api_messages = session.build_api_messages(self.messages);
        let (cancel_token, stream_id) = session.begin_stream();
        Some(session.stream_params(api_messages, cancel_token, stream_id))
    }

    /// Apply one received delta: grow the placeholder's committed content
    /// and feed the typewriter. Deltas from a retired stream are discarded.
    pub fn apply_delta(&mut self, stream_id: u64, content: &str, now: Instant) {
        if !self.ui.is_streaming || !self.is_current_stream(stream_id) {
            return;
        }
        let Some(tw) = self.typewriter.as_mut() else {
            return;
        };

        if let Some(msg) = self.messages.iter_mut().rev().find(|m| tw.owns(m.id)) {
            msg.content.push_str(content);
        }
        tw.append_delta(content, now);
        self.ui.auto_scroll = true;
        self.transcript.save(self.messages);
    }

    /// The stream finished: finalize the reply. Its content is complete and
    /// immutable from here on; the typewriter keeps draining on its own and
    /// the single-flight flag clears so the user can type the next turn.
    pub fn complete_stream(&mut self, stream_id: u64, now: Instant) {
        if !self.ui.is_streaming || !self.is_current_stream(stream_id) {
            return;
        }
        if let Some(tw) = self.typewriter.as_mut() {
            tw.mark_stream_done(now);
        }
        if let Some(session) = self.session.as_mut() {
            session.invalidate_current_stream();
        }
        self.ui.is_streaming = false;
    }

    /// The stream failed: roll the placeholder back out of the conversation
    /// (the user's own message stays), surface the error, and release the
    /// single-flight flag so the user may retry.
    pub fn fail_stream(&mut self, stream_id: u64, error: String) {
        if !self.ui.is_streaming || !self.is_current_stream(stream_id) {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.invalidate_current_stream();
        }

        if let Some(mut tw) = self.typewriter.take() {
            // Cancel before touching the store: no reveal may fire against
            // a message slot that is about to disappear.
            tw.cancel_pending();
            self.messages.retain(|m| !tw.owns(m.id));
        }

        self.ui.error = Some(error);
        self.ui.is_streaming = false;
        self.transcript.save(self.messages);
    }

    /// Discard the conversation everywhere (memory and disk) and establish
    /// a fresh session with empty seed history. A failed initialization
    /// leaves the conversation empty behind a blocking error; there is no
    /// automatic retry.
    pub fn new_conversation(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.cancel_current_stream();
        }
        if let Some(mut tw) = self.typewriter.take() {
            tw.cancel_pending();
        }

        self.messages.clear();
        self.ids.reset();
        self.transcript.clear();

        self.ui.is_streaming = false;
        self.ui.error = None;
        self.ui.scroll_offset = 0;
        self.ui.auto_scroll = true;

        let last_stream_id = self.session.as_ref().map_or(0, |s| s.last_stream_id());
        match ChatSession::new(self.session_config) {
            Ok(mut session) => {
                // Ids keep counting across sessions; a stream cancelled
                // here can never collide with one opened later.
                session.resume_stream_ids(last_stream_id);
                *self.session = Some(session);
                self.ui.init_error = None;
            }
            Err(e) => {
                *self.session = None;
                self.ui.init_error = Some(e.to_string());
            }
        }
    }

    pub fn dismiss_error(&mut self) {
        self.ui.error = None;
    }

    fn is_current_stream(&self, stream_id: u64) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.is_current_stream(stream_id))
    }
}
