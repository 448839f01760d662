//! Runtime state for an interactive session.
//!
//! [`App`] owns the conversation (messages plus their persistence), the
//! chat session capability, the typewriter for the live reply, and the
//! interface state the renderer draws from. Conversation mutations go
//! through [`ConversationController`], obtained via [`App::conversation`].

pub mod conversation;


use std::time::Instant;

use crate::core::config::Config;
use crate::core::message::{Message, MessageId, MessageIdAllocator};
use crate::core::session::{ChatSession, SessionConfig};
use crate::core::transcript::TranscriptStore;
use crate::core::typewriter::Typewriter;
use crate::ui::theme::Theme;

pub use conversation::ConversationController;

pub struct UiState {
    pub input: String,
    /// Single-flight flag: true from submission until the stream ends or
    /// fails. The reveal animation may keep draining after it clears.
    pub is_streaming: bool,
    /// Dismissible stream-failure banner.
    pub error: Option<String>,
    /// Blocking capability-initialization failure; submissions are refused
    /// while this is set.
    pub init_error: Option<String>,
    pub sidebar_open: bool,
    pub sidebar_selected: usize,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    pub theme: Theme,
    pub theme_id: String,
    /// Phase origin for the thinking indicator and caret blink.
    pub pulse_start: Instant,
}

impl UiState {
    fn new(theme: Theme, theme_id: String) -> Self {
        Self {
            input: String::new(),
            is_streaming: false,
            error: None,
            init_error: None,
            sidebar_open: false,
            sidebar_selected: 0,
            scroll_offset: 0,
            auto_scroll: true,
            theme,
            theme_id,
            pulse_start: Instant::now(),
        }
    }
}

pub struct App {
    pub session: Option<ChatSession>,
    pub session_config: SessionConfig,
    pub config: Config,
    pub transcript: TranscriptStore,
    pub messages: Vec<Message>,
    pub ids: MessageIdAllocator,
    pub typewriter: Option<Typewriter>,
    pub ui: UiState,
}

impl App {
    /// Restore the persisted conversation and establish the session. A
    /// failed session initialization still yields a usable App: the
    /// blocking error is surfaced and submissions are refused.
    pub fn new(
        config: Config,
        session_config: SessionConfig,
        transcript: TranscriptStore,
        theme: Theme,
        theme_id: String,
    ) -> Self {
        let messages = transcript.load();
        let ids = MessageIdAllocator::resuming_after(&messages);
        let mut ui = UiState::new(theme, theme_id);

        let session = match ChatSession::new(&session_config) {
            Ok(session) => Some(session),
            Err(e) => {
                ui.init_error = Some(e.to_string());
                None
            }
        };

        Self {
            session,
            session_config,
            config,
            transcript,
            messages,
            ids,
            typewriter: None,
            ui,
        }
    }

    pub fn conversation(&mut self) -> ConversationController<'_> {
        ConversationController {
            session: &mut self.session,
            session_config: &self.session_config,
            messages: &mut self.messages,
            ids: &mut self.ids,
            typewriter: &mut self.typewriter,
            ui: &mut self.ui,
            transcript: &self.transcript,
        }
    }

    /// Text of a message as the user should currently see it: the paced
    /// prefix for the live streaming target, full content for everything
    /// else (historical messages render instantly, with zero latency).
    pub fn display_text<'a>(&'a self, message: &'a Message) -> &'a str {
        match &self.typewriter {
            Some(tw) if tw.owns(message.id) => tw.visible(),
            _ => &message.content,
        }
    }

    /// The live reply has caught up with everything received so far and the
    /// stream is still open: show the caret affordance.
    pub fn show_caret(&self, message: &Message) -> bool {
        self.ui.is_streaming
            && self
                .typewriter
                .as_ref()
                .is_some_and(|tw| tw.owns(message.id) && tw.is_caught_up() && !tw.committed().is_empty())
    }

    /// The placeholder is still empty: show the thinking indicator.
    pub fn show_thinking(&self, message: &Message) -> bool {
        self.ui.is_streaming
            && self
                .typewriter
                .as_ref()
                .is_some_and(|tw| tw.owns(message.id) && tw.committed().is_empty())
    }

    pub fn is_live_message(&self, id: MessageId) -> bool {
        self.typewriter.as_ref().is_some_and(|tw| tw.owns(id))
    }

    /// Reveal everything due by `now`; drop the typewriter once the stream
    /// has ended and the animation has fully drained. Returns whether the
    /// visible transcript changed.
    pub fn advance_typewriter(&mut self, now: Instant) -> bool {
        let Some(tw) = &mut self.typewriter else {
            return false;
        };
        let changed = tw.advance(now);
        if tw.is_drained() {
            self.typewriter = None;
        }
        changed
    }

    pub fn next_reveal_due(&self) -> Option<Instant> {
        self.typewriter.as_ref().and_then(|tw| tw.next_due())
    }

    /// Flip between light and dark, persisting the choice. A failed config
    /// write is logged and otherwise ignored, like any persistence failure.
    pub fn toggle_theme(&mut self) {
        let next = if self.ui.theme_id == "dark" { "light" } else { "dark" };
        self.ui.theme = Theme::from_name(next);
        self.ui.theme_id = next.to_string();
        if let Err(e) = self.config.set_theme(next) {
            tracing::warn!("failed to persist theme preference: {e}");
        }
    }
}
