//! Main chat event loop and terminal lifecycle.
//!
//! One loop owns all state: it draws a frame, waits for whichever comes
//! first (a terminal event or the next scheduled word reveal), drains the
//! stream channel, and advances the typewriter. Stream I/O itself runs in
//! spawned tasks and only ever talks to the loop through the channel.

use std::{error::Error, io, time::Duration, time::Instant};

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Size, Terminal};

use crate::cli::Args;
use crate::core::app::App;
use crate::core::chat_stream::{ChatStreamService, StreamMessage};
use crate::core::config::Config;
use crate::core::constants::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::core::persona::Persona;
use crate::core::session::SessionConfig;
use crate::core::transcript::TranscriptStore;
use crate::ui::appearance::{detect_os_appearance, Appearance};
use crate::ui::prompts::{sidebar_prompt, sidebar_prompt_count, WELCOME_PROMPTS};
use crate::ui::renderer::{self, ui};
use crate::ui::theme::Theme;

/// Redraw cadence for the pulse/caret animations when nothing else is due.
const TICK: Duration = Duration::from_millis(50);

const SCROLL_LINES: u16 = 1;
const MOUSE_SCROLL_LINES: u16 = 3;

enum LoopAction {
    Continue,
    Quit,
}

pub async fn run_chat(args: Args) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let mut app = bootstrap_app(args, config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (stream_service, mut rx) = ChatStreamService::new();
    let result = run_event_loop(&mut terminal, &mut app, &stream_service, &mut rx).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Resolve configuration layers (flags beat environment beats config file
/// beats defaults) and restore the persisted conversation.
fn bootstrap_app(args: Args, config: Config) -> Result<App, Box<dyn Error>> {
    let theme_id = args
        .theme
        .clone()
        .or_else(|| config.theme.clone())
        .unwrap_or_else(|| {
            match detect_os_appearance() {
                Some(Appearance::Light) => "light",
                _ => "dark",
            }
            .to_string()
        });
    let theme = Theme::from_name(&theme_id);

    let base_url = args
        .base_url
        .clone()
        .or_else(|| std::env::var("SHERPA_BASE_URL").ok())
        .or_else(|| std::env::var("OPENAI_BASE_URL").ok())
        .or_else(|| config.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let model = args
        .model
        .clone()
        .or_else(|| config.default_model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let api_key = std::env::var("SHERPA_API_KEY")
        .or_else(|_| std::env::var("OPENAI_API_KEY"))
        .ok();

    let session_config = SessionConfig {
        base_url,
        model,
        api_key,
        persona: Persona::from_config(&config),
    };

    let transcript = TranscriptStore::open_default()?;
    Ok(App::new(config, session_config, transcript, theme, theme_id))
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    stream_service: &ChatStreamService,
    rx: &mut tokio::sync::mpsc::UnboundedReceiver<(StreamMessage, u64)>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        // Sleep until a terminal event or the next scheduled reveal,
        // whichever comes first; TICK keeps the pulse animations moving.
        let now = Instant::now();
        let timeout = app
            .next_reveal_due()
            .map(|due| due.saturating_duration_since(now))
            .map_or(TICK, |until_due| until_due.min(TICK));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let size = terminal.size()?;
                    if let LoopAction::Quit = handle_key(app, stream_service, key, size) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    handle_mouse(app, mouse, size);
                }
                _ => {}
            }
        }

        // Strictly FIFO: deltas apply in arrival order, stale stream ids
        // fall out in the controller.
        while let Ok((message, stream_id)) = rx.try_recv() {
            let now = Instant::now();
            match message {
                StreamMessage::Chunk(content) => {
                    app.conversation().apply_delta(stream_id, &content, now);
                }
                StreamMessage::Error(error) => {
                    app.conversation().fail_stream(stream_id, error);
                }
                StreamMessage::End => {
                    app.conversation().complete_stream(stream_id, now);
                }
            }
        }

        app.advance_typewriter(Instant::now());
    }
}

fn handle_key(
    app: &mut App,
    stream_service: &ChatStreamService,
    key: KeyEvent,
    size: Size,
) -> LoopAction {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return LoopAction::Quit;
        }
        KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.conversation().new_conversation();
        }
        KeyCode::Char('t') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.toggle_theme();
        }
        KeyCode::Char('b') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.ui.sidebar_open = !app.ui.sidebar_open;
        }
        KeyCode::Esc => {
            if app.ui.error.is_some() {
                app.conversation().dismiss_error();
            } else if app.ui.sidebar_open {
                app.ui.sidebar_open = false;
            }
        }
        KeyCode::Up if app.ui.sidebar_open => {
            app.ui.sidebar_selected = app.ui.sidebar_selected.saturating_sub(1);
        }
        KeyCode::Down if app.ui.sidebar_open => {
            app.ui.sidebar_selected =
                (app.ui.sidebar_selected + 1).min(sidebar_prompt_count() - 1);
        }
        KeyCode::Enter if app.ui.sidebar_open => {
            if let Some(prompt) = sidebar_prompt(app.ui.sidebar_selected) {
                submit_prompt(app, stream_service, prompt.message);
            }
            app.ui.sidebar_open = false;
        }
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            app.ui.input.push('\n');
        }
        KeyCode::Enter => {
            let params = app.conversation().submit_input(Instant::now());
            if let Some(params) = params {
                stream_service.spawn_stream(params);
            }
        }
        KeyCode::Char(c @ '1'..='3')
            if key.modifiers.contains(KeyModifiers::ALT) && app.messages.is_empty() =>
        {
            let index = (c as usize) - ('1' as usize);
            if let Some(prompt) = WELCOME_PROMPTS.get(index) {
                submit_prompt(app, stream_service, prompt.message);
            }
        }
        KeyCode::Backspace => {
            app.ui.input.pop();
        }
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            app.ui.input.push(c);
        }
        KeyCode::Up => scroll_up(app, size, SCROLL_LINES),
        KeyCode::Down => scroll_down(app, size, SCROLL_LINES),
        KeyCode::PageUp => {
            let (_, height) = renderer::chat_viewport(app, size);
            scroll_up(app, size, height.max(1));
        }
        KeyCode::PageDown => {
            let (_, height) = renderer::chat_viewport(app, size);
            scroll_down(app, size, height.max(1));
        }
        _ => {}
    }
    LoopAction::Continue
}

fn handle_mouse(app: &mut App, mouse: MouseEvent, size: Size) {
    match mouse.kind {
        MouseEventKind::ScrollUp => scroll_up(app, size, MOUSE_SCROLL_LINES),
        MouseEventKind::ScrollDown => scroll_down(app, size, MOUSE_SCROLL_LINES),
        _ => {}
    }
}

fn submit_prompt(app: &mut App, stream_service: &ChatStreamService, message: &str) {
    let params = app.conversation().submit(message, Instant::now());
    if let Some(params) = params {
        stream_service.spawn_stream(params);
    }
}

/// Scrolling away from the bottom parks auto-scroll; returning to the
/// bottom re-engages it so new content keeps the view pinned.
fn scroll_up(app: &mut App, size: Size, lines: u16) {
    let max = renderer::max_scroll(app, size);
    let current = if app.ui.auto_scroll {
        max
    } else {
        app.ui.scroll_offset.min(max)
    };
    app.ui.scroll_offset = current.saturating_sub(lines);
    app.ui.auto_scroll = app.ui.scroll_offset >= max;
}

fn scroll_down(app: &mut App, size: Size, lines: u16) {
    let max = renderer::max_scroll(app, size);
    let current = if app.ui.auto_scroll {
        max
    } else {
        app.ui.scroll_offset.min(max)
    };
    app.ui.scroll_offset = current.saturating_add(lines).min(max);
    app.ui.auto_scroll = app.ui.scroll_offset >= max;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::create_test_app;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn alt(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::ALT)
    }

    fn term() -> Size {
        Size::new(80, 24)
    }

    #[test]
    fn typing_and_backspace_edit_the_input() {
        let (mut app, _dir) = create_test_app();
        let (service, _rx) = ChatStreamService::new();

        for c in "hi!".chars() {
            handle_key(&mut app, &service, key(KeyCode::Char(c)), term());
        }
        assert_eq!(app.ui.input, "hi!");

        handle_key(&mut app, &service, key(KeyCode::Backspace), term());
        assert_eq!(app.ui.input, "hi");

        handle_key(&mut app, &service, alt(KeyCode::Enter), term());
        assert_eq!(app.ui.input, "hi\n");
    }

    #[tokio::test]
    async fn enter_submits_and_opens_a_stream() {
        let (mut app, _dir) = create_test_app();
        let (service, _rx) = ChatStreamService::new();

        app.ui.input = "hello".into();
        handle_key(&mut app, &service, key(KeyCode::Enter), term());

        assert_eq!(app.messages.len(), 2);
        assert!(app.ui.is_streaming);
        assert!(app.ui.input.is_empty());
    }

    #[test]
    fn ctrl_c_quits() {
        let (mut app, _dir) = create_test_app();
        let (service, _rx) = ChatStreamService::new();
        assert!(matches!(
            handle_key(&mut app, &service, ctrl('c'), term()),
            LoopAction::Quit
        ));
    }

    #[tokio::test]
    async fn sidebar_navigation_sends_the_selected_prompt() {
        let (mut app, _dir) = create_test_app();
        let (service, _rx) = ChatStreamService::new();

        handle_key(&mut app, &service, ctrl('b'), term());
        assert!(app.ui.sidebar_open);

        handle_key(&mut app, &service, key(KeyCode::Down), term());
        handle_key(&mut app, &service, key(KeyCode::Enter), term());

        assert!(!app.ui.sidebar_open);
        assert_eq!(
            app.messages[0].content,
            "I'm feeling confused about my career options."
        );
    }

    #[test]
    fn sidebar_selection_stays_in_bounds() {
        let (mut app, _dir) = create_test_app();
        let (service, _rx) = ChatStreamService::new();
        app.ui.sidebar_open = true;

        for _ in 0..20 {
            handle_key(&mut app, &service, key(KeyCode::Down), term());
        }
        assert_eq!(app.ui.sidebar_selected, sidebar_prompt_count() - 1);

        for _ in 0..20 {
            handle_key(&mut app, &service, key(KeyCode::Up), term());
        }
        assert_eq!(app.ui.sidebar_selected, 0);
    }

    #[tokio::test]
    async fn welcome_shortcut_submits_a_starter_prompt() {
        let (mut app, _dir) = create_test_app();
        let (service, _rx) = ChatStreamService::new();

        handle_key(&mut app, &service, alt(KeyCode::Char('1')), term());
        assert_eq!(
            app.messages[0].content,
            "Can you help me with a career assessment?"
        );

        // With a conversation underway the shortcut types nothing either.
        let before = app.messages.len();
        handle_key(&mut app, &service, alt(KeyCode::Char('2')), term());
        assert_eq!(app.messages.len(), before);
    }

    #[test]
    fn esc_dismisses_the_error_before_closing_the_sidebar() {
        let (mut app, _dir) = create_test_app();
        let (service, _rx) = ChatStreamService::new();
        app.ui.sidebar_open = true;
        app.ui.error = Some("boom".into());

        handle_key(&mut app, &service, key(KeyCode::Esc), term());
        assert!(app.ui.error.is_none());
        assert!(app.ui.sidebar_open);

        handle_key(&mut app, &service, key(KeyCode::Esc), term());
        assert!(!app.ui.sidebar_open);
    }

    #[test]
    fn scrolling_up_parks_auto_scroll_and_bottom_restores_it() {
        let (mut app, _dir) = create_test_app();
        let (service, _rx) = ChatStreamService::new();

        // Enough history to overflow a 24-row terminal.
        let now = Instant::now();
        for i in 0..30 {
            let params = app
                .conversation()
                .submit(&format!("question {i}"), now)
                .expect("stream");
            app.conversation()
                .apply_delta(params.stream_id, "answer", now);
            app.conversation().complete_stream(params.stream_id, now);
            app.advance_typewriter(now + Duration::from_secs(60));
        }
        assert!(app.ui.auto_scroll);
        assert!(renderer::max_scroll(&app, term()) > 0);

        handle_key(&mut app, &service, key(KeyCode::Up), term());
        assert!(!app.ui.auto_scroll);

        handle_key(&mut app, &service, key(KeyCode::PageDown), term());
        assert!(app.ui.auto_scroll);
    }
}
