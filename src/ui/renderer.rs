//! Frame rendering for the chat interface.
//!
//! The transcript is pre-wrapped to exact screen rows (see
//! [`crate::core::text_wrapping`]), so the scroll helpers here and the
//! drawing code always agree on geometry. The event loop reuses
//! [`chat_viewport`] and [`max_scroll`] for its scrolling math.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect, Size},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::app::App;
use crate::core::message::Role;
use crate::core::text_wrapping::wrap_line;
use crate::ui::prompts::{sidebar_prompt_count, SIDEBAR_SECTIONS, WELCOME_PROMPTS};

pub const SIDEBAR_WIDTH: u16 = 30;

/// Rows (beyond borders) the input box may grow to.
const MAX_INPUT_ROWS: u16 = 5;

const USER_PREFIX: &str = "You: ";

pub fn ui(f: &mut Frame, app: &App) {
    let theme = &app.ui.theme;

    f.render_widget(
        Block::default().style(ratatui::style::Style::default().bg(theme.background_color)),
        f.area(),
    );

    let main_area = if app.ui.sidebar_open {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(f.area());
        render_sidebar(f, app, chunks[0]);
        chunks[1]
    } else {
        f.area()
    };

    let banner = banner_text(app);
    let input_height = input_area_height(app, main_area.width) + 2;
    let mut constraints = vec![Constraint::Min(0)];
    if banner.is_some() {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(input_height));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(main_area);

    if app.messages.is_empty() {
        render_welcome(f, app, chunks[0]);
    } else {
        render_transcript(f, app, chunks[0]);
    }

    if let Some((text, _blocking)) = banner {
        let banner_widget = Paragraph::new(text).style(theme.error_text_style);
        f.render_widget(banner_widget, chunks[1]);
    }

    render_input(f, app, chunks[chunks.len() - 1]);
}

/// Text of the one-line banner between transcript and input, if any. The
/// bool marks a blocking initialization failure (not dismissible).
pub fn banner_text(app: &App) -> Option<(String, bool)> {
    if let Some(init_error) = &app.ui.init_error {
        return Some((init_error.clone(), true));
    }
    app.ui
        .error
        .as_ref()
        .map(|error| (format!("{error} (press Esc to dismiss)"), false))
}

/// Rows of input text the input box currently needs, before borders.
pub fn input_area_height(app: &App, main_width: u16) -> u16 {
    let inner_width = main_width.saturating_sub(2);
    let rows: usize = app
        .ui
        .input
        .split('\n')
        .map(|line| wrap_line(line, inner_width).len())
        .sum();
    (rows as u16).clamp(1, MAX_INPUT_ROWS)
}

/// Width and height of the scrollable transcript region for a terminal of
/// the given size, mirroring the layout in [`ui`].
pub fn chat_viewport(app: &App, term: Size) -> (u16, u16) {
    let main_width = if app.ui.sidebar_open {
        term.width.saturating_sub(SIDEBAR_WIDTH)
    } else {
        term.width
    };
    let input_height = input_area_height(app, main_width) + 2;
    let banner_height = u16::from(banner_text(app).is_some());
    // One more row goes to the transcript title.
    let chat_height = term
        .height
        .saturating_sub(input_height + banner_height)
        .saturating_sub(1);
    (main_width, chat_height)
}

pub fn max_scroll(app: &App, term: Size) -> u16 {
    let (width, height) = chat_viewport(app, term);
    let rows = build_transcript_lines(app, width).len();
    rows.saturating_sub(height as usize).min(u16::MAX as usize) as u16
}

fn title_string(app: &App) -> String {
    format!(
        "Sherpa v{} - {}",
        env!("CARGO_PKG_VERSION"),
        app.session_config.model
    )
}

fn render_transcript(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.ui.theme;
    let lines = build_transcript_lines(app, area.width);

    let available_height = area.height.saturating_sub(1);
    let max_offset = lines
        .len()
        .saturating_sub(available_height as usize)
        .min(u16::MAX as usize) as u16;
    let scroll_offset = if app.ui.auto_scroll {
        max_offset
    } else {
        app.ui.scroll_offset.min(max_offset)
    };

    let transcript = Paragraph::new(lines)
        .block(Block::default().title(Span::styled(title_string(app), theme.title_style)))
        .scroll((scroll_offset, 0));
    f.render_widget(transcript, area);
}

/// Pre-wrapped transcript rows at the given width. Also used for scroll
/// math, so it must stay deterministic for a given app state and width.
pub fn build_transcript_lines(app: &App, width: u16) -> Vec<Line<'static>> {
    let theme = &app.ui.theme;
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in &app.messages {
        match msg.role {
            Role::User => {
                for (logical_idx, logical) in msg.content.split('\n').enumerate() {
                    let combined = if logical_idx == 0 {
                        format!("{USER_PREFIX}{logical}")
                    } else {
                        logical.to_string()
                    };
                    for (row_idx, row) in wrap_line(&combined, width).into_iter().enumerate() {
                        if logical_idx == 0 && row_idx == 0 && row.starts_with(USER_PREFIX) {
                            let rest = row[USER_PREFIX.len()..].to_string();
                            lines.push(Line::from(vec![
                                Span::styled(USER_PREFIX.to_string(), theme.user_prefix_style),
                                Span::styled(rest, theme.user_text_style),
                            ]));
                        } else {
                            lines.push(Line::from(Span::styled(row, theme.user_text_style)));
                        }
                    }
                }
            }
            Role::Model => {
                if app.show_thinking(msg) {
                    lines.push(Line::from(Span::styled(
                        thinking_frame(app).to_string(),
                        theme.streaming_indicator_style,
                    )));
                } else {
                    // Reserve one column on the live reply so the caret
                    // never pushes a row past the edge.
                    let wrap_width = if app.is_live_message(msg.id) {
                        width.saturating_sub(1)
                    } else {
                        width
                    };
                    let text = app.display_text(msg);
                    let start = lines.len();
                    for logical in text.split('\n') {
                        for row in wrap_line(logical, wrap_width) {
                            lines.push(Line::from(Span::styled(row, theme.model_text_style)));
                        }
                    }
                    if app.show_caret(msg) && caret_blink_on(app) && lines.len() > start {
                        if let Some(last) = lines.last_mut() {
                            last.spans.push(Span::styled(
                                "▌".to_string(),
                                theme.streaming_indicator_style,
                            ));
                        }
                    }
                }
            }
        }
        lines.push(Line::from(""));
    }

    lines
}

/// Pulse frame for the "thinking" indicator while the placeholder is empty.
fn thinking_frame(app: &App) -> &'static str {
    let elapsed = app.ui.pulse_start.elapsed().as_millis();
    match (elapsed / 300) % 3 {
        0 => "○",
        1 => "◐",
        _ => "●",
    }
}

/// Caret blink phase: on for 600 ms, off for 600 ms.
fn caret_blink_on(app: &App) -> bool {
    (app.ui.pulse_start.elapsed().as_millis() / 600) % 2 == 0
}

fn render_welcome(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.ui.theme;

    let mut lines = vec![
        Line::from(Span::styled("Sherpa", theme.welcome_title_style)),
        Line::from(Span::styled(
            "Let's plan your future together…",
            theme.welcome_text_style,
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Ask about careers, courses, or resumes. Type below to begin.",
            theme.welcome_text_style,
        )),
        Line::from(""),
    ];
    for (i, prompt) in WELCOME_PROMPTS.iter().enumerate() {
        lines.push(Line::from(Span::styled(
            format!("Alt+{}  {}", i + 1, prompt.message),
            theme.welcome_text_style,
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Ctrl+B sidebar • Ctrl+T theme • Ctrl+N new chat • Ctrl+C quit",
        theme.welcome_text_style,
    )));

    // Center vertically by padding above the content.
    let pad = area
        .height
        .saturating_sub(1)
        .saturating_sub(lines.len() as u16)
        / 2;
    let mut padded: Vec<Line> = std::iter::repeat_with(|| Line::from(""))
        .take(pad as usize)
        .collect();
    padded.extend(lines);

    let welcome = Paragraph::new(padded)
        .alignment(Alignment::Center)
        .block(Block::default().title(Span::styled(title_string(app), theme.title_style)));
    f.render_widget(welcome, area);
}

fn render_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.ui.theme;
    let mut lines: Vec<Line> = Vec::new();
    let mut flat_index = 0usize;

    for section in SIDEBAR_SECTIONS {
        lines.push(Line::from(Span::styled(
            section.heading.to_uppercase(),
            theme.sidebar_heading_style,
        )));
        for prompt in section.prompts {
            let style = if flat_index == app.ui.sidebar_selected {
                theme.sidebar_selected_style
            } else {
                theme.sidebar_item_style
            };
            lines.push(Line::from(Span::styled(format!(" {} ", prompt.label), style)));
            flat_index += 1;
        }
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "Enter sends • Esc closes",
        theme.sidebar_heading_style,
    )));

    let sidebar = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.sidebar_border_style)
            .title("Sherpa"),
    );
    f.render_widget(sidebar, area);

    debug_assert!(app.ui.sidebar_selected < sidebar_prompt_count());
}

fn render_input(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.ui.theme;

    let title = if app.ui.init_error.is_some() {
        "Chat unavailable until the configuration error is fixed (Ctrl+C to quit)"
    } else if app.ui.is_streaming {
        "Waiting for the guide… (Ctrl+C to quit)"
    } else {
        "Type your message (Enter to send, Alt+Enter for new line, Ctrl+C to quit)"
    };

    let inner_width = area.width.saturating_sub(2);
    let mut rows: Vec<String> = app
        .ui
        .input
        .split('\n')
        .flat_map(|line| wrap_line(line, inner_width))
        .collect();

    // Keep the tail visible once the input outgrows the box.
    let inner_height = area.height.saturating_sub(2) as usize;
    if rows.len() > inner_height {
        rows.drain(..rows.len() - inner_height);
    }

    let cursor_x = rows
        .last()
        .map(|row| unicode_width::UnicodeWidthStr::width(row.as_str()) as u16)
        .unwrap_or(0);
    let cursor_y = rows.len().saturating_sub(1) as u16;

    let text: Vec<Line> = rows
        .into_iter()
        .map(|row| Line::from(Span::styled(row, theme.input_text_style)))
        .collect();

    let input = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.input_border_style)
            .title(Span::styled(title, theme.input_title_style)),
    );
    f.render_widget(input, area);

    if app.ui.init_error.is_none() {
        f.set_cursor_position((
            (area.x + 1 + cursor_x).min(area.x + area.width.saturating_sub(1)),
            area.y + 1 + cursor_y,
        ));
    }
}
