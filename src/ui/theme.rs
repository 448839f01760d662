use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub model_text_style: Style,

    // Chrome
    pub title_style: Style,
    pub streaming_indicator_style: Style,
    pub error_text_style: Style,
    pub input_border_style: Style,
    pub input_title_style: Style,

    // Input area
    pub input_text_style: Style,
    pub input_cursor_style: Style,

    // Sidebar and welcome screen
    pub sidebar_border_style: Style,
    pub sidebar_heading_style: Style,
    pub sidebar_item_style: Style,
    pub sidebar_selected_style: Style,
    pub welcome_title_style: Style,
    pub welcome_text_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            background_color: Color::Black,
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            model_text_style: Style::default().fg(Color::White),

            title_style: Style::default().fg(Color::Gray),
            streaming_indicator_style: Style::default().fg(Color::White),
            error_text_style: Style::default().fg(Color::Red),
            input_border_style: Style::default().fg(Color::Gray),
            input_title_style: Style::default().fg(Color::Gray),

            input_text_style: Style::default().fg(Color::White),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),

            sidebar_border_style: Style::default().fg(Color::Gray),
            sidebar_heading_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
            sidebar_item_style: Style::default().fg(Color::White),
            sidebar_selected_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan),
            welcome_title_style: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            welcome_text_style: Style::default().fg(Color::Gray),
        }
    }

    pub fn light() -> Self {
        Theme {
            background_color: Color::White,
            user_prefix_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Blue),
            model_text_style: Style::default().fg(Color::Black),

            title_style: Style::default().fg(Color::DarkGray),
            streaming_indicator_style: Style::default().fg(Color::Black),
            error_text_style: Style::default().fg(Color::Red),
            input_border_style: Style::default().fg(Color::Black),
            input_title_style: Style::default().fg(Color::DarkGray),

            input_text_style: Style::default().fg(Color::Black),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),

            sidebar_border_style: Style::default().fg(Color::Black),
            sidebar_heading_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
            sidebar_item_style: Style::default().fg(Color::Black),
            sidebar_selected_style: Style::default()
                .fg(Color::White)
                .bg(Color::Blue),
            welcome_title_style: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            welcome_text_style: Style::default().fg(Color::DarkGray),
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "light" => Self::light(),
            // Fallback
            _ => Self::dark_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_fall_back_to_dark() {
        let theme = Theme::from_name("solarized-something");
        assert_eq!(theme.background_color, Color::Black);
    }

    #[test]
    fn light_is_reachable_case_insensitively() {
        let theme = Theme::from_name("Light");
        assert_eq!(theme.background_color, Color::White);
    }
}
