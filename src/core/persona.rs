//! Fixed behavioral configuration for the assistant.
//!
//! The persona travels with every request: a system instruction describing
//! the guide's voice plus the sampling parameters that keep its tone
//! consistent. Users can override either through the config file.

use crate::core::config::Config;
use crate::core::constants::{DEFAULT_TEMPERATURE, DEFAULT_TOP_P};

const GUIDE_INSTRUCTIONS: &str = "\
You are Sherpa, a professional, empathetic, and encouraging career and \
education guide. Your goal is to help users explore career options and give \
actionable advice on resumes, cover letters, interviews, skill development, \
and finding educational resources. Keep a positive, supportive, and clear \
tone. Ask clarifying questions to understand the user's situation, needs, \
and aspirations. Structure advice so it is easy to follow, using lists or \
bullet points where that helps. Mirror the user's register: stay friendly \
with informal users, but keep the advice itself professional. For simple, \
direct questions give a concise answer; elaborate only when the query is \
complex or the user asks for more detail.";

#[derive(Debug, Clone)]
pub struct Persona {
    pub system_instructions: String,
    pub temperature: f32,
    pub top_p: f32,
}

impl Persona {
    /// The built-in career-guide persona.
    pub fn guide() -> Self {
        Self {
            system_instructions: GUIDE_INSTRUCTIONS.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
        }
    }

    /// Built-in persona with any config overrides applied on top.
    pub fn from_config(config: &Config) -> Self {
        let base = Self::guide();
        Self {
            system_instructions: config
                .system_instructions
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(base.system_instructions),
            temperature: config.temperature.unwrap_or(base.temperature),
            top_p: config.top_p.unwrap_or(base.top_p),
        }
    }

    pub fn system_message(&self) -> crate::api::ChatMessage {
        crate::api::ChatMessage {
            role: "system".to_string(),
            content: self.system_instructions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_overrides_win_over_builtins() {
        let config = Config {
            system_instructions: Some("You are terse.".into()),
            temperature: Some(0.2),
            ..Config::default()
        };
        let persona = Persona::from_config(&config);
        assert_eq!(persona.system_instructions, "You are terse.");
        assert_eq!(persona.temperature, 0.2);
        assert_eq!(persona.top_p, DEFAULT_TOP_P);
    }

    #[test]
    fn blank_instruction_override_falls_back() {
        let config = Config {
            system_instructions: Some("   ".into()),
            ..Config::default()
        };
        let persona = Persona::from_config(&config);
        assert_eq!(persona.system_instructions, GUIDE_INSTRUCTIONS);
    }
}
