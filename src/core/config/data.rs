use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// UI theme name ("dark" or "light"). When unset the OS appearance
    /// preference decides.
    pub theme: Option<String>,
    pub default_model: Option<String>,
    pub base_url: Option<String>,
    /// Override the built-in guide instructions sent as the system message.
    pub system_instructions: Option<String>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

impl Config {
    /// Record the theme choice and write it back out. Toggling the theme is
    /// the only mutation the interactive session performs on the config.
    pub fn set_theme(&mut self, theme: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.theme = Some(theme.to_string());
        self.save()
    }
}

/// Get a user-friendly display string for a path.
/// Converts absolute paths to use ~ notation on Unix-like systems when possible.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = std::path::PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_deserialize_to_none() {
        let config: Config = toml::from_str("theme = \"light\"").expect("parses");
        assert_eq!(config.theme.as_deref(), Some("light"));
        assert!(config.default_model.is_none());
        assert!(config.temperature.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn path_display_shortens_home() {
        if let Some(home) = std::env::var_os("HOME") {
            let path = std::path::PathBuf::from(home).join("notes.txt");
            assert_eq!(path_display(&path), "~/notes.txt");
        }
    }
}
