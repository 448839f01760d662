//! Shared helpers for unit tests.

use crate::core::app::App;
use crate::core::config::Config;
use crate::core::persona::Persona;
use crate::core::session::SessionConfig;
use crate::core::transcript::TranscriptStore;
use crate::ui::theme::Theme;

pub fn test_session_config() -> SessionConfig {
    SessionConfig {
        base_url: "https://api.example.test/v1".into(),
        model: "test-model".into(),
        api_key: Some("test-key".into()),
        persona: Persona::guide(),
    }
}

/// App backed by a throwaway transcript directory. Keep the `TempDir`
/// alive for as long as the app persists anything.
pub fn create_test_app() -> (App, tempfile::TempDir) {
    create_test_app_with(test_session_config())
}

pub fn create_test_app_with(session_config: SessionConfig) -> (App, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let transcript = TranscriptStore::at_path(dir.path().join("transcript.json"));
    let app = App::new(
        Config::default(),
        session_config,
        transcript,
        Theme::dark_default(),
        "dark".into(),
    );
    (app, dir)
}
