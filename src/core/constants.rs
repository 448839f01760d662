//! Shared constants used across the application

use std::time::Duration;

/// Pause between word reveals while a reply is being typed onto the screen.
/// This must match what the typewriter schedules so the event loop can
/// sleep exactly until the next reveal is due.
pub const REVEAL_INTERVAL: Duration = Duration::from_millis(85);

/// Chat endpoint used when neither the config file nor the environment
/// overrides it.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Sampling defaults for the guide persona.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_P: f32 = 0.9;

/// File name of the persisted conversation inside the data directory.
pub const TRANSCRIPT_FILE: &str = "transcript.json";
