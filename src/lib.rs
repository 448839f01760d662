//! Sherpa is a terminal-first chat client for a streaming career-guidance
//! assistant.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation state: the message store and its
//!   persistence, the chat session, streaming orchestration, and the
//!   typewriter that paces reply text onto the screen.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loop that drives user input and display updates.
//! - [`api`] defines the chat-completion payloads exchanged with the
//!   remote endpoint.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::run`], which initializes configuration and
//! dispatches into [`ui::chat_loop`] for the interactive session.

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
