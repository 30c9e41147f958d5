// Library surface for headless/integration tests and reuse.
// The binary in main.rs only adds argument parsing and the terminal loop.
pub mod app_dirs;
pub mod calories;
pub mod config;
pub mod controller;
pub mod custom;
pub mod feedback;
pub mod generator;
pub mod library;
pub mod logging;
pub mod progress;
pub mod prompt;
pub mod resolver;
pub mod runtime;
pub mod session;
pub mod ui;
pub mod util;
pub mod workout;
