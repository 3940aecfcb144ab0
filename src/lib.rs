// Library surface shared by the binary and the headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod celebration;
pub mod config;
pub mod difficulty;
pub mod runtime;
pub mod scene;
pub mod session;
pub mod sources;
pub mod ui;
pub mod util;

/// Interval between animation ticks
pub const TICK_RATE_MS: u64 = 100;
