// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod cursor;
pub mod gamepad;
pub mod input;
pub mod profile;
pub mod runtime;
pub mod scene;
pub mod session;
pub mod session_log;
pub mod stats;
pub mod target;
pub mod ui;
pub mod util;

/// Virtual arena dimensions. Terminal cells are mapped onto this space so
/// cursor and target math stay resolution independent.
pub const ARENA_WIDTH: f64 = 1280.0;
pub const ARENA_HEIGHT: f64 = 720.0;

pub const TICK_RATE_MS: u64 = 33;
