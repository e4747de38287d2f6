pub mod charts;
pub mod date_utils;
pub mod error;
pub mod links;
pub mod reactive;

/// Application version from Cargo.toml (single source of truth)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
