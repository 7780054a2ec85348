pub mod config;

/// Version string baked in at build time (git describe, falling back to the
/// crate version).
pub const VERSION: &str = env!("TERMNAV_VERSION");
