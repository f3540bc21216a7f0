// Crate identity, baked in at compile time

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const NAME: &str = env!("CARGO_PKG_NAME");

/// "name/version", e.g. for the root route and startup log.
pub fn banner() -> String {
    format!("{}/{}", NAME, VERSION)
}
