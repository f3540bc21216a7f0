// Library for tests to access modules

pub mod collector;
pub mod config;
pub mod error;
pub mod models;
pub mod ports;
pub mod processes;
pub mod routes;
pub mod snapshot;
pub mod version;

pub use error::{CollectError, Source};
pub use snapshot::{SnapshotBuilder, SnapshotOptions};
