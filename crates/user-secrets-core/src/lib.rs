//! user-secrets core - platform detection and path rules
//!
//! The store location for a project's secrets is a pure function of the
//! platform and a handful of environment lookups, so both are modelled as
//! values here instead of being queried implicitly.

pub mod paths;
pub mod platform;

pub use paths::{store_base, store_path, Paths, STORE_FILE_NAME};
pub use platform::{Environment, MapEnvironment, Platform, SystemEnvironment};
