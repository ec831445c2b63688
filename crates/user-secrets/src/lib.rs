//! user-secrets - open a .NET project's local secrets store
//!
//! ASP.NET Core and the generic host read development secrets from a
//! `secrets.json` kept outside the source tree, keyed by the project's
//! `UserSecretsId`. This tool finds that id in the project file, adds one
//! when the project has none, and makes sure the store file exists so it
//! can be opened straight away.

pub mod config;
pub mod editor;
pub mod error;
pub mod identifier;
pub mod locator;
pub mod manifest;
pub mod store;

pub use config::Config;
pub use error::{Result, SecretsError};
pub use locator::{discover_manifest, Locator, Resolution};
pub use manifest::Manifest;
