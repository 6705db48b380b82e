//! Configuration loading, validation and env substitution.
//!
//! Config files: `ircrelay.toml`, `ircrelay.yaml`, `ircrelay.yml` or
//! `ircrelay.json`, searched in `./` then `~/.config/ircrelay/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{config_dir, discover_and_load, find_config_file, load_config},
    schema::{IrcConfig, RelayConfig, WebhookConfig},
    validate::{Diagnostic, Severity, ValidationResult},
};
