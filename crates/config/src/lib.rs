//! Configuration for the perch relay.
//!
//! Config is discovered as perch.{toml,yaml,yml,json} (project-local, then
//! ~/.config/perch/), with `${ENV_VAR}` substitution in file values and a
//! final pass of explicit environment overrides so a bare container can run
//! on env vars alone.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, data_dir, discover_and_load, load_config, set_config_dir},
    schema::{AiConfig, GatewayConfig, PanelConfig, PerchConfig, WhatsappConfig},
};
