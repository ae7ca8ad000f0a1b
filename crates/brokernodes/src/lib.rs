//! Standard handler library
//!
//! Built-in flowbroker nodes. Each node ships its HTML representation and
//! locale files under `assets/<name>/`.

mod change;
mod switch;

pub use change::{ChangeHandler, ChangeRule};
pub use switch::SwitchHandler;

use brokercore::{HandlerError, HandlerRegistry, RegistryError, Value};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::Arc;

/// Module name shared by every handler in this crate.
pub const MODULE: &str = "flowbroker";

/// Register all standard handlers with a registry
pub fn register_all(registry: &mut HandlerRegistry) -> Result<(), RegistryError> {
    registry.register(Arc::new(ChangeHandler))?;
    registry.register(Arc::new(SwitchHandler))?;
    Ok(())
}

pub(crate) fn asset_dir(node: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets").join(node)
}

/// Decode a node configuration into its typed form.
pub(crate) fn parse_config<T: DeserializeOwned>(config: &Value) -> Result<T, HandlerError> {
    serde_json::from_value(serde_json::Value::from(config.clone()))
        .map_err(|e| HandlerError::Configuration(e.to_string()))
}
