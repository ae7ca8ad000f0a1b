use crate::{asset_dir, parse_config, MODULE};
use async_trait::async_trait;
use brokercore::{
    ContextHandler, DataHandler, ExecutionMetadata, FieldPath, HandlerError, HandlerMetadata,
    HandlerOutput, Value,
};
use serde::Deserialize;
use std::path::PathBuf;

/// A single field operation applied to the message.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ChangeRule {
    /// Write a literal value.
    Set { field: String, value: Value },
    /// Duplicate a field; the source must exist.
    Copy { from: String, to: String },
    /// Like `Copy`, then remove the source.
    Move { from: String, to: String },
    Delete { field: String },
}

#[derive(Debug, Deserialize)]
struct ChangeConfig {
    #[serde(default)]
    rules: Vec<ChangeRule>,
}

impl ChangeConfig {
    fn check_paths(&self) -> Result<(), HandlerError> {
        for rule in &self.rules {
            match rule {
                ChangeRule::Set { field, .. } | ChangeRule::Delete { field } => {
                    FieldPath::parse(field)?;
                }
                ChangeRule::Copy { from, to } | ChangeRule::Move { from, to } => {
                    FieldPath::parse(from)?;
                    FieldPath::parse(to)?;
                }
            }
        }
        Ok(())
    }
}

/// Rewrites message fields according to an ordered list of rules.
///
/// # Ports
/// - Output: "0" - The rewritten message
///
/// # Example Configuration
/// ```json
/// {
///   "rules": [
///     { "action": "set", "field": "payload.unit", "value": "celsius" },
///     { "action": "move", "from": "payload.temp", "to": "payload.reading.value" },
///     { "action": "delete", "field": "debug" }
///   ]
/// }
/// ```
pub struct ChangeHandler;

impl ChangeHandler {
    fn apply(&self, rule: &ChangeRule, message: &mut Value) -> Result<(), HandlerError> {
        match rule {
            ChangeRule::Set { field, value } => self.set_field(field, value.clone(), message),
            ChangeRule::Copy { from, to } => {
                let value = self.get_field(from, message)?.clone();
                self.set_field(to, value, message)
            }
            ChangeRule::Move { from, to } => {
                let value = FieldPath::parse(from)?.remove(message)?;
                self.set_field(to, value, message)
            }
            ChangeRule::Delete { field } => {
                FieldPath::parse(field)?.remove(message)?;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl DataHandler for ChangeHandler {
    fn node_representation_path(&self) -> PathBuf {
        asset_dir("change").join("change.html")
    }

    fn locales_path(&self) -> PathBuf {
        asset_dir("change").join("locales")
    }

    fn metadata(&self) -> HandlerMetadata {
        HandlerMetadata::new(MODULE, "change", env!("CARGO_PKG_VERSION"))
    }

    async fn handle_message(
        &self,
        config: &Value,
        message: &Value,
        metadata: &ExecutionMetadata,
        _context: &dyn ContextHandler,
    ) -> Result<HandlerOutput, HandlerError> {
        let config: ChangeConfig = parse_config(config)?;

        let mut changed = message.clone();
        for rule in &config.rules {
            self.apply(rule, &mut changed)?;
        }

        tracing::debug!(
            flow_id = %metadata.flow_id,
            rules = config.rules.len(),
            "Applied change rules"
        );

        Ok(HandlerOutput::new().with_message("0", changed))
    }

    fn validate_config(&self, config: &Value) -> Result<(), HandlerError> {
        parse_config::<ChangeConfig>(config)?.check_paths()
    }
}
