use crate::{asset_dir, parse_config, MODULE};
use async_trait::async_trait;
use brokercore::{
    ContextHandler, DataHandler, ExecutionMetadata, FieldPath, HandlerError, HandlerMetadata,
    HandlerOutput, Value,
};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
struct SwitchCase {
    equals: Value,
    port: String,
}

#[derive(Debug, Deserialize)]
struct SwitchConfig {
    field: String,
    #[serde(default)]
    cases: Vec<SwitchCase>,
    #[serde(default)]
    otherwise: Option<String>,
}

/// Routes each message to the port of the first case matching a field.
///
/// When no case matches, the message goes to `otherwise` if configured and
/// is dropped otherwise. A message lacking the field is an error. The number
/// of matched messages per flow is kept in the context under
/// `switch:<flowId>:matched`.
///
/// # Example Configuration
/// ```json
/// {
///   "field": "payload.status",
///   "cases": [
///     { "equals": "alarm", "port": "0" },
///     { "equals": "ok", "port": "1" }
///   ],
///   "otherwise": "2"
/// }
/// ```
pub struct SwitchHandler;

impl SwitchHandler {
    pub fn counter_key(flow_id: &str) -> String {
        format!("switch:{}:matched", flow_id)
    }

    async fn count_match(
        &self,
        flow_id: &str,
        context: &dyn ContextHandler,
    ) -> Result<(), HandlerError> {
        let key = Self::counter_key(flow_id);
        context.update(&key, &increment).await?;
        Ok(())
    }
}

fn increment(current: Option<Value>) -> Value {
    Value::from(current.and_then(|v| v.as_i64()).unwrap_or(0) + 1)
}

#[async_trait]
impl DataHandler for SwitchHandler {
    fn node_representation_path(&self) -> PathBuf {
        asset_dir("switch").join("switch.html")
    }

    fn locales_path(&self) -> PathBuf {
        asset_dir("switch").join("locales")
    }

    fn metadata(&self) -> HandlerMetadata {
        HandlerMetadata::new(MODULE, "switch", env!("CARGO_PKG_VERSION"))
    }

    async fn handle_message(
        &self,
        config: &Value,
        message: &Value,
        metadata: &ExecutionMetadata,
        context: &dyn ContextHandler,
    ) -> Result<HandlerOutput, HandlerError> {
        let config: SwitchConfig = parse_config(config)?;
        let actual = FieldPath::parse(&config.field)?.get(message)?;

        let matched = config.cases.iter().find(|case| &case.equals == actual);
        let port = match matched {
            Some(case) => {
                self.count_match(&metadata.flow_id, context).await?;
                Some(case.port.clone())
            }
            None => config.otherwise.clone(),
        };

        tracing::debug!(
            flow_id = %metadata.flow_id,
            field = %config.field,
            port = ?port,
            "Routed message"
        );

        let mut output = HandlerOutput::new();
        if let Some(port) = port {
            output.push(port, message.clone());
        }
        Ok(output)
    }

    fn validate_config(&self, config: &Value) -> Result<(), HandlerError> {
        let config: SwitchConfig = parse_config(config)?;
        FieldPath::parse(&config.field)?;
        if config.cases.is_empty() && config.otherwise.is_none() {
            return Err(HandlerError::Configuration(
                "switch needs at least one case or an 'otherwise' port".to_string(),
            ));
        }
        Ok(())
    }
}
