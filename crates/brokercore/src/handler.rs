use crate::locale::{LocaleData, LocaleResolver, DEFAULT_LOCALE};
use crate::{path, ContextHandler, HandlerError, Value};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Contract every pluggable message-processing node implements.
///
/// The orchestrator reads the static parts (`metadata`, asset paths) once
/// and then calls [`DataHandler::handle_message`] for each inbound message.
/// Handlers take `&self` only and must not keep per-message state; anything
/// that outlives a call goes through the [`ContextHandler`].
///
/// A complete implementation:
///
/// ```
/// use async_trait::async_trait;
/// use brokercore::{
///     ContextHandler, DataHandler, ExecutionMetadata, HandlerError, HandlerMetadata, HandlerOutput,
///     Value,
/// };
/// use std::path::PathBuf;
///
/// struct Echo;
///
/// #[async_trait]
/// impl DataHandler for Echo {
///     fn node_representation_path(&self) -> PathBuf { PathBuf::from("echo.html") }
///     fn locales_path(&self) -> PathBuf { PathBuf::from("locales") }
///     fn metadata(&self) -> HandlerMetadata { HandlerMetadata::new("demo", "echo", "0.1.0") }
///     async fn handle_message(
///         &self,
///         _config: &Value,
///         message: &Value,
///         _metadata: &ExecutionMetadata,
///         _context: &dyn ContextHandler,
///     ) -> Result<HandlerOutput, HandlerError> {
///         Ok(HandlerOutput::new().with_message("0", message.clone()))
///     }
/// }
/// ```
///
/// Leaving out any required operation is a compile error. Without
/// `node_representation_path`:
///
/// ```compile_fail
/// use async_trait::async_trait;
/// use brokercore::{
///     ContextHandler, DataHandler, ExecutionMetadata, HandlerError, HandlerMetadata, HandlerOutput,
///     Value,
/// };
/// use std::path::PathBuf;
///
/// struct Echo;
///
/// #[async_trait]
/// impl DataHandler for Echo {
///     fn locales_path(&self) -> PathBuf { PathBuf::from("locales") }
///     fn metadata(&self) -> HandlerMetadata { HandlerMetadata::new("demo", "echo", "0.1.0") }
///     async fn handle_message(
///         &self,
///         _config: &Value,
///         message: &Value,
///         _metadata: &ExecutionMetadata,
///         _context: &dyn ContextHandler,
///     ) -> Result<HandlerOutput, HandlerError> {
///         Ok(HandlerOutput::new().with_message("0", message.clone()))
///     }
/// }
/// ```
///
/// Without `locales_path`:
///
/// ```compile_fail
/// use async_trait::async_trait;
/// use brokercore::{
///     ContextHandler, DataHandler, ExecutionMetadata, HandlerError, HandlerMetadata, HandlerOutput,
///     Value,
/// };
/// use std::path::PathBuf;
///
/// struct Echo;
///
/// #[async_trait]
/// impl DataHandler for Echo {
///     fn node_representation_path(&self) -> PathBuf { PathBuf::from("echo.html") }
///     fn metadata(&self) -> HandlerMetadata { HandlerMetadata::new("demo", "echo", "0.1.0") }
///     async fn handle_message(
///         &self,
///         _config: &Value,
///         message: &Value,
///         _metadata: &ExecutionMetadata,
///         _context: &dyn ContextHandler,
///     ) -> Result<HandlerOutput, HandlerError> {
///         Ok(HandlerOutput::new().with_message("0", message.clone()))
///     }
/// }
/// ```
///
/// Without `metadata`:
///
/// ```compile_fail
/// use async_trait::async_trait;
/// use brokercore::{
///     ContextHandler, DataHandler, ExecutionMetadata, HandlerError, HandlerMetadata, HandlerOutput,
///     Value,
/// };
/// use std::path::PathBuf;
///
/// struct Echo;
///
/// #[async_trait]
/// impl DataHandler for Echo {
///     fn node_representation_path(&self) -> PathBuf { PathBuf::from("echo.html") }
///     fn locales_path(&self) -> PathBuf { PathBuf::from("locales") }
///     async fn handle_message(
///         &self,
///         _config: &Value,
///         message: &Value,
///         _metadata: &ExecutionMetadata,
///         _context: &dyn ContextHandler,
///     ) -> Result<HandlerOutput, HandlerError> {
///         Ok(HandlerOutput::new().with_message("0", message.clone()))
///     }
/// }
/// ```
///
/// Without `handle_message`:
///
/// ```compile_fail
/// use async_trait::async_trait;
/// use brokercore::{
///     ContextHandler, DataHandler, ExecutionMetadata, HandlerError, HandlerMetadata, HandlerOutput,
///     Value,
/// };
/// use std::path::PathBuf;
///
/// struct Echo;
///
/// #[async_trait]
/// impl DataHandler for Echo {
///     fn node_representation_path(&self) -> PathBuf { PathBuf::from("echo.html") }
///     fn locales_path(&self) -> PathBuf { PathBuf::from("locales") }
///     fn metadata(&self) -> HandlerMetadata { HandlerMetadata::new("demo", "echo", "0.1.0") }
/// }
/// ```
#[async_trait]
pub trait DataHandler: Send + Sync {
    /// Location of the node's visual representation asset (HTML).
    fn node_representation_path(&self) -> PathBuf;

    /// Directory holding `<locale>.json` files for this node.
    fn locales_path(&self) -> PathBuf;

    /// Static identity of the node type. Also used as a liveliness check.
    fn metadata(&self) -> HandlerMetadata;

    /// Locale data for `locale`, falling back to [`DEFAULT_LOCALE`].
    async fn locale_data(&self, locale: &str) -> Arc<LocaleData> {
        self.locale_data_or(locale, DEFAULT_LOCALE).await
    }

    /// Locale data for `locale`, falling back to `default_locale`, then to
    /// an empty table.
    async fn locale_data_or(&self, locale: &str, default_locale: &str) -> Arc<LocaleData> {
        LocaleResolver::new(self.locales_path())
            .resolve(locale, default_locale)
            .await
    }

    /// Process a single message with the given node configuration.
    ///
    /// `metadata` describes the execution (tenant, flow, originating device).
    /// On success the outputs are keyed by output port; a port may carry any
    /// number of messages, and no output at all is valid. Failures are
    /// returned to the orchestrator, which decides whether to retry.
    async fn handle_message(
        &self,
        config: &Value,
        message: &Value,
        metadata: &ExecutionMetadata,
        context: &dyn ContextHandler,
    ) -> Result<HandlerOutput, HandlerError>;

    /// Validate a node configuration before any message reaches it.
    fn validate_config(&self, _config: &Value) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Read the field named by a dotted path.
    fn get_field<'a>(&self, field: &str, target: &'a Value) -> Result<&'a Value, HandlerError> {
        path::get(field, target)
    }

    /// Write the field named by a dotted path, creating parents as needed.
    fn set_field(&self, field: &str, value: Value, target: &mut Value) -> Result<(), HandlerError> {
        path::set(field, value, target)
    }
}

/// Identity and version of a node type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerMetadata {
    /// Unique, human-readable; by convention `"<module>/<name>"`.
    pub id: String,
    pub name: String,
    pub module: String,
    pub version: String,
}

impl HandlerMetadata {
    /// Build metadata whose id follows the `module/name` convention.
    pub fn new(module: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        let module = module.into();
        let name = name.into();
        Self {
            id: format!("{}/{}", module, name),
            name,
            module,
            version: version.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// Per-invocation execution metadata supplied by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionMetadata {
    pub tenant: String,
    pub flow_id: String,
    pub originator_device_id: String,

    /// Any further keys the orchestrator attaches.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl ExecutionMetadata {
    pub fn new(
        tenant: impl Into<String>,
        flow_id: impl Into<String>,
        originator_device_id: impl Into<String>,
    ) -> Self {
        Self {
            tenant: tenant.into(),
            flow_id: flow_id.into(),
            originator_device_id: originator_device_id.into(),
            extra: HashMap::new(),
        }
    }
}

/// Outbound messages produced by one `handle_message` call, per output port.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerOutput {
    pub ports: HashMap<String, Vec<Value>>,
}

impl HandlerOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, port: impl Into<String>, message: impl Into<Value>) -> Self {
        self.push(port, message);
        self
    }

    /// Append a message to `port`, keeping emission order.
    pub fn push(&mut self, port: impl Into<String>, message: impl Into<Value>) {
        self.ports.entry(port.into()).or_default().push(message.into());
    }

    /// Messages emitted on `port`; empty when the port got nothing.
    pub fn messages(&self, port: &str) -> &[Value] {
        self.ports.get(port).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn message_count(&self) -> usize {
        self.ports.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.message_count() == 0
    }
}
