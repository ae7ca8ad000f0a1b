//! Core contract for flowbroker message-processing nodes
//!
//! This crate defines the [`DataHandler`] trait every node implements, plus
//! the two utilities it depends on: locale data resolution with fallback and
//! dotted-path access into nested [`Value`] trees.

mod context;
mod error;
mod handler;
pub mod locale;
pub mod path;
mod registry;
pub mod value;

pub use context::{ContextHandler, MemoryContext};
pub use error::{FlowError, HandlerError, RegistryError};
pub use handler::{DataHandler, ExecutionMetadata, HandlerMetadata, HandlerOutput};
pub use locale::{LocaleData, LocaleResolver, DEFAULT_LOCALE};
pub use path::FieldPath;
pub use registry::HandlerRegistry;
pub use value::{Map, Value};

/// Result type for flowbroker operations
pub type Result<T> = std::result::Result<T, FlowError>;
