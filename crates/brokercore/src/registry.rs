use crate::{DataHandler, HandlerMetadata, RegistryError};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of handler implementations, keyed by metadata id.
///
/// Ids are resolved once, at registration time.
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn DataHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under its metadata id.
    pub fn register(&mut self, handler: Arc<dyn DataHandler>) -> Result<(), RegistryError> {
        let metadata = handler.metadata();
        validate_metadata(&metadata)?;

        if self.handlers.contains_key(&metadata.id) {
            return Err(RegistryError::DuplicateHandler(metadata.id));
        }

        tracing::info!(
            id = %metadata.id,
            version = %metadata.version,
            "Registering handler"
        );
        self.handlers.insert(metadata.id, handler);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Arc<dyn DataHandler>, RegistryError> {
        self.handlers
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownHandler(id.to_string()))
    }

    /// Registered ids, sorted.
    pub fn list_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.handlers.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn metadata(&self, id: &str) -> Option<HandlerMetadata> {
        self.handlers.get(id).map(|h| h.metadata())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_metadata(metadata: &HandlerMetadata) -> Result<(), RegistryError> {
    let fields = [
        ("id", &metadata.id),
        ("name", &metadata.name),
        ("module", &metadata.module),
        ("version", &metadata.version),
    ];
    if let Some((field, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(RegistryError::InvalidMetadata {
            id: metadata.id.clone(),
            reason: format!("'{}' is empty", field),
        });
    }

    let conventional = format!("{}/{}", metadata.module, metadata.name);
    if metadata.id != conventional {
        tracing::warn!(
            id = %metadata.id,
            expected = %conventional,
            "Handler id does not follow the module/name convention"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContextHandler, ExecutionMetadata, HandlerError, HandlerOutput, Value};
    use async_trait::async_trait;
    use std::path::PathBuf;

    struct Fixed(HandlerMetadata);

    #[async_trait]
    impl DataHandler for Fixed {
        fn node_representation_path(&self) -> PathBuf {
            PathBuf::from("fixed.html")
        }

        fn locales_path(&self) -> PathBuf {
            PathBuf::from("locales")
        }

        fn metadata(&self) -> HandlerMetadata {
            self.0.clone()
        }

        async fn handle_message(
            &self,
            _config: &Value,
            message: &Value,
            _metadata: &ExecutionMetadata,
            _context: &dyn ContextHandler,
        ) -> Result<HandlerOutput, HandlerError> {
            Ok(HandlerOutput::new().with_message("0", message.clone()))
        }
    }

    fn fixed(module: &str, name: &str) -> Arc<dyn DataHandler> {
        Arc::new(Fixed(HandlerMetadata::new(module, name, "1.0.0")))
    }

    #[test]
    fn registers_and_resolves_by_id() {
        let mut registry = HandlerRegistry::new();
        registry.register(fixed("demo", "b")).unwrap();
        registry.register(fixed("demo", "a")).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.list_ids(), vec!["demo/a", "demo/b"]);
        assert_eq!(registry.get("demo/a").unwrap().metadata().name, "a");
        assert_eq!(registry.metadata("demo/b").unwrap().version, "1.0.0");
    }

    #[test]
    fn rejects_duplicates() {
        let mut registry = HandlerRegistry::new();
        registry.register(fixed("demo", "a")).unwrap();
        assert_eq!(
            registry.register(fixed("demo", "a")),
            Err(RegistryError::DuplicateHandler("demo/a".to_string()))
        );
    }

    #[test]
    fn rejects_empty_metadata_fields() {
        let mut registry = HandlerRegistry::new();
        let err = registry.register(fixed("demo", "")).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidMetadata { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn unknown_id_is_an_error() {
        let registry = HandlerRegistry::default();
        assert!(matches!(
            registry.get("nope"),
            Err(RegistryError::UnknownHandler(id)) if id == "nope"
        ));
    }
}
