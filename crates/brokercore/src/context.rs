use crate::{HandlerError, Value};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Flow-scoped state supplied by the orchestrator on every invocation.
///
/// Handlers keep no state of their own; anything that must outlive a single
/// message goes through this capability. Its storage and locking belong to
/// the orchestrator.
#[async_trait]
pub trait ContextHandler: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, HandlerError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), HandlerError>;

    async fn remove(&self, key: &str) -> Result<Option<Value>, HandlerError>;

    /// Replace the value under `key` with `f(current)` as one atomic step and
    /// return the stored result. No other write to `key` may land between
    /// the read and the write.
    async fn update(
        &self,
        key: &str,
        f: &(dyn Fn(Option<Value>) -> Value + Send + Sync),
    ) -> Result<Value, HandlerError>;
}

/// In-process context store, used by tests and the CLI.
#[derive(Debug, Clone, Default)]
pub struct MemoryContext {
    data: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything currently stored.
    pub async fn snapshot(&self) -> HashMap<String, Value> {
        self.data.read().await.clone()
    }
}

#[async_trait]
impl ContextHandler for MemoryContext {
    async fn get(&self, key: &str) -> Result<Option<Value>, HandlerError> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), HandlerError> {
        self.data.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<Option<Value>, HandlerError> {
        Ok(self.data.write().await.remove(key))
    }

    async fn update(
        &self,
        key: &str,
        f: &(dyn Fn(Option<Value>) -> Value + Send + Sync),
    ) -> Result<Value, HandlerError> {
        let mut data = self.data.write().await;
        let next = f(data.remove(key));
        data.insert(key.to_string(), next.clone());
        Ok(next)
    }
}
