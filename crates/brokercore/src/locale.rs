//! Locale data lookup with a requested → default → empty fallback chain.
//!
//! Locale files live at `<locales-dir>/<locale-code>.json` and hold a JSON
//! object mapping translation keys to strings or nested objects. Files are
//! parsed once per process and shared afterwards.

use crate::value::Map;
use crate::Value;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Locale used when the caller does not name a fallback.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Parsed locale files keyed by absolute path.
static LOCALE_CACHE: Lazy<RwLock<HashMap<PathBuf, Arc<LocaleData>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Translation table for one resolved locale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleData(Map);

impl LocaleData {
    pub fn new(entries: Map) -> Self {
        Self(entries)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a translated string, descending into nested tables on dots.
    ///
    /// A top-level key containing dots wins over a nested lookup.
    pub fn translate(&self, key: &str) -> Option<&str> {
        if let Some(value) = self.0.get(key) {
            return value.as_str();
        }

        let mut segments = key.split('.');
        let mut at = self.0.get(segments.next()?)?;
        for segment in segments {
            at = at.as_object()?.get(segment)?;
        }
        at.as_str()
    }

    pub fn entries(&self) -> &Map {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<LocaleData> for Value {
    fn from(data: LocaleData) -> Self {
        Value::Object(data.0)
    }
}

/// Resolves locale files from a single locales directory.
#[derive(Debug, Clone)]
pub struct LocaleResolver {
    locales_path: PathBuf,
}

impl LocaleResolver {
    pub fn new(locales_path: impl Into<PathBuf>) -> Self {
        Self {
            locales_path: locales_path.into(),
        }
    }

    pub fn locales_path(&self) -> &Path {
        &self.locales_path
    }

    /// Files tried, in order, for `locale` with `default_locale` as fallback.
    ///
    /// Codes that could escape the locales directory are left out.
    pub fn candidates(&self, locale: &str, default_locale: &str) -> Vec<PathBuf> {
        let mut candidates: Vec<PathBuf> = Vec::with_capacity(2);
        for code in [locale, default_locale] {
            if !is_locale_code(code) {
                tracing::warn!(locale = %code, "Ignoring malformed locale code");
                continue;
            }
            let path = self.locales_path.join(format!("{}.json", code));
            if !candidates.contains(&path) {
                candidates.push(path);
            }
        }
        candidates
    }

    /// Resolve locale data. Never fails: when neither the requested nor the
    /// default locale can be loaded the result is empty.
    pub async fn resolve(&self, locale: &str, default_locale: &str) -> Arc<LocaleData> {
        for candidate in self.candidates(locale, default_locale) {
            if let Some(data) = load(&candidate).await {
                tracing::debug!(
                    locale = %locale,
                    file = %candidate.display(),
                    "Resolved locale data"
                );
                return data;
            }
        }

        tracing::debug!(
            locale = %locale,
            default_locale = %default_locale,
            dir = %self.locales_path.display(),
            "No locale file found, using empty locale data"
        );
        Arc::new(LocaleData::default())
    }
}

async fn load(path: &Path) -> Option<Arc<LocaleData>> {
    let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    if let Some(cached) = LOCALE_CACHE.read().await.get(&key) {
        return Some(Arc::clone(cached));
    }

    let bytes = match tokio::fs::read(&key).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(file = %key.display(), error = %e, "Failed to read locale file");
            return None;
        }
    };

    let data: LocaleData = match serde_json::from_slice(&bytes) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(file = %key.display(), error = %e, "Locale file is not a JSON object");
            return None;
        }
    };

    let mut cache = LOCALE_CACHE.write().await;
    let entry = cache.entry(key).or_insert_with(|| Arc::new(data));
    Some(Arc::clone(entry))
}

fn is_locale_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_follow_requested_then_default() {
        let resolver = LocaleResolver::new("/locales");
        assert_eq!(
            resolver.candidates("pt-BR", "en-US"),
            vec![
                PathBuf::from("/locales/pt-BR.json"),
                PathBuf::from("/locales/en-US.json")
            ]
        );
    }

    #[test]
    fn candidates_are_deduplicated() {
        let resolver = LocaleResolver::new("/locales");
        assert_eq!(
            resolver.candidates("en-US", "en-US"),
            vec![PathBuf::from("/locales/en-US.json")]
        );
    }

    #[test]
    fn traversal_codes_are_skipped() {
        let resolver = LocaleResolver::new("/locales");
        assert_eq!(
            resolver.candidates("../secrets", "en-US"),
            vec![PathBuf::from("/locales/en-US.json")]
        );
        assert!(resolver.candidates("", "a/b").is_empty());
    }

    #[test]
    fn translate_walks_nested_tables() {
        let data: LocaleData = serde_json::from_str(
            r#"{"change": {"label": {"rules": "Rules"}}, "flat.key": "Flat", "count": 3}"#,
        )
        .unwrap();

        assert_eq!(data.translate("change.label.rules"), Some("Rules"));
        assert_eq!(data.translate("flat.key"), Some("Flat"));
        assert_eq!(data.translate("change.label"), None);
        assert_eq!(data.translate("count"), None);
        assert_eq!(data.translate("missing.key"), None);
    }
}
