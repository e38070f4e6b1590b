//! Run-scoped knowledge store: goal -> synthesized investigation result.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A section asked for knowledge that no earlier goal produced.
///
/// This signals a goal-ordering problem, not a transient model failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing knowledge for `{key}` (was it investigated before this document?)")]
pub struct MissingKnowledgeError {
    pub key: String,
}

/// An entry for this key already exists; the store is append-only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("knowledge for `{key}` already recorded")]
pub struct DuplicateKnowledgeError {
    pub key: String,
}

/// Append-only mapping from goal to investigation result, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeStore {
    entries: Vec<(String, String)>,
}

impl KnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DuplicateKnowledgeError> {
        let key = key.into();
        if self.contains(&key) {
            return Err(DuplicateKnowledgeError { key });
        }
        self.entries.push((key, value.into()));
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All keys, in insertion order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Look up every key, failing on the first one that is absent.
    pub fn lookup_all<'a>(&'a self, keys: &[&str]) -> Result<Vec<&'a str>, MissingKnowledgeError> {
        keys.iter()
            .map(|key| {
                self.get(key).ok_or_else(|| MissingKnowledgeError {
                    key: key.to_string(),
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for KnowledgeStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_lookup_in_order() {
        let mut store = KnowledgeStore::new();
        store.insert("b goal", "B").expect("insert");
        store.insert("a goal", "A").expect("insert");

        assert_eq!(store.keys(), vec!["b goal", "a goal"]);
        assert_eq!(store.lookup_all(&["a goal"]).expect("lookup"), vec!["A"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn rejects_overwrite() {
        let mut store = KnowledgeStore::new();
        store.insert("goal", "first").expect("insert");
        let err = store.insert("goal", "second").unwrap_err();
        assert_eq!(err.key, "goal");
        assert_eq!(store.get("goal"), Some("first"));
    }

    #[test]
    fn missing_key_is_reported() {
        let mut store = KnowledgeStore::new();
        store.insert("known", "value").expect("insert");
        let err = store.lookup_all(&["known", "unknown"]).unwrap_err();
        assert_eq!(err.key, "unknown");
    }

    #[test]
    fn snapshot_preserves_insertion_order() {
        let mut store = KnowledgeStore::new();
        store.insert("zeta", "1").expect("insert");
        store.insert("alpha", "2").expect("insert");
        let json = serde_json::to_string(&store).expect("serialize");
        assert_eq!(json, r#"{"zeta":"1","alpha":"2"}"#);
    }
}
