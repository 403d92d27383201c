// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Persisted Findings Store
 * JSON findings file kept in sync with the event stream. The whole
 * array is rewritten on every append; consumers read a complete
 * document at any point in time.
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use crate::errors::{SpiderError, SpiderResult};
use crate::types::Finding;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub struct FindingsStore {
    path: PathBuf,
    entries: Vec<Value>,
}

impl FindingsStore {
    /// Open a store, loading any findings already on disk
    pub fn open(path: impl AsRef<Path>) -> SpiderResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str::<Vec<Value>>(&content).unwrap_or_default(),
            Err(_) => Vec::new(),
        };
        Ok(Self { path, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a finding with an ISO-8601 timestamp and rewrite the file
    pub fn append(&mut self, finding: &Finding) -> SpiderResult<()> {
        let mut entry = serde_json::to_value(finding)
            .map_err(|e| SpiderError::Store(format!("serialize finding: {e}")))?;
        if let Some(obj) = entry.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        self.entries.push(entry);

        let serialized = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| SpiderError::Store(format!("serialize findings: {e}")))?;
        fs::write(&self.path, serialized)
            .map_err(|e| SpiderError::Store(format!("write {}: {e}", self.path.display())))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FindingStatus;

    #[test]
    fn test_append_rewrites_full_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("findings.json");

        let mut store = FindingsStore::open(&path).unwrap();
        assert!(store.is_empty());

        let finding = Finding::new(
            "Sensitive File",
            "https://blog.example.com",
            FindingStatus::Accessible,
            "https://blog.example.com/.env",
        );
        store.append(&finding).unwrap();
        store.append(&finding).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["type"], "Sensitive File");
        assert!(parsed[0]["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_open_loads_existing_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("findings.json");
        fs::write(&path, r#"[{"type":"WordPress","status":"Detected"}]"#).unwrap();

        let store = FindingsStore::open(&path).unwrap();
        assert_eq!(store.len(), 1);
    }
}
