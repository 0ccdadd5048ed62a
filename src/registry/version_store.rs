use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::{ContextV7, Timestamp, Uuid};

use crate::error::{Error, Result};
use crate::store::{KvStore, key};
use crate::types::{Graph, SchemaIndexEntry, SchemaVersion, Service};

use super::fingerprint;

/// Versioning and indexing logic on top of the key-value backing store.
///
/// The backing store has no conditional-write primitive, so every operation
/// that rewrites a graph's index runs inside that graph's lock: two
/// concurrent pushes to the same graph serialize instead of both reading the
/// pre-update index and losing one append. Within an insert the item write
/// always completes before the index write is attempted.
pub struct SchemaStore {
    kv: Arc<dyn KvStore>,
    graph_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    uid_ctx: Mutex<ContextV7>,
}

impl SchemaStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            graph_locks: Mutex::new(HashMap::new()),
            uid_ctx: Mutex::new(ContextV7::new()),
        }
    }

    /// Pushes a new schema document for a service, making it the active
    /// version and deactivating the prior one.
    ///
    /// A document identical to one already stored for this (graph, service)
    /// is not re-inserted: the existing record is reactivated if needed and
    /// returned with its original `uid`.
    pub fn push(
        &self,
        graph_name: &str,
        service_name: &str,
        version: &str,
        type_defs: &str,
    ) -> Result<SchemaVersion> {
        let lock = self.graph_lock(graph_name);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        self.upsert_graph(graph_name)?;

        let hash = fingerprint(type_defs);
        if let Some(mut existing) = self.service_version_by_hash(graph_name, service_name, &hash)? {
            if !existing.is_active {
                if let Some(mut active) = self.active_version(graph_name, service_name)? {
                    active.is_active = false;
                    active.updated_at = Some(Utc::now());
                    self.save(&active)?;
                }
                existing.is_active = true;
                existing.updated_at = Some(Utc::now());
                self.save(&existing)?;
            }
            return Ok(existing);
        }

        if let Some(mut active) = self.active_version(graph_name, service_name)? {
            active.is_active = false;
            active.updated_at = Some(Utc::now());
            self.save(&active)?;
        }

        self.insert_locked(graph_name, service_name, version, type_defs, true)
    }

    /// Inserts a version without the dedup/deactivation orchestration of
    /// [`push`]. The index entry is appended and the list re-sorted
    /// descending by `uid`.
    pub fn insert(
        &self,
        graph_name: &str,
        service_name: &str,
        version: &str,
        type_defs: &str,
        is_active: bool,
    ) -> Result<SchemaVersion> {
        let lock = self.graph_lock(graph_name);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        self.upsert_graph(graph_name)?;
        self.insert_locked(graph_name, service_name, version, type_defs, is_active)
    }

    /// Direct point lookup by (graph, uid).
    pub fn find(&self, graph_name: &str, uid: &str) -> Result<Option<SchemaVersion>> {
        self.read_json(&key::item(graph_name, uid))
    }

    /// First version in the graph whose document fingerprint matches.
    /// Scans the index newest-first.
    pub fn find_by_hash(&self, graph_name: &str, hash: &str) -> Result<Option<SchemaVersion>> {
        for entry in self.list(graph_name)? {
            if entry.hash == hash {
                return self.require_item(graph_name, &entry.uid).map(Some);
            }
        }
        Ok(None)
    }

    /// The currently active version for a service, if any.
    pub fn find_active(&self, graph_name: &str, service_name: &str) -> Result<Option<SchemaVersion>> {
        self.active_version(graph_name, service_name)
    }

    /// The full index for a graph, newest first. A graph with no recorded
    /// versions yields an empty list, never an error.
    pub fn list(&self, graph_name: &str) -> Result<Vec<SchemaIndexEntry>> {
        Ok(self
            .read_json::<Vec<SchemaIndexEntry>>(&key::owner(graph_name))?
            .unwrap_or_default())
    }

    /// Distinct services recorded for a graph, in index order.
    pub fn list_services(&self, graph_name: &str) -> Result<Vec<Service>> {
        let mut services: Vec<Service> = Vec::new();
        for entry in self.list(graph_name)? {
            if !services.iter().any(|s| s.name == entry.service_name) {
                services.push(Service {
                    name: entry.service_name,
                });
            }
        }
        Ok(services)
    }

    pub fn get_graph(&self, graph_name: &str) -> Result<Option<Graph>> {
        self.read_json(&key::graph(graph_name))
    }

    /// Clears the active flag on a version and stamps `updated_at`.
    pub fn deactivate(&self, graph_name: &str, uid: &str) -> Result<SchemaVersion> {
        let lock = self.graph_lock(graph_name);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut version = self.find(graph_name, uid)?.ok_or(Error::NotFound)?;
        if version.is_active {
            version.is_active = false;
            version.updated_at = Some(Utc::now());
            self.save(&version)?;
        }
        Ok(version)
    }

    /// Deletes a version record and repairs the index in the same critical
    /// section, so no index entry is left pointing at a missing item.
    pub fn remove(&self, graph_name: &str, uid: &str) -> Result<bool> {
        let lock = self.graph_lock(graph_name);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let removed = self.kv.delete(&key::item(graph_name, uid))?;

        let mut index = self.list(graph_name)?;
        let before = index.len();
        index.retain(|entry| entry.uid != uid);
        if index.len() != before {
            self.write_index(graph_name, &index)?;
        }

        Ok(removed)
    }

    fn insert_locked(
        &self,
        graph_name: &str,
        service_name: &str,
        version: &str,
        type_defs: &str,
        is_active: bool,
    ) -> Result<SchemaVersion> {
        let record = SchemaVersion {
            uid: self.next_uid(),
            graph_name: graph_name.to_string(),
            service_name: service_name.to_string(),
            version: version.to_string(),
            is_active,
            hash: fingerprint(type_defs),
            schema_id: self.next_schema_id(graph_name)?,
            type_defs: type_defs.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };

        // Item first. A crash between the two writes leaves a version that
        // is invisible to list/composition, not a dangling index entry.
        self.save(&record)?;

        let mut index = self.list(graph_name)?;
        index.push(SchemaIndexEntry::from(&record));
        index.sort_by(|a, b| b.uid.cmp(&a.uid));
        self.write_index(graph_name, &index)?;

        Ok(record)
    }

    fn active_version(&self, graph_name: &str, service_name: &str) -> Result<Option<SchemaVersion>> {
        for entry in self.list(graph_name)? {
            if entry.service_name != service_name {
                continue;
            }
            let version = self.require_item(graph_name, &entry.uid)?;
            if version.is_active {
                return Ok(Some(version));
            }
        }
        Ok(None)
    }

    fn service_version_by_hash(
        &self,
        graph_name: &str,
        service_name: &str,
        hash: &str,
    ) -> Result<Option<SchemaVersion>> {
        for entry in self.list(graph_name)? {
            if entry.service_name == service_name && entry.hash == hash {
                return self.require_item(graph_name, &entry.uid).map(Some);
            }
        }
        Ok(None)
    }

    fn upsert_graph(&self, graph_name: &str) -> Result<()> {
        if self.get_graph(graph_name)?.is_none() {
            let graph = Graph {
                name: graph_name.to_string(),
                is_active: true,
                created_at: Utc::now(),
            };
            self.write_json(&key::graph(graph_name), &graph)?;
        }
        Ok(())
    }

    fn next_uid(&self) -> String {
        Uuid::new_v7(Timestamp::now(&self.uid_ctx)).to_string()
    }

    fn next_schema_id(&self, graph_name: &str) -> Result<i64> {
        let seq_key = key::sequence(graph_name);
        let current = match self.kv.get(&seq_key)? {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| Error::Storage(format!("corrupt sequence at {seq_key}: {raw}")))?,
            None => 0,
        };
        let next = current + 1;
        self.kv.put(&seq_key, &next.to_string())?;
        Ok(next)
    }

    fn save(&self, version: &SchemaVersion) -> Result<()> {
        self.write_json(&key::item(&version.graph_name, &version.uid), version)
    }

    fn write_index(&self, graph_name: &str, index: &[SchemaIndexEntry]) -> Result<()> {
        self.write_json(&key::owner(graph_name), &index)
    }

    fn require_item(&self, graph_name: &str, uid: &str) -> Result<SchemaVersion> {
        self.find(graph_name, uid)?.ok_or_else(|| {
            Error::Storage(format!(
                "index entry without item record: {}",
                key::item(graph_name, uid)
            ))
        })
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.kv.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| Error::Storage(format!("corrupt record at {key}: {e}"))),
            None => Ok(None),
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)
            .map_err(|e| Error::Storage(format!("failed to encode record at {key}: {e}")))?;
        self.kv.put(key, &raw)
    }

    fn graph_lock(&self, graph_name: &str) -> Arc<Mutex<()>> {
        let mut locks: MutexGuard<'_, _> = self
            .graph_locks
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        locks
            .entry(graph_name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKv;

    fn new_store() -> SchemaStore {
        SchemaStore::new(Arc::new(MemoryKv::new()))
    }

    #[test]
    fn test_list_is_empty_for_unknown_graph() {
        let store = new_store();
        assert!(store.list("nope").unwrap().is_empty());
        assert!(store.list_services("nope").unwrap().is_empty());
    }

    #[test]
    fn test_insert_indexes_newest_first() {
        let store = new_store();

        let first = store
            .insert("g", "accounts", "1", "type Query { a: String }", true)
            .unwrap();
        let second = store
            .insert("g", "accounts", "2", "type Query { b: String }", true)
            .unwrap();

        assert!(second.uid > first.uid, "uids must sort by creation order");

        let index = store.list("g").unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index[0].uid, second.uid);
        assert_eq!(index[1].uid, first.uid);
    }

    #[test]
    fn test_index_completeness_after_sequential_inserts() {
        let store = new_store();

        for i in 0..5 {
            store
                .insert("g", "svc", "1", &format!("type Query {{ f{i}: String }}"), true)
                .unwrap();
        }

        let index = store.list("g").unwrap();
        assert_eq!(index.len(), 5);
        for pair in index.windows(2) {
            assert!(pair[0].uid > pair[1].uid);
        }
        for entry in &index {
            assert!(store.find("g", &entry.uid).unwrap().is_some());
        }
    }

    #[test]
    fn test_schema_id_is_monotonic_per_graph() {
        let store = new_store();

        let a = store.insert("g", "svc", "1", "type Query { a: ID }", true).unwrap();
        let b = store.insert("g", "svc", "2", "type Query { b: ID }", true).unwrap();
        let other = store.insert("h", "svc", "1", "type Query { a: ID }", true).unwrap();

        assert_eq!(a.schema_id, 1);
        assert_eq!(b.schema_id, 2);
        assert_eq!(other.schema_id, 1);
    }

    #[test]
    fn test_push_deactivates_prior_version() {
        let store = new_store();

        let first = store
            .push("g", "accounts", "1", "type Query { hello: String }")
            .unwrap();
        assert!(first.is_active);
        assert!(first.updated_at.is_none());

        let second = store
            .push("g", "accounts", "2", "type Query { hello: String world: String }")
            .unwrap();
        assert!(second.is_active);

        let first = store.find("g", &first.uid).unwrap().unwrap();
        assert!(!first.is_active);
        assert!(first.updated_at.is_some(), "deactivation is a mutation");

        let active = store.find_active("g", "accounts").unwrap().unwrap();
        assert_eq!(active.uid, second.uid);
    }

    #[test]
    fn test_push_dedups_identical_documents() {
        let store = new_store();
        let defs = "type Query { hello: String }";

        let first = store.push("g", "accounts", "1", defs).unwrap();
        let again = store.push("g", "accounts", "2", defs).unwrap();

        assert_eq!(first.uid, again.uid, "duplicate push must not mint a uid");
        assert_eq!(first.hash, again.hash);
        assert_eq!(store.list("g").unwrap().len(), 1);
    }

    #[test]
    fn test_push_reactivates_deduped_version() {
        let store = new_store();
        let old_defs = "type Query { hello: String }";
        let new_defs = "type Query { hello: String world: String }";

        let first = store.push("g", "accounts", "1", old_defs).unwrap();
        store.push("g", "accounts", "2", new_defs).unwrap();

        // Rolling back to the original document reactivates the old record.
        let rolled_back = store.push("g", "accounts", "3", old_defs).unwrap();
        assert_eq!(rolled_back.uid, first.uid);
        assert!(rolled_back.is_active);
        assert!(rolled_back.updated_at.is_some());

        let active = store.find_active("g", "accounts").unwrap().unwrap();
        assert_eq!(active.uid, first.uid);
        assert_eq!(store.list("g").unwrap().len(), 2);
    }

    #[test]
    fn test_dedup_is_scoped_per_service() {
        let store = new_store();
        let defs = "type Shared { id: ID }";

        let a = store.push("g", "svc-a", "1", defs).unwrap();
        let b = store.push("g", "svc-b", "1", defs).unwrap();

        assert_ne!(a.uid, b.uid);
        assert_eq!(a.hash, b.hash);
        assert_eq!(store.list("g").unwrap().len(), 2);
    }

    #[test]
    fn test_find_by_hash_locates_record() {
        let store = new_store();
        let defs = "type Query { hello: String }";

        let pushed = store.push("g", "accounts", "1", defs).unwrap();
        let found = store.find_by_hash("g", &fingerprint(defs)).unwrap().unwrap();
        assert_eq!(found.uid, pushed.uid);

        assert!(store.find_by_hash("g", "feedface").unwrap().is_none());
    }

    #[test]
    fn test_deactivate_leaves_service_without_active_version() {
        let store = new_store();

        let pushed = store.push("g", "accounts", "1", "type Query { a: ID }").unwrap();
        let deactivated = store.deactivate("g", &pushed.uid).unwrap();

        assert!(!deactivated.is_active);
        assert!(store.find_active("g", "accounts").unwrap().is_none());
        // Still listed; deactivation is not removal.
        assert_eq!(store.list("g").unwrap().len(), 1);
    }

    #[test]
    fn test_deactivate_unknown_uid() {
        let store = new_store();
        store.push("g", "accounts", "1", "type Query { a: ID }").unwrap();

        assert!(matches!(
            store.deactivate("g", "no-such-uid"),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn test_remove_repairs_index() {
        let store = new_store();

        let first = store.push("g", "a", "1", "type Query { a: ID }").unwrap();
        let second = store.push("g", "b", "1", "type Query { b: ID }").unwrap();

        assert!(store.remove("g", &first.uid).unwrap());

        let index = store.list("g").unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].uid, second.uid);
        assert!(store.find("g", &first.uid).unwrap().is_none());

        // Removing again reports false and leaves the index untouched.
        assert!(!store.remove("g", &first.uid).unwrap());
        assert_eq!(store.list("g").unwrap().len(), 1);
    }

    #[test]
    fn test_graph_upserted_on_first_push() {
        let store = new_store();
        assert!(store.get_graph("g").unwrap().is_none());

        store.push("g", "accounts", "1", "type Query { a: ID }").unwrap();

        let graph = store.get_graph("g").unwrap().unwrap();
        assert_eq!(graph.name, "g");
        assert!(graph.is_active);
    }

    #[test]
    fn test_list_services_distinct_in_index_order() {
        let store = new_store();

        store.push("g", "accounts", "1", "type Query { a: ID }").unwrap();
        store.push("g", "billing", "1", "type Query { b: ID }").unwrap();
        store.push("g", "accounts", "2", "type Query { a2: ID }").unwrap();

        let services = store.list_services("g").unwrap();
        let names: Vec<_> = services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["accounts", "billing"]);
    }
}
