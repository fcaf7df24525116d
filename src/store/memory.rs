//! In-process document store.
//!
//! Data file layout:
//!
//! ```json
//! { "shop": { "orders": [ { "_id": "o1", "total": 12 } ], "customers": [] } }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use log::{debug, info};
use serde_json::{Map, Value, json};

use super::{
    DatabaseInfo, DocumentPage, DocumentStore, Namespace, Query, StoreError, json_kind,
};

type Collections = BTreeMap<String, Vec<Value>>;

pub struct MemoryStore {
    name: String,
    databases: RwLock<BTreeMap<String, Collections>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            databases: RwLock::new(BTreeMap::new()),
        }
    }

    /// Build a store from a `{ db: { collection: [docs] } }` value.
    pub fn from_value(name: impl Into<String>, value: Value) -> Result<Self, StoreError> {
        let Value::Object(dbs) = value else {
            return Err(StoreError::InvalidDocument(format!(
                "data root must be an object, got {}",
                json_kind(&value)
            )));
        };

        let mut databases = BTreeMap::new();
        for (db_name, collections) in dbs {
            let Value::Object(collections) = collections else {
                return Err(StoreError::InvalidDocument(format!(
                    "database '{db_name}' must map collection names to arrays"
                )));
            };
            let mut colls = Collections::new();
            for (coll_name, docs) in collections {
                let Value::Array(docs) = docs else {
                    return Err(StoreError::InvalidDocument(format!(
                        "collection '{db_name}.{coll_name}' must be an array"
                    )));
                };
                colls.insert(coll_name, docs);
            }
            databases.insert(db_name, colls);
        }

        Ok(Self {
            name: name.into(),
            databases: RwLock::new(databases),
        })
    }

    /// Load a JSON data file.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let contents = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&contents)?;
        let store = Self::from_value(path.display().to_string(), value)?;
        info!("Loaded data file {}", path.display());
        Ok(store)
    }

    /// Small sample dataset used when no data file is configured.
    pub fn demo() -> Self {
        let data = json!({
            "shop": {
                "customers": [
                    { "_id": "c1", "name": "Ada Lovelace", "email": "ada@example.com",
                      "tier": "gold" },
                    { "_id": "c2", "name": "Alan Turing", "email": "alan@example.com",
                      "tier": "silver" },
                    { "_id": "c3", "name": "Grace Hopper", "email": "grace@example.com",
                      "tier": "gold" }
                ],
                "orders": [
                    { "_id": "o1", "customer": "c1", "status": "shipped", "total": 42.5,
                      "items": [ { "sku": "kbd-01", "qty": 1 } ] },
                    { "_id": "o2", "customer": "c2", "status": "pending", "total": 12.0,
                      "items": [ { "sku": "mouse-02", "qty": 2 } ] },
                    { "_id": "o3", "customer": "c1", "status": "pending", "total": 99.9,
                      "items": [ { "sku": "mon-27", "qty": 1 } ] }
                ]
            },
            "logs": {
                "events": [
                    { "_id": "e1", "level": "info", "msg": "service started",
                      "meta": { "host": "api-1" } },
                    { "_id": "e2", "level": "warn", "msg": "slow query",
                      "meta": { "host": "api-2" } }
                ]
            }
        });
        // The literal above is always a well-formed data root.
        Self::from_value("demo", data).unwrap_or_else(|_| Self::new("demo"))
    }

    fn with_collection<T>(
        &self,
        namespace: &Namespace,
        f: impl FnOnce(&mut Vec<Value>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut databases = self.databases.write().unwrap_or_else(PoisonError::into_inner);
        let docs = databases
            .get_mut(&namespace.database)
            .and_then(|colls| colls.get_mut(&namespace.collection))
            .ok_or_else(|| StoreError::NotFound(namespace.to_string()))?;
        f(docs)
    }
}

/// Look up a dotted path (`meta.host`) inside a document.
fn field<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |value, segment| value.as_object()?.get(segment))
}

fn matches_filter(document: &Value, filter: &Map<String, Value>) -> bool {
    filter
        .iter()
        .all(|(path, expected)| field(document, path) == Some(expected))
}

fn check_collection_name(namespace: &Namespace) -> Result<(), StoreError> {
    let names = [&namespace.database, &namespace.collection];
    if names.iter().any(|name| name.trim().is_empty()) {
        return Err(StoreError::InvalidName(format!("'{namespace}' has an empty part")));
    }
    if names.iter().any(|name| name.contains('$')) {
        return Err(StoreError::InvalidName(format!("'{namespace}' contains '$'")));
    }
    Ok(())
}

fn document_id(document: &Value) -> Result<&Value, StoreError> {
    document
        .get("_id")
        .ok_or_else(|| StoreError::InvalidDocument("document has no _id".to_string()))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>, StoreError> {
        let databases = self.databases.read().unwrap_or_else(PoisonError::into_inner);
        Ok(databases
            .iter()
            .map(|(name, colls)| DatabaseInfo {
                name: name.clone(),
                collections: colls.keys().cloned().collect(),
            })
            .collect())
    }

    async fn find(&self, query: &Query) -> Result<DocumentPage, StoreError> {
        let databases = self.databases.read().unwrap_or_else(PoisonError::into_inner);
        let docs = databases
            .get(&query.namespace.database)
            .and_then(|colls| colls.get(&query.namespace.collection))
            .ok_or_else(|| StoreError::NotFound(query.namespace.to_string()))?;

        let matching: Vec<&Value> = docs
            .iter()
            .filter(|doc| matches_filter(doc, &query.filter))
            .collect();
        let total = matching.len();
        let documents = matching
            .into_iter()
            .skip(query.skip)
            .take(query.limit)
            .cloned()
            .collect();

        debug!(
            "find {} filter={:?} skip={} limit={} -> total={}",
            query.namespace, query.filter, query.skip, query.limit, total
        );
        Ok(DocumentPage {
            documents,
            total,
            skip: query.skip,
            limit: query.limit,
        })
    }

    async fn insert_document(
        &self,
        namespace: &Namespace,
        mut document: Value,
    ) -> Result<Value, StoreError> {
        if !document.is_object() {
            return Err(StoreError::InvalidDocument(format!(
                "expected an object, got {}",
                json_kind(&document)
            )));
        }
        if let Some(object) = document.as_object_mut()
            && !object.contains_key("_id")
        {
            object.insert(
                "_id".to_string(),
                Value::String(uuid::Uuid::new_v4().to_string()),
            );
        }

        self.with_collection(namespace, |docs| {
            let id = document_id(&document)?;
            if docs.iter().any(|doc| doc.get("_id") == Some(id)) {
                return Err(StoreError::InvalidDocument(format!("duplicate _id {id}")));
            }
            docs.push(document.clone());
            Ok(document)
        })
    }

    async fn update_document(
        &self,
        namespace: &Namespace,
        document: Value,
    ) -> Result<(), StoreError> {
        if !document.is_object() {
            return Err(StoreError::InvalidDocument(format!(
                "expected an object, got {}",
                json_kind(&document)
            )));
        }
        let id = document_id(&document)?.clone();

        self.with_collection(namespace, |docs| {
            let slot = docs
                .iter_mut()
                .find(|doc| doc.get("_id") == Some(&id))
                .ok_or_else(|| StoreError::NotFound(format!("{namespace} _id {id}")))?;
            *slot = document;
            Ok(())
        })
    }

    async fn delete_document(&self, namespace: &Namespace, id: &Value) -> Result<(), StoreError> {
        self.with_collection(namespace, |docs| {
            let before = docs.len();
            docs.retain(|doc| doc.get("_id") != Some(id));
            if docs.len() == before {
                return Err(StoreError::NotFound(format!("{namespace} _id {id}")));
            }
            Ok(())
        })
    }

    async fn create_collection(&self, namespace: &Namespace) -> Result<(), StoreError> {
        check_collection_name(namespace)?;
        let mut databases = self.databases.write().unwrap_or_else(PoisonError::into_inner);
        let collections = databases.entry(namespace.database.clone()).or_default();
        if collections.contains_key(&namespace.collection) {
            return Err(StoreError::AlreadyExists(namespace.to_string()));
        }
        collections.insert(namespace.collection.clone(), Vec::new());
        info!("Created collection {}", namespace);
        Ok(())
    }

    async fn drop_collection(&self, namespace: &Namespace) -> Result<(), StoreError> {
        let mut databases = self.databases.write().unwrap_or_else(PoisonError::into_inner);
        let collections = databases
            .get_mut(&namespace.database)
            .ok_or_else(|| StoreError::NotFound(namespace.to_string()))?;
        if collections.remove(&namespace.collection).is_none() {
            return Err(StoreError::NotFound(namespace.to_string()));
        }
        if collections.is_empty() {
            databases.remove(&namespace.database);
        }
        info!("Dropped collection {}", namespace);
        Ok(())
    }
}
