//! InMemoryDocumentStore - HashMap-backed document store for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{CommitHook, CommitKind, CommitNotice, DocumentStore, Query};
use crate::document::{Acl, Credential, Document, MasterKey, Stored};
use crate::error::StoreError;

/// Internal stored representation of a document.
struct StoredDocument {
    bytes: Vec<u8>,
    version: u64,
    created: u64,
    acl: Acl,
}

#[derive(Default)]
struct Tables {
    documents: HashMap<String, StoredDocument>,
    next_created: u64,
}

/// Resolved identity of a credential against this store.
enum Access<'a> {
    Master,
    User(&'a str),
}

impl Access<'_> {
    fn can_read(&self, acl: &Acl) -> bool {
        match self {
            Access::Master => true,
            Access::User(user) => acl.readable_by(user),
        }
    }

    fn can_write(&self, acl: &Acl) -> bool {
        match self {
            Access::Master => true,
            Access::User(user) => acl.writable_by(user),
        }
    }

    fn is_master(&self) -> bool {
        matches!(self, Access::Master)
    }
}

/// In-memory document store backed by a HashMap.
///
/// Storage key is `"COLLECTION:id"`, documents are held as JSON bytes.
/// Clone-friendly via Arc: clones share documents, hooks and the master key.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    tables: Arc<RwLock<Tables>>,
    hooks: Arc<RwLock<Vec<Arc<dyn CommitHook>>>>,
    master_key: MasterKey,
}

impl InMemoryDocumentStore {
    /// Create an empty store that honors `master_key` for elevated access.
    pub fn new(master_key: MasterKey) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            hooks: Arc::new(RwLock::new(Vec::new())),
            master_key,
        }
    }

    /// Number of documents in `D`'s collection, regardless of ACLs.
    pub fn count<D: Document>(&self) -> Result<usize, StoreError> {
        let prefix = format!("{}:", D::COLLECTION);
        let tables = self.read_tables()?;
        Ok(tables
            .documents
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .count())
    }

    fn make_key(collection: &str, id: &str) -> String {
        format!("{}:{}", collection, id)
    }

    fn read_tables(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))
    }

    fn write_tables(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))
    }

    fn access<'a>(
        &self,
        cred: &'a Credential,
        collection: &str,
        id: &str,
        operation: &'static str,
    ) -> Result<Access<'a>, StoreError> {
        match cred {
            Credential::User(user) => Ok(Access::User(user.as_str())),
            Credential::Master(key) if *key == self.master_key => Ok(Access::Master),
            Credential::Master(_) => Err(StoreError::PermissionDenied {
                collection: collection.to_string(),
                id: id.to_string(),
                operation,
            }),
        }
    }

    fn denied(collection: &str, id: &str, operation: &'static str) -> StoreError {
        StoreError::PermissionDenied {
            collection: collection.to_string(),
            id: id.to_string(),
            operation,
        }
    }

    fn decode<D: Document>(bytes: &[u8]) -> Result<D, StoreError> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Serde(e.to_string()))
    }

    fn notify(&self, notice: CommitNotice) {
        let hooks: Vec<Arc<dyn CommitHook>> = match self.hooks.read() {
            Ok(hooks) => hooks.clone(),
            Err(_) => {
                tracing::warn!(id = %notice.id, "commit hooks lock poisoned; notice dropped");
                return;
            }
        };
        for hook in hooks {
            hook.after_commit(&notice);
        }
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn get<D: Document>(
        &self,
        cred: &Credential,
        id: &str,
    ) -> Result<Option<Stored<D>>, StoreError> {
        let access = self.access(cred, D::COLLECTION, id, "get")?;
        let key = Self::make_key(D::COLLECTION, id);
        let tables = self.read_tables()?;

        match tables.documents.get(&key) {
            Some(stored) => {
                if !access.can_read(&stored.acl) {
                    return Err(Self::denied(D::COLLECTION, id, "get"));
                }
                Ok(Some(Stored {
                    data: Self::decode(&stored.bytes)?,
                    version: stored.version,
                    created: stored.created,
                }))
            }
            None => Ok(None),
        }
    }

    fn insert<D: Document>(
        &self,
        cred: &Credential,
        doc: &D,
        acl: Acl,
    ) -> Result<Stored<D>, StoreError> {
        let access = self.access(cred, D::COLLECTION, doc.id(), "insert")?;

        let stored = {
            let mut tables = self.write_tables()?;
            let created = tables.next_created + 1;

            let mut doc = doc.clone();
            if doc.id().is_empty() {
                doc.set_id(format!("d{:08}", created));
            }

            let key = Self::make_key(D::COLLECTION, doc.id());
            if let Some(existing) = tables.documents.get(&key) {
                return Err(StoreError::ConcurrencyConflict {
                    collection: D::COLLECTION.to_string(),
                    id: doc.id().to_string(),
                    expected: 0,
                    actual: existing.version,
                });
            }

            let bytes =
                serde_json::to_vec(&doc).map_err(|e| StoreError::Serde(e.to_string()))?;
            tables.next_created = created;
            tables.documents.insert(
                key,
                StoredDocument {
                    bytes,
                    version: 1,
                    created,
                    acl,
                },
            );

            Stored {
                data: doc,
                version: 1,
                created,
            }
        };

        self.notify(CommitNotice {
            collection: D::COLLECTION.to_string(),
            id: stored.data.id().to_string(),
            version: stored.version,
            kind: CommitKind::Created,
            elevated: access.is_master(),
        });

        Ok(stored)
    }

    fn update<D: Document>(
        &self,
        cred: &Credential,
        doc: &D,
        expected_version: u64,
    ) -> Result<Stored<D>, StoreError> {
        let access = self.access(cred, D::COLLECTION, doc.id(), "update")?;
        let key = Self::make_key(D::COLLECTION, doc.id());
        let bytes = serde_json::to_vec(doc).map_err(|e| StoreError::Serde(e.to_string()))?;

        let stored = {
            let mut tables = self.write_tables()?;

            let current = tables
                .documents
                .get_mut(&key)
                .ok_or_else(|| StoreError::NotFound {
                    collection: D::COLLECTION.to_string(),
                    id: doc.id().to_string(),
                })?;

            if !access.can_write(&current.acl) {
                return Err(Self::denied(D::COLLECTION, doc.id(), "update"));
            }

            if current.version != expected_version {
                return Err(StoreError::ConcurrencyConflict {
                    collection: D::COLLECTION.to_string(),
                    id: doc.id().to_string(),
                    expected: expected_version,
                    actual: current.version,
                });
            }

            current.bytes = bytes;
            current.version += 1;

            Stored {
                data: doc.clone(),
                version: current.version,
                created: current.created,
            }
        };

        self.notify(CommitNotice {
            collection: D::COLLECTION.to_string(),
            id: doc.id().to_string(),
            version: stored.version,
            kind: CommitKind::Updated,
            elevated: access.is_master(),
        });

        Ok(stored)
    }

    fn query<D: Document>(
        &self,
        cred: &Credential,
        query: &Query<D>,
    ) -> Result<Vec<Stored<D>>, StoreError> {
        let access = self.access(cred, D::COLLECTION, "*", "query")?;
        let prefix = format!("{}:", D::COLLECTION);
        let tables = self.read_tables()?;

        let mut results = Vec::new();
        for (key, stored) in tables.documents.iter() {
            if !key.starts_with(&prefix) || !access.can_read(&stored.acl) {
                continue;
            }
            match Self::decode::<D>(&stored.bytes) {
                Ok(data) => {
                    if query.matches(&data) {
                        results.push(Stored {
                            data,
                            version: stored.version,
                            created: stored.created,
                        });
                    }
                }
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "skipping undecodable document");
                }
            }
        }

        Ok(query.finish(results))
    }

    fn set_acl<D: Document>(
        &self,
        cred: &Credential,
        id: &str,
        acl: Acl,
    ) -> Result<(), StoreError> {
        let access = self.access(cred, D::COLLECTION, id, "set_acl")?;
        let key = Self::make_key(D::COLLECTION, id);
        let mut tables = self.write_tables()?;

        let current = tables
            .documents
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound {
                collection: D::COLLECTION.to_string(),
                id: id.to_string(),
            })?;

        if !access.can_write(&current.acl) {
            return Err(Self::denied(D::COLLECTION, id, "set_acl"));
        }

        current.acl = acl;
        Ok(())
    }

    fn subscribe(&self, hook: Arc<dyn CommitHook>) -> Result<(), StoreError> {
        self.hooks
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?
            .push(hook);
        Ok(())
    }
}
