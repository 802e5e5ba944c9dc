//! Shared fixtures for the ranking suite.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use highscore::{
    standing, Acl, CommitHook, CommitKind, CommitNotice, Credential, Document, DocumentStore,
    InMemoryDocumentStore, MasterKey, Query, ScoreRecord, ScoreWriter, StoreError, Stored,
};

pub const MASTER: &str = "test-master-key";

pub fn master_key() -> MasterKey {
    MasterKey::new(MASTER)
}

pub fn store() -> InMemoryDocumentStore {
    InMemoryDocumentStore::new(master_key())
}

/// Insert a score record owned by `owner` with the given score and rank.
pub fn seed<S: DocumentStore>(store: &S, owner: &str, score: f64, rank: u64) -> Stored<ScoreRecord> {
    let mut record = ScoreRecord::new(owner, owner);
    record.score = score;
    record.rank = rank;
    store
        .insert(&Credential::user(owner), &record, Acl::public_read(owner))
        .unwrap()
}

/// `(owner, rank)` of every record, best rank first, unranked last.
pub fn ranks<S: DocumentStore>(store: &S) -> Vec<(String, u64)> {
    let mut records: Vec<(String, u64)> = store
        .query::<ScoreRecord>(&Credential::master(master_key()), &Query::new())
        .unwrap()
        .into_iter()
        .map(|r| (r.data.owner, r.data.rank))
        .collect();
    records.sort_by_key(|(_, rank)| if *rank == 0 { u64::MAX } else { *rank });
    records
}

pub fn rank_of<S: DocumentStore>(store: &S, owner: &str) -> u64 {
    ranks(store)
        .into_iter()
        .find(|(o, _)| o == owner)
        .map(|(_, rank)| rank)
        .unwrap()
}

/// Assert that ranks are exactly 1..N in standing order.
pub fn assert_dense_standing<S: DocumentStore>(store: &S) {
    let mut records = store
        .query::<ScoreRecord>(&Credential::master(master_key()), &Query::new())
        .unwrap();
    records.sort_by(standing::compare);

    let found: Vec<u64> = records.iter().map(|r| r.data.rank).collect();
    let expected: Vec<u64> = (1..=records.len() as u64).collect();
    assert_eq!(found, expected);
}

/// Counts elevated score record updates, i.e. the recalculator's rank writes.
#[derive(Default)]
pub struct RankWriteCounter {
    writes: AtomicUsize,
}

impl RankWriteCounter {
    pub fn count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl CommitHook for RankWriteCounter {
    fn after_commit(&self, notice: &CommitNotice) {
        if notice.collection == ScoreRecord::COLLECTION
            && notice.kind == CommitKind::Updated
            && notice.elevated
        {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub fn count_rank_writes<S: DocumentStore>(store: &S) -> Arc<RankWriteCounter> {
    let counter = Arc::new(RankWriteCounter::default());
    store.subscribe(counter.clone()).unwrap();
    counter
}

/// Store wrapper that fails chosen operations on demand.
#[derive(Clone)]
pub struct FlakyStore {
    inner: InMemoryDocumentStore,
    failing_updates: Arc<Mutex<HashSet<String>>>,
    failing_queries: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new(inner: InMemoryDocumentStore) -> Self {
        Self {
            inner,
            failing_updates: Arc::default(),
            failing_queries: Arc::default(),
        }
    }

    pub fn fail_updates_of(&self, id: &str) {
        self.failing_updates.lock().unwrap().insert(id.to_string());
    }

    pub fn heal(&self) {
        self.failing_updates.lock().unwrap().clear();
        self.fail_queries(false);
    }

    pub fn fail_queries(&self, fail: bool) {
        self.failing_queries.store(fail, Ordering::SeqCst);
    }
}

impl DocumentStore for FlakyStore {
    fn get<D: Document>(&self, cred: &Credential, id: &str) -> Result<Option<Stored<D>>, StoreError> {
        self.inner.get(cred, id)
    }

    fn insert<D: Document>(&self, cred: &Credential, doc: &D, acl: Acl) -> Result<Stored<D>, StoreError> {
        self.inner.insert(cred, doc, acl)
    }

    fn update<D: Document>(
        &self,
        cred: &Credential,
        doc: &D,
        expected_version: u64,
    ) -> Result<Stored<D>, StoreError> {
        if self.failing_updates.lock().unwrap().contains(doc.id()) {
            return Err(StoreError::Storage(format!("update of {} refused", doc.id())));
        }
        self.inner.update(cred, doc, expected_version)
    }

    fn query<D: Document>(&self, cred: &Credential, query: &Query<D>) -> Result<Vec<Stored<D>>, StoreError> {
        if self.failing_queries.load(Ordering::SeqCst) {
            return Err(StoreError::Storage("backend unavailable".into()));
        }
        self.inner.query(cred, query)
    }

    fn set_acl<D: Document>(&self, cred: &Credential, id: &str, acl: Acl) -> Result<(), StoreError> {
        self.inner.set_acl::<D>(cred, id, acl)
    }

    fn subscribe(&self, hook: Arc<dyn CommitHook>) -> Result<(), StoreError> {
        self.inner.subscribe(hook)
    }
}

/// Store wrapper that lets a player's score write land right before the
/// first elevated update, i.e. between a pass's read and its rank writes.
#[derive(Clone)]
pub struct RacingStore {
    inner: InMemoryDocumentStore,
    racer: Arc<Mutex<Option<(String, f64)>>>,
}

impl RacingStore {
    pub fn new(inner: InMemoryDocumentStore) -> Self {
        Self {
            inner,
            racer: Arc::default(),
        }
    }

    pub fn race_first_rank_write(&self, owner: &str, score: f64) {
        *self.racer.lock().unwrap() = Some((owner.to_string(), score));
    }
}

impl DocumentStore for RacingStore {
    fn get<D: Document>(&self, cred: &Credential, id: &str) -> Result<Option<Stored<D>>, StoreError> {
        self.inner.get(cred, id)
    }

    fn insert<D: Document>(&self, cred: &Credential, doc: &D, acl: Acl) -> Result<Stored<D>, StoreError> {
        self.inner.insert(cred, doc, acl)
    }

    fn update<D: Document>(
        &self,
        cred: &Credential,
        doc: &D,
        expected_version: u64,
    ) -> Result<Stored<D>, StoreError> {
        if matches!(cred, Credential::Master(_)) {
            let race = self.racer.lock().unwrap().take();
            if let Some((owner, score)) = race {
                ScoreWriter::new(self.inner.clone(), owner)
                    .set_score(score)
                    .unwrap();
            }
        }
        self.inner.update(cred, doc, expected_version)
    }

    fn query<D: Document>(&self, cred: &Credential, query: &Query<D>) -> Result<Vec<Stored<D>>, StoreError> {
        self.inner.query(cred, query)
    }

    fn set_acl<D: Document>(&self, cred: &Credential, id: &str, acl: Acl) -> Result<(), StoreError> {
        self.inner.set_acl::<D>(cred, id, acl)
    }

    fn subscribe(&self, hook: Arc<dyn CommitHook>) -> Result<(), StoreError> {
        self.inner.subscribe(hook)
    }
}
