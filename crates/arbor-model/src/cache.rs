//! Process-wide, pid-keyed cache of repository objects.
//!
//! At most one load per pid is in flight: concurrent callers for the same
//! pid share a slot and block on its [`OnceCell`] until the first caller's
//! load completes. Entries expire a fixed time after they were loaded and
//! the least recently used loaded entries are evicted past the size bound.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::{debug, info};

use arbor_store::ResourceKind;
use arbor_types::{Pid, ResourceType};

use crate::config::CacheConfig;
use crate::driver::ObjectDriver;
use crate::error::{ModelError, ModelResult};
use crate::object::ObjectCore;
use crate::objects::{
    AdminUnit, BinaryObject, CollectionObject, ContentRootObject, DepositRecord, FileObject,
    FolderObject, RepositoryObject, TypedObject, WorkObject,
};

struct Loaded {
    object: RepositoryObject,
    loaded_at: Instant,
}

/// One cache position. Uninitialized while its first load is in flight.
struct Slot {
    cell: OnceCell<Loaded>,
    last_access: AtomicU64,
}

impl Slot {
    fn new(now: u64) -> Self {
        Self {
            cell: OnceCell::new(),
            last_access: AtomicU64::new(now),
        }
    }
}

/// Point-in-time cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub loads: u64,
    pub evictions: u64,
    pub invalidations: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
    evictions: AtomicU64,
    invalidations: AtomicU64,
}

/// The object cache.
pub struct ObjectCache {
    driver: Arc<ObjectDriver>,
    config: CacheConfig,
    entries: DashMap<Pid, Arc<Slot>>,
    epoch: Instant,
    counters: Counters,
}

impl ObjectCache {
    pub fn new(driver: Arc<ObjectDriver>, config: CacheConfig) -> Self {
        Self {
            driver,
            config,
            entries: DashMap::new(),
            epoch: Instant::now(),
            counters: Counters::default(),
        }
    }

    pub fn driver(&self) -> &Arc<ObjectDriver> {
        &self.driver
    }

    /// The object for `pid`, loading it on a miss.
    ///
    /// Failed loads are not cached; the next call retries.
    pub fn get(&self, pid: &Pid) -> ModelResult<RepositoryObject> {
        let now = self.tick();
        let slot = self.slot_for(pid, now);
        slot.last_access.store(now, Ordering::Relaxed);

        let mut loaded_here = false;
        let result = slot.cell.get_or_try_init(|| {
            loaded_here = true;
            self.load(pid).map(|object| Loaded {
                object,
                loaded_at: Instant::now(),
            })
        });

        match result {
            Ok(loaded) => {
                if loaded_here {
                    self.counters.misses.fetch_add(1, Ordering::Relaxed);
                    self.enforce_bound();
                } else {
                    self.counters.hits.fetch_add(1, Ordering::Relaxed);
                }
                Ok(loaded.object.clone())
            }
            Err(e) => {
                self.entries
                    .remove_if(pid, |_, current| Arc::ptr_eq(current, &slot));
                Err(e)
            }
        }
    }

    /// Current slot for `pid`, replacing it if expired.
    fn slot_for(&self, pid: &Pid, now: u64) -> Arc<Slot> {
        let ttl = self.config.ttl();
        match self.entries.entry(pid.clone()) {
            Entry::Occupied(mut occupied) => {
                let expired = occupied
                    .get()
                    .cell
                    .get()
                    .is_some_and(|l| l.loaded_at.elapsed() >= ttl);
                if expired {
                    debug!(%pid, "cache entry expired");
                    occupied.insert(Arc::new(Slot::new(now)));
                }
                occupied.get().clone()
            }
            Entry::Vacant(vacant) => vacant.insert(Arc::new(Slot::new(now))).clone(),
        }
    }

    fn load(&self, pid: &Pid) -> ModelResult<RepositoryObject> {
        self.counters.loads.fetch_add(1, Ordering::Relaxed);
        let uri = self.driver.paths().uri_for(pid);
        let head = self
            .driver
            .store()
            .head(&uri)
            .map_err(|e| ModelError::from_store(pid, e))?;

        let object = match head.kind {
            ResourceKind::Binary => {
                let description = head
                    .described_by
                    .clone()
                    .unwrap_or_else(|| self.driver.paths().description_uri_for(pid));
                let core = ObjectCore::binary(
                    pid.clone(),
                    uri,
                    description,
                    head.content_location,
                    head.content_length,
                    self.driver.clone(),
                );
                core.set_etag(head.etag);
                RepositoryObject::from_core(Arc::new(core), ResourceType::Binary)
            }
            ResourceKind::Rdf => {
                let core = Arc::new(ObjectCore::new(pid.clone(), uri, self.driver.clone()));
                let kind = self.driver.resolve_kind(&core)?;
                RepositoryObject::from_core(core, kind)
            }
        };
        debug!(%pid, kind = %object.resource_type(), "loaded object");
        Ok(object)
    }

    /// The object for `pid` as the typed handle `T`.
    ///
    /// A removed object is reported as [`ModelError::TombstoneFound`]; any
    /// other kind than `T` is a type mismatch.
    pub fn get_typed<T: TypedObject>(&self, pid: &Pid) -> ModelResult<T> {
        let object = self.get(pid)?;
        let found = object.resource_type();
        if found == ResourceType::Tombstone && T::RESOURCE_TYPE != ResourceType::Tombstone {
            return Err(ModelError::TombstoneFound(pid.clone()));
        }
        T::from_object(object).ok_or_else(|| ModelError::TypeMismatch {
            pid: pid.clone(),
            expected: T::RESOURCE_TYPE.to_string(),
            found: found.to_string(),
        })
    }

    pub fn get_content_root(&self, pid: &Pid) -> ModelResult<ContentRootObject> {
        self.get_typed(pid)
    }

    pub fn get_admin_unit(&self, pid: &Pid) -> ModelResult<AdminUnit> {
        self.get_typed(pid)
    }

    pub fn get_collection(&self, pid: &Pid) -> ModelResult<CollectionObject> {
        self.get_typed(pid)
    }

    pub fn get_folder(&self, pid: &Pid) -> ModelResult<FolderObject> {
        self.get_typed(pid)
    }

    pub fn get_work(&self, pid: &Pid) -> ModelResult<WorkObject> {
        self.get_typed(pid)
    }

    pub fn get_file_object(&self, pid: &Pid) -> ModelResult<FileObject> {
        self.get_typed(pid)
    }

    pub fn get_binary(&self, pid: &Pid) -> ModelResult<BinaryObject> {
        self.get_typed(pid)
    }

    pub fn get_deposit_record(&self, pid: &Pid) -> ModelResult<DepositRecord> {
        self.get_typed(pid)
    }

    /// The container of `object`.
    pub fn get_parent(&self, object: &RepositoryObject) -> ModelResult<RepositoryObject> {
        let parent = self.driver.get_parent_pid(object)?;
        self.get(&parent)
    }

    /// Drop the entry for `pid`; the next `get` reloads it.
    pub fn invalidate(&self, pid: &Pid) {
        if self.entries.remove(pid).is_some() {
            self.counters.invalidations.fetch_add(1, Ordering::Relaxed);
            debug!(%pid, "invalidated cache entry");
        }
    }

    pub fn invalidate_all(&self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.counters
            .invalidations
            .fetch_add(dropped as u64, Ordering::Relaxed);
        info!(dropped, "cleared object cache");
    }

    pub fn contains(&self, pid: &Pid) -> bool {
        self.entries
            .get(pid)
            .is_some_and(|slot| slot.cell.get().is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            loads: self.counters.loads.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            invalidations: self.counters.invalidations.load(Ordering::Relaxed),
        }
    }

    fn tick(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Evict least recently used loaded entries past `max_entries`.
    /// In-flight slots are never evicted.
    fn enforce_bound(&self) {
        let len = self.entries.len();
        if len <= self.config.max_entries {
            return;
        }
        let mut loaded: Vec<(Pid, u64)> = self
            .entries
            .iter()
            .filter(|e| e.value().cell.get().is_some())
            .map(|e| (e.key().clone(), e.value().last_access.load(Ordering::Relaxed)))
            .collect();
        loaded.sort_by_key(|(_, accessed)| *accessed);
        for (pid, _) in loaded.into_iter().take(len - self.config.max_entries) {
            if self.entries.remove(&pid).is_some() {
                self.counters.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

impl std::fmt::Debug for ObjectCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectCache")
            .field("entries", &self.entries.len())
            .field("stats", &self.stats())
            .finish()
    }
}
