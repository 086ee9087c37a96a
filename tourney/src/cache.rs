//! Query cache shared by every view.
//!
//! One entry per [`QueryKey`]. Reads go through [`QueryCache::get_or_fetch`],
//! which only calls the fetcher on a miss. Mutations call
//! [`QueryCache::invalidate`], which drops the entry outright (nothing is
//! merged), so the next read re-fetches the whole collection.
//!
//! A fetch that started before an invalidation still returns its data to its
//! caller but is not stored, so an invalidation is never undone by a slow
//! in-flight read.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cache keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The full tournament list
    Tournaments,
}

impl QueryKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKey::Tournaments => "tournaments",
        }
    }
}

struct CacheEntry<T> {
    data: T,
    fetched_at: Instant,
}

struct State<T> {
    entries: HashMap<QueryKey, CacheEntry<T>>,
    generations: HashMap<QueryKey, u64>,
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
}

/// Keyed cache with explicit invalidation
pub struct QueryCache<T> {
    state: RwLock<State<T>>,
    stale_after: Option<Duration>,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

impl<T: Clone> QueryCache<T> {
    /// Cache whose entries stay valid until invalidated
    pub fn new() -> Self {
        Self::with_stale_after(None)
    }

    /// Cache whose entries also expire `stale_after` after being fetched
    pub fn with_stale_after(stale_after: Option<Duration>) -> Self {
        Self {
            state: RwLock::new(State {
                entries: HashMap::new(),
                generations: HashMap::new(),
            }),
            stale_after,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry<T>) -> bool {
        self.stale_after
            .is_none_or(|ttl| entry.fetched_at.elapsed() < ttl)
    }

    /// Cached data for `key`, without fetching.
    pub async fn peek(&self, key: QueryKey) -> Option<T> {
        let state = self.state.read().await;
        state
            .entries
            .get(&key)
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| entry.data.clone())
    }

    /// Return cached data, or run `fetcher` and cache its result.
    ///
    /// Errors are passed through and never cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: QueryKey, fetcher: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let generation = {
            let state = self.state.read().await;
            if let Some(entry) = state.entries.get(&key).filter(|e| self.is_fresh(e)) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                log::trace!("cache hit for {}", key.as_str());
                return Ok(entry.data.clone());
            }
            state.generations.get(&key).copied().unwrap_or(0)
        };

        self.misses.fetch_add(1, Ordering::Relaxed);
        log::debug!("cache miss for {}, fetching", key.as_str());
        let data = fetcher().await?;

        let mut state = self.state.write().await;
        if state.generations.get(&key).copied().unwrap_or(0) == generation {
            state.entries.insert(
                key,
                CacheEntry {
                    data: data.clone(),
                    fetched_at: Instant::now(),
                },
            );
        } else {
            log::debug!(
                "discarding fetch for {} invalidated while in flight",
                key.as_str()
            );
        }

        Ok(data)
    }

    /// Drop the entry for `key`; the next read re-fetches.
    pub async fn invalidate(&self, key: QueryKey) {
        let mut state = self.state.write().await;
        state.entries.remove(&key);
        *state.generations.entry(key).or_insert(0) += 1;
        self.invalidations.fetch_add(1, Ordering::Relaxed);
        log::debug!("invalidated {}", key.as_str());
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

impl<T: Clone> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
