//! Memoization of shadow projections keyed by building, date and hour.
//!
//! The cache is an injectable dependency: computation stays pure and the
//! table is the only shared mutable state in the engine. Entries are
//! immutable once created; a stale entry is replaced, never edited.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use log::debug;
use uuid::Uuid;

use crate::shadow::project::ShadowPolygon;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub building_id: String,
    pub date: NaiveDate,
    pub hour: u32,
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub id: Uuid,
    pub shadow: ShadowPolygon,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl CacheEntry {
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Concurrent shadow-result cache with per-entry TTL.
///
/// Readers and writers may race freely: a `get` concurrent with a `put` for
/// the same key observes either the old or the new entry, never a torn one.
/// No geometry is computed while the lock is held.
#[derive(Debug, Default)]
pub struct ShadowResultCache {
    entries: RwLock<HashMap<CacheKey, Arc<CacheEntry>>>,
}

impl ShadowResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<CacheKey, Arc<CacheEntry>>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, Arc<CacheEntry>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Looks up an entry. An expired entry counts as a miss and is removed.
    pub fn get(&self, building_id: &str, date: NaiveDate, hour: u32) -> Option<Arc<CacheEntry>> {
        let key = CacheKey {
            building_id: building_id.to_string(),
            date,
            hour,
        };
        let found = self.read().get(&key).cloned()?;
        if !found.is_expired() {
            return Some(found);
        }
        // Lazy expiry: drop the entry unless a fresh one replaced it since
        // the read lock was released.
        let mut entries = self.write();
        if let Some(current) = entries.get(&key)
            && current.id == found.id
        {
            entries.remove(&key);
        }
        None
    }

    /// Stores a shadow under the key, replacing any previous entry.
    pub fn put(
        &self,
        building_id: &str,
        date: NaiveDate,
        hour: u32,
        shadow: ShadowPolygon,
        ttl: Duration,
    ) {
        let key = CacheKey {
            building_id: building_id.to_string(),
            date,
            hour,
        };
        let created_at = Instant::now();
        let entry = Arc::new(CacheEntry {
            id: Uuid::new_v4(),
            shadow,
            created_at,
            expires_at: created_at + ttl,
        });
        self.write().insert(key, entry);
    }

    /// Removes every entry for one building; returns the number removed.
    pub fn evict_building(&self, building_id: &str) -> usize {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|key, _| key.building_id != building_id);
        let removed = before - entries.len();
        debug!("evicted {removed} cached shadows for building {building_id}");
        removed
    }

    /// Removes every entry; returns the number removed.
    pub fn evict_all(&self) -> usize {
        let mut entries = self.write();
        let removed = entries.len();
        entries.clear();
        debug!("evicted all {removed} cached shadows");
        removed
    }

    /// Drops expired entries; usable as a periodic background pass.
    pub fn sweep(&self) -> usize {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point::GeoPoint;

    fn shadow(area: f64) -> ShadowPolygon {
        let ring = vec![
            GeoPoint { lng: 0.0, lat: 0.0 },
            GeoPoint { lng: 0.001, lat: 0.0 },
            GeoPoint {
                lng: 0.001,
                lat: 0.001,
            },
            GeoPoint {
                lng: 0.0,
                lat: 0.001,
            },
        ];
        ShadowPolygon::new(ring, area)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 21).unwrap()
    }

    const LONG_TTL: Duration = Duration::from_secs(3600);

    #[test]
    fn test_put_then_get() {
        let cache = ShadowResultCache::new();
        cache.put("b1", date(), 12, shadow(100.0), LONG_TTL);
        let entry = cache.get("b1", date(), 12).expect("entry expected");
        assert_eq!(entry.shadow, shadow(100.0));
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_miss_on_unknown_key() {
        let cache = ShadowResultCache::new();
        cache.put("b1", date(), 12, shadow(100.0), LONG_TTL);
        assert!(cache.get("b1", date(), 13).is_none());
        assert!(cache.get("b2", date(), 12).is_none());
    }

    #[test]
    fn test_expired_entry_is_a_miss_and_removed() {
        let cache = ShadowResultCache::new();
        cache.put("b1", date(), 12, shadow(100.0), Duration::from_millis(5));
        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get("b1", date(), 12).is_none());
        // The lazy expiry removed it, so nothing is left to evict.
        assert_eq!(cache.evict_all(), 0);
    }

    #[test]
    fn test_put_replaces_stale_entry() {
        let cache = ShadowResultCache::new();
        cache.put("b1", date(), 12, shadow(100.0), LONG_TTL);
        let first = cache.get("b1", date(), 12).unwrap();
        cache.put("b1", date(), 12, shadow(200.0), LONG_TTL);
        let second = cache.get("b1", date(), 12).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(second.shadow.area(), 200.0);
    }

    #[test]
    fn test_evict_building_counts_exactly() {
        let cache = ShadowResultCache::new();
        cache.put("b1", date(), 10, shadow(1.0), LONG_TTL);
        cache.put("b1", date(), 11, shadow(2.0), LONG_TTL);
        cache.put("b2", date(), 10, shadow(3.0), LONG_TTL);
        assert_eq!(cache.evict_building("b1"), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("b2", date(), 10).is_some());
    }

    #[test]
    fn test_evict_all() {
        let cache = ShadowResultCache::new();
        cache.put("b1", date(), 10, shadow(1.0), LONG_TTL);
        cache.put("b2", date(), 10, shadow(2.0), LONG_TTL);
        assert_eq!(cache.evict_all(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let cache = ShadowResultCache::new();
        cache.put("b1", date(), 10, shadow(1.0), Duration::from_millis(5));
        cache.put("b2", date(), 10, shadow(2.0), LONG_TTL);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let cache = ShadowResultCache::new();
        std::thread::scope(|scope| {
            for t in 0..4u32 {
                let cache = &cache;
                scope.spawn(move || {
                    for i in 0..50u32 {
                        let id = format!("b{}", (t + i) % 3);
                        cache.put(&id, date(), i % 24, shadow(i as f64), LONG_TTL);
                        let _ = cache.get(&id, date(), i % 24);
                    }
                });
            }
        });
        assert!(!cache.is_empty());
    }
}
