//! Bounded LRU cache.
//!
//! [`LruCache`] maps keys to values with a fixed maximum entry count. When the
//! cache is full, inserting a new key evicts the least recently used entry.
//! Both lookups and insertions mark an entry as most recently used.
//!
//! # Example
//!
//! ```
//! use horizon_lattice_icons::LruCache;
//!
//! let mut cache = LruCache::new(2);
//! cache.add("a", 1);
//! cache.add("b", 2);
//!
//! // Touch "a" so that "b" becomes the least recently used entry
//! assert_eq!(cache.get(&"a"), Some(1));
//!
//! cache.add("c", 3);
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! assert_eq!(cache.len(), 2);
//! ```
//!
//! # Thread Safety
//!
//! The cache is NOT internally synchronized. Shared caches are wrapped in a
//! `Mutex` by their owner, which also serializes the statistics counters.

use std::collections::HashMap;
use std::hash::Hash;

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Key of a node in the recency list.
    struct NodeKey;
}

/// Node in the LRU linked list.
struct LruNode<K, V> {
    key: K,
    value: V,
    /// Neighbour that is more recently used.
    prev: Option<NodeKey>,
    /// Neighbour that is less recently used.
    next: Option<NodeKey>,
}

/// A fixed-capacity cache with least-recently-used eviction.
///
/// Entries live in a slot map linked into a doubly linked recency list; a hash
/// index maps keys to their node. Promotion and eviction are O(1).
pub struct LruCache<K, V> {
    /// Maximum number of entries.
    max: usize,
    /// Entry storage.
    nodes: SlotMap<NodeKey, LruNode<K, V>>,
    /// Key lookup.
    index: HashMap<K, NodeKey>,
    /// Most recently used entry.
    head: Option<NodeKey>,
    /// Least recently used entry.
    tail: Option<NodeKey>,
    /// Statistics: number of cache hits.
    hits: u64,
    /// Statistics: number of cache misses.
    misses: u64,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache holding at most `max` entries.
    ///
    /// A maximum of zero is allowed and produces a cache that never retains
    /// anything.
    pub fn new(max: usize) -> Self {
        Self {
            max,
            nodes: SlotMap::with_key(),
            index: HashMap::new(),
            head: None,
            tail: None,
            hits: 0,
            misses: 0,
        }
    }

    /// Get the maximum number of entries.
    #[inline]
    pub fn max(&self) -> usize {
        self.max
    }

    /// Set the maximum number of entries.
    ///
    /// If the cache currently holds more entries than the new maximum, the
    /// least recently used entries are evicted immediately.
    pub fn set_max(&mut self, max: usize) {
        if max == self.max {
            return;
        }
        self.max = max;
        while self.index.len() > self.max {
            self.evict_lru();
        }
    }

    /// Get the number of entries in the cache.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Alias of [`len`](Self::len).
    #[inline]
    pub fn size(&self) -> usize {
        self.len()
    }

    /// Check if the cache is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Get how full the cache is, from 0.0 to 100.0.
    ///
    /// Returns 0.0 for a cache with a maximum of zero.
    pub fn percentage(&self) -> f32 {
        if self.max == 0 {
            0.0
        } else {
            self.len() as f32 / self.max as f32 * 100.0
        }
    }

    /// Check if a key exists in the cache (without updating LRU order).
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Get a value from the cache.
    ///
    /// If found, the entry becomes the most recently used one. A miss leaves
    /// the entries untouched.
    pub fn get(&mut self, key: &K) -> Option<V> {
        match self.index.get(key).copied() {
            Some(node) => {
                self.hits += 1;
                self.move_to_front(node);
                Some(self.nodes[node].value.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Get a value and mark it most recently used, without counting a hit or
    /// miss.
    pub(crate) fn touch(&mut self, key: &K) -> Option<V> {
        let node = self.index.get(key).copied()?;
        self.move_to_front(node);
        Some(self.nodes[node].value.clone())
    }

    /// Get a reference to a value without updating LRU order or statistics.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&node| &self.nodes[node].value)
    }

    /// Insert or overwrite an entry, marking it most recently used.
    ///
    /// Overwriting an existing key keeps the entry count unchanged. Adding a
    /// new key to a full cache evicts the least recently used entry first.
    pub fn add(&mut self, key: K, value: V) {
        if let Some(node) = self.index.get(&key).copied() {
            self.nodes[node].value = value;
            self.move_to_front(node);
            return;
        }

        if self.max == 0 {
            return;
        }
        while self.index.len() >= self.max {
            self.evict_lru();
        }

        let node = self.nodes.insert(LruNode {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        self.index.insert(key, node);
        self.push_front(node);
    }

    /// Remove an entry from the cache.
    ///
    /// Returns the removed value if it existed.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let node = self.index.remove(key)?;
        self.unlink(node);
        self.nodes.remove(node).map(|n| n.value)
    }

    /// Clear all entries from the cache.
    ///
    /// Statistics are kept; use [`reset_stats`](Self::reset_stats) to clear
    /// them.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }

    /// Get the keys ordered from least to most recently used.
    pub fn keys(&self) -> Vec<K> {
        self.iter_lru().map(|node| node.key.clone()).collect()
    }

    /// Get the values ordered from least to most recently used.
    pub fn values(&self) -> Vec<V> {
        self.iter_lru().map(|node| node.value.clone()).collect()
    }

    /// Get the cache hit count.
    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Get the cache miss count.
    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Get the cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Reset cache statistics.
    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            capacity: self.max,
            hits: self.hits,
            misses: self.misses,
            hit_rate: self.hit_rate(),
        }
    }

    // ========================================================================
    // LRU LIST OPERATIONS
    // ========================================================================

    /// Walk the recency list from the tail (least recent) to the head.
    fn iter_lru(&self) -> impl Iterator<Item = &LruNode<K, V>> + '_ {
        std::iter::successors(self.tail.map(|node| &self.nodes[node]), move |node| {
            node.prev.map(|prev| &self.nodes[prev])
        })
    }

    /// Drop the least recently used entry.
    fn evict_lru(&mut self) {
        if let Some(tail) = self.tail {
            self.unlink(tail);
            if let Some(node) = self.nodes.remove(tail) {
                self.index.remove(&node.key);
            }
        }
    }

    fn move_to_front(&mut self, node: NodeKey) {
        if self.head == Some(node) {
            return;
        }
        self.unlink(node);
        self.push_front(node);
    }

    fn push_front(&mut self, node: NodeKey) {
        let old_head = self.head;
        {
            let entry = &mut self.nodes[node];
            entry.prev = None;
            entry.next = old_head;
        }
        match old_head {
            Some(head) => self.nodes[head].prev = Some(node),
            None => self.tail = Some(node),
        }
        self.head = Some(node);
    }

    fn unlink(&mut self, node: NodeKey) {
        let (prev, next) = {
            let entry = &self.nodes[node];
            (entry.prev, entry.next)
        };
        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => self.tail = prev,
        }
        let entry = &mut self.nodes[node];
        entry.prev = None;
        entry.next = None;
    }
}

impl<K, V> std::fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total = self.hits + self.misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        };
        f.debug_struct("LruCache")
            .field("entries", &self.index.len())
            .field("max", &self.max)
            .field("hit_rate", &format!("{:.1}%", hit_rate * 100.0))
            .finish()
    }
}

/// Statistics about an LRU cache.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    /// Number of entries in the cache.
    pub entries: usize,
    /// Maximum number of entries.
    pub capacity: usize,
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Cache hit rate (0.0 to 1.0).
    pub hit_rate: f64,
}

impl CacheStats {
    /// Get the usage percentage (0.0 to 100.0).
    pub fn usage_percent(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            (self.entries as f64 / self.capacity as f64) * 100.0
        }
    }
}
