//! Memory bounded cache of decoded map pixels.

use std::mem::size_of;
use std::sync::Arc;

use crate::map::MapId;
use crate::pixel::{PixelBuf, PixelRect};

/// Default memory budget of the cache.
pub const DEFAULT_CACHE_SIZE: usize = 10 * 1024 * 1024;

/// Configuration of a [`PixelCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelCacheConfig {
    max_size: usize,
}

impl Default for PixelCacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_CACHE_SIZE,
        }
    }
}

impl PixelCacheConfig {
    /// Maximum number of bytes the cache may hold, bookkeeping included.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Sets the maximum number of bytes the cache may hold.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Sets the maximum number of bytes the cache may hold.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
    }
}

struct Entry {
    map: MapId,
    pixels: Arc<PixelBuf>,
    size: usize,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Bookkeeping bytes charged for every cached block.
pub const ENTRY_OVERHEAD: usize = size_of::<Entry>();

/// LRU cache of decoded pixel blocks with a byte budget.
///
/// Entries are kept in a recency list: `head` is the most recently used entry, `tail` the next
/// one to evict. List links are slot indices into `slots`, freed slots are reused.
///
/// A lookup hits any cached block of the same map that contains the requested rectangle, so the
/// returned block may be larger than what was asked for.
pub struct PixelCache {
    slots: Vec<Option<Entry>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    current_size: usize,
    max_size: usize,
}

impl PixelCache {
    /// Creates an empty cache.
    pub fn new(config: PixelCacheConfig) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            current_size: 0,
            max_size: config.max_size,
        }
    }

    /// Bytes charged for caching a block of the given rectangle.
    pub fn entry_size(rect: &PixelRect) -> usize {
        rect.byte_len() + ENTRY_OVERHEAD
    }

    /// Memory budget in bytes.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Bytes currently charged.
    pub fn current_size(&self) -> usize {
        self.current_size
    }

    /// Number of cached blocks.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Finds a cached block of `map` containing `rect` and marks it as most recently used.
    pub fn get(&mut self, map: MapId, rect: &PixelRect) -> Option<Arc<PixelBuf>> {
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let entry = self.entry(index);
            if entry.map == map && entry.pixels.rect().contains(rect) {
                let pixels = entry.pixels.clone();
                self.unlink(index);
                self.push_front(index);
                self.check();
                return Some(pixels);
            }
            cursor = entry.next;
        }

        None
    }

    /// Caches a decoded block, evicting least recently used blocks to make room.
    ///
    /// Returns false if the block alone is larger than the whole budget. That is not an error,
    /// the block is simply not cached.
    pub fn add(&mut self, map: MapId, pixels: Arc<PixelBuf>) -> bool {
        let size = Self::entry_size(pixels.rect());
        if size > self.max_size {
            return false;
        }

        while self.current_size + size > self.max_size {
            if !self.evict_last() {
                break;
            }
        }

        let entry = Entry {
            map,
            pixels,
            size,
            prev: None,
            next: None,
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(entry);
                index
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        };
        self.push_front(index);
        self.len += 1;
        self.current_size += size;
        self.check();

        true
    }

    /// Removes all cached blocks.
    pub fn purge(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
        self.current_size = 0;
        self.check();
    }

    /// Changes the memory budget, evicting blocks until the cache fits into it.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        while self.current_size > self.max_size {
            if !self.evict_last() {
                break;
            }
        }
        self.check();
    }

    /// Iterates over cached blocks from the most to the least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (MapId, &PixelRect)> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let entry = self.entry(cursor?);
            cursor = entry.next;
            Some((entry.map, entry.pixels.rect()))
        })
    }

    fn evict_last(&mut self) -> bool {
        let Some(index) = self.tail else {
            return false;
        };

        self.unlink(index);
        if let Some(entry) = self.slots[index].take() {
            log::trace!(
                "Evicting {:?} of map {:?} from pixel cache",
                entry.pixels.rect(),
                entry.map
            );
            self.current_size -= entry.size;
            self.len -= 1;
        }
        self.free.push(index);

        true
    }

    fn entry(&self, index: usize) -> &Entry {
        match &self.slots[index] {
            Some(entry) => entry,
            None => unreachable!("pixel cache list points to a free slot"),
        }
    }

    fn entry_mut(&mut self, index: usize) -> &mut Entry {
        match &mut self.slots[index] {
            Some(entry) => entry,
            None => unreachable!("pixel cache list points to a free slot"),
        }
    }

    fn unlink(&mut self, index: usize) {
        let (prev, next) = {
            let entry = self.entry_mut(index);
            (entry.prev.take(), entry.next.take())
        };

        match prev {
            Some(prev) => self.entry_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.entry_mut(next).prev = prev,
            None => self.tail = prev,
        }
    }

    fn push_front(&mut self, index: usize) {
        let old_head = self.head;
        {
            let entry = self.entry_mut(index);
            entry.prev = None;
            entry.next = old_head;
        }
        match old_head {
            Some(head) => self.entry_mut(head).prev = Some(index),
            None => self.tail = Some(index),
        }
        self.head = Some(index);
    }

    /// Walks the list and verifies links, entry count and size accounting.
    #[cfg(debug_assertions)]
    fn check(&self) {
        let mut size = 0;
        let mut count = 0;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let entry = self.entry(index);
            assert_eq!(entry.prev, prev, "broken back link in pixel cache");
            size += entry.size;
            count += 1;
            prev = Some(index);
            cursor = entry.next;
        }

        assert_eq!(self.tail, prev, "pixel cache tail is not the last entry");
        assert_eq!(count, self.len, "pixel cache entry count mismatch");
        assert_eq!(size, self.current_size, "pixel cache size mismatch");
        assert!(self.current_size <= self.max_size, "pixel cache over budget");
    }

    #[cfg(not(debug_assertions))]
    fn check(&self) {}
}

impl Default for PixelCache {
    fn default() -> Self {
        Self::new(PixelCacheConfig::default())
    }
}

impl std::fmt::Debug for PixelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelCache")
            .field("len", &self.len)
            .field("current_size", &self.current_size)
            .field("max_size", &self.max_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(x: u32, y: u32, width: u32, height: u32) -> Arc<PixelBuf> {
        let rect = PixelRect::new(x, y, width, height).with_bpp(8);
        Arc::new(PixelBuf::new(rect, vec![0; rect.byte_len()]).expect("valid buffer"))
    }

    fn cache_for_blocks(count: usize, block_bytes: usize) -> PixelCache {
        PixelCache::new(
            PixelCacheConfig::default().with_max_size(count * (block_bytes + ENTRY_OVERHEAD)),
        )
    }

    fn cached_rects(cache: &PixelCache) -> Vec<(MapId, u32)> {
        cache.iter().map(|(map, rect)| (map, rect.x)).collect()
    }

    #[test]
    fn hit_on_contained_rect() {
        let mut cache = PixelCache::default();
        assert!(cache.add(MapId(1), block(0, 0, 100, 100)));

        let hit = cache
            .get(MapId(1), &PixelRect::new(10, 20, 30, 40))
            .expect("contained rect is a hit");
        assert_eq!(hit.rect(), &PixelRect::new(0, 0, 100, 100).with_bpp(8));

        assert!(cache.get(MapId(2), &PixelRect::new(10, 20, 30, 40)).is_none());
        assert!(cache.get(MapId(1), &PixelRect::new(90, 20, 30, 40)).is_none());
        assert!(cache
            .get(MapId(1), &PixelRect::new(10, 20, 30, 40).with_bpp(24))
            .is_none());
    }

    #[test]
    fn oversized_block_is_refused() {
        let mut cache = PixelCache::new(PixelCacheConfig::default().with_max_size(1000));
        assert!(!cache.add(MapId(1), block(0, 0, 100, 100)));
        assert!(cache.is_empty());
        assert_eq!(cache.current_size(), 0);
    }

    #[test]
    fn evicts_oldest_first() {
        let mut cache = cache_for_blocks(3, 100);
        for x in 0..3 {
            assert!(cache.add(MapId(1), block(x, 0, 10, 10)));
        }
        assert_eq!(cache.len(), 3);

        assert!(cache.add(MapId(1), block(3, 0, 10, 10)));
        assert_eq!(cached_rects(&cache), [(MapId(1), 3), (MapId(1), 2), (MapId(1), 1)]);

        assert!(cache.add(MapId(1), block(4, 0, 10, 10)));
        assert_eq!(cached_rects(&cache), [(MapId(1), 4), (MapId(1), 3), (MapId(1), 2)]);
    }

    #[test]
    fn get_protects_from_eviction() {
        let mut cache = cache_for_blocks(3, 100);
        for x in 0..3 {
            cache.add(MapId(1), block(x, 0, 10, 10));
        }

        assert!(cache.get(MapId(1), &PixelRect::new(0, 0, 10, 10)).is_some());
        cache.add(MapId(1), block(3, 0, 10, 10));

        assert_eq!(cached_rects(&cache), [(MapId(1), 3), (MapId(1), 0), (MapId(1), 2)]);
    }

    #[test]
    fn large_block_evicts_several() {
        let mut cache = cache_for_blocks(4, 100);
        for x in 0..4 {
            cache.add(MapId(1), block(x, 0, 10, 10));
        }

        assert!(cache.add(MapId(2), block(0, 0, 10, 35)));
        assert_eq!(cached_rects(&cache), [(MapId(2), 0), (MapId(1), 3)]);
        assert!(cache.current_size() <= cache.max_size());
    }

    #[test]
    fn purge_and_resize() {
        let mut cache = cache_for_blocks(4, 100);
        for x in 0..4 {
            cache.add(MapId(1), block(x, 0, 10, 10));
        }

        cache.set_max_size(2 * (100 + ENTRY_OVERHEAD));
        assert_eq!(cached_rects(&cache), [(MapId(1), 3), (MapId(1), 2)]);

        cache.purge();
        assert!(cache.is_empty());
        assert_eq!(cache.current_size(), 0);

        assert!(cache.add(MapId(1), block(0, 0, 10, 10)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn free_slots_are_reused() {
        let mut cache = cache_for_blocks(2, 100);
        for x in 0..10 {
            cache.add(MapId(1), block(x, 0, 10, 10));
        }
        assert_eq!(cache.len(), 2);
        assert!(cache.slots.len() <= 3);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add { map: u64, x: u32, width: u32, height: u32 },
        Get { map: u64, x: u32, width: u32 },
        Purge,
        Resize(usize),
    }

    fn op() -> impl proptest::strategy::Strategy<Value = Op> {
        use proptest::prelude::*;
        prop_oneof![
            6 => (0..3u64, 0..50u32, 1..40u32, 1..40u32)
                .prop_map(|(map, x, width, height)| Op::Add { map, x, width, height }),
            4 => (0..3u64, 0..60u32, 1..20u32).prop_map(|(map, x, width)| Op::Get { map, x, width }),
            1 => Just(Op::Purge),
            1 => (0..4000usize).prop_map(Op::Resize),
        ]
    }

    proptest::proptest! {
        #[test]
        fn accounting_holds_for_any_operation_sequence(
            budget in 0..4000usize,
            ops in proptest::collection::vec(op(), 1..80),
        ) {
            let mut cache = PixelCache::new(PixelCacheConfig::default().with_max_size(budget));
            for op in ops {
                match op {
                    Op::Add { map, x, width, height } => {
                        let pixels = block(x, 0, width, height);
                        let size = PixelCache::entry_size(pixels.rect());
                        let added = cache.add(MapId(map), pixels);
                        proptest::prop_assert_eq!(added, size <= cache.max_size());
                        if added {
                            proptest::prop_assert_eq!(
                                cache.iter().next().map(|(id, rect)| (id, rect.x)),
                                Some((MapId(map), x))
                            );
                        }
                    }
                    Op::Get { map, x, width } => {
                        let rect = PixelRect::new(x, 0, width, 1).with_bpp(8);
                        if let Some(hit) = cache.get(MapId(map), &rect) {
                            proptest::prop_assert!(hit.rect().contains(&rect));
                        }
                    }
                    Op::Purge => {
                        cache.purge();
                        proptest::prop_assert!(cache.is_empty());
                    }
                    Op::Resize(max_size) => cache.set_max_size(max_size),
                }

                cache.check();
                proptest::prop_assert!(cache.current_size() <= cache.max_size());
                proptest::prop_assert_eq!(cache.iter().count(), cache.len());
            }
        }
    }
}
