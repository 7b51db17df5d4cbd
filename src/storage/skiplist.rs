//! Skip List Engine
//!
//! The ordered index underneath the store. Elements are kept sorted by
//! `(score, key)`: score first, then byte-wise key comparison.
//!
//! ## Layout
//!
//! ```text
//! Level 2:  HEAD ──────────────────────► 50 ─────────────────► NIL
//!             │                           │
//! Level 1:  HEAD ────────► 20 ──────────► 50 ────────────────► NIL
//!             │             │             │
//! Level 0:  HEAD ──► 10 ◄─► 20 ◄─► 30 ◄─► 50 ◄─► 60 ──────────► NIL
//!                                                  ▲
//!                                                 tail
//! ```
//!
//! Elements live in an arena (`Vec` of slots plus a free list) and every
//! link is a slot index. The head sentinel is the `head` array itself: one
//! forward link per level up to the ceiling, behaving as score −∞.
//! Level 0 is doubly linked so the list can be walked from either end.
//!
//! ## Locking
//!
//! The engine itself is not synchronised. Mutation takes `&mut self`, so the
//! store wraps it in a single `RwLock`: lookups and iteration share the lock,
//! insert and delete hold it exclusively.

use super::score::Score;
use bytes::Bytes;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use std::fmt;

/// Hard upper bound on the number of levels a list may be configured with.
pub const MAX_HEIGHT: usize = 64;

/// Default level ceiling.
pub const DEFAULT_MAX_LEVEL: usize = 32;

/// Arena slot index of the next element, `None` meaning the head (when used
/// as a predecessor) or the end of the chain (when used as a successor).
type Link = Option<usize>;

/// One entry in the index.
#[derive(Debug, Clone)]
pub struct Element {
    key: Bytes,
    value: Bytes,
    score: Score,
    /// `forward[i]` is the next element at level `i`
    forward: Vec<Link>,
    /// Previous element at level 0 (`None` for the first element)
    backward: Link,
}

impl Element {
    /// The element's key.
    #[inline]
    pub fn key(&self) -> &Bytes {
        &self.key
    }

    /// The element's value.
    #[inline]
    pub fn value(&self) -> &Bytes {
        &self.value
    }

    /// The score the element is ordered by.
    #[inline]
    pub fn score(&self) -> Score {
        self.score
    }

    /// Number of levels the element participates in (at least 1).
    #[inline]
    pub fn height(&self) -> usize {
        self.forward.len()
    }

    /// Consumes the element, returning its key and value.
    pub fn into_parts(self) -> (Bytes, Bytes) {
        (self.key, self.value)
    }

    #[inline]
    fn precedes(&self, score: Score, key: &[u8]) -> bool {
        (self.score, &self.key[..]) < (score, key)
    }

    #[inline]
    fn matches(&self, score: Score, key: &[u8]) -> bool {
        self.score == score && self.key[..] == *key
    }
}

/// A probabilistic ordered index over `(score, key)` pairs.
///
/// Insert, delete and search run in O(log n) expected time. `first` and
/// `last` are O(1).
///
/// # Example
///
/// ```
/// use skipkv::storage::SkipList;
/// use bytes::Bytes;
///
/// let mut list = SkipList::seeded(7);
/// list.insert(Bytes::from("b"), Bytes::from("2"), 20);
/// list.insert(Bytes::from("a"), Bytes::from("1"), 10);
///
/// assert_eq!(list.first().map(|e| e.score()), Some(10));
/// assert_eq!(list.search(b"b", 20).map(|e| e.value().clone()), Some(Bytes::from("2")));
/// assert!(list.delete(b"a", 10).is_some());
/// assert_eq!(list.len(), 1);
/// ```
pub struct SkipList {
    nodes: Vec<Option<Element>>,
    free: Vec<usize>,
    head: Vec<Link>,
    tail: Link,
    len: usize,
    /// Number of levels currently in use, always in `1..=max_level`
    level: usize,
    max_level: usize,
    rng: SmallRng,
}

impl fmt::Debug for SkipList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkipList")
            .field("len", &self.len)
            .field("level", &self.level)
            .field("max_level", &self.max_level)
            .field("slots", &self.nodes.len())
            .finish()
    }
}

impl Default for SkipList {
    fn default() -> Self {
        Self::new()
    }
}

impl SkipList {
    /// Creates an empty list with the default ceiling and an entropy-seeded RNG.
    pub fn new() -> Self {
        Self::with_rng(DEFAULT_MAX_LEVEL, SmallRng::from_entropy())
    }

    /// Creates an empty list whose level draws are reproducible.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(DEFAULT_MAX_LEVEL, SmallRng::seed_from_u64(seed))
    }

    /// Creates an empty list with an explicit level ceiling and RNG.
    ///
    /// # Panics
    ///
    /// Panics if `max_level` is not in `1..=MAX_HEIGHT`.
    pub fn with_rng(max_level: usize, rng: SmallRng) -> Self {
        assert!(
            (1..=MAX_HEIGHT).contains(&max_level),
            "skip list max_level {max_level} outside 1..={MAX_HEIGHT}"
        );
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: vec![None; max_level],
            tail: None,
            len: 0,
            level: 1,
            max_level,
            rng,
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels currently in use.
    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    /// The configured level ceiling.
    #[inline]
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Inserts `(score, key)` with `value`.
    ///
    /// If the exact pair already exists its value is overwritten in place and
    /// no new element is created. Returns the inserted or updated element.
    pub fn insert(&mut self, key: Bytes, value: Bytes, score: Score) -> &Element {
        let mut update = [None; MAX_HEIGHT];
        let pred = self.locate(score, &key, &mut update);

        if let Some(id) = self.next_at(pred, 0) {
            if self.node(id).matches(score, &key) {
                let node = self.node_mut(id);
                node.value = value;
                return node;
            }
        }

        let height = self.random_height();
        if height > self.level {
            // update[level..height] are already None, i.e. the head
            self.level = height;
        }

        let forward: Vec<Link> = (0..height)
            .map(|lvl| self.next_at(update[lvl], lvl))
            .collect();
        let successor = forward[0];
        let id = self.alloc(Element {
            key,
            value,
            score,
            forward,
            backward: pred,
        });

        for (lvl, &at) in update.iter().enumerate().take(height) {
            self.set_next(at, lvl, Some(id));
        }

        match successor {
            Some(next) => self.node_mut(next).backward = Some(id),
            None => self.tail = Some(id),
        }

        self.len += 1;
        self.node(id)
    }

    /// Removes `(score, key)` and returns the removed element.
    ///
    /// Returns `None` without touching the list if the pair is absent.
    pub fn delete(&mut self, key: &[u8], score: Score) -> Option<Element> {
        let mut update = [None; MAX_HEIGHT];
        let pred = self.locate(score, key, &mut update);

        let id = self.next_at(pred, 0)?;
        if !self.node(id).matches(score, key) {
            return None;
        }

        let element = self.nodes[id]
            .take()
            .expect("skip list link points at a free slot");

        for (lvl, &next) in element.forward.iter().enumerate() {
            debug_assert_eq!(self.next_at(update[lvl], lvl), Some(id));
            self.set_next(update[lvl], lvl, next);
        }

        match element.forward[0] {
            Some(next) => self.node_mut(next).backward = element.backward,
            None => self.tail = element.backward,
        }

        while self.level > 1 && self.head[self.level - 1].is_none() {
            self.level -= 1;
        }

        self.free.push(id);
        self.len -= 1;
        Some(element)
    }

    /// Looks up the exact pair `(score, key)`.
    pub fn search(&self, key: &[u8], score: Score) -> Option<&Element> {
        self.seek(score, key)
            .map(|id| self.node(id))
            .filter(|node| node.matches(score, key))
    }

    /// Returns the elements with `min <= score <= max` in order.
    ///
    /// Collection stops after `limit` elements when `limit > 0`.
    pub fn range(&self, min: Score, max: Score, limit: usize) -> Vec<&Element> {
        let mut out = Vec::new();
        // an empty key sorts before every key with the same score
        let mut cursor = self.seek(min, &[]);

        while let Some(id) = cursor {
            let node = self.node(id);
            if node.score > max {
                break;
            }
            out.push(node);
            if limit > 0 && out.len() >= limit {
                break;
            }
            cursor = node.forward[0];
        }

        out
    }

    /// The smallest element.
    #[inline]
    pub fn first(&self) -> Option<&Element> {
        self.head[0].map(|id| self.node(id))
    }

    /// The largest element.
    #[inline]
    pub fn last(&self) -> Option<&Element> {
        self.tail.map(|id| self.node(id))
    }

    /// Iterates every element in order along level 0.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            front: self.head[0],
            back: self.tail,
            done: self.len == 0,
        }
    }

    /// Iterates from the first element not less than `(score, key)`.
    pub fn iter_from(&self, score: Score, key: &[u8]) -> Iter<'_> {
        let front = self.seek(score, key);
        Iter {
            list: self,
            front,
            back: self.tail,
            done: front.is_none(),
        }
    }

    /// Number of elements participating in each level in use.
    ///
    /// Index `i` holds the length of the level-`i` chain, so index 0 is
    /// always `len()`.
    pub fn level_counts(&self) -> Vec<usize> {
        (0..self.level)
            .map(|lvl| {
                let mut count = 0;
                let mut cursor = self.head[lvl];
                while let Some(id) = cursor {
                    count += 1;
                    cursor = self.node(id).forward[lvl];
                }
                count
            })
            .collect()
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head.fill(None);
        self.tail = None;
        self.len = 0;
        self.level = 1;
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    #[inline]
    fn node(&self, id: usize) -> &Element {
        self.nodes[id]
            .as_ref()
            .expect("skip list link points at a free slot")
    }

    #[inline]
    fn node_mut(&mut self, id: usize) -> &mut Element {
        self.nodes[id]
            .as_mut()
            .expect("skip list link points at a free slot")
    }

    /// Successor of `at` on level `lvl`, where `None` is the head.
    #[inline]
    fn next_at(&self, at: Link, lvl: usize) -> Link {
        match at {
            None => self.head[lvl],
            Some(id) => self.node(id).forward[lvl],
        }
    }

    #[inline]
    fn set_next(&mut self, at: Link, lvl: usize, to: Link) {
        match at {
            None => self.head[lvl] = to,
            Some(id) => self.node_mut(id).forward[lvl] = to,
        }
    }

    /// Walks down from the top level, recording in `update` the last element
    /// before `(score, key)` on every level in use. Returns the level-0
    /// predecessor.
    fn locate(&self, score: Score, key: &[u8], update: &mut [Link; MAX_HEIGHT]) -> Link {
        let mut x: Link = None;
        for lvl in (0..self.level).rev() {
            while let Some(next) = self.next_at(x, lvl) {
                if !self.node(next).precedes(score, key) {
                    break;
                }
                x = Some(next);
            }
            update[lvl] = x;
        }
        x
    }

    /// First element not less than `(score, key)`.
    fn seek(&self, score: Score, key: &[u8]) -> Link {
        let mut x: Link = None;
        for lvl in (0..self.level).rev() {
            while let Some(next) = self.next_at(x, lvl) {
                if !self.node(next).precedes(score, key) {
                    break;
                }
                x = Some(next);
            }
        }
        self.next_at(x, 0)
    }

    /// Geometric height with p = 1/2: each trailing one bit of a random word
    /// promotes the element one more level.
    #[inline]
    fn random_height(&mut self) -> usize {
        let r = self.rng.next_u64();
        (r.trailing_ones() as usize + 1).min(self.max_level)
    }

    fn alloc(&mut self, element: Element) -> usize {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(element);
                id
            }
            None => {
                self.nodes.push(Some(element));
                self.nodes.len() - 1
            }
        }
    }
}

impl fmt::Display for SkipList {
    /// Prints every level top-down as a chain of scores.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SkipList(level={}, len={}):", self.level, self.len)?;
        for lvl in (0..self.level).rev() {
            write!(f, "Level {lvl}: ")?;
            let mut cursor = self.head[lvl];
            while let Some(id) = cursor {
                let node = self.node(id);
                write!(f, "[{}] -> ", node.score)?;
                cursor = node.forward[lvl];
            }
            writeln!(f, "nil")?;
        }
        Ok(())
    }
}

/// Level-0 iterator over a [`SkipList`].
///
/// Walks forward links from the front and backward links from the back.
pub struct Iter<'a> {
    list: &'a SkipList,
    front: Link,
    back: Link,
    done: bool,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let id = self.front?;
        let node = self.list.node(id);
        if self.front == self.back {
            self.done = true;
        } else {
            self.front = node.forward[0];
        }
        Some(node)
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let id = self.back?;
        let node = self.list.node(id);
        if self.front == self.back {
            self.done = true;
        } else {
            self.back = node.backward;
        }
        Some(node)
    }
}

impl<'a> IntoIterator for &'a SkipList {
    type Item = &'a Element;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::collections::BTreeMap;

    fn key(s: &str) -> Bytes {
        Bytes::from(s.to_string())
    }

    /// Walks every level and checks the structural invariants.
    fn assert_invariants(list: &SkipList) {
        assert!(list.level >= 1 && list.level <= list.max_level);

        for lvl in 0..list.max_level {
            if lvl >= list.level {
                assert!(list.head[lvl].is_none(), "unused level {lvl} is linked");
                continue;
            }
            let mut prev: Option<&Element> = None;
            let mut cursor = list.head[lvl];
            while let Some(id) = cursor {
                let node = list.node(id);
                assert!(node.height() > lvl, "element below its own level");
                if let Some(p) = prev {
                    assert!(
                        (p.score, &p.key[..]) < (node.score, &node.key[..]),
                        "level {lvl} out of order"
                    );
                }
                prev = Some(node);
                cursor = node.forward[lvl];
            }
        }

        // level 0: backward links mirror forward links
        let mut expected_back: Link = None;
        let mut count = 0;
        let mut cursor = list.head[0];
        while let Some(id) = cursor {
            assert_eq!(list.node(id).backward, expected_back);
            expected_back = Some(id);
            count += 1;
            cursor = list.node(id).forward[0];
        }
        assert_eq!(count, list.len);
        assert_eq!(list.tail, expected_back);
        if list.level > 1 {
            assert!(list.head[list.level - 1].is_some(), "top level is empty");
        }
    }

    #[test]
    fn test_insert_and_search() {
        let mut list = SkipList::seeded(1);

        list.insert(key("b"), key("2"), 2);
        list.insert(key("a"), key("1"), 1);
        list.insert(key("c"), key("3"), 3);

        assert_eq!(list.len(), 3);
        assert_eq!(list.search(b"a", 1).map(|e| e.value().clone()), Some(key("1")));
        assert_eq!(list.search(b"c", 3).map(|e| e.value().clone()), Some(key("3")));
        // right key, wrong score
        assert!(list.search(b"a", 2).is_none());
        assert!(list.search(b"z", 1).is_none());
        assert_invariants(&list);
    }

    #[test]
    fn test_insert_existing_overwrites_in_place() {
        let mut list = SkipList::seeded(2);

        list.insert(key("k"), key("v1"), 5);
        let height = list.search(b"k", 5).map(|e| e.height());
        let updated = list.insert(key("k"), key("v2"), 5);
        assert_eq!(updated.value(), &key("v2"));

        assert_eq!(list.len(), 1);
        assert_eq!(list.search(b"k", 5).map(|e| e.height()), height);
        assert_invariants(&list);
    }

    #[test]
    fn test_delete() {
        let mut list = SkipList::seeded(3);
        for (i, k) in ["a", "b", "c", "d"].iter().enumerate() {
            list.insert(key(k), key("v"), i as Score);
        }

        let removed = list.delete(b"b", 1).expect("b is present");
        assert_eq!(removed.into_parts(), (key("b"), key("v")));
        assert_eq!(list.len(), 3);
        assert!(list.search(b"b", 1).is_none());
        assert_invariants(&list);

        // absent pair leaves the list untouched
        assert!(list.delete(b"b", 1).is_none());
        assert!(list.delete(b"a", 99).is_none());
        assert_eq!(list.len(), 3);
        assert_invariants(&list);
    }

    #[test]
    fn test_first_last_track_ends() {
        let mut list = SkipList::seeded(4);
        assert!(list.first().is_none());
        assert!(list.last().is_none());

        list.insert(key("m"), key("v"), 50);
        list.insert(key("a"), key("v"), 10);
        list.insert(key("z"), key("v"), 90);

        assert_eq!(list.first().map(|e| e.score()), Some(10));
        assert_eq!(list.last().map(|e| e.score()), Some(90));

        list.delete(b"z", 90);
        assert_eq!(list.last().map(|e| e.score()), Some(50));
        list.delete(b"a", 10);
        assert_eq!(list.first().map(|e| e.score()), Some(50));
        list.delete(b"m", 50);
        assert!(list.first().is_none());
        assert!(list.last().is_none());
        assert_invariants(&list);
    }

    #[test]
    fn test_equal_scores_break_ties_by_key() {
        let mut list = SkipList::seeded(5);
        for k in ["delta", "alpha", "charlie", "bravo"] {
            list.insert(key(k), key("v"), 7);
        }
        list.insert(key("zulu"), key("v"), 6);

        let keys: Vec<Bytes> = list.iter().map(|e| e.key().clone()).collect();
        assert_eq!(
            keys,
            vec![key("zulu"), key("alpha"), key("bravo"), key("charlie"), key("delta")]
        );
        assert!(list.delete(b"charlie", 7).is_some());
        assert!(list.search(b"bravo", 7).is_some());
        assert_invariants(&list);
    }

    #[test]
    fn test_range() {
        let mut list = SkipList::seeded(6);
        for i in 0..20u64 {
            list.insert(key(&format!("k{i:02}")), key("v"), i * 10);
        }

        let scores: Vec<Score> = list.range(35, 80, 0).iter().map(|e| e.score()).collect();
        assert_eq!(scores, vec![40, 50, 60, 70, 80]);

        let limited: Vec<Score> = list.range(0, 1000, 3).iter().map(|e| e.score()).collect();
        assert_eq!(limited, vec![0, 10, 20]);

        assert!(list.range(1000, 2000, 0).is_empty());
        assert!(list.range(80, 35, 0).is_empty());
        assert_eq!(list.range(Score::MIN, Score::MAX, 0).len(), 20);
    }

    #[test]
    fn test_iter_both_directions() {
        let mut list = SkipList::seeded(7);
        for i in [5u64, 1, 4, 2, 3] {
            list.insert(key(&i.to_string()), key("v"), i);
        }

        let forward: Vec<Score> = list.iter().map(|e| e.score()).collect();
        let mut backward: Vec<Score> = list.iter().rev().map(|e| e.score()).collect();
        backward.reverse();
        assert_eq!(forward, vec![1, 2, 3, 4, 5]);
        assert_eq!(forward, backward);

        // meeting in the middle yields every element exactly once
        let mut it = list.iter();
        let mut seen = vec![];
        while let (Some(a), b) = (it.next(), it.next_back()) {
            seen.push(a.score());
            if let Some(b) = b {
                seen.push(b.score());
            }
        }
        seen.sort();
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_iter_from() {
        let mut list = SkipList::seeded(8);
        for i in 0..10u64 {
            list.insert(key("k"), key("v"), i);
        }

        let tail: Vec<Score> = list.iter_from(7, b"").map(|e| e.score()).collect();
        assert_eq!(tail, vec![7, 8, 9]);
        // key tie-break: ("k", 7) is not less than itself
        assert_eq!(list.iter_from(7, b"k").next().map(|e| e.score()), Some(7));
        assert_eq!(list.iter_from(7, b"l").next().map(|e| e.score()), Some(8));
        assert!(list.iter_from(10, b"").next().is_none());
    }

    #[test]
    fn test_level_shrinks_after_deletes() {
        let mut list = SkipList::seeded(9);
        for i in 0..256u64 {
            list.insert(key(&i.to_string()), key("v"), i);
        }
        assert!(list.level() > 1);

        for i in 0..256u64 {
            assert!(list.delete(i.to_string().as_bytes(), i).is_some());
        }
        assert!(list.is_empty());
        assert_eq!(list.level(), 1);
        assert_invariants(&list);
    }

    #[test]
    fn test_slots_are_reused() {
        let mut list = SkipList::seeded(10);
        for i in 0..8u64 {
            list.insert(key(&i.to_string()), key("v"), i);
        }
        for i in 0..8u64 {
            list.delete(i.to_string().as_bytes(), i);
        }
        for i in 0..8u64 {
            list.insert(key(&i.to_string()), key("v"), i);
        }
        assert_eq!(list.nodes.len(), 8);
        assert_invariants(&list);
    }

    #[test]
    fn test_clear() {
        let mut list = SkipList::seeded(11);
        for i in 0..100u64 {
            list.insert(key(&i.to_string()), key("v"), i);
        }
        list.clear();
        assert!(list.is_empty());
        assert!(list.first().is_none());
        assert_eq!(list.level(), 1);
        assert_invariants(&list);

        list.insert(key("again"), key("v"), 1);
        assert_eq!(list.len(), 1);
        assert_invariants(&list);
    }

    #[test]
    fn test_random_operations_keep_order() {
        let mut list = SkipList::seeded(12);
        let mut model: BTreeMap<(Score, Vec<u8>), Bytes> = BTreeMap::new();
        let mut rng = SmallRng::seed_from_u64(99);

        for step in 0..5_000 {
            // few scores and keys so ties and overwrites are common
            let score: Score = rng.gen_range(0..16);
            let k = format!("key{}", rng.gen_range(0..64));
            if rng.gen_bool(0.6) {
                let v = Bytes::from(format!("v{step}"));
                list.insert(Bytes::from(k.clone()), v.clone(), score);
                model.insert((score, k.into_bytes()), v);
            } else {
                let removed = list.delete(k.as_bytes(), score).is_some();
                assert_eq!(removed, model.remove(&(score, k.into_bytes())).is_some());
            }

            if step % 500 == 0 {
                assert_invariants(&list);
            }
        }

        assert_invariants(&list);
        let actual: Vec<(Score, Vec<u8>, Bytes)> = list
            .iter()
            .map(|e| (e.score(), e.key().to_vec(), e.value().clone()))
            .collect();
        let expected: Vec<(Score, Vec<u8>, Bytes)> = model
            .into_iter()
            .map(|((s, k), v)| (s, k, v))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_level_promotion_distribution() {
        let mut list = SkipList::seeded(13);
        let n = 100_000u64;
        for i in 0..n {
            list.insert(key(&i.to_string()), Bytes::new(), i);
        }

        let counts = list.level_counts();
        assert_eq!(counts[0], n as usize);
        for (lvl, &count) in counts.iter().enumerate().take(6).skip(1) {
            let observed = count as f64 / n as f64;
            let expected = 0.5f64.powi(lvl as i32);
            assert!(
                (observed - expected).abs() < 0.01,
                "level {lvl}: observed {observed:.4}, expected {expected:.4}"
            );
        }
    }

    #[test]
    fn test_height_respects_ceiling() {
        let mut list = SkipList::with_rng(2, SmallRng::seed_from_u64(14));
        for i in 0..1_000u64 {
            let e = list.insert(key(&i.to_string()), Bytes::new(), i);
            assert!(e.height() <= 2);
        }
        assert!(list.level() <= 2);
        assert_invariants(&list);
    }

    #[test]
    #[should_panic(expected = "max_level")]
    fn test_ceiling_above_hard_limit_panics() {
        let _ = SkipList::with_rng(MAX_HEIGHT + 1, SmallRng::seed_from_u64(0));
    }

    #[test]
    fn test_display_lists_every_level() {
        let mut list = SkipList::seeded(15);
        list.insert(key("a"), key("v"), 1);
        list.insert(key("b"), key("v"), 2);

        let out = list.to_string();
        assert!(out.starts_with(&format!("SkipList(level={}, len=2):", list.level())));
        assert!(out.contains("Level 0: [1] -> [2] -> nil"));
    }
}
