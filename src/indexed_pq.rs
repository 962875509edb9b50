use std::fmt::Formatter;

use derive_more::{Display, Error};
use strum::VariantNames;
use strum_macros::{EnumString, EnumVariantNames};

/// Capacity used when a queue is requested with capacity zero
pub const DEFAULT_CAPACITY: usize = 50;

/// Marker in the position table for keys that are not in the queue
const ABSENT: usize = usize::MAX;

/// Which end of the priority range sits at the top of the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumVariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum Direction {
    #[display(fmt = "min")]
    Min,
    #[display(fmt = "max")]
    Max,
}

impl Direction {
    /// Returns a list of all direction names accepted by `from_str`
    pub fn available_directions() -> Vec<String> {
        Self::VARIANTS.iter()
            .map(<&str>::to_string)
            .collect::<Vec<_>>()
    }

    /// Returns `true` if priority `a` belongs closer to the top than priority `b`
    fn is_more_extreme(self, a: f64, b: f64) -> bool {
        match self {
            Self::Min => a < b,
            Self::Max => a > b,
        }
    }
}

/// Reasons for a queue operation to be rejected.
/// A rejected operation never modifies the queue.
#[derive(Debug, Display, Error, PartialEq)]
pub enum QueueError {
    #[display(fmt = "Key {} is outside of [0, {})", key, capacity)]
    OutOfRange { key: usize, capacity: usize },
    #[display(fmt = "Key {} is already in the queue", key)]
    Duplicate { key: usize },
    #[display(fmt = "Key {} is not in the queue", key)]
    Absent { key: usize },
    #[display(fmt = "Priority of key {} is not a number", key)]
    NotANumber { key: usize },
    #[display(fmt = "Queue is empty")]
    Empty,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    key: usize,
    priority: f64,
}

/// Binary heap over the dense key space `[0, capacity)` that keeps track of the
/// slot of every key, so priorities can be looked up, changed and removed by key.
#[derive(Debug)]
pub struct IndexedPriorityQueue {
    heap: Vec<Entry>,
    positions: Vec<usize>,
    direction: Direction,
}

/// Get the left child index of `index`
fn get_left(index: usize) -> usize {
    2 * index + 1
}

/// Get the right child index of `index`
fn get_right(index: usize) -> usize {
    2 * index + 2
}

/// Get the parent index of `index`
fn get_parent(index: usize) -> usize {
    if index > 0 {
        (index - 1) / 2
    } else {
        0
    }
}

impl IndexedPriorityQueue {
    /// Create a new, empty `IndexedPriorityQueue` for keys in `[0, capacity)`.
    /// A capacity of zero is replaced by `DEFAULT_CAPACITY`.
    ///
    /// The position table for all keys is allocated up front, so this panics if
    /// `capacity` positions do not fit into memory.
    pub fn with_capacity(capacity: usize, direction: Direction) -> Self {
        let capacity = if capacity == 0 {
            log::warn!("Queue capacity must be positive, using {} instead", DEFAULT_CAPACITY);
            DEFAULT_CAPACITY
        } else {
            capacity
        };

        Self {
            heap: Vec::with_capacity(capacity),
            positions: vec![ABSENT; capacity],
            direction,
        }
    }

    /// Number of entries currently in the queue
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns `true` if the queue holds no entries
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Upper bound (exclusive) of the key space, fixed on creation
    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns `true` if the queue holds an entry for `key`.
    /// Keys outside of the key space are never contained.
    pub fn contains(&self, key: usize) -> bool {
        key < self.capacity() && self.positions[key] != ABSENT
    }

    /// Get the priority of `key`, or `None` if there is no entry for `key`
    pub fn get_priority(&self, key: usize) -> Option<f64> {
        if self.contains(key) {
            Some(self.heap[self.positions[key]].priority)
        } else {
            None
        }
    }

    /// Get key and priority of the top entry without removing it
    pub fn peek(&self) -> Option<(usize, f64)> {
        self.heap.first().map(|entry| (entry.key, entry.priority))
    }

    /// Iterate over all `(key, priority)` pairs in heap slot order
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.heap.iter().map(|entry| (entry.key, entry.priority))
    }

    /// Insert `key` with `priority`.
    /// Fails if `key` is out of range, already present or `priority` is NaN.
    pub fn insert(&mut self, key: usize, priority: f64) -> Result<(), QueueError> {
        self.check_range(key)?;
        if self.contains(key) {
            return Err(QueueError::Duplicate { key });
        }
        if priority.is_nan() {
            return Err(QueueError::NotANumber { key });
        }

        let index = self.heap.len();
        self.heap.push(Entry { key, priority });
        self.positions[key] = index;
        self.sift_up(index);

        Ok(())
    }

    /// Remove the top entry and return its key and priority
    pub fn delete_top(&mut self) -> Result<(usize, f64), QueueError> {
        let (key, priority) = self.peek().ok_or(QueueError::Empty)?;
        self.remove(key)?;
        Ok((key, priority))
    }

    /// Set the priority of `key` to `new_priority` and move the entry to its new slot.
    /// Fails if there is no entry for `key` or `new_priority` is NaN.
    pub fn change_priority(&mut self, key: usize, new_priority: f64) -> Result<(), QueueError> {
        let index = self.position_of(key)?;
        if new_priority.is_nan() {
            return Err(QueueError::NotANumber { key });
        }

        let old_priority = self.heap[index].priority;
        self.heap[index].priority = new_priority;

        if self.direction.is_more_extreme(old_priority, new_priority) {
            self.sift_down(index);
        } else {
            self.sift_up(index);
        }

        Ok(())
    }

    /// Remove the entry for `key`
    pub fn remove(&mut self, key: usize) -> Result<(), QueueError> {
        let index = self.position_of(key)?;
        let last = self.heap.len() - 1;

        self.swap(index, last);
        self.heap.pop();
        self.positions[key] = ABSENT;

        // The former tail may belong above or below the vacated slot
        if index < self.heap.len() && self.sift_down(index) == index {
            self.sift_up(index);
        }

        Ok(())
    }

    fn check_range(&self, key: usize) -> Result<(), QueueError> {
        if key < self.capacity() {
            Ok(())
        } else {
            Err(QueueError::OutOfRange { key, capacity: self.capacity() })
        }
    }

    /// Get the heap slot of `key`
    fn position_of(&self, key: usize) -> Result<usize, QueueError> {
        self.check_range(key)?;
        match self.positions[key] {
            ABSENT => Err(QueueError::Absent { key }),
            index => Ok(index),
        }
    }

    /// Set `entry` at position `index`
    fn set_entry_and_pos(&mut self, entry: Entry, index: usize) {
        self.positions[entry.key] = index;
        self.heap[index] = entry;
    }

    /// Swap the entries at `a` and `b`
    fn swap(&mut self, a: usize, b: usize) {
        let a_entry = self.heap[a];
        let b_entry = self.heap[b];

        self.set_entry_and_pos(a_entry, b);
        self.set_entry_and_pos(b_entry, a);
    }

    /// Move the entry at `index` towards the root while it is more extreme than its parent.
    /// Returns the final slot of the entry.
    fn sift_up(&mut self, mut index: usize) -> usize {
        while index > 0 {
            let parent = get_parent(index);
            if !self.direction.is_more_extreme(self.heap[index].priority,
                                               self.heap[parent].priority) {
                break;
            }
            self.swap(parent, index);
            index = parent;
        }
        index
    }

    /// Move the entry at `index` away from the root while one of its children is more extreme.
    /// Returns the final slot of the entry.
    fn sift_down(&mut self, mut index: usize) -> usize {
        let len = self.heap.len();
        loop {
            let left = get_left(index);
            let right = get_right(index);
            if left >= len {
                break;
            }

            let mut child = left;
            if right < len && self.direction.is_more_extreme(self.heap[right].priority,
                                                             self.heap[left].priority) {
                child = right;
            }

            if !self.direction.is_more_extreme(self.heap[child].priority,
                                               self.heap[index].priority) {
                break;
            }
            self.swap(index, child);
            index = child;
        }
        index
    }

    /// Check heap order and the consistency of the position table
    #[cfg(test)]
    pub(crate) fn is_valid(&self) -> bool {
        let ordered = (1..self.heap.len()).all(|i| {
            let parent = &self.heap[get_parent(i)];
            !self.direction.is_more_extreme(self.heap[i].priority, parent.priority)
        });
        let indexed = self.positions.iter()
            .enumerate()
            .filter(|&(_, &pos)| pos != ABSENT)
            .all(|(key, &pos)| pos < self.heap.len() && self.heap[pos].key == key);
        let counted = self.positions.iter()
            .filter(|&&pos| pos != ABSENT)
            .count() == self.heap.len();

        ordered && indexed && counted
    }
}

impl std::fmt::Display for IndexedPriorityQueue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  {} queue, size {} of {}", self.direction, self.len(), self.capacity())?;
        for (slot, (key, priority)) in self.iter().enumerate() {
            writeln!(f, "    [{}] id = {} priority = {:.6}", slot, key, priority)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use rand::prelude::*;

    use crate::indexed_pq::{Direction, IndexedPriorityQueue, QueueError, DEFAULT_CAPACITY};

    fn drain(queue: &mut IndexedPriorityQueue) -> Vec<(usize, f64)> {
        let mut drained = Vec::with_capacity(queue.len());
        while let Ok(top) = queue.delete_top() {
            assert!(queue.is_valid());
            drained.push(top);
        }
        drained
    }

    fn sorted(mut priorities: Vec<f64>, direction: Direction) -> Vec<f64> {
        priorities.sort_by(|a, b| a.partial_cmp(b).unwrap());
        if direction == Direction::Max {
            priorities.reverse();
        }
        priorities
    }

    #[test]
    fn test_min_order() {
        let mut queue = IndexedPriorityQueue::with_capacity(3, Direction::Min);
        queue.insert(0, 3.0).unwrap();
        queue.insert(1, 1.0).unwrap();
        queue.insert(2, 2.0).unwrap();

        assert_eq!(queue.peek(), Some((1, 1.0)));
        assert_eq!(drain(&mut queue), vec![(1, 1.0), (2, 2.0), (0, 3.0)]);
        assert_eq!(queue.delete_top(), Err(QueueError::Empty));
    }

    #[test]
    fn test_max_order() {
        let mut queue = IndexedPriorityQueue::with_capacity(10, Direction::Max);
        let mut val = 1.0;
        for key in 0..10 {
            queue.insert(key, val).unwrap();
            val -= 0.1;
        }

        let keys: Vec<_> = drain(&mut queue).iter()
            .map(|&(key, _)| key)
            .collect();
        assert_eq!(keys, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_random_drain() {
        let mut rng = thread_rng();
        for direction in [Direction::Min, Direction::Max] {
            for _ in 0..20 {
                let n = rng.gen_range(1..64);
                let mut keys: Vec<usize> = (0..n).collect();
                keys.shuffle(&mut rng);

                let mut queue = IndexedPriorityQueue::with_capacity(n, direction);
                let mut priorities = Vec::with_capacity(n);
                for &key in &keys {
                    let priority = rng.gen_range(0.0..10.0);
                    priorities.push(priority);
                    queue.insert(key, priority).unwrap();
                    assert!(queue.is_valid());
                }

                let drained: Vec<_> = drain(&mut queue).iter()
                    .map(|&(_, priority)| priority)
                    .collect();
                assert_eq!(drained, sorted(priorities, direction));
            }
        }
    }

    #[test]
    fn test_change_priority() {
        let mut rng = thread_rng();
        for direction in [Direction::Min, Direction::Max] {
            for _ in 0..50 {
                let n = rng.gen_range(1..32);
                let mut keys: Vec<usize> = (0..n).collect();
                keys.shuffle(&mut rng);

                let mut queue = IndexedPriorityQueue::with_capacity(n, direction);
                let mut priorities = vec![0.0; n];
                for &key in &keys {
                    priorities[key] = rng.gen_range(0.0..10.0);
                    queue.insert(key, priorities[key]).unwrap();
                }

                let changed = rng.gen_range(0..n);
                let new_priority = rng.gen_range(-5.0..15.0);
                queue.change_priority(changed, new_priority).unwrap();
                priorities[changed] = new_priority;
                assert!(queue.is_valid());
                assert_eq!(queue.get_priority(changed), Some(new_priority));

                let drained: Vec<_> = drain(&mut queue).iter()
                    .map(|&(_, priority)| priority)
                    .collect();
                assert_eq!(drained, sorted(priorities, direction));
            }
        }
    }

    #[test]
    fn test_remove() {
        let mut rng = thread_rng();
        let n = 100;
        let mut queue = IndexedPriorityQueue::with_capacity(n, Direction::Min);
        let mut priorities = vec![0.0; n];
        for key in 0..n {
            priorities[key] = rng.gen_range(0.0..100.0);
            queue.insert(key, priorities[key]).unwrap();
        }

        let mut removed: Vec<usize> = (0..n).collect();
        removed.shuffle(&mut rng);
        removed.truncate(n / 2);
        for &key in &removed {
            queue.remove(key).unwrap();
            assert!(queue.is_valid());
            assert!(!queue.contains(key));
            assert_eq!(queue.remove(key), Err(QueueError::Absent { key }));
        }
        assert_eq!(queue.len(), n - removed.len());

        let remaining: Vec<_> = (0..n)
            .filter(|key| !removed.contains(key))
            .map(|key| priorities[key])
            .collect();
        let drained: Vec<_> = drain(&mut queue).iter()
            .map(|&(_, priority)| priority)
            .collect();
        assert_eq!(drained, sorted(remaining, Direction::Min));
    }

    #[test]
    fn test_remove_last_and_root() {
        let mut queue = IndexedPriorityQueue::with_capacity(4, Direction::Max);
        queue.insert(0, 1.0).unwrap();
        queue.insert(1, 4.0).unwrap();
        queue.insert(2, 3.0).unwrap();
        queue.insert(3, 2.0).unwrap();

        queue.remove(3).unwrap();
        assert!(queue.is_valid());
        queue.remove(1).unwrap();
        assert!(queue.is_valid());
        assert_eq!(queue.peek(), Some((2, 3.0)));
        queue.remove(2).unwrap();
        queue.remove(0).unwrap();
        assert!(queue.is_empty());
        assert!(queue.is_valid());
    }

    #[test]
    fn test_remove_moves_tail_up() {
        let mut queue = IndexedPriorityQueue::with_capacity(7, Direction::Min);
        for (key, priority) in [1.0, 10.0, 2.0, 11.0, 12.0, 3.0, 4.0].into_iter().enumerate() {
            queue.insert(key, priority).unwrap();
        }
        let slots: Vec<_> = queue.iter().map(|(_, priority)| priority).collect();
        assert_eq!(slots, vec![1.0, 10.0, 2.0, 11.0, 12.0, 3.0, 4.0]);

        // The tail (key 6, priority 4) lands below 10 and has to rise
        queue.remove(3).unwrap();
        assert!(queue.is_valid());
        let slots: Vec<_> = queue.iter().collect();
        assert_eq!(slots, vec![(0, 1.0), (6, 4.0), (2, 2.0), (1, 10.0), (4, 12.0), (5, 3.0)]);
        assert_eq!(queue.get_priority(6), Some(4.0));
        assert!(!queue.contains(3));
    }

    #[test]
    fn test_failures_do_not_mutate() {
        let mut queue = IndexedPriorityQueue::with_capacity(5, Direction::Min);
        queue.insert(1, 2.0).unwrap();
        queue.insert(3, 1.0).unwrap();

        assert_eq!(queue.insert(1, 0.5), Err(QueueError::Duplicate { key: 1 }));
        assert_eq!(queue.change_priority(2, 0.5), Err(QueueError::Absent { key: 2 }));
        assert_eq!(queue.remove(4), Err(QueueError::Absent { key: 4 }));
        assert_eq!(queue.insert(2, f64::NAN), Err(QueueError::NotANumber { key: 2 }));
        assert_eq!(queue.change_priority(1, f64::NAN), Err(QueueError::NotANumber { key: 1 }));
        assert_eq!(queue.get_priority(0), None);

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.capacity(), 5);
        assert_eq!(queue.get_priority(1), Some(2.0));
        assert_eq!(queue.get_priority(3), Some(1.0));
        assert!(queue.is_valid());
    }

    #[test]
    fn test_capacity_bounds() {
        let mut queue = IndexedPriorityQueue::with_capacity(3, Direction::Min);

        assert_eq!(queue.insert(3, 1.0), Err(QueueError::OutOfRange { key: 3, capacity: 3 }));
        assert_eq!(queue.insert(usize::MAX, 1.0),
                   Err(QueueError::OutOfRange { key: usize::MAX, capacity: 3 }));
        assert!(!queue.contains(3));
        assert_eq!(queue.get_priority(3), None);
        assert_eq!(queue.change_priority(3, 1.0), Err(QueueError::OutOfRange { key: 3, capacity: 3 }));
        assert_eq!(queue.remove(3), Err(QueueError::OutOfRange { key: 3, capacity: 3 }));
        assert!(queue.is_empty());

        for key in 0..3 {
            queue.insert(key, key as f64).unwrap();
        }
        assert_eq!(queue.len(), queue.capacity());
    }

    #[test]
    fn test_default_capacity() {
        let queue = IndexedPriorityQueue::with_capacity(0, Direction::Max);
        assert_eq!(queue.capacity(), DEFAULT_CAPACITY);
        assert_eq!(queue.direction(), Direction::Max);
    }

    #[test]
    fn test_infinite_priorities() {
        let mut queue = IndexedPriorityQueue::with_capacity(4, Direction::Min);
        for key in 0..4 {
            queue.insert(key, f64::INFINITY).unwrap();
        }
        queue.change_priority(2, 0.0).unwrap();
        queue.change_priority(0, 5.0).unwrap();

        assert_eq!(queue.delete_top(), Ok((2, 0.0)));
        assert_eq!(queue.delete_top(), Ok((0, 5.0)));
        assert_eq!(queue.delete_top().map(|(_, priority)| priority), Ok(f64::INFINITY));
        assert!(queue.is_valid());
    }

    #[test]
    fn test_direction_names() {
        assert_eq!("min".parse::<Direction>().unwrap(), Direction::Min);
        assert_eq!("max".parse::<Direction>().unwrap(), Direction::Max);
        assert!("up".parse::<Direction>().is_err());
        assert_eq!(Direction::available_directions(), vec!["min", "max"]);
        assert_eq!(Direction::Min.to_string(), "min");
    }
}
