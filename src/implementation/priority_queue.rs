// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! This module provides the priority queue driving the Dijkstra sweeps over
//! abstract state spaces. Goal distances are typically tiny integers, so the
//! queue starts out as a bucket queue; when the keys grow out of proportion
//! with the number of pushed entries it converts itself into a binary heap
//! once and for all.

use binary_heap_plus::{BinaryHeap, MinComparator};

use crate::Cost;

/// Extra headroom granted to the bucket representation: the queue converts
/// to a heap as soon as a key would require more buckets than
/// `2 * pushes + 100`.
const BUCKET_HEADROOM: usize = 100;

enum Representation {
    Buckets {
        buckets: Vec<Vec<usize>>,
        /// Index of the first possibly non-empty bucket. Keys are popped in
        /// non-decreasing order, so this only ever moves forward.
        current: usize,
        len: usize,
    },
    Heap(BinaryHeap<(Cost, usize), MinComparator>),
}

/// A monotone min-priority queue over `(Cost, value)` entries with an
/// adaptive representation. Infinite keys are rejected by construction:
/// whatever is unreachable is simply never pushed.
pub struct AdaptiveQueue {
    representation: Representation,
    num_pushes: usize,
}

impl Default for AdaptiveQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveQueue {
    pub fn new() -> Self {
        AdaptiveQueue {
            representation: Representation::Buckets { buckets: vec![], current: 0, len: 0 },
            num_pushes: 0,
        }
    }

    /// Empties the queue while keeping the bucket allocations around, so
    /// that one queue can serve many Dijkstra sweeps.
    pub fn clear(&mut self) {
        self.num_pushes = 0;
        match &mut self.representation {
            Representation::Buckets { buckets, current, len } => {
                for bucket in buckets.iter_mut() {
                    bucket.clear();
                }
                *current = 0;
                *len = 0;
            }
            Representation::Heap(heap) => heap.clear(),
        }
    }

    pub fn push(&mut self, key: Cost, value: usize) {
        debug_assert!(!key.is_infinite());
        self.num_pushes += 1;
        if let Representation::Buckets { .. } = &self.representation {
            let index = key.finite().expect("finite key") as usize;
            if index + 1 > 2 * self.num_pushes + BUCKET_HEADROOM {
                self.convert_to_heap();
            } else {
                if let Representation::Buckets { buckets, len, .. } = &mut self.representation {
                    if index >= buckets.len() {
                        buckets.resize_with(index + 1, Vec::new);
                    }
                    buckets[index].push(value);
                    *len += 1;
                }
                return;
            }
        }
        if let Representation::Heap(heap) = &mut self.representation {
            heap.push((key, value));
        }
    }

    pub fn pop(&mut self) -> Option<(Cost, usize)> {
        match &mut self.representation {
            Representation::Buckets { buckets, current, len } => {
                if *len == 0 {
                    return None;
                }
                while buckets[*current].is_empty() {
                    *current += 1;
                }
                *len -= 1;
                let value = buckets[*current].pop().expect("bucket is non empty");
                Some((Cost::new(*current as u32), value))
            }
            Representation::Heap(heap) => heap.pop(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.representation {
            Representation::Buckets { len, .. } => *len == 0,
            Representation::Heap(heap) => heap.is_empty(),
        }
    }

    fn convert_to_heap(&mut self) {
        let buckets = std::mem::replace(&mut self.representation, Representation::Heap(BinaryHeap::new_min()));
        if let (Representation::Buckets { buckets, current, .. }, Representation::Heap(heap)) =
            (buckets, &mut self.representation)
        {
            for (key, bucket) in buckets.into_iter().enumerate().skip(current) {
                for value in bucket {
                    heap.push((Cost::new(key as u32), value));
                }
            }
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_adaptive_queue {
    use super::*;

    #[test]
    fn by_default_it_is_empty() {
        let queue = AdaptiveQueue::new();
        assert!(queue.is_empty());
    }

    #[test]
    fn entries_come_out_in_nondecreasing_key_order() {
        let mut queue = AdaptiveQueue::new();
        queue.push(Cost::new(3), 30);
        queue.push(Cost::new(1), 10);
        queue.push(Cost::new(2), 20);
        queue.push(Cost::new(1), 11);
        let mut keys = vec![];
        while let Some((key, _)) = queue.pop() {
            keys.push(key);
        }
        assert_eq!(
            vec![Cost::new(1), Cost::new(1), Cost::new(2), Cost::new(3)],
            keys
        );
    }

    #[test]
    fn a_large_key_converts_the_queue_to_a_heap_without_losing_entries() {
        let mut queue = AdaptiveQueue::new();
        queue.push(Cost::new(2), 2);
        queue.push(Cost::new(1_000_000), 99);
        queue.push(Cost::new(5), 5);
        assert_eq!(Some((Cost::new(2), 2)), queue.pop());
        assert_eq!(Some((Cost::new(5), 5)), queue.pop());
        assert_eq!(Some((Cost::new(1_000_000), 99)), queue.pop());
        assert_eq!(None, queue.pop());
    }

    #[test]
    fn clearing_makes_the_queue_reusable() {
        let mut queue = AdaptiveQueue::new();
        queue.push(Cost::new(7), 7);
        queue.clear();
        assert!(queue.is_empty());
        queue.push(Cost::new(1), 1);
        assert_eq!(Some((Cost::new(1), 1)), queue.pop());
    }
}
