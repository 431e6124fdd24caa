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

//! Small utilities shared across the implementation: wall-clock bookkeeping,
//! overflow-safe size computations and a flat pattern buffer.

use std::time::{Duration, Instant};

use crate::Variable;

/// An accumulating stopwatch that can be paused and resumed. Used to charge
/// only the time actually spent improving the heuristic against the
/// improvement budget.
#[derive(Debug)]
pub(crate) struct StopWatch {
    elapsed: Duration,
    started: Option<Instant>,
}

impl StopWatch {
    pub fn new() -> Self {
        StopWatch { elapsed: Duration::ZERO, started: None }
    }
    pub fn resume(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }
    pub fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            self.elapsed += started.elapsed();
        }
    }
    pub fn elapsed(&self) -> Duration {
        match self.started {
            Some(started) => self.elapsed + started.elapsed(),
            None => self.elapsed,
        }
    }
}

/// A monotonic countdown used to bound the pattern enumeration. Expiry is
/// polled between patterns; nothing is ever interrupted mid-computation.
#[derive(Debug, Copy, Clone)]
pub(crate) struct CountdownTimer {
    deadline: Instant,
}

impl CountdownTimer {
    pub fn new(budget: Duration) -> Self {
        CountdownTimer { deadline: Instant::now() + budget }
    }
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

/// Returns true iff `factor1 * factor2` does not exceed `limit`. The check
/// itself cannot overflow.
pub(crate) fn is_product_within_limit(factor1: usize, factor2: usize, limit: usize) -> bool {
    debug_assert!(factor2 > 0);
    factor1 <= limit / factor2
}

/// A flat buffer of patterns. Storing all patterns of one size back to back
/// in a single allocation keeps the per-pattern overhead of the enumeration
/// down and the scoring loops cache friendly.
#[derive(Debug, Default)]
pub(crate) struct PatternPool {
    data: Vec<Variable>,
    offsets: Vec<usize>,
}

impl PatternPool {
    pub fn new() -> Self {
        PatternPool { data: vec![], offsets: vec![0] }
    }
    pub fn push(&mut self, pattern: &[Variable]) {
        self.data.extend_from_slice(pattern);
        self.offsets.push(self.data.len());
    }
    pub fn get(&self, id: usize) -> &[Variable] {
        &self.data[self.offsets[id]..self.offsets[id + 1]]
    }
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_utils {
    use super::*;

    #[test]
    fn a_product_within_limit_is_accepted() {
        assert!(is_product_within_limit(10, 10, 100));
        assert!(!is_product_within_limit(10, 11, 100));
        assert!(is_product_within_limit(usize::MAX / 2, 2, usize::MAX));
    }

    #[test]
    fn the_pool_hands_back_the_slices_it_was_given() {
        let mut pool = PatternPool::new();
        pool.push(&[Variable(0)]);
        pool.push(&[Variable(1), Variable(2)]);
        assert_eq!(2, pool.len());
        assert_eq!(&[Variable(0)], pool.get(0));
        assert_eq!(&[Variable(1), Variable(2)], pool.get(1));
    }

    #[test]
    fn a_stopped_watch_does_not_accumulate() {
        let mut watch = StopWatch::new();
        watch.resume();
        watch.stop();
        let frozen = watch.elapsed();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(frozen, watch.elapsed());
    }
}
