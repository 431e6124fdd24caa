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

use crate::{Abstraction, Cost, Order};

/// This trait abstracts away the policy that decides in which order the
/// abstractions consume the cost function when a new saturated cost
/// partitioning is computed for some state. The quality of the resulting
/// heuristic depends almost entirely on this order, so this is **the**
/// tuning knob of the whole scheme.
pub trait OrderGenerator {
    /// Called once, before any state is evaluated, with the full set of
    /// abstractions and the original operator costs. Generators that rely on
    /// precomputed per-abstraction information (goal distances, saturated
    /// cost mass) derive it here.
    fn initialize(&mut self, abstractions: &[Box<dyn Abstraction>], costs: &[Cost]);

    /// Produces a permutation of `0..abstractions.len()` tailored to the
    /// state whose abstract state ids are given.
    fn order_for_state(
        &mut self,
        abstractions: &[Box<dyn Abstraction>],
        costs: &[Cost],
        abstract_state_ids: &[usize],
    ) -> Order;
}
