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

//! This module provides the cheap dead-end classifier that runs before any
//! lookup table is consulted: per abstraction, the set of abstract states
//! from which no goal is reachable. A concrete state is a proven dead end
//! as soon as a single abstraction maps it into that set, independently of
//! any cost partitioning or order.

use bit_set::BitSet;

use crate::{Abstraction, Cost};

#[derive(Debug)]
struct UnsolvabilityInfo {
    abstraction_id: usize,
    unsolvable_states: BitSet,
}

/// The union of the per-abstraction dead-end sets. Only abstractions that
/// actually have unreachable states occupy an entry.
#[derive(Debug, Default)]
pub struct UnsolvabilityHeuristic {
    infos: Vec<UnsolvabilityInfo>,
}

impl UnsolvabilityHeuristic {
    /// Computes, for each abstraction, the abstract states with infinite
    /// goal distance. Reachability does not depend on the (finite) cost
    /// function, so unit costs are used.
    pub fn new(abstractions: &[Box<dyn Abstraction>], num_operators: usize) -> Self {
        let unit_costs = Cost::unit_vector(num_operators);
        let mut infos = vec![];
        for (abstraction_id, abstraction) in abstractions.iter().enumerate() {
            let h_values = abstraction.compute_goal_distances(&unit_costs);
            let mut unsolvable_states = BitSet::with_capacity(h_values.len());
            for (state, h) in h_values.iter().enumerate() {
                if h.is_infinite() {
                    unsolvable_states.insert(state);
                }
            }
            if !unsolvable_states.is_empty() {
                infos.push(UnsolvabilityInfo { abstraction_id, unsolvable_states });
            }
        }
        UnsolvabilityHeuristic { infos }
    }

    /// Returns true iff any abstraction proves the state (given by its
    /// abstract state ids) unsolvable.
    pub fn is_unsolvable(&self, abstract_state_ids: &[usize]) -> bool {
        self.infos.iter().any(|info| {
            info.unsolvable_states
                .contains(abstract_state_ids[info.abstraction_id])
        })
    }

    /// Flags the abstractions whose dead-end set is non empty: their state
    /// mapping must survive the freeze even if no lookup table references
    /// them.
    pub fn mark_useful_abstractions(&self, useful: &mut [bool]) {
        for info in &self.infos {
            useful[info.abstraction_id] = true;
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
