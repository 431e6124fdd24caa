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

//! This module implements the saturated cost partitioning scheme itself:
//! thread a residual cost vector through the abstractions in a given order,
//! let each one record its goal distances and keep only the costs those
//! distances need, and hand whatever is left to the next abstraction.
//!
//! The sum of the recorded distance tables is admissible whenever the input
//! cost function is, and since every abstraction's estimate is consistent
//! under its own cost slice, so is the sum. The online driver loses the
//! consistency guarantee only because it switches between stored sums
//! between evaluations.

use crate::{reduce_costs, Abstraction, Cost, CostPartitioningHeuristic, Order};

/// Runs one saturated cost partitioning pass over the abstractions in the
/// given order. `remaining_costs` is consumed in place: on return it holds
/// whatever no abstraction in the order claimed, so that callers can stack
/// further passes on top.
pub fn compute_saturated_cost_partitioning(
    abstractions: &[Box<dyn Abstraction>],
    order: &Order,
    remaining_costs: &mut [Cost],
) -> CostPartitioningHeuristic {
    let mut cost_partitioning = CostPartitioningHeuristic::default();
    for &abstraction_id in order {
        let abstraction = &abstractions[abstraction_id];
        let h_values = abstraction.compute_goal_distances(remaining_costs);
        let saturated = abstraction.compute_saturated_costs(&h_values);
        reduce_costs(remaining_costs, &saturated);
        cost_partitioning.add_h_values(abstraction_id, h_values);
    }
    cost_partitioning
}

/// The perimeter variant used by the PERIM* saturator: identical to the
/// plain pass, except that each abstraction's distance table is capped at
/// the distance of the evaluated state before it is recorded and saturated.
///
/// Capping at `r = h[s]` keeps the table goal-aware and consistent (the
/// pointwise minimum of two consistent functions), so the stored estimates
/// remain admissible everywhere. The saturated costs, however, now only pay
/// for the transitions inside the perimeter `{x : h(x) ≤ r}` around the
/// goal, which leaves more residual costs for a subsequent plain pass.
pub fn compute_perim_saturated_cost_partitioning(
    abstractions: &[Box<dyn Abstraction>],
    order: &Order,
    remaining_costs: &mut [Cost],
    abstract_state_ids: &[usize],
) -> CostPartitioningHeuristic {
    let mut cost_partitioning = CostPartitioningHeuristic::default();
    for &abstraction_id in order {
        let abstraction = &abstractions[abstraction_id];
        let mut h_values = abstraction.compute_goal_distances(remaining_costs);
        let radius = h_values[abstract_state_ids[abstraction_id]];
        if !radius.is_infinite() {
            for h in h_values.iter_mut() {
                *h = (*h).min(radius);
            }
        }
        let saturated = abstraction.compute_saturated_costs(&h_values);
        reduce_costs(remaining_costs, &saturated);
        cost_partitioning.add_h_values(abstraction_id, h_values);
    }
    cost_partitioning
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
