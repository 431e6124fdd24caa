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

//! This module provides the greedy order generators. The intuition behind
//! all of them is the same: abstractions that promise a large estimate for
//! the evaluated state should be served while the cost function is still
//! rich, and abstractions that steal a lot of cost mass from everybody else
//! should come last.

use crate::{reduce_costs, Abstraction, Cost, Order, OrderGenerator};

/// How a single abstraction is scored when building a greedy order. Higher
/// scores are served earlier; ties go to the lower abstraction id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scoring {
    /// Estimate for the state divided by the stolen cost mass. The usual
    /// best performer.
    MaxHeuristicPerStolenCosts,
    /// Least stolen cost mass first.
    MinStolenCosts,
    /// Largest estimate for the state first.
    MaxHeuristic,
}

impl Scoring {
    fn score(self, h: Cost, stolen: u64) -> f64 {
        match self {
            Scoring::MaxHeuristicPerStolenCosts => match h.finite() {
                Some(h) => h as f64 / stolen.max(1) as f64,
                None => f64::INFINITY,
            },
            Scoring::MinStolenCosts => -(stolen as f64),
            Scoring::MaxHeuristic => match h.finite() {
                Some(h) => h as f64,
                None => f64::INFINITY,
            },
        }
    }
}

/// The total cost mass a saturated cost vector claims. Infinite entries
/// saturate the sum.
fn stolen_cost_mass(saturated_costs: &[Cost]) -> u64 {
    saturated_costs.iter().fold(0u64, |mass, cost| {
        match cost.finite() {
            Some(cost) => mass.saturating_add(cost as u64),
            None => u64::MAX,
        }
    })
}

/// Picks the best-scored abstraction per position, iterating in id order so
/// that equal scores resolve to the lowest id.
fn argmax(scores: &[(usize, f64)]) -> usize {
    let mut best = 0;
    for (position, &(_, score)) in scores.iter().enumerate() {
        if score > scores[best].1 {
            best = position;
        }
    }
    best
}

/// A greedy order generator that derives all its per-abstraction information
/// once, under the full cost function, and then only re-sorts per state.
/// Cheap enough to run on every evaluated state.
pub struct GreedyOrderGenerator {
    scoring: Scoring,
    h_values_by_abstraction: Vec<Vec<Cost>>,
    stolen_by_abstraction: Vec<u64>,
}

impl GreedyOrderGenerator {
    pub fn new(scoring: Scoring) -> Self {
        GreedyOrderGenerator {
            scoring,
            h_values_by_abstraction: vec![],
            stolen_by_abstraction: vec![],
        }
    }
}

impl OrderGenerator for GreedyOrderGenerator {
    fn initialize(&mut self, abstractions: &[Box<dyn Abstraction>], costs: &[Cost]) {
        self.h_values_by_abstraction.clear();
        self.stolen_by_abstraction.clear();
        for abstraction in abstractions {
            let h_values = abstraction.compute_goal_distances(costs);
            let saturated = abstraction.compute_saturated_costs(&h_values);
            self.stolen_by_abstraction.push(stolen_cost_mass(&saturated));
            self.h_values_by_abstraction.push(h_values);
        }
    }

    fn order_for_state(
        &mut self,
        _abstractions: &[Box<dyn Abstraction>],
        _costs: &[Cost],
        abstract_state_ids: &[usize],
    ) -> Order {
        let mut scored: Vec<(usize, f64)> = (0..self.h_values_by_abstraction.len())
            .map(|id| {
                let h = self.h_values_by_abstraction[id][abstract_state_ids[id]];
                (id, self.scoring.score(h, self.stolen_by_abstraction[id]))
            })
            .collect();
        // Stable sort: equal scores keep ascending id order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).expect("scores are not NaN"));
        scored.into_iter().map(|(id, _)| id).collect()
    }
}

/// The exact greedy loop: pick the best abstraction under the *current*
/// residual costs, let it saturate them, re-score the rest, repeat. Much
/// more expensive than [`GreedyOrderGenerator`] (it runs a full distance
/// computation per abstraction and position) but aware of how earlier picks
/// impoverish the cost function.
pub struct DynamicGreedyOrderGenerator {
    scoring: Scoring,
}

impl DynamicGreedyOrderGenerator {
    pub fn new(scoring: Scoring) -> Self {
        DynamicGreedyOrderGenerator { scoring }
    }
}

impl OrderGenerator for DynamicGreedyOrderGenerator {
    fn initialize(&mut self, _abstractions: &[Box<dyn Abstraction>], _costs: &[Cost]) {}

    fn order_for_state(
        &mut self,
        abstractions: &[Box<dyn Abstraction>],
        costs: &[Cost],
        abstract_state_ids: &[usize],
    ) -> Order {
        let mut remaining_costs = costs.to_vec();
        let mut unordered: Vec<usize> = (0..abstractions.len()).collect();
        let mut order = Vec::with_capacity(abstractions.len());
        while !unordered.is_empty() {
            let scored: Vec<(usize, f64)> = unordered
                .iter()
                .map(|&id| {
                    let h_values = abstractions[id].compute_goal_distances(&remaining_costs);
                    let h = h_values[abstract_state_ids[id]];
                    let saturated = abstractions[id].compute_saturated_costs(&h_values);
                    (id, self.scoring.score(h, stolen_cost_mass(&saturated)))
                })
                .collect();
            let chosen = unordered.remove(argmax(&scored));
            let h_values = abstractions[chosen].compute_goal_distances(&remaining_costs);
            let saturated = abstractions[chosen].compute_saturated_costs(&h_values);
            reduce_costs(&mut remaining_costs, &saturated);
            order.push(chosen);
        }
        order
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
