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

//! This module provides the offline way of using a portfolio of cost
//! partitionings: compute them all up front (one per order), discard the
//! transition systems, and answer every query with the maximum over the
//! stored sums. Unlike its online sibling this heuristic never changes
//! between evaluations and is therefore consistent.

use crate::{
    abstract_state_ids_from_functions, AbstractionFunctions, Abstractions, Cost,
    CostPartitioningHeuristic, State, UnsolvabilityHeuristic,
};

/// Keeps the abstraction functions that at least one stored heuristic (or
/// the unsolvability heuristic) references and discards every other
/// abstraction wholesale, transition systems included.
pub(crate) fn extract_useful_abstraction_functions(
    cp_heuristics: &[CostPartitioningHeuristic],
    unsolvability_heuristic: &UnsolvabilityHeuristic,
    abstractions: Abstractions,
) -> AbstractionFunctions {
    let mut useful = vec![false; abstractions.len()];
    unsolvability_heuristic.mark_useful_abstractions(&mut useful);
    for cp_heuristic in cp_heuristics {
        cp_heuristic.mark_useful_abstractions(&mut useful);
    }
    abstractions
        .into_iter()
        .zip(useful)
        .map(|(abstraction, keep)| {
            if keep {
                Some(abstraction.extract_abstraction_function())
            } else {
                None
            }
        })
        .collect()
}

/// The maximum over a frozen set of cost partitioning heuristics.
pub struct MaxCostPartitioningHeuristic {
    abstraction_functions: AbstractionFunctions,
    cp_heuristics: Vec<CostPartitioningHeuristic>,
    unsolvability_heuristic: UnsolvabilityHeuristic,
}

impl MaxCostPartitioningHeuristic {
    /// Takes ownership of the abstractions, keeps their state mapping
    /// functions where needed and drops everything else.
    pub fn new(
        abstractions: Abstractions,
        cp_heuristics: Vec<CostPartitioningHeuristic>,
        unsolvability_heuristic: UnsolvabilityHeuristic,
    ) -> Self {
        let abstraction_functions = extract_useful_abstraction_functions(
            &cp_heuristics,
            &unsolvability_heuristic,
            abstractions,
        );
        MaxCostPartitioningHeuristic {
            abstraction_functions,
            cp_heuristics,
            unsolvability_heuristic,
        }
    }

    /// The lower bound for the given state, or `None` for a proven dead end.
    pub fn compute_heuristic(&self, state: &State) -> Option<u32> {
        let ids = abstract_state_ids_from_functions(&self.abstraction_functions, state);
        if self.unsolvability_heuristic.is_unsolvable(&ids) {
            return None;
        }
        let mut max_h = Cost::ZERO;
        for cp in &self.cp_heuristics {
            max_h = max_h.max(cp.compute_heuristic(&ids));
        }
        max_h.finite()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_max_heuristic {
    use crate::*;

    fn independent_task() -> Task {
        let set = |name: &str, var: usize| Operator {
            name: name.to_string(),
            preconditions: vec![],
            effects: vec![Effect::new(var, 1)],
            cost: Cost::new(1),
        };
        Task::new(
            vec![2, 2],
            vec![set("set_a", 0), set("set_b", 1)],
            vec![],
            vec![FactPair::new(0, 1), FactPair::new(1, 1)],
            State::new(vec![0, 0]),
        )
        .unwrap()
    }

    #[test]
    fn the_maximum_over_stored_partitionings_is_returned() {
        let task = independent_task();
        let abstractions: Vec<Box<dyn Abstraction>> = (0..2)
            .map(|var| {
                Box::new(Projection::new(&task, vec![Variable(var)]).unwrap())
                    as Box<dyn Abstraction>
            })
            .collect();
        let unsolvability = UnsolvabilityHeuristic::new(&abstractions, 2);

        let mut cps = vec![];
        for order in [vec![0, 1], vec![1, 0]] {
            let mut remaining = task.operator_costs();
            cps.push(compute_saturated_cost_partitioning(
                &abstractions,
                &order,
                &mut remaining,
            ));
        }
        let heuristic = MaxCostPartitioningHeuristic::new(abstractions, cps, unsolvability);
        assert_eq!(Some(2), heuristic.compute_heuristic(&State::new(vec![0, 0])));
        assert_eq!(Some(1), heuristic.compute_heuristic(&State::new(vec![1, 0])));
        assert_eq!(Some(0), heuristic.compute_heuristic(&State::new(vec![1, 1])));
    }

    #[test]
    fn unreferenced_abstractions_lose_their_mapping_function() {
        let task = independent_task();
        let abstractions: Vec<Box<dyn Abstraction>> = (0..2)
            .map(|var| {
                Box::new(Projection::new(&task, vec![Variable(var)]).unwrap())
                    as Box<dyn Abstraction>
            })
            .collect();
        let unsolvability = UnsolvabilityHeuristic::new(&abstractions, 2);
        // Only one stored partitioning, covering only abstraction 0.
        let mut remaining = task.operator_costs();
        let cp =
            compute_saturated_cost_partitioning(&abstractions, &vec![0], &mut remaining);
        let functions =
            extract_useful_abstraction_functions(&[cp], &unsolvability, abstractions);
        assert!(functions[0].is_some());
        assert!(functions[1].is_none());
    }
}
