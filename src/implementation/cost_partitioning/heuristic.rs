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

//! This module provides the compact representation of one computed cost
//! partitioning: per abstraction, the goal distances it achieved under its
//! slice of the costs, keyed by abstract state id. Evaluating a state is a
//! handful of array lookups and a saturating sum.

use std::mem::size_of;

use crate::Cost;

/// One stored distance table.
#[derive(Debug, Clone)]
struct LookupTable {
    abstraction_id: usize,
    h_values: Vec<Cost>,
}

/// The lookup tables of one cost partitioning. Tables whose distances are
/// uniformly zero carry no information and are not stored at all; an
/// abstraction that received no useful cost slice therefore costs nothing
/// here.
#[derive(Debug, Clone, Default)]
pub struct CostPartitioningHeuristic {
    lookup_tables: Vec<LookupTable>,
}

impl CostPartitioningHeuristic {
    /// Stores the distance table of one abstraction, by move. All-zero
    /// tables are dropped.
    pub fn add_h_values(&mut self, abstraction_id: usize, h_values: Vec<Cost>) {
        if h_values.iter().any(|h| !h.is_zero()) {
            self.lookup_tables.push(LookupTable { abstraction_id, h_values });
        }
    }

    /// Appends every table of `other` to this heuristic. Used to stack a
    /// second partitioning pass on top of a first one; the estimates add up
    /// because the two passes consumed disjoint shares of the costs.
    pub fn add(&mut self, other: CostPartitioningHeuristic) {
        self.lookup_tables.extend(other.lookup_tables);
    }

    /// Sums the stored distances of the abstract states identified by
    /// `abstract_state_ids` (one id per abstraction, indexed by abstraction
    /// id). An infinite summand makes the state a dead end and the result
    /// infinite.
    pub fn compute_heuristic(&self, abstract_state_ids: &[usize]) -> Cost {
        let mut sum = Cost::ZERO;
        for table in &self.lookup_tables {
            let h = table.h_values[abstract_state_ids[table.abstraction_id]];
            if h.is_infinite() {
                return Cost::INFINITY;
            }
            sum = sum.saturating_add(h);
        }
        sum
    }

    /// Flags the abstractions this heuristic references.
    pub fn mark_useful_abstractions(&self, useful: &mut [bool]) {
        for table in &self.lookup_tables {
            useful[table.abstraction_id] = true;
        }
    }

    pub fn num_lookup_tables(&self) -> usize {
        self.lookup_tables.len()
    }

    pub fn num_heuristic_values(&self) -> usize {
        self.lookup_tables
            .iter()
            .map(|table| table.h_values.len())
            .sum()
    }

    /// A rough memory footprint estimate used against the portfolio size
    /// budget.
    pub fn estimate_size_in_kb(&self) -> usize {
        self.num_heuristic_values() * size_of::<Cost>() / 1024
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_cost_partitioning_heuristic {
    use crate::*;

    #[test]
    fn an_empty_heuristic_estimates_zero() {
        let cp = CostPartitioningHeuristic::default();
        assert_eq!(Cost::ZERO, cp.compute_heuristic(&[0, 0]));
    }

    #[test]
    fn estimates_of_the_stored_tables_add_up() {
        let mut cp = CostPartitioningHeuristic::default();
        cp.add_h_values(0, vec![Cost::new(1), Cost::ZERO]);
        cp.add_h_values(1, vec![Cost::new(2), Cost::ZERO]);
        assert_eq!(Cost::new(3), cp.compute_heuristic(&[0, 0]));
        assert_eq!(Cost::new(1), cp.compute_heuristic(&[0, 1]));
        assert_eq!(Cost::ZERO, cp.compute_heuristic(&[1, 1]));
    }

    #[test]
    fn an_infinite_entry_anywhere_makes_the_state_a_dead_end() {
        let mut cp = CostPartitioningHeuristic::default();
        cp.add_h_values(0, vec![Cost::new(1), Cost::INFINITY]);
        cp.add_h_values(1, vec![Cost::new(2), Cost::ZERO]);
        assert_eq!(Cost::INFINITY, cp.compute_heuristic(&[1, 0]));
    }

    #[test]
    fn all_zero_tables_are_not_stored() {
        let mut cp = CostPartitioningHeuristic::default();
        cp.add_h_values(0, vec![Cost::ZERO, Cost::ZERO]);
        cp.add_h_values(1, vec![Cost::new(1), Cost::ZERO]);
        assert_eq!(1, cp.num_lookup_tables());
        assert_eq!(2, cp.num_heuristic_values());
        let mut useful = vec![false, false];
        cp.mark_useful_abstractions(&mut useful);
        assert_eq!(vec![false, true], useful);
    }

    #[test]
    fn stacking_two_partitionings_sums_their_estimates() {
        let mut first = CostPartitioningHeuristic::default();
        first.add_h_values(0, vec![Cost::new(1), Cost::ZERO]);
        let mut second = CostPartitioningHeuristic::default();
        second.add_h_values(0, vec![Cost::new(2), Cost::ZERO]);
        first.add(second);
        assert_eq!(Cost::new(3), first.compute_heuristic(&[0]));
        assert_eq!(2, first.num_lookup_tables());
    }
}
