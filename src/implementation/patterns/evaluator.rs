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

//! This module answers one question as cheaply as possible: would building a
//! full projection for this pattern add any information under the current
//! residual costs? The evaluator runs the same backward Dijkstra a
//! projection would, but skips the match tree, reuses the caller's queue,
//! and bails out at the first positive distance when that already settles
//! the answer.

use crate::implementation::priority_queue::AdaptiveQueue;
use crate::implementation::projection::{enumerate_goal_states, project_operators};
use crate::{Cost, Error, FactPair, Pattern, Task};

/// What makes a pattern count as useful when it proves dead ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadEndTreatment {
    /// Dead ends are worthless: only a positive finite distance counts.
    Ignore,
    /// Any positive distance counts, infinite ones included.
    All,
    /// Dead ends count only if the pattern proves one that no earlier
    /// pattern proved; newly proved dead ends enter a shared cache.
    New,
    /// Like `New`, but the cache is reset on every enumeration restart.
    NewForCurrentOrder,
}

/// A set of partial assignments with subsumption queries: a stored partial
/// state subsumes a queried one if every one of its facts appears in the
/// query. Both sides keep their facts sorted by variable.
#[derive(Debug, Default)]
pub struct PartialStateCollection {
    partial_states: Vec<Vec<FactPair>>,
}

impl PartialStateCollection {
    pub fn add(&mut self, partial_state: Vec<FactPair>) {
        debug_assert!(partial_state.windows(2).all(|w| w[0].variable < w[1].variable));
        self.partial_states.push(partial_state);
    }

    /// Returns true iff some stored partial state is a subset of the query.
    pub fn subsumes(&self, query: &[FactPair]) -> bool {
        self.partial_states.iter().any(|stored| {
            let mut position = 0;
            stored.iter().all(|fact| {
                while position < query.len() && query[position].variable < fact.variable {
                    position += 1;
                }
                position < query.len() && query[position] == *fact
            })
        })
    }

    pub fn clear(&mut self) {
        self.partial_states.clear();
    }

    pub fn len(&self) -> usize {
        self.partial_states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partial_states.is_empty()
    }
}

/// A throwaway, match-tree-free rendition of a candidate projection.
pub struct PatternEvaluator {
    pattern: Pattern,
    pattern_domains: Vec<usize>,
    hash_multipliers: Vec<usize>,
    num_states: usize,
    abstract_operators: Vec<EvaluatorOperator>,
    goal_states: Vec<usize>,
}

struct EvaluatorOperator {
    concrete_op_id: usize,
    hash_delta: isize,
    regression_preconditions: Vec<(usize, usize)>,
}

impl PatternEvaluator {
    pub fn new(task: &Task, pattern: Pattern) -> Result<Self, Error> {
        if pattern.is_empty()
            || pattern.windows(2).any(|w| w[0] >= w[1])
            || pattern.last().map_or(false, |var| var.id() >= task.num_variables())
        {
            return Err(Error::Config(format!("invalid pattern {:?}", pattern)));
        }
        let pattern_domains: Vec<usize> =
            pattern.iter().map(|var| task.domain_size(*var)).collect();
        let mut hash_multipliers = Vec::with_capacity(pattern.len());
        let mut num_states = 1usize;
        for &domain in &pattern_domains {
            hash_multipliers.push(num_states);
            num_states = num_states.checked_mul(domain).ok_or_else(|| {
                Error::Config(format!("pattern {:?} is too large to address", pattern))
            })?;
        }
        let projected = project_operators(task, &pattern, &pattern_domains, &hash_multipliers);
        let abstract_operators = projected
            .operators
            .into_iter()
            .map(|op| EvaluatorOperator {
                concrete_op_id: op.concrete_op_id,
                hash_delta: op.hash_delta,
                regression_preconditions: op.regression_preconditions,
            })
            .collect();
        let goal_states =
            enumerate_goal_states(task.goals(), &pattern, &pattern_domains, &hash_multipliers);
        Ok(PatternEvaluator {
            pattern,
            pattern_domains,
            hash_multipliers,
            num_states,
            abstract_operators,
            goal_states,
        })
    }

    fn matches(&self, op: &EvaluatorOperator, state_index: usize) -> bool {
        op.regression_preconditions.iter().all(|&(local, value)| {
            (state_index / self.hash_multipliers[local]) % self.pattern_domains[local] == value
        })
    }

    /// The partial assignment (over task variables) encoded by an abstract
    /// state index.
    fn partial_state(&self, state_index: usize) -> Vec<FactPair> {
        self.pattern
            .iter()
            .enumerate()
            .map(|(local, var)| {
                let value =
                    (state_index / self.hash_multipliers[local]) % self.pattern_domains[local];
                FactPair { variable: *var, value }
            })
            .collect()
    }

    /// Decides whether the pattern adds information under the given costs.
    /// The caller's queue is reused across evaluations; newly proved dead
    /// ends are pushed into `dead_ends` under the `New*` treatments.
    pub fn is_useful(
        &self,
        queue: &mut AdaptiveQueue,
        dead_ends: &mut PartialStateCollection,
        dead_end_treatment: DeadEndTreatment,
        costs: &[Cost],
    ) -> bool {
        let early_exit = matches!(
            dead_end_treatment,
            DeadEndTreatment::Ignore | DeadEndTreatment::All
        );
        let mut distances = vec![Cost::INFINITY; self.num_states];
        queue.clear();
        for &goal in &self.goal_states {
            distances[goal] = Cost::ZERO;
            queue.push(Cost::ZERO, goal);
        }
        let mut found_positive_finite = false;
        while let Some((distance, target)) = queue.pop() {
            if distance > distances[target] {
                continue;
            }
            if !distance.is_zero() {
                found_positive_finite = true;
                if early_exit {
                    return true;
                }
            }
            for op in &self.abstract_operators {
                let cost = costs[op.concrete_op_id];
                if cost.is_infinite() || !self.matches(op, target) {
                    continue;
                }
                let source = (target as isize - op.hash_delta) as usize;
                let alternative = distance.saturating_add(cost);
                if alternative < distances[source] {
                    distances[source] = alternative;
                    queue.push(alternative, source);
                }
            }
        }

        match dead_end_treatment {
            DeadEndTreatment::Ignore => found_positive_finite,
            DeadEndTreatment::All => {
                found_positive_finite || distances.iter().any(|d| d.is_infinite())
            }
            DeadEndTreatment::New | DeadEndTreatment::NewForCurrentOrder => {
                let mut useful = found_positive_finite;
                for (state, distance) in distances.iter().enumerate() {
                    if distance.is_infinite() {
                        let partial_state = self.partial_state(state);
                        if !dead_ends.subsumes(&partial_state) {
                            dead_ends.add(partial_state);
                            useful = true;
                        }
                    }
                }
                useful
            }
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_partial_states {
    use crate::*;

    #[test]
    fn a_stored_subset_subsumes_the_query() {
        let mut collection = PartialStateCollection::default();
        collection.add(vec![FactPair::new(1, 0)]);
        assert!(collection.subsumes(&[FactPair::new(0, 1), FactPair::new(1, 0)]));
        assert!(!collection.subsumes(&[FactPair::new(0, 1), FactPair::new(1, 1)]));
        assert!(!collection.subsumes(&[FactPair::new(0, 0)]));
    }

    #[test]
    fn clearing_forgets_every_stored_dead_end() {
        let mut collection = PartialStateCollection::default();
        collection.add(vec![FactPair::new(0, 0)]);
        assert!(!collection.is_empty());
        collection.clear();
        assert!(!collection.subsumes(&[FactPair::new(0, 0)]));
    }
}

#[cfg(test)]
mod test_pattern_evaluator {
    use crate::implementation::priority_queue::AdaptiveQueue;
    use crate::*;

    fn task_with(operators: Vec<Operator>) -> Task {
        Task::new(
            vec![2, 2],
            operators,
            vec![],
            vec![FactPair::new(0, 1), FactPair::new(1, 1)],
            State::new(vec![0, 0]),
        )
        .unwrap()
    }

    fn setter(var: usize, cost: u32) -> Operator {
        Operator {
            name: format!("set_{}", var),
            preconditions: vec![],
            effects: vec![Effect::new(var, 1)],
            cost: Cost::new(cost),
        }
    }

    #[test]
    fn a_pattern_with_positive_finite_distances_is_useful() {
        let task = task_with(vec![setter(0, 1), setter(1, 1)]);
        let evaluator = PatternEvaluator::new(&task, vec![Variable(0)]).unwrap();
        let mut queue = AdaptiveQueue::new();
        let mut dead_ends = PartialStateCollection::default();
        assert!(evaluator.is_useful(
            &mut queue,
            &mut dead_ends,
            DeadEndTreatment::Ignore,
            &task.operator_costs()
        ));
    }

    #[test]
    fn a_pattern_whose_costs_were_consumed_is_useless_under_ignore() {
        let task = task_with(vec![setter(0, 1), setter(1, 1)]);
        let evaluator = PatternEvaluator::new(&task, vec![Variable(0)]).unwrap();
        let mut queue = AdaptiveQueue::new();
        let mut dead_ends = PartialStateCollection::default();
        // All residual costs are gone: every reachable state has h = 0.
        assert!(!evaluator.is_useful(
            &mut queue,
            &mut dead_ends,
            DeadEndTreatment::Ignore,
            &[Cost::ZERO, Cost::ZERO]
        ));
    }

    #[test]
    fn dead_ends_count_under_all_but_not_under_ignore() {
        // No operator touches variable 0: its goal is unreachable from 0.
        let task = task_with(vec![setter(1, 0)]);
        let evaluator = PatternEvaluator::new(&task, vec![Variable(0)]).unwrap();
        let mut queue = AdaptiveQueue::new();
        let mut dead_ends = PartialStateCollection::default();
        let costs = task.operator_costs();
        assert!(!evaluator.is_useful(
            &mut queue,
            &mut dead_ends,
            DeadEndTreatment::Ignore,
            &costs
        ));
        assert!(evaluator.is_useful(&mut queue, &mut dead_ends, DeadEndTreatment::All, &costs));
    }

    #[test]
    fn a_known_dead_end_does_not_count_twice_under_new() {
        let task = task_with(vec![setter(1, 0)]);
        let evaluator = PatternEvaluator::new(&task, vec![Variable(0)]).unwrap();
        let mut queue = AdaptiveQueue::new();
        let mut dead_ends = PartialStateCollection::default();
        let costs = task.operator_costs();
        assert!(evaluator.is_useful(&mut queue, &mut dead_ends, DeadEndTreatment::New, &costs));
        assert_eq!(1, dead_ends.len());
        // The same dead end is in the cache now, the pattern adds nothing.
        assert!(!evaluator.is_useful(&mut queue, &mut dead_ends, DeadEndTreatment::New, &costs));
    }
}
