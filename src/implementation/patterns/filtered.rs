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

//! This module drives the whole pattern selection: iterate the ordered
//! systematic patterns, skip duplicates, oversized projections and patterns
//! only free operators touch, keep a pattern iff its evaluator says it adds
//! information under the residual costs, and let every admitted projection
//! saturate those costs before the next candidate is judged. Selection
//! restarts from the top (with reshuffled orders) until a whole round admits
//! nothing or a budget runs out.

use std::time::Duration;

use fxhash::FxHashSet;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::implementation::patterns::evaluator::{
    DeadEndTreatment, PartialStateCollection, PatternEvaluator,
};
use crate::implementation::patterns::sequential::{
    PatternOrder, SequentialPatternGenerator, VariablePairs,
};
use crate::implementation::priority_queue::AdaptiveQueue;
use crate::implementation::utils::{is_product_within_limit, CountdownTimer};
use crate::{reduce_costs, Abstraction, Cost, Error, Order, Pattern, Projection, Task, TaskInfo};

/// The knobs of the filtered systematic generator. The defaults match the
/// usual "enumerate everything, keep what is useful, stop after 100 seconds"
/// setup.
#[derive(Debug, Clone)]
pub struct FilteredSystematicConfig {
    /// Maximum number of variables per pattern.
    pub max_pattern_size: usize,
    /// Maximum number of states of a single projection; larger candidates
    /// are skipped, not errors.
    pub max_pdb_size: usize,
    /// Maximum total number of states over all selected projections.
    pub max_collection_size: usize,
    /// Maximum number of selected patterns.
    pub max_patterns: usize,
    /// Overall wall-clock budget for the generation.
    pub max_time: Duration,
    /// Wall-clock budget for each selection round.
    pub max_time_per_restart: Duration,
    /// Reduce the costs by each admitted projection's saturated costs and
    /// evaluate later candidates against the residue. Without this, every
    /// candidate with positive distances is admitted.
    pub saturate: bool,
    /// Restrict the enumeration to strongly goal-relevant patterns.
    pub only_sga_patterns: bool,
    /// Skip patterns whose relevant operators all cost zero or infinity.
    pub ignore_useless_patterns: bool,
    /// Record, per selection round, the order of the projections it added.
    pub store_orders: bool,
    /// How dead ends influence pattern usefulness.
    pub dead_ends: DeadEndTreatment,
    /// The order in which patterns of one size are considered.
    pub order: PatternOrder,
    /// Seed for all randomized ordering decisions.
    pub rng_seed: u64,
}

impl Default for FilteredSystematicConfig {
    fn default() -> Self {
        FilteredSystematicConfig {
            max_pattern_size: usize::MAX,
            max_pdb_size: usize::MAX,
            max_collection_size: usize::MAX,
            max_patterns: usize::MAX,
            max_time: Duration::from_secs(100),
            max_time_per_restart: Duration::from_secs(10),
            saturate: true,
            only_sga_patterns: false,
            ignore_useless_patterns: false,
            store_orders: true,
            dead_ends: DeadEndTreatment::New,
            order: PatternOrder::Original,
            rng_seed: 2011,
        }
    }
}

impl FilteredSystematicConfig {
    fn validate(&self) -> Result<(), Error> {
        if self.max_pattern_size == 0 {
            return Err(Error::Config("max_pattern_size must be at least 1".to_string()));
        }
        if self.max_pdb_size == 0 {
            return Err(Error::Config("max_pdb_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// What a generation run produces: the selected projections, their patterns,
/// and (when `store_orders` is set) one order per selection round covering
/// the projections that round admitted. The orders are the natural seed for
/// an offline portfolio.
#[derive(Debug)]
pub struct SystematicGeneratorResult {
    pub projections: Vec<Projection>,
    pub patterns: Vec<Pattern>,
    pub orders: Vec<Order>,
}

/// The generator itself. One instance can generate for several tasks; all
/// mutable state lives on the stack of [`FilteredSystematicGenerator::generate`].
pub struct FilteredSystematicGenerator {
    config: FilteredSystematicConfig,
}

impl FilteredSystematicGenerator {
    pub fn new(config: FilteredSystematicConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(FilteredSystematicGenerator { config })
    }

    pub fn generate(&self, task: &Task) -> Result<SystematicGeneratorResult, Error> {
        let config = &self.config;
        let timer = CountdownTimer::new(config.max_time);
        let task_info = TaskInfo::new(task);
        let mut rng = StdRng::seed_from_u64(config.rng_seed);
        let mut generator = SequentialPatternGenerator::new(
            &task_info,
            config.max_pattern_size,
            config.only_sga_patterns,
            config.order,
            &mut rng,
        );
        let mut queue = AdaptiveQueue::new();
        let mut dead_ends = PartialStateCollection::default();
        let mut projections: Vec<Projection> = vec![];
        let mut pattern_set: FxHashSet<Pattern> = FxHashSet::default();
        let mut used_var_pairs = VariablePairs::new(task.num_variables());
        let mut collection_size = 0usize;
        let mut num_evaluations = 0usize;
        let mut orders: Vec<Order> = vec![];

        let mut limit_reached = false;
        while !limit_reached {
            generator.restart(&used_var_pairs, &mut rng);
            if config.dead_ends == DeadEndTreatment::NewForCurrentOrder {
                dead_ends.clear();
            }
            let num_patterns_before = projections.len();
            limit_reached = self.select_patterns(
                task,
                &task_info,
                &mut generator,
                &mut queue,
                &mut dead_ends,
                &mut projections,
                &mut pattern_set,
                &mut used_var_pairs,
                &mut collection_size,
                &mut num_evaluations,
                timer.remaining(),
                &mut rng,
            )?;
            let num_patterns_after = projections.len();
            info!(
                patterns = num_patterns_after,
                collection_size, "finished selection round"
            );
            if config.store_orders && num_patterns_after > num_patterns_before {
                orders.push((num_patterns_before..num_patterns_after).collect());
            }
            if num_patterns_after == num_patterns_before {
                info!("restart did not add any pattern");
                break;
            }
            if timer.is_expired() {
                info!("reached overall time limit");
                break;
            }
        }

        let num_generated = generator.num_generated_patterns();
        info!(
            selected = projections.len(),
            generated = num_generated,
            evaluations = num_evaluations,
            max_size = generator.max_generated_pattern_size(),
            "pattern generation done"
        );

        let patterns = projections.iter().map(|p| p.pattern().clone()).collect();
        Ok(SystematicGeneratorResult { projections, patterns, orders })
    }

    #[allow(clippy::too_many_arguments)]
    fn select_patterns(
        &self,
        task: &Task,
        task_info: &TaskInfo,
        generator: &mut SequentialPatternGenerator,
        queue: &mut AdaptiveQueue,
        dead_ends: &mut PartialStateCollection,
        projections: &mut Vec<Projection>,
        pattern_set: &mut FxHashSet<Pattern>,
        used_var_pairs: &mut VariablePairs,
        collection_size: &mut usize,
        num_evaluations: &mut usize,
        overall_remaining_time: Duration,
        rng: &mut StdRng,
    ) -> Result<bool, Error> {
        let config = &self.config;
        let timer =
            CountdownTimer::new(overall_remaining_time.min(config.max_time_per_restart));
        let mut costs = task.operator_costs();
        let mut pattern_id = 0;
        loop {
            let pattern = generator.pattern(pattern_id, used_var_pairs, &timer, rng);
            pattern_id += 1;
            if timer.is_expired() {
                debug!("reached restart time limit");
                return Ok(false);
            }
            let Some(pattern) = pattern else {
                debug!(max_pattern_size = config.max_pattern_size, "generated all patterns");
                return Ok(false);
            };
            if pattern_set.contains(&pattern) {
                continue;
            }
            let Some(pdb_size) = projection_size(task, &pattern, config.max_pdb_size) else {
                // Pattern is too large.
                continue;
            };
            if projections.len() == config.max_patterns {
                info!("reached maximum number of patterns");
                return Ok(true);
            }
            if config.max_collection_size != usize::MAX
                && pdb_size > config.max_collection_size - *collection_size
            {
                info!("reached maximum collection size");
                return Ok(true);
            }
            if config.ignore_useless_patterns
                && only_free_operators_affect(&pattern, &costs, task_info)
            {
                debug!(?pattern, "only free operators affect pattern");
                continue;
            }

            let select = if config.saturate {
                let evaluator = PatternEvaluator::new(task, pattern.clone())?;
                *num_evaluations += 1;
                evaluator.is_useful(queue, dead_ends, config.dead_ends, &costs)
            } else {
                true
            };

            if select {
                debug!(?pattern, "add pattern");
                let projection = Projection::new(task, pattern.clone())?;
                if config.saturate {
                    let h_values = projection.compute_goal_distances(&costs);
                    let saturated = projection.compute_saturated_costs(&h_values);
                    reduce_costs(&mut costs, &saturated);
                }
                pattern_set.insert(pattern.clone());
                used_var_pairs.mark_pattern(&pattern);
                *collection_size += pdb_size;
                projections.push(projection);
            }
        }
    }
}

/// The number of abstract states of the projection onto `pattern`, or `None`
/// if the product overflows or exceeds the limit.
fn projection_size(task: &Task, pattern: &Pattern, max_pdb_size: usize) -> Option<usize> {
    let mut size = 1usize;
    for var in pattern {
        let domain = task.domain_size(*var);
        if !is_product_within_limit(size, domain, max_pdb_size) {
            return None;
        }
        size *= domain;
    }
    Some(size)
}

/// True iff every operator with an effect on a pattern variable costs zero
/// or infinity: such a pattern can never consume any finite cost.
fn only_free_operators_affect(pattern: &Pattern, costs: &[Cost], task_info: &TaskInfo) -> bool {
    pattern.iter().all(|&var| {
        task_info.relevant_operators(var).iter().all(|&op| {
            let cost = costs[op];
            cost.is_zero() || cost.is_infinite()
        })
    })
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_filtered_systematic {
    use super::*;
    use crate::*;

    fn unit_setter(name: &str, var: usize, cost: u32) -> Operator {
        Operator {
            name: name.to_string(),
            preconditions: vec![],
            effects: vec![Effect::new(var, 1)],
            cost: Cost::new(cost),
        }
    }

    /// Two independent goal variables with their own unit-cost setters.
    fn independent_task() -> Task {
        Task::new(
            vec![2, 2],
            vec![unit_setter("set_a", 0, 1), unit_setter("set_b", 1, 1)],
            vec![],
            vec![FactPair::new(0, 1), FactPair::new(1, 1)],
            State::new(vec![0, 0]),
        )
        .unwrap()
    }

    #[test]
    fn independent_goals_yield_one_projection_per_goal_variable() {
        let task = independent_task();
        let generator =
            FilteredSystematicGenerator::new(FilteredSystematicConfig::default()).unwrap();
        let result = generator.generate(&task).unwrap();
        assert_eq!(
            vec![vec![Variable(0)], vec![Variable(1)]],
            result.patterns[..2].to_vec()
        );
        // Saturation consumed all unit costs, so the size-two pattern adds
        // nothing and the second restart adds nothing either.
        assert_eq!(2, result.patterns.len());
        assert_eq!(vec![vec![0, 1]], result.orders);
    }

    #[test]
    fn the_pdb_size_bound_skips_large_patterns() {
        let task = independent_task();
        let config = FilteredSystematicConfig {
            max_pdb_size: 2,
            dead_ends: DeadEndTreatment::Ignore,
            ..FilteredSystematicConfig::default()
        };
        let generator = FilteredSystematicGenerator::new(config).unwrap();
        let result = generator.generate(&task).unwrap();
        assert!(result.patterns.iter().all(|p| p.len() == 1));
    }

    #[test]
    fn max_patterns_caps_the_selection() {
        let task = independent_task();
        let config = FilteredSystematicConfig {
            max_patterns: 1,
            ..FilteredSystematicConfig::default()
        };
        let generator = FilteredSystematicGenerator::new(config).unwrap();
        let result = generator.generate(&task).unwrap();
        assert_eq!(1, result.patterns.len());
    }

    #[test]
    fn without_saturation_every_informative_pattern_is_kept() {
        let task = independent_task();
        let config = FilteredSystematicConfig {
            saturate: false,
            ..FilteredSystematicConfig::default()
        };
        let generator = FilteredSystematicGenerator::new(config).unwrap();
        let result = generator.generate(&task).unwrap();
        // {a}, {b} and {a, b} all pass when nothing is saturated away.
        assert_eq!(3, result.patterns.len());
    }

    #[test]
    fn free_operator_patterns_are_skipped_when_asked_to() {
        let task = Task::new(
            vec![2, 2],
            vec![unit_setter("set_a", 0, 1), unit_setter("set_b", 1, 0)],
            vec![],
            vec![FactPair::new(0, 1), FactPair::new(1, 1)],
            State::new(vec![0, 0]),
        )
        .unwrap();
        let config = FilteredSystematicConfig {
            ignore_useless_patterns: true,
            ..FilteredSystematicConfig::default()
        };
        let generator = FilteredSystematicGenerator::new(config).unwrap();
        let result = generator.generate(&task).unwrap();
        assert!(result.patterns.contains(&vec![Variable(0)]));
        assert!(!result.patterns.contains(&vec![Variable(1)]));
    }

    #[test]
    fn a_zero_pattern_size_bound_is_a_configuration_error() {
        let config = FilteredSystematicConfig {
            max_pattern_size: 0,
            ..FilteredSystematicConfig::default()
        };
        assert!(matches!(
            FilteredSystematicGenerator::new(config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn selected_projections_can_serve_as_abstractions() {
        let task = independent_task();
        let generator =
            FilteredSystematicGenerator::new(FilteredSystematicConfig::default()).unwrap();
        let result = generator.generate(&task).unwrap();
        let abstractions: Vec<Box<dyn Abstraction>> = result
            .projections
            .into_iter()
            .map(|p| Box::new(p) as Box<dyn Abstraction>)
            .collect();
        let mut remaining = task.operator_costs();
        let cp = compute_saturated_cost_partitioning(
            &abstractions,
            &result.orders[0],
            &mut remaining,
        );
        let ids = abstract_state_ids(&abstractions, &State::new(vec![0, 0]));
        assert_eq!(Cost::new(2), cp.compute_heuristic(&ids));
    }
}
