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

//! This module provides the online heuristic: the per-state evaluation loop
//! that maintains a growing portfolio of cost partitionings. While the
//! improvement phase lasts, selected evaluations trigger a fresh saturated
//! cost partitioning for the evaluated state; partitionings that improve the
//! estimate are kept. When the time or memory budget is hit the portfolio
//! freezes: the abstractions' transition systems and the novelty indices are
//! dropped, and evaluation continues against the stored tables alone.
//!
//! The resulting estimates are admissible but, unlike the offline maximum,
//! not necessarily consistent, because the portfolio changes between
//! evaluations.

use std::time::Duration;

use bit_set::BitSet;
use fxhash::FxHashMap;
use tracing::{debug, info};

use crate::implementation::utils::StopWatch;
use crate::{
    abstract_state_ids, abstract_state_ids_from_functions, compute_perim_saturated_cost_partitioning,
    compute_saturated_cost_partitioning, extract_useful_abstraction_functions, AbstractionFunctions,
    Abstractions, Cost, CostPartitioningHeuristic, Error, OrderGenerator, State, Task,
    UnsolvabilityHeuristic, Variable,
};

/// Which saturated cost partitioning is computed for a triggering state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Saturator {
    /// One plain pass preserving all goal distances.
    All,
    /// A perimeter pass biased towards the evaluated state first; if that
    /// already improves on the portfolio, a plain pass over the leftover
    /// costs is stacked on top.
    Perimstar,
}

/// When a fresh cost partitioning is computed during the improvement phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    /// On every k-th evaluated state.
    EveryNthState(usize),
    /// Whenever the triggering transition introduces an unseen fact.
    NovelFacts,
    /// Whenever the triggering transition introduces an unseen pair of one
    /// effect fact and one state fact.
    NovelFactPairs,
}

/// Configuration of the online heuristic.
#[derive(Debug, Clone)]
pub struct OnlineHeuristicConfig {
    pub saturator: Saturator,
    pub interval: Interval,
    /// Wall-clock budget for the improvement phase.
    pub max_time: Duration,
    /// Portfolio size budget in KiB.
    pub max_size_kb: usize,
    /// Keep a fresh partitioning only when it strictly improves the
    /// estimate of the evaluated state; otherwise it is used once and
    /// discarded.
    pub use_evaluated_state_as_sample: bool,
    /// Capping the number of orders is not implemented for the online
    /// heuristic; this must stay `None`.
    pub max_orders: Option<usize>,
    /// Order optimization is not implemented for the online heuristic; this
    /// must stay zero.
    pub max_optimization_time: Duration,
}

impl Default for OnlineHeuristicConfig {
    fn default() -> Self {
        OnlineHeuristicConfig {
            saturator: Saturator::All,
            interval: Interval::EveryNthState(1),
            max_time: Duration::from_secs(100),
            max_size_kb: usize::MAX,
            use_evaluated_state_as_sample: false,
            max_orders: None,
            max_optimization_time: Duration::ZERO,
        }
    }
}

impl OnlineHeuristicConfig {
    fn validate(&self) -> Result<(), Error> {
        if let Interval::EveryNthState(0) = self.interval {
            return Err(Error::Config("interval must be at least 1".to_string()));
        }
        if self.max_optimization_time != Duration::ZERO {
            return Err(Error::Config(
                "Order optimization is not implemented for online SCP.".to_string(),
            ));
        }
        if self.max_orders.is_some() {
            return Err(Error::Config(
                "Limiting the number of orders is not implemented for online SCP.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Seen-fact bookkeeping for the novelty-triggered intervals. Mutated only
/// while the heuristic is still improving, dropped at the freeze.
#[derive(Debug)]
struct NoveltyIndex {
    fact_id_offsets: Vec<usize>,
    /// Effect facts of every operator, for transition novelty checks.
    operator_effects: Vec<Vec<(usize, usize)>>,
    pairs: bool,
    seen_facts: BitSet,
    /// Row `f1` holds the seen partners `f2 > f1`.
    seen_fact_pairs: Vec<BitSet>,
}

impl NoveltyIndex {
    fn new(task: &Task, pairs: bool) -> Self {
        let mut fact_id_offsets = Vec::with_capacity(task.num_variables());
        let mut num_facts = 0;
        for domain in task.variable_domains() {
            fact_id_offsets.push(num_facts);
            num_facts += domain;
        }
        let operator_effects = task
            .operators()
            .iter()
            .map(|op| {
                op.effects
                    .iter()
                    .map(|effect| (effect.fact.variable.id(), effect.fact.value))
                    .collect()
            })
            .collect();
        NoveltyIndex {
            fact_id_offsets,
            operator_effects,
            pairs,
            seen_facts: if pairs { BitSet::default() } else { BitSet::with_capacity(num_facts) },
            seen_fact_pairs: if pairs {
                (0..num_facts).map(|_| BitSet::default()).collect()
            } else {
                vec![]
            },
        }
    }

    fn fact_id(&self, var: usize, value: usize) -> usize {
        self.fact_id_offsets[var] + value
    }

    /// Marks the pair as seen; returns true iff it was new.
    fn visit_fact_pair(&mut self, fact1: usize, fact2: usize) -> bool {
        let (low, high) = if fact1 < fact2 { (fact1, fact2) } else { (fact2, fact1) };
        debug_assert!(low < high);
        let novel = !self.seen_fact_pairs[low].contains(high);
        self.seen_fact_pairs[low].insert(high);
        novel
    }

    /// Marks every fact (or fact pair) of the initial state as seen.
    fn note_initial_state(&mut self, state: &State) {
        let num_vars = self.fact_id_offsets.len();
        if self.pairs {
            for var1 in 0..num_vars {
                let fact1 = self.fact_id(var1, state.value(Variable(var1)));
                for var2 in var1 + 1..num_vars {
                    let fact2 = self.fact_id(var2, state.value(Variable(var2)));
                    self.visit_fact_pair(fact1, fact2);
                }
            }
        } else {
            for var in 0..num_vars {
                let fact = self.fact_id(var, state.value(Variable(var)));
                self.seen_facts.insert(fact);
            }
        }
    }

    /// Decides whether the transition into `state` via `op_id` is novel and
    /// updates the seen sets along the way.
    fn is_novel_transition(&mut self, op_id: usize, state: &State) -> bool {
        let num_vars = self.fact_id_offsets.len();
        let effects = std::mem::take(&mut self.operator_effects[op_id]);
        let mut novel = false;
        if self.pairs {
            for &(var1, value1) in &effects {
                let fact1 = self.fact_id(var1, value1);
                for var2 in 0..num_vars {
                    if var1 == var2 {
                        continue;
                    }
                    let fact2 = self.fact_id(var2, state.value(Variable(var2)));
                    if self.visit_fact_pair(fact1, fact2) {
                        novel = true;
                    }
                }
            }
        } else {
            for &(var, value) in &effects {
                let fact = self.fact_id(var, value);
                if !self.seen_facts.contains(fact) {
                    self.seen_facts.insert(fact);
                    novel = true;
                }
            }
        }
        self.operator_effects[op_id] = effects;
        novel
    }
}

/// Aggregate counters of one online heuristic run.
#[derive(Debug, Clone, Default)]
pub struct OnlineStatistics {
    pub num_evaluated_states: usize,
    pub num_scps_computed: usize,
    pub num_stored_cost_partitionings: usize,
    pub num_stored_lookup_tables: usize,
    pub num_stored_values: usize,
    pub estimated_size_kb: usize,
    /// How often each stored partitioning was the portfolio maximum.
    pub num_best_order: Vec<usize>,
    pub improvement_time: Duration,
}

/// The online heuristic itself. The search owns it exclusively and calls it
/// synchronously; all mutation happens inside the notification and
/// evaluation entry points.
pub struct SaturatedCostPartitioningOnlineHeuristic {
    saturator: Saturator,
    interval: Interval,
    max_time: Duration,
    max_size_kb: usize,
    use_evaluated_state_as_sample: bool,

    costs: Vec<Cost>,
    order_generator: Box<dyn OrderGenerator>,
    abstractions: Abstractions,
    abstraction_functions: AbstractionFunctions,
    cp_heuristics: Vec<CostPartitioningHeuristic>,
    unsolvability_heuristic: UnsolvabilityHeuristic,

    novelty: Option<NoveltyIndex>,
    novelty_flags: FxHashMap<State, bool>,

    improve_heuristic: bool,
    size_kb: usize,
    num_evaluated_states: usize,
    num_scps_computed: usize,
    num_best_order: Vec<usize>,
    timer: StopWatch,
}

impl SaturatedCostPartitioningOnlineHeuristic {
    /// Builds the online heuristic over the given abstractions. The
    /// portfolio may be seeded with precomputed cost partitionings (e.g.
    /// one per order stored by the pattern generator); it keeps growing
    /// online until a budget freezes it.
    pub fn new(
        task: &Task,
        abstractions: Abstractions,
        cp_heuristics: Vec<CostPartitioningHeuristic>,
        mut order_generator: Box<dyn OrderGenerator>,
        config: OnlineHeuristicConfig,
    ) -> Result<Self, Error> {
        config.validate()?;
        let costs = task.operator_costs();
        let unsolvability_heuristic =
            UnsolvabilityHeuristic::new(&abstractions, task.num_operators());
        order_generator.initialize(&abstractions, &costs);
        let size_kb = cp_heuristics.iter().map(|cp| cp.estimate_size_in_kb()).sum();
        let novelty = match config.interval {
            Interval::EveryNthState(_) => None,
            Interval::NovelFacts => Some(NoveltyIndex::new(task, false)),
            Interval::NovelFactPairs => Some(NoveltyIndex::new(task, true)),
        };
        let num_best_order = vec![0; cp_heuristics.len()];
        Ok(SaturatedCostPartitioningOnlineHeuristic {
            saturator: config.saturator,
            interval: config.interval,
            max_time: config.max_time,
            max_size_kb: config.max_size_kb,
            use_evaluated_state_as_sample: config.use_evaluated_state_as_sample,
            costs,
            order_generator,
            abstractions,
            abstraction_functions: vec![],
            cp_heuristics,
            unsolvability_heuristic,
            novelty,
            novelty_flags: FxHashMap::default(),
            improve_heuristic: true,
            size_kb,
            num_evaluated_states: 0,
            num_scps_computed: 0,
            num_best_order,
            timer: StopWatch::new(),
        })
    }

    /// Seeds the novelty indices with the facts of the initial state. The
    /// initial state itself always counts as novel.
    pub fn notify_initial_state(&mut self, initial_state: &State) {
        if let Some(novelty) = self.novelty.as_mut() {
            novelty.note_initial_state(initial_state);
            self.novelty_flags.insert(initial_state.clone(), true);
        }
    }

    /// Records the novelty of a generated state. Must be called by the
    /// search for every transition while the heuristic is improving; cheap
    /// and mutation free afterwards.
    pub fn notify_state_transition(&mut self, _parent: &State, op_id: usize, state: &State) {
        if !self.improve_heuristic {
            return;
        }
        let Some(novelty) = self.novelty.as_mut() else {
            return;
        };
        // Novelty is only ever computed once per state.
        if !self.novelty_flags.contains_key(state) {
            self.timer.resume();
            let novel = novelty.is_novel_transition(op_id, state);
            self.novelty_flags.insert(state.clone(), novel);
            self.timer.stop();
        }
    }

    fn should_compute_scp(&self, state: &State) -> bool {
        match self.interval {
            Interval::EveryNthState(n) => self.num_evaluated_states % n == 0,
            Interval::NovelFacts | Interval::NovelFactPairs => {
                self.novelty_flags.get(state).copied().unwrap_or(false)
            }
        }
    }

    /// The admissible lower bound for the given state, or `None` for a
    /// proven dead end. This is the single entry point the search calls per
    /// state; portfolio growth, the freeze transition and all statistics
    /// happen in here.
    pub fn compute_heuristic(&mut self, state: &State) -> Option<u32> {
        if self.improve_heuristic {
            self.timer.resume();
        }

        let abstract_state_ids = if self.improve_heuristic {
            abstract_state_ids(&self.abstractions, state)
        } else {
            abstract_state_ids_from_functions(&self.abstraction_functions, state)
        };

        if self.unsolvability_heuristic.is_unsolvable(&abstract_state_ids) {
            if self.improve_heuristic {
                self.timer.stop();
            }
            return None;
        }

        let mut max_h = self.compute_max_h(&abstract_state_ids);

        if self.improve_heuristic
            && (self.timer.elapsed() >= self.max_time || self.size_kb >= self.max_size_kb)
        {
            self.freeze();
        }
        let compute_scp = self.improve_heuristic && self.should_compute_scp(state);
        if self.improve_heuristic && self.novelty.is_some() {
            // A state triggers at most one partitioning: once evaluated,
            // its novelty is spent.
            self.novelty_flags.insert(state.clone(), false);
        }
        if compute_scp {
            let order = self.order_generator.order_for_state(
                &self.abstractions,
                &self.costs,
                &abstract_state_ids,
            );

            let mut remaining_costs = self.costs.clone();
            let cost_partitioning = match self.saturator {
                Saturator::All => compute_saturated_cost_partitioning(
                    &self.abstractions,
                    &order,
                    &mut remaining_costs,
                ),
                Saturator::Perimstar => compute_perim_saturated_cost_partitioning(
                    &self.abstractions,
                    &order,
                    &mut remaining_costs,
                    &abstract_state_ids,
                ),
            };
            self.num_scps_computed += 1;

            let h = cost_partitioning.compute_heuristic(&abstract_state_ids);

            // Only a perimeter pass that already beats the portfolio earns
            // its second, plain pass over the leftover costs.
            let cost_partitioning = if self.saturator == Saturator::Perimstar && h > max_h {
                let mut stacked = cost_partitioning;
                stacked.add(compute_saturated_cost_partitioning(
                    &self.abstractions,
                    &order,
                    &mut remaining_costs,
                ));
                stacked
            } else {
                cost_partitioning
            };

            if self.use_evaluated_state_as_sample && h > max_h {
                self.size_kb += cost_partitioning.estimate_size_in_kb();
                self.cp_heuristics.push(cost_partitioning);
                self.num_best_order.push(0);
                debug!(
                    stored = self.cp_heuristics.len(),
                    size_kb = self.size_kb,
                    "stored cost partitioning"
                );
            }
            max_h = max_h.max(h);
        }
        if self.improve_heuristic {
            self.timer.stop();
        }

        self.num_evaluated_states += 1;
        max_h.finite()
    }

    /// Maximum over the stored partitionings, with argmax bookkeeping.
    fn compute_max_h(&mut self, abstract_state_ids: &[usize]) -> Cost {
        let mut max_h = Cost::ZERO;
        let mut best = None;
        for (index, cp) in self.cp_heuristics.iter().enumerate() {
            let h = cp.compute_heuristic(abstract_state_ids);
            if best.is_none() || h > max_h {
                max_h = h;
                best = Some(index);
            }
        }
        if let Some(best) = best {
            self.num_best_order[best] += 1;
        }
        max_h
    }

    /// The irreversible transition out of the improvement phase: keep the
    /// state mapping of every abstraction still referenced by the portfolio
    /// or the unsolvability heuristic, drop all the rest together with the
    /// novelty indices.
    fn freeze(&mut self) {
        info!("stop heuristic improvement phase");
        self.timer.stop();
        self.improve_heuristic = false;
        self.novelty = None;
        self.novelty_flags = FxHashMap::default();
        let abstractions = std::mem::take(&mut self.abstractions);
        self.abstraction_functions = extract_useful_abstraction_functions(
            &self.cp_heuristics,
            &self.unsolvability_heuristic,
            abstractions,
        );
        let statistics = self.statistics();
        info!(
            stored = statistics.num_stored_cost_partitionings,
            lookup_tables = statistics.num_stored_lookup_tables,
            values = statistics.num_stored_values,
            size_kb = statistics.estimated_size_kb,
            improvement_time = ?statistics.improvement_time,
            "diversification statistics"
        );
    }

    pub fn is_improving(&self) -> bool {
        self.improve_heuristic
    }

    pub fn statistics(&self) -> OnlineStatistics {
        OnlineStatistics {
            num_evaluated_states: self.num_evaluated_states,
            num_scps_computed: self.num_scps_computed,
            num_stored_cost_partitionings: self.cp_heuristics.len(),
            num_stored_lookup_tables: self
                .cp_heuristics
                .iter()
                .map(|cp| cp.num_lookup_tables())
                .sum(),
            num_stored_values: self
                .cp_heuristics
                .iter()
                .map(|cp| cp.num_heuristic_values())
                .sum(),
            estimated_size_kb: self.size_kb,
            num_best_order: self.num_best_order.clone(),
            improvement_time: self.timer.elapsed(),
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_online_heuristic {
    use super::*;
    use crate::*;

    fn unit_setter(name: &str, var: usize) -> Operator {
        Operator {
            name: name.to_string(),
            preconditions: vec![],
            effects: vec![Effect::new(var, 1)],
            cost: Cost::new(1),
        }
    }

    fn independent_task() -> Task {
        Task::new(
            vec![2, 2],
            vec![unit_setter("set_a", 0), unit_setter("set_b", 1)],
            vec![],
            vec![FactPair::new(0, 1), FactPair::new(1, 1)],
            State::new(vec![0, 0]),
        )
        .unwrap()
    }

    fn projections(task: &Task) -> Abstractions {
        (0..task.num_variables())
            .map(|var| {
                Box::new(Projection::new(task, vec![Variable(var)]).unwrap())
                    as Box<dyn Abstraction>
            })
            .collect()
    }

    fn online(task: &Task, config: OnlineHeuristicConfig) -> SaturatedCostPartitioningOnlineHeuristic {
        SaturatedCostPartitioningOnlineHeuristic::new(
            task,
            projections(task),
            vec![],
            Box::new(GreedyOrderGenerator::new(Scoring::MaxHeuristicPerStolenCosts)),
            config,
        )
        .unwrap()
    }

    #[test]
    fn nondefault_max_orders_is_rejected_with_the_documented_message() {
        let task = independent_task();
        let config = OnlineHeuristicConfig {
            max_orders: Some(5),
            ..OnlineHeuristicConfig::default()
        };
        let result = SaturatedCostPartitioningOnlineHeuristic::new(
            &task,
            projections(&task),
            vec![],
            Box::new(RandomOrderGenerator::new(0)),
            config,
        );
        match result {
            Err(Error::Config(message)) => assert_eq!(
                "Limiting the number of orders is not implemented for online SCP.",
                message
            ),
            _ => panic!("expected a configuration error"),
        }
    }

    #[test]
    fn nonzero_optimization_time_is_rejected_with_the_documented_message() {
        let task = independent_task();
        let config = OnlineHeuristicConfig {
            max_optimization_time: Duration::from_secs(1),
            ..OnlineHeuristicConfig::default()
        };
        let result = SaturatedCostPartitioningOnlineHeuristic::new(
            &task,
            projections(&task),
            vec![],
            Box::new(RandomOrderGenerator::new(0)),
            config,
        );
        match result {
            Err(Error::Config(message)) => assert_eq!(
                "Order optimization is not implemented for online SCP.",
                message
            ),
            _ => panic!("expected a configuration error"),
        }
    }

    #[test]
    fn the_initial_estimate_matches_the_perfect_distance() {
        let task = independent_task();
        let mut heuristic = online(&task, OnlineHeuristicConfig::default());
        assert_eq!(Some(2), heuristic.compute_heuristic(&State::new(vec![0, 0])));
        assert_eq!(Some(1), heuristic.compute_heuristic(&State::new(vec![1, 0])));
        assert_eq!(Some(0), heuristic.compute_heuristic(&State::new(vec![1, 1])));
    }

    #[test]
    fn dead_ends_are_reported_before_any_partitioning_runs() {
        // Goal v=1 but no operator: the initial state is unsolvable.
        let task = Task::new(
            vec![2],
            vec![],
            vec![],
            vec![FactPair::new(0, 1)],
            State::new(vec![0]),
        )
        .unwrap();
        let mut heuristic = online(&task, OnlineHeuristicConfig::default());
        assert_eq!(None, heuristic.compute_heuristic(&State::new(vec![0])));
        assert_eq!(0, heuristic.statistics().num_scps_computed);
    }

    #[test]
    fn sample_based_diversification_only_keeps_improvements() {
        let task = independent_task();
        let config = OnlineHeuristicConfig {
            use_evaluated_state_as_sample: true,
            ..OnlineHeuristicConfig::default()
        };
        let mut heuristic = online(&task, config);
        assert_eq!(Some(2), heuristic.compute_heuristic(&State::new(vec![0, 0])));
        assert_eq!(1, heuristic.statistics().num_stored_cost_partitionings);
        // Evaluating the same state again computes a new partitioning but
        // cannot improve on the stored one, so nothing further is kept.
        assert_eq!(Some(2), heuristic.compute_heuristic(&State::new(vec![0, 0])));
        assert_eq!(1, heuristic.statistics().num_stored_cost_partitionings);
        assert_eq!(2, heuristic.statistics().num_scps_computed);
    }

    #[test]
    fn without_sampling_no_partitioning_is_ever_stored() {
        let task = independent_task();
        let mut heuristic = online(&task, OnlineHeuristicConfig::default());
        assert_eq!(Some(2), heuristic.compute_heuristic(&State::new(vec![0, 0])));
        assert_eq!(0, heuristic.statistics().num_stored_cost_partitionings);
        assert_eq!(1, heuristic.statistics().num_scps_computed);
    }

    #[test]
    fn the_interval_throttles_partitioning_computations() {
        let task = independent_task();
        let config = OnlineHeuristicConfig {
            interval: Interval::EveryNthState(2),
            ..OnlineHeuristicConfig::default()
        };
        let mut heuristic = online(&task, config);
        for _ in 0..4 {
            heuristic.compute_heuristic(&State::new(vec![0, 0]));
        }
        assert_eq!(2, heuristic.statistics().num_scps_computed);
    }

    #[test]
    fn only_fact_novel_transitions_trigger_a_partitioning() {
        let task = independent_task();
        let config = OnlineHeuristicConfig {
            interval: Interval::NovelFacts,
            ..OnlineHeuristicConfig::default()
        };
        let mut heuristic = online(&task, config);
        let initial = State::new(vec![0, 0]);
        heuristic.notify_initial_state(&initial);
        heuristic.compute_heuristic(&initial);
        assert_eq!(1, heuristic.statistics().num_scps_computed);

        // Applying set_a reaches (1, 0): fact a=1 is new.
        let novel = State::new(vec![1, 0]);
        heuristic.notify_state_transition(&initial, 0, &novel);
        heuristic.compute_heuristic(&novel);
        assert_eq!(2, heuristic.statistics().num_scps_computed);

        // Coming back to (0, 0) introduces no new fact... and even going to
        // (1, 0) again is old news by now.
        heuristic.notify_state_transition(&novel, 0, &novel);
        heuristic.compute_heuristic(&novel);
        assert_eq!(2, heuristic.statistics().num_scps_computed);
    }

    #[test]
    fn an_exhausted_time_budget_freezes_the_portfolio() {
        let task = independent_task();
        let config = OnlineHeuristicConfig {
            max_time: Duration::ZERO,
            use_evaluated_state_as_sample: true,
            ..OnlineHeuristicConfig::default()
        };
        let mut heuristic = online(&task, config);
        // The first evaluation freezes immediately (elapsed >= 0 budget):
        // nothing is ever stored, later estimates fall back to zero.
        assert_eq!(Some(0), heuristic.compute_heuristic(&State::new(vec![0, 0])));
        assert!(!heuristic.is_improving());
        assert_eq!(Some(0), heuristic.compute_heuristic(&State::new(vec![0, 0])));
        assert_eq!(0, heuristic.statistics().num_scps_computed);
    }

    #[test]
    fn perimstar_still_matches_the_plain_estimate_at_the_sample() {
        let task = independent_task();
        let config = OnlineHeuristicConfig {
            saturator: Saturator::Perimstar,
            use_evaluated_state_as_sample: true,
            ..OnlineHeuristicConfig::default()
        };
        let mut heuristic = online(&task, config);
        assert_eq!(Some(2), heuristic.compute_heuristic(&State::new(vec![0, 0])));
        assert_eq!(Some(1), heuristic.compute_heuristic(&State::new(vec![0, 1])));
    }

    #[test]
    fn statistics_track_the_portfolio_maximum() {
        let task = independent_task();
        let config = OnlineHeuristicConfig {
            use_evaluated_state_as_sample: true,
            ..OnlineHeuristicConfig::default()
        };
        let mut heuristic = online(&task, config);
        heuristic.compute_heuristic(&State::new(vec![0, 0]));
        heuristic.compute_heuristic(&State::new(vec![0, 0]));
        let statistics = heuristic.statistics();
        assert_eq!(2, statistics.num_evaluated_states);
        assert_eq!(vec![1], statistics.num_best_order);
    }
}
