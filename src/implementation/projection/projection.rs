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

//! This module provides the one abstraction type shipped with this crate:
//! the projection of the task onto a pattern of variables. A projection owns
//! the pattern, the multiplied-out abstract operators, a match tree indexing
//! them, and the abstract goal states; abstract states are identified by a
//! perfect hash over the pattern variables.

use crate::implementation::priority_queue::AdaptiveQueue;
use crate::implementation::projection::match_tree::MatchTree;
use crate::{
    Abstraction, AbstractionFunction, Cost, Error, FactPair, Pattern, State, Task, Variable,
};

/// One abstract operator in *regression* form: `regression_preconditions`
/// constrains the transition's target state, and subtracting `hash_delta`
/// from the target's index yields the source's index. A single concrete
/// operator multiplies out into one abstract operator per combination of
/// source values for the affected pattern variables it has no precondition
/// on.
#[derive(Debug, Clone)]
pub(crate) struct AbstractOperator {
    pub concrete_op_id: usize,
    /// Perfect-hash index difference between the target and the source of
    /// every transition this operator induces.
    pub hash_delta: isize,
    /// Sorted (pattern-local variable, value) pairs the target state must
    /// satisfy.
    pub regression_preconditions: Vec<(usize, usize)>,
}

/// The result of projecting all task operators onto one pattern.
pub(crate) struct ProjectedOperators {
    pub operators: Vec<AbstractOperator>,
    /// Per concrete operator: does it induce a state-changing transition?
    pub active: Vec<bool>,
    /// Per concrete operator: does it induce a self loop? An operator can
    /// induce both.
    pub looping: Vec<bool>,
}

/// Multiplies every relevant task operator out into its abstract operators.
/// Operators without any effect on the pattern are skipped entirely: they
/// only induce self loops and never change a distance. Abstract operators
/// whose hash delta is zero are likewise dropped after being recorded in the
/// looping classification.
pub(crate) fn project_operators(
    task: &Task,
    pattern: &[Variable],
    domains: &[usize],
    multipliers: &[usize],
) -> ProjectedOperators {
    let mut local_index = vec![usize::MAX; task.num_variables()];
    for (local, var) in pattern.iter().enumerate() {
        local_index[var.id()] = local;
    }

    let mut result = ProjectedOperators {
        operators: vec![],
        active: vec![false; task.num_operators()],
        looping: vec![false; task.num_operators()],
    };

    for (op_id, op) in task.operators().iter().enumerate() {
        // Precondition value per pattern-local variable, if any.
        let mut pre_value = vec![None; pattern.len()];
        for pre in &op.preconditions {
            let local = local_index[pre.variable.id()];
            if local != usize::MAX {
                pre_value[local] = Some(pre.value);
            }
        }
        let mut effect_on = vec![None; pattern.len()];
        for effect in &op.effects {
            let local = local_index[effect.fact.variable.id()];
            if local != usize::MAX {
                effect_on[local] = Some(effect.fact.value);
            }
        }
        if effect_on.iter().all(Option::is_none) {
            continue;
        }

        let mut preconditions = vec![];
        let mut base_delta = 0isize;
        // Pattern variables whose source value must be enumerated, with the
        // value the effect assigns to them.
        let mut enumerated = vec![];
        for local in 0..pattern.len() {
            match (effect_on[local], pre_value[local]) {
                (Some(eff), Some(pre)) => {
                    preconditions.push((local, eff));
                    base_delta += (eff as isize - pre as isize) * multipliers[local] as isize;
                }
                (Some(eff), None) => {
                    preconditions.push((local, eff));
                    enumerated.push((local, eff));
                }
                (None, Some(pre)) => {
                    preconditions.push((local, pre));
                }
                (None, None) => {}
            }
        }
        preconditions.sort_unstable();

        multiply_out(
            op_id,
            base_delta,
            &preconditions,
            &enumerated,
            domains,
            multipliers,
            0,
            &mut result,
        );
    }
    result
}

#[allow(clippy::too_many_arguments)]
fn multiply_out(
    op_id: usize,
    delta: isize,
    preconditions: &[(usize, usize)],
    enumerated: &[(usize, usize)],
    domains: &[usize],
    multipliers: &[usize],
    position: usize,
    result: &mut ProjectedOperators,
) {
    if position == enumerated.len() {
        if delta == 0 {
            result.looping[op_id] = true;
        } else {
            result.active[op_id] = true;
            result.operators.push(AbstractOperator {
                concrete_op_id: op_id,
                hash_delta: delta,
                regression_preconditions: preconditions.to_vec(),
            });
        }
        return;
    }
    let (local, eff) = enumerated[position];
    for source in 0..domains[local] {
        let contribution = (eff as isize - source as isize) * multipliers[local] as isize;
        multiply_out(
            op_id,
            delta + contribution,
            preconditions,
            enumerated,
            domains,
            multipliers,
            position + 1,
            result,
        );
    }
}

/// Enumerates the abstract states that satisfy the given (pattern-local
/// variable, value) constraints, by running an odometer over the
/// unconstrained variables.
pub(crate) fn for_each_matching_state(
    domains: &[usize],
    multipliers: &[usize],
    constraints: &[(usize, usize)],
    mut f: impl FnMut(usize),
) {
    let mut constrained = vec![false; domains.len()];
    let mut base = 0;
    for &(local, value) in constraints {
        constrained[local] = true;
        base += value * multipliers[local];
    }
    let free: Vec<(usize, usize)> = (0..domains.len())
        .filter(|&local| !constrained[local])
        .map(|local| (domains[local], multipliers[local]))
        .collect();

    let mut counters = vec![0; free.len()];
    let mut index = base;
    loop {
        f(index);
        let mut level = 0;
        loop {
            if level == free.len() {
                return;
            }
            counters[level] += 1;
            if counters[level] < free[level].0 {
                index += free[level].1;
                break;
            }
            index -= free[level].1 * (free[level].0 - 1);
            counters[level] = 0;
            level += 1;
        }
    }
}

/// Collects the abstract states consistent with the task goal projected onto
/// the pattern. A pattern without any goal variable makes every abstract
/// state a goal state.
pub(crate) fn enumerate_goal_states(
    goals: &[FactPair],
    pattern: &[Variable],
    domains: &[usize],
    multipliers: &[usize],
) -> Vec<usize> {
    let abstract_goals: Vec<(usize, usize)> = pattern
        .iter()
        .enumerate()
        .filter_map(|(local, var)| {
            goals
                .iter()
                .find(|goal| goal.variable == *var)
                .map(|goal| (local, goal.value))
        })
        .collect();
    let mut goal_states = vec![];
    for_each_matching_state(domains, multipliers, &abstract_goals, |index| {
        goal_states.push(index)
    });
    goal_states.sort_unstable();
    goal_states
}

/// What a projection keeps while it is still a full transition system. This
/// part can be released to shed memory once only the state mapping matters.
#[derive(Debug)]
struct TransitionSystem {
    abstract_operators: Vec<AbstractOperator>,
    match_tree: MatchTree,
    active: Vec<bool>,
    looping: Vec<bool>,
    goal_states: Vec<usize>,
}

/// The projection of the task onto a pattern: the one concrete
/// [`Abstraction`] of this crate. Distances over the abstract state space
/// are pattern database values.
#[derive(Debug)]
pub struct Projection {
    pattern: Pattern,
    pattern_domains: Vec<usize>,
    hash_multipliers: Vec<usize>,
    num_states: usize,
    num_operators: usize,
    transition_system: Option<TransitionSystem>,
}

impl Projection {
    /// Builds the projection of `task` onto `pattern`. The pattern must be a
    /// non-empty, strictly increasing sequence of valid task variables and
    /// the product of its variable domains must be addressable; violations
    /// are configuration errors.
    pub fn new(task: &Task, pattern: Pattern) -> Result<Self, Error> {
        if pattern.is_empty() {
            return Err(Error::Config("empty pattern".to_string()));
        }
        if pattern.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::Config(format!(
                "pattern {:?} is not sorted and duplicate free",
                pattern
            )));
        }
        if pattern.last().expect("pattern is non empty").id() >= task.num_variables() {
            return Err(Error::Config(format!(
                "pattern {:?} uses a variable the task does not have",
                pattern
            )));
        }

        let pattern_domains: Vec<usize> = pattern
            .iter()
            .map(|var| task.domain_size(*var))
            .collect();
        let mut hash_multipliers = Vec::with_capacity(pattern.len());
        let mut num_states = 1usize;
        for &domain in &pattern_domains {
            hash_multipliers.push(num_states);
            num_states = num_states.checked_mul(domain).ok_or_else(|| {
                Error::Config(format!("pattern {:?} is too large to address", pattern))
            })?;
        }

        let projected = project_operators(task, &pattern, &pattern_domains, &hash_multipliers);
        let mut match_tree = MatchTree::new(pattern_domains.clone(), hash_multipliers.clone());
        for (aop_id, aop) in projected.operators.iter().enumerate() {
            match_tree.insert(aop_id, &aop.regression_preconditions);
        }
        let goal_states =
            enumerate_goal_states(task.goals(), &pattern, &pattern_domains, &hash_multipliers);

        Ok(Projection {
            pattern,
            pattern_domains,
            hash_multipliers,
            num_states,
            num_operators: task.num_operators(),
            transition_system: Some(TransitionSystem {
                abstract_operators: projected.operators,
                match_tree,
                active: projected.active,
                looping: projected.looping,
                goal_states,
            }),
        })
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Drops the abstract operators, the match tree and the goal states.
    /// Only the pattern and the hash multipliers survive, which is all
    /// [`Abstraction::abstract_state_id`] needs.
    pub fn release_transition_system_memory(&mut self) {
        self.transition_system = None;
    }

    fn transition_system(&self) -> &TransitionSystem {
        self.transition_system
            .as_ref()
            .expect("the transition system has been released")
    }
}

impl Abstraction for Projection {
    fn abstract_state_id(&self, state: &State) -> usize {
        self.pattern
            .iter()
            .zip(&self.hash_multipliers)
            .map(|(var, multiplier)| state.value(*var) * multiplier)
            .sum()
    }

    fn compute_goal_distances(&self, costs: &[Cost]) -> Vec<Cost> {
        debug_assert_eq!(costs.len(), self.num_operators);
        let ts = self.transition_system();
        let mut distances = vec![Cost::INFINITY; self.num_states];
        let mut queue = AdaptiveQueue::new();
        for &goal in &ts.goal_states {
            distances[goal] = Cost::ZERO;
            queue.push(Cost::ZERO, goal);
        }
        let mut applicable = vec![];
        while let Some((distance, target)) = queue.pop() {
            if distance > distances[target] {
                continue;
            }
            applicable.clear();
            ts.match_tree.applicable_operators(target, &mut applicable);
            for &aop_id in &applicable {
                let aop = &ts.abstract_operators[aop_id];
                let cost = costs[aop.concrete_op_id];
                if cost.is_infinite() {
                    continue;
                }
                let source = (target as isize - aop.hash_delta) as usize;
                let alternative = distance.saturating_add(cost);
                if alternative < distances[source] {
                    distances[source] = alternative;
                    queue.push(alternative, source);
                }
            }
        }
        distances
    }

    fn compute_saturated_costs(&self, h_values: &[Cost]) -> Vec<Cost> {
        debug_assert_eq!(h_values.len(), self.num_states);
        let ts = self.transition_system();
        let mut saturated = vec![Cost::ZERO; self.num_operators];
        for aop in &ts.abstract_operators {
            let needed = &mut saturated[aop.concrete_op_id];
            for_each_matching_state(
                &self.pattern_domains,
                &self.hash_multipliers,
                &aop.regression_preconditions,
                |target| {
                    let source = (target as isize - aop.hash_delta) as usize;
                    let drop = Cost::saturation_needed(h_values[source], h_values[target]);
                    *needed = (*needed).max(drop);
                },
            );
        }
        saturated
    }

    fn num_states(&self) -> usize {
        self.num_states
    }

    fn goal_states(&self) -> &[usize] {
        &self.transition_system().goal_states
    }

    fn operator_is_active(&self, op_id: usize) -> bool {
        self.transition_system().active[op_id]
    }

    fn operator_induces_self_loop(&self, op_id: usize) -> bool {
        self.transition_system().looping[op_id]
    }

    fn extract_abstraction_function(self: Box<Self>) -> Box<dyn AbstractionFunction> {
        Box::new(ProjectionFunction {
            pattern: self.pattern,
            hash_multipliers: self.hash_multipliers,
        })
    }
}

/// The perfect hash of a projection, kept after the projection itself has
/// been discarded.
#[derive(Debug)]
pub struct ProjectionFunction {
    pattern: Pattern,
    hash_multipliers: Vec<usize>,
}

impl AbstractionFunction for ProjectionFunction {
    fn abstract_state_id(&self, state: &State) -> usize {
        self.pattern
            .iter()
            .zip(&self.hash_multipliers)
            .map(|(var, multiplier)| state.value(*var) * multiplier)
            .sum()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_projection {
    use crate::*;

    /// One binary variable, goal v=1, one operator flipping 0 to 1 at cost 3.
    fn flip_task() -> Task {
        Task::new(
            vec![2],
            vec![Operator {
                name: "flip".to_string(),
                preconditions: vec![FactPair::new(0, 0)],
                effects: vec![Effect::new(0, 1)],
                cost: Cost::new(3),
            }],
            vec![],
            vec![FactPair::new(0, 1)],
            State::new(vec![0]),
        )
        .unwrap()
    }

    /// Two binary variables, goal a=1 and b=1, one unit-cost setter each.
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
    fn a_pattern_with_an_unknown_variable_is_a_configuration_error() {
        let task = flip_task();
        assert!(matches!(
            Projection::new(&task, vec![Variable(3)]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn an_unsorted_pattern_is_a_configuration_error() {
        let task = independent_task();
        assert!(matches!(
            Projection::new(&task, vec![Variable(1), Variable(0)]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn flip_distances_and_saturation_match_the_single_variable_pdb() {
        let task = flip_task();
        let projection = Projection::new(&task, vec![Variable(0)]).unwrap();
        let h = projection.compute_goal_distances(&task.operator_costs());
        assert_eq!(vec![Cost::new(3), Cost::ZERO], h);
        let saturated = projection.compute_saturated_costs(&h);
        assert_eq!(vec![Cost::new(3)], saturated);
    }

    #[test]
    fn the_perfect_hash_ranks_pattern_values_with_mixed_radix() {
        let task = independent_task();
        let projection =
            Projection::new(&task, vec![Variable(0), Variable(1)]).unwrap();
        assert_eq!(4, projection.num_states());
        assert_eq!(0, projection.abstract_state_id(&State::new(vec![0, 0])));
        assert_eq!(1, projection.abstract_state_id(&State::new(vec![1, 0])));
        assert_eq!(2, projection.abstract_state_id(&State::new(vec![0, 1])));
        assert_eq!(3, projection.abstract_state_id(&State::new(vec![1, 1])));
    }

    #[test]
    fn operators_without_effects_on_the_pattern_are_not_active() {
        let task = independent_task();
        let projection = Projection::new(&task, vec![Variable(0)]).unwrap();
        assert!(projection.operator_is_active(0));
        assert!(!projection.operator_is_active(1));
        assert!(!projection.operator_induces_self_loop(1));
    }

    #[test]
    fn an_effect_without_precondition_also_loops() {
        // set_a can fire from a=1, which is a self loop on the projection.
        let task = independent_task();
        let projection = Projection::new(&task, vec![Variable(0)]).unwrap();
        assert!(projection.operator_induces_self_loop(0));
    }

    #[test]
    fn distances_are_monotone_in_the_cost_function() {
        let task = independent_task();
        let projection =
            Projection::new(&task, vec![Variable(0), Variable(1)]).unwrap();
        let cheap = projection
            .compute_goal_distances(&[Cost::new(1), Cost::new(1)]);
        let dear = projection
            .compute_goal_distances(&[Cost::new(5), Cost::new(2)]);
        for (lo, hi) in cheap.iter().zip(&dear) {
            assert!(lo <= hi);
        }
    }

    #[test]
    fn saturated_costs_preserve_the_goal_distances() {
        let task = independent_task();
        let projection =
            Projection::new(&task, vec![Variable(0), Variable(1)]).unwrap();
        let costs = task.operator_costs();
        let h = projection.compute_goal_distances(&costs);
        let saturated = projection.compute_saturated_costs(&h);
        let h_again = projection.compute_goal_distances(&saturated);
        assert_eq!(h, h_again);
    }

    #[test]
    fn an_unreachable_goal_makes_every_other_state_a_dead_end() {
        let task = Task::new(
            vec![2],
            vec![],
            vec![],
            vec![FactPair::new(0, 1)],
            State::new(vec![0]),
        )
        .unwrap();
        let projection = Projection::new(&task, vec![Variable(0)]).unwrap();
        let h = projection.compute_goal_distances(&[]);
        assert_eq!(vec![Cost::INFINITY, Cost::ZERO], h);
    }

    #[test]
    fn releasing_the_transition_system_keeps_the_state_mapping() {
        let task = independent_task();
        let mut projection = Projection::new(&task, vec![Variable(1)]).unwrap();
        projection.release_transition_system_memory();
        assert_eq!(1, projection.abstract_state_id(&State::new(vec![0, 1])));
        assert_eq!(2, projection.num_states());
    }

    #[test]
    fn the_extracted_function_agrees_with_the_projection() {
        let task = independent_task();
        let projection =
            Box::new(Projection::new(&task, vec![Variable(0), Variable(1)]).unwrap());
        let state = State::new(vec![1, 0]);
        let expected = projection.abstract_state_id(&state);
        let function = projection.extract_abstraction_function();
        assert_eq!(expected, function.abstract_state_id(&state));
    }
}
