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

//! This module provides the indices that are precomputed once per task and
//! then shared by every projection, pattern evaluator and pattern order:
//! per-operator effect and precondition values, per-variable relevant
//! operators and the causal graph.

use crate::{FactPair, Pattern, Task, Variable};

/// Sentinel for "the operator has no precondition/effect on this variable"
/// in the flat value tables below.
const NO_VALUE: usize = usize::MAX;

/// Precomputed per-task lookup structures. Building one is linear in the
/// size of the task; every query afterwards is a flat array access.
#[derive(Debug)]
pub struct TaskInfo {
    num_variables: usize,
    num_operators: usize,
    variable_domains: Vec<usize>,
    goals: Vec<FactPair>,
    /// Flat row-major table: entry `op * num_variables + var` is the value
    /// the operator's effect assigns to the variable, or `NO_VALUE`.
    effect_value: Vec<usize>,
    /// Same layout: the value the operator's precondition requires, or
    /// `NO_VALUE`.
    precondition_value: Vec<usize>,
    /// For each variable, the ids of the operators with an effect on it.
    relevant_operators: Vec<Vec<usize>>,
    causal_graph: CausalGraph,
}

impl TaskInfo {
    pub fn new(task: &Task) -> Self {
        let num_variables = task.num_variables();
        let num_operators = task.num_operators();
        let mut effect_value = vec![NO_VALUE; num_operators * num_variables];
        let mut precondition_value = vec![NO_VALUE; num_operators * num_variables];
        let mut relevant_operators = vec![vec![]; num_variables];
        for (op_id, op) in task.operators().iter().enumerate() {
            for pre in &op.preconditions {
                precondition_value[op_id * num_variables + pre.variable.id()] = pre.value;
            }
            for effect in &op.effects {
                let var = effect.fact.variable.id();
                effect_value[op_id * num_variables + var] = effect.fact.value;
                relevant_operators[var].push(op_id);
            }
        }
        TaskInfo {
            num_variables,
            num_operators,
            variable_domains: task.variable_domains().to_vec(),
            goals: task.goals().to_vec(),
            effect_value,
            precondition_value,
            relevant_operators,
            causal_graph: CausalGraph::new(task),
        }
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }
    pub fn num_operators(&self) -> usize {
        self.num_operators
    }
    pub fn variable_domains(&self) -> &[usize] {
        &self.variable_domains
    }
    pub fn goals(&self) -> &[FactPair] {
        &self.goals
    }
    pub fn causal_graph(&self) -> &CausalGraph {
        &self.causal_graph
    }

    /// Operators with an effect on the given variable.
    pub fn relevant_operators(&self, variable: Variable) -> &[usize] {
        &self.relevant_operators[variable.id()]
    }

    /// Returns true iff the operator induces a state-changing transition in
    /// the projection onto the pattern: some pattern variable gets an effect
    /// value that differs from the precondition value, or has no
    /// precondition at all (and more than one value to come from). An
    /// effect that merely confirms its own precondition only ever produces
    /// self loops.
    pub fn operator_is_active_in_pattern(&self, pattern: &[Variable], op_id: usize) -> bool {
        pattern.iter().any(|&var| {
            let index = op_id * self.num_variables + var.id();
            let effect = self.effect_value[index];
            if effect == NO_VALUE {
                return false;
            }
            match self.precondition_value[index] {
                NO_VALUE => self.variable_domains[var.id()] > 1,
                precondition => precondition != effect,
            }
        })
    }

    /// The number of operators inducing state-changing transitions in the
    /// projection onto the pattern.
    pub fn num_active_operators(&self, pattern: &[Variable]) -> usize {
        (0..self.num_operators)
            .filter(|&op| self.operator_is_active_in_pattern(pattern, op))
            .count()
    }
}

/// The causal graph of the task: an arc u → v for every operator with a
/// precondition on u and an effect on v, and arcs both ways between every
/// two variables affected by one same operator.
#[derive(Debug)]
pub struct CausalGraph {
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
    /// Undirected view of the two lists above, deduplicated and sorted.
    neighbors: Vec<Vec<usize>>,
}

impl CausalGraph {
    pub fn new(task: &Task) -> Self {
        let n = task.num_variables();
        let mut successors = vec![vec![]; n];
        let mut predecessors = vec![vec![]; n];
        let mut add_arc = |from: usize, to: usize| {
            if from != to {
                successors[from].push(to);
                predecessors[to].push(from);
            }
        };
        for op in task.operators() {
            for pre in &op.preconditions {
                for effect in &op.effects {
                    add_arc(pre.variable.id(), effect.fact.variable.id());
                }
            }
            for e1 in &op.effects {
                for e2 in &op.effects {
                    add_arc(e1.fact.variable.id(), e2.fact.variable.id());
                }
            }
        }
        for list in successors.iter_mut().chain(predecessors.iter_mut()) {
            list.sort_unstable();
            list.dedup();
        }
        let neighbors = (0..n)
            .map(|var| {
                let mut merged = successors[var].clone();
                merged.extend_from_slice(&predecessors[var]);
                merged.sort_unstable();
                merged.dedup();
                merged
            })
            .collect();
        CausalGraph { successors, predecessors, neighbors }
    }

    pub fn neighbors(&self, variable: Variable) -> &[usize] {
        &self.neighbors[variable.id()]
    }

    /// Marks every variable from which a goal variable can be reached along
    /// causal graph arcs (the goal variables themselves included). These are
    /// the variables whose value can still matter for reaching the goal.
    pub fn goal_relevant_variables(&self, goals: &[FactPair]) -> Vec<bool> {
        let mut relevant = vec![false; self.successors.len()];
        let mut queue: Vec<usize> = vec![];
        for goal in goals {
            let var = goal.variable.id();
            if !relevant[var] {
                relevant[var] = true;
                queue.push(var);
            }
        }
        while let Some(var) = queue.pop() {
            for &pred in &self.predecessors[var] {
                if !relevant[pred] {
                    relevant[pred] = true;
                    queue.push(pred);
                }
            }
        }
        relevant
    }

    /// Returns true iff the subgraph induced by the pattern is weakly
    /// connected. Singleton patterns are trivially connected.
    pub fn is_connected(&self, pattern: &Pattern) -> bool {
        if pattern.len() <= 1 {
            return !pattern.is_empty();
        }
        let in_pattern = |var: usize| pattern.binary_search(&Variable(var)).is_ok();
        let mut visited = vec![false; pattern.len()];
        let mut stack = vec![0];
        visited[0] = true;
        let mut count = 1;
        while let Some(pos) = stack.pop() {
            for &next in &self.neighbors[pattern[pos].id()] {
                if in_pattern(next) {
                    let next_pos = pattern
                        .binary_search(&Variable(next))
                        .expect("neighbor is in pattern");
                    if !visited[next_pos] {
                        visited[next_pos] = true;
                        count += 1;
                        stack.push(next_pos);
                    }
                }
            }
        }
        count == pattern.len()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_task_info {
    use crate::*;

    /// Three variables: 0 --pre/eff--> 1 --pre/eff--> 2, goal on 2.
    fn chain_task() -> Task {
        let op = |name: &str, pre: (usize, usize), eff: (usize, usize)| Operator {
            name: name.to_string(),
            preconditions: vec![FactPair::new(pre.0, pre.1)],
            effects: vec![Effect::new(eff.0, eff.1)],
            cost: Cost::new(1),
        };
        Task::new(
            vec![2, 2, 2],
            vec![op("a", (0, 1), (1, 1)), op("b", (1, 1), (2, 1))],
            vec![],
            vec![FactPair::new(2, 1)],
            State::new(vec![0, 0, 0]),
        )
        .unwrap()
    }

    #[test]
    fn relevant_operators_are_grouped_per_variable() {
        let task = chain_task();
        let info = TaskInfo::new(&task);
        assert_eq!(&[] as &[usize], info.relevant_operators(Variable(0)));
        assert_eq!(&[0], info.relevant_operators(Variable(1)));
        assert_eq!(&[1], info.relevant_operators(Variable(2)));
    }

    #[test]
    fn operators_are_active_where_their_effects_can_change_something() {
        let task = chain_task();
        let info = TaskInfo::new(&task);
        assert_eq!(0, info.num_active_operators(&[Variable(0)]));
        assert_eq!(1, info.num_active_operators(&[Variable(0), Variable(1)]));
        assert_eq!(2, info.num_active_operators(&[Variable(1), Variable(2)]));
    }

    #[test]
    fn an_effect_confirming_its_own_precondition_is_not_active() {
        // One operator whose effect on variable 0 merely restates its
        // precondition, and genuinely flips variable 1.
        let task = Task::new(
            vec![2, 2],
            vec![Operator {
                name: "confirm_and_flip".to_string(),
                preconditions: vec![FactPair::new(0, 1), FactPair::new(1, 0)],
                effects: vec![Effect::new(0, 1), Effect::new(1, 1)],
                cost: Cost::new(1),
            }],
            vec![],
            vec![FactPair::new(1, 1)],
            State::new(vec![0, 0]),
        )
        .unwrap();
        let info = TaskInfo::new(&task);
        assert!(!info.operator_is_active_in_pattern(&[Variable(0)], 0));
        assert!(info.operator_is_active_in_pattern(&[Variable(1)], 0));
        assert_eq!(0, info.num_active_operators(&[Variable(0)]));
        assert_eq!(1, info.num_active_operators(&[Variable(0), Variable(1)]));
    }

    #[test]
    fn causal_arcs_are_directed_from_preconditions_to_effects() {
        // In the chain 0 → 1 → 2, nothing feeds into variable 0: with the
        // goal placed on it, no other variable is goal relevant.
        let task = chain_task();
        let info = TaskInfo::new(&task);
        let relevant = info
            .causal_graph()
            .goal_relevant_variables(&[FactPair::new(0, 1)]);
        assert_eq!(vec![true, false, false], relevant);
    }

    #[test]
    fn goal_relevance_walks_the_causal_graph_backwards() {
        let task = chain_task();
        let info = TaskInfo::new(&task);
        let relevant = info.causal_graph().goal_relevant_variables(task.goals());
        assert_eq!(vec![true, true, true], relevant);
    }

    #[test]
    fn connectivity_is_checked_within_the_pattern_only() {
        let task = chain_task();
        let info = TaskInfo::new(&task);
        let cg = info.causal_graph();
        assert!(cg.is_connected(&vec![Variable(0), Variable(1)]));
        assert!(cg.is_connected(&vec![Variable(1), Variable(2)]));
        // 0 and 2 are only connected through the missing middle variable.
        assert!(!cg.is_connected(&vec![Variable(0), Variable(2)]));
        assert!(cg.is_connected(&vec![Variable(0), Variable(1), Variable(2)]));
    }
}
