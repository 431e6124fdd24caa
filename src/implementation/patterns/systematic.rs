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

//! This module enumerates the patterns worth projecting onto, size by size.
//! A pattern is *interesting* when its causal-graph restriction is weakly
//! connected and at least one of its variables is goal relevant (a goal
//! variable or a causal ancestor of one); the optional SGA filter demands
//! that *every* variable be goal relevant. Patterns of size k + 1 are grown
//! from patterns of size k by adding a causal-graph neighbor, which reaches
//! exactly the interesting patterns without ever considering a disconnected
//! candidate.

use fxhash::FxHashSet;
use tracing::debug;

use crate::implementation::utils::CountdownTimer;
use crate::{Pattern, TaskInfo, Variable};

pub(crate) struct SystematicPatternGenerator<'a> {
    task_info: &'a TaskInfo,
    only_sga_patterns: bool,
    goal_relevant: Vec<bool>,
    /// `layers[k]` holds every admissible pattern of size `k + 1`.
    layers: Vec<Vec<Pattern>>,
}

impl<'a> SystematicPatternGenerator<'a> {
    pub fn new(task_info: &'a TaskInfo, only_sga_patterns: bool) -> Self {
        let goal_relevant = task_info
            .causal_graph()
            .goal_relevant_variables(task_info.goals());
        SystematicPatternGenerator {
            task_info,
            only_sga_patterns,
            goal_relevant,
            layers: vec![],
        }
    }

    /// All admissible patterns of exactly the given size, or `None` when the
    /// timer expired before the layer was complete. Layers are grown lazily
    /// and kept, so asking again is free.
    pub fn patterns_of_size(
        &mut self,
        size: usize,
        timer: &CountdownTimer,
    ) -> Option<&[Pattern]> {
        debug_assert!(size >= 1);
        while self.layers.len() < size {
            if !self.grow_next_layer(timer) {
                return None;
            }
        }
        Some(&self.layers[size - 1])
    }

    fn grow_next_layer(&mut self, timer: &CountdownTimer) -> bool {
        let layer = if self.layers.is_empty() {
            (0..self.task_info.num_variables())
                .filter(|&var| self.goal_relevant[var])
                .map(|var| vec![Variable(var)])
                .collect()
        } else {
            let previous = self.layers.last().expect("there is a previous layer");
            let mut seen: FxHashSet<Pattern> = FxHashSet::default();
            let mut layer = vec![];
            for pattern in previous {
                if timer.is_expired() {
                    return false;
                }
                for var in pattern {
                    for &neighbor in self.task_info.causal_graph().neighbors(*var) {
                        if self.only_sga_patterns && !self.goal_relevant[neighbor] {
                            continue;
                        }
                        let position = match pattern.binary_search(&Variable(neighbor)) {
                            Ok(_) => continue,
                            Err(position) => position,
                        };
                        let mut extended = pattern.clone();
                        extended.insert(position, Variable(neighbor));
                        debug_assert!(
                            self.task_info.causal_graph().is_connected(&extended),
                            "neighbor extension must preserve connectivity"
                        );
                        if seen.insert(extended.clone()) {
                            layer.push(extended);
                        }
                    }
                }
            }
            layer
        };
        debug!(size = self.layers.len() + 1, patterns = layer.len(), "generated pattern layer");
        self.layers.push(layer);
        true
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_systematic_patterns {
    use super::SystematicPatternGenerator;
    use crate::implementation::utils::CountdownTimer;
    use crate::*;
    use std::time::Duration;

    fn long_timer() -> CountdownTimer {
        CountdownTimer::new(Duration::from_secs(3600))
    }

    /// Three binary variables, fully connected causal graph (one operator
    /// affects all three), goal on variable 0 only.
    fn clique_task() -> Task {
        Task::new(
            vec![2, 2, 2],
            vec![Operator {
                name: "touch_all".to_string(),
                preconditions: vec![],
                effects: vec![Effect::new(0, 1), Effect::new(1, 1), Effect::new(2, 1)],
                cost: Cost::new(1),
            }],
            vec![],
            vec![FactPair::new(0, 1)],
            State::new(vec![0, 0, 0]),
        )
        .unwrap()
    }

    /// A causal chain 0 → 1 → 2 with the goal on variable 2; variable 3 is
    /// disconnected noise.
    fn chain_task() -> Task {
        let op = |name: &str, pre: usize, eff: usize| Operator {
            name: name.to_string(),
            preconditions: vec![FactPair::new(pre, 1)],
            effects: vec![Effect::new(eff, 1)],
            cost: Cost::new(1),
        };
        Task::new(
            vec![2, 2, 2, 2],
            vec![
                op("a", 0, 1),
                op("b", 1, 2),
                Operator {
                    name: "noise".to_string(),
                    preconditions: vec![],
                    effects: vec![Effect::new(3, 1)],
                    cost: Cost::new(1),
                },
            ],
            vec![],
            vec![FactPair::new(2, 1)],
            State::new(vec![0, 0, 0, 0]),
        )
        .unwrap()
    }

    #[test]
    fn a_clique_with_one_goal_variable_yields_all_connected_patterns() {
        let task = clique_task();
        let info = TaskInfo::new(&task);
        let mut generator = SystematicPatternGenerator::new(&info, false);
        let timer = long_timer();
        assert_eq!(3, generator.patterns_of_size(1, &timer).unwrap().len());
        assert_eq!(3, generator.patterns_of_size(2, &timer).unwrap().len());
        assert_eq!(1, generator.patterns_of_size(3, &timer).unwrap().len());
    }

    #[test]
    fn variables_irrelevant_to_the_goal_never_appear() {
        let task = chain_task();
        let info = TaskInfo::new(&task);
        let mut generator = SystematicPatternGenerator::new(&info, false);
        let timer = long_timer();
        let singletons = generator.patterns_of_size(1, &timer).unwrap();
        assert_eq!(
            vec![vec![Variable(0)], vec![Variable(1)], vec![Variable(2)]],
            singletons.to_vec()
        );
        let pairs = generator.patterns_of_size(2, &timer).unwrap();
        assert!(pairs.iter().all(|p| !p.contains(&Variable(3))));
        // Only the chain edges are connected: {0,1} and {1,2}.
        assert_eq!(2, pairs.len());
    }

    #[test]
    fn the_sga_filter_restricts_extensions_to_goal_relevant_variables() {
        // Goal on variable 1 in the chain: variable 2 is no longer goal
        // relevant, variable 0 still is.
        let op = |name: &str, pre: usize, eff: usize| Operator {
            name: name.to_string(),
            preconditions: vec![FactPair::new(pre, 1)],
            effects: vec![Effect::new(eff, 1)],
            cost: Cost::new(1),
        };
        let task = Task::new(
            vec![2, 2, 2],
            vec![op("a", 0, 1), op("b", 1, 2)],
            vec![],
            vec![FactPair::new(1, 1)],
            State::new(vec![0, 0, 0]),
        )
        .unwrap();
        let info = TaskInfo::new(&task);
        let timer = long_timer();

        let mut unrestricted = SystematicPatternGenerator::new(&info, false);
        let loose: Vec<Pattern> = unrestricted.patterns_of_size(2, &timer).unwrap().to_vec();
        assert!(loose.contains(&vec![Variable(1), Variable(2)]));

        let mut sga = SystematicPatternGenerator::new(&info, true);
        assert_eq!(
            vec![vec![Variable(0), Variable(1)]],
            sga.patterns_of_size(2, &timer).unwrap().to_vec()
        );
    }
}
