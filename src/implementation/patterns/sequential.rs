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

//! This module serves the enumerated patterns one by one, in a configurable
//! order. Patterns of one size are buffered in a flat pool the first time
//! that size is requested; a permutation over each buffer decides the order
//! in which the selection loop sees them, and volatile orders (the ones
//! depending on randomness or on global selection state) are recomputed on
//! every enumeration restart.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::implementation::patterns::systematic::SystematicPatternGenerator;
use crate::implementation::utils::{is_product_within_limit, CountdownTimer, PatternPool};
use crate::{Pattern, TaskInfo, Variable};

/// The order in which patterns of one same size are fed to the selection
/// loop. The CG_* orders exploit that variable indices are causal-graph
/// levels in common task encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternOrder {
    Original,
    Reverse,
    Random,
    PdbSizeUp,
    PdbSizeDown,
    CgSumUp,
    CgSumDown,
    CgMinUp,
    CgMinDown,
    CgMaxUp,
    CgMaxDown,
    NewVarPairsUp,
    NewVarPairsDown,
    ActiveOpsUp,
    ActiveOpsDown,
    /// Alternate between `CgMinDown` and `ActiveOpsUp` across restarts.
    AltTwo,
    /// Lexicographic: active operators ascending, then min variable
    /// descending.
    ActiveOpsUpCgMinDown,
    /// Lexicographic: min variable descending, then active operators
    /// ascending.
    CgMinDownActiveOpsUp,
}

impl PatternOrder {
    /// True for the orders whose scores depend on the selection state (used
    /// variable pairs, remaining costs) or on fresh randomness, and which
    /// must therefore be recomputed when the selection loop restarts.
    fn is_volatile(self) -> bool {
        matches!(
            self,
            PatternOrder::Random
                | PatternOrder::NewVarPairsUp
                | PatternOrder::NewVarPairsDown
                | PatternOrder::ActiveOpsUp
                | PatternOrder::ActiveOpsDown
                | PatternOrder::AltTwo
        )
    }
}

/// The symmetric "both variables already appear together in some selected
/// pattern" relation, used by the NEW_VAR_PAIRS orders and maintained by the
/// selection loop.
#[derive(Debug)]
pub struct VariablePairs {
    num_variables: usize,
    used: Vec<bool>,
}

impl VariablePairs {
    pub fn new(num_variables: usize) -> Self {
        VariablePairs { num_variables, used: vec![false; num_variables * num_variables] }
    }
    pub fn is_used(&self, var1: Variable, var2: Variable) -> bool {
        self.used[var1.id() * self.num_variables + var2.id()]
    }
    /// Marks every pair of variables within the pattern as used.
    pub fn mark_pattern(&mut self, pattern: &[Variable]) {
        for var1 in pattern {
            for var2 in pattern {
                self.used[var1.id() * self.num_variables + var2.id()] = true;
            }
        }
    }
    /// The number of unordered variable pairs of the pattern not yet marked.
    pub fn count_new(&self, pattern: &[Variable]) -> usize {
        let mut count = 0;
        for (position, var1) in pattern.iter().enumerate() {
            for var2 in &pattern[position + 1..] {
                if !self.is_used(*var1, *var2) {
                    count += 1;
                }
            }
        }
        count
    }
}

fn pdb_size_score(domains: &[usize], pattern: &[Variable]) -> i64 {
    let mut size = 1usize;
    for var in pattern {
        if is_product_within_limit(size, domains[var.id()], i64::MAX as usize) {
            size *= domains[var.id()];
        } else {
            return -1;
        }
    }
    size as i64
}

fn compute_score(
    pattern: &[Variable],
    order_type: PatternOrder,
    task_info: &TaskInfo,
    used_var_pairs: &VariablePairs,
) -> i64 {
    match order_type {
        PatternOrder::PdbSizeUp | PatternOrder::PdbSizeDown => {
            pdb_size_score(task_info.variable_domains(), pattern)
        }
        PatternOrder::CgSumUp | PatternOrder::CgSumDown => {
            pattern.iter().map(|var| var.id() as i64).sum()
        }
        PatternOrder::CgMinUp | PatternOrder::CgMinDown => {
            pattern.iter().map(|var| var.id() as i64).min().unwrap_or(-1)
        }
        PatternOrder::CgMaxUp | PatternOrder::CgMaxDown => {
            pattern.iter().map(|var| var.id() as i64).max().unwrap_or(-1)
        }
        PatternOrder::NewVarPairsUp | PatternOrder::NewVarPairsDown => {
            used_var_pairs.count_new(pattern) as i64
        }
        PatternOrder::ActiveOpsUp | PatternOrder::ActiveOpsDown => {
            task_info.num_active_operators(pattern) as i64
        }
        _ => unreachable!("no score for order {:?}", order_type),
    }
}

fn compute_pattern_order(
    patterns: &PatternPool,
    order: &mut [usize],
    order_type: PatternOrder,
    task_info: &TaskInfo,
    used_var_pairs: &VariablePairs,
    rng: &mut StdRng,
) {
    debug_assert_eq!(patterns.len(), order.len());
    match order_type {
        PatternOrder::Original => return,
        PatternOrder::Reverse => {
            order.reverse();
            return;
        }
        _ => {}
    }

    // Shuffling first makes the subsequent stable sort break score ties at
    // random rather than by generation order.
    order.shuffle(rng);
    if order_type == PatternOrder::Random {
        return;
    }

    if order_type == PatternOrder::ActiveOpsUpCgMinDown
        || order_type == PatternOrder::CgMinDownActiveOpsUp
    {
        let keys: Vec<(i64, i64)> = (0..patterns.len())
            .map(|id| {
                let active_ops = compute_score(
                    patterns.get(id),
                    PatternOrder::ActiveOpsUp,
                    task_info,
                    used_var_pairs,
                );
                let cg_min = compute_score(
                    patterns.get(id),
                    PatternOrder::CgMinUp,
                    task_info,
                    used_var_pairs,
                );
                if order_type == PatternOrder::ActiveOpsUpCgMinDown {
                    (active_ops, -cg_min)
                } else {
                    (-cg_min, active_ops)
                }
            })
            .collect();
        order.sort_by_key(|&id| keys[id]);
        return;
    }

    let scores: Vec<i64> = (0..patterns.len())
        .map(|id| compute_score(patterns.get(id), order_type, task_info, used_var_pairs))
        .collect();
    order.sort_by_key(|&id| scores[id]);

    if matches!(
        order_type,
        PatternOrder::PdbSizeDown
            | PatternOrder::CgSumDown
            | PatternOrder::CgMinDown
            | PatternOrder::CgMaxDown
            | PatternOrder::NewVarPairsDown
            | PatternOrder::ActiveOpsDown
    ) {
        order.reverse();
    }
}

/// Buffers the systematic patterns size by size and serves them through the
/// per-size permutations.
pub(crate) struct SequentialPatternGenerator<'a> {
    task_info: &'a TaskInfo,
    systematic: SystematicPatternGenerator<'a>,
    max_pattern_size: usize,
    order_type: PatternOrder,
    default_order_type: PatternOrder,
    buckets: Vec<PatternPool>,
    orders: Vec<Vec<usize>>,
    cached_pattern_size: usize,
    num_generated_patterns: usize,
}

impl<'a> SequentialPatternGenerator<'a> {
    pub fn new(
        task_info: &'a TaskInfo,
        max_pattern_size: usize,
        only_sga_patterns: bool,
        order_type: PatternOrder,
        rng: &mut StdRng,
    ) -> Self {
        let default_order_type = resolve_order_type(order_type, rng);
        SequentialPatternGenerator {
            task_info,
            systematic: SystematicPatternGenerator::new(task_info, only_sga_patterns),
            max_pattern_size: max_pattern_size.min(task_info.num_variables()),
            order_type,
            default_order_type,
            buckets: vec![],
            orders: vec![],
            cached_pattern_size: 0,
            num_generated_patterns: 0,
        }
    }

    /// The `pattern_id`-th pattern of the current enumeration order, or
    /// `None` when all sizes are exhausted or the timer expired while a new
    /// size was being generated (the caller tells those apart by polling the
    /// timer).
    pub fn pattern(
        &mut self,
        pattern_id: usize,
        used_var_pairs: &VariablePairs,
        timer: &CountdownTimer,
        rng: &mut StdRng,
    ) -> Option<Pattern> {
        loop {
            if pattern_id < self.num_generated_patterns {
                let mut start = 0;
                for (bucket, order) in self.buckets.iter().zip(&self.orders) {
                    if pattern_id < start + order.len() {
                        return Some(bucket.get(order[pattern_id - start]).to_vec());
                    }
                    start += order.len();
                }
                unreachable!("pattern id is within the generated range");
            }
            if self.cached_pattern_size >= self.max_pattern_size {
                return None;
            }
            let size = self.cached_pattern_size + 1;
            let patterns = self.systematic.patterns_of_size(size, timer)?;
            self.cached_pattern_size = size;
            let mut bucket = PatternPool::new();
            for pattern in patterns {
                bucket.push(pattern);
            }
            debug!(size, patterns = bucket.len(), "buffered patterns");
            self.num_generated_patterns += bucket.len();
            let mut order: Vec<usize> = (0..bucket.len()).collect();
            compute_pattern_order(
                &bucket,
                &mut order,
                self.default_order_type,
                self.task_info,
                used_var_pairs,
                rng,
            );
            self.buckets.push(bucket);
            self.orders.push(order);
        }
    }

    /// Recomputes the volatile per-size orders at the start of a new
    /// selection round.
    pub fn restart(&mut self, used_var_pairs: &VariablePairs, rng: &mut StdRng) {
        if !self.order_type.is_volatile() {
            return;
        }
        let current_order_type = resolve_order_type(self.order_type, rng);
        for (bucket, order) in self.buckets.iter().zip(self.orders.iter_mut()) {
            let mut fresh: Vec<usize> = (0..bucket.len()).collect();
            compute_pattern_order(
                bucket,
                &mut fresh,
                current_order_type,
                self.task_info,
                used_var_pairs,
                rng,
            );
            *order = fresh;
        }
    }

    pub fn num_generated_patterns(&self) -> usize {
        self.num_generated_patterns
    }

    pub fn max_generated_pattern_size(&self) -> usize {
        self.cached_pattern_size
    }
}

/// Resolves `AltTwo` to one of its two constituents by coin flip; every
/// other order stands for itself.
fn resolve_order_type(order_type: PatternOrder, rng: &mut StdRng) -> PatternOrder {
    if order_type == PatternOrder::AltTwo {
        if rng.gen_range(0..2) == 0 {
            PatternOrder::CgMinDown
        } else {
            PatternOrder::ActiveOpsUp
        }
    } else {
        order_type
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
