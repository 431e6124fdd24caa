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

//! This module defines the most basic data types that are used throughout all
//! the code of our library (both at the abstraction and implementation levels).
//! These are also the types your client library is likely to work with.

use std::fmt;

// ----------------------------------------------------------------------------
// --- VARIABLE ---------------------------------------------------------------
// ----------------------------------------------------------------------------
/// This type denotes a state variable of the planning task at hand. Each
/// variable is assumed to be identified with an integer ranging from 0 until
/// `task.num_variables()` and takes its values from a finite domain
/// `0..task.domain_size(var)`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Variable(pub usize);
impl Variable {
    #[inline]
    /// This function returns the id (numeric value) of the variable.
    ///
    /// # Examples:
    /// ```
    /// # use satcp::Variable;
    /// assert_eq!(0, Variable(0).id());
    /// assert_eq!(2, Variable(2).id());
    /// ```
    pub fn id(self) -> usize {
        self.0
    }
}

// ----------------------------------------------------------------------------
// --- FACT -------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// A fact assigns a given `value` to the specified `variable`. Any given
/// `FactPair` should be understood as ```[[ variable = value ]]```. Facts are
/// the building blocks of operator preconditions and effects, of the goal,
/// and of partial states.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FactPair {
    pub variable: Variable,
    pub value: usize,
}
impl FactPair {
    pub fn new(variable: usize, value: usize) -> Self {
        FactPair { variable: Variable(variable), value }
    }
}

// ----------------------------------------------------------------------------
// --- COST -------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// An element of the cost algebra ℕ ∪ {+∞} used for operator costs, goal
/// distances and saturated costs alike. The infinite value is an explicit
/// sentinel: all arithmetic goes through the saturating helpers below and
/// there is no way to accidentally underflow past zero or wrap around the
/// sentinel with ordinary integer operations.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Cost(u32);

impl Cost {
    /// The neutral element of saturating addition.
    pub const ZERO: Cost = Cost(0);
    /// The absorbing element: the cost of an unusable operator, the goal
    /// distance of an unsolvable abstract state.
    pub const INFINITY: Cost = Cost(u32::MAX);

    /// Creates a new finite cost. Passing `u32::MAX` yields `INFINITY`.
    pub fn new(value: u32) -> Self {
        Cost(value)
    }
    /// A cost vector where every operator costs one. Used to compute pure
    /// reachability information (unsolvability detection).
    pub fn unit_vector(num_operators: usize) -> Vec<Cost> {
        vec![Cost(1); num_operators]
    }
    pub fn is_infinite(self) -> bool {
        self == Cost::INFINITY
    }
    pub fn is_zero(self) -> bool {
        self == Cost::ZERO
    }
    /// The finite payload of this cost, or `None` when it is infinite.
    pub fn finite(self) -> Option<u32> {
        if self.is_infinite() { None } else { Some(self.0) }
    }
    /// Addition where infinity absorbs and finite overflow saturates into
    /// infinity.
    pub fn saturating_add(self, rhs: Cost) -> Cost {
        if self.is_infinite() || rhs.is_infinite() {
            Cost::INFINITY
        } else {
            Cost(self.0.saturating_add(rhs.0))
        }
    }
    /// Subtraction clipped at zero. An infinite left operand stays infinite
    /// (no matter how much is subtracted); subtracting infinity from a finite
    /// cost yields zero.
    pub fn saturating_sub(self, rhs: Cost) -> Cost {
        if self.is_infinite() {
            Cost::INFINITY
        } else if rhs.is_infinite() {
            Cost::ZERO
        } else {
            Cost(self.0.saturating_sub(rhs.0))
        }
    }
    /// The amount of cost an operator must keep so that a transition from a
    /// state with goal distance `h_src` to one with goal distance `h_target`
    /// does not break either estimate:
    /// * both finite: `max(h_src - h_target, 0)`;
    /// * `h_src` infinite, `h_target` finite: the full infinite cost;
    /// * `h_src` finite, `h_target` infinite: `h_src` (the transition leads
    ///   into a dead end, the finite estimate bounds what must be kept);
    /// * both infinite: nothing.
    pub fn saturation_needed(h_src: Cost, h_target: Cost) -> Cost {
        match (h_src.is_infinite(), h_target.is_infinite()) {
            (true, false) => Cost::INFINITY,
            (true, true) => Cost::ZERO,
            (false, true) => h_src,
            (false, false) => Cost(h_src.0.saturating_sub(h_target.0)),
        }
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            write!(f, "infinity")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Decreases the remaining cost of every operator by the saturated amount,
/// clipping at zero and letting infinity absorb on the left.
pub fn reduce_costs(remaining_costs: &mut [Cost], saturated_costs: &[Cost]) {
    debug_assert_eq!(remaining_costs.len(), saturated_costs.len());
    for (remaining, &saturated) in remaining_costs.iter_mut().zip(saturated_costs) {
        *remaining = remaining.saturating_sub(saturated);
    }
}

// ----------------------------------------------------------------------------
// --- PATTERN AND ORDER ------------------------------------------------------
// ----------------------------------------------------------------------------
/// A pattern is the subset of task variables a projection abstraction keeps.
/// Patterns are kept as strictly increasing, duplicate free sequences of
/// variables.
pub type Pattern = Vec<Variable>;

/// An order is a permutation of abstraction ids; it decides which abstraction
/// gets served first when the cost function is partitioned.
pub type Order = Vec<usize>;

// ----------------------------------------------------------------------------
// --- STATE ------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// A complete assignment of one value to every task variable. This is the
/// object the search hands to the heuristic for evaluation.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct State(Vec<usize>);

impl State {
    pub fn new(values: Vec<usize>) -> Self {
        State(values)
    }
    #[inline]
    pub fn value(&self, variable: Variable) -> usize {
        self.0[variable.id()]
    }
    pub fn num_variables(&self) -> usize {
        self.0.len()
    }
}

// ----------------------------------------------------------------------------
// --- ERRORS -----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The fatal error kinds of this library. Everything else (budget exhaustion,
/// oversized patterns, dead ends) is ordinary control flow and never surfaces
/// as an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An option value is invalid or a combination of options is unsupported.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The task uses a feature the projections cannot represent.
    #[error("unsupported task feature: {0}")]
    UnsupportedTask(String),
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_cost {
    use crate::Cost;

    #[test]
    fn addition_of_finite_costs_is_plain_addition() {
        assert_eq!(Cost::new(5), Cost::new(2).saturating_add(Cost::new(3)));
    }
    #[test]
    fn infinity_absorbs_any_addition() {
        assert_eq!(Cost::INFINITY, Cost::INFINITY.saturating_add(Cost::new(3)));
        assert_eq!(Cost::INFINITY, Cost::new(3).saturating_add(Cost::INFINITY));
    }
    #[test]
    fn subtraction_clips_at_zero() {
        assert_eq!(Cost::ZERO, Cost::new(2).saturating_sub(Cost::new(3)));
        assert_eq!(Cost::new(1), Cost::new(3).saturating_sub(Cost::new(2)));
    }
    #[test]
    fn an_infinite_budget_cannot_be_exhausted() {
        assert_eq!(Cost::INFINITY, Cost::INFINITY.saturating_sub(Cost::INFINITY));
        assert_eq!(Cost::INFINITY, Cost::INFINITY.saturating_sub(Cost::new(7)));
    }
    #[test]
    fn subtracting_infinity_from_a_finite_cost_yields_zero() {
        assert_eq!(Cost::ZERO, Cost::new(7).saturating_sub(Cost::INFINITY));
    }
    #[test]
    fn saturation_keeps_the_goal_distance_drop() {
        assert_eq!(
            Cost::new(2),
            Cost::saturation_needed(Cost::new(5), Cost::new(3))
        );
        assert_eq!(
            Cost::ZERO,
            Cost::saturation_needed(Cost::new(3), Cost::new(5))
        );
    }
    #[test]
    fn saturation_into_a_dead_end_is_bounded_by_the_finite_source() {
        assert_eq!(
            Cost::new(5),
            Cost::saturation_needed(Cost::new(5), Cost::INFINITY)
        );
    }
    #[test]
    fn saturation_out_of_a_dead_end_needs_everything() {
        assert_eq!(
            Cost::INFINITY,
            Cost::saturation_needed(Cost::INFINITY, Cost::new(5))
        );
        assert_eq!(
            Cost::ZERO,
            Cost::saturation_needed(Cost::INFINITY, Cost::INFINITY)
        );
    }
}
