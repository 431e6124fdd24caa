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

//! This module defines the capability set every abstraction must provide to
//! participate in a saturated cost partitioning: mapping concrete states to
//! abstract state ids, computing goal distances under an arbitrary cost
//! function, and computing the minimal costs that preserve those distances.

use crate::{Cost, State};

/// This trait defines the "contract" of what defines an abstraction usable by
/// the cost partitioning machinery. Projections onto patterns are the one
/// implementation shipped with this crate, but any homomorphic abstraction
/// (e.g. a Cartesian abstraction) offering these five capabilities can be
/// combined with them freely. This is the only dynamic dispatch on the hot
/// evaluation path.
pub trait Abstraction {
    /// Maps a concrete state to the id of the abstract state it belongs to.
    fn abstract_state_id(&self, state: &State) -> usize;

    /// Computes, for every abstract state, the cost of a cheapest path to an
    /// abstract goal state under the given operator cost function. States
    /// from which no goal can be reached get `Cost::INFINITY`.
    ///
    /// The returned vector is monotone in `costs`: raising any operator cost
    /// never lowers any distance.
    fn compute_goal_distances(&self, costs: &[Cost]) -> Vec<Cost>;

    /// Computes the minimal per-operator costs that preserve all the given
    /// goal distances: the maximum over the operator's transitions of the
    /// distance drop along the transition, clipped at zero. Operators that
    /// induce no state-changing transition keep a saturated cost of zero.
    fn compute_saturated_costs(&self, h_values: &[Cost]) -> Vec<Cost>;

    /// The number of abstract states. Abstract state ids range over
    /// `0..num_states()`.
    fn num_states(&self) -> usize;

    /// The ids of the abstract goal states.
    fn goal_states(&self) -> &[usize];

    /// Returns true iff the operator induces at least one state-changing
    /// transition in this abstraction.
    fn operator_is_active(&self, op_id: usize) -> bool;

    /// Returns true iff the operator induces at least one self loop. Note
    /// that an operator may induce both state-changing transitions and self
    /// loops.
    fn operator_induces_self_loop(&self, op_id: usize) -> bool;

    /// Consumes the abstraction and keeps only the lightweight state mapping
    /// function. This is how the portfolio sheds the transition systems of
    /// the abstractions it still references once no new cost partitioning
    /// will ever be computed.
    fn extract_abstraction_function(self: Box<Self>) -> Box<dyn AbstractionFunction>;
}

/// What remains of an abstraction after its transition system has been
/// discarded: just enough to map a concrete state to an abstract state id so
/// that the stored lookup tables stay usable.
pub trait AbstractionFunction {
    fn abstract_state_id(&self, state: &State) -> usize;
}

/// The set of abstractions the heuristic owns while it is still allowed to
/// compute new cost partitionings.
pub type Abstractions = Vec<Box<dyn Abstraction>>;
/// The state mapping functions retained after the improvement phase; `None`
/// for abstractions no stored heuristic references anymore.
pub type AbstractionFunctions = Vec<Option<Box<dyn AbstractionFunction>>>;

/// Maps a concrete state to one abstract state id per abstraction.
pub fn abstract_state_ids(abstractions: &[Box<dyn Abstraction>], state: &State) -> Vec<usize> {
    abstractions
        .iter()
        .map(|abstraction| abstraction.abstract_state_id(state))
        .collect()
}

/// Same as [`abstract_state_ids`] but over retained abstraction functions.
/// Discarded abstractions yield a sentinel id which no stored lookup table
/// references.
pub fn abstract_state_ids_from_functions(
    functions: &[Option<Box<dyn AbstractionFunction>>],
    state: &State,
) -> Vec<usize> {
    functions
        .iter()
        .map(|function| {
            function
                .as_ref()
                .map_or(usize::MAX, |f| f.abstract_state_id(state))
        })
        .collect()
}
