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

//! # SATCP
//! SATCP computes admissible lower bounds for cost-optimal search over
//! factored transition tasks. It builds a collection of *projection
//! abstractions* (pattern databases) and combines them under *saturated
//! cost partitioning*: the abstractions are visited in some order, each one
//! records the goal distances it can achieve under the costs it is handed,
//! keeps only the minimal per-operator costs preserving those distances,
//! and passes the residue on. The sum of the recorded distance tables is
//! then a single admissible, consistent heuristic. Because different orders
//! favor different states, a *portfolio* of such sums, maximized over,
//! beats any single one.
//!
//! The crate covers the whole pipeline:
//! * describing a task ([`Task`], [`Operator`], [`State`]) and indexing it
//!   ([`TaskInfo`]);
//! * projecting it onto variable patterns ([`Projection`]) with
//!   perfect-hash state ranking and match-tree operator lookup;
//! * enumerating, ordering and filtering candidate patterns
//!   ([`FilteredSystematicGenerator`], [`PatternEvaluator`]);
//! * computing cost partitionings over any [`Abstraction`] set
//!   ([`compute_saturated_cost_partitioning`]) under configurable orders
//!   ([`GreedyOrderGenerator`], [`RandomOrderGenerator`]);
//! * answering per-state queries, either from a frozen portfolio
//!   ([`MaxCostPartitioningHeuristic`]) or while still growing it online
//!   ([`SaturatedCostPartitioningOnlineHeuristic`]).
//!
//! ## Quick Example
//! The following builds the two single-variable projections of a toy task
//! by hand and partitions the costs across them once.
//!
//! ```
//! use satcp::*;
//!
//! // Two binary variables that must both be set to 1; one unit-cost
//! // setter each.
//! let setter = |name: &str, var: usize| Operator {
//!     name: name.to_string(),
//!     preconditions: vec![],
//!     effects: vec![Effect::new(var, 1)],
//!     cost: Cost::new(1),
//! };
//! let task = Task::new(
//!     vec![2, 2],
//!     vec![setter("set_a", 0), setter("set_b", 1)],
//!     vec![],
//!     vec![FactPair::new(0, 1), FactPair::new(1, 1)],
//!     State::new(vec![0, 0]),
//! ).unwrap();
//!
//! // One projection per goal variable.
//! let abstractions: Vec<Box<dyn Abstraction>> = vec![
//!     Box::new(Projection::new(&task, vec![Variable(0)]).unwrap()),
//!     Box::new(Projection::new(&task, vec![Variable(1)]).unwrap()),
//! ];
//!
//! // Partition the task costs over the two projections.
//! let mut remaining = task.operator_costs();
//! let cp = compute_saturated_cost_partitioning(
//!     &abstractions, &vec![0, 1], &mut remaining);
//!
//! // Both setters are needed from (0, 0): the bound is exact here.
//! let ids = abstract_state_ids(&abstractions, &State::new(vec![0, 0]));
//! assert_eq!(Cost::new(2), cp.compute_heuristic(&ids));
//! ```
//!
//! In a real setup you would not pick the patterns yourself: let
//! [`FilteredSystematicGenerator`] enumerate and filter them, and wrap the
//! resulting projections into a [`SaturatedCostPartitioningOnlineHeuristic`]
//! that keeps improving its portfolio while the search is already running.

mod common;
mod abstraction;
mod implementation;

pub use common::*;
pub use abstraction::*;
pub use implementation::*;
