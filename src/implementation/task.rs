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

//! This module provides the in-memory representation of a factored planning
//! task: finite-domain variables, operators with preconditions and effects,
//! a goal and an initial state. Loading and parsing an actual task file is
//! the business of the client; this crate only consumes the validated model.

use crate::{Cost, Error, FactPair, State, Variable};

/// One effect of an operator. The `conditions` field exists so that clients
/// translating from richer formalisms can hand us their model unchanged; the
/// projections cannot represent conditional effects, so task validation
/// rejects any effect whose condition list is non empty.
#[derive(Debug, Clone)]
pub struct Effect {
    pub conditions: Vec<FactPair>,
    pub fact: FactPair,
}
impl Effect {
    /// An unconditional effect setting `variable := value`.
    pub fn new(variable: usize, value: usize) -> Self {
        Effect { conditions: vec![], fact: FactPair::new(variable, value) }
    }
}

/// A ground operator of the task.
#[derive(Debug, Clone)]
pub struct Operator {
    /// Display name, only ever used in log messages.
    pub name: String,
    /// Preconditions, at most one per variable.
    pub preconditions: Vec<FactPair>,
    /// Unconditional effects, at most one per variable.
    pub effects: Vec<Effect>,
    /// The cost of applying this operator; may be infinite.
    pub cost: Cost,
}

/// A factored state transition task over finite-domain variables. The
/// structure is validated once at construction; all downstream components
/// may assume facts are in range, effects are unconditional and there are no
/// axioms.
#[derive(Debug)]
pub struct Task {
    domains: Vec<usize>,
    operators: Vec<Operator>,
    goals: Vec<FactPair>,
    initial_state: State,
}

impl Task {
    /// Validates and builds a task. `axioms` must be empty: the projection
    /// abstractions of this crate cannot represent derived variables, and
    /// neither can they represent conditional effects. Both are rejected
    /// with [`Error::UnsupportedTask`]; facts out of range or a malformed
    /// initial state are rejected with [`Error::Config`].
    pub fn new(
        domains: Vec<usize>,
        operators: Vec<Operator>,
        axioms: Vec<Operator>,
        goals: Vec<FactPair>,
        initial_state: State,
    ) -> Result<Self, Error> {
        if !axioms.is_empty() {
            return Err(Error::UnsupportedTask("task has axioms".to_string()));
        }
        if domains.iter().any(|&d| d == 0) {
            return Err(Error::Config("variable with empty domain".to_string()));
        }
        if initial_state.num_variables() != domains.len() {
            return Err(Error::Config(format!(
                "initial state assigns {} variables, task has {}",
                initial_state.num_variables(),
                domains.len()
            )));
        }
        let check_fact = |fact: &FactPair, what: &str| -> Result<(), Error> {
            let var = fact.variable.id();
            if var >= domains.len() || fact.value >= domains[var] {
                Err(Error::Config(format!(
                    "{} refers to invalid fact (variable {}, value {})",
                    what, var, fact.value
                )))
            } else {
                Ok(())
            }
        };
        for goal in &goals {
            check_fact(goal, "goal")?;
        }
        for op in &operators {
            let mut seen_pre = vec![false; domains.len()];
            for pre in &op.preconditions {
                check_fact(pre, &format!("operator {}", op.name))?;
                if std::mem::replace(&mut seen_pre[pre.variable.id()], true) {
                    return Err(Error::Config(format!(
                        "operator {} has two preconditions on variable {}",
                        op.name,
                        pre.variable.id()
                    )));
                }
            }
            let mut seen_eff = vec![false; domains.len()];
            for effect in &op.effects {
                if !effect.conditions.is_empty() {
                    return Err(Error::UnsupportedTask(format!(
                        "operator {} has a conditional effect",
                        op.name
                    )));
                }
                check_fact(&effect.fact, &format!("operator {}", op.name))?;
                if std::mem::replace(&mut seen_eff[effect.fact.variable.id()], true) {
                    return Err(Error::Config(format!(
                        "operator {} has two effects on variable {}",
                        op.name,
                        effect.fact.variable.id()
                    )));
                }
            }
        }
        for var in 0..domains.len() {
            if initial_state.value(Variable(var)) >= domains[var] {
                return Err(Error::Config(format!(
                    "initial state value of variable {} is out of range",
                    var
                )));
            }
        }
        Ok(Task { domains, operators, goals, initial_state })
    }

    pub fn num_variables(&self) -> usize {
        self.domains.len()
    }
    pub fn domain_size(&self, variable: Variable) -> usize {
        self.domains[variable.id()]
    }
    pub fn variable_domains(&self) -> &[usize] {
        &self.domains
    }
    pub fn num_operators(&self) -> usize {
        self.operators.len()
    }
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }
    pub fn goals(&self) -> &[FactPair] {
        &self.goals
    }
    pub fn initial_state(&self) -> &State {
        &self.initial_state
    }
    /// The task's own operator cost vector. Every cost partitioning call
    /// takes costs as an explicit parameter, so that cost transformations
    /// can be applied upstream; this is merely the usual starting point.
    pub fn operator_costs(&self) -> Vec<Cost> {
        self.operators.iter().map(|op| op.cost).collect()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
