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

//! This module provides the index that maps an abstract state to the set of
//! abstract operators applicable in it: a trie over the (variable, value)
//! prefixes of the operators' precondition lists. Nodes live in an arena and
//! reference each other through integer indices.

/// Sentinel for an absent child in the arena.
const NO_NODE: usize = usize::MAX;

/// One trie node. The node at depth `d` branches on the value of the `d`-th
/// pattern variable: `successors[v]` leads to the subtree of operators that
/// require value `v`, `star` to the subtree of operators that do not care.
/// Operators whose precondition list is exhausted at this node are stored in
/// `operators`.
#[derive(Debug)]
struct Node {
    successors: Vec<usize>,
    star: usize,
    operators: Vec<usize>,
}

impl Node {
    fn new(domain_size: usize) -> Self {
        Node {
            successors: vec![NO_NODE; domain_size],
            star: NO_NODE,
            operators: vec![],
        }
    }
}

/// The trie itself. Precondition lists use *pattern-local* variable indices
/// and must be sorted by variable; queries are made with a perfect-hash
/// state index whose digits are decoded on the fly.
#[derive(Debug)]
pub(crate) struct MatchTree {
    /// Domain size of each pattern variable, in pattern order.
    domains: Vec<usize>,
    /// The perfect-hash multiplier of each pattern variable.
    hash_multipliers: Vec<usize>,
    nodes: Vec<Node>,
}

impl MatchTree {
    pub fn new(domains: Vec<usize>, hash_multipliers: Vec<usize>) -> Self {
        let root = Node::new(domains.first().copied().unwrap_or(0));
        MatchTree { domains, hash_multipliers, nodes: vec![root] }
    }

    fn new_node(&mut self, depth: usize) -> usize {
        let domain_size = self.domains.get(depth).copied().unwrap_or(0);
        self.nodes.push(Node::new(domain_size));
        self.nodes.len() - 1
    }

    /// Registers an abstract operator under its precondition list (sorted
    /// pairs of pattern-local variable index and required value).
    pub fn insert(&mut self, op_id: usize, preconditions: &[(usize, usize)]) {
        let mut node = 0;
        let mut depth = 0;
        for &(var, value) in preconditions {
            // Walk through don't-care levels until the constrained variable.
            while depth < var {
                if self.nodes[node].star == NO_NODE {
                    let child = self.new_node(depth + 1);
                    self.nodes[node].star = child;
                }
                node = self.nodes[node].star;
                depth += 1;
            }
            if self.nodes[node].successors[value] == NO_NODE {
                let child = self.new_node(depth + 1);
                self.nodes[node].successors[value] = child;
            }
            node = self.nodes[node].successors[value];
            depth += 1;
        }
        self.nodes[node].operators.push(op_id);
    }

    /// Appends to `out` the ids of every operator whose preconditions are
    /// satisfied in the abstract state with the given perfect-hash index.
    pub fn applicable_operators(&self, state_index: usize, out: &mut Vec<usize>) {
        self.visit(0, 0, state_index, out);
    }

    fn visit(&self, node: usize, depth: usize, state_index: usize, out: &mut Vec<usize>) {
        let node = &self.nodes[node];
        out.extend_from_slice(&node.operators);
        if depth == self.domains.len() {
            return;
        }
        let value = (state_index / self.hash_multipliers[depth]) % self.domains[depth];
        let matching = node.successors[value];
        if matching != NO_NODE {
            self.visit(matching, depth + 1, state_index, out);
        }
        if node.star != NO_NODE {
            self.visit(node.star, depth + 1, state_index, out);
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_match_tree {
    use super::*;

    /// Two binary pattern variables: multipliers [1, 2], four states.
    fn tree() -> MatchTree {
        MatchTree::new(vec![2, 2], vec![1, 2])
    }

    fn query(tree: &MatchTree, state_index: usize) -> Vec<usize> {
        let mut out = vec![];
        tree.applicable_operators(state_index, &mut out);
        out.sort_unstable();
        out
    }

    #[test]
    fn an_unconstrained_operator_matches_every_state() {
        let mut t = tree();
        t.insert(7, &[]);
        for state in 0..4 {
            assert_eq!(vec![7], query(&t, state));
        }
    }

    #[test]
    fn a_fully_constrained_operator_matches_exactly_one_state() {
        let mut t = tree();
        t.insert(0, &[(0, 1), (1, 0)]);
        // state index 1 encodes (var0 = 1, var1 = 0)
        assert_eq!(vec![0], query(&t, 1));
        assert_eq!(Vec::<usize>::new(), query(&t, 0));
        assert_eq!(Vec::<usize>::new(), query(&t, 3));
    }

    #[test]
    fn a_constraint_on_the_second_variable_goes_through_the_star_branch() {
        let mut t = tree();
        t.insert(4, &[(1, 1)]);
        // states 2 and 3 have var1 = 1
        assert_eq!(Vec::<usize>::new(), query(&t, 0));
        assert_eq!(Vec::<usize>::new(), query(&t, 1));
        assert_eq!(vec![4], query(&t, 2));
        assert_eq!(vec![4], query(&t, 3));
    }

    #[test]
    fn overlapping_operators_are_all_reported() {
        let mut t = tree();
        t.insert(0, &[(0, 0)]);
        t.insert(1, &[(1, 0)]);
        t.insert(2, &[(0, 0), (1, 0)]);
        assert_eq!(vec![0, 1, 2], query(&t, 0));
        assert_eq!(vec![1], query(&t, 1));
        assert_eq!(vec![0], query(&t, 2));
        assert_eq!(Vec::<usize>::new(), query(&t, 3));
    }
}
