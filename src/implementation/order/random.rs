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

//! A baseline order generator that shuffles the abstractions uniformly at
//! random, independently of the evaluated state.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::{Abstraction, Cost, Order, OrderGenerator};

pub struct RandomOrderGenerator {
    rng: StdRng,
}

impl RandomOrderGenerator {
    pub fn new(seed: u64) -> Self {
        RandomOrderGenerator { rng: StdRng::seed_from_u64(seed) }
    }
}

impl OrderGenerator for RandomOrderGenerator {
    fn initialize(&mut self, _abstractions: &[Box<dyn Abstraction>], _costs: &[Cost]) {}

    fn order_for_state(
        &mut self,
        abstractions: &[Box<dyn Abstraction>],
        _costs: &[Cost],
        _abstract_state_ids: &[usize],
    ) -> Order {
        let mut order: Order = (0..abstractions.len()).collect();
        order.shuffle(&mut self.rng);
        order
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_random_order {
    use crate::*;

    #[test]
    fn the_same_seed_reproduces_the_same_orders() {
        let task = Task::new(
            vec![2, 2, 2],
            vec![],
            vec![],
            vec![FactPair::new(0, 1)],
            State::new(vec![0, 0, 0]),
        )
        .unwrap();
        let abstractions: Vec<Box<dyn Abstraction>> = (0..3)
            .map(|var| {
                Box::new(Projection::new(&task, vec![Variable(var)]).unwrap())
                    as Box<dyn Abstraction>
            })
            .collect();
        let costs = task.operator_costs();
        let ids = vec![0, 0, 0];

        let mut left = RandomOrderGenerator::new(42);
        let mut right = RandomOrderGenerator::new(42);
        for _ in 0..5 {
            assert_eq!(
                left.order_for_state(&abstractions, &costs, &ids),
                right.order_for_state(&abstractions, &costs, &ids)
            );
        }
    }

    #[test]
    fn every_generated_order_is_a_permutation() {
        let task = Task::new(
            vec![2, 2, 2],
            vec![],
            vec![],
            vec![FactPair::new(0, 1)],
            State::new(vec![0, 0, 0]),
        )
        .unwrap();
        let abstractions: Vec<Box<dyn Abstraction>> = (0..3)
            .map(|var| {
                Box::new(Projection::new(&task, vec![Variable(var)]).unwrap())
                    as Box<dyn Abstraction>
            })
            .collect();
        let mut generator = RandomOrderGenerator::new(7);
        let mut order =
            generator.order_for_state(&abstractions, &task.operator_costs(), &[0, 0, 0]);
        order.sort_unstable();
        assert_eq!(vec![0, 1, 2], order);
    }
}
