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

//! This module (and its submodules) provides the concrete implementation of
//! every building block of the heuristic: the task model and its indices,
//! the projections, the cost partitioning machinery, the order generators,
//! the pattern generation pipeline and the online evaluation driver.

mod cost_partitioning;
mod online;
mod order;
mod patterns;
pub(crate) mod priority_queue;
mod projection;
mod task;
mod task_info;
pub(crate) mod utils;

pub use cost_partitioning::*;
pub use online::*;
pub use order::*;
pub use patterns::*;
pub use priority_queue::AdaptiveQueue;
pub use projection::*;
pub use task::*;
pub use task_info::*;
