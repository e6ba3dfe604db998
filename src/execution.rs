/////////////////////////////////////////////////////////////////////////////////////////////
//
// Selects the execution resource that the bulk-parallel pipeline stages run on.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Execution resource selection for the coefficient pipeline.
//!
//! Every stage is bulk data-parallel over independent targets, so the whole
//! call runs inside a single rayon scope chosen here. All inputs live in host
//! memory and are accessible from every variant; structural preconditions are
//! checked once before anything is dispatched.

use std::fmt;
use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};

/// Where the data-parallel stages execute.
#[derive(Clone, Default)]
pub enum ExecutionContext {
    /// Rayon's global thread pool.
    #[default]
    GlobalPool,

    /// A caller-owned rayon pool, e.g. one pinned to a subset of cores.
    Pool(Arc<ThreadPool>),

    /// A dedicated single-thread pool. Stage code is identical to the
    /// parallel variants; only the worker count changes.
    Sequential,
}

impl ExecutionContext {
    /// Runs `op` on the selected resource. Rayon operations inside `op` are
    /// serviced by that resource's workers.
    pub(crate) fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match self {
            ExecutionContext::GlobalPool => op(),
            ExecutionContext::Pool(pool) => pool.install(op),
            ExecutionContext::Sequential => ThreadPoolBuilder::new()
                .num_threads(1)
                .build()
                .expect("failed to build single-threaded rayon pool")
                .install(op),
        }
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionContext::GlobalPool => f.write_str("ExecutionContext::GlobalPool"),
            ExecutionContext::Pool(pool) => f
                .debug_struct("ExecutionContext::Pool")
                .field("num_threads", &pool.current_num_threads())
                .finish(),
            ExecutionContext::Sequential => f.write_str("ExecutionContext::Sequential"),
        }
    }
}
