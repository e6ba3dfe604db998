/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines progress reporting messages and sinks bracketing the coefficient pipeline stages.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Progress reporting primitives for the coefficient pipeline.
//!
//! Instrumentation is an observability concern, not an algorithmic one: a
//! sink sees a start and a finish event around each stage and nothing else.
//! Passing no sink costs nothing.

use std::fmt::Debug;
use std::sync::{mpsc, Arc};
use std::thread;

/// The pipeline stages, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoefficientStage {
    /// Recentering each neighbor relative to its target.
    Translation,

    /// Per-target support radius reduction.
    Radii,

    /// Kernel weight evaluation at normalized distances.
    Weights,

    /// Polynomial basis table assembly.
    Vandermonde,

    /// Weighted normal-equations (moment) matrix assembly.
    Moment,

    /// In-place symmetric pseudo-inversion of the moment matrices.
    PseudoInverse,

    /// Final coefficient extraction.
    Coefficients,
}

impl CoefficientStage {
    pub fn name(&self) -> &'static str {
        match self {
            CoefficientStage::Translation => "translation",
            CoefficientStage::Radii => "radii",
            CoefficientStage::Weights => "weights",
            CoefficientStage::Vandermonde => "vandermonde",
            CoefficientStage::Moment => "moment",
            CoefficientStage::PseudoInverse => "pseudo_inverse",
            CoefficientStage::Coefficients => "coefficients",
        }
    }
}

/// Progress events emitted during coefficient computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressMsg {
    /// A pipeline stage began executing.
    StageStarted { stage: CoefficientStage },

    /// A pipeline stage finished executing.
    StageFinished { stage: CoefficientStage },

    /// Arbitrary informational message.
    Message { message: String },
}

/// Sink that consumes progress messages.
pub trait ProgressSink: Send + Sync + Debug {
    fn emit(&self, msg: ProgressMsg);
}

/// Progress sink that forwards messages over a channel.
#[derive(Debug)]
pub struct ClosureSink {
    tx: mpsc::SyncSender<ProgressMsg>,
}

impl ProgressSink for ClosureSink {
    #[inline]
    fn emit(&self, msg: ProgressMsg) {
        let _ = self.tx.try_send(msg);
    }
}

/// Spawns a listener thread that runs a handler closure for each progress
/// message. The thread exits once every clone of the sink has been dropped.
pub fn closure_sink<F>(
    buffer: usize,
    mut handler: F,
) -> (Arc<dyn ProgressSink>, thread::JoinHandle<()>)
where
    F: FnMut(ProgressMsg) + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel::<ProgressMsg>(buffer.max(1));
    let sink: Arc<dyn ProgressSink> = Arc::new(ClosureSink { tx });

    let handle = thread::spawn(move || {
        while let Ok(msg) = rx.recv() {
            handler(msg);
        }
    });

    (sink, handle)
}

/// Runs `op` bracketed by start/finish events when a sink is present.
pub(crate) fn bracketed<R>(
    sink: &Option<Arc<dyn ProgressSink>>,
    stage: CoefficientStage,
    op: impl FnOnce() -> R,
) -> R {
    if let Some(sink) = sink {
        sink.emit(ProgressMsg::StageStarted { stage });
    }
    let out = op();
    if let Some(sink) = sink {
        sink.emit(ProgressMsg::StageFinished { stage });
    }
    out
}
