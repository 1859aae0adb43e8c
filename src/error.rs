use thiserror::Error;

/// Everything that can go wrong between opening a frozen model file and
/// getting a mask back.
///
/// There is deliberately no retry or recovery surface here: the crate is a
/// one-shot benchmarking tool, and every failure is final for the session
/// being built or used.
#[derive(Debug, Error)]
pub enum InferError {
    /// The model file could not be read, decoded as a frozen `GraphDef`, or
    /// compiled into a runnable plan.
    #[error("failed to load frozen graph: {0:#}")]
    Load(anyhow::Error),
    /// A tensor name required by the inference contract is absent from the
    /// loaded graph.
    #[error("tensor {name:?} not found in frozen graph")]
    Bind { name: &'static str },
    /// The supplied image (or the graph's output) does not match the fixed
    /// geometry of the network.
    #[error("shape mismatch: expected {expected:?}, got {found:?}")]
    Shape { expected: Vec<usize>, found: Vec<usize> },
    /// The runtime failed while executing the plan.
    #[error("graph execution failed: {0:#}")]
    Run(anyhow::Error),
}
