//! Frozen graph loading and the tensor naming contract.
//!
//! The network was authored for batch training behind an input queue; the
//! five names below are the only parts of the graph this crate touches. They
//! must match the frozen file exactly or session setup aborts.

use std::io::Read;
use std::path::Path;

use tract_tensorflow::prelude::*;
use tract_tensorflow::tfpb::tensorflow::GraphDef;

use crate::error::InferError;

/// Queue output carrying training batches, remapped to a direct image feed.
pub const INPUT_IMAGES: &str = "cv_MASTER_QUEUE/input_ims";
/// Raw (unthresholded) per-pixel mask produced by the network.
pub const OUTPUT_MASK: &str = "cv_CV_LAYERS/outputs";
/// Training-time queue selector, pinned to 0 when inferring.
pub const QUEUE_SELECT: &str = "cv_MASTER_QUEUE/select_queue";
/// Batch size placeholder, pinned to 1 when inferring.
pub const BATCH_SIZE: &str = "batch_size";
/// Dropout keep-rate placeholder, pinned to 1.0 (no dropout) when inferring.
pub const DROPOUT: &str = "dropout";

/// Fixed image geometry the graph was frozen with.
pub const IMAGE_ROWS: usize = 1918;
pub const IMAGE_COLS: usize = 1280;
pub const IMAGE_CHANNELS: usize = 3;

/// Read a serialized `GraphDef` from a file.
pub fn read_frozen_graph(path: impl AsRef<Path>) -> Result<GraphDef, InferError> {
    let path = path.as_ref();
    let mut file = std::fs::File::open(path)
        .map_err(|e| InferError::Load(anyhow::Error::new(e).context(format!("opening {path:?}"))))?;
    let graph = read_frozen_graph_from(&mut file)?;
    info!("frozen model loaded successfully from {path:?}");
    Ok(graph)
}

/// Read a serialized `GraphDef` from any reader.
pub fn read_frozen_graph_from(r: &mut dyn Read) -> Result<GraphDef, InferError> {
    tensorflow().read_frozen_model(r).map_err(InferError::Load)
}
