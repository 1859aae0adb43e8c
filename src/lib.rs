//! # carmask
//!
//! Single-image mask inference over a frozen TensorFlow car segmentation
//! graph, for benchmarking.
//!
//! The frozen graph was trained behind an input queue. At inference time the
//! queue is overkill: opening a [`MaskSession`] remaps the queue output to a
//! directly-fed image input of fixed shape 1918x1280x3, resolves the rest of
//! the tensor naming contract eagerly, and compiles one optimized execution
//! plan. Inference is synchronous, one image per call.
//!
//! ## Example
//!
//! ```no_run
//! use carmask::{MaskSession, IMAGE_CHANNELS, IMAGE_ROWS, IMAGE_COLS};
//! use tract_tensorflow::prelude::tract_ndarray::Array3;
//!
//! # fn main() -> Result<(), carmask::InferError> {
//! let session = MaskSession::open("frozen.model")?;
//! // values normalized to [0.0, 1.0]
//! let image = Array3::<f32>::zeros((IMAGE_ROWS, IMAGE_COLS, IMAGE_CHANNELS));
//! let mask = session.infer(image)?;
//! assert_eq!(mask.dim(), (IMAGE_ROWS, IMAGE_COLS));
//! // mask holds raw floats, round to {0, 1} for a binary segmentation
//! session.close();
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate log;
pub extern crate tract_tensorflow;

pub mod error;
pub mod graph;
pub mod session;

pub use error::InferError;
pub use graph::{
    read_frozen_graph, read_frozen_graph_from, BATCH_SIZE, DROPOUT, IMAGE_CHANNELS, IMAGE_ROWS,
    IMAGE_COLS, INPUT_IMAGES, OUTPUT_MASK, QUEUE_SELECT,
};
pub use session::{MaskSession, TensorBindings};
