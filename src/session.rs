//! Execution session over the frozen segmentation graph.

use std::path::Path;

use tract_tensorflow::model::TfModelAndExtensions;
use tract_tensorflow::prelude::*;
use tract_tensorflow::tfpb::tensorflow::GraphDef;

use crate::error::InferError;
use crate::graph::{
    read_frozen_graph, BATCH_SIZE, DROPOUT, IMAGE_CHANNELS, IMAGE_COLS, IMAGE_ROWS, INPUT_IMAGES,
    OUTPUT_MASK, QUEUE_SELECT,
};

// Auxiliary feed values for single-image inference: first queue, one image,
// dropout disabled.
const QUEUE_SELECT_FEED: i32 = 0;
const BATCH_SIZE_FEED: i32 = 1;
const DROPOUT_FEED: f32 = 1.0;

/// Node ids for the five tensors of the inference contract, resolved and
/// validated in one step before anything else touches the graph.
#[derive(Debug, Clone)]
pub struct TensorBindings {
    pub input_images: usize,
    pub mask: usize,
    pub queue_select: usize,
    pub batch_size: usize,
    pub dropout: usize,
}

impl TensorBindings {
    /// Resolve all five names, failing on the first one the graph lacks.
    pub fn resolve(model: &InferenceModel) -> Result<TensorBindings, InferError> {
        fn id(model: &InferenceModel, name: &'static str) -> Result<usize, InferError> {
            model.node_id_by_name(name).map_err(|_| InferError::Bind { name })
        }
        Ok(TensorBindings {
            input_images: id(model, INPUT_IMAGES)?,
            mask: id(model, OUTPUT_MASK)?,
            queue_select: id(model, QUEUE_SELECT)?,
            batch_size: id(model, BATCH_SIZE)?,
            dropout: id(model, DROPOUT)?,
        })
    }
}

/// An open execution session: the optimized plan for the remapped graph plus
/// the resolved tensor bindings.
///
/// The graph was authored with an input queue for batch training. Feeding a
/// single image directly means declaring the queue output as a model input,
/// which cuts the queueing machinery out of the execution order entirely.
///
/// The session owns the allocated plan buffers. They are released when the
/// session is dropped; [`MaskSession::close`] makes the release explicit and
/// consumes the handle, so a closed session cannot be used again.
pub struct MaskSession {
    plan: TypedSimplePlan<TypedModel>,
    bindings: TensorBindings,
}

impl MaskSession {
    /// Load a frozen model from `path` and open a session on it.
    pub fn open(path: impl AsRef<Path>) -> Result<MaskSession, InferError> {
        let graph = read_frozen_graph(path)?;
        MaskSession::from_graph_def(&graph)
    }

    /// Open a session on an already-deserialized `GraphDef`.
    pub fn from_graph_def(graph_def: &GraphDef) -> Result<MaskSession, InferError> {
        let tf = tensorflow();
        let TfModelAndExtensions(mut model, _) =
            tf.parse_graph(graph_def).map_err(InferError::Load)?;
        let bindings = TensorBindings::resolve(&model)?;
        debug!("bound inference tensors: {bindings:?}");

        model
            .set_input_names([INPUT_IMAGES, QUEUE_SELECT, BATCH_SIZE, DROPOUT])
            .map_err(InferError::Load)?;
        model
            .set_input_fact(
                0,
                f32::fact([1, IMAGE_ROWS, IMAGE_COLS, IMAGE_CHANNELS]).into(),
            )
            .map_err(InferError::Load)?;
        model
            .set_input_fact(1, InferenceFact::dt_shape(i32::datum_type(), tvec!(0usize; 0)))
            .map_err(InferError::Load)?;
        model
            .set_input_fact(2, InferenceFact::dt_shape(i32::datum_type(), tvec!(0usize; 0)))
            .map_err(InferError::Load)?;
        model
            .set_input_fact(3, InferenceFact::dt_shape(f32::datum_type(), tvec!(0usize; 0)))
            .map_err(InferError::Load)?;
        model.set_output_names([OUTPUT_MASK]).map_err(InferError::Load)?;

        let plan =
            model.into_optimized().and_then(|m| m.into_runnable()).map_err(InferError::Load)?;
        Ok(MaskSession { plan, bindings })
    }

    /// Tensor bindings resolved at initialization.
    pub fn bindings(&self) -> &TensorBindings {
        &self.bindings
    }

    /// Run the network once on a single 1918x1280x3 image with values in
    /// [0.0, 1.0] and return the raw 1918x1280 mask.
    ///
    /// The mask holds unthresholded floats; round to {0, 1} before using it
    /// as a binary segmentation. Calls are synchronous and deterministic:
    /// dropout is pinned to 1.0 and the batch size to 1, so running the same
    /// image twice yields the same mask.
    pub fn infer(&self, image: tract_ndarray::Array3<f32>) -> Result<tract_ndarray::Array2<f32>, InferError> {
        let expected = [IMAGE_ROWS, IMAGE_COLS, IMAGE_CHANNELS];
        if image.shape() != expected {
            return Err(InferError::Shape {
                expected: expected.to_vec(),
                found: image.shape().to_vec(),
            });
        }
        let batched = image.insert_axis(tract_ndarray::Axis(0));
        let outputs = self
            .plan
            .run(tvec!(
                Tensor::from(batched).into(),
                tensor0(QUEUE_SELECT_FEED).into(),
                tensor0(BATCH_SIZE_FEED).into(),
                tensor0(DROPOUT_FEED).into(),
            ))
            .map_err(InferError::Run)?;

        let raw = outputs[0].to_array_view::<f32>().map_err(InferError::Run)?;
        if raw.len() != IMAGE_ROWS * IMAGE_COLS {
            return Err(InferError::Shape {
                expected: vec![IMAGE_ROWS, IMAGE_COLS],
                found: raw.shape().to_vec(),
            });
        }
        let mask = raw
            .to_owned()
            .into_shape_with_order((IMAGE_ROWS, IMAGE_COLS))
            .map_err(|_| InferError::Shape {
                expected: vec![IMAGE_ROWS, IMAGE_COLS],
                found: outputs[0].shape().to_vec(),
            })?;
        Ok(mask)
    }

    /// Release the session and every resource the plan holds. Dropping the
    /// session does the same on early-exit paths; this form just makes the
    /// release point explicit, and the move guarantees the handle cannot be
    /// touched afterwards.
    pub fn close(self) {}
}
