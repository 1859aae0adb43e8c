//! Times one synchronous inference call over a synthetic stand-in for the
//! frozen segmentation graph (full 1918x1280x3 geometry, channel-peak mask).

use criterion::{criterion_main, Criterion};

use tract_tensorflow::prelude::*;
use tract_tensorflow::tfpb;
use tract_tensorflow::tfpb::tensorflow::attr_value::Value;
use tract_tensorflow::tfpb::tensorflow::{AttrValue, DataType, GraphDef, NodeDef, TensorProto};

use carmask::{
    MaskSession, BATCH_SIZE, DROPOUT, IMAGE_CHANNELS, IMAGE_COLS, IMAGE_ROWS, INPUT_IMAGES,
    OUTPUT_MASK, QUEUE_SELECT,
};

fn placeholder(name: &str, dt: DataType) -> NodeDef {
    tfpb::node().name(name).op("Placeholder").attr("dtype", dt)
}

fn mask_graph() -> GraphDef {
    let axes = tensor1(&[0i32, 3]);
    let axes: TensorProto = (&axes).try_into().unwrap();
    tfpb::graph()
        .node(placeholder(INPUT_IMAGES, DataType::DtFloat))
        .node(placeholder(QUEUE_SELECT, DataType::DtInt32))
        .node(placeholder(BATCH_SIZE, DataType::DtInt32))
        .node(placeholder(DROPOUT, DataType::DtFloat))
        .node(
            tfpb::node()
                .name("mask_axes")
                .op("Const")
                .attr("dtype", DataType::DtInt32)
                .attr("value", axes),
        )
        .node(
            tfpb::node()
                .name("channel_peak")
                .op("Max")
                .input(INPUT_IMAGES)
                .input("mask_axes")
                .attr("T", DataType::DtFloat)
                .attr("Tidx", DataType::DtInt32)
                .attr("keep_dims", AttrValue { value: Some(Value::B(false)) }),
        )
        .node(
            tfpb::node()
                .name(OUTPUT_MASK)
                .op("Mul")
                .input("channel_peak")
                .input(DROPOUT)
                .attr("T", DataType::DtFloat),
        )
}

fn infer(bencher: &mut Criterion) {
    let session = MaskSession::from_graph_def(&mask_graph()).unwrap();
    let image = tract_ndarray::Array3::<f32>::from_shape_fn(
        (IMAGE_ROWS, IMAGE_COLS, IMAGE_CHANNELS),
        |(y, x, c)| ((y + x + c) % 256) as f32 / 255.0,
    );
    bencher.bench_function("infer", move |b| b.iter(|| session.infer(image.clone()).unwrap()));
}

pub fn benches() {
    let mut criterion: Criterion = Criterion::default().sample_size(10).configure_from_args();
    infer(&mut criterion);
}
criterion_main!(benches);
