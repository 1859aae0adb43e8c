use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use structopt::StructOpt;
use tract_tensorflow::prelude::tract_ndarray::Array3;

use carmask::{MaskSession, IMAGE_CHANNELS, IMAGE_COLS, IMAGE_ROWS};

fn main() {
    // Collecting user arguments
    let cli_args = CliArgs::from_args();

    // Setting up log level
    let level = match cli_args.verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    std::env::set_var("RUST_LOG", level);
    env_logger::Builder::from_env(env_logger::Env::default()).init();

    if let Err(e) = cli_args.run() {
        log::error!("{e:?}");
        std::process::exit(1)
    }
}

/// Benchmark single-image mask inference over a frozen car segmentation
/// graph.
#[derive(Debug, StructOpt)]
#[structopt(name = "carmask", about = "Frozen graph mask inference benchmark")]
pub struct CliArgs {
    #[structopt(short = "v", parse(from_occurrences))]
    pub verbosity: usize,
    /// Path to the frozen model file
    #[structopt(long = "model")]
    pub model: PathBuf,
    /// Directory holding 1918x1280 RGB images to feed through the network
    #[structopt(long = "images")]
    pub images: PathBuf,
    /// How many inference rounds to time
    #[structopt(long = "rounds", default_value = "20")]
    pub rounds: usize,
}

impl CliArgs {
    pub fn run(&self) -> Result<()> {
        // The graph is loaded once, outside the timed loop.
        let session = MaskSession::open(&self.model)?;
        log::debug!("{:?}", session.bindings());

        let images = list_images(&self.images)?;
        if images.is_empty() {
            bail!("no images found in {:?}", self.images)
        }

        let start = Instant::now();
        for round in 0..self.rounds {
            let path = &images[round % images.len()];
            let image = load_image(path).with_context(|| format!("reading {path:?}"))?;
            let mask = session.infer(image)?;
            // raw float mask, round to {0, 1} before writing out a submission
            println!("{:?} -> mask {:?}", path.file_name().unwrap_or_default(), mask.dim());
        }
        session.close();

        println!("inference time: {:.2}s for {} rounds", start.elapsed().as_secs_f64(), self.rounds);
        Ok(())
    }
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("listing {dir:?}"))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("jpg") | Some("jpeg") | Some("png")
            )
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Read an image, coerce it to the fixed 1918x1280 geometry and normalize
/// the channels to [0.0, 1.0].
fn load_image(p: &Path) -> Result<Array3<f32>> {
    let image = image::open(p)?.to_rgb8();
    let resized =
        image::imageops::resize(&image, IMAGE_COLS as u32, IMAGE_ROWS as u32, image::imageops::FilterType::Triangle);
    Ok(Array3::from_shape_fn((IMAGE_ROWS, IMAGE_COLS, IMAGE_CHANNELS), |(y, x, c)| {
        resized[(x as u32, y as u32)][c] as f32 / 255.0
    }))
}
