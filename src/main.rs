//! Command-line height estimation.
//!
//! Usage:
//!   stature <reference> <subject> --reference-height 200
//!   stature <reference> <subject> -r 200 --json
//!   stature <reference> <subject> -r 200 --annotate-dir out/

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;
use log::error;
use opencv::{core::Vector, imgcodecs::imwrite};
use serde::Serialize;
use stature::{utils::annotate, ExtentPair, HeightEstimate, MeasurementSession, PreprocessConfig};

#[derive(Parser, Debug)]
#[command(name = "stature")]
#[command(version, about = "Estimate a person's height against a reference object", long_about = None)]
struct Args {
    /// Photograph of the reference object
    reference: PathBuf,

    /// Photograph of the person to measure
    subject: PathBuf,

    /// Known height of the reference object (cm or any other unit)
    #[arg(short, long)]
    reference_height: f64,

    /// Write annotated copies of both images into this directory
    #[arg(long)]
    annotate_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Output {
    height: f64,
    pixels_per_unit: f64,
    reference: ExtentOutput,
    subject: ExtentOutput,
}

#[derive(Serialize)]
struct ExtentOutput {
    top: [i32; 2],
    bottom: [i32; 2],
    pixel_height: i32,
}

impl From<&ExtentPair> for ExtentOutput {
    fn from(extents: &ExtentPair) -> Self {
        Self {
            top: [extents.top.x, extents.top.y],
            bottom: [extents.bottom.x, extents.bottom.y],
            pixel_height: extents.pixel_height(),
        }
    }
}

impl From<&HeightEstimate> for Output {
    fn from(result: &HeightEstimate) -> Self {
        Self {
            height: result.height,
            pixels_per_unit: result.pixels_per_unit.pixels_per_unit(),
            reference: (&result.reference).into(),
            subject: (&result.subject).into(),
        }
    }
}

fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = MeasurementSession::new(PreprocessConfig::from_env()?);
    session.load_reference(&args.reference)?;
    session.load_subject(&args.subject)?;
    session.set_reference_height(args.reference_height);

    let result = session.measure()?;

    if let Some(dir) = &args.annotate_dir {
        fs::create_dir_all(dir)?;
        if let Some(image) = session.reference_image() {
            write_annotated(image, &result.reference, &dir.join("reference_marked.png"))?;
        }
        if let Some(image) = session.subject_image() {
            write_annotated(image, &result.subject, &dir.join("subject_marked.png"))?;
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&Output::from(&result))?);
    } else {
        println!("Estimated height: {result}");
    }
    Ok(())
}

fn write_annotated(
    image: &opencv::core::Mat,
    extents: &ExtentPair,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let marked = annotate(image, extents)?;
    if !imwrite(&path.to_string_lossy(), &marked, &Vector::default())? {
        return Err(format!("failed to write {}", path.display()).into());
    }
    log::info!("wrote {}", path.display());
    Ok(())
}
