//! Refine a path against an image surface from the command line.
//!
//! The image spans the given lon/lat bound; pixels matching the target color
//! become the ridges the path slides onto. With `--sharpen` the initial
//! refinement is followed by rounds against progressively narrower smoothing
//! kernels, which locks the path onto the exact centerline.

use image::Rgba;
use ridgeline::geom::{Bound, Path, Point};
use ridgeline::reduce::Trim;
use ridgeline::surface::ImageSurface;
use ridgeline::{RefineParams, Refiner};
use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let program = env::args()
        .next()
        .unwrap_or_else(|| "refine_demo".to_string());
    let config = parse_args(&program)?;

    let img = image::open(&config.image_path)
        .map_err(|e| format!("Failed to open {}: {e}", config.image_path.display()))?;

    let path_json = fs::read_to_string(&config.path_file)
        .map_err(|e| format!("Failed to read {}: {e}", config.path_file.display()))?;
    let path: Path = serde_json::from_str(&path_json)
        .map_err(|e| format!("Failed to parse {}: {e}", config.path_file.display()))?;

    let mut surface =
        ImageSurface::new(&config.bound, &img, config.target_color, config.smoothing_sd)
            .map_err(|e| format!("Failed to build surface: {e}"))?;

    let mut params = RefineParams::suggested(&surface);
    params.intermediate_geometries = config.intermediate;
    let refiner = Refiner::new(params).with_reducer(Box::new(Trim::default()));

    let mut result = refiner
        .refine(&path, &surface)
        .map_err(|e| format!("Refinement failed: {e}"))?;
    println!(
        "refined to {} vertices in {} loops ({:.1} ms, score {:.3})",
        result.corrected.len(),
        result.loops_completed,
        result.runtime_ms,
        result.last_loop_score
    );

    if config.sharpen {
        let mut sd = config.smoothing_sd - 1.0;
        while sd >= 1.0 {
            surface
                .resmooth(sd)
                .map_err(|e| format!("Resmooth at {sd} m failed: {e}"))?;

            let mut params = RefineParams::suggested(&surface);
            params.depth_based_reduction = true;
            params.threshold_epsilon = 1e-4;
            params.resample_interval = 3.0;
            params.gradient_scale /= 3.0;
            params.momentum_scale = 0.0;
            params.max_loops = params.min_loops;

            let round = Refiner::new(params);
            result = round
                .refine(&result.corrected, &surface)
                .map_err(|e| format!("Sharpening round at {sd} m failed: {e}"))?;
            println!(
                "sharpened at {sd:.0} m: {} loops, score {:.3}",
                result.loops_completed, result.last_loop_score
            );
            sd -= 1.0;
        }
    }

    let json = serde_json::to_string_pretty(&result)
        .map_err(|e| format!("Failed to serialize result: {e}"))?;
    match &config.json_out {
        Some(path) => {
            fs::write(path, json)
                .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
            println!("result written to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

struct CliConfig {
    image_path: PathBuf,
    path_file: PathBuf,
    bound: Bound,
    target_color: Rgba<u8>,
    smoothing_sd: f64,
    intermediate: usize,
    sharpen: bool,
    json_out: Option<PathBuf>,
}

fn parse_args(program: &str) -> Result<CliConfig, String> {
    let mut args = env::args().skip(1);
    let mut image_path: Option<PathBuf> = None;
    let mut path_file: Option<PathBuf> = None;
    let mut bound: Option<Bound> = None;
    let mut target_color = Rgba([255, 255, 0, 255]);
    let mut smoothing_sd = 16.0;
    let mut intermediate = 0usize;
    let mut sharpen = false;
    let mut json_out: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                println!("{}", usage(program));
                std::process::exit(0);
            }
            "--path" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--path expects a file\n{}", usage(program)))?;
                path_file = Some(PathBuf::from(value));
            }
            "--bound" => {
                let value = args.next().ok_or_else(|| {
                    format!("--bound expects minlon,minlat,maxlon,maxlat\n{}", usage(program))
                })?;
                bound = Some(parse_bound(&value)?);
            }
            "--target" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--target expects r,g,b\n{}", usage(program)))?;
                target_color = parse_color(&value)?;
            }
            "--sigma" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--sigma expects meters\n{}", usage(program)))?;
                smoothing_sd = value
                    .parse()
                    .map_err(|_| format!("Invalid sigma '{value}'"))?;
            }
            "--intermediate" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--intermediate expects a count\n{}", usage(program)))?;
                intermediate = value
                    .parse()
                    .map_err(|_| format!("Invalid count '{value}'"))?;
            }
            "--sharpen" => sharpen = true,
            "--json-out" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--json-out expects a path\n{}", usage(program)))?;
                json_out = Some(PathBuf::from(value));
            }
            _ if arg.starts_with('-') => {
                return Err(format!("Unknown option '{arg}'\n{}", usage(program)));
            }
            _ => {
                if image_path.is_some() {
                    return Err(format!(
                        "Unexpected positional argument '{arg}'\n{}",
                        usage(program)
                    ));
                }
                image_path = Some(PathBuf::from(arg));
            }
        }
    }

    Ok(CliConfig {
        image_path: image_path.ok_or_else(|| usage(program))?,
        path_file: path_file.ok_or_else(|| format!("--path is required\n{}", usage(program)))?,
        bound: bound.ok_or_else(|| format!("--bound is required\n{}", usage(program)))?,
        target_color,
        smoothing_sd,
        intermediate,
        sharpen,
        json_out,
    })
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} <image.png> --bound minlon,minlat,maxlon,maxlat --path path.json \\\n         [--target r,g,b] [--sigma meters] [--intermediate n] [--sharpen] [--json-out out.json]\n\n\
Refines the path in path.json (a JSON array of [lon, lat] pairs) against the\n\
image, treating pixels of the target color (default yellow) as ridges.\n\
Examples:\n  {program} tiles.png --bound -93.26,44.97,-93.24,44.99 --path trace.json\n  {program} scan.png --bound 11.56,48.13,11.57,48.14 --path gpx.json --sigma 24 --sharpen\n"
    )
}

fn parse_bound(value: &str) -> Result<Bound, String> {
    let parts = parse_floats(value, 4, "minlon,minlat,maxlon,maxlat")?;
    Ok(Bound::from_points(
        Point::new(parts[0], parts[1]),
        Point::new(parts[2], parts[3]),
    ))
}

fn parse_color(value: &str) -> Result<Rgba<u8>, String> {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("Expected r,g,b but got '{value}'"));
    }
    let mut rgba = [0u8; 4];
    rgba[3] = 255;
    for (slot, part) in rgba.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse()
            .map_err(|_| format!("Invalid channel '{part}'"))?;
    }
    Ok(Rgba(rgba))
}

fn parse_floats(value: &str, expected: usize, shape: &str) -> Result<Vec<f64>, String> {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() != expected {
        return Err(format!("Expected {shape} but got '{value}'"));
    }
    parts
        .iter()
        .map(|p| {
            p.trim()
                .parse()
                .map_err(|_| format!("Invalid number '{p}'"))
        })
        .collect()
}
