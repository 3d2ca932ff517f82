use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use freshem_profile::{
    parse_feature_collection, Coord, ProfileCompiler, ProfileGeometry, ProfileOptions, ProfileOutcome,
    ProfileRequest, Sheet, SvgWriter, NO_DATA_MESSAGE,
};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Vertices of a drawn profile line.
#[derive(Debug, Clone, PartialEq)]
struct Polyline(Vec<Coord>);

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("geometry").required(true).args(["point", "line"])))]
struct Args {
    /// WFS GeoJSON response with the survey points
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (SVG, or JSON with --json)
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Point profile at X,Y (EPSG:28992)
    #[arg(long, value_name = "X,Y", value_parser = parse_point, allow_hyphen_values = true)]
    point: Option<Coord>,

    /// Line profile through X1,Y1,X2,Y2,... (EPSG:28992)
    #[arg(long, value_name = "X1,Y1,...", value_parser = parse_line, allow_hyphen_values = true)]
    line: Option<Polyline>,

    /// Concentration field to draw, repeatable (default: chloride_midden)
    #[arg(short, long = "field", value_name = "NAME")]
    fields: Vec<String>,

    /// Draw the suitability for extraction overlay
    #[arg(long)]
    suitability: bool,

    /// Search distance in metres (default: 35.36 for points, 25 for lines)
    #[arg(long)]
    search_distance: Option<f64>,

    /// Voxel height in metres
    #[arg(long)]
    voxel_height: Option<f64>,

    /// Property holding the voxel depths
    #[arg(long)]
    depth_field: Option<String>,

    /// Write the drawing primitives as JSON instead of SVG
    #[arg(long)]
    json: bool,

    /// SVG output pixels per drawing unit
    #[arg(long, default_value_t = 4.0)]
    scale: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let start_time = std::time::Instant::now();

    let mut options = ProfileOptions::default();
    if let Some(voxel_height) = args.voxel_height {
        options.voxel_height = voxel_height;
    }
    if let Some(depth_field) = &args.depth_field {
        options.depth_field = depth_field.clone();
    }

    info!("Reading survey points: {:?}", args.input);
    let file = File::open(&args.input).with_context(|| format!("Failed to open {:?}", args.input))?;
    let points = parse_feature_collection(BufReader::new(file), &options.depth_field)
        .with_context(|| format!("Failed to parse {:?}", args.input))?;
    info!("Parsed {} survey points", points.len());

    let geometry = match (args.point, args.line.clone()) {
        (Some(point), _) => ProfileGeometry::Point(point),
        (None, Some(Polyline(vertices))) => ProfileGeometry::Line(vertices),
        (None, None) => {
            error!("No profile geometry given");
            anyhow::bail!("Either --point or --line is required");
        }
    };

    let fields = if args.fields.is_empty() {
        options.default_plots.clone()
    } else {
        args.fields.clone()
    };
    let mut request = ProfileRequest::new(geometry)
        .with_fields(fields)
        .with_suitability(args.suitability);
    if let Some(distance) = args.search_distance {
        request = request.with_search_distance(distance);
    }

    let compiler = ProfileCompiler::new(options);
    match compiler.compile_sheet(points, &request)? {
        ProfileOutcome::Drawn(sheet) => {
            if args.json {
                write_json(&sheet, &args.output)?;
            } else {
                SvgWriter::new().with_scale(args.scale).write(&sheet, &args.output)?;
            }
            info!("Written profile: {:?}", args.output);
        }
        ProfileOutcome::NoData => {
            println!("{NO_DATA_MESSAGE}");
        }
    }

    let elapsed = start_time.elapsed();
    info!("Total processing time: {:?}", elapsed);

    Ok(())
}

fn write_json(sheet: &Sheet, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), sheet).context("Failed to write JSON")?;
    Ok(())
}

fn parse_numbers(value: &str) -> Result<Vec<f64>, String> {
    value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid coordinate `{}`: {}", part.trim(), e))
        })
        .collect()
}

fn parse_point(value: &str) -> Result<Coord, String> {
    match parse_numbers(value)?.as_slice() {
        [x, y] => Ok(Coord::new(*x, *y)),
        _ => Err("expected X,Y".to_string()),
    }
}

fn parse_line(value: &str) -> Result<Polyline, String> {
    let numbers = parse_numbers(value)?;
    if numbers.len() < 4 || numbers.len() % 2 != 0 {
        return Err("expected at least two X,Y pairs".to_string());
    }
    Ok(Polyline(
        numbers
            .chunks_exact(2)
            .map(|pair| Coord::new(pair[0], pair[1]))
            .collect(),
    ))
}
