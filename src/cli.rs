use crate::config::{Config, load_config};
use crate::input::parse_graph;
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::render::{render_svg, write_output_svg};
use crate::routing::{Viewport, route_graph};
use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bgl", version, about = "Lay out and route a box graph")]
pub struct Args {
    /// Graph description (.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Viewport height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Fixed zoom factor instead of zooming to fit
    #[arg(short = 'z', long = "zoom")]
    pub zoom: Option<f32>,

    /// Id of the box to highlight
    #[arg(short = 's', long = "select")]
    pub select: Option<String>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let source = read_input(args.input.as_deref())?;
    let mut graph = parse_graph(&source, &config.render)?;
    let report = graph.arrange_with(&config.layout);
    info!(
        boxes = graph.len(),
        edges = graph.edge_count(),
        passes = report.passes,
        "layout done"
    );

    let viewport = viewport_for(&config, graph.bounds(), args.zoom);
    let routes = route_graph(&graph, &viewport, &config.route);
    let selected = match args.select.as_deref() {
        Some(id) => Some(
            graph
                .handle_of(&id.to_string())
                .ok_or_else(|| anyhow::anyhow!("No box with id {id:?}"))?,
        ),
        None => None,
    };

    match args.output_format {
        OutputFormat::Json => {
            let dump = LayoutDump::from_graph(&graph, &routes, viewport, report);
            write_layout_dump(args.output.as_deref(), &dump)?;
        }
        OutputFormat::Svg => {
            let svg = render_svg(
                &graph,
                &routes,
                &viewport,
                &config.theme,
                &config.render,
                selected,
            );
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(
                &graph,
                &routes,
                &viewport,
                &config.theme,
                &config.render,
                selected,
            );
            write_png(&svg, &output, &config)?;
        }
    }

    Ok(())
}

fn viewport_for(
    config: &Config,
    bounds: Option<crate::geometry::Rect>,
    zoom: Option<f32>,
) -> Viewport {
    let (width, height) = (config.render.width, config.render.height);
    match (bounds, zoom) {
        (Some(bounds), Some(zoom)) => Viewport::centered(bounds, width, height, zoom),
        (bounds, _) => Viewport::fit(bounds, width, height),
    }
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "bgl", "-i", "cfg.json5", "-e", "json", "-z", "0.5", "-s", "entry", "-vv",
        ])
        .unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
        assert_eq!(args.zoom, Some(0.5));
        assert_eq!(args.select.as_deref(), Some("entry"));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn fixed_zoom_centers_on_bounds() {
        let config = Config::default();
        let bounds = Rect::new(0.0, 0.0, 200.0, 100.0);
        let v = viewport_for(&config, Some(bounds), Some(2.0));
        assert_eq!(v.zoom, 2.0);
        assert_eq!(v.x, (200.0 - 1200.0 / 2.0) / 2.0);
        let fitted = viewport_for(&config, Some(bounds), None);
        assert_eq!(fitted.zoom, 1.0);
    }

    #[test]
    fn png_requires_output_path() {
        assert!(ensure_output(&None, "png").is_err());
    }
}
