//! miniGIS application shell.
//!
//! Loads a GeoJSON file into a map, renders it through the frame loop and
//! reports what was drawn. Runs without a window.

use kurbo::Size;
use minigis_core::clock::SystemClock;
use minigis_core::config::ViewerConfig;
use minigis_core::error::MapError;
use minigis_core::geometry::Coordinate;
use minigis_core::ingest;
use minigis_core::interaction::MapInteraction;
use minigis_core::map::Map;
use minigis_core::viewport::ViewTransform;
use minigis_render::{FrameLoop, FrameScheduler, ManualScheduler, VelloSurface};
use serde_json::json;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Usage: minigis <file.geojson> [config.json]")]
    Usage,
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Map(#[from] MapError),
}

/// Command line arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub geojson: PathBuf,
    pub config: Option<PathBuf>,
}

impl Args {
    /// Parse from the arguments after the program name.
    pub fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, AppError> {
        let geojson = args.next().map(PathBuf::from).ok_or(AppError::Usage)?;
        let config = args.next().map(PathBuf::from);
        if args.next().is_some() {
            return Err(AppError::Usage);
        }
        Ok(Self { geojson, config })
    }
}

/// What one run drew.
#[derive(Debug, Clone)]
pub struct Summary {
    pub layer_name: String,
    pub geometries: usize,
    pub total_area: f64,
    pub total_length: f64,
    pub center: Coordinate,
    pub scale: f64,
    pub draw_calls: usize,
    pub status_line: String,
}

impl Summary {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "layer": self.layer_name,
            "geometries": self.geometries,
            "totalArea": self.total_area,
            "totalLength": self.total_length,
            "center": { "x": self.center.x, "y": self.center.y },
            "scale": self.scale,
            "drawCalls": self.draw_calls,
            "status": self.status_line,
        })
    }
}

/// Load the inputs, render one frame and summarize it.
pub fn run(args: &Args) -> Result<Summary, AppError> {
    let config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    let json = std::fs::read_to_string(&args.geojson).map_err(|source| AppError::Read {
        path: args.geojson.clone(),
        source,
    })?;
    let name = layer_name(&args.geojson);
    let layer = ingest::layer_from_str(&json, &name)?;
    log::info!("loaded {} geometries from {}", layer.len(), args.geojson.display());

    let size = Size::new(config.width, config.height);
    let mut map = Map::with_view(ViewTransform::new(Coordinate::ZERO, size, config.initial_scale));
    let mut frame_loop = FrameLoop::from_config(&config, SystemClock::new());
    frame_loop.attach(&mut map);
    let layer_id = map.add_layer(layer);

    let mut scheduler = ManualScheduler::new();
    let mut surface = VelloSurface::new(size, config.background);
    scheduler.start();
    frame_loop.frame(&mut scheduler, &map, &mut surface);
    scheduler.stop();

    let interaction = MapInteraction::new(&config, SystemClock::new());
    let layer = map.layer(layer_id).ok_or(MapError::LayerNotFound(layer_id))?;
    Ok(Summary {
        layer_name: layer.name.clone(),
        geometries: layer.len(),
        total_area: layer.total_area(),
        total_length: layer.total_length(),
        center: map.center(),
        scale: map.scale(),
        draw_calls: frame_loop.buffer().draw_count(),
        status_line: interaction.status_line(&map),
    })
}

fn layer_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "layer".to_string())
}
