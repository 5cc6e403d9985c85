//! voxelnav navigation state inspector
//!
//! Restores a navigation state from JSON or a URL fragment, applies
//! navigation commands in order, and prints the resulting state, its URL
//! fragment and the view matrix.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p voxelnav-inspect -- [OPTIONS]
//! ```
//!
//! ## Examples
//!
//! ```bash
//! # Restore a state and snap it to the voxel grid
//! cargo run -p voxelnav-inspect -- \
//!     --state '{"pose":{"position":{"voxelSize":[4,4,40],"voxelCoordinates":[10.4,20.6,3]}}}' \
//!     --snap
//!
//! # Rotate a shared link's view by 90 degrees and zoom in
//! cargo run -p voxelnav-inspect -- --fragment '#!%7B%22zoomFactor%22%3A8%7D' \
//!     --voxel-size 4,4,40 --rotate 0,0,1,90 --zoom-by 0.5
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

mod config;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use voxelnav_core::Trackable;
use voxelnav_navigation::{
    restore_from_fragment, to_fragment, NavigationState, Pose, VoxelSize,
};

use crate::config::{Command, InspectConfig, StateSource};

/// Printed result of an inspection run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    state: Option<Value>,
    fragment: String,
    valid: bool,
    zoom_factor: Option<f64>,
    voxel_coordinates: Option<[f64; 3]>,
    view_matrix: [[f64; 4]; 4],
}

impl From<&NavigationState> for Report {
    fn from(navigation: &NavigationState) -> Self {
        Self {
            state: navigation.to_json(),
            fragment: to_fragment(navigation),
            valid: navigation.is_valid(),
            zoom_factor: navigation.zoom_factor(),
            voxel_coordinates: navigation
                .pose()
                .position()
                .voxel_coordinates()
                .map(|voxel| voxel.to_array()),
            view_matrix: navigation.to_mat4().to_cols_array_2d(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = InspectConfig::from_args()?;
    if config.help {
        print_help();
        return Ok(());
    }

    let navigation = NavigationState::new(Pose::with_voxel_size(VoxelSize::new()));
    restore(&navigation, &config.source)?;
    info!("Restored state, voxel size {}", navigation.voxel_size());

    for command in &config.commands {
        apply(&navigation, *command);
    }

    let report = Report::from(&navigation);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn restore(navigation: &NavigationState, source: &StateSource) -> anyhow::Result<()> {
    match source {
        StateSource::Empty => {}
        StateSource::Json(text) => {
            let value: Value = serde_json::from_str(text)?;
            navigation.restore_state(&value);
        }
        StateSource::Fragment(fragment) => restore_from_fragment(navigation, fragment)?,
    }
    Ok(())
}

fn apply(navigation: &NavigationState, command: Command) {
    debug!("Applying {command:?}");
    let pose = navigation.pose();
    match command {
        Command::Snap => pose.snap(),
        Command::ZoomBy(factor) => navigation.zoom_by(factor),
        Command::ResetZoom => navigation.reset_zoom(),
        Command::VoxelSize(size) => navigation.voxel_size().set_size(size),
        Command::Translate(delta) => pose.translate_absolute(delta),
        Command::TranslateVoxels(delta) => pose.translate_voxels_relative(delta),
        Command::Rotate { axis, degrees } => pose.rotate_relative(axis, degrees.to_radians()),
    }
}

fn print_help() {
    eprintln!(
        "voxelnav navigation state inspector

USAGE:
    cargo run -p voxelnav-inspect -- [OPTIONS]

STATE OPTIONS:
    -s, --state <JSON>         Initial navigation state as JSON
    -f, --fragment <FRAGMENT>  Initial navigation state as a URL fragment (#!...)

COMMANDS (applied in order):
    --voxel-size <X,Y,Z>       Set the voxel size in nanometers
    --translate <X,Y,Z>        Move in world axes (spatial units)
    --translate-voxels <X,Y,Z> Move in camera axes (voxels)
    --rotate <X,Y,Z,DEG>       Rotate about a camera-local axis
    --zoom-by <FACTOR>         Multiply the zoom factor
    --reset-zoom               Return zoom to the voxel size default
    --snap                     Snap orientation and position to the voxel grid

OTHER:
    -h, --help                 Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG                   Set log level (e.g., info, debug, trace)"
    );
}
