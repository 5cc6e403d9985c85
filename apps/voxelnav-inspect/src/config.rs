//! Command-line configuration.

use anyhow::{bail, Context};
use glam::DVec3;

/// Where the initial state comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StateSource {
    /// Start from the default state.
    #[default]
    Empty,
    /// Raw JSON text.
    Json(String),
    /// URL fragment (`#!...`).
    Fragment(String),
}

/// A navigation command applied after restoring the state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Snap orientation and position.
    Snap,
    /// Multiply the zoom factor.
    ZoomBy(f64),
    /// Return zoom to its voxel-size default.
    ResetZoom,
    /// Set the voxel size.
    VoxelSize(DVec3),
    /// Move in world axes.
    Translate(DVec3),
    /// Move in camera axes, in voxels.
    TranslateVoxels(DVec3),
    /// Rotate about a camera-local axis by degrees.
    Rotate { axis: DVec3, degrees: f64 },
}

/// Inspector configuration.
#[derive(Debug, Clone, Default)]
pub struct InspectConfig {
    /// Initial state.
    pub source: StateSource,
    /// Commands in the order given.
    pub commands: Vec<Command>,
    /// Print the help text and exit.
    pub help: bool,
}

impl InspectConfig {
    /// Parse configuration from command line arguments.
    pub fn from_args() -> anyhow::Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        Self::parse_args(&args)
    }

    /// Parse from a slice of arguments. The first element is the program name.
    pub fn parse_args(args: &[String]) -> anyhow::Result<Self> {
        let mut config = Self::default();

        let mut i = 1;
        while i < args.len() {
            let flag = args[i].as_str();
            let mut value = || {
                i += 1;
                args.get(i)
                    .map(String::as_str)
                    .with_context(|| format!("missing value for {flag}"))
            };
            match flag {
                "-h" | "--help" => config.help = true,
                "-s" | "--state" => {
                    config = config.with_source(StateSource::Json(value()?.to_owned()));
                }
                "-f" | "--fragment" => {
                    config = config.with_source(StateSource::Fragment(value()?.to_owned()));
                }
                "--snap" => config = config.with_command(Command::Snap),
                "--reset-zoom" => config = config.with_command(Command::ResetZoom),
                "--zoom-by" => {
                    let factor = value()?;
                    let factor = factor
                        .parse()
                        .with_context(|| format!("invalid zoom factor {factor:?}"))?;
                    config = config.with_command(Command::ZoomBy(factor));
                }
                "--voxel-size" => {
                    config = config.with_command(Command::VoxelSize(parse_vec3(value()?)?));
                }
                "--translate" => {
                    config = config.with_command(Command::Translate(parse_vec3(value()?)?));
                }
                "--translate-voxels" => {
                    config = config.with_command(Command::TranslateVoxels(parse_vec3(value()?)?));
                }
                "--rotate" => {
                    let [x, y, z, degrees] = parse_floats::<4>(value()?)?;
                    config = config.with_command(Command::Rotate {
                        axis: DVec3::new(x, y, z),
                        degrees,
                    });
                }
                other => bail!("unknown argument {other:?}"),
            }
            i += 1;
        }

        Ok(config)
    }

    /// Set the initial state source.
    #[must_use]
    pub fn with_source(mut self, source: StateSource) -> Self {
        self.source = source;
        self
    }

    /// Append a command.
    #[must_use]
    pub fn with_command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }
}

/// Parse `"x,y,z"`.
fn parse_vec3(s: &str) -> anyhow::Result<DVec3> {
    parse_floats::<3>(s).map(DVec3::from_array)
}

/// Parse exactly `N` comma-separated numbers.
fn parse_floats<const N: usize>(s: &str) -> anyhow::Result<[f64; N]> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != N {
        bail!("expected {N} comma-separated numbers, got {s:?}");
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .with_context(|| format!("invalid number {part:?} in {s:?}"))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("voxelnav-inspect")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn parse_defaults() {
        let config = InspectConfig::parse_args(&args(&[])).unwrap();
        assert_eq!(config.source, StateSource::Empty);
        assert!(config.commands.is_empty());
        assert!(!config.help);
    }

    #[test]
    fn parse_commands_in_order() {
        let config = InspectConfig::parse_args(&args(&[
            "--fragment",
            "#!%7B%7D",
            "--translate",
            "1, 2,3",
            "--rotate",
            "0,0,1,90",
            "--zoom-by",
            "0.5",
            "--snap",
        ]))
        .unwrap();
        assert_eq!(config.source, StateSource::Fragment("#!%7B%7D".to_owned()));
        assert_eq!(
            config.commands,
            vec![
                Command::Translate(DVec3::new(1.0, 2.0, 3.0)),
                Command::Rotate {
                    axis: DVec3::Z,
                    degrees: 90.0
                },
                Command::ZoomBy(0.5),
                Command::Snap,
            ]
        );
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(InspectConfig::parse_args(&args(&["--zoom-by"])).is_err());
        assert!(InspectConfig::parse_args(&args(&["--translate", "1,2"])).is_err());
        assert!(InspectConfig::parse_args(&args(&["--voxel-size", "a,b,c"])).is_err());
        assert!(InspectConfig::parse_args(&args(&["--bogus"])).is_err());
    }

    #[test]
    fn builder() {
        let config = InspectConfig::default()
            .with_source(StateSource::Json("{}".to_owned()))
            .with_command(Command::ResetZoom);
        assert_eq!(config.source, StateSource::Json("{}".to_owned()));
        assert_eq!(config.commands, vec![Command::ResetZoom]);
    }
}
