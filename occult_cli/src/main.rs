//! Command-line front end for the ellipsoid occultation routines.
//!
//! Vectors are comma-separated components, e.g. `--viewpoint 10,0,0`.
//! Semi-axis matrices are nine comma-separated numbers, listed column by
//! column.

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};
use nalgebra::{Matrix3, Vector3};
use rsspice_occult::{Ellipsoid, MovingEllipsoid, occultation, search};
use std::fmt::Write;
use tracing::{Level, debug};

#[derive(clap::Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log intermediate results of the geometry routines
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify the occultation of two targets seen from a viewing point
    Classify {
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        viewpoint: Vector3<f64>,

        #[command(flatten)]
        targets: Targets,
    },

    /// Print the limb of a target seen from a viewing point
    Limb {
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        viewpoint: Vector3<f64>,

        #[command(flatten)]
        target: Target,
    },

    /// Print the nearest surface point of a target, and the altitude
    Nearpt {
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        point: Vector3<f64>,

        #[command(flatten)]
        target: Target,
    },

    /// Find the occultation windows of two targets in linear motion
    Sweep {
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        viewpoint: Vector3<f64>,

        #[command(flatten)]
        targets: Targets,

        /// Velocity of the first target
        #[arg(
            long,
            value_parser = parse_vector,
            allow_hyphen_values = true,
            default_value = "0,0,0"
        )]
        velocity1: Vector3<f64>,

        /// Velocity of the second target
        #[arg(
            long,
            value_parser = parse_vector,
            allow_hyphen_values = true,
            default_value = "0,0,0"
        )]
        velocity2: Vector3<f64>,

        /// Start of the search interval
        #[arg(long, allow_hyphen_values = true)]
        start: f64,

        /// End of the search interval
        #[arg(long, allow_hyphen_values = true)]
        end: f64,

        /// Number of sampling steps across the interval
        #[arg(long, default_value_t = 100)]
        steps: usize,

        /// Precision of the reported window boundaries
        #[arg(long, default_value_t = 1e-6)]
        tolerance: f64,
    },
}

#[derive(Args)]
struct Target {
    /// Target center
    #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
    center: Vector3<f64>,

    /// Semi-axis lengths along x, y and z
    #[arg(long, value_parser = parse_vector, allow_hyphen_values = true,
        required_unless_present = "axes", conflicts_with = "axes")]
    radii: Option<Vector3<f64>>,

    /// Semi-axis vectors
    #[arg(long, value_parser = parse_matrix, allow_hyphen_values = true)]
    axes: Option<Matrix3<f64>>,
}

impl Target {
    fn ellipsoid(&self) -> Result<Ellipsoid> {
        ellipsoid(self.center, self.radii, self.axes)
    }
}

#[derive(Args)]
struct Targets {
    /// First target center
    #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
    center1: Vector3<f64>,

    /// First target semi-axis lengths along x, y and z
    #[arg(long, value_parser = parse_vector, allow_hyphen_values = true,
        required_unless_present = "axes1", conflicts_with = "axes1")]
    radii1: Option<Vector3<f64>>,

    /// First target semi-axis vectors
    #[arg(long, value_parser = parse_matrix, allow_hyphen_values = true)]
    axes1: Option<Matrix3<f64>>,

    /// Second target center
    #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
    center2: Vector3<f64>,

    /// Second target semi-axis lengths along x, y and z
    #[arg(long, value_parser = parse_vector, allow_hyphen_values = true,
        required_unless_present = "axes2", conflicts_with = "axes2")]
    radii2: Option<Vector3<f64>>,

    /// Second target semi-axis vectors
    #[arg(long, value_parser = parse_matrix, allow_hyphen_values = true)]
    axes2: Option<Matrix3<f64>>,
}

impl Targets {
    fn ellipsoids(&self) -> Result<(Ellipsoid, Ellipsoid)> {
        Ok((
            ellipsoid(self.center1, self.radii1, self.axes1)?,
            ellipsoid(self.center2, self.radii2, self.axes2)?,
        ))
    }
}

fn parse_numbers(s: &str) -> Result<Vec<f64>, String> {
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid number {part:?}: {e}"))
        })
        .collect()
}

fn parse_vector(s: &str) -> Result<Vector3<f64>, String> {
    match parse_numbers(s)?.as_slice() {
        &[x, y, z] => Ok(Vector3::new(x, y, z)),
        other => Err(format!("expected 3 components, found {}", other.len())),
    }
}

fn parse_matrix(s: &str) -> Result<Matrix3<f64>, String> {
    let values = parse_numbers(s)?;
    if values.len() != 9 {
        return Err(format!("expected 9 components, found {}", values.len()));
    }
    Ok(Matrix3::from_column_slice(&values))
}

fn ellipsoid(
    center: Vector3<f64>,
    radii: Option<Vector3<f64>>,
    axes: Option<Matrix3<f64>>,
) -> Result<Ellipsoid> {
    let result = match (radii, axes) {
        (_, Some(axes)) => Ellipsoid::new(center, &axes),
        (Some(r), None) => Ellipsoid::from_radii(center, r.x, r.y, r.z),
        (None, None) => return Err(anyhow!("no radii or semi-axes given")),
    };
    result.map_err(spice_error)
}

fn spice_error(err: rsspice_occult::Error) -> anyhow::Error {
    anyhow!("{} {}: {}", err.short(), err, err.long())
}

fn fmt_vector(v: &Vector3<f64>) -> String {
    format!("{} {} {}", v.x, v.y, v.z)
}

fn run(cli: &Cli) -> Result<String> {
    let mut out = String::new();
    match &cli.command {
        Command::Classify { viewpoint, targets } => {
            let (first, second) = targets.ellipsoids()?;
            let state = occultation(viewpoint, &first, &second).map_err(spice_error)?;
            writeln!(out, "{} {}", state.code(), state)?;
        }
        Command::Limb { viewpoint, target } => {
            let limb = target.ellipsoid()?.limb(viewpoint).map_err(spice_error)?;
            writeln!(out, "center {}", fmt_vector(limb.center()))?;
            writeln!(out, "semi-major {}", fmt_vector(limb.semi_major()))?;
            writeln!(out, "semi-minor {}", fmt_vector(limb.semi_minor()))?;
        }
        Command::Nearpt { point, target } => {
            let near = target.ellipsoid()?.nearest_point(point).map_err(spice_error)?;
            writeln!(out, "point {}", fmt_vector(&near.point))?;
            writeln!(out, "altitude {}", near.altitude)?;
        }
        Command::Sweep {
            viewpoint,
            targets,
            velocity1,
            velocity2,
            start,
            end,
            steps,
            tolerance,
        } => {
            let (first, second) = targets.ellipsoids()?;
            let first = MovingEllipsoid::new(first, *velocity1);
            let second = MovingEllipsoid::new(second, *velocity2);
            let windows = search(viewpoint, &first, &second, *start, *end, *steps, *tolerance)
                .map_err(spice_error)?;
            debug!(windows = windows.len(), "search complete");
            for w in windows {
                writeln!(
                    out,
                    "{} {} {} {}",
                    w.start,
                    w.end,
                    w.occultation.code(),
                    w.occultation
                )?;
            }
        }
    }
    Ok(out)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    print!("{}", run(&cli)?);
    Ok(())
}
