mod replay;
mod walk;

use std::{
    path::{Path, PathBuf},
    result::Result as StdResult,
    sync::Arc,
};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use homing_logic::{
    Angle, HeadingService, Kilometers, LocationService, Navigator, Orientation, PlanarOffset,
    Position, SensorSettings, StateUpdateSender, bearing_correction, distance,
    heading_from_platform, project,
};
use log::{info, warn};
use tokio::sync::mpsc;

use walk::{FixedCompass, SimulatedWalk};

type Result<T = (), E = anyhow::Error> = StdResult<T, E>;

#[derive(Parser)]
#[command(version, about = "Great-circle distance and heading corrections for live navigation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Great-circle distance between two points in km
    Distance {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        long1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        long2: f64,
    },
    /// Move a point by a small offset in km, prints the new point as JSON
    Project {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        long: f64,
        #[arg(allow_negative_numbers = true)]
        north_km: f64,
        #[arg(allow_negative_numbers = true)]
        east_km: f64,
    },
    /// Degrees to turn from the current heading to face the destination
    Correction {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        long: f64,
        #[arg(allow_negative_numbers = true)]
        dest_lat: f64,
        #[arg(allow_negative_numbers = true)]
        dest_long: f64,
        /// True heading in degrees as the platform reports it, -1 means unknown
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        heading: f64,
    },
    /// Run the navigator against a recorded route or a simulated walk, printing every state
    /// update as a JSON line
    Simulate(SimulateArgs),
}

#[derive(Args)]
struct SimulateArgs {
    /// JSON file with sensor settings, defaults are used for anything missing
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON array of recorded samples to replay, a simulated walk is used if this is missing
    #[arg(long)]
    route: Option<PathBuf>,
    /// Where to navigate to, as LAT,LONG
    #[arg(long, value_parser = parse_position, allow_hyphen_values = true)]
    destination: Position,
    /// Where the simulated walk starts, as LAT,LONG
    #[arg(long, value_parser = parse_position, allow_hyphen_values = true)]
    start: Option<Position>,
    /// Fixed true heading for the simulated walk in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    heading: f64,
    /// Distance the simulated walk covers every poll
    #[arg(long, default_value_t = 0.05)]
    step_km: Kilometers,
    /// Seed for the simulated GPS noise
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Give up after this many polls of the simulated walk
    #[arg(long, default_value_t = 120)]
    max_ticks: u32,
    /// Stop once the reported distance is at most this
    #[arg(long, default_value_t = 0.01)]
    arrive_within_km: Kilometers,
}

fn parse_position(raw: &str) -> StdResult<Position, String> {
    let (lat, long) = raw
        .split_once(',')
        .ok_or_else(|| format!("Expected LAT,LONG, got \"{raw}\""))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("Invalid latitude \"{lat}\": {e}"))?;
    let long = long
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("Invalid longitude \"{long}\": {e}"))?;
    Ok(Position::new(lat, long))
}

fn check_start(start: Position) -> Result<Position> {
    if !(start.lat.is_finite() && start.long.is_finite()) {
        bail!("Start {start:?} isn't a finite position");
    }
    if start.lat.abs() > 90.0 {
        bail!("Start latitude {} is outside [-90, 90]", start.lat);
    }
    Ok(start)
}

fn load_settings(path: &Path) -> Result<SensorSettings> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&raw).context("Failed to parse sensor settings")
}

fn platform_heading(raw_degrees: f64) -> Option<Angle> {
    let heading = heading_from_platform(raw_degrees);
    if heading.is_none() {
        warn!("No valid heading ({raw_degrees}), treating it as facing north");
    }
    heading
}

struct UpdateSender(mpsc::Sender<()>);

impl StateUpdateSender for UpdateSender {
    fn send_update(&self) {
        // A full channel already has an update pending
        self.0.try_send(()).ok();
    }
}

async fn run<L, H>(
    settings: SensorSettings,
    location: L,
    heading: H,
    destination: Position,
    max_ticks: u32,
    arrive_within_km: Kilometers,
) -> Result
where
    L: LocationService + Send + Sync + 'static,
    H: HeadingService + Send + Sync + 'static,
{
    let (tx, mut rx) = mpsc::channel(8);
    let interval = settings.interval();
    let nav = Arc::new(Navigator::new(settings, location, heading, UpdateSender(tx)));

    nav.set_destination(destination)
        .await
        .context("Invalid destination")?;

    let runner = {
        let nav = nav.clone();
        tokio::spawn(async move { nav.main_loop().await })
    };

    let deadline = tokio::time::sleep(interval * max_ticks);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => {
                info!("Stopping after {max_ticks} polls");
                break;
            }

            res = tokio::signal::ctrl_c() => {
                res.context("Failed to listen for Ctrl-C")?;
                warn!("Interrupted");
                break;
            }

            Some(()) = rx.recv() => {
                let ui = nav.get_ui_state().await;
                println!("{}", serde_json::to_string(&ui)?);

                if ui.distance_km.is_some_and(|d| d <= arrive_within_km) {
                    info!("Arrived within {arrive_within_km} km of {destination:?}");
                    break;
                }
            }
        }
    }

    nav.stop();
    let history = runner.await.context("Navigator task failed")?;
    println!("{}", serde_json::to_string(&history)?);

    Ok(())
}

async fn simulate(args: SimulateArgs) -> Result {
    let settings = match &args.config {
        Some(path) => load_settings(path)?,
        None => SensorSettings::default(),
    };

    if let Some(path) = &args.route {
        let samples = replay::load_route(path)?;
        let ticks = u32::try_from(samples.len()).unwrap_or(u32::MAX);
        info!("Replaying {ticks} samples from {}", path.display());
        let (location, heading) = replay::split_route(samples);
        run(
            settings,
            location,
            heading,
            args.destination,
            ticks,
            args.arrive_within_km,
        )
        .await
    } else {
        let start = args
            .start
            .context("--start is required when no --route is given")
            .and_then(check_start)?;
        let noise_km = settings.accuracy.expected_error_meters() / 1000.0;
        info!(
            "Simulating a walk from {start:?} with {:?} accuracy (±{noise_km} km)",
            settings.accuracy
        );
        let walk = SimulatedWalk::new(start, args.destination, args.step_km, noise_km, args.seed);
        let compass = FixedCompass(platform_heading(args.heading));
        run(
            settings,
            walk,
            compass,
            args.destination,
            args.max_ticks,
            args.arrive_within_km,
        )
        .await
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    colog::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Distance {
            lat1,
            long1,
            lat2,
            long2,
        } => {
            let d = distance(Position::new(lat1, long1), Position::new(lat2, long2));
            println!("{d:.3}");
        }
        Commands::Project {
            lat,
            long,
            north_km,
            east_km,
        } => {
            let pos = project(
                Position::new(lat, long),
                PlanarOffset {
                    north: north_km,
                    east: east_km,
                },
            );
            println!("{}", serde_json::to_string(&pos)?);
        }
        Commands::Correction {
            lat,
            long,
            dest_lat,
            dest_long,
            heading,
        } => {
            let heading = platform_heading(heading).unwrap_or_default();
            let correction = bearing_correction(
                Some(Position::new(lat, long)),
                Some(Position::new(dest_lat, dest_long)),
                Orientation::from_heading(heading),
            );
            println!("{correction:.3}");
        }
        Commands::Simulate(args) => simulate(args).await?,
    }

    Ok(())
}
