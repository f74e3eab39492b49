use std::env;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use serde::de::DeserializeOwned;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use pitchspace::analysis::{AnalysisConfig, Analyst};
use pitchspace::control::{ControlModel, SpearmanModel, SpearmanParams, VoronoiModel};
use pitchspace::counterfactual::{ModeKind, Modification};
use pitchspace::domain::{EventId, PlayerId, Side};
use pitchspace::geom::Vec2;
use pitchspace::optimizer::SearchConfig;
use pitchspace::print::{tabulate_difference, tabulate_surface, tabulate_trials};
use pitchspace::tracking::{TrackingData, TrackingSource};

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// file to source the tracking data from
    #[clap(short = 'f', long)]
    file: PathBuf,

    /// event ID
    #[clap(short = 'e', long)]
    event: u64,

    /// side of the analysed player (home or away)
    #[clap(short = 's', long)]
    side: Side,

    /// shirt number of the analysed player
    #[clap(short = 'n', long)]
    number: u8,

    /// counterfactual mode (movement, presence, location or relocation)
    #[clap(short = 'm', long, default_value = "movement")]
    mode: ModeKind,

    /// velocity for movement and relocation, as "x,y"
    #[clap(long, value_parser = parse_vec2)]
    velocity: Option<Vec2>,

    /// offset for location, or absolute position for relocation, as "x,y"
    #[clap(long, value_parser = parse_vec2)]
    position: Option<Vec2>,

    /// search for the best position and velocity instead of evaluating a single mode
    #[clap(short = 'o', long)]
    optimize: bool,

    /// use the equidistant model with this look-ahead (in seconds) in place of the physics model
    #[clap(long)]
    voronoi: Option<f64>,

    /// JSON file with model parameters
    #[clap(long)]
    params: Option<PathBuf>,

    /// JSON file with analysis settings
    #[clap(long)]
    config: Option<PathBuf>,

    /// JSON file with search settings
    #[clap(long)]
    search: Option<PathBuf>,

    /// print the per-cell change in control
    #[clap(long)]
    map: bool,

    /// number of trials to list after optimising
    #[clap(long, default_value = "10")]
    top: usize,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.voronoi.is_some() && self.params.is_some() {
            bail!("model parameters do not apply to the equidistant model");
        }
        if !self.optimize {
            match self.mode {
                ModeKind::Location if self.position.is_none() => {
                    bail!("location requires --position")
                }
                ModeKind::Relocation if self.position.is_none() || self.velocity.is_none() => {
                    bail!("relocation requires --position and --velocity")
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn modification(&self) -> Modification {
        match self.mode {
            ModeKind::Movement => Modification::Movement {
                velocity: self.velocity.unwrap_or(Vec2::ZERO),
            },
            ModeKind::Presence => Modification::Presence,
            ModeKind::Location => Modification::Location {
                offset: self.position.unwrap_or(Vec2::ZERO),
            },
            ModeKind::Relocation => Modification::Relocation {
                position: self.position.unwrap_or(Vec2::ZERO),
                velocity: self.velocity.unwrap_or(Vec2::ZERO),
            },
        }
    }
}

fn parse_vec2(s: &str) -> anyhow::Result<Vec2> {
    let (x, y) = s
        .split_once(',')
        .ok_or(anyhow!("expected a pair of coordinates \"x,y\", got {s}"))?;
    Ok(Vec2::new(x.trim().parse()?, y.trim().parse()?))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let tracking = TrackingData::read_json_file(&args.file)?;
    debug!("field: {:?}", tracking.field_dimensions());
    let model: Box<dyn ControlModel> = match args.voronoi {
        Some(lookahead) => Box::new(VoronoiModel::with_lookahead(lookahead)),
        None => {
            let params = match &args.params {
                Some(path) => read_json::<SpearmanParams>(path)?,
                None => SpearmanParams::default(),
            };
            debug!("model params: {params:?}");
            Box::new(SpearmanModel::new(params)?)
        }
    };
    let config = match &args.config {
        Some(path) => read_json::<AnalysisConfig>(path)?,
        None => AnalysisConfig::default(),
    };
    let analyst = Analyst::new(&tracking, &*model, config)?;
    let event_id = EventId(args.event);
    let player = PlayerId::new(args.side, args.number);

    let start_time = Instant::now();
    if args.optimize {
        let search = match &args.search {
            Some(path) => read_json::<SearchConfig>(path)?,
            None => SearchConfig::default(),
        };
        debug!("search: {search:?}");
        let result = analyst.optimize_positioning(event_id, player, &search)?;
        let elapsed = start_time.elapsed();
        info!(
            "optimised {player} over {} trials in {:.3}s ({} cache hits)",
            result.history.len(),
            elapsed.as_millis() as f64 / 1_000.,
            result.cache_stats.hits
        );
        info!("\n{}", Console::default().render(&tabulate_trials(&result, args.top)));
        info!(
            "best: {} at {}, velocity {}, creates {:.1} m²",
            player, result.best.position, result.best.velocity, result.best.space_created
        );
    } else {
        let modification = args.modification();
        let difference = analyst.pitch_control_difference(event_id, player, &modification)?;
        let elapsed = start_time.elapsed();
        info!(
            "{} for {player} evaluated in {:.3}s",
            modification.kind(),
            elapsed.as_millis() as f64 / 1_000.
        );
        info!("\n{}", Console::default().render(&tabulate_difference(player, &difference)));
        if args.map {
            let gains = difference.delta.map(|delta| f64::max(delta, 0.0));
            let losses = difference.delta.map(|delta| f64::max(-delta, 0.0));
            info!("gained:\n{}", Console::default().render(&tabulate_surface(&gains)));
            info!("conceded:\n{}", Console::default().render(&tabulate_surface(&losses)));
        }
    }
    Ok(())
}
