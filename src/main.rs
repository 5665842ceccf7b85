use std::path::Path;
use std::time::Duration;

use tool_wheel::catalog::{devops, Catalog, CategoryFilter};
use tool_wheel::game::{GameMode, ScoreKeeper};
use tool_wheel::host::{SpinDriver, SpinEvent, DEFAULT_TICK_INTERVAL};
use tool_wheel::wheel::config::clamp_speed_multiplier;
use tool_wheel::wheel::{SpinConfig, SpinEngine, SpinPhase};

/// Hard cap per spin; the default tuning settles in a few hundred ticks
const MAX_TICKS_PER_SPIN: u64 = 20_000;

struct CliArgs {
    mode: GameMode,
    filter: CategoryFilter,
    speed: f64,
    seed: Option<u64>,
    spins: u32,
    catalog_path: Option<String>,
    tick_ms: u64,
    log_level: log::LevelFilter,
    list_categories: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            mode: GameMode::Random,
            filter: CategoryFilter::All,
            speed: 1.0,
            seed: None,
            spins: 1,
            catalog_path: None,
            tick_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            log_level: log::LevelFilter::Info,
            list_categories: false,
        }
    }
}

fn parse_args() -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();

    for arg in std::env::args().skip(1) {
        let (key, value) = match arg.split_once('=') {
            Some((k, v)) => (k, Some(v)),
            None => (arg.as_str(), None),
        };
        match (key, value) {
            ("--mode", Some(v)) => cli.mode = v.parse().map_err(|e| format!("{e}"))?,
            ("--category", Some(v)) => cli.filter = CategoryFilter::parse(v),
            ("--speed", Some(v)) => {
                let speed: f64 = v.parse().map_err(|_| format!("invalid speed '{v}'"))?;
                cli.speed = clamp_speed_multiplier(speed);
            }
            ("--seed", Some(v)) => {
                cli.seed = Some(v.parse().map_err(|_| format!("invalid seed '{v}'"))?)
            }
            ("--spins", Some(v)) => {
                cli.spins = v.parse().map_err(|_| format!("invalid spin count '{v}'"))?
            }
            ("--catalog", Some(v)) => cli.catalog_path = Some(v.to_string()),
            ("--tick-ms", Some(v)) => {
                cli.tick_ms = v.parse().map_err(|_| format!("invalid tick interval '{v}'"))?
            }
            ("--log-level", Some(v)) => {
                cli.log_level = v.parse().map_err(|_| format!("invalid log level '{v}'"))?
            }
            ("--list-categories", None) => cli.list_categories = true,
            ("--quiet" | "-q", None) => cli.log_level = log::LevelFilter::Off,
            ("--help" | "-h", None) => {
                show_help();
                std::process::exit(0);
            }
            _ => return Err(format!("unrecognized argument '{arg}'")),
        }
    }
    Ok(cli)
}

fn show_help() {
    println!(
        "tool-wheel: spin the wheel of DevOps tools

USAGE:
    tool-wheel [OPTIONS]

OPTIONS:
    --mode=MODE           random / learning / challenge (default: random)
    --category=NAME       Only put one category on the wheel (default: All)
    --speed=X             Spin speed multiplier, clamped to 0.1..3.0 (default: 1.0)
    --seed=N              Reproducible spins
    --spins=N             Number of spins to play (default: 1)
    --catalog=PATH        Load tools from a JSON array instead of the built-in list
    --tick-ms=N           Milliseconds per tick (default: 40)
    --log-level=LEVEL     off/error/warn/info/debug/trace (default: info)
    --list-categories     Print the catalog's categories and exit
    --quiet, -q           Suppress logs
    --help, -h            Show this help"
    );
}

fn load_catalog(path: Option<&str>) -> Result<Catalog, String> {
    match path {
        Some(p) => Catalog::load(Path::new(p)).map_err(|e| e.to_string()),
        None => Ok(devops::builtin()),
    }
}

fn main() {
    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };

    // RUST_LOG, when set, overrides --log-level
    env_logger::Builder::new()
        .filter_level(cli.log_level)
        .parse_default_env()
        .init();

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: CliArgs) -> Result<(), String> {
    let full = load_catalog(cli.catalog_path.as_deref())?;

    if cli.list_categories {
        println!("All");
        for category in full.categories() {
            println!("{category}");
        }
        return Ok(());
    }

    let catalog = full.filter(&cli.filter);
    let config = SpinConfig::default()
        .with_speed_multiplier(cli.speed)
        .with_max_ticks(MAX_TICKS_PER_SPIN);

    let mut engine = SpinEngine::new(catalog, config).map_err(|e| match &cli.filter {
        CategoryFilter::Only(name) => format!("category '{name}': {e}"),
        CategoryFilter::All => e.to_string(),
    })?;
    if let Some(seed) = cli.seed {
        engine = engine.with_seed(seed);
    }

    log::info!(
        "{} tools on the wheel, mode={}, speed={:.1}",
        engine.catalog().len(),
        cli.mode,
        cli.speed
    );

    let driver = SpinDriver::spawn(engine, Duration::from_millis(cli.tick_ms.max(1)));
    let mut keeper = ScoreKeeper::new(cli.mode);

    // Learning mode without an explicit filter walks the categories one spin at a time
    let learning_rotation: Vec<String> =
        if cli.mode == GameMode::Learning && cli.filter == CategoryFilter::All {
            full.categories().into_iter().map(str::to_string).collect()
        } else {
            Vec::new()
        };

    for spin in 0..cli.spins {
        if !learning_rotation.is_empty() {
            let category = &learning_rotation[spin as usize % learning_rotation.len()];
            let focus = full.filter(&CategoryFilter::Only(category.clone()));
            driver.stage_catalog(focus).map_err(|e| e.to_string())?;
            log::info!("Learning focus: {}", category);
        }

        driver.start_spin().map_err(|e| e.to_string())?;
        println!("Spinning...");

        let result = loop {
            match driver.events().recv() {
                Ok(SpinEvent::Frame(snap)) => {
                    log::trace!(
                        "tick {:>4}  angle {:>7.2}  velocity {:>6.2}",
                        snap.tick_count,
                        snap.angle,
                        snap.velocity
                    );
                    if snap.phase == SpinPhase::Settled {
                        log::debug!("Settled at {:.2} deg", snap.angle);
                    }
                }
                Ok(SpinEvent::Settled(result)) => break result,
                Err(_) => return Err("spin driver stopped unexpectedly".to_string()),
            }
        };

        let award = keeper.record(&result);
        let item = &result.item;
        println!("Selected Tool: {}", item.display_name);
        if !item.description.is_empty() {
            println!("Description: {}", item.description);
        }
        println!("Category: {}", item.category);
        println!(
            "+{} | Score: {} | Spins: {}",
            award.points,
            keeper.score(),
            keeper.spins()
        );
    }

    if cli.spins > 1 {
        println!("Spin History:");
        for entry in keeper.history() {
            println!(
                "  [{}] #{:<3} {} ({}) +{}",
                entry.clock(),
                entry.spin_id,
                entry.display_name,
                entry.category,
                entry.points
            );
        }
    }

    driver.shutdown();
    Ok(())
}
