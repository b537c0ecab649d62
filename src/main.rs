//! Command line driver: runs either or both engines from a saved (or default) config, and logs
//! diagnostics. Rendering is left to other tools.

use std::{path::PathBuf, time::Instant};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{error, info, warn};

use plate_flow::{
    config::{Config, CONFIG_FILE},
    driver::{self, RunReport},
    util, FlowError, LbmEngine, SphEngine,
};

#[derive(Clone, Copy, PartialEq, Debug)]
enum EngineChoice {
    Sph,
    Lbm,
    Both,
}

fn get_args() -> ArgMatches {
    clap::command!()
        .propagate_version(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Config file; defaults are used if it doesn't exist")
                .value_parser(value_parser!(PathBuf))
                .default_value(CONFIG_FILE)
                .global(true),
        )
        .subcommand(
            Command::new("run")
                .about("Run the simulation")
                .arg(
                    Arg::new("engine")
                        .short('e')
                        .long("engine")
                        .value_parser(["sph", "lbm", "both"])
                        .default_value("both"),
                )
                .arg(
                    Arg::new("steps")
                        .short('n')
                        .long("steps")
                        .value_name("N")
                        .help("Override the configured number of time steps")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("batch")
                        .short('b')
                        .long("batch")
                        .value_name("N")
                        .help("Override the configured diagnostics batch size")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("keep_going")
                        .long("keep-going")
                        .help("Don't halt when a degenerate density is reported")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("save-config").about("Write the default config to file"))
        .get_matches()
}

fn load_config(path: &PathBuf) -> Config {
    if !path.exists() {
        return Config::default();
    }

    match util::load(path) {
        Ok(cfg) => {
            info!("Loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            warn!("Unable to load {}: {e}. Using defaults.", path.display());
            Config::default()
        }
    }
}

fn report<S>(name: &str, report: &RunReport<S>, elapsed_ms: u128) {
    let Some(last) = report.samples.last() else {
        info!("{name}: no steps run");
        return;
    };

    let d = last.diagnostics;
    info!(
        "{name}: {} steps in {elapsed_ms} ms. ΔP = {:.5}, KE = {:.5}, |p| = {:.5}, flow = {:.5}",
        last.step, d.pressure_difference, d.kinetic_energy, d.momentum, d.mass_flow
    );

    if let Some((min, max)) = util::range(&report.samples, |s| s.diagnostics.pressure_difference) {
        info!("{name}: ΔP range over run: [{min:.5}, {max:.5}]");
    }

    if let Some(a) = &report.anomaly {
        warn!("{name}: {a}");
    }
}

fn run(cfg: &mut Config, matches: &ArgMatches) -> Result<(), FlowError> {
    let choice = match matches.get_one::<String>("engine").map(String::as_str) {
        Some("sph") => EngineChoice::Sph,
        Some("lbm") => EngineChoice::Lbm,
        _ => EngineChoice::Both,
    };

    if let Some(&steps) = matches.get_one::<usize>("steps") {
        cfg.sph.num_timesteps = steps;
        cfg.lbm.num_timesteps = steps;
    }
    if let Some(&batch) = matches.get_one::<usize>("batch") {
        cfg.sph.batch_size = batch;
        cfg.lbm.batch_size = batch;
    }
    let halt = !matches.get_flag("keep_going");

    // Validate both up front, so a bad LBM config doesn't surface after a long SPH run.
    if choice != EngineChoice::Lbm {
        cfg.sph.validate()?;
    }
    if choice != EngineChoice::Sph {
        cfg.lbm.validate()?;
    }

    if choice != EngineChoice::Lbm {
        let mut engine = SphEngine::new(cfg.sph.clone())?;
        info!(
            "SPH: {} particles, {:?}, dt = {}",
            engine.num_particles(),
            cfg.sph.integrator,
            cfg.sph.dt
        );

        let start = Instant::now();
        let result = driver::run(&mut engine, cfg.sph.num_timesteps, cfg.sph.batch_size, halt);
        report("SPH", &result, start.elapsed().as_millis());
    }

    if choice != EngineChoice::Sph {
        let mut engine = LbmEngine::new(cfg.lbm.clone())?;
        info!(
            "LBM: {}×{} lattice, τ = {}, ρ_0 = {}",
            engine.nx, engine.ny, cfg.lbm.tau, cfg.lbm.rho0
        );

        let start = Instant::now();
        let result = driver::run(&mut engine, cfg.lbm.num_timesteps, cfg.lbm.batch_size, halt);
        report("LBM", &result, start.elapsed().as_millis());

        if let Some(snap) = &result.last {
            let max_speed = snap.speed().into_iter().fold(0., f64::max);
            info!("LBM: max speed {max_speed:.5}");
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = get_args();
    let path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

    let result = match matches.subcommand() {
        Some(("run", sub_m)) => {
            let mut cfg = load_config(&path);
            run(&mut cfg, sub_m)
        }
        Some(("save-config", _)) => util::save(&path, &Config::default()).map(|_| {
            info!("Saved default config to {}", path.display());
        }),
        _ => unreachable!("At least one subcommand is required: .subcommand_required(true)"),
    };

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}
