use chrono::Utc;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

use pass_o_mat::batch::{self, BatchRequest, StationSchedule};
use pass_o_mat::config::{validate_days, Config};
use pass_o_mat::predict::TleLoader;
use pass_o_mat::time_expr::TimeExpr;
use pass_o_mat::web;

#[derive(Parser)]
#[command(name = "pass-o-mat")]
#[command(about = "Satellite pass prediction for ground stations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config file and its TLE folder
    Validate { config: String },
    /// Predict passes for every configured satellite and station
    Predict {
        config: String,
        /// Horizon in days, overrides the config
        #[arg(long)]
        days: Option<u32>,
        /// Scan start (now, T+2h, RFC3339), overrides the config
        #[arg(long)]
        start: Option<String>,
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Serve predictions over HTTP
    Serve { config: String },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Predict {
            config,
            days,
            start,
            json,
        } => predict(&config, days, start.as_deref(), json),
        Commands::Serve { config } => serve(&config),
    }
}

fn load_config(path: &str) -> Option<Config> {
    match Config::from_file(path) {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("Error loading config {}: {}", path, e);
            None
        }
    }
}

fn load_tle(config: &Config) -> Option<TleLoader> {
    let mut loader = TleLoader::new(config.tle.folder.clone());
    match loader.load_all() {
        Ok(()) => Some(loader),
        Err(e) => {
            eprintln!("Error loading TLE folder: {}", e);
            None
        }
    }
}

fn validate(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };
    let Some(loader) = load_tle(&config) else {
        return ExitCode::FAILURE;
    };

    println!(
        "Config is valid ({} stations, {} satellites)",
        config.stations.len(),
        loader.satellites().len()
    );
    for sat in loader.satellites() {
        println!("  {} [{}] from {}", sat.info.name, sat.info.norad_id, sat.info.tle_source);
    }
    ExitCode::SUCCESS
}

fn predict(path: &str, days: Option<u32>, start: Option<&str>, json: bool) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    let days = days.unwrap_or(config.predict.days);
    if let Err(e) = validate_days(days) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let start = match start.map(TimeExpr::parse).transpose() {
        Ok(expr) => expr.unwrap_or(config.predict.start).resolve(Utc::now()),
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let stations = match config.stations() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let Some(loader) = load_tle(&config) else {
        return ExitCode::FAILURE;
    };
    let targets = loader.satellites();
    if targets.is_empty() {
        eprintln!("No satellites loaded from {}", loader.tle_dir().display());
        return ExitCode::FAILURE;
    }

    let request = BatchRequest {
        start,
        days,
        workers: config.predict.workers,
    };
    let schedules = batch::predict_schedules(&targets, &stations, &request, |p| {
        log::info!("Progress: {}/{}", p.completed, p.total)
    });

    if json {
        match serde_json::to_string_pretty(&schedules) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error serializing passes: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        for schedule in &schedules {
            print_schedule(schedule);
        }
    }

    ExitCode::SUCCESS
}

fn print_schedule(schedule: &StationSchedule) {
    println!(
        "{} ({}): {} passes",
        schedule.station_name,
        schedule.station_id,
        schedule.passes.len()
    );
    for p in &schedule.passes {
        let pass = &p.pass;
        println!(
            "  {:<24} {}  peak {} {:>6.2}°  end {}  az {:>6.2}° ({}) -> {:>6.2}° ({})  {}m{:02}s",
            p.satellite,
            pass.start.format("%Y-%m-%d %H:%M:%S"),
            pass.peak.format("%H:%M:%S"),
            pass.peak_elevation_deg,
            pass.end.format("%H:%M:%S"),
            pass.start_azimuth_deg,
            pass.start_compass,
            pass.end_azimuth_deg,
            pass.end_compass,
            pass.duration_seconds() / 60,
            pass.duration_seconds() % 60,
        );
    }
}

fn serve(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(web::run_server(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
