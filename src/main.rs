use anyhow::Result;
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

use subway_sim::simulation::{CongestionLevel, Scenario, SimWorld};

#[derive(Parser)]
#[command(name = "subway_sim")]
#[command(about = "Urban rail simulation with optional dynamic routing")]
struct Cli {
    /// Number of external timer ticks to run
    #[arg(long, default_value = "600")]
    ticks: u32,

    /// Seed for the random generator
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Logical ticks per external tick (0.5 to 5.0)
    #[arg(long, default_value = "1.0")]
    speed: f64,

    /// Background traffic level
    #[arg(long, value_enum, default_value_t = CongestionLevel::Medium)]
    congestion: CongestionLevel,

    /// Multiply passenger arrivals by 2.5
    #[arg(long)]
    rush_hour: bool,

    /// Let trains divert to crowded nearby stations
    #[arg(long)]
    dynamic_routing: bool,

    /// JSON scenario file; the built-in network is used when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Report every N external ticks (0 disables periodic reports)
    #[arg(long, default_value = "60")]
    report_every: u32,

    /// Draw the terminal map with each report
    #[arg(long)]
    map: bool,

    /// Print each report as a JSON snapshot line instead of a text summary
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,subway_sim=info"),
    )
    .init();

    let cli = Cli::parse();
    if let Err(e) = run_headless(&cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(cli: &Cli) -> Result<()> {
    let scenario = match &cli.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default_network(),
    };

    let mut world = SimWorld::from_scenario_with_seed(&scenario, cli.seed)?;
    world.set_congestion_level(cli.congestion);
    world.set_rush_hour(cli.rush_hour);
    world.set_dynamic_routing(cli.dynamic_routing);
    let speed = world.set_speed_multiplier(cli.speed)?;

    info!(
        "Running {} external ticks at {}x (seed {}, congestion {}, rush hour {}, dynamic routing {})",
        cli.ticks, speed, cli.seed, cli.congestion, cli.rush_hour, cli.dynamic_routing
    );

    if !cli.json {
        println!("Initial state:");
        world.print_summary();
        if cli.map {
            world.draw_map();
        }
        println!();
    }

    world.start();
    for external_tick in 1..=cli.ticks {
        world.external_tick();

        if cli.report_every > 0 && external_tick % cli.report_every == 0 {
            report(&world, cli)?;
        }
    }
    world.pause();

    let metrics = world.metrics();
    info!("=== SIMULATION COMPLETE ===");
    info!("Logical ticks: {}", world.state().clock.tick());
    info!("Total passengers generated: {}", metrics.total_generated);
    info!("Passengers delivered: {}", metrics.total_delivered);
    info!("System efficiency: {}%", metrics.system_efficiency());
    info!("Congestion score: {:.1}%", metrics.congestion_score);
    info!("Cost savings accrued: ${:.2}", metrics.cost_savings_accrued);
    info!("Projected daily savings: ${:.2}", metrics.projected_daily_savings);
    info!(
        "Projected annual savings: ${:.2}",
        metrics.projected_annual_savings()
    );

    if !cli.json {
        println!("=== Final State ===");
        world.print_summary();
        if cli.map {
            world.draw_map();
        }
    }

    Ok(())
}

fn report(world: &SimWorld, cli: &Cli) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string(&world.snapshot())?);
        return Ok(());
    }

    println!("--- After tick {} ---", world.state().clock.tick());
    world.print_summary();
    if cli.map {
        world.draw_map();
    }
    println!();
    Ok(())
}
