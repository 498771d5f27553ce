use anyhow::bail;
use colored::Colorize;
use tix_server::TixServer;
use tracing::info;

use crate::cli::{Cli, Command, ServeArgs, SimulateArgs};
use crate::config::TixConfig;
use crate::simulate::{self, SimulationReport};

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = TixConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Simulate(args) => cmd_simulate(&mut config, &args).await,
        Command::Serve(args) => cmd_serve(&mut config, &args).await,
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

async fn cmd_simulate(config: &mut TixConfig, args: &SimulateArgs) -> anyhow::Result<()> {
    config.apply_simulate_args(args);
    let report = simulate::run(&config.simulation, config.engine.clone()).await?;
    print_report(&report);

    if !report.is_consistent() {
        bail!(
            "inconsistent run: {} successful results, {} units booked, {} bookings stored",
            report.tally.successes,
            report.stats.booked,
            report.audit.bookings
        );
    }
    Ok(())
}

async fn cmd_serve(config: &mut TixConfig, args: &ServeArgs) -> anyhow::Result<()> {
    config.apply_serve_args(args);
    let server = TixServer::new(config.server.clone());
    server
        .serve_with_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to listen for ctrl-c");
            }
        })
        .await?;
    info!("bye");
    Ok(())
}

fn print_report(report: &SimulationReport) {
    let tally = &report.tally;
    println!();
    println!("{}", "Simulation report".bold());
    println!("  elapsed             {:.3?}", report.elapsed);
    println!("  total tickets       {}", report.stats.total);
    println!("  requests            {} ({} accepted)", report.requested, report.accepted);
    println!("  processed           {}", tally.processed);
    println!("  successful          {}", tally.successes.to_string().green());
    println!(
        "  failed              {} (sold out {}, invalid {}, storage {}, cancelled {})",
        tally.failures().to_string().yellow(),
        tally.sold_out,
        tally.invalid,
        tally.storage_errors,
        tally.cancelled
    );
    println!("  remaining tickets   {}", report.stats.available);
    println!("  requests/sec        {:.2}", report.requests_per_sec());
    println!("  mean per request    {:.3?}", report.mean_per_request());
    if report.deadline_hit {
        println!("  {} deadline reached before all requests finished", "!".yellow().bold());
    }

    if report.is_consistent() {
        println!(
            "{} {} booked, {} successful results",
            "✓".green().bold(),
            report.stats.booked,
            tally.successes
        );
    } else {
        println!(
            "{} {} booked, {} successful results",
            "✗".red().bold(),
            report.stats.booked,
            tally.successes
        );
    }
}
