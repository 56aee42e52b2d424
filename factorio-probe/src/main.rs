use clap::Parser;
use log::debug;
use miette::{IntoDiagnostic, Result};
use std::thread;

use factorio_probe::{running_programs, run_cycle, simulated_provider, Cli, ConsoleLog, Report};
use mumble_factorio::locator;
use mumble_factorio::telemetry_file::TelemetryFile;

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();
    debug!("factorio-probe {}", factorio_probe::VERSION);

    let config = cli.plugin_config();

    if let Some(count) = cli.simulate {
        let mut provider = simulated_provider(&config);
        let running = running_programs(&cli, provider.settings());
        for index in 1..=count {
            let cycle = run_cycle(&mut provider, index, &running, &ConsoleLog);
            if cli.json {
                println!("{}", serde_json::to_string(&cycle).into_diagnostic()?);
            } else {
                println!("{}", cycle);
            }
            if index < count {
                thread::sleep(cli.interval());
            }
        }
        provider.shutdown();
        return Ok(());
    }

    let path = locator::resolve(&config).into_diagnostic()?;
    let report = Report::inspect(&TelemetryFile::new(path), config.max_age());
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).into_diagnostic()?
        );
    } else {
        print!("{}", report);
    }
    Ok(())
}
