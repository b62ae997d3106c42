use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use banner_scan_rs::{output, run_scan, targets, PortRange, ScanConfig};
use clap::Parser;

/// banner-scan-rs — concurrent TCP reachability and banner-grab scanner.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "banner-scan-rs",
    version,
    about = "Concurrent TCP reachability and banner-grab scanner with retries and backoff.",
    long_about = None
)]
struct Cli {
    /// Comma-separated list of target hosts or IP addresses.
    #[arg(long, default_value = "scanme.nmap.org")]
    target: String,

    /// First port of the inclusive scan range.
    #[arg(long = "start-port", default_value_t = 0)]
    start_port: u16,

    /// Last port of the inclusive scan range.
    #[arg(long = "end-port", default_value_t = 100)]
    end_port: u16,

    /// Number of concurrent workers.
    #[arg(long, default_value_t = 100)]
    workers: usize,

    /// Timeout for each connection attempt, in seconds.
    #[arg(long, default_value_t = 1)]
    timeout: u64,

    /// Connection attempts per port before it is declared closed.
    #[arg(long, default_value_t = 2)]
    retries: u32,

    /// Pacing delay between task submissions, in milliseconds.
    #[arg(long = "delay-ms", default_value_t = 100)]
    delay_ms: u64,

    /// Output open-port results in JSON format.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    let hosts = targets::parse_targets(&cli.target)?;
    let range = PortRange::new(cli.start_port, cli.end_port);
    let config = ScanConfig {
        connect_timeout: Duration::from_secs(cli.timeout),
        max_retries: cli.retries,
        worker_count: cli.workers,
        inter_task_delay: Duration::from_millis(cli.delay_ms),
        ..ScanConfig::default()
    };

    let report = run_scan(&hosts, range, &config).await?;

    if cli.json {
        match output::render_json(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("{e:#}");
                return Ok(ExitCode::FAILURE);
            }
        }
    } else {
        let mut stdout = std::io::stdout().lock();
        output::write_summary(&mut stdout, &cli.target, &report)?;
    }

    Ok(ExitCode::SUCCESS)
}
