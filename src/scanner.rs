use crate::config::ScanConfig;
use crate::targets::PortRange;
use crate::types::{ScanReport, ScanResult, ScanTask};
use anyhow::Result;
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{self, AsyncReadExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use ::time::{format_description::well_known, OffsetDateTime};

/// Upper bound on a single banner read.
const BANNER_BUFFER_SIZE: usize = 1024;

/// Scan every (host, port) pair in `targets` x `range` with a fixed pool of
/// concurrent workers.
///
/// - Tasks flow through a bounded queue; results through an unbounded sink.
/// - Each probe retries up to `config.max_retries` times with exponential
///   backoff before the port is declared closed.
/// - Returns only once every submitted task has produced exactly one result.
///
/// The only error path is config validation; every network failure is
/// absorbed into the returned results.
pub async fn run_scan(
    targets: &[String],
    range: PortRange,
    config: &ScanConfig,
) -> Result<ScanReport> {
    scan_internal(targets, range, config, CancellationToken::new()).await
}

/// Variant that accepts a `CancellationToken`. Cancelling stops task
/// generation and closes the queue early; tasks already dequeued still run
/// to completion and their results are still collected.
pub async fn run_scan_with_cancel(
    targets: &[String],
    range: PortRange,
    config: &ScanConfig,
    cancel: CancellationToken,
) -> Result<ScanReport> {
    scan_internal(targets, range, config, cancel).await
}

async fn scan_internal(
    targets: &[String],
    range: PortRange,
    config: &ScanConfig,
    cancel: CancellationToken,
) -> Result<ScanReport> {
    config.validate()?;

    let started = Instant::now();
    let started_at = now_rfc3339();

    // Bounded task queue, capacity matching the pool so the generator blocks
    // once every worker is busy and the buffer is full.
    let (task_tx, task_rx) = mpsc::channel::<ScanTask>(config.worker_count);
    let (result_tx, mut result_rx) = mpsc::unbounded_channel::<ScanResult>();
    let task_rx = Arc::new(Mutex::new(task_rx));

    let mut workers = JoinSet::new();
    for _ in 0..config.worker_count {
        let rx = Arc::clone(&task_rx);
        let tx = result_tx.clone();
        let cfg = config.clone();
        workers.spawn(async move {
            loop {
                // Lock held only across the dequeue, never across a probe.
                let task = { rx.lock().await.recv().await };
                let Some(task) = task else { break };
                let result = probe(&task, &cfg).await;
                if tx.send(result).is_err() {
                    break;
                }
            }
        });
    }
    // Workers now hold the only sender clones; the sink closes when the last
    // worker exits, so the drain loop below cannot miss a result or hang.
    drop(result_tx);

    let generator = {
        let targets = targets.to_vec();
        let cfg = config.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { generate_tasks(&targets, range, &cfg, &cancel, task_tx).await })
    };

    let mut total_scanned = 0u64;
    let mut open = Vec::new();
    while let Some(result) = result_rx.recv().await {
        total_scanned += 1;
        if result.open {
            open.push(result);
        }
    }

    while workers.join_next().await.is_some() {}
    let _ = generator.await;

    debug!(
        "scan finished: {} results, {} open, {:?} elapsed",
        total_scanned,
        open.len(),
        started.elapsed()
    );

    Ok(ScanReport {
        total_scanned,
        open,
        elapsed_ms: started.elapsed().as_millis() as u64,
        started_at,
    })
}

/// Enqueue one task per (host, port) pair, host-major and port-minor, with a
/// fixed pacing delay between enqueues. Dropping the sender on return is
/// what closes the queue and lets idle workers exit.
async fn generate_tasks(
    targets: &[String],
    range: PortRange,
    config: &ScanConfig,
    cancel: &CancellationToken,
    task_tx: mpsc::Sender<ScanTask>,
) {
    for host in targets {
        for port in range.iter() {
            if cancel.is_cancelled() {
                debug!("task generation cancelled at {host}:{port}");
                return;
            }
            debug!("enqueue {host}:{port}");
            if task_tx.send(ScanTask::new(host.clone(), port)).await.is_err() {
                return;
            }
            if !config.inter_task_delay.is_zero() {
                time::sleep(config.inter_task_delay).await;
            }
        }
    }
}

/// Probe a single task: retried connect plus one best-effort banner read.
/// Never fails; all network trouble collapses into `open = false`.
pub async fn probe(task: &ScanTask, config: &ScanConfig) -> ScanResult {
    for attempt in 0..config.max_retries {
        match connect(task, config.connect_timeout).await {
            Ok(mut stream) => {
                let banner = read_banner(&mut stream, config.connect_timeout).await;
                debug!(
                    "{}:{} open after {} attempt(s)",
                    task.host,
                    task.port,
                    attempt + 1
                );
                return ScanResult::open(task, banner);
            }
            Err(e) => {
                debug!("{}:{} attempt {} failed: {e}", task.host, task.port, attempt + 1);
                // No trailing sleep once the final attempt has failed.
                if attempt + 1 < config.max_retries {
                    time::sleep(config.backoff_for_attempt(attempt)).await;
                }
            }
        }
    }
    ScanResult::closed(task)
}

/// Connect to `host:port` bounded by `timeout`. Host strings resolve via
/// `ToSocketAddrs`, so a hostname that fails to resolve surfaces here as an
/// ordinary connect failure.
async fn connect(task: &ScanTask, timeout: Duration) -> io::Result<TcpStream> {
    match time::timeout(timeout, TcpStream::connect((task.host.as_str(), task.port))).await {
        Ok(res) => res,
        Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "connect timed out")),
    }
}

/// One bounded read immediately after connect. Zero bytes, a read error, or
/// a deadline miss all mean "no banner" -- a successful connect is already
/// authoritative for openness.
async fn read_banner(stream: &mut TcpStream, deadline: Duration) -> Option<String> {
    let mut buf = vec![0u8; BANNER_BUFFER_SIZE];
    match time::timeout(deadline, stream.read(&mut buf)).await {
        Ok(Ok(n)) if n > 0 => {
            buf.truncate(n);
            Some(String::from_utf8_lossy(&buf).to_string())
        }
        _ => None,
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
