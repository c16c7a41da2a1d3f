use std::sync::Arc;
use std::time::Duration;
use transfer_monitor::presenter::format::{format_bytes, format_duration, format_speed};
use transfer_monitor::{
    JobKind, MonitorConfig, Remote, RemoteStore, RenderSurface, TransferFile, TransferJob,
    TransferMonitor, DEFAULT_RC_URL,
};

/// Prints chart updates to stdout instead of drawing them
struct ConsoleSurface;

impl RenderSurface for ConsoleSurface {
    fn render_speed_series(&mut self, samples: &[f64]) {
        if let Some(speed) = samples.last() {
            println!("  speed: {} ({} samples)", format_speed(*speed), samples.len());
        }
    }

    fn render_progress_series(&mut self, samples: &[f64]) {
        if let Some(pct) = samples.last() {
            println!("  progress: {pct:.0}%");
        }
    }

    fn render_transfers(&mut self, rows: &[TransferFile]) {
        for row in rows {
            println!(
                "  {} - {} / {} eta {}",
                row.name,
                format_bytes(row.bytes),
                format_bytes(row.size),
                row.eta.map(format_duration).unwrap_or_else(|| "-".into()),
            );
        }
    }

    fn teardown(&mut self) {
        println!("Surface released");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let jobid: u64 = match args.next().map(|a| a.parse()) {
        Some(Ok(id)) => id,
        _ => {
            eprintln!("Usage: monitor-demo <jobid> [remote-name] [rc-url]");
            std::process::exit(2);
        }
    };
    let remote_name = args.next().unwrap_or_else(|| "remote".to_string());
    let rc_url = args.next().unwrap_or_else(|| DEFAULT_RC_URL.to_string());

    println!("Watching job {jobid} on {rc_url}");

    let client = Arc::new(transfer_monitor::RcClient::new(rc_url, None));
    let store = Arc::new(RemoteStore::new(Remote::new(remote_name.clone())));
    let monitor = TransferMonitor::new(client, store.clone(), MonitorConfig::default());

    monitor.attach_surface(Box::new(ConsoleSurface)).await;
    monitor
        .job_started(TransferJob::new(jobid, JobKind::Sync, remote_name, "", ""))
        .await;
    monitor.start_polling();

    // Follow the shared snapshot until the operation leaves Active
    let mut updates = store.subscribe();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let phase = updates.borrow().op(JobKind::Sync).phase;
                if phase.is_terminal() {
                    println!("Job ended: {phase:?}");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Interrupted, stopping");
                monitor.stop().await;
                break;
            }
        }
    }

    if let Some(stats) = monitor.latest_stats().await {
        println!(
            "Final: {} of {} at {}",
            format_bytes(stats.bytes),
            format_bytes(stats.total_bytes),
            format_speed(stats.speed),
        );
    }

    monitor.shutdown().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    Ok(())
}
