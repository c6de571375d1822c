use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use hpa_core::ScenarioConfig;
use hpa_sim::{Controller, Evaluation, Series, TickSample, Verdict};
use tracing::{info, warn};

pub fn load_config(path: Option<&Path>) -> anyhow::Result<ScenarioConfig> {
    match path {
        Some(path) => ScenarioConfig::from_file(path)
            .with_context(|| format!("loading scenario {}", path.display())),
        None => Ok(ScenarioConfig::default()),
    }
}

pub fn run(config: Option<&Path>, ticks: u64, format: &str) -> anyhow::Result<()> {
    let scenario = load_config(config)?;
    let mut controller = Controller::new(&scenario, Instant::now())?;
    let samples = controller.simulate(ticks);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&samples)?);
        }
        _ => {
            println!("{}", header());
            for sample in &samples {
                println!("{}", format_sample(sample));
            }
            println!();
            let history = controller.history();
            println!("{}", legend("replicas", &history.replicas));
            println!("{}", legend("pod load", &history.pod_load));
            println!("{}", legend("unmet load", &history.unmet_load));
        }
    }

    Ok(())
}

pub async fn watch(config: Option<&Path>) -> anyhow::Result<()> {
    let scenario = load_config(config)?;
    let mut controller = Controller::new(&scenario, Instant::now())?;
    let interval = controller.settings().tick;

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            return;
        }
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    println!("{}", header());
    hpa_sim::run(&mut controller, interval, shutdown_rx, |sample| {
        println!("{}", format_sample(sample));
    })
    .await;

    Ok(())
}

fn header() -> String {
    format!(
        "{:>6} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}  event",
        "tick", "usage", "replicas", "starting", "running", "stopping", "pod_load", "unmet"
    )
}

fn format_sample(sample: &TickSample) -> String {
    let line = format!(
        "{:>6} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        sample.tick,
        sample.cpu_usage,
        sample.replicas,
        sample.pods.starting,
        sample.pods.running,
        sample.pods.terminating,
        sample.pod_load,
        sample.unmet_load,
    );
    match &sample.evaluation {
        Some(evaluation) => format!("{line}  {}", describe(evaluation)),
        None => line,
    }
}

fn describe(evaluation: &Evaluation) -> String {
    let decision = &evaluation.decision;
    let ratio = decision.usage_ratio;
    match evaluation.resolution.verdict {
        Verdict::Applied => format!(
            "scaled to {} (ratio {ratio:.3})",
            evaluation.resolution.replicas
        ),
        Verdict::WithinTolerance => format!("hold: ratio {ratio:.3} within tolerance"),
        Verdict::Unchanged => format!("hold: already at {}", decision.desired_replicas),
        Verdict::Stabilizing { remaining } => format!(
            "hold: scale-down to {} stabilizing ({}s left)",
            decision.desired_replicas,
            remaining.as_secs()
        ),
    }
}

fn legend(name: &str, series: &Series) -> String {
    match series.stats() {
        Some(stats) => format!(
            "{name:<10} min:{} max:{} current:{}",
            stats.min, stats.max, stats.current
        ),
        None => format!("{name:<10} min:N/A"),
    }
}
