//! Real-time driver: one tick per interval until shutdown.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::controller::{Controller, TickSample};

/// Tick `controller` every `interval` until `shutdown` flips.
///
/// The first tick fires immediately. `now` is read once per tick from the
/// tokio clock, so paused-time tests see virtual instants. Returns the
/// number of ticks run.
pub async fn run<F>(
    controller: &mut Controller,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut on_tick: F,
) -> u64
where
    F: FnMut(&TickSample),
{
    info!(interval_ms = interval.as_millis() as u64, "simulation started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks = 0u64;

    loop {
        tokio::select! {
            instant = ticker.tick() => {
                let sample = controller.tick(instant.into_std());
                on_tick(&sample);
                ticks += 1;
            }
            _ = shutdown.changed() => {
                info!(ticks, "simulation shutting down");
                break;
            }
        }
    }

    ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use hpa_core::{LoadProfile, ScenarioConfig};

    #[tokio::test(start_paused = true)]
    async fn runs_until_shutdown() {
        let mut config = ScenarioConfig::default();
        config.load = LoadProfile::Constant { usage: 400 };
        let mut controller =
            Controller::new(&config, tokio::time::Instant::now().into_std()).unwrap();

        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(4_500)).await;
            let _ = tx.send(true);
        });

        let mut seen = Vec::new();
        let ticks = run(&mut controller, Duration::from_secs(1), rx, |s| {
            seen.push(s.tick)
        })
        .await;

        // ticks at 0s, 1s, 2s, 3s, 4s
        assert_eq!(ticks, 5);
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(controller.ticks(), 5);
    }
}
