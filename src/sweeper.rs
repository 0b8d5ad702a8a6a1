// Periodic expiry sweeper. Runs `cancel_expired_orders` on the engine from a
// dedicated thread on a fixed tick (nominal period 5 s). The sweep goes through
// the engine's normal cancel path, so it needs no locking of its own and is
// cooperative with every other engine operation.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Sender};
use tracing::{debug, info};

use crate::engine::MatchingEngine;

/// Handle to the background expiry thread. Dropping the handle signals the
/// thread to stop; [`ExpirySweeper::stop`] additionally waits for it to exit.
pub struct ExpirySweeper {
    shutdown: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl ExpirySweeper {
    /// Spawns the sweeper thread, sweeping every `interval`.
    pub fn start(engine: Arc<MatchingEngine>, interval: Duration) -> std::io::Result<Self> {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let handle = thread::Builder::new()
            .name("expiry-sweeper".to_string())
            .spawn(move || {
                info!(interval_ms = interval.as_millis() as u64, "expiry sweeper started");
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(ticker) -> _ => {
                            engine.cancel_expired_orders();
                        }
                        recv(shutdown_rx) -> _ => {
                            debug!("expiry sweeper stopping");
                            break;
                        }
                    }
                }
            })?;
        Ok(Self {
            shutdown: shutdown_tx,
            handle: Some(handle),
        })
    }

    /// Signals the thread to stop and waits for it to exit.
    pub fn stop(mut self) {
        let _ = self.shutdown.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        // A dropped channel also wakes the select, so the thread exits on its own.
        let _ = self.shutdown.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Order, OrderType, Side};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_sweeper_cancels_expired_orders() {
        let engine = Arc::new(MatchingEngine::new());
        let expired = Order::new(
            Uuid::new_v4(),
            "BTC-USD",
            Side::Buy,
            OrderType::Limit,
            9_900,
            5,
            "alice",
        )
        .with_expiry(Utc::now().timestamp() - 10);
        let id = expired.id;
        engine.add_order(expired);
        assert!(engine.get_order(id).is_some());

        let sweeper = ExpirySweeper::start(engine.clone(), Duration::from_millis(20))
            .expect("sweeper thread");
        // Give the ticker a few periods to fire.
        thread::sleep(Duration::from_millis(200));
        sweeper.stop();

        assert!(engine.get_order(id).is_none());
        assert_eq!(engine.best_bid("BTC-USD"), 0);
    }

    #[test]
    fn test_stop_joins_cleanly() {
        let engine = Arc::new(MatchingEngine::new());
        let sweeper =
            ExpirySweeper::start(engine, Duration::from_millis(10)).expect("sweeper thread");
        thread::sleep(Duration::from_millis(30));
        sweeper.stop();
    }
}
