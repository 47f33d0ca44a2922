//! Host tick source: a background thread standing in for the tick
//! interrupt.
//!
//! Sleeps `period_ms` between calls to the tick function.  Sleep jitter
//! means the simulated clock runs slightly slow; nothing in the runtime
//! depends on wall-clock accuracy.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{info, warn};

use crate::drivers::tick_source::TickSource;
use crate::error::{Error, Result};

pub struct ThreadTickSource {
    on_tick: fn(),
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadTickSource {
    /// `on_tick` plays the role of the interrupt handler, typically a
    /// function calling `tick()` on a `static` timer service.
    pub fn new(on_tick: fn()) -> Self {
        Self {
            on_tick,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl TickSource for ThreadTickSource {
    fn start_periodic(&mut self, period_ms: u32) -> Result<()> {
        if period_ms == 0 {
            return Err(Error::Config("tick period must be non-zero"));
        }
        self.stop();

        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);
        let on_tick = self.on_tick;
        let period = Duration::from_millis(u64::from(period_ms));

        let worker = std::thread::Builder::new()
            .name("tick".into())
            .spawn(move || {
                while running.load(Ordering::Acquire) {
                    std::thread::sleep(period);
                    on_tick();
                }
            })
            .map_err(|_| Error::Config("cannot spawn tick thread"))?;
        self.worker = Some(worker);
        info!("ticker(sim): {} ms period", period_ms);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("ticker(sim): tick thread panicked");
            }
        }
    }
}

impl Drop for ThreadTickSource {
    fn drop(&mut self) {
        self.stop();
    }
}
