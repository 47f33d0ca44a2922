//! Fuzz target: timeout registry under arbitrary register / cancel / tick
//! sequences.
//!
//! Verifies:
//! - No panics for any operation order or delay
//! - Pending count never exceeds capacity
//! - Every handler runs at most once per successful registration
//! - A cancelled registration never runs
//!
//! cargo fuzz run fuzz_timeout_registry

#![no_main]

use std::sync::atomic::{AtomicU32, Ordering};

use libfuzzer_sys::fuzz_target;
use maquina::action::{Action, ActionResult};
use maquina::timer::{TimeoutId, TimeoutRegistry};

const SLOTS: usize = 4;

struct Counter(AtomicU32);

impl Action for Counter {
    fn execute(&self) -> ActionResult {
        self.0.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let handlers: [Counter; SLOTS] = core::array::from_fn(|_| Counter(AtomicU32::new(0)));
    let registry: TimeoutRegistry<'_, SLOTS> = TimeoutRegistry::new();
    let mut now: u32 = u32::MAX - 64;
    let mut live: Vec<(TimeoutId, usize)> = Vec::new();
    let mut registered = [0u32; SLOTS];

    for chunk in data.chunks(2) {
        let op = chunk[0];
        let arg = chunk.get(1).copied().unwrap_or(0);
        match op % 3 {
            0 => {
                let which = usize::from(arg) % SLOTS;
                let delay = u32::from(arg >> 2);
                if let Ok(id) = registry.register(now, delay, &handlers[which]) {
                    registered[which] += 1;
                    live.push((id, which));
                }
            }
            1 => {
                if !live.is_empty() {
                    let (id, which) = live.swap_remove(usize::from(arg) % live.len());
                    if registry.cancel(id) {
                        registered[which] -= 1;
                    }
                }
            }
            _ => {
                for _ in 0..=(arg % 8) {
                    now = now.wrapping_add(1);
                    registry.scan(now);
                }
                live.retain(|(id, _)| registry.is_pending(*id));
            }
        }
        assert!(registry.pending() <= SLOTS);
    }

    for (counter, armed) in handlers.iter().zip(registered) {
        assert!(counter.0.load(Ordering::Relaxed) <= armed);
    }
});
