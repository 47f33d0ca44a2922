//! Maquina host simulation: a blinking LED driven entirely by timeouts.
//!
//! ```text
//! ┌──────────────┐  1 ms   ┌──────────────┐  due   ┌──────────────────┐
//! │ tick thread  │────────▶│ TimerService │───────▶│ DispatchAction   │
//! │ (SysTick)    │         │   (TIMER)    │        │ EXPIRED / STOP   │
//! └──────────────┘         └──────────────┘        └────────┬─────────┘
//!                                 ▲                         │
//!                       re-arm    │           Expired, Stop │
//!                                 │                         ▼
//!                          ┌──────┴───────┐          ┌──────────┐
//!                          │   BLINKER    │◀─────────│  QUEUE   │
//!                          │ (Maquina)    │   pump   └──────────┘
//!                          └──────┬───────┘
//!                                 │ PinAction
//!                                 ▼
//!                           SimPin "led"
//! ```
//!
//! Usage: `maquina-sim [config.json]`.  Set `RUST_LOG=debug` to trace
//! every transition and timeout.

#![deny(unused_must_use)]

use core::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use log::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use maquina::action::{Action, ActionResult, DispatchAction, PinAction, PinLevel};
use maquina::adapters::{SimPin, ThreadTickSource};
use maquina::config::SystemConfig;
use maquina::drivers::pin_bank::{PinBank, PinHandle};
use maquina::events::{Event, EventQueue};
use maquina::fsm::{Maquina, SharedMachine, Transition, validate_table};
use maquina::timer::TimerService;

// ── Events and states ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Blink {
    Nulo,
    Expired,
    Stop,
}

impl Event for Blink {
    const NULL: Self = Blink::Nulo;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Led {
    Off,
    On,
    Stopped,
}

// ── Re-arming action ──────────────────────────────────────────

/// Registers `handler` with [`TIMER`] again, `delay_ms` from now.
struct Rearm {
    delay_ms: AtomicU32,
    handler: &'static dyn Action,
}

impl Rearm {
    const fn new(handler: &'static dyn Action) -> Self {
        Self {
            delay_ms: AtomicU32::new(0),
            handler,
        }
    }

    fn set_delay(&self, ms: u32) {
        self.delay_ms.store(ms, Ordering::Relaxed);
    }
}

impl Action for Rearm {
    fn execute(&self) -> ActionResult {
        TIMER
            .register_timeout(self.delay_ms.load(Ordering::Relaxed), self.handler)
            .map(|_| ())
    }
}

// ── Static wiring ─────────────────────────────────────────────

static TIMER: TimerService<'static, 4> = TimerService::new();
static QUEUE: EventQueue<Blink, 8> = EventQueue::new();

const LED_PIN: PinHandle = PinHandle(0);
static PINS: PinBank<SimPin, 1> = PinBank::new([SimPin::new("led")]);
static LED_HIGH: PinAction<'static, SimPin, 1> = PinAction::new(&PINS, LED_PIN, PinLevel::High);
static LED_LOW: PinAction<'static, SimPin, 1> = PinAction::new(&PINS, LED_PIN, PinLevel::Low);

/// Defers `Expired` to the main loop.
static EXPIRED: DispatchAction<'static, Blink> = DispatchAction::new();
/// Defers `Stop` too; the tick thread never touches the machine while the
/// main loop may be driving it.
static STOP: DispatchAction<'static, Blink> = DispatchAction::new();

static ARM_ON: Rearm = Rearm::new(&EXPIRED);
static ARM_OFF: Rearm = Rearm::new(&EXPIRED);

static TURN_ON: [&dyn Action; 2] = [&LED_HIGH, &ARM_ON];
static TURN_OFF: [&dyn Action; 2] = [&LED_LOW, &ARM_OFF];
static HALT: [&dyn Action; 1] = [&LED_LOW];

static TABLE: [Transition<'static, Led, Blink>; 4] = [
    Transition::new(Led::Off, Blink::Expired, Led::On, &TURN_ON),
    Transition::new(Led::On, Blink::Expired, Led::Off, &TURN_OFF),
    Transition::new(Led::On, Blink::Stop, Led::Stopped, &HALT),
    Transition::new(Led::Off, Blink::Stop, Led::Stopped, &[]),
];

static BLINKER: SharedMachine<'static, Led, Blink> =
    SharedMachine::new(Maquina::new("blinker", &TABLE, Led::Off));

fn on_tick() {
    TIMER.tick();
}

// ── Main ──────────────────────────────────────────────────────

fn load_config() -> Result<SystemConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(SystemConfig::default());
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    SystemConfig::from_json(&text).with_context(|| format!("parsing {path}"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .compact()
        .init();

    info!("maquina-sim v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    config.validate()?;
    info!(
        "config: on {} ms, off {} ms, run {} ms (SysTick reload {} at {} Hz)",
        config.blink_on_ms,
        config.blink_off_ms,
        config.sim_run_ms,
        config.systick_reload()?,
        config.core_clock_hz
    );

    validate_table(&TABLE)?;
    EXPIRED.init(Blink::Expired, &QUEUE)?;
    STOP.init(Blink::Stop, &QUEUE)?;
    ARM_ON.set_delay(config.blink_on_ms);
    ARM_OFF.set_delay(config.blink_off_ms);

    let mut ticker = ThreadTickSource::new(on_tick);
    TIMER.init(&mut ticker)?;
    TIMER.register_timeout(config.blink_off_ms, EXPIRED.as_action())?;
    TIMER.register_timeout(config.sim_run_ms, STOP.as_action())?;

    // Sleep jitter makes the simulated clock run slow; allow for it before
    // declaring the run stuck.
    let give_up = Duration::from_millis(u64::from(config.sim_run_ms) * 4 + 1_000);
    let started = std::time::Instant::now();

    while BLINKER.state() != Some(Led::Stopped) {
        QUEUE.pump_into(&BLINKER);
        if started.elapsed() > give_up {
            TIMER.shutdown(&mut ticker);
            bail!("blinker did not stop within {:?}", give_up);
        }
        std::thread::sleep(Duration::from_millis(1));
    }

    TIMER.shutdown(&mut ticker);

    let (taken, rejected) = BLINKER.with(|m| (m.transitions_taken(), m.events_rejected()))?;
    let edges = PINS.with_pin(LED_PIN, |pin| pin.edges())?;
    info!(
        "done: {} transitions, {} rejected, {} LED edges, last Expired dispatch {:?}, queue holds {}",
        taken,
        rejected,
        edges,
        EXPIRED.status(),
        QUEUE.len()
    );
    Ok(())
}
