//! Tiltdrive firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  UartTransport    MotorAdapter    LogEventSink   NvsConfigStore│
//! │  (Transport)      (ActuatorPort)  (EventSink)    (ConfigPort)  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  StreamReadLoop ──▶ RoverService (pure logic)          │    │
//! │  │  Parser · Tracker · Navigation                         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Button thread ──▶ CommandQueue ──▶ read loop (between reads)  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::{Duration, Instant};

use anyhow::Result;
use log::{info, warn};

use tiltdrive::adapters::config_store::NvsConfigStore;
use tiltdrive::adapters::log_sink::LogEventSink;
use tiltdrive::adapters::motor::MotorAdapter;
use tiltdrive::adapters::uart_transport::UartTransport;
use tiltdrive::app::ports::ConfigPort;
use tiltdrive::app::service::RoverService;
use tiltdrive::config::RoverConfig;
use tiltdrive::drivers::button::CalibrateButton;
use tiltdrive::drivers::{hw_init, task_pin};
use tiltdrive::error::Error;
use tiltdrive::pins;
use tiltdrive::telemetry::channels::{CancelToken, CommandQueue};
use tiltdrive::telemetry::read_loop::StreamReadLoop;
use tiltdrive::telemetry::transport::Transport;

static CANCEL: CancelToken = CancelToken::new();
static COMMANDS: CommandQueue = CommandQueue::new();

const BUTTON_POLL: Duration = Duration::from_millis(10);

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Tiltdrive v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let config = load_config().unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        RoverConfig::default()
    });
    let json = serde_json::to_string(&config).map_err(|e| anyhow::anyhow!("config encode: {e}"))?;
    info!("Config: {}", json);

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals(&config.link).map_err(Error::from)?;

    // ── 4. Calibration button thread ──────────────────────────
    task_pin::spawn_on_core(task_pin::Core::Pro, 5, 4, "button\0", || {
        let mut button = CalibrateButton::new(pins::CALIBRATE_BUTTON_GPIO);
        let boot = Instant::now();
        loop {
            let now_ms = boot.elapsed().as_millis() as u32;
            if let Some(gesture) = button.poll(now_ms) {
                info!("Button: {:?}", gesture);
                COMMANDS.submit(gesture.command());
            }
            std::thread::sleep(BUTTON_POLL);
        }
    })?;

    // ── 5. Adapters + service ─────────────────────────────────
    let mut motors = MotorAdapter::with_board_wiring();
    let mut sink = LogEventSink::new();
    let mut transport = UartTransport::new(config.link.uart_port);
    let mut service = RoverService::new(config);
    let mut read_loop = StreamReadLoop::new(&service, &CANCEL, &COMMANDS);

    info!("System ready. Entering read loop.");

    // ── 6. Read loop on a local executor ──────────────────────
    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
    let outcome = futures_lite::future::block_on(executor.run(read_loop.run(
        &mut transport,
        &mut service,
        &mut motors,
        &mut sink,
    )));

    transport.close();
    motors.all_off();

    let stats = read_loop.stats();
    let parsed = read_loop.parser_stats();
    info!(
        "Read loop done: {} reads, {} bytes, {} samples, {} skipped fields",
        stats.reads, stats.bytes, parsed.samples, parsed.skipped
    );

    let exit = outcome?;
    info!("Exit: {:?}", exit);
    Ok(())
}

fn load_config() -> tiltdrive::error::Result<RoverConfig> {
    let store = NvsConfigStore::new()?;
    Ok(store.load()?)
}
