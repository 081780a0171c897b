//! wedo-sim: run a block script against a simulated WeDo 2.0 hub.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  script (JSON) ──▶ WeDo2Blocks ──▶ Hub ──▶ SimSession    │
//! │                         ▲           │                    │
//! │                         │      ManualClock (simulated)   │
//! │                    LogEventSink ◀───┘                    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Time is simulated: each block's completion is stepped through in
//! fixed ticks so motor timers fire exactly as they would on a host loop.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use wedo_hub::adapters::log_sink::LogEventSink;
use wedo_hub::adapters::sim_session::SimSession;
use wedo_hub::adapters::time::ManualClock;
use wedo_hub::app::commands::{BlockCommand, TiltDirectionAny};
use wedo_hub::app::service::WeDo2Blocks;
use wedo_hub::config::HubConfig;
use wedo_hub::device::Hub;
use wedo_hub::protocol::codec::{DeviceKind, PortId};

/// Host loop period in simulated milliseconds.
const TICK_MS: u64 = 10;

const DEMO_SCRIPT: &str = r#"[
    { "opcode": "setLightHue", "HUE": 33 },
    { "opcode": "motorOnFor", "MOTOR_ID": "motor A", "DURATION": 1 },
    { "opcode": "setMotorDirection", "MOTOR_ID": "motor", "MOTOR_DIRECTION": "reverse" },
    { "opcode": "startMotorPower", "MOTOR_ID": "motor A", "POWER": 60 },
    { "opcode": "playNoteFor", "NOTE": 72, "DURATION": 0.5 },
    { "opcode": "motorOff", "MOTOR_ID": "all motors" },
    { "opcode": "stopAll" }
]"#;

#[derive(Parser)]
#[command(author, version, about = "Run a WeDo 2.0 block script against a simulated hub")]
struct Cli {
    /// Block script: a JSON array of blocks. Runs a built-in demo when omitted.
    #[arg(long)]
    script: Option<PathBuf>,
    /// Hub configuration overrides (JSON).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Peripheral plugged into port A.
    #[arg(long, value_enum, default_value_t = Peripheral::Motor)]
    port_a: Peripheral,
    /// Peripheral plugged into port B.
    #[arg(long, value_enum, default_value_t = Peripheral::Distance)]
    port_b: Peripheral,
    /// Distance reading reported by a distance sensor.
    #[arg(long, default_value_t = 40)]
    distance: u8,
    /// Log filter, env_logger syntax.
    #[arg(long, default_value = "info")]
    log: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Peripheral {
    None,
    Motor,
    Tilt,
    Distance,
    Led,
    Piezo,
}

impl Peripheral {
    fn kind(self) -> Option<DeviceKind> {
        match self {
            Self::None => None,
            Self::Motor => Some(DeviceKind::Motor),
            Self::Tilt => Some(DeviceKind::Tilt),
            Self::Distance => Some(DeviceKind::Distance),
            Self::Led => Some(DeviceKind::Led),
            Self::Piezo => Some(DeviceKind::Piezo),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new().parse_filters(&cli.log).init();

    let config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            HubConfig::from_json(&json)
                .with_context(|| format!("{} is not a valid hub config", path.display()))?
        }
        None => HubConfig::default(),
    };

    let script_json = match &cli.script {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?,
        None => DEMO_SCRIPT.to_owned(),
    };
    let script: Vec<BlockCommand> =
        serde_json::from_str(&script_json).context("script is not a valid block list")?;

    let clock = ManualClock::new();
    let mut sink = LogEventSink::new();
    let mut hub = Hub::new(SimSession::new(), clock.clone(), config);
    hub.connect(&mut sink).context("connect failed")?;
    hub.require_connected()?;

    for (port, peripheral) in [(PortId::A, cli.port_a), (PortId::B, cli.port_b)] {
        if let Some(kind) = peripheral.kind() {
            hub.session().attach(port, kind as u8);
        }
    }
    hub.tick(&mut sink);
    for port in PortId::ALL {
        match hub.port_kind(port) {
            Some(DeviceKind::Distance) => {
                hub.session().sensor_value(port, &[cli.distance]);
            }
            Some(DeviceKind::Tilt) => {
                hub.session().sensor_value(port, &[0, 0]);
            }
            _ => {}
        }
    }
    hub.tick(&mut sink);

    let mut blocks = WeDo2Blocks::new(hub);
    for (step, command) in script.into_iter().enumerate() {
        let completion = blocks.execute(command.clone());
        let wait_ms = completion.wait.as_millis() as u64;
        let mut waited = 0;
        while waited < wait_ms {
            clock.advance(TICK_MS);
            waited += TICK_MS;
            blocks.hub_mut().tick(&mut sink);
        }
        println!(
            "[{:>6} ms] #{step:<2} {:<60} yield={wait_ms}ms",
            blocks.hub().now_ms(),
            format!("{command:?}"),
        );
        report(&blocks);
    }

    // Let any brake timers run out.
    for _ in 0..(blocks.hub().config().brake_time_ms / TICK_MS + 1) {
        clock.advance(TICK_MS);
        blocks.hub_mut().tick(&mut sink);
    }

    let mut hub = blocks.into_hub();
    let writes = hub.session().writes().len();
    hub.disconnect(&mut sink);
    info!("sim: {} writes, {} events", writes, sink.emitted());
    Ok(())
}

fn report(blocks: &WeDo2Blocks<SimSession, ManualClock>) {
    let hub = blocks.hub();
    for port in PortId::ALL {
        if let Some(motor) = hub.motor(port) {
            println!(
                "           {port}: {:?} power={} {:?}",
                motor.state(),
                motor.power(),
                motor.direction()
            );
        }
    }
    println!(
        "           distance={} tilted={} writes={}",
        blocks.get_distance(),
        blocks.is_tilted(TiltDirectionAny::Any),
        hub.session().writes().len()
    );
}
