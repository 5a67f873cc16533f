//! Desktop simulator for the tbsense radio bridge.
//!
//! Runs tbsense-core against synthetic hardware and plays a scripted peer
//! session in real time, so the notification cadence and the LED command path
//! can be watched without a board or a phone.
//!
//! ```text
//! RUST_LOG=debug cargo run -p tbsense-simulator [config.bin]
//! ```
//!
//! The optional argument is a postcard-encoded `BridgeConfig`.

use std::process;
use std::time::{Duration as StdDuration, Instant};

use embassy_futures::block_on;
use embassy_time::Duration;
use log::{error, info, warn};

use tbsense_core::cadence::TickTimer;
use tbsense_core::events::{
    ButtonId, ButtonState, Characteristic, CharacteristicStatus, ClientConfig,
};
use tbsense_core::led::{LedActuator, LedState};
use tbsense_core::radio::{
    AdvertisingHandle, AdvertisingTiming, BdAddr, Connectability, ConnectionHandle,
    Discoverability, Radio, StackError,
};
use tbsense_core::sensors::{
    EnvironmentSample, EnvironmentSensor, MotionSample, MotionSensor, SensorError,
};
use tbsense_core::telemetry::{TELEMETRY_LEN, TelemetryFrame};
use tbsense_core::{Bridge, BridgeConfig, BridgeEvent, EventQueue, Peripherals};

// ---------------------------------------------------------------------------
// Session constants
// ---------------------------------------------------------------------------

/// Main loop step.
const FRAME_DURATION: StdDuration = StdDuration::from_millis(5);

const PEER: ConnectionHandle = ConnectionHandle(1);

/// Identity address reported by the fake controller.
const SIM_ADDRESS: BdAddr = BdAddr([0x5A, 0x3C, 0x21, 0x0B, 0x57, 0x58]);

// ---------------------------------------------------------------------------
// Synthetic hardware
// ---------------------------------------------------------------------------

/// IMU that either sits still with a little sensor noise or sways.
struct SyntheticImu {
    started: Instant,
    moving: bool,
}

impl SyntheticImu {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            moving: false,
        }
    }
}

impl MotionSensor for SyntheticImu {
    async fn read(&mut self) -> Result<MotionSample, SensorError> {
        let t = self.started.elapsed().as_secs_f64();

        // A few counts of noise; the 64-count quantization should hide it
        let noise = (12.0 * (t * 47.0).sin()) as i16;

        let (x, y) = if self.moving {
            (
                (1500.0 * (t * 3.0).sin()) as i16 + noise,
                (900.0 * (t * 2.0).cos()) as i16 - noise,
            )
        } else {
            (noise, -noise)
        };

        Ok(MotionSample {
            orientation: [0, 0, 0],
            acceleration: [x, y, 1000 + noise],
        })
    }
}

/// Humidity/temperature that drift slowly like a room.
struct SyntheticRht {
    started: Instant,
}

impl EnvironmentSensor for SyntheticRht {
    async fn read(&mut self) -> Result<EnvironmentSample, SensorError> {
        let t = self.started.elapsed().as_secs_f64();

        // Temperature: 22-24 °C
        let temperature = 23.0 + 1.0 * (t / 7.0).sin();

        // Humidity: 40-50 %
        let humidity = 45.0 + 5.0 * (t / 11.0).cos();

        Ok(EnvironmentSample {
            humidity_milli_percent: (humidity * 1000.0) as u32,
            temperature_milli_celsius: (temperature * 1000.0) as i32,
        })
    }
}

struct ConsoleLed;

impl LedActuator for ConsoleLed {
    fn apply(&mut self, state: &LedState) {
        info!(
            "LED mask {:04b} colour #{:02x}{:02x}{:02x}",
            state.enabled_mask(),
            state.red,
            state.green,
            state.blue
        );
    }
}

/// Stands in for the BLE stack: accepts every command and prints what a
/// connected peer would receive.
struct ConsoleRadio {
    started: Instant,
    notifications: usize,
}

impl ConsoleRadio {
    fn print(&self, kind: &str, value: &[u8]) {
        let hex: Vec<String> = value.iter().map(|b| format!("{:02x}", b)).collect();
        println!(
            "[{:>7.3}s] {:<6} {}",
            self.started.elapsed().as_secs_f64(),
            kind,
            hex.join(" ")
        );

        if let Ok(bytes) = <&[u8; TELEMETRY_LEN]>::try_from(value) {
            let frame = TelemetryFrame::from_bytes(bytes);
            info!(
                "  accel ({}, {}) buttons {:?} {} m°C {} m%",
                frame.accel_x, frame.accel_y, frame.buttons, frame.temperature, frame.humidity
            );
        }
    }
}

impl Radio for ConsoleRadio {
    fn identity_address(&mut self) -> Result<BdAddr, StackError> {
        Ok(SIM_ADDRESS)
    }

    fn write_attribute(
        &mut self,
        characteristic: Characteristic,
        value: &[u8],
    ) -> Result<(), StackError> {
        info!("Attribute {:?} = {:02x?}", characteristic, value);
        Ok(())
    }

    fn create_advertising_set(&mut self) -> Result<AdvertisingHandle, StackError> {
        Ok(AdvertisingHandle(0))
    }

    fn set_advertising_timing(
        &mut self,
        handle: AdvertisingHandle,
        timing: AdvertisingTiming,
    ) -> Result<(), StackError> {
        info!("Advertising set {:?}: {:?}", handle, timing);
        Ok(())
    }

    fn start_advertising(
        &mut self,
        handle: AdvertisingHandle,
        discoverability: Discoverability,
        connectability: Connectability,
    ) -> Result<(), StackError> {
        info!(
            "Advertising on {:?} ({:?}, {:?})",
            handle, discoverability, connectability
        );
        Ok(())
    }

    fn send_notification(
        &mut self,
        _connection: ConnectionHandle,
        _characteristic: Characteristic,
        value: &[u8],
    ) -> Result<(), StackError> {
        self.notifications += 1;
        self.print("NOTIFY", value);
        Ok(())
    }

    fn send_read_response(
        &mut self,
        _connection: ConnectionHandle,
        _characteristic: Characteristic,
        value: &[u8],
    ) -> Result<(), StackError> {
        self.print("READ", value);
        Ok(())
    }

    fn send_write_response(
        &mut self,
        _connection: ConnectionHandle,
        _characteristic: Characteristic,
        att_error: u8,
    ) -> Result<(), StackError> {
        info!("Write response 0x{:02x}", att_error);
        Ok(())
    }
}

/// Tick timer driven by the main loop's clock.
#[derive(Default)]
struct VirtualTimer {
    period: Option<StdDuration>,
}

impl TickTimer for VirtualTimer {
    fn start(&mut self, period: Duration) -> Result<(), StackError> {
        self.period = Some(StdDuration::from_micros(period.as_micros()));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), StackError> {
        self.period = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scripted session
// ---------------------------------------------------------------------------

enum Step {
    Event(BridgeEvent),
    Motion(bool),
}

fn status(config: ClientConfig) -> BridgeEvent {
    BridgeEvent::CharacteristicStatus {
        connection: PEER,
        characteristic: Characteristic::Rx,
        status: CharacteristicStatus::ClientConfig(config),
    }
}

fn button(button: ButtonId, state: ButtonState) -> BridgeEvent {
    BridgeEvent::Button { button, state }
}

/// Control write; every payload here fits in one ATT write.
fn control(bytes: &[u8]) -> Option<BridgeEvent> {
    BridgeEvent::write(PEER, Characteristic::Tx, bytes)
}

/// `(milliseconds since start, step)` in playback order.
fn script() -> Vec<(u64, Step)> {
    let mut steps = vec![
        (0, Step::Event(BridgeEvent::Boot)),
        (300, Step::Event(BridgeEvent::ConnectionOpened { connection: PEER })),
        (
            400,
            Step::Event(BridgeEvent::ReadRequest {
                connection: PEER,
                characteristic: Characteristic::Rx,
            }),
        ),
        (500, Step::Event(status(ClientConfig::Notification))),
        // Still board: one forced refresh per 21 ticks
        (2_500, Step::Motion(true)),
        (4_000, Step::Motion(false)),
        (4_500, Step::Event(button(ButtonId::Button0, ButtonState::Pressed))),
        (4_700, Step::Event(button(ButtonId::Button0, ButtonState::Released))),
        (5_000, Step::Event(button(ButtonId::Button1, ButtonState::Pressed))),
        (5_200, Step::Event(button(ButtonId::Button1, ButtonState::Released))),
    ];

    let writes: [(u64, &[u8]); 5] = [
        (5_500, &[0x02, 0x00, 0x40, 0x80]),
        (5_600, &[0x01, 0x04, 0x01]),
        (6_000, &[0x01, 0x01, 0x00]),
        // Truncated LED_CONTROL, rejected with 0x01
        (6_200, &[0x01, 0x00]),
        (6_400, &[0x09]),
    ];
    steps.extend(
        writes
            .iter()
            .filter_map(|&(at, bytes)| control(bytes).map(|event| (at, Step::Event(event)))),
    );

    steps.extend([
        (6_800, Step::Event(status(ClientConfig::Disabled))),
        (7_300, Step::Event(status(ClientConfig::Notification))),
        (8_500, Step::Event(BridgeEvent::ConnectionClosed { connection: PEER })),
    ]);

    steps.sort_by_key(|(at, _)| *at);
    steps
}

/// How long to keep running after the last scripted step.
const TAIL: StdDuration = StdDuration::from_millis(500);

fn load_config() -> BridgeConfig {
    let Some(path) = std::env::args().nth(1) else {
        return BridgeConfig::default();
    };

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Cannot read config {}: {}", path, e);
            process::exit(2);
        }
    };
    match BridgeConfig::from_bytes(&bytes) {
        Ok(config) => {
            info!("Loaded config from {}", path);
            config
        }
        Err(e) => {
            error!("Invalid config {}: {}", path, e);
            process::exit(2);
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting tbsense simulator");

    let config = load_config();
    let started = Instant::now();

    let mut bridge = Bridge::new(
        config,
        Peripherals {
            motion: SyntheticImu::new(),
            environment: SyntheticRht { started },
            led: ConsoleLed,
            radio: ConsoleRadio {
                started,
                notifications: 0,
            },
            timer: VirtualTimer::default(),
        },
    );
    bridge.init();

    let queue = EventQueue::new();
    let mut pending = script().into_iter().peekable();
    let mut last_tick = started;
    let mut end = None;

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    loop {
        let frame_start = Instant::now();
        let elapsed = started.elapsed();

        // --- Scripted peer ------------------------------------------------
        while let Some((at, _)) = pending.peek() {
            if StdDuration::from_millis(*at) > elapsed {
                break;
            }
            let Some((_, step)) = pending.next() else {
                break;
            };
            match step {
                Step::Event(event) => {
                    if queue.try_send(event).is_err() {
                        warn!("Event queue full, scripted event dropped");
                    }
                }
                Step::Motion(moving) => {
                    info!("Board {}", if moving { "moving" } else { "still" });
                    bridge.peripherals_mut().motion.moving = moving;
                }
            }
        }

        // --- Tick timer ---------------------------------------------------
        match bridge.peripherals().timer.period {
            Some(period) if last_tick.elapsed() >= period => {
                last_tick = Instant::now();
                if queue.try_send(BridgeEvent::Tick).is_err() {
                    warn!("Event queue full, tick dropped");
                }
            }
            Some(_) => {}
            None => last_tick = Instant::now(),
        }

        // --- Dispatch -----------------------------------------------------
        if let Err(e) = block_on(bridge.drain(&queue)) {
            error!("Bridge halted: {}", e);
            process::exit(1);
        }

        if pending.peek().is_none() {
            let deadline = *end.get_or_insert(started.elapsed() + TAIL);
            if started.elapsed() >= deadline {
                break;
            }
        }

        // --- Frame pacing -------------------------------------------------
        let frame = frame_start.elapsed();
        if frame < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - frame);
        }
    }

    info!(
        "Simulator exiting after {} notifications",
        bridge.peripherals().radio.notifications
    );
}
