// Timeouts, topics, drive configuration
use std::time::Duration;

// Runtime loop frequency
pub const LOOP_HZ: u64 = 50;

// Command timeout for watchdog
pub const CMD_TIMEOUT: Duration = Duration::from_millis(250);

// Zenoh topics
pub const TOPIC_CMD_DRIVE: &str = "skid/cmd/drive"; // commands
pub const TOPIC_RT_LEFT: &str = "skid/rt/left"; // left side actuation
pub const TOPIC_RT_RIGHT: &str = "skid/rt/right"; // right side actuation
pub const TOPIC_ENCODERS: &str = "skid/state/encoders"; // encoder telemetry
pub const TOPIC_HEALTH: &str = "skid/state/health"; // health status

// Actuator units for a normalized command of 1.0 (millivolts on a 12 V motor)
pub const MAX_OUTPUT: f64 = 12000.0;

// Joystick dead zone used when a command does not carry its own
pub const DEFAULT_THRESHOLD: f64 = 0.05;

/// Settings the runtime is started with
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub max_output: f64,
    pub threshold: f64,
    pub loop_hz: u64,
    pub cmd_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_output: MAX_OUTPUT,
            threshold: DEFAULT_THRESHOLD,
            loop_hz: LOOP_HZ,
            cmd_timeout: CMD_TIMEOUT,
        }
    }
}

impl RuntimeConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_micros((1_000_000 / self.loop_hz.max(1)).max(1))
    }
}

/// Parse `--max-output`: positive and representable in actuator units
pub fn parse_max_output(s: &str) -> Result<f64, String> {
    let value = s.parse::<f64>().map_err(|e| e.to_string())?;
    if value > 0.0 && value <= f64::from(i16::MAX) {
        Ok(value)
    } else {
        Err(format!("must be in (0, {}]", i16::MAX))
    }
}
