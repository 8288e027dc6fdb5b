// Collaborator interfaces for the drive model
//
// The model only ever talks to these two capability sets. Any motor family
// (serial smart servo, CAN controller, bridge to another process) plugs in by
// implementing them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Errors reported by an actuator or sensor
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Device on port {port} is disconnected")]
    Disconnected { port: u8 },

    #[error("Command channel for {side} side is closed")]
    ChannelClosed { side: Side },
}

pub type Result<T> = std::result::Result<T, DeviceError>;

/// Which side of the drivetrain a device belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// Behaviour of the motor when commanded to zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrakeMode {
    Coast,
    Brake,
    Hold,
}

/// Units the onboard encoder reports in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncoderUnits {
    Degrees,
    Rotations,
    Counts,
}

/// Internal gear cartridge, named by free speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gearset {
    Red,   // 100 rpm
    Green, // 200 rpm
    Blue,  // 600 rpm
}

/// Basic gains for the actuator's onboard controller
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidGains {
    pub kf: f64,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl PidGains {
    pub fn new(kf: f64, kp: f64, ki: f64, kd: f64) -> Self {
        Self { kf, kp, ki, kd }
    }
}

/// Full parameter set for the actuator's onboard controller
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidParams {
    pub gains: PidGains,
    pub filter: f64,
    pub limit: f64,
    pub threshold: f64,
    pub loop_speed: f64,
}

/// A motor that accepts velocity and voltage commands in its native units
pub trait Actuator: Send + Sync {
    /// Closed-loop velocity command
    fn move_velocity(&self, velocity: i16) -> Result<()>;

    /// Open-loop voltage command
    fn move_voltage(&self, voltage: i16) -> Result<()>;

    fn set_brake_mode(&self, mode: BrakeMode) -> Result<()>;

    fn set_encoder_units(&self, units: EncoderUnits) -> Result<()>;

    fn set_gearing(&self, gearset: Gearset) -> Result<()>;

    fn set_pos_pid(&self, gains: PidGains) -> Result<()>;

    fn set_pos_pid_full(&self, params: PidParams) -> Result<()>;

    fn set_vel_pid(&self, gains: PidGains) -> Result<()>;

    fn set_vel_pid_full(&self, params: PidParams) -> Result<()>;

    /// The sensor built into this actuator
    fn encoder(&self) -> Arc<dyn RotarySensor>;
}

/// A sensor with an accumulated rotary reading
pub trait RotarySensor: Send + Sync {
    fn get(&self) -> Result<f64>;

    /// Zero the accumulated reading
    fn reset(&self) -> Result<()>;
}
