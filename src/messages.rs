// Define message types for the runtime

use serde::{Deserialize, Serialize};

use crate::drive::{
    BrakeMode, DifferentialDriveModel, EncoderUnits, Gearset, PidGains, PidParams, Side,
};

// Command from teleop/scripts -> runtime
// Each variant maps onto one drive model operation; speeds are normalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DriveCommand {
    Forward {
        speed: f64,
    },
    Rotate {
        speed: f64,
    },
    Vector {
        y_speed: f64,
        z_rotation: f64,
    },
    Tank {
        left: f64,
        right: f64,
        #[serde(default)]
        threshold: Option<f64>,
    },
    Arcade {
        y_speed: f64,
        z_rotation: f64,
        #[serde(default)]
        threshold: Option<f64>,
    },
    Left {
        speed: f64,
    },
    Right {
        speed: f64,
    },
    Stop,
    BrakeMode {
        brake: BrakeMode,
    },
}

impl DriveCommand {
    /// Motion commands are held and re-applied each tick; the rest are one-shot
    pub fn is_motion(&self) -> bool {
        !matches!(self, DriveCommand::BrakeMode { .. })
    }

    /// Dispatch to the model; `default_threshold` fills in a missing dead zone
    pub fn apply(
        &self,
        model: &DifferentialDriveModel,
        default_threshold: f64,
    ) -> crate::drive::Result<()> {
        match *self {
            DriveCommand::Forward { speed } => model.forward(speed),
            DriveCommand::Rotate { speed } => model.rotate(speed),
            DriveCommand::Vector {
                y_speed,
                z_rotation,
            } => model.drive_vector(y_speed, z_rotation),
            DriveCommand::Tank {
                left,
                right,
                threshold,
            } => model.tank(left, right, threshold.unwrap_or(default_threshold)),
            DriveCommand::Arcade {
                y_speed,
                z_rotation,
                threshold,
            } => model.arcade(y_speed, z_rotation, threshold.unwrap_or(default_threshold)),
            DriveCommand::Left { speed } => model.left(speed),
            DriveCommand::Right { speed } => model.right(speed),
            DriveCommand::Stop => model.stop(),
            DriveCommand::BrakeMode { brake } => model.set_brake_mode(brake),
        }
    }
}

// Actuation output from runtime -> hardware node, one per side per call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActuatorCommand {
    Velocity { value: i16 },
    Voltage { value: i16 },
    BrakeMode { mode: BrakeMode },
    EncoderUnits { units: EncoderUnits },
    Gearing { gearset: Gearset },
    PosPid { gains: PidGains },
    PosPidFull { params: PidParams },
    VelPid { gains: PidGains },
    VelPidFull { params: PidParams },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideActuation {
    pub side: Side,
    pub command: ActuatorCommand,
}

// Encoder telemetry from hardware node -> runtime (absolute counts)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct EncoderSample {
    pub left: i64,
    pub right: i64,
}

/// Health status published by runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Ok,
    CmdStale,
}
