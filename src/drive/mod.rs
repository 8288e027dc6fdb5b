// Skid-steer drive module
//
// Provides:
// - Command translation (forward, rotate, vector, tank, arcade) to per-side outputs
// - Actuator / rotary sensor interfaces the model is written against
// - The differential drive model itself
// - Channel-backed bridge actuators for the runtime

pub mod bridge;
pub mod device;
pub mod kinematics;
mod model;

pub use bridge::{BridgeActuator, BridgeEncoder, BridgePair};
pub use device::{
    Actuator, BrakeMode, DeviceError, EncoderUnits, Gearset, PidGains, PidParams, Result,
    RotarySensor, Side,
};
pub use kinematics::SideOutputs;
pub use model::DifferentialDriveModel;
