// Bridge collaborators
//
// An actuator that does not own hardware: every call is turned into an
// ActuatorCommand and pushed onto a channel, and the runtime publishes it for
// the hardware node. Encoder counts come back the other way as telemetry.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;

use super::device::{
    Actuator, BrakeMode, DeviceError, EncoderUnits, Gearset, PidGains, PidParams, Result,
    RotarySensor, Side,
};
use crate::messages::{ActuatorCommand, SideActuation};

/// Encoder whose raw count is written by whoever receives telemetry
#[derive(Debug, Default)]
pub struct BridgeEncoder {
    raw: AtomicI64,
    offset: AtomicI64,
}

impl BridgeEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the latest absolute count reported by the hardware
    pub fn update(&self, raw: i64) {
        self.raw.store(raw, Ordering::Relaxed);
    }
}

impl RotarySensor for BridgeEncoder {
    fn get(&self) -> Result<f64> {
        let raw = self.raw.load(Ordering::Relaxed);
        let offset = self.offset.load(Ordering::Relaxed);
        Ok(raw.wrapping_sub(offset) as f64)
    }

    fn reset(&self) -> Result<()> {
        self.offset
            .store(self.raw.load(Ordering::Relaxed), Ordering::Relaxed);
        Ok(())
    }
}

/// One drive side forwarded over a channel
pub struct BridgeActuator {
    side: Side,
    tx: UnboundedSender<SideActuation>,
    encoder: Arc<BridgeEncoder>,
}

impl BridgeActuator {
    pub fn new(side: Side, tx: UnboundedSender<SideActuation>) -> Self {
        Self {
            side,
            tx,
            encoder: Arc::new(BridgeEncoder::new()),
        }
    }

    /// The concrete encoder, for feeding telemetry into it
    pub fn bridge_encoder(&self) -> Arc<BridgeEncoder> {
        Arc::clone(&self.encoder)
    }

    fn send(&self, command: ActuatorCommand) -> Result<()> {
        debug!("{} side: {:?}", self.side, command);
        self.tx
            .send(SideActuation {
                side: self.side,
                command,
            })
            .map_err(|_| DeviceError::ChannelClosed { side: self.side })
    }
}

impl Actuator for BridgeActuator {
    fn move_velocity(&self, velocity: i16) -> Result<()> {
        self.send(ActuatorCommand::Velocity { value: velocity })
    }

    fn move_voltage(&self, voltage: i16) -> Result<()> {
        self.send(ActuatorCommand::Voltage { value: voltage })
    }

    fn set_brake_mode(&self, mode: BrakeMode) -> Result<()> {
        self.send(ActuatorCommand::BrakeMode { mode })
    }

    fn set_encoder_units(&self, units: EncoderUnits) -> Result<()> {
        self.send(ActuatorCommand::EncoderUnits { units })
    }

    fn set_gearing(&self, gearset: Gearset) -> Result<()> {
        self.send(ActuatorCommand::Gearing { gearset })
    }

    fn set_pos_pid(&self, gains: PidGains) -> Result<()> {
        self.send(ActuatorCommand::PosPid { gains })
    }

    fn set_pos_pid_full(&self, params: PidParams) -> Result<()> {
        self.send(ActuatorCommand::PosPidFull { params })
    }

    fn set_vel_pid(&self, gains: PidGains) -> Result<()> {
        self.send(ActuatorCommand::VelPid { gains })
    }

    fn set_vel_pid_full(&self, params: PidParams) -> Result<()> {
        self.send(ActuatorCommand::VelPidFull { params })
    }

    fn encoder(&self) -> Arc<dyn RotarySensor> {
        self.encoder.clone()
    }
}

/// Left/right bridge actuators sharing one outgoing channel
pub struct BridgePair {
    pub left: Arc<BridgeActuator>,
    pub right: Arc<BridgeActuator>,
    pub rx: UnboundedReceiver<SideActuation>,
}

impl BridgePair {
    pub fn new() -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            left: Arc::new(BridgeActuator::new(Side::Left, tx.clone())),
            right: Arc::new(BridgeActuator::new(Side::Right, tx)),
            rx,
        }
    }
}

impl Default for BridgePair {
    fn default() -> Self {
        Self::new()
    }
}
