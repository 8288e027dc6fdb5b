// Differential drive model
//
// Holds the two drive sides and turns normalized drive intents into
// velocity/voltage commands for them. Configuration and sensor calls are
// forwarded to both sides, left first.

use std::sync::Arc;

use tracing::debug;

use super::device::{
    Actuator, BrakeMode, EncoderUnits, Gearset, PidGains, PidParams, Result, RotarySensor,
};
use super::kinematics::{self, SideOutputs};

/// Skid-steer drive model over a left and a right actuator
///
/// Actuators and sensors are shared handles; the model never assumes it is
/// their only user and does nothing to them when dropped.
#[derive(Clone)]
pub struct DifferentialDriveModel {
    left_actuator: Arc<dyn Actuator>,
    right_actuator: Arc<dyn Actuator>,
    left_sensor: Arc<dyn RotarySensor>,
    right_sensor: Arc<dyn RotarySensor>,
    max_output: f64,
}

impl DifferentialDriveModel {
    /// Create a model that reads each side's built-in encoder
    pub fn new(
        left_actuator: Arc<dyn Actuator>,
        right_actuator: Arc<dyn Actuator>,
        max_output: f64,
    ) -> Self {
        let left_sensor = left_actuator.encoder();
        let right_sensor = right_actuator.encoder();
        Self::with_sensors(
            left_actuator,
            right_actuator,
            left_sensor,
            right_sensor,
            max_output,
        )
    }

    /// Create a model with independent sensors (e.g. external tracking wheels)
    pub fn with_sensors(
        left_actuator: Arc<dyn Actuator>,
        right_actuator: Arc<dyn Actuator>,
        left_sensor: Arc<dyn RotarySensor>,
        right_sensor: Arc<dyn RotarySensor>,
        max_output: f64,
    ) -> Self {
        Self {
            left_actuator,
            right_actuator,
            left_sensor,
            right_sensor,
            max_output,
        }
    }

    pub fn forward(&self, speed: f64) -> Result<()> {
        self.send_velocity(kinematics::forward(speed))
    }

    /// Turn in place; positive speed drives the left side forward
    pub fn rotate(&self, speed: f64) -> Result<()> {
        self.send_velocity(kinematics::rotate(speed))
    }

    /// Arcade-style vector drive in velocity units
    pub fn drive_vector(&self, y_speed: f64, z_rotation: f64) -> Result<()> {
        self.send_velocity(kinematics::drive_vector(y_speed, z_rotation))
    }

    /// Tank drive in voltage units, zeroing inputs below `threshold`
    pub fn tank(&self, left_speed: f64, right_speed: f64, threshold: f64) -> Result<()> {
        self.send_voltage(kinematics::tank(left_speed, right_speed, threshold))
    }

    /// Arcade drive in voltage units, zeroing inputs below `threshold`
    pub fn arcade(&self, y_speed: f64, z_rotation: f64, threshold: f64) -> Result<()> {
        self.send_voltage(kinematics::arcade(y_speed, z_rotation, threshold))
    }

    /// Raw left-side velocity; `speed` is not clamped
    pub fn left(&self, speed: f64) -> Result<()> {
        self.left_actuator
            .move_velocity(kinematics::to_units(speed, self.max_output))
    }

    /// Raw right-side velocity; `speed` is not clamped
    pub fn right(&self, speed: f64) -> Result<()> {
        self.right_actuator
            .move_velocity(kinematics::to_units(speed, self.max_output))
    }

    pub fn stop(&self) -> Result<()> {
        debug!("Stopping both sides");
        self.left_actuator.move_velocity(0)?;
        self.right_actuator.move_velocity(0)
    }

    fn send_velocity(&self, outputs: SideOutputs) -> Result<()> {
        let (left, right) = outputs.scaled(self.max_output);
        debug!("Velocity command: left={}, right={}", left, right);
        self.left_actuator.move_velocity(left)?;
        self.right_actuator.move_velocity(right)
    }

    fn send_voltage(&self, outputs: SideOutputs) -> Result<()> {
        let (left, right) = outputs.scaled(self.max_output);
        debug!("Voltage command: left={}, right={}", left, right);
        self.left_actuator.move_voltage(left)?;
        self.right_actuator.move_voltage(right)
    }

    /// Read both sensors as `[left, right]`
    ///
    /// The two reads are independent, not a synchronized sample.
    pub fn sensor_values(&self) -> Result<[i32; 2]> {
        let left = self.left_sensor.get()? as i32;
        let right = self.right_sensor.get()? as i32;
        Ok([left, right])
    }

    /// Zero both sensors, left then right
    pub fn reset_sensors(&self) -> Result<()> {
        self.left_sensor.reset()?;
        self.right_sensor.reset()
    }

    pub fn set_brake_mode(&self, mode: BrakeMode) -> Result<()> {
        debug!("Setting brake mode {:?}", mode);
        self.left_actuator.set_brake_mode(mode)?;
        self.right_actuator.set_brake_mode(mode)
    }

    pub fn set_encoder_units(&self, units: EncoderUnits) -> Result<()> {
        debug!("Setting encoder units {:?}", units);
        self.left_actuator.set_encoder_units(units)?;
        self.right_actuator.set_encoder_units(units)
    }

    pub fn set_gearing(&self, gearset: Gearset) -> Result<()> {
        debug!("Setting gearing {:?}", gearset);
        self.left_actuator.set_gearing(gearset)?;
        self.right_actuator.set_gearing(gearset)
    }

    pub fn set_pos_pid(&self, gains: PidGains) -> Result<()> {
        debug!("Setting position PID {:?}", gains);
        self.left_actuator.set_pos_pid(gains)?;
        self.right_actuator.set_pos_pid(gains)
    }

    pub fn set_pos_pid_full(&self, params: PidParams) -> Result<()> {
        debug!("Setting full position PID {:?}", params);
        self.left_actuator.set_pos_pid_full(params)?;
        self.right_actuator.set_pos_pid_full(params)
    }

    pub fn set_vel_pid(&self, gains: PidGains) -> Result<()> {
        debug!("Setting velocity PID {:?}", gains);
        self.left_actuator.set_vel_pid(gains)?;
        self.right_actuator.set_vel_pid(gains)
    }

    pub fn set_vel_pid_full(&self, params: PidParams) -> Result<()> {
        debug!("Setting full velocity PID {:?}", params);
        self.left_actuator.set_vel_pid_full(params)?;
        self.right_actuator.set_vel_pid_full(params)
    }

    pub fn left_actuator(&self) -> Arc<dyn Actuator> {
        Arc::clone(&self.left_actuator)
    }

    pub fn right_actuator(&self) -> Arc<dyn Actuator> {
        Arc::clone(&self.right_actuator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::device::DeviceError;
    use std::sync::Mutex;

    const MAX_OUTPUT: f64 = 200.0;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Velocity(i16),
        Voltage(i16),
        BrakeMode(BrakeMode),
        EncoderUnits(EncoderUnits),
        Gearing(Gearset),
        PosPid(PidGains),
        PosPidFull(PidParams),
        VelPid(PidGains),
        VelPidFull(PidParams),
    }

    #[derive(Default)]
    struct FakeSensor {
        value: Mutex<f64>,
        fail: bool,
    }

    impl FakeSensor {
        fn reading(value: f64) -> Arc<Self> {
            Arc::new(Self {
                value: Mutex::new(value),
                fail: false,
            })
        }
    }

    impl RotarySensor for FakeSensor {
        fn get(&self) -> Result<f64> {
            Ok(*self.value.lock().unwrap())
        }

        fn reset(&self) -> Result<()> {
            if self.fail {
                return Err(DeviceError::Disconnected { port: 2 });
            }
            *self.value.lock().unwrap() = 0.0;
            Ok(())
        }
    }

    struct FakeActuator {
        calls: Mutex<Vec<Call>>,
        encoder: Arc<FakeSensor>,
        fail: bool,
    }

    impl FakeActuator {
        fn new() -> Arc<Self> {
            Self::with_encoder(FakeSensor::reading(0.0))
        }

        fn with_encoder(encoder: Arc<FakeSensor>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                encoder,
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                encoder: FakeSensor::reading(0.0),
                fail: true,
            })
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) -> Result<()> {
            if self.fail {
                return Err(DeviceError::Disconnected { port: 1 });
            }
            self.calls.lock().unwrap().push(call);
            Ok(())
        }
    }

    impl Actuator for FakeActuator {
        fn move_velocity(&self, velocity: i16) -> Result<()> {
            self.record(Call::Velocity(velocity))
        }

        fn move_voltage(&self, voltage: i16) -> Result<()> {
            self.record(Call::Voltage(voltage))
        }

        fn set_brake_mode(&self, mode: BrakeMode) -> Result<()> {
            self.record(Call::BrakeMode(mode))
        }

        fn set_encoder_units(&self, units: EncoderUnits) -> Result<()> {
            self.record(Call::EncoderUnits(units))
        }

        fn set_gearing(&self, gearset: Gearset) -> Result<()> {
            self.record(Call::Gearing(gearset))
        }

        fn set_pos_pid(&self, gains: PidGains) -> Result<()> {
            self.record(Call::PosPid(gains))
        }

        fn set_pos_pid_full(&self, params: PidParams) -> Result<()> {
            self.record(Call::PosPidFull(params))
        }

        fn set_vel_pid(&self, gains: PidGains) -> Result<()> {
            self.record(Call::VelPid(gains))
        }

        fn set_vel_pid_full(&self, params: PidParams) -> Result<()> {
            self.record(Call::VelPidFull(params))
        }

        fn encoder(&self) -> Arc<dyn RotarySensor> {
            self.encoder.clone()
        }
    }

    fn model() -> (DifferentialDriveModel, Arc<FakeActuator>, Arc<FakeActuator>) {
        let left = FakeActuator::new();
        let right = FakeActuator::new();
        let model = DifferentialDriveModel::new(left.clone(), right.clone(), MAX_OUTPUT);
        (model, left, right)
    }

    fn last(actuator: &FakeActuator) -> Call {
        actuator.calls().last().cloned().expect("no calls recorded")
    }

    #[test]
    fn test_forward_equal_sides() {
        let (model, left, right) = model();
        model.forward(0.5).unwrap();
        assert_eq!(last(&left), Call::Velocity(100));
        assert_eq!(last(&right), Call::Velocity(100));

        model.forward(-9.0).unwrap();
        assert_eq!(last(&left), Call::Velocity(-200));
        assert_eq!(last(&right), Call::Velocity(-200));
    }

    #[test]
    fn test_rotate_opposite_sides() {
        let (model, left, right) = model();
        model.rotate(0.25).unwrap();
        assert_eq!(last(&left), Call::Velocity(50));
        assert_eq!(last(&right), Call::Velocity(-50));

        model.rotate(2.0).unwrap();
        assert_eq!(last(&left), Call::Velocity(200));
        assert_eq!(last(&right), Call::Velocity(-200));
    }

    #[test]
    fn test_drive_vector_saturated() {
        let (model, left, right) = model();
        model.drive_vector(1.0, 1.0).unwrap();
        assert_eq!(last(&left), Call::Velocity(200));
        assert_eq!(last(&right), Call::Velocity(0));
    }

    #[test]
    fn test_tank_below_threshold_is_zero_voltage() {
        let (model, left, right) = model();
        model.tank(0.05, -0.05, 0.1).unwrap();
        assert_eq!(last(&left), Call::Voltage(0));
        assert_eq!(last(&right), Call::Voltage(0));

        model.tank(0.5, -1.5, 0.1).unwrap();
        assert_eq!(last(&left), Call::Voltage(100));
        assert_eq!(last(&right), Call::Voltage(-200));
    }

    #[test]
    fn test_arcade_uses_voltage() {
        let (model, left, right) = model();
        model.arcade(0.5, 0.5, 0.0).unwrap();
        assert_eq!(last(&left), Call::Voltage(100));
        assert_eq!(last(&right), Call::Voltage(0));
    }

    #[test]
    fn test_single_side_is_not_clamped() {
        let (model, left, right) = model();
        model.left(1.5).unwrap();
        model.right(-0.25).unwrap();
        assert_eq!(left.calls(), vec![Call::Velocity(300)]);
        assert_eq!(right.calls(), vec![Call::Velocity(-50)]);
    }

    #[test]
    fn test_stop_sends_zero_velocity() {
        let (model, left, right) = model();
        model.arcade(1.0, 0.0, 0.0).unwrap();
        model.stop().unwrap();
        assert_eq!(last(&left), Call::Velocity(0));
        assert_eq!(last(&right), Call::Velocity(0));
    }

    #[test]
    fn test_outputs_never_exceed_max_output() {
        let (model, left, right) = model();
        let samples = [-4.0, -1.0, -0.3, 0.0, 0.6, 1.0, 3.0];
        for &a in &samples {
            for &b in &samples {
                model.forward(a).unwrap();
                model.rotate(a).unwrap();
                model.drive_vector(a, b).unwrap();
                model.tank(a, b, 0.0).unwrap();
                model.arcade(a, b, 0.0).unwrap();
            }
        }
        for call in left.calls().into_iter().chain(right.calls()) {
            match call {
                Call::Velocity(v) | Call::Voltage(v) => {
                    assert!(f64::from(v).abs() <= MAX_OUTPUT, "{} exceeds max", v)
                }
                other => panic!("unexpected call {:?}", other),
            }
        }
    }

    #[test]
    fn test_config_setters_are_symmetric() {
        let (model, left, right) = model();
        let gains = PidGains::new(0.1, 0.002, 0.0, 0.0005);
        let params = PidParams {
            gains,
            filter: 0.5,
            limit: 1.0,
            threshold: 0.01,
            loop_speed: 10.0,
        };

        model.set_brake_mode(BrakeMode::Hold).unwrap();
        model.set_encoder_units(EncoderUnits::Counts).unwrap();
        model.set_gearing(Gearset::Blue).unwrap();
        model.set_pos_pid(gains).unwrap();
        model.set_pos_pid_full(params).unwrap();
        model.set_vel_pid(gains).unwrap();
        model.set_vel_pid_full(params).unwrap();

        let expected = vec![
            Call::BrakeMode(BrakeMode::Hold),
            Call::EncoderUnits(EncoderUnits::Counts),
            Call::Gearing(Gearset::Blue),
            Call::PosPid(gains),
            Call::PosPidFull(params),
            Call::VelPid(gains),
            Call::VelPidFull(params),
        ];
        assert_eq!(left.calls(), expected);
        assert_eq!(right.calls(), expected);
    }

    #[test]
    fn test_default_sensors_come_from_actuators() {
        let left = FakeActuator::with_encoder(FakeSensor::reading(1234.9));
        let right = FakeActuator::with_encoder(FakeSensor::reading(-56.2));
        let model = DifferentialDriveModel::new(left, right, MAX_OUTPUT);
        assert_eq!(model.sensor_values().unwrap(), [1234, -56]);
    }

    #[test]
    fn test_explicit_sensors_override_encoders() {
        let left = FakeActuator::with_encoder(FakeSensor::reading(1.0));
        let right = FakeActuator::with_encoder(FakeSensor::reading(2.0));
        let model = DifferentialDriveModel::with_sensors(
            left,
            right,
            FakeSensor::reading(300.0),
            FakeSensor::reading(400.0),
            MAX_OUTPUT,
        );
        assert_eq!(model.sensor_values().unwrap(), [300, 400]);
    }

    #[test]
    fn test_reset_sensors_is_idempotent() {
        let left_enc = FakeSensor::reading(90.0);
        let right_enc = FakeSensor::reading(-45.0);
        let model = DifferentialDriveModel::new(
            FakeActuator::with_encoder(left_enc),
            FakeActuator::with_encoder(right_enc),
            MAX_OUTPUT,
        );

        model.reset_sensors().unwrap();
        assert_eq!(model.sensor_values().unwrap(), [0, 0]);
        model.reset_sensors().unwrap();
        assert_eq!(model.sensor_values().unwrap(), [0, 0]);
    }

    #[test]
    fn test_reset_is_not_transactional() {
        let left_enc = FakeSensor::reading(10.0);
        let right_enc = Arc::new(FakeSensor {
            value: Mutex::new(20.0),
            fail: true,
        });
        let model = DifferentialDriveModel::with_sensors(
            FakeActuator::new(),
            FakeActuator::new(),
            left_enc,
            right_enc,
            MAX_OUTPUT,
        );

        assert!(matches!(
            model.reset_sensors(),
            Err(DeviceError::Disconnected { port: 2 })
        ));
        assert_eq!(model.sensor_values().unwrap(), [0, 20]);
    }

    #[test]
    fn test_actuator_errors_propagate() {
        let right = FakeActuator::new();
        let model = DifferentialDriveModel::new(FakeActuator::failing(), right.clone(), MAX_OUTPUT);
        assert!(matches!(
            model.forward(0.5),
            Err(DeviceError::Disconnected { port: 1 })
        ));
        // Left failed first, so right never saw the command
        assert!(right.calls().is_empty());
    }

    #[test]
    fn test_accessors_share_handles() {
        let (model, left, _right) = model();
        model.left_actuator().move_velocity(7).unwrap();
        assert_eq!(left.calls(), vec![Call::Velocity(7)]);
        assert_eq!(Arc::strong_count(&left), 2);
    }
}
