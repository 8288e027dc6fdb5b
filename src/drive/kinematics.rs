// Skid-steer command translation
// Maps drive intents (forward, rotate, vector, tank, arcade) onto normalized per-side outputs.

/// Normalized per-side outputs, each nominally in [-1, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SideOutputs {
    pub left: f64,
    pub right: f64,
}

impl SideOutputs {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Convert both sides to actuator units
    pub fn scaled(&self, max_output: f64) -> (i16, i16) {
        (to_units(self.left, max_output), to_units(self.right, max_output))
    }
}

/// Clamp a normalized command to [-1, 1]
pub fn clamp_unit(value: f64) -> f64 {
    value.clamp(-1.0, 1.0)
}

/// Clamp, then zero anything whose magnitude is below `threshold`
pub fn deadband(value: f64, threshold: f64) -> f64 {
    let value = clamp_unit(value);
    if value.abs() < threshold { 0.0 } else { value }
}

/// Scale a normalized value into actuator units (truncates toward zero, saturates at i16)
pub fn to_units(normalized: f64, max_output: f64) -> i16 {
    (normalized * max_output) as i16
}

/// Both sides at the same speed
pub fn forward(speed: f64) -> SideOutputs {
    let speed = clamp_unit(speed);
    SideOutputs::new(speed, speed)
}

/// Turn in place, left side leading
pub fn rotate(speed: f64) -> SideOutputs {
    let speed = clamp_unit(speed);
    SideOutputs::new(speed, -speed)
}

/// Arcade vector for velocity control
///
/// If either side would exceed full scale, both are divided by the larger
/// magnitude so the ratio between them (and so the turn curvature) is kept.
pub fn drive_vector(y_speed: f64, z_rotation: f64) -> SideOutputs {
    let y_speed = clamp_unit(y_speed);
    let z_rotation = clamp_unit(z_rotation);

    let mut left = y_speed + z_rotation;
    let mut right = y_speed - z_rotation;

    let max_mag = left.abs().max(right.abs());
    if max_mag > 1.0 {
        left /= max_mag;
        right /= max_mag;
    }

    SideOutputs::new(left, right)
}

/// Independent sides with dead-zone filtering
pub fn tank(left_speed: f64, right_speed: f64, threshold: f64) -> SideOutputs {
    SideOutputs::new(
        deadband(left_speed, threshold),
        deadband(right_speed, threshold),
    )
}

/// Arcade drive with signed-max allocation
///
/// The side that would otherwise be driven hardest takes
/// `copysign(max(|y|, |z|), y)`; the other side takes the plain sum or
/// difference. `y_speed == 0` follows the non-negative branch.
pub fn arcade(y_speed: f64, z_rotation: f64, threshold: f64) -> SideOutputs {
    let y_speed = deadband(y_speed, threshold);
    let z_rotation = deadband(z_rotation, threshold);

    let max_input = y_speed.abs().max(z_rotation.abs()).copysign(y_speed);

    let (left, right) = if y_speed >= 0.0 {
        if z_rotation >= 0.0 {
            (max_input, y_speed - z_rotation)
        } else {
            (y_speed + z_rotation, max_input)
        }
    } else if z_rotation >= 0.0 {
        (y_speed + z_rotation, max_input)
    } else {
        (max_input, y_speed - z_rotation)
    };

    SideOutputs::new(clamp_unit(left), clamp_unit(right))
}
