/// One raw device reading for the current frame. Recomputed every frame,
/// never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeviceSample {
    /// Pointer displacement in arena units since the previous frame.
    Mouse { dx: f64, dy: f64 },
    /// Left-stick axis pair, each in [-1, 1].
    Gamepad { axis_x: f64, axis_y: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveDevice {
    Mouse,
    Gamepad,
}

pub const DEFAULT_MOUSE_SENSITIVITY: f64 = 1.0;
pub const DEFAULT_GAMEPAD_SENSITIVITY: f64 = 500.0;
pub const DEFAULT_DEADZONE: f64 = 0.15;
pub const DEFAULT_RESPONSE_CURVE: f64 = 1.0;

/// A shaped axis magnitude above this switches the active device to the
/// gamepad; any nonzero mouse delta switches it back.
const GAMEPAD_ACTIVITY_THRESHOLD: f64 = 0.01;

/// Deadzone + response-curve shaping for one analog axis.
///
/// Inside the deadzone the output is exactly 0. Outside it, the remaining
/// range is normalized to [0, 1], raised to `curve`, and the input sign is
/// reapplied, so the mapping is continuous at the deadzone boundary and
/// saturates at |raw| = 1.
pub fn shape_axis(raw: f64, deadzone: f64, curve: f64) -> f64 {
    if raw.abs() < deadzone {
        return 0.0;
    }

    let sign = if raw >= 0.0 { 1.0 } else { -1.0 };
    let normalized = (raw.abs() - deadzone) / (1.0 - deadzone);

    sign * normalized.powf(curve)
}

/// Folds mouse and gamepad readings into a single cursor velocity and
/// tracks which device currently drives the cursor.
#[derive(Clone, Debug)]
pub struct InputNormalizer {
    mouse_sensitivity: f64,
    gamepad_sensitivity: f64,
    deadzone: f64,
    response_curve: f64,
    active_device: ActiveDevice,
    mouse_delta: (f64, f64),
    shaped_stick: (f64, f64),
}

impl InputNormalizer {
    pub fn new() -> Self {
        Self {
            mouse_sensitivity: DEFAULT_MOUSE_SENSITIVITY,
            gamepad_sensitivity: DEFAULT_GAMEPAD_SENSITIVITY,
            deadzone: DEFAULT_DEADZONE,
            response_curve: DEFAULT_RESPONSE_CURVE,
            active_device: ActiveDevice::Mouse,
            mouse_delta: (0.0, 0.0),
            shaped_stick: (0.0, 0.0),
        }
    }

    /// Feed one device sample for the current frame. Mouse and gamepad are
    /// observed independently each frame; whichever shows activity last
    /// becomes the active device, so a stationary mouse with live stick
    /// input stays on the gamepad.
    pub fn observe(&mut self, sample: DeviceSample) {
        match sample {
            DeviceSample::Mouse { dx, dy } => {
                self.mouse_delta = (dx, dy);
                if dx != 0.0 || dy != 0.0 {
                    self.active_device = ActiveDevice::Mouse;
                }
            }
            DeviceSample::Gamepad { axis_x, axis_y } => {
                let shaped = (self.shaped(axis_x), self.shaped(axis_y));
                self.shaped_stick = shaped;
                if shaped.0.abs() > GAMEPAD_ACTIVITY_THRESHOLD
                    || shaped.1.abs() > GAMEPAD_ACTIVITY_THRESHOLD
                {
                    self.active_device = ActiveDevice::Gamepad;
                }
            }
        }
    }

    /// Cursor displacement for this frame. Mouse deltas are already a
    /// per-frame displacement and only get sensitivity applied; stick input
    /// is a velocity and is scaled by `dt`.
    pub fn cursor_velocity(&self, dt: f64) -> (f64, f64) {
        match self.active_device {
            ActiveDevice::Mouse => (
                self.mouse_delta.0 * self.mouse_sensitivity,
                self.mouse_delta.1 * self.mouse_sensitivity,
            ),
            ActiveDevice::Gamepad => (
                self.shaped_stick.0 * self.gamepad_sensitivity * dt,
                self.shaped_stick.1 * self.gamepad_sensitivity * dt,
            ),
        }
    }

    pub fn shaped(&self, raw: f64) -> f64 {
        shape_axis(raw, self.deadzone, self.response_curve)
    }

    pub fn active_device(&self) -> ActiveDevice {
        self.active_device
    }

    pub fn mouse_sensitivity(&self) -> f64 {
        self.mouse_sensitivity
    }

    pub fn gamepad_sensitivity(&self) -> f64 {
        self.gamepad_sensitivity
    }

    pub fn deadzone(&self) -> f64 {
        self.deadzone
    }

    pub fn response_curve(&self) -> f64 {
        self.response_curve
    }

    // Settings clamp at the point of assignment; an out-of-range value can
    // never be observed once set.

    pub fn set_mouse_sensitivity(&mut self, value: f64) {
        self.mouse_sensitivity = value.clamp(0.1, 5.0);
    }

    pub fn set_gamepad_sensitivity(&mut self, value: f64) {
        self.gamepad_sensitivity = value.clamp(100.0, 1500.0);
    }

    pub fn set_deadzone(&mut self, value: f64) {
        self.deadzone = value.clamp(0.0, 0.3);
    }

    pub fn set_response_curve(&mut self, value: f64) {
        self.response_curve = value.clamp(1.0, 3.0);
    }
}

impl Default for InputNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
