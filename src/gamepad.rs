use gilrs::{Axis, Button, Gilrs};

/// One frame of stick state. Axis values are raw, in [-1, 1]; shaping
/// happens in the input normalizer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StickFrame {
    pub axis_x: f64,
    pub axis_y: f64,
    /// South button went down since the previous poll.
    pub fire_edge: bool,
}

/// Left-stick poller over gilrs. A missing gamepad (or a platform where
/// gilrs cannot initialize, e.g. headless CI) is a steady-state condition:
/// every poll just reports a centered stick and the app stays mouse-only.
pub struct GamepadPoller {
    gilrs: Option<Gilrs>,
    fire_was_pressed: bool,
}

impl GamepadPoller {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            gilrs: Gilrs::new().ok(),
            fire_was_pressed: false,
        }
    }

    pub fn connected(&self) -> bool {
        self.gilrs
            .as_ref()
            .is_some_and(|g| g.gamepads().next().is_some())
    }

    /// Drains pending gilrs events and samples the first connected pad.
    pub fn poll(&mut self) -> StickFrame {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return StickFrame::default();
        };

        while gilrs.next_event().is_some() {}

        let Some((_, pad)) = gilrs.gamepads().next() else {
            self.fire_was_pressed = false;
            return StickFrame::default();
        };

        let pressed = pad.is_pressed(Button::South);
        let fire_edge = pressed && !self.fire_was_pressed;
        self.fire_was_pressed = pressed;

        StickFrame {
            axis_x: pad.value(Axis::LeftStickX) as f64,
            // gilrs reports stick-up as positive; arena y grows downward.
            axis_y: -(pad.value(Axis::LeftStickY) as f64),
            fire_edge,
        }
    }
}
