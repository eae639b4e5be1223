/// Screen-clamped crosshair position. Owned by the active scene and moved
/// once per frame by the normalized device delta.
#[derive(Clone, Debug, PartialEq)]
pub struct Cursor {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Cursor {
    /// Starts centered in a `width` x `height` arena.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            x: width / 2.0,
            y: height / 2.0,
            width,
            height,
        }
    }

    /// Moves the cursor by a frame delta, clamping both axes into
    /// `[0, width]` / `[0, height]`. The boundary itself is reachable.
    pub fn apply_delta(&mut self, dx: f64, dy: f64) {
        self.x = (self.x + dx).clamp(0.0, self.width);
        self.y = (self.y + dy).clamp(0.0, self.height);
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x.clamp(0.0, self.width);
        self.y = y.clamp(0.0, self.height);
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// True when the cursor lies on or inside the target circle.
    pub fn check_collision(&self, target_x: f64, target_y: f64, target_radius: f64) -> bool {
        self.distance_to(target_x, target_y) <= target_radius
    }

    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        ((self.x - x).powi(2) + (self.y - y).powi(2)).sqrt()
    }
}
