use rand::Rng;
use std::f64::consts::PI;

/// Extra keep-out distance beyond the target radius at the arena edges.
pub const REFLECT_PADDING: f64 = 50.0;

/// Default spawn keep-out from the arena edges, per axis.
pub const SPAWN_MARGIN: f64 = 100.0;

const DIRECTION_INTERVAL_SECS: (f64, f64) = (1.5, 3.5);
const SPEED_INTERVAL_SECS: (f64, f64) = (0.5, 1.5);
const REFLECT_INTERVAL_SECS: (f64, f64) = (1.0, 2.5);

/// One training target moving under a piecewise-constant-velocity model:
/// periodic random re-direction, periodic speed jitter, and elastic
/// reflection off a padded arena boundary.
///
/// All randomness flows through the `rng` arguments so a seeded generator
/// reproduces an entire session's motion.
#[derive(Clone, Debug)]
pub struct Target {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    vx: f64,
    vy: f64,
    base_speed: f64,
    direction_timer: f64,
    direction_interval: f64,
    speed_timer: f64,
    speed_interval: f64,
    active: bool,
    arena_width: f64,
    arena_height: f64,
}

impl Target {
    pub fn new(radius: f64, base_speed: f64, arena: (f64, f64), rng: &mut impl Rng) -> Self {
        Self {
            x: arena.0 / 2.0,
            y: arena.1 / 2.0,
            radius,
            vx: 0.0,
            vy: 0.0,
            base_speed,
            direction_timer: 0.0,
            direction_interval: rng
                .gen_range(DIRECTION_INTERVAL_SECS.0..DIRECTION_INTERVAL_SECS.1),
            speed_timer: 0.0,
            speed_interval: rng.gen_range(SPEED_INTERVAL_SECS.0..SPEED_INTERVAL_SECS.1),
            active: false,
            arena_width: arena.0,
            arena_height: arena.1,
        }
    }

    /// Places the target uniformly at random inside the spawn margin on
    /// each axis and activates it.
    pub fn spawn(&mut self, margin: f64, rng: &mut impl Rng) {
        self.x = rng.gen_range(margin..self.arena_width - margin);
        self.y = rng.gen_range(margin..self.arena_height - margin);
        self.active = true;
    }

    /// Starts moving at `base_speed` along a uniformly random heading.
    pub fn assign_random_velocity(&mut self, rng: &mut impl Rng) {
        let angle = rng.gen_range(0.0..2.0 * PI);
        self.vx = angle.cos() * self.base_speed;
        self.vy = angle.sin() * self.base_speed;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn speed(&self) -> f64 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    pub fn velocity(&self) -> (f64, f64) {
        (self.vx, self.vy)
    }

    /// Rescales the current velocity to `speed`, preserving heading, and
    /// makes it the new base speed for future jitter.
    pub fn set_speed(&mut self, speed: f64) {
        self.base_speed = speed;
        let current = self.speed();
        if current > 0.0 {
            self.vx = self.vx / current * speed;
            self.vy = self.vy / current * speed;
        }
    }

    /// Advances the simulation by `dt` seconds. Inactive targets do not
    /// move, fire timers, or reflect.
    pub fn tick(&mut self, dt: f64, rng: &mut impl Rng) {
        if !self.active {
            return;
        }

        self.direction_timer += dt;
        if self.direction_timer >= self.direction_interval {
            self.direction_timer = 0.0;
            self.direction_interval =
                rng.gen_range(DIRECTION_INTERVAL_SECS.0..DIRECTION_INTERVAL_SECS.1);
            self.rotate_heading(rng);
        }

        self.speed_timer += dt;
        if self.speed_timer >= self.speed_interval {
            self.speed_timer = 0.0;
            self.speed_interval = rng.gen_range(SPEED_INTERVAL_SECS.0..SPEED_INTERVAL_SECS.1);

            let jittered = self.base_speed * rng.gen_range(0.7..1.3);
            let current = self.speed();
            if current > 0.0 {
                self.vx = self.vx / current * jittered;
                self.vy = self.vy / current * jittered;
            }
        }

        self.x += self.vx * dt;
        self.y += self.vy * dt;

        self.reflect(rng);
    }

    /// Rotates the heading by a random angle with magnitude in
    /// [45deg, 135deg] and a random sign, preserving the current speed.
    fn rotate_heading(&mut self, rng: &mut impl Rng) {
        let current_angle = self.vy.atan2(self.vx);
        let mut angle_change = rng.gen_range(PI / 4.0..3.0 * PI / 4.0);
        if rng.gen_bool(0.5) {
            angle_change = -angle_change;
        }

        let new_angle = current_angle + angle_change;
        let speed = self.speed();
        self.vx = new_angle.cos() * speed;
        self.vy = new_angle.sin() * speed;
    }

    /// Elastic reflection off the padded boundary. Both timers restart with
    /// a short interval so the next re-direction cannot immediately steer
    /// the target back into the wall.
    fn reflect(&mut self, rng: &mut impl Rng) {
        let margin = self.radius + REFLECT_PADDING;

        if self.x < margin || self.x > self.arena_width - margin {
            self.vx = -self.vx;
            self.x = self.x.clamp(margin, self.arena_width - margin);
            self.restart_timers_after_reflection(rng);
        }
        if self.y < margin || self.y > self.arena_height - margin {
            self.vy = -self.vy;
            self.y = self.y.clamp(margin, self.arena_height - margin);
            self.restart_timers_after_reflection(rng);
        }
    }

    fn restart_timers_after_reflection(&mut self, rng: &mut impl Rng) {
        self.direction_timer = 0.0;
        self.direction_interval = rng.gen_range(REFLECT_INTERVAL_SECS.0..REFLECT_INTERVAL_SECS.1);
        self.speed_timer = 0.0;
        self.speed_interval = rng.gen_range(REFLECT_INTERVAL_SECS.0..REFLECT_INTERVAL_SECS.1);
    }

    /// True when `(cx, cy)` lies on or inside the target circle. Inactive
    /// targets are not hit-testable.
    pub fn check_hit(&self, cx: f64, cy: f64) -> bool {
        if !self.active {
            return false;
        }
        let distance = ((self.x - cx).powi(2) + (self.y - cy).powi(2)).sqrt();
        distance <= self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ARENA: (f64, f64) = (1280.0, 720.0);

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn spawn_lands_inside_margin() {
        let mut rng = rng();
        let mut target = Target::new(40.0, 200.0, ARENA, &mut rng);

        for _ in 0..200 {
            target.spawn(100.0, &mut rng);
            assert!(target.x >= 100.0 && target.x <= ARENA.0 - 100.0);
            assert!(target.y >= 100.0 && target.y <= ARENA.1 - 100.0);
            assert!(target.is_active());
        }
    }

    #[test]
    fn random_velocity_has_base_speed() {
        let mut rng = rng();
        let mut target = Target::new(40.0, 200.0, ARENA, &mut rng);
        target.assign_random_velocity(&mut rng);
        assert!((target.speed() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn inactive_target_does_not_move() {
        let mut rng = rng();
        let mut target = Target::new(40.0, 200.0, ARENA, &mut rng);
        target.assign_random_velocity(&mut rng);
        let before = (target.x, target.y);

        target.tick(0.5, &mut rng);
        assert_eq!((target.x, target.y), before);
    }

    #[test]
    fn inactive_target_is_not_hit_testable() {
        let mut rng = rng();
        let mut target = Target::new(40.0, 200.0, ARENA, &mut rng);
        target.spawn(100.0, &mut rng);
        assert!(target.check_hit(target.x, target.y));

        target.deactivate();
        assert!(!target.check_hit(target.x, target.y));
    }

    #[test]
    fn stays_inside_reflect_margin_over_long_runs() {
        let mut rng = rng();
        let mut target = Target::new(50.0, 400.0, ARENA, &mut rng);
        target.spawn(100.0, &mut rng);
        target.assign_random_velocity(&mut rng);

        let margin = target.radius + REFLECT_PADDING;
        // Mix of frame durations, including long stalls.
        for (i, dt) in (0..5000).map(|i| (i, 0.001 + (i % 37) as f64 * 0.004)) {
            target.tick(dt, &mut rng);
            assert!(
                target.x >= margin && target.x <= ARENA.0 - margin,
                "x out of bounds on tick {i}: {}",
                target.x
            );
            assert!(
                target.y >= margin && target.y <= ARENA.1 - margin,
                "y out of bounds on tick {i}: {}",
                target.y
            );
        }
    }

    #[test]
    fn speed_jitter_stays_within_band() {
        let mut rng = rng();
        let mut target = Target::new(40.0, 200.0, ARENA, &mut rng);
        target.spawn(100.0, &mut rng);
        target.assign_random_velocity(&mut rng);

        for _ in 0..2000 {
            target.tick(0.016, &mut rng);
            let speed = target.speed();
            assert!(
                speed >= 200.0 * 0.7 - 1e-6 && speed <= 200.0 * 1.3 + 1e-6,
                "speed {speed} outside jitter band"
            );
        }
    }

    #[test]
    fn set_speed_preserves_heading() {
        let mut rng = rng();
        let mut target = Target::new(40.0, 200.0, ARENA, &mut rng);
        target.assign_random_velocity(&mut rng);
        let (vx, vy) = target.velocity();

        target.set_speed(400.0);
        let (nvx, nvy) = target.velocity();
        assert!((target.speed() - 400.0).abs() < 1e-9);
        // Same direction, doubled magnitude.
        assert!((nvx - vx * 2.0).abs() < 1e-9);
        assert!((nvy - vy * 2.0).abs() < 1e-9);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let run = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut target = Target::new(40.0, 200.0, ARENA, &mut rng);
            target.spawn(100.0, &mut rng);
            target.assign_random_velocity(&mut rng);
            for _ in 0..500 {
                target.tick(0.016, &mut rng);
            }
            (target.x, target.y)
        };

        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }
}
