use chrono::Local;
use rand::Rng;
use std::time::Instant;

use crate::cursor::Cursor;
use crate::session_log::{FlickingRecord, TrackingRecord};
use crate::target::{Target, SPAWN_MARGIN};
use crate::util::mean;

pub const TRACKING_TARGET_RADIUS: f64 = 50.0;
pub const TRACKING_TARGET_SPEED: f64 = 200.0;
pub const FLICKING_TARGET_RADIUS: f64 = 40.0;

/// Session lifecycle. `Idle -> Active -> Result -> Idle`, with a direct
/// `Active -> Idle` edge on cancellation that discards all progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Active,
    Result,
}

/// Time-boxed continuous tracking: keep the cursor on a moving target for
/// as large a share of the session as possible.
#[derive(Debug)]
pub struct TrackingSession {
    pub phase: SessionPhase,
    pub duration_secs: f64,
    pub target: Target,
    started_at: Option<Instant>,
    time_on_target: f64,
    total_time: f64,
    on_target: bool,
    result: Option<TrackingRecord>,
}

impl TrackingSession {
    pub fn new(duration_secs: f64, arena: (f64, f64), rng: &mut impl Rng) -> Self {
        Self {
            phase: SessionPhase::Idle,
            duration_secs,
            target: Target::new(TRACKING_TARGET_RADIUS, TRACKING_TARGET_SPEED, arena, rng),
            started_at: None,
            time_on_target: 0.0,
            total_time: 0.0,
            on_target: false,
            result: None,
        }
    }

    pub fn start(&mut self, rng: &mut impl Rng) {
        self.target.spawn(SPAWN_MARGIN, rng);
        self.target.assign_random_velocity(rng);
        self.started_at = Some(Instant::now());
        self.time_on_target = 0.0;
        self.total_time = 0.0;
        self.on_target = false;
        self.result = None;
        self.phase = SessionPhase::Active;
    }

    /// Advances one frame: target motion, hit-test, metric accumulation,
    /// and the end-of-session check against wall-clock elapsed time.
    /// Returns the finished record at the `Active -> Result` edge.
    pub fn tick(
        &mut self,
        dt: f64,
        cursor: &Cursor,
        rng: &mut impl Rng,
    ) -> Option<TrackingRecord> {
        if self.phase != SessionPhase::Active {
            return None;
        }

        self.target.tick(dt, rng);

        let (cx, cy) = cursor.position();
        self.on_target = self.target.check_hit(cx, cy);
        if self.on_target {
            self.time_on_target += dt;
        }
        self.total_time += dt;

        let elapsed = self
            .started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        if elapsed >= self.duration_secs {
            return Some(self.finish());
        }
        None
    }

    /// `Active -> Idle` without a record; accumulators are discarded.
    pub fn cancel(&mut self) {
        self.phase = SessionPhase::Idle;
        self.started_at = None;
        self.time_on_target = 0.0;
        self.total_time = 0.0;
        self.on_target = false;
        self.target.deactivate();
    }

    /// `Result -> Idle`, ready for another run.
    pub fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.result = None;
    }

    fn finish(&mut self) -> TrackingRecord {
        self.phase = SessionPhase::Result;
        self.target.deactivate();

        let t0_rate = if self.total_time > 0.0 {
            self.time_on_target / self.total_time * 100.0
        } else {
            0.0
        };
        let record = TrackingRecord {
            timestamp: Local::now(),
            t0_rate,
            duration_secs: self.duration_secs,
        };
        self.result = Some(record.clone());
        record
    }

    pub fn result(&self) -> Option<&TrackingRecord> {
        self.result.as_ref()
    }

    pub fn on_target(&self) -> bool {
        self.on_target
    }

    pub fn time_on_target(&self) -> f64 {
        self.time_on_target
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Running percentage for the HUD; 0 until the first tick.
    pub fn t0_rate_so_far(&self) -> f64 {
        if self.total_time > 0.0 {
            self.time_on_target / self.total_time * 100.0
        } else {
            0.0
        }
    }

    pub fn remaining_secs(&self) -> f64 {
        let elapsed = self
            .started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        (self.duration_secs - elapsed).max(0.0)
    }
}

/// What a click did to the flicking session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    Hit,
    Miss,
}

/// Fixed-count reaction test: targets appear one at a time, each click
/// consumes the current target whether it connects or not.
#[derive(Debug)]
pub struct FlickingSession {
    pub phase: SessionPhase,
    pub target_count: usize,
    pub target: Target,
    current_target: usize,
    hits: usize,
    reaction_times_ms: Vec<f64>,
    spawned_at: Option<Instant>,
    result: Option<FlickingRecord>,
}

impl FlickingSession {
    pub fn new(target_count: usize, arena: (f64, f64), rng: &mut impl Rng) -> Self {
        Self {
            phase: SessionPhase::Idle,
            target_count,
            target: Target::new(FLICKING_TARGET_RADIUS, 0.0, arena, rng),
            current_target: 0,
            hits: 0,
            reaction_times_ms: Vec::new(),
            spawned_at: None,
            result: None,
        }
    }

    pub fn start(&mut self, rng: &mut impl Rng) -> Option<FlickingRecord> {
        self.current_target = 0;
        self.hits = 0;
        self.reaction_times_ms.clear();
        self.result = None;
        self.phase = SessionPhase::Active;
        self.spawn_next(rng)
    }

    /// One debounced click. A hit records the reaction sample; either way
    /// the current target slot is consumed. Returns the finished record
    /// when the click consumed the last slot.
    pub fn on_click(
        &mut self,
        cursor: &Cursor,
        rng: &mut impl Rng,
    ) -> Option<(ClickOutcome, Option<FlickingRecord>)> {
        if self.phase != SessionPhase::Active {
            return None;
        }

        let (cx, cy) = cursor.position();
        let outcome = if self.target.check_hit(cx, cy) {
            let reaction_ms = self
                .spawned_at
                .map(|t| t.elapsed().as_secs_f64() * 1000.0)
                .unwrap_or(0.0);
            self.reaction_times_ms.push(reaction_ms);
            self.hits += 1;
            ClickOutcome::Hit
        } else {
            ClickOutcome::Miss
        };

        let record = self.spawn_next(rng);
        Some((outcome, record))
    }

    fn spawn_next(&mut self, rng: &mut impl Rng) -> Option<FlickingRecord> {
        self.current_target += 1;

        if self.current_target > self.target_count {
            return Some(self.finish());
        }

        self.target.spawn(SPAWN_MARGIN, rng);
        self.spawned_at = Some(Instant::now());
        None
    }

    pub fn cancel(&mut self) {
        self.phase = SessionPhase::Idle;
        self.current_target = 0;
        self.hits = 0;
        self.reaction_times_ms.clear();
        self.spawned_at = None;
        self.target.deactivate();
    }

    pub fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.result = None;
    }

    fn finish(&mut self) -> FlickingRecord {
        self.phase = SessionPhase::Result;
        self.target.deactivate();

        let accuracy = if self.target_count > 0 {
            self.hits as f64 / self.target_count as f64 * 100.0
        } else {
            0.0
        };
        let record = FlickingRecord {
            timestamp: Local::now(),
            accuracy,
            avg_reaction_ms: mean(&self.reaction_times_ms),
            min_reaction_ms: self
                .reaction_times_ms
                .iter()
                .copied()
                .fold(None, |best: Option<f64>, ms| {
                    Some(best.map_or(ms, |b| b.min(ms)))
                }),
            hits: self.hits,
            total: self.target_count,
        };
        self.result = Some(record.clone());
        record
    }

    pub fn result(&self) -> Option<&FlickingRecord> {
        self.result.as_ref()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    /// 1-based index of the target currently on screen.
    pub fn current_target(&self) -> usize {
        self.current_target
    }

    pub fn reaction_times_ms(&self) -> &[f64] {
        &self.reaction_times_ms
    }

    pub fn last_reaction_ms(&self) -> Option<f64> {
        self.reaction_times_ms.last().copied()
    }
}
