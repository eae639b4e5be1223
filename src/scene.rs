use crossterm::event::KeyCode;
use rand::rngs::StdRng;
use rand::SeedableRng;
use strum_macros::Display;

use crate::cursor::Cursor;
use crate::input::{DeviceSample, InputNormalizer};
use crate::profile::{Profile, ProfileStore};
use crate::session::{FlickingSession, SessionPhase, TrackingSession};
use crate::session_log::SessionLog;
use crate::stats::{
    flicking_summary, tracking_summary, FlickingSummary, TrackingSummary, AGGREGATE_WINDOW,
    RECENT_SERIES_LEN,
};

/// Everything the active scene may touch during one tick. The cursor and
/// the normalizer live here so they survive scene transitions; each is
/// only ever mutated by the single active scene.
pub struct SceneContext {
    pub config: SceneConfig,
    pub cursor: Cursor,
    pub input: InputNormalizer,
    pub log: SessionLog,
    pub profile_store: Box<dyn ProfileStore>,
    /// Refreshed by the main loop every tick, read by the HUD.
    pub gamepad_connected: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct SceneConfig {
    pub arena: (f64, f64),
    pub tracking_duration_secs: f64,
    pub flicking_targets: usize,
    /// Fixed seed for target motion; `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            arena: (crate::ARENA_WIDTH, crate::ARENA_HEIGHT),
            tracking_duration_secs: 30.0,
            flicking_targets: 10,
            seed: None,
        }
    }
}

impl SceneContext {
    pub fn new(
        config: SceneConfig,
        log: SessionLog,
        profile_store: Box<dyn ProfileStore>,
    ) -> Self {
        let mut input = InputNormalizer::new();
        profile_store.load().apply(&mut input);

        Self {
            config,
            cursor: Cursor::new(config.arena.0, config.arena.1),
            input,
            log,
            profile_store,
            gamepad_connected: false,
        }
    }

    fn session_rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Per-frame input pipeline: raw samples -> normalizer -> clamped
    /// cursor move.
    pub fn advance_cursor(&mut self, frame: &FrameInput, dt: f64) {
        self.input.observe(DeviceSample::Mouse {
            dx: frame.mouse_delta.0,
            dy: frame.mouse_delta.1,
        });
        self.input.observe(DeviceSample::Gamepad {
            axis_x: frame.stick.0,
            axis_y: frame.stick.1,
        });

        let (dx, dy) = self.input.cursor_velocity(dt);
        self.cursor.apply_delta(dx, dy);
    }

    fn persist_profile(&self) {
        // A failed write only costs the saved settings, never the session.
        let _ = self.profile_store.save(&Profile::from(&self.input));
    }
}

/// Raw device state gathered by the main loop for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Pointer displacement in arena units since the last tick.
    pub mouse_delta: (f64, f64),
    /// Raw left-stick axis pair.
    pub stick: (f64, f64),
    /// A press edge arrived this tick (mouse button or pad south button).
    pub clicked: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum SceneId {
    Launcher,
    Tracking,
    Flicking,
    Stats,
}

/// What the active scene wants the app to do after a tick or key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneRequest {
    Stay,
    Switch(SceneId),
    Quit,
}

pub const MENU_ITEMS: [(&str, SceneId); 3] = [
    ("Tracking", SceneId::Tracking),
    ("Flicking", SceneId::Flicking),
    ("Stats", SceneId::Stats),
];

#[derive(Debug, Default)]
pub struct LauncherScene {
    pub selected: usize,
}

#[derive(Debug)]
pub struct TrackingScene {
    pub session: TrackingSession,
    rng: StdRng,
}

#[derive(Debug)]
pub struct FlickingScene {
    pub session: FlickingSession,
    rng: StdRng,
}

#[derive(Debug)]
pub struct StatsScene {
    pub tracking: TrackingSummary,
    pub flicking: FlickingSummary,
}

/// The four app scenes as a closed set. All construction goes through
/// [`Scene::create`], the single transition table.
#[derive(Debug)]
pub enum Scene {
    Launcher(LauncherScene),
    Tracking(TrackingScene),
    Flicking(FlickingScene),
    Stats(StatsScene),
}

impl Scene {
    pub fn create(id: SceneId, ctx: &mut SceneContext) -> Scene {
        match id {
            SceneId::Launcher => Scene::Launcher(LauncherScene::default()),
            SceneId::Tracking => {
                let mut rng = ctx.session_rng();
                let session =
                    TrackingSession::new(ctx.config.tracking_duration_secs, ctx.config.arena, &mut rng);
                Scene::Tracking(TrackingScene { session, rng })
            }
            SceneId::Flicking => {
                let mut rng = ctx.session_rng();
                let session =
                    FlickingSession::new(ctx.config.flicking_targets, ctx.config.arena, &mut rng);
                Scene::Flicking(FlickingScene { session, rng })
            }
            SceneId::Stats => Scene::Stats(StatsScene {
                tracking: tracking_summary(
                    &ctx.log.load_tracking(AGGREGATE_WINDOW),
                    RECENT_SERIES_LEN,
                ),
                flicking: flicking_summary(
                    &ctx.log.load_flicking(AGGREGATE_WINDOW),
                    RECENT_SERIES_LEN,
                ),
            }),
        }
    }

    pub fn id(&self) -> SceneId {
        match self {
            Scene::Launcher(_) => SceneId::Launcher,
            Scene::Tracking(_) => SceneId::Tracking,
            Scene::Flicking(_) => SceneId::Flicking,
            Scene::Stats(_) => SceneId::Stats,
        }
    }

    /// One simulation tick for the active scene.
    pub fn update(&mut self, dt: f64, frame: &FrameInput, ctx: &mut SceneContext) -> SceneRequest {
        ctx.advance_cursor(frame, dt);

        match self {
            Scene::Launcher(_) | Scene::Stats(_) => SceneRequest::Stay,
            Scene::Tracking(scene) => {
                match scene.session.phase {
                    SessionPhase::Idle => {
                        if frame.clicked {
                            scene.session.start(&mut scene.rng);
                        }
                    }
                    SessionPhase::Active => {
                        if let Some(record) = scene.session.tick(dt, &ctx.cursor, &mut scene.rng) {
                            let _ = ctx.log.append_tracking(&record);
                        }
                    }
                    SessionPhase::Result => {
                        if frame.clicked {
                            scene.session.reset();
                        }
                    }
                }
                SceneRequest::Stay
            }
            Scene::Flicking(scene) => {
                match scene.session.phase {
                    SessionPhase::Idle => {
                        if frame.clicked {
                            scene.session.start(&mut scene.rng);
                        }
                    }
                    SessionPhase::Active => {
                        if frame.clicked {
                            if let Some((_, Some(record))) =
                                scene.session.on_click(&ctx.cursor, &mut scene.rng)
                            {
                                let _ = ctx.log.append_flicking(&record);
                            }
                        }
                    }
                    SessionPhase::Result => {
                        if frame.clicked {
                            scene.session.reset();
                        }
                    }
                }
                SceneRequest::Stay
            }
        }
    }

    pub fn handle_key(&mut self, code: KeyCode, ctx: &mut SceneContext) -> SceneRequest {
        match self {
            Scene::Launcher(scene) => match code {
                KeyCode::Esc | KeyCode::Char('q') => SceneRequest::Quit,
                KeyCode::Up => {
                    scene.selected = scene.selected.saturating_sub(1);
                    SceneRequest::Stay
                }
                KeyCode::Down => {
                    scene.selected = (scene.selected + 1).min(MENU_ITEMS.len() - 1);
                    SceneRequest::Stay
                }
                KeyCode::Enter => SceneRequest::Switch(MENU_ITEMS[scene.selected].1),
                // Quick sensitivity trim from the menu; persisted right away.
                KeyCode::Left => {
                    let sens = ctx.input.mouse_sensitivity() - 0.1;
                    ctx.input.set_mouse_sensitivity(sens);
                    ctx.persist_profile();
                    SceneRequest::Stay
                }
                KeyCode::Right => {
                    let sens = ctx.input.mouse_sensitivity() + 0.1;
                    ctx.input.set_mouse_sensitivity(sens);
                    ctx.persist_profile();
                    SceneRequest::Stay
                }
                KeyCode::Char('[') => {
                    let dz = ctx.input.deadzone() - 0.05;
                    ctx.input.set_deadzone(dz);
                    ctx.persist_profile();
                    SceneRequest::Stay
                }
                KeyCode::Char(']') => {
                    let dz = ctx.input.deadzone() + 0.05;
                    ctx.input.set_deadzone(dz);
                    ctx.persist_profile();
                    SceneRequest::Stay
                }
                _ => SceneRequest::Stay,
            },
            Scene::Tracking(scene) => match code {
                KeyCode::Esc => {
                    if scene.session.phase == SessionPhase::Active {
                        scene.session.cancel();
                        SceneRequest::Stay
                    } else {
                        SceneRequest::Switch(SceneId::Launcher)
                    }
                }
                KeyCode::Char(' ') | KeyCode::Enter => {
                    match scene.session.phase {
                        SessionPhase::Idle => scene.session.start(&mut scene.rng),
                        SessionPhase::Result => scene.session.reset(),
                        SessionPhase::Active => {}
                    }
                    SceneRequest::Stay
                }
                KeyCode::Char('r') => {
                    if scene.session.phase == SessionPhase::Result {
                        scene.session.start(&mut scene.rng);
                    }
                    SceneRequest::Stay
                }
                _ => SceneRequest::Stay,
            },
            Scene::Flicking(scene) => match code {
                KeyCode::Esc => {
                    if scene.session.phase == SessionPhase::Active {
                        scene.session.cancel();
                        SceneRequest::Stay
                    } else {
                        SceneRequest::Switch(SceneId::Launcher)
                    }
                }
                KeyCode::Char(' ') | KeyCode::Enter => {
                    match scene.session.phase {
                        SessionPhase::Idle => {
                            scene.session.start(&mut scene.rng);
                        }
                        SessionPhase::Result => scene.session.reset(),
                        SessionPhase::Active => {}
                    }
                    SceneRequest::Stay
                }
                KeyCode::Char('r') => {
                    if scene.session.phase == SessionPhase::Result {
                        scene.session.start(&mut scene.rng);
                    }
                    SceneRequest::Stay
                }
                _ => SceneRequest::Stay,
            },
            Scene::Stats(_) => match code {
                KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('q') => {
                    SceneRequest::Switch(SceneId::Launcher)
                }
                _ => SceneRequest::Stay,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::FileProfileStore;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn test_ctx(dir: &std::path::Path) -> SceneContext {
        SceneContext::new(
            SceneConfig {
                seed: Some(11),
                ..SceneConfig::default()
            },
            SessionLog::with_dir(dir.join("sessions")),
            Box::new(FileProfileStore::with_path(dir.join("profile.json"))),
        )
    }

    fn click() -> FrameInput {
        FrameInput {
            clicked: true,
            ..FrameInput::default()
        }
    }

    #[test]
    fn transition_table_builds_each_scene() {
        let dir = tempdir().unwrap();
        let mut ctx = test_ctx(dir.path());

        assert_matches!(Scene::create(SceneId::Launcher, &mut ctx), Scene::Launcher(_));
        assert_matches!(Scene::create(SceneId::Tracking, &mut ctx), Scene::Tracking(_));
        assert_matches!(Scene::create(SceneId::Flicking, &mut ctx), Scene::Flicking(_));
        assert_matches!(Scene::create(SceneId::Stats, &mut ctx), Scene::Stats(_));
    }

    #[test]
    fn launcher_menu_selection_and_launch() {
        let dir = tempdir().unwrap();
        let mut ctx = test_ctx(dir.path());
        let mut scene = Scene::create(SceneId::Launcher, &mut ctx);

        assert_eq!(scene.handle_key(KeyCode::Down, &mut ctx), SceneRequest::Stay);
        assert_eq!(
            scene.handle_key(KeyCode::Enter, &mut ctx),
            SceneRequest::Switch(SceneId::Flicking)
        );
        assert_eq!(scene.handle_key(KeyCode::Esc, &mut ctx), SceneRequest::Quit);
    }

    #[test]
    fn launcher_sensitivity_trim_persists() {
        let dir = tempdir().unwrap();
        let mut ctx = test_ctx(dir.path());
        let mut scene = Scene::create(SceneId::Launcher, &mut ctx);

        let before = ctx.input.mouse_sensitivity();
        scene.handle_key(KeyCode::Right, &mut ctx);
        assert!((ctx.input.mouse_sensitivity() - before - 0.1).abs() < 1e-9);

        let saved = FileProfileStore::with_path(dir.path().join("profile.json")).load();
        assert!((saved.mouse.sensitivity - ctx.input.mouse_sensitivity()).abs() < 1e-9);
    }

    #[test]
    fn tracking_click_starts_and_esc_cancels() {
        let dir = tempdir().unwrap();
        let mut ctx = test_ctx(dir.path());
        let mut scene = Scene::create(SceneId::Tracking, &mut ctx);

        scene.update(0.016, &click(), &mut ctx);
        let Scene::Tracking(inner) = &scene else {
            unreachable!()
        };
        assert_eq!(inner.session.phase, SessionPhase::Active);

        // Esc during a run cancels without leaving the scene.
        assert_eq!(scene.handle_key(KeyCode::Esc, &mut ctx), SceneRequest::Stay);
        let Scene::Tracking(inner) = &scene else {
            unreachable!()
        };
        assert_eq!(inner.session.phase, SessionPhase::Idle);

        // Esc while idle leaves for the launcher.
        assert_eq!(
            scene.handle_key(KeyCode::Esc, &mut ctx),
            SceneRequest::Switch(SceneId::Launcher)
        );
    }

    #[test]
    fn flicking_session_appends_record_to_log() {
        let dir = tempdir().unwrap();
        let mut ctx = test_ctx(dir.path());
        ctx.config.flicking_targets = 3;
        let mut scene = Scene::create(SceneId::Flicking, &mut ctx);

        scene.update(0.016, &click(), &mut ctx); // starts the session
        for _ in 0..3 {
            // Park the cursor on the target, then click.
            let Scene::Flicking(inner) = &scene else {
                unreachable!()
            };
            let (tx, ty) = (inner.session.target.x, inner.session.target.y);
            ctx.cursor.set_position(tx, ty);
            scene.update(0.016, &click(), &mut ctx);
        }

        let Scene::Flicking(inner) = &scene else {
            unreachable!()
        };
        assert_eq!(inner.session.phase, SessionPhase::Result);

        let records = ctx.log.load_flicking(10);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hits, 3);
        assert_eq!(records[0].accuracy, 100.0);
    }

    #[test]
    fn stats_scene_reflects_history() {
        let dir = tempdir().unwrap();
        let mut ctx = test_ctx(dir.path());

        ctx.log
            .append_tracking(&crate::session_log::TrackingRecord {
                timestamp: chrono::Local::now(),
                t0_rate: 62.5,
                duration_secs: 30.0,
            })
            .unwrap();

        let scene = Scene::create(SceneId::Stats, &mut ctx);
        let Scene::Stats(inner) = &scene else {
            unreachable!()
        };
        assert_eq!(inner.tracking.count, 1);
        assert_eq!(inner.tracking.best_t0, 62.5);
        assert_eq!(inner.flicking.count, 0);
    }
}
