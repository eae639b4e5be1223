use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyModifiers, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

use flik::gamepad::GamepadPoller;
use flik::profile::FileProfileStore;
use flik::runtime::{AimEvent, CrosstermEventSource, FixedTicker, Runner};
use flik::scene::{FrameInput, Scene, SceneConfig, SceneContext, SceneId, SceneRequest};
use flik::session_log::SessionLog;
use flik::{ui, ARENA_HEIGHT, ARENA_WIDTH, TICK_RATE_MS};

/// terminal aim trainer with mouse and gamepad input
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal aim trainer: track a moving target or flick between spawning ones, with mouse or gamepad, and keep a history of every session."
)]
struct Cli {
    /// tracking session length in seconds
    #[clap(short = 'd', long, default_value_t = 30.0)]
    duration: f64,

    /// number of targets per flicking session
    #[clap(short = 't', long, default_value_t = 10)]
    targets: usize,

    /// seed for target motion (reproducible sessions)
    #[clap(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.error(clap::error::ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, Hide)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, cli);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen,
        Show
    )?;

    result
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    cli: Cli,
) -> Result<(), Box<dyn Error>> {
    let config = SceneConfig {
        arena: (ARENA_WIDTH, ARENA_HEIGHT),
        tracking_duration_secs: cli.duration.max(1.0),
        flicking_targets: cli.targets.max(1),
        seed: cli.seed,
    };

    let mut ctx = SceneContext::new(
        config,
        SessionLog::new(),
        Box::new(FileProfileStore::new()),
    );
    let mut scene = Scene::create(SceneId::Launcher, &mut ctx);

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let mut gamepad = GamepadPoller::new();

    let dt = TICK_RATE_MS as f64 / 1000.0;
    // Pointer state carried between ticks; deltas accumulate until the
    // next tick consumes them.
    let mut last_pointer_cell: Option<(u16, u16)> = None;
    let mut pending_mouse_delta = (0.0, 0.0);
    let mut pending_click = false;

    terminal.draw(|f| ui::draw(f, &scene, &ctx))?;

    loop {
        let request = match runner.step() {
            AimEvent::Tick => {
                let stick = gamepad.poll();
                ctx.gamepad_connected = gamepad.connected();

                let frame = FrameInput {
                    mouse_delta: pending_mouse_delta,
                    stick: (stick.axis_x, stick.axis_y),
                    clicked: pending_click || stick.fire_edge,
                };
                pending_mouse_delta = (0.0, 0.0);
                pending_click = false;

                let request = scene.update(dt, &frame, &mut ctx);
                terminal.draw(|f| ui::draw(f, &scene, &ctx))?;
                request
            }
            AimEvent::Mouse(mouse) => {
                match mouse.kind {
                    MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                        if let Some((px, py)) = last_pointer_cell {
                            let size = terminal.size()?;
                            let scale_x = ARENA_WIDTH / size.width.max(1) as f64;
                            let scale_y = ARENA_HEIGHT / size.height.max(1) as f64;
                            pending_mouse_delta.0 +=
                                (mouse.column as f64 - px as f64) * scale_x;
                            pending_mouse_delta.1 += (mouse.row as f64 - py as f64) * scale_y;
                        }
                        last_pointer_cell = Some((mouse.column, mouse.row));
                    }
                    MouseEventKind::Down(MouseButton::Left) => {
                        pending_click = true;
                    }
                    _ => {}
                }
                SceneRequest::Stay
            }
            AimEvent::Key(key) => {
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    SceneRequest::Quit
                } else {
                    let request = scene.handle_key(key.code, &mut ctx);
                    terminal.draw(|f| ui::draw(f, &scene, &ctx))?;
                    request
                }
            }
            AimEvent::Resize => {
                terminal.draw(|f| ui::draw(f, &scene, &ctx))?;
                SceneRequest::Stay
            }
        };

        match request {
            SceneRequest::Stay => {}
            SceneRequest::Switch(id) => {
                scene = Scene::create(id, &mut ctx);
                terminal.draw(|f| ui::draw(f, &scene, &ctx))?;
            }
            SceneRequest::Quit => break,
        }
    }

    Ok(())
}
