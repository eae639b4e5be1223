pub mod charting;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Line as CanvasLine},
        Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph,
    },
    Frame,
};

use crate::input::ActiveDevice;
use crate::scene::{Scene, SceneContext, MENU_ITEMS};
use crate::session::SessionPhase;
use crate::{ARENA_HEIGHT, ARENA_WIDTH};

const CROSSHAIR_ARM: f64 = 14.0;
const CROSSHAIR_GAP: f64 = 5.0;

pub fn draw(f: &mut Frame, scene: &Scene, state: &SceneContext) {
    match scene {
        Scene::Launcher(launcher) => draw_launcher(f, launcher.selected, state),
        Scene::Tracking(tracking) => draw_tracking(f, tracking, state),
        Scene::Flicking(flicking) => draw_flicking(f, flicking, state),
        Scene::Stats(stats) => draw_stats(f, stats),
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn draw_launcher(f: &mut Frame, selected: usize, state: &SceneContext) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Length(2),
            Constraint::Length(MENU_ITEMS.len() as u16),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(f.area());

    let title = Paragraph::new(Span::styled("flik", bold().fg(Color::Cyan)))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[1]);

    let items: Vec<Line> = MENU_ITEMS
        .iter()
        .enumerate()
        .map(|(i, (label, _))| {
            if i == selected {
                Line::from(Span::styled(format!("> {label}"), bold().fg(Color::Green)))
            } else {
                Line::from(Span::styled(format!("  {label}"), dim()))
            }
        })
        .collect();
    f.render_widget(
        Paragraph::new(items).alignment(Alignment::Center),
        chunks[2],
    );

    let device = match state.input.active_device() {
        ActiveDevice::Mouse => "mouse",
        ActiveDevice::Gamepad => "pad",
    };
    let pad = if state.gamepad_connected {
        "pad connected"
    } else {
        "no pad"
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        format!(
            "enter launch · ↑/↓ select · ←/→ sens {:.1} · [/] deadzone {:.2} · {pad} · {device} · esc quit",
            state.input.mouse_sensitivity(),
            state.input.deadzone(),
        ),
        dim(),
    )))
    .alignment(Alignment::Center);
    f.render_widget(footer, chunks[4]);
}

/// Paint the arena: target circle, crosshair, and a thin border. Arena y
/// grows downward while the canvas y axis grows upward, so everything is
/// flipped through `flip_y` on the way in.
fn draw_arena(
    f: &mut Frame,
    area: Rect,
    target: Option<(f64, f64, f64)>,
    cursor: (f64, f64),
    on_target: bool,
) {
    let flip_y = |y: f64| ARENA_HEIGHT - y;

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL))
        .x_bounds([0.0, ARENA_WIDTH])
        .y_bounds([0.0, ARENA_HEIGHT])
        .paint(move |painter| {
            if let Some((tx, ty, radius)) = target {
                painter.draw(&Circle {
                    x: tx,
                    y: flip_y(ty),
                    radius,
                    color: if on_target { Color::Green } else { Color::Red },
                });
            }

            let (cx, cy) = cursor;
            let cy = flip_y(cy);
            let color = Color::Yellow;
            painter.draw(&CanvasLine {
                x1: cx - CROSSHAIR_ARM,
                y1: cy,
                x2: cx - CROSSHAIR_GAP,
                y2: cy,
                color,
            });
            painter.draw(&CanvasLine {
                x1: cx + CROSSHAIR_GAP,
                y1: cy,
                x2: cx + CROSSHAIR_ARM,
                y2: cy,
                color,
            });
            painter.draw(&CanvasLine {
                x1: cx,
                y1: cy - CROSSHAIR_ARM,
                x2: cx,
                y2: cy - CROSSHAIR_GAP,
                color,
            });
            painter.draw(&CanvasLine {
                x1: cx,
                y1: cy + CROSSHAIR_GAP,
                x2: cx,
                y2: cy + CROSSHAIR_ARM,
                color,
            });
        });

    f.render_widget(canvas, area);
}

fn mode_layout(f: &Frame) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area())
}

fn draw_tracking(f: &mut Frame, scene: &crate::scene::TrackingScene, state: &SceneContext) {
    let chunks = mode_layout(f);
    let session = &scene.session;

    match session.phase {
        SessionPhase::Idle => {
            draw_arena(f, chunks[1], None, state.cursor.position(), false);
            let prompt = Paragraph::new(Line::from(vec![
                Span::styled("Tracking", bold().fg(Color::Cyan)),
                Span::raw(format!(
                    " — keep the crosshair on the moving target for {:.0}s. Click or press space to start.",
                    session.duration_secs
                )),
            ]))
            .alignment(Alignment::Center);
            f.render_widget(prompt, chunks[0]);
        }
        SessionPhase::Active => {
            let target = session
                .target
                .is_active()
                .then(|| (session.target.x, session.target.y, session.target.radius));
            draw_arena(
                f,
                chunks[1],
                target,
                state.cursor.position(),
                session.on_target(),
            );

            let hud = Line::from(vec![
                Span::styled(format!("{:>5.1}s", session.remaining_secs()), bold()),
                Span::raw("  "),
                Span::styled(
                    format!("T0 {:>5.1}%", session.t0_rate_so_far()),
                    if session.t0_rate_so_far() >= 50.0 {
                        bold().fg(Color::Green)
                    } else {
                        bold()
                    },
                ),
                Span::raw("  "),
                if session.on_target() {
                    Span::styled("ON TARGET", bold().fg(Color::Green))
                } else {
                    Span::raw("")
                },
            ]);
            f.render_widget(Paragraph::new(hud).alignment(Alignment::Center), chunks[0]);
        }
        SessionPhase::Result => {
            draw_arena(f, chunks[1], None, state.cursor.position(), false);
            if let Some(record) = session.result() {
                let grade = tracking_grade(record.t0_rate);
                let result = Line::from(vec![
                    Span::styled(format!("T0 {:.1}%", record.t0_rate), bold().fg(Color::Green)),
                    Span::raw("  "),
                    Span::styled(grade, bold()),
                    Span::styled("  — r to retry, esc for menu", dim()),
                ]);
                f.render_widget(Paragraph::new(result).alignment(Alignment::Center), chunks[0]);
            }
        }
    }

    f.render_widget(
        Paragraph::new(Span::styled("esc cancel/back", dim())).alignment(Alignment::Center),
        chunks[2],
    );
}

fn draw_flicking(f: &mut Frame, scene: &crate::scene::FlickingScene, state: &SceneContext) {
    let chunks = mode_layout(f);
    let session = &scene.session;

    match session.phase {
        SessionPhase::Idle => {
            draw_arena(f, chunks[1], None, state.cursor.position(), false);
            let prompt = Paragraph::new(Line::from(vec![
                Span::styled("Flicking", bold().fg(Color::Cyan)),
                Span::raw(format!(
                    " — click {} targets as fast as you can. Click or press space to start.",
                    session.target_count
                )),
            ]))
            .alignment(Alignment::Center);
            f.render_widget(prompt, chunks[0]);
        }
        SessionPhase::Active => {
            let target = session
                .target
                .is_active()
                .then(|| (session.target.x, session.target.y, session.target.radius));
            draw_arena(f, chunks[1], target, state.cursor.position(), false);

            let mut spans = vec![
                Span::styled(
                    format!("{}/{}", session.current_target(), session.target_count),
                    bold(),
                ),
                Span::raw("  "),
                Span::styled(format!("hits {}", session.hits()), bold().fg(Color::Green)),
            ];
            if let Some(last) = session.last_reaction_ms() {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(
                    format!("{last:.0}ms"),
                    if last < 300.0 {
                        bold().fg(Color::Green)
                    } else {
                        bold()
                    },
                ));
            }
            f.render_widget(
                Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
                chunks[0],
            );
        }
        SessionPhase::Result => {
            draw_arena(f, chunks[1], None, state.cursor.position(), false);
            if let Some(record) = session.result() {
                let grade = flicking_grade(record.accuracy, record.avg_reaction_ms);
                let mut spans = vec![
                    Span::styled(
                        format!("accuracy {:.0}%", record.accuracy),
                        bold().fg(Color::Green),
                    ),
                    Span::raw("  "),
                ];
                if let Some(avg) = record.avg_reaction_ms {
                    spans.push(Span::raw(format!("avg {avg:.0}ms  ")));
                }
                if let Some(min) = record.min_reaction_ms {
                    spans.push(Span::raw(format!("best {min:.0}ms  ")));
                }
                spans.push(Span::styled(grade, bold()));
                spans.push(Span::styled("  — r to retry, esc for menu", dim()));
                f.render_widget(
                    Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
                    chunks[0],
                );
            }
        }
    }

    f.render_widget(
        Paragraph::new(Span::styled("esc cancel/back", dim())).alignment(Alignment::Center),
        chunks[2],
    );
}

fn draw_stats(f: &mut Frame, scene: &crate::scene::StatsScene) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Percentage(45),
            Constraint::Percentage(45),
            Constraint::Length(1),
        ])
        .split(f.area());

    let tracking = &scene.tracking;
    let flicking = &scene.flicking;

    let summary = vec![
        Line::from(Span::styled("Session history", bold().fg(Color::Cyan))),
        Line::from(Span::raw(format!(
            "tracking: {} sessions · avg T0 {:.1}% · best {:.1}%",
            tracking.count, tracking.avg_t0, tracking.best_t0
        ))),
        Line::from(Span::raw(format!(
            "flicking: {} sessions · avg acc {:.1}% · best {:.1}% · avg reaction {:.0}ms (±{:.0})",
            flicking.count,
            flicking.avg_accuracy,
            flicking.best_accuracy,
            flicking.avg_reaction_ms,
            flicking.reaction_spread_ms
        ))),
    ];
    f.render_widget(Paragraph::new(summary).alignment(Alignment::Center), chunks[0]);

    draw_recent_chart(f, chunks[1], "recent T0 %", &tracking.recent, Color::Green);
    draw_recent_chart(f, chunks[2], "recent accuracy %", &flicking.recent, Color::Red);

    f.render_widget(
        Paragraph::new(Span::styled("esc back", dim())).alignment(Alignment::Center),
        chunks[3],
    );
}

fn draw_recent_chart(f: &mut Frame, area: Rect, title: &str, series: &[f64], color: Color) {
    if series.len() < 2 {
        let placeholder = Paragraph::new(Span::styled(
            format!("{title}: not enough sessions yet"),
            dim(),
        ))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(placeholder, area);
        return;
    }

    let points = charting::series_points(series);
    let (lo, hi) = charting::series_bounds(series);

    let datasets = vec![Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(Span::styled(title.to_string(), bold()))
                .borders(Borders::ALL),
        )
        .x_axis(Axis::default().bounds([0.0, (series.len() - 1) as f64]))
        .y_axis(
            Axis::default().bounds([lo, hi]).labels(vec![
                Span::styled(charting::format_label(lo), dim()),
                Span::styled(charting::format_label(hi), dim()),
            ]),
        );
    f.render_widget(chart, area);
}

/// Letter grade for a finished tracking run.
pub fn tracking_grade(t0_rate: f64) -> &'static str {
    if t0_rate >= 80.0 {
        "S - Excellent!"
    } else if t0_rate >= 60.0 {
        "A - Great!"
    } else if t0_rate >= 40.0 {
        "B - Good"
    } else {
        "C - Keep practicing"
    }
}

/// Letter grade for a finished flicking run. The S tier also requires a
/// fast average reaction.
pub fn flicking_grade(accuracy: f64, avg_reaction_ms: Option<f64>) -> &'static str {
    if accuracy >= 90.0 && avg_reaction_ms.is_some_and(|ms| ms < 250.0) {
        "S - Amazing!"
    } else if accuracy >= 70.0 {
        "A - Great!"
    } else if accuracy >= 50.0 {
        "B - Good"
    } else {
        "C - Keep practicing"
    }
}
