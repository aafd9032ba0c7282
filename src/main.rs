//! Interactive viewer and one-shot PNG renderer.
//!
//! Controls:
//! - W/S or Up/Down: move forward/back
//! - A/D or Left/Right: move left/right
//! - [ / ]: move down/up
//! - R: reset the camera
//! - Q or Escape: quit
//!
//! Usage:
//!   mirror_rt                          - interactive terminal viewer
//!   mirror_rt --output frame.png       - render one 400x300 frame to a file

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use nalgebra::Point3;

use mirror_rt::renderer::{RenderProgress, Renderer};
use mirror_rt::scene::Scene;
use mirror_rt::terminal::{parse_key_event, Action, TerminalDisplay};
use mirror_rt::{Camera, DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// World-units moved per key press.
const MOVE_STEP: f32 = 0.25;

#[derive(Parser, Debug)]
#[command(name = "mirror_rt", about = "Recursive ray tracer with a terminal viewer")]
struct Args {
    /// Render width in pixels (one-shot mode only; the viewer sizes
    /// itself to the terminal)
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Render height in pixels (one-shot mode only)
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,

    /// Render a single frame to this PNG instead of running the viewer
    #[arg(long)]
    output: Option<PathBuf>,
}

fn default_camera() -> Result<Camera> {
    Ok(Camera::new(
        Point3::new(-2.0, 0.0, 1.0),
        Point3::new(3.0, 0.0, 1.0),
    )?)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match &args.output {
        Some(path) => render_to_png(&args, path),
        None => run_viewer(),
    }
}

/// One-shot mode: render the demo scene once and write it out.
fn render_to_png(args: &Args, path: &PathBuf) -> Result<()> {
    let renderer = Renderer::new(args.width, args.height, default_camera()?)?;
    let scene = Scene::demo();

    info!("rendering {}x{}", args.width, args.height);
    let start = Instant::now();
    let frame = renderer.render_with_progress(&scene, &|p: RenderProgress| {
        info!(
            "rendering... ({} ms) - {:.1}%",
            p.elapsed.as_millis(),
            p.fraction * 100.0
        );
    });
    info!("rendered in {} ms", start.elapsed().as_millis());

    frame
        .to_image()
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Interactive mode: re-render and redisplay after every camera move.
fn run_viewer() -> Result<()> {
    let mut terminal = TerminalDisplay::new().context("initializing terminal")?;
    let (width, height) = terminal.render_size();

    let initial_camera = default_camera()?;
    let mut renderer = Renderer::new(width, height, initial_camera.clone())?;
    let scene = Scene::demo();

    let mut dirty = true;
    let mut render_ms = 0u128;

    loop {
        if dirty {
            let start = Instant::now();
            let frame = renderer.render(&scene);
            render_ms = start.elapsed().as_millis();
            dirty = false;

            let camera = renderer.camera();
            let status = format!(
                "camera ({:.2}, {:.2}, {:.2}) | {} ms | [WASD] move  [[]] down/up  [R]eset  [Q]uit",
                camera.position.x, camera.position.y, camera.position.z, render_ms
            );
            if let Err(e) = terminal.present(&frame, &status) {
                if e.kind() == ErrorKind::BrokenPipe {
                    break;
                }
                return Err(e).context("presenting frame");
            }
        }

        let Some(key_event) = terminal.poll_input(Duration::from_millis(250))? else {
            continue;
        };

        match parse_key_event(key_event) {
            Action::Quit => break,
            Action::Forward => move_camera(&mut renderer, &mut dirty, MOVE_STEP, 0.0, 0.0),
            Action::Back => move_camera(&mut renderer, &mut dirty, -MOVE_STEP, 0.0, 0.0),
            Action::Left => move_camera(&mut renderer, &mut dirty, 0.0, -MOVE_STEP, 0.0),
            Action::Right => move_camera(&mut renderer, &mut dirty, 0.0, MOVE_STEP, 0.0),
            Action::Up => move_camera(&mut renderer, &mut dirty, 0.0, 0.0, MOVE_STEP),
            Action::Down => move_camera(&mut renderer, &mut dirty, 0.0, 0.0, -MOVE_STEP),
            Action::Reset => {
                *renderer.camera_mut() = initial_camera.clone();
                dirty = true;
            }
            Action::None => {}
        }
    }

    info!("viewer exiting, last frame took {} ms", render_ms);
    Ok(())
}

fn move_camera(renderer: &mut Renderer, dirty: &mut bool, dx: f32, dy: f32, dz: f32) {
    renderer.camera_mut().move_by(dx, dy, dz);
    *dirty = true;
}
