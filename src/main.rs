//! glyph-raster command line
//!
//! - `render` streams frames of a scene to stdout
//! - `view` opens a window and lets you fly the camera around

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use macroquad::prelude::*;
use tracing::{debug, error, info};

use glyph_raster::config::{load_config, load_scene, EngineConfig, LoadedScene, Spinner};
use glyph_raster::frame::text_overlay;
use glyph_raster::pipeline::PipelineTimings;
use glyph_raster::{FrameClock, Scene, Workers, VERSION};

/// Camera speed in world units per second
const MOVE_SPEED: f32 = 4.0;
/// Camera turn rate in radians per second
const TURN_SPEED: f32 = 1.5;
const FONT_SIZE: u16 = 16;

#[derive(Parser)]
#[command(name = "glyph-raster", version)]
#[command(about = "Render 3D scenes as text")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream frames to stdout
    Render {
        #[command(flatten)]
        common: CommonArgs,
        /// Stop after this many frames (runs until interrupted otherwise)
        #[arg(long)]
        frames: Option<u64>,
        /// Separate frames with a blank line instead of redrawing in place
        #[arg(long)]
        plain: bool,
    },
    /// Open an interactive window
    View {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Scene file (RON)
    scene: PathBuf,
    /// Engine config (RON); defaults apply without one
    #[arg(long)]
    config: Option<PathBuf>,
    /// Worker threads, overriding the config (0 = single-threaded)
    #[arg(long)]
    threads: Option<usize>,
}

/// Everything a front-end needs, loaded and validated.
struct Session {
    config: EngineConfig,
    scene: Scene,
    spinners: Vec<Spinner>,
    workers: Workers,
}

impl CommonArgs {
    fn load(&self) -> Result<Session> {
        let mut config = match &self.config {
            Some(path) => load_config(path).with_context(|| format!("failed to load config {}", path.display()))?,
            None => EngineConfig::default(),
        };
        if let Some(threads) = self.threads {
            config.workers.threads = threads;
        }

        let camera = config.camera.build().context("invalid camera settings")?;
        let LoadedScene { mut scene, spinners } =
            load_scene(&self.scene, camera).with_context(|| format!("failed to load scene {}", self.scene.display()))?;
        scene.set_culling(config.culling);
        scene.set_fog_glyph(config.fog_glyph);

        let workers = config.workers.build().context("failed to start worker pool")?;
        Ok(Session {
            config,
            scene,
            spinners,
            workers,
        })
    }
}

fn advance_spinners(spinners: &mut [Spinner], scene: &mut Scene, delta: f32) -> Result<()> {
    for spinner in spinners {
        spinner.advance(scene, delta)?;
    }
    Ok(())
}

// =============================================================================
// render
// =============================================================================

fn render(common: &CommonArgs, frames: Option<u64>, plain: bool) -> Result<()> {
    let Session {
        config,
        mut scene,
        mut spinners,
        workers,
    } = common.load()?;
    let mut clock = FrameClock::new(config.max_fps, 1.0);
    let mut out = BufWriter::new(io::stdout().lock());
    let mut totals = PipelineTimings::default();

    while clock.within_limit(frames) {
        advance_spinners(&mut spinners, &mut scene, clock.delta() as f32)?;
        let output = scene.render(&workers, None)?;
        if plain {
            writeln!(out, "{}\n", output.frame)?;
        } else {
            // Cursor home, then overwrite the previous frame
            write!(out, "\x1b[H{}", output.frame)?;
        }
        out.flush()?;

        debug!(
            frame = clock.total_frames(),
            polygons = output.stats.polygons,
            culled = output.stats.culled,
            raster_polygons = output.stats.raster_polygons,
            total_ms = output.timings.total_ms(),
            "Frame"
        );
        totals.accumulate(&output.timings);
        clock.tick();
    }

    let frames = clock.total_frames().max(1) as f32;
    info!(
        frames = clock.total_frames(),
        fps = clock.fps(),
        avg_vertex_ms = totals.vertex_ms / frames,
        avg_polygon_ms = totals.polygon_ms / frames,
        avg_raster_ms = totals.raster_ms / frames,
        avg_total_ms = totals.total_ms() / frames,
        "Finished rendering"
    );
    Ok(())
}

// =============================================================================
// view
// =============================================================================

fn window_conf() -> Conf {
    Conf {
        window_title: format!("glyph-raster v{}", VERSION),
        window_width: 1280,
        window_height: 720,
        window_resizable: true,
        ..Default::default()
    }
}

/// +1 while `positive` is held, -1 while `negative` is, 0 for both or neither.
fn key_axis(positive: KeyCode, negative: KeyCode) -> f32 {
    is_key_down(positive) as i32 as f32 - is_key_down(negative) as i32 as f32
}

async fn view_loop(mut session: Session) -> Result<()> {
    let scene = &mut session.scene;
    let cell = measure_text("M", None, FONT_SIZE, 1.0);
    scene
        .camera_mut()
        .set_cell_aspect(cell.width / FONT_SIZE as f32)
        .context("font has no usable cell size")?;

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        let delta = get_frame_time();

        let camera = scene.camera_mut();
        camera.move_relative(
            key_axis(KeyCode::W, KeyCode::S) * MOVE_SPEED * delta,
            key_axis(KeyCode::D, KeyCode::A) * MOVE_SPEED * delta,
            key_axis(KeyCode::E, KeyCode::Q) * MOVE_SPEED * delta,
        );
        camera.rotate(
            key_axis(KeyCode::Left, KeyCode::Right) * TURN_SPEED * delta,
            key_axis(KeyCode::Up, KeyCode::Down) * TURN_SPEED * delta,
        );
        if is_key_pressed(KeyCode::C) {
            let culling = !scene.settings().culling;
            scene.set_culling(culling);
            info!(culling, "Toggled culling");
        }

        // Fit the grid to the window
        let cols = (screen_width() / cell.width).floor().max(1.0) as usize;
        let rows = (screen_height() / FONT_SIZE as f32).floor().max(1.0) as usize;
        scene.camera_mut().set_resolution(cols, rows)?;
        advance_spinners(&mut session.spinners, scene, delta)?;

        let hud = format!(
            "{} fps  culling {}",
            get_fps(),
            if scene.settings().culling { "on" } else { "off" }
        );
        let overlay = text_overlay(cols, rows, 0, 0, &hud);
        let frame = scene.render_frame_with_overlay(&session.workers, &overlay)?;

        clear_background(BLACK);
        for (i, row) in frame.rows().enumerate() {
            let line: String = row.iter().collect();
            draw_text(&line, 0.0, (i + 1) as f32 * FONT_SIZE as f32, FONT_SIZE as f32, WHITE);
        }
        next_frame().await;
    }
    Ok(())
}

fn view(common: &CommonArgs) -> Result<()> {
    let session = common.load()?;
    macroquad::Window::from_config(window_conf(), async move {
        if let Err(e) = view_loop(session).await {
            error!("{:#}", e);
        }
    });
    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Render { common, frames, plain } => render(common, *frames, *plain),
        Commands::View { common } => view(common),
    }
}
