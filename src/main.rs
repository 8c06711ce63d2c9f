#[cfg(not(target_arch = "wasm32"))]
use std::panic::{self, AssertUnwindSafe};
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
use anyhow::{Context, Result};
#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use log::{info, warn};
#[cfg(not(target_arch = "wasm32"))]
use winit::dpi::LogicalSize;
#[cfg(not(target_arch = "wasm32"))]
use winit::event_loop::EventLoop;
#[cfg(not(target_arch = "wasm32"))]
use winit::window::Window;

#[cfg(not(target_arch = "wasm32"))]
use bloodstream::app::{App, TitleHeading, UserEvent, WindowInitError};
#[cfg(not(target_arch = "wasm32"))]
use bloodstream::assets::{load_model_file, spawn_model_load};
#[cfg(not(target_arch = "wasm32"))]
use bloodstream::{SceneConfig, Stage, Viewport};

#[cfg(not(target_arch = "wasm32"))]
const HEADLESS_FRAME_SECONDS: f32 = 1.0 / 60.0;

/// Flies through a vessel of drifting blood cells.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(name = "bloodstream", version, about, long_about = None)]
struct Cli {
    /// OBJ model used for every cell
    #[arg(long)]
    model: Option<PathBuf>,

    /// TOML scene configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the cell attributes
    #[arg(long)]
    seed: Option<u64>,

    /// Run headless and print the final state
    #[arg(long)]
    summary_only: bool,

    /// Frames to simulate in headless mode
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Virtual scroll offset in pixels for headless mode
    #[arg(long, default_value_t = 0.0)]
    scroll: f32,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(log_level(cli.verbose, cli.quiet))
        .parse_default_env()
        .init();

    if let Err(err) = run(cli) {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` still overrides whatever the flags pick.
#[cfg(not(target_arch = "wasm32"))]
fn log_level(verbose: u8, quiet: bool) -> log::LevelFilter {
    match verbose {
        0 if quiet => log::LevelFilter::Error,
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if let Some(model) = &cli.model {
        config.model_path = model.display().to_string();
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    if cli.summary_only {
        return run_headless(config, &cli);
    }

    match run_interactive(config.clone()) {
        Ok(stage) => {
            println!("{}", stage.summary());
            Ok(())
        }
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
                );
                run_headless(config, &cli)
            } else {
                Err(err)
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn build_stage(config: SceneConfig) -> Result<Stage> {
    Stage::new(config, Viewport::new(1280.0, 720.0, 1.0)).context("failed to build the vessel path")
}

#[cfg(not(target_arch = "wasm32"))]
fn run_headless(config: SceneConfig, cli: &Cli) -> Result<()> {
    let mut stage = build_stage(config)?;
    let result = load_model_file(&stage.config().model_path);
    stage.on_model_loaded(result);
    stage.on_scroll(cli.scroll);
    for _ in 0..cli.frames {
        stage.advance(HEADLESS_FRAME_SECONDS);
    }
    info!("simulated {} frame(s)", cli.frames);
    println!("{}", stage.summary());
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn run_interactive(config: SceneConfig) -> Result<Stage> {
    let stage = build_stage(config)?;

    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(|| {
        EventLoop::<UserEvent>::with_user_event().build()
    }));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;

    let proxy = event_loop.create_proxy();
    let model_path = PathBuf::from(&stage.config().model_path);
    spawn_model_load(model_path, move |result| {
        if proxy.send_event(UserEvent::ModelLoaded(result)).is_err() {
            warn!("event loop closed before the model arrived");
        }
    })
    .context("failed to start model loader")?;

    let attributes = Window::default_attributes()
        .with_title("Bloodstream")
        .with_inner_size(LogicalSize::new(1280.0, 720.0));
    let mut app = App::windowed(stage, attributes, Box::new(TitleHeading::new("Bloodstream")));
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;
    app.finish()
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn verbosity_flags_pick_levels() {
        assert_eq!(log_level(0, false), log::LevelFilter::Warn);
        assert_eq!(log_level(0, true), log::LevelFilter::Error);
        assert_eq!(log_level(1, false), log::LevelFilter::Info);
        assert_eq!(log_level(2, true), log::LevelFilter::Debug);
        assert_eq!(log_level(5, false), log::LevelFilter::Trace);
    }
}
