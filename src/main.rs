use std::{
    path::PathBuf,
    process::ExitCode,
    time::{Duration, Instant},
};

use clap::Parser;
use engine::{input::InputState, renderer::Renderer, scene::Scene};
use gait::GaitState;
use game::{
    config::{DefsError, GaitDefs},
    scenes::gait_viewer::GaitViewerScene,
    script::{Script, ScriptedInput},
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod engine;
mod game;

#[derive(clap::Parser)]
struct Opts {
    /// Path to a transition and clip definitions file. The built-in quadruped definitions are used
    /// when omitted.
    #[arg(long)]
    defs: Option<PathBuf>,

    /// Simulation frames per second.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,

    /// Seconds of simulated time to run for.
    #[arg(long, default_value_t = 10.0)]
    seconds: f32,

    /// Timed inputs, e.g. "0.5=walk,3=4,6=GAIT_SIT".
    #[arg(long, value_delimiter = ',')]
    script: Vec<ScriptedInput>,

    /// The gait the model starts in.
    #[arg(long, default_value_t = GaitState::Stand)]
    initial: GaitState,

    /// Seconds of simulated time before the model's clips are available.
    #[arg(long, default_value_t = 0.0)]
    load_delay: f32,

    /// Pace frames against the wall clock.
    #[arg(long)]
    realtime: bool,
}

enum App {
    Uninitialized(Opts),
    Initialized {
        /// Length of a simulation frame in seconds.
        delta_time: f32,
        frame_count: u64,
        realtime: bool,

        renderer: Renderer,

        input: InputState,

        /// Inputs still to be fed to the scene.
        script: Script,

        /// The scene being simulated.
        scene: Box<dyn Scene>,
    },
}

impl App {
    fn initialize(&mut self) -> Result<(), DefsError> {
        let App::Uninitialized(opts) = self else {
            warn!("Application already initialized!");
            return Ok(());
        };

        let defs = match opts.defs {
            Some(ref path) => GaitDefs::load(path)?,
            None => GaitDefs::builtin(),
        };

        let graph = defs.graph()?;
        for clip in defs.undeclared_clips(&graph) {
            warn!(clip, "Transition clip is not declared in the clip library");
        }

        let library = defs.clip_library();
        info!(
            transitions = defs.transitions.len(),
            clips = library.len(),
            "Gait definitions loaded"
        );

        let scene: Box<dyn Scene> = Box::new(GaitViewerScene::new(
            graph,
            library,
            opts.initial,
            opts.load_delay,
        ));

        let script = Script::new(std::mem::take(&mut opts.script));

        info!("Application initialized!");

        let delta_time = 1.0 / opts.fps as f32;
        let frame_count = (opts.seconds.max(0.0) * opts.fps as f32).ceil() as u64;

        *self = App::Initialized {
            delta_time,
            frame_count,
            realtime: opts.realtime,
            renderer: Renderer::default(),
            input: InputState::default(),
            script,
            scene,
        };

        Ok(())
    }

    fn run(&mut self) {
        let App::Initialized {
            delta_time,
            frame_count,
            realtime,
            renderer,
            input,
            script,
            scene,
        } = self
        else {
            warn!("Can't run an uninitialized application.");
            return;
        };

        let delta_time = *delta_time;
        let frame_duration = Duration::from_secs_f32(delta_time);
        let start = Instant::now();

        let mut pressed = Vec::new();

        for frame_index in 0..*frame_count {
            let time = (frame_index as f64 * delta_time as f64) as f32;

            while let Some(scripted) = script.pop_due(time) {
                let key = scripted.key();
                info!(time, ?scripted, "Scripted input");
                input.handle_key_event(key, true);
                pressed.push(key);
            }

            scene.update(delta_time, input);

            for key in pressed.drain(..) {
                input.handle_key_event(key, false);
            }

            let mut frame = renderer.begin_frame(time);
            scene.render(&mut frame);
            renderer.present(frame);

            input.reset_current_frame();

            if *realtime {
                let next_frame = frame_deadline(start, frame_duration, frame_index);
                if let Some(wait) = next_frame.checked_duration_since(Instant::now()) {
                    std::thread::sleep(wait);
                }
            }
        }

        if !script.is_finished() {
            warn!("Run ended before all scripted inputs were fed");
        }

        info!(
            frames = renderer.frames_rendered(),
            elapsed = ?start.elapsed(),
            "Simulation finished"
        );
    }
}

/// Wall clock time at which frame `frame_index` should be done.
fn frame_deadline(start: Instant, frame_duration: Duration, frame_index: u64) -> Instant {
    start + frame_duration.mul_f64((frame_index + 1) as f64)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut app = App::Uninitialized(Opts::parse());

    if let Err(err) = app.initialize() {
        error!("Could not initialize application! - {}", err);
        return ExitCode::FAILURE;
    }

    app.run();

    ExitCode::SUCCESS
}
