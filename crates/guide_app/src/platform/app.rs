use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use guide_core::{update, AppState, Msg, QuizConfig};
use guide_logging::{guide_info, guide_warn, LogSettings};

use super::commands::{parse_line, Command};
use super::effects::EffectRunner;
use super::render::Renderer;
use super::settings::Settings;

const TICK: Duration = Duration::from_millis(50);

enum HostEvent {
    Line(String),
    InputClosed,
    Tick,
}

pub fn run_app() -> anyhow::Result<()> {
    let settings = Settings::from_env();

    guide_logging::initialize(&LogSettings {
        destination: settings.log,
        ..LogSettings::default()
    });
    guide_info!("Starting career guide with {}", settings.describe_backend());

    let quiz = match &settings.quiz_path {
        Some(path) => QuizConfig::load(path)
            .with_context(|| format!("cannot use quiz file {}", path.display()))?,
        None => QuizConfig::builtin(),
    };
    let backend = settings
        .backend()
        .context("cannot configure the chat backend")?;
    let runner = EffectRunner::new(backend).context("cannot start the chat engine")?;

    let (event_tx, event_rx) = mpsc::channel::<HostEvent>();
    spawn_input_reader(event_tx.clone());
    // Background tick to pick up engine events.
    thread::spawn(move || {
        while event_tx.send(HostEvent::Tick).is_ok() {
            thread::sleep(TICK);
        }
    });

    let mut host = Host::new(AppState::with_quiz(quiz), runner, Renderer::new(io::stdout()));
    host.start()?;

    let mut input_closed = false;
    while let Ok(event) = event_rx.recv() {
        match event {
            HostEvent::Line(line) => {
                if !host.handle_line(&line)? {
                    break;
                }
            }
            HostEvent::InputClosed => input_closed = true,
            HostEvent::Tick => host.poll_engine()?,
        }
        // With stdin gone, wait for the reply in flight before exiting.
        if input_closed && !host.is_waiting() {
            break;
        }
    }

    guide_info!("Career guide exiting");
    Ok(())
}

fn spawn_input_reader(tx: mpsc::Sender<HostEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(HostEvent::Line(line)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    guide_warn!("Failed to read input: {}", err);
                    break;
                }
            }
        }
        let _ = tx.send(HostEvent::InputClosed);
    });
}

/// Owns the state and routes input, effects and renders.
struct Host<W: Write> {
    state: AppState,
    runner: EffectRunner,
    renderer: Renderer<W>,
}

impl<W: Write> Host<W> {
    fn new(state: AppState, runner: EffectRunner, renderer: Renderer<W>) -> Self {
        Self {
            state,
            runner,
            renderer,
        }
    }

    fn start(&mut self) -> io::Result<()> {
        self.state.consume_dirty();
        self.renderer.render(&self.state.view())
    }

    /// Handles one input line. Returns `false` when the user asked to quit.
    fn handle_line(&mut self, line: &str) -> io::Result<bool> {
        match parse_line(line, &self.state.view()) {
            Command::Quit => return Ok(false),
            Command::Help => self.renderer.help()?,
            Command::Invalid(reason) => self.renderer.notice(&reason)?,
            Command::Dispatch(msgs) => self.dispatch(msgs)?,
        }
        Ok(true)
    }

    fn poll_engine(&mut self) -> io::Result<()> {
        let msgs = self.runner.poll();
        if msgs.is_empty() {
            return Ok(());
        }
        self.dispatch(msgs)
    }

    fn is_waiting(&self) -> bool {
        self.state.transcript().is_loading()
    }

    fn dispatch(&mut self, msgs: Vec<Msg>) -> io::Result<()> {
        for msg in msgs {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            self.runner.run(effects);
        }
        if self.state.consume_dirty() {
            self.renderer.render(&self.state.view())?;
        }
        Ok(())
    }
}
