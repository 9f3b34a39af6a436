use std::path::PathBuf;
use std::time::Instant;
use crossterm::terminal;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use soundgarden::audio::{self, AudioHandle, Sampler, SamplerBridge};
use soundgarden::audio_api::AudioCommand;
use soundgarden::config::GardenConfig;
use soundgarden::loader::sample_loader;
use soundgarden::logging;
use soundgarden::middle::Middle;
use soundgarden::pipeline::store::GardenStore;
use soundgarden::shared::InputEvent;
use soundgarden::tui;

// used for decoding when there is no output device to match
const FALLBACK_SAMPLE_RATE: u32 = 44100;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let project_dir: PathBuf = match std::env::args().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    let config = GardenConfig::load_or_init(&project_dir)?;
    logging::init(&project_dir, config.level_filter())?;
    log::info!("soundgarden starting in {}", project_dir.display());

    // no device is not fatal: the garden still grows, just silently
    let output = match audio::start_audio() {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::warn!("audio disabled: {e:#}");
            None
        }
    };
    let sample_rate = output
        .as_ref()
        .map(AudioHandle::sample_rate)
        .unwrap_or(FALLBACK_SAMPLE_RATE);

    let mut bridge = SamplerBridge::new(Sampler::new());
    let samples_dir = config.samples_dir(&project_dir);
    match sample_loader::load_sample_set(&samples_dir, sample_rate, &mut bridge) {
        Ok(0) => log::warn!("no pitched samples in {}", samples_dir.display()),
        Ok(n) => log::info!("loaded {n} samples"),
        Err(e) => log::warn!("could not load samples: {e:#}"),
    }

    let store = GardenStore::open(&project_dir)?;
    let mut middle = Middle::new(config, store, bridge, StdRng::from_entropy())?;

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope
    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let size = term.size()?;
    send_all(
        output.as_ref(),
        middle.handle_input(InputEvent::Resize { width: size.width.saturating_sub(2), height: size.height }),
    );

    let tick_rate = std::time::Duration::from_millis(16); // ~60fps
    let mut last_tick = Instant::now();
    let blink_start = Instant::now();
    let mut tui_state = tui::mode::TuiState::default();

    loop {
        let blink_on = (blink_start.elapsed().as_millis() / 250) % 2 == 0;
        let ds = middle.display_state();
        tui_state.sync(&ds);

        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds, blink_on);
        })?;

        for event in tui::input::poll_input(tick_rate, &tui_state)? {
            if event == InputEvent::Quit {
                // save before quitting
                if let Err(e) = middle.save() {
                    log::error!("could not save on quit: {e}");
                }
                log::info!("bye");
                return Ok(());
            }
            // cards span the bordered explore area
            let event = match event {
                InputEvent::Resize { width, height } => InputEvent::Resize { width: width.saturating_sub(2), height },
                other => other,
            };
            send_all(output.as_ref(), middle.handle_input(event));
        }

        let elapsed = last_tick.elapsed().as_secs_f64();
        last_tick = Instant::now();
        send_all(output.as_ref(), middle.tick(elapsed));
    }
}

fn send_all(audio: Option<&AudioHandle>, cmds: Vec<AudioCommand>) {
    if let Some(audio) = audio {
        for cmd in cmds {
            audio.send(cmd);
        }
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
