use crate::input::{collect_input_nonblocking, map_event_to_action, Action};
use crate::render::{ascii_shade, flash_background, image_to_cells, Terminal};
use crate::settings::{
    default_settings_path, load_settings, load_settings_lenient, save_settings_atomic, Settings,
};
use crate::{Args, Preset};
use anyhow::{Context, Result};
use boltfall::{LightningConfig, Storm, TickReport};
use crossterm::style::Color;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

// most ticks replayed in one frame after a stall
const MAX_CATCHUP_TICKS: u32 = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    pub(crate) ticks: u64,
    pub(crate) strikes: u64,
    pub(crate) branches: u64,
    pub(crate) grounded: u64,
    pub(crate) peak_active: usize,
}

impl Tally {
    pub(crate) fn record(&mut self, r: &TickReport) {
        self.ticks += 1;
        self.strikes += r.struck as u64;
        self.branches += r.branched as u64;
        self.grounded += r.grounded as u64;
        self.peak_active = self.peak_active.max(r.active);
    }
}

fn build_storm(
    width: usize,
    height: usize,
    cfg: LightningConfig,
    seed: Option<u64>,
) -> Result<Storm> {
    let storm = match seed {
        Some(seed) => Storm::with_seed(width, height, cfg, seed),
        None => Storm::new(width, height, cfg),
    }
    .with_context(|| format!("building a {width}x{height} storm"))?;
    Ok(storm)
}

fn draw_floor(storm: &mut Storm) {
    let y = storm.buffer().height() as i32 - 1;
    storm.buffer_mut().fill_row(y, 1.0);
}

pub(crate) struct App {
    settings: Settings,
    seed: Option<u64>,
    storm: Storm,
    term: Terminal,
    frame: Vec<u8>,
    tally: Tally,
    paused: bool,
    step_once: bool,
    strike_next: bool,
    show_hud: bool,
    should_quit: bool,
}

impl App {
    fn init(settings: Settings, args: &Args) -> Result<Self> {
        let term = Terminal::begin()?;
        let (w, h) = term.sky_size();
        let storm = match build_storm(w, h, settings.lightning, args.seed) {
            Ok(storm) => storm,
            Err(e) => {
                let mut term = term;
                term.end().ok();
                return Err(e);
            }
        };
        log::info!("sky is {w}x{h} pixels");

        Ok(Self {
            settings,
            seed: args.seed,
            storm,
            term,
            frame: Vec::new(),
            tally: Tally::default(),
            paused: false,
            step_once: false,
            strike_next: false,
            show_hud: !args.no_hud,
            should_quit: false,
        })
    }

    fn run(&mut self) -> Result<()> {
        let fps = self.settings.fps_cap.clamp(5, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);

        let mut last_frame = Instant::now();
        let mut sim_accum = Duration::ZERO;

        while !self.should_quit {
            if self.term.resize_if_needed()? {
                let (w, h) = self.term.sky_size();
                log::info!("resized, sky is now {w}x{h} pixels");
                self.storm = build_storm(w, h, self.settings.lightning, self.seed)?;
            }

            // input
            for ev in collect_input_nonblocking(frame_dt)? {
                if let Some(action) = map_event_to_action(&ev) {
                    self.apply(action);
                }
            }
            if self.should_quit {
                break;
            }

            // sim fixed-step
            let now = Instant::now();
            sim_accum = sim_accum.saturating_add(now.saturating_duration_since(last_frame));
            last_frame = now;

            if self.paused {
                sim_accum = Duration::ZERO;
                if self.step_once {
                    self.step_once = false;
                    self.tick();
                }
            } else {
                let mut n = 0;
                while sim_accum >= frame_dt && n < MAX_CATCHUP_TICKS {
                    self.tick();
                    sim_accum = sim_accum.saturating_sub(frame_dt);
                    n += 1;
                }
                if n == MAX_CATCHUP_TICKS {
                    sim_accum = Duration::ZERO;
                }
            }

            self.render_frame()?;

            // frame cap
            spin_sleep(frame_dt, now);
        }

        self.term.end()?;
        log::info!(
            "quit after {} ticks, {} strikes, {} branches",
            self.tally.ticks,
            self.tally.strikes,
            self.tally.branches
        );
        Ok(())
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Pause => self.paused = !self.paused,
            Action::Step => {
                if self.paused {
                    self.step_once = true;
                }
            }
            Action::Strike => {
                self.strike_next = true;
                if self.paused {
                    self.step_once = true;
                }
            }
            Action::Clear => self.storm.reset(),
            Action::HudToggle => self.show_hud = !self.show_hud,
            Action::FloorToggle => self.settings.show_floor = !self.settings.show_floor,
        }
    }

    fn tick(&mut self) {
        let report = if self.strike_next {
            self.strike_next = false;
            self.storm.strike()
        } else {
            self.storm.tick()
        };
        if self.settings.show_floor {
            draw_floor(&mut self.storm);
        }
        self.tally.record(&report);
    }

    fn render_frame(&mut self) -> Result<()> {
        let bg = flash_background(self.storm.flash().opacity());
        let (cols, rows) = (self.term.cols(), self.term.rows());
        let canvas = self.term.canvas();
        canvas.wipe(bg);

        let buffer = self.storm.buffer();
        buffer.write_image(&mut self.frame);
        image_to_cells(
            &self.frame,
            buffer.width(),
            buffer.height(),
            canvas,
            self.settings.enable_color,
            bg,
        );

        if self.show_hud {
            let status = if self.paused { "paused" } else { "running" };
            let line = format!(
                "boltfall | Q quit | Space strike | P pause | N step | C clear | F floor | H hud | bolts {} | strikes {} | branches {} | {}x{} | {}",
                self.storm.simulator().len(),
                self.tally.strikes,
                self.tally.branches,
                cols,
                rows,
                status,
            );
            canvas.put_str(0, rows.saturating_sub(1), &line, Color::DarkGrey, Color::Black);
        }

        self.term.present()?;
        Ok(())
    }
}

fn resolve_settings(args: &Args) -> Result<(Settings, Option<PathBuf>)> {
    let (mut settings, path) = match &args.config {
        Some(path) => (load_settings(path)?, Some(path.clone())),
        None => match default_settings_path() {
            Ok(path) => (load_settings_lenient(&path), Some(path)),
            Err(e) => {
                log::warn!("{e:#}; using default settings");
                (Settings::default(), None)
            }
        },
    };

    if let Some(fps) = args.fps {
        settings.fps_cap = fps;
    }
    match args.preset {
        Some(Preset::Classic) => settings.lightning = LightningConfig::classic(),
        Some(Preset::Storm) => settings.lightning = LightningConfig::storm(),
        None => {}
    }
    if args.floor {
        settings.show_floor = true;
    }

    settings
        .lightning
        .validate()
        .context("lightning settings are unusable")?;
    Ok((settings, path))
}

fn run_headless(settings: &Settings, args: &Args, ticks: u64) -> Result<()> {
    let mut storm = build_storm(args.width, args.height, settings.lightning, args.seed)?;
    let mut tally = Tally::default();
    for _ in 0..ticks {
        let report = storm.tick();
        if settings.show_floor {
            draw_floor(&mut storm);
        }
        tally.record(&report);
    }

    let frame = storm.frame();
    let mut out = io::stdout().lock();
    write!(out, "{}", ascii_shade(&frame, args.width, args.height))?;
    writeln!(
        out,
        "ticks {} | strikes {} | branches {} | grounded {} | active {} (peak {})",
        tally.ticks,
        tally.strikes,
        tally.branches,
        tally.grounded,
        storm.simulator().len(),
        tally.peak_active,
    )?;
    Ok(())
}

pub(crate) fn run(args: Args) -> Result<()> {
    let (settings, path) = resolve_settings(&args)?;

    if args.write_config {
        let path = path.context("no settings path; pass --config")?;
        save_settings_atomic(&path, &settings)?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    if let Some(ticks) = args.headless {
        return run_headless(&settings, &args, ticks);
    }

    log::info!("starting at {} fps", settings.fps_cap);
    let mut app = App::init(settings, &args)?;
    let res = app.run();
    if res.is_err() {
        app.term.end().ok();
    }
    res
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
