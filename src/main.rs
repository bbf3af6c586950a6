// Copyright (c) 2026 rezky_nightky

mod canvas;
mod cell;
mod charset;
mod columns;
mod config;
mod engine;
mod error;
mod frame;
mod palette;
mod renderer;
mod runtime;
mod scheduler;
mod selector;
mod surface;
mod terminal;

use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind};
use log::debug;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{
    color_enabled_stdout, color_mode_label, detect_color_mode_auto, print_list_charsets,
    print_list_engines, Args, RainConfig,
};
use crate::engine::RainHandle;
use crate::frame::Frame;
use crate::selector::RandomSelector;
use crate::terminal::{restore_terminal_best_effort, Terminal, TerminalHost};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

/// Upper bound on how long the loop sleeps while no rain is running.
const IDLE_POLL: Duration = Duration::from_millis(250);

type Rain = RainHandle<Frame, RandomSelector>;

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn start_rain(host: &mut TerminalHost, cfg: &RainConfig) -> Option<Rain> {
    let selector = match cfg.seed {
        Some(seed) => RandomSelector::from_seed(seed),
        None => RandomSelector::from_entropy(),
    };
    engine::start(
        host,
        cfg.params.clone(),
        cfg.policy,
        selector,
        Instant::now(),
    )
}

fn main() -> std::io::Result<()> {
    env_logger::init();

    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command().styles(clap_styles());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_charsets {
        print_list_charsets();
        return Ok(());
    }

    if args.list_engines {
        print_list_engines();
        return Ok(());
    }

    let color_mode = match args.color_mode() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if args.check_bitcolor {
        let colorterm = std::env::var("COLORTERM").unwrap_or_default();
        let term = std::env::var("TERM").unwrap_or_default();
        println!("BITCOLOR CHECK:");
        println!(
            "  COLORTERM: {}",
            if colorterm.is_empty() { "(unset)" } else { &colorterm }
        );
        println!("  TERM: {}", if term.is_empty() { "(unset)" } else { &term });
        println!("  auto_detected: {}", color_mode_label(detect_color_mode_auto()));
        if args.colormode.is_some() {
            println!("  forced: {}", color_mode_label(color_mode));
        }
        println!("  effective: {}", color_mode_label(color_mode));
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", env!("GLYPHRAIN_BUILD"));
        let sha = env!("GLYPHRAIN_GIT_SHA");
        if !sha.is_empty() {
            println!("Commit: {}", sha);
        }
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    let cfg = match args.to_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    debug!("running {} rain with {:?}", cfg.kind.label(), cfg.params);

    let mut term = Terminal::new(color_mode, cfg.background)?;
    let (w, h) = term.size()?;
    let mut host = TerminalHost::new(cfg.cell, w, h);

    let mut rain = start_rain(&mut host, &cfg);
    if rain.is_none() {
        drop(term);
        eprintln!("no drawing surface available (terminal is {}x{})", w, h);
        std::process::exit(1);
    }

    let end_time = cfg.duration.map(|d| Instant::now() + d);
    let mut running = true;

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }

        let now = Instant::now();
        let mut timeout = rain
            .as_ref()
            .and_then(|r| r.next_deadline())
            .map(|d| d.saturating_duration_since(now))
            .unwrap_or(IDLE_POLL);
        if let Some(end) = end_time {
            timeout = timeout.min(end.saturating_duration_since(now));
        }

        if Terminal::poll_event(timeout)? {
            while running {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => {
                        host.resize(nw, nh);
                        if rain.is_none() {
                            rain = start_rain(&mut host, &cfg);
                        }
                    }
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if cfg.screensaver {
                            running = false;
                            break;
                        }
                        match k.code {
                            KeyCode::Esc | KeyCode::Char('q') => running = false,
                            KeyCode::Char(' ') => {
                                if let Some(mut old) = rain.take() {
                                    old.stop();
                                }
                                rain = start_rain(&mut host, &cfg);
                                term.invalidate();
                            }
                            _ => {}
                        }
                    }
                    _ => {}
                }
                if !Terminal::poll_event(Duration::from_millis(0))? {
                    break;
                }
            }
        }

        if !running {
            break;
        }

        let Some(r) = rain.as_mut() else {
            debug!("terminal has no drawable area; waiting for a resize");
            continue;
        };
        r.pump(Instant::now());
        if r.canvas().has_changes() {
            term.draw(r.canvas_mut())?;
        }
    }

    drop(rain);
    Ok(())
}
