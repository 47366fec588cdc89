#![forbid(unsafe_code)]

//! Smartspace Demo
//!
//! Drives a carousel from a mock provider feed through a scripted session:
//! a drag that overlaps card refreshes, a long press, and a detach/attach
//! cycle. Every host call is logged as JSON.
//!
//! # Running
//!
//! ```sh
//! cargo run -p smartspace-demo -- [--config carousel.toml] [--rtl] [--preview]
//! ```
//!
//! `RUST_LOG` overrides the default filter.

mod cards;
mod host;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use smartspace::core::logging::{self, DEFAULT_FILTER};
use smartspace::{
    Carousel, CarouselConfig, DegradationAction, Error, Msg, Result, ScrollEvent, UpdateOutcome,
    Viewport,
};

use crate::cards::Feed;
use crate::host::LoggingHost;

const FRAME: Duration = Duration::from_millis(16);
const SESSION_FRAMES: u32 = 240;
const FEED_PERIOD: Duration = Duration::from_millis(400);

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    rtl: bool,
    preview: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter
                    .next()
                    .ok_or_else(|| Error::Setup("--config needs a path".into()))?;
                args.config = Some(PathBuf::from(path));
            }
            "--rtl" => args.rtl = true,
            "--preview" => args.preview = true,
            other => return Err(Error::Setup(format!("unknown argument: {other}"))),
        }
    }
    Ok(args)
}

fn load_config(path: &Path) -> Result<CarouselConfig> {
    let loaded = if path.extension().is_some_and(|ext| ext == "json") {
        CarouselConfig::from_json_file(path)
    } else {
        CarouselConfig::from_toml_file(path)
    };
    match loaded.map_err(Error::from) {
        Ok(config) => Ok(config),
        Err(err) if err.degradation() == DegradationAction::KeepLastKnown => {
            tracing::warn!(
                error = %err,
                action = %err.degradation(),
                "config rejected, using defaults"
            );
            Ok(CarouselConfig::default())
        }
        Err(err) => Err(err),
    }
}

/// Scripted user input for a frame.
fn gesture(frame: u32) -> Option<Msg<cards::Card>> {
    let event = match frame {
        30 => ScrollEvent::DragStarted,
        31..=44 => ScrollEvent::Scrolled {
            page: 0,
            fraction: (frame - 30) as f32 / 15.0,
        },
        45 => ScrollEvent::Released,
        46..=54 => ScrollEvent::Scrolled {
            page: 0,
            fraction: 0.9 + (frame - 45) as f32 / 100.0,
        },
        55 => ScrollEvent::Settled,
        120 => return Some(Msg::LongPress),
        160 => return Some(Msg::Detach),
        170 => return Some(Msg::Attach),
        _ => return None,
    };
    Some(event.into())
}

fn report(outcome: Option<UpdateOutcome>) {
    match outcome {
        Some(UpdateOutcome::Applied(applied)) => {
            if let Some(err) = Error::from_applied(&applied) {
                tracing::info!(error = %err, action = %err.degradation(), "update degraded");
            }
        }
        Some(UpdateOutcome::Deferred { superseded }) => {
            tracing::info!(superseded, "update parked behind gesture");
        }
        None => {}
    }
}

fn run() -> Result<()> {
    let args = parse_args()?;
    logging::init(DEFAULT_FILTER).map_err(|err| Error::Setup(err.to_string()))?;

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => CarouselConfig::default(),
    }
    .with_preview_mode(args.preview);
    tracing::info!(?config, rtl = args.rtl, "starting smartspace demo");

    let host = LoggingHost::new(args.rtl, Viewport::new(360.0, 120.0));
    let mut carousel = Carousel::new(host, &config).with_stream(Feed::new(1, FEED_PERIOD));
    carousel.handle(Msg::Attach);

    carousel.frame();
    for frame in 0..SESSION_FRAMES {
        thread::sleep(FRAME);
        if let Some(msg) = gesture(frame) {
            carousel.handle(msg);
        }
        if frame == 55 {
            // Settled on the second page.
            let target = if args.rtl {
                carousel.host().page_count().saturating_sub(2)
            } else {
                1
            };
            if let Err(err) = carousel.host_mut().swipe_to(target) {
                tracing::warn!(error = %err, action = %err.degradation(), "swipe ignored");
            }
        }

        if carousel.pump() > 0 {
            report(carousel.last_outcome());
        }
        carousel.frame();
        if let Some(pose) = carousel.transition_frame() {
            tracing::trace!(
                card_y = pose.card_offset_y,
                alpha = pose.card_alpha,
                surface_y = pose.surface_offset_y,
                "transition frame"
            );
        }
    }

    carousel.handle(Msg::Detach);
    tracing::info!("demo finished");
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("smartspace-demo: {err} ({})", err.error_type());
        std::process::exit(1);
    }
}
