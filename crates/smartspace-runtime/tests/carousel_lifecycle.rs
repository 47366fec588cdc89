#![forbid(unsafe_code)]

//! End-to-end carousel behaviour through the message loop.
//!
//! Covers:
//! 1. Re-attach with an unchanged upstream reproduces pages and index
//! 2. Mirrored re-attach keeps the same card in view
//! 3. Deferral and apply decisions are logged at DEBUG
//! 4. Malformed cards are logged at WARN and skipped
//! 5. Stream failure or termination reports "no data" but never blanks
//!    the carousel
//!
//! Run:
//!   cargo test -p smartspace-runtime --test carousel_lifecycle

use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use smartspace_core::{ItemSet, RankedItem, RawItem, ScrollEvent};
use smartspace_runtime::{
    Carousel, CarouselConfig, CarouselHost, HostCall, ItemStream, MockStream, Msg,
    RecordingHost, StaticStream, StopSignal, StreamEvent, StreamId, StreamStatus,
};
use tracing_subscriber::layer::SubscriberExt;

const WAIT: Duration = Duration::from_secs(2);

// ============================================================================
// Tracing capture infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
}

#[derive(Clone, Default)]
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct MessageVisitor(Option<String>);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = MessageVisitor(None);
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.0.unwrap_or_default(),
        });
    }
}

fn with_captured_tracing<R>(f: impl FnOnce() -> R) -> (R, Vec<CapturedEvent>) {
    let capture = EventCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    let events = capture.events.lock().unwrap().clone();
    (result, events)
}

// ============================================================================
// Helpers
// ============================================================================

fn cards() -> ItemSet<&'static str> {
    vec![
        RankedItem::new("weather", 40.0, "22°"),
        RankedItem::new("reminder", 25.0, "Dentist at 3"),
        RankedItem::new("quote", 10.0, "Keep going"),
    ]
    .into_iter()
    .collect()
}

fn carousel(host: RecordingHost<&'static str>) -> Carousel<&'static str, RecordingHost<&'static str>> {
    Carousel::new(host, &CarouselConfig::default()).with_stream(StaticStream::new(1, cards()))
}

fn attach_and_load(c: &mut Carousel<&'static str, RecordingHost<&'static str>>) {
    c.handle(Msg::Attach);
    assert!(c.pump_blocking(WAIT), "static stream should emit on attach");
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn reattach_reproduces_pages_and_index() {
    let mut c = carousel(RecordingHost::new());
    attach_and_load(&mut c);
    c.host_mut().swipe_to(2);
    let before = c.host().ids();

    c.handle(Msg::Detach);
    attach_and_load(&mut c);

    assert_eq!(c.host().ids(), before);
    assert_eq!(c.host().current_index(), 2);
}

#[test]
fn mirrored_reattach_keeps_card_in_view() {
    let mut c = carousel(RecordingHost::mirrored());
    attach_and_load(&mut c);
    assert_eq!(c.host().ids(), vec!["quote", "reminder", "weather"]);
    c.host_mut().swipe_to(1);

    for _ in 0..3 {
        c.handle(Msg::Detach);
        attach_and_load(&mut c);
        assert_eq!(c.host().current_index(), 1, "no drift across attach cycles");
        assert_eq!(c.host().ids()[1], "reminder");
    }
}

#[test]
fn deferral_and_apply_are_logged() {
    let ((), events) = with_captured_tracing(|| {
        let mut c = carousel(RecordingHost::new());
        attach_and_load(&mut c);
        c.handle(ScrollEvent::StateChanged(1).into());
        c.handle(Msg::Items(cards()));
        c.handle(ScrollEvent::StateChanged(0).into());
    });

    let debug: Vec<_> = events
        .iter()
        .filter(|e| e.level == tracing::Level::DEBUG)
        .map(|e| e.message.as_str())
        .collect();
    let deferred = debug
        .iter()
        .position(|m| m.contains("deferring card update"))
        .expect("deferral logged");
    let resumed = debug
        .iter()
        .position(|m| m.contains("applying pending card update"))
        .expect("resume logged");
    assert!(deferred < resumed);
    assert!(
        events.iter().all(|e| e.level != tracing::Level::ERROR),
        "no ERROR logs during normal operation"
    );
}

#[test]
fn malformed_cards_are_warned_and_skipped() {
    let raw = vec![
        RawItem::complete("weather", 40.0, "22°"),
        RawItem {
            id: Some("broken".into()),
            score: None,
            payload: Some("??"),
        },
    ];
    let ((), events) = with_captured_tracing(|| {
        let mut c = Carousel::new(RecordingHost::new(), &CarouselConfig::default())
            .with_stream(MockStream::new(9, vec![StreamEvent::Raw(raw)]));
        c.handle(Msg::Attach);
        assert!(c.pump_blocking(WAIT));
        assert_eq!(c.host().ids(), vec!["weather"]);
        assert_eq!(c.host().indicator_pages(), 1);
    });
    assert!(
        events
            .iter()
            .any(|e| e.level == tracing::Level::WARN && e.message.contains("malformed"))
    );
}

#[test]
fn stream_failure_keeps_last_cards() {
    let mut c = Carousel::new(RecordingHost::new(), &CarouselConfig::default()).with_stream(
        MockStream::new(
            3,
            vec![
                StreamEvent::Items(cards()),
                StreamEvent::Failed("weather provider timed out".into()),
            ],
        ),
    );
    c.handle(Msg::Attach);
    assert!(c.pump_blocking(WAIT));
    c.host_mut().clear_calls();
    assert!(c.pump_blocking(WAIT));

    assert_eq!(
        c.host().calls(),
        &[HostCall::StreamStatus(StreamStatus::NoData)]
    );
    assert_eq!(c.host().ids(), vec!["weather", "reminder", "quote"]);

    c.handle(Msg::Items(cards()));
    assert_eq!(c.host().stream_status(), StreamStatus::Live);
}

/// Emits one set, then either returns or panics without being stopped.
struct Crashing {
    panic: bool,
}

impl ItemStream<&'static str> for Crashing {
    fn id(&self) -> StreamId {
        21
    }

    fn run(&self, sender: mpsc::Sender<StreamEvent<&'static str>>, _stop: StopSignal) {
        let _ = sender.send(StreamEvent::Items(cards()));
        if self.panic {
            panic!("weather provider crashed");
        }
    }
}

fn terminated_stream_reports_no_data(panic: bool) {
    let mut c = Carousel::new(RecordingHost::new(), &CarouselConfig::default())
        .with_stream(Crashing { panic });
    c.handle(Msg::Attach);
    assert!(c.pump_blocking(WAIT));
    let shown = c.host().ids();
    c.host_mut().clear_calls();

    assert!(c.pump_blocking(WAIT), "termination is delivered as an event");
    assert_eq!(
        c.host().calls(),
        &[HostCall::StreamStatus(StreamStatus::NoData)]
    );
    assert_eq!(c.host().ids(), shown);
    c.handle(Msg::Detach);
}

#[test]
fn stream_ending_early_reports_no_data() {
    terminated_stream_reports_no_data(false);
}

#[test]
fn stream_panic_reports_no_data() {
    terminated_stream_reports_no_data(true);
}

#[test]
fn scroll_offsets_reach_indicator() {
    let mut c = carousel(RecordingHost::new());
    attach_and_load(&mut c);
    c.host_mut().clear_calls();
    c.handle(ScrollEvent::DragStarted.into());
    c.handle(
        ScrollEvent::Scrolled {
            page: 1,
            fraction: 0.25,
        }
        .into(),
    );
    let offsets: Vec<_> = c
        .host()
        .calls()
        .iter()
        .filter_map(|call| match call {
            HostCall::IndicatorOffset(offset) => Some((offset.page, offset.fraction)),
            _ => None,
        })
        .collect();
    assert_eq!(offsets, vec![(1, 0.25)]);
}

#[test]
fn preview_mode_swallows_long_press() {
    let config = CarouselConfig::default().with_preview_mode(true);
    let mut c: Carousel<&'static str, _> = Carousel::new(RecordingHost::new(), &config);
    c.handle(Msg::LongPress);
    assert!(c.host().calls().is_empty());
}
