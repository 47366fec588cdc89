//! Mock card providers.
//!
//! [`Feed`] plays the role of the provider aggregator: on every refresh it
//! asks each provider for its cards and emits the union as one raw set. The
//! status card is pinned at score 100; the quote rotates hourly; weather
//! changes each refresh so updates keep arriving mid-gesture.

use std::fmt;
use std::sync::mpsc;
use std::time::Duration;

use smartspace::{ItemStream, RawItem, StopSignal, StreamEvent, StreamId};
use web_time::{SystemTime, UNIX_EPOCH};

const QUOTES: &[(&str, &str)] = &[
    (
        "The greatest glory in living lies not in never falling, but in rising every time we fall.",
        "Nelson Mandela",
    ),
    (
        "The way to get started is to quit talking and begin doing.",
        "Walt Disney",
    ),
    (
        "Life is what happens when you're busy making other plans.",
        "John Lennon",
    ),
];

const CONDITIONS: &[&str] = &["Sunny", "Cloudy", "Showers", "Windy"];

/// Payload rendered by one carousel page.
#[derive(Debug, Clone, PartialEq)]
pub enum Card {
    Weather { temp_c: i16, condition: &'static str },
    Reminder { title: String },
    Quote { text: &'static str, author: &'static str },
    Status { text: String },
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weather { temp_c, condition } => write!(f, "{temp_c}°C {condition}"),
            Self::Reminder { title } => write!(f, "Reminder: {title}"),
            Self::Quote { text, author } => write!(f, "\"{text}\" - {author}"),
            Self::Status { text } => f.write_str(text),
        }
    }
}

/// Quote for the given hour since the epoch.
pub fn quote_for_hour(hour: u64) -> Card {
    let (text, author) = QUOTES[(hour % QUOTES.len() as u64) as usize];
    Card::Quote { text, author }
}

fn current_hour() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs() / 3600)
}

/// One refresh worth of provider output.
pub fn snapshot(refresh: u64, hour: u64) -> Vec<RawItem<Card>> {
    let mut raw = vec![
        RawItem::complete(
            "pw-status",
            100.0,
            Card::Status {
                text: "All systems normal".into(),
            },
        ),
        RawItem::complete(
            "weather",
            40.0 + (refresh % 3) as f32 * 10.0,
            Card::Weather {
                temp_c: 18 + (refresh % 7) as i16,
                condition: CONDITIONS[(refresh as usize) % CONDITIONS.len()],
            },
        ),
        RawItem::complete("quote", 20.0, quote_for_hour(hour)),
    ];
    if refresh % 2 == 1 {
        raw.push(RawItem::complete(
            "reminder",
            65.0,
            Card::Reminder {
                title: "Stand-up in 10 minutes".into(),
            },
        ));
    }
    if refresh == 0 {
        // A provider that has not resolved its score yet.
        raw.push(RawItem {
            id: Some("calendar".into()),
            score: None,
            payload: Some(Card::Reminder {
                title: "Pending sync".into(),
            }),
        });
    }
    raw
}

/// Aggregated card feed, refreshed on a fixed period while attached.
pub struct Feed {
    id: StreamId,
    period: Duration,
}

impl Feed {
    pub fn new(id: StreamId, period: Duration) -> Self {
        Self { id, period }
    }
}

impl ItemStream<Card> for Feed {
    fn id(&self) -> StreamId {
        self.id
    }

    fn run(&self, sender: mpsc::Sender<StreamEvent<Card>>, stop: StopSignal) {
        let mut refresh = 0u64;
        loop {
            let event = StreamEvent::Raw(snapshot(refresh, current_hour()));
            if sender.send(event).is_err() || stop.wait_timeout(self.period) {
                break;
            }
            refresh += 1;
        }
    }
}
