//! Forwards `tracing` events from the shared crates to the browser console.

use leptos::logging::{error, log, warn};
use std::fmt::Debug;
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Default)]
struct Fields {
    message: String,
    rest: Vec<String>,
}

impl Visit for Fields {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.rest.push(format!("{}={value}", field.name()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.rest.push(format!("{}={value:?}", field.name()));
        }
    }
}

fn format_event(event: &Event<'_>) -> String {
    let mut fields = Fields::default();
    event.record(&mut fields);
    let mut line = format!("{}: {}", event.metadata().target(), fields.message);
    for field in fields.rest {
        line.push(' ');
        line.push_str(&field);
    }
    line
}

pub struct ConsoleLayer {
    emit: fn(&Level, String),
}

impl ConsoleLayer {
    pub fn new() -> Self {
        Self { emit: to_console }
    }
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        (self.emit)(event.metadata().level(), format_event(event));
    }
}

fn to_console(level: &Level, line: String) {
    match *level {
        Level::ERROR => error!("{line}"),
        Level::WARN => warn!("{line}"),
        _ => log!("{line}"),
    }
}

pub fn init() {
    let subscriber = tracing_subscriber::registry()
        .with(LevelFilter::DEBUG)
        .with(ConsoleLayer::new());
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        warn!("console logging was already initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_core::session::{AuthContext, AuthState};
    use std::cell::RefCell;

    thread_local! {
        static LINES: RefCell<Vec<(Level, String)>> = RefCell::new(Vec::new());
    }

    fn capture(level: &Level, line: String) {
        LINES.with(|lines| lines.borrow_mut().push((*level, line)));
    }

    #[test]
    fn auth_provider_errors_reach_the_console() {
        let subscriber = tracing_subscriber::registry().with(ConsoleLayer { emit: capture });
        tracing::subscriber::with_default(subscriber, || {
            let mut auth = AuthContext::new();
            auth.on_auth_error("popup closed by user");
            assert_eq!(auth.state(), &AuthState::SignedOut);
        });

        let lines = LINES.with(|lines| lines.borrow().clone());
        assert_eq!(lines.len(), 1);
        let (level, line) = &lines[0];
        assert_eq!(*level, Level::WARN);
        assert!(line.starts_with("relief_core::session: auth provider error"));
        assert!(line.contains("error=popup closed by user"));
    }
}
