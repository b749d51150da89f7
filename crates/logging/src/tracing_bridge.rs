//! crates/logging/src/tracing_bridge.rs
//! Bridge between the tracing crate and the negotiation verbosity flags.
//!
//! [`HandoffLayer`] is a `tracing-subscriber` layer that maps event targets
//! (`handoff::select`, `handoff::probe`, ...) onto [`InfoFlag`] and
//! [`DebugFlag`] values. Events that pass the layer's own
//! [`VerbosityConfig`] are appended to its [`DiagnosticSink`], whatever
//! thread emitted them.
//!
//! # Usage
//!
//! ```rust,ignore
//! use logging::{VerbosityConfig, init_tracing};
//!
//! let sink = init_tracing(VerbosityConfig::from_verbose_level(3));
//!
//! tracing::debug!(target: "handoff::probe", "probe read returned 37 bytes");
//! assert_eq!(sink.drain().len(), 1);
//! ```

use super::config::VerbosityConfig;
use super::levels::{DebugFlag, InfoFlag};
use super::sink::{DiagnosticEvent, DiagnosticSink};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// A tracing layer that bridges tracing events to the negotiation verbosity flags.
#[derive(Clone, Debug)]
pub struct HandoffLayer {
    config: VerbosityConfig,
    sink: DiagnosticSink,
}

impl HandoffLayer {
    /// Create a new layer with the given verbosity configuration and a fresh sink.
    #[must_use]
    pub fn new(config: VerbosityConfig) -> Self {
        Self::with_sink(config, DiagnosticSink::new())
    }

    /// Create a layer that records into an existing sink.
    #[must_use]
    pub const fn with_sink(config: VerbosityConfig, sink: DiagnosticSink) -> Self {
        Self { config, sink }
    }

    /// Returns a handle to the events this layer records.
    #[must_use]
    pub fn sink(&self) -> DiagnosticSink {
        self.sink.clone()
    }

    /// The configuration events are filtered against.
    #[must_use]
    pub const fn config(&self) -> &VerbosityConfig {
        &self.config
    }

    /// Map a tracing target to an info flag.
    fn target_to_info_flag(target: &str) -> Option<InfoFlag> {
        match target {
            t if t.ends_with("::connect") || t == "connect" => Some(InfoFlag::Connect),
            t if t.ends_with("::deliver") || t == "deliver" => Some(InfoFlag::Deliver),
            t if t.ends_with("::fallback") || t == "fallback" => Some(InfoFlag::Fallback),
            _ => None,
        }
    }

    /// Map a tracing target to a debug flag.
    fn target_to_debug_flag(target: &str) -> Option<DebugFlag> {
        match target {
            t if t.ends_with("::select") || t == "select" => Some(DebugFlag::Select),
            t if t.ends_with("::probe") || t == "probe" => Some(DebugFlag::Probe),
            t if t.ends_with("::pushback") || t == "pushback" => Some(DebugFlag::Pushback),
            t if t.ends_with("::pool") || t == "pool" => Some(DebugFlag::Pool),
            _ => None,
        }
    }

    /// Map a tracing level to a verbosity level.
    const fn level_to_verbosity_level(level: &Level) -> u8 {
        match *level {
            Level::ERROR | Level::WARN | Level::INFO => 1,
            Level::DEBUG => 2,
            Level::TRACE => 3,
        }
    }

    fn message(event: &tracing::Event<'_>) -> Option<String> {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        visitor.message
    }
}

impl<S> Layer<S> for HandoffLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();
        let level = Self::level_to_verbosity_level(metadata.level());

        let recorded = if let Some(flag) = Self::target_to_debug_flag(target) {
            if self.config.debug.get(flag) < level {
                return;
            }
            Self::message(event).map(|message| DiagnosticEvent::Debug {
                flag,
                level,
                message,
            })
        } else if let Some(flag) = Self::target_to_info_flag(target) {
            if self.config.info.get(flag) < level {
                return;
            }
            Self::message(event).map(|message| DiagnosticEvent::Info {
                flag,
                level,
                message,
            })
        } else {
            None
        };

        if let Some(recorded) = recorded {
            self.sink.push(recorded);
        }
    }
}

/// Visitor to extract message from tracing event.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        }
    }
}

/// Initialize tracing with the negotiation verbosity configuration.
///
/// Installs a global subscriber; calling it twice panics inside
/// `tracing-subscriber`, so binaries should call it once at startup.
/// Returns the sink the installed layer records into.
pub fn init_tracing(config: VerbosityConfig) -> DiagnosticSink {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    super::thread_local::init(config.clone());

    let layer = HandoffLayer::new(config);
    let sink = layer.sink();

    tracing_subscriber::registry().with(layer).init();
    sink
}

/// Initialize tracing with a custom filter in addition to the verbosity flags.
///
/// # Example
///
/// ```rust,ignore
/// use logging::{VerbosityConfig, init_tracing_with_filter};
/// use tracing_subscriber::EnvFilter;
///
/// let config = VerbosityConfig::from_verbose_level(1);
/// let _sink = init_tracing_with_filter(config, EnvFilter::from_default_env());
/// ```
pub fn init_tracing_with_filter<F>(config: VerbosityConfig, filter: F) -> DiagnosticSink
where
    F: Layer<tracing_subscriber::Registry> + Send + Sync + 'static,
{
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    super::thread_local::init(config.clone());

    let layer = HandoffLayer::new(config);
    let sink = layer.sink();

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .init();
    sink
}
