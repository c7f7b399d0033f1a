#![allow(missing_docs)]

use parking_lot::Once;

mod event_tracer;
pub use event_tracer::EventTracer;

mod comps;
pub use comps::{Health, Position, TestTypes, Velocity};

mod hooks;
pub use hooks::{ComponentEvent, ComponentRecorder, SchemaEvent, SchemaRecorder};

mod systems;
pub use systems::{RecordingTracer, TraceEvent};

pub fn init() {
    static SET_LOGGER_ONCE: Once = Once::new();
    SET_LOGGER_ONCE.call_once(env_logger::init);
}
