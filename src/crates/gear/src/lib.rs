//! The gear-to-gear message fabric: per-gear state plus an LLM-backed
//! processing pipeline, and a status event bus that multiplexes
//! processing state to SSE subscribers.

pub mod error;
pub mod model;
pub mod processor;
pub mod status_bus;

pub use error::{GearError, Result};
pub use model::{Example, Gear, LogEntry, Message, MessageRole, Source, LOG_CAP};
pub use processor::GearProcessor;
pub use status_bus::{StatusBus, StatusEvent, StatusKind};
