// src/pipeline/mod.rs

pub mod engine;
pub mod event_bus;
pub mod metrics;
pub mod session;

pub use engine::RecognitionEngine;
pub use event_bus::{EventBus, RecognitionEvent};
pub use metrics::{EngineMetrics, MetricsSummary};
pub use session::{read_session, SessionReplayer, SessionReport};
