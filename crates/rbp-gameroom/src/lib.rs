pub mod orchestrator;
pub mod registry;
pub mod sink;
pub mod snapshot;

pub use orchestrator::HandOrchestrator;
pub use registry::{GameRegistry, JoinError};
pub use sink::{BroadcastSink, ChannelSink};
