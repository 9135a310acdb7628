// Vitalfeed - polling core for wearable health telemetry

pub mod error;
pub mod fetch;
pub mod normalize;
pub mod poller;
pub mod snapshot;
pub mod stats;
pub mod types;
pub mod window;

pub use error::FetchError;
pub use poller::{PollStatus, Poller, PollerConfig, PollerHandle};
pub use stats::{summarize, WindowSummary};
pub use types::{Timeline, VitalRecord};
pub use window::{BucketUnit, WindowSpec};
