// Application Layer - Use Cases and Business Logic

pub mod cancel;
pub mod constants;
pub mod derived;
pub mod gateway;
pub mod info;
pub mod invoke;
pub mod orchestrator;
pub mod poller;
pub mod recurring;
pub mod registry;
pub mod retry;
pub mod sampler;
pub mod trigger;

// Re-exports
pub use cancel::{cancel_channel, CancelHandle, CancelToken};
pub use gateway::parse_default_gateway;
pub use invoke::{ProbeInvoker, ProbeOutput};
pub use orchestrator::CollectionOrchestrator;
pub use poller::{MetricsPoller, PollerState};
pub use recurring::{RecurringScheduler, RecurringTask};
pub use registry::ProbeRegistry;
pub use retry::RetryPolicy;
pub use sampler::MetricsSampler;
pub use trigger::CollectionTrigger;
