mod requests_logging;
#[cfg(feature = "slowdown")]
mod random_slowdown;

pub use requests_logging::{log_requests, RequestsLoggingLevel};
#[cfg(feature = "slowdown")]
pub use random_slowdown::slowdown_request;
