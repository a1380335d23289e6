//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events to stderr)
//!     → metrics.rs (transaction and balance-read counters)
//!
//! Consumers:
//!     → terminal / log capture
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
