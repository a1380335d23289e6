//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! atm.toml (optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → AtmConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults, so running without a file targets a local node
//! - Secrets stay out of the file; only the key's environment variable is named
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AtmConfig;
pub use schema::ConsoleConfig;
pub use schema::LedgerConfig;
pub use schema::ObservabilityConfig;
pub use schema::WalletConfig;
