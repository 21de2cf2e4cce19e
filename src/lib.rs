//! Booking frequency analysis.
//!
//! Load a spreadsheet of class bookings, count how often each person booked
//! inside a month window, and bucket people by that count.
//!
//! ```text
//!  .xlsx / .csv / .json
//!        │
//!        ▼
//!   data::loader  ──►  Dataset  (immutable, owned by the caller)
//!                          │
//!                          ▼
//!   analysis::frequency  ──►  FrequencyReport  ──►  export
//! ```

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod export;

pub use analysis::{analyze, FrequencyAnalyzer, FrequencyReport};
pub use config::Config;
pub use data::filter::{AnalysisWindow, WindowMode, WindowSelection};
pub use data::model::{Dataset, YearMonth};
pub use error::{AnalysisError, ConfigError, ExportError, LoadError};
