//! Data layer: booking records, loading, and window filtering.
//!
//! Architecture:
//! ```text
//!  .xlsx / .csv / .json
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ Dataset   │  Vec<BookingRecord>, period index
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  window + class exclusion → matching records
//!   └──────────┘
//! ```

pub mod filter;
pub mod loader;
pub mod model;
