//! Data layer: core types, loading, option extraction and filtering.
//!
//! Architecture:
//! ```text
//!  .xlsx / .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → FacilityTable
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────────┐
//!   │ FacilityTable  │  Vec<FacilityRecord>
//!   └───────────────┘
//!        │                      │
//!        ▼                      ▼
//!   ┌──────────┐          ┌──────────┐
//!   │ options   │          │  filter   │  selection + matcher → FilteredView
//!   └──────────┘          └──────────┘
//!                                │
//!                                ▼
//!                          ┌──────────┐      ┌──────────┐
//!                          │ geocode   │      │ boundary  │  GeoJSON overlay
//!                          └──────────┘      └──────────┘
//! ```

pub mod boundary;
pub mod filter;
pub mod geocode;
pub mod loader;
pub mod matching;
pub mod model;
pub mod options;
