//! # Domain Models
//!
//! Canonical types shared by the fetcher, normalizer, scheduler and store.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`QuotePoint`] | One `(timestamp, price)` point of an intraday series |
//! | [`StockRecord`] | Normalized record with latest price and change figures |
//! | [`FetchLedger`] | Persisted set of records plus their fetch instant |
//! | [`Interval`] | Intraday bucket size (`1min` .. `60min`) |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! `StockRecord` can only be built from a non-empty series in strictly
//! ascending timestamp order, so a record handed to callers is always complete:
//!
//! ```rust
//! use trackiton_core::{QuotePoint, StockRecord};
//!
//! let record = StockRecord::from_series(
//!     "AAPL",
//!     "Apple Inc.",
//!     vec![
//!         QuotePoint::new("2024-01-10 09:35:00", 180.0),
//!         QuotePoint::new("2024-01-10 09:40:00", 189.0),
//!     ],
//! )?;
//! assert_eq!(record.price(), 189.0);
//! assert_eq!(record.change(), 9.0);
//! # Ok::<(), trackiton_core::FetchError>(())
//! ```

mod interval;
mod models;
mod timestamp;

pub use interval::Interval;
pub use models::{FetchLedger, QuotePoint, StockRecord};
pub use timestamp::{parse_series_timestamp, UtcDateTime};
