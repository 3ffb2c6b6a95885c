//! Core business logic abstractions

pub mod config;
pub mod date;
pub mod fetcher;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use date::DayRequest;
pub use fetcher::{MAX_DAYS, RateFetcher, parse_days};
pub use rates::{
    Currency, DayOutcome, DayResult, ExchangeRateProvider, FetchError, RateEntry, ResultSet,
};
