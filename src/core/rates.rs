//! Exchange rate abstractions and core types

use crate::core::date::DayRequest;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// Currencies the application keeps from a provider payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Currency {
    Eur,
    Usd,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            _ => Err(anyhow::anyhow!("Currency not tracked: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateEntry {
    pub currency: Currency,
    pub sale: f64,
    pub purchase: f64,
}

/// Rates published by the provider for a single date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DayResult {
    pub date: String,
    pub rates: BTreeMap<Currency, RateEntry>,
}

impl DayResult {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            rates: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, entry: RateEntry) {
        self.rates.insert(entry.currency, entry);
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The provider answered with something other than 200 OK.
    #[error("{status}")]
    Status { status: u16 },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Outcome of fetching one day.
#[derive(Debug)]
pub enum DayOutcome {
    Fetched(DayResult),
    Failed { date: String, error: FetchError },
}

impl DayOutcome {
    pub fn date(&self) -> &str {
        match self {
            DayOutcome::Fetched(result) => &result.date,
            DayOutcome::Failed { date, .. } => date,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DayOutcome::Failed { .. })
    }

    /// Collapses a failure into an empty result for the requested date.
    pub fn into_day_result(self) -> DayResult {
        match self {
            DayOutcome::Fetched(result) => result,
            DayOutcome::Failed { date, .. } => DayResult::new(date),
        }
    }
}

/// Per-day outcomes in the order the days were requested.
#[derive(Debug, Default)]
pub struct ResultSet {
    outcomes: Vec<DayOutcome>,
}

impl ResultSet {
    pub fn new(outcomes: Vec<DayOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcomes(&self) -> &[DayOutcome] {
        &self.outcomes
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &FetchError)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            DayOutcome::Failed { date, error } => Some((date.as_str(), error)),
            DayOutcome::Fetched(_) => None,
        })
    }

    /// One result per requested day, failures included as empty placeholders.
    pub fn into_day_results(self) -> Vec<DayResult> {
        self.outcomes
            .into_iter()
            .map(DayOutcome::into_day_result)
            .collect()
    }

    pub fn non_empty(&self) -> Vec<&DayResult> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                DayOutcome::Fetched(result) if !result.is_empty() => Some(result),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    async fn fetch_day(&self, request: &DayRequest) -> Result<DayResult, FetchError>;
}
