use crate::core::date::{DayRequest, day_requests};
use crate::core::rates::{DayOutcome, ExchangeRateProvider, ResultSet};
use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{debug, instrument, warn};

/// Upper bound on the number of days fetched in one run.
pub const MAX_DAYS: u32 = 10;

/// Validates the day count argument. Only ASCII digits are accepted; values
/// too large to represent are clamped later like any other value above
/// [`MAX_DAYS`].
pub fn parse_days(arg: &str) -> Result<u32, String> {
    if arg.is_empty() || !arg.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!(
            "expected a whole number of days made of digits only, got '{arg}'"
        ));
    }
    Ok(arg.parse::<u32>().unwrap_or(u32::MAX))
}

pub struct RateFetcher<P: ExchangeRateProvider> {
    provider: P,
    days: u32,
}

impl<P: ExchangeRateProvider> RateFetcher<P> {
    pub fn new(provider: P, days: u32) -> Self {
        let clamped = days.min(MAX_DAYS);
        if clamped != days {
            debug!(requested = days, clamped, "Clamping day count");
        }
        Self {
            provider,
            days: clamped,
        }
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    #[instrument(name = "FetchDay", skip(self, request), fields(date = %request))]
    pub async fn fetch_one(&self, request: &DayRequest) -> DayOutcome {
        match self.provider.fetch_day(request).await {
            Ok(result) => {
                debug!(currencies = result.rates.len(), "Fetched rates");
                DayOutcome::Fetched(result)
            }
            Err(error) => {
                warn!(error = %error, "Failed to fetch rates");
                DayOutcome::Failed {
                    date: request.formatted(),
                    error,
                }
            }
        }
    }

    pub async fn fetch_all(&self, today: NaiveDate) -> ResultSet {
        self.fetch_all_with(today, |_| {}).await
    }

    /// Fetches every configured day concurrently. `on_done` runs as each
    /// fetch completes; the returned set is ordered by day offset regardless
    /// of completion order.
    pub async fn fetch_all_with<F>(&self, today: NaiveDate, on_done: F) -> ResultSet
    where
        F: Fn(&DayOutcome),
    {
        let requests = day_requests(today, self.days);
        debug!(count = requests.len(), "Launching day fetches");

        let on_done = &on_done;
        let fetches = requests.iter().map(|request| async move {
            let outcome = self.fetch_one(request).await;
            on_done(&outcome);
            outcome
        });

        ResultSet::new(join_all(fetches).await)
    }

    /// Releases the provider and its HTTP session. Dropping the fetcher has
    /// the same effect.
    pub fn close(self) {
        debug!("Closing rate fetcher");
    }
}
