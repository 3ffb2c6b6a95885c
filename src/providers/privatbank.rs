use crate::core::config::ProviderConfig;
use crate::core::date::DayRequest;
use crate::core::rates::{Currency, DayResult, ExchangeRateProvider, FetchError, RateEntry};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, error, instrument};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArchiveResponse {
    date: String,
    exchange_rate: Vec<ArchiveRate>,
}

// Commercial rates are absent for many currencies, and the base entry has
// no currency at all.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArchiveRate {
    currency: Option<String>,
    sale_rate: Option<f64>,
    purchase_rate: Option<f64>,
}

/// Exchange rate archive of PrivatBank. Owns the HTTP session used for all
/// requests of a run.
pub struct PrivatBankProvider {
    base_url: String,
    client: reqwest::Client,
}

impl PrivatBankProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(PrivatBankProvider {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn archive_url(&self, request: &DayRequest) -> String {
        format!(
            "{}/p24api/exchange_rates?json&date={}",
            self.base_url,
            request.formatted()
        )
    }
}

/// Reduces an archive payload to the tracked currencies.
fn parse_archive(body: &str) -> Result<DayResult, serde_json::Error> {
    let response: ArchiveResponse = serde_json::from_str(body)?;
    let mut result = DayResult::new(response.date);

    for rate in response.exchange_rate {
        let Some(currency) = rate
            .currency
            .as_deref()
            .and_then(|code| code.parse::<Currency>().ok())
        else {
            continue;
        };

        match (rate.sale_rate, rate.purchase_rate) {
            (Some(sale), Some(purchase)) => result.insert(RateEntry {
                currency,
                sale,
                purchase,
            }),
            _ => debug!(%currency, date = %result.date, "Skipping entry without commercial rates"),
        }
    }

    Ok(result)
}

#[async_trait]
impl ExchangeRateProvider for PrivatBankProvider {
    #[instrument(name = "PrivatBankFetch", skip(self, request), fields(date = %request))]
    async fn fetch_day(&self, request: &DayRequest) -> Result<DayResult, FetchError> {
        let url = self.archive_url(request);
        debug!("Requesting rates from {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let response_text = response.text().await?;
        parse_archive(&response_text).map_err(|e| {
            error!(
                error = ?e,
                response = %response_text,
                "Failed to parse archive response"
            );
            FetchError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    const ARCHIVE_PATH: &str = "/p24api/exchange_rates";
    const MOCK_JSON: &str = r#"{
        "date": "05.01.2024",
        "bank": "PB",
        "baseCurrency": 980,
        "baseCurrencyLit": "UAH",
        "exchangeRate": [
            {"baseCurrency": "UAH", "saleRateNB": 1.0, "purchaseRateNB": 1.0},
            {"baseCurrency": "UAH", "currency": "EUR", "saleRateNB": 41.7, "purchaseRateNB": 41.7, "saleRate": 42.0, "purchaseRate": 41.5},
            {"baseCurrency": "UAH", "currency": "GBP", "saleRateNB": 48.3, "purchaseRateNB": 48.3, "saleRate": 49.0, "purchaseRate": 47.9},
            {"baseCurrency": "UAH", "currency": "USD", "saleRateNB": 37.9, "purchaseRateNB": 37.9, "saleRate": 38.0, "purchaseRate": 37.5}
        ]
    }"#;

    fn request() -> DayRequest {
        DayRequest::new(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
    }

    fn provider_for(uri: &str) -> PrivatBankProvider {
        PrivatBankProvider::new(&ProviderConfig {
            base_url: uri.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    async fn create_mock_server(date: &str, response: ResponseTemplate) -> wiremock::MockServer {
        let mock_server = wiremock::MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(ARCHIVE_PATH))
            .and(query_param("date", date))
            .respond_with(response)
            .expect(1)
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[test]
    fn test_parse_keeps_only_tracked_currencies() {
        let result = parse_archive(MOCK_JSON).unwrap();

        assert_eq!(result.date, "05.01.2024");
        assert_eq!(result.rates.len(), 2);
        assert_eq!(
            result.rates[&Currency::Eur],
            RateEntry {
                currency: Currency::Eur,
                sale: 42.0,
                purchase: 41.5
            }
        );
        assert_eq!(
            result.rates[&Currency::Usd],
            RateEntry {
                currency: Currency::Usd,
                sale: 38.0,
                purchase: 37.5
            }
        );
    }

    #[test]
    fn test_parse_skips_entries_without_commercial_rates() {
        let body = r#"{
            "date": "01.12.2014",
            "exchangeRate": [
                {"currency": "EUR", "saleRateNB": 19.4, "purchaseRateNB": 19.4},
                {"currency": "USD", "saleRate": 15.7, "purchaseRate": 15.35}
            ]
        }"#;
        let result = parse_archive(body).unwrap();

        assert_eq!(result.rates.len(), 1);
        assert!(result.rates.contains_key(&Currency::Usd));
    }

    #[test]
    fn test_parse_empty_rate_list() {
        let result = parse_archive(r#"{"date": "05.01.2024", "exchangeRate": []}"#).unwrap();
        assert_eq!(result.date, "05.01.2024");
        assert!(result.is_empty());
    }

    #[test]
    fn test_parse_missing_fields_fails() {
        assert!(parse_archive(r#"{"exchangeRate": []}"#).is_err());
        assert!(parse_archive(r#"{"date": "05.01.2024"}"#).is_err());
        assert!(parse_archive("not json").is_err());
    }

    #[tokio::test]
    async fn test_fetch_day() {
        let mock_server = create_mock_server(
            "05.01.2024",
            ResponseTemplate::new(200).set_body_string(MOCK_JSON),
        )
        .await;
        let provider = provider_for(&mock_server.uri());

        let result = provider.fetch_day(&request()).await.unwrap();

        assert_eq!(result.date, "05.01.2024");
        let codes: Vec<_> = result.rates.keys().map(Currency::code).collect();
        assert_eq!(codes, vec!["EUR", "USD"]);
    }

    #[tokio::test]
    async fn test_fetch_day_non_ok_status() {
        let mock_server = create_mock_server("05.01.2024", ResponseTemplate::new(404)).await;
        let provider = provider_for(&mock_server.uri());

        let err = provider.fetch_day(&request()).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404 }));
    }

    #[tokio::test]
    async fn test_fetch_day_malformed_body() {
        let mock_server = create_mock_server(
            "05.01.2024",
            ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
        )
        .await;
        let provider = provider_for(&mock_server.uri());

        let err = provider.fetch_day(&request()).await.unwrap_err();

        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetch_day_transport_error() {
        // Nothing listens on the discard port
        let provider = provider_for("http://127.0.0.1:9");

        let err = provider.fetch_day(&request()).await.unwrap_err();

        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn test_fetch_day_sends_user_agent() {
        let mock_server = wiremock::MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ARCHIVE_PATH))
            .and(header("user-agent", "pbrates-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_JSON))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = PrivatBankProvider::new(&ProviderConfig {
            base_url: format!("{}/", mock_server.uri()),
            user_agent: "pbrates-test/1.0".to_string(),
        })
        .unwrap();

        let result = provider.fetch_day(&request()).await.unwrap();
        assert_eq!(result.rates.len(), 2);
    }
}
