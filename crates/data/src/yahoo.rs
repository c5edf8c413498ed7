use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use stockflow_config::UpstreamConfig;
use stockflow_core::error::{FlowError, Result};
use stockflow_core::models::{EstimatedStats, PriceHistory};
use stockflow_core::stats;

/// Client for the Yahoo Finance v8 chart endpoint.
///
/// One outbound request per call, no caching, no retry. The endpoint
/// rejects requests without a browser-like User-Agent.
pub struct YahooClient {
    client: Client,
    base_url: String,
    user_agent: String,
    range: String,
    interval: String,
}

impl YahooClient {
    pub fn new(config: &UpstreamConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            range: config.range.clone(),
            interval: config.interval.clone(),
        }
    }

    /// Fetch the daily adjusted-close history for `symbol` over the
    /// configured lookback window. The symbol is passed through to the
    /// provider as-is.
    pub async fn fetch_daily_history(&self, symbol: &str) -> Result<PriceHistory> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval={}",
            self.base_url, symbol, self.range, self.interval
        );

        debug!("chart request: {}", url);

        let resp = self
            .client
            .get(&url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(FlowError::UpstreamUnavailable);
        }

        let body = resp.text().await?;
        parse_chart(symbol, &body)
    }

    /// Full estimator pipeline: fetch, derive log-returns, reduce to
    /// drift/volatility/price. Either a complete `EstimatedStats` or an
    /// error; never a partial result.
    pub async fn estimate_statistics(&self, symbol: &str) -> Result<EstimatedStats> {
        if symbol.is_empty() {
            return Err(FlowError::MissingSymbol);
        }
        let history = self.fetch_daily_history(symbol).await?;
        stats::estimate(&history)
    }
}

/// Decode the nested chart/result payload. A missing or malformed
/// series is an empty sequence, not an error; only an unparseable body
/// fails (as `Upstream`).
pub fn parse_chart(symbol: &str, body: &str) -> Result<PriceHistory> {
    let json: serde_json::Value = serde_json::from_str(body)?;
    let result = json
        .get("chart")
        .and_then(|c| c.get("result"))
        .and_then(|r| r.get(0));

    let closes: Vec<Option<f64>> = result
        .and_then(|r| r.get("indicators"))
        .and_then(|i| i.get("adjclose"))
        .and_then(|a| a.get(0))
        .and_then(|a| a.get("adjclose"))
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().map(|v| v.as_f64()).collect())
        .unwrap_or_default();

    let market_price = result
        .and_then(|r| r.get("meta"))
        .and_then(|m| m.get("regularMarketPrice"))
        .and_then(|v| v.as_f64());

    Ok(PriceHistory {
        symbol: symbol.to_string(),
        closes,
        market_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART_BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": { "regularMarketPrice": 123.45, "symbol": "AAPL" },
                "indicators": {
                    "adjclose": [{ "adjclose": [100.0, null, 101.5, 102.25] }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_closes_and_market_price() {
        let history = parse_chart("AAPL", CHART_BODY).unwrap();
        assert_eq!(history.symbol, "AAPL");
        assert_eq!(
            history.closes,
            vec![Some(100.0), None, Some(101.5), Some(102.25)]
        );
        assert_eq!(history.market_price, Some(123.45));
    }

    #[test]
    fn missing_series_is_empty_not_fatal() {
        let history =
            parse_chart("AAPL", r#"{"chart":{"result":[{"meta":{}}],"error":null}}"#).unwrap();
        assert!(history.closes.is_empty());
        assert_eq!(history.market_price, None);
    }

    #[test]
    fn empty_result_array_is_empty_history() {
        let history = parse_chart("ZZZZ", r#"{"chart":{"result":[],"error":null}}"#).unwrap();
        assert!(history.closes.is_empty());
    }

    #[test]
    fn unparseable_body_is_upstream_error() {
        let err = parse_chart("AAPL", "<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, FlowError::Upstream(_)));
    }
}
