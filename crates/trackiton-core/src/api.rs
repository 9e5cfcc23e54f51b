//! Query construction for the Alpha Vantage style market-data endpoint.

use std::fmt::{Display, Formatter};

use crate::Interval;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Upstream `function` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFunction {
    TimeSeriesIntraday,
    Overview,
}

impl ApiFunction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TimeSeriesIntraday => "TIME_SERIES_INTRADAY",
            Self::Overview => "OVERVIEW",
        }
    }
}

impl Display for ApiFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single upstream call, independent of the credentials used to issue it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub function: ApiFunction,
    pub symbol: String,
    pub interval: Option<Interval>,
}

impl ApiRequest {
    pub fn intraday(symbol: impl Into<String>, interval: Interval) -> Self {
        Self {
            function: ApiFunction::TimeSeriesIntraday,
            symbol: symbol.into(),
            interval: Some(interval),
        }
    }

    pub fn overview(symbol: impl Into<String>) -> Self {
        Self {
            function: ApiFunction::Overview,
            symbol: symbol.into(),
            interval: None,
        }
    }

    pub fn url(&self, base_url: &str, api_key: &str) -> String {
        let mut url = format!(
            "{base_url}?function={}&symbol={}",
            self.function.as_str(),
            urlencoding::encode(&self.symbol)
        );
        if let Some(interval) = self.interval {
            url.push_str("&interval=");
            url.push_str(interval.as_str());
        }
        url.push_str("&apikey=");
        url.push_str(&urlencoding::encode(api_key));
        url
    }
}

/// Replaces the `apikey` query value so URLs can be logged.
pub fn redact(url: &str) -> String {
    let Some(start) = url.find("apikey=").map(|index| index + "apikey=".len()) else {
        return url.to_owned();
    };
    let end = url[start..]
        .find('&')
        .map(|offset| start + offset)
        .unwrap_or(url.len());

    format!("{}***{}", &url[..start], &url[end..])
}
