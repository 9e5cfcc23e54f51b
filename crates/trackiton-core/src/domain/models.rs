use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::timestamp::parse_series_timestamp;
use crate::{FetchError, UtcDateTime};

/// One closing price of an intraday series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotePoint {
    /// Timestamp exactly as the upstream API reported it.
    pub timestamp: String,
    pub price: f64,
}

impl QuotePoint {
    pub fn new(timestamp: impl Into<String>, price: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            price,
        }
    }
}

/// Normalized per-symbol record consumed by the rendering layer.
///
/// Only constructible through [`StockRecord::from_series`], so the derived
/// figures always agree with the series, and the series is never empty and
/// strictly ascending by timestamp. Stored records go through the same check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredStockRecord")]
pub struct StockRecord {
    symbol: String,
    name: String,
    price: f64,
    change: f64,
    change_percent: f64,
    series: Vec<QuotePoint>,
}

impl StockRecord {
    /// Builds a record from a series sorted ascending by timestamp.
    ///
    /// # Errors
    ///
    /// - [`FetchError::NoDataAvailable`] for an empty series
    /// - [`FetchError::InvalidPayload`] when a timestamp does not parse, the
    ///   series is not strictly ascending, or a price is unusable
    pub fn from_series(
        symbol: impl Into<String>,
        name: impl Into<String>,
        series: Vec<QuotePoint>,
    ) -> Result<Self, FetchError> {
        let symbol = symbol.into();
        let (first, last) = match (series.first(), series.last()) {
            (Some(first), Some(last)) => (first.price, last.price),
            _ => return Err(FetchError::no_data(symbol)),
        };

        let mut previous: Option<OffsetDateTime> = None;
        for point in &series {
            let Some(instant) = parse_series_timestamp(&point.timestamp) else {
                return Err(FetchError::invalid_payload(
                    symbol,
                    format!("malformed timestamp '{}'", point.timestamp),
                ));
            };
            if previous.is_some_and(|previous| instant <= previous) {
                return Err(FetchError::invalid_payload(
                    symbol,
                    format!("series is not strictly ascending at '{}'", point.timestamp),
                ));
            }
            previous = Some(instant);
        }

        if !first.is_finite() || !last.is_finite() {
            return Err(FetchError::invalid_payload(symbol, "price is not finite"));
        }
        if first == 0.0 {
            return Err(FetchError::invalid_payload(
                symbol,
                "first price of the series is zero; change percent is undefined",
            ));
        }

        let change = last - first;
        let change_percent = change / first * 100.0;

        Ok(Self {
            symbol,
            name: name.into(),
            price: last,
            change,
            change_percent,
            series,
        })
    }

    /// Replaces the display name; the series and derived figures are unchanged.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latest price, equal to the last point of the series.
    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn change(&self) -> f64 {
        self.change
    }

    pub fn change_percent(&self) -> f64 {
        self.change_percent
    }

    pub fn series(&self) -> &[QuotePoint] {
        &self.series
    }

    pub fn first(&self) -> &QuotePoint {
        &self.series[0]
    }

    pub fn last(&self) -> &QuotePoint {
        &self.series[self.series.len() - 1]
    }

    pub fn is_gain(&self) -> bool {
        self.change >= 0.0
    }
}

#[derive(Deserialize)]
struct StoredStockRecord {
    symbol: String,
    name: String,
    series: Vec<QuotePoint>,
}

impl TryFrom<StoredStockRecord> for StockRecord {
    type Error = FetchError;

    fn try_from(value: StoredStockRecord) -> Result<Self, Self::Error> {
        Self::from_series(value.symbol, value.name, value.series)
    }
}

/// The persisted aggregate: every record of one refresh cycle plus its fetch instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredLedger")]
pub struct FetchLedger {
    records: Vec<StockRecord>,
    fetched_at: UtcDateTime,
}

impl FetchLedger {
    /// Records are keyed by symbol; a later record for a symbol replaces the earlier one
    /// while keeping the earlier position.
    pub fn new(records: Vec<StockRecord>, fetched_at: UtcDateTime) -> Self {
        let mut unique: Vec<StockRecord> = Vec::with_capacity(records.len());
        for record in records {
            match unique.iter_mut().find(|existing| existing.symbol == record.symbol) {
                Some(existing) => *existing = record,
                None => unique.push(record),
            }
        }

        Self {
            records: unique,
            fetched_at,
        }
    }

    pub fn records(&self) -> &[StockRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<StockRecord> {
        self.records
    }

    pub fn fetched_at(&self) -> UtcDateTime {
        self.fetched_at
    }

    pub fn with_fetched_at(mut self, fetched_at: UtcDateTime) -> Self {
        self.fetched_at = fetched_at;
        self
    }

    pub fn get(&self, symbol: &str) -> Option<&StockRecord> {
        self.records.iter().find(|record| record.symbol == symbol)
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.records.iter().map(StockRecord::symbol).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLedger {
    records: Vec<StockRecord>,
    fetched_at: UtcDateTime,
}

impl From<StoredLedger> for FetchLedger {
    fn from(value: StoredLedger) -> Self {
        Self::new(value.records, value.fetched_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(prices: &[f64]) -> Vec<QuotePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(index, price)| QuotePoint::new(format!("2024-01-10 10:{:02}:00", index * 5), *price))
            .collect()
    }

    fn record(symbol: &str, prices: &[f64]) -> StockRecord {
        StockRecord::from_series(symbol, symbol, points(prices)).expect("valid record")
    }

    #[test]
    fn derives_price_and_change_from_series_ends() {
        let record = record("AAPL", &[100.0, 104.0, 110.0]);

        assert_eq!(record.price(), 110.0);
        assert_eq!(record.change(), 10.0);
        assert!((record.change_percent() - 10.0).abs() < 1e-9);
        assert_eq!(record.first().price, 100.0);
        assert_eq!(record.last().price, 110.0);
        assert!(record.is_gain());
    }

    #[test]
    fn empty_series_is_no_data() {
        let err = StockRecord::from_series("AAPL", "Apple", Vec::new()).expect_err("must fail");
        assert_eq!(err, FetchError::no_data("AAPL"));
    }

    #[test]
    fn descending_series_is_rejected() {
        let series = vec![
            QuotePoint::new("2024-01-10 16:00:00", 200.0),
            QuotePoint::new("2024-01-10 09:35:00", 100.0),
        ];

        let err = StockRecord::from_series("AAPL", "Apple", series).expect_err("must fail");
        assert!(matches!(err, FetchError::InvalidPayload { .. }));
    }

    #[test]
    fn repeated_instant_is_rejected() {
        let series = vec![
            QuotePoint::new("2024-01-10 09:35:00", 1.0),
            QuotePoint::new("2024-01-10T09:35:00Z", 2.0),
        ];
        assert!(StockRecord::from_series("AAPL", "Apple", series).is_err());
    }

    #[test]
    fn unparseable_timestamp_is_rejected() {
        let series = vec![QuotePoint::new("ten past nine", 1.0)];
        let err = StockRecord::from_series("AAPL", "Apple", series).expect_err("must fail");
        assert!(matches!(err, FetchError::InvalidPayload { .. }));
    }

    #[test]
    fn zero_base_price_is_rejected() {
        let err = StockRecord::from_series("AAPL", "Apple", points(&[0.0, 5.0])).expect_err("must fail");
        assert!(matches!(err, FetchError::InvalidPayload { .. }));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let value = serde_json::to_value(record("JPM", &[50.0, 45.0])).expect("serialize");
        let change_percent = value["changePercent"].as_f64().expect("number");
        assert!((change_percent + 10.0).abs() < 1e-9);
        assert_eq!(value["series"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn stored_record_with_empty_series_fails_to_deserialize() {
        let raw = r#"{"symbol":"AAPL","name":"Apple","price":1.0,"change":0.0,"changePercent":0.0,"series":[]}"#;
        assert!(serde_json::from_str::<StockRecord>(raw).is_err());
    }

    #[test]
    fn stored_record_out_of_order_fails_to_deserialize() {
        let raw = r#"{"symbol":"AAPL","name":"Apple","price":100.0,"change":-100.0,"changePercent":-50.0,"series":[{"timestamp":"2024-01-10 16:00:00","price":200.0},{"timestamp":"2024-01-10 09:35:00","price":100.0}]}"#;
        assert!(serde_json::from_str::<StockRecord>(raw).is_err());
    }

    #[test]
    fn ledger_keeps_one_record_per_symbol() {
        let ledger = FetchLedger::new(
            vec![record("AAPL", &[1.0, 2.0]), record("JPM", &[3.0]), record("AAPL", &[5.0, 6.0])],
            UtcDateTime::now(),
        );

        assert_eq!(ledger.symbols(), vec!["AAPL", "JPM"]);
        assert_eq!(ledger.get("AAPL").map(StockRecord::price), Some(6.0));
    }

    #[test]
    fn symbols_are_case_sensitive() {
        let ledger = FetchLedger::new(vec![record("aapl", &[1.0]), record("AAPL", &[2.0])], UtcDateTime::now());
        assert_eq!(ledger.len(), 2);
    }
}
