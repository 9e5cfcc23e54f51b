//! Conversion of raw intraday payloads into [`StockRecord`]s.

use serde_json::Value;

use crate::domain::parse_series_timestamp;
use crate::{FetchError, Interval, QuotePoint, StockRecord};

const CLOSE_FIELD: &str = "4. close";
const META_FIELD: &str = "Meta Data";
const NAME_FIELD: &str = "Name";

/// Normalizes a `TIME_SERIES_INTRADAY` payload requested with the default interval.
pub fn normalize(symbol: &str, payload: &Value) -> Result<StockRecord, FetchError> {
    normalize_with_interval(symbol, payload, Interval::default())
}

/// Normalizes a `TIME_SERIES_INTRADAY` payload for `interval`.
///
/// The series mapping is re-sorted by parsed timestamp; upstream key order is
/// not relied on. Any unparseable entry fails the whole symbol.
///
/// # Errors
///
/// - [`FetchError::NoDataAvailable`] when the series field is absent, not an object, or empty
/// - [`FetchError::InvalidPayload`] on a malformed timestamp or price, duplicate
///   timestamps, or a zero first price
pub fn normalize_with_interval(
    symbol: &str,
    payload: &Value,
    interval: Interval,
) -> Result<StockRecord, FetchError> {
    let series = payload
        .get(interval.series_key())
        .and_then(Value::as_object)
        .filter(|series| !series.is_empty())
        .ok_or_else(|| FetchError::no_data(symbol))?;

    let mut points = Vec::with_capacity(series.len());
    for (timestamp, values) in series {
        let instant = parse_series_timestamp(timestamp).ok_or_else(|| {
            FetchError::invalid_payload(symbol, format!("malformed timestamp '{timestamp}'"))
        })?;
        let price = values.get(CLOSE_FIELD).and_then(parse_price).ok_or_else(|| {
            FetchError::invalid_payload(symbol, format!("missing or non-numeric close at '{timestamp}'"))
        })?;
        points.push((instant, QuotePoint::new(timestamp.clone(), price)));
    }

    points.sort_by(|left, right| left.0.cmp(&right.0));
    if let Some(pair) = points.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        return Err(FetchError::invalid_payload(
            symbol,
            format!(
                "timestamps '{}' and '{}' denote the same instant",
                pair[0].1.timestamp, pair[1].1.timestamp
            ),
        ));
    }

    let name = display_name(payload).unwrap_or_else(|| symbol.to_owned());
    let series = points.into_iter().map(|(_, point)| point).collect();
    StockRecord::from_series(symbol, name, series)
}

/// Company name from an `OVERVIEW` payload.
pub fn company_name(payload: &Value) -> Option<String> {
    non_blank(payload.get(NAME_FIELD)?)
}

/// Name advertised in the payload's metadata block, if any.
fn display_name(payload: &Value) -> Option<String> {
    let meta = payload.get(META_FIELD)?.as_object()?;
    meta.iter()
        .find(|(key, _)| key.as_str() == NAME_FIELD || key.ends_with(". Name"))
        .and_then(|(_, value)| non_blank(value))
}

fn non_blank(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

fn parse_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        Value::Number(number) => number.as_f64()?,
        _ => return None,
    };
    price.is_finite().then_some(price)
}
