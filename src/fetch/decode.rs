use chrono::{Local, TimeZone};
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::models::{Quote, SearchResult};

use super::FetchResult;

/// Separator between exchange and pair in crypto symbols, e.g. `BINANCE:BTCUSDT`.
pub const PAIR_SEPARATOR: char = ':';

#[derive(Debug, Deserialize)]
struct QuoteWire {
    c: Option<f64>,
    d: Option<f64>,
    dp: Option<f64>,
    h: Option<f64>,
    l: Option<f64>,
    o: Option<f64>,
    pc: Option<f64>,
    t: Option<i64>,
    v: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SearchWire {
    result: Option<Vec<SearchEntryWire>>,
}

#[derive(Debug, Deserialize)]
struct SearchEntryWire {
    #[serde(default)]
    description: String,
    #[serde(default, rename = "displaySymbol")]
    display_symbol: String,
    #[serde(default)]
    symbol: String,
    #[serde(default, rename = "type")]
    kind: String,
    currency: Option<String>,
}

/// Map a `/quote` body into a `Quote`.
pub fn decode_quote(symbol: &str, body: &str) -> FetchResult<Quote> {
    let root = parse_body(body)?;
    let wire: QuoteWire = serde_json::from_value(root)?;

    let price = wire
        .c
        .ok_or_else(|| AppError::malformed(format!("quote for `{symbol}` has no current price")))?;
    let previous_close = wire.pc.unwrap_or(0.0);

    // Unknown symbols come back as an all-zero payload rather than an error.
    if price == 0.0 && previous_close == 0.0 {
        return Err(AppError::malformed(format!("no quote data for `{symbol}`")));
    }

    let change = wire.d.unwrap_or(price - previous_close);
    let change_percent = wire.dp.unwrap_or_else(|| {
        if previous_close != 0.0 {
            change / previous_close * 100.0
        } else {
            0.0
        }
    });
    let timestamp = wire
        .t
        .filter(|secs| *secs > 0)
        .and_then(|secs| Local.timestamp_opt(secs, 0).single());

    Ok(Quote {
        symbol: symbol.to_string(),
        price,
        change,
        change_percent,
        open: wire.o.unwrap_or(price),
        high: wire.h.unwrap_or(price),
        low: wire.l.unwrap_or(price),
        previous_close,
        volume: wire.v,
        timestamp,
        week_change_percent: None,
        month_change_percent: None,
    })
}

/// Map a `/search` body into results, dropping crypto entries that are not exchange pairs.
pub fn decode_search(query: &str, body: &str) -> FetchResult<Vec<SearchResult>> {
    let root = parse_body(body)?;
    let wire: SearchWire = serde_json::from_value(root)?;
    let entries = wire
        .result
        .ok_or_else(|| AppError::malformed(format!("search for `{query}` has no result list")))?;

    Ok(entries
        .into_iter()
        .filter(|entry| !entry.symbol.trim().is_empty())
        .filter(|entry| !is_malformed_crypto(&entry.kind, &entry.symbol))
        .map(|entry| SearchResult {
            display_symbol: if entry.display_symbol.is_empty() {
                entry.symbol.clone()
            } else {
                entry.display_symbol
            },
            symbol: entry.symbol,
            description: entry.description,
            kind: entry.kind,
            currency: entry.currency.filter(|currency| !currency.is_empty()),
        })
        .collect())
}

pub fn is_malformed_crypto(kind: &str, symbol: &str) -> bool {
    kind.eq_ignore_ascii_case("crypto") && !symbol.contains(PAIR_SEPARATOR)
}

fn parse_body(body: &str) -> FetchResult<Value> {
    let root: Value = serde_json::from_str(body)?;
    if !root.is_object() {
        return Err(AppError::malformed("expected a JSON object"));
    }
    if let Some(message) = root.get("error").filter(|value| !value.is_null()) {
        let message = match message {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        return Err(AppError::Upstream(message));
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_quote_payload() {
        let body = r#"{"c":189.84,"d":1.25,"dp":0.6628,"h":190.32,"l":188.19,"o":188.5,"pc":188.59,"t":1700000000}"#;
        let quote = decode_quote("AAPL", body).unwrap();

        assert_eq!(quote.symbol, "AAPL");
        assert!((quote.price - 189.84).abs() < 1e-9);
        assert!((quote.change_percent - 0.6628).abs() < 1e-9);
        assert!((quote.previous_close - 188.59).abs() < 1e-9);
        assert_eq!(quote.volume, None);
        assert!(quote.timestamp.is_some());
    }

    #[test]
    fn derives_change_when_missing() {
        let body = r#"{"c":110.0,"d":null,"dp":null,"h":111,"l":100,"o":101,"pc":100.0,"t":0}"#;
        let quote = decode_quote("X", body).unwrap();

        assert!((quote.change - 10.0).abs() < 1e-9);
        assert!((quote.change_percent - 10.0).abs() < 1e-9);
        assert_eq!(quote.timestamp, None);
    }

    #[test]
    fn rejects_error_field_and_missing_price() {
        let err = decode_quote("AAPL", r#"{"error":"Invalid API key"}"#).unwrap_err();
        assert!(matches!(err, AppError::Upstream(ref msg) if msg == "Invalid API key"));

        let err = decode_quote("AAPL", r#"{"h":1.0}"#).unwrap_err();
        assert!(matches!(err, AppError::Malformed(_)));

        assert!(decode_quote("AAPL", "<html>").is_err());
    }

    #[test]
    fn treats_all_zero_quote_as_unknown_symbol() {
        let body = r#"{"c":0,"d":null,"dp":null,"h":0,"l":0,"o":0,"pc":0,"t":0}"#;
        assert!(matches!(
            decode_quote("NOPE", body).unwrap_err(),
            AppError::Malformed(_)
        ));
    }

    #[test]
    fn filters_malformed_crypto_results() {
        let body = r#"{
            "count": 4,
            "result": [
                {"description":"APPLE INC","displaySymbol":"AAPL","symbol":"AAPL","type":"Common Stock"},
                {"description":"Bitcoin","displaySymbol":"BTC/USDT","symbol":"BINANCE:BTCUSDT","type":"Crypto"},
                {"description":"Broken","displaySymbol":"BTC","symbol":"BTC","type":"crypto"},
                {"description":"Empty","displaySymbol":"","symbol":"","type":"Common Stock"}
            ]
        }"#;

        let results = decode_search("apple", body).unwrap();
        let symbols: Vec<&str> = results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "BINANCE:BTCUSDT"]);
        assert_eq!(results[1].display_symbol, "BTC/USDT");
    }

    #[test]
    fn search_without_result_list_is_malformed() {
        assert!(decode_search("x", r#"{"count":0}"#).is_err());
        assert!(decode_search("x", r#"{"error":"API limit reached"}"#).is_err());
    }
}
