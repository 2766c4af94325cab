//! Deriv wire frames: outbound request builders and inbound parsing.
//!
//! Every frame is a JSON text message. Inbound frames are dispatched on
//! their `msg_type` field first, then the payload is pulled out of the
//! envelope; anything this client did not ask for parses to
//! [`Inbound::Other`] and is skipped upstream.

use serde_json::{json, Value};

use common::{ContractType, Error, OrderParams, Result};

/// Close prices requested per history fetch. The RSI window needs 15;
/// the dashboard chart gets the rest.
pub const HISTORY_COUNT: u32 = 20;

/// Contract duration: one minute, the shortest binary the broker offers.
const DURATION_MINUTES: u32 = 1;

// ─── Outbound requests ───────────────────────────────────────────────────────

pub fn authorize_request(token: &str) -> String {
    json!({ "authorize": token }).to_string()
}

pub fn history_request(symbol: &str) -> String {
    json!({
        "ticks_history": symbol,
        "style": "close",
        "count": HISTORY_COUNT,
        "adjust_start_time": 1,
    })
    .to_string()
}

pub fn buy_request(order: &OrderParams, contract: ContractType) -> String {
    json!({
        "buy": 1,
        "price": order.stake,
        "parameters": {
            "amount": order.stake,
            "basis": "stake",
            "contract_type": contract,
            "currency": order.currency,
            "duration": DURATION_MINUTES,
            "duration_unit": "m",
            "symbol": order.symbol,
        },
    })
    .to_string()
}

pub fn balance_request() -> String {
    json!({ "balance": 1, "subscribe": 1 }).to_string()
}

// ─── Inbound parsing ─────────────────────────────────────────────────────────

/// One inbound frame, reduced to what the session machine cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// The token was accepted.
    Authorized,
    /// Close-price history, oldest first.
    History(Vec<f64>),
    /// The buy order was accepted.
    BuyAck { contract_id: u64 },
    /// Open-contract update. `is_sold` marks settlement.
    Contract { is_sold: bool, profit: f64 },
    /// Account balance snapshot or update.
    Balance(f64),
    /// Anything else the stream carries (ticks, pings, subscription echoes).
    Other,
}

/// Parse one text frame.
///
/// A top-level `error` envelope fails the frame with the broker's own
/// message, whatever the `msg_type` says. Losing that message is how
/// sessions end up waiting forever on a rejected token.
pub fn parse_inbound(text: &str) -> Result<Inbound> {
    let value: Value = serde_json::from_str(text)?;

    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown broker error");
        return Err(Error::Broker(message.to_string()));
    }

    let msg_type = match value.get("msg_type").and_then(Value::as_str) {
        Some(msg_type) => msg_type,
        None => return Ok(Inbound::Other),
    };

    match msg_type {
        "authorize" => Ok(Inbound::Authorized),
        "history" => {
            let prices = value
                .get("history")
                .and_then(|history| history.get("prices"))
                .ok_or_else(|| Error::Protocol("history frame without prices".into()))?;
            Ok(Inbound::History(parse_prices(prices)?))
        }
        "buy" => {
            let contract_id = value
                .get("buy")
                .and_then(|buy| buy.get("contract_id"))
                .and_then(Value::as_u64)
                .ok_or_else(|| Error::Protocol("buy ack without contract_id".into()))?;
            Ok(Inbound::BuyAck { contract_id })
        }
        "proposal_open_contract" => {
            let contract = value
                .get("proposal_open_contract")
                .ok_or_else(|| Error::Protocol("contract update without payload".into()))?;
            Ok(Inbound::Contract {
                is_sold: truthy(contract.get("is_sold")),
                profit: contract.get("profit").and_then(Value::as_f64).unwrap_or(0.0),
            })
        }
        "balance" => {
            let amount = value
                .get("balance")
                .and_then(|balance| balance.get("balance"))
                .and_then(Value::as_f64)
                .ok_or_else(|| Error::Protocol("balance frame without amount".into()))?;
            Ok(Inbound::Balance(amount))
        }
        _ => Ok(Inbound::Other),
    }
}

/// The broker serves `history.prices` as a JSON array, but some gateways
/// re-encode it as an object keyed by stringified index. Accept both, and
/// numbers that arrive as strings.
fn parse_prices(prices: &Value) -> Result<Vec<f64>> {
    match prices {
        Value::Array(items) => items.iter().map(as_price).collect(),
        Value::Object(map) => {
            let mut keyed = map
                .iter()
                .map(|(key, item)| {
                    let index: usize = key
                        .parse()
                        .map_err(|_| Error::Protocol(format!("non-numeric price index {key:?}")))?;
                    Ok((index, as_price(item)?))
                })
                .collect::<Result<Vec<_>>>()?;
            keyed.sort_by_key(|(index, _)| *index);
            Ok(keyed.into_iter().map(|(_, price)| price).collect())
        }
        other => Err(Error::Protocol(format!("unexpected prices shape: {other}"))),
    }
}

fn as_price(value: &Value) -> Result<f64> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| Error::Protocol(format!("price out of range: {number}"))),
        Value::String(text) => text
            .parse()
            .map_err(|_| Error::Protocol(format!("non-numeric price {text:?}"))),
        other => Err(Error::Protocol(format!("unexpected price value: {other}"))),
    }
}

/// `is_sold` arrives as a bool from some API versions and 0/1 from others.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
        _ => false,
    }
}
