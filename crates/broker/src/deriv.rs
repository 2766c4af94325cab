use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info};
use url::Url;

use common::{BrokerClient, Config, Error, OrderParams, Result, SettledTrade, TradeChooser};

use crate::session::{Action, TradeSession};
use crate::wire::{self, Inbound};

/// Live Deriv WebSocket client.
///
/// Opens one short-lived connection per operation and drives the
/// [`TradeSession`] machine over it. Every operation is bounded by
/// `timeout`: a broker that stops answering fails the attempt instead of
/// wedging the session behind it.
pub struct DerivBroker {
    endpoint: String,
    app_id: String,
    timeout: Duration,
}

impl DerivBroker {
    pub fn new(endpoint: impl Into<String>, app_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            app_id: app_id.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.deriv_endpoint, &config.deriv_app_id, config.trade_timeout)
    }

    fn url(&self) -> Result<Url> {
        let raw = format!("{}?app_id={}", self.endpoint, self.app_id);
        Url::parse(&raw).map_err(|e| Error::WebSocket(e.to_string()))
    }

    async fn run_trade_inner(
        &self,
        token: &str,
        order: &OrderParams,
        chooser: &dyn TradeChooser,
    ) -> Result<SettledTrade> {
        let url = self.url()?;
        info!(symbol = %order.symbol, "connecting to broker");
        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| Error::WebSocket(e.to_string()))?;
        let (mut write, mut read) = ws_stream.split();

        let mut session = TradeSession::new(token, order.clone());
        if let Action::Send(frame) = session.on_open()? {
            write
                .send(Message::Text(frame))
                .await
                .map_err(|e| Error::WebSocket(e.to_string()))?;
        }

        while let Some(msg) = read.next().await {
            let msg = msg.map_err(|e| Error::WebSocket(e.to_string()))?;
            let text = match msg {
                Message::Text(text) => text,
                Message::Close(_) => break,
                _ => continue,
            };

            let action = match session.on_message(&text)? {
                Action::Decide(closes) => {
                    let choice = chooser.choose(&closes);
                    info!(contract = %choice.contract_type, method = %choice.method, "placing order");
                    session.place(choice)?
                }
                action => action,
            };

            match action {
                Action::Send(frame) => {
                    write
                        .send(Message::Text(frame))
                        .await
                        .map_err(|e| Error::WebSocket(e.to_string()))?;
                }
                Action::Acked { contract_id } => {
                    debug!(contract_id, "order acknowledged");
                }
                Action::Settled(trade) => {
                    info!(profit = trade.profit, outcome = %trade.outcome, "contract settled");
                    return Ok(trade);
                }
                Action::Decide(_) | Action::Ignore => {}
            }
        }

        Err(Error::WebSocket(
            "connection closed before settlement".into(),
        ))
    }

    async fn balance_inner(&self, token: &str) -> Result<f64> {
        let url = self.url()?;
        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| Error::WebSocket(e.to_string()))?;
        let (mut write, mut read) = ws_stream.split();

        write
            .send(Message::Text(wire::authorize_request(token)))
            .await
            .map_err(|e| Error::WebSocket(e.to_string()))?;

        while let Some(msg) = read.next().await {
            let msg = msg.map_err(|e| Error::WebSocket(e.to_string()))?;
            let text = match msg {
                Message::Text(text) => text,
                Message::Close(_) => break,
                _ => continue,
            };

            match wire::parse_inbound(&text)? {
                Inbound::Authorized => {
                    write
                        .send(Message::Text(wire::balance_request()))
                        .await
                        .map_err(|e| Error::WebSocket(e.to_string()))?;
                }
                Inbound::Balance(amount) => {
                    debug!(amount, "balance received");
                    return Ok(amount);
                }
                _ => {}
            }
        }

        Err(Error::WebSocket("connection closed before balance".into()))
    }
}

#[async_trait]
impl BrokerClient for DerivBroker {
    async fn balance(&self, token: &str) -> Result<f64> {
        tokio::time::timeout(self.timeout, self.balance_inner(token))
            .await
            .map_err(|_| Error::Timeout(self.timeout.as_secs()))?
    }

    async fn run_trade(
        &self,
        token: &str,
        order: &OrderParams,
        chooser: &dyn TradeChooser,
    ) -> Result<SettledTrade> {
        tokio::time::timeout(self.timeout, self.run_trade_inner(token, order, chooser))
            .await
            .map_err(|_| Error::Timeout(self.timeout.as_secs()))?
    }
}
