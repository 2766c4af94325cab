//! Per-attempt protocol state machine.
//!
//! Pure: owns no socket and performs no I/O. The connection driver feeds it
//! the open event and inbound frames; it answers with the next [`Action`].
//! A buy frame can only come out of [`TradeSession::place`], and `place` is
//! only legal in `AwaitingDecision`, so one attempt can never submit two
//! orders no matter how often the broker repeats itself.

use common::{Error, OrderParams, Result, SettledTrade, TradeChoice};

use crate::wire::{self, Inbound};

/// Where a single trade attempt stands.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Socket not open yet.
    Connecting,
    /// `authorize` sent, waiting for the broker to accept the token.
    Authenticating,
    /// `ticks_history` sent, waiting for the close-price window.
    FetchingHistory,
    /// History in hand; the driver must pick a contract and call `place`.
    AwaitingDecision { closes: Vec<f64> },
    /// Buy frame written, not acknowledged yet.
    OrderSubmitted { choice: TradeChoice },
    /// Buy acknowledged; waiting for the contract to be sold.
    AwaitingSettlement { choice: TradeChoice, contract_id: u64 },
    /// Settled. Terminal.
    Closed,
}

/// What the connection driver should do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Write this frame to the socket.
    Send(String),
    /// Consult the chooser over these closes, then call `place`.
    Decide(Vec<f64>),
    /// The order was accepted; nothing to write.
    Acked { contract_id: u64 },
    /// The contract sold. The attempt is over.
    Settled(SettledTrade),
    /// Frame irrelevant to this attempt.
    Ignore,
}

/// Protocol state for one trade attempt.
#[derive(Debug)]
pub struct TradeSession {
    token: String,
    order: OrderParams,
    state: SessionState,
}

impl TradeSession {
    pub fn new(token: impl Into<String>, order: OrderParams) -> Self {
        Self {
            token: token.into(),
            order,
            state: SessionState::Connecting,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, SessionState::Closed)
    }

    /// The socket opened. Returns the authorize frame to send.
    pub fn on_open(&mut self) -> Result<Action> {
        match self.state {
            SessionState::Connecting => {
                self.state = SessionState::Authenticating;
                Ok(Action::Send(wire::authorize_request(&self.token)))
            }
            ref state => Err(Error::Protocol(format!("socket opened in state {state:?}"))),
        }
    }

    /// Feed one inbound text frame and advance.
    ///
    /// Broker error envelopes and malformed frames surface as `Err` and
    /// leave the attempt wherever it was; the driver fails the attempt.
    pub fn on_message(&mut self, text: &str) -> Result<Action> {
        let inbound = wire::parse_inbound(text)?;
        let state = std::mem::replace(&mut self.state, SessionState::Closed);
        let (state, action) = step(state, inbound, &self.order);
        self.state = state;
        Ok(action)
    }

    /// Submit the chosen contract. Only legal while the attempt is awaiting
    /// a decision, which makes a second order per attempt unrepresentable.
    pub fn place(&mut self, choice: TradeChoice) -> Result<Action> {
        match self.state {
            SessionState::AwaitingDecision { .. } => {
                let frame = wire::buy_request(&self.order, choice.contract_type);
                self.state = SessionState::OrderSubmitted { choice };
                Ok(Action::Send(frame))
            }
            ref state => Err(Error::Protocol(format!("order placed in state {state:?}"))),
        }
    }
}

/// The transition table. Anything not listed keeps its state and ignores
/// the frame: repeated history after submission, unsold contract updates,
/// balance pushes, raw ticks.
fn step(state: SessionState, inbound: Inbound, order: &OrderParams) -> (SessionState, Action) {
    match (state, inbound) {
        (SessionState::Authenticating, Inbound::Authorized) => (
            SessionState::FetchingHistory,
            Action::Send(wire::history_request(&order.symbol)),
        ),
        (SessionState::FetchingHistory, Inbound::History(closes)) => (
            SessionState::AwaitingDecision {
                closes: closes.clone(),
            },
            Action::Decide(closes),
        ),
        (SessionState::OrderSubmitted { choice }, Inbound::BuyAck { contract_id }) => (
            SessionState::AwaitingSettlement {
                choice,
                contract_id,
            },
            Action::Acked { contract_id },
        ),
        // Settlement counts from either side of the ack: the sold update can
        // overtake or replace a lost buy acknowledgment.
        (
            SessionState::OrderSubmitted { choice },
            Inbound::Contract {
                is_sold: true,
                profit,
            },
        )
        | (
            SessionState::AwaitingSettlement { choice, .. },
            Inbound::Contract {
                is_sold: true,
                profit,
            },
        ) => (
            SessionState::Closed,
            Action::Settled(SettledTrade::new(choice, profit)),
        ),
        (state, _) => (state, Action::Ignore),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{ContractType, EntryMethod, TradeOutcome};
    use serde_json::Value;

    fn order() -> OrderParams {
        OrderParams {
            symbol: "R_50".into(),
            stake: 0.35,
            currency: "USD".into(),
        }
    }

    fn choice() -> TradeChoice {
        TradeChoice {
            contract_type: ContractType::Call,
            method: EntryMethod::RsiLow,
        }
    }

    fn history_frame(prices: &[f64]) -> String {
        serde_json::json!({
            "msg_type": "history",
            "history": { "prices": prices }
        })
        .to_string()
    }

    const AUTH_OK: &str = r#"{"msg_type":"authorize","authorize":{"loginid":"CR1"}}"#;
    const BUY_OK: &str = r#"{"msg_type":"buy","buy":{"contract_id":7001,"buy_price":0.35}}"#;
    const SOLD: &str = r#"{"msg_type":"proposal_open_contract","proposal_open_contract":{"is_sold":1,"profit":0.31}}"#;
    const OPEN: &str = r#"{"msg_type":"proposal_open_contract","proposal_open_contract":{"is_sold":0}}"#;

    #[test]
    fn happy_path_reaches_settlement() {
        let mut session = TradeSession::new("tok", order());

        let auth = session.on_open().unwrap();
        let Action::Send(frame) = auth else {
            panic!("expected authorize frame")
        };
        let frame: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(frame["authorize"], "tok");

        let Action::Send(frame) = session.on_message(AUTH_OK).unwrap() else {
            panic!("expected history request")
        };
        assert!(frame.contains("ticks_history"));

        let closes = vec![1.0, 2.0, 3.0];
        let Action::Decide(seen) = session.on_message(&history_frame(&closes)).unwrap() else {
            panic!("expected a decision point")
        };
        assert_eq!(seen, closes);

        let Action::Send(frame) = session.place(choice()).unwrap() else {
            panic!("expected buy frame")
        };
        assert!(frame.contains("\"buy\":1"));

        assert_eq!(
            session.on_message(BUY_OK).unwrap(),
            Action::Acked { contract_id: 7001 }
        );
        assert_eq!(
            session.state(),
            &SessionState::AwaitingSettlement {
                choice: choice(),
                contract_id: 7001
            }
        );

        let Action::Settled(trade) = session.on_message(SOLD).unwrap() else {
            panic!("expected settlement")
        };
        assert_eq!(trade.profit, 0.31);
        assert_eq!(trade.outcome, TradeOutcome::Win);
        assert_eq!(trade.choice, choice());
        assert!(session.is_closed());
    }

    #[test]
    fn repeated_history_cannot_place_a_second_order() {
        let mut session = TradeSession::new("tok", order());
        session.on_open().unwrap();
        session.on_message(AUTH_OK).unwrap();
        session.on_message(&history_frame(&[1.0, 2.0])).unwrap();
        session.place(choice()).unwrap();

        // The broker repeats the history frame. The machine shrugs.
        assert_eq!(
            session.on_message(&history_frame(&[1.0, 2.0])).unwrap(),
            Action::Ignore
        );
        // And a direct second placement is a hard error.
        assert!(matches!(session.place(choice()), Err(Error::Protocol(_))));
    }

    #[test]
    fn settlement_does_not_require_the_buy_ack() {
        let mut session = TradeSession::new("tok", order());
        session.on_open().unwrap();
        session.on_message(AUTH_OK).unwrap();
        session.on_message(&history_frame(&[1.0])).unwrap();
        session.place(choice()).unwrap();

        // Sold update arrives without a preceding ack.
        let Action::Settled(trade) = session.on_message(SOLD).unwrap() else {
            panic!("expected settlement")
        };
        assert_eq!(trade.profit, 0.31);
        assert!(session.is_closed());
    }

    #[test]
    fn unsold_updates_keep_waiting() {
        let mut session = TradeSession::new("tok", order());
        session.on_open().unwrap();
        session.on_message(AUTH_OK).unwrap();
        session.on_message(&history_frame(&[1.0])).unwrap();
        session.place(choice()).unwrap();
        session.on_message(BUY_OK).unwrap();

        assert_eq!(session.on_message(OPEN).unwrap(), Action::Ignore);
        assert!(!session.is_closed());
    }

    #[test]
    fn zero_profit_settles_as_a_loss() {
        let mut session = TradeSession::new("tok", order());
        session.on_open().unwrap();
        session.on_message(AUTH_OK).unwrap();
        session.on_message(&history_frame(&[1.0])).unwrap();
        session.place(choice()).unwrap();

        let sold = r#"{"msg_type":"proposal_open_contract","proposal_open_contract":{"is_sold":true,"profit":0.0}}"#;
        let Action::Settled(trade) = session.on_message(sold).unwrap() else {
            panic!("expected settlement")
        };
        assert_eq!(trade.outcome, TradeOutcome::Loss);
    }

    #[test]
    fn place_is_rejected_before_history() {
        let mut session = TradeSession::new("tok", order());
        session.on_open().unwrap();
        assert!(matches!(session.place(choice()), Err(Error::Protocol(_))));
    }

    #[test]
    fn broker_error_surfaces_and_state_holds() {
        let mut session = TradeSession::new("tok", order());
        session.on_open().unwrap();

        let err = session
            .on_message(r#"{"error":{"code":"InvalidToken","message":"The token is invalid."}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Broker(_)));
        assert_eq!(session.state(), &SessionState::Authenticating);
    }

    #[test]
    fn frames_after_close_are_ignored() {
        let mut session = TradeSession::new("tok", order());
        session.on_open().unwrap();
        session.on_message(AUTH_OK).unwrap();
        session.on_message(&history_frame(&[1.0])).unwrap();
        session.place(choice()).unwrap();
        session.on_message(SOLD).unwrap();

        assert_eq!(session.on_message(SOLD).unwrap(), Action::Ignore);
        assert!(session.is_closed());
    }
}
