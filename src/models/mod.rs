//! Ledger entities persisted by the store

mod amount;

use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};
use serde::{Deserialize, Serialize};

pub use amount::{Amount, AmountError};

/// Deployed fungible token, keyed by the deploying inscription number
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: i64,
    // inscription info
    pub tick: String,
    pub max: Amount,
    pub lim: Amount,
    pub dec: i32,
    /// Upgradable
    pub ug: bool,
    /// Multiple mints per address allowed
    pub mp: bool,
    // deploy info
    pub deployer: String,
    pub deploy_time: i64,
    pub inscription_id: String,
    // mint progress
    pub first_number: i64,
    pub first_id: String,
    pub first_time: i64,
    pub last_number: i64,
    pub last_id: String,
    pub last_time: i64,
    pub minted: Amount,
    pub burned: Amount,
    pub circulating: Amount,
    pub holders: i64,
    // upgrade info
    pub last_upgrade_time: i64,
    pub upgrade_records: Vec<String>,
}

impl Token {
    /// `circulating == minted - burned` and `minted <= max`.
    pub fn is_consistent(&self) -> bool {
        let supply_matches = self
            .minted
            .checked_sub(&self.burned)
            .map(|c| c == self.circulating)
            .unwrap_or(false);
        supply_matches && self.minted <= self.max
    }
}

/// Holdings of one address in one token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// `{address}-{tid}`
    pub id: String,
    pub tick: String,
    pub tid: i64,
    pub inscription_id: String,
    pub address: String,
    pub balance: Amount,
    pub available_balance: Amount,
    pub transferable_balance: Amount,
    pub original_balance: Amount,
}

impl Balance {
    /// Composite primary key. Every writer and reader must build it here.
    pub fn id_for(address: &str, tid: i64) -> String {
        format!("{address}-{tid}")
    }

    /// Empty balance row for `(address, tid)`.
    pub fn new(address: &str, tid: i64, tick: &str, inscription_id: &str) -> Self {
        Self {
            id: Self::id_for(address, tid),
            tick: tick.to_string(),
            tid,
            inscription_id: inscription_id.to_string(),
            address: address.to_string(),
            ..Default::default()
        }
    }

    /// `balance == available + transferable` with no negative component.
    pub fn is_consistent(&self) -> bool {
        let parts = [
            &self.balance,
            &self.available_balance,
            &self.transferable_balance,
        ];
        if parts.iter().any(|a| a.is_negative()) {
            return false;
        }
        self.available_balance
            .checked_add(&self.transferable_balance)
            .map(|sum| sum == self.balance)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    #[default]
    Transfer,
    Inscribe,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Transfer => "TRANSFER",
            EventType::Inscribe => "INSCRIBE",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRANSFER" => Ok(EventType::Transfer),
            "INSCRIBE" => Ok(EventType::Inscribe),
            other => Err(format!("unknown event type {other:?}")),
        }
    }
}

impl FromSql for EventType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// One decoded on-chain operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub event_type: EventType,
    pub block_height: i64,
    /// Position of the operation inside its block
    pub block_index: i64,
    pub timestamp: i64,
    pub inscription_id: String,
    pub inscription_number: i64,
    pub sender: String,
    pub receiver: String,
    pub content: serde_json::Value,
    pub operation: String,
    pub function_id: i64,
    pub valid: bool,
    pub error: Option<String>,
}

/// Inscriptions of one address still waiting for confirmation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingInscriptions {
    /// Address
    pub id: String,
    pub inscriptions: Vec<String>,
}

impl PendingInscriptions {
    pub fn new(address: &str) -> Self {
        Self {
            id: address.to_string(),
            inscriptions: Vec::new(),
        }
    }

    /// Append an inscription unless it is already queued.
    pub fn push(&mut self, inscription_id: &str) -> bool {
        if self.inscriptions.iter().any(|i| i == inscription_id) {
            return false;
        }
        self.inscriptions.push(inscription_id.to_string());
        true
    }

    /// Drop a confirmed inscription. The row is kept even when the list empties.
    pub fn remove(&mut self, inscription_id: &str) -> bool {
        let before = self.inscriptions.len();
        self.inscriptions.retain(|i| i != inscription_id);
        self.inscriptions.len() != before
    }
}

/// Peer-to-peer trade offer, keyed by the deploying inscription number
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OtcOrder {
    pub id: i64,
    /// Offered token
    pub tick1: String,
    pub tid1: i64,
    pub supply: Amount,
    /// Requested token
    pub tick2: String,
    pub tid2: i64,
    /// Exchange rate
    pub er: Amount,
    /// Minimum buy amount
    pub mba: Amount,
    /// Deadline
    pub dl: i64,
    pub owner: String,
    pub deploy_time: i64,
    pub inscription_id: String,
    pub valid: bool,
    pub success: bool,
    pub received: Amount,
    /// Settlement inscription id, empty until executed
    pub execute_id: String,
}

impl OtcOrder {
    pub fn is_consistent(&self) -> bool {
        !self.received.is_negative() && self.received <= self.supply
    }
}

/// One fill against an [`OtcOrder`], keyed by the settling event id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OtcRecord {
    pub id: String,
    pub oid: i64,
    pub inscription_id: String,
    /// Buyer
    pub address: String,
    pub amount_out: Amount,
    pub amount_in: Amount,
}
