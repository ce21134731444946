//! Reconciliation checks over stored ledger state.
//!
//! These read the store and report whether supply and settlement invariants
//! hold. They never write.

use serde::Serialize;

use crate::db::Database;
use crate::error::Result;
use crate::models::Amount;

#[derive(Debug, Clone, Serialize)]
pub struct OtcAudit {
    pub oid: i64,
    pub supply: Amount,
    pub received: Amount,
    pub records: usize,
    pub total_in: Amount,
    pub total_out: Amount,
    /// `sum(amount_out) == received`
    pub received_matches: bool,
    /// `sum(amount_in) <= supply` and `received <= supply`
    pub within_supply: bool,
}

impl OtcAudit {
    pub fn is_ok(&self) -> bool {
        self.received_matches && self.within_supply
    }
}

/// Compare an order against its settlement records. `None` if no such order.
pub fn audit_otc(db: &Database, oid: i64) -> Result<Option<OtcAudit>> {
    let Some(order) = db.get_otc(oid)? else {
        return Ok(None);
    };
    let records = db.get_otc_records(oid)?;

    let mut total_in = Amount::zero();
    let mut total_out = Amount::zero();
    for record in &records {
        total_in = total_in.checked_add(&record.amount_in)?;
        total_out = total_out.checked_add(&record.amount_out)?;
    }

    let audit = OtcAudit {
        oid,
        received_matches: total_out == order.received,
        within_supply: total_in <= order.supply && order.is_consistent(),
        supply: order.supply,
        received: order.received,
        records: records.len(),
        total_in,
        total_out,
    };
    if !audit.is_ok() {
        tracing::warn!(oid, ?audit, "otc order does not reconcile");
    }
    Ok(Some(audit))
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenAudit {
    pub id: i64,
    pub tick: String,
    pub circulating: Amount,
    pub held: Amount,
    pub balances: usize,
    /// `circulating == minted - burned` and `minted <= max`
    pub supply_consistent: bool,
    /// Balance ids whose parts do not add up or go negative
    pub inconsistent_balances: Vec<String>,
    /// Sum of holder balances does not exceed circulating supply
    pub held_within_circulating: bool,
}

impl TokenAudit {
    pub fn is_ok(&self) -> bool {
        self.supply_consistent && self.inconsistent_balances.is_empty() && self.held_within_circulating
    }
}

/// Check a token's supply bookkeeping against its holders. `None` if no such token.
pub fn audit_token(db: &Database, id: i64) -> Result<Option<TokenAudit>> {
    let Some(token) = db.get_token(id)? else {
        return Ok(None);
    };
    let balances = db.get_balances_by_token(id)?;

    let mut held = Amount::zero();
    let mut inconsistent_balances = Vec::new();
    for balance in &balances {
        held = held.checked_add(&balance.balance)?;
        if !balance.is_consistent() {
            inconsistent_balances.push(balance.id.clone());
        }
    }

    let audit = TokenAudit {
        id,
        supply_consistent: token.is_consistent(),
        held_within_circulating: held <= token.circulating,
        tick: token.tick,
        circulating: token.circulating,
        held,
        balances: balances.len(),
        inconsistent_balances,
    };
    if !audit.is_ok() {
        tracing::warn!(id, ?audit, "token does not reconcile");
    }
    Ok(Some(audit))
}
