//! Read access. Point lookups return `Ok(None)` when the row does not exist.

use rusqlite::params;

use super::{traced, Database, TableKind};
use crate::error::Result;
use crate::models::{Balance, Event, OtcOrder, OtcRecord, PendingInscriptions, Token};

impl Database {
    // ==================== point lookups ====================

    pub fn get_token(&self, token_id: i64) -> Result<Option<Token>> {
        traced("get_token", || {
            self.query_one(TableKind::Token, "\"id\" = ?1", params![token_id])
        })
    }

    pub fn get_token_by_inscription_id(&self, inscription_id: &str) -> Result<Option<Token>> {
        traced("get_token_by_inscription_id", || {
            self.query_one(
                TableKind::Token,
                "\"inscription_id\" = ?1 ORDER BY \"id\" LIMIT 1",
                params![inscription_id],
            )
        })
    }

    pub fn get_pending_inscription(&self, address: &str) -> Result<Option<PendingInscriptions>> {
        traced("get_pending_inscription", || {
            self.query_one(TableKind::PendingInscriptions, "\"id\" = ?1", params![address])
        })
    }

    /// Looks the row up under [`Balance::id_for`], the key every write uses.
    pub fn get_balance(&self, address: &str, token_id: i64) -> Result<Option<Balance>> {
        let balance_id = Balance::id_for(address, token_id);
        traced("get_balance", || {
            self.query_one(TableKind::Balance, "\"id\" = ?1", params![balance_id])
        })
    }

    pub fn get_otc(&self, otc_id: i64) -> Result<Option<OtcOrder>> {
        traced("get_otc", || {
            self.query_one(TableKind::Otc, "\"id\" = ?1", params![otc_id])
        })
    }

    pub fn get_otc_by_inscription_id(&self, inscription_id: &str) -> Result<Option<OtcOrder>> {
        traced("get_otc_by_inscription_id", || {
            self.query_one(
                TableKind::Otc,
                "\"inscription_id\" = ?1 ORDER BY \"id\" LIMIT 1",
                params![inscription_id],
            )
        })
    }

    pub fn get_event(&self, event_id: &str) -> Result<Option<Event>> {
        traced("get_event", || {
            self.query_one(TableKind::Event, "\"id\" = ?1", params![event_id])
        })
    }

    // ==================== set lookups ====================

    /// Events of one block in on-chain order (ascending block index).
    pub fn get_events_by_block_height(&self, block_height: i64) -> Result<Vec<Event>> {
        traced("get_events_by_block_height", || {
            let events: Vec<Event> = self.query_all(
                TableKind::Event,
                "\"block_height\" = ?1 ORDER BY \"block_index\" ASC, \"id\" ASC",
                params![block_height],
            )?;
            tracing::debug!(block_height, events = events.len(), "loaded block events");
            Ok(events)
        })
    }

    /// Fills of one order. Settlement order is not implied by the result order.
    pub fn get_otc_records(&self, oid: i64) -> Result<Vec<OtcRecord>> {
        traced("get_otc_records", || {
            self.query_all(TableKind::OtcRecord, "\"oid\" = ?1", params![oid])
        })
    }

    pub fn get_otc_records_by_inscription_id(&self, inscription_id: &str) -> Result<Vec<OtcRecord>> {
        traced("get_otc_records_by_inscription_id", || {
            self.query_all(
                TableKind::OtcRecord,
                "\"inscription_id\" = ?1",
                params![inscription_id],
            )
        })
    }

    pub fn get_otc_records_by_address(&self, address: &str) -> Result<Vec<OtcRecord>> {
        traced("get_otc_records_by_address", || {
            self.query_all(TableKind::OtcRecord, "\"address\" = ?1", params![address])
        })
    }

    pub fn get_tokens_by_deployer(&self, deployer: &str) -> Result<Vec<Token>> {
        traced("get_tokens_by_deployer", || {
            self.query_all(
                TableKind::Token,
                "\"deployer\" = ?1 ORDER BY \"id\"",
                params![deployer],
            )
        })
    }

    pub fn get_balances_by_address(&self, address: &str) -> Result<Vec<Balance>> {
        traced("get_balances_by_address", || {
            self.query_all(
                TableKind::Balance,
                "\"address\" = ?1 ORDER BY \"tid\"",
                params![address],
            )
        })
    }

    pub fn get_balances_by_token(&self, token_id: i64) -> Result<Vec<Balance>> {
        traced("get_balances_by_token", || {
            self.query_all(
                TableKind::Balance,
                "\"tid\" = ?1 ORDER BY \"id\"",
                params![token_id],
            )
        })
    }

    pub fn get_otcs_by_owner(&self, owner: &str) -> Result<Vec<OtcOrder>> {
        traced("get_otcs_by_owner", || {
            self.query_all(TableKind::Otc, "\"owner\" = ?1 ORDER BY \"id\"", params![owner])
        })
    }

    /// Orders offering token `tid1`.
    pub fn get_otcs_by_offered_token(&self, tid1: i64) -> Result<Vec<OtcOrder>> {
        traced("get_otcs_by_offered_token", || {
            self.query_all(TableKind::Otc, "\"tid1\" = ?1 ORDER BY \"id\"", params![tid1])
        })
    }

    /// Orders asking for token `tid2`.
    pub fn get_otcs_by_requested_token(&self, tid2: i64) -> Result<Vec<OtcOrder>> {
        traced("get_otcs_by_requested_token", || {
            self.query_all(TableKind::Otc, "\"tid2\" = ?1 ORDER BY \"id\"", params![tid2])
        })
    }
}
