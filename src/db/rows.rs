//! Row <-> entity mapping for each ledger table

use rusqlite::types::{FromSql, Value};
use rusqlite::Row;

use super::{Entity, EntityKey, TableKind};
use crate::error::{Result, StoreError};
use crate::models::{Amount, Balance, Event, OtcOrder, OtcRecord, PendingInscriptions, Token};

fn get<T: FromSql>(row: &Row<'_>, kind: TableKind, column: &str) -> Result<T> {
    row.get(column)
        .map_err(|e| StoreError::mapping(kind.name(), format!("column {column}: {e}")))
}

fn get_list(row: &Row<'_>, kind: TableKind, column: &str) -> Result<Vec<String>> {
    let raw: String = get(row, kind, column)?;
    serde_json::from_str(&raw)
        .map_err(|e| StoreError::mapping(kind.name(), format!("column {column}: {e}")))
}

fn get_json(row: &Row<'_>, kind: TableKind, column: &str) -> Result<serde_json::Value> {
    let raw: Option<String> = get(row, kind, column)?;
    match raw {
        None => Ok(serde_json::Value::Null),
        Some(text) => serde_json::from_str(&text)
            .map_err(|e| StoreError::mapping(kind.name(), format!("column {column}: {e}"))),
    }
}

fn amount(value: &Amount) -> Value {
    Value::Text(value.to_string())
}

fn list(values: &[String]) -> Result<Value> {
    Ok(Value::Text(serde_json::to_string(values)?))
}

fn json(value: &serde_json::Value) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::Text(serde_json::to_string(value)?))
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

impl Entity for Event {
    const KIND: TableKind = TableKind::Event;

    fn key(&self) -> EntityKey {
        EntityKey::Text(self.id.clone())
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            text(&self.id),
            text(self.event_type.as_str()),
            Value::Integer(self.block_height),
            Value::Integer(self.block_index),
            Value::Integer(self.timestamp),
            text(&self.inscription_id),
            Value::Integer(self.inscription_number),
            text(&self.sender),
            text(&self.receiver),
            json(&self.content)?,
            text(&self.operation),
            Value::Integer(self.function_id),
            Value::from(self.valid),
            Value::from(self.error.clone()),
        ])
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        let kind = Self::KIND;
        Ok(Event {
            id: get(row, kind, "id")?,
            event_type: get(row, kind, "event_type")?,
            block_height: get(row, kind, "block_height")?,
            block_index: get(row, kind, "block_index")?,
            timestamp: get(row, kind, "timestamp")?,
            inscription_id: get(row, kind, "inscription_id")?,
            inscription_number: get(row, kind, "inscription_number")?,
            sender: get(row, kind, "sender")?,
            receiver: get(row, kind, "receiver")?,
            content: get_json(row, kind, "content")?,
            operation: get(row, kind, "operation")?,
            function_id: get(row, kind, "function_id")?,
            valid: get(row, kind, "valid")?,
            error: get(row, kind, "error")?,
        })
    }
}

impl Entity for PendingInscriptions {
    const KIND: TableKind = TableKind::PendingInscriptions;

    fn key(&self) -> EntityKey {
        EntityKey::Text(self.id.clone())
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![text(&self.id), list(&self.inscriptions)?])
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        let kind = Self::KIND;
        Ok(PendingInscriptions {
            id: get(row, kind, "id")?,
            inscriptions: get_list(row, kind, "inscriptions")?,
        })
    }
}

impl Entity for Token {
    const KIND: TableKind = TableKind::Token;

    fn key(&self) -> EntityKey {
        EntityKey::Int(self.id)
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            Value::Integer(self.id),
            text(&self.tick),
            amount(&self.max),
            amount(&self.lim),
            Value::from(self.dec),
            Value::from(self.ug),
            Value::from(self.mp),
            text(&self.deployer),
            Value::Integer(self.deploy_time),
            text(&self.inscription_id),
            Value::Integer(self.first_number),
            text(&self.first_id),
            Value::Integer(self.first_time),
            Value::Integer(self.last_number),
            text(&self.last_id),
            Value::Integer(self.last_time),
            amount(&self.minted),
            amount(&self.burned),
            amount(&self.circulating),
            Value::Integer(self.holders),
            Value::Integer(self.last_upgrade_time),
            list(&self.upgrade_records)?,
        ])
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        let kind = Self::KIND;
        Ok(Token {
            id: get(row, kind, "id")?,
            tick: get(row, kind, "tick")?,
            max: get(row, kind, "max")?,
            lim: get(row, kind, "lim")?,
            dec: get(row, kind, "dec")?,
            ug: get(row, kind, "ug")?,
            mp: get(row, kind, "mp")?,
            deployer: get(row, kind, "deployer")?,
            deploy_time: get(row, kind, "deploy_time")?,
            inscription_id: get(row, kind, "inscription_id")?,
            first_number: get(row, kind, "first_number")?,
            first_id: get(row, kind, "first_id")?,
            first_time: get(row, kind, "first_time")?,
            last_number: get(row, kind, "last_number")?,
            last_id: get(row, kind, "last_id")?,
            last_time: get(row, kind, "last_time")?,
            minted: get(row, kind, "minted")?,
            burned: get(row, kind, "burned")?,
            circulating: get(row, kind, "circulating")?,
            holders: get(row, kind, "holders")?,
            last_upgrade_time: get(row, kind, "last_upgrade_time")?,
            upgrade_records: get_list(row, kind, "upgrade_records")?,
        })
    }
}

impl Entity for Balance {
    const KIND: TableKind = TableKind::Balance;

    fn key(&self) -> EntityKey {
        EntityKey::Text(self.id.clone())
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            text(&self.id),
            text(&self.tick),
            Value::Integer(self.tid),
            text(&self.inscription_id),
            text(&self.address),
            amount(&self.balance),
            amount(&self.available_balance),
            amount(&self.transferable_balance),
            amount(&self.original_balance),
        ])
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        let kind = Self::KIND;
        Ok(Balance {
            id: get(row, kind, "id")?,
            tick: get(row, kind, "tick")?,
            tid: get(row, kind, "tid")?,
            inscription_id: get(row, kind, "inscription_id")?,
            address: get(row, kind, "address")?,
            balance: get(row, kind, "balance")?,
            available_balance: get(row, kind, "available_balance")?,
            transferable_balance: get(row, kind, "transferable_balance")?,
            original_balance: get(row, kind, "original_balance")?,
        })
    }
}

impl Entity for OtcOrder {
    const KIND: TableKind = TableKind::Otc;

    fn key(&self) -> EntityKey {
        EntityKey::Int(self.id)
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            Value::Integer(self.id),
            text(&self.tick1),
            Value::Integer(self.tid1),
            amount(&self.supply),
            text(&self.tick2),
            Value::Integer(self.tid2),
            amount(&self.er),
            amount(&self.mba),
            Value::Integer(self.dl),
            text(&self.owner),
            Value::Integer(self.deploy_time),
            text(&self.inscription_id),
            Value::from(self.valid),
            Value::from(self.success),
            amount(&self.received),
            text(&self.execute_id),
        ])
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        let kind = Self::KIND;
        Ok(OtcOrder {
            id: get(row, kind, "id")?,
            tick1: get(row, kind, "tick1")?,
            tid1: get(row, kind, "tid1")?,
            supply: get(row, kind, "supply")?,
            tick2: get(row, kind, "tick2")?,
            tid2: get(row, kind, "tid2")?,
            er: get(row, kind, "er")?,
            mba: get(row, kind, "mba")?,
            dl: get(row, kind, "dl")?,
            owner: get(row, kind, "owner")?,
            deploy_time: get(row, kind, "deploy_time")?,
            inscription_id: get(row, kind, "inscription_id")?,
            valid: get(row, kind, "valid")?,
            success: get(row, kind, "success")?,
            received: get(row, kind, "received")?,
            execute_id: get(row, kind, "execute_id")?,
        })
    }
}

impl Entity for OtcRecord {
    const KIND: TableKind = TableKind::OtcRecord;

    fn key(&self) -> EntityKey {
        EntityKey::Text(self.id.clone())
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            text(&self.id),
            Value::Integer(self.oid),
            text(&self.inscription_id),
            text(&self.address),
            amount(&self.amount_out),
            amount(&self.amount_in),
        ])
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        let kind = Self::KIND;
        Ok(OtcRecord {
            id: get(row, kind, "id")?,
            oid: get(row, kind, "oid")?,
            inscription_id: get(row, kind, "inscription_id")?,
            address: get(row, kind, "address")?,
            amount_out: get(row, kind, "amount_out")?,
            amount_in: get(row, kind, "amount_in")?,
        })
    }
}
