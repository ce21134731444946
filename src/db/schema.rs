//! Table definitions for the six ledger tables.
//!
//! Every statement the store runs is rendered from these definitions, so the
//! column order here is the order rows are written and read in.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Event,
    PendingInscriptions,
    Token,
    Balance,
    Otc,
    OtcRecord,
}

impl TableKind {
    pub const ALL: [TableKind; 6] = [
        TableKind::Event,
        TableKind::PendingInscriptions,
        TableKind::Token,
        TableKind::Balance,
        TableKind::Otc,
        TableKind::OtcRecord,
    ];

    pub fn schema(self) -> &'static TableSchema {
        match self {
            TableKind::Event => &EVENT,
            TableKind::PendingInscriptions => &PENDING_INSCRIPTIONS,
            TableKind::Token => &TOKEN,
            TableKind::Balance => &BALANCE,
            TableKind::Otc => &OTC,
            TableKind::OtcRecord => &OTC_RECORD,
        }
    }

    pub fn name(self) -> &'static str {
        self.schema().name
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TableKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown table {s:?}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    BigInt,
    Int,
    Bool,
    /// DECIMAL(38, 18) held as canonical fixed-scale text
    Decimal,
    /// JSON document text
    Json,
    /// JSON array of strings
    TextList,
    /// TRANSFER | INSCRIBE
    EventType,
}

impl ColumnType {
    /// SQLite declared type. Decimals are TEXT so NUMERIC affinity never
    /// turns them into floating point.
    fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Text => "VARCHAR(255)",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Int => "INTEGER",
            ColumnType::Bool => "BOOLEAN",
            ColumnType::Decimal | ColumnType::Json | ColumnType::TextList => "TEXT",
            ColumnType::EventType => "VARCHAR(16)",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    pub default: Option<&'static str>,
}

const fn col(name: &'static str, ty: ColumnType) -> Column {
    Column {
        name,
        ty,
        nullable: false,
        default: None,
    }
}

const fn nullable(name: &'static str, ty: ColumnType) -> Column {
    Column {
        name,
        ty,
        nullable: true,
        default: None,
    }
}

const fn with_default(name: &'static str, ty: ColumnType, default: &'static str) -> Column {
    Column {
        name,
        ty,
        nullable: false,
        default: Some(default),
    }
}

const ZERO: &str = "'0.000000000000000000'";

#[derive(Debug, Clone, Copy)]
pub struct Index {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

#[derive(Debug)]
pub struct TableSchema {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [Column],
    pub indexes: &'static [Index],
}

impl TableSchema {
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }

    pub fn create_table_sql(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut def = format!("\"{}\" {}", c.name, c.ty.sql_type());
                if c.name == self.primary_key {
                    def.push_str(" PRIMARY KEY");
                }
                if !c.nullable {
                    def.push_str(" NOT NULL");
                }
                if let Some(default) = c.default {
                    def.push_str(" DEFAULT ");
                    def.push_str(default);
                }
                if c.ty == ColumnType::EventType {
                    def.push_str(&format!(
                        " CHECK (\"{}\" IN ('TRANSFER', 'INSCRIBE'))",
                        c.name
                    ));
                }
                def
            })
            .collect();

        format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (\n    {}\n)",
            self.name,
            columns.join(",\n    ")
        )
    }

    pub fn create_index_sql(&self) -> Vec<String> {
        self.indexes
            .iter()
            .map(|idx| {
                let cols: Vec<String> = idx.columns.iter().map(|c| format!("\"{c}\"")).collect();
                format!(
                    "CREATE INDEX IF NOT EXISTS \"{}\" ON \"{}\" ({})",
                    idx.name,
                    self.name,
                    cols.join(", ")
                )
            })
            .collect()
    }

    pub fn drop_table_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS \"{}\"", self.name)
    }

    /// `SELECT <all columns> FROM <table>`; callers append the predicate.
    pub fn select_sql(&self) -> String {
        let cols: Vec<String> = self.column_names().map(|c| format!("\"{c}\"")).collect();
        format!("SELECT {} FROM \"{}\"", cols.join(", "), self.name)
    }

    /// Insert every column; on primary key conflict overwrite every other
    /// column with the incoming value.
    pub fn upsert_sql(&self) -> String {
        let cols: Vec<String> = self.column_names().map(|c| format!("\"{c}\"")).collect();
        let placeholders: Vec<String> = (1..=self.columns.len()).map(|i| format!("?{i}")).collect();
        let assignments: Vec<String> = self
            .column_names()
            .filter(|c| *c != self.primary_key)
            .map(|c| format!("\"{c}\" = excluded.\"{c}\""))
            .collect();

        format!(
            "INSERT INTO \"{}\" ({}) VALUES ({}) ON CONFLICT (\"{}\") DO UPDATE SET {}",
            self.name,
            cols.join(", "),
            placeholders.join(", "),
            self.primary_key,
            assignments.join(", ")
        )
    }
}

use ColumnType::*;

pub static EVENT: TableSchema = TableSchema {
    name: "event",
    primary_key: "id",
    columns: &[
        col("id", Text),
        col("event_type", EventType),
        col("block_height", BigInt),
        col("block_index", BigInt),
        col("timestamp", BigInt),
        col("inscription_id", Text),
        col("inscription_number", BigInt),
        col("sender", Text),
        col("receiver", Text),
        nullable("content", Json),
        col("operation", Text),
        col("function_id", BigInt),
        col("valid", Bool),
        nullable("error", Text),
    ],
    indexes: &[Index {
        name: "idx_event_block",
        columns: &["block_height", "block_index"],
    }],
};

pub static PENDING_INSCRIPTIONS: TableSchema = TableSchema {
    name: "pending_inscriptions",
    primary_key: "id",
    columns: &[
        // address
        col("id", Text),
        with_default("inscriptions", TextList, "'[]'"),
    ],
    indexes: &[],
};

pub static TOKEN: TableSchema = TableSchema {
    name: "token",
    primary_key: "id",
    columns: &[
        // deploying inscription number
        col("id", BigInt),
        col("tick", Text),
        col("max", Decimal),
        col("lim", Decimal),
        col("dec", Int),
        col("ug", Bool),
        col("mp", Bool),
        col("deployer", Text),
        col("deploy_time", BigInt),
        col("inscription_id", Text),
        with_default("first_number", BigInt, "0"),
        with_default("first_id", Text, "''"),
        with_default("first_time", BigInt, "0"),
        with_default("last_number", BigInt, "0"),
        with_default("last_id", Text, "''"),
        with_default("last_time", BigInt, "0"),
        with_default("minted", Decimal, ZERO),
        with_default("burned", Decimal, ZERO),
        with_default("circulating", Decimal, ZERO),
        with_default("holders", BigInt, "0"),
        with_default("last_upgrade_time", BigInt, "0"),
        with_default("upgrade_records", TextList, "'[]'"),
    ],
    indexes: &[
        Index {
            name: "idx_token_deployer",
            columns: &["deployer"],
        },
        Index {
            name: "idx_token_inscription_id",
            columns: &["inscription_id"],
        },
    ],
};

pub static BALANCE: TableSchema = TableSchema {
    name: "balance",
    primary_key: "id",
    columns: &[
        // {address}-{tid}
        col("id", Text),
        col("tick", Text),
        col("tid", BigInt),
        col("inscription_id", Text),
        col("address", Text),
        with_default("balance", Decimal, ZERO),
        with_default("available_balance", Decimal, ZERO),
        with_default("transferable_balance", Decimal, ZERO),
        with_default("original_balance", Decimal, ZERO),
    ],
    indexes: &[
        Index {
            name: "idx_balance_tid",
            columns: &["tid"],
        },
        Index {
            name: "idx_balance_address",
            columns: &["address"],
        },
    ],
};

pub static OTC: TableSchema = TableSchema {
    name: "otc",
    primary_key: "id",
    columns: &[
        // deploying inscription number
        col("id", BigInt),
        col("tick1", Text),
        col("tid1", BigInt),
        col("supply", Decimal),
        col("tick2", Text),
        col("tid2", BigInt),
        col("er", Decimal),
        col("mba", Decimal),
        col("dl", BigInt),
        col("owner", Text),
        col("deploy_time", BigInt),
        col("inscription_id", Text),
        col("valid", Bool),
        col("success", Bool),
        with_default("received", Decimal, ZERO),
        with_default("execute_id", Text, "''"),
    ],
    indexes: &[
        Index {
            name: "idx_otc_owner",
            columns: &["owner"],
        },
        Index {
            name: "idx_otc_inscription_id",
            columns: &["inscription_id"],
        },
        Index {
            name: "idx_otc_tid1",
            columns: &["tid1"],
        },
        Index {
            name: "idx_otc_tid2",
            columns: &["tid2"],
        },
    ],
};

pub static OTC_RECORD: TableSchema = TableSchema {
    name: "otc_record",
    primary_key: "id",
    columns: &[
        // settling event id
        col("id", Text),
        col("oid", BigInt),
        col("inscription_id", Text),
        col("address", Text),
        with_default("amount_out", Decimal, ZERO),
        with_default("amount_in", Decimal, ZERO),
    ],
    indexes: &[
        Index {
            name: "idx_otc_record_oid",
            columns: &["oid"],
        },
        Index {
            name: "idx_otc_record_inscription_id",
            columns: &["inscription_id"],
        },
        Index {
            name: "idx_otc_record_address",
            columns: &["address"],
        },
    ],
};
