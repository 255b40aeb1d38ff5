//! Lending events
//!
//! Every committed mutation is recorded here in order. The journal is an
//! in-memory audit trail; shipping it to durable storage is left to the
//! caller (see [`EventJournal::write_jsonl`]).

use chrono::{DateTime, Utc};
use lendbank_core::{Asset, LoanId, Principal};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::params::Parameter;

/// Events emitted by the lending engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LendingEvent {
    /// Platform opened for deposits and loans
    Initialized { admin: Principal },

    /// Collateral counter raised
    CollateralDeposited { depositor: Principal, amount: u64 },

    /// A new loan was opened
    LoanOriginated {
        loan_id: LoanId,
        borrower: Principal,
        collateral: u64,
        principal: u64,
        price: u64,
    },

    /// A loan was repaid in full
    LoanRepaid {
        loan_id: LoanId,
        borrower: Principal,
        interest: u128,
        paid: u64,
    },

    /// A loan was force-closed
    LoanLiquidated {
        loan_id: LoanId,
        borrower: Principal,
        liquidator: Principal,
        ratio: u128,
        cleared: Vec<LoanId>,
    },

    /// A risk parameter changed
    ParameterChanged {
        parameter: Parameter,
        old_value: u32,
        new_value: u32,
    },

    /// A price quote was written
    PriceUpdated { asset: Asset, price: u64 },
}

impl LendingEvent {
    /// Short name, matches the serialized `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            LendingEvent::Initialized { .. } => "initialized",
            LendingEvent::CollateralDeposited { .. } => "collateral_deposited",
            LendingEvent::LoanOriginated { .. } => "loan_originated",
            LendingEvent::LoanRepaid { .. } => "loan_repaid",
            LendingEvent::LoanLiquidated { .. } => "loan_liquidated",
            LendingEvent::ParameterChanged { .. } => "parameter_changed",
            LendingEvent::PriceUpdated { .. } => "price_updated",
        }
    }
}

/// A journaled event with its position and time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Strictly increasing, starting at 1
    pub sequence: u64,
    /// Logical height when the event was committed
    pub height: u64,
    /// Wall-clock time when the event was committed
    pub recorded_at: DateTime<Utc>,
    pub event: LendingEvent,
}

/// Append-only, in-memory event journal
#[derive(Debug, Default)]
pub struct EventJournal {
    records: Vec<EventRecord>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its sequence number
    pub fn record(&mut self, height: u64, event: LendingEvent) -> u64 {
        let sequence = self.records.len() as u64 + 1;
        self.records.push(EventRecord {
            sequence,
            height,
            recorded_at: Utc::now(),
            event,
        });
        sequence
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.iter()
    }

    /// Records with a sequence number greater than `sequence`
    pub fn since(&self, sequence: u64) -> &[EventRecord] {
        let start = (sequence as usize).min(self.records.len());
        &self.records[start..]
    }

    /// Write every record as one JSON object per line
    pub fn write_jsonl<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for record in &self.records {
            serde_json::to_writer(&mut writer, record)?;
            writeln!(writer)?;
        }
        writer.flush()
    }
}
