//! Statement data model: transaction records and statement metadata.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One financial movement recovered from a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub description: String,
    /// Positive = charge (amount owed); negative = payment, refund or credit.
    pub amount: Decimal,
}

impl TransactionRecord {
    pub fn new(date: NaiveDate, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
        }
    }

    /// Amount in import convention: charges negative, credits positive.
    pub fn import_amount(&self) -> Decimal {
        if self.amount.is_zero() {
            // never print "-0.00"
            self.amount.abs()
        } else {
            -self.amount
        }
    }

    pub fn is_debit(&self) -> bool {
        self.import_amount() < Decimal::ZERO
    }
}

/// Values read from the statement's header area, plus the derived earliest date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementMetadata {
    /// The "as of" date printed on the statement
    pub statement_date: Option<NaiveDate>,
    pub statement_balance: Option<Decimal>,
    /// Lower bound for every transaction date (see [`Statement::finalize`])
    pub earliest_date: Option<NaiveDate>,
}

/// Result of parsing one statement document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub metadata: StatementMetadata,
    /// In document order, not re-sorted.
    pub transactions: Vec<TransactionRecord>,
}

impl Statement {
    /// Derive `earliest_date` once all lines have been consumed.
    ///
    /// With a statement date: first day of the statement month, lowered to the
    /// oldest transaction. Without one: the oldest transaction, or `None` when
    /// there are no transactions either.
    pub fn finalize(&mut self) {
        let floor = self
            .metadata
            .statement_date
            .and_then(|d| d.with_day(1));
        let oldest = self.transactions.iter().map(|t| t.date).min();

        self.metadata.earliest_date = match (floor, oldest) {
            (Some(f), Some(o)) => Some(f.min(o)),
            (Some(f), None) => Some(f),
            (None, o) => o,
        };
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Sum of charges minus credits, in statement convention.
    pub fn net_amount(&self) -> Decimal {
        self.transactions.iter().map(|t| t.amount).sum()
    }
}
