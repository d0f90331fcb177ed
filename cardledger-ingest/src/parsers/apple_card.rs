//! Apple Card statement parser (layout-preserved `pdftotext` output)
//!
//! The statement is split into sections by header lines; each section has
//! its own row format:
//!   Payment Information
//!       as of Jan 31, 2023
//!       $1,204.33
//!   Payments
//!       01/20/2023     ACH Deposit Internet transfer     -$500.00
//!   Transactions
//!       01/15/2023     Coffee Shop     2%     $0.10     $5.23
//!   Interest Charged
//!       Total interest for this month     $0.00

use cardledger_core::normalize::{date_from_parts, parse_currency, parse_us_date};
use cardledger_core::{Error, Result, Statement, TransactionRecord};
use regex::{Captures, Regex};

/// Labeled region of the statement. Header prefixes are checked in
/// declaration order and the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Payments,
    Transactions,
    InterestCharged,
    PaymentInformation,
}

type Handler = fn(&mut ParseState<'_>, &str);

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Payments,
        Section::Transactions,
        Section::InterestCharged,
        Section::PaymentInformation,
    ];

    /// Active before any header has been seen.
    pub const DEFAULT: Section = Section::PaymentInformation;

    pub fn header(self) -> &'static str {
        match self {
            Section::Payments => "Payments",
            Section::Transactions => "Transactions",
            Section::InterestCharged => "Interest Charged",
            Section::PaymentInformation => "Payment Information",
        }
    }

    /// Section whose header starts the (trimmed) line, if any.
    pub fn from_header_line(line: &str) -> Option<Section> {
        Self::ALL.into_iter().find(|s| line.starts_with(s.header()))
    }

    fn handler(self) -> Handler {
        match self {
            Section::Payments => payment_line,
            Section::Transactions => transaction_line,
            Section::InterestCharged => interest_charged_line,
            Section::PaymentInformation => payment_information_line,
        }
    }
}

/// Statement-balance lookahead: the first amount line after an "as of" line
/// is the statement balance, unless "Minimum payment due" comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BalanceLookahead {
    #[default]
    Idle,
    AwaitingBalance,
}

struct Patterns {
    payment: Regex,
    transaction: Regex,
    daily_cash: Regex,
    statement_date: Regex,
    bare_amount: Regex,
    interest: Regex,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::pattern(pattern, e))
}

impl Patterns {
    fn compile() -> Result<Self> {
        Ok(Self {
            payment: compile(concat!(
                r"^(?P<date>\d\d/\d\d/20[12]\d) {5,}",
                r"(?P<description>.+?) {5,}",
                r"(?P<amount>-?\$?[0-9,]+\.\d\d)"
            ))?,
            transaction: compile(concat!(
                r"^(?P<date>\d\d/\d\d/20[12]\d) {5,}",
                r"(?P<description>.+?) +",
                r"(?P<dailycash>\d+% {1,30}-?\$?[0-9,]+\.\d\d) {5,}",
                r"(?P<amount>-?\$?[0-9,]+\.\d\d)"
            ))?,
            daily_cash: compile(
                r"^Total Daily Cash earned this month {5,}(?P<amount>-?\$?[0-9,]+\.\d\d)",
            )?,
            statement_date: compile(concat!(
                r"^as of (?P<month>Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec) +",
                r"(?P<day>[0-3]\d), +(?P<year>20[1-2]\d)"
            ))?,
            bare_amount: compile(r"^(?P<amount>-?\$?[0-9,]+\.\d\d)")?,
            interest: compile(r"^Total interest for this month +(?P<amount>-?\$?[0-9,]+\.\d\d)")?,
        })
    }
}

/// Mutable state for a single pass over one document.
struct ParseState<'p> {
    patterns: &'p Patterns,
    section: Section,
    lookahead: BalanceLookahead,
    statement: Statement,
}

impl<'p> ParseState<'p> {
    fn new(patterns: &'p Patterns) -> Self {
        Self {
            patterns,
            section: Section::DEFAULT,
            lookahead: BalanceLookahead::Idle,
            statement: Statement::default(),
        }
    }

    fn feed(&mut self, raw: &str) {
        let line = raw.trim();

        if let Some(section) = Section::from_header_line(line) {
            log::trace!("section {:?} -> {:?}", self.section, section);
            self.section = section;
            return;
        }

        let handler = self.section.handler();
        handler(self, line);
    }

    fn finish(mut self) -> Statement {
        if self.statement.metadata.statement_date.is_none() {
            log::warn!(
                "no statement date found; earliest date falls back to the oldest transaction"
            );
        }
        self.statement.finalize();
        self.statement
    }

    /// Shared extraction for payment and transaction rows.
    fn push_row(&mut self, caps: &Captures<'_>) {
        let Some(date) = parse_us_date(&caps["date"]) else {
            log::debug!("skipping row with invalid date: {}", &caps["date"]);
            return;
        };
        let Some(amount) = parse_currency(&caps["amount"]) else {
            log::debug!("skipping row with invalid amount: {}", &caps["amount"]);
            return;
        };
        self.statement
            .transactions
            .push(TransactionRecord::new(date, &caps["description"], amount));
    }
}

fn payment_line(state: &mut ParseState<'_>, line: &str) {
    match state.patterns.payment.captures(line) {
        Some(caps) => state.push_row(&caps),
        None => log::trace!("payments: ignored line: {line}"),
    }
}

fn transaction_line(state: &mut ParseState<'_>, line: &str) {
    if let Some(caps) = state.patterns.transaction.captures(line) {
        state.push_row(&caps);
    } else if let Some(caps) = state.patterns.daily_cash.captures(line) {
        // Summary line, not a transaction.
        let earned = parse_currency(&caps["amount"]);
        log::debug!("daily cash earned this month: {earned:?} (not recorded)");
    } else {
        log::trace!("transactions: ignored line: {line}");
    }
}

fn payment_information_line(state: &mut ParseState<'_>, line: &str) {
    if state.lookahead == BalanceLookahead::AwaitingBalance {
        if let Some(amount) = state
            .patterns
            .bare_amount
            .captures(line)
            .and_then(|caps| parse_currency(&caps["amount"]))
        {
            state.statement.metadata.statement_balance = Some(amount);
            state.lookahead = BalanceLookahead::Idle;
        }
        if line.contains("Minimum payment due") {
            state.lookahead = BalanceLookahead::Idle;
        }
    }

    if let Some(caps) = state.patterns.statement_date.captures(line) {
        match date_from_parts(&caps["month"], &caps["day"], &caps["year"]) {
            Some(date) => {
                state.statement.metadata.statement_date = Some(date);
                state.lookahead = BalanceLookahead::AwaitingBalance;
            }
            None => log::debug!("ignoring invalid statement date: {line}"),
        }
    }
}

fn interest_charged_line(state: &mut ParseState<'_>, line: &str) {
    let Some(caps) = state.patterns.interest.captures(line) else {
        return;
    };
    let Some(interest) = parse_currency(&caps["amount"]) else {
        return;
    };
    if interest.is_zero() {
        return;
    }
    match state.statement.metadata.statement_date {
        Some(date) => state
            .statement
            .transactions
            .push(TransactionRecord::new(date, "Interest", interest)),
        None => log::warn!("interest charge {interest} has no statement date; skipped"),
    }
}

/// Section-aware parser. Holds only compiled patterns, so one instance can
/// parse any number of documents; each call gets fresh state.
pub struct StatementParser {
    patterns: Patterns,
}

impl StatementParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: Patterns::compile()?,
        })
    }

    /// Run one pass over the lines and finalize the statement.
    pub fn parse_lines<I, S>(&self, lines: I) -> Statement
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = ParseState::new(&self.patterns);
        for line in lines {
            state.feed(line.as_ref());
        }
        state.finish()
    }
}

/// Parse extracted statement text into a finalized statement.
pub fn parse_apple_card_text(text: &str) -> Result<Statement> {
    Ok(StatementParser::new()?.parse_lines(text.lines()))
}
