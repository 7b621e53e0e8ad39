//! Bank statement import.
//!
//! Statements are exported newest-first as `DD/MM/YYYY, amount, description`
//! rows, comma- or tab-separated, without a header. Only the account's
//! balance *after* the newest row is known, so the opening balance is derived
//! backwards from it.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use committee_shared::types::money::{parse_amount, MAX_TRANSACTION_AMOUNT};
use committee_shared::types::{round_currency, Month, TransactionId};
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::LedgerError;
use super::reconcile::close_month;
use super::types::{AccountType, MonthlyLedger, Transaction};

const STATEMENT_DATE_FORMAT: &str = "%d/%m/%Y";

/// One usable statement row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRow {
    /// Zero-based record index in the file.
    pub position: usize,
    /// Booking date.
    pub date: NaiveDate,
    /// Signed amount.
    pub amount: Decimal,
    /// Remaining fields joined by spaces.
    pub description: String,
    /// Category assigned from the description.
    pub category: &'static str,
}

/// Result of turning a statement into monthly ledgers.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    /// One ledger per affected month, ascending.
    pub ledgers: Vec<MonthlyLedger>,
    /// Balance before the oldest row.
    pub opening_balance: Decimal,
    /// Balance after the newest row.
    pub closing_balance: Decimal,
    /// Number of imported transactions.
    pub transaction_count: usize,
}

impl ImportOutcome {
    /// Affected months, ascending.
    #[must_use]
    pub fn months(&self) -> Vec<Month> {
        self.ledgers.iter().map(|l| l.month).collect()
    }

    /// Wire summary for the import endpoint.
    #[must_use]
    pub fn summary(&self, ledger_type: AccountType) -> ImportSummary {
        let months: Vec<String> = self.months().iter().map(ToString::to_string).collect();
        ImportSummary {
            status: "ok",
            ledger_type,
            count: months.len(),
            months,
            transactions: self.transaction_count,
            opening_balance: self.opening_balance,
            closing_balance: self.closing_balance,
        }
    }
}

/// Response body of a successful import.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Always `"ok"`.
    pub status: &'static str,
    /// Account type the rows were imported into.
    #[serde(rename = "type")]
    pub ledger_type: AccountType,
    /// Affected months.
    pub months: Vec<String>,
    /// Number of affected months.
    pub count: usize,
    /// Number of imported transactions.
    pub transactions: usize,
    /// Balance before the oldest row.
    #[serde(with = "rust_decimal::serde::float")]
    pub opening_balance: Decimal,
    /// Balance after the newest row.
    #[serde(with = "rust_decimal::serde::float")]
    pub closing_balance: Decimal,
}

/// Picks the field delimiter from the first non-blank line.
///
/// Tab wins ties and lines with neither character; an input without any
/// non-blank line defaults to comma.
#[must_use]
pub fn detect_delimiter(content: &str) -> u8 {
    let Some(line) = content.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return b',';
    };
    let tabs = line.matches('\t').count();
    let commas = line.matches(',').count();
    if tabs >= commas { b'\t' } else { b',' }
}

/// Assigns a category from keywords in a statement description.
#[must_use]
pub fn categorize(description: &str) -> &'static str {
    const RULES: &[(&str, &[&str])] = &[
        (
            "Membership",
            &["tidyhq", "auscycling", "life membership", "membership fee", "affiliation"],
        ),
        ("Reimbursement", &["reimburse"]),
        ("Sponsorship", &["lake health group", "spons"]),
        (
            "Equipment",
            &[
                "troph",
                "engraving",
                "weed killer",
                "star outdoor",
                "electrical services",
                "asr electrical",
                "flowers",
            ],
        ),
        (
            "Event Fee",
            &["entryboss", "square", "race entry", "entry", "permits", "raffle"],
        ),
    ];

    let value = description.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| value.contains(k)))
        .map_or("Misc", |(category, _)| *category)
}

/// Reads usable rows from a statement, in file order.
///
/// Rows with fewer than three fields, blank rows, and rows whose date or
/// amount does not parse are skipped.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidCsv`] if the content is not readable as
/// delimited text, [`LedgerError::AmountOutOfRange`] for a row amount above
/// the transaction limit and [`LedgerError::NoTransactionsFound`] if no row
/// is usable.
pub fn parse_statement(content: &str) -> Result<Vec<StatementRow>, LedgerError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(detect_delimiter(content))
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for (position, record) in reader.records().enumerate() {
        let record = record.map_err(|e| LedgerError::InvalidCsv(e.to_string()))?;
        if record.len() < 3 {
            continue;
        }

        let date_raw = record[0].trim();
        let amount_raw = record[1].trim();
        let description = record
            .iter()
            .skip(2)
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();

        let Ok(date) = NaiveDate::parse_from_str(date_raw, STATEMENT_DATE_FORMAT) else {
            continue;
        };
        let Some(amount) = parse_amount(amount_raw) else {
            continue;
        };
        if amount.abs() > MAX_TRANSACTION_AMOUNT {
            return Err(LedgerError::AmountOutOfRange(amount));
        }

        rows.push(StatementRow {
            position,
            date,
            amount,
            category: categorize(&description),
            description,
        });
    }

    if rows.is_empty() {
        return Err(LedgerError::NoTransactionsFound);
    }
    Ok(rows)
}

/// Builds monthly ledgers from statement rows given the balance after the
/// newest row.
///
/// File order is newest-first, so chronological order is reverse file order.
/// Within a month rows are ordered by date; same-day rows stay chronological.
///
/// # Errors
///
/// Returns [`LedgerError::NoTransactionsFound`] for an empty row list,
/// [`LedgerError::AmountOutOfRange`] for a current balance above the
/// transaction limit and [`LedgerError::BalanceOutOfRange`] if a derived
/// balance overflows.
pub fn build_import(
    rows: &[StatementRow],
    ledger_type: AccountType,
    current_balance: Decimal,
) -> Result<ImportOutcome, LedgerError> {
    if rows.is_empty() {
        return Err(LedgerError::NoTransactionsFound);
    }

    if current_balance.abs() > MAX_TRANSACTION_AMOUNT {
        return Err(LedgerError::AmountOutOfRange(current_balance));
    }

    let mut chronological: Vec<&StatementRow> = rows.iter().collect();
    chronological.sort_by(|a, b| b.position.cmp(&a.position));

    let total = chronological
        .iter()
        .try_fold(Decimal::ZERO, |sum, row| sum.checked_add(row.amount))
        .ok_or(LedgerError::BalanceOutOfRange)?;
    let opening_balance = current_balance
        .checked_sub(total)
        .map(round_currency)
        .ok_or(LedgerError::BalanceOutOfRange)?;

    // Running balance before each row, in chronological order.
    let mut before: Vec<(Decimal, &StatementRow)> = Vec::with_capacity(chronological.len());
    let mut balance = opening_balance;
    for row in chronological {
        before.push((balance, row));
        balance = balance
            .checked_add(row.amount)
            .map(round_currency)
            .ok_or(LedgerError::BalanceOutOfRange)?;
    }

    let mut by_month: BTreeMap<Month, Vec<(Decimal, &StatementRow)>> = BTreeMap::new();
    for entry in before {
        by_month.entry(Month::of(entry.1.date)).or_default().push(entry);
    }

    let mut ledgers = Vec::with_capacity(by_month.len());
    for (month, mut entries) in by_month {
        let opening = entries.first().map_or(Decimal::ZERO, |(balance, _)| *balance);
        entries.sort_by_key(|(_, row)| row.date);

        let mut ledger = MonthlyLedger::new(ledger_type, month, opening);
        ledger.transactions = entries
            .into_iter()
            .map(|(_, row)| Transaction {
                id: TransactionId::new(),
                date: row.date,
                category: row.category.to_string(),
                description: row.description.clone(),
                amount: round_currency(row.amount),
                running_balance: Decimal::ZERO,
            })
            .collect();
        close_month(&mut ledger, opening)?;
        ledgers.push(ledger);
    }

    Ok(ImportOutcome {
        ledgers,
        opening_balance,
        closing_balance: round_currency(current_balance),
        transaction_count: rows.len(),
    })
}

/// Parses a statement and builds its monthly ledgers.
///
/// # Errors
///
/// See [`parse_statement`] and [`build_import`].
pub fn import_statement(
    content: &str,
    ledger_type: AccountType,
    current_balance: Decimal,
) -> Result<ImportOutcome, LedgerError> {
    let rows = parse_statement(content)?;
    build_import(&rows, ledger_type, current_balance)
}
