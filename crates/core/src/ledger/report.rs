//! Financial report over all account types.
//!
//! The committee's financial year runs from 1 July to 30 June and is named
//! after the year it ends in. A report covers either the current year to date
//! or one of the two previous full years, and combines:
//!
//! - an income and expenditure statement grouped by category;
//! - a balance sheet listing each account type's balance as at the period end;
//! - fixed notes for registers the ledgers do not hold.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use committee_shared::types::round_currency;
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::LedgerError;
use super::types::{AccountType, MonthlyLedger};

const FINANCIAL_YEAR_START_MONTH: u32 = 7;
const REPORT_DATE_FORMAT: &str = "%-d %b %Y";
const UNCATEGORISED: &str = "Uncategorised";

/// Named report period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportPeriod {
    /// Start of the current financial year to today.
    #[default]
    YearToDate,
    /// Full financial year, 1 or 2 years before the current one.
    PreviousYear(u8),
}

impl ReportPeriod {
    /// Query key, `ytd`, `fy-1` or `fy-2`.
    #[must_use]
    pub fn key(self) -> String {
        match self {
            Self::YearToDate => "ytd".to_string(),
            Self::PreviousYear(offset) => format!("fy-{offset}"),
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for ReportPeriod {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "ytd" => Ok(Self::YearToDate),
            "fy-1" => Ok(Self::PreviousYear(1)),
            "fy-2" => Ok(Self::PreviousYear(2)),
            other => Err(LedgerError::InvalidPeriod(other.to_string())),
        }
    }
}

/// Inclusive date range a report covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodRange {
    /// Period the range was resolved from.
    pub period: ReportPeriod,
    /// Display label, `Current YTD` or `FY 2025`.
    pub label: String,
    /// First day of the range.
    pub start: NaiveDate,
    /// Last day of the range.
    pub end: NaiveDate,
}

/// Year in which the financial year containing `today` ends.
#[must_use]
pub fn financial_year_end(today: NaiveDate) -> i32 {
    if today.month() >= FINANCIAL_YEAR_START_MONTH {
        today.year() + 1
    } else {
        today.year()
    }
}

/// Resolves a period against today's date.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidPeriod`] if the range falls outside the
/// representable calendar.
pub fn resolve_period(period: ReportPeriod, today: NaiveDate) -> Result<PeriodRange, LedgerError> {
    let out_of_range = || LedgerError::InvalidPeriod(period.key());
    let year_start = |end_year: i32| {
        NaiveDate::from_ymd_opt(end_year - 1, FINANCIAL_YEAR_START_MONTH, 1).ok_or_else(out_of_range)
    };

    let current_end = financial_year_end(today);
    match period {
        ReportPeriod::YearToDate => Ok(PeriodRange {
            period,
            label: "Current YTD".to_string(),
            start: year_start(current_end)?,
            end: today,
        }),
        ReportPeriod::PreviousYear(offset) => {
            let end_year = current_end - i32::from(offset);
            Ok(PeriodRange {
                period,
                label: format!("FY {end_year}"),
                start: year_start(end_year)?,
                end: NaiveDate::from_ymd_opt(end_year, 6, 30).ok_or_else(out_of_range)?,
            })
        }
    }
}

/// Labelled amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    /// Category or account label.
    pub label: String,
    /// Amount, always rounded to cents.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Income and expenditure statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementSection {
    /// Credits per category, sorted by label.
    pub income: Vec<LineItem>,
    /// Debits per category as positive amounts, sorted by label.
    pub expenditure: Vec<LineItem>,
    /// Sum of income items.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    /// Sum of expenditure items.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expenditure: Decimal,
    /// Income less expenditure.
    #[serde(with = "rust_decimal::serde::float")]
    pub net_result: Decimal,
}

/// Balance sheet as at the period end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheetSection {
    /// One entry per account type with a ledger on or before the period end.
    pub assets: Vec<LineItem>,
    /// Always empty; the ledgers hold no loan data.
    pub liabilities: Vec<LineItem>,
    /// Sum of assets.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_assets: Decimal,
    /// Sum of liabilities.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_liabilities: Decimal,
    /// Assets less liabilities.
    #[serde(with = "rust_decimal::serde::float")]
    pub equity: Decimal,
    /// Caption for the equity line.
    pub equity_label: String,
}

/// Titled block of explanatory lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportNote {
    /// Heading.
    pub title: String,
    /// One line each.
    pub details: Vec<String>,
}

/// Complete financial report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    /// Period key.
    pub period: String,
    /// Period label.
    pub label: String,
    /// `1 Jul 2024 - 30 Jun 2025`.
    pub range: String,
    /// `As at 30 Jun 2025`.
    pub as_at: String,
    /// Income and expenditure.
    pub statement: StatementSection,
    /// Position at the period end.
    pub balance_sheet: BalanceSheetSection,
    /// Bank account summary and unavailable registers.
    pub notes: Vec<ReportNote>,
}

fn checked_round(a: Decimal, b: Decimal) -> Result<Decimal, LedgerError> {
    a.checked_add(b)
        .map(round_currency)
        .ok_or(LedgerError::BalanceOutOfRange)
}

fn total(items: &[LineItem]) -> Result<Decimal, LedgerError> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |sum, item| checked_round(sum, item.amount))
}

fn line_items(totals: BTreeMap<String, Decimal>) -> Vec<LineItem> {
    totals
        .into_iter()
        .map(|(label, amount)| LineItem { label, amount })
        .collect()
}

fn asset_label(ledger_type: AccountType) -> &'static str {
    match ledger_type {
        AccountType::Bank => "Bank account",
        AccountType::Cash => "Cash on hand",
        AccountType::Card => "Card balance",
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(REPORT_DATE_FORMAT).to_string()
}

fn build_statement<'a, I>(range: &PeriodRange, ledgers: I) -> Result<StatementSection, LedgerError>
where
    I: IntoIterator<Item = &'a MonthlyLedger>,
{
    let mut income: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut expenditure: BTreeMap<String, Decimal> = BTreeMap::new();

    let transactions = ledgers
        .into_iter()
        .flat_map(|l| &l.transactions)
        .filter(|tx| tx.date >= range.start && tx.date <= range.end);
    for tx in transactions {
        let category = match tx.category.trim() {
            "" => UNCATEGORISED,
            category => category,
        };
        let (totals, amount) = if tx.amount.is_sign_negative() {
            (&mut expenditure, -tx.amount)
        } else {
            (&mut income, tx.amount)
        };
        let entry = totals.entry(category.to_string()).or_default();
        *entry = checked_round(*entry, amount)?;
    }

    let income = line_items(income);
    let expenditure = line_items(expenditure);
    let total_income = total(&income)?;
    let total_expenditure = total(&expenditure)?;
    let net_result = total_income
        .checked_sub(total_expenditure)
        .map(round_currency)
        .ok_or(LedgerError::BalanceOutOfRange)?;

    Ok(StatementSection {
        income,
        expenditure,
        total_income,
        total_expenditure,
        net_result,
    })
}

/// Balance of one account type at the end of `end`.
///
/// Starts from the opening balance of the earliest month that begins on or
/// before `end` and applies every transaction dated on or before `end`.
/// Returns `None` when no such month exists.
///
/// # Errors
///
/// Returns [`LedgerError::BalanceOutOfRange`] if the balance overflows.
pub fn balance_as_at(ledgers: &[MonthlyLedger], end: NaiveDate) -> Result<Option<Decimal>, LedgerError> {
    let mut months: Vec<&MonthlyLedger> = ledgers
        .iter()
        .filter(|l| l.month.first_day() <= end)
        .collect();
    months.sort_by_key(|l| l.month);

    let Some(first) = months.first() else {
        return Ok(None);
    };
    let mut balance = first.opening_balance;
    for tx in months.iter().flat_map(|l| &l.transactions) {
        if tx.date <= end {
            balance = checked_round(balance, tx.amount)?;
        }
    }
    Ok(Some(balance))
}

fn build_notes(assets: &[LineItem]) -> Vec<ReportNote> {
    let mut details: Vec<String> = assets
        .iter()
        .map(|asset| format!("{}: ${:.2}", asset.label, asset.amount))
        .collect();
    if details.is_empty() {
        details.push("No ledger balances available for the period.".to_string());
    } else {
        details.push("Balances derived from ledger transactions.".to_string());
    }

    let note = |title: &str, detail: &str| ReportNote {
        title: title.to_string(),
        details: vec![detail.to_string()],
    };
    vec![
        ReportNote {
            title: "Bank accounts".to_string(),
            details,
        },
        note(
            "Grants",
            "Not available from ledgers; requires separate grant register.",
        ),
        note("Loans", "Not available from ledgers; requires loan schedule data."),
        note(
            "Trust money",
            "Not available from ledgers; requires trust money ledger.",
        ),
    ]
}

/// Builds the financial report for `range` from every account type's stored
/// months.
///
/// # Errors
///
/// Returns [`LedgerError::BalanceOutOfRange`] if a total overflows.
pub fn build_report(
    range: &PeriodRange,
    ledgers: &BTreeMap<AccountType, Vec<MonthlyLedger>>,
) -> Result<FinancialReport, LedgerError> {
    let statement = build_statement(range, ledgers.values().flatten())?;

    let mut assets = Vec::new();
    for (ledger_type, months) in ledgers {
        if let Some(amount) = balance_as_at(months, range.end)? {
            assets.push(LineItem {
                label: asset_label(*ledger_type).to_string(),
                amount,
            });
        }
    }
    assets.sort_by(|a, b| a.label.cmp(&b.label));

    let total_assets = total(&assets)?;
    let total_liabilities = Decimal::ZERO;
    let equity = total_assets
        .checked_sub(total_liabilities)
        .map(round_currency)
        .ok_or(LedgerError::BalanceOutOfRange)?;
    let notes = build_notes(&assets);

    Ok(FinancialReport {
        period: range.period.key(),
        label: range.label.clone(),
        range: format!("{} - {}", format_date(range.start), format_date(range.end)),
        as_at: format!("As at {}", format_date(range.end)),
        statement,
        balance_sheet: BalanceSheetSection {
            assets,
            liabilities: Vec::new(),
            total_assets,
            total_liabilities,
            equity,
            equity_label: "Accumulated funds".to_string(),
        },
        notes,
    })
}
