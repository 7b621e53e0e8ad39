//! Session tests: type-switch races, optimistic saves, and failure handling.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use committee_shared::types::Month;
use futures::channel::oneshot;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::clock::FixedClock;
use crate::ledger::{
    close_month, AccountType, CategoryList, LedgerError, MonthlyLedger, Transaction,
    TransactionDraft,
};
use crate::storage::{BlobLedgerStore, LedgerStore, StorageError};

fn month(s: &str) -> Month {
    s.parse().unwrap()
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn ledger(ty: AccountType, m: &str, opening: Decimal, amounts: &[(&str, Decimal)]) -> MonthlyLedger {
    let mut l = MonthlyLedger::new(ty, month(m), opening);
    l.transactions = amounts
        .iter()
        .map(|(d, a)| Transaction::new(date(d), "Misc", "", *a))
        .collect();
    close_month(&mut l, opening).unwrap();
    l
}

fn draft(d: &str, category: &str, amount: &str) -> TransactionDraft {
    TransactionDraft {
        date: Some(date(d)),
        category: Some(category.to_string()),
        description: "entry".to_string(),
        amount: Some(amount.to_string()),
    }
}

/// Memory-backed store that records call order and can be told to fail.
struct RecordingStore {
    inner: BlobLedgerStore,
    calls: Mutex<Vec<&'static str>>,
    fail_fetches: AtomicBool,
    fail_saves: AtomicBool,
}

impl RecordingStore {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: BlobLedgerStore::in_memory().unwrap(),
            calls: Mutex::new(Vec::new()),
            fail_fetches: AtomicBool::new(false),
            fail_saves: AtomicBool::new(false),
        })
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl LedgerStore for RecordingStore {
    async fn fetch(&self, ledger_type: AccountType) -> Result<Vec<MonthlyLedger>, StorageError> {
        self.record("fetch");
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(StorageError::operation("connection reset"));
        }
        self.inner.fetch_all(ledger_type).await
    }

    async fn save(&self, ledger_type: AccountType, ledgers: &[MonthlyLedger]) -> Result<(), StorageError> {
        self.record("save");
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::operation("bucket unavailable"));
        }
        self.inner.save_all(ledger_type, ledgers).await
    }

    async fn fetch_categories(&self) -> Result<CategoryList, StorageError> {
        self.record("fetch_categories");
        self.inner.load_categories().await
    }

    async fn save_categories(&self, categories: &CategoryList) -> Result<(), StorageError> {
        self.record("save_categories");
        self.inner.store_categories(categories).await
    }
}

type FetchResult = Result<Vec<MonthlyLedger>, StorageError>;

/// Store whose fetches complete only when the test releases them.
#[derive(Default)]
struct GatedStore {
    gates: Mutex<HashMap<AccountType, Vec<oneshot::Receiver<FetchResult>>>>,
}

impl GatedStore {
    fn gate(&self, ledger_type: AccountType) -> oneshot::Sender<FetchResult> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().entry(ledger_type).or_default().push(rx);
        tx
    }
}

#[async_trait]
impl LedgerStore for GatedStore {
    async fn fetch(&self, ledger_type: AccountType) -> Result<Vec<MonthlyLedger>, StorageError> {
        let gate = {
            let mut gates = self.gates.lock().unwrap();
            gates.get_mut(&ledger_type).filter(|g| !g.is_empty()).map(|g| g.remove(0))
        };
        let gate = gate.ok_or_else(|| StorageError::operation("no gate"))?;
        gate.await.map_err(|_| StorageError::operation("gate dropped"))?
    }

    async fn save(&self, _: AccountType, _: &[MonthlyLedger]) -> Result<(), StorageError> {
        Ok(())
    }

    async fn fetch_categories(&self) -> Result<CategoryList, StorageError> {
        Ok(CategoryList::default())
    }

    async fn save_categories(&self, _: &CategoryList) -> Result<(), StorageError> {
        Ok(())
    }
}

fn recording_session(current: &str) -> (Arc<RecordingStore>, LedgerSession<Arc<RecordingStore>, FixedClock>) {
    let store = RecordingStore::new();
    let session = LedgerSession::new(Arc::clone(&store), FixedClock(month(current)), AccountType::Bank);
    (store, session)
}

// ========== Loading ==========

#[tokio::test]
async fn test_load_empty_type_shows_placeholder_month() {
    let (_, mut session) = recording_session("2025-03");
    assert_eq!(session.view(), &LedgerView::Loading);

    assert_eq!(session.load(AccountType::Cash).await, FetchApplied::Applied);

    let ledgers = session.ledgers().unwrap();
    assert_eq!(ledgers.len(), 1);
    assert!(ledgers[0].synthetic);
    assert_eq!(ledgers[0].month, month("2025-03"));
    assert_eq!(session.active_type(), AccountType::Cash);
}

#[tokio::test]
async fn test_load_reconciles_stored_months() {
    let (store, mut session) = recording_session("2025-02");
    let jan = ledger(AccountType::Bank, "2025-01", dec!(1000), &[("2025-01-10", dec!(-50))]);
    let feb = ledger(AccountType::Bank, "2025-02", dec!(0), &[("2025-02-03", dec!(200))]);
    store.inner.save_all(AccountType::Bank, &[jan, feb]).await.unwrap();

    session.load(AccountType::Bank).await;

    let feb = session.month(month("2025-02")).unwrap();
    assert_eq!(feb.opening_balance, dec!(950));
    assert_eq!(feb.closing_balance, dec!(1150));
    assert_eq!(session.ledgers().unwrap().len(), 2);
}

#[tokio::test]
async fn test_fetch_failure_never_shows_previous_type() {
    let (store, mut session) = recording_session("2025-01");
    let bank = ledger(AccountType::Bank, "2025-01", dec!(500), &[]);
    store.inner.save_all(AccountType::Bank, &[bank]).await.unwrap();
    session.load(AccountType::Bank).await;
    assert!(session.ledgers().is_some());

    store.fail_fetches.store(true, Ordering::SeqCst);
    session.load(AccountType::Cash).await;

    assert_eq!(session.active_type(), AccountType::Cash);
    assert!(matches!(session.view(), LedgerView::Failed(msg) if msg.contains("CASH")));
    assert!(session.ledgers().is_none());
    assert_eq!(session.warnings().len(), 1);
}

// ========== Type-switch races ==========

#[tokio::test]
async fn test_superseded_cash_fetch_never_overwrites_bank_view() {
    let store = Arc::new(GatedStore::default());
    let cash_gate = store.gate(AccountType::Cash);
    let bank_gate = store.gate(AccountType::Bank);
    let mut session = LedgerSession::new(Arc::clone(&store), FixedClock(month("2025-01")), AccountType::Bank);

    let cash_ticket = session.switch_type(AccountType::Cash);
    let cash_fetch = store.fetch(AccountType::Cash);
    let bank_ticket = session.switch_type(AccountType::Bank);
    let bank_fetch = store.fetch(AccountType::Bank);

    bank_gate
        .send(Ok(vec![ledger(AccountType::Bank, "2025-01", dec!(100), &[])]))
        .unwrap();
    assert_eq!(session.apply_fetch(bank_ticket, bank_fetch.await), FetchApplied::Applied);

    cash_gate
        .send(Ok(vec![ledger(AccountType::Cash, "2025-01", dec!(7), &[])]))
        .unwrap();
    assert_eq!(session.apply_fetch(cash_ticket, cash_fetch.await), FetchApplied::Stale);

    let view = session.ledgers().unwrap();
    assert_eq!(view[0].ledger_type, AccountType::Bank);
    assert_eq!(view[0].opening_balance, dec!(100));
}

#[tokio::test]
async fn test_late_response_before_newer_one_is_still_discarded() {
    let store = Arc::new(GatedStore::default());
    let cash_gate = store.gate(AccountType::Cash);
    let bank_gate = store.gate(AccountType::Bank);
    let mut session = LedgerSession::new(Arc::clone(&store), FixedClock(month("2025-01")), AccountType::Bank);

    let cash_ticket = session.switch_type(AccountType::Cash);
    let cash_fetch = store.fetch(AccountType::Cash);
    let bank_ticket = session.switch_type(AccountType::Bank);
    let bank_fetch = store.fetch(AccountType::Bank);

    // The superseded CASH response arrives first.
    cash_gate.send(Ok(Vec::new())).unwrap();
    assert_eq!(session.apply_fetch(cash_ticket, cash_fetch.await), FetchApplied::Stale);
    assert_eq!(session.view(), &LedgerView::Loading);

    bank_gate.send(Err(StorageError::operation("timeout"))).unwrap();
    assert_eq!(session.apply_fetch(bank_ticket, bank_fetch.await), FetchApplied::Applied);
    assert!(matches!(session.view(), LedgerView::Failed(msg) if msg.contains("BANK")));
}

#[tokio::test]
async fn test_reselecting_same_type_discards_older_fetch() {
    let store = Arc::new(GatedStore::default());
    let first_gate = store.gate(AccountType::Cash);
    let second_gate = store.gate(AccountType::Cash);
    let mut session = LedgerSession::new(Arc::clone(&store), FixedClock(month("2025-01")), AccountType::Bank);

    let first = session.switch_type(AccountType::Cash);
    let first_fetch = store.fetch(AccountType::Cash);
    let second = session.switch_type(AccountType::Cash);
    let second_fetch = store.fetch(AccountType::Cash);

    second_gate
        .send(Ok(vec![ledger(AccountType::Cash, "2025-01", dec!(2), &[])]))
        .unwrap();
    first_gate
        .send(Ok(vec![ledger(AccountType::Cash, "2025-01", dec!(1), &[])]))
        .unwrap();

    let (first_result, second_result) = futures::join!(first_fetch, second_fetch);
    assert_eq!(session.apply_fetch(second, second_result), FetchApplied::Applied);
    assert_eq!(session.apply_fetch(first, first_result), FetchApplied::Stale);
    assert_eq!(session.ledgers().unwrap()[0].opening_balance, dec!(2));
}

// ========== Editing ==========

#[tokio::test]
async fn test_add_requires_loaded_view() {
    let (_, mut session) = recording_session("2025-01");
    let err = session
        .add_transaction(month("2025-01"), &draft("2025-01-02", "Misc", "5"))
        .unwrap_err();
    assert_eq!(err, SessionError::NotReady { ledger_type: AccountType::Bank });
}

#[tokio::test]
async fn test_invalid_entry_changes_nothing() {
    let (_, mut session) = recording_session("2025-01");
    session.load(AccountType::Bank).await;
    let before = session.view().clone();

    let err = session
        .add_transaction(month("2025-01"), &draft("2025-02-01", "Brand New", "5"))
        .unwrap_err();

    assert!(matches!(err, SessionError::Ledger(LedgerError::DateOutsideMonth { .. })));
    assert_eq!(session.view(), &before);
    assert!(!session.categories().contains("Brand New"));
    assert!(!session.is_dirty());
}

#[tokio::test]
async fn test_add_updates_view_and_persists_categories_first() {
    let (store, mut session) = recording_session("2025-01");
    session.load(AccountType::Bank).await;

    let request = session
        .add_transaction(month("2025-01"), &draft("2025-01-05", "Trophies", "-40.00"))
        .unwrap();

    assert_eq!(request.version, 1);
    assert!(session.is_dirty());
    assert_eq!(session.month(month("2025-01")).unwrap().closing_balance, dec!(-40));
    assert!(!session.month(month("2025-01")).unwrap().synthetic);
    assert!(request.categories.as_ref().unwrap().contains("Trophies"));

    assert_eq!(session.save(&request).await, SaveOutcome::Acknowledged);
    assert!(!session.is_dirty());
    assert_eq!(store.calls(), vec!["fetch", "save_categories", "save"]);

    let stored = store.inner.fetch_all(AccountType::Bank).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].closing_balance, dec!(-40));
    assert!(store.inner.load_categories().await.unwrap().contains("Trophies"));
}

#[tokio::test]
async fn test_known_category_is_not_resaved() {
    let (_, mut session) = recording_session("2025-01");
    session.load(AccountType::Bank).await;
    let request = session
        .add_transaction(month("2025-01"), &draft("2025-01-05", "Misc", "1"))
        .unwrap();
    assert!(request.categories.is_none());
}

#[tokio::test]
async fn test_placeholder_month_is_not_saved_until_used() {
    let (store, mut session) = recording_session("2025-03");
    let jan = ledger(AccountType::Bank, "2025-01", dec!(10), &[]);
    store.inner.save_all(AccountType::Bank, &[jan]).await.unwrap();
    session.load(AccountType::Bank).await;
    assert!(session.month(month("2025-03")).unwrap().synthetic);

    let request = session
        .add_transaction(month("2025-01"), &draft("2025-01-05", "Misc", "5"))
        .unwrap();
    let months: Vec<Month> = request.ledgers.iter().map(|l| l.month).collect();
    assert_eq!(months, vec![month("2025-01")]);
    assert_eq!(session.month(month("2025-03")).unwrap().opening_balance, dec!(15));
}

#[tokio::test]
async fn test_failed_save_keeps_local_state_and_warns() {
    let (store, mut session) = recording_session("2025-01");
    session.load(AccountType::Bank).await;
    store.fail_saves.store(true, Ordering::SeqCst);

    let request = session
        .add_transaction(month("2025-01"), &draft("2025-01-05", "Misc", "12.34"))
        .unwrap();
    let outcome = session.save(&request).await;

    assert!(matches!(outcome, SaveOutcome::Failed(ref msg) if msg.contains("bucket unavailable")));
    assert_eq!(session.month(month("2025-01")).unwrap().closing_balance, dec!(12.34));
    assert!(session.is_dirty());
    assert_eq!(session.warnings().len(), 1);
}

#[tokio::test]
async fn test_older_acknowledgement_does_not_mark_newer_edit_saved() {
    let (_, mut session) = recording_session("2025-01");
    session.load(AccountType::Bank).await;

    let first = session
        .add_transaction(month("2025-01"), &draft("2025-01-05", "Misc", "1"))
        .unwrap();
    let second = session
        .add_transaction(month("2025-01"), &draft("2025-01-06", "Misc", "2"))
        .unwrap();
    assert!(second.version > first.version);
    assert_eq!(second.ledgers[0].transactions.len(), 2);

    assert_eq!(session.apply_save_result(&first, Ok(())), SaveOutcome::Superseded);
    assert!(session.is_dirty());

    assert_eq!(session.apply_save_result(&second, Ok(())), SaveOutcome::Acknowledged);
    assert!(!session.is_dirty());

    // A late acknowledgement of the older edit changes nothing.
    assert_eq!(session.apply_save_result(&first, Ok(())), SaveOutcome::Superseded);
    assert!(!session.is_dirty());
}

#[tokio::test]
async fn test_older_request_is_not_written_over_newer_one() {
    let (store, mut session) = recording_session("2025-01");
    session.load(AccountType::Bank).await;

    let first = session
        .add_transaction(month("2025-01"), &draft("2025-01-05", "Misc", "1"))
        .unwrap();
    let second = session
        .add_transaction(month("2025-01"), &draft("2025-01-06", "Misc", "2"))
        .unwrap();

    assert_eq!(session.save(&second).await, SaveOutcome::Acknowledged);
    assert_eq!(session.save(&first).await, SaveOutcome::Superseded);
    assert!(!session.is_dirty());
    assert_eq!(store.calls(), vec!["fetch", "save"]);

    let stored = store.inner.fetch_all(AccountType::Bank).await.unwrap();
    assert_eq!(stored[0].transactions.len(), 2);
    assert_eq!(stored[0].closing_balance, dec!(3));
    assert_eq!(session.month(month("2025-01")).unwrap().closing_balance, dec!(3));
}

#[tokio::test]
async fn test_skipped_request_categories_ride_on_newer_request() {
    let (store, mut session) = recording_session("2025-01");
    session.load(AccountType::Bank).await;

    let first = session
        .add_transaction(month("2025-01"), &draft("2025-01-05", "Trophies", "1"))
        .unwrap();
    let second = session
        .add_transaction(month("2025-01"), &draft("2025-01-06", "Misc", "2"))
        .unwrap();
    assert!(second.categories.as_ref().unwrap().contains("Trophies"));

    assert_eq!(session.save(&second).await, SaveOutcome::Acknowledged);
    assert_eq!(session.save(&first).await, SaveOutcome::Superseded);
    assert!(store.inner.load_categories().await.unwrap().contains("Trophies"));

    let third = session
        .add_transaction(month("2025-01"), &draft("2025-01-07", "Trophies", "3"))
        .unwrap();
    assert!(third.categories.is_none());
}

#[tokio::test]
async fn test_versions_are_tracked_per_type() {
    let (store, mut session) = recording_session("2025-01");
    session.load(AccountType::Bank).await;
    let bank = session
        .add_transaction(month("2025-01"), &draft("2025-01-05", "Misc", "10"))
        .unwrap();

    session.load(AccountType::Cash).await;
    let cash = session
        .add_transaction(month("2025-01"), &draft("2025-01-05", "Misc", "20"))
        .unwrap();
    assert!(cash.version > bank.version);

    assert_eq!(session.save(&cash).await, SaveOutcome::Acknowledged);
    assert!(session.is_dirty());
    assert_eq!(session.save(&bank).await, SaveOutcome::Acknowledged);
    assert!(!session.is_dirty());

    let stored = store.inner.fetch_all(AccountType::Bank).await.unwrap();
    assert_eq!(stored[0].closing_balance, dec!(10));
}

#[tokio::test]
async fn test_add_category() {
    let (_, mut session) = recording_session("2025-01");
    assert!(session.add_category("Trophies").unwrap().is_some());
    assert!(session.add_category("Trophies").unwrap().is_none());
    assert_eq!(
        session.add_category(" ").unwrap_err(),
        SessionError::Ledger(LedgerError::EmptyCategory)
    );
}

#[tokio::test]
async fn test_refresh_categories() {
    let (store, mut session) = recording_session("2025-01");
    store
        .inner
        .store_categories(&CategoryList::new(["Custom"]))
        .await
        .unwrap();
    session.refresh_categories().await;
    assert_eq!(session.categories().labels(), ["Custom"]);
}
