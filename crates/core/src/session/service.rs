//! Ledger session: one screen's view of one account type at a time.

use std::collections::BTreeMap;

use committee_shared::types::Month;
use tracing::{debug, info, warn};

use super::error::SessionError;
use super::types::{FetchApplied, FetchTicket, LedgerView, SaveOutcome, SaveRequest};
use crate::clock::Clock;
use crate::ledger::{
    add_transaction, reconcile, AccountType, CategoryList, MonthlyLedger, TransactionDraft,
};
use crate::storage::{LedgerStore, StorageError};

/// Saves a request: the category list first, then the month set.
///
/// # Errors
///
/// Returns the first store error; the month set is not written if the
/// category list could not be.
pub async fn persist<S>(store: &S, request: &SaveRequest) -> Result<(), StorageError>
where
    S: LedgerStore + ?Sized,
{
    if let Some(categories) = &request.categories {
        store.save_categories(categories).await?;
    }
    store.save(request.ledger_type, &request.ledgers).await
}

/// Holds the reconciled month set of the active account type and turns user
/// edits into versioned save requests.
///
/// Fetches are tagged with a [`FetchTicket`]; only the response to the latest
/// fetch of the active type is applied. Edits are applied locally first and
/// persisted afterwards; a failed save keeps the local state. Versions are
/// tracked per account type: a request is only written while no newer
/// request for the same type exists.
pub struct LedgerSession<S, C> {
    store: S,
    clock: C,
    active_type: AccountType,
    generation: u64,
    view: LedgerView,
    categories: CategoryList,
    saved_categories: CategoryList,
    next_version: u64,
    latest_versions: BTreeMap<AccountType, u64>,
    saved_versions: BTreeMap<AccountType, u64>,
    warnings: Vec<String>,
}

impl<S: LedgerStore, C: Clock> LedgerSession<S, C> {
    /// Creates a session showing `ledger_type`, not yet loaded.
    #[must_use]
    pub fn new(store: S, clock: C, ledger_type: AccountType) -> Self {
        Self {
            store,
            clock,
            active_type: ledger_type,
            generation: 0,
            view: LedgerView::Loading,
            categories: CategoryList::default(),
            saved_categories: CategoryList::default(),
            next_version: 0,
            latest_versions: BTreeMap::new(),
            saved_versions: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Active account type.
    #[must_use]
    pub fn active_type(&self) -> AccountType {
        self.active_type
    }

    /// Current view.
    #[must_use]
    pub fn view(&self) -> &LedgerView {
        &self.view
    }

    /// Reconciled months of the active type, if loaded.
    #[must_use]
    pub fn ledgers(&self) -> Option<&[MonthlyLedger]> {
        self.view.ledgers()
    }

    /// One month of the active type, if loaded.
    #[must_use]
    pub fn month(&self, month: Month) -> Option<&MonthlyLedger> {
        self.ledgers()?.iter().find(|l| l.month == month)
    }

    /// Category list.
    #[must_use]
    pub fn categories(&self) -> &CategoryList {
        &self.categories
    }

    /// Failures recorded so far, oldest first.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Returns true while the latest edit of any type has not been
    /// acknowledged.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.latest_versions
            .iter()
            .any(|(ty, latest)| self.saved_version(*ty) < *latest)
    }

    fn latest_version(&self, ledger_type: AccountType) -> u64 {
        self.latest_versions.get(&ledger_type).copied().unwrap_or(0)
    }

    fn saved_version(&self, ledger_type: AccountType) -> u64 {
        self.saved_versions.get(&ledger_type).copied().unwrap_or(0)
    }

    /// Returns true if a newer request of the same type exists or the store
    /// already holds this version or a later one.
    #[must_use]
    pub fn is_superseded(&self, request: &SaveRequest) -> bool {
        request.version < self.latest_version(request.ledger_type)
            || request.version <= self.saved_version(request.ledger_type)
    }

    /// Underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Switches the view to `ledger_type` and returns the ticket its fetch
    /// must carry. Any earlier outstanding fetch becomes stale.
    pub fn switch_type(&mut self, ledger_type: AccountType) -> FetchTicket {
        self.generation += 1;
        self.active_type = ledger_type;
        self.view = LedgerView::Loading;
        debug!(%ledger_type, generation = self.generation, "Switched ledger type");
        FetchTicket {
            ledger_type,
            generation: self.generation,
        }
    }

    /// Applies a fetch response if `ticket` is still the latest fetch of the
    /// active type.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<MonthlyLedger>, StorageError>,
    ) -> FetchApplied {
        if ticket.ledger_type != self.active_type || ticket.generation != self.generation {
            debug!(
                ledger_type = %ticket.ledger_type,
                generation = ticket.generation,
                current = self.generation,
                "Discarded stale fetch"
            );
            return FetchApplied::Stale;
        }

        let ledger_type = ticket.ledger_type;
        let current_month = self.clock.current_month();
        let outcome = result
            .map_err(|e| format!("Failed to load {ledger_type} ledger: {e}"))
            .and_then(|ledgers| {
                reconcile(ledgers, ledger_type, current_month)
                    .map_err(|e| format!("Failed to reconcile {ledger_type} ledger: {e}"))
            });

        self.view = match outcome {
            Ok(reconciled) => {
                info!(%ledger_type, months = reconciled.len(), "Loaded ledgers");
                LedgerView::Ready(reconciled)
            }
            Err(message) => {
                self.record_failure(&message);
                LedgerView::Failed(message)
            }
        };
        FetchApplied::Applied
    }

    /// Switches to `ledger_type` and loads it from the store.
    pub async fn load(&mut self, ledger_type: AccountType) -> FetchApplied {
        let ticket = self.switch_type(ledger_type);
        let result = self.store.fetch(ledger_type).await;
        self.apply_fetch(ticket, result)
    }

    /// Reloads the category list; keeps the current list on failure.
    pub async fn refresh_categories(&mut self) {
        match self.store.fetch_categories().await {
            Ok(categories) => {
                self.saved_categories = categories.clone();
                self.categories = categories;
            }
            Err(e) => self.record_failure(&format!("Failed to load categories: {e}")),
        }
    }

    /// Adds a category; returns the list to persist if it grew.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank label.
    pub fn add_category(&mut self, label: &str) -> Result<Option<CategoryList>, SessionError> {
        Ok(self.categories.add(label)?.then(|| self.categories.clone()))
    }

    /// Adds a transaction to `month` of the active type.
    ///
    /// The view is updated immediately; the returned request carries the
    /// whole month set (and the category list if the transaction introduced
    /// a category) for persistence.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving all state unchanged, if no month set is
    /// loaded or the draft is invalid.
    pub fn add_transaction(
        &mut self,
        month: Month,
        draft: &TransactionDraft,
    ) -> Result<SaveRequest, SessionError> {
        let ledgers = self.ledgers().ok_or(SessionError::NotReady {
            ledger_type: self.active_type,
        })?;
        let transaction = draft.validate(month)?;

        let mut categories = self.categories.clone();
        categories.add(&transaction.category)?;

        let updated = add_transaction(
            ledgers.to_vec(),
            self.active_type,
            month,
            transaction,
            self.clock.current_month(),
        )?;

        self.next_version += 1;
        self.latest_versions.insert(self.active_type, self.next_version);
        let request = SaveRequest {
            ledger_type: self.active_type,
            version: self.next_version,
            ledgers: updated.iter().filter(|l| !l.synthetic).cloned().collect(),
            categories: (categories != self.saved_categories).then(|| categories.clone()),
        };
        self.categories = categories;
        self.view = LedgerView::Ready(updated);
        debug!(
            ledger_type = %request.ledger_type,
            version = request.version,
            %month,
            "Added transaction"
        );
        Ok(request)
    }

    /// Records the store's answer to a save request.
    ///
    /// An acknowledgement for an older version never marks a newer edit of
    /// the same type as saved. A failure keeps the local state and is
    /// recorded as a warning.
    pub fn apply_save_result(
        &mut self,
        request: &SaveRequest,
        result: Result<(), StorageError>,
    ) -> SaveOutcome {
        match result {
            Ok(()) => {
                let ledger_type = request.ledger_type;
                let latest = self.latest_version(ledger_type);
                if let Some(categories) = &request.categories
                    && categories.len() >= self.saved_categories.len()
                {
                    self.saved_categories = categories.clone();
                }
                let saved = self.saved_version(ledger_type).max(request.version);
                self.saved_versions.insert(ledger_type, saved);
                if request.version < latest {
                    debug!(%ledger_type, version = request.version, latest, "Superseded save acknowledged");
                    SaveOutcome::Superseded
                } else {
                    SaveOutcome::Acknowledged
                }
            }
            Err(e) => {
                let message = format!("Failed to save {} ledger: {e}", request.ledger_type);
                self.record_failure(&message);
                SaveOutcome::Failed(message)
            }
        }
    }

    /// Persists a save request and records the outcome.
    ///
    /// A superseded request is not written: the newer request of the same
    /// type carries the whole month set and any unsaved categories.
    pub async fn save(&mut self, request: &SaveRequest) -> SaveOutcome {
        if self.is_superseded(request) {
            debug!(
                ledger_type = %request.ledger_type,
                version = request.version,
                "Skipped superseded save"
            );
            return SaveOutcome::Superseded;
        }
        let result = persist(&self.store, request).await;
        self.apply_save_result(request, result)
    }

    fn record_failure(&mut self, message: &str) {
        warn!(error = %message, "Ledger session failure");
        self.warnings.push(message.to_string());
    }
}
