//! Test utilities for the backend crate.
//!
//! Provides [`InMemoryStore`], a process-local stand-in for the Postgres
//! adapters used by both unit tests (in `src/`) and integration tests (in
//! `tests/`). It reproduces the store behaviour the domain relies on:
//! per-account exclusive locks held until the transaction finalises, a
//! unique transaction-id gate, and commit/rollback visibility.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::OwnedMutexGuard;

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, LedgerStoreError, LedgerTransaction,
    LedgerUnitOfWork, NewPayment, NewUser, PaymentInsert, PaymentRepository,
    PaymentRepositoryError, UserPatch, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Account, AccountId, Payment, PaymentId, TransactionId, User, UserId, UserWithAccounts,
};

#[derive(Default)]
struct Tables {
    users: HashMap<i64, User>,
    accounts: HashMap<i64, Account>,
    payments: HashMap<String, Payment>,
    next_user_id: i64,
    next_payment_id: i64,
    account_locks: HashMap<i64, Arc<tokio::sync::Mutex<()>>>,
}

impl Tables {
    fn lock_handle(&mut self, account_id: AccountId) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(
            self.account_locks
                .entry(account_id.value())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }
}

/// Shared in-memory database standing in for Postgres in tests.
///
/// Cloning shares the underlying tables, so one store can back the ledger
/// unit of work and the read-side repositories at the same time.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a user directly, bypassing validation. Returns the stored row.
    pub fn seed_user(&self, user: User) -> User {
        let mut tables = self.tables();
        tables.next_user_id = tables.next_user_id.max(user.id().value());
        tables.users.insert(user.id().value(), user.clone());
        user
    }

    /// Insert an account directly with the given balance.
    pub fn seed_account(&self, account: Account) -> Account {
        self.tables()
            .accounts
            .insert(account.id().value(), account.clone());
        account
    }

    /// Read an account's committed state.
    pub fn account(&self, id: AccountId) -> Option<Account> {
        self.tables().accounts.get(&id.value()).cloned()
    }

    /// Read a committed payment by transaction id.
    pub fn payment(&self, transaction_id: &TransactionId) -> Option<Payment> {
        self.tables()
            .payments
            .get(transaction_id.as_str())
            .cloned()
    }

    /// Number of committed payments across all accounts.
    pub fn payment_count(&self) -> usize {
        self.tables().payments.len()
    }
}

#[async_trait]
impl LedgerUnitOfWork for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, LedgerStoreError> {
        Ok(Box::new(InMemoryTransaction {
            store: self.clone(),
            held_locks: HashMap::new(),
            staged_accounts: HashMap::new(),
            staged_payments: Vec::new(),
            spent: false,
        }))
    }
}

struct InMemoryTransaction {
    store: InMemoryStore,
    // Guards held until commit or rollback, one per locked account row.
    held_locks: HashMap<i64, OwnedMutexGuard<()>>,
    staged_accounts: HashMap<i64, Account>,
    staged_payments: Vec<Payment>,
    spent: bool,
}

impl InMemoryTransaction {
    fn check_live(&self) -> Result<(), LedgerStoreError> {
        if self.spent {
            Err(LedgerStoreError::Spent)
        } else {
            Ok(())
        }
    }

    /// Acquire the account's row lock, awaiting a concurrent holder.
    /// Re-acquiring a lock this transaction already holds is a no-op,
    /// mirroring Postgres row locks being per-transaction.
    async fn acquire_lock(&mut self, account_id: AccountId) {
        if self.held_locks.contains_key(&account_id.value()) {
            return;
        }
        let handle = self.store.tables().lock_handle(account_id);
        let guard = handle.lock_owned().await;
        self.held_locks.insert(account_id.value(), guard);
    }

    /// Current row state as this transaction sees it: staged writes shadow
    /// committed rows.
    fn account_view(&self, account_id: AccountId) -> Option<Account> {
        self.staged_accounts
            .get(&account_id.value())
            .cloned()
            .or_else(|| self.store.tables().accounts.get(&account_id.value()).cloned())
    }

    fn finalise(&mut self) {
        self.spent = true;
        self.held_locks.clear();
    }
}

#[async_trait]
impl LedgerTransaction for InMemoryTransaction {
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>, LedgerStoreError> {
        self.check_live()?;
        Ok(self.store.tables().users.get(&id.value()).cloned())
    }

    async fn find_payment_by_transaction_id(
        &mut self,
        transaction_id: &TransactionId,
    ) -> Result<Option<Payment>, LedgerStoreError> {
        self.check_live()?;
        if let Some(staged) = self
            .staged_payments
            .iter()
            .find(|payment| payment.transaction_id() == transaction_id)
        {
            return Ok(Some(staged.clone()));
        }
        Ok(self
            .store
            .tables()
            .payments
            .get(transaction_id.as_str())
            .cloned())
    }

    async fn lock_account(&mut self, id: AccountId) -> Result<Option<Account>, LedgerStoreError> {
        self.check_live()?;
        self.acquire_lock(id).await;
        Ok(self.account_view(id))
    }

    async fn create_account_if_absent(
        &mut self,
        user_id: UserId,
        account_id: AccountId,
    ) -> Result<(), LedgerStoreError> {
        self.check_live()?;
        self.acquire_lock(account_id).await;
        if self.account_view(account_id).is_none() {
            self.staged_accounts.insert(
                account_id.value(),
                Account::new(account_id, user_id, Decimal::ZERO, Utc::now()),
            );
        }
        Ok(())
    }

    async fn insert_payment_if_absent(
        &mut self,
        payment: NewPayment,
    ) -> Result<PaymentInsert, LedgerStoreError> {
        self.check_live()?;
        if self
            .find_payment_by_transaction_id(&payment.transaction_id)
            .await?
            .is_some()
        {
            return Ok(PaymentInsert::AlreadyRecorded);
        }
        let id = {
            let mut tables = self.store.tables();
            tables.next_payment_id += 1;
            PaymentId::new(tables.next_payment_id)
        };
        let row = Payment::new(
            id,
            payment.transaction_id,
            payment.user_id,
            payment.account_id,
            payment.amount,
        );
        self.staged_payments.push(row.clone());
        Ok(PaymentInsert::Inserted(row))
    }

    async fn apply_balance_delta(
        &mut self,
        account: &Account,
        delta: Decimal,
    ) -> Result<Account, LedgerStoreError> {
        self.check_live()?;
        if !self.held_locks.contains_key(&account.id().value()) {
            return Err(LedgerStoreError::query(format!(
                "account {} updated without holding its lock",
                account.id()
            )));
        }
        let updated = Account::new(
            account.id(),
            account.user_id(),
            account.balance() + delta,
            Utc::now(),
        );
        self.staged_accounts
            .insert(account.id().value(), updated.clone());
        Ok(updated)
    }

    async fn commit(&mut self) -> Result<(), LedgerStoreError> {
        self.check_live()?;
        {
            let mut tables = self.store.tables();
            for (id, account) in self.staged_accounts.drain() {
                tables.accounts.insert(id, account);
            }
            for payment in self.staged_payments.drain(..) {
                tables
                    .payments
                    .insert(payment.transaction_id().as_str().to_owned(), payment);
            }
        }
        self.finalise();
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), LedgerStoreError> {
        self.check_live()?;
        self.staged_accounts.clear();
        self.staged_payments.clear();
        self.finalise();
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.tables().users.get(&id.value()).cloned())
    }

    async fn find_by_email(
        &self,
        email: &crate::domain::Email,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|user| user.email() == email)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, UserRepositoryError> {
        let mut tables = self.tables();
        if tables.users.values().any(|existing| existing.email() == &user.email) {
            return Err(UserRepositoryError::duplicate_email(user.email.as_str()));
        }
        tables.next_user_id += 1;
        let row = User::new(
            UserId::new(tables.next_user_id),
            user.email,
            user.full_name,
            user.password_hash,
            user.is_admin,
        );
        tables.users.insert(row.id().value(), row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: UserId,
        patch: UserPatch,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut tables = self.tables();
        if let Some(email) = &patch.email {
            let taken = tables
                .users
                .values()
                .any(|other| other.id() != id && other.email() == email);
            if taken {
                return Err(UserRepositoryError::duplicate_email(email.as_str()));
            }
        }
        let Some(existing) = tables.users.get(&id.value()).cloned() else {
            return Ok(None);
        };
        let updated = User::new(
            id,
            patch.email.unwrap_or_else(|| existing.email().clone()),
            patch
                .full_name
                .or_else(|| existing.full_name().map(str::to_owned)),
            patch
                .password_hash
                .unwrap_or_else(|| existing.password_hash().to_owned()),
            patch.is_admin.unwrap_or(existing.is_admin()),
        );
        tables.users.insert(id.value(), updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError> {
        let mut tables = self.tables();
        let removed = tables.users.remove(&id.value()).is_some();
        if removed {
            tables.accounts.retain(|_, account| account.user_id() != id);
            tables.payments.retain(|_, payment| payment.user_id() != id);
        }
        Ok(removed)
    }

    async fn list_with_accounts(&self) -> Result<Vec<UserWithAccounts>, UserRepositoryError> {
        let tables = self.tables();
        let mut users: Vec<_> = tables.users.values().cloned().collect();
        users.sort_by_key(User::id);
        Ok(users
            .into_iter()
            .map(|user| {
                let mut accounts: Vec<_> = tables
                    .accounts
                    .values()
                    .filter(|account| account.user_id() == user.id())
                    .cloned()
                    .collect();
                accounts.sort_by_key(Account::id);
                UserWithAccounts { user, accounts }
            })
            .collect())
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Account>, AccountRepositoryError> {
        let mut accounts: Vec<_> = self
            .tables()
            .accounts
            .values()
            .filter(|account| account.user_id() == user_id)
            .cloned()
            .collect();
        accounts.sort_by_key(Account::id);
        Ok(accounts)
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Payment>, PaymentRepositoryError> {
        let mut payments: Vec<_> = self
            .tables()
            .payments
            .values()
            .filter(|payment| payment.user_id() == user_id)
            .cloned()
            .collect();
        payments.sort_by_key(Payment::id);
        Ok(payments)
    }
}
