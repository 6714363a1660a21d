// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use async_trait::async_trait;
use civreg_model::{
    AdminUser, CitizenRecord, NewAdminUser, NewAuditLogEntry, NewRegistration, Registration,
};
use std::fmt::{Display, Formatter};

mod fake;
mod media;
mod sqlite;

pub const CRATE_NAME: &str = "civreg-store";

pub use fake::{
    FakeAdminUserStore, FakeAuditLogStore, FakeCitizenStore, FakeMediaStore,
    FakeRegistrationStore,
};
pub use media::{LocalMediaStore, MediaError, MediaStore};
pub use sqlite::SqliteStore;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// A unique constraint rejected the write (duplicate identity hash,
    /// duplicate admin email).
    Conflict(String),
    NotFound(String),
    Backend(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict(msg) => write!(f, "conflict: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::Backend(msg) => write!(f, "store backend error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Filter for the imported-citizen listing. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitizenFilter {
    pub pvc_status: Option<String>,
    pub state: Option<String>,
}

/// 1-based pagination window. Out-of-range pages yield empty result sets,
/// never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit,
        }
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { page: 1, limit: 50 }
    }
}

/// Persistence seam for bulk-imported citizen records.
#[async_trait]
pub trait CitizenRecordStore: Send + Sync + 'static {
    /// Insert-or-replace keyed by `identity_hash`. All fields are
    /// overwritten except `imported_at`, which keeps its first-seen value.
    async fn upsert_by_hash(&self, record: &CitizenRecord) -> Result<(), StoreError>;
    async fn find_by_hash(&self, identity_hash: &str)
    -> Result<Option<CitizenRecord>, StoreError>;
    /// Page of records sorted by import recency, most recent first.
    async fn find(&self, filter: &CitizenFilter, page: Page)
    -> Result<Vec<CitizenRecord>, StoreError>;
    async fn count(&self, filter: &CitizenFilter) -> Result<u64, StoreError>;
}

/// Persistence seam for public self-submissions.
#[async_trait]
pub trait RegistrationStore: Send + Sync + 'static {
    /// Inserts a new registration; a duplicate `identity_hash` surfaces as
    /// [`StoreError::Conflict`] from the unique index, which is the real
    /// concurrency guard behind the handler's pre-check.
    async fn insert(&self, registration: &NewRegistration) -> Result<i64, StoreError>;
    async fn find_by_hash(&self, identity_hash: &str)
    -> Result<Option<Registration>, StoreError>;
    /// Page of registrations sorted by submission recency, most recent first.
    async fn find(&self, page: Page) -> Result<Vec<Registration>, StoreError>;
    async fn count(&self) -> Result<u64, StoreError>;
    async fn count_with_pvc(&self, pvc_status: &str) -> Result<u64, StoreError>;
    /// Sliding-window count: registrations created at or after the given
    /// unix-millis instant.
    async fn count_created_since(&self, since_millis: i64) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait AdminUserStore: Send + Sync + 'static {
    async fn insert(&self, user: &NewAdminUser) -> Result<i64, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>, StoreError>;
}

#[async_trait]
pub trait AuditLogStore: Send + Sync + 'static {
    async fn append(&self, entry: &NewAuditLogEntry) -> Result<(), StoreError>;
}
