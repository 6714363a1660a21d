// SPDX-License-Identifier: Apache-2.0

//! In-memory doubles for the repository and media seams, used by the
//! pipeline and handler tests.

use crate::{
    AdminUserStore, AuditLogStore, CitizenFilter, CitizenRecordStore, MediaError, MediaStore,
    Page, RegistrationStore, StoreError,
};
use async_trait::async_trait;
use civreg_model::{
    AdminUser, CitizenRecord, NewAdminUser, NewAuditLogEntry, NewRegistration, Registration,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct FakeCitizenStore {
    /// Kept in insertion order; `find` sorts by recency on the way out.
    pub records: Mutex<Vec<CitizenRecord>>,
    /// Hashes whose upsert should fail, to exercise per-row error paths.
    pub fail_hashes: Mutex<HashSet<String>>,
}

#[async_trait]
impl CitizenRecordStore for FakeCitizenStore {
    async fn upsert_by_hash(&self, record: &CitizenRecord) -> Result<(), StoreError> {
        if self.fail_hashes.lock().await.contains(&record.identity_hash) {
            return Err(StoreError::Backend("injected upsert failure".to_string()));
        }
        let mut records = self.records.lock().await;
        if let Some(existing) = records
            .iter_mut()
            .find(|r| r.identity_hash == record.identity_hash)
        {
            let imported_at = existing.imported_at;
            *existing = record.clone();
            existing.imported_at = imported_at;
        } else {
            records.push(record.clone());
        }
        Ok(())
    }

    async fn find_by_hash(
        &self,
        identity_hash: &str,
    ) -> Result<Option<CitizenRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|r| r.identity_hash == identity_hash)
            .cloned())
    }

    async fn find(
        &self,
        filter: &CitizenFilter,
        page: Page,
    ) -> Result<Vec<CitizenRecord>, StoreError> {
        let records = self.records.lock().await;
        let mut matched: Vec<CitizenRecord> = records
            .iter()
            .filter(|r| matches_filter(r, filter))
            .cloned()
            .collect();
        matched.reverse();
        matched.sort_by(|a, b| b.imported_at.cmp(&a.imported_at));
        Ok(matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn count(&self, filter: &CitizenFilter) -> Result<u64, StoreError> {
        let records = self.records.lock().await;
        Ok(records.iter().filter(|r| matches_filter(r, filter)).count() as u64)
    }
}

fn matches_filter(record: &CitizenRecord, filter: &CitizenFilter) -> bool {
    if let Some(pvc) = &filter.pvc_status {
        if &record.pvc_status != pvc {
            return false;
        }
    }
    if let Some(state) = &filter.state {
        if record.state.as_deref() != Some(state.as_str()) {
            return false;
        }
    }
    true
}

#[derive(Default)]
pub struct FakeRegistrationStore {
    pub registrations: Mutex<Vec<Registration>>,
    next_id: AtomicI64,
}

#[async_trait]
impl RegistrationStore for FakeRegistrationStore {
    async fn insert(&self, registration: &NewRegistration) -> Result<i64, StoreError> {
        let mut registrations = self.registrations.lock().await;
        if registrations
            .iter()
            .any(|r| r.identity_hash == registration.identity_hash)
        {
            return Err(StoreError::Conflict(
                "UNIQUE constraint failed: registrations.identity_hash".to_string(),
            ));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        registrations.push(Registration {
            id,
            first_name: registration.first_name.clone(),
            middle_name: registration.middle_name.clone(),
            surname: registration.surname.clone(),
            nationality: registration.nationality.clone(),
            hometown: registration.hometown.clone(),
            lga_of_origin: registration.lga_of_origin.clone(),
            state_of_origin: registration.state_of_origin.clone(),
            dob: registration.dob.clone(),
            religion: registration.religion.clone(),
            gender: registration.gender.clone(),
            phone: registration.phone.clone(),
            is_whatsapp: registration.is_whatsapp,
            email: registration.email.clone(),
            house_number: registration.house_number.clone(),
            street_name: registration.street_name.clone(),
            city: registration.city.clone(),
            residence_lga: registration.residence_lga.clone(),
            residence_state: registration.residence_state.clone(),
            pvc_status: registration.pvc_status.clone(),
            identity_hash: registration.identity_hash.clone(),
            identity_masked: registration.identity_masked.clone(),
            image_url: registration.image_url.clone(),
            emergency_name: registration.emergency_name.clone(),
            emergency_rel: registration.emergency_rel.clone(),
            emergency_phone: registration.emergency_phone.clone(),
            status: registration.status,
            created_at: registration.created_at,
        });
        Ok(id)
    }

    async fn find_by_hash(
        &self,
        identity_hash: &str,
    ) -> Result<Option<Registration>, StoreError> {
        Ok(self
            .registrations
            .lock()
            .await
            .iter()
            .find(|r| r.identity_hash == identity_hash)
            .cloned())
    }

    async fn find(&self, page: Page) -> Result<Vec<Registration>, StoreError> {
        let registrations = self.registrations.lock().await;
        let mut all: Vec<Registration> = registrations.iter().cloned().collect();
        all.reverse();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.registrations.lock().await.len() as u64)
    }

    async fn count_with_pvc(&self, pvc_status: &str) -> Result<u64, StoreError> {
        Ok(self
            .registrations
            .lock()
            .await
            .iter()
            .filter(|r| r.pvc_status.as_deref() == Some(pvc_status))
            .count() as u64)
    }

    async fn count_created_since(&self, since_millis: i64) -> Result<u64, StoreError> {
        Ok(self
            .registrations
            .lock()
            .await
            .iter()
            .filter(|r| r.created_at >= since_millis)
            .count() as u64)
    }
}

#[derive(Default)]
pub struct FakeAdminUserStore {
    pub users: Mutex<Vec<AdminUser>>,
    next_id: AtomicI64,
}

#[async_trait]
impl AdminUserStore for FakeAdminUserStore {
    async fn insert(&self, user: &NewAdminUser) -> Result<i64, StoreError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(
                "UNIQUE constraint failed: admin_users.email".to_string(),
            ));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        users.push(AdminUser {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            created_at: user.created_at,
        });
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>, StoreError> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[derive(Default)]
pub struct FakeAuditLogStore {
    pub entries: Mutex<Vec<NewAuditLogEntry>>,
}

#[async_trait]
impl AuditLogStore for FakeAuditLogStore {
    async fn append(&self, entry: &NewAuditLogEntry) -> Result<(), StoreError> {
        self.entries.lock().await.push(entry.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeMediaStore {
    pub stored: Mutex<Vec<(String, usize)>>,
    pub fail_writes: AtomicBool,
}

#[async_trait]
impl MediaStore for FakeMediaStore {
    async fn store_image(&self, bytes: Vec<u8>, extension: &str) -> Result<String, MediaError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(MediaError("injected media failure".to_string()));
        }
        let mut stored = self.stored.lock().await;
        let url = format!("fake://media/{}.{extension}", stored.len());
        stored.push((url.clone(), bytes.len()));
        Ok(url)
    }
}
