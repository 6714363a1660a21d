// SPDX-License-Identifier: Apache-2.0

use crate::{
    AdminUserStore, AuditLogStore, CitizenFilter, CitizenRecordStore, Page, RegistrationStore,
    StoreError,
};
use async_trait::async_trait;
use civreg_model::{
    AdminUser, CitizenRecord, NewAdminUser, NewAuditLogEntry, NewRegistration, Registration,
    RegistrationStatus, Role,
};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS citizen_records (
      identity_hash TEXT PRIMARY KEY,
      identity_masked TEXT NOT NULL,
      first_name TEXT,
      last_name TEXT,
      gender TEXT,
      date_of_birth TEXT,
      state TEXT,
      lga TEXT,
      ward TEXT,
      phone TEXT,
      email TEXT,
      address TEXT,
      pvc_status TEXT NOT NULL DEFAULT 'NO',
      imported_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_citizen_records_imported_at
      ON citizen_records(imported_at DESC);
    CREATE INDEX IF NOT EXISTS idx_citizen_records_pvc_status
      ON citizen_records(pvc_status);
    CREATE INDEX IF NOT EXISTS idx_citizen_records_state
      ON citizen_records(state);

    CREATE TABLE IF NOT EXISTS registrations (
      id INTEGER PRIMARY KEY,
      first_name TEXT NOT NULL,
      middle_name TEXT,
      surname TEXT NOT NULL,
      nationality TEXT NOT NULL DEFAULT 'Nigerian',
      hometown TEXT,
      lga_of_origin TEXT,
      state_of_origin TEXT,
      dob TEXT,
      religion TEXT,
      gender TEXT,
      phone TEXT NOT NULL,
      is_whatsapp INTEGER NOT NULL DEFAULT 0,
      email TEXT,
      house_number TEXT,
      street_name TEXT,
      city TEXT,
      residence_lga TEXT,
      residence_state TEXT,
      pvc_status TEXT,
      identity_hash TEXT NOT NULL UNIQUE,
      identity_masked TEXT NOT NULL,
      image_url TEXT NOT NULL,
      emergency_name TEXT,
      emergency_rel TEXT,
      emergency_phone TEXT,
      status TEXT NOT NULL DEFAULT 'PENDING',
      created_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_registrations_created_at
      ON registrations(created_at DESC);

    CREATE TABLE IF NOT EXISTS admin_users (
      id INTEGER PRIMARY KEY,
      name TEXT NOT NULL,
      email TEXT NOT NULL UNIQUE,
      password_hash TEXT NOT NULL,
      role TEXT NOT NULL,
      created_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS audit_log (
      id INTEGER PRIMARY KEY,
      actor_email TEXT NOT NULL,
      action TEXT NOT NULL,
      details TEXT,
      recorded_at INTEGER NOT NULL
    );
";

/// SQLite-backed implementation of every repository trait.
///
/// Connections are opened per operation inside `spawn_blocking`; WAL journal
/// mode keeps concurrent request handlers from serializing on a shared
/// connection, and the unique indexes carry the cross-request invariants.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Opens (creating if needed) the database and applies the schema.
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        let conn = open_connection(db_path)?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        conn.execute_batch(&format!("PRAGMA user_version={SCHEMA_VERSION};"))
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Self {
            db_path: db_path.to_path_buf(),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = open_connection(&path)?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("blocking task failed: {e}")))?
    }
}

fn open_connection(path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(path).map_err(|e| StoreError::Backend(e.to_string()))?;
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA synchronous=NORMAL;
         PRAGMA busy_timeout=5000;
         PRAGMA foreign_keys=ON;",
    )
    .map_err(|e| StoreError::Backend(e.to_string()))?;
    Ok(conn)
}

fn map_sqlite_err(e: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(inner, message) = &e {
        if inner.code == rusqlite::ErrorCode::ConstraintViolation {
            return StoreError::Conflict(
                message
                    .clone()
                    .unwrap_or_else(|| "unique constraint violated".to_string()),
            );
        }
    }
    StoreError::Backend(e.to_string())
}

fn citizen_from_row(row: &Row<'_>) -> rusqlite::Result<CitizenRecord> {
    Ok(CitizenRecord {
        identity_hash: row.get(0)?,
        identity_masked: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        gender: row.get(4)?,
        date_of_birth: row.get(5)?,
        state: row.get(6)?,
        lga: row.get(7)?,
        ward: row.get(8)?,
        phone: row.get(9)?,
        email: row.get(10)?,
        address: row.get(11)?,
        pvc_status: row.get(12)?,
        imported_at: row.get(13)?,
    })
}

const CITIZEN_COLUMNS: &str = "identity_hash, identity_masked, first_name, last_name, gender, \
     date_of_birth, state, lga, ward, phone, email, address, pvc_status, imported_at";

fn registration_from_row(row: &Row<'_>) -> rusqlite::Result<Registration> {
    let status_raw: String = row.get(26)?;
    let status = RegistrationStatus::parse(&status_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            26,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })?;
    Ok(Registration {
        id: row.get(0)?,
        first_name: row.get(1)?,
        middle_name: row.get(2)?,
        surname: row.get(3)?,
        nationality: row.get(4)?,
        hometown: row.get(5)?,
        lga_of_origin: row.get(6)?,
        state_of_origin: row.get(7)?,
        dob: row.get(8)?,
        religion: row.get(9)?,
        gender: row.get(10)?,
        phone: row.get(11)?,
        is_whatsapp: row.get::<_, i64>(12)? != 0,
        email: row.get(13)?,
        house_number: row.get(14)?,
        street_name: row.get(15)?,
        city: row.get(16)?,
        residence_lga: row.get(17)?,
        residence_state: row.get(18)?,
        pvc_status: row.get(19)?,
        identity_hash: row.get(20)?,
        identity_masked: row.get(21)?,
        image_url: row.get(22)?,
        emergency_name: row.get(23)?,
        emergency_rel: row.get(24)?,
        emergency_phone: row.get(25)?,
        status,
        created_at: row.get(27)?,
    })
}

const REGISTRATION_COLUMNS: &str = "id, first_name, middle_name, surname, nationality, hometown, \
     lga_of_origin, state_of_origin, dob, religion, gender, phone, is_whatsapp, email, \
     house_number, street_name, city, residence_lga, residence_state, pvc_status, identity_hash, \
     identity_masked, image_url, emergency_name, emergency_rel, emergency_phone, status, \
     created_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<AdminUser> {
    let role_raw: String = row.get(4)?;
    let role = Role::parse(&role_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(AdminUser {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role,
        created_at: row.get(5)?,
    })
}

#[async_trait]
impl CitizenRecordStore for SqliteStore {
    async fn upsert_by_hash(&self, record: &CitizenRecord) -> Result<(), StoreError> {
        let record = record.clone();
        self.with_conn(move |conn| {
            // imported_at is intentionally absent from the update clause:
            // re-imports replace every field but keep the first-seen stamp.
            conn.execute(
                "INSERT INTO citizen_records (
                   identity_hash, identity_masked, first_name, last_name, gender,
                   date_of_birth, state, lga, ward, phone, email, address,
                   pvc_status, imported_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                 ON CONFLICT(identity_hash) DO UPDATE SET
                   identity_masked = excluded.identity_masked,
                   first_name = excluded.first_name,
                   last_name = excluded.last_name,
                   gender = excluded.gender,
                   date_of_birth = excluded.date_of_birth,
                   state = excluded.state,
                   lga = excluded.lga,
                   ward = excluded.ward,
                   phone = excluded.phone,
                   email = excluded.email,
                   address = excluded.address,
                   pvc_status = excluded.pvc_status",
                params![
                    record.identity_hash,
                    record.identity_masked,
                    record.first_name,
                    record.last_name,
                    record.gender,
                    record.date_of_birth,
                    record.state,
                    record.lga,
                    record.ward,
                    record.phone,
                    record.email,
                    record.address,
                    record.pvc_status,
                    record.imported_at,
                ],
            )
            .map_err(map_sqlite_err)?;
            Ok(())
        })
        .await
    }

    async fn find_by_hash(
        &self,
        identity_hash: &str,
    ) -> Result<Option<CitizenRecord>, StoreError> {
        let identity_hash = identity_hash.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {CITIZEN_COLUMNS} FROM citizen_records WHERE identity_hash = ?1"
                ),
                params![identity_hash],
                citizen_from_row,
            )
            .optional()
            .map_err(map_sqlite_err)
        })
        .await
    }

    async fn find(
        &self,
        filter: &CitizenFilter,
        page: Page,
    ) -> Result<Vec<CitizenRecord>, StoreError> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare_cached(&format!(
                    "SELECT {CITIZEN_COLUMNS} FROM citizen_records
                     WHERE (?1 IS NULL OR pvc_status = ?1)
                       AND (?2 IS NULL OR state = ?2)
                     ORDER BY imported_at DESC, rowid DESC
                     LIMIT ?3 OFFSET ?4"
                ))
                .map_err(map_sqlite_err)?;
            let rows = stmt
                .query_map(
                    params![
                        filter.pvc_status,
                        filter.state,
                        i64::from(page.limit),
                        page.offset() as i64,
                    ],
                    citizen_from_row,
                )
                .map_err(map_sqlite_err)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(map_sqlite_err)
        })
        .await
    }

    async fn count(&self, filter: &CitizenFilter) -> Result<u64, StoreError> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let total: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM citizen_records
                     WHERE (?1 IS NULL OR pvc_status = ?1)
                       AND (?2 IS NULL OR state = ?2)",
                    params![filter.pvc_status, filter.state],
                    |row| row.get(0),
                )
                .map_err(map_sqlite_err)?;
            Ok(total as u64)
        })
        .await
    }
}

#[async_trait]
impl RegistrationStore for SqliteStore {
    async fn insert(&self, registration: &NewRegistration) -> Result<i64, StoreError> {
        let reg = registration.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO registrations (
                   first_name, middle_name, surname, nationality, hometown,
                   lga_of_origin, state_of_origin, dob, religion, gender,
                   phone, is_whatsapp, email, house_number, street_name,
                   city, residence_lga, residence_state, pvc_status,
                   identity_hash, identity_masked, image_url,
                   emergency_name, emergency_rel, emergency_phone,
                   status, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                           ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24,
                           ?25, ?26, ?27)",
                params![
                    reg.first_name,
                    reg.middle_name,
                    reg.surname,
                    reg.nationality,
                    reg.hometown,
                    reg.lga_of_origin,
                    reg.state_of_origin,
                    reg.dob,
                    reg.religion,
                    reg.gender,
                    reg.phone,
                    reg.is_whatsapp as i64,
                    reg.email,
                    reg.house_number,
                    reg.street_name,
                    reg.city,
                    reg.residence_lga,
                    reg.residence_state,
                    reg.pvc_status,
                    reg.identity_hash,
                    reg.identity_masked,
                    reg.image_url,
                    reg.emergency_name,
                    reg.emergency_rel,
                    reg.emergency_phone,
                    reg.status.as_str(),
                    reg.created_at,
                ],
            )
            .map_err(map_sqlite_err)?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn find_by_hash(
        &self,
        identity_hash: &str,
    ) -> Result<Option<Registration>, StoreError> {
        let identity_hash = identity_hash.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE identity_hash = ?1"
                ),
                params![identity_hash],
                registration_from_row,
            )
            .optional()
            .map_err(map_sqlite_err)
        })
        .await
    }

    async fn find(&self, page: Page) -> Result<Vec<Registration>, StoreError> {
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare_cached(&format!(
                    "SELECT {REGISTRATION_COLUMNS} FROM registrations
                     ORDER BY created_at DESC, id DESC
                     LIMIT ?1 OFFSET ?2"
                ))
                .map_err(map_sqlite_err)?;
            let rows = stmt
                .query_map(
                    params![i64::from(page.limit), page.offset() as i64],
                    registration_from_row,
                )
                .map_err(map_sqlite_err)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(map_sqlite_err)
        })
        .await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.with_conn(|conn| {
            let total: i64 = conn
                .query_row("SELECT COUNT(*) FROM registrations", [], |row| row.get(0))
                .map_err(map_sqlite_err)?;
            Ok(total as u64)
        })
        .await
    }

    async fn count_with_pvc(&self, pvc_status: &str) -> Result<u64, StoreError> {
        let pvc_status = pvc_status.to_string();
        self.with_conn(move |conn| {
            let total: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM registrations WHERE pvc_status = ?1",
                    params![pvc_status],
                    |row| row.get(0),
                )
                .map_err(map_sqlite_err)?;
            Ok(total as u64)
        })
        .await
    }

    async fn count_created_since(&self, since_millis: i64) -> Result<u64, StoreError> {
        self.with_conn(move |conn| {
            let total: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM registrations WHERE created_at >= ?1",
                    params![since_millis],
                    |row| row.get(0),
                )
                .map_err(map_sqlite_err)?;
            Ok(total as u64)
        })
        .await
    }
}

#[async_trait]
impl AdminUserStore for SqliteStore {
    async fn insert(&self, user: &NewAdminUser) -> Result<i64, StoreError> {
        let user = user.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO admin_users (name, email, password_hash, role, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.name,
                    user.email,
                    user.password_hash,
                    user.role.as_str(),
                    user.created_at,
                ],
            )
            .map_err(map_sqlite_err)?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>, StoreError> {
        let email = email.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT id, name, email, password_hash, role, created_at
                 FROM admin_users WHERE email = ?1",
                params![email],
                user_from_row,
            )
            .optional()
            .map_err(map_sqlite_err)
        })
        .await
    }
}

#[async_trait]
impl AuditLogStore for SqliteStore {
    async fn append(&self, entry: &NewAuditLogEntry) -> Result<(), StoreError> {
        let entry = entry.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO audit_log (actor_email, action, details, recorded_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![entry.actor_email, entry.action, entry.details, entry.recorded_at],
            )
            .map_err(map_sqlite_err)?;
            Ok(())
        })
        .await
    }
}
