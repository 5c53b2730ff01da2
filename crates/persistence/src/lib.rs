// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for care home shift logs and rotas.
//!
//! This crate stores the directory (care homes, staff, service users), shift
//! logs with their entries and documents, missed shift records, and rotas
//! with their shifts and audit trails. It is built on Diesel with `SQLite`.
//!
//! ## Transactions
//!
//! Every write goes through the `Persistence` adapter, which runs it in a
//! `BEGIN IMMEDIATE` transaction. The write lock is taken up front, so a
//! lock of a shift log waits for any entry write in flight on another
//! connection, and rota transitions queue behind each other.
//!
//! Engine rules (what may be written, what a transition produces) live in
//! the `carehome` crate; this crate applies their results atomically.
//!
//! ## Testing
//!
//! - Tests run against a fresh shared-cache in-memory database per adapter
//! - Concurrency tests use a temporary file database with one connection
//!   per thread

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use carehome::{
    DocumentRenderer, LogEntry, MissedShift, RotaCommand, RotaHeader, RotaShift, RotaTransition,
    ShiftLog, ShiftLogKey,
};
use carehome_audit::{Actor, RotaApproval, ShiftChange};
use carehome_domain::{ShiftKind, SlotPolicy, generate_slots};
use diesel::SqliteConnection;
use time::{Date, OffsetDateTime, Time};

mod backend;
mod columns;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{
    BootstrapManager, BootstrapOutcome, CarehomeData, NewStaff, ServiceUserData, ShiftInput,
    ShiftLogDocumentData, StaffData,
};
pub use error::PersistenceError;
pub use mutations::shift_logs::SYSTEM_INITIALS;

use backend::PersistenceBackend;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter for shift logs, missed shifts and rotas.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
    slot_policy: SlotPolicy,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique shared-cache database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn,
            slot_policy: SlotPolicy::default(),
        })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn,
            slot_policy: SlotPolicy::default(),
        })
    }

    /// Replaces the slot policy used to validate and order entries.
    #[must_use]
    pub const fn with_slot_policy(mut self, slot_policy: SlotPolicy) -> Self {
        self.slot_policy = slot_policy;
        self
    }

    #[must_use]
    pub const fn slot_policy(&self) -> SlotPolicy {
        self.slot_policy
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    // ========================================================================
    // Directory
    // ========================================================================

    /// Creates a care home.
    ///
    /// Shift starts left as `None` use the defaults (08:00 and 20:00).
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or already taken.
    pub fn create_carehome(
        &mut self,
        name: &str,
        postcode: &str,
        morning_shift_start: Option<Time>,
        night_shift_start: Option<Time>,
        now: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::directory::create_carehome(
                conn,
                name,
                postcode,
                morning_shift_start,
                night_shift_start,
                now,
            )
        })
    }

    /// Registers a staff member.
    ///
    /// # Errors
    ///
    /// Returns an error if the login name is empty or taken.
    pub fn register_staff(
        &mut self,
        new_staff: &NewStaff,
        now: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        self.conn
            .immediate_transaction(|conn| {
                mutations::directory::register_staff(conn, new_staff, now)
            })
    }

    /// Registers a service user at a care home.
    ///
    /// # Errors
    ///
    /// Returns an error if the names are empty or the care home does not exist.
    pub fn register_service_user(
        &mut self,
        carehome_id: i64,
        first_name: &str,
        last_name: &str,
        now: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::directory::register_service_user(
                conn,
                carehome_id,
                first_name,
                last_name,
                now,
            )
        })
    }

    /// Makes a staff member a manager of a care home.
    ///
    /// # Errors
    ///
    /// Returns an error if the care home or staff member does not exist.
    pub fn assign_carehome_manager(
        &mut self,
        carehome_id: i64,
        staff_id: i64,
    ) -> Result<(), PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::directory::assign_carehome_manager(conn, carehome_id, staff_id)
        })
    }

    /// Seeds a care home and its manager, reusing any that already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the login belongs to a non-manager or a write
    /// fails. Nothing is written on failure.
    pub fn bootstrap_manager(
        &mut self,
        request: &BootstrapManager,
        now: OffsetDateTime,
    ) -> Result<BootstrapOutcome, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::bootstrap::bootstrap_manager(conn, request, now)
        })
    }

    /// Retrieves a staff member by login name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn find_staff_by_login(
        &mut self,
        login_name: &str,
    ) -> Result<Option<StaffData>, PersistenceError> {
        queries::directory::find_staff_by_login(&mut self.conn, login_name)
    }

    /// Retrieves a care home by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_carehome(
        &mut self,
        carehome_id: i64,
    ) -> Result<Option<CarehomeData>, PersistenceError> {
        queries::directory::get_carehome(&mut self.conn, carehome_id)
    }

    /// Retrieves a staff member by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_staff(&mut self, staff_id: i64) -> Result<Option<StaffData>, PersistenceError> {
        queries::directory::get_staff(&mut self.conn, staff_id)
    }

    /// Retrieves a service user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_service_user(
        &mut self,
        service_user_id: i64,
    ) -> Result<Option<ServiceUserData>, PersistenceError> {
        queries::directory::get_service_user(&mut self.conn, service_user_id)
    }

    /// Lists the service users of a care home.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_service_users(
        &mut self,
        carehome_id: i64,
    ) -> Result<Vec<ServiceUserData>, PersistenceError> {
        queries::directory::list_service_users(&mut self.conn, carehome_id)
    }

    /// Lists the staff IDs of a care home's managers.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_carehome_managers(
        &mut self,
        carehome_id: i64,
    ) -> Result<Vec<i64>, PersistenceError> {
        queries::directory::list_carehome_managers(&mut self.conn, carehome_id)
    }

    /// Returns when a shift starts at a care home.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the care home does not exist.
    pub fn shift_start(
        &mut self,
        carehome_id: i64,
        kind: ShiftKind,
    ) -> Result<Time, PersistenceError> {
        queries::directory::shift_start(&mut self.conn, carehome_id, kind)
    }

    /// Returns every slot of a shift at a care home, in shift order.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the care home does not exist.
    pub fn shift_slots(
        &mut self,
        carehome_id: i64,
        kind: ShiftKind,
    ) -> Result<Vec<Time>, PersistenceError> {
        let start: Time = self.shift_start(carehome_id, kind)?;
        Ok(generate_slots(start, self.slot_policy))
    }

    // ========================================================================
    // Shift Logs
    // ========================================================================

    /// Creates the shift log for `key`.
    ///
    /// # Errors
    ///
    /// Returns `Rejected(DuplicateAggregate)` if one already exists.
    pub fn create_shift_log(
        &mut self,
        key: &ShiftLogKey,
        now: OffsetDateTime,
    ) -> Result<ShiftLog, PersistenceError> {
        self.conn
            .immediate_transaction(|conn| mutations::shift_logs::create_shift_log(conn, key, now))
    }

    /// Returns the shift log for `key`, creating it if needed.
    ///
    /// # Returns
    ///
    /// The shift log and whether this call created it.
    ///
    /// # Errors
    ///
    /// Returns an error if the staff member, care home or service user does
    /// not exist.
    pub fn get_or_create_shift_log(
        &mut self,
        key: &ShiftLogKey,
        now: OffsetDateTime,
    ) -> Result<(ShiftLog, bool), PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::shift_logs::get_or_create_shift_log(conn, key, now)
        })
    }

    /// Retrieves a shift log by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_shift_log(
        &mut self,
        shift_log_id: i64,
    ) -> Result<Option<ShiftLog>, PersistenceError> {
        queries::shift_logs::get_shift_log(&mut self.conn, shift_log_id)
    }

    /// Finds the shift log with the given key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn find_shift_log(
        &mut self,
        key: &ShiftLogKey,
    ) -> Result<Option<ShiftLog>, PersistenceError> {
        queries::shift_logs::find_shift_log(&mut self.conn, key)
    }

    /// Returns the entry for one slot of `key`, creating an empty one if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot is not part of the shift, or the entry is
    /// new and the shift log is locked.
    pub fn get_or_create_entry(
        &mut self,
        key: &ShiftLogKey,
        slot: Time,
        now: OffsetDateTime,
    ) -> Result<LogEntry, PersistenceError> {
        let policy: SlotPolicy = self.slot_policy;
        self.conn.immediate_transaction(|conn| {
            let start: Time = queries::directory::shift_start(conn, key.carehome_id, key.shift)?;
            mutations::shift_logs::get_or_create_entry(conn, key, slot, start, policy, now)
        })
    }

    /// Writes the content of one slot of a shift log.
    ///
    /// # Errors
    ///
    /// Returns an error if the shift log does not exist or is locked, the slot
    /// is not part of the shift, or the content is empty.
    pub fn touch_entry(
        &mut self,
        shift_log_id: i64,
        slot: Time,
        content: &str,
        now: OffsetDateTime,
    ) -> Result<LogEntry, PersistenceError> {
        let policy: SlotPolicy = self.slot_policy;
        self.conn.immediate_transaction(|conn| {
            let start: Time = log_shift_start(conn, shift_log_id)?;
            mutations::shift_logs::touch_entry(
                conn,
                shift_log_id,
                slot,
                content,
                start,
                policy,
                now,
            )
        })
    }

    /// Lists a shift log's entries in shift order.
    ///
    /// # Errors
    ///
    /// Returns an error if the shift log does not exist.
    pub fn list_log_entries(
        &mut self,
        shift_log_id: i64,
    ) -> Result<Vec<LogEntry>, PersistenceError> {
        let start: Time = log_shift_start(&mut self.conn, shift_log_id)?;
        queries::shift_logs::list_log_entries(&mut self.conn, shift_log_id, start, self.slot_policy)
    }

    /// Links entries written before the shift log existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the shift log does not exist.
    pub fn relink_orphan_entries(&mut self, shift_log_id: i64) -> Result<usize, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            let log: ShiftLog = queries::shift_logs::require_shift_log(conn, shift_log_id)?;
            mutations::shift_logs::relink_orphan_entries(conn, shift_log_id, &log.key)
        })
    }

    /// Locks a shift log and stores its rendered document.
    ///
    /// Nothing is written if any step fails, including rendering.
    ///
    /// # Errors
    ///
    /// Returns an error if the shift log does not exist, is already locked,
    /// has no entries, or cannot be rendered.
    pub fn lock_shift_log(
        &mut self,
        shift_log_id: i64,
        renderer: &dyn DocumentRenderer,
        now: OffsetDateTime,
    ) -> Result<(ShiftLog, ShiftLogDocumentData), PersistenceError> {
        let policy: SlotPolicy = self.slot_policy;
        self.conn.immediate_transaction(|conn| {
            let start: Time = log_shift_start(conn, shift_log_id)?;
            mutations::shift_logs::lock_shift_log(conn, shift_log_id, renderer, start, policy, now)
        })
    }

    /// Reopens a locked shift log.
    ///
    /// # Errors
    ///
    /// Returns an error if the shift log does not exist or is not locked.
    pub fn reopen_shift_log(
        &mut self,
        shift_log_id: i64,
        now: OffsetDateTime,
    ) -> Result<ShiftLog, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::shift_logs::reopen_shift_log(conn, shift_log_id, now)
        })
    }

    /// Retrieves the document produced when a shift log was last locked.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_shift_log_document(
        &mut self,
        shift_log_id: i64,
    ) -> Result<Option<ShiftLogDocumentData>, PersistenceError> {
        queries::shift_logs::get_shift_log_document(&mut self.conn, shift_log_id)
    }

    /// Derives the staff initials printed on a shift log's document.
    ///
    /// # Errors
    ///
    /// Returns an error if the shift log or its staff member does not exist.
    pub fn staff_initials(&mut self, shift_log_id: i64) -> Result<String, PersistenceError> {
        let log: ShiftLog = queries::shift_logs::require_shift_log(&mut self.conn, shift_log_id)?;
        mutations::shift_logs::staff_initials_for(&mut self.conn, &log)
    }

    // ========================================================================
    // Missed Shifts
    // ========================================================================

    /// Records the shifts of `date` that have no shift log.
    ///
    /// # Returns
    ///
    /// The care home's unresolved missed shifts for `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the care home does not exist.
    pub fn scan_missed_shifts(
        &mut self,
        carehome_id: i64,
        date: Date,
        now: OffsetDateTime,
    ) -> Result<Vec<MissedShift>, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::missed_shifts::scan_missed_shifts(conn, carehome_id, date, now)
        })
    }

    /// Resolves a service user's missed shifts for a date.
    ///
    /// # Returns
    ///
    /// The number of records resolved.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn resolve_missed_shifts(
        &mut self,
        carehome_id: i64,
        service_user_id: i64,
        date: Date,
        now: OffsetDateTime,
    ) -> Result<usize, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::missed_shifts::resolve_missed_shifts(
                conn,
                carehome_id,
                service_user_id,
                date,
                now,
            )
        })
    }

    /// Lists a care home's unresolved missed shifts, optionally for one date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_unresolved_missed_shifts(
        &mut self,
        carehome_id: i64,
        date: Option<Date>,
    ) -> Result<Vec<MissedShift>, PersistenceError> {
        queries::missed_shifts::list_unresolved_missed_shifts(&mut self.conn, carehome_id, date)
    }

    /// Flags missed shift records as notified.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn mark_missed_shifts_notified(
        &mut self,
        missed_shift_ids: &[i64],
    ) -> Result<usize, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::missed_shifts::mark_missed_shifts_notified(conn, missed_shift_ids)
        })
    }

    // ========================================================================
    // Rotas
    // ========================================================================

    /// Creates a draft rota with the next version for its period.
    ///
    /// # Errors
    ///
    /// Returns an error if the period is invalid or the care home does not
    /// exist.
    pub fn create_rota(
        &mut self,
        carehome_id: i64,
        period_start: Date,
        period_end: Date,
        created_by: Option<i64>,
        now: OffsetDateTime,
    ) -> Result<RotaHeader, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::rotas::create_rota(
                conn,
                carehome_id,
                period_start,
                period_end,
                created_by,
                now,
            )
        })
    }

    /// Drafts a new version of a published rota, copying its shifts.
    ///
    /// # Errors
    ///
    /// Returns an error if the rota does not exist or is not published.
    pub fn revise_rota(
        &mut self,
        rota_id: i64,
        revised_by: Option<i64>,
        now: OffsetDateTime,
    ) -> Result<RotaHeader, PersistenceError> {
        self.conn
            .immediate_transaction(|conn| {
                mutations::rotas::revise_rota(conn, rota_id, revised_by, now)
            })
    }

    /// Creates or updates a shift and records the change.
    ///
    /// # Errors
    ///
    /// Returns an error if the rota cannot be edited in its status, the shift
    /// does not belong to the rota, or the shift duplicates another.
    pub fn save_shift(
        &mut self,
        rota_id: i64,
        input: &ShiftInput,
        actor_id: Option<i64>,
        now: OffsetDateTime,
    ) -> Result<RotaShift, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::rotas::save_shift(conn, rota_id, input, actor_id, now)
        })
    }

    /// Deletes a shift and records the deletion.
    ///
    /// # Errors
    ///
    /// Returns an error if the rota cannot be edited in its status or the
    /// shift does not belong to the rota.
    pub fn delete_shift(
        &mut self,
        rota_id: i64,
        shift_id: i64,
        actor_id: Option<i64>,
        now: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::rotas::delete_shift(conn, rota_id, shift_id, actor_id, now)
        })
    }

    /// Applies a lifecycle command to a rota.
    ///
    /// The status change and its approval record commit together. The
    /// returned notifications have not been sent.
    ///
    /// # Errors
    ///
    /// Returns `Rejected(InvalidTransition)` if the rota's status does not
    /// permit the command; the stored rota is unchanged.
    pub fn apply_rota_command(
        &mut self,
        rota_id: i64,
        command: RotaCommand,
        actor: &Actor,
        now: OffsetDateTime,
    ) -> Result<RotaTransition, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::rotas::apply_rota_command(conn, rota_id, command, actor, now)
        })
    }

    /// Retrieves a rota by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_rota(&mut self, rota_id: i64) -> Result<Option<RotaHeader>, PersistenceError> {
        queries::rotas::get_rota(&mut self.conn, rota_id)
    }

    /// Lists a rota's shifts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_shifts(&mut self, rota_id: i64) -> Result<Vec<RotaShift>, PersistenceError> {
        queries::rotas::list_shifts(&mut self.conn, rota_id)
    }

    /// Lists a rota's approval trail, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_rota_approvals(
        &mut self,
        rota_id: i64,
    ) -> Result<Vec<RotaApproval>, PersistenceError> {
        queries::rotas::list_rota_approvals(&mut self.conn, rota_id)
    }

    /// Lists the change history of a rota's shifts, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_shift_changes(
        &mut self,
        rota_id: i64,
    ) -> Result<Vec<ShiftChange>, PersistenceError> {
        queries::rotas::list_shift_changes(&mut self.conn, rota_id)
    }
}

fn log_shift_start(
    conn: &mut SqliteConnection,
    shift_log_id: i64,
) -> Result<Time, PersistenceError> {
    let log: ShiftLog = queries::shift_logs::require_shift_log(conn, shift_log_id)?;
    queries::directory::shift_start(conn, log.key.carehome_id, log.key.shift)
}
