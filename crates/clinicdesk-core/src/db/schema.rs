//! SQLite schema definition.

/// Complete database schema for the clinic front desk.
///
/// Money columns are decimal strings with two places; day columns are ISO
/// `YYYY-MM-DD`; timestamps are RFC 3339.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Body-part catalog
-- ============================================================================

CREATE TABLE IF NOT EXISTS body_parts (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    price TEXT NOT NULL DEFAULT '0',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_body_parts_name ON body_parts(name);

-- ============================================================================
-- Patients (one row per registration event)
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    birth_year INTEGER NOT NULL,
    phone TEXT NOT NULL DEFAULT '',
    notes TEXT NOT NULL DEFAULT '',
    queue_number TEXT NOT NULL,
    queue_day TEXT NOT NULL,
    registered INTEGER NOT NULL DEFAULT 1,
    paid INTEGER NOT NULL DEFAULT 0,
    partial_paid TEXT NOT NULL DEFAULT '0',
    finished INTEGER NOT NULL DEFAULT 0,
    missed INTEGER NOT NULL DEFAULT 0,
    registered_at TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (queue_day, queue_number)
);

CREATE INDEX IF NOT EXISTS idx_patients_queue_day ON patients(queue_day);

-- Non-owning membership: deleting a body part drops it from every patient's
-- total from then on; deleting a patient drops its memberships.
CREATE TABLE IF NOT EXISTS patient_body_parts (
    patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    body_part_id TEXT NOT NULL REFERENCES body_parts(id) ON DELETE CASCADE,
    PRIMARY KEY (patient_id, body_part_id)
);

-- ============================================================================
-- Per-day queue counter
-- ============================================================================

CREATE TABLE IF NOT EXISTS queue_counters (
    day TEXT PRIMARY KEY,
    last_number INTEGER NOT NULL DEFAULT 0
);

-- ============================================================================
-- Expense ledger
-- ============================================================================

CREATE TABLE IF NOT EXISTS expenses (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    amount TEXT NOT NULL DEFAULT '0',
    note TEXT NOT NULL DEFAULT '',
    expense_day TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_expenses_day ON expenses(expense_day);
"#;
