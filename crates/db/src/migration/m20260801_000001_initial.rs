//! Initial database migration.
//!
//! Creates the ledger store: enums, reference tables (accounts,
//! journals, tiers), the fiscal calendar (exercises, periods), the
//! ledger itself (entries, entry_lines), and the per-journal-per-year
//! number sequences.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: REFERENCE DATA
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(JOURNALS_SQL).await?;
        db.execute_unprepared(TIERS_SQL).await?;

        // ============================================================
        // PART 3: FISCAL CALENDAR
        // ============================================================
        db.execute_unprepared(EXERCISES_SQL).await?;
        db.execute_unprepared(PERIODS_SQL).await?;

        // ============================================================
        // PART 4: LEDGER
        // ============================================================
        db.execute_unprepared(ENTRIES_SQL).await?;
        db.execute_unprepared(ENTRY_LINES_SQL).await?;
        db.execute_unprepared(ENTRY_SEQUENCES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE account_nature AS ENUM (
    'asset',
    'liability',
    'expense',
    'income'
);

CREATE TYPE normal_balance AS ENUM (
    'debit',
    'credit',
    'variable'
);

CREATE TYPE journal_kind AS ENUM (
    'purchases',
    'sales',
    'bank',
    'cash',
    'payroll',
    'tax',
    'social',
    'inventory',
    'fixed_assets',
    'provisions',
    'carry_forward',
    'closing',
    'miscellaneous',
    'off_ledger'
);

CREATE TYPE tiers_kind AS ENUM (
    'supplier_local',
    'supplier_group',
    'customer_local',
    'customer_group',
    'employee'
);

CREATE TYPE exercise_status AS ENUM (
    'preparation',
    'open',
    'provisional_close',
    'closed',
    'archived'
);

CREATE TYPE period_status AS ENUM (
    'open',
    'closed',
    'locked'
);

CREATE TYPE entry_status AS ENUM (
    'draft',
    'validated',
    'closed'
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    code VARCHAR(8) NOT NULL UNIQUE CHECK (code ~ '^[0-9]{8}$'),
    class SMALLINT NOT NULL CHECK (class BETWEEN 1 AND 9),
    nature account_nature NOT NULL,
    normal_balance normal_balance NOT NULL DEFAULT 'debit',
    label VARCHAR(255) NOT NULL,
    reference VARCHAR(5),
    note TEXT,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (class = CAST(SUBSTRING(code FROM 1 FOR 1) AS SMALLINT))
);

CREATE INDEX idx_accounts_class ON accounts(class);
";

const JOURNALS_SQL: &str = r"
CREATE TABLE journals (
    id UUID PRIMARY KEY,
    code VARCHAR(10) NOT NULL UNIQUE CHECK (code ~ '^[A-Z0-9]{1,10}$'),
    label VARCHAR(100) NOT NULL,
    kind journal_kind NOT NULL,
    counter_account_id UUID REFERENCES accounts(id),
    active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const TIERS_SQL: &str = r"
CREATE TABLE tiers (
    id UUID PRIMARY KEY,
    code VARCHAR(9) NOT NULL UNIQUE
        CHECK (code ~ '^(FLOC|FGRP|CLOC|CGRP|EMPL)[0-9]{5}$'),
    kind tiers_kind NOT NULL,
    collective_account_id UUID NOT NULL REFERENCES accounts(id),
    payment_delay_days INTEGER CHECK (payment_delay_days >= 0),
    credit_ceiling NUMERIC(15, 2) CHECK (credit_ceiling >= 0),
    matricule VARCHAR(20) UNIQUE,
    name VARCHAR(200) NOT NULL,
    short_name VARCHAR(50),
    taxpayer_number VARCHAR(50) UNIQUE,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    blocked BOOLEAN NOT NULL DEFAULT FALSE,
    blocked_reason TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_tiers_kind ON tiers(kind);
";

const EXERCISES_SQL: &str = r"
CREATE TABLE exercises (
    id UUID PRIMARY KEY,
    code VARCHAR(10) NOT NULL UNIQUE,
    label VARCHAR(100) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    status exercise_status NOT NULL DEFAULT 'preparation',
    provisional_close_date DATE,
    definitive_close_date DATE,
    carry_forward_generated BOOLEAN NOT NULL DEFAULT FALSE,
    carry_forward_at TIMESTAMPTZ,
    first_exercise BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (end_date > start_date),
    CHECK (end_date - start_date <= 548)
);
";

const PERIODS_SQL: &str = r"
CREATE TABLE periods (
    id UUID PRIMARY KEY,
    exercise_id UUID NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
    number SMALLINT NOT NULL CHECK (number BETWEEN 1 AND 12),
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    status period_status NOT NULL DEFAULT 'open',
    closed_at TIMESTAMPTZ,
    closed_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (exercise_id, number),
    CHECK (end_date >= start_date)
);

CREATE INDEX idx_periods_dates ON periods(start_date, end_date);
";

const ENTRIES_SQL: &str = r"
CREATE TABLE entries (
    id UUID PRIMARY KEY,
    number VARCHAR(20) NOT NULL UNIQUE,
    journal_id UUID NOT NULL REFERENCES journals(id),
    exercise_id UUID NOT NULL REFERENCES exercises(id),
    period_id UUID NOT NULL REFERENCES periods(id),
    entry_date DATE NOT NULL,
    piece_date DATE,
    label VARCHAR(200) NOT NULL,
    reference VARCHAR(50),
    status entry_status NOT NULL DEFAULT 'draft',
    balanced BOOLEAN NOT NULL DEFAULT FALSE,
    total_amount NUMERIC(15, 2) NOT NULL DEFAULT 0,
    validated_at TIMESTAMPTZ,
    validated_by UUID,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_entries_journal_date ON entries(journal_id, entry_date);
CREATE INDEX idx_entries_exercise_period ON entries(exercise_id, period_id);
CREATE INDEX idx_entries_status ON entries(status);
";

const ENTRY_LINES_SQL: &str = r"
CREATE TABLE entry_lines (
    id UUID PRIMARY KEY,
    entry_id UUID NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
    line_number SMALLINT NOT NULL CHECK (line_number > 0),
    account_id UUID NOT NULL REFERENCES accounts(id),
    tiers_id UUID REFERENCES tiers(id),
    piece VARCHAR(50),
    label VARCHAR(200) NOT NULL,
    debit NUMERIC(15, 2) NOT NULL DEFAULT 0 CHECK (debit >= 0),
    credit NUMERIC(15, 2) NOT NULL DEFAULT 0 CHECK (credit >= 0),
    due_date DATE,
    reconciliation_code VARCHAR(10),
    reconciled BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (entry_id, line_number),
    CHECK (NOT (debit > 0 AND credit > 0)),
    CHECK (debit > 0 OR credit > 0)
);

CREATE INDEX idx_entry_lines_account ON entry_lines(account_id, entry_id);
CREATE INDEX idx_entry_lines_tiers ON entry_lines(tiers_id);
CREATE INDEX idx_entry_lines_lettrage ON entry_lines(reconciliation_code);
";

const ENTRY_SEQUENCES_SQL: &str = r"
CREATE TABLE entry_sequences (
    prefix VARCHAR(12) PRIMARY KEY,
    last_value BIGINT NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS entry_sequences;
DROP TABLE IF EXISTS entry_lines;
DROP TABLE IF EXISTS entries;
DROP TABLE IF EXISTS periods;
DROP TABLE IF EXISTS exercises;
DROP TABLE IF EXISTS tiers;
DROP TABLE IF EXISTS journals;
DROP TABLE IF EXISTS accounts;
DROP TYPE IF EXISTS entry_status;
DROP TYPE IF EXISTS period_status;
DROP TYPE IF EXISTS exercise_status;
DROP TYPE IF EXISTS tiers_kind;
DROP TYPE IF EXISTS journal_kind;
DROP TYPE IF EXISTS normal_balance;
DROP TYPE IF EXISTS account_nature;
";
