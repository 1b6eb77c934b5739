//! SQL schema for the CPI SQLite store.
//!
//! Executed at connection startup. There are no migrations; `reset` drops
//! the table and runs this again.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- No uniqueness constraint: identical observations are legal.
CREATE TABLE IF NOT EXISTS observations (
    date      TEXT NOT NULL,   -- YYYY-MM-DD
    item      TEXT NOT NULL,
    price     REAL NOT NULL,   -- rounded to 4 fractional digits before binding
    category  TEXT NOT NULL,
    state     TEXT NOT NULL,
    city      TEXT NOT NULL,
    -- Same fixed-width nanosecond form the store writes; SQLite only
    -- knows milliseconds, so the remaining digits are zero.
    added_on  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%f', 'now') || '000000Z')
);

CREATE INDEX IF NOT EXISTS observations_place_idx ON observations(state, city);
CREATE INDEX IF NOT EXISTS observations_added_idx ON observations(added_on);

PRAGMA user_version = 1;
";

pub const DROP: &str = "DROP TABLE IF EXISTS observations;";
