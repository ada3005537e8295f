//! SQL schema for one snapshot.
//!
//! Executed at every connection startup; idempotent thanks to
//! `CREATE TABLE IF NOT EXISTS`. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL.
///
/// `REFERENCES` clauses document the graph; enforcement is switched off for
/// the connection because ingestion writes the relation rows of an abstract
/// before the abstract row itself.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = OFF;

CREATE TABLE IF NOT EXISTS abstract (
    abstract_id INTEGER PRIMARY KEY,   -- first available id, not autoincrement
    year        INTEGER NOT NULL,
    title       TEXT    NOT NULL,
    content     TEXT    NOT NULL,
    doctype     TEXT    NOT NULL,
    institution TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS competency (
    competency_id   INTEGER PRIMARY KEY,
    competency_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS author (
    author_id  INTEGER PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name  TEXT NOT NULL
);

-- Seeded once with the fixed category list; never mutated afterwards.
CREATE TABLE IF NOT EXISTS category (
    category_id INTEGER PRIMARY KEY,
    name        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS derived_from (
    competency_id INTEGER NOT NULL REFERENCES competency(competency_id),
    abstract_id   INTEGER NOT NULL REFERENCES abstract(abstract_id),
    relevancy     REAL    NOT NULL,    -- -1 when the oracle could not score
    PRIMARY KEY (abstract_id, competency_id)
);

CREATE TABLE IF NOT EXISTS written_by (
    abstract_id INTEGER NOT NULL REFERENCES abstract(abstract_id),
    author_id   INTEGER NOT NULL REFERENCES author(author_id),
    PRIMARY KEY (abstract_id, author_id)
);

-- The only table updated in place (status curation).
CREATE TABLE IF NOT EXISTS has_competency (
    author_id     INTEGER NOT NULL REFERENCES author(author_id),
    competency_id INTEGER NOT NULL REFERENCES competency(competency_id),
    status        TEXT    NOT NULL
                  CHECK (status IN ('Hidden', 'Unvalidated', 'Validated')),
    PRIMARY KEY (author_id, competency_id)
);

CREATE TABLE IF NOT EXISTS has_category (
    category_id   INTEGER NOT NULL REFERENCES category(category_id),
    competency_id INTEGER NOT NULL REFERENCES competency(competency_id),
    PRIMARY KEY (category_id, competency_id)
);

CREATE INDEX IF NOT EXISTS competency_name_idx      ON competency(competency_name);
CREATE INDEX IF NOT EXISTS author_name_idx          ON author(first_name, last_name);
CREATE INDEX IF NOT EXISTS derived_from_comp_idx    ON derived_from(competency_id);
CREATE INDEX IF NOT EXISTS written_by_author_idx    ON written_by(author_id);
CREATE INDEX IF NOT EXISTS has_category_comp_idx    ON has_category(competency_id);
CREATE INDEX IF NOT EXISTS has_competency_comp_idx  ON has_competency(competency_id);

PRAGMA user_version = 1;
";
