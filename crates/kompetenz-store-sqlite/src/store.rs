//! SQLite-backed [`CompetencyStore`]. One file per snapshot.

use std::path::Path;

use kompetenz_core::{
  category,
  model::{
    AbstractCompetency, AbstractRecord, Author, AuthorAbstract,
    AuthorCompetency, AuthorWithCompetency, Category, Competency,
    CompetencyEvidence, Relevancy, Status, StoreStats,
  },
  store::CompetencyStore,
};
use rusqlite::OptionalExtension as _;

use crate::{
  Result,
  encode::{
    RawAuthorCompetency, RawAuthorWithCompetency, RawCompetencyEvidence,
    decode_relevancy, encode_relevancy, encode_status, tolerate_constraint,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// One snapshot of the competency graph backed by a single SQLite file.
/// Clones share the underlying connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a snapshot at `path`, run schema initialisation and
  /// seed the category list.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// In-memory snapshot. Serves as the empty placeholder when no snapshot is
  /// active.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let categories: Vec<Category> = category::seed().collect();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(SCHEMA)?;
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO category (category_id, name) VALUES (?1, ?2)",
          )?;
          for c in &categories {
            stmt.execute(rusqlite::params![c.category_id, c.name])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a relation insert, tolerating constraint violations.
  async fn insert_edge(
    &self,
    sql: &'static str,
    a: i64,
    b: i64,
    payload: Option<rusqlite::types::Value>,
  ) -> Result<bool> {
    let inserted = self
      .conn
      .call(move |conn| {
        let result = match payload {
          Some(p) => conn.execute(sql, rusqlite::params![a, b, p]),
          None => conn.execute(sql, rusqlite::params![a, b]),
        };
        Ok(tolerate_constraint(result)?)
      })
      .await?;
    Ok(inserted)
  }

  async fn count(&self, table: &'static str) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| {
          r.get(0)
        })?)
      })
      .await?;
    Ok(n.max(0) as u64)
  }
}

// ─── CompetencyStore impl ────────────────────────────────────────────────────

impl CompetencyStore for SqliteStore {
  type Error = crate::Error;

  // ── Upserts ───────────────────────────────────────────────────────────────

  async fn upsert_author(&self, first_name: &str, last_name: &str) -> Result<i64> {
    let first = first_name.to_owned();
    let last = last_name.to_owned();

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let existing: Option<i64> = tx
          .query_row(
            "SELECT author_id FROM author
             WHERE first_name = ?1 AND last_name = ?2
             ORDER BY author_id LIMIT 1",
            rusqlite::params![first, last],
            |r| r.get(0),
          )
          .optional()?;
        let id = match existing {
          Some(id) => id,
          None => {
            tx.execute(
              "INSERT INTO author (first_name, last_name) VALUES (?1, ?2)",
              rusqlite::params![first, last],
            )?;
            tx.last_insert_rowid()
          }
        };
        tx.commit()?;
        Ok(id)
      })
      .await?;
    Ok(id)
  }

  async fn upsert_competency(&self, name: &str) -> Result<i64> {
    let name = name.to_owned();

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let existing: Option<i64> = tx
          .query_row(
            "SELECT competency_id FROM competency
             WHERE competency_name = ?1
             ORDER BY competency_id LIMIT 1",
            rusqlite::params![name],
            |r| r.get(0),
          )
          .optional()?;
        let id = match existing {
          Some(id) => id,
          None => {
            tx.execute(
              "INSERT INTO competency (competency_name) VALUES (?1)",
              rusqlite::params![name],
            )?;
            tx.last_insert_rowid()
          }
        };
        tx.commit()?;
        Ok(id)
      })
      .await?;
    Ok(id)
  }

  async fn first_available_abstract_id(&self) -> Result<i64> {
    let id = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT CASE
             WHEN NOT EXISTS (SELECT 1 FROM abstract WHERE abstract_id = 0) THEN 0
             ELSE (
               SELECT MIN(a.abstract_id + 1) FROM abstract a
               WHERE a.abstract_id >= 0
                 AND NOT EXISTS (
                   SELECT 1 FROM abstract b WHERE b.abstract_id = a.abstract_id + 1
                 )
             )
           END",
          [],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(id)
  }

  // ── Append-only inserts ───────────────────────────────────────────────────

  async fn insert_abstract(&self, record: AbstractRecord) -> Result<bool> {
    let abstract_id = record.abstract_id;

    let inserted = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO abstract (abstract_id, year, title, content, doctype, institution)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            record.abstract_id,
            record.year,
            record.title,
            record.content,
            record.doctype,
            record.institution,
          ],
        );
        Ok(tolerate_constraint(result)?)
      })
      .await?;

    if !inserted {
      tracing::warn!(abstract_id, "abstract id already taken; row not written");
    }
    Ok(inserted)
  }

  async fn insert_written_by(&self, abstract_id: i64, author_id: i64) -> Result<bool> {
    let inserted = self
      .insert_edge(
        "INSERT INTO written_by (abstract_id, author_id) VALUES (?1, ?2)",
        abstract_id,
        author_id,
        None,
      )
      .await?;
    if !inserted {
      tracing::warn!(abstract_id, author_id, "duplicate written_by edge ignored");
    }
    Ok(inserted)
  }

  async fn insert_derived_from(
    &self,
    competency_id: i64,
    abstract_id: i64,
    relevancy: Relevancy,
  ) -> Result<bool> {
    let inserted = self
      .insert_edge(
        "INSERT INTO derived_from (competency_id, abstract_id, relevancy)
         VALUES (?1, ?2, ?3)",
        competency_id,
        abstract_id,
        Some(encode_relevancy(relevancy).into()),
      )
      .await?;
    if !inserted {
      tracing::warn!(competency_id, abstract_id, "duplicate derived_from edge ignored");
    }
    Ok(inserted)
  }

  async fn insert_has_category(&self, category_id: i64, competency_id: i64) -> Result<bool> {
    let category_id = category::validate_id(category_id)?;
    let inserted = self
      .insert_edge(
        "INSERT INTO has_category (category_id, competency_id) VALUES (?1, ?2)",
        category_id,
        competency_id,
        None,
      )
      .await?;
    if !inserted {
      tracing::debug!(category_id, competency_id, "has_category edge already present");
    }
    Ok(inserted)
  }

  async fn insert_has_competency(
    &self,
    author_id: i64,
    competency_id: i64,
    status: Status,
  ) -> Result<bool> {
    self
      .insert_edge(
        "INSERT OR IGNORE INTO has_competency (author_id, competency_id, status)
         VALUES (?1, ?2, ?3)",
        author_id,
        competency_id,
        Some(encode_status(status).to_owned().into()),
      )
      .await
  }

  // ── Update ────────────────────────────────────────────────────────────────

  async fn change_competency_status(
    &self,
    author_id: i64,
    competency_id: i64,
    status: Status,
  ) -> Result<bool> {
    let status_str = encode_status(status);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE has_competency SET status = ?1
           WHERE author_id = ?2 AND competency_id = ?3",
          rusqlite::params![status_str, author_id, competency_id],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn abstract_by_id(&self, abstract_id: i64) -> Result<Option<AbstractRecord>> {
    let record = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT abstract_id, year, title, content, doctype, institution
               FROM abstract WHERE abstract_id = ?1",
              rusqlite::params![abstract_id],
              |row| {
                Ok(AbstractRecord {
                  abstract_id: row.get(0)?,
                  year:        row.get(1)?,
                  title:       row.get(2)?,
                  content:     row.get(3)?,
                  doctype:     row.get(4)?,
                  institution: row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(record)
  }

  async fn authors_by_abstract(&self, abstract_id: i64) -> Result<Vec<Author>> {
    let authors = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT au.author_id, au.first_name, au.last_name
           FROM written_by wb
           JOIN author au ON au.author_id = wb.author_id
           WHERE wb.abstract_id = ?1
           ORDER BY wb.rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![abstract_id], |row| {
            Ok(Author {
              author_id:  row.get(0)?,
              first_name: row.get(1)?,
              last_name:  row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(authors)
  }

  async fn competencies_by_abstract(&self, abstract_id: i64) -> Result<Vec<AbstractCompetency>> {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT df.competency_id, c.competency_name, df.relevancy
           FROM derived_from df
           JOIN competency c ON c.competency_id = df.competency_id
           WHERE df.abstract_id = ?1
           ORDER BY df.rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![abstract_id], |row| {
            Ok(AbstractCompetency {
              competency_id:   row.get(0)?,
              competency_name: row.get(1)?,
              relevancy:       decode_relevancy(row.get(2)?),
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn competencies_by_author(&self, author_id: i64) -> Result<Vec<AuthorCompetency>> {
    let raws: Vec<RawAuthorCompetency> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT hc.competency_id, c.competency_name, hc.status
           FROM has_competency hc
           JOIN competency c ON c.competency_id = hc.competency_id
           WHERE hc.author_id = ?1
           ORDER BY hc.rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![author_id], |row| {
            Ok(RawAuthorCompetency {
              competency_id:   row.get(0)?,
              competency_name: row.get(1)?,
              status:          row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAuthorCompetency::decode).collect()
  }

  async fn competencies_by_category(&self, category_id: i64) -> Result<Vec<Competency>> {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT c.competency_id, c.competency_name
           FROM has_category hc
           JOIN competency c ON c.competency_id = hc.competency_id
           WHERE hc.category_id = ?1
           ORDER BY hc.rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![category_id], |row| {
            Ok(Competency {
              competency_id:   row.get(0)?,
              competency_name: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn authors_by_competency(&self, competency_id: i64) -> Result<Vec<CompetencyEvidence>> {
    let raws: Vec<RawCompetencyEvidence> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT au.author_id, au.first_name, au.last_name,
                  df.abstract_id, df.relevancy, hc.status
           FROM has_competency hc
           JOIN author au       ON au.author_id = hc.author_id
           JOIN derived_from df ON df.competency_id = hc.competency_id
           JOIN written_by wb   ON wb.author_id = hc.author_id
                               AND wb.abstract_id = df.abstract_id
           WHERE hc.competency_id = ?1
           ORDER BY hc.rowid, df.rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![competency_id], |row| {
            Ok(RawCompetencyEvidence {
              author_id:   row.get(0)?,
              first_name:  row.get(1)?,
              last_name:   row.get(2)?,
              abstract_id: row.get(3)?,
              relevancy:   row.get(4)?,
              status:      row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCompetencyEvidence::decode).collect()
  }

  async fn authors_with_competency(
    &self,
    competency_name: &str,
  ) -> Result<Vec<AuthorWithCompetency>> {
    let name = competency_name.to_owned();

    let raws: Vec<RawAuthorWithCompetency> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT au.author_id, au.first_name, au.last_name,
                  df.relevancy, hc.status
           FROM competency c
           JOIN has_competency hc ON hc.competency_id = c.competency_id
           JOIN author au         ON au.author_id = hc.author_id
           JOIN derived_from df   ON df.competency_id = c.competency_id
           JOIN written_by wb     ON wb.author_id = hc.author_id
                                 AND wb.abstract_id = df.abstract_id
           WHERE c.competency_name = ?1
           ORDER BY hc.rowid, df.rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![name], |row| {
            Ok(RawAuthorWithCompetency {
              author_id:  row.get(0)?,
              first_name: row.get(1)?,
              last_name:  row.get(2)?,
              relevancy:  row.get(3)?,
              status:     row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAuthorWithCompetency::decode).collect()
  }

  async fn abstracts_by_author_name(
    &self,
    first_name: &str,
    last_name: &str,
  ) -> Result<Vec<AuthorAbstract>> {
    let first = first_name.to_owned();
    let last = last_name.to_owned();

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT ab.abstract_id, ab.year, ab.title, ab.content, ab.institution
           FROM abstract ab
           JOIN written_by wb ON wb.abstract_id = ab.abstract_id
           JOIN author au     ON au.author_id = wb.author_id
           WHERE au.first_name = ?1 AND au.last_name = ?2
           ORDER BY wb.rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![first, last], |row| {
            Ok(AuthorAbstract {
              abstract_id: row.get(0)?,
              year:        row.get(1)?,
              title:       row.get(2)?,
              content:     row.get(3)?,
              institution: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn abstracts_with_competency(&self, competency_id: i64, author_id: i64) -> Result<Vec<i64>> {
    let ids = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT wb.abstract_id
           FROM derived_from df
           JOIN written_by wb ON wb.abstract_id = df.abstract_id
           WHERE df.competency_id = ?1 AND wb.author_id = ?2
           ORDER BY df.rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![competency_id, author_id], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(ids)
  }

  async fn relevancies(&self, competency_id: i64, author_id: i64) -> Result<Vec<Relevancy>> {
    let values: Vec<f64> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT df.relevancy
           FROM derived_from df
           JOIN written_by wb ON wb.abstract_id = df.abstract_id
           WHERE df.competency_id = ?1 AND wb.author_id = ?2
           ORDER BY df.rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![competency_id, author_id], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<f64>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(values.into_iter().map(decode_relevancy).collect())
  }

  async fn all_categories(&self) -> Result<Vec<Category>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT category_id, name FROM category ORDER BY category_id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Category {
              category_id: row.get(0)?,
              name:        row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn all_competencies(&self) -> Result<Vec<Competency>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT competency_id, competency_name FROM competency ORDER BY competency_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Competency {
              competency_id:   row.get(0)?,
              competency_name: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn all_authors(&self) -> Result<Vec<Author>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT author_id, first_name, last_name FROM author ORDER BY author_id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Author {
              author_id:  row.get(0)?,
              first_name: row.get(1)?,
              last_name:  row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn category_name(&self, category_id: i64) -> Result<Option<String>> {
    let name = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT name FROM category WHERE category_id = ?1",
              rusqlite::params![category_id],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(name)
  }

  async fn competency_name(&self, competency_id: i64) -> Result<Option<String>> {
    let name = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT competency_name FROM competency WHERE competency_id = ?1",
              rusqlite::params![competency_id],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(name)
  }

  async fn competency_id_by_name(&self, name: &str) -> Result<Option<i64>> {
    let name = name.to_owned();
    let id = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT competency_id FROM competency
               WHERE competency_name = ?1
               ORDER BY competency_id LIMIT 1",
              rusqlite::params![name],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(id)
  }

  async fn author_by_id(&self, author_id: i64) -> Result<Option<Author>> {
    let author = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT author_id, first_name, last_name FROM author WHERE author_id = ?1",
              rusqlite::params![author_id],
              |row| {
                Ok(Author {
                  author_id:  row.get(0)?,
                  first_name: row.get(1)?,
                  last_name:  row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(author)
  }

  async fn author_id_by_full_name(&self, full_name: &str) -> Result<Option<i64>> {
    let full_name = full_name.to_owned();
    let id = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT author_id FROM author
               WHERE first_name || ' ' || last_name = ?1
               ORDER BY author_id LIMIT 1",
              rusqlite::params![full_name],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(id)
  }

  async fn stats(&self) -> Result<StoreStats> {
    Ok(StoreStats {
      abstracts:      self.count("abstract").await?,
      authors:        self.count("author").await?,
      competencies:   self.count("competency").await?,
      categories:     self.count("category").await?,
      written_by:     self.count("written_by").await?,
      derived_from:   self.count("derived_from").await?,
      has_competency: self.count("has_competency").await?,
      has_category:   self.count("has_category").await?,
    })
  }
}
