//! SQLite storage backend

use super::traits::{
    OpenStore, ReconcileOutcome, StorageError, StorageResult, TagStore, TaggingScope,
};
use crate::query::{CountOrder, RelatedQuery, RelatedRecord, TagCount, TagCountQuery};
use crate::reconcile::ReconcilePlan;
use crate::tag::{EntityRef, Tag, TagId, Tagging, TaggingId};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::sync::Mutex;

/// Columns selected whenever taggings are materialized, tags joined in.
const TAGGING_COLUMNS: &str = "g.id, g.tag_id, t.name, g.taggable_kind, g.taggable_id, \
     g.context, g.tagger_kind, g.tagger_id, g.position, g.created_at";

/// SQLite-backed tag store
///
/// Uses a single database file with a `tags` table and a `taggings` table.
/// Thread-safe via internal mutex on the connection. The uniqueness of
/// (tag, taggable, context, tagger) is enforced by a unique index; the
/// shared no-owner scope is stored as empty-string tagger columns so the
/// index covers it (SQLite treats NULLs as distinct in unique indexes).
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// Raw tagging row before date parsing.
type TaggingRow = (
    i64,
    i64,
    String,
    String,
    String,
    String,
    String,
    String,
    Option<i64>,
    String,
);

impl SqliteStore {
    /// Initialize the database schema
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            -- Canonical tags
            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            );

            -- Tag-to-record associations
            CREATE TABLE IF NOT EXISTS taggings (
                id INTEGER PRIMARY KEY,
                tag_id INTEGER NOT NULL REFERENCES tags(id),
                taggable_kind TEXT NOT NULL,
                taggable_id TEXT NOT NULL,
                context TEXT NOT NULL,
                -- '' = the shared no-owner scope
                tagger_kind TEXT NOT NULL DEFAULT '',
                tagger_id TEXT NOT NULL DEFAULT '',
                position INTEGER,
                created_at TEXT NOT NULL
            );

            -- One row per (tag, record, context, owner)
            CREATE UNIQUE INDEX IF NOT EXISTS idx_taggings_identity
                ON taggings(tag_id, taggable_kind, taggable_id, context, tagger_kind, tagger_id);

            CREATE INDEX IF NOT EXISTS idx_taggings_taggable
                ON taggings(taggable_kind, taggable_id, context);
            CREATE INDEX IF NOT EXISTS idx_taggings_tag
                ON taggings(tag_id);
            CREATE INDEX IF NOT EXISTS idx_taggings_context
                ON taggings(context);

            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- Enable WAL mode for concurrent reads during writes
            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    /// Timestamps are stored RFC 3339 UTC with fixed-width microseconds so
    /// lexicographic MAX() in SQL equals chronological ordering.
    fn now_string() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_timestamp(raw: &str) -> StorageResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StorageError::DateParse(e.to_string()))
    }

    /// Owner columns at the row boundary: `None` is stored as ('', '').
    fn tagger_columns(tagger: Option<&EntityRef>) -> (String, String) {
        match tagger {
            Some(t) => (t.kind.clone(), t.id.clone()),
            None => (String::new(), String::new()),
        }
    }

    fn row_to_tagging(row: TaggingRow) -> StorageResult<Tagging> {
        let (id, tag_id, tag_name, taggable_kind, taggable_id, context, tagger_kind, tagger_id, position, created_at) =
            row;
        let tagger = if tagger_kind.is_empty() && tagger_id.is_empty() {
            None
        } else {
            Some(EntityRef::new(tagger_kind, tagger_id))
        };
        Ok(Tagging {
            id: TaggingId::new(id),
            tag: Tag::new(TagId::new(tag_id), tag_name),
            taggable: EntityRef::new(taggable_kind, taggable_id),
            context,
            tagger,
            position,
            created_at: Self::parse_timestamp(&created_at)?,
        })
    }

    fn map_tagging_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TaggingRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
            row.get(8)?,
            row.get(9)?,
        ))
    }

    fn find_tag_in(conn: &Connection, name: &str) -> StorageResult<Option<Tag>> {
        let row: Option<(i64, String)> = conn
            .query_row(
                "SELECT id, name FROM tags WHERE name = ?1",
                params![name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(row.map(|(id, name)| Tag::new(TagId::new(id), name)))
    }

    /// Lookup-or-create against an open connection or transaction.
    ///
    /// A unique-constraint failure means another writer created the tag
    /// between our lookup and insert; it is re-fetched, not surfaced.
    fn find_or_create_tag_in(conn: &Connection, name: &str) -> StorageResult<Tag> {
        if name.trim().is_empty() {
            return Err(StorageError::InvalidTagName(name.to_string()));
        }
        if let Some(tag) = Self::find_tag_in(conn, name)? {
            return Ok(tag);
        }

        match conn.execute("INSERT INTO tags (name) VALUES (?1)", params![name]) {
            Ok(_) => Ok(Tag::new(TagId::new(conn.last_insert_rowid()), name)),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                tracing::debug!(name, "tag created concurrently, re-fetching");
                Self::find_tag_in(conn, name)?
                    .ok_or_else(|| StorageError::InvalidTagName(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn load_tagging(tx: &Transaction<'_>, id: TaggingId) -> StorageResult<Option<Tagging>> {
        let sql = format!(
            "SELECT {TAGGING_COLUMNS} FROM taggings g JOIN tags t ON t.id = g.tag_id WHERE g.id = ?1"
        );
        let row: Option<TaggingRow> = tx
            .query_row(&sql, params![id.as_i64()], Self::map_tagging_row)
            .optional()?;
        row.map(Self::row_to_tagging).transpose()
    }

    /// Delete tags among `tag_ids` that no tagging references any more.
    fn delete_unused_tags(tx: &Transaction<'_>, tag_ids: &[i64]) -> StorageResult<()> {
        for tag_id in tag_ids {
            let deleted = tx.execute(
                "DELETE FROM tags WHERE id = ?1
                 AND NOT EXISTS (SELECT 1 FROM taggings WHERE tag_id = ?1)",
                params![tag_id],
            )?;
            if deleted > 0 {
                tracing::debug!(tag_id, "removed unused tag");
            }
        }
        Ok(())
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl TagStore for SqliteStore {
    // === Tag Operations ===

    fn find_tag(&self, name: &str) -> StorageResult<Option<Tag>> {
        let conn = self.conn.lock().unwrap();
        Self::find_tag_in(&conn, name)
    }

    fn find_or_create_tag(&self, name: &str) -> StorageResult<Tag> {
        let conn = self.conn.lock().unwrap();
        Self::find_or_create_tag_in(&conn, name)
    }

    fn list_tags(&self) -> StorageResult<Vec<Tag>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, name FROM tags ORDER BY name")?;
        let tags = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .map(|r| r.map(|(id, name)| Tag::new(TagId::new(id), name)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    fn tag_usage(&self, tag_id: TagId) -> StorageResult<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM taggings WHERE tag_id = ?1",
            params![tag_id.as_i64()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // === Tagging Operations ===

    fn taggings_for(&self, scope: &TaggingScope) -> StorageResult<Vec<Tagging>> {
        let conn = self.conn.lock().unwrap();
        let (tagger_kind, tagger_id) = Self::tagger_columns(scope.tagger.as_ref());

        let sql = format!(
            "SELECT {TAGGING_COLUMNS} FROM taggings g JOIN tags t ON t.id = g.tag_id
             WHERE g.taggable_kind = ?1 AND g.taggable_id = ?2 AND g.context = ?3
               AND g.tagger_kind = ?4 AND g.tagger_id = ?5
             ORDER BY g.position IS NULL, g.position, g.id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![
                scope.taggable.kind,
                scope.taggable.id,
                scope.context,
                tagger_kind,
                tagger_id
            ],
            Self::map_tagging_row,
        )?;

        let mut taggings = Vec::new();
        for row in rows {
            taggings.push(Self::row_to_tagging(row?)?);
        }
        Ok(taggings)
    }

    fn all_taggings_for(
        &self,
        taggable: &EntityRef,
        context: &str,
    ) -> StorageResult<Vec<Tagging>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT {TAGGING_COLUMNS} FROM taggings g JOIN tags t ON t.id = g.tag_id
             WHERE g.taggable_kind = ?1 AND g.taggable_id = ?2 AND g.context = ?3
             ORDER BY g.created_at, g.id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![taggable.kind, taggable.id, context],
            Self::map_tagging_row,
        )?;

        let mut taggings = Vec::new();
        for row in rows {
            taggings.push(Self::row_to_tagging(row?)?);
        }
        Ok(taggings)
    }

    fn apply(
        &self,
        scope: &TaggingScope,
        plan: &ReconcilePlan,
        remove_unused: bool,
    ) -> StorageResult<ReconcileOutcome> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let (tagger_kind, tagger_id) = Self::tagger_columns(scope.tagger.as_ref());
        let mut outcome = ReconcileOutcome::default();

        // Creates
        for add in &plan.add {
            let tag = Self::find_or_create_tag_in(&tx, &add.name)?;
            let created_at = Self::now_string();
            let inserted = tx.execute(
                "INSERT INTO taggings
                     (tag_id, taggable_kind, taggable_id, context, tagger_kind, tagger_id, position, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(tag_id, taggable_kind, taggable_id, context, tagger_kind, tagger_id)
                     DO NOTHING",
                params![
                    tag.id.as_i64(),
                    scope.taggable.kind,
                    scope.taggable.id,
                    scope.context,
                    tagger_kind,
                    tagger_id,
                    add.position,
                    created_at,
                ],
            )?;
            if inserted > 0 {
                outcome.created.push(Tagging {
                    id: TaggingId::new(tx.last_insert_rowid()),
                    tag,
                    taggable: scope.taggable.clone(),
                    context: scope.context.clone(),
                    tagger: scope.tagger.clone(),
                    position: add.position,
                    created_at: Self::parse_timestamp(&created_at)?,
                });
            }
        }

        // Repositions of kept taggings
        for (id, position) in &plan.reposition {
            tx.execute(
                "UPDATE taggings SET position = ?1 WHERE id = ?2",
                params![position, id.as_i64()],
            )?;
        }

        // Removals
        for id in &plan.remove {
            if let Some(tagging) = Self::load_tagging(&tx, *id)? {
                tx.execute(
                    "DELETE FROM taggings WHERE id = ?1",
                    params![id.as_i64()],
                )?;
                outcome.deleted.push(tagging);
            }
        }

        if remove_unused && !outcome.deleted.is_empty() {
            let mut tag_ids: Vec<i64> =
                outcome.deleted.iter().map(|t| t.tag.id.as_i64()).collect();
            tag_ids.sort_unstable();
            tag_ids.dedup();
            Self::delete_unused_tags(&tx, &tag_ids)?;
        }

        tx.commit()?;

        tracing::debug!(
            taggable = %scope.taggable,
            context = %scope.context,
            created = outcome.created.len(),
            deleted = outcome.deleted.len(),
            repositioned = plan.reposition.len(),
            "applied reconciliation plan"
        );
        Ok(outcome)
    }

    fn remove_taggable(&self, taggable: &EntityRef, remove_unused: bool) -> StorageResult<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let mut stmt = tx.prepare(
            "SELECT DISTINCT tag_id FROM taggings WHERE taggable_kind = ?1 AND taggable_id = ?2",
        )?;
        let tag_ids = stmt
            .query_map(params![taggable.kind, taggable.id], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        let removed = tx.execute(
            "DELETE FROM taggings WHERE taggable_kind = ?1 AND taggable_id = ?2",
            params![taggable.kind, taggable.id],
        )?;
        if remove_unused {
            Self::delete_unused_tags(&tx, &tag_ids)?;
        }
        tx.commit()?;
        Ok(removed)
    }

    fn remove_tagger(&self, tagger: &EntityRef, remove_unused: bool) -> StorageResult<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let mut stmt = tx.prepare(
            "SELECT DISTINCT tag_id FROM taggings WHERE tagger_kind = ?1 AND tagger_id = ?2",
        )?;
        let tag_ids = stmt
            .query_map(params![tagger.kind, tagger.id], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        let removed = tx.execute(
            "DELETE FROM taggings WHERE tagger_kind = ?1 AND tagger_id = ?2",
            params![tagger.kind, tagger.id],
        )?;
        if remove_unused {
            Self::delete_unused_tags(&tx, &tag_ids)?;
        }
        tx.commit()?;
        Ok(removed)
    }

    // === Aggregate Queries ===

    fn tag_counts(&self, query: &TagCountQuery) -> StorageResult<Vec<TagCount>> {
        let conn = self.conn.lock().unwrap();

        let mut sql = String::from(
            "SELECT t.id, t.name, COUNT(g.id) AS cnt
             FROM taggings g JOIN tags t ON t.id = g.tag_id
             WHERE 1 = 1",
        );
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref context) = query.context {
            sql.push_str(" AND g.context = ?");
            params_vec.push(Box::new(context.clone()));
        }
        if let Some(ref kind) = query.taggable_kind {
            sql.push_str(" AND g.taggable_kind = ?");
            params_vec.push(Box::new(kind.clone()));
        }
        if let Some(ref tagger) = query.tagger {
            sql.push_str(" AND g.tagger_kind = ? AND g.tagger_id = ?");
            params_vec.push(Box::new(tagger.kind.clone()));
            params_vec.push(Box::new(tagger.id.clone()));
        }

        sql.push_str(" GROUP BY t.id, t.name");

        match (query.at_least, query.at_most) {
            (Some(lo), Some(hi)) => {
                sql.push_str(" HAVING cnt >= ? AND cnt <= ?");
                params_vec.push(Box::new(lo as i64));
                params_vec.push(Box::new(hi as i64));
            }
            (Some(lo), None) => {
                sql.push_str(" HAVING cnt >= ?");
                params_vec.push(Box::new(lo as i64));
            }
            (None, Some(hi)) => {
                sql.push_str(" HAVING cnt <= ?");
                params_vec.push(Box::new(hi as i64));
            }
            (None, None) => {}
        }

        // Name tiebreak keeps equal counts deterministic.
        sql.push_str(match query.order {
            CountOrder::CountAsc => " ORDER BY cnt ASC, t.name ASC",
            CountOrder::CountDesc => " ORDER BY cnt DESC, t.name ASC",
            CountOrder::Name => " ORDER BY t.name ASC",
        });

        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|b| b.as_ref()).collect();

        let counts = stmt
            .query_map(params_refs.as_slice(), |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .map(|r| {
                r.map(|(id, name, count)| TagCount {
                    tag: Tag::new(TagId::new(id), name),
                    count: count as u64,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    fn related(&self, query: &RelatedQuery) -> StorageResult<Vec<RelatedRecord>> {
        let conn = self.conn.lock().unwrap();

        let mut sql = String::from(
            "SELECT o.taggable_id, COUNT(DISTINCT o.tag_id) AS shared, MAX(o.created_at) AS latest
             FROM taggings s JOIN taggings o ON o.tag_id = s.tag_id
             WHERE s.taggable_kind = ?1 AND s.taggable_id = ?2 AND s.context = ?3
               AND o.taggable_kind = ?1 AND o.context = ?3 AND o.taggable_id <> ?2
             GROUP BY o.taggable_id
             ORDER BY shared DESC, latest DESC, o.taggable_id ASC",
        );
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(
                params![query.taggable.kind, query.taggable.id, query.context],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )?
            .map(|r| {
                r.map(|(id, shared)| RelatedRecord {
                    id,
                    shared_count: shared as u64,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
