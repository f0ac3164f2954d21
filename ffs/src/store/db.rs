//! SQLite-backed tag store.

use std::collections::BTreeSet;
use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::debug;

use super::error::{StoreError, StoreResult};
use super::models::{NewPoint, Point, Tag};
use super::schema::SCHEMA;
use crate::query::{Comparison, Operand, PathQuery, SegmentQuery, TagQuery};
use crate::tag::TagEntry;

const POINT_COLUMNS: &str = "id, name, path, hash, dir";
const TAG_COLUMNS: &str = "tags.id, tags.name, tags.value, tags.sort_value";

/// Database handle for the tag catalogue.
///
/// A `Store` owns one SQLite connection and is used from one thread at a
/// time; the FUSE session and the CLI both drive it serially.
pub struct Store {
    conn: Connection,
}

fn point_from_row(row: &Row<'_>) -> rusqlite::Result<Point> {
    Ok(Point {
        id: row.get(0)?,
        name: row.get(1)?,
        path: row.get(2)?,
        hash: row.get(3)?,
        dir: row.get(4)?,
    })
}

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        value: row.get(2)?,
        sort_value: row.get(3)?,
    })
}

/// Largest number of ids bound into one `IN (...)` list. SQLite rejects
/// statements with more than 32766 bound variables.
const ID_CHUNK_SIZE: usize = 500;

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "opened tag store");
        Self::init(conn)
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    // =========================================================================
    // Points
    // =========================================================================

    /// Insert a new point and return it with its assigned id.
    pub fn insert_point(&self, point: &NewPoint) -> StoreResult<Point> {
        self.conn.execute(
            "INSERT INTO points (name, path, hash, dir) VALUES (?1, ?2, ?3, ?4)",
            params![point.name, point.path, point.hash, point.dir],
        )?;

        Ok(Point {
            id: self.conn.last_insert_rowid(),
            name: point.name.clone(),
            path: point.path.clone(),
            hash: point.hash.clone(),
            dir: point.dir,
        })
    }

    /// Get a point by id.
    pub fn point(&self, id: i64) -> StoreResult<Option<Point>> {
        let sql = format!("SELECT {} FROM points WHERE id = ?1", POINT_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![id], point_from_row)
            .optional()?)
    }

    /// Get the point registered at a path.
    pub fn point_by_path(&self, path: &str) -> StoreResult<Option<Point>> {
        let sql = format!(
            "SELECT {} FROM points WHERE path = ?1 ORDER BY id LIMIT 1",
            POINT_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, params![path], point_from_row)
            .optional()?)
    }

    /// Get a point by content hash.
    pub fn point_by_hash(&self, hash: &str) -> StoreResult<Option<Point>> {
        let sql = format!(
            "SELECT {} FROM points WHERE hash = ?1 ORDER BY id LIMIT 1",
            POINT_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, params![hash], point_from_row)
            .optional()?)
    }

    /// List all points in id order.
    pub fn all_points(&self) -> StoreResult<Vec<Point>> {
        let sql = format!("SELECT {} FROM points ORDER BY id", POINT_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let points = stmt
            .query_map([], point_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(points)
    }

    fn points_by_ids(&self, ids: &BTreeSet<i64>) -> StoreResult<Vec<Point>> {
        let ids: Vec<i64> = ids.iter().copied().collect();
        let mut points = Vec::with_capacity(ids.len());

        // Chunks of an ordered set come back in id order.
        for chunk in ids.chunks(ID_CHUNK_SIZE) {
            let sql = format!(
                "SELECT {} FROM points WHERE id IN ({}) ORDER BY id",
                POINT_COLUMNS,
                placeholders(chunk.len())
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), point_from_row)?;
            for point in rows {
                points.push(point?);
            }
        }

        Ok(points)
    }

    /// Set or clear the real location of a point.
    pub fn set_point_path(&self, id: i64, path: Option<&str>) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE points SET path = ?1 WHERE id = ?2",
            params![path, id],
        )?;
        if changed == 0 {
            return Err(StoreError::PointNotFound(id));
        }
        Ok(())
    }

    /// Replace the content hash of a point.
    pub fn set_point_hash(&self, id: i64, hash: &str) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE points SET hash = ?1 WHERE id = ?2",
            params![hash, id],
        )?;
        if changed == 0 {
            return Err(StoreError::PointNotFound(id));
        }
        Ok(())
    }

    /// Remove a point, its joins, and any tags left without points.
    ///
    /// Returns `false` if no point had this id.
    pub fn remove_point(&mut self, id: i64) -> StoreResult<bool> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM joins WHERE point_id = ?1", params![id])?;
        let removed = tx.execute("DELETE FROM points WHERE id = ?1", params![id])?;
        tx.execute(
            "DELETE FROM tags WHERE id NOT IN (SELECT tag_id FROM joins)",
            [],
        )?;
        tx.commit()?;
        Ok(removed > 0)
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Find the tag identified by the entry's name and value, creating it if
    /// needed.
    ///
    /// A bare entry only matches bare tags. An existing valued tag without a
    /// sort key picks up the entry's sort key.
    pub fn find_or_create_tag(&self, entry: &TagEntry) -> StoreResult<Tag> {
        let existing = match &entry.value {
            Some(value) => {
                let sql = format!(
                    "SELECT {} FROM tags WHERE name = ?1 AND value = ?2 ORDER BY id LIMIT 1",
                    TAG_COLUMNS
                );
                self.conn
                    .query_row(&sql, params![entry.name, value.text], tag_from_row)
                    .optional()?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM tags WHERE name = ?1 AND value IS NULL ORDER BY id LIMIT 1",
                    TAG_COLUMNS
                );
                self.conn
                    .query_row(&sql, params![entry.name], tag_from_row)
                    .optional()?
            }
        };

        let sort = entry.value.as_ref().and_then(|v| v.sort);

        if let Some(mut tag) = existing {
            if tag.sort_value.is_none() && sort.is_some() {
                self.conn.execute(
                    "UPDATE tags SET sort_value = ?1 WHERE id = ?2",
                    params![sort, tag.id],
                )?;
                tag.sort_value = sort;
            }
            return Ok(tag);
        }

        let text = entry.value.as_ref().map(|v| v.text.clone());
        self.conn.execute(
            "INSERT INTO tags (name, value, sort_value) VALUES (?1, ?2, ?3)",
            params![entry.name, text, sort],
        )?;

        Ok(Tag {
            id: self.conn.last_insert_rowid(),
            name: entry.name.clone(),
            value: text,
            sort_value: sort,
        })
    }

    /// Attach a tag to a point. Tagging twice is a no-op.
    pub fn tag_point(&self, point_id: i64, entry: &TagEntry) -> StoreResult<Tag> {
        if self.point(point_id)?.is_none() {
            return Err(StoreError::PointNotFound(point_id));
        }

        let tag = self.find_or_create_tag(entry)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO joins (tag_id, point_id) VALUES (?1, ?2)",
            params![tag.id, point_id],
        )?;
        Ok(tag)
    }

    /// Detach a tag from a point, pruning the tag if nothing else uses it.
    ///
    /// Returns `false` if the point did not carry the tag.
    pub fn untag_point(&self, point_id: i64, tag_id: i64) -> StoreResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM joins WHERE point_id = ?1 AND tag_id = ?2",
            params![point_id, tag_id],
        )?;
        self.prune_orphan_tags()?;
        Ok(removed > 0)
    }

    /// Delete tags that no point carries. Returns the number deleted.
    pub fn prune_orphan_tags(&self) -> StoreResult<usize> {
        Ok(self.conn.execute(
            "DELETE FROM tags WHERE id NOT IN (SELECT tag_id FROM joins)",
            [],
        )?)
    }

    /// Tags carried by a point, ordered by name then value.
    pub fn tags_for_point(&self, point_id: i64) -> StoreResult<Vec<Tag>> {
        let sql = format!(
            "SELECT {} FROM tags JOIN joins ON joins.tag_id = tags.id
             WHERE joins.point_id = ?1
             ORDER BY tags.name, tags.value",
            TAG_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let tags = stmt
            .query_map(params![point_id], tag_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    /// Distinct tags carried by any of the points, ordered by name then value.
    pub fn tags_for_points(&self, points: &[Point]) -> StoreResult<Vec<Tag>> {
        let mut seen = BTreeSet::new();
        let mut tags = Vec::new();

        for chunk in points.chunks(ID_CHUNK_SIZE) {
            let sql = format!(
                "SELECT DISTINCT {} FROM tags JOIN joins ON joins.tag_id = tags.id
                 WHERE joins.point_id IN ({})",
                TAG_COLUMNS,
                placeholders(chunk.len())
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter().map(|p| p.id)), tag_from_row)?;
            for tag in rows {
                let tag = tag?;
                if seen.insert(tag.id) {
                    tags.push(tag);
                }
            }
        }

        // `None` sorts first, as SQLite orders NULL values.
        tags.sort_by(|a, b| (&a.name, &a.value).cmp(&(&b.name, &b.value)));
        Ok(tags)
    }

    /// Tags selected by a single query alternative.
    pub fn tags_matching(&self, query: &TagQuery) -> StoreResult<Vec<Tag>> {
        if !query.is_satisfiable() {
            return Ok(Vec::new());
        }

        let (filter, values): (String, Vec<Value>) = match query {
            TagQuery::Name(name) => ("name = ?1".to_string(), vec![Value::Text(name.clone())]),
            TagQuery::Compare {
                name,
                op: Comparison::Eq,
                operand: Operand::Number(n),
            } => (
                // A numeric-looking value stored without a sort key still
                // matches on its text.
                "name = ?1 AND (sort_value = ?2 OR value = ?3)".to_string(),
                vec![
                    Value::Text(name.clone()),
                    Value::Integer(*n),
                    Value::Text(n.to_string()),
                ],
            ),
            TagQuery::Compare {
                name,
                op,
                operand: Operand::Number(n),
            } => (
                format!("name = ?1 AND sort_value {} ?2", op.sql()),
                vec![Value::Text(name.clone()), Value::Integer(*n)],
            ),
            TagQuery::Compare {
                name,
                op,
                operand: Operand::Text(text),
            } => (
                format!("name = ?1 AND value {} ?2", op.sql()),
                vec![Value::Text(name.clone()), Value::Text(text.clone())],
            ),
        };

        let sql = format!(
            "SELECT {} FROM tags WHERE {} ORDER BY tags.id",
            TAG_COLUMNS, filter
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let tags = stmt
            .query_map(params_from_iter(values.iter()), tag_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    fn tags_for_segment(&self, segment: &SegmentQuery) -> StoreResult<Vec<Tag>> {
        let mut tags: Vec<Tag> = Vec::new();
        for alternative in &segment.alternatives {
            for tag in self.tags_matching(alternative)? {
                if !tags.iter().any(|t| t.id == tag.id) {
                    tags.push(tag);
                }
            }
        }
        Ok(tags)
    }

    /// Tags selected by each path component.
    pub fn tags_by_parts<S: AsRef<str>>(&self, parts: &[S]) -> StoreResult<Vec<Vec<Tag>>> {
        PathQuery::parse(parts)
            .segments
            .iter()
            .map(|segment| self.tags_for_segment(segment))
            .collect()
    }

    fn point_ids_for_tag(&self, tag_id: i64) -> StoreResult<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT point_id FROM joins WHERE tag_id = ?1")?;
        let ids = stmt
            .query_map(params![tag_id], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    /// Points matching every path component, in id order.
    ///
    /// A component matches the points carrying any tag it selects; an empty
    /// path matches every point.
    pub fn points_by_parts<S: AsRef<str>>(&self, parts: &[S]) -> StoreResult<Vec<Point>> {
        let query = PathQuery::parse(parts);
        if query.is_empty() {
            return self.all_points();
        }

        let mut matching: Option<BTreeSet<i64>> = None;

        for segment in &query.segments {
            let mut segment_points = BTreeSet::new();
            for tag in self.tags_for_segment(segment)? {
                segment_points.extend(self.point_ids_for_tag(tag.id)?);
            }

            let narrowed = match matching {
                Some(current) => current.intersection(&segment_points).copied().collect(),
                None => segment_points,
            };

            if narrowed.is_empty() {
                return Ok(Vec::new());
            }
            matching = Some(narrowed);
        }

        self.points_by_ids(&matching.unwrap_or_default())
    }
}
