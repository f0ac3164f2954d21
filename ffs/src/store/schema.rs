//! Database schema.

/// Schema applied on every open; all statements are idempotent.
pub(super) const SCHEMA: &str = r#"
-- Registered files and directories
CREATE TABLE IF NOT EXISTS points (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    path TEXT,
    hash TEXT NOT NULL,
    dir INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_points_path ON points(path);
CREATE INDEX IF NOT EXISTS idx_points_hash ON points(hash);

-- Tags: bare (value NULL) or valued, with an optional numeric sort key
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    value TEXT,
    sort_value INTEGER
);
CREATE INDEX IF NOT EXISTS idx_tags_name ON tags(name, value);

-- Point/tag membership
CREATE TABLE IF NOT EXISTS joins (
    id INTEGER PRIMARY KEY,
    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    point_id INTEGER NOT NULL REFERENCES points(id) ON DELETE CASCADE,
    UNIQUE (tag_id, point_id)
);
CREATE INDEX IF NOT EXISTS idx_joins_point ON joins(point_id);
"#;
