/// Schema of the seal/tag store.
///
/// Uses CREATE TABLE/INDEX IF NOT EXISTS for idempotent execution. Only
/// applied to stores this crate creates; existing stores are read as-is.
pub const SEAL_SCHEMA: &str = r#"
-- Seals: the tagged items being laid out
CREATE TABLE IF NOT EXISTS seal (
    id INTEGER PRIMARY KEY
);

-- Tags: unique tag names
CREATE TABLE IF NOT EXISTS tag (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

-- Junction table: links seals to tags (many-to-many)
CREATE TABLE IF NOT EXISTS seal_has_tag (
    seal_id INTEGER NOT NULL,
    tag_id INTEGER NOT NULL,
    PRIMARY KEY (seal_id, tag_id),
    FOREIGN KEY (seal_id) REFERENCES seal(id) ON DELETE CASCADE,
    FOREIGN KEY (tag_id) REFERENCES tag(id) ON DELETE CASCADE
);

-- Indexes for efficient junction table lookups
CREATE INDEX IF NOT EXISTS idx_seal_has_tag_seal ON seal_has_tag(seal_id);
CREATE INDEX IF NOT EXISTS idx_seal_has_tag_tag ON seal_has_tag(tag_id);
"#;

/// Relations a store must expose before it can be read.
pub const REQUIRED_RELATIONS: [&str; 3] = ["seal", "tag", "seal_has_tag"];

/// Every (seal, tag name) membership pair, seals in ascending id order.
pub const TAGGED_SEALS_QUERY: &str = "SELECT seal.id, tag.name
     FROM seal
     JOIN seal_has_tag ON seal.id = seal_has_tag.seal_id
     JOIN tag ON tag.id = seal_has_tag.tag_id
     ORDER BY seal.id, tag.name";

/// Like [`TAGGED_SEALS_QUERY`] but keeps seals without tags as a single
/// row with a NULL name.
pub const ALL_SEALS_QUERY: &str = "SELECT seal.id, tag.name
     FROM seal
     LEFT JOIN seal_has_tag ON seal.id = seal_has_tag.seal_id
     LEFT JOIN tag ON tag.id = seal_has_tag.tag_id
     ORDER BY seal.id, tag.name";
