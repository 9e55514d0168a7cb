/// `$1` is the schema to inspect; `NULL` means the first schema on the
/// search path.
pub const TABLE_NAMES_QUERY: &str = r#"
SELECT table_name::text
FROM information_schema.tables
WHERE table_schema = COALESCE($1::text, current_schema())
  AND table_type = 'BASE TABLE'
ORDER BY table_name ASC;
"#;

pub const SCHEMA_NAMES_QUERY: &str = r#"
SELECT schema_name::text
FROM information_schema.schemata
ORDER BY schema_name ASC;
"#;
