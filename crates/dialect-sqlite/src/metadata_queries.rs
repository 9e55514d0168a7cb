use crate::to_sql::quote_ident;

pub(crate) const SCHEMA_NAMES_QUERY: &str = "PRAGMA database_list";

/// Lists user tables of `schema` (an attached database name), or of the
/// connection's search order when `None`.
#[must_use]
pub fn table_names_query(schema: Option<&str>) -> String {
    let master = match schema {
        Some(schema) => format!("{}.sqlite_master", quote_ident(schema)),
        None => "sqlite_master".to_string(),
    };

    format!(
        "SELECT name FROM {master} WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name ASC"
    )
}

#[must_use]
pub fn schema_names_query() -> &'static str {
    SCHEMA_NAMES_QUERY
}
