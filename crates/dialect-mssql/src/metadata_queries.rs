use sluice_core::literal;

pub const SCHEMA_NAMES_QUERY: &str = "SELECT name FROM sys.schemas ORDER BY name ASC;";

/// Tables of `schema`, or of the login's default schema when `None`.
#[must_use]
pub fn table_names_query(schema: Option<&str>) -> String {
    let schema = schema.map_or_else(
        || "SCHEMA_NAME()".to_string(),
        |schema| literal::quote_string("N", schema),
    );

    format!(
        "SELECT t.name FROM sys.tables AS t WHERE SCHEMA_NAME(t.schema_id) = {schema} ORDER BY t.name ASC;"
    )
}
