use std::fmt::Write as _;

use sluice_core::{ColumnDef, ColumnType, Error, Result, TableModel, TableRef, Value, literal};

pub(crate) fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub(crate) fn render_table_name(table: &TableRef) -> String {
    match table.schema() {
        Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(&table.name)),
        None => quote_ident(&table.name),
    }
}

pub(crate) fn render_literal(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Bool(value) => Ok(if *value { "1" } else { "0" }.to_string()),
        Value::Integer(value) => Ok(value.to_string()),
        Value::Real(value) => literal::render_real(*value),
        Value::Text(value) => Ok(literal::quote_string("", value)),
        Value::Bytes(value) => Ok(format!("X'{}'", literal::hex(value))),
    }
}

pub(crate) fn render_create_table(model: &TableModel) -> Result<String> {
    if model.columns.is_empty() {
        return Err(Error::Validation(format!(
            "table {} declares no columns",
            model.table_ref()
        )));
    }

    let primary_keys = model.primary_key_columns().collect::<Vec<_>>();
    // SQLite only auto-increments a lone INTEGER PRIMARY KEY column.
    let rowid_alias = match primary_keys.as_slice() {
        [column] if column.autoincrement => Some(column.name.as_str()),
        _ => None,
    };

    let mut definitions = model
        .columns
        .iter()
        .map(|column| render_column(column, rowid_alias == Some(column.name.as_str())))
        .collect::<Vec<_>>();

    if rowid_alias.is_none() && !primary_keys.is_empty() {
        let columns = primary_keys
            .iter()
            .map(|column| quote_ident(&column.name))
            .collect::<Vec<_>>()
            .join(", ");
        definitions.push(format!("PRIMARY KEY ({columns})"));
    }

    let mut sql = String::new();
    write!(
        sql,
        "CREATE TABLE {} ({})",
        render_table_name(&model.table_ref()),
        definitions.join(", ")
    )
    .expect("writing to String should not fail");

    Ok(sql)
}

fn render_column(column: &ColumnDef, rowid_alias: bool) -> String {
    let name = quote_ident(&column.name);
    if rowid_alias {
        return format!("{name} INTEGER PRIMARY KEY AUTOINCREMENT");
    }

    let mut sql = format!("{name} {}", render_type(column.column_type));
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    sql
}

fn render_type(column_type: ColumnType) -> String {
    match column_type {
        ColumnType::Integer => "INTEGER".to_string(),
        ColumnType::BigInt => "BIGINT".to_string(),
        ColumnType::Float => "REAL".to_string(),
        ColumnType::Boolean => "BOOLEAN".to_string(),
        ColumnType::Text => "TEXT".to_string(),
        ColumnType::String(length) => format!("VARCHAR({length})"),
        ColumnType::Bytes => "BLOB".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use sluice_core::{ColumnDef, ColumnType, TableModel, Value};

    use super::{quote_ident, render_create_table, render_literal};

    #[test]
    fn quote_ident_doubles_embedded_quotes() {
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn literals_use_sqlite_spellings() {
        assert_eq!(render_literal(&Value::Bool(true)).expect("bool"), "1");
        assert_eq!(
            render_literal(&Value::Bytes(vec![0xca, 0xfe])).expect("blob"),
            "X'CAFE'"
        );
        assert_eq!(
            render_literal(&Value::Text("o'clock".to_string())).expect("text"),
            "'o''clock'"
        );
    }

    #[test]
    fn lone_integer_key_becomes_rowid_alias() {
        let model = TableModel::new("test")
            .column(ColumnDef::new("id", ColumnType::BigInt).primary_key())
            .column(ColumnDef::new("name", ColumnType::Text).not_null());

        assert_eq!(
            render_create_table(&model).expect("render"),
            "CREATE TABLE \"test\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \"name\" TEXT NOT NULL)"
        );
    }

    #[test]
    fn composite_key_is_a_table_constraint() {
        let model = TableModel::new("pairs")
            .column(ColumnDef::new("a", ColumnType::Integer).primary_key())
            .column(ColumnDef::new("b", ColumnType::String(8)).primary_key());

        assert_eq!(
            render_create_table(&model).expect("render"),
            "CREATE TABLE \"pairs\" (\"a\" INTEGER NOT NULL, \"b\" VARCHAR(8) NOT NULL, PRIMARY KEY (\"a\", \"b\"))"
        );
    }

    #[test]
    fn model_without_columns_is_rejected() {
        assert!(render_create_table(&TableModel::new("empty")).is_err());
    }
}
