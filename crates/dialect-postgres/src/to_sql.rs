use std::fmt::Write as _;

use sluice_core::{ColumnDef, ColumnType, Error, Result, TableModel, TableRef, Value, literal};

pub(crate) fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn render_table_name(table: &TableRef) -> String {
    match table.schema() {
        Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(&table.name)),
        None => quote_ident(&table.name),
    }
}

pub(crate) fn render_literal(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Bool(true) => Ok("TRUE".to_string()),
        Value::Bool(false) => Ok("FALSE".to_string()),
        Value::Integer(value) => Ok(value.to_string()),
        Value::Real(value) => literal::render_real(*value),
        Value::Text(value) => Ok(literal::quote_string("", value)),
        Value::Bytes(value) => Ok(format!("decode('{}', 'hex')", literal::hex(value))),
    }
}

pub(crate) fn render_create_table(model: &TableModel) -> Result<String> {
    if model.columns.is_empty() {
        return Err(Error::Validation(format!(
            "table {} declares no columns",
            model.table_ref()
        )));
    }

    let mut definitions = model.columns.iter().map(render_column).collect::<Vec<_>>();

    let primary_key = model
        .primary_key_columns()
        .map(|column| quote_ident(&column.name))
        .collect::<Vec<_>>();
    if !primary_key.is_empty() {
        definitions.push(format!("PRIMARY KEY ({})", primary_key.join(", ")));
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

fn render_column(column: &ColumnDef) -> String {
    let data_type = match column.column_type {
        ColumnType::Integer if column.autoincrement => "SERIAL".to_string(),
        ColumnType::BigInt if column.autoincrement => "BIGSERIAL".to_string(),
        ColumnType::Integer => "INTEGER".to_string(),
        ColumnType::BigInt => "BIGINT".to_string(),
        ColumnType::Float => "DOUBLE PRECISION".to_string(),
        ColumnType::Boolean => "BOOLEAN".to_string(),
        ColumnType::Text => "TEXT".to_string(),
        ColumnType::String(length) => format!("VARCHAR({length})"),
        ColumnType::Bytes => "BYTEA".to_string(),
    };

    let mut sql = format!("{} {data_type}", quote_ident(&column.name));
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    sql
}
