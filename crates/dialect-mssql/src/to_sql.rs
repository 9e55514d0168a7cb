use std::fmt::Write as _;

use sluice_core::{ColumnDef, ColumnType, Error, Result, TableModel, TableRef, Value, literal};

pub(crate) fn quote_ident(identifier: &str) -> String {
    format!("[{}]", identifier.replace(']', "]]"))
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
        Value::Bool(value) => Ok(if *value { "1" } else { "0" }.to_string()),
        Value::Integer(value) => Ok(value.to_string()),
        Value::Real(value) => literal::render_real(*value),
        Value::Text(value) => Ok(literal::quote_string("N", value)),
        Value::Bytes(value) if value.is_empty() => Ok("0x".to_string()),
        Value::Bytes(value) => Ok(format!("0x{}", literal::hex(value))),
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
        ColumnType::Integer => "INT".to_string(),
        ColumnType::BigInt => "BIGINT".to_string(),
        ColumnType::Float => "FLOAT".to_string(),
        ColumnType::Boolean => "BIT".to_string(),
        ColumnType::Text => "NVARCHAR(MAX)".to_string(),
        ColumnType::String(length) => format!("NVARCHAR({length})"),
        ColumnType::Bytes => "VARBINARY(MAX)".to_string(),
    };

    let mut sql = format!("{} {data_type}", quote_ident(&column.name));
    if column.autoincrement && column.column_type.is_integer() {
        sql.push_str(" IDENTITY(1,1)");
    }
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    sql
}
