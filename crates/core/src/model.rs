use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }

    /// Splits `schema.table`. Only a string with exactly one dot is split;
    /// anything else is kept whole as an unqualified table name.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('.') {
            Some((schema, name)) if !name.contains('.') => Self::qualified(schema, name),
            _ => Self::new(raw),
        }
    }

    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref().filter(|schema| !schema.is_empty())
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.schema() {
            Some(schema) => write!(f, "{schema}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    BigInt,
    Float,
    Boolean,
    Text,
    String(u32),
    Bytes,
}

impl ColumnType {
    #[must_use]
    pub fn is_integer(self) -> bool {
        matches!(self, Self::Integer | Self::BigInt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub primary_key: bool,
    pub autoincrement: bool,
    pub nullable: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            primary_key: false,
            autoincrement: false,
            nullable: true,
        }
    }

    /// Marks the column as primary key. Integer keys also become
    /// auto-incrementing.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self.autoincrement = self.column_type.is_integer();
        self
    }

    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    #[must_use]
    pub fn autoincrement(mut self, enabled: bool) -> Self {
        self.autoincrement = enabled;
        self
    }
}

/// Declarative table description used to create missing tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableModel {
    pub name: String,
    pub schema: Option<String>,
    pub columns: Vec<ColumnDef>,
}

impl TableModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    #[must_use]
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn table_ref(&self) -> TableRef {
        TableRef {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|column| column.primary_key)
    }
}

/// Registry of declared models, created together by
/// [`crate::Database::create_tables`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    models: Vec<TableModel>,
}

impl Metadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `model`, replacing an earlier model for the same table.
    pub fn register(&mut self, model: TableModel) {
        let table = model.table_ref();
        match self
            .models
            .iter_mut()
            .find(|existing| existing.table_ref() == table)
        {
            Some(existing) => *existing = model,
            None => self.models.push(model),
        }
    }

    #[must_use]
    pub fn get(&self, table: &TableRef) -> Option<&TableModel> {
        self.models.iter().find(|model| &model.table_ref() == table)
    }

    #[must_use]
    pub fn models(&self) -> &[TableModel] {
        &self.models
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertTarget {
    Name(TableRef),
    Model(TableModel),
}

impl InsertTarget {
    #[must_use]
    pub fn table_ref(&self) -> TableRef {
        match self {
            Self::Name(table) => table.clone(),
            Self::Model(model) => model.table_ref(),
        }
    }
}

impl From<&str> for InsertTarget {
    fn from(value: &str) -> Self {
        Self::Name(TableRef::parse(value))
    }
}

impl From<TableRef> for InsertTarget {
    fn from(value: TableRef) -> Self {
        Self::Name(value)
    }
}

impl From<TableModel> for InsertTarget {
    fn from(value: TableModel) -> Self {
        Self::Model(value)
    }
}
