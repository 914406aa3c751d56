//! Declarative table definitions rendered to PostgreSQL DDL.

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnType {
    BigSerial,
    BigInt,
    Varchar(u32),
    Text,
    Boolean,
    TimestampTz,
}

impl ColumnType {
    fn sql(&self) -> String {
        match self {
            ColumnType::BigSerial => "BIGSERIAL".into(),
            ColumnType::BigInt => "BIGINT".into(),
            ColumnType::Varchar(n) => format!("VARCHAR({})", n),
            ColumnType::Text => "TEXT".into(),
            ColumnType::Boolean => "BOOLEAN".into(),
            ColumnType::TimestampTz => "TIMESTAMPTZ".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub type_: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    /// Raw SQL expression, e.g. `NOW()`.
    pub default: Option<String>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, type_: ColumnType) -> Self {
        Self {
            name: name.into(),
            type_,
            nullable: false,
            primary_key: false,
            default: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn default_expr(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    fn sql(&self) -> String {
        let mut def = format!("{} {}", quote(&self.name), self.type_.sql());
        if !self.nullable && !self.primary_key {
            def.push_str(" NOT NULL");
        }
        if let Some(ref d) = self.default {
            def.push_str(" DEFAULT ");
            def.push_str(d);
        }
        def
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    /// Append `created_at` / `updated_at` unless already declared.
    pub timestamps: bool,
}

impl TableDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            timestamps: false,
        }
    }

    /// `id BIGSERIAL PRIMARY KEY`
    pub fn id(self) -> Self {
        self.column(ColumnDef::new("id", ColumnType::BigSerial).primary_key())
    }

    pub fn column(mut self, col: ColumnDef) -> Self {
        self.columns.push(col);
        self
    }

    pub fn timestamps(mut self) -> Self {
        self.timestamps = true;
        self
    }

    pub fn create_sql(&self) -> String {
        let mut col_defs: Vec<String> = self.columns.iter().map(ColumnDef::sql).collect();
        if self.timestamps {
            for name in ["created_at", "updated_at"] {
                if !self.columns.iter().any(|c| c.name == name) {
                    col_defs.push(
                        ColumnDef::new(name, ColumnType::TimestampTz)
                            .default_expr("NOW()")
                            .sql(),
                    );
                }
            }
        }
        let pk: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| quote(&c.name))
            .collect();
        if !pk.is_empty() {
            col_defs.push(format!("PRIMARY KEY ({})", pk.join(", ")));
        }
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
            quote(&self.name),
            col_defs.join(",\n  ")
        )
    }
}

/// One DDL step of a migration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaChange {
    CreateTable(TableDef),
    DropTable(String),
}

impl SchemaChange {
    pub fn sql(&self) -> String {
        match self {
            SchemaChange::CreateTable(t) => t.create_sql(),
            SchemaChange::DropTable(name) => format!("DROP TABLE IF EXISTS {}", quote(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_posts_table() {
        let t = TableDef::new("posts")
            .id()
            .column(ColumnDef::new("title", ColumnType::Varchar(255)))
            .column(ColumnDef::new("body", ColumnType::Text))
            .timestamps();
        assert_eq!(
            t.create_sql(),
            "CREATE TABLE IF NOT EXISTS \"posts\" (\n  \
             \"id\" BIGSERIAL,\n  \
             \"title\" VARCHAR(255) NOT NULL,\n  \
             \"body\" TEXT NOT NULL,\n  \
             \"created_at\" TIMESTAMPTZ NOT NULL DEFAULT NOW(),\n  \
             \"updated_at\" TIMESTAMPTZ NOT NULL DEFAULT NOW(),\n  \
             PRIMARY KEY (\"id\")\n)"
        );
    }

    #[test]
    fn explicit_timestamp_column_is_not_duplicated() {
        let t = TableDef::new("t")
            .column(ColumnDef::new("created_at", ColumnType::TimestampTz).nullable())
            .timestamps();
        let sql = t.create_sql();
        assert_eq!(sql.matches("\"created_at\"").count(), 1);
        assert!(sql.contains("\"updated_at\" TIMESTAMPTZ NOT NULL DEFAULT NOW()"));
        assert!(!sql.contains("PRIMARY KEY"));
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(
            SchemaChange::DropTable("we\"ird".into()).sql(),
            "DROP TABLE IF EXISTS \"we\"\"ird\""
        );
    }
}
