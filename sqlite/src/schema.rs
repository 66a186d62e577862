//! SQL schema generation with customizable table prefixes.
//!
//! Generates one `CREATE TABLE` per model plus indexes on relation columns.
//! Table names are the prefix followed by the snake_case class name, so
//! `TmSetListElement` under prefix `pk_` becomes `pk_tm_set_list_element`.
//!
//! # Column mapping
//!
//! | field                  | column                                           |
//! |------------------------|--------------------------------------------------|
//! | string (n)             | `TEXT` with a `length(..) <= n` check            |
//! | integer, default d     | `INTEGER NOT NULL DEFAULT d`                     |
//! | integer                | `INTEGER NOT NULL`                               |
//! | date/time              | `TEXT NOT NULL`                                  |
//! | reference to `X`       | `{name}_id INTEGER NOT NULL REFERENCES x(id)`    |
//! | list id of `XListElement` | `INTEGER NOT NULL`, indexed                   |
//!
//! Nullable fields drop `NOT NULL`. Every table gets an
//! `id INTEGER PRIMARY KEY AUTOINCREMENT` column, so a field named `id` is
//! stored as `id_1`. Two classes sharing a table name, or two fields sharing
//! a column name, are rejected before any SQL runs.
//!
//! # Custom prefix
//!
//! Prefixes must contain only alphanumeric characters and underscores.
//! This enables multiple isolated model sets (e.g., `prod_`, `test_`)
//! within the same SQLite database.

use std::collections::{HashMap, HashSet};

use xsd_model_core::{FieldKind, FieldSpec, Model, RESERVED_SUFFIX, ScalarType, to_snake_case};

use crate::error::{Result, SqliteError};

/// Validates that a table prefix contains only alphanumeric characters and underscores.
pub(crate) fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Err(SqliteError::InvalidPrefix(prefix.to_string()));
    }
    if !prefix.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(SqliteError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}

/// Primary key column present in every table.
const PRIMARY_KEY: &str = "id";

/// Rejects class and field names that cannot be used as bare identifiers,
/// classes that map to the same table, and fields that map to the same
/// column.
pub(crate) fn validate_models(models: &[Model]) -> Result<()> {
    let is_identifier = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_');
    let mut tables: HashMap<String, &str> = HashMap::new();
    for model in models {
        if !is_identifier(&model.class_name) {
            return Err(SqliteError::InvalidModel(format!(
                "class name '{}' is not a valid table name",
                model.class_name
            )));
        }
        if let Some(field) = model.fields.iter().find(|f| !is_identifier(&f.name)) {
            return Err(SqliteError::InvalidModel(format!(
                "field '{}' of {} is not a valid column name",
                field.name, model.class_name
            )));
        }

        let table = to_snake_case(&model.class_name);
        if let Some(first) = tables.insert(table.clone(), &model.class_name) {
            return Err(SqliteError::InvalidModel(format!(
                "classes {first} and {} both map to table '{table}'",
                model.class_name
            )));
        }

        let mut columns: HashMap<String, &str> = HashMap::new();
        columns.insert(PRIMARY_KEY.to_string(), PRIMARY_KEY);
        for field in &model.fields {
            let column = column_name(field);
            if let Some(first) = columns.insert(column.clone(), &field.name) {
                return Err(SqliteError::InvalidModel(format!(
                    "fields '{first}' and '{}' of {} both map to column '{column}'",
                    field.name, model.class_name
                )));
            }
        }
    }
    Ok(())
}

/// Table name of a class under `prefix`.
///
/// # Examples
///
/// ```
/// use xsd_model_sqlite::table_name;
///
/// assert_eq!(table_name("pk_", "TmSetListElement"), "pk_tm_set_list_element");
/// ```
pub fn table_name(prefix: &str, class_name: &str) -> String {
    format!("{prefix}{}", to_snake_case(class_name))
}

/// Column name of a field.
///
/// Reference columns get an `_id` suffix and a field named `id` is escaped
/// so it cannot shadow the primary key.
///
/// # Examples
///
/// ```
/// use xsd_model_core::{FieldSpec, ScalarType};
/// use xsd_model_sqlite::column_name;
///
/// assert_eq!(column_name(&FieldSpec::reference("move", "Move")), "move_id");
/// assert_eq!(column_name(&FieldSpec::scalar("id", ScalarType::integer())), "id_1");
/// ```
pub fn column_name(field: &FieldSpec) -> String {
    match field.kind {
        FieldKind::Reference { .. } => format!("{}_id", field.name),
        _ if field.name == PRIMARY_KEY => format!("{PRIMARY_KEY}{RESERVED_SUFFIX}"),
        _ => field.name.clone(),
    }
}

fn not_null(field: &FieldSpec) -> &'static str {
    if field.nullable { "" } else { " NOT NULL" }
}

fn column_sql(prefix: &str, field: &FieldSpec, known: &HashSet<&str>) -> String {
    let column = column_name(field);
    match &field.kind {
        FieldKind::Scalar { scalar } => match scalar {
            ScalarType::String { max_length } => format!(
                "\"{column}\" TEXT{} CHECK (length(\"{column}\") <= {max_length})",
                not_null(field)
            ),
            ScalarType::Integer { default: Some(d) } => {
                format!("\"{column}\" INTEGER{} DEFAULT {d}", not_null(field))
            }
            ScalarType::Integer { default: None } => {
                format!("\"{column}\" INTEGER{}", not_null(field))
            }
            ScalarType::DateTime => format!("\"{column}\" TEXT{}", not_null(field)),
        },
        FieldKind::Reference { target } if known.contains(target.as_str()) => format!(
            "\"{column}\" INTEGER{} REFERENCES \"{}\"(id) ON DELETE CASCADE",
            not_null(field),
            table_name(prefix, target)
        ),
        // Target absent from the model set: keep the column, drop the constraint.
        FieldKind::Reference { .. } | FieldKind::ForeignList { .. } => {
            format!("\"{column}\" INTEGER{}", not_null(field))
        }
    }
}

/// Columns that get an index: relation columns and list ids.
fn indexed_columns(model: &Model) -> Vec<String> {
    model
        .fields
        .iter()
        .filter(|f| {
            f.target().is_some()
                || (model.is_list_element() && f.name == xsd_model_core::LIST_ID_FIELD)
        })
        .map(column_name)
        .collect()
}

/// Generates the `CREATE TABLE` and `CREATE INDEX` statements for one model.
pub fn generate_table_sql(prefix: &str, model: &Model, known: &HashSet<&str>) -> String {
    let table = table_name(prefix, &model.class_name);
    let mut columns = vec![format!("\"{PRIMARY_KEY}\" INTEGER PRIMARY KEY AUTOINCREMENT")];
    columns.extend(model.fields.iter().map(|f| column_sql(prefix, f, known)));

    let mut sql = format!(
        "CREATE TABLE IF NOT EXISTS \"{table}\" (\n    {}\n);\n",
        columns.join(",\n    ")
    );
    for column in indexed_columns(model) {
        sql.push_str(&format!(
            "CREATE INDEX IF NOT EXISTS \"idx_{table}_{column}\" ON \"{table}\"(\"{column}\");\n"
        ));
    }
    sql
}

/// Generates the complete SQL schema for all models with the given prefix.
///
/// Tables are created in model order.
///
/// # Errors
///
/// Returns [`SqliteError::InvalidPrefix`] if the prefix contains characters
/// other than alphanumerics and underscores, or if it is empty, and
/// [`SqliteError::InvalidModel`] if a class or field name is not a plain
/// identifier, two classes share a table, or two fields share a column.
///
/// # Examples
///
/// ```
/// use xsd_model_core::{FieldSpec, Model};
/// use xsd_model_sqlite::generate_schema_sql;
///
/// let models = vec![
///     Model::enumeration("Type"),
///     Model::record("Move").with_field(FieldSpec::reference("type", "Type")),
/// ];
/// let sql = generate_schema_sql("pk_", &models).unwrap();
/// assert!(sql.contains("CREATE TABLE IF NOT EXISTS \"pk_move\""));
/// assert!(sql.contains("REFERENCES \"pk_type\"(id) ON DELETE CASCADE"));
/// ```
pub fn generate_schema_sql(prefix: &str, models: &[Model]) -> Result<String> {
    validate_prefix(prefix)?;
    validate_models(models)?;

    let known: HashSet<&str> = models.iter().map(|m| m.class_name.as_str()).collect();
    let mut sql = String::new();
    for model in models {
        sql.push_str(&generate_table_sql(prefix, model, &known));
        sql.push('\n');
    }
    Ok(sql)
}

/// Generates SQL to drop all model tables in reverse model order.
///
/// # Errors
///
/// Returns [`SqliteError::InvalidPrefix`] if the prefix is invalid.
pub fn generate_drop_sql(prefix: &str, models: &[Model]) -> Result<String> {
    validate_prefix(prefix)?;
    validate_models(models)?;

    let mut sql = String::new();
    for model in models.iter().rev() {
        sql.push_str(&format!(
            "DROP TABLE IF EXISTS \"{}\";\n",
            table_name(prefix, &model.class_name)
        ));
    }
    Ok(sql)
}
