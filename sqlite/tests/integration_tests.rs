//! Integration tests for the xsd-model-sqlite crate.

use std::path::Path;

use rusqlite::Connection;
use xsd_model_compiler::config::CompileConfig;
use xsd_model_compiler::xsd::DocumentSource;
use xsd_model_compiler::{CompileInputs, CompileOptions, ResolutionMode, compile};
use xsd_model_core::{ModelPackage, Target};
use xsd_model_sqlite::{Migration, SqliteError, generate_schema_sql};

/// Compiles the compiler crate's fixture schema set.
fn fixture_package(resolution: ResolutionMode) -> ModelPackage {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../compiler/tests/fixtures/models.yml");
    let mut config = CompileConfig::load(path).unwrap();
    config.resolution = resolution;
    compile(&config.inputs(), &config.options()).package
}

/// Compiles inline documents for the SQLite target.
fn inline_package(enumerations: &[(&str, &str)], schemas: &[(&str, &str)]) -> ModelPackage {
    let sources = |docs: &[(&str, &str)]| {
        docs.iter()
            .map(|(label, content)| DocumentSource::inline(*label, *content))
            .collect::<Vec<_>>()
    };
    let inputs = CompileInputs {
        enumerations: sources(enumerations),
        schemas: sources(schemas),
    };
    let outcome = compile(&inputs, &CompileOptions::for_target(Target::Sqlite));
    assert!(outcome.validation_errors.is_empty(), "{:?}", outcome.validation_errors);
    outcome.package
}

/// Helper to create a migration with tables already created.
fn setup_migration(prefix: &str) -> Migration {
    let conn = Connection::open_in_memory().unwrap();
    let package = fixture_package(ResolutionMode::DependencySorted);
    let mut migration = Migration::from_package(conn, prefix, &package).unwrap();
    migration.up().unwrap();
    migration
}

// =============================================================================
// Full Migration Lifecycle Tests
// =============================================================================

#[test]
fn test_migration_lifecycle() {
    let mut migration = setup_migration("pk_");

    let status = migration.status().unwrap();
    assert!(status.tables_exist());
    assert_eq!(status.tables.len(), 10);
    assert_eq!(status.total_rows(), 0);

    migration.down().unwrap();
    let status = migration.status().unwrap();
    assert_eq!(status.existing_tables(), 0);
}

#[test]
fn test_package_json_round_trip_feeds_migration() {
    let package = fixture_package(ResolutionMode::Ordered);
    let json = serde_json::to_string_pretty(&package).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models.json");
    std::fs::write(&path, json).unwrap();

    let loaded: ModelPackage =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(loaded, package);

    let conn = Connection::open(dir.path().join("pokedex.db")).unwrap();
    let mut migration = Migration::from_package(conn, "pk_", &loaded).unwrap();
    migration.up().unwrap();
    assert!(migration.status().unwrap().tables_exist());
}

// =============================================================================
// Constraint Tests
// =============================================================================

#[test]
fn test_cascade_delete_follows_references() {
    let migration = setup_migration("pk_");
    let conn = migration.connection();

    conn.execute(
        "INSERT INTO pk_move (name, type_1) VALUES ('Tackle', 'Normal')",
        [],
    )
    .unwrap();
    let move_id = conn.last_insert_rowid();

    for sequence in 0..3 {
        conn.execute(
            "INSERT INTO pk_learnset_list_element (list_id, sequence_number, element_id, move_id, method)
             VALUES (1, ?1, 0, ?2, 'level_up')",
            rusqlite::params![sequence, move_id],
        )
        .unwrap();
    }
    assert_eq!(migration.status().unwrap().total_rows(), 4);

    conn.execute("DELETE FROM pk_move WHERE id = ?1", [move_id])
        .unwrap();

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM pk_learnset_list_element", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn test_nullable_columns_accept_null() {
    let migration = setup_migration("pk_");
    let conn = migration.connection();

    conn.execute(
        "INSERT INTO pk_ability (name, description) VALUES ('Overgrow', NULL)",
        [],
    )
    .unwrap();
    assert!(
        conn.execute("INSERT INTO pk_ability (name) VALUES (NULL)", [])
            .is_err()
    );
}

#[test]
fn test_string_length_is_bounded() {
    let migration = setup_migration("pk_");
    let conn = migration.connection();

    let ok = "a".repeat(500);
    let too_long = "a".repeat(501);
    conn.execute("INSERT INTO pk_ability (name) VALUES (?1)", [ok])
        .unwrap();
    assert!(
        conn.execute("INSERT INTO pk_ability (name) VALUES (?1)", [too_long])
            .is_err()
    );
}

// =============================================================================
// Prefix Tests
// =============================================================================

#[test]
fn test_prefix_isolation() {
    let package = fixture_package(ResolutionMode::Ordered);
    let conn = Connection::open_in_memory().unwrap();

    let mut migration_a = Migration::from_package(conn, "a_", &package).unwrap();
    migration_a.up().unwrap();
    migration_a
        .connection()
        .execute("INSERT INTO a_game (name, release_date) VALUES ('Red', '1996-02-27')", [])
        .unwrap();
    let conn = migration_a.into_connection();

    let mut migration_b = Migration::from_package(conn, "b_", &package).unwrap();
    migration_b.up().unwrap();
    assert_eq!(migration_b.status().unwrap().total_rows(), 0);

    migration_b.down().unwrap();
    let conn = migration_b.into_connection();

    let migration_a = Migration::from_package(conn, "a_", &package).unwrap();
    let status = migration_a.status().unwrap();
    assert!(status.tables_exist());
    assert_eq!(status.total_rows(), 1);
}

#[test]
fn test_field_named_id_does_not_shadow_primary_key() {
    let item = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="item">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="id" type="xs:integer"/>
        <xs:element name="name" type="xs:string"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;
    let package = inline_package(&[], &[("item.xsd", item)]);
    assert!(package.find("Item").unwrap().field("id").is_some());

    let conn = Connection::open_in_memory().unwrap();
    let mut migration = Migration::from_package(conn, "pk_", &package).unwrap();
    migration.up().unwrap();

    let conn = migration.connection();
    conn.execute("INSERT INTO pk_item (id_1, name) VALUES (25, 'Potion')", [])
        .unwrap();
    let (id, source_id): (i64, i64) = conn
        .query_row("SELECT id, id_1 FROM pk_item", [], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap();
    assert_eq!(id, 1);
    assert_eq!(source_id, 25);
}

#[test]
fn test_classes_sharing_a_table_are_rejected() {
    let enumeration = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:simpleType name="learn_method">
    <xs:restriction base="xs:string">
      <xs:enumeration value="level_up"/>
    </xs:restriction>
  </xs:simpleType>
</xs:schema>"#;
    let structure = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="learn_method">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="level" type="xs:integer"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;
    let package = inline_package(
        &[("learn_method.xsd", enumeration)],
        &[("learn_method_record.xsd", structure)],
    );
    let names: Vec<&str> = package.models.iter().map(|m| m.class_name.as_str()).collect();
    assert_eq!(names, vec!["Learn_method", "LearnMethod"]);

    let conn = Connection::open_in_memory().unwrap();
    let err = Migration::from_package(conn, "pk_", &package).err().unwrap();
    assert!(matches!(err, SqliteError::InvalidModel(ref msg) if msg.contains("learn_method")));
}

#[test]
fn test_invalid_prefix_rejected() {
    let package = fixture_package(ResolutionMode::Ordered);
    let conn = Connection::open_in_memory().unwrap();
    let err = Migration::from_package(conn, "pk-", &package).err().unwrap();
    assert!(matches!(err, SqliteError::InvalidPrefix(_)));
}

#[test]
fn test_schema_sql_is_deterministic() {
    let package = fixture_package(ResolutionMode::Ordered);
    let first = generate_schema_sql("pk_", &package.models).unwrap();
    let second = generate_schema_sql("pk_", &package.models).unwrap();
    assert_eq!(first, second);
    assert!(first.contains("CREATE TABLE IF NOT EXISTS \"pk_learn_method\""));
}
