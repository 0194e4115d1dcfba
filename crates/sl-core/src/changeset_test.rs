use super::*;

fn sample() -> Changeset {
    let mut builder = ChangesetBuilder::new(ChangesetId::new("jane", "1", "001.sql"), "1.0");
    builder.add_change("CREATE TABLE users (");
    builder.add_change("id INT");
    builder.add_change(");");
    builder.add_rollback("DROP TABLE users;");
    builder.add_description("Create the users table");
    builder.add_description("with a single column");
    builder.build()
}

#[test]
fn test_identity_display() {
    let id = ChangesetId::new("jane", "7", "core.sql");
    assert_eq!(id.to_string(), "jane:7:core.sql");
    assert_eq!(id.short(), "jane:7");
}

#[test]
fn test_bodies_are_newline_joined() {
    let cs = sample();
    assert_eq!(cs.changes(), "CREATE TABLE users (\nid INT\n);");
    assert_eq!(cs.rollbacks(), "DROP TABLE users;");
    assert_eq!(
        cs.description(),
        "Create the users table\nwith a single column"
    );
    assert_eq!(cs.version(), "1.0");
}

#[test]
fn test_checksum_covers_forward_body_only() {
    let cs = sample();
    assert_eq!(cs.checksum(), compute_checksum(&cs.changes()));

    let mut other = ChangesetBuilder::new(ChangesetId::new("jane", "1", "001.sql"), "2.0");
    other.add_change("CREATE TABLE users (");
    other.add_change("id INT");
    other.add_change(");");
    other.add_rollback("TRUNCATE users;");
    let other = other.build();

    assert_eq!(cs.checksum(), other.checksum());
}

#[test]
fn test_empty_description_is_empty_string() {
    let cs = ChangesetBuilder::new(ChangesetId::new("a", "1", "memory"), "1.0").build();
    assert_eq!(cs.description(), "");
    assert!(cs.change_statements().is_empty());
    assert!(cs.rollback_statements().is_empty());
}

#[test]
fn test_split_statements_skips_blank_fragments() {
    let stmts = split_statements("CREATE TABLE a (id INT);\n;  ;\nINSERT INTO a VALUES (1);\n");
    assert_eq!(
        stmts,
        vec![
            "CREATE TABLE a (id INT)".to_string(),
            "INSERT INTO a VALUES (1)".to_string()
        ]
    );
}

#[test]
fn test_change_statements_span_lines() {
    let cs = sample();
    assert_eq!(cs.change_statements(), vec!["CREATE TABLE users (\nid INT\n)"]);
    assert_eq!(cs.rollback_statements(), vec!["DROP TABLE users"]);
}
