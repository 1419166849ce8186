#![cfg(feature = "sqlite")]

use anydb::prelude::*;
use anydb::{AnydbError, all_of, column_name};
use common::{col, define_blog};

mod common;

fn aliases(columns: &[Column]) -> Vec<String> {
    columns
        .iter()
        .map(|c| c.alias().unwrap_or_default().to_owned())
        .collect()
}

#[test]
fn test_all_of_model_in_declaration_order() {
    let db = Database::connect("sqlite3:").unwrap();
    let (users, _posts) = define_blog(&db);

    let columns = db.all_of([&users]).unwrap();
    assert_eq!(columns.len(), users.columns().len());
    assert_eq!(aliases(&columns), ["users.id##", "users.name", "users.age"]);
}

#[test]
fn test_all_of_uses_aliases_and_concatenates() {
    let db = Database::connect("sqlite3:").unwrap();
    let (users, _posts) = define_blog(&db);
    let posts = users.relation("posts").unwrap();

    let columns = all_of([&users, &posts]).unwrap();
    assert_eq!(
        aliases(&columns),
        [
            "users.id##",
            "users.name",
            "users.age",
            "users.posts[].id##",
            "users.posts[].user_id",
            "users.posts[].title",
        ]
    );
}

#[test]
fn test_all_of_aggregate_column() {
    let db = Database::connect("sqlite3:").unwrap();
    let (users, posts) = define_blog(&db);

    let columns = all_of([
        Projection::from(&users),
        Projection::from(col(&posts, "id").count()),
    ])
    .unwrap();
    assert_eq!(columns.len(), 4);
    assert_eq!(columns[3].alias(), Some("posts.id_count"));
    assert_eq!(
        columns[3].projection().build(db.dialect()).text,
        r#"COUNT("posts"."id") AS "posts.id_count""#
    );
}

#[test]
fn test_all_of_rejects_plain_columns() {
    let db = Database::connect("sqlite3:").unwrap();
    let (users, _posts) = define_blog(&db);

    let err = all_of([col(&users, "name")]).unwrap_err();
    assert!(matches!(err, AnydbError::UnsupportedProjection(_)));
    assert!(err.to_string().contains("users.name"));
}

#[test]
fn test_column_name_marks_primary_keys() {
    let db = Database::connect("sqlite3:").unwrap();
    let (users, _posts) = define_blog(&db);
    assert_eq!(column_name(&col(&users, "id")), "id##");
    assert_eq!(column_name(&col(&users, "age")), "age");
    assert_eq!(column_name(&col(&users, "age").as_("years")), "years");
}

#[test]
fn test_select_deep_renders_aliased_projection() {
    let db = Database::connect("sqlite3:").unwrap();
    let (users, _posts) = define_blog(&db);

    let statement = users.select_deep([&users]).unwrap().to_statement().unwrap();
    assert_eq!(
        statement.text,
        r#"SELECT "users"."id" AS "users.id##", "users"."name" AS "users.name", "users"."age" AS "users.age" FROM "users""#
    );
}
