#![cfg(feature = "sqlite")]

use anydb::prelude::*;
use anydb::{AnydbError, ModelEvent};
use common::{col, define_blog};
use serde_json::json;

mod common;

fn db() -> Database {
    Database::connect("sqlite3:").unwrap()
}

#[test]
fn test_relation_resolves_to_registered_model() {
    let db = db();
    let (_users, posts) = define_blog(&db);

    let author = posts.relation("author").unwrap();
    let registered = db.model("users").unwrap();
    assert!(author.table().same_table(registered.table()));
    assert_eq!(author.alias(), Some("posts.author"));
}

#[test]
fn test_relation_is_cached_per_instance() {
    let db = db();
    let (users, _posts) = define_blog(&db);

    let first = users.relation("posts").unwrap();
    let second = users.relation("posts").unwrap();
    assert!(first.ptr_eq(&second));

    // another instance resolves on its own
    let other = users.as_("u");
    assert!(!other.relation("posts").unwrap().ptr_eq(&first));
}

#[test]
fn test_many_relation_alias_ends_with_brackets() {
    let db = db();
    let (users, _posts) = define_blog(&db);
    let posts = users.relation("posts").unwrap();
    assert_eq!(posts.display_name(), "users.posts[]");
    assert!(posts.display_name().ends_with("[]"));
}

#[test]
fn test_forward_reference_needs_target_by_first_access() {
    let db = db();
    let comments = db.define(
        ModelConfig::new("comments")
            .column(ColumnDef::new("id", "integer").primary_key())
            .has_one("thread", "threads"),
    );

    match comments.relation("thread") {
        Err(AnydbError::ReferenceNotFound { model, relation }) => {
            assert_eq!(model, "comments");
            assert_eq!(relation, "thread");
        }
        other => panic!("expected ReferenceNotFound, got {other:?}"),
    }

    db.define(ModelConfig::new("threads").column(ColumnDef::new("id", "integer").primary_key()));
    let thread = comments.relation("thread").unwrap();
    assert_eq!(thread.name(), "threads");
    assert_eq!(thread.display_name(), "comments.thread");
}

#[test]
fn test_direct_model_reference() {
    let db = db();
    let tags = db.define(ModelConfig::new("tags").column(ColumnDef::new("id", "integer").primary_key()));
    let articles = db.define(
        ModelConfig::new("articles")
            .column(ColumnDef::new("id", "integer").primary_key())
            .has_many("tags", &tags),
    );
    let related = articles.relation("tags").unwrap();
    assert!(related.table().same_table(tags.table()));
    assert_eq!(related.display_name(), "articles.tags[]");
}

#[test]
fn test_unknown_relation() {
    let db = db();
    let (users, _posts) = define_blog(&db);
    assert!(matches!(
        users.relation("friends"),
        Err(AnydbError::UnknownRelation { .. })
    ));
}

#[test]
fn test_first_access_wins_after_redefinition() {
    let db = db();
    let (_users, posts) = define_blog(&db);
    let before = posts.relation("author").unwrap();

    db.define(ModelConfig::new("users").column(ColumnDef::new("uid", "integer").primary_key()));
    let after = posts.relation("author").unwrap();
    assert!(after.ptr_eq(&before));
    assert!(after.column("name").is_some());
}

#[test]
fn test_alias_keeps_relations() {
    let db = db();
    let (users, _posts) = define_blog(&db);
    let friend = users.as_("friend");

    assert_eq!(friend.name(), "users");
    assert_eq!(friend.display_name(), "friend");
    assert_eq!(friend.relation_names().collect::<Vec<_>>(), ["posts"]);
    assert_eq!(friend.relation("posts").unwrap().display_name(), "friend.posts[]");
}

#[test]
fn test_nested_relations_compose_aliases() {
    let db = db();
    let (users, _posts) = define_blog(&db);
    let author = users.relation("posts").unwrap().relation("author").unwrap();
    assert_eq!(author.display_name(), "users.posts[].author");
}

#[test]
fn test_builder_operations_return_extended_queries() {
    let db = db();
    let (users, _posts) = define_blog(&db);

    let query = users
        .select(col(&users, "name"))
        .where_(col(&users, "age").gt(18))
        .order_by(col(&users, "name").asc())
        .limit(5);
    let statement = query.to_statement().unwrap();
    assert_eq!(
        statement.text,
        r#"SELECT "users"."name" FROM "users" WHERE "users"."age" > ? ORDER BY "users"."name" ASC LIMIT 5"#
    );
    assert_eq!(statement.params, vec![Value::Integer(18)]);

    assert_eq!(
        users.delete().where_(col(&users, "id").eq(1)).to_statement().unwrap().text,
        r#"DELETE FROM "users" WHERE "users"."id" = ?"#
    );
    assert_eq!(
        users.indexes().to_statement().unwrap().text,
        r#"PRAGMA index_list("users")"#
    );
}

#[test]
fn test_relation_alias_joins() {
    let db = db();
    let (users, _posts) = define_blog(&db);
    let posts = users.relation("posts").unwrap();

    let query = users.from(
        users
            .left_join(&posts)
            .on(col(&posts, "user_id").eq(&col(&users, "id"))),
    );
    assert_eq!(
        query.to_statement().unwrap().text,
        r#"SELECT * FROM "users" LEFT JOIN "posts" AS "users.posts[]" ON "users.posts[]"."user_id" = "users"."id""#
    );
}

#[tokio::test]
async fn test_event_channel_is_per_instance() {
    let db = db();
    let (users, _posts) = define_blog(&db);
    let mut rx = users.subscribe();

    assert_eq!(users.emit("saved", json!({"id": 1})), 1);
    assert_eq!(
        rx.recv().await.unwrap(),
        ModelEvent {
            name: "saved".into(),
            payload: json!({"id": 1}),
        }
    );

    // an alias has its own channel
    assert_eq!(users.as_("u").emit("saved", json!(null)), 0);
    assert!(rx.try_recv().is_err());
}
