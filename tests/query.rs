#![cfg(feature = "sqlite")]

use anydb::prelude::*;
use anydb::{AnydbError, IntoExtQuery};
use common::{MockContext, as_json, blog, col, define_blog, object, seed};
use serde_json::json;

mod common;

#[tokio::test]
async fn test_exec_within_normalizes_rows() {
    let db = Database::connect("sqlite3:").unwrap();
    let (users, _posts) = define_blog(&db);
    let ctx = MockContext::returning(json!([
        {"users.id##": 1, "users.name": "alice", "users.posts[].id##": null, "users.posts[].title": null}
    ]));

    let rows = users.select_deep([&users]).unwrap().exec_within(&ctx).await.unwrap();
    assert_eq!(
        as_json(rows),
        json!([{"users": {"id": 1, "name": "alice", "posts": []}}])
    );
}

#[tokio::test]
async fn test_exec_raw_returns_rows_untouched() {
    let db = Database::connect("sqlite3:").unwrap();
    let (users, _posts) = define_blog(&db);
    let ctx = MockContext::returning(json!([{"users.id##": 1}]));

    let result = users.select(col(&users, "id")).exec_raw(&ctx).await.unwrap();
    assert_eq!(result.rows[0], object(json!({"users.id##": 1})));
}

#[tokio::test]
async fn test_each_exec_renders_and_runs_again() {
    let db = Database::connect("sqlite3:").unwrap();
    let (users, _posts) = define_blog(&db);
    let ctx = MockContext::returning(json!([]));
    let query = users.where_(col(&users, "id").eq(3));

    query.exec_within(&ctx).await.unwrap();
    query.exec_within(&ctx).await.unwrap();

    let calls = ctx.calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], calls[1]);
    assert_eq!(calls[0].1, vec![Value::Integer(3)]);
}

#[tokio::test]
async fn test_errors_carry_statement_and_params() {
    let db = Database::connect("sqlite3:").unwrap();
    let (users, _posts) = define_blog(&db);
    let ctx = MockContext::failing("boom");

    let err = users
        .where_(col(&users, "name").eq("alice"))
        .exec_within(&ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, AnydbError::Query { .. }));
    assert_eq!(
        err.to_string(),
        r#"Execution error: boom in query `SELECT "users".* FROM "users" WHERE "users"."name" = ?` with params ["alice"]"#
    );
}

#[tokio::test]
async fn test_render_errors_never_reach_the_context() {
    let db = Database::connect("sqlite3:").unwrap();
    let (users, _posts) = define_blog(&db);
    let ctx = MockContext::returning(json!([]));

    let err = users
        .update(Values::new())
        .exec_within(&ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, AnydbError::Statement(_)));
    assert_eq!(ctx.call_count(), 0);
}

#[test]
fn test_builder_chain_is_immutable() {
    let db = Database::connect("sqlite3:").unwrap();
    let (users, _posts) = define_blog(&db);

    let base = users.select(col(&users, "name"));
    let limited = base.limit(1);
    assert_eq!(
        base.to_statement().unwrap().text,
        r#"SELECT "users"."name" FROM "users""#
    );
    assert_eq!(
        limited.to_statement().unwrap().text,
        r#"SELECT "users"."name" FROM "users" LIMIT 1"#
    );
}

#[test]
fn test_extended_queries_are_not_rewrapped() {
    let db = Database::connect("sqlite3:").unwrap();
    let (users, _posts) = define_blog(&db);
    let owner = users.select(col(&users, "id"));
    let query = users.delete();

    let wrapped = query.clone().into_ext_query(&owner);
    assert_eq!(
        wrapped.to_statement().unwrap(),
        query.to_statement().unwrap()
    );
    let plain = query.into_query().into_ext_query(&owner);
    assert_eq!(plain.to_statement().unwrap().text, r#"DELETE FROM "users""#);
}

#[tokio::test]
async fn test_all_and_get() {
    let blog = blog().await;
    seed(&blog).await;
    let users = &blog.users;

    let rows = users
        .select(users.columns())
        .order_by(col(users, "id"))
        .all()
        .await
        .unwrap();
    assert_eq!(
        as_json(rows),
        json!([
            {"id": 1, "name": "alice", "age": 30},
            {"id": 2, "name": "bob", "age": 25},
        ])
    );

    let first = users
        .select(col(users, "name"))
        .where_(col(users, "age").lt(30))
        .get()
        .await
        .unwrap();
    assert_eq!(first, Some(object(json!({"name": "bob"}))));

    let none = users
        .select(col(users, "name"))
        .where_(col(users, "age").gt(99))
        .get()
        .await
        .unwrap();
    assert_eq!(none, None);
}

#[tokio::test]
async fn test_all_object_shapes() {
    let blog = blog().await;
    seed(&blog).await;
    let users = &blog.users;

    let names = users
        .select([col(users, "id"), col(users, "name")])
        .all_object("id", Mapper::Default)
        .await
        .unwrap();
    assert_eq!(names, object(json!({"1": "alice", "2": "bob"})));

    let rows = users
        .select(users.columns())
        .all_object("id", ["name", "age"])
        .await
        .unwrap();
    assert_eq!(
        rows,
        object(json!({"1": {"name": "alice", "age": 30}, "2": {"name": "bob", "age": 25}}))
    );

    let ages = users
        .select(users.columns())
        .all_object_filtered("name", "age", |row| row["age"].as_i64() > Some(26))
        .await
        .unwrap();
    assert_eq!(ages, object(json!({"alice": 30})));
}

#[tokio::test]
async fn test_all_object_duplicate_keys_last_wins() {
    let blog = blog().await;
    seed(&blog).await;
    let posts = &blog.posts;

    let latest = posts
        .select([col(posts, "user_id"), col(posts, "title")])
        .order_by(col(posts, "id"))
        .all_object("user_id", Mapper::Default)
        .await
        .unwrap();
    assert_eq!(latest, object(json!({"1": "again"})));
}

#[tokio::test]
async fn test_select_deep_nests_relations() {
    let blog = blog().await;
    seed(&blog).await;
    let users = &blog.users;
    let posts = users.relation("posts").unwrap();

    let rows = users
        .from(
            users
                .left_join(&posts)
                .on(col(&posts, "user_id").eq(&col(users, "id"))),
        )
        .select_deep([users, &posts])
        .unwrap()
        .order_by(col(users, "id"))
        .order_by(col(&posts, "id"))
        .all()
        .await
        .unwrap();

    assert_eq!(
        as_json(rows),
        json!([
            {"users": {"id": 1, "name": "alice", "age": 30, "posts": [{"id": 1, "user_id": 1, "title": "hello"}]}},
            {"users": {"id": 1, "name": "alice", "age": 30, "posts": [{"id": 2, "user_id": 1, "title": "again"}]}},
            {"users": {"id": 2, "name": "bob", "age": 25, "posts": []}},
        ])
    );
}

#[tokio::test]
async fn test_aggregate_projection() {
    let blog = blog().await;
    seed(&blog).await;
    let posts = &blog.posts;

    let counts = posts
        .select_deep([Projection::from(col(posts, "id").count())])
        .unwrap()
        .get()
        .await
        .unwrap();
    assert_eq!(counts, Some(object(json!({"posts": {"id_count": 2}}))));
}

#[tokio::test]
async fn test_concurrent_execs_are_independent() {
    let blog = blog().await;
    seed(&blog).await;
    let users = &blog.users;
    let query = users.select(col(users, "name")).order_by(col(users, "id"));

    let results = futures_util::future::join_all((0..4).map(|_| query.all())).await;
    for rows in results {
        assert_eq!(as_json(rows.unwrap()), json!([{"name": "alice"}, {"name": "bob"}]));
    }
}
