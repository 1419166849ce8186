#![allow(dead_code)]

use std::sync::Mutex;

use anydb::prelude::*;
use anydb::{AnydbError, BoxFuture, QueryResult};
use serde_json::Value as JsonValue;

/// Records every statement it receives and answers with canned rows.
pub struct MockContext {
    rows: Vec<Row>,
    fail_with: Option<String>,
    pub calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MockContext {
    pub fn returning(rows: JsonValue) -> Self {
        Self {
            rows: serde_json::from_value(rows).unwrap(),
            fail_with: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            rows: Vec::new(),
            fail_with: Some(message.to_owned()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ConnectionContext for MockContext {
    fn query<'a>(
        &'a self,
        sql: &'a str,
        params: &'a [Value],
    ) -> BoxFuture<'a, anydb::Result<QueryResult>> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_owned(), params.to_vec()));
        let result = match &self.fail_with {
            Some(message) => Err(AnydbError::execution(message.clone())),
            None => Ok(QueryResult::from_rows(self.rows.clone())),
        };
        Box::pin(async move { result })
    }
}

pub struct Blog {
    pub db: Database,
    pub users: Model,
    pub posts: Model,
}

/// An in-memory database with `users` (has many `posts`) and `posts` (has
/// one `author`), tables created but empty.
pub async fn blog() -> Blog {
    let db = Database::connect("sqlite3://:memory:").unwrap();
    let (users, posts) = define_blog(&db);
    users.create().exec().await.unwrap();
    posts.create().exec().await.unwrap();
    Blog { db, users, posts }
}

/// Defines the blog models without touching the database.
pub fn define_blog(db: &Database) -> (Model, Model) {
    let users = db.define(
        ModelConfig::new("users")
            .column(ColumnDef::new("id", "integer").primary_key())
            .column(ColumnDef::new("name", "text").not_null())
            .column(ColumnDef::new("age", "integer"))
            .has_many("posts", "posts"),
    );
    let posts = db.define(
        ModelConfig::new("posts")
            .column(ColumnDef::new("id", "integer").primary_key())
            .column(ColumnDef::new("user_id", "integer"))
            .column(ColumnDef::new("title", "text"))
            .has_one("author", "users"),
    );
    (users, posts)
}

pub async fn seed(blog: &Blog) {
    blog.users
        .insert([("name", Value::from("alice")), ("age", Value::from(30))])
        .values([("name", Value::from("bob")), ("age", Value::from(25))])
        .exec()
        .await
        .unwrap();
    blog.posts
        .insert([("user_id", Value::from(1)), ("title", Value::from("hello"))])
        .values([("user_id", Value::from(1)), ("title", Value::from("again"))])
        .exec()
        .await
        .unwrap();
}

pub fn col(model: &Model, name: &str) -> Column {
    model.column(name).unwrap()
}

pub fn object(value: JsonValue) -> serde_json::Map<String, JsonValue> {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

pub fn as_json(rows: Vec<Row>) -> JsonValue {
    JsonValue::Array(rows.into_iter().map(JsonValue::Object).collect())
}
