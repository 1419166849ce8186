use super::*;
use crate::dialect::Dialect;
use crate::error::AnydbError;
use crate::schema::{ColumnDef, TableDef};

fn users(dialect: Dialect) -> TableDef {
    TableDef::new(
        dialect,
        "users",
        vec![
            ColumnDef::new("id", "integer").primary_key(),
            ColumnDef::new("name", "text").not_null(),
            ColumnDef::new("age", "integer"),
        ],
    )
}

fn col(table: &TableDef, name: &str) -> Column {
    table.column(name).unwrap()
}

fn text(query: &Query) -> String {
    query.to_statement().unwrap().text
}

fn statement_error(query: &Query) -> String {
    match query.to_statement() {
        Err(AnydbError::Statement(message)) => message,
        other => panic!("expected a statement error, got {other:?}"),
    }
}

#[test]
fn default_select_projects_table_star() {
    let users = users(Dialect::SQLite);
    assert_eq!(text(&Query::new(users)), r#"SELECT "users".* FROM "users""#);
}

#[test]
fn select_with_every_clause() {
    let users = users(Dialect::PostgreSQL);
    let query = users
        .select([col(&users, "id"), col(&users, "name")])
        .where_(col(&users, "age").gte(18))
        .order_by(col(&users, "name").desc())
        .limit(10)
        .offset(20);
    let statement = query.to_statement().unwrap();
    assert_eq!(
        statement.text,
        r#"SELECT "users"."id", "users"."name" FROM "users" WHERE "users"."age" >= $1 ORDER BY "users"."name" DESC LIMIT 10 OFFSET 20"#
    );
    assert_eq!(statement.params, vec![Value::Integer(18)]);
}

#[test]
fn sqlite_offset_without_limit() {
    let users = users(Dialect::SQLite);
    assert_eq!(
        text(&Query::new(users).offset(5)),
        r#"SELECT "users".* FROM "users" LIMIT -1 OFFSET 5"#
    );
}

#[test]
fn repeated_where_is_anded() {
    let users = users(Dialect::SQLite);
    let query = users
        .where_(col(&users, "id").eq(1))
        .where_(col(&users, "name").eq("a"));
    assert_eq!(
        text(&query),
        r#"SELECT "users".* FROM "users" WHERE ("users"."id" = ? AND "users"."name" = ?)"#
    );
}

#[test]
fn chains_never_mutate_their_parent() {
    let users = users(Dialect::SQLite);
    let base = users.select(col(&users, "id"));
    let filtered = base.where_(col(&users, "id").eq(7));

    assert_eq!(text(&base), r#"SELECT "users"."id" FROM "users""#);
    assert_eq!(
        text(&filtered),
        r#"SELECT "users"."id" FROM "users" WHERE "users"."id" = ?"#
    );
    // rendering twice yields the same statement
    assert_eq!(filtered.to_statement().unwrap(), filtered.to_statement().unwrap());
}

#[test]
fn distinct_and_group_by() {
    let users = users(Dialect::SQLite);
    let name = col(&users, "name");
    assert_eq!(
        text(&users.select(&name).distinct()),
        r#"SELECT DISTINCT "users"."name" FROM "users""#
    );
    assert_eq!(
        text(
            &users
                .select([name.clone(), col(&users, "id").count()])
                .group_by(&name)
        ),
        r#"SELECT "users"."name", COUNT("users"."id") AS "id_count" FROM "users" GROUP BY "users"."name""#
    );
}

#[test]
fn select_from_join_defaults_to_star() {
    let users = users(Dialect::SQLite);
    let friend = users.as_("users.friend");
    let query = users.from(
        users
            .left_join(&friend)
            .on(col(&friend, "id").eq(col(&users, "age"))),
    );
    assert_eq!(
        text(&query),
        r#"SELECT * FROM "users" LEFT JOIN "users" AS "users.friend" ON "users.friend"."id" = "users"."age""#
    );
}

#[test]
fn multi_row_insert() {
    let users = users(Dialect::SQLite);
    let query = users
        .insert([("name", Value::from("a")), ("age", Value::from(1))])
        .values([("name", Value::from("b")), ("age", Value::from(2))]);
    let statement = query.to_statement().unwrap();
    assert_eq!(
        statement.text,
        r#"INSERT INTO "users" ("name", "age") VALUES (?, ?), (?, ?)"#
    );
    assert_eq!(
        statement.params,
        vec![
            Value::from("a"),
            Value::Integer(1),
            Value::from("b"),
            Value::Integer(2)
        ]
    );
}

#[test]
fn insert_returning_on_postgres() {
    let users = users(Dialect::PostgreSQL);
    let query = users
        .insert([("name", "a")])
        .returning(col(&users, "id"));
    assert_eq!(
        text(&query),
        r#"INSERT INTO "users" ("name") VALUES ($1) RETURNING "id""#
    );
}

#[test]
fn insert_rejects_unknown_and_mismatched_columns() {
    let users = users(Dialect::SQLite);
    let unknown = users.insert([("nickname", "x")]);
    assert!(statement_error(&unknown).contains("nickname"));

    let mismatched = users.insert([("name", "a")]).values([("age", 3)]);
    assert!(statement_error(&mismatched).contains("same columns"));
}

#[test]
fn update_carries_the_where_clause() {
    let users = users(Dialect::SQLite);
    let query = users
        .where_(col(&users, "id").eq(1))
        .update([("name", "x")]);
    let statement = query.to_statement().unwrap();
    assert_eq!(
        statement.text,
        r#"UPDATE "users" SET "name" = ? WHERE "users"."id" = ?"#
    );
    assert_eq!(statement.params, vec![Value::from("x"), Value::Integer(1)]);
}

#[test]
fn update_requires_assignments() {
    let users = users(Dialect::SQLite);
    assert!(statement_error(&users.update(Values::new())).contains("at least one column"));
}

#[test]
fn delete_with_where() {
    let users = users(Dialect::SQLite);
    assert_eq!(
        text(&users.delete().where_(col(&users, "id").eq(3))),
        r#"DELETE FROM "users" WHERE "users"."id" = ?"#
    );
}

#[test]
fn create_and_drop_table() {
    let users = users(Dialect::SQLite);
    assert_eq!(
        text(&users.create().if_not_exists()),
        r#"CREATE TABLE IF NOT EXISTS "users" ("id" INTEGER PRIMARY KEY, "name" TEXT NOT NULL, "age" INTEGER)"#
    );
    assert_eq!(text(&users.drop().if_exists()), r#"DROP TABLE IF EXISTS "users""#);
}

#[test]
fn composite_primary_key_becomes_table_constraint() {
    let memberships = TableDef::new(
        Dialect::SQLite,
        "memberships",
        vec![
            ColumnDef::new("user_id", "integer").primary_key(),
            ColumnDef::new("group_id", "integer").primary_key(),
        ],
    );
    assert_eq!(
        text(&memberships.create()),
        r#"CREATE TABLE "memberships" ("user_id" INTEGER, "group_id" INTEGER, PRIMARY KEY ("user_id", "group_id"))"#
    );
}

#[test]
fn where_on_create_is_reported() {
    let users = users(Dialect::SQLite);
    let query = users.create().where_(col(&users, "id").eq(1));
    assert_eq!(statement_error(&query), "WHERE is not valid for CREATE TABLE");
}

#[test]
fn alter_table_actions() {
    let users = users(Dialect::SQLite);
    assert_eq!(
        text(&users.alter().add_column(ColumnDef::new("email", "text").unique())),
        r#"ALTER TABLE "users" ADD COLUMN "email" TEXT UNIQUE"#
    );
    assert_eq!(
        text(&users.alter().rename_column("name", "full_name")),
        r#"ALTER TABLE "users" RENAME COLUMN "name" TO "full_name""#
    );
    assert!(statement_error(&users.alter()).contains("requires an action"));
    assert!(
        statement_error(&users.alter().drop_column("age").rename("people")).contains("single action")
    );

    let pg = self::users(Dialect::PostgreSQL);
    assert_eq!(
        text(
            &pg.alter()
                .add_column(ColumnDef::new("email", "text"))
                .drop_column("age")
        ),
        r#"ALTER TABLE "users" ADD COLUMN "email" TEXT, DROP COLUMN "age""#
    );
}

#[test]
fn index_listing_per_dialect() {
    assert_eq!(
        text(&users(Dialect::SQLite).indexes()),
        r#"PRAGMA index_list("users")"#
    );

    let statement = users(Dialect::PostgreSQL).indexes().to_statement().unwrap();
    assert_eq!(
        statement.text,
        "SELECT indexname FROM pg_indexes WHERE tablename = $1"
    );
    assert_eq!(statement.params, vec![Value::from("users")]);

    assert_eq!(
        text(&users(Dialect::MySQL).indexes()),
        "SHOW INDEX FROM `users`"
    );
}

#[test]
fn create_and_drop_index() {
    let users = users(Dialect::SQLite);
    assert_eq!(
        text(
            &users
                .indexes()
                .create_index(IndexDef::on(["name", "age"]).unique())
        ),
        r#"CREATE UNIQUE INDEX "users_name_age" ON "users" ("name", "age")"#
    );
    assert_eq!(
        text(&users.indexes().drop_index("users_name_age").if_exists()),
        r#"DROP INDEX IF EXISTS "users_name_age""#
    );
}
