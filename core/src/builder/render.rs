use super::{AlterAction, IndexAction, IndexDef, QueryKind, SelectParts, Values};
use crate::dialect::Dialect;
use crate::error::{AnydbError, Result};
use crate::expressions::Condition;
use crate::schema::{Column, Source, TableDef};
use crate::sql::{Sql, SqlChunk, Token};

pub(super) fn render(table: &TableDef, kind: &QueryKind) -> Result<Sql> {
    match kind {
        QueryKind::Select(parts) => Ok(select(table, parts)),
        QueryKind::Insert { rows, returning } => insert(table, rows, returning),
        QueryKind::Update {
            values,
            filter,
            returning,
        } => update(table, values, filter.as_ref(), returning),
        QueryKind::Delete { filter, returning } => Ok(delete(table, filter.as_ref(), returning)),
        QueryKind::Create { if_not_exists } => create(table, *if_not_exists),
        QueryKind::Drop { if_exists } => Ok(drop(table, *if_exists)),
        QueryKind::Alter(actions) => alter(table, actions),
        QueryKind::Indexes(action) => indexes(table, action),
    }
}

fn statement_error(message: impl Into<String>) -> AnydbError {
    AnydbError::Statement(message.into())
}

fn comma_list<'a>(items: impl IntoIterator<Item = &'a str>) -> Sql {
    Sql::join(items.into_iter().map(Sql::ident), Token::COMMA)
}

fn where_clause(sql: &mut Sql, filter: Option<&Condition>) {
    if let Some(filter) = filter {
        sql.push_mut(Token::WHERE);
        sql.append_mut(filter.to_sql());
    }
}

fn returning_clause(sql: &mut Sql, returning: &[Column]) {
    if returning.is_empty() {
        return;
    }
    sql.push_mut(Token::RETURNING);
    sql.append_mut(Sql::join(
        returning.iter().map(|c| {
            let bare = c.bare();
            match c.alias() {
                Some(alias) => bare.alias(alias),
                None => bare,
            }
        }),
        Token::COMMA,
    ));
}

fn check_columns<'a>(
    table: &TableDef,
    statement: &str,
    columns: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    if table.column_defs().is_empty() {
        return Ok(());
    }
    for column in columns {
        if !table.column_defs().iter().any(|c| c.name == column) {
            return Err(statement_error(format!(
                "unknown column `{column}` in {statement} on `{}`",
                table.name()
            )));
        }
    }
    Ok(())
}

fn select(table: &TableDef, parts: &SelectParts) -> Sql {
    let source = parts
        .from
        .clone()
        .unwrap_or_else(|| Source::from(table));

    let mut sql = Sql::token(Token::SELECT);
    if parts.distinct {
        sql.push_mut(Token::DISTINCT);
    }
    if parts.columns.is_empty() {
        if source.has_joins() {
            sql.push_mut(Token::STAR);
        } else {
            sql.append_mut(source.base().star().expr());
        }
    } else {
        sql.append_mut(Sql::join(
            parts.columns.iter().map(Column::projection),
            Token::COMMA,
        ));
    }

    sql.push_mut(Token::FROM);
    sql.append_mut(source.to_sql());
    where_clause(&mut sql, parts.filter.as_ref());

    if !parts.group_by.is_empty() {
        sql.push_mut(Token::GROUP);
        sql.push_mut(Token::BY);
        sql.append_mut(Sql::join(
            parts.group_by.iter().map(Column::expr),
            Token::COMMA,
        ));
    }

    if !parts.order_by.is_empty() {
        sql.push_mut(Token::ORDER);
        sql.push_mut(Token::BY);
        sql.append_mut(Sql::join(
            parts.order_by.iter().map(|o| o.to_sql()),
            Token::COMMA,
        ));
    }

    match (parts.limit, parts.offset, table.dialect()) {
        (Some(limit), _, _) => {
            sql.push_mut(Token::LIMIT);
            sql.push_mut(SqlChunk::Number(limit));
        }
        // SQLite and MySQL only accept OFFSET after a LIMIT
        (None, Some(_), Dialect::SQLite) => {
            sql.push_mut(Token::LIMIT);
            sql.push_mut(SqlChunk::Number(-1));
        }
        (None, Some(_), Dialect::MySQL) => {
            sql.push_mut(Token::LIMIT);
            sql.push_mut(SqlChunk::raw("18446744073709551615"));
        }
        _ => {}
    }
    if let Some(offset) = parts.offset {
        sql.push_mut(Token::OFFSET);
        sql.push_mut(SqlChunk::Number(offset));
    }

    sql
}

fn insert(table: &TableDef, rows: &[Values], returning: &[Column]) -> Result<Sql> {
    let Some(first) = rows.first() else {
        return Err(statement_error("INSERT requires at least one row"));
    };
    check_columns(table, "INSERT", first.columns())?;
    if rows[1..].iter().any(|row| !row.columns().eq(first.columns())) {
        return Err(statement_error(
            "every INSERT row must set the same columns in the same order",
        ));
    }

    let mut sql = Sql::token(Token::INSERT)
        .push(Token::INTO)
        .append(Sql::ident(table.name()));

    if first.is_empty() {
        if rows.len() > 1 {
            return Err(statement_error("multi-row INSERT requires columns"));
        }
        match table.dialect() {
            Dialect::MySQL => sql = sql.push(Token::VALUES).push(Token::LPAREN).push(Token::RPAREN),
            Dialect::SQLite | Dialect::PostgreSQL => {
                sql = sql.push(SqlChunk::raw("DEFAULT")).push(Token::VALUES)
            }
        }
    } else {
        sql.append_mut(comma_list(first.columns()).parens());
        sql.push_mut(Token::VALUES);
        sql.append_mut(Sql::join(
            rows.iter()
                .map(|row| Sql::param_list(row.0.iter().map(|(_, v)| v.clone())).parens()),
            Token::COMMA,
        ));
    }

    returning_clause(&mut sql, returning);
    Ok(sql)
}

fn update(
    table: &TableDef,
    values: &Values,
    filter: Option<&Condition>,
    returning: &[Column],
) -> Result<Sql> {
    if values.is_empty() {
        return Err(statement_error("UPDATE requires at least one column"));
    }
    check_columns(table, "UPDATE", values.columns())?;

    let mut sql = Sql::token(Token::UPDATE)
        .append(table.reference())
        .push(Token::SET);
    sql.append_mut(Sql::join(
        values.0.iter().map(|(column, value)| {
            Sql::ident(column)
                .push(Token::EQ)
                .push(SqlChunk::Param(value.clone()))
        }),
        Token::COMMA,
    ));
    where_clause(&mut sql, filter);
    returning_clause(&mut sql, returning);
    Ok(sql)
}

fn delete(table: &TableDef, filter: Option<&Condition>, returning: &[Column]) -> Sql {
    let mut sql = Sql::token(Token::DELETE)
        .push(Token::FROM)
        .append(table.reference());
    where_clause(&mut sql, filter);
    returning_clause(&mut sql, returning);
    sql
}

fn create(table: &TableDef, if_not_exists: bool) -> Result<Sql> {
    let columns = table.column_defs();
    if columns.is_empty() {
        return Err(statement_error(format!(
            "CREATE TABLE `{}` requires at least one column",
            table.name()
        )));
    }

    let mut sql = Sql::token(Token::CREATE).push(Token::TABLE);
    if if_not_exists {
        sql = sql.push(Token::IF).push(Token::NOT).push(Token::EXISTS);
    }
    sql.append_mut(Sql::ident(table.name()));

    let primary_keys: Vec<&str> = columns
        .iter()
        .filter(|c| c.primary_key)
        .map(|c| c.name.as_str())
        .collect();
    let inline_pk = primary_keys.len() == 1;

    let mut body = Sql::join(
        columns.iter().map(|c| c.to_sql(table.dialect(), inline_pk)),
        Token::COMMA,
    );
    if primary_keys.len() > 1 {
        body.push_mut(Token::COMMA);
        body.push_mut(Token::PRIMARY);
        body.push_mut(Token::KEY);
        body.append_mut(comma_list(primary_keys).parens());
    }
    Ok(sql.append(body.parens()))
}

fn drop(table: &TableDef, if_exists: bool) -> Sql {
    let mut sql = Sql::token(Token::DROP).push(Token::TABLE);
    if if_exists {
        sql = sql.push(Token::IF).push(Token::EXISTS);
    }
    sql.append(Sql::ident(table.name()))
}

fn alter(table: &TableDef, actions: &[AlterAction]) -> Result<Sql> {
    if actions.is_empty() {
        return Err(statement_error("ALTER TABLE requires an action"));
    }
    if actions.len() > 1 {
        if table.dialect() == Dialect::SQLite {
            return Err(statement_error(
                "SQLite accepts a single action per ALTER TABLE",
            ));
        }
        if actions
            .iter()
            .any(|a| matches!(a, AlterAction::Rename(_) | AlterAction::RenameColumn(..)))
        {
            return Err(statement_error(
                "a rename cannot be combined with other ALTER TABLE actions",
            ));
        }
    }

    let dialect = table.dialect();
    let rendered = actions.iter().map(|action| match action {
        AlterAction::AddColumn(def) => Sql::token(Token::ADD)
            .push(Token::COLUMN)
            .append(def.to_sql(dialect, true)),
        AlterAction::DropColumn(name) => Sql::token(Token::DROP)
            .push(Token::COLUMN)
            .append(Sql::ident(name)),
        AlterAction::Rename(name) => Sql::token(Token::RENAME)
            .push(Token::TO)
            .append(Sql::ident(name)),
        AlterAction::RenameColumn(from, to) => Sql::token(Token::RENAME)
            .push(Token::COLUMN)
            .append(Sql::ident(from))
            .push(Token::TO)
            .append(Sql::ident(to)),
    });

    Ok(Sql::token(Token::ALTER)
        .push(Token::TABLE)
        .append(Sql::ident(table.name()))
        .append(Sql::join(rendered, Token::COMMA)))
}

fn indexes(table: &TableDef, action: &IndexAction) -> Result<Sql> {
    let dialect = table.dialect();
    match action {
        IndexAction::List => Ok(match dialect {
            Dialect::SQLite => Sql::raw("PRAGMA index_list").append(Sql::ident(table.name()).parens()),
            Dialect::PostgreSQL => Sql::token(Token::SELECT)
                .push(SqlChunk::raw("indexname"))
                .push(Token::FROM)
                .push(SqlChunk::raw("pg_indexes"))
                .push(Token::WHERE)
                .push(SqlChunk::raw("tablename"))
                .push(Token::EQ)
                .append(Sql::param(table.name())),
            Dialect::MySQL => Sql::raw("SHOW")
                .push(Token::INDEX)
                .push(Token::FROM)
                .append(Sql::ident(table.name())),
        }),
        IndexAction::Create(index) => create_index(table, index),
        IndexAction::Drop { name, if_exists } => {
            let mut sql = Sql::token(Token::DROP).push(Token::INDEX);
            if dialect == Dialect::MySQL {
                return Ok(sql
                    .append(Sql::ident(name))
                    .push(Token::ON)
                    .append(Sql::ident(table.name())));
            }
            if *if_exists {
                sql = sql.push(Token::IF).push(Token::EXISTS);
            }
            Ok(sql.append(Sql::ident(name)))
        }
    }
}

fn create_index(table: &TableDef, index: &IndexDef) -> Result<Sql> {
    if index.columns.is_empty() {
        return Err(statement_error("CREATE INDEX requires at least one column"));
    }
    check_columns(table, "CREATE INDEX", index.columns.iter().map(String::as_str))?;

    let mut sql = Sql::token(Token::CREATE);
    if index.unique {
        sql.push_mut(Token::UNIQUE);
    }
    sql.push_mut(Token::INDEX);
    if index.if_not_exists {
        sql = sql.push(Token::IF).push(Token::NOT).push(Token::EXISTS);
    }
    Ok(sql
        .append(Sql::ident(index.name_for(table.name())))
        .push(Token::ON)
        .append(Sql::ident(table.name()))
        .append(comma_list(index.columns.iter().map(String::as_str)).parens()))
}
