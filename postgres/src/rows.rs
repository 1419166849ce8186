//! Statement execution and row decoding on a tokio-postgres client.

use anydb_core::{AnydbError, QueryResult, Result, Row, Value};
use serde_json::Value as JsonValue;
use tokio_postgres::Client;
use tokio_postgres::types::{ToSql, Type};

pub(crate) async fn execute(client: &Client, sql: &str, params: &[Value]) -> Result<QueryResult> {
    let stmt = client.prepare(sql).await.map_err(AnydbError::execution)?;
    let args: Vec<&(dyn ToSql + Sync)> = params
        .iter()
        .map(|param| param as &(dyn ToSql + Sync))
        .collect();

    if stmt.columns().is_empty() {
        let changed = client
            .execute(&stmt, &args)
            .await
            .map_err(AnydbError::execution)?;
        return Ok(QueryResult {
            rows: Vec::new(),
            rows_affected: changed,
            last_insert_id: None,
        });
    }

    let rows = client
        .query(&stmt, &args)
        .await
        .map_err(AnydbError::execution)?;
    let rows = rows.iter().map(decode_row).collect::<Result<Vec<_>>>()?;
    Ok(QueryResult::from_rows(rows))
}

fn decode_row(row: &tokio_postgres::Row) -> Result<Row> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let value = decode_cell(row, index, column.type_()).map_err(|err| {
                AnydbError::execution(format!("column `{}`: {err}", column.name()))
            })?;
            Ok((column.name().to_owned(), value))
        })
        .collect()
}

fn decode_cell(row: &tokio_postgres::Row, index: usize, ty: &Type) -> Result<JsonValue> {
    fn get<'a, T>(row: &'a tokio_postgres::Row, index: usize) -> Result<Option<T>>
    where
        T: tokio_postgres::types::FromSql<'a>,
    {
        row.try_get(index).map_err(AnydbError::execution)
    }

    let value = match *ty {
        Type::BOOL => get::<bool>(row, index)?.map(JsonValue::from),
        Type::INT2 => get::<i16>(row, index)?.map(JsonValue::from),
        Type::INT4 => get::<i32>(row, index)?.map(JsonValue::from),
        Type::INT8 => get::<i64>(row, index)?.map(JsonValue::from),
        Type::OID => get::<u32>(row, index)?.map(JsonValue::from),
        Type::FLOAT4 => get::<f32>(row, index)?.map(JsonValue::from),
        Type::FLOAT8 => get::<f64>(row, index)?.map(JsonValue::from),
        Type::JSON | Type::JSONB => get::<JsonValue>(row, index)?,
        Type::BYTEA => get::<Vec<u8>>(row, index)?.map(JsonValue::from),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            get::<String>(row, index)?.map(JsonValue::from)
        }
        _ => {
            return Err(AnydbError::execution(format!(
                "unsupported column type {ty}; cast it to text"
            )));
        }
    };
    Ok(value.unwrap_or(JsonValue::Null))
}
