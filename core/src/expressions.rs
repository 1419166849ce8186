//! Conditions for WHERE and JOIN ... ON clauses.

use anydb_types::Value;

use crate::schema::Column;
use crate::sql::{Sql, Token};

/// A boolean SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition(Sql);

impl Condition {
    /// Wraps an arbitrary SQL fragment as a condition.
    pub fn raw(sql: Sql) -> Self {
        Condition(sql)
    }

    /// `(self AND other)`
    pub fn and(self, other: Condition) -> Condition {
        and(self, other)
    }

    /// `(self OR other)`
    pub fn or(self, other: Condition) -> Condition {
        or(self, other)
    }

    /// `NOT (self)`
    pub fn not(self) -> Condition {
        not(self)
    }

    pub fn to_sql(&self) -> Sql {
        self.0.clone()
    }

    pub fn into_sql(self) -> Sql {
        self.0
    }
}

/// The right-hand side of a comparison: another column or a bound value.
pub trait IntoOperand {
    fn into_operand(self) -> Sql;
}

impl IntoOperand for &Column {
    fn into_operand(self) -> Sql {
        self.expr()
    }
}

impl IntoOperand for Column {
    fn into_operand(self) -> Sql {
        self.expr()
    }
}

impl IntoOperand for Value {
    fn into_operand(self) -> Sql {
        Sql::param(self)
    }
}

impl<T: Into<Value>> IntoOperand for Option<T> {
    fn into_operand(self) -> Sql {
        Sql::param(Value::from(self))
    }
}

macro_rules! impl_operand_for_values {
    ($($ty:ty),*) => { $(
        impl IntoOperand for $ty {
            #[inline]
            fn into_operand(self) -> Sql {
                Sql::param(self)
            }
        }
    )* }
}

impl_operand_for_values!(
    i8, i16, i32, i64, u8, u16, u32, f32, f64, bool, &str, String, &String, Vec<u8>, &[u8]
);

fn comparison(left: &Column, operator: Token, right: impl IntoOperand) -> Condition {
    Condition(left.expr().push(operator).append(right.into_operand()))
}

/// Create an equality condition (=)
pub fn eq(left: &Column, right: impl IntoOperand) -> Condition {
    comparison(left, Token::EQ, right)
}

/// Create a not-equal condition (<>)
pub fn neq(left: &Column, right: impl IntoOperand) -> Condition {
    comparison(left, Token::NE, right)
}

/// Create a greater-than condition (>)
pub fn gt(left: &Column, right: impl IntoOperand) -> Condition {
    comparison(left, Token::GT, right)
}

/// Create a greater-than-or-equal condition (>=)
pub fn gte(left: &Column, right: impl IntoOperand) -> Condition {
    comparison(left, Token::GE, right)
}

/// Create a less-than condition (<)
pub fn lt(left: &Column, right: impl IntoOperand) -> Condition {
    comparison(left, Token::LT, right)
}

/// Create a less-than-or-equal condition (<=)
pub fn lte(left: &Column, right: impl IntoOperand) -> Condition {
    comparison(left, Token::LE, right)
}

/// Create a LIKE condition
pub fn like(left: &Column, pattern: impl Into<Value>) -> Condition {
    Condition(left.expr().push(Token::LIKE).append(Sql::param(pattern)))
}

/// Create an IS NULL condition
pub fn is_null(column: &Column) -> Condition {
    Condition(column.expr().push(Token::IS).push(Token::NULL))
}

/// Create an IS NOT NULL condition
pub fn is_not_null(column: &Column) -> Condition {
    Condition(
        column
            .expr()
            .push(Token::IS)
            .push(Token::NOT)
            .push(Token::NULL),
    )
}

/// Create an IN condition. An empty list matches nothing.
pub fn in_list<I>(column: &Column, values: I) -> Condition
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    let list = Sql::param_list(values);
    if list.is_empty() {
        return Condition(Sql::raw("1 = 0"));
    }
    Condition(column.expr().push(Token::IN).append(list.parens()))
}

/// `(left AND right)`
pub fn and(left: Condition, right: Condition) -> Condition {
    Condition(left.0.push(Token::AND).append(right.0).parens())
}

/// `(left OR right)`
pub fn or(left: Condition, right: Condition) -> Condition {
    Condition(left.0.push(Token::OR).append(right.0).parens())
}

/// `NOT (condition)`
pub fn not(condition: Condition) -> Condition {
    Condition(Sql::token(Token::NOT).append(condition.0.parens()))
}
