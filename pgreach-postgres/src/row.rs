//! Driver-neutral rows and typed column access.

use chrono::{DateTime, NaiveDateTime, Utc};
use tokio_postgres::types::Type;

use crate::error::{PgError, PgResult};

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL `NULL`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Any integer width.
    Int(i64),
    /// Any float width.
    Float(f64),
    /// Text-like values.
    Text(String),
    /// Timestamps, normalized to UTC.
    Timestamp(DateTime<Utc>),
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%:z")),
        }
    }
}

/// A row with named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PgRecord {
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl PgRecord {
    /// Build a record from `(column, value)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, SqlValue)>,
        S: Into<String>,
    {
        let (columns, values): (Vec<String>, Vec<SqlValue>) =
            pairs.into_iter().map(|(c, v)| (c.into(), v)).unzip();
        Self { columns, values }
    }

    /// Convert a tokio-postgres row.
    pub fn from_pg_row(row: &tokio_postgres::Row) -> PgResult<Self> {
        let mut columns = Vec::with_capacity(row.len());
        let mut values = Vec::with_capacity(row.len());
        for (idx, column) in row.columns().iter().enumerate() {
            columns.push(column.name().to_string());
            values.push(decode(row, idx, column.type_())?);
        }
        Ok(Self { columns, values })
    }

    /// Raw value by column name.
    pub fn value(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }

    /// Typed value by column name.
    pub fn get_value<T: FromSqlValue>(&self, column: &str) -> PgResult<T> {
        let value = self
            .value(column)
            .ok_or_else(|| PgError::deserialization(format!("missing column '{}'", column)))?;
        T::from_sql_value(value).ok_or_else(|| {
            PgError::deserialization(format!(
                "failed to get column '{}': unexpected value {:?}",
                column, value
            ))
        })
    }

    /// Typed value by column name, `None` for SQL `NULL`.
    pub fn get_opt<T: FromSqlValue>(&self, column: &str) -> PgResult<Option<T>> {
        match self.value(column) {
            Some(SqlValue::Null) => Ok(None),
            Some(_) => self.get_value(column).map(Some),
            None => Err(PgError::deserialization(format!(
                "missing column '{}'",
                column
            ))),
        }
    }

    /// Typed value of the first column.
    pub fn first<T: FromSqlValue>(&self) -> PgResult<T> {
        let value = self
            .values
            .first()
            .ok_or_else(|| PgError::deserialization("row has no columns"))?;
        T::from_sql_value(value).ok_or_else(|| {
            PgError::deserialization(format!("unexpected value {:?} in first column", value))
        })
    }
}

fn decode(row: &tokio_postgres::Row, idx: usize, ty: &Type) -> PgResult<SqlValue> {
    let value = match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.map(SqlValue::Bool),
        Type::INT2 => row.try_get::<_, Option<i16>>(idx)?.map(|v| SqlValue::Int(v.into())),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx)?.map(|v| SqlValue::Int(v.into())),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(SqlValue::Int),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx)?.map(|v| SqlValue::Float(v.into())),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.map(SqlValue::Float),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(SqlValue::Timestamp),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(|v| SqlValue::Timestamp(v.and_utc())),
        _ => match row.try_get::<_, Option<String>>(idx) {
            Ok(v) => v.map(SqlValue::Text),
            Err(_) => Some(SqlValue::Text(format!("<{}>", ty.name()))),
        },
    };
    Ok(value.unwrap_or(SqlValue::Null))
}

/// Conversion out of a [`SqlValue`].
pub trait FromSqlValue: Sized {
    /// Convert, or `None` on a type mismatch.
    fn from_sql_value(value: &SqlValue) -> Option<Self>;
}

impl FromSqlValue for bool {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromSqlValue for i64 {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromSqlValue for f64 {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Float(x) => Some(*x),
            SqlValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromSqlValue for DateTime<Utc> {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Null => Some(None),
            other => T::from_sql_value(other).map(Some),
        }
    }
}

/// Trait for deserializing a record into a type.
pub trait FromPgRow: Sized {
    /// Deserialize from a record.
    fn from_row(row: &PgRecord) -> PgResult<Self>;
}

/// Macro to implement FromPgRow for simple structs.
///
/// Usage:
/// ```rust,ignore
/// impl_from_row!(TableSummary {
///     table_name: String,
///     column_count: i64,
/// });
/// ```
#[macro_export]
macro_rules! impl_from_row {
    ($type:ident { $($field:ident : $field_type:ty),* $(,)? }) => {
        impl $crate::row::FromPgRow for $type {
            fn from_row(row: &$crate::row::PgRecord) -> $crate::error::PgResult<Self> {
                Ok(Self {
                    $(
                        $field: row.get_value::<$field_type>(stringify!($field))?,
                    )*
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        name: String,
        count: i64,
        note: Option<String>,
    }

    impl_from_row!(Pair {
        name: String,
        count: i64,
        note: Option<String>,
    });

    fn record() -> PgRecord {
        PgRecord::from_pairs([
            ("name", SqlValue::Text("todoapp_tasks".into())),
            ("count", SqlValue::Int(5)),
            ("note", SqlValue::Null),
        ])
    }

    #[test]
    fn test_typed_access() {
        let row = record();
        assert_eq!(row.get_value::<String>("name").unwrap(), "todoapp_tasks");
        assert_eq!(row.get_value::<i64>("count").unwrap(), 5);
        assert_eq!(row.get_opt::<String>("note").unwrap(), None);
        assert_eq!(row.first::<String>().unwrap(), "todoapp_tasks");
    }

    #[test]
    fn test_type_mismatch_and_missing() {
        let row = record();
        assert!(row.get_value::<bool>("count").is_err());
        assert!(row.get_value::<i64>("absent").is_err());
        assert!(row.get_opt::<i64>("absent").is_err());
    }

    #[test]
    fn test_from_row_macro() {
        let pair = Pair::from_row(&record()).unwrap();
        assert_eq!(pair.name, "todoapp_tasks");
        assert_eq!(pair.count, 5);
        assert!(pair.note.is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(SqlValue::Null.to_string(), "NULL");
        assert_eq!(SqlValue::Int(3).to_string(), "3");
        assert_eq!(SqlValue::Text("x".into()).to_string(), "x");
    }
}
