//! Conversion of TDS column data into response cell values

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use lakehouse_query::{CellValue, DataRow, QueryError, Result};
use tiberius::{numeric::Numeric, ColumnData, FromSql, Row};

/// Convert a result row into an ordered `DataRow` keyed by `columns`
pub(crate) fn row_to_datarow(columns: &[String], row: Row) -> Result<DataRow> {
    let mut data_row = DataRow::with_capacity(columns.len());

    for (name, data) in columns.iter().zip(row.into_iter()) {
        data_row.insert(name.as_str(), column_to_cell(&data)?);
    }

    Ok(data_row)
}

/// Map a single TDS value to a `CellValue`.
///
/// Decimals keep their exact text, binary becomes lowercase hex and all
/// date/time types are rendered as strings.
pub(crate) fn column_to_cell(data: &ColumnData<'static>) -> Result<CellValue> {
    let value = match data {
        ColumnData::U8(v) => v.map(|v| CellValue::Int(v.into())).unwrap_or(CellValue::Null),
        ColumnData::I16(v) => v.map(|v| CellValue::Int(v.into())).unwrap_or(CellValue::Null),
        ColumnData::I32(v) => v.map(|v| CellValue::Int(v.into())).unwrap_or(CellValue::Null),
        ColumnData::I64(v) => v.map(CellValue::Int).unwrap_or(CellValue::Null),
        ColumnData::F32(v) => v
            .map(|v| CellValue::Float(v as f64))
            .unwrap_or(CellValue::Null),
        ColumnData::F64(v) => v.map(CellValue::Float).unwrap_or(CellValue::Null),
        ColumnData::Bit(v) => v.map(CellValue::Bool).unwrap_or(CellValue::Null),
        ColumnData::String(v) => v
            .as_ref()
            .map(|s| CellValue::String(s.to_string()))
            .unwrap_or(CellValue::Null),
        ColumnData::Guid(v) => v
            .as_ref()
            .map(|g| CellValue::String(g.to_string()))
            .unwrap_or(CellValue::Null),
        ColumnData::Binary(v) => v
            .as_ref()
            .map(|b| CellValue::String(hex::encode(b.as_ref())))
            .unwrap_or(CellValue::Null),
        ColumnData::Numeric(v) => v
            .as_ref()
            .map(|n| CellValue::String(decimal_text(n)))
            .unwrap_or(CellValue::Null),
        ColumnData::Xml(v) => v
            .as_ref()
            .map(|x| CellValue::String(x.clone().into_owned().into_string()))
            .unwrap_or(CellValue::Null),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            timestamp(data, |v: NaiveDateTime| v.to_string())?
        }
        ColumnData::Date(_) => timestamp(data, |v: NaiveDate| v.to_string())?,
        ColumnData::Time(_) => timestamp(data, |v: NaiveTime| v.to_string())?,
        // Offset follows the seconds directly, e.g. `2024-03-01 12:30:00+02:00`
        ColumnData::DateTimeOffset(_) => timestamp(data, |v: DateTime<FixedOffset>| {
            v.format("%Y-%m-%d %H:%M:%S%.f%:z").to_string()
        })?,
        #[allow(unreachable_patterns)]
        other => {
            return Err(QueryError::Serialization(format!(
                "Unsupported column type: {:?}",
                other
            )))
        }
    };

    Ok(value)
}

fn timestamp<'a, T, F>(data: &'a ColumnData<'static>, render: F) -> Result<CellValue>
where
    T: FromSql<'a>,
    F: FnOnce(T) -> String,
{
    let value = T::from_sql(data)
        .map_err(|e| QueryError::Serialization(format!("Invalid date/time value: {}", e)))?;

    Ok(value
        .map(|v| CellValue::Timestamp(render(v)))
        .unwrap_or(CellValue::Null))
}

/// Plain decimal text: sign first, no fraction at scale 0
fn decimal_text(n: &Numeric) -> String {
    let value = n.value();
    let scale = u32::from(n.scale());
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();

    if scale == 0 {
        return format!("{}{}", sign, abs);
    }

    let divisor = 10u128.pow(scale);
    format!(
        "{}{}.{:0width$}",
        sign,
        abs / divisor,
        abs % divisor,
        width = scale as usize
    )
}
