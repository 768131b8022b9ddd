//! Arrow array conversion utilities

use super::{Column, Table};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Date64Type, Float64Type, Int64Type, TimeUnit};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use chrono::{DateTime, Utc};

/// Convert an Arrow array to a typed column.
///
/// Integer widths collapse to `i64`, float and decimal widths to `f64`,
/// timestamps and dates to UTC date-times. Nested and exotic types are
/// rendered to their display string so they still count as distinct values.
pub fn arrow_to_column(array: &ArrayRef) -> Result<Column, ArrowError> {
    let column = match array.data_type() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => {
            let ints = cast(array, &DataType::Int64)?;
            Column::Int(ints.as_primitive::<Int64Type>().iter().collect())
        }
        DataType::Float16
        | DataType::Float32
        | DataType::Float64
        | DataType::Decimal128(_, _)
        | DataType::Decimal256(_, _) => {
            let floats = cast(array, &DataType::Float64)?;
            Column::floats(floats.as_primitive::<Float64Type>().iter())
        }
        DataType::Boolean => Column::Bool(array.as_boolean().iter().collect()),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let strings = cast(array, &DataType::Utf8)?;
            Column::strs(strings.as_string::<i32>().iter())
        }
        DataType::Timestamp(unit, _) => {
            let raw = cast(array, &DataType::Int64)?;
            Column::DateTime(
                raw.as_primitive::<Int64Type>()
                    .iter()
                    .map(|v| v.and_then(|v| timestamp_from_unit(v, unit)))
                    .collect(),
            )
        }
        DataType::Date32 => Column::DateTime(
            array
                .as_primitive::<Date32Type>()
                .iter()
                .map(|days| days.and_then(|d| DateTime::from_timestamp(i64::from(d) * 86_400, 0)))
                .collect(),
        ),
        DataType::Date64 => Column::DateTime(
            array
                .as_primitive::<Date64Type>()
                .iter()
                .map(|ms| ms.and_then(DateTime::from_timestamp_millis))
                .collect(),
        ),
        DataType::Null => Column::Str(vec![None; array.len()]),
        _ => {
            let mut values = Vec::with_capacity(array.len());
            for i in 0..array.len() {
                if array.is_null(i) {
                    values.push(None);
                } else {
                    values.push(Some(array_value_to_string(array, i)?));
                }
            }
            Column::Str(values)
        }
    };
    Ok(column)
}

fn timestamp_from_unit(value: i64, unit: &TimeUnit) -> Option<DateTime<Utc>> {
    match unit {
        TimeUnit::Second => DateTime::from_timestamp(value, 0),
        TimeUnit::Millisecond => DateTime::from_timestamp_millis(value),
        TimeUnit::Microsecond => DateTime::from_timestamp_micros(value),
        TimeUnit::Nanosecond => Some(DateTime::from_timestamp_nanos(value)),
    }
}

/// Convert a record batch to a table, column by column.
pub fn record_batch_to_table(batch: &RecordBatch) -> Result<Table, ArrowError> {
    let schema = batch.schema();
    let mut table = Table::new();
    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        let column = arrow_to_column(array)?;
        table
            .insert(field.name().clone(), column)
            .map_err(|e| ArrowError::InvalidArgumentError(e.to_string()))?;
    }
    Ok(table)
}
