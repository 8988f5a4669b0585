use crate::dataset::{CellValue, Column, ColumnType, Dataset};

use super::CodecError;

pub(crate) fn read_csv_impl(bytes: &[u8]) -> Result<Dataset, CodecError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers = reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let mut raw_rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        raw_rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let columns = headers
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let column_type = infer_column_type(
                raw_rows
                    .iter()
                    .map(|row| row[index].as_str())
                    .filter(|field| !field.is_empty()),
            );
            Column::new(name, column_type)
        })
        .collect::<Vec<_>>();

    let mut dataset = Dataset::new(columns.clone());
    for raw_row in raw_rows {
        let values = columns
            .iter()
            .zip(raw_row)
            .map(|(column, field)| parse_cell(field, column.column_type))
            .collect::<Result<Vec<_>, _>>()?;
        dataset.push_row(values)?;
    }

    Ok(dataset)
}

fn infer_column_type<'a>(fields: impl Iterator<Item = &'a str>) -> ColumnType {
    fields
        .map(classify_field)
        .reduce(widen)
        .unwrap_or(ColumnType::Text)
}

/// Digit strings outside the `i64` range stay text so long identifiers keep
/// every digit instead of rounding through `f64`.
fn classify_field(field: &str) -> ColumnType {
    if field.parse::<i64>().is_ok() {
        ColumnType::Integer
    } else if is_integer_literal(field) {
        ColumnType::Text
    } else if field.parse::<f64>().is_ok() {
        ColumnType::Float
    } else if parse_bool(field).is_some() {
        ColumnType::Boolean
    } else {
        ColumnType::Text
    }
}

fn is_integer_literal(field: &str) -> bool {
    let digits = field.strip_prefix(['+', '-']).unwrap_or(field);
    !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit())
}

fn widen(left: ColumnType, right: ColumnType) -> ColumnType {
    match (left, right) {
        (left, right) if left == right => left,
        (ColumnType::Integer, ColumnType::Float) | (ColumnType::Float, ColumnType::Integer) => {
            ColumnType::Float
        }
        _ => ColumnType::Text,
    }
}

fn parse_bool(field: &str) -> Option<bool> {
    if field.eq_ignore_ascii_case("true") {
        Some(true)
    } else if field.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_cell(field: String, column_type: ColumnType) -> Result<CellValue, CodecError> {
    if field.is_empty() {
        return Ok(CellValue::Null);
    }

    let value = match column_type {
        ColumnType::Integer => field.parse::<i64>().ok().map(CellValue::Integer),
        ColumnType::Float => field.parse::<f64>().ok().map(CellValue::Float),
        ColumnType::Boolean => parse_bool(&field).map(CellValue::Boolean),
        ColumnType::Text => Some(CellValue::Text(field.clone())),
    };

    value.ok_or_else(|| {
        CodecError::new(format!(
            "Field '{field}' does not parse as inferred {} type",
            column_type.as_str()
        ))
    })
}
