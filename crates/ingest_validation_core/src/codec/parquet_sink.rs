use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::file::metadata::{KeyValue, ParquetMetaData};
use parquet::file::properties::WriterProperties;

use crate::dataset::{CellValue, Column, ColumnType, Dataset};

use super::CodecError;

/// Footer key holding the dataset row count. Parquet derives a row group's
/// row count from its column chunks, so a file without columns needs it.
const ROW_COUNT_KEY: &str = "ingest_validation.row_count";

pub(crate) fn encode_parquet_impl(dataset: &Dataset) -> Result<Vec<u8>, CodecError> {
    let batch = build_record_batch(dataset)?;
    let props = WriterProperties::builder()
        .set_key_value_metadata(Some(vec![KeyValue::new(
            ROW_COUNT_KEY.to_string(),
            dataset.len().to_string(),
        )]))
        .build();
    let mut writer = ArrowWriter::try_new(Vec::new(), batch.schema(), Some(props))?;
    writer.write(&batch)?;
    Ok(writer.into_inner()?)
}

pub(crate) fn decode_parquet_impl(bytes: Vec<u8>) -> Result<Dataset, CodecError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(bytes))?;
    let columns = builder
        .schema()
        .fields()
        .iter()
        .map(|field| Ok(Column::new(field.name(), column_type_for(field.data_type())?)))
        .collect::<Result<Vec<_>, CodecError>>()?;

    let mut dataset = Dataset::new(columns.clone());
    if columns.is_empty() {
        for _ in 0..recorded_row_count(builder.metadata())? {
            dataset.push_row(Vec::new())?;
        }
        return Ok(dataset);
    }

    for batch in builder.build()? {
        let batch = batch?;
        for row_index in 0..batch.num_rows() {
            let values = columns
                .iter()
                .enumerate()
                .map(|(column_index, column)| {
                    cell_at(batch.column(column_index), column, row_index)
                })
                .collect::<Result<Vec<_>, _>>()?;
            dataset.push_row(values)?;
        }
    }

    Ok(dataset)
}

fn recorded_row_count(metadata: &ParquetMetaData) -> Result<usize, CodecError> {
    let file_metadata = metadata.file_metadata();
    let recorded = file_metadata
        .key_value_metadata()
        .and_then(|entries| entries.iter().find(|entry| entry.key == ROW_COUNT_KEY))
        .and_then(|entry| entry.value.as_deref());

    match recorded {
        Some(value) => value.parse::<usize>().map_err(|error| {
            CodecError::new(format!("Invalid {ROW_COUNT_KEY} value '{value}': {error}"))
        }),
        None => usize::try_from(file_metadata.num_rows()).map_err(|error| {
            CodecError::new(format!(
                "Invalid Parquet row count {}: {error}",
                file_metadata.num_rows()
            ))
        }),
    }
}

fn build_record_batch(dataset: &Dataset) -> Result<RecordBatch, CodecError> {
    let schema = Arc::new(parquet_schema(dataset.columns()));
    let arrays = dataset
        .columns()
        .iter()
        .enumerate()
        .map(|(index, column)| build_array(dataset, index, column.column_type))
        .collect::<Vec<_>>();
    let options = RecordBatchOptions::new().with_row_count(Some(dataset.len()));

    Ok(RecordBatch::try_new_with_options(schema, arrays, &options)?)
}

fn parquet_schema(columns: &[Column]) -> Schema {
    Schema::new(
        columns
            .iter()
            .map(|column| Field::new(&column.name, arrow_type_for(column.column_type), true))
            .collect::<Vec<_>>(),
    )
}

fn arrow_type_for(column_type: ColumnType) -> DataType {
    match column_type {
        ColumnType::Boolean => DataType::Boolean,
        ColumnType::Integer => DataType::Int64,
        ColumnType::Float => DataType::Float64,
        ColumnType::Text => DataType::Utf8,
    }
}

fn column_type_for(data_type: &DataType) -> Result<ColumnType, CodecError> {
    match data_type {
        DataType::Boolean => Ok(ColumnType::Boolean),
        DataType::Int64 => Ok(ColumnType::Integer),
        DataType::Float64 => Ok(ColumnType::Float),
        DataType::Utf8 => Ok(ColumnType::Text),
        other => Err(CodecError::new(format!(
            "Unsupported Parquet column type {other}"
        ))),
    }
}

fn build_array(dataset: &Dataset, index: usize, column_type: ColumnType) -> ArrayRef {
    let cells = dataset.column_cells(index);
    match column_type {
        ColumnType::Boolean => Arc::new(BooleanArray::from(
            cells
                .map(|cell| match cell {
                    CellValue::Boolean(value) => Some(*value),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        ColumnType::Integer => Arc::new(Int64Array::from(
            cells
                .map(|cell| match cell {
                    CellValue::Integer(value) => Some(*value),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        ColumnType::Float => Arc::new(Float64Array::from(
            cells
                .map(|cell| match cell {
                    CellValue::Float(value) => Some(*value),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        ColumnType::Text => Arc::new(StringArray::from(
            cells
                .map(|cell| match cell {
                    CellValue::Text(value) => Some(value.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
    }
}

fn cell_at(array: &ArrayRef, column: &Column, row_index: usize) -> Result<CellValue, CodecError> {
    if array.is_null(row_index) {
        return Ok(CellValue::Null);
    }

    let mismatch = || {
        CodecError::new(format!(
            "Column '{}' does not hold {} values",
            column.name,
            column.column_type.as_str()
        ))
    };

    let value = match column.column_type {
        ColumnType::Boolean => array
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map(|values| CellValue::Boolean(values.value(row_index))),
        ColumnType::Integer => array
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|values| CellValue::Integer(values.value(row_index))),
        ColumnType::Float => array
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|values| CellValue::Float(values.value(row_index))),
        ColumnType::Text => array
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|values| CellValue::Text(values.value(row_index).to_string())),
    };

    value.ok_or_else(mismatch)
}
