use std::fs::File;
use std::path::Path;

use ingest_validation_core::codec::{decode_parquet, encode_parquet, read_csv};
use ingest_validation_core::dataset::{CellValue, Column, ColumnType, Dataset};
use ingest_validation_core::partition::split_dataset;
use ingest_validation_core::predicate::NoNullColumns;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

fn parquet_field_specs(path: &Path) -> Vec<(String, String, bool)> {
    let file = File::open(path).expect("parquet file should exist");
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).expect("parquet reader should build");
    builder
        .schema()
        .fields()
        .iter()
        .map(|field| {
            (
                field.name().to_string(),
                field.data_type().to_string(),
                field.is_nullable(),
            )
        })
        .collect()
}

fn ab_columns() -> Vec<Column> {
    vec![
        Column::new("a", ColumnType::Integer),
        Column::new("b", ColumnType::Integer),
    ]
}

#[test]
fn csv_rows_split_and_survive_parquet() {
    let source = read_csv(b"a,b\n1,2\n1,\n,\n").expect("csv should parse");
    let partition = split_dataset(&source, &NoNullColumns);

    let valid = decode_parquet(encode_parquet(&partition.valid).expect("encode valid"))
        .expect("decode valid");
    let rejected = decode_parquet(encode_parquet(&partition.rejected).expect("encode rejected"))
        .expect("decode rejected");

    assert_eq!(
        valid,
        Dataset::try_from_rows(
            ab_columns(),
            vec![vec![CellValue::Integer(1), CellValue::Integer(2)]],
        )
        .expect("expected dataset")
    );
    assert_eq!(
        rejected,
        Dataset::try_from_rows(
            ab_columns(),
            vec![
                vec![CellValue::Integer(1), CellValue::Null],
                vec![CellValue::Null, CellValue::Null],
            ],
        )
        .expect("expected dataset")
    );
}

#[test]
fn partition_files_keep_source_schema_without_flag_column() {
    let source = read_csv(b"order_id,total,express,region\n10,4.5,true,eu\n11,,false,us\n")
        .expect("csv should parse");
    let partition = split_dataset(&source, &NoNullColumns);

    let dir = tempfile::tempdir().expect("temp dir should exist");
    let valid_path = dir.path().join("valid.parquet");
    let rejected_path = dir.path().join("rejected.parquet");
    std::fs::write(
        &valid_path,
        encode_parquet(&partition.valid).expect("encode valid"),
    )
    .expect("write valid");
    std::fs::write(
        &rejected_path,
        encode_parquet(&partition.rejected).expect("encode rejected"),
    )
    .expect("write rejected");

    let expected = vec![
        ("order_id".to_string(), "Int64".to_string(), true),
        ("total".to_string(), "Float64".to_string(), true),
        ("express".to_string(), "Boolean".to_string(), true),
        ("region".to_string(), "Utf8".to_string(), true),
    ];
    assert_eq!(parquet_field_specs(&valid_path), expected);
    assert_eq!(parquet_field_specs(&rejected_path), expected);
}

#[test]
fn rejected_rows_keep_their_original_values() {
    let source = read_csv(b"sku,qty,note\nA-1,3,\nB-2,,late\nC-3,1,ok\n").expect("csv should parse");
    let partition = split_dataset(&source, &NoNullColumns);

    assert_eq!(partition.valid.len(), 1);
    let skus = partition
        .rejected
        .rows()
        .map(|row| row.get("sku").cloned())
        .collect::<Vec<_>>();
    assert_eq!(
        skus,
        vec![
            Some(CellValue::Text("A-1".to_string())),
            Some(CellValue::Text("B-2".to_string())),
        ]
    );
}
