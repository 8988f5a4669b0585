use crate::dataset::Dataset;
use crate::predicate::RowPredicate;

/// Disjoint, total split of a dataset's rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub valid: Dataset,
    pub rejected: Dataset,
}

impl Partition {
    pub fn total_rows(&self) -> usize {
        self.valid.len() + self.rejected.len()
    }
}

/// Splits rows by `predicate`, keeping source order and column set on both
/// sides.
pub fn split_dataset(dataset: &Dataset, predicate: &impl RowPredicate) -> Partition {
    let mut valid = dataset.empty_like();
    let mut rejected = dataset.empty_like();

    for row in dataset.rows() {
        if predicate.is_valid(&row) {
            valid.push_unchecked(&row);
        } else {
            rejected.push_unchecked(&row);
        }
    }

    Partition { valid, rejected }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{CellValue, Column, ColumnType};
    use crate::predicate::NoNullColumns;

    fn ab_columns() -> Vec<Column> {
        vec![
            Column::new("a", ColumnType::Integer),
            Column::new("b", ColumnType::Integer),
        ]
    }

    #[test]
    fn splits_rows_with_nulls_into_rejected() {
        let dataset = Dataset::try_from_rows(
            ab_columns(),
            vec![
                vec![CellValue::Integer(1), CellValue::Integer(2)],
                vec![CellValue::Integer(1), CellValue::Null],
                vec![CellValue::Null, CellValue::Null],
            ],
        )
        .expect("dataset should build");

        let partition = split_dataset(&dataset, &NoNullColumns);

        let expected_valid = Dataset::try_from_rows(
            ab_columns(),
            vec![vec![CellValue::Integer(1), CellValue::Integer(2)]],
        )
        .expect("dataset should build");
        let expected_rejected = Dataset::try_from_rows(
            ab_columns(),
            vec![
                vec![CellValue::Integer(1), CellValue::Null],
                vec![CellValue::Null, CellValue::Null],
            ],
        )
        .expect("dataset should build");

        assert_eq!(partition.valid, expected_valid);
        assert_eq!(partition.rejected, expected_rejected);
    }

    #[test]
    fn zero_column_rows_are_all_valid() {
        let dataset = Dataset::try_from_rows(Vec::new(), vec![Vec::new(); 3])
            .expect("dataset should build");

        let partition = split_dataset(&dataset, &NoNullColumns);
        assert_eq!(partition.valid.len(), 3);
        assert!(partition.rejected.is_empty());
    }

    #[test]
    fn partitions_are_disjoint_and_cover_every_row() {
        let columns = vec![
            Column::new("id", ColumnType::Integer),
            Column::new("label", ColumnType::Text),
            Column::new("active", ColumnType::Boolean),
        ];
        let mut dataset = Dataset::new(columns);
        for id in 0..64i64 {
            let label = if id % 3 == 0 {
                CellValue::Null
            } else {
                CellValue::Text(format!("row-{id}"))
            };
            let active = if id % 5 == 0 {
                CellValue::Null
            } else {
                CellValue::Boolean(id % 2 == 0)
            };
            dataset
                .push_row(vec![CellValue::Integer(id), label, active])
                .expect("row should fit");
        }

        let partition = split_dataset(&dataset, &NoNullColumns);
        assert_eq!(partition.total_rows(), dataset.len());
        assert!(partition.valid.rows().all(|row| !row.has_null()));
        assert!(partition.rejected.rows().all(|row| row.has_null()));

        let mut ids = partition
            .valid
            .rows()
            .chain(partition.rejected.rows())
            .map(|row| match row.get("id") {
                Some(CellValue::Integer(id)) => *id,
                other => panic!("unexpected id cell {other:?}"),
            })
            .collect::<Vec<_>>();
        ids.sort_unstable();
        assert_eq!(ids, (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn custom_predicate_drives_the_split() {
        let dataset = Dataset::try_from_rows(
            ab_columns(),
            vec![
                vec![CellValue::Integer(1), CellValue::Null],
                vec![CellValue::Integer(5), CellValue::Integer(5)],
            ],
        )
        .expect("dataset should build");

        let a_only = |row: &crate::dataset::Row<'_>| {
            row.get("a").is_some_and(|value| !value.is_null())
        };
        let partition = split_dataset(&dataset, &a_only);
        assert_eq!(partition.valid.len(), 2);
        assert!(partition.rejected.is_empty());
        assert_eq!(partition.valid.columns(), dataset.columns());
    }
}
