use crate::dataset::Row;

/// Decides whether a row belongs to the valid partition.
///
/// Implementations must only read the row they are given so rows can be
/// evaluated in any order.
pub trait RowPredicate {
    fn is_valid(&self, row: &Row<'_>) -> bool;
}

impl<F> RowPredicate for F
where
    F: Fn(&Row<'_>) -> bool,
{
    fn is_valid(&self, row: &Row<'_>) -> bool {
        self(row)
    }
}

/// Valid when every column holds a non-null value. A row with no columns is
/// valid.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNullColumns;

impl RowPredicate for NoNullColumns {
    fn is_valid(&self, row: &Row<'_>) -> bool {
        row.values().iter().all(|value| !value.is_null())
    }
}
