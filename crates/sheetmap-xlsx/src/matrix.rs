//! Dense matrix assembly and trimming
//!
//! Places decoded cells into a rectangular `rows x cols` matrix and trims
//! wholly-empty trailing rows and columns, keeping a map from surviving rows
//! back to their original positions for error reporting.

use sheetmap_core::{CellRef, CellValue, Dimensions};

/// A decoded cell tagged with its coordinate
#[derive(Debug, Clone)]
pub struct PlacedCell {
    /// 1-based cell position
    pub reference: CellRef,
    /// Decoded value
    pub value: CellValue,
}

/// A dense, row-major matrix of cell values plus the row-index source map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matrix {
    /// Rows of equal width; empty positions hold [`CellValue::Empty`]
    pub rows: Vec<Vec<CellValue>>,
    /// One original 0-based row index per surviving row
    pub row_index_map: Vec<usize>,
}

/// Assemble decoded cells into a dense matrix sized by the sheet dimensions.
///
/// Sizing uses the bottom-right coordinate's absolute 1-based position, not
/// the offset from the top-left corner: legitimate leading empty rows and
/// columns in the source are preserved rather than silently shifted.
///
/// Cells outside the declared dimensions are dropped (malformed containers
/// do produce them).
pub fn assemble(cells: Vec<PlacedCell>, dimensions: &Dimensions) -> Matrix {
    if cells.is_empty() {
        return Matrix::default();
    }

    let rows_count = dimensions.end.row as usize;
    let cols_count = dimensions.end.column as usize;

    let mut rows = vec![vec![CellValue::Empty; cols_count]; rows_count];
    for cell in cells {
        let row = cell.reference.row as usize;
        let column = cell.reference.column as usize;
        if row > rows_count || column > cols_count {
            log::warn!(
                "dropping cell {} outside sheet dimensions {}",
                cell.reference,
                dimensions
            );
            continue;
        }
        rows[row - 1][column - 1] = cell.value;
    }

    Matrix {
        rows,
        row_index_map: (0..rows_count).collect(),
    }
}

impl Matrix {
    /// Trim trailing all-empty columns, then trailing all-empty rows.
    ///
    /// Only trailing emptiness is removed; interior and leading empty rows
    /// and columns are kept. Removed rows drop their row-map entries. Builds
    /// new vectors rather than splicing in place, so an already-trimmed
    /// matrix passes through unchanged.
    pub fn trim_trailing(self) -> Matrix {
        let Matrix {
            rows,
            mut row_index_map,
        } = self;

        if rows.is_empty() {
            return Matrix {
                rows,
                row_index_map,
            };
        }

        // Scan from the last column backward, stopping at the first column
        // with any value in it.
        let width = rows[0].len();
        let mut keep_cols = width;
        while keep_cols > 0 {
            let all_empty = rows.iter().all(|row| row[keep_cols - 1].is_empty());
            if !all_empty {
                break;
            }
            keep_cols -= 1;
        }

        let mut trimmed: Vec<Vec<CellValue>> = rows
            .into_iter()
            .map(|mut row| {
                row.truncate(keep_cols);
                row
            })
            .collect();

        // Same scan for rows.
        let mut keep_rows = trimmed.len();
        while keep_rows > 0 {
            let all_empty = trimmed[keep_rows - 1].iter().all(CellValue::is_empty);
            if !all_empty {
                break;
            }
            keep_rows -= 1;
        }
        trimmed.truncate(keep_rows);
        row_index_map.truncate(keep_rows);

        Matrix {
            rows: trimmed,
            row_index_map,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cell(row: u32, column: u32, value: CellValue) -> PlacedCell {
        PlacedCell {
            reference: CellRef::new(row, column),
            value,
        }
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.into())
    }

    #[test]
    fn test_empty_cell_list() {
        let dims = Dimensions::parse("A1:C3").unwrap();
        assert_eq!(assemble(Vec::new(), &dims), Matrix::default());
    }

    #[test]
    fn test_assemble_preserves_leading_emptiness() {
        // Dimensions start at B2: row 1 and column 1 must stay, empty.
        let dims = Dimensions::parse("B2:C3").unwrap();
        let matrix = assemble(vec![cell(2, 2, text("x")), cell(3, 3, text("y"))], &dims);

        assert_eq!(matrix.rows.len(), 3);
        assert_eq!(matrix.rows[0].len(), 3);
        assert_eq!(matrix.rows[0], vec![CellValue::Empty; 3]);
        assert_eq!(matrix.rows[1][1], text("x"));
        assert_eq!(matrix.rows[2][2], text("y"));
        assert_eq!(matrix.row_index_map, vec![0, 1, 2]);
    }

    #[test]
    fn test_out_of_bounds_cell_dropped() {
        let dims = Dimensions::parse("A1:B2").unwrap();
        let matrix = assemble(vec![cell(1, 1, text("a")), cell(9, 9, text("lost"))], &dims);
        assert_eq!(matrix.rows.len(), 2);
        assert_eq!(matrix.rows[0][0], text("a"));
    }

    #[test]
    fn test_trim_trailing_only() {
        let dims = Dimensions::parse("A1:D4").unwrap();
        // Interior emptiness at row 2 / column 2; trailing emptiness at
        // row 4 / column 4.
        let matrix = assemble(
            vec![
                cell(1, 1, text("a")),
                cell(1, 3, text("b")),
                cell(3, 1, text("c")),
            ],
            &dims,
        )
        .trim_trailing();

        assert_eq!(matrix.rows.len(), 3);
        assert_eq!(matrix.rows[0].len(), 3);
        // Interior gaps survive.
        assert_eq!(matrix.rows[0][1], CellValue::Empty);
        assert_eq!(matrix.rows[1], vec![CellValue::Empty; 3]);
        assert_eq!(matrix.row_index_map, vec![0, 1, 2]);
    }

    #[test]
    fn test_trim_idempotent() {
        let dims = Dimensions::parse("A1:C3").unwrap();
        let matrix = assemble(
            vec![cell(1, 1, text("a")), cell(2, 2, text("b"))],
            &dims,
        )
        .trim_trailing();

        let again = matrix.clone().trim_trailing();
        assert_eq!(matrix, again);
    }

    #[test]
    fn test_trim_everything() {
        let dims = Dimensions::parse("A1:B2").unwrap();
        let matrix = assemble(vec![cell(1, 1, CellValue::Empty)], &dims).trim_trailing();
        assert_eq!(matrix.rows.len(), 0);
        assert_eq!(matrix.row_index_map.len(), 0);
    }
}
