//! Linear-pattern autofill.
//!
//! A fill drag in one column hands over its source rows and the row the drag
//! ended on. If every source value is numeric and there are at least two of
//! them, the difference between the first two is taken as the step and the
//! progression is continued from the last source value.
//!
//! The hook decides only; it never writes. Accepted values are applied by
//! the session through its normal mutation path.

use std::fmt;

use crate::model::CellValue;
use crate::surface::GridSurface;

/// A fill drag over a single column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutofillRequest {
    pub col: usize,
    /// First source row.
    pub start_row: usize,
    /// Last source row (inclusive).
    pub end_row: usize,
    /// Last row the drag reached (inclusive).
    pub final_row: usize,
}

impl AutofillRequest {
    /// Source rows may be given in either order.
    pub fn new(col: usize, start_row: usize, end_row: usize, final_row: usize) -> Self {
        AutofillRequest {
            col,
            start_row: start_row.min(end_row),
            end_row: start_row.max(end_row),
            final_row,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillValue {
    pub row: usize,
    pub col: usize,
    pub value: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// The source cell at `row` does not coerce to a number.
    NonNumeric { row: usize },
    /// Fewer than two source values; no step can be inferred.
    TooFewValues,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NonNumeric { row } => write!(f, "row {} is not numeric", row + 1),
            RejectReason::TooFewValues => f.write_str("need at least two values"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AutofillDecision {
    /// Write these values (possibly none, when the drag did not extend past the source).
    Accept(Vec<FillValue>),
    /// Leave every cell alone.
    Reject(RejectReason),
}

/// Decide the fill for `request` from the values currently displayed by `surface`.
pub fn extrapolate<S>(surface: &S, request: &AutofillRequest) -> AutofillDecision
where
    S: GridSurface + ?Sized,
{
    let col = request.col;
    let start = request.start_row.min(request.end_row);
    let end = request.start_row.max(request.end_row);
    let mut values = Vec::new();

    for row in start..=end {
        let cell = surface.display(row, col).unwrap_or_default();
        match cell.to_number() {
            Some(n) => values.push(n),
            None => return AutofillDecision::Reject(RejectReason::NonNumeric { row }),
        }
    }

    let (Some(first), Some(second), Some(last)) = (values.first(), values.get(1), values.last())
    else {
        return AutofillDecision::Reject(RejectReason::TooFewValues);
    };

    let step = second - first;
    let mut current = *last;
    let fill = (end + 1..=request.final_row)
        .map(|row| {
            current += step;
            FillValue {
                row,
                col,
                value: current,
            }
        })
        .collect();

    AutofillDecision::Accept(fill)
}
