//! Matrix Market exchange format.
//!
//! Reads `coordinate` and `array` files with `real` (or `integer`) values
//! and `general` or `symmetric` layout. Symmetric files store one triangle;
//! the reader mirrors off-diagonal entries. Writers always produce
//! `coordinate general` for matrices and `array general` for vectors, with
//! values in shortest round-trip exponent form.

use std::io::{BufRead, Write};
use std::str::{FromStr, SplitWhitespace};

use crate::core::wrappers::to_f64;
use crate::error::KitError;
use crate::matrix::{CsrMatrix, SparseMatrix};
use num_traits::Float;
use tracing::debug;

const BANNER: &str = "%%MatrixMarket";

/// Upper bound on buffer space reserved from header counts before any
/// entry has been read.
const MAX_PREALLOC: usize = 1 << 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Layout {
    Coordinate,
    Array,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Symmetry {
    General,
    Symmetric,
}

fn parse_err(line: usize, message: impl Into<String>) -> KitError {
    KitError::Parse { line, message: message.into() }
}

/// Non-comment, non-blank lines with their one-based line numbers.
struct DataLines<R> {
    inner: std::io::Lines<R>,
    line: usize,
}

impl<R: BufRead> DataLines<R> {
    fn next_line(&mut self) -> Result<Option<(usize, String)>, KitError> {
        for l in self.inner.by_ref() {
            self.line += 1;
            let l = l?;
            let t = l.trim();
            if t.is_empty() || t.starts_with('%') {
                continue;
            }
            return Ok(Some((self.line, t.to_string())));
        }
        Ok(None)
    }

    fn expect_line(&mut self, what: &str) -> Result<(usize, String), KitError> {
        self.next_line()?
            .ok_or_else(|| parse_err(self.line + 1, format!("unexpected end of input, expected {what}")))
    }
}

fn field<V: FromStr>(tokens: &mut SplitWhitespace<'_>, line: usize, what: &str) -> Result<V, KitError> {
    let tok = tokens.next().ok_or_else(|| parse_err(line, format!("missing {what}")))?;
    tok.parse()
        .map_err(|_| parse_err(line, format!("invalid {what} '{tok}'")))
}

fn value<T: Float>(tokens: &mut SplitWhitespace<'_>, line: usize) -> Result<T, KitError> {
    let v: f64 = field(tokens, line, "value")?;
    num_traits::cast(v).ok_or_else(|| parse_err(line, format!("value {v} not representable")))
}

/// One-based index in `1..=bound`, returned zero-based.
fn index(tokens: &mut SplitWhitespace<'_>, line: usize, bound: usize, what: &str) -> Result<usize, KitError> {
    let i: usize = field(tokens, line, what)?;
    if i == 0 || i > bound {
        return Err(parse_err(line, format!("{what} {i} outside 1..={bound}")));
    }
    Ok(i - 1)
}

fn read_header<R: BufRead>(lines: &mut std::io::Lines<R>) -> Result<(Layout, Symmetry), KitError> {
    let first = lines
        .next()
        .transpose()?
        .ok_or_else(|| parse_err(1, "empty input"))?;
    let mut tokens = first.split_whitespace();
    if tokens.next() != Some(BANNER) {
        return Err(parse_err(1, format!("missing {BANNER} banner")));
    }
    let words: Vec<String> = tokens.map(str::to_ascii_lowercase).collect();
    let [object, layout, kind, symmetry] = words.as_slice() else {
        return Err(parse_err(1, "banner needs object, format, field and symmetry"));
    };
    if object != "matrix" {
        return Err(parse_err(1, format!("unsupported object '{object}'")));
    }
    let layout = match layout.as_str() {
        "coordinate" => Layout::Coordinate,
        "array" => Layout::Array,
        other => return Err(parse_err(1, format!("unsupported format '{other}'"))),
    };
    if kind != "real" && kind != "integer" && kind != "double" {
        return Err(parse_err(1, format!("unsupported field '{kind}'")));
    }
    let symmetry = match symmetry.as_str() {
        "general" => Symmetry::General,
        "symmetric" => Symmetry::Symmetric,
        other => return Err(parse_err(1, format!("unsupported symmetry '{other}'"))),
    };
    Ok((layout, symmetry))
}

/// Reads a matrix in coordinate or array format into CSR.
///
/// Duplicate coordinate entries are summed.
pub fn read_matrix<T: Float, R: BufRead>(reader: R) -> Result<CsrMatrix<T>, KitError> {
    let mut raw = reader.lines();
    let (layout, symmetry) = read_header(&mut raw)?;
    let mut lines = DataLines { inner: raw, line: 1 };

    let (size_line, size) = lines.expect_line("size line")?;
    let mut tokens = size.split_whitespace();
    let nrows: usize = field(&mut tokens, size_line, "row count")?;
    let ncols: usize = field(&mut tokens, size_line, "column count")?;
    if symmetry == Symmetry::Symmetric && nrows != ncols {
        return Err(parse_err(size_line, "symmetric matrix must be square"));
    }

    let mut triplets = Vec::new();
    match layout {
        Layout::Coordinate => {
            let nnz: usize = field(&mut tokens, size_line, "entry count")?;
            if nrows.checked_mul(ncols).is_some_and(|cells| nnz > cells) {
                return Err(parse_err(
                    size_line,
                    format!("{nnz} entries do not fit a {nrows}x{ncols} matrix"),
                ));
            }
            triplets.reserve(nnz.min(MAX_PREALLOC));
            for _ in 0..nnz {
                let (line, text) = lines.expect_line("entry")?;
                let mut t = text.split_whitespace();
                let i = index(&mut t, line, nrows, "row")?;
                let j = index(&mut t, line, ncols, "column")?;
                let v: T = value(&mut t, line)?;
                if symmetry == Symmetry::Symmetric && j > i {
                    return Err(parse_err(line, "symmetric entry above the diagonal"));
                }
                triplets.push((i, j, v));
                if symmetry == Symmetry::Symmetric && i != j {
                    triplets.push((j, i, v));
                }
            }
        }
        Layout::Array => {
            // column-major; symmetric arrays list the lower triangle only
            for j in 0..ncols {
                let first_row = if symmetry == Symmetry::Symmetric { j } else { 0 };
                for i in first_row..nrows {
                    let (line, text) = lines.expect_line("value")?;
                    let v: T = value(&mut text.split_whitespace(), line)?;
                    if v.is_zero() {
                        continue;
                    }
                    triplets.push((i, j, v));
                    if symmetry == Symmetry::Symmetric && i != j {
                        triplets.push((j, i, v));
                    }
                }
            }
        }
    }
    if let Some((line, _)) = lines.next_line()? {
        return Err(parse_err(line, "trailing data after last entry"));
    }
    debug!(nrows, ncols, entries = triplets.len(), "read Matrix Market matrix");
    CsrMatrix::from_triplets(nrows, ncols, &triplets).map_err(|e| match e {
        KitError::InvalidArgument(message) => parse_err(size_line, message),
        other => other,
    })
}

/// Writes the stored entries in `coordinate real general` format.
pub fn write_matrix<T: Float, W: Write>(a: &dyn SparseMatrix<T>, mut out: W) -> Result<(), KitError> {
    writeln!(out, "{BANNER} matrix coordinate real general")?;
    writeln!(out, "{} {} {}", a.nrows(), a.ncols(), a.nnz())?;
    for e in a.entries() {
        writeln!(out, "{} {} {:e}", e.row + 1, e.col + 1, to_f64(e.value))?;
    }
    out.flush()?;
    Ok(())
}

/// Reads a dense vector stored as a one-column array.
pub fn read_vector<T: Float, R: BufRead>(reader: R) -> Result<Vec<T>, KitError> {
    let mut raw = reader.lines();
    let (layout, _) = read_header(&mut raw)?;
    if layout != Layout::Array {
        return Err(parse_err(1, "vectors must use the array format"));
    }
    let mut lines = DataLines { inner: raw, line: 1 };
    let (size_line, size) = lines.expect_line("size line")?;
    let mut tokens = size.split_whitespace();
    let n: usize = field(&mut tokens, size_line, "row count")?;
    let ncols: usize = field(&mut tokens, size_line, "column count")?;
    if ncols != 1 {
        return Err(parse_err(size_line, format!("expected one column, found {ncols}")));
    }
    let mut v = Vec::with_capacity(n.min(MAX_PREALLOC));
    for _ in 0..n {
        let (line, text) = lines.expect_line("value")?;
        v.push(value(&mut text.split_whitespace(), line)?);
    }
    if let Some((line, _)) = lines.next_line()? {
        return Err(parse_err(line, "trailing data after last value"));
    }
    Ok(v)
}

/// Writes `v` as a one-column `array real general` file.
pub fn write_vector<T: Float, W: Write>(v: &[T], mut out: W) -> Result<(), KitError> {
    writeln!(out, "{BANNER} matrix array real general")?;
    writeln!(out, "{} 1", v.len())?;
    for &x in v {
        writeln!(out, "{:e}", to_f64(x))?;
    }
    out.flush()?;
    Ok(())
}
