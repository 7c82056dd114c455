//! Plain-text matrix format.
//!
//! ```text
//! <rows>
//! <cols>
//! v00 v01 ... v0(cols-1)
//! ...
//! ```
//!
//! One line per row, values separated by whitespace. Values are written with
//! Rust's shortest round-trip representation, so `parse(to_text(m)) == m`.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

fn parse_err(line: usize, msg: impl Into<String>) -> NnError {
    NnError::Parse { line, msg: msg.into() }
}

fn parse_dim(line: Option<&str>, line_no: usize, what: &str) -> Result<usize> {
    let text = line.ok_or_else(|| parse_err(line_no, format!("missing {what} count")))?;
    let value: usize = text
        .trim()
        .parse()
        .map_err(|_| parse_err(line_no, format!("invalid {what} count '{}'", text.trim())))?;
    if value == 0 {
        return Err(parse_err(line_no, format!("{what} count must be at least 1")));
    }
    Ok(value)
}

impl Matrix {
    /// Parses the text format.
    pub fn parse(text: &str) -> Result<Matrix> {
        let mut lines = text.lines();
        let rows = parse_dim(lines.next(), 1, "row")?;
        let cols = parse_dim(lines.next(), 2, "column")?;

        if rows.checked_mul(cols).is_none() {
            return Err(parse_err(2, format!("{rows}x{cols} matrix is too large")));
        }

        let mut data = Vec::new();
        for i in 0..rows {
            let line_no = i + 3;
            let line = lines
                .next()
                .ok_or_else(|| parse_err(line_no, "unexpected end of input"))?;
            let before = data.len();
            for token in line.split_whitespace() {
                let value: f64 = token
                    .parse()
                    .map_err(|_| parse_err(line_no, format!("invalid number '{token}'")))?;
                data.push(value);
            }
            let found = data.len() - before;
            if found != cols {
                return Err(parse_err(
                    line_no,
                    format!("expected {cols} values, found {found}"),
                ));
            }
        }

        Matrix::from_vec(rows, cols, data)
    }

    /// Reads a matrix from a file in the text format.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Matrix> {
        let path = path.as_ref();
        log::debug!("loading matrix from {}", path.display());
        let text = fs::read_to_string(path)?;
        let m = Matrix::parse(&text)?;
        log::debug!("loaded a {}x{} matrix from {}", m.rows(), m.cols(), path.display());
        Ok(m)
    }

    /// Renders the text format.
    pub fn to_text(&self) -> String {
        let mut out = format!("{}\n{}\n", self.rows(), self.cols());
        for i in 0..self.rows() {
            let line: Vec<String> = self.row(i).iter().map(|x| x.to_string()).collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }
        out
    }

    /// Writes the text format to a file, replacing it if it exists.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        log::debug!("saving a {}x{} matrix to {}", self.rows(), self.cols(), path.display());
        fs::write(path, self.to_text())?;
        Ok(())
    }
}

/// Debug-style dump: one row per line, three decimals.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows() {
            let cells: Vec<String> = self.row(i).iter().map(|x| format!("{x:.3}")).collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_documented_layout() {
        let m = Matrix::parse("2\n3\n1 2 3\n4.5 -5 6e-1\n").unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.as_slice(), &[1.0, 2.0, 3.0, 4.5, -5.0, 0.6]);
    }

    #[test]
    fn text_round_trip_is_exact() {
        let m = Matrix::from_vec(2, 2, vec![0.1, -1.0 / 3.0, 1e-12, 42.0]).unwrap();
        assert_eq!(Matrix::parse(&m.to_text()).unwrap(), m);
    }

    #[test]
    fn rejects_malformed_input() {
        let cases = [
            ("", 1),
            ("x\n1\n1\n", 1),
            ("1\n0\n", 2),
            ("2\n2\n1 2\n", 4),
            ("1\n2\n1\n", 3),
            ("1\n2\n1 two\n", 3),
            ("1\n2\n1 2 3\n", 3),
            ("4294967296\n4294967296\n1\n", 2),
            ("100000000\n100000000\n1\n", 3),
        ];
        for (text, expected_line) in cases {
            match Matrix::parse(text) {
                Err(NnError::Parse { line, .. }) => assert_eq!(line, expected_line, "{text:?}"),
                other => panic!("expected parse error for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn display_uses_three_decimals() {
        let m = Matrix::from_vec(1, 2, vec![0.5, 1.0 / 3.0]).unwrap();
        assert_eq!(m.to_string(), "0.500 0.333\n");
    }
}
