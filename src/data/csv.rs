//! Comma-separated datasets.
//!
//! - UTF-8, comma-separated, one sample per line
//! - optional header row, detected when the first line holds any non-numeric cell
//! - double-quoted fields may contain commas; `""` inside quotes is a literal quote
//! - blank lines are skipped

use std::path::Path;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Where each row's label lives and how to turn it into a target vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMode {
    /// Last column is a 0-based class index, one-hot encoded to `n_classes`.
    ClassIndex { n_classes: usize },
    /// First column is a 0-based class index (the MNIST CSV layout).
    LeadingClassIndex { n_classes: usize },
    /// Last `n_label_cols` columns are the target vector, taken as-is.
    OneHot { n_label_cols: usize },
}

/// Row-stacked samples: `inputs` is `N x features`, `labels` is `N x targets`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub inputs: Matrix,
    pub labels: Matrix,
}

impl Dataset {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.inputs.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Divides every input value by `scale` (255 for 8-bit pixels).
    pub fn normalize(&mut self, scale: f64) -> Result<()> {
        if !(scale.is_finite() && scale != 0.0) {
            return Err(NnError::InvalidConfig(format!("cannot normalize by {scale}")));
        }
        self.inputs = self.inputs.apply(move |v| v / scale);
        Ok(())
    }

    /// Splits off the last `fraction` of the rows, e.g. as a validation set.
    pub fn split(&self, fraction: f64) -> Result<(Dataset, Dataset)> {
        let n = self.len();
        let tail = (n as f64 * fraction).round() as usize;
        if !(0.0..1.0).contains(&fraction) || tail == 0 || tail >= n {
            return Err(NnError::InvalidConfig(format!(
                "split fraction {fraction} leaves an empty side of {n} rows"
            )));
        }
        let head: Vec<usize> = (0..n - tail).collect();
        let rest: Vec<usize> = (n - tail..n).collect();
        Ok((self.select(&head)?, self.select(&rest)?))
    }

    fn select(&self, rows: &[usize]) -> Result<Dataset> {
        Ok(Dataset {
            inputs: self.inputs.select_rows(rows)?,
            labels: self.labels.select_rows(rows)?,
        })
    }

    /// The four XOR samples with a single 0/1 target column.
    pub fn xor() -> Result<Dataset> {
        Ok(Dataset {
            inputs: Matrix::from_vec(4, 2, vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0])?,
            labels: Matrix::from_vec(4, 1, vec![0.0, 1.0, 1.0, 0.0])?,
        })
    }
}

/// Reads and parses a CSV file.
pub fn load_csv<P: AsRef<Path>>(path: P, mode: LabelMode) -> Result<Dataset> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let dataset = parse_csv(&text, mode)?;
    log::debug!(
        "loaded {} samples ({} features, {} targets) from {}",
        dataset.len(),
        dataset.inputs.cols(),
        dataset.labels.cols(),
        path.as_ref().display()
    );
    Ok(dataset)
}

/// Parses CSV text into a [`Dataset`]. Errors carry the 1-based line number.
pub fn parse_csv(text: &str, mode: LabelMode) -> Result<Dataset> {
    let mut inputs: Vec<Vec<f64>> = Vec::new();
    let mut labels: Vec<Vec<f64>> = Vec::new();
    let mut first_row = true;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let cells = split_row(line);
        if std::mem::replace(&mut first_row, false) && is_header(&cells) {
            continue;
        }

        let (features, target) = match mode {
            LabelMode::ClassIndex { n_classes } => {
                let (label, features) = match cells.split_last() {
                    Some((label, features)) if !features.is_empty() => (label, features),
                    _ => return Err(too_few(line_no, 2, cells.len())),
                };
                (parse_floats(features, line_no)?, one_hot(label, n_classes, line_no)?)
            }
            LabelMode::LeadingClassIndex { n_classes } => {
                let (label, features) = match cells.split_first() {
                    Some((label, features)) if !features.is_empty() => (label, features),
                    _ => return Err(too_few(line_no, 2, cells.len())),
                };
                (parse_floats(features, line_no)?, one_hot(label, n_classes, line_no)?)
            }
            LabelMode::OneHot { n_label_cols } => {
                if cells.len() < n_label_cols + 1 {
                    return Err(too_few(line_no, n_label_cols + 1, cells.len()));
                }
                let (features, target) = cells.split_at(cells.len() - n_label_cols);
                (parse_floats(features, line_no)?, parse_floats(target, line_no)?)
            }
        };

        if let Some(first) = inputs.first() {
            if first.len() != features.len() {
                return Err(NnError::Parse {
                    line: line_no,
                    msg: format!("{} features, expected {}", features.len(), first.len()),
                });
            }
        }
        inputs.push(features);
        labels.push(target);
    }

    if inputs.is_empty() {
        return Err(NnError::Parse { line: 0, msg: "no data rows".into() });
    }
    Ok(Dataset {
        inputs: Matrix::from_rows(&inputs)?,
        labels: Matrix::from_rows(&labels)?,
    })
}

fn is_header(cells: &[String]) -> bool {
    cells.iter().any(|c| {
        let t = c.trim();
        !t.is_empty() && t.parse::<f64>().is_err()
    })
}

/// Splits one line on commas outside double quotes.
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn parse_floats(cells: &[String], line: usize) -> Result<Vec<f64>> {
    cells
        .iter()
        .map(|c| {
            c.trim().parse::<f64>().map_err(|_| NnError::Parse {
                line,
                msg: format!("'{}' is not a number", c.trim()),
            })
        })
        .collect()
}

fn one_hot(cell: &str, n_classes: usize, line: usize) -> Result<Vec<f64>> {
    let class = cell.trim().parse::<usize>().map_err(|_| NnError::Parse {
        line,
        msg: format!("class index '{}' is not a non-negative integer", cell.trim()),
    })?;
    if class >= n_classes {
        return Err(NnError::Parse {
            line,
            msg: format!("class index {class} out of range for {n_classes} classes"),
        });
    }
    let mut target = vec![0.0; n_classes];
    target[class] = 1.0;
    Ok(target)
}

fn too_few(line: usize, expected: usize, got: usize) -> NnError {
    NnError::Parse { line, msg: format!("expected at least {expected} columns, got {got}") }
}
