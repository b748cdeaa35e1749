//! Test vectors recorded from the glove, one comma separated row per sample.
//!
//! The first line is a header. Only the last four fields of a row are used,
//! in the order thumb, index, middle, abduction; anything before them
//! (timestamps, ids) is ignored.

use crate::error::{Error, Result};
use crate::types::{ControlVector, CONTROL_LEN};
use log::*;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    samples: Vec<ControlVector>,
}

impl Dataset {
    pub fn new(samples: Vec<ControlVector>) -> Self {
        Self { samples }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::DatasetMissing(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let dataset = Self::parse(&text);
        info!("Loaded dataset {:?} with {} samples", path, dataset.len());
        Ok(dataset)
    }

    /// Never fails. A missing, unreadable or empty dataset is logged and
    /// yields an empty dataset, which turns sample cycling into a no-op.
    pub fn load_or_empty(path: &Path) -> Self {
        let result = Self::load(path).and_then(|dataset| {
            if dataset.is_empty() {
                Err(Error::DatasetEmpty(path.to_path_buf()))
            } else {
                Ok(dataset)
            }
        });
        match result {
            Ok(dataset) => dataset,
            Err(e) => {
                error!("{}", e);
                Self::default()
            }
        }
    }

    pub fn parse(text: &str) -> Self {
        let samples = text
            .lines()
            .enumerate()
            .skip(1)
            .filter_map(|(line_number, line)| parse_row(line_number + 1, line))
            .collect();
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ControlVector> {
        self.samples.get(index)
    }

    pub fn samples(&self) -> &[ControlVector] {
        &self.samples
    }
}

fn parse_row(line_number: usize, line: &str) -> Option<ControlVector> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < CONTROL_LEN {
        trace!("Skipping dataset line {} with {} fields", line_number, fields.len());
        return None;
    }
    let mut values = [0f32; CONTROL_LEN];
    for (value, field) in values.iter_mut().zip(&fields[fields.len() - CONTROL_LEN..]) {
        match field.trim().parse::<f32>() {
            Ok(parsed) => *value = parsed,
            Err(e) => {
                warn!(
                    "Skipping dataset line {}: {:?} is not a number ({})",
                    line_number, field, e
                );
                return None;
            }
        }
    }
    Some(ControlVector::from_array(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn takes_last_four_columns() {
        let dataset = Dataset::parse("a,b,c,thumb,index,middle,abd\n0,1,2,0.10,0.20,0.30,0.40\n");
        assert_eq!(dataset.len(), 1);
        assert_eq!(
            dataset.get(0),
            Some(&ControlVector::new(0.10, 0.20, 0.30, 0.40))
        );
    }

    #[test]
    fn short_rows_are_skipped() {
        let dataset = Dataset::parse("header\n1,2,3\n0.5,0.5,0.5,0.5\n\n");
        assert_eq!(dataset.samples(), &[ControlVector::new(0.5, 0.5, 0.5, 0.5)]);
    }

    #[test]
    fn header_is_skipped_even_if_numeric() {
        let dataset = Dataset::parse("1,1,1,1\n2,2,2,2\n");
        assert_eq!(dataset.samples(), &[ControlVector::new(2.0, 2.0, 2.0, 2.0)]);
    }

    #[test]
    fn windows_line_endings_and_bad_numbers() {
        let dataset = Dataset::parse("h\r\n1,0.25,0.5,0.75,1.0\r\n1,x,0.5,0.75,1.0\r\n");
        assert_eq!(dataset.samples(), &[ControlVector::new(0.25, 0.5, 0.75, 1.0)]);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "t,thumb,index,middle,abduction").unwrap();
        writeln!(file, "0,0.1,0.2,0.3,0.4").unwrap();
        writeln!(file, "1,0.5,0.6,0.7,0.8").unwrap();
        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.get(1), Some(&ControlVector::new(0.5, 0.6, 0.7, 0.8)));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.csv");
        assert!(matches!(Dataset::load(&path), Err(Error::DatasetMissing(_))));
        assert!(Dataset::load_or_empty(&path).is_empty());
    }

    #[test]
    fn header_only_file_is_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "thumb,index,middle,abduction").unwrap();
        assert!(Dataset::load_or_empty(file.path()).is_empty());
    }
}
