use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::types::ControlVector;
use parking_lot::Mutex;
use std::sync::Arc;

/// Where the worker reads the control vector at the start of each cycle.
pub trait ControlSource: Send + Sync {
    fn control(&self) -> ControlVector;
}

/// Latest externally supplied control vector, shared between the side that
/// sets it and the worker that sends it. All four values are swapped as one
/// unit so the worker never sees a half updated vector.
#[derive(Clone, Default)]
pub struct ControlInput {
    current: Arc<Mutex<ControlVector>>,
}

impl ControlInput {
    pub fn new(initial: ControlVector) -> Self {
        Self {
            current: Arc::new(Mutex::new(initial)),
        }
    }

    pub fn set(&self, control: ControlVector) {
        *self.current.lock() = control;
    }

    pub fn get(&self) -> ControlVector {
        *self.current.lock()
    }
}

impl ControlSource for ControlInput {
    fn control(&self) -> ControlVector {
        self.get()
    }
}

/// Owned by the application side. Cycles through a dataset and/or carries
/// the live input vector.
pub struct SampleSource {
    dataset: Dataset,
    cursor: usize,
    input: ControlInput,
}

impl SampleSource {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            cursor: 0,
            input: ControlInput::default(),
        }
    }

    /// Next dataset sample, wrapping back to the first after the last.
    pub fn next(&mut self) -> Result<ControlVector> {
        let sample = *self.dataset.get(self.cursor).ok_or(Error::EmptyDataset)?;
        self.cursor = (self.cursor + 1) % self.dataset.len();
        Ok(sample)
    }

    /// Latest externally set vector. All zeros until the first `set`.
    pub fn current(&self) -> ControlVector {
        self.input.get()
    }

    pub fn set(&self, control: ControlVector) {
        self.input.set(control);
    }

    /// Makes the next dataset sample the live input.
    pub fn advance(&mut self) -> Result<ControlVector> {
        let sample = self.next()?;
        self.input.set(sample);
        Ok(sample)
    }

    /// Handle the worker reads from.
    pub fn input(&self) -> ControlInput {
        self.input.clone()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
