//! Implementation of different callback functions.
use crate::core::estimators::{BasicEstimators, Estimators};
use crate::core::Checkpoint;
use crate::error::Result;

use log::error;
use num_traits::Float;
use serde::Serialize;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::Add;
use std::path::{Path, PathBuf};

/// Trait for implementing callbacks for iterative MC algorithms
pub trait Callback<T, R, E> {
    /// This method is called after each successfully finished iteration and may print information
    /// about it.
    fn print(&self, chkpts: &[Checkpoint<R, E>]);
}

/// A callback function that does nothing
pub struct SinkCallback {}

impl<T, R, E> Callback<T, R, E> for SinkCallback {
    fn print(&self, _: &[Checkpoint<R, E>]) {}
}

/// A callback function that prints the result of each individual iteration
pub struct SimpleCallback {}

impl<T, R, E> Callback<T, R, E> for SimpleCallback
where
    T: Display + Float,
    E: Estimators<T>,
{
    fn print(&self, chkpts: &[Checkpoint<R, E>]) {
        let iteration = chkpts.len();
        // Make sure that there is at least one checkpoint
        // otherwise do nothing.
        if let Some(chkpt) = chkpts.last() {
            let estimators = chkpt.estimators();
            println!("iteration {} finished.", iteration - 1);
            println!(
                "this iteration: N={} E={}",
                estimators.calls(),
                estimators.result()
            );
        }
    }
}

/// Simple cumulative callback that shows the result of the individual integration
/// together with the cumulative result combining it with the previous iterations.
pub struct SimpleCumulativeCallback {}

impl<T, R, E> Callback<T, R, E> for SimpleCumulativeCallback
where
    T: Display + Float,
    E: Clone + Estimators<T> + Add<Output = E>,
{
    fn print(&self, chkpts: &[Checkpoint<R, E>]) {
        let iteration = chkpts.len();

        let last = match chkpts.last() {
            Some(chkpt) => chkpt.estimators(),
            None => return,
        };

        // Compute the cumulative result.
        let cumulative = chkpts
            .iter()
            .map(|c| c.estimators().clone())
            .reduce(|acc, e| acc + e);

        if let Some(cumulative) = cumulative {
            println!(
                "[iteration {}: N={} E={}] [Cumulative: N={}, E={}]",
                iteration - 1,
                last.calls(),
                last.result(),
                cumulative.calls(),
                cumulative.result()
            );
        }
    }
}

/// A callback that writes all checkpoints as JSON to a file after every iteration, replacing the
/// previous content.
pub struct FileWriterCallback {
    path: PathBuf,
}

impl FileWriterCallback {
    /// Constructor.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn write<R: Serialize, E: Serialize>(
        &self,
        chkpts: &[Checkpoint<R, E>],
    ) -> Result<()> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer(&mut writer, chkpts)?;
        writer.flush()?;
        Ok(())
    }
}

impl<T, R, E> Callback<T, R, E> for FileWriterCallback
where
    R: Serialize,
    E: Serialize,
{
    fn print(&self, chkpts: &[Checkpoint<R, E>]) {
        if let Err(err) = self.write(chkpts) {
            error!(
                "could not write checkpoints to `{}`: {}",
                self.path.display(),
                err
            );
        }
    }
}
