use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::Local;
use log::info;
use serde_json::Value;

use crate::error::SearchError;

/// CSV sink for one sweep run.
///
/// The header row is `index`, then the input columns, then the criterion
/// columns. Every append is flushed, so the file is a valid, parseable
/// prefix at any moment, including after an aborted run.
pub struct CsvSink {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl CsvSink {
    /// Creates the timestamped output file under `output_dir` (created if
    /// absent) and writes the header row.
    pub fn create(
        output_dir: &Path,
        input_columns: &[&str],
        criterion_columns: &[&str],
    ) -> Result<Self, SearchError> {
        fs::create_dir_all(output_dir)?;

        let stamp = Local::now().format("%Y_%m_%d_%H_%M_%S");
        let path = output_dir.join(format!("cctsweep_output_{stamp}.csv"));
        let file = File::create(&path)?;
        let mut writer = csv::Writer::from_writer(file);

        let mut header = Vec::with_capacity(1 + input_columns.len() + criterion_columns.len());
        header.push("index");
        header.extend_from_slice(input_columns);
        header.extend_from_slice(criterion_columns);
        writer.write_record(&header)?;
        writer.flush()?;

        info!("output file initialized: {}", path.display());
        Ok(Self { writer, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one completed grid point. Input values keep their original
    /// per-descriptor representation; criterion values are rendered with
    /// full round-trip precision.
    pub fn append(
        &mut self,
        step: usize,
        inputs: &[Value],
        outputs: &[f64],
    ) -> Result<(), SearchError> {
        let mut record = Vec::with_capacity(1 + inputs.len() + outputs.len());
        record.push(step.to_string());
        record.extend(inputs.iter().map(render_value));
        record.extend(outputs.iter().map(|value| value.to_string()));
        self.writer.write_record(&record)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and closes the sink, returning the output path.
    pub fn finish(mut self) -> Result<PathBuf, SearchError> {
        self.writer.flush()?;
        Ok(self.path)
    }
}

fn render_value(value: &Value) -> String {
    match value {
        // bare strings, not JSON-quoted ones
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
