//! Offline replay of recorded accelerometer logs.
//!
//! Logs are CSV with a header row and one sample per line:
//!
//! ```text
//! timestamp_ms,x,y,z
//! 0,0.01,0.02,9.81
//! 20,0.02,0.01,9.80
//! ```
//!
//! Lines starting with `#` are comments. Whitespace around fields is ignored.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detector::GestureDetector;
use crate::error::ReplayError;
use crate::types::AccelSample;

#[derive(Debug, Deserialize)]
struct SampleRecord {
    timestamp_ms: u64,
    x: f32,
    y: f32,
    z: f32,
}

/// One recognized gesture during a replay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GestureEvent {
    /// 1-based gesture number within the replay.
    pub sequence: u64,
    /// Timestamp of the sample that completed the gesture.
    pub timestamp_ms: u64,
    /// Torch state after this gesture toggled it.
    pub torch_on: bool,
}

/// Parse a sample log from any reader.
///
/// Timestamps must be non-decreasing; a sample that goes back in time is
/// rejected rather than silently fed to the detector.
pub fn read_samples<R: Read>(reader: R) -> Result<Vec<AccelSample>, ReplayError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut samples = Vec::new();
    let mut previous_ms: Option<u64> = None;

    for result in csv_reader.records() {
        let raw = result?;
        let record: SampleRecord = raw.deserialize(Some(&headers))?;

        if let Some(previous_ms) = previous_ms {
            if record.timestamp_ms < previous_ms {
                let line = raw.position().map(|p| p.line()).unwrap_or_default();
                return Err(ReplayError::OutOfOrder {
                    line,
                    timestamp_ms: record.timestamp_ms,
                    previous_ms,
                });
            }
        }
        previous_ms = Some(record.timestamp_ms);

        samples.push(AccelSample::new(
            record.timestamp_ms,
            [record.x, record.y, record.z],
        ));
    }

    Ok(samples)
}

/// Parse a sample log from a file.
pub fn load_samples(path: impl AsRef<Path>) -> Result<Vec<AccelSample>, ReplayError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_samples(file)
}

/// Feed `samples` through `detector` in order and collect every gesture.
///
/// The torch starts off and flips on each gesture.
pub fn replay<F>(detector: &mut GestureDetector<F>, samples: &[AccelSample]) -> Vec<GestureEvent>
where
    F: FnMut(),
{
    let mut events = Vec::new();
    let mut torch_on = false;

    for sample in samples {
        if detector.ingest(sample) {
            torch_on = !torch_on;
            events.push(GestureEvent {
                sequence: events.len() as u64 + 1,
                timestamp_ms: sample.timestamp_ms,
                torch_on,
            });
        }
    }

    events
}
