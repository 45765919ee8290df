//! Shake Gesture Engine Library
//!
//! A lightweight shake-to-toggle recognizer for mobile torch utilities. It
//! consumes a raw accelerometer stream one sample at a time and calls back
//! whenever the user completes a deliberate shake.
//!
//! # Design Philosophy
//!
//! - **Push-driven**: The host's sensor listener calls [`GestureDetector::ingest`];
//!   the detector owns no thread and never blocks.
//! - **One engine, two tiers**: A single-jolt policy and a double-shake policy
//!   share the same input contract, history and cooldown gate.
//! - **Battery awareness**: O(1) processing per sample with a fixed-size history.
//! - **Noise, not errors**: Sensor glitches are treated as non-peaks.
//!
//! # Example
//!
//! ```
//! use shake_sensing::{AccelSample, GestureDetector};
//!
//! let mut toggles = 0;
//! let mut detector = GestureDetector::single_jolt(50.0, || toggles += 1);
//!
//! detector.ingest(&AccelSample::new(1000, [0.0, 0.0, 0.0]));
//! detector.ingest(&AccelSample::new(3000, [60.0, 0.0, 0.0]));
//! drop(detector);
//!
//! assert_eq!(toggles, 1);
//! ```

pub mod config;
pub mod detector;
pub mod error;
pub mod ffi;
pub mod history;
pub mod replay;
pub mod types;


// Re-export commonly used types
pub use config::{DetectorConfig, RecognitionPolicy, Sensitivity};
pub use detector::{GestureDetector, ShakeSequence};
pub use error::{ConfigError, ReplayError};
pub use history::HistoryBuffer;
pub use replay::GestureEvent;
pub use types::{AccelSample, MotionDelta, ShakeDirection};
