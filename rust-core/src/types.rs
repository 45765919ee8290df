//! Core data types for the shake gesture engine.
//!
//! This module defines the values that flow through the detector: raw
//! accelerometer samples, the per-sample motion deltas derived from them,
//! and the direction vectors used to compare two shakes.
//!
//! Design principle: Types should make intent obvious. If a concept exists,
//! it gets a type. Never pass raw tuples across boundaries.

/// A single raw accelerometer reading.
///
/// This is the minimal input contract: three axes in the sensor's native unit
/// plus a monotonic timestamp. Gravity is never removed.
///
/// Design note: We use f32 for on-device execution to save memory and battery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelSample {
    /// Monotonic timestamp in milliseconds. Required for temporal ordering.
    pub timestamp_ms: u64,

    /// Accelerometer reading [x, y, z] in native sensor units.
    pub accel: [f32; 3],
}

impl AccelSample {
    /// Creates a new accelerometer sample.
    ///
    /// Assumptions:
    /// - timestamp_ms must be non-decreasing within a stream
    pub fn new(timestamp_ms: u64, accel: [f32; 3]) -> Self {
        Self {
            timestamp_ms,
            accel,
        }
    }

    /// Convenience constructor matching the host's `(x, y, z, timestamp)` order.
    pub fn from_xyz(x: f32, y: f32, z: f32, timestamp_ms: u64) -> Self {
        Self::new(timestamp_ms, [x, y, z])
    }

    /// Magnitude of the raw reading (gravity included).
    pub fn magnitude(&self) -> f32 {
        norm(self.accel)
    }
}

/// Change in acceleration between two consecutive samples.
///
/// The delta is a gravity-invariant proxy for jolt: a phone held still in any
/// orientation produces deltas near zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionDelta {
    /// Timestamp of the newer of the two samples.
    pub timestamp_ms: u64,
    /// Per-axis delta [dx, dy, dz].
    pub delta: [f32; 3],
    /// Euclidean norm of `delta`.
    pub magnitude: f32,
}

impl MotionDelta {
    /// Compute the delta going from `previous` to `current`.
    pub fn between(previous: &AccelSample, current: &AccelSample) -> Self {
        let delta = [
            current.accel[0] - previous.accel[0],
            current.accel[1] - previous.accel[1],
            current.accel[2] - previous.accel[2],
        ];

        Self {
            timestamp_ms: current.timestamp_ms,
            delta,
            magnitude: norm(delta),
        }
    }

    /// Direction of this delta as a unit vector.
    pub fn direction(&self) -> ShakeDirection {
        ShakeDirection::from_vector(self.delta)
    }

    /// Whether every component and the magnitude are finite.
    pub fn is_finite(&self) -> bool {
        self.magnitude.is_finite() && self.delta.iter().all(|d| d.is_finite())
    }
}

/// Normalized direction of a detected shake.
///
/// Always unit length, except the degenerate zero vector which is kept as-is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShakeDirection([f32; 3]);

impl ShakeDirection {
    /// Normalize `v`. A zero vector passes through unnormalized.
    pub fn from_vector(v: [f32; 3]) -> Self {
        let mag = norm(v);
        if mag > 0.0 {
            Self([v[0] / mag, v[1] / mag, v[2] / mag])
        } else {
            Self(v)
        }
    }

    /// Components [x, y, z].
    pub fn components(&self) -> [f32; 3] {
        self.0
    }

    /// Dot product with another direction.
    pub fn dot(&self, other: &ShakeDirection) -> f32 {
        self.0[0] * other.0[0] + self.0[1] * other.0[1] + self.0[2] * other.0[2]
    }

    /// Absolute dot product: 1.0 for the same or opposite axis, 0.0 for orthogonal.
    ///
    /// A back-and-forth shake reverses sign between strokes, so sign is ignored.
    pub fn consistency(&self, other: &ShakeDirection) -> f32 {
        self.dot(other).abs()
    }
}

fn norm(v: [f32; 3]) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}
