//! Shake Gesture Recognition Module.
//!
//! Turns a live accelerometer stream into discrete "gesture recognized"
//! notifications. One engine runs either of two tiers:
//! - Single jolt: any delta above threshold toggles, then a long cooldown
//! - Double shake: two verified peaks along a common axis within a window
//!
//! The detector is driven entirely by its caller. Each `ingest` call does a
//! fixed amount of arithmetic over a small history buffer and, when a gesture
//! completes, runs the notification callback before returning.

use log::{debug, info, trace};

use crate::config::{DetectorConfig, RecognitionPolicy};
use crate::error::ConfigError;
use crate::history::HistoryBuffer;
use crate::types::{AccelSample, MotionDelta, ShakeDirection};

/// Progress through a double-shake gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShakeSequence {
    /// No shake accumulated.
    Idle,
    /// One shake accumulated, waiting for the second.
    Armed {
        first_ms: u64,
        direction: ShakeDirection,
    },
}

impl ShakeSequence {
    /// Shakes accumulated so far (0 or 1).
    pub fn count(&self) -> u8 {
        match self {
            ShakeSequence::Idle => 0,
            ShakeSequence::Armed { .. } => 1,
        }
    }
}

/// Per-tier recognition state.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Recognizer {
    SingleJolt,
    DoubleShake(ShakeSequence),
}

impl Recognizer {
    fn for_policy(policy: RecognitionPolicy) -> Self {
        match policy {
            RecognitionPolicy::SingleJolt => Recognizer::SingleJolt,
            RecognitionPolicy::DoubleShake => Recognizer::DoubleShake(ShakeSequence::Idle),
        }
    }
}

/// Stateful shake detector over a push-driven sample stream.
///
/// `F` is the notification callback. It runs synchronously inside [`ingest`]
/// and should return quickly.
///
/// Thread Safety:
/// - Not synchronized. Callers feeding one detector from several sources must
///   serialize access themselves.
///
/// [`ingest`]: GestureDetector::ingest
pub struct GestureDetector<F>
where
    F: FnMut(),
{
    config: DetectorConfig,
    on_gesture: F,

    // Cross-call state
    last_sample: Option<AccelSample>,
    last_peak_ms: Option<u64>,
    history: HistoryBuffer,
    recognizer: Recognizer,

    // Statistics
    samples_seen: u64,
    gestures_recognized: u64,
}

impl<F> GestureDetector<F>
where
    F: FnMut(),
{
    /// Create a detector from a validated configuration.
    pub fn new(config: DetectorConfig, on_gesture: F) -> Result<Self, ConfigError> {
        let config = config.resolved()?;
        Ok(Self::with_config(config, on_gesture))
    }

    /// Single-jolt detector with default tuning.
    pub fn single_jolt(threshold: f32, on_gesture: F) -> Self {
        Self::with_config(
            DetectorConfig::for_policy(RecognitionPolicy::SingleJolt, threshold),
            on_gesture,
        )
    }

    /// Double-shake detector with default tuning.
    pub fn double_shake(threshold: f32, on_gesture: F) -> Self {
        Self::with_config(
            DetectorConfig::for_policy(RecognitionPolicy::DoubleShake, threshold),
            on_gesture,
        )
    }

    fn with_config(config: DetectorConfig, on_gesture: F) -> Self {
        Self {
            history: HistoryBuffer::new(config.history_capacity),
            recognizer: Recognizer::for_policy(config.policy),
            config,
            on_gesture,
            last_sample: None,
            last_peak_ms: None,
            samples_seen: 0,
            gestures_recognized: 0,
        }
    }

    /// Feed one sample. Returns `true` if it completed a gesture, in which
    /// case the callback has already run.
    pub fn ingest(&mut self, sample: &AccelSample) -> bool {
        self.samples_seen += 1;

        let Some(previous) = self.last_sample.replace(*sample) else {
            // Baseline only: a delta needs two points
            return false;
        };

        let delta = MotionDelta::between(&previous, sample);
        self.history.push(delta);

        let mut recognized = false;
        if self.is_candidate(&delta) {
            recognized = match self.recognizer {
                Recognizer::SingleJolt => {
                    self.last_peak_ms = Some(delta.timestamp_ms);
                    true
                }
                Recognizer::DoubleShake(_) => self.verify_and_handle_peak(&delta),
            };
        }

        self.expire_sequence(sample.timestamp_ms);

        if recognized {
            self.gestures_recognized += 1;
            info!(
                "shake gesture #{} recognized at {} ms ({}, magnitude {:.2})",
                self.gestures_recognized,
                sample.timestamp_ms,
                self.config.policy.as_str(),
                delta.magnitude,
            );
            (self.on_gesture)();
        }

        recognized
    }

    /// Replace the threshold. Takes effect on the next `ingest`.
    pub fn update_threshold(&mut self, threshold: f32) {
        debug!("threshold {:.2} -> {:.2}", self.config.threshold, threshold);
        self.config.threshold = threshold;
    }

    /// Forget the baseline, timestamps, shake sequence and history.
    ///
    /// Call before the sensor stream is paused or restarted so the first
    /// sample afterwards is not diffed against a stale reading.
    pub fn reset(&mut self) {
        self.last_sample = None;
        self.last_peak_ms = None;
        self.history.clear();
        self.recognizer = Recognizer::for_policy(self.config.policy);
        debug!("detector reset");
    }

    /// Current threshold a delta must strictly exceed.
    pub fn threshold(&self) -> f32 {
        self.config.threshold
    }

    /// Active recognition tier.
    pub fn policy(&self) -> RecognitionPolicy {
        self.config.policy
    }

    /// Effective configuration, including threshold updates.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Shakes accumulated toward the current double-shake gesture.
    pub fn pending_shakes(&self) -> u8 {
        match self.recognizer {
            Recognizer::SingleJolt => 0,
            Recognizer::DoubleShake(sequence) => sequence.count(),
        }
    }

    /// Current double-shake progress, `None` for the single-jolt tier.
    pub fn sequence(&self) -> Option<ShakeSequence> {
        match self.recognizer {
            Recognizer::SingleJolt => None,
            Recognizer::DoubleShake(sequence) => Some(sequence),
        }
    }

    /// Gestures recognized since construction. Not cleared by `reset`.
    pub fn gestures_recognized(&self) -> u64 {
        self.gestures_recognized
    }

    /// Samples ingested since construction.
    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    /// Deltas currently held in history.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // =========================================================================
    // PRIVATE METHODS
    // =========================================================================

    /// Threshold crossed and the tier's cooldown has elapsed.
    fn is_candidate(&self, delta: &MotionDelta) -> bool {
        // NaN threshold must fail the test, so compare with `>` only
        let crossed = delta.magnitude > self.config.threshold;
        if !delta.is_finite() || !crossed {
            return false;
        }

        let interval = match self.recognizer {
            Recognizer::SingleJolt => self.config.jolt_cooldown_ms,
            Recognizer::DoubleShake(_) => self.config.min_peak_interval_ms,
        };

        match self.last_peak_ms {
            Some(last) if delta.timestamp_ms.saturating_sub(last) < interval => {
                trace!(
                    "candidate {:.2} at {} ms suppressed, {} ms since last peak",
                    delta.magnitude,
                    delta.timestamp_ms,
                    delta.timestamp_ms.saturating_sub(last),
                );
                false
            }
            _ => true,
        }
    }

    fn verify_and_handle_peak(&mut self, delta: &MotionDelta) -> bool {
        if !self
            .history
            .is_local_peak(delta.magnitude, self.config.peak_lookback)
        {
            trace!(
                "candidate {:.2} at {} ms is not a local peak",
                delta.magnitude,
                delta.timestamp_ms
            );
            return false;
        }

        let Recognizer::DoubleShake(sequence) = self.recognizer else {
            return false;
        };

        self.last_peak_ms = Some(delta.timestamp_ms);
        let direction = delta.direction();

        let (next, recognized) = match sequence {
            ShakeSequence::Idle => {
                debug!("first shake at {} ms, armed", delta.timestamp_ms);
                (
                    ShakeSequence::Armed {
                        first_ms: delta.timestamp_ms,
                        direction,
                    },
                    false,
                )
            }
            ShakeSequence::Armed {
                first_ms,
                direction: first,
            } => {
                let elapsed = delta.timestamp_ms.saturating_sub(first_ms);

                if elapsed > self.config.second_shake_window_ms {
                    debug!(
                        "second shake {} ms after first is too late, re-armed",
                        elapsed
                    );
                    (
                        ShakeSequence::Armed {
                            first_ms: delta.timestamp_ms,
                            direction,
                        },
                        false,
                    )
                } else {
                    let consistency = first.consistency(&direction);
                    let in_window = elapsed >= self.config.min_peak_interval_ms;

                    if in_window && consistency >= self.config.direction_consistency {
                        (ShakeSequence::Idle, true)
                    } else {
                        debug!(
                            "second shake rejected (elapsed {} ms, consistency {:.2})",
                            elapsed, consistency
                        );
                        (ShakeSequence::Idle, false)
                    }
                }
            }
        };

        self.recognizer = Recognizer::DoubleShake(next);
        recognized
    }

    fn expire_sequence(&mut self, now_ms: u64) {
        if let Recognizer::DoubleShake(ShakeSequence::Armed { first_ms, .. }) = self.recognizer {
            let elapsed = now_ms.saturating_sub(first_ms);
            if elapsed > self.config.sequence_timeout_ms {
                debug!("shake sequence timed out after {} ms", elapsed);
                self.recognizer = Recognizer::DoubleShake(ShakeSequence::Idle);
            }
        }
    }
}

impl<F> std::fmt::Debug for GestureDetector<F>
where
    F: FnMut(),
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureDetector")
            .field("config", &self.config)
            .field("last_sample", &self.last_sample)
            .field("last_peak_ms", &self.last_peak_ms)
            .field("history_len", &self.history.len())
            .field("recognizer", &self.recognizer)
            .field("gestures_recognized", &self.gestures_recognized)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    const REST: [f32; 3] = [0.0, 0.0, 9.81];

    fn counter() -> (Rc<Cell<u32>>, impl FnMut()) {
        let count = Rc::new(Cell::new(0));
        let handle = count.clone();
        (count, move || handle.set(handle.get() + 1))
    }

    fn rest(timestamp_ms: u64) -> AccelSample {
        AccelSample::new(timestamp_ms, REST)
    }

    fn jolt(timestamp_ms: u64, offset: [f32; 3]) -> AccelSample {
        AccelSample::new(
            timestamp_ms,
            [REST[0] + offset[0], REST[1] + offset[1], REST[2] + offset[2]],
        )
    }

    #[test]
    fn test_detector_creation() {
        let (_, cb) = counter();
        let detector = GestureDetector::double_shake(20.0, cb);
        assert_eq!(detector.gestures_recognized(), 0);
        assert_eq!(detector.pending_shakes(), 0);
        assert_eq!(detector.history_len(), 0);
        assert_eq!(detector.sequence(), Some(ShakeSequence::Idle));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = DetectorConfig::default();
        config.history_capacity = 2;
        assert!(GestureDetector::new(config, || {}).is_err());
    }

    #[test]
    fn test_new_applies_sensitivity() {
        let mut config = DetectorConfig::default();
        config.sensitivity = Some(0);
        let detector = GestureDetector::new(config, || {}).unwrap();
        assert_eq!(detector.threshold(), 75.0);
    }

    #[test]
    fn test_first_sample_is_baseline_only() {
        let (count, cb) = counter();
        let mut detector = GestureDetector::single_jolt(0.0, cb);

        assert!(!detector.ingest(&AccelSample::new(0, [100.0, 100.0, 100.0])));
        assert_eq!(count.get(), 0);
        assert_eq!(detector.history_len(), 0);
        assert_eq!(detector.samples_seen(), 1);
    }

    #[test]
    fn test_single_jolt_fires_and_cools_down() {
        let (count, cb) = counter();
        let mut detector = GestureDetector::single_jolt(50.0, cb);

        detector.ingest(&AccelSample::new(1000, [0.0, 0.0, 0.0]));
        assert!(detector.ingest(&AccelSample::new(3000, [60.0, 0.0, 0.0])));
        assert_eq!(count.get(), 1);

        // Delta (0, 60, 0) only 100 ms later
        assert!(!detector.ingest(&AccelSample::new(3100, [60.0, 60.0, 0.0])));
        assert_eq!(count.get(), 1);
        assert_eq!(detector.pending_shakes(), 0);
        assert_eq!(detector.sequence(), None);
    }

    #[test]
    fn test_single_jolt_cooldown_boundary() {
        let (count, cb) = counter();
        let mut detector = GestureDetector::single_jolt(50.0, cb);

        detector.ingest(&AccelSample::new(0, [0.0, 0.0, 0.0]));
        detector.ingest(&AccelSample::new(100, [60.0, 0.0, 0.0]));
        detector.ingest(&AccelSample::new(1599, [0.0, 0.0, 0.0]));
        assert_eq!(count.get(), 1);

        detector.ingest(&AccelSample::new(1600, [60.0, 0.0, 0.0]));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_threshold_is_strict() {
        let (count, cb) = counter();
        let mut detector = GestureDetector::single_jolt(50.0, cb);

        detector.ingest(&AccelSample::new(0, [0.0, 0.0, 0.0]));
        detector.ingest(&AccelSample::new(20, [50.0, 0.0, 0.0]));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_nan_threshold_never_fires() {
        for policy in [RecognitionPolicy::SingleJolt, RecognitionPolicy::DoubleShake] {
            let (count, cb) = counter();
            let mut detector =
                GestureDetector::new(DetectorConfig::for_policy(policy, 50.0), cb).unwrap();
            detector.update_threshold(f32::NAN);

            for t in [0, 20, 3000, 3020, 3040, 3060, 3400] {
                assert!(!detector.ingest(&rest(t)));
            }
            assert!(!detector.ingest(&jolt(3600, [60.0, 0.0, 0.0])));
            assert_eq!(count.get(), 0);
            assert_eq!(detector.pending_shakes(), 0);
        }
    }

    #[test]
    fn test_update_threshold_applies_next_sample() {
        let (count, cb) = counter();
        let mut detector = GestureDetector::single_jolt(75.0, cb);

        detector.ingest(&AccelSample::new(0, [0.0, 0.0, 0.0]));
        detector.ingest(&AccelSample::new(20, [40.0, 0.0, 0.0]));
        assert_eq!(count.get(), 0);

        detector.update_threshold(10.0);
        assert_eq!(detector.threshold(), 10.0);
        detector.ingest(&AccelSample::new(40, [0.0, 0.0, 0.0]));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_non_finite_sample_is_noise() {
        let (count, cb) = counter();
        let mut detector = GestureDetector::single_jolt(10.0, cb);

        detector.ingest(&AccelSample::new(0, [0.0, 0.0, 0.0]));
        detector.ingest(&AccelSample::new(20, [f32::INFINITY, 0.0, 0.0]));
        detector.ingest(&AccelSample::new(40, [f32::NAN, 0.0, 0.0]));
        assert_eq!(count.get(), 0);

        // Recovers once two finite samples are in place
        detector.ingest(&AccelSample::new(60, [0.0, 0.0, 0.0]));
        detector.ingest(&AccelSample::new(80, [30.0, 0.0, 0.0]));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_double_shake_needs_history_context() {
        let (count, cb) = counter();
        let mut detector = GestureDetector::double_shake(20.0, cb);

        detector.ingest(&rest(0));
        detector.ingest(&jolt(20, [30.0, 0.0, 0.0]));
        assert_eq!(detector.pending_shakes(), 0);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_double_shake_arms_then_fires() {
        let (count, cb) = counter();
        let mut detector = GestureDetector::double_shake(20.0, cb);

        for t in (0..=100).step_by(20) {
            detector.ingest(&rest(t));
        }

        detector.ingest(&jolt(120, [30.0, 0.0, 0.0]));
        assert_eq!(detector.pending_shakes(), 1);
        detector.ingest(&rest(140));

        for t in (160..720).step_by(20) {
            detector.ingest(&rest(t));
        }

        assert!(detector.ingest(&jolt(720, [30.0, 0.0, 0.0])));
        assert_eq!(count.get(), 1);
        assert_eq!(detector.pending_shakes(), 0);
        assert_eq!(detector.gestures_recognized(), 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let (count, cb) = counter();
        let mut detector = GestureDetector::double_shake(20.0, cb);

        for t in (0..=100).step_by(20) {
            detector.ingest(&rest(t));
        }
        detector.ingest(&jolt(120, [30.0, 0.0, 0.0]));
        assert_eq!(detector.pending_shakes(), 1);

        detector.reset();
        assert_eq!(detector.pending_shakes(), 0);
        assert_eq!(detector.history_len(), 0);

        // First sample after reset is a fresh baseline, even if far away
        assert!(!detector.ingest(&jolt(5000, [500.0, 0.0, 0.0])));
        assert_eq!(detector.history_len(), 0);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_out_of_order_timestamps_do_not_panic() {
        let (_, cb) = counter();
        let mut detector = GestureDetector::double_shake(20.0, cb);

        for t in (0..=100).step_by(20) {
            detector.ingest(&rest(t));
        }
        detector.ingest(&jolt(1000, [30.0, 0.0, 0.0]));
        detector.ingest(&rest(500));
        detector.ingest(&jolt(400, [0.0, 30.0, 0.0]));
    }
}
