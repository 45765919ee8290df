//! C FFI Bindings for Mobile Host Integration
//!
//! This module exposes the shake detector to the host app's native bridge via
//! C ABI. The host's sensor listener forwards each accelerometer event to
//! `shake_detector_ingest`; the callback given at creation toggles the torch.
//!
//! Memory Safety:
//! - The engine instance must be freed with `shake_detector_destroy()`
//! - NULL checks are performed on all inputs
//! - `user_data` is passed back to the callback untouched; the host owns it
//!
//! Thread Safety:
//! - The engine is NOT thread-safe. Use a single thread or mutex.
//! - The callback runs on the thread that called `shake_detector_ingest`.

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::ptr;

use crate::config::{DetectorConfig, RecognitionPolicy, Sensitivity};
use crate::detector::GestureDetector;
use crate::types::AccelSample;

// ============================================================================
// OPAQUE HANDLE TYPES
// ============================================================================

/// Host callback invoked once per recognized gesture.
pub type ShakeCallback = Option<unsafe extern "C" fn(user_data: *mut c_void)>;

/// Opaque handle to a shake detector.
pub struct ShakeEngine {
    detector: GestureDetector<Box<dyn FnMut()>>,
}

/// Result status codes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShakeStatus {
    /// Operation succeeded.
    Ok = 0,
    /// Null pointer provided.
    NullPointer = 1,
    /// Invalid parameter value.
    InvalidParameter = 2,
}

/// Configuration for the engine.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ShakeConfig {
    /// Recognition policy (0 = single jolt, 1 = double shake).
    pub policy: i32,
    /// Delta magnitude threshold in raw sensor units.
    /// Ignored when `sensitivity` is in 0..=50.
    pub threshold: f32,
    /// Host sensitivity slider (0..=50), or -1 to use `threshold`.
    pub sensitivity: i32,
}

// ============================================================================
// ENGINE LIFECYCLE
// ============================================================================

/// Create a new shake detector instance.
///
/// # Safety
/// - `config` must be a valid pointer to ShakeConfig.
/// - `callback`, if non-null, must be safe to call with `user_data` for as
///   long as the engine lives.
/// - The returned pointer must be freed with `shake_detector_destroy()`.
///
/// # Returns
/// - Pointer to ShakeEngine on success.
/// - NULL on a null config or invalid parameters.
#[no_mangle]
pub unsafe extern "C" fn shake_detector_create(
    config: *const ShakeConfig,
    callback: ShakeCallback,
    user_data: *mut c_void,
) -> *mut ShakeEngine {
    if config.is_null() {
        return ptr::null_mut();
    }

    let config = &*config;

    let policy = match config.policy {
        0 => RecognitionPolicy::SingleJolt,
        1 => RecognitionPolicy::DoubleShake,
        other => {
            log::warn!("shake_detector_create: unknown policy {}", other);
            return ptr::null_mut();
        }
    };

    let mut detector_config = DetectorConfig::for_policy(policy, config.threshold);
    if config.sensitivity >= 0 {
        detector_config.sensitivity = Some(config.sensitivity as u32);
    }

    let on_gesture: Box<dyn FnMut()> = Box::new(move || {
        if let Some(cb) = callback {
            // SAFETY: the host guarantees `cb` accepts `user_data` for the engine's lifetime.
            unsafe { cb(user_data) }
        }
    });

    match GestureDetector::new(detector_config, on_gesture) {
        Ok(detector) => Box::into_raw(Box::new(ShakeEngine { detector })),
        Err(e) => {
            log::warn!("shake_detector_create: {}", e);
            ptr::null_mut()
        }
    }
}

/// Destroy a shake detector instance.
///
/// # Safety
/// - `engine` must be a valid pointer from `shake_detector_create()`.
/// - Must not be called more than once for the same pointer.
#[no_mangle]
pub unsafe extern "C" fn shake_detector_destroy(engine: *mut ShakeEngine) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Reset the detector state.
///
/// Call when the host pauses or restarts its sensor listener.
///
/// # Safety
/// - `engine` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn shake_detector_reset(engine: *mut ShakeEngine) -> ShakeStatus {
    if engine.is_null() {
        return ShakeStatus::NullPointer;
    }

    let engine = &mut *engine;
    engine.detector.reset();

    ShakeStatus::Ok
}

// ============================================================================
// SAMPLE PROCESSING
// ============================================================================

/// Process a single accelerometer sample.
///
/// # Safety
/// - `engine` must be a valid pointer.
/// - `recognized` may be NULL; otherwise it receives 1 if this sample
///   completed a gesture and 0 if not.
///
/// # Parameters
/// - `timestamp_ms`: Monotonic sample timestamp in milliseconds.
/// - `x/y/z`: Accelerometer readings in native sensor units.
#[no_mangle]
pub unsafe extern "C" fn shake_detector_ingest(
    engine: *mut ShakeEngine,
    timestamp_ms: u64,
    x: f32,
    y: f32,
    z: f32,
    recognized: *mut i32,
) -> ShakeStatus {
    if engine.is_null() {
        return ShakeStatus::NullPointer;
    }

    let engine = &mut *engine;
    let hit = engine
        .detector
        .ingest(&AccelSample::from_xyz(x, y, z, timestamp_ms));

    if !recognized.is_null() {
        *recognized = i32::from(hit);
    }

    ShakeStatus::Ok
}

// ============================================================================
// RUNTIME SETTINGS
// ============================================================================

/// Replace the threshold.
///
/// # Safety
/// - `engine` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn shake_detector_update_threshold(
    engine: *mut ShakeEngine,
    threshold: f32,
) -> ShakeStatus {
    if engine.is_null() {
        return ShakeStatus::NullPointer;
    }
    if !threshold.is_finite() || threshold < 0.0 {
        return ShakeStatus::InvalidParameter;
    }

    let engine = &mut *engine;
    engine.detector.update_threshold(threshold);

    ShakeStatus::Ok
}

/// Replace the threshold from the host's 0..=50 sensitivity slider.
///
/// # Safety
/// - `engine` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn shake_detector_set_sensitivity(
    engine: *mut ShakeEngine,
    progress: i32,
) -> ShakeStatus {
    if engine.is_null() {
        return ShakeStatus::NullPointer;
    }

    let Ok(progress) = u32::try_from(progress) else {
        return ShakeStatus::InvalidParameter;
    };
    let Ok(sensitivity) = Sensitivity::new(progress) else {
        return ShakeStatus::InvalidParameter;
    };

    let engine = &mut *engine;
    engine.detector.update_threshold(sensitivity.threshold());

    ShakeStatus::Ok
}

// ============================================================================
// QUERIES
// ============================================================================

/// Get the current threshold, or -1.0 on a null engine.
///
/// # Safety
/// - `engine` must be a valid pointer or NULL.
#[no_mangle]
pub unsafe extern "C" fn shake_detector_threshold(engine: *const ShakeEngine) -> f32 {
    if engine.is_null() {
        return -1.0;
    }
    (*engine).detector.threshold()
}

/// Get the number of gestures recognized so far, or -1 on a null engine.
///
/// # Safety
/// - `engine` must be a valid pointer or NULL.
#[no_mangle]
pub unsafe extern "C" fn shake_detector_gesture_count(engine: *const ShakeEngine) -> i64 {
    if engine.is_null() {
        return -1;
    }
    (*engine).detector.gestures_recognized() as i64
}

/// Get version string. Static, do not free.
#[no_mangle]
pub extern "C" fn shake_version() -> *const c_char {
    static VERSION: &CStr = c"shake-sensing/0.1.0";
    VERSION.as_ptr()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "C" fn count_gesture(user_data: *mut c_void) {
        let counter = &mut *(user_data as *mut u32);
        *counter += 1;
    }

    fn single_jolt_config(threshold: f32) -> ShakeConfig {
        ShakeConfig {
            policy: 0,
            threshold,
            sensitivity: -1,
        }
    }

    #[test]
    fn test_engine_lifecycle() {
        unsafe {
            let config = single_jolt_config(50.0);
            let engine = shake_detector_create(&config, None, ptr::null_mut());
            assert!(!engine.is_null());

            let status = shake_detector_reset(engine);
            assert_eq!(status, ShakeStatus::Ok);

            shake_detector_destroy(engine);
        }
    }

    #[test]
    fn test_callback_receives_user_data() {
        let mut hits: u32 = 0;

        unsafe {
            let config = single_jolt_config(50.0);
            let engine = shake_detector_create(
                &config,
                Some(count_gesture),
                &mut hits as *mut u32 as *mut c_void,
            );

            let mut recognized = -1;
            shake_detector_ingest(engine, 1000, 0.0, 0.0, 0.0, &mut recognized);
            assert_eq!(recognized, 0);

            shake_detector_ingest(engine, 3000, 60.0, 0.0, 0.0, &mut recognized);
            assert_eq!(recognized, 1);

            let status = shake_detector_ingest(engine, 3100, 60.0, 60.0, 0.0, ptr::null_mut());
            assert_eq!(status, ShakeStatus::Ok);
            assert_eq!(shake_detector_gesture_count(engine), 1);

            shake_detector_destroy(engine);
        }

        assert_eq!(hits, 1);
    }

    #[test]
    fn test_sensitivity_settings() {
        unsafe {
            let config = ShakeConfig {
                policy: 1,
                threshold: 0.0,
                sensitivity: 0,
            };
            let engine = shake_detector_create(&config, None, ptr::null_mut());
            assert_eq!(shake_detector_threshold(engine), 75.0);

            assert_eq!(shake_detector_set_sensitivity(engine, 51), ShakeStatus::InvalidParameter);
            assert_eq!(shake_detector_set_sensitivity(engine, -3), ShakeStatus::InvalidParameter);
            assert_eq!(shake_detector_set_sensitivity(engine, 50), ShakeStatus::Ok);
            assert!((shake_detector_threshold(engine) - 10.0).abs() < 1e-4);

            assert_eq!(
                shake_detector_update_threshold(engine, f32::NAN),
                ShakeStatus::InvalidParameter
            );
            assert_eq!(shake_detector_update_threshold(engine, 33.0), ShakeStatus::Ok);
            assert_eq!(shake_detector_threshold(engine), 33.0);

            shake_detector_destroy(engine);
        }
    }

    #[test]
    fn test_invalid_create_parameters() {
        unsafe {
            assert!(shake_detector_create(ptr::null(), None, ptr::null_mut()).is_null());

            let bad_policy = ShakeConfig {
                policy: 7,
                threshold: 20.0,
                sensitivity: -1,
            };
            assert!(shake_detector_create(&bad_policy, None, ptr::null_mut()).is_null());

            let bad_sensitivity = ShakeConfig {
                policy: 1,
                threshold: 20.0,
                sensitivity: 80,
            };
            assert!(shake_detector_create(&bad_sensitivity, None, ptr::null_mut()).is_null());
        }
    }

    #[test]
    fn test_version() {
        let version = shake_version();
        assert!(!version.is_null());

        unsafe {
            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(version_str.starts_with("shake-sensing"));
        }
    }

    #[test]
    fn test_null_safety() {
        unsafe {
            assert_eq!(shake_detector_reset(ptr::null_mut()), ShakeStatus::NullPointer);
            assert_eq!(
                shake_detector_ingest(ptr::null_mut(), 0, 0.0, 0.0, 0.0, ptr::null_mut()),
                ShakeStatus::NullPointer
            );
            assert_eq!(
                shake_detector_update_threshold(ptr::null_mut(), 10.0),
                ShakeStatus::NullPointer
            );
            assert_eq!(
                shake_detector_set_sensitivity(ptr::null_mut(), 10),
                ShakeStatus::NullPointer
            );
            assert_eq!(shake_detector_gesture_count(ptr::null()), -1);
            shake_detector_destroy(ptr::null_mut());
        }
    }
}
