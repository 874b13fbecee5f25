//! Clinical Constants
//!
//! Glucose concentrations are in mg/dL throughout the core.

// ===== VALIDITY RANGE =====

/// Lowest glucose concentration accepted from the sensor (mg/dL).
///
/// Below this the electrochemical signal is indistinguishable from noise
/// or a detached sensor filament. Readings are rejected, not clamped.
///
/// Source: typical CGM reportable range lower bound
pub const GLUCOSE_VALID_MIN_MG_DL: f32 = 20.0;

/// Highest glucose concentration accepted from the sensor (mg/dL).
///
/// Source: typical CGM reportable range upper bound
pub const GLUCOSE_VALID_MAX_MG_DL: f32 = 600.0;

// ===== ALARM THRESHOLDS =====

/// Hypoglycemia threshold (mg/dL). Alarm fires strictly below.
///
/// Source: ADA level 1 hypoglycemia definition
pub const HYPOGLYCEMIA_THRESHOLD_MG_DL: f32 = 70.0;

/// Hyperglycemia threshold (mg/dL). Alarm fires strictly above.
pub const HYPERGLYCEMIA_THRESHOLD_MG_DL: f32 = 250.0;

/// Rapid change threshold (mg/dL per minute). Alarm fires strictly above,
/// in either direction.
///
/// Source: common CGM rate-of-change alert setting
pub const RAPID_CHANGE_THRESHOLD_MG_DL_PER_MIN: f32 = 3.0;
