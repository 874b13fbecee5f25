//! Measurement Record and Wire Layout
//!
//! ## Overview
//!
//! A [`MeasurementRecord`] is the unit of storage and transmission: one
//! validated glucose reading with the context it was captured in. Records are
//! immutable once built. The only constructors validate the payload and
//! compute the integrity code, so a record that exists has passed validation
//! and carries a code consistent with its fields.
//!
//! ## Wire Layout
//!
//! Every record serialises to the same 20 bytes, little-endian, before
//! encryption:
//!
//! ```text
//! offset  size  field
//! ──────  ────  ─────────────────────────────
//!  0      8     timestamp (u64, ms since boot)
//!  8      4     glucose (f32, mg/dL)
//! 12      4     sensor temperature (f32, °C)
//! 16      1     battery level (u8, percent)
//! 17      1     reserved (0)
//! 18      2     integrity code (u16, CRC-16 over bytes 0..18)
//! ```
//!
//! The length is fixed, so the radio can frame the encrypted payload
//! without a length prefix.
//!
//! ## Integrity Code
//!
//! CRC-16/IBM-3740 (CCITT-FALSE) over the first 18 bytes. It catches bit
//! flips in RAM or flash between capture and use. It is not a MAC; tamper
//! protection is the cipher's job.

use crc::{Crc, CRC_16_IBM_3740};

use crate::constants::clinical::{GLUCOSE_VALID_MAX_MG_DL, GLUCOSE_VALID_MIN_MG_DL};
use crate::errors::{ValidationError, ValidationResult};
use crate::time::Timestamp;

/// Serialised record size in bytes
pub const RECORD_WIRE_SIZE: usize = 20;

/// Bytes covered by the integrity code
const CHECKED_LEN: usize = RECORD_WIRE_SIZE - 2;

const INTEGRITY: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Serialised form of a record
pub type RecordBytes = [u8; RECORD_WIRE_SIZE];

/// One validated glucose measurement
///
/// Serialisable for export only. Records are built through a validating
/// constructor or [`from_bytes`](Self::from_bytes).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MeasurementRecord {
    timestamp: Timestamp,
    glucose_mg_dl: f32,
    sensor_temperature_c: f32,
    battery_pct: u8,
    integrity_code: u16,
}

impl MeasurementRecord {
    /// Build a record, rejecting implausible readings
    ///
    /// Glucose must lie in the validity range from
    /// [`constants::clinical`](crate::constants::clinical). Use
    /// [`with_range`](Self::with_range) for a configured range.
    pub fn new(
        timestamp: Timestamp,
        glucose_mg_dl: f32,
        sensor_temperature_c: f32,
        battery_pct: u8,
    ) -> ValidationResult<Self> {
        Self::with_range(
            timestamp,
            glucose_mg_dl,
            sensor_temperature_c,
            battery_pct,
            (GLUCOSE_VALID_MIN_MG_DL, GLUCOSE_VALID_MAX_MG_DL),
        )
    }

    /// Build a record against an explicit `(min, max)` glucose range
    pub fn with_range(
        timestamp: Timestamp,
        glucose_mg_dl: f32,
        sensor_temperature_c: f32,
        battery_pct: u8,
        (min, max): (f32, f32),
    ) -> ValidationResult<Self> {
        if !glucose_mg_dl.is_finite() || !sensor_temperature_c.is_finite() {
            return Err(ValidationError::InvalidValue);
        }

        if glucose_mg_dl < min || glucose_mg_dl > max {
            return Err(ValidationError::OutOfRange {
                value: glucose_mg_dl,
                min,
                max,
            });
        }

        let mut record = Self {
            timestamp,
            glucose_mg_dl,
            sensor_temperature_c,
            battery_pct,
            integrity_code: 0,
        };
        record.integrity_code = record.compute_integrity();
        Ok(record)
    }

    /// Capture time in milliseconds since boot
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Raw glucose concentration in mg/dL
    pub fn glucose_mg_dl(&self) -> f32 {
        self.glucose_mg_dl
    }

    /// Sensor temperature at capture in °C
    pub fn sensor_temperature_c(&self) -> f32 {
        self.sensor_temperature_c
    }

    /// Battery level at capture in percent
    pub fn battery_pct(&self) -> u8 {
        self.battery_pct
    }

    /// Stored integrity code
    pub fn integrity_code(&self) -> u16 {
        self.integrity_code
    }

    /// Check the stored integrity code against the payload
    pub fn verify(&self) -> ValidationResult<()> {
        let computed = self.compute_integrity();
        if computed == self.integrity_code {
            Ok(())
        } else {
            Err(ValidationError::IntegrityMismatch {
                stored: self.integrity_code,
                computed,
            })
        }
    }

    /// Serialise to the fixed wire layout
    pub fn to_bytes(&self) -> RecordBytes {
        let mut bytes = self.payload_bytes();
        bytes[CHECKED_LEN..].copy_from_slice(&self.integrity_code.to_le_bytes());
        bytes
    }

    /// Parse the fixed wire layout, checking the integrity code
    ///
    /// Range checks are not re-applied: a record with a valid code was
    /// validated when it was built.
    pub fn from_bytes(bytes: &RecordBytes) -> ValidationResult<Self> {
        let record = Self {
            timestamp: u64::from_le_bytes(le_array(&bytes[0..8])),
            glucose_mg_dl: f32::from_le_bytes(le_array(&bytes[8..12])),
            sensor_temperature_c: f32::from_le_bytes(le_array(&bytes[12..16])),
            battery_pct: bytes[16],
            integrity_code: u16::from_le_bytes(le_array(&bytes[CHECKED_LEN..])),
        };

        record.verify()?;
        Ok(record)
    }

    fn payload_bytes(&self) -> RecordBytes {
        let mut bytes = [0u8; RECORD_WIRE_SIZE];
        bytes[0..8].copy_from_slice(&self.timestamp.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.glucose_mg_dl.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.sensor_temperature_c.to_le_bytes());
        bytes[16] = self.battery_pct;
        bytes
    }

    fn compute_integrity(&self) -> u16 {
        INTEGRITY.checksum(&self.payload_bytes()[..CHECKED_LEN])
    }

    /// Flip payload bits without updating the code, simulating memory corruption
    #[cfg(test)]
    pub(crate) fn corrupt(&mut self) {
        self.glucose_mg_dl += 1.0;
    }
}

fn le_array<const N: usize>(slice: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    out
}
