//! Glucose sensor front end

use crate::errors::SensorError;

/// One raw reading from the sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    /// Raw glucose (mg/dL)
    pub glucose_mg_dl: f32,
    /// Sensor die temperature (°C)
    pub temperature_c: f32,
}

impl SensorSample {
    /// Create a sample
    pub const fn new(glucose_mg_dl: f32, temperature_c: f32) -> Self {
        Self {
            glucose_mg_dl,
            temperature_c,
        }
    }
}

/// Source of raw glucose readings
pub trait GlucoseSensor {
    /// Bring the sensor up. Called once at boot, before the transport.
    fn init(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    /// Take one reading
    ///
    /// Range checking is the core's job; drivers return what they measured.
    fn read(&mut self) -> Result<SensorSample, SensorError>;
}
