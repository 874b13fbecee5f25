//! Wireless link to the paired receiver

use crate::alarms::Alert;
use crate::errors::TransportError;

/// Outbound link for encrypted records and alerts
///
/// Implementations must not block: a busy radio returns
/// [`nb::Error::WouldBlock`] and the payload is offered again next cycle.
pub trait Transport {
    /// Bring the radio up. Called once at boot, after the sensor.
    fn init(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Check if a peer is connected
    fn is_connected(&self) -> bool;

    /// Send one encrypted record payload
    fn send(&mut self, payload: &[u8]) -> nb::Result<(), TransportError>;

    /// Send one alert
    ///
    /// The default sends the alert's wire frame through [`send`](Self::send).
    /// Radios with a dedicated notification characteristic override this.
    fn send_alert(&mut self, alert: &Alert) -> nb::Result<(), TransportError> {
        self.send(&alert.to_frame())
    }

    /// Check if a receiver has asked to pair
    fn pairing_requested(&self) -> bool {
        false
    }

    /// Run the pairing handshake, returning `true` if the device is now paired
    fn complete_pairing(&mut self) -> bool {
        false
    }
}
