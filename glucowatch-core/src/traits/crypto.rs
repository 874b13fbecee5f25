//! Record encryption

use crate::errors::CryptoError;
use crate::record::{RecordBytes, RECORD_WIRE_SIZE};

/// Largest ciphertext the transport accepts per record
///
/// Room for the record plus a nonce and authentication tag.
pub const MAX_PAYLOAD_SIZE: usize = 64;

/// Encrypted record ready for the transport
pub type Payload = heapless::Vec<u8, MAX_PAYLOAD_SIZE>;

const _: () = assert!(MAX_PAYLOAD_SIZE >= RECORD_WIRE_SIZE);

/// Encrypts serialized records before they leave the device
pub trait Cipher {
    /// Load keys. Called once at boot, last.
    fn init(&mut self) -> Result<(), CryptoError> {
        Ok(())
    }

    /// Encrypt one serialized record
    fn encrypt(&mut self, plaintext: &RecordBytes) -> Result<Payload, CryptoError>;
}
