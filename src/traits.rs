//! Public traits implemented by each parameter set's `KG`, `EncapsKey`,
//! `DecapsKey`, and `CipherText` types.
//!
//! Every fallible method here ends in `_vt`: a reminder that these
//! operations only avoid timing leaks up to the `rho` seed crossing the
//! trust boundary in the clear — they are variable-time with respect to
//! that public value, constant-time with respect to everything secret.

use rand_core::{CryptoRng, CryptoRngCore, RngCore};

#[cfg(feature = "default-rng")]
use rand_core::OsRng;

use crate::Error;

/// Generates an encapsulation/decapsulation key pair for a parameter set.
pub trait KeyGen {
    /// The (public) encapsulation key sent from the originator to the remote party.
    type EncapsKey;
    /// The (private) decapsulation key used by the originator to recover the shared secret.
    type DecapsKey;
    /// A serialized (public) encapsulation key byte array of the correct length.
    type EncapsByteArray;
    /// A serialized (private) decapsulation key byte array of the correct length.
    type DecapsByteArray;

    /// Generates a key pair using the OS default random number generator.
    ///
    /// # Errors
    /// Returns an error if the random number generator fails.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// # #[cfg(feature = "ml-kem-512")] {
    /// use mlkem_coeff::ml_kem_512;
    /// use mlkem_coeff::traits::{KeyGen, SerDes, Decaps, Encaps};
    ///
    /// let (ek1, dk1) = ml_kem_512::KG::try_keygen_vt()?;
    /// let ek1_bytes = ek1.into_bytes();
    ///
    /// let ek2 = ml_kem_512::EncapsKey::try_from_bytes(ek1_bytes)?;
    /// let (ssk2, ct2) = ek2.try_encaps_vt()?;
    /// let ssk1 = dk1.try_decaps_vt(&ct2)?;
    /// assert_eq!(ssk1, ssk2);
    /// # }
    /// # Ok(())}
    /// ```
    #[cfg(feature = "default-rng")]
    fn try_keygen_vt() -> Result<(Self::EncapsKey, Self::DecapsKey), Error> {
        Self::try_keygen_with_rng_vt(&mut OsRng)
    }

    /// Generates a key pair using a caller-supplied random number generator.
    ///
    /// # Errors
    /// Returns an error if the random number generator fails.
    fn try_keygen_with_rng_vt(
        rng: &mut impl CryptoRngCore,
    ) -> Result<(Self::EncapsKey, Self::DecapsKey), Error>;

    /// Generates a key pair deterministically from the two seeds `(d, z)`
    /// consumed by `KeyGen_internal`.
    #[must_use]
    fn keygen_from_seed(d: [u8; 32], z: [u8; 32]) -> (Self::EncapsKey, Self::DecapsKey);

    /// Checks that a serialized encapsulation key and decapsulation key
    /// correspond to the same key pair, e.g. after both have been
    /// serialized, stored, and reloaded. Not constant-time.
    fn validate_keypair_vt(
        rng: &mut impl CryptoRngCore, ek: &Self::EncapsByteArray, dk: &Self::DecapsByteArray,
    ) -> bool;
}

/// Generates a shared secret and ciphertext from an encapsulation key.
pub trait Encaps {
    /// The shared secret key type generated during encapsulation.
    type SharedSecretKey;
    /// The ciphertext type transmitted to the decapsulating party.
    type CipherText;

    /// Encapsulates using the OS default random number generator.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails or an
    /// internal error condition arises.
    #[cfg(feature = "default-rng")]
    fn try_encaps_vt(&self) -> Result<(Self::SharedSecretKey, Self::CipherText), Error> {
        self.try_encaps_with_rng_vt(&mut OsRng)
    }

    /// Encapsulates using a caller-supplied random number generator.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails or an
    /// internal error condition arises.
    fn try_encaps_with_rng_vt(
        &self, rng: &mut impl CryptoRngCore,
    ) -> Result<(Self::SharedSecretKey, Self::CipherText), Error>;

    /// Encapsulates deterministically from a 32-byte seed rather than a
    /// random number generator.
    fn encaps_from_seed(&self, seed: &[u8; 32]) -> (Self::SharedSecretKey, Self::CipherText) {
        self.try_encaps_with_rng_vt(&mut DummyRng { data: *seed }).expect("rng will not fail")
    }
}

/// A fixed-output RNG used only to thread a deterministic seed through the
/// `try_encaps_with_rng_vt`/`try_keygen_with_rng_vt` entry points.
struct DummyRng {
    data: [u8; 32],
}

impl RngCore for DummyRng {
    fn next_u32(&mut self) -> u32 { unimplemented!() }

    fn next_u64(&mut self) -> u64 { unimplemented!() }

    fn fill_bytes(&mut self, _out: &mut [u8]) { unimplemented!() }

    fn try_fill_bytes(&mut self, out: &mut [u8]) -> Result<(), rand_core::Error> {
        out.copy_from_slice(&self.data);
        Ok(())
    }
}

impl CryptoRng for DummyRng {}

/// Recovers the shared secret from a decapsulation key and ciphertext.
pub trait Decaps {
    /// The ciphertext type received from the encapsulating party.
    type CipherText;
    /// The shared secret key type generated during decapsulation.
    type SharedSecretKey;

    /// Recovers the shared secret. Never fails due to ciphertext content —
    /// a mismatched re-encryption triggers implicit rejection rather than
    /// an error.
    ///
    /// # Errors
    /// Returns an error if `ct` has the wrong shape.
    fn try_decaps_vt(&self, ct: &Self::CipherText) -> Result<Self::SharedSecretKey, Error>;
}

/// Serializes and deserializes the fixed-size byte representation of a
/// cryptographic object.
pub trait SerDes {
    /// The fixed-size byte array type used for serialization.
    type ByteArray;

    /// Produces the fixed-size byte array for this object.
    fn into_bytes(self) -> Self::ByteArray;

    /// Parses and validates a fixed-size byte array.
    ///
    /// # Errors
    /// Returns an error on malformed input.
    fn try_from_bytes(ba: Self::ByteArray) -> Result<Self, Error>
    where
        Self: Sized;
}
