#![deny(clippy::pedantic)]
#![deny(warnings)]
#![deny(missing_docs)]

//! A Module-Lattice-based Key-Encapsulation Mechanism, built the way the
//! FIPS 203 draft lays it out, but over the coefficient domain directly:
//! ring multiplication is the textbook O(n^2) negacyclic convolution
//! rather than a number-theoretic transform.
//!
//! The crate is organized bottom-up:
//! - [`algebra`] — the generic ring `Z_q[X]/(X^n+1)`, with `q` and `n` as
//!   runtime fields rather than compile-time constants.
//! - [`byte_fns`] — bit/byte packing (`ByteEncode`/`ByteDecode` and
//!   friends).
//! - [`symmetric`] — the hash/XOF/PRF primitives `H`, `G`, `J`, `XOF`,
//!   `PRF`.
//! - [`kyber_algebra`] — Kyber-specific extensions over the production
//!   ring (q=3329, n=256): compression, 12-bit encoding, uniform and
//!   centered-binomial sampling.
//! - `k_pke` / `ml_kem` — the IND-CPA encryption scheme and the
//!   Fujisaki-Okamoto-transformed KEM built on top of it.
//! - [`traits`] — the public `KeyGen`/`Encaps`/`Decaps`/`SerDes` traits
//!   implemented by each parameter set's `KG`/`EncapsKey`/`DecapsKey`/
//!   `CipherText` types.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::traits::SerDes;

pub mod algebra;
pub mod byte_fns;
mod error;
mod k_pke;
pub mod kyber_algebra;
mod ml_kem;
pub mod symmetric;
pub mod traits;

pub use error::Error;

/// Shared secret key length for all ML-KEM variants, in bytes.
pub const SSK_LEN: usize = 32;

/// The (opaque) shared secret established by encapsulation/decapsulation,
/// zeroized on drop.
#[derive(Clone, Debug, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecretKey([u8; SSK_LEN]);

impl SerDes for SharedSecretKey {
    type ByteArray = [u8; SSK_LEN];

    fn into_bytes(self) -> Self::ByteArray { self.0 }

    fn try_from_bytes(ssk: Self::ByteArray) -> Result<Self, Error> { Ok(SharedSecretKey(ssk)) }
}

// Constant-time equality: the whole point of this type is that its value is secret.
impl PartialEq for SharedSecretKey {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for SharedSecretKey {}

// Injected into each parameter-set module below; ties the opaque
// EncapsKey/DecapsKey/CipherText wrappers into ml_kem's free functions.
macro_rules! functionality {
    () => {
        use rand_core::CryptoRngCore;
        use zeroize::{Zeroize, ZeroizeOnDrop};

        use crate::kyber_algebra::{byte_decode_12, Q, N};
        use crate::ml_kem::{ml_kem_decaps, ml_kem_encaps, ml_kem_key_gen, ml_kem_key_gen_internal};
        use crate::symmetric::h;
        use crate::traits::{Decaps, Encaps, KeyGen, SerDes};
        use crate::{Error, SharedSecretKey};

        /// Correctly sized encapsulation key specific to this parameter set.
        #[derive(Clone, Zeroize, ZeroizeOnDrop)]
        pub struct EncapsKey(Vec<u8>);

        /// Correctly sized decapsulation key specific to this parameter set.
        #[derive(Clone, Zeroize, ZeroizeOnDrop)]
        pub struct DecapsKey(Vec<u8>);

        /// Correctly sized ciphertext specific to this parameter set.
        #[derive(Clone, Zeroize, ZeroizeOnDrop)]
        pub struct CipherText(Vec<u8>);

        /// Generates an `(EncapsKey, DecapsKey)` pair for this parameter set.
        pub struct KG();

        impl KeyGen for KG {
            type DecapsByteArray = Vec<u8>;
            type DecapsKey = DecapsKey;
            type EncapsByteArray = Vec<u8>;
            type EncapsKey = EncapsKey;

            fn try_keygen_with_rng_vt(
                rng: &mut impl CryptoRngCore,
            ) -> Result<(EncapsKey, DecapsKey), Error> {
                let (ek, dk) = ml_kem_key_gen(rng, K, ETA1, ETA2)?;
                Ok((EncapsKey(ek), DecapsKey(dk)))
            }

            fn keygen_from_seed(d: [u8; 32], z: [u8; 32]) -> (EncapsKey, DecapsKey) {
                let (ek, dk) = ml_kem_key_gen_internal(&d, &z, K, ETA1, ETA2)
                    .expect("fixed parameter set always succeeds");
                (EncapsKey(ek), DecapsKey(dk))
            }

            fn validate_keypair_vt(
                _rng: &mut impl CryptoRngCore, ek: &Self::EncapsByteArray, dk: &Self::DecapsByteArray,
            ) -> bool {
                let len_ek_pke = 384 * K + 32;
                let len_dk_pke = 384 * K;
                let same_ek = ek.as_slice() == &dk[len_dk_pke..len_dk_pke + len_ek_pke];
                let same_h = h(ek) == dk[len_dk_pke + len_ek_pke..len_dk_pke + len_ek_pke + 32];
                same_ek & same_h
            }
        }

        impl Encaps for EncapsKey {
            type CipherText = CipherText;
            type SharedSecretKey = SharedSecretKey;

            fn try_encaps_with_rng_vt(
                &self, rng: &mut impl CryptoRngCore,
            ) -> Result<(Self::SharedSecretKey, Self::CipherText), Error> {
                let (ssk, ct) = ml_kem_encaps(rng, &self.0, K, ETA1, ETA2, DU, DV)?;
                Ok((ssk, CipherText(ct)))
            }
        }

        impl Decaps for DecapsKey {
            type CipherText = CipherText;
            type SharedSecretKey = SharedSecretKey;

            fn try_decaps_vt(&self, ct: &CipherText) -> Result<SharedSecretKey, Error> {
                ml_kem_decaps(&self.0, &ct.0, K, ETA1, ETA2, DU, DV)
            }
        }

        impl SerDes for EncapsKey {
            type ByteArray = Vec<u8>;

            fn into_bytes(self) -> Self::ByteArray { self.0 }

            fn try_from_bytes(ek: Self::ByteArray) -> Result<Self, Error> {
                if ek.len() != EK_LEN {
                    return Err(Error::InvalidArgument(format!(
                        "encapsulation key length {} != {EK_LEN}",
                        ek.len()
                    )));
                }
                // Modulus check per FIPS 203: the byte array must decode to integers
                // modulo q without any modular reduction having been necessary.
                for chunk in ek[..384 * K].chunks(384) {
                    byte_decode_12(chunk, Q, N)?;
                }
                Ok(EncapsKey(ek))
            }
        }

        impl SerDes for DecapsKey {
            type ByteArray = Vec<u8>;

            fn into_bytes(self) -> Self::ByteArray { self.0 }

            fn try_from_bytes(dk: Self::ByteArray) -> Result<Self, Error> {
                if dk.len() != DK_LEN {
                    return Err(Error::InvalidArgument(format!(
                        "decapsulation key length {} != {DK_LEN}",
                        dk.len()
                    )));
                }
                Ok(DecapsKey(dk))
            }
        }

        impl SerDes for CipherText {
            type ByteArray = Vec<u8>;

            fn into_bytes(self) -> Self::ByteArray { self.0 }

            fn try_from_bytes(ct: Self::ByteArray) -> Result<Self, Error> {
                if ct.len() != CT_LEN {
                    return Err(Error::InvalidArgument(format!(
                        "ciphertext length {} != {CT_LEN}",
                        ct.len()
                    )));
                }
                Ok(CipherText(ct))
            }
        }
    };
}

/// ML-KEM-512: security category 1.
#[cfg(feature = "ml-kem-512")]
pub mod ml_kem_512 {
    //! Typical usage:
    //! 1. The originator runs `KG::try_keygen_vt()` to get an `EncapsKey`/`DecapsKey` pair.
    //! 2. The originator serializes the encaps key via `into_bytes()` and sends it over.
    //! 3. The remote party deserializes it via `try_from_bytes()` and runs `try_encaps_vt()`
    //!    to get a shared secret and a `CipherText`.
    //! 4. The remote party serializes the ciphertext and sends it back.
    //! 5. The originator deserializes it and runs `try_decaps_vt()` to recover the same
    //!    shared secret.

    const K: usize = 2;
    const ETA1: u32 = 3;
    const ETA2: u32 = 2;
    const DU: u32 = 10;
    const DV: u32 = 4;

    /// Serialized encapsulation key length, in bytes.
    pub const EK_LEN: usize = 800;
    /// Serialized decapsulation key length, in bytes.
    pub const DK_LEN: usize = 1632;
    /// Serialized ciphertext length, in bytes.
    pub const CT_LEN: usize = 768;

    functionality!();
}

/// ML-KEM-768: security category 3.
#[cfg(feature = "ml-kem-768")]
pub mod ml_kem_768 {
    //! See [`crate::ml_kem_512`] for the typical usage flow.

    const K: usize = 3;
    const ETA1: u32 = 2;
    const ETA2: u32 = 2;
    const DU: u32 = 10;
    const DV: u32 = 4;

    /// Serialized encapsulation key length, in bytes.
    pub const EK_LEN: usize = 1184;
    /// Serialized decapsulation key length, in bytes.
    pub const DK_LEN: usize = 2400;
    /// Serialized ciphertext length, in bytes.
    pub const CT_LEN: usize = 1088;

    functionality!();
}

/// ML-KEM-1024: security category 5.
#[cfg(feature = "ml-kem-1024")]
pub mod ml_kem_1024 {
    //! See [`crate::ml_kem_512`] for the typical usage flow.

    const K: usize = 4;
    const ETA1: u32 = 2;
    const ETA2: u32 = 2;
    const DU: u32 = 11;
    const DV: u32 = 5;

    /// Serialized encapsulation key length, in bytes.
    pub const EK_LEN: usize = 1568;
    /// Serialized decapsulation key length, in bytes.
    pub const DK_LEN: usize = 3168;
    /// Serialized ciphertext length, in bytes.
    pub const CT_LEN: usize = 1568;

    functionality!();
}
