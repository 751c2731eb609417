//! Symmetric primitives: `H`, `G`, `J`, the `XOF` context, and the keyed
//! `PRF`. All built directly on `sha3`, same as the underlying algebra's
//! reference implementation, just with the XOF/PRF promoted from
//! free functions to small stateful contexts so callers can absorb/squeeze
//! incrementally instead of handing over one pre-concatenated buffer.

use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Digest, Sha3_256, Sha3_512, Shake128, Shake256};

use crate::error::Error;

/// `H(s)`: SHA3-256, producing a 32-byte digest.
#[must_use]
pub fn h(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    Digest::update(&mut hasher, bytes);
    hasher.finalize().into()
}

/// `G(c)`: SHA3-512, split into its first and second 32-byte halves.
#[must_use]
pub fn g(bytes: &[u8]) -> ([u8; 32], [u8; 32]) {
    let mut hasher = Sha3_512::new();
    Digest::update(&mut hasher, bytes);
    let digest = hasher.finalize();
    let a = digest[0..32].try_into().expect("sha3-512 digest is 64 bytes");
    let b = digest[32..64].try_into().expect("sha3-512 digest is 64 bytes");
    (a, b)
}

/// `J(s)`: SHAKE256 truncated to 32 bytes, used by the implicit-rejection
/// step of decapsulation.
#[must_use]
pub fn j(z: &[u8; 32], ct: &[u8]) -> [u8; 32] {
    let mut hasher = Shake256::default();
    hasher.update(z);
    hasher.update(ct);
    let mut reader = hasher.finalize_xof();
    let mut out = [0u8; 32];
    reader.read(&mut out);
    out
}

/// A SHAKE128-based extendable output context: absorb a seed plus indices,
/// then squeeze as many pseudorandom bytes as needed.
pub struct Xof {
    reader: <Shake128 as ExtendableOutput>::Reader,
}

impl Xof {
    /// Starts a fresh context absorbing `seed` followed by `suffix`.
    #[must_use]
    pub fn new(seed: &[u8; 32], suffix: &[u8]) -> Self {
        let mut hasher = Shake128::default();
        hasher.update(seed);
        hasher.update(suffix);
        Self { reader: hasher.finalize_xof() }
    }

    /// Squeezes `len` pseudorandom bytes out of the context.
    pub fn squeeze(&mut self, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        self.reader.read(&mut out);
        out
    }
}

/// A SHAKE256-keyed pseudorandom function, keyed by a 32-byte seed and
/// domain-separated by an incrementing one-byte counter.
pub struct Prf {
    seed: [u8; 32],
    b: u16,
}

impl Prf {
    /// Builds a PRF context keyed by `seed`, counter starting at 0.
    #[must_use]
    pub fn new(seed: [u8; 32]) -> Self {
        Self { seed, b: 0 }
    }

    /// Produces `64 * eta` bytes of output and advances the counter.
    ///
    /// # Errors
    /// Returns `Error::PrfExhausted` once the one-byte counter would
    /// overflow past 255.
    pub fn next(&mut self, eta: u32) -> Result<Vec<u8>, Error> {
        if self.b > 255 {
            return Err(Error::PrfExhausted);
        }
        #[allow(clippy::cast_possible_truncation)]
        let counter = self.b as u8;
        let mut hasher = Shake256::default();
        hasher.update(&self.seed);
        hasher.update(&[counter]);
        let mut reader = hasher.finalize_xof();
        let mut out = vec![0u8; 64 * eta as usize];
        reader.read(&mut out);
        self.b += 1;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::{g, h, j, Prf, Xof};

    #[test]
    fn h_is_deterministic_and_32_bytes() {
        assert_eq!(h(b"hello"), h(b"hello"));
        assert_ne!(h(b"hello"), h(b"world"));
    }

    #[test]
    fn g_splits_into_distinct_halves() {
        let (a, b) = g(b"seed");
        assert_ne!(a, b);
        let (a2, b2) = g(b"seed");
        assert_eq!((a, b), (a2, b2));
    }

    #[test]
    fn j_depends_on_both_inputs() {
        let z = [7u8; 32];
        assert_ne!(j(&z, b"ct-one"), j(&z, b"ct-two"));
        assert_ne!(j(&z, b"ct-one"), j(&[8u8; 32], b"ct-one"));
    }

    #[test]
    fn xof_is_a_deterministic_stream() {
        let mut a = Xof::new(&[1u8; 32], &[0, 1]);
        let mut b = Xof::new(&[1u8; 32], &[0, 1]);
        assert_eq!(a.squeeze(9), b.squeeze(9));
        assert_eq!(a.squeeze(9), b.squeeze(9));
    }

    #[test]
    fn prf_counter_advances_and_exhausts() {
        let mut prf = Prf::new([3u8; 32]);
        let out0 = prf.next(2).unwrap();
        let out1 = prf.next(2).unwrap();
        assert_ne!(out0, out1);
        assert_eq!(out0.len(), 128);

        let mut prf = Prf::new([3u8; 32]);
        prf.b = 256;
        assert!(matches!(prf.next(2), Err(crate::error::Error::PrfExhausted)));
    }
}
