//! Bit/byte packing primitives (`ByteEncode`/`ByteDecode` and friends),
//! generalized to operate on `Vec`s of arbitrary length rather than fixed
//! 256-entry arrays, since the ring degree `n` is a runtime parameter here.
//!
//! Bit order is little-endian throughout: bit `i` of an integer lands at
//! byte `i/8`, position `i%8`.

use crate::error::Error;

/// Packs a bit array (length a multiple of 8) into bytes.
///
/// # Errors
/// Returns `Error::InvalidArgument` if `bits.len()` isn't a multiple of 8.
pub fn bytes_from_bits(bits: &[u8]) -> Result<Vec<u8>, Error> {
    if bits.len() % 8 != 0 {
        return Err(Error::InvalidArgument("bit array length not a multiple of 8".into()));
    }
    let mut bytes = vec![0u8; bits.len() / 8];
    for (i, &b) in bits.iter().enumerate() {
        bytes[i / 8] |= (b & 1) << (i % 8);
    }
    Ok(bytes)
}

/// Unpacks a byte array into its constituent bits, 8 per byte.
#[must_use]
pub fn bits_from_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut bits = vec![0u8; bytes.len() * 8];
    for (i, &byte) in bytes.iter().enumerate() {
        for j in 0..8 {
            bits[8 * i + j] = (byte >> j) & 1;
        }
    }
    bits
}

/// `ByteEncode_d`: packs `len` `d`-bit integers (`d` in `1..=12`) into
/// `ceil(len*d/8)` bytes, least-significant bit first.
///
/// # Errors
/// Returns `Error::InvalidArgument` if `d` is 0 or greater than 12, or if
/// any integer doesn't fit in `d` bits.
pub fn bytes_from_ints(d: u32, ints: &[u32]) -> Result<Vec<u8>, Error> {
    if d == 0 || d > 12 {
        return Err(Error::InvalidArgument(format!("d={d} out of range 1..=12")));
    }
    let m = 1u64 << d;
    if ints.iter().any(|&x| u64::from(x) >= m) {
        return Err(Error::InvalidArgument(format!("integer out of range for d={d}")));
    }
    let mut bits = vec![0u8; ints.len() * d as usize];
    for (i, &x) in ints.iter().enumerate() {
        for j in 0..d as usize {
            bits[i * d as usize + j] = ((x >> j) & 1) as u8;
        }
    }
    bytes_from_bits(&bits)
}

/// `ByteDecode_d`: the inverse of [`bytes_from_ints`]. `bytes.len()` must be
/// `ceil(count*d/8)`.
///
/// # Errors
/// Returns `Error::InvalidArgument` if `d` is 0 or greater than 12, or the
/// byte length doesn't match `count` integers of `d` bits each.
pub fn ints_from_bytes(d: u32, bytes: &[u8], count: usize) -> Result<Vec<u32>, Error> {
    if d == 0 || d > 12 {
        return Err(Error::InvalidArgument(format!("d={d} out of range 1..=12")));
    }
    let expect = (count * d as usize).div_ceil(8);
    if bytes.len() != expect {
        return Err(Error::InvalidArgument(format!(
            "expected {expect} bytes for {count} integers of {d} bits, got {}",
            bytes.len()
        )));
    }
    let bits = bits_from_bytes(bytes);
    let mut ints = Vec::with_capacity(count);
    for i in 0..count {
        let mut x = 0u32;
        for j in 0..d as usize {
            x |= u32::from(bits[i * d as usize + j]) << j;
        }
        ints.push(x);
    }
    Ok(ints)
}

#[cfg(test)]
mod tests {
    use super::{bytes_from_ints, ints_from_bytes};
    use rand::{Rng, SeedableRng};

    #[test]
    fn round_trip() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        for d in [4u32, 5, 10, 11, 12] {
            for _ in 0..20 {
                let count = 32usize;
                let m = 1u32 << d;
                let ints: Vec<u32> = (0..count).map(|_| rng.gen_range(0..m)).collect();
                let bytes = bytes_from_ints(d, &ints).unwrap();
                let back = ints_from_bytes(d, &bytes, count).unwrap();
                assert_eq!(ints, back);
            }
        }
    }

    #[test]
    fn rejects_bad_length() {
        assert!(ints_from_bytes(11, &[0u8; 3], 32).is_err());
    }

    #[test]
    fn rejects_out_of_range_d() {
        assert!(bytes_from_ints(0, &[0]).is_err());
        assert!(bytes_from_ints(13, &[0]).is_err());
    }
}
