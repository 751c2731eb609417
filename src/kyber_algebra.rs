//! Kyber-specific extensions on top of the generic `algebra` layer: the
//! production ring (q=3329, n=256), compress/decompress, the 12-bit
//! encode/decode used for keys, rejection sampling of uniform ring elements
//! from a seed, and centered-binomial sampling from a PRF.
//!
//! These free functions take `ModInt`/`ModPol` values as inputs rather than
//! subclassing them: the generic algebra module knows nothing about Kyber,
//! and this module knows nothing about ring construction beyond calling
//! straight into its public API.

use crate::algebra::{ModInt, ModPol, PolyMat, PolyVec};
use crate::byte_fns::{bytes_from_ints, ints_from_bytes};
use crate::error::Error;
use crate::symmetric::{Prf, Xof};

/// The ML-KEM modulus.
pub const Q: u32 = 3329;
/// The ML-KEM ring degree.
pub const N: usize = 256;

fn require_production_ring(q: u32, n: usize) -> Result<(), Error> {
    if q != Q || n != N {
        return Err(Error::Unsupported(format!(
            "uniform sampling and CBD require the production ring (q={Q}, n={N}), got (q={q}, n={n})"
        )));
    }
    Ok(())
}

/// `Compress_d(r)`: `round((r * 2^d) / q) mod 2^d`, round-half-up.
#[must_use]
pub fn compress(r: ModInt, d: u32) -> u32 {
    let q = u64::from(r.q());
    let num = u64::from(r.r()) << d;
    let rounded = (2 * num + q) / (2 * q);
    #[allow(clippy::cast_possible_truncation)]
    let result = (rounded & ((1u64 << d) - 1)) as u32;
    result
}

/// `Decompress_d(y)`: `round(y * q / 2^d)`, round-half-up, landing back in
/// `[0, q)`.
#[must_use]
pub fn decompress(y: u32, q: u32, d: u32) -> ModInt {
    let num = 2 * u64::from(y) * u64::from(q) + (1u64 << d);
    let r = num / (1u64 << (d + 1));
    #[allow(clippy::cast_possible_wrap)]
    ModInt::new(r as i64, q)
}

/// Applies [`compress`] coefficient-wise to a ring element.
#[must_use]
pub fn compress_poly(p: &ModPol, d: u32) -> Vec<u32> {
    p.coeffs().iter().map(|&x| compress(x, d)).collect()
}

/// Applies [`decompress`] coefficient-wise, producing a ring element.
///
/// # Errors
/// Propagates `ModPol::new`'s validation errors.
pub fn decompress_poly(ys: &[u32], q: u32, n: usize, d: u32) -> Result<ModPol, Error> {
    let c = ys.iter().map(|&y| decompress(y, q, d)).collect();
    ModPol::new(q, n, c)
}

/// `ByteEncode_12`: packs a ring element's 12-bit coefficients into bytes.
///
/// # Errors
/// Propagates `bytes_from_ints`'s validation errors.
pub fn byte_encode_12(p: &ModPol) -> Result<Vec<u8>, Error> {
    let ints: Vec<u32> = p.coeffs().iter().map(ModInt::r).collect();
    bytes_from_ints(12, &ints)
}

/// `ByteDecode_12`: the inverse of [`byte_encode_12`].
///
/// # Errors
/// Propagates `ints_from_bytes`'s or `ModPol::new`'s validation errors.
pub fn byte_decode_12(bytes: &[u8], q: u32, n: usize) -> Result<ModPol, Error> {
    let ints = ints_from_bytes(12, bytes, n)?;
    if ints.iter().any(|&x| x >= q) {
        return Err(Error::InvalidArgument(format!(
            "byte_decode_12: coefficient out of range for q={q}"
        )));
    }
    let c = ints.into_iter().map(|x| ModInt::new(i64::from(x), q)).collect();
    ModPol::new(q, n, c)
}

/// `ByteEncode_d` applied to `Compress_d(p)`: packs a compressed ring
/// element into `ceil(n*d/8)` bytes.
///
/// # Errors
/// Propagates `bytes_from_ints`'s validation errors.
pub fn compress_to_bytes(p: &ModPol, d: u32) -> Result<Vec<u8>, Error> {
    bytes_from_ints(d, &compress_poly(p, d))
}

/// `Decompress_d` applied after `ByteDecode_d`: unpacks bytes into a ring
/// element, restoring an approximation of the original coefficients.
///
/// # Errors
/// Propagates `ints_from_bytes`'s or `ModPol::new`'s validation errors.
pub fn decompress_from_bytes(bytes: &[u8], q: u32, n: usize, d: u32) -> Result<ModPol, Error> {
    let ys = ints_from_bytes(d, bytes, n)?;
    decompress_poly(&ys, q, n, d)
}

/// `SampleNTT`, reinterpreted in the coefficient domain: rejection-samples
/// a uniform ring element from a XOF context seeded by `rho || suffix`.
///
/// # Errors
/// Returns `Error::Unsupported` unless `q == Q` (the rejection bound
/// `d1 < q`/`d2 < q` assumes a 12-bit modulus, same as the original
/// algorithm).
pub fn uni_from_seed(rho: &[u8; 32], suffix: &[u8], q: u32, n: usize) -> Result<ModPol, Error> {
    require_production_ring(q, n)?;
    let mut xof = Xof::new(rho, suffix);
    let mut coeffs = Vec::with_capacity(n);
    let mut c = [0u8; 3];
    while coeffs.len() < n {
        let triple = xof.squeeze(3);
        c.copy_from_slice(&triple);
        let d1 = u32::from(c[0]) + 256 * (u32::from(c[1]) & 0x0F);
        let d2 = (u32::from(c[1]) >> 4) + 16 * u32::from(c[2]);
        if d1 < q {
            coeffs.push(ModInt::new(i64::from(d1), q));
        }
        if d2 < q && coeffs.len() < n {
            coeffs.push(ModInt::new(i64::from(d2), q));
        }
    }
    ModPol::new(q, n, coeffs)
}

/// Samples `A[i][j] = uni_from_seed(rho || byte(j) || byte(i))` for
/// `i, j` in `0..k`. The byte order is (column, row), not (row, column).
///
/// # Errors
/// Returns `Error::Unsupported` unless `q == Q` and `n == N`.
pub fn gen_matrix(rho: &[u8; 32], k: usize, q: u32, n: usize) -> Result<PolyMat, Error> {
    require_production_ring(q, n)?;
    let mut rows = Vec::with_capacity(k);
    for i in 0..k {
        let mut row = Vec::with_capacity(k);
        #[allow(clippy::cast_possible_truncation)]
        for j in 0..k {
            let suffix = [j as u8, i as u8];
            row.push(uni_from_seed(rho, &suffix, q, n)?);
        }
        rows.push(PolyVec::new(row)?);
    }
    PolyMat::new(rows)
}

fn count_ones(x: u32) -> u32 {
    let x = (x & 0x5555_5555) + ((x >> 1) & 0x5555_5555);
    let x = (x & 0x3333_3333) + ((x >> 2) & 0x3333_3333);
    let x = (x & 0x0F0F_0F0F) + ((x >> 4) & 0x0F0F_0F0F);
    x
}

/// `SamplePolyCBD_eta`, taking `64*eta` bytes and returning a ring element
/// whose coefficients are differences of two popcounts over `eta`-bit
/// groups.
///
/// # Errors
/// Returns `Error::Unsupported` unless `q == Q` and `n == N`; returns
/// `Error::InvalidArgument` if `bytes.len() != 64*eta`.
pub fn cbd_from_bytes(bytes: &[u8], eta: u32, q: u32, n: usize) -> Result<ModPol, Error> {
    require_production_ring(q, n)?;
    if bytes.len() != 64 * eta as usize {
        return Err(Error::InvalidArgument(format!(
            "cbd_from_bytes: expected {} bytes for eta={eta}, got {}",
            64 * eta,
            bytes.len()
        )));
    }
    let mut coeffs = Vec::with_capacity(n);
    let mut temp: u32 = 0;
    let mut bit_index = 0usize;
    for &byte in bytes {
        temp |= u32::from(byte) << bit_index;
        bit_index += 8;
        while bit_index >= 2 * eta as usize {
            let mask = (1u32 << eta) - 1;
            let x = count_ones(temp & mask);
            let y = count_ones((temp >> eta) & mask);
            #[allow(clippy::cast_possible_wrap)]
            coeffs.push(ModInt::new(i64::from(x) - i64::from(y), q));
            bit_index -= 2 * eta as usize;
            temp >>= 2 * eta as usize;
        }
    }
    ModPol::new(q, n, coeffs)
}

/// Draws a `PolyVec` of `k` CBD-sampled ring elements from a shared `Prf`
/// context, advancing the PRF's counter once per element.
///
/// # Errors
/// Propagates `Prf::next`'s or `cbd_from_bytes`'s errors.
pub fn cbd_vec_from_prf(prf: &mut Prf, k: usize, eta: u32, q: u32, n: usize) -> Result<PolyVec, Error> {
    let mut v = Vec::with_capacity(k);
    for _ in 0..k {
        let bytes = prf.next(eta)?;
        v.push(cbd_from_bytes(&bytes, eta, q, n)?);
    }
    PolyVec::new(v)
}

#[cfg(test)]
mod tests {
    use super::{byte_encode_12, gen_matrix, uni_from_seed, compress, decompress, Q, N};
    use crate::algebra::ModInt;

    #[test]
    fn compress_decompress_round_trip_q19() {
        assert_eq!(compress(ModInt::new(3, 19), 2), 1);
        assert_eq!(decompress(1, 19, 2), ModInt::new(5, 19));
        assert_eq!(compress(ModInt::new(12, 19), 2), 3);
        assert_eq!(decompress(3, 19, 2), ModInt::new(14, 19));
    }

    #[test]
    fn production_ring_constants() {
        assert_eq!(Q, 3329);
        assert_eq!(N, 256);
    }

    // Reference ACVP test vectors (the files read by the teacher's
    // `tests/nist_vectors` harness) aren't part of this retrieval pack, so
    // this spot-checks the property a cross-implementation KAT would rely
    // on instead: `uni_from_seed`/`gen_matrix` are pure functions of their
    // seed bytes, reproducible across runs, and distinct row/column
    // suffixes sample distinct ring elements.
    #[test]
    fn uniform_sampling_is_seed_deterministic() {
        let rho: [u8; 32] =
            hex::decode("7f9c2ba4e88f827d616045507605853ed73b8093f6efbc88eb1a6eacfa66ef2")
                .unwrap()
                .try_into()
                .unwrap();

        let a1 = uni_from_seed(&rho, &[0, 0], Q, N).unwrap();
        let a2 = uni_from_seed(&rho, &[0, 0], Q, N).unwrap();
        assert_eq!(byte_encode_12(&a1).unwrap(), byte_encode_12(&a2).unwrap());

        let a_01 = uni_from_seed(&rho, &[0, 1], Q, N).unwrap();
        assert_ne!(byte_encode_12(&a1).unwrap(), byte_encode_12(&a_01).unwrap());

        let k = 3;
        let mat1 = gen_matrix(&rho, k, Q, N).unwrap();
        let mat2 = gen_matrix(&rho, k, Q, N).unwrap();
        assert_eq!(mat1.rows()[0].get(0), mat2.rows()[0].get(0));
        // Row-major (i,j) = (0,1) must match uni_from_seed(rho, [1,0]): the
        // matrix-seed suffix is column-then-row, not row-then-column.
        assert_eq!(
            byte_encode_12(mat1.rows()[0].get(1)).unwrap(),
            byte_encode_12(&uni_from_seed(&rho, &[1, 0], Q, N).unwrap()).unwrap()
        );
    }
}
