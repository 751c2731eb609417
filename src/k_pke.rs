//! K-PKE: the IND-CPA public-key encryption scheme ML-KEM's encapsulation
//! and decapsulation are built on via the Fujisaki-Okamoto transform in
//! `ml_kem`.
//!
//! `k`, `eta1`, `eta2`, `du`, `dv` are runtime arguments here rather than
//! const generics — every buffer involved is a `Vec`, sized from these
//! arguments, rather than a fixed-size array.

use crate::algebra::{ModPol, PolyMat, PolyVec};
use crate::byte_fns::ints_from_bytes;
use crate::error::Error;
use crate::kyber_algebra::{
    byte_decode_12, byte_encode_12, cbd_from_bytes, cbd_vec_from_prf, compress_to_bytes,
    decompress_from_bytes, decompress_poly, gen_matrix, N, Q,
};
use crate::symmetric::{g, Prf};

fn decode_vec(bytes: &[u8], k: usize) -> Result<PolyVec, Error> {
    let mut v = Vec::with_capacity(k);
    for chunk in bytes.chunks(384).take(k) {
        v.push(byte_decode_12(chunk, Q, N)?);
    }
    PolyVec::new(v)
}

fn encode_vec(v: &PolyVec) -> Result<Vec<u8>, Error> {
    let mut out = Vec::with_capacity(v.len() * 384);
    for p in v.as_slice() {
        out.extend(byte_encode_12(p)?);
    }
    Ok(out)
}

/// `K-PKE.KeyGen(d)`: expands a 32-byte seed into an encryption key
/// (`384*k+32` bytes) and a decryption key (`384*k` bytes).
///
/// Draws `s` from `CBD_eta1` and `e` from `CBD_eta2`, sharing one PRF
/// context and counter across both vectors, in that order.
///
/// # Errors
/// Returns `Error::InvalidArgument`/`Error::Unsupported` if the algebraic
/// layer rejects a malformed intermediate value.
pub fn k_pke_key_gen(d: &[u8; 32], k: usize, eta1: u32, eta2: u32) -> Result<(Vec<u8>, Vec<u8>), Error> {
    let mut seed = [0u8; 33];
    seed[0..32].copy_from_slice(d);
    #[allow(clippy::cast_possible_truncation)]
    {
        seed[32] = k as u8;
    }
    let (rho, sigma) = g(&seed);

    let a = gen_matrix(&rho, k, Q, N)?;

    let mut prf = Prf::new(sigma);
    let s = cbd_vec_from_prf(&mut prf, k, eta1, Q, N)?;
    let e = cbd_vec_from_prf(&mut prf, k, eta2, Q, N)?;

    let t = a.mul_vec(&s).add(&e);

    let mut ek = encode_vec(&t)?;
    ek.extend_from_slice(&rho);
    let dk = encode_vec(&s)?;

    Ok((ek, dk))
}

/// `K-PKE.Encrypt(ek, m, r)`: encrypts a 32-byte message under `ek` using
/// the 32 bytes of randomness `r`, producing a `32*(du*k+dv)`-byte
/// ciphertext.
///
/// # Errors
/// Returns `Error::InvalidArgument` if `ek` or `m` have the wrong length,
/// or if an intermediate decode fails.
pub fn k_pke_encrypt(
    ek: &[u8], m: &[u8; 32], r: &[u8; 32], k: usize, eta1: u32, eta2: u32, du: u32, dv: u32,
) -> Result<Vec<u8>, Error> {
    if ek.len() != 384 * k + 32 {
        return Err(Error::InvalidArgument(format!(
            "k_pke_encrypt: ek length {} != 384*k+32 for k={k}",
            ek.len()
        )));
    }

    let t = decode_vec(ek, k)?;
    let rho: [u8; 32] = ek[384 * k..384 * k + 32].try_into().expect("sliced to 32 bytes");
    let a = gen_matrix(&rho, k, Q, N)?;

    let mut prf = Prf::new(*r);
    let r_e = cbd_vec_from_prf(&mut prf, k, eta1, Q, N)?;
    let e1 = cbd_vec_from_prf(&mut prf, k, eta2, Q, N)?;
    let e2 = cbd_from_bytes(&prf.next(eta2)?, eta2, Q, N)?;

    let u = a.transpose().mul_vec(&r_e).add(&e1);

    let m_bits = ints_from_bytes(1, m, N)?;
    let mu = decompress_poly(&m_bits, Q, N, 1)?;
    let v = t.dot(&r_e).add(&e2).add(&mu);

    let mut ct = Vec::with_capacity(32 * (du as usize * k + dv as usize));
    for p in u.as_slice() {
        ct.extend(compress_to_bytes(p, du)?);
    }
    ct.extend(compress_to_bytes(&v, dv)?);

    Ok(ct)
}

/// `K-PKE.Decrypt(dk, c)`: recovers the 32-byte message from a ciphertext
/// under `dk`.
///
/// # Errors
/// Returns `Error::InvalidArgument` if `dk` or `ct` have the wrong length.
pub fn k_pke_decrypt(dk: &[u8], ct: &[u8], k: usize, du: u32, dv: u32) -> Result<[u8; 32], Error> {
    if dk.len() != 384 * k {
        return Err(Error::InvalidArgument(format!(
            "k_pke_decrypt: dk length {} != 384*k for k={k}",
            dk.len()
        )));
    }
    let expect_ct = 32 * (du as usize * k + dv as usize);
    if ct.len() != expect_ct {
        return Err(Error::InvalidArgument(format!(
            "k_pke_decrypt: ct length {} != {expect_ct}",
            ct.len()
        )));
    }

    let c1_len = 32 * du as usize * k;
    let (c1, c2) = ct.split_at(c1_len);

    let mut u = Vec::with_capacity(k);
    for chunk in c1.chunks(32 * du as usize) {
        u.push(decompress_from_bytes(chunk, Q, N, du)?);
    }
    let u = PolyVec::new(u)?;

    let v = decompress_from_bytes(c2, Q, N, dv)?;
    let s = decode_vec(dk, k)?;

    let w = v.sub(&s.dot(&u));

    let w_compressed = crate::kyber_algebra::compress_poly(&w, 1);
    let m_bytes = crate::byte_fns::bytes_from_ints(1, &w_compressed)?;
    let mut m = [0u8; 32];
    m.copy_from_slice(&m_bytes);

    Ok(m)
}
