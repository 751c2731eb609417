//! ML-KEM proper: the Fujisaki-Okamoto transform wrapped around K-PKE,
//! turning a malleable IND-CPA encryption scheme into an IND-CCA KEM.
//!
//! `k`, `eta1`, `eta2`, `du`, `dv` are runtime arguments; every ciphertext
//! and key buffer here is a `Vec<u8>` sized from them.

use rand_core::CryptoRngCore;
use subtle::{ConditionallySelectable, ConstantTimeEq};

use crate::error::Error;
use crate::k_pke::{k_pke_decrypt, k_pke_encrypt, k_pke_key_gen};
use crate::symmetric::{g, h, j};
use crate::SharedSecretKey;

/// `ML-KEM.KeyGen_internal(d, z)`: deterministic key generation from two
/// 32-byte seeds. Returns `(ek, dk)` of lengths `(384k+32, 768k+96)`.
///
/// # Errors
/// Propagates `k_pke_key_gen`'s errors.
pub(crate) fn ml_kem_key_gen_internal(
    d: &[u8; 32], z: &[u8; 32], k: usize, eta1: u32, eta2: u32,
) -> Result<(Vec<u8>, Vec<u8>), Error> {
    let (ek, dk_pke) = k_pke_key_gen(d, k, eta1, eta2)?;

    let h_ek = h(&ek);
    let mut dk = Vec::with_capacity(768 * k + 96);
    dk.extend_from_slice(&dk_pke);
    dk.extend_from_slice(&ek);
    dk.extend_from_slice(&h_ek);
    dk.extend_from_slice(z);

    Ok((ek, dk))
}

/// `ML-KEM.Encaps_internal(ek, m)`: derives `(K, r)` from `m` and `H(ek)`,
/// then encrypts `m` under `ek` with randomness `r`.
///
/// # Errors
/// Propagates `k_pke_encrypt`'s errors.
fn ml_kem_encaps_internal(
    ek: &[u8], m: &[u8; 32], k: usize, eta1: u32, eta2: u32, du: u32, dv: u32,
) -> Result<(SharedSecretKey, Vec<u8>), Error> {
    let h_ek = h(ek);
    let mut seed = Vec::with_capacity(64);
    seed.extend_from_slice(m);
    seed.extend_from_slice(&h_ek);
    let (shared_key, r) = g(&seed);

    let ct = k_pke_encrypt(ek, m, &r, k, eta1, eta2, du, dv)?;

    Ok((SharedSecretKey(shared_key), ct))
}

/// `ML-KEM.Decaps_internal(dk, c)`: recovers the shared secret, falling
/// back to the implicit-rejection value `J(z || c)` if re-encrypting the
/// recovered plaintext doesn't reproduce `c`. The comparison and selection
/// are constant-time since its result is exactly the secret this transform
/// exists to hide.
///
/// # Errors
/// Propagates `k_pke_decrypt`'s/`k_pke_encrypt`'s errors; never fails due
/// to ciphertext mismatch.
fn ml_kem_decaps_internal(
    dk: &[u8], ct: &[u8], k: usize, eta1: u32, eta2: u32, du: u32, dv: u32,
) -> Result<SharedSecretKey, Error> {
    let dk_pke = &dk[0..384 * k];
    let ek_pke = &dk[384 * k..768 * k + 32];
    let h_hash = &dk[768 * k + 32..768 * k + 64];
    let z = &dk[768 * k + 64..768 * k + 96];

    let m_prime = k_pke_decrypt(dk_pke, ct, k, du, dv)?;

    let mut seed = Vec::with_capacity(64);
    seed.extend_from_slice(&m_prime);
    seed.extend_from_slice(h_hash);
    let (mut k_prime, r_prime) = g(&seed);

    let z: [u8; 32] = z.try_into().expect("dk sliced to 32 bytes");
    let k_bar = j(&z, ct);

    let c_prime = k_pke_encrypt(ek_pke, &m_prime, &r_prime, k, eta1, eta2, du, dv)?;

    k_prime.conditional_assign(&k_bar, ct.ct_ne(c_prime.as_slice()));

    Ok(SharedSecretKey(k_prime))
}

/// `ML-KEM.KeyGen()`: draws fresh randomness from `rng` and runs
/// [`ml_kem_key_gen_internal`].
///
/// # Errors
/// Returns `Error::InvalidArgument` if the RNG fails; propagates
/// `ml_kem_key_gen_internal`'s errors otherwise.
pub(crate) fn ml_kem_key_gen(
    rng: &mut impl CryptoRngCore, k: usize, eta1: u32, eta2: u32,
) -> Result<(Vec<u8>, Vec<u8>), Error> {
    let mut d = [0u8; 32];
    rng.try_fill_bytes(&mut d)
        .map_err(|_| Error::InvalidArgument("RNG failed while drawing d".into()))?;
    let mut z = [0u8; 32];
    rng.try_fill_bytes(&mut z)
        .map_err(|_| Error::InvalidArgument("RNG failed while drawing z".into()))?;

    ml_kem_key_gen_internal(&d, &z, k, eta1, eta2)
}

/// `ML-KEM.Encaps(ek)`: draws fresh randomness from `rng` and runs
/// [`ml_kem_encaps_internal`].
///
/// # Errors
/// Returns `Error::InvalidArgument` if the RNG fails or `ek` has the wrong
/// length; propagates `ml_kem_encaps_internal`'s errors otherwise.
pub(crate) fn ml_kem_encaps(
    rng: &mut impl CryptoRngCore, ek: &[u8], k: usize, eta1: u32, eta2: u32, du: u32, dv: u32,
) -> Result<(SharedSecretKey, Vec<u8>), Error> {
    if ek.len() != 384 * k + 32 {
        return Err(Error::InvalidArgument(format!(
            "ml_kem_encaps: ek length {} != 384*k+32 for k={k}",
            ek.len()
        )));
    }

    let mut m = [0u8; 32];
    rng.try_fill_bytes(&mut m)
        .map_err(|_| Error::InvalidArgument("RNG failed while drawing m".into()))?;

    ml_kem_encaps_internal(ek, &m, k, eta1, eta2, du, dv)
}

/// `ML-KEM.Decaps(dk, c)`: recovers the shared secret. Never fails on
/// ciphertext content, only on malformed input shape.
///
/// # Errors
/// Returns `Error::InvalidArgument` if `dk` or `ct` have the wrong length.
pub(crate) fn ml_kem_decaps(
    dk: &[u8], ct: &[u8], k: usize, eta1: u32, eta2: u32, du: u32, dv: u32,
) -> Result<SharedSecretKey, Error> {
    if dk.len() != 768 * k + 96 {
        return Err(Error::InvalidArgument(format!(
            "ml_kem_decaps: dk length {} != 768*k+96 for k={k}",
            dk.len()
        )));
    }
    let expect_ct = 32 * (du as usize * k + dv as usize);
    if ct.len() != expect_ct {
        return Err(Error::InvalidArgument(format!(
            "ml_kem_decaps: ct length {} != {expect_ct}",
            ct.len()
        )));
    }

    ml_kem_decaps_internal(dk, ct, k, eta1, eta2, du, dv)
}

#[cfg(test)]
mod tests {
    use super::{ml_kem_decaps, ml_kem_encaps, ml_kem_key_gen};
    use rand_core::SeedableRng;

    const ETA1: u32 = 3;
    const ETA2: u32 = 2;
    const DU: u32 = 10;
    const DV: u32 = 4;
    const K: usize = 2;

    #[test]
    fn encaps_decaps_agree() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);

        let (ek, dk) = ml_kem_key_gen(&mut rng, K, ETA1, ETA2).unwrap();
        assert_eq!(ek.len(), 800);
        assert_eq!(dk.len(), 1632);

        let (shared_a, ct) = ml_kem_encaps(&mut rng, &ek, K, ETA1, ETA2, DU, DV).unwrap();
        assert_eq!(ct.len(), 768);

        let shared_b = ml_kem_decaps(&dk, &ct, K, ETA1, ETA2, DU, DV).unwrap();
        assert_eq!(shared_a.0, shared_b.0);
    }

    #[test]
    fn decaps_implicitly_rejects_tampered_ciphertext() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        let (ek, dk) = ml_kem_key_gen(&mut rng, K, ETA1, ETA2).unwrap();
        let (shared_a, mut ct) = ml_kem_encaps(&mut rng, &ek, K, ETA1, ETA2, DU, DV).unwrap();
        ct[0] ^= 0xFF;

        let shared_b = ml_kem_decaps(&dk, &ct, K, ETA1, ETA2, DU, DV).unwrap();
        assert_ne!(shared_a.0, shared_b.0);
    }

    #[test]
    fn rejects_malformed_key_lengths() {
        assert!(ml_kem_decaps(&[0u8; 4], &[0u8; 768], K, ETA1, ETA2, DU, DV).is_err());
    }
}
