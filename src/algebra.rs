//! Generic ring algebra over `R_q = Z_q[X]/(X^n + 1)`.
//!
//! Unlike a from-scratch FIPS 203 implementation, `q` and `n` here are
//! runtime fields carried on every value rather than compile-time constants.
//! That's what lets this module be exercised directly against the small
//! test-scenario moduli (41, 541, 137, 19, 17, 6, ...) as well as the
//! production Kyber ring (q=3329, n=256); the Kyber-specific extensions in
//! `kyber_algebra` assume the production ring and build on top of this one.
//!
//! No inheritance, no subclassing: this module is purely the algebra, with
//! free-standing constructors and operator overloads. The Kyber layer calls
//! straight into the public API below.

use rand_core::CryptoRngCore;

use crate::error::Error;

/// An element of `Z_q`, stored as its representative in `[0, q)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModInt {
    r: u32,
    q: u32,
}

impl ModInt {
    /// Builds `r mod q`. `r` may be negative; the representative is always
    /// normalized into `[0, q)`.
    #[must_use]
    pub fn new(r: i64, q: u32) -> Self {
        let r = r.rem_euclid(i64::from(q));
        #[allow(clippy::cast_sign_loss)]
        Self { r: r as u32, q }
    }

    /// The representative in `[0, q)`.
    #[must_use]
    pub fn r(self) -> u32 { self.r }

    /// The modulus.
    #[must_use]
    pub fn q(self) -> u32 { self.q }

    /// Adds two elements sharing a modulus.
    #[must_use]
    pub fn add(self, other: Self) -> Self {
        debug_assert_eq!(self.q, other.q);
        Self::new(i64::from(self.r) + i64::from(other.r), self.q)
    }

    /// Subtracts two elements sharing a modulus.
    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        debug_assert_eq!(self.q, other.q);
        Self::new(i64::from(self.r) - i64::from(other.r), self.q)
    }

    /// Multiplies two elements sharing a modulus.
    #[must_use]
    pub fn mul(self, other: Self) -> Self {
        debug_assert_eq!(self.q, other.q);
        Self::new(i64::from(self.r) * i64::from(other.r), self.q)
    }

    /// Signed-magnitude norm: `min(r, q - r)`, the absolute value of the
    /// representative taken in `(-q/2, q/2]`.
    #[must_use]
    pub fn size(self) -> u32 { self.r.min(self.q - self.r) }

    /// Picks a `ModInt` uniformly at random in `[0, q)`.
    #[must_use]
    pub fn rand_uni(rng: &mut impl CryptoRngCore, q: u32) -> Self {
        Self::new(i64::from(rng.next_u32() % q), q)
    }

    /// Picks a small (size `<= eta`) `ModInt` uniformly at random: a
    /// uniform pick from the `2*eta+1` symmetric representatives
    /// `-eta, ..., eta`.
    #[must_use]
    pub fn rand_small_uni(rng: &mut impl CryptoRngCore, q: u32, eta: u32) -> Self {
        let span = 2 * eta + 1;
        let pos = i64::from(rng.next_u32() % span);
        Self::new(pos - i64::from(eta), q)
    }
}

impl core::ops::Add for ModInt {
    type Output = Self;
    fn add(self, rhs: Self) -> Self { ModInt::add(self, rhs) }
}

impl core::ops::Sub for ModInt {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self { ModInt::sub(self, rhs) }
}

impl core::ops::Mul for ModInt {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self { ModInt::mul(self, rhs) }
}

/// An element of `R_q`: `c[0] + c[1] X + ... + c[n-1] X^(n-1) mod X^n + 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModPol {
    q: u32,
    n: usize,
    c: Vec<ModInt>,
}

impl ModPol {
    /// Builds a ring element from `n` coefficients sharing modulus `q`.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` if `c` is empty, its length isn't
    /// `n`, or a coefficient's modulus doesn't match `q`.
    pub fn new(q: u32, n: usize, c: Vec<ModInt>) -> Result<Self, Error> {
        if n == 0 || c.len() != n {
            return Err(Error::InvalidArgument(format!(
                "ModPol: expected {n} coefficients, got {}",
                c.len()
            )));
        }
        if c.iter().any(|x| x.q() != q) {
            return Err(Error::InvalidArgument("ModPol: coefficient modulus mismatch".into()));
        }
        Ok(Self { q, n, c })
    }

    /// The additive identity of degree `n` over `Z_q`.
    #[must_use]
    pub fn zero(q: u32, n: usize) -> Self {
        Self { q, n, c: vec![ModInt::new(0, q); n] }
    }

    /// This element's modulus.
    #[must_use]
    pub fn q(&self) -> u32 { self.q }

    /// This element's ring degree.
    #[must_use]
    pub fn n(&self) -> usize { self.n }

    /// This element's coefficients, lowest degree first.
    #[must_use]
    pub fn coeffs(&self) -> &[ModInt] { &self.c }

    /// Picks an element of `R_q` uniformly at random.
    #[must_use]
    pub fn rand_uni(rng: &mut impl CryptoRngCore, q: u32, n: usize) -> Self {
        let c = (0..n).map(|_| ModInt::rand_uni(rng, q)).collect();
        Self { q, n, c }
    }

    /// Picks a small (size `<= eta`) element of `R_q` uniformly at random.
    #[must_use]
    pub fn rand_small_uni(rng: &mut impl CryptoRngCore, q: u32, n: usize, eta: u32) -> Self {
        let c = (0..n).map(|_| ModInt::rand_small_uni(rng, q, eta)).collect();
        Self { q, n, c }
    }

    /// Coefficient-wise addition.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        debug_assert_eq!((self.q, self.n), (other.q, other.n));
        let c = self.c.iter().zip(&other.c).map(|(a, b)| a.add(*b)).collect();
        Self { q: self.q, n: self.n, c }
    }

    /// Coefficient-wise subtraction.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        debug_assert_eq!((self.q, self.n), (other.q, other.n));
        let c = self.c.iter().zip(&other.c).map(|(a, b)| a.sub(*b)).collect();
        Self { q: self.q, n: self.n, c }
    }

    /// Negacyclic convolution modulo `X^n + 1`: a partial product landing at
    /// index `k = i+j >= n` is folded back in with a sign flip, since
    /// `X^n == -1` in this ring.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        debug_assert_eq!((self.q, self.n), (other.q, other.n));
        let mut c = vec![ModInt::new(0, self.q); self.n];
        for (i, a) in self.c.iter().enumerate() {
            for (j, b) in other.c.iter().enumerate() {
                let p = a.mul(*b);
                let k = i + j;
                if k >= self.n {
                    c[k - self.n] = c[k - self.n].sub(p);
                } else {
                    c[k] = c[k].add(p);
                }
            }
        }
        Self { q: self.q, n: self.n, c }
    }

    /// Size of self: the max size over all coefficients.
    #[must_use]
    pub fn size(&self) -> u32 { self.c.iter().map(|x| x.size()).max().expect("n > 0") }
}

impl core::ops::Add for &ModPol {
    type Output = ModPol;
    fn add(self, rhs: Self) -> ModPol { ModPol::add(self, rhs) }
}

impl core::ops::Sub for &ModPol {
    type Output = ModPol;
    fn sub(self, rhs: Self) -> ModPol { ModPol::sub(self, rhs) }
}

impl core::ops::Mul for &ModPol {
    type Output = ModPol;
    fn mul(self, rhs: Self) -> ModPol { ModPol::mul(self, rhs) }
}

/// An element of `R_q^k`: a vector of `k` ring elements sharing `(q, n)`.
///
/// Named `PolyVec` (rather than the bare `Vec` of the textbook notation it
/// generalizes) to avoid shadowing `std::vec::Vec`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolyVec {
    v: Vec<ModPol>,
}

impl PolyVec {
    /// Builds a vector given a non-empty list of ring elements sharing
    /// `(q, n)`.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` if `v` is empty or its elements
    /// don't share a common `(q, n)`.
    pub fn new(v: Vec<ModPol>) -> Result<Self, Error> {
        let Some(first) = v.first() else {
            return Err(Error::InvalidArgument("PolyVec: empty".into()));
        };
        let (q, n) = (first.q(), first.n());
        if v.iter().any(|p| p.q() != q || p.n() != n) {
            return Err(Error::InvalidArgument("PolyVec: element shape mismatch".into()));
        }
        Ok(Self { v })
    }

    /// Builds a `k`-entry vector of uniformly random ring elements.
    #[must_use]
    pub fn rand_uni(rng: &mut impl CryptoRngCore, q: u32, n: usize, k: usize) -> Self {
        Self { v: (0..k).map(|_| ModPol::rand_uni(rng, q, n)).collect() }
    }

    /// Builds a `k`-entry vector of small (size `<= eta`) ring elements.
    #[must_use]
    pub fn rand_small_uni(rng: &mut impl CryptoRngCore, q: u32, n: usize, k: usize, eta: u32) -> Self {
        Self { v: (0..k).map(|_| ModPol::rand_small_uni(rng, q, n, eta)).collect() }
    }

    /// The number of ring elements in this vector.
    #[must_use]
    pub fn len(&self) -> usize { self.v.len() }

    /// Whether this vector has zero entries (never true for a `PolyVec`
    /// built via [`PolyVec::new`], which rejects empty input).
    #[must_use]
    pub fn is_empty(&self) -> bool { self.v.is_empty() }

    /// The `i`th ring element.
    #[must_use]
    pub fn get(&self, i: usize) -> &ModPol { &self.v[i] }

    /// This vector's entries as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[ModPol] { &self.v }

    /// Entry-wise addition.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let v = self.v.iter().zip(&other.v).map(|(a, b)| a.add(b)).collect();
        Self { v }
    }

    /// Entry-wise subtraction.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        let v = self.v.iter().zip(&other.v).map(|(a, b)| a.sub(b)).collect();
        Self { v }
    }

    /// Inner product with another `PolyVec` (a.k.a. dot product, `a^T b`);
    /// the result is a single ring element.
    #[must_use]
    pub fn dot(&self, other: &Self) -> ModPol {
        let first = &self.v[0];
        let zero = ModPol::zero(first.q(), first.n());
        self.v.iter().zip(&other.v).fold(zero, |acc, (a, b)| acc.add(&a.mul(b)))
    }

    /// Size of self: the max size over all entries.
    #[must_use]
    pub fn size(&self) -> u32 { self.v.iter().map(ModPol::size).max().expect("k > 0") }
}

/// A square matrix of `k x k` ring elements, organized as `k` rows
/// (`PolyVec`s of length `k`).
///
/// Named `PolyMat` for the same reason `PolyVec` is: avoids shadowing a std
/// prelude name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolyMat {
    rows: Vec<PolyVec>,
}

impl PolyMat {
    /// Builds a matrix given a non-empty list of equal-length rows.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` if `rows` is empty or not square.
    pub fn new(rows: Vec<PolyVec>) -> Result<Self, Error> {
        let k = rows.len();
        if k == 0 || rows.iter().any(|r| r.len() != k) {
            return Err(Error::InvalidArgument("PolyMat: not a square matrix".into()));
        }
        Ok(Self { rows })
    }

    /// Builds a `k x k` matrix of uniformly random ring elements.
    #[must_use]
    pub fn rand_uni(rng: &mut impl CryptoRngCore, q: u32, n: usize, k: usize) -> Self {
        Self { rows: (0..k).map(|_| PolyVec::rand_uni(rng, q, n, k)).collect() }
    }

    /// This matrix's rows.
    #[must_use]
    pub fn rows(&self) -> &[PolyVec] { &self.rows }

    /// This matrix's dimension `k`.
    #[must_use]
    pub fn k(&self) -> usize { self.rows.len() }

    /// Multiplies this matrix by a vector: each row's inner product with
    /// `v` becomes the corresponding output entry.
    #[must_use]
    pub fn mul_vec(&self, v: &PolyVec) -> PolyVec {
        PolyVec { v: self.rows.iter().map(|row| row.dot(v)).collect() }
    }

    /// Returns this matrix's transpose.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let k = self.rows.len();
        let rows = (0..k)
            .map(|i| PolyVec { v: (0..k).map(|j| self.rows[j].as_slice()[i].clone()).collect() })
            .collect();
        Self { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::{ModInt, ModPol, PolyMat, PolyVec};

    fn modpol(q: u32, n: usize, c: &[i64]) -> ModPol {
        ModPol::new(q, n, c.iter().map(|&x| ModInt::new(x, q)).collect()).unwrap()
    }

    #[test]
    fn modint_equal() {
        assert_eq!(ModInt::new(5, 17), ModInt::new(5, 17));
        assert_eq!(ModInt::new(22, 17), ModInt::new(5, 17));
        assert_eq!(ModInt::new(-12, 17), ModInt::new(5, 17));
        assert_ne!(ModInt::new(5, 17), ModInt::new(4, 17));
    }

    #[test]
    fn modint_arith() {
        assert_eq!(ModInt::new(9, 17) + ModInt::new(15, 17), ModInt::new(7, 17));
        assert_eq!(ModInt::new(9, 17) - ModInt::new(15, 17), ModInt::new(11, 17));
        assert_eq!(ModInt::new(9, 17) * ModInt::new(15, 17), ModInt::new(16, 17));
    }

    #[test]
    fn modint_size() {
        assert_eq!(ModInt::new(0, 4).size(), 0);
        assert_eq!(ModInt::new(1, 4).size(), 1);
        assert_eq!(ModInt::new(2, 4).size(), 2);
        assert_eq!(ModInt::new(3, 4).size(), 1);
        assert_eq!(ModInt::new(0, 5).size(), 0);
        assert_eq!(ModInt::new(2, 5).size(), 2);
        assert_eq!(ModInt::new(3, 5).size(), 2);
        assert_eq!(ModInt::new(4, 5).size(), 1);
    }

    #[test]
    fn modpol_add_sub() {
        let f = modpol(41, 4, &[32, 0, 17, 22]);
        let g = modpol(41, 4, &[11, 7, 19, 1]);
        let s = modpol(41, 4, &[2, 7, 36, 23]);
        assert_eq!(f.add(&g), s);
        assert_eq!(g.add(&f), s);
        let d1 = modpol(41, 4, &[21, 34, 39, 21]);
        assert_eq!(f.sub(&g), d1);
    }

    #[test]
    fn modpol_mul_slide_26() {
        let f = modpol(41, 4, &[32, 0, 17, 22]);
        let g = modpol(41, 4, &[11, 7, 19, 1]);
        let r = modpol(41, 4, &[39, 35, 35, 24]);
        assert_eq!(f.mul(&g), r);
        assert_eq!(g.mul(&f), r);
    }

    #[test]
    fn modpol_size_under_multiplication_slide_35() {
        let f = modpol(41, 4, &[1, 1, -2, 2]);
        let g = modpol(41, 4, &[-2, 0, 2, -1]);
        assert_eq!(f.size(), 2);
        assert_eq!(g.size(), 2);
        assert_eq!(f.mul(&g).size(), 8);
    }

    #[test]
    fn vec_add_sub_mul_slide_28_29() {
        let a = PolyVec::new(vec![
            modpol(137, 4, &[93, 51, 34, 54]),
            modpol(137, 4, &[27, 87, 81, 6]),
            modpol(137, 4, &[112, 15, 46, 122]),
        ])
        .unwrap();
        let b = PolyVec::new(vec![
            modpol(137, 4, &[40, 78, 1, 119]),
            modpol(137, 4, &[11, 31, 57, 90]),
            modpol(137, 4, &[108, 72, 47, 14]),
        ])
        .unwrap();
        let sum = PolyVec::new(vec![
            modpol(137, 4, &[133, 129, 35, 36]),
            modpol(137, 4, &[38, 118, 1, 96]),
            modpol(137, 4, &[83, 87, 93, 136]),
        ])
        .unwrap();
        assert_eq!(a.add(&b), sum);
        assert_eq!(b.add(&a), sum);

        let dot = modpol(137, 4, &[93, 59, 44, 132]);
        assert_eq!(a.dot(&b), dot);
        assert_eq!(b.dot(&a), dot);
    }

    #[test]
    fn vec_size() {
        let f = modpol(41, 4, &[1, 1, -2, 2]);
        let g = modpol(41, 4, &[-2, 0, 2, -1]);
        assert_eq!(PolyVec::new(vec![f.clone(), g.clone()]).unwrap().size(), 2);
        assert_eq!(PolyVec::new(vec![f.clone(), g.clone(), f.mul(&g)]).unwrap().size(), 8);
    }

    #[test]
    fn mat_mlwe_slide_39() {
        let p = |c: &[i64]| modpol(541, 4, c);
        let a = PolyMat::new(vec![
            PolyVec::new(vec![p(&[442, 502, 513, 15]), p(&[368, 166, 37, 135])]).unwrap(),
            PolyVec::new(vec![p(&[479, 532, 116, 41]), p(&[12, 139, 385, 409])]).unwrap(),
            PolyVec::new(vec![p(&[29, 394, 503, 389]), p(&[9, 499, 92, 254])]).unwrap(),
        ])
        .unwrap();
        let s = PolyVec::new(vec![p(&[2, -2, 0, 1]), p(&[3, -2, -2, -2])]).unwrap();
        let e = PolyVec::new(vec![
            p(&[2, -2, -1, 0]),
            p(&[1, 2, 2, 1]),
            p(&[-2, 0, -1, -2]),
        ])
        .unwrap();
        let t = PolyVec::new(vec![
            p(&[30, 252, 401, 332]),
            p(&[247, 350, 259, 485]),
            p(&[534, 234, 137, 443]),
        ])
        .unwrap();

        assert_eq!(t, a.mul_vec(&s).add(&e));
        assert_eq!(s.size(), 3);
        assert_eq!(e.size(), 2);
        assert_eq!(t.size(), 259);
    }

    #[test]
    fn mat_transpose() {
        let p = |c: i64| modpol(6, 1, &[c]);
        let (a, b, c, d, e, f) = (p(0), p(1), p(2), p(3), p(4), p(5));

        let m1 =
            PolyMat::new(vec![PolyVec::new(vec![a.clone(), b.clone()]).unwrap(), PolyVec::new(vec![c.clone(), d.clone()]).unwrap()])
                .unwrap();
        let m2 =
            PolyMat::new(vec![PolyVec::new(vec![a.clone(), c.clone()]).unwrap(), PolyVec::new(vec![b.clone(), d.clone()]).unwrap()])
                .unwrap();
        assert_eq!(m1.transpose(), m2);
        assert_eq!(m2.transpose(), m1);

        let m1 = PolyMat::new(vec![
            PolyVec::new(vec![a.clone(), b.clone(), c.clone()]).unwrap(),
            PolyVec::new(vec![d.clone(), e.clone(), f.clone()]).unwrap(),
        ])
        .unwrap();
        let m2 = PolyMat::new(vec![
            PolyVec::new(vec![a, d]).unwrap(),
            PolyVec::new(vec![b, e]).unwrap(),
            PolyVec::new(vec![c, f]).unwrap(),
        ])
        .unwrap();
        assert_eq!(m1.transpose(), m2);
        assert_eq!(m2.transpose(), m1);
    }
}
