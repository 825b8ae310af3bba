//! Irreducible factorization of univariate integer polynomials
//!
//! Classic Zassenhaus: factor modulo a small prime (Cantor-Zassenhaus),
//! Hensel-lift the modular factors past a coefficient bound, then recombine
//! subsets of lifted factors into true factors by trial division.
//!
//! Polynomials are coefficient vectors, lowest degree first, with no
//! trailing zeros.

use num_bigint::{BigInt, BigUint};
use num_integer::{Integer, Roots};
use num_traits::{One, Signed, ToPrimitive, Zero};

/// Good primes compared before picking the one with the fewest factors
const PRIME_TRIALS: usize = 3;

/// Primes are searched below this bound
const PRIME_LIMIT: u64 = 1 << 20;

/// Random splitting attempts per equal-degree product
const SPLIT_ATTEMPTS: usize = 256;

type ModPoly = Vec<u64>;

fn trim_mod(mut a: ModPoly) -> ModPoly {
    while a.last() == Some(&0) {
        a.pop();
    }
    a
}

fn trim_int(mut a: Vec<BigInt>) -> Vec<BigInt> {
    while a.last().is_some_and(Zero::is_zero) {
        a.pop();
    }
    a
}

/// Polynomial arithmetic modulo a prime `p < 2^20`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Zp {
    p: u64,
}

impl Zp {
    fn reduce(&self, f: &[BigInt]) -> ModPoly {
        let p = BigInt::from(self.p);
        trim_mod(
            f.iter()
                .map(|c| c.mod_floor(&p).to_u64().unwrap_or(0))
                .collect(),
        )
    }

    fn pow_scalar(&self, base: u64, mut exponent: u64) -> u64 {
        let mut base = base % self.p;
        let mut result = 1;
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = result * base % self.p;
            }
            base = base * base % self.p;
            exponent >>= 1;
        }
        result
    }

    fn inverse(&self, a: u64) -> u64 {
        self.pow_scalar(a, self.p - 2)
    }

    fn add(&self, a: &[u64], b: &[u64]) -> ModPoly {
        let n = a.len().max(b.len());
        trim_mod(
            (0..n)
                .map(|i| (a.get(i).unwrap_or(&0) + b.get(i).unwrap_or(&0)) % self.p)
                .collect(),
        )
    }

    fn sub(&self, a: &[u64], b: &[u64]) -> ModPoly {
        let n = a.len().max(b.len());
        trim_mod(
            (0..n)
                .map(|i| (a.get(i).unwrap_or(&0) + self.p - b.get(i).unwrap_or(&0)) % self.p)
                .collect(),
        )
    }

    fn mul(&self, a: &[u64], b: &[u64]) -> ModPoly {
        if a.is_empty() || b.is_empty() {
            return Vec::new();
        }
        let mut out = vec![0u64; a.len() + b.len() - 1];
        for (i, &x) in a.iter().enumerate() {
            if x == 0 {
                continue;
            }
            for (j, &y) in b.iter().enumerate() {
                out[i + j] = (out[i + j] + x * y) % self.p;
            }
        }
        trim_mod(out)
    }

    fn scale(&self, a: &[u64], c: u64) -> ModPoly {
        trim_mod(a.iter().map(|&x| x * c % self.p).collect())
    }

    /// Quotient and remainder. `b` must be nonzero.
    fn div_rem(&self, a: &[u64], b: &[u64]) -> (ModPoly, ModPoly) {
        let Some(&lead) = b.last() else {
            return (Vec::new(), a.to_vec());
        };
        if a.len() < b.len() {
            return (Vec::new(), a.to_vec());
        }

        let shift = b.len() - 1;
        let inverse = self.inverse(lead);
        let mut remainder = a.to_vec();
        let mut quotient = vec![0u64; a.len() - shift];
        for i in (0..quotient.len()).rev() {
            let c = remainder[i + shift] * inverse % self.p;
            quotient[i] = c;
            if c == 0 {
                continue;
            }
            for (j, &y) in b.iter().enumerate() {
                remainder[i + j] = (remainder[i + j] + self.p - c * y % self.p) % self.p;
            }
        }
        remainder.truncate(shift);
        (trim_mod(quotient), trim_mod(remainder))
    }

    fn rem(&self, a: &[u64], b: &[u64]) -> ModPoly {
        self.div_rem(a, b).1
    }

    fn monic(&self, a: &[u64]) -> ModPoly {
        match a.last() {
            Some(&lead) => self.scale(a, self.inverse(lead)),
            None => Vec::new(),
        }
    }

    /// Monic gcd
    fn gcd(&self, a: &[u64], b: &[u64]) -> ModPoly {
        let (mut a, mut b) = (a.to_vec(), b.to_vec());
        while !b.is_empty() {
            let r = self.rem(&a, &b);
            a = std::mem::replace(&mut b, r);
        }
        self.monic(&a)
    }

    fn derivative(&self, a: &[u64]) -> ModPoly {
        trim_mod(
            a.iter()
                .enumerate()
                .skip(1)
                .map(|(i, &c)| (i as u64 % self.p) * c % self.p)
                .collect(),
        )
    }

    fn mul_mod(&self, a: &[u64], b: &[u64], m: &[u64]) -> ModPoly {
        self.rem(&self.mul(a, b), m)
    }

    /// `base^exponent mod m`
    fn pow_mod(&self, base: &[u64], exponent: &BigUint, m: &[u64]) -> ModPoly {
        let base = self.rem(base, m);
        let mut result = self.rem(&[1], m);
        for i in (0..exponent.bits()).rev() {
            result = self.mul_mod(&result, &result, m);
            if exponent.bit(i) {
                result = self.mul_mod(&result, &base, m);
            }
        }
        result
    }

    /// `(s, t)` with `s*a + t*b = 1` for coprime `a` and `b`
    fn bezout(&self, a: &[u64], b: &[u64]) -> (ModPoly, ModPoly) {
        let (mut r0, mut r1) = (a.to_vec(), b.to_vec());
        let (mut s0, mut s1): (ModPoly, ModPoly) = (vec![1], Vec::new());
        let (mut t0, mut t1): (ModPoly, ModPoly) = (Vec::new(), vec![1]);

        while !r1.is_empty() {
            let (q, r) = self.div_rem(&r0, &r1);
            r0 = std::mem::replace(&mut r1, r);
            let s = self.sub(&s0, &self.mul(&q, &s1));
            s0 = std::mem::replace(&mut s1, s);
            let t = self.sub(&t0, &self.mul(&q, &t1));
            t0 = std::mem::replace(&mut t1, t);
        }

        let inverse = self.inverse(r0.first().copied().unwrap_or(1));
        (self.scale(&s0, inverse), self.scale(&t0, inverse))
    }

    /// Distinct-degree factorization of a monic squarefree polynomial.
    /// Each part is the product of all irreducible factors of one degree.
    fn distinct_degree(&self, f: &[u64]) -> Vec<(ModPoly, usize)> {
        let x: ModPoly = vec![0, 1];
        let p = BigUint::from(self.p);
        let mut parts = Vec::new();
        let mut rest = f.to_vec();
        let mut h = x.clone();
        let mut degree = 0;

        while rest.len() > 2 * (degree + 1) {
            degree += 1;
            h = self.pow_mod(&h, &p, &rest);
            let g = self.gcd(&self.sub(&h, &x), &rest);
            if g.len() > 1 {
                rest = self.div_rem(&rest, &g).0;
                h = self.rem(&h, &rest);
                parts.push((g, degree));
            }
        }
        if rest.len() > 1 {
            let degree = rest.len() - 1;
            parts.push((rest, degree));
        }
        parts
    }

    /// Split a product of irreducibles of equal `degree` (Cantor-Zassenhaus)
    fn equal_degree(&self, f: &[u64], degree: usize, rng: &mut XorShift) -> Vec<ModPoly> {
        let n = f.len() - 1;
        if n <= degree {
            return vec![f.to_vec()];
        }

        let mut order = BigUint::one();
        for _ in 0..degree {
            order *= self.p;
        }
        let exponent = (order - 1u32) / 2u32;

        for _ in 0..SPLIT_ATTEMPTS {
            let a = trim_mod((0..n).map(|_| rng.next() % self.p).collect());
            if a.len() < 2 {
                continue;
            }
            let g = self.gcd(&self.sub(&self.pow_mod(&a, &exponent, f), &[1]), f);
            if g.len() > 1 && g.len() < f.len() {
                let other = self.div_rem(f, &g).0;
                let mut parts = self.equal_degree(&g, degree, rng);
                parts.extend(self.equal_degree(&other, degree, rng));
                return parts;
            }
        }
        tracing::warn!(p = self.p, degree, "equal-degree split gave up");
        vec![f.to_vec()]
    }
}

/// Deterministic source for Cantor-Zassenhaus
struct XorShift(u64);

impl XorShift {
    fn new() -> Self {
        Self(0x2545_f491_4f6c_dd1d)
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut i = 2;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 1;
    }
    true
}

/// A prime where `f` stays squarefree with its degree, and the monic
/// irreducible factors of `f` modulo it
fn choose_prime(f: &[BigInt]) -> Option<(Zp, Vec<ModPoly>)> {
    let lead = f.last()?;
    let mut best: Option<(Zp, Vec<(ModPoly, usize)>, usize)> = None;
    let mut good = 0;

    for p in (3..PRIME_LIMIT).step_by(2).filter(|&n| is_prime(n)) {
        let field = Zp { p };
        if lead.mod_floor(&BigInt::from(p)).is_zero() {
            continue;
        }
        let reduced = field.reduce(f);
        if field.gcd(&reduced, &field.derivative(&reduced)).len() > 1 {
            continue;
        }

        let parts = field.distinct_degree(&field.monic(&reduced));
        let count: usize = parts.iter().map(|(g, d)| (g.len() - 1) / d).sum();
        let better = match &best {
            Some((_, _, fewest)) => count < *fewest,
            None => true,
        };
        if better {
            best = Some((field, parts, count));
        }

        good += 1;
        if good == PRIME_TRIALS || count == 1 {
            break;
        }
    }

    let (field, parts, count) = best?;
    tracing::trace!(p = field.p, count, "chose prime");
    let mut rng = XorShift::new();
    let factors = parts
        .into_iter()
        .flat_map(|(g, d)| field.equal_degree(&g, d, &mut rng))
        .collect();
    Some((field, factors))
}

fn int_add(a: &[BigInt], b: &[BigInt]) -> Vec<BigInt> {
    let n = a.len().max(b.len());
    let zero = BigInt::zero();
    trim_int(
        (0..n)
            .map(|i| a.get(i).unwrap_or(&zero) + b.get(i).unwrap_or(&zero))
            .collect(),
    )
}

fn int_sub(a: &[BigInt], b: &[BigInt]) -> Vec<BigInt> {
    let n = a.len().max(b.len());
    let zero = BigInt::zero();
    trim_int(
        (0..n)
            .map(|i| a.get(i).unwrap_or(&zero) - b.get(i).unwrap_or(&zero))
            .collect(),
    )
}

fn int_mul(a: &[BigInt], b: &[BigInt]) -> Vec<BigInt> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![BigInt::zero(); a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        if x.is_zero() {
            continue;
        }
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    trim_int(out)
}

fn int_scale(a: &[BigInt], c: &BigInt) -> Vec<BigInt> {
    trim_int(a.iter().map(|x| x * c).collect())
}

fn widen(a: &[u64]) -> Vec<BigInt> {
    a.iter().map(|&c| BigInt::from(c)).collect()
}

/// Exact division over the integers
fn int_div_exact(a: &[BigInt], b: &[BigInt]) -> Option<Vec<BigInt>> {
    let lead = b.last()?;
    if a.len() < b.len() {
        return None;
    }
    if let (Some(a0), Some(b0)) = (a.first(), b.first()) {
        if !b0.is_zero() && !a0.is_multiple_of(b0) {
            return None;
        }
    }

    let shift = b.len() - 1;
    let mut remainder = a.to_vec();
    let mut quotient = vec![BigInt::zero(); a.len() - shift];
    for i in (0..quotient.len()).rev() {
        let (q, r) = remainder[i + shift].div_rem(lead);
        if !r.is_zero() {
            return None;
        }
        if !q.is_zero() {
            for (j, c) in b.iter().enumerate() {
                remainder[i + j] -= &q * c;
            }
        }
        quotient[i] = q;
    }

    if remainder.iter().all(Zero::is_zero) {
        Some(trim_int(quotient))
    } else {
        None
    }
}

/// Divide out the content and make the leading coefficient positive
fn primitive(a: &[BigInt]) -> Vec<BigInt> {
    let content = a.iter().fold(BigInt::zero(), |acc, c| acc.gcd(c));
    if content.is_zero() {
        return a.to_vec();
    }
    let content = if a.last().is_some_and(Signed::is_negative) {
        -content
    } else {
        content
    };
    a.iter().map(|c| c / &content).collect()
}

/// Bound on `|lc(f)| * |coefficient|` over all factors of `f`, doubled
/// for the symmetric residue range (Mignotte)
fn lifting_bound(f: &[BigInt]) -> BigInt {
    let norm = Roots::sqrt(&f.iter().map(|c| c * c).sum::<BigInt>()) + BigInt::one();
    let lead = f.last().map(Signed::abs).unwrap_or_else(BigInt::one);
    let degree = f.len().saturating_sub(1);
    BigInt::from(2) * lead * (BigInt::one() << degree) * norm
}

fn mod_inverse(a: &BigInt, modulus: &BigInt) -> BigInt {
    a.mod_floor(modulus)
        .extended_gcd(modulus)
        .x
        .mod_floor(modulus)
}

/// Lift `f = g*h (mod p)` with monic `g` to `f = G*H (mod p^k)`
fn hensel_lift(
    field: Zp,
    f: &[BigInt],
    g: &[u64],
    h: &[u64],
    k: u32,
) -> (Vec<BigInt>, Vec<BigInt>) {
    let p = BigInt::from(field.p);
    let (s, t) = field.bezout(g, h);
    let mut lifted_g = widen(g);
    let mut lifted_h = widen(h);
    let mut modulus = p.clone();

    for _ in 1..k {
        let error: Vec<BigInt> = int_sub(f, &int_mul(&lifted_g, &lifted_h))
            .iter()
            .map(|c| c / &modulus)
            .collect();
        let e = field.reduce(&error);
        if !e.is_empty() {
            // a*h + b*g = e (mod p) with deg a < deg g
            let (q, a) = field.div_rem(&field.mul(&t, &e), g);
            let b = field.add(&field.mul(&s, &e), &field.mul(&q, h));
            lifted_g = int_add(&lifted_g, &int_scale(&widen(&a), &modulus));
            lifted_h = int_add(&lifted_h, &int_scale(&widen(&b), &modulus));
        }
        modulus *= &p;
    }
    (lifted_g, lifted_h)
}

/// Lift every modular factor to monic factors modulo `p^k`
fn lift_all(
    field: Zp,
    f: &[BigInt],
    factors: &[ModPoly],
    k: u32,
    modulus: &BigInt,
) -> Vec<Vec<BigInt>> {
    let mut lifted = Vec::with_capacity(factors.len());
    let mut current: Vec<BigInt> = f.iter().map(|c| c.mod_floor(modulus)).collect();

    if let Some((_, leading)) = factors.split_last() {
        for g in leading {
            let h = field.div_rem(&field.reduce(&current), g).0;
            let (lifted_g, lifted_h) = hensel_lift(field, &current, g, &h, k);
            lifted.push(lifted_g);
            current = trim_int(lifted_h.iter().map(|c| c.mod_floor(modulus)).collect());
        }
    }

    let inverse = current
        .last()
        .map(|lead| mod_inverse(lead, modulus))
        .unwrap_or_else(BigInt::one);
    lifted.push(current.iter().map(|c| (c * &inverse).mod_floor(modulus)).collect());
    lifted
}

/// Advance `subset` to the next `k`-combination of `0..n`
pub(super) fn next_combination(subset: &mut [usize], n: usize) -> bool {
    let k = subset.len();
    for i in (0..k).rev() {
        if subset[i] < n - k + i {
            subset[i] += 1;
            for j in i + 1..k {
                subset[j] = subset[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

fn symmetric(a: &[BigInt], modulus: &BigInt, half: &BigInt) -> Vec<BigInt> {
    trim_int(
        a.iter()
            .map(|c| {
                let c = c.mod_floor(modulus);
                if &c > half {
                    c - modulus
                } else {
                    c
                }
            })
            .collect(),
    )
}

/// A factor of `f` built from `size` lifted factors, its cofactor and the
/// indices used
fn find_factor(
    f: &[BigInt],
    lifted: &[Vec<BigInt>],
    size: usize,
    modulus: &BigInt,
) -> Option<(Vec<BigInt>, Vec<BigInt>, Vec<usize>)> {
    let lead = f.last()?.clone();
    let half = modulus / 2;
    let mut subset: Vec<usize> = (0..size).collect();

    loop {
        let product = subset.iter().fold(vec![lead.clone()], |acc, &i| {
            symmetric(&int_mul(&acc, &lifted[i]), modulus, &half)
        });
        let candidate = primitive(&product);
        if candidate.len() > 1 {
            if let Some(cofactor) = int_div_exact(f, &candidate) {
                return Some((candidate, cofactor, subset));
            }
        }
        if !next_combination(&mut subset, lifted.len()) {
            return None;
        }
    }
}

fn recombine(f: Vec<BigInt>, mut lifted: Vec<Vec<BigInt>>, modulus: &BigInt) -> Vec<Vec<BigInt>> {
    let mut f = f;
    let mut found = Vec::new();
    let mut size = 1;

    while 2 * size <= lifted.len() {
        match find_factor(&f, &lifted, size, modulus) {
            Some((factor, cofactor, subset)) => {
                found.push(factor);
                f = cofactor;
                for &i in subset.iter().rev() {
                    lifted.remove(i);
                }
            }
            None => size += 1,
        }
    }
    found.push(f);
    found
}

/// Irreducible factors over the integers of a primitive squarefree
/// polynomial, each primitive with a positive leading coefficient
pub(super) fn factor_squarefree(f: &[BigInt]) -> Vec<Vec<BigInt>> {
    let f = primitive(&trim_int(f.to_vec()));
    if f.len() <= 2 {
        return vec![f];
    }

    let Some((field, modular)) = choose_prime(&f) else {
        tracing::warn!(degree = f.len() - 1, "no usable prime, keeping factor whole");
        return vec![f];
    };
    if modular.len() <= 1 {
        return vec![f];
    }

    let bound = lifting_bound(&f);
    let p = BigInt::from(field.p);
    let mut modulus = p.clone();
    let mut k = 1;
    while modulus <= bound {
        modulus *= &p;
        k += 1;
    }

    let lifted = lift_all(field, &f, &modular, k, &modulus);
    recombine(f, lifted, &modulus)
}
