//! Polynomial gcd and factorization
//!
//! Factorization over the rationals proceeds in stages:
//! - monomial factors (variables dividing every term)
//! - contents with respect to each variable, recursively
//! - squarefree parts (Yun's algorithm)
//! - irreducible factors of each squarefree part, via Kronecker
//!   substitution and univariate Zassenhaus factorization
//!
//! Factors are canonical and irreducible, except for parts whose Kronecker
//! image is too large to factor. Those stay whole.

use super::poly::{Monomial, Poly};
use super::univariate;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;
use std::fmt;

/// Greatest common divisor, normalized. `gcd(0, 0) = 0`.
pub fn gcd(a: &Poly, b: &Poly) -> Poly {
    if a.is_zero() {
        return b.normalized();
    }
    if b.is_zero() {
        return a.normalized();
    }
    if a.is_constant() || b.is_constant() {
        return Poly::one();
    }

    let vars = a.free_variables();
    let var = match vars.union(&b.free_variables()).next() {
        Some(var) => var.clone(),
        None => return Poly::one(),
    };

    match (a.degree_in(&var), b.degree_in(&var)) {
        (0, _) => gcd(a, &content_in(b, &var)),
        (_, 0) => gcd(&content_in(a, &var), b),
        _ => {
            let (content_a, primitive_a) = content_and_primitive(a, &var);
            let (content_b, primitive_b) = content_and_primitive(b, &var);
            let content = gcd(&content_a, &content_b);
            let primitive = primitive_prs(primitive_a, primitive_b, &var);
            (&content * &primitive).normalized()
        }
    }
}

/// Gcd of the coefficients of `p` viewed as a polynomial in `var`
pub fn content_in(p: &Poly, var: &str) -> Poly {
    p.coefficients_in(var)
        .iter()
        .filter(|c| !c.is_zero())
        .fold(Poly::zero(), |acc, c| {
            if acc.is_one() {
                acc
            } else {
                gcd(&acc, c)
            }
        })
}

/// Split `p` into its content and primitive part with respect to `var`
pub fn content_and_primitive(p: &Poly, var: &str) -> (Poly, Poly) {
    let content = content_in(p, var);
    if content.is_zero() || content.is_one() {
        return (Poly::one(), p.clone());
    }
    let primitive = p.div_exact(&content).unwrap_or_else(|| p.clone());
    (content, primitive)
}

fn primitive_part(p: &Poly, var: &str) -> Poly {
    content_and_primitive(p, var).1
}

/// Gcd of two primitive polynomials in `var` via a primitive pseudo-remainder
/// sequence
fn primitive_prs(a: Poly, b: Poly, var: &str) -> Poly {
    let (mut f, mut g) = if a.degree_in(var) >= b.degree_in(var) {
        (a, b)
    } else {
        (b, a)
    };

    loop {
        let remainder = pseudo_remainder(&f, &g, var);
        if remainder.is_zero() {
            return primitive_part(&g, var).normalized();
        }
        if remainder.degree_in(var) == 0 {
            return Poly::one();
        }
        f = g;
        g = primitive_part(&remainder, var);
    }
}

/// `lc(g)^k * f mod g` in `var`, for a suitable `k`
fn pseudo_remainder(f: &Poly, g: &Poly, var: &str) -> Poly {
    let degree_g = g.degree_in(var);
    let lead_g = g.leading_coefficient_in(var);

    let mut remainder = f.clone();
    while !remainder.is_zero() && remainder.degree_in(var) >= degree_g {
        let degree_r = remainder.degree_in(var);
        let lead_r = remainder.leading_coefficient_in(var);
        let shift = Poly::monomial(Monomial::power(var, degree_r - degree_g), BigRational::one());
        remainder = &(&lead_g * &remainder) - &(&(&lead_r * &shift) * g);
    }
    remainder
}

/// Squarefree decomposition of a polynomial primitive in `var` (Yun).
/// Returns `(part, multiplicity)` pairs with pairwise coprime parts.
fn squarefree_decomposition(p: &Poly, var: &str) -> Vec<(Poly, u32)> {
    let derivative = p.derivative(var);
    let a0 = gcd(p, &derivative);

    let (mut b, mut c) = match (p.div_exact(&a0), derivative.div_exact(&a0)) {
        (Some(b), Some(c)) => (b, c),
        _ => return vec![(p.clone(), 1)],
    };
    let mut d = &c - &b.derivative(var);

    let mut parts = Vec::new();
    let max_rounds = p.degree_in(var) + 1;
    let mut multiplicity = 1;
    while b.degree_in(var) > 0 {
        if multiplicity > max_rounds {
            parts.push((b, multiplicity));
            break;
        }

        let a = gcd(&b, &d);
        if a.degree_in(var) > 0 {
            parts.push((a.clone(), multiplicity));
        }

        match (b.div_exact(&a), d.div_exact(&a)) {
            (Some(next_b), Some(next_c)) => {
                b = next_b;
                c = next_c;
            }
            _ => {
                parts.push((b, multiplicity));
                break;
            }
        }
        d = &c - &b.derivative(var);
        multiplicity += 1;
    }
    parts
}

/// Kronecker images above this degree are not factored
const KRONECKER_DEGREE_LIMIT: u64 = 1024;

/// Variable of the univariate Kronecker image
const IMAGE_VAR: &str = "t";

/// The substitution `x_i := t^(w_i)` with `w_0 = 1` and
/// `w_(i+1) = w_i * (deg_i + 1)`. It maps a polynomial and all its divisors
/// to univariate polynomials without merging terms, and it is a ring
/// homomorphism, so the image of a factor divides the image of the whole.
struct Kronecker {
    vars: Vec<(String, u64, u64)>,
    span: u64,
}

impl Kronecker {
    fn new(p: &Poly) -> Option<Self> {
        let mut vars = Vec::new();
        let mut weight = 1u64;
        for var in p.free_variables() {
            let radix = u64::from(p.degree_in(&var)) + 1;
            vars.push((var, weight, radix));
            weight = weight.checked_mul(radix)?;
            if weight > KRONECKER_DEGREE_LIMIT + 1 {
                return None;
            }
        }
        Some(Self { vars, span: weight })
    }

    fn image(&self, p: &Poly) -> Poly {
        let mut image = Poly::zero();
        for (monomial, coefficient) in p.terms() {
            let exponent: u64 = self
                .vars
                .iter()
                .map(|(var, weight, _)| u64::from(monomial.exponent(var)) * weight)
                .sum();
            image.add_term(
                Monomial::power(IMAGE_VAR, exponent as u32),
                coefficient.clone(),
            );
        }
        image
    }

    /// Inverse of `image`, `None` when some exponent is out of range
    fn preimage(&self, image: &Poly) -> Option<Poly> {
        let mut result = Poly::zero();
        for (monomial, coefficient) in image.terms() {
            let exponent = u64::from(monomial.exponent(IMAGE_VAR));
            if exponent >= self.span {
                return None;
            }
            let monomial = self
                .vars
                .iter()
                .fold(Monomial::one(), |acc, (var, weight, radix)| {
                    acc.mul(&Monomial::power(var, ((exponent / weight) % radix) as u32))
                });
            result.add_term(monomial, coefficient.clone());
        }
        Some(result)
    }
}

fn integer_coefficients(p: &Poly) -> Vec<BigInt> {
    p.normalized()
        .coefficients_in(IMAGE_VAR)
        .iter()
        .map(|c| {
            c.constant_value()
                .map(|value| value.to_integer())
                .unwrap_or_default()
        })
        .collect()
}

fn from_coefficients(coefficients: &[BigInt]) -> Poly {
    let mut p = Poly::zero();
    for (exponent, c) in coefficients.iter().enumerate() {
        p.add_term(
            Monomial::power(IMAGE_VAR, exponent as u32),
            BigRational::from_integer(c.clone()),
        );
    }
    p
}

/// Irreducible factors of a univariate image, repeated by multiplicity
fn image_factors(image: &Poly) -> Vec<Poly> {
    let monomial = image.monomial_content();
    let mut pieces: Vec<Poly> = (0..monomial.exponent(IMAGE_VAR))
        .map(|_| Poly::var(IMAGE_VAR))
        .collect();

    let rest = image.div_monomial(&monomial).unwrap_or_else(|| image.clone());
    for (part, multiplicity) in squarefree_decomposition(&rest, IMAGE_VAR) {
        for factor in univariate::factor_squarefree(&integer_coefficients(&part)) {
            let factor = from_coefficients(&factor);
            pieces.extend((0..multiplicity).map(|_| factor.clone()));
        }
    }
    pieces
}

/// Degree one overall, or degree one in a variable it is primitive in
fn is_evidently_irreducible(p: &Poly) -> bool {
    p.total_degree() <= 1
        || p
            .free_variables()
            .iter()
            .any(|var| p.degree_in(var) == 1 && content_in(p, var).is_constant())
}

/// A divisor of `p` whose image is the product of `size` pieces, with its
/// cofactor and the pieces used
fn find_divisor(
    p: &Poly,
    pieces: &[Poly],
    size: usize,
    kronecker: &Kronecker,
) -> Option<(Poly, Poly, Vec<usize>)> {
    let mut subset: Vec<usize> = (0..size).collect();
    loop {
        let product = subset.iter().fold(Poly::one(), |acc, &i| &acc * &pieces[i]);
        if let Some(candidate) = kronecker.preimage(&product) {
            if !candidate.is_constant() {
                if let Some(cofactor) = p.div_exact(&candidate) {
                    return Some((candidate, cofactor, subset));
                }
            }
        }
        if !univariate::next_combination(&mut subset, pieces.len()) {
            return None;
        }
    }
}

/// Irreducible factors over the rationals of a squarefree polynomial
fn irreducible_factors(p: &Poly) -> Vec<Poly> {
    if is_evidently_irreducible(p) {
        return vec![p.normalized()];
    }
    let Some(kronecker) = Kronecker::new(p) else {
        tracing::warn!(%p, "polynomial too large to factor, keeping it whole");
        return vec![p.normalized()];
    };

    let mut pieces = image_factors(&kronecker.image(p));
    if kronecker.vars.len() == 1 {
        return pieces
            .iter()
            .filter_map(|piece| kronecker.preimage(piece))
            .map(|factor| factor.normalized())
            .collect();
    }

    // Smallest subsets first, so every divisor found is irreducible
    let mut rest = p.clone();
    let mut found = Vec::new();
    let mut size = 1;
    while 2 * size <= pieces.len() {
        match find_divisor(&rest, &pieces, size, &kronecker) {
            Some((factor, cofactor, subset)) => {
                found.push(factor.normalized());
                rest = cofactor;
                for &i in subset.iter().rev() {
                    pieces.remove(i);
                }
            }
            None => size += 1,
        }
    }
    if !rest.is_constant() {
        found.push(rest.normalized());
    }
    found
}

/// A polynomial as `constant * product(factor^multiplicity)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factorization {
    pub constant: BigRational,
    pub factors: Vec<(Poly, u32)>,
}

impl Factorization {
    /// Multiply the factorization back out
    pub fn expand(&self) -> Poly {
        self.factors
            .iter()
            .fold(Poly::constant(self.constant.clone()), |acc, (f, k)| {
                &acc * &f.pow(*k)
            })
    }
}

/// Factor `p` into canonical, pairwise coprime, non-constant factors
pub fn factor_list(p: &Poly) -> Factorization {
    if let Some(constant) = p.constant_value() {
        return Factorization {
            constant,
            factors: Vec::new(),
        };
    }

    let mut factors: Vec<(Poly, u32)> = Vec::new();

    let monomial = p.monomial_content();
    for (var, exponent) in monomial.variables() {
        factors.push((Poly::var(var), exponent));
    }
    let rest = p.div_monomial(&monomial).unwrap_or_else(|| p.clone());
    collect_factors(&rest, 1, &mut factors);

    factors.sort_by(|a, b| {
        a.0.total_degree()
            .cmp(&b.0.total_degree())
            .then_with(|| a.0.len().cmp(&b.0.len()))
            .then_with(|| a.0.cmp(&b.0))
    });
    let mut merged: Vec<(Poly, u32)> = Vec::with_capacity(factors.len());
    for (factor, multiplicity) in factors {
        match merged.last_mut() {
            Some((last, k)) if *last == factor => *k += multiplicity,
            _ => merged.push((factor, multiplicity)),
        }
    }

    let product = merged
        .iter()
        .fold(Poly::one(), |acc, (f, k)| &acc * &f.pow(*k));
    let constant = p.leading_coefficient() / product.leading_coefficient();

    Factorization {
        constant,
        factors: merged,
    }
}

fn collect_factors(p: &Poly, multiplicity: u32, out: &mut Vec<(Poly, u32)>) {
    if p.is_constant() {
        return;
    }
    let var = match p.free_variables().into_iter().next() {
        Some(var) => var,
        None => return,
    };

    let (content, primitive) = content_and_primitive(p, &var);
    collect_factors(&content, multiplicity, out);

    for (part, k) in squarefree_decomposition(&primitive, &var) {
        for factor in irreducible_factors(&part) {
            if !factor.is_constant() {
                out.push((factor, multiplicity * k));
            }
        }
    }
}

/// The distinct factors of `p`. A constant is its own only factor.
pub fn factors(p: &Poly) -> Vec<Poly> {
    if p.is_constant() {
        return vec![p.clone()];
    }
    factor_list(p).factors.into_iter().map(|(f, _)| f).collect()
}

/// Product of the distinct factors of `p`, or `p` itself when constant
pub fn radical(p: &Poly) -> Poly {
    if p.is_constant() {
        return p.clone();
    }
    factors(p).iter().fold(Poly::one(), |acc, f| &acc * f)
}

impl fmt::Display for Factorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.factors.is_empty() {
            return write!(f, "{}", self.constant);
        }
        if let [(factor, 1)] = self.factors.as_slice() {
            if self.constant.is_one() {
                return write!(f, "{}", factor);
            }
        }

        let mut parts = Vec::with_capacity(self.factors.len() + 1);
        let minus_one = -BigRational::one();
        if self.constant == minus_one {
            write!(f, "-")?;
        } else if !self.constant.is_one() {
            parts.push(self.constant.to_string());
        }

        for (factor, multiplicity) in &self.factors {
            let base = if factor.len() > 1 {
                format!("({})", factor)
            } else {
                factor.to_string()
            };
            if *multiplicity > 1 {
                parts.push(format!("{}**{}", base, multiplicity));
            } else {
                parts.push(base);
            }
        }
        write!(f, "{}", parts.join("*"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Poly {
        Poly::var("x")
    }

    fn y() -> Poly {
        Poly::var("y")
    }

    fn int(n: i64) -> Poly {
        Poly::from_integer(n)
    }

    #[test]
    fn test_gcd_univariate() {
        // (x + 1)(x - 1) and (x + 1)^2
        let a = &(&x() + &int(1)) * &(&x() - &int(1));
        let b = &(&x() + &int(1)) * &(&x() + &int(1));
        assert_eq!(gcd(&a, &b), &x() + &int(1));
    }

    #[test]
    fn test_gcd_multivariate() {
        let common = &x() + &y();
        let a = &common * &(&x() - &int(2));
        let b = &common * &(&y() + &int(3));
        assert_eq!(gcd(&a, &b), common);
    }

    #[test]
    fn test_gcd_coprime_and_constants() {
        assert!(gcd(&x(), &y()).is_one());
        assert!(gcd(&int(4), &x()).is_one());
        assert_eq!(gcd(&Poly::zero(), &(&int(2) * &x())), x());
    }

    #[test]
    fn test_content_in() {
        // x*y + y = y*(x + 1)
        let p = &(&x() * &y()) + &y();
        assert_eq!(content_in(&p, "x"), y());
        let (content, primitive) = content_and_primitive(&p, "x");
        assert_eq!(content, y());
        assert_eq!(primitive, &x() + &int(1));
    }

    #[test]
    fn test_factor_list_monomials() {
        // 2*x^2*y
        let p = &(&int(2) * &(&x() * &x())) * &y();
        let factorization = factor_list(&p);
        assert_eq!(factorization.constant, BigRational::from_integer(2.into()));
        assert_eq!(factorization.factors, vec![(x(), 2), (y(), 1)]);
        assert_eq!(factorization.to_string(), "2*x**2*y");
    }

    #[test]
    fn test_factor_list_difference_of_squares() {
        let p = &(&x() * &x()) - &int(1);
        let factorization = factor_list(&p);
        assert_eq!(factorization.factors.len(), 2);
        assert_eq!(factorization.expand(), p);
        let distinct = factors(&p);
        assert!(distinct.contains(&(&x() - &int(1))));
        assert!(distinct.contains(&(&x() + &int(1))));
    }

    #[test]
    fn test_factor_list_repeated_factor() {
        // x * (x + y)^2
        let s = &x() + &y();
        let p = &x() * &(&s * &s);
        let factorization = factor_list(&p);
        assert_eq!(factorization.factors, vec![(x(), 1), (s.clone(), 2)]);
        assert_eq!(factorization.expand(), p);
        assert_eq!(factorization.to_string(), "x*(x + y)**2");
        assert_eq!(radical(&p), &x() * &s);
    }

    #[test]
    fn test_factor_list_negative_constant() {
        let p = &int(1) - &x();
        let factorization = factor_list(&p);
        assert_eq!(factorization.to_string(), "-(x - 1)");
        assert_eq!(factors(&p), vec![&x() - &int(1)]);
    }

    #[test]
    fn test_factor_list_content_split() {
        // x*y + y = y*(x + 1)
        let p = &(&x() * &y()) + &y();
        let distinct = factors(&p);
        assert_eq!(distinct.len(), 2);
        assert!(distinct.contains(&y()));
        assert!(distinct.contains(&(&x() + &int(1))));
    }

    #[test]
    fn test_factors_of_constant() {
        assert_eq!(factors(&int(3)), vec![int(3)]);
        assert_eq!(radical(&int(3)), int(3));
        assert!(radical(&Poly::zero()).is_zero());
    }

    #[test]
    fn test_irreducible_stays_whole() {
        let p = &(&x() * &x()) + &int(1);
        assert_eq!(factors(&p), vec![p.clone()]);
    }

    #[test]
    fn test_factor_list_multivariate_quadratic() {
        // (x + y)(x + 2y + 1) has no content and is squarefree
        let a = &x() + &y();
        let b = &(&(&x() + &(&int(2) * &y())) + &int(1));
        let p = &a * b;
        let factorization = factor_list(&p);
        assert_eq!(factorization.factors, vec![(a.clone(), 1), (b.clone(), 1)]);
        assert_eq!(factorization.expand(), p);
        assert_eq!(factorization.to_string(), "(x + y)*(x + 2*y + 1)");
    }

    #[test]
    fn test_factor_list_difference_of_squares_in_two_variables() {
        let p = &(&x() * &x()) - &(&y() * &y());
        let distinct = factors(&p);
        assert_eq!(distinct.len(), 2);
        assert!(distinct.contains(&(&x() - &y())));
        assert!(distinct.contains(&(&x() + &y())));
        assert_eq!(factor_list(&p).expand(), p);
    }

    #[test]
    fn test_factor_list_repeated_multivariate_factor() {
        // (x - y)(x + y)^2
        let p = &(&x() - &y()) * &(&(&x() + &y()) * &(&x() + &y()));
        let factorization = factor_list(&p);
        assert_eq!(
            factorization.factors,
            vec![(&x() - &y(), 1), (&x() + &y(), 2)]
        );
        assert_eq!(radical(&p), &(&x() * &x()) - &(&y() * &y()));
    }

    #[test]
    fn test_multivariate_irreducible_stays_whole() {
        let p = &(&x() * &x()) + &(&y() * &y());
        assert_eq!(factors(&p), vec![p.clone()]);

        let q = &(&(&x() * &y()) + &int(1)) + &(&x() * &x());
        assert_eq!(factors(&q), vec![q.clone()]);
    }

    #[test]
    fn test_factor_list_univariate_cubic() {
        // x^3 - x^2 - x - 2 = (x - 2)(x^2 + x + 1)
        let p = &(&(&x().pow(3) - &x().pow(2)) - &x()) - &int(2);
        let distinct = factors(&p);
        assert_eq!(
            distinct,
            vec![&x() - &int(2), &(&x().pow(2) + &x()) + &int(1)]
        );
    }

    #[test]
    fn test_kronecker_round_trip() {
        let p = &(&(&x() * &y()) + &(&y() * &y())) - &int(3);
        let kronecker = Kronecker::new(&p).unwrap();
        let image = kronecker.image(&p);
        assert_eq!(image.free_variables().len(), 1);
        assert_eq!(kronecker.preimage(&image), Some(p));
        // t^100 is outside every exponent range
        assert_eq!(kronecker.preimage(&Poly::var(IMAGE_VAR).pow(100)), None);
    }
}
