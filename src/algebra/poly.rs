//! Multivariate polynomials with exact rational coefficients
//!
//! Polynomials are stored sparsely as a map from monomial to coefficient.
//! Zero coefficients are never stored, so the zero polynomial has no terms
//! and structural equality is polynomial equality.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// A product of variables raised to positive powers, sorted by variable name
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Monomial(Vec<(String, u32)>);

impl Monomial {
    /// The empty product
    pub fn one() -> Self {
        Self(Vec::new())
    }

    /// A single variable raised to `exponent`
    pub fn power(var: &str, exponent: u32) -> Self {
        if exponent == 0 {
            Self::one()
        } else {
            Self(vec![(var.to_string(), exponent)])
        }
    }

    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    /// Total degree
    pub fn degree(&self) -> u32 {
        self.0.iter().map(|(_, e)| e).sum()
    }

    /// Exponent of `var`, zero if absent
    pub fn exponent(&self, var: &str) -> u32 {
        self.0
            .iter()
            .find(|(v, _)| v == var)
            .map(|(_, e)| *e)
            .unwrap_or(0)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(v, e)| (v.as_str(), *e))
    }

    /// Product of two monomials
    pub fn mul(&self, other: &Monomial) -> Monomial {
        let mut exponents: BTreeMap<&str, u32> = BTreeMap::new();
        for (v, e) in self.variables().chain(other.variables()) {
            *exponents.entry(v).or_insert(0) += e;
        }
        Monomial(
            exponents
                .into_iter()
                .map(|(v, e)| (v.to_string(), e))
                .collect(),
        )
    }

    /// Quotient `self / other`, if `other` divides `self`
    pub fn div(&self, other: &Monomial) -> Option<Monomial> {
        let mut result = Vec::with_capacity(self.0.len());
        for (v, e) in other.variables() {
            if self.exponent(v) < e {
                return None;
            }
        }
        for (v, e) in self.variables() {
            let remaining = e - other.exponent(v);
            if remaining > 0 {
                result.push((v.to_string(), remaining));
            }
        }
        Some(Monomial(result))
    }

    /// Greatest common divisor of two monomials
    pub fn gcd(&self, other: &Monomial) -> Monomial {
        Monomial(
            self.variables()
                .filter_map(|(v, e)| {
                    let shared = e.min(other.exponent(v));
                    (shared > 0).then(|| (v.to_string(), shared))
                })
                .collect(),
        )
    }

    /// This monomial with `var` removed
    fn without(&self, var: &str) -> Monomial {
        Monomial(self.0.iter().filter(|(v, _)| v != var).cloned().collect())
    }

    /// Lexicographic monomial order: the alphabetically first variable on
    /// which the exponents differ decides.
    pub fn lex_cmp(&self, other: &Monomial) -> Ordering {
        let (mut i, mut j) = (0, 0);
        loop {
            match (self.0.get(i), other.0.get(j)) {
                (None, None) => return Ordering::Equal,
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (Some((va, ea)), Some((vb, eb))) => match va.cmp(vb) {
                    Ordering::Less => return Ordering::Greater,
                    Ordering::Greater => return Ordering::Less,
                    Ordering::Equal => match ea.cmp(eb) {
                        Ordering::Equal => {
                            i += 1;
                            j += 1;
                        }
                        unequal => return unequal,
                    },
                },
            }
        }
    }

    /// Graded order used for display: higher total degree first, then lex
    fn display_cmp(&self, other: &Monomial) -> Ordering {
        self.degree()
            .cmp(&other.degree())
            .then_with(|| self.lex_cmp(other))
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (v, e)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "*")?;
            }
            if *e == 1 {
                write!(f, "{}", v)?;
            } else {
                write!(f, "{}**{}", v, e)?;
            }
        }
        Ok(())
    }
}

/// A polynomial over the rationals
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Poly {
    terms: BTreeMap<Monomial, BigRational>,
}

impl Poly {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::constant(BigRational::one())
    }

    /// A constant polynomial
    pub fn constant(value: BigRational) -> Self {
        let mut poly = Self::zero();
        poly.add_term(Monomial::one(), value);
        poly
    }

    pub fn from_integer(value: i64) -> Self {
        Self::constant(BigRational::from_integer(BigInt::from(value)))
    }

    /// The polynomial consisting of a single variable
    pub fn var(name: &str) -> Self {
        Self::monomial(Monomial::power(name, 1), BigRational::one())
    }

    /// `coefficient * monomial`
    pub fn monomial(monomial: Monomial, coefficient: BigRational) -> Self {
        let mut poly = Self::zero();
        poly.add_term(monomial, coefficient);
        poly
    }

    /// Parse an unsigned decimal literal such as `12`, `1.25` or `3.` exactly
    pub fn parse_decimal(literal: &str) -> Option<Self> {
        let (whole, fraction) = match literal.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (literal, ""),
        };
        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if !fraction.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let digits = format!("{}{}", whole, fraction);
        let numer: BigInt = digits.parse().ok()?;
        let denom = BigInt::from(10u32).pow(fraction.len() as u32);
        Some(Self::constant(BigRational::new(numer, denom)))
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.constant_value().is_some_and(|c| c.is_one())
    }

    pub fn is_constant(&self) -> bool {
        self.terms.keys().all(Monomial::is_one)
    }

    /// The value of a constant polynomial
    pub fn constant_value(&self) -> Option<BigRational> {
        if !self.is_constant() {
            return None;
        }
        Some(
            self.terms
                .get(&Monomial::one())
                .cloned()
                .unwrap_or_else(BigRational::zero),
        )
    }

    /// The variable name, if this polynomial is exactly one variable
    pub fn as_variable(&self) -> Option<&str> {
        if self.terms.len() != 1 {
            return None;
        }
        let (monomial, coefficient) = self.terms.iter().next()?;
        let mut vars = monomial.variables();
        match (vars.next(), vars.next()) {
            (Some((v, 1)), None) if coefficient.is_one() => Some(v),
            _ => None,
        }
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &BigRational)> {
        self.terms.iter()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn free_variables(&self) -> BTreeSet<String> {
        self.terms
            .keys()
            .flat_map(|m| m.variables().map(|(v, _)| v.to_string()))
            .collect()
    }

    /// Add `coefficient * monomial` in place
    pub fn add_term(&mut self, monomial: Monomial, coefficient: BigRational) {
        if coefficient.is_zero() {
            return;
        }
        match self.terms.get_mut(&monomial) {
            Some(existing) => {
                *existing += coefficient;
                if existing.is_zero() {
                    self.terms.remove(&monomial);
                }
            }
            None => {
                self.terms.insert(monomial, coefficient);
            }
        }
    }

    /// Multiply every coefficient by `factor`
    pub fn scale(&self, factor: &BigRational) -> Poly {
        if factor.is_zero() {
            return Poly::zero();
        }
        Poly {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.clone(), c * factor))
                .collect(),
        }
    }

    /// Multiply by a single term
    pub fn mul_term(&self, monomial: &Monomial, coefficient: &BigRational) -> Poly {
        if coefficient.is_zero() {
            return Poly::zero();
        }
        Poly {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.mul(monomial), c * coefficient))
                .collect(),
        }
    }

    /// Integer power
    pub fn pow(&self, exponent: u32) -> Poly {
        (0..exponent).fold(Poly::one(), |acc, _| &acc * self)
    }

    /// The leading term under lexicographic order
    pub fn leading_term(&self) -> Option<(&Monomial, &BigRational)> {
        self.terms.iter().max_by(|a, b| a.0.lex_cmp(b.0))
    }

    /// Coefficient of the lex-leading term
    pub fn leading_coefficient(&self) -> BigRational {
        self.leading_term()
            .map(|(_, c)| c.clone())
            .unwrap_or_else(BigRational::zero)
    }

    pub fn total_degree(&self) -> u32 {
        self.terms.keys().map(Monomial::degree).max().unwrap_or(0)
    }

    pub fn degree_in(&self, var: &str) -> u32 {
        self.terms
            .keys()
            .map(|m| m.exponent(var))
            .max()
            .unwrap_or(0)
    }

    /// View as a univariate polynomial in `var`: index `i` holds the
    /// coefficient of `var^i`, itself a polynomial free of `var`.
    pub fn coefficients_in(&self, var: &str) -> Vec<Poly> {
        let mut coefficients = vec![Poly::zero(); self.degree_in(var) as usize + 1];
        for (m, c) in &self.terms {
            coefficients[m.exponent(var) as usize].add_term(m.without(var), c.clone());
        }
        coefficients
    }

    /// Coefficient of the highest power of `var`
    pub fn leading_coefficient_in(&self, var: &str) -> Poly {
        self.coefficients_in(var).pop().unwrap_or_default()
    }

    /// Substitute `var := 0`
    pub fn substitute_zero(&self, var: &str) -> Poly {
        Poly {
            terms: self
                .terms
                .iter()
                .filter(|(m, _)| m.exponent(var) == 0)
                .map(|(m, c)| (m.clone(), c.clone()))
                .collect(),
        }
    }

    /// Partial derivative with respect to `var`
    pub fn derivative(&self, var: &str) -> Poly {
        let mut result = Poly::zero();
        for (m, c) in &self.terms {
            let e = m.exponent(var);
            if e == 0 {
                continue;
            }
            let lowered = m.without(var).mul(&Monomial::power(var, e - 1));
            result.add_term(lowered, c * BigRational::from_integer(BigInt::from(e)));
        }
        result
    }

    /// Largest monomial dividing every term
    pub fn monomial_content(&self) -> Monomial {
        let mut terms = self.terms.keys();
        match terms.next() {
            Some(first) => terms.fold(first.clone(), |acc, m| acc.gcd(m)),
            None => Monomial::one(),
        }
    }

    /// Divide every term by a monomial known to divide it
    pub fn div_monomial(&self, monomial: &Monomial) -> Option<Poly> {
        let mut result = Poly::zero();
        for (m, c) in &self.terms {
            result.add_term(m.div(monomial)?, c.clone());
        }
        Some(result)
    }

    /// Exact multivariate division. `None` if `divisor` does not divide
    /// `self` or is zero.
    pub fn div_exact(&self, divisor: &Poly) -> Option<Poly> {
        let (lead_monomial, lead_coefficient) = divisor.leading_term()?;
        let (lead_monomial, lead_coefficient) = (lead_monomial.clone(), lead_coefficient.clone());

        let mut remainder = self.clone();
        let mut quotient = Poly::zero();
        while let Some((m, c)) = remainder
            .leading_term()
            .map(|(m, c)| (m.clone(), c.clone()))
        {
            let q_monomial = m.div(&lead_monomial)?;
            let q_coefficient = c / &lead_coefficient;
            remainder = &remainder - &divisor.mul_term(&q_monomial, &q_coefficient);
            quotient.add_term(q_monomial, q_coefficient);
        }
        Some(quotient)
    }

    /// Canonical associate: integer coefficients with gcd 1 and a positive
    /// lex-leading coefficient. Nonzero constants normalize to 1.
    pub fn normalized(&self) -> Poly {
        if self.is_zero() {
            return Poly::zero();
        }

        let denominators = self
            .terms
            .values()
            .fold(BigInt::one(), |acc, c| acc.lcm(c.denom()));
        let numerators = self.terms.values().fold(BigInt::zero(), |acc, c| {
            acc.gcd(&(c.numer() * &denominators / c.denom()))
        });

        let mut factor = BigRational::new(denominators, numerators);
        if self.leading_coefficient().is_negative() {
            factor = -factor;
        }
        self.scale(&factor)
    }
}

impl From<BigRational> for Poly {
    fn from(value: BigRational) -> Self {
        Poly::constant(value)
    }
}

impl Add<&Poly> for &Poly {
    type Output = Poly;

    fn add(self, rhs: &Poly) -> Poly {
        let mut result = self.clone();
        for (m, c) in &rhs.terms {
            result.add_term(m.clone(), c.clone());
        }
        result
    }
}

impl Sub<&Poly> for &Poly {
    type Output = Poly;

    fn sub(self, rhs: &Poly) -> Poly {
        let mut result = self.clone();
        for (m, c) in &rhs.terms {
            result.add_term(m.clone(), -c.clone());
        }
        result
    }
}

impl Mul<&Poly> for &Poly {
    type Output = Poly;

    fn mul(self, rhs: &Poly) -> Poly {
        let mut result = Poly::zero();
        for (ma, ca) in &self.terms {
            for (mb, cb) in &rhs.terms {
                result.add_term(ma.mul(mb), ca * cb);
            }
        }
        result
    }
}

impl Neg for &Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        self.scale(&-BigRational::one())
    }
}

impl Add for Poly {
    type Output = Poly;

    fn add(self, rhs: Poly) -> Poly {
        &self + &rhs
    }
}

impl Sub for Poly {
    type Output = Poly;

    fn sub(self, rhs: Poly) -> Poly {
        &self - &rhs
    }
}

impl Mul for Poly {
    type Output = Poly;

    fn mul(self, rhs: Poly) -> Poly {
        &self * &rhs
    }
}

impl Neg for Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        -&self
    }
}

impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }

        let mut terms: Vec<_> = self.terms.iter().collect();
        terms.sort_by(|a, b| b.0.display_cmp(a.0));

        for (i, (m, c)) in terms.into_iter().enumerate() {
            let magnitude = c.abs();
            match (i, c.is_negative()) {
                (0, true) => write!(f, "-")?,
                (0, false) => {}
                (_, true) => write!(f, " - ")?,
                (_, false) => write!(f, " + ")?,
            }

            if m.is_one() {
                write!(f, "{}", magnitude)?;
            } else if magnitude.is_one() {
                write!(f, "{}", m)?;
            } else {
                write!(f, "{}*{}", magnitude, m)?;
            }
        }
        Ok(())
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
    fn test_zero_has_no_terms() {
        let p = &x() - &x();
        assert!(p.is_zero());
        assert!(p.is_constant());
        assert_eq!(p.len(), 0);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Poly::parse_decimal("12"), Some(int(12)));
        assert_eq!(
            Poly::parse_decimal("1.25"),
            Some(Poly::constant(BigRational::new(
                BigInt::from(5),
                BigInt::from(4)
            )))
        );
        assert_eq!(Poly::parse_decimal("3."), Some(int(3)));
        assert_eq!(Poly::parse_decimal(".5"), None);
        assert_eq!(Poly::parse_decimal("1.2.3"), None);
    }

    #[test]
    fn test_display_orders_by_degree() {
        let p = &(&(&x() * &x()) + &(&int(2) * &(&x() * &y()))) - &int(3);
        assert_eq!(p.to_string(), "x**2 + 2*x*y - 3");
    }

    #[test]
    fn test_display_negative_leading() {
        let p = &int(1) - &x();
        assert_eq!(p.to_string(), "-x + 1");
    }

    #[test]
    fn test_expand_square() {
        let s = &x() + &y();
        let sq = &s * &s;
        assert_eq!(sq.to_string(), "x**2 + 2*x*y + y**2");
    }

    #[test]
    fn test_is_one_and_constant() {
        assert!(int(1).is_one());
        assert!(!int(2).is_one());
        assert!(int(2).is_constant());
        assert!(!x().is_constant());
        assert_eq!(int(7).constant_value(), Some(BigRational::from_integer(7.into())));
        assert_eq!(Poly::zero().constant_value(), Some(BigRational::zero()));
    }

    #[test]
    fn test_as_variable() {
        assert_eq!(x().as_variable(), Some("x"));
        assert_eq!((&int(2) * &x()).as_variable(), None);
        assert_eq!((&x() * &x()).as_variable(), None);
        assert_eq!((&x() + &int(1)).as_variable(), None);
    }

    #[test]
    fn test_substitute_zero() {
        let p = &(&x() * &y()) + &(&y() + &int(1));
        assert_eq!(p.substitute_zero("x"), &y() + &int(1));
        assert_eq!(p.substitute_zero("y"), int(1));
    }

    #[test]
    fn test_derivative() {
        let p = &(&(&x() * &x()) * &y()) + &x();
        assert_eq!(p.derivative("x"), &(&int(2) * &(&x() * &y())) + &int(1));
        assert_eq!(p.derivative("z"), Poly::zero());
    }

    #[test]
    fn test_coefficients_in() {
        let p = &(&(&x() * &x()) * &y()) + &(&x() + &y());
        let coefficients = p.coefficients_in("x");
        assert_eq!(coefficients, vec![y(), int(1), y()]);
        assert_eq!(p.leading_coefficient_in("x"), y());
    }

    #[test]
    fn test_div_exact() {
        let a = &x() + &y();
        let b = &x() - &y();
        let product = &a * &b;
        assert_eq!(product.div_exact(&a), Some(b.clone()));
        assert_eq!(product.div_exact(&b), Some(a));
        assert_eq!(product.div_exact(&x()), None);
        assert_eq!(product.div_exact(&Poly::zero()), None);
    }

    #[test]
    fn test_normalized() {
        let half = Poly::constant(BigRational::new(BigInt::from(1), BigInt::from(2)));
        let p = &(&half * &x()) - &int(1);
        assert_eq!(p.normalized(), &x() - &int(2));

        let q = &int(-4) * &(&x() + &int(2));
        assert_eq!(q.normalized(), &x() + &int(2));

        assert_eq!(int(-5).normalized(), int(1));
        assert!(Poly::zero().normalized().is_zero());
    }

    #[test]
    fn test_monomial_content() {
        let p = &(&(&x() * &x()) * &y()) + &(&x() * &(&y() * &y()));
        assert_eq!(p.monomial_content().to_string(), "x*y");
        assert_eq!(
            p.div_monomial(&p.monomial_content()),
            Some(&x() + &y())
        );
    }

    #[test]
    fn test_lex_order() {
        let xm = Monomial::power("x", 1);
        let y2 = Monomial::power("y", 2);
        assert_eq!(xm.lex_cmp(&y2), Ordering::Greater);
        assert_eq!(y2.lex_cmp(&xm), Ordering::Less);
        assert_eq!(xm.lex_cmp(&xm), Ordering::Equal);
        assert_eq!(xm.mul(&y2).lex_cmp(&xm), Ordering::Greater);
    }

    #[test]
    fn test_free_variables() {
        let p = &(&x() * &y()) + &Poly::var("z");
        let vars: Vec<_> = p.free_variables().into_iter().collect();
        assert_eq!(vars, vec!["x", "y", "z"]);
    }
}
