//! Standard meadow forms
//!
//! Every algebraic value is kept in one of three shapes:
//! - a polynomial
//! - a quotient `num / den` of polynomials with a non-constant denominator
//! - a conditional `(c/c) * then + (1 - c/c) * otherwise`, read as
//!   "`then` if `c != 0`, else `otherwise`"
//!
//! Division by zero yields zero, as in any meadow. The arithmetic below
//! keeps results in these shapes while folding the obvious constants.

mod eval;
mod factor;
mod poly;
mod univariate;

pub use eval::Assumptions;
pub use factor::{factor_list, factors, gcd, radical, Factorization};
pub use poly::{Monomial, Poly};

use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A value in standard meadow form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Algebraic {
    Poly(Poly),
    Frac(Frac),
    Cond(Box<Cond>),
}

/// `num / den`, `den` non-constant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frac {
    pub num: Poly,
    pub den: Poly,
}

/// `then` where `cond != 0`, `otherwise` where `cond = 0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cond {
    pub cond: Poly,
    pub then: Algebraic,
    pub otherwise: Algebraic,
}

/// Either side of the prover's input: an equation or a bare value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Equation(Equation),
    Algebraic(Algebraic),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    pub lhs: Algebraic,
    pub rhs: Algebraic,
}

impl Equation {
    pub fn new(lhs: Algebraic, rhs: Algebraic) -> Self {
        Self { lhs, rhs }
    }

    /// `lhs - rhs`, which is zero exactly when the equation holds
    pub fn difference(&self) -> Algebraic {
        sub(&self.lhs, &self.rhs)
    }

    pub fn free_variables(&self) -> BTreeSet<String> {
        let mut vars = self.lhs.free_variables();
        vars.extend(self.rhs.free_variables());
        vars
    }
}

impl Frac {
    /// Build `num / den`, folding constant denominators and zero numerators
    pub fn make(num: Poly, den: Poly) -> Algebraic {
        if num.is_zero() || den.is_zero() {
            return Algebraic::zero();
        }
        match den.constant_value() {
            Some(value) => Algebraic::Poly(num.scale(&value.recip())),
            None => Algebraic::Frac(Frac { num, den }),
        }
    }
}

impl Cond {
    /// Build a conditional, simplifying where the condition makes a branch
    /// redundant.
    pub fn make(cond: Poly, then: Algebraic, otherwise: Algebraic) -> Algebraic {
        let cond = radical(&cond);

        let then = match then {
            Algebraic::Cond(inner) if inner.cond == cond => inner.then,
            other => other,
        };

        let otherwise = match otherwise {
            Algebraic::Cond(inner) if inner.cond == cond => inner.otherwise,
            Algebraic::Frac(ref f) if f.num == cond || f.den == cond => Algebraic::zero(),
            Algebraic::Poly(ref p) if *p == cond => Algebraic::zero(),
            other => other,
        };

        if then == otherwise {
            then
        } else if cond.is_zero() {
            otherwise
        } else if cond.is_constant() {
            then
        } else {
            Algebraic::Cond(Box::new(Cond {
                cond,
                then,
                otherwise,
            }))
        }
    }
}

impl Algebraic {
    pub fn zero() -> Self {
        Algebraic::Poly(Poly::zero())
    }

    pub fn one() -> Self {
        Algebraic::Poly(Poly::one())
    }

    pub fn var(name: &str) -> Self {
        Algebraic::Poly(Poly::var(name))
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Algebraic::Poly(p) if p.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Algebraic::Poly(p) if p.is_one())
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Algebraic::Poly(p) if p.is_constant())
    }

    pub fn as_poly(&self) -> Option<&Poly> {
        match self {
            Algebraic::Poly(p) => Some(p),
            _ => None,
        }
    }

    pub fn free_variables(&self) -> BTreeSet<String> {
        match self {
            Algebraic::Poly(p) => p.free_variables(),
            Algebraic::Frac(f) => {
                let mut vars = f.num.free_variables();
                vars.extend(f.den.free_variables());
                vars
            }
            Algebraic::Cond(c) => {
                let mut vars = c.cond.free_variables();
                vars.extend(c.then.free_variables());
                vars.extend(c.otherwise.free_variables());
                vars
            }
        }
    }
}

impl From<Poly> for Algebraic {
    fn from(p: Poly) -> Self {
        Algebraic::Poly(p)
    }
}

fn poly(p: Poly) -> Algebraic {
    Algebraic::Poly(p)
}

pub fn neg(a: &Algebraic) -> Algebraic {
    match a {
        Algebraic::Poly(p) => poly(-p),
        Algebraic::Frac(f) => Frac::make(-&f.num, f.den.clone()),
        Algebraic::Cond(c) => Cond::make(c.cond.clone(), neg(&c.then), neg(&c.otherwise)),
    }
}

pub fn add(a: &Algebraic, b: &Algebraic) -> Algebraic {
    use Algebraic::{Cond as C, Frac as F, Poly as P};

    if a.is_zero() {
        return b.clone();
    }
    if b.is_zero() {
        return a.clone();
    }

    match (a, b) {
        (P(p), P(q)) => poly(p + q),
        // p + l/r: r != 0 gives (p*r + l)/r, r = 0 leaves p
        (P(p), F(f)) => Cond::make(
            f.den.clone(),
            Frac::make(&(p * &f.den) + &f.num, f.den.clone()),
            a.clone(),
        ),
        (P(_), C(c)) => Cond::make(c.cond.clone(), add(a, &c.then), add(a, &c.otherwise)),
        (F(_), P(_)) | (C(_), P(_)) | (C(_), F(_)) => add(b, a),
        (F(f), F(g)) => {
            if f.den == g.den {
                Frac::make(&f.num + &g.num, f.den.clone())
            } else {
                let num = &(&f.num * &g.den) + &(&f.den * &g.num);
                let den = &f.den * &g.den;
                Cond::make(
                    f.den.clone(),
                    Cond::make(g.den.clone(), Frac::make(num, den), a.clone()),
                    b.clone(),
                )
            }
        }
        (F(f), C(c)) => {
            if f.den == c.cond {
                Cond::make(c.cond.clone(), add(a, &c.then), c.otherwise.clone())
            } else {
                Cond::make(
                    c.cond.clone(),
                    Cond::make(f.den.clone(), add(a, &c.then), c.then.clone()),
                    Cond::make(f.den.clone(), add(a, &c.otherwise), c.otherwise.clone()),
                )
            }
        }
        (C(c), C(d)) => {
            if c.cond == d.cond {
                Cond::make(
                    c.cond.clone(),
                    add(&c.then, &d.then),
                    add(&c.otherwise, &d.otherwise),
                )
            } else {
                Cond::make(c.cond.clone(), add(&c.then, b), add(&c.otherwise, b))
            }
        }
    }
}

pub fn sub(a: &Algebraic, b: &Algebraic) -> Algebraic {
    if a.is_zero() {
        return neg(b);
    }
    if b.is_zero() {
        return a.clone();
    }
    add(a, &neg(b))
}

pub fn mul(a: &Algebraic, b: &Algebraic) -> Algebraic {
    use Algebraic::{Cond as C, Frac as F, Poly as P};

    if a.is_zero() || b.is_zero() {
        return Algebraic::zero();
    }
    if a.is_one() {
        return b.clone();
    }
    if b.is_one() {
        return a.clone();
    }

    match (a, b) {
        (P(p), P(q)) => poly(p * q),
        (P(p), F(f)) => Frac::make(p * &f.num, f.den.clone()),
        (P(_), C(c)) => Cond::make(c.cond.clone(), mul(a, &c.then), mul(a, &c.otherwise)),
        (F(_), P(_)) | (C(_), P(_)) | (C(_), F(_)) => mul(b, a),
        (F(f), F(g)) => Frac::make(&f.num * &g.num, &f.den * &g.den),
        (F(f), C(c)) => {
            // where c = 0 the fraction itself divides by zero
            let otherwise = if f.den == c.cond {
                Algebraic::zero()
            } else {
                mul(a, &c.otherwise)
            };
            Cond::make(c.cond.clone(), mul(a, &c.then), otherwise)
        }
        (C(c), C(d)) => {
            if c.cond == d.cond {
                Cond::make(
                    c.cond.clone(),
                    mul(&c.then, &d.then),
                    mul(&c.otherwise, &d.otherwise),
                )
            } else {
                Cond::make(c.cond.clone(), mul(&c.then, b), mul(&c.otherwise, b))
            }
        }
    }
}

pub fn div(a: &Algebraic, b: &Algebraic) -> Algebraic {
    use Algebraic::{Cond as C, Frac as F, Poly as P};

    if a.is_zero() || b.is_zero() {
        return Algebraic::zero();
    }
    if b.is_one() {
        return a.clone();
    }

    match (a, b) {
        (P(p), P(q)) => Frac::make(p.clone(), q.clone()),
        (P(p), F(f)) => Frac::make(p * &f.den, f.num.clone()),
        (P(_), C(c)) => Cond::make(c.cond.clone(), div(a, &c.then), div(a, &c.otherwise)),
        (F(f), P(q)) => Frac::make(f.num.clone(), &f.den * q),
        (F(f), F(g)) => Frac::make(&f.num * &g.den, &f.den * &g.num),
        (F(f), C(c)) => {
            let otherwise = if f.den == c.cond {
                Algebraic::zero()
            } else {
                div(a, &c.otherwise)
            };
            Cond::make(c.cond.clone(), div(a, &c.then), otherwise)
        }
        (C(c), P(_)) | (C(c), F(_)) => {
            Cond::make(c.cond.clone(), div(&c.then, b), div(&c.otherwise, b))
        }
        (C(c), C(d)) => {
            if c.cond == d.cond {
                Cond::make(
                    c.cond.clone(),
                    div(&c.then, &d.then),
                    div(&c.otherwise, &d.otherwise),
                )
            } else {
                Cond::make(c.cond.clone(), div(&c.then, b), div(&c.otherwise, b))
            }
        }
    }
}

impl Neg for &Algebraic {
    type Output = Algebraic;

    fn neg(self) -> Algebraic {
        neg(self)
    }
}

impl Add for &Algebraic {
    type Output = Algebraic;

    fn add(self, rhs: &Algebraic) -> Algebraic {
        add(self, rhs)
    }
}

impl Sub for &Algebraic {
    type Output = Algebraic;

    fn sub(self, rhs: &Algebraic) -> Algebraic {
        sub(self, rhs)
    }
}

impl Mul for &Algebraic {
    type Output = Algebraic;

    fn mul(self, rhs: &Algebraic) -> Algebraic {
        mul(self, rhs)
    }
}

impl Div for &Algebraic {
    type Output = Algebraic;

    fn div(self, rhs: &Algebraic) -> Algebraic {
        div(self, rhs)
    }
}

/// Polynomial as printed inside forms: bare constants, parenthesized
/// factorizations otherwise
struct PolyTerm<'a>(&'a Poly);

impl fmt::Display for PolyTerm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_constant() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "({})", factor_list(self.0))
        }
    }
}

impl fmt::Display for Algebraic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algebraic::Poly(p) => write!(f, "{}", PolyTerm(p)),
            Algebraic::Frac(frac) => {
                write!(f, "({} / {})", PolyTerm(&frac.num), PolyTerm(&frac.den))
            }
            Algebraic::Cond(c) => {
                let cond = PolyTerm(&c.cond);
                write!(
                    f,
                    "(({cond}/{cond}) * {} + (1 - {cond}/{cond}) * {})",
                    c.then, c.otherwise
                )
            }
        }
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Equation(e) => write!(f, "{}", e),
            Expression::Algebraic(a) => write!(f, "{}", a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Algebraic {
        Algebraic::var("x")
    }

    fn y() -> Algebraic {
        Algebraic::var("y")
    }

    fn int(n: i64) -> Algebraic {
        Algebraic::Poly(Poly::from_integer(n))
    }

    #[test]
    fn test_constant_folding() {
        assert_eq!(&int(0) + &x(), x());
        assert_eq!(&x() - &int(0), x());
        assert_eq!(&int(0) - &x(), -&x());
        assert_eq!(&int(1) * &x(), x());
        assert!((&int(0) * &x()).is_zero());
    }

    #[test]
    fn test_division_by_zero_is_zero() {
        assert!((&x() / &int(0)).is_zero());
        assert!((&int(0) / &x()).is_zero());
    }

    #[test]
    fn test_division_by_constant_stays_polynomial() {
        let half = &x() / &int(2);
        assert!(matches!(half, Algebraic::Poly(_)));
        assert_eq!(&half * &int(2), x());
    }

    #[test]
    fn test_division_by_variable_is_frac() {
        let q = &int(1) / &x();
        assert_eq!(
            q,
            Algebraic::Frac(Frac {
                num: Poly::one(),
                den: Poly::var("x")
            })
        );
        assert_eq!(q.to_string(), "(1 / (x))");
    }

    #[test]
    fn test_frac_same_denominator_add() {
        let a = &x() / &y();
        let b = &int(1) / &y();
        let sum = &a + &b;
        assert_eq!(
            sum,
            Algebraic::Frac(Frac {
                num: &Poly::var("x") + &Poly::one(),
                den: Poly::var("y"),
            })
        );
    }

    #[test]
    fn test_poly_plus_frac_is_conditional() {
        let sum = &x() + &(&int(1) / &y());
        match sum {
            Algebraic::Cond(c) => {
                assert_eq!(c.cond, Poly::var("y"));
                assert_eq!(c.otherwise, x());
            }
            other => panic!("expected conditional, got {}", other),
        }
    }

    #[test]
    fn test_cond_make_equal_branches() {
        let result = Cond::make(Poly::var("x"), y(), y());
        assert_eq!(result, y());
    }

    #[test]
    fn test_cond_make_constant_condition() {
        assert_eq!(Cond::make(Poly::from_integer(3), x(), y()), x());
        assert_eq!(Cond::make(Poly::zero(), x(), y()), y());
    }

    #[test]
    fn test_cond_make_drops_repeated_factors() {
        let x2 = &Poly::var("x") * &Poly::var("x");
        let result = Cond::make(x2, y(), int(2));
        match result {
            Algebraic::Cond(c) => assert_eq!(c.cond, Poly::var("x")),
            other => panic!("expected conditional, got {}", other),
        }
    }

    #[test]
    fn test_cond_make_zeroes_otherwise_equal_to_condition() {
        assert_eq!(Cond::make(Poly::var("x"), y(), x()), Algebraic::Cond(Box::new(Cond {
            cond: Poly::var("x"),
            then: y(),
            otherwise: int(0),
        })));
    }

    #[test]
    fn test_frac_times_matching_condition() {
        // (1/x) * ((x/x) * y + (1 - x/x) * 2)
        let cond = Cond::make(Poly::var("x"), y(), int(2));
        let product = &(&int(1) / &x()) * &cond;
        match product {
            Algebraic::Cond(c) => {
                assert_eq!(c.cond, Poly::var("x"));
                assert_eq!(c.then, &y() / &x());
                assert!(c.otherwise.is_zero());
            }
            other => panic!("expected conditional, got {}", other),
        }
    }

    #[test]
    fn test_display_polynomial_factored() {
        let p = &(&x() * &x()) + &x();
        assert_eq!(p.to_string(), "(x*(x + 1))");
        assert_eq!(int(3).to_string(), "3");
    }

    #[test]
    fn test_display_conditional() {
        let c = Cond::make(Poly::var("x"), int(1), int(0));
        assert_eq!(c.to_string(), "(((x)/(x)) * 1 + (1 - (x)/(x)) * 0)");
    }

    #[test]
    fn test_free_variables() {
        let e = &(&x() / &y()) + &Algebraic::var("z");
        let vars: Vec<_> = e.free_variables().into_iter().collect();
        assert_eq!(vars, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_equation_difference() {
        let eq = Equation::new(&x() + &y(), &y() + &x());
        assert!(eq.difference().is_zero());
        assert_eq!(eq.to_string(), "(x + y) = (x + y)");
    }
}
