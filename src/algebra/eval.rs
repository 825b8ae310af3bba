//! Evaluation of standard meadow forms under zero/nonzero assumptions
//!
//! Evaluation only preserves whether a value is zero. Its result is zero
//! exactly when the value is provably zero under the assumptions.

use super::factor::factors;
use super::poly::Poly;
use super::{mul, Algebraic, Cond};
use std::collections::BTreeSet;
use std::fmt;

/// Canonical polynomials assumed to be zero and nonzero
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assumptions {
    pub zeros: BTreeSet<Poly>,
    pub nonzeros: BTreeSet<Poly>,
}

impl Assumptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assume each variable in `zero` is zero and each in `nonzero` is not
    pub fn from_variables<'a>(
        zero: impl IntoIterator<Item = &'a str>,
        nonzero: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            zeros: zero.into_iter().map(Poly::var).collect(),
            nonzeros: nonzero.into_iter().map(Poly::var).collect(),
        }
    }

    pub fn with_zero(&self, p: Poly) -> Self {
        let mut next = self.clone();
        next.zeros.insert(p);
        next
    }

    pub fn with_nonzeros(&self, ps: impl IntoIterator<Item = Poly>) -> Self {
        let mut next = self.clone();
        next.nonzeros.extend(ps);
        next
    }

    fn zero_variables(&self) -> Vec<&str> {
        self.zeros.iter().filter_map(Poly::as_variable).collect()
    }
}

impl fmt::Display for Assumptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |set: &BTreeSet<Poly>| {
            set.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(
            f,
            "zeros {{{}}}, nonzeros {{{}}}",
            join(&self.zeros),
            join(&self.nonzeros)
        )
    }
}

fn substitute_zeros(p: &Poly, vars: &[&str]) -> Poly {
    vars.iter().fold(p.clone(), |acc, v| acc.substitute_zero(v))
}

/// Evaluate a polynomial: nonzero factors are dropped, zero variables are
/// substituted, and a factor divisible by an assumed-zero polynomial makes
/// the whole product zero.
pub fn eval_poly(p: &Poly, assumptions: &Assumptions) -> Poly {
    let _span = tracing::debug_span!("poly", %p).entered();

    if p.is_constant() {
        return p.clone();
    }

    let zero_vars = assumptions.zero_variables();
    let zero_polys: Vec<Poly> = assumptions
        .zeros
        .iter()
        .filter(|z| z.as_variable().is_none())
        .map(|z| substitute_zeros(z, &zero_vars))
        .filter(|z| !z.is_constant())
        .collect();

    let mut result = Poly::one();
    for factor in factors(p) {
        if assumptions.nonzeros.contains(&factor) {
            continue;
        }
        let reduced = substitute_zeros(&factor, &zero_vars);
        if reduced.is_zero() || zero_polys.iter().any(|z| reduced.div_exact(z).is_some()) {
            tracing::debug!(factor = %factor, "factor vanishes");
            return Poly::zero();
        }
        result = &result * &reduced;
    }

    tracing::debug!(%result, "evaluated polynomial");
    result
}

impl Algebraic {
    /// Evaluate under `assumptions`
    pub fn eval(&self, assumptions: &Assumptions) -> Algebraic {
        match self {
            Algebraic::Poly(p) => Algebraic::Poly(eval_poly(p, assumptions)),
            Algebraic::Frac(f) => {
                let _span = tracing::debug_span!("frac", num = %f.num, den = %f.den).entered();
                // n/d is zero exactly when n*d is
                let num = Algebraic::Poly(eval_poly(&f.num, assumptions));
                let den = Algebraic::Poly(eval_poly(&f.den, assumptions));
                let result = mul(&num, &den);
                tracing::debug!(%result, "evaluated quotient");
                result
            }
            Algebraic::Cond(c) => {
                let _span = tracing::debug_span!("cond", cond = %c.cond).entered();
                tracing::debug!(%assumptions, "evaluating conditional");
                let result = eval_cond(c, assumptions);
                tracing::debug!(%result, "evaluated conditional");
                result
            }
        }
    }
}

fn eval_cond(c: &Cond, assumptions: &Assumptions) -> Algebraic {
    let cond = eval_poly(&c.cond, assumptions);
    let roots = factors(&cond);

    if cond.is_zero() || roots.iter().any(|r| assumptions.zeros.contains(r)) {
        return c.otherwise.eval(assumptions);
    }

    let then = c
        .then
        .eval(&assumptions.with_nonzeros(roots.iter().cloned()));

    if cond.is_constant() || roots.iter().all(|r| assumptions.nonzeros.contains(r)) {
        return then;
    }

    if !then.is_zero() {
        let otherwise = c.otherwise.eval(assumptions);
        return Cond::make(cond, then, otherwise);
    }

    // `then` vanishes wherever cond != 0; `otherwise` must vanish on each root
    for root in roots
        .iter()
        .filter(|r| !assumptions.nonzeros.contains(*r))
    {
        let result = c.otherwise.eval(&assumptions.with_zero(root.clone()));
        if !result.is_zero() {
            return result;
        }
    }
    Algebraic::zero()
}
