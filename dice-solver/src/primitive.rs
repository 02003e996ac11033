//! Functions to construct [`Integer`]s and [`Rational`]s, and the exact unary operations on them.

use crate::expr::ArithmeticError;
use rug::{Integer, Rational};

/// The largest operand the factorial operator accepts.
///
/// Dice values are at most 6, so anything beyond this comes from stacking operators and is never
/// part of a useful solution.
pub const MAX_FACTORIAL: u32 = 20;

/// Creates an [`Integer`] with the given value.
pub fn int<T>(n: T) -> Integer
where
    Integer: From<T>,
{
    Integer::from(n)
}

/// Creates a [`Rational`] with the given value.
pub fn rational<T>(n: T) -> Rational
where
    Rational: From<T>,
{
    Rational::from(n)
}

/// Returns true if the rational number is an integer.
pub fn is_integer(n: &Rational) -> bool {
    *n.denom() == 1
}

/// Computes the factorial of `n`.
///
/// `n` must be a non-negative integer no larger than [`MAX_FACTORIAL`].
pub fn factorial(n: &Rational) -> Result<Rational, ArithmeticError> {
    if n.cmp0().is_lt() || !is_integer(n) {
        return Err(ArithmeticError::FactorialDomain);
    }

    let k = n.numer()
        .to_u32()
        .filter(|&k| k <= MAX_FACTORIAL)
        .ok_or(ArithmeticError::FactorialTooLarge)?;
    Ok(rational(int(Integer::factorial(k))))
}

/// Returns every integer `k` in `0..=MAX_FACTORIAL` such that `k! == n`, in ascending order.
///
/// There are two such integers for `n = 1`, and at most one for any other `n`.
pub fn factorial_preimages(n: &Rational) -> Vec<u32> {
    if n.cmp0().is_le() || !is_integer(n) {
        return Vec::new();
    }

    let mut preimages = Vec::new();
    let mut acc = int(1);
    for k in 0..=MAX_FACTORIAL {
        if k > 0 {
            acc *= k;
        }
        match acc.cmp(n.numer()) {
            std::cmp::Ordering::Equal => preimages.push(k),
            std::cmp::Ordering::Greater => break,
            std::cmp::Ordering::Less => (),
        }
    }
    preimages
}

/// Computes the exact square root of `n`.
///
/// `n` must be non-negative, and both its numerator and denominator must be perfect squares.
pub fn exact_sqrt(n: &Rational) -> Result<Rational, ArithmeticError> {
    if n.cmp0().is_lt() {
        return Err(ArithmeticError::NegativeRoot);
    }

    let (numer, denom) = (n.numer(), n.denom());
    if !numer.is_perfect_square() || !denom.is_perfect_square() {
        return Err(ArithmeticError::IrrationalRoot);
    }

    Ok(rational((numer.clone().sqrt(), denom.clone().sqrt())))
}
