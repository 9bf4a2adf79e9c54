//! Exact decimal arithmetic over the string-typed quantities of the API.

use crate::schema::Vote;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecimalError {
    #[error("invalid decimal: {0:?}")]
    Invalid(String),
    #[error("decimal overflow")]
    Overflow,
    #[error("decimal sum lost precision")]
    Inexact,
}

/// Largest number of integer digits an accepted amount may carry.
pub const MAX_INTEGER_DIGITS: u32 = 15;
/// Largest number of fractional digits (as written) an accepted amount may carry.
pub const MAX_SCALE: u32 = 8;

/// Whether `value` fits the accepted amount range. Bounded amounts use at
/// most 23 significant digits, so hundreds of thousands of them sum exactly
/// in a 96-bit mantissa.
pub fn within_bounds(value: Decimal) -> bool {
    let limit = Decimal::from(10_u64.pow(MAX_INTEGER_DIGITS));
    value.abs() < limit && value.scale() <= MAX_SCALE
}

/// Text form a SQL `NUMERIC` column gives back: no leading zeros, scale as
/// written, zero without a sign.
pub fn canonical_decimal(text: &str) -> Result<String, DecimalError> {
    let mut value = parse_decimal(text)?;
    if value.is_zero() {
        value.set_sign_positive(true);
    }
    Ok(value.to_string())
}

/// Parse a plain decimal literal (`-12.50`, `100`). Exponents, separators and
/// surrounding whitespace are rejected so the value round-trips through a
/// SQL `NUMERIC` column unchanged.
pub fn parse_decimal(text: &str) -> Result<Decimal, DecimalError> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let well_formed = digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if !well_formed {
        return Err(DecimalError::Invalid(text.to_string()));
    }
    Decimal::from_str_exact(text).map_err(|_| DecimalError::Invalid(text.to_string()))
}

/// Canonical text form: no trailing fractional zeros, zero renders as `"0"`.
pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

/// `a + b`, failing instead of rounding when the mantissa cannot hold the
/// result at full scale.
fn exact_add(a: Decimal, b: Decimal) -> Result<Decimal, DecimalError> {
    let sum = a.checked_add(b).ok_or(DecimalError::Overflow)?;
    if sum.scale() < a.scale().max(b.scale()) {
        return Err(DecimalError::Inexact);
    }
    Ok(sum)
}

/// Exact sum of decimal strings.
pub fn sum_decimal_strings<'a, I>(values: I) -> Result<Decimal, DecimalError>
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, text| exact_add(acc, parse_decimal(text)?))
}

/// For/against weight totals over a set of vote rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub votes_for: Decimal,
    pub votes_against: Decimal,
    pub count: usize,
}

impl VoteTally {
    pub fn from_votes(votes: &[Vote]) -> Result<Self, DecimalError> {
        let votes_for = sum_decimal_strings(
            votes.iter().filter(|v| v.support).map(|v| v.weight.as_str()),
        )?;
        let votes_against = sum_decimal_strings(
            votes.iter().filter(|v| !v.support).map(|v| v.weight.as_str()),
        )?;
        Ok(Self {
            votes_for,
            votes_against,
            count: votes.len(),
        })
    }

    pub fn total(&self) -> Result<Decimal, DecimalError> {
        exact_add(self.votes_for, self.votes_against)
    }

    /// Share of weight in favour, as a percentage. `None` when nothing was cast.
    pub fn support_percentage(&self) -> Option<Decimal> {
        let total = self.total().ok()?;
        if total.is_zero() {
            return None;
        }
        self.votes_for
            .checked_mul(Decimal::ONE_HUNDRED)?
            .checked_div(total)
    }
}
