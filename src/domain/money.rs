use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Round a currency or percentage figure to cents, half away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `part / whole * 100`, or `None` on a zero divisor or overflow.
fn ratio_percent(part: Decimal, whole: Decimal) -> Option<Decimal> {
    part.checked_div(whole)?.checked_mul(dec!(100))
}

/// `part / whole` as a percentage rounded to 2 dp; 0 when `whole` is zero
/// or the ratio is out of range.
pub fn percent(part: Decimal, whole: Decimal) -> Decimal {
    ratio_percent(part, whole).map(round2).unwrap_or(Decimal::ZERO)
}

/// `part / whole` as a whole-number percentage; 0 when `whole` is zero.
pub fn whole_percent(part: Decimal, whole: Decimal) -> u32 {
    ratio_percent(part, whole)
        .and_then(|p| {
            p.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_u32()
        })
        .unwrap_or(0)
}

/// `acc + value`, keeping `acc` when the sum would overflow.
pub fn add_or_keep(acc: Decimal, value: Decimal) -> Decimal {
    acc.checked_add(value).unwrap_or(acc)
}

/// Sum that drops any term which would overflow the running total.
pub fn checked_total(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values.into_iter().fold(Decimal::ZERO, add_or_keep)
}

/// Count ratio as a whole-number percentage.
pub fn count_percent(part: usize, whole: usize) -> u32 {
    whole_percent(Decimal::from(part), Decimal::from(whole))
}

/// `$12.50` style display.
pub fn usd(value: Decimal) -> String {
    format!("${:.2}", round2(value))
}
