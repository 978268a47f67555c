//! Pricing and sales-target math.
//!
//! Everything here is pure: no database, no clock. Callers pass `today`
//! explicitly so the calendar helpers stay deterministic under test.
//!
//! Conventions:
//! - rates coming from company settings are percentages (`10` means 10%);
//! - money is rounded to 2 decimals, half away from zero;
//! - ratios (margins) are kept unrounded until presented.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Margin ratio assumed when no product has a usable sale price.
pub const DEFAULT_MARGIN_RATIO: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

pub fn round_money(v: Decimal) -> Decimal {
    v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `10` -> `0.10`
pub fn percent_to_ratio(p: Decimal) -> Decimal {
    p / Decimal::ONE_HUNDRED
}

/// Rates applied on top of a product cost.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PricingRates {
    pub tax_rate: Decimal,
    pub card_fee: Decimal,
    pub desired_margin: Decimal,
}

impl PricingRates {
    fn total_ratio(&self) -> Decimal {
        percent_to_ratio(self.tax_rate + self.card_fee + self.desired_margin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricingResult {
    pub cost_price: Decimal,
    pub sale_price: Decimal,
    /// (sale - cost) / cost, as a percentage
    pub markup: Decimal,
    /// `true` when the price came from the margin formula rather than the caller
    pub suggested: bool,
}

/// Markup percentage for a cost/sale pair; zero cost yields zero.
pub fn markup_percent(cost: Decimal, sale: Decimal) -> Decimal {
    if cost.is_zero() {
        return Decimal::ZERO;
    }
    round_money((sale - cost) / cost * Decimal::ONE_HUNDRED)
}

/// Price a product.
///
/// With an explicit `sale_price` only the markup is derived. Otherwise the
/// suggested price is `cost / (1 - (tax + fee + margin))`, falling back to
/// `cost * (1 + tax + fee + margin)` when the rates add up to 100% or more.
///
/// ```
/// use rust_decimal::Decimal;
/// use service::pricing::{calculate_smart_pricing, PricingRates};
/// let rates = PricingRates { tax_rate: Decimal::from(10), card_fee: Decimal::from(5), desired_margin: Decimal::from(20) };
/// let r = calculate_smart_pricing(Decimal::from(50), &rates, None);
/// assert_eq!(r.sale_price, Decimal::new(7692, 2));
/// ```
pub fn calculate_smart_pricing(cost: Decimal, rates: &PricingRates, sale_price: Option<Decimal>) -> PricingResult {
    let cost = round_money(cost);
    let (sale, suggested) = match sale_price {
        Some(explicit) => (round_money(explicit), false),
        None => {
            let total = rates.total_ratio();
            let denominator = Decimal::ONE - total;
            let raw = if denominator > Decimal::ZERO {
                cost / denominator
            } else {
                cost * (Decimal::ONE + total)
            };
            (round_money(raw), true)
        }
    };
    PricingResult { cost_price: cost, sale_price: sale, markup: markup_percent(cost, sale), suggested }
}

/// `(sale - cost - sale*tax - sale*fee) / sale`; `None` for a non-positive sale price.
pub fn contribution_margin_ratio(sale: Decimal, cost: Decimal, tax_rate: Decimal, card_fee: Decimal) -> Option<Decimal> {
    if sale <= Decimal::ZERO {
        return None;
    }
    let deductions = sale * percent_to_ratio(tax_rate) + sale * percent_to_ratio(card_fee);
    Some((sale - cost - deductions) / sale)
}

/// Mean contribution margin over `(sale_price, cost_price)` pairs.
///
/// Products without a positive sale price are ignored; with none left the
/// [`DEFAULT_MARGIN_RATIO`] applies.
pub fn average_margin_ratio<I>(products: I, tax_rate: Decimal, card_fee: Decimal) -> Decimal
where
    I: IntoIterator<Item = (Decimal, Decimal)>,
{
    let mut sum = Decimal::ZERO;
    let mut n: u32 = 0;
    for (sale, cost) in products {
        if let Some(r) = contribution_margin_ratio(sale, cost, tax_rate, card_fee) {
            sum += r;
            n += 1;
        }
    }
    if n == 0 {
        DEFAULT_MARGIN_RATIO
    } else {
        sum / Decimal::from(n)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SalesTargetInput {
    pub fixed_costs: Decimal,
    pub variable_expenses: Decimal,
    pub target_profit: Decimal,
    pub average_margin_ratio: Decimal,
    pub remaining_days: u32,
    pub booked_revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesTarget {
    pub fixed_costs: Decimal,
    pub variable_expenses: Decimal,
    pub target_profit: Decimal,
    /// fixed + variable + profit
    pub required_amount: Decimal,
    /// average contribution margin as a percentage
    pub average_margin: Decimal,
    pub total_to_sell: Option<Decimal>,
    pub booked_revenue: Decimal,
    pub remaining_to_sell: Option<Decimal>,
    pub remaining_days: u32,
    pub daily_target: Option<Decimal>,
    pub reachable: bool,
}

/// Revenue needed to cover costs and reach the profit goal.
///
/// A non-positive margin makes the goal unreachable (`total_to_sell` is `None`).
/// The daily target spreads what is still missing over the remaining days.
pub fn calculate_sales_target(input: &SalesTargetInput) -> SalesTarget {
    let required = input.fixed_costs + input.variable_expenses + input.target_profit;
    let ratio = input.average_margin_ratio;
    let reachable = ratio > Decimal::ZERO;

    let total_to_sell = reachable.then(|| round_money(required / ratio));
    let remaining_to_sell = total_to_sell.map(|t| (t - input.booked_revenue).max(Decimal::ZERO));
    let daily_target = match (remaining_to_sell, input.remaining_days) {
        (Some(rest), days) if days > 0 => Some(round_money(rest / Decimal::from(days))),
        _ => None,
    };

    SalesTarget {
        fixed_costs: round_money(input.fixed_costs),
        variable_expenses: round_money(input.variable_expenses),
        target_profit: round_money(input.target_profit),
        required_amount: round_money(required),
        average_margin: round_money(ratio * Decimal::ONE_HUNDRED),
        total_to_sell,
        booked_revenue: round_money(input.booked_revenue),
        remaining_to_sell,
        remaining_days: input.remaining_days,
        daily_target,
        reachable,
    }
}

/// Number of days in `month` of `year`; `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

/// Selling days left in the month, today included.
///
/// Past months have none left, future months all of them.
pub fn remaining_days_in_month(today: NaiveDate, year: i32, month: u32) -> u32 {
    let Some(total) = days_in_month(year, month) else { return 0 };
    let current = (today.year(), today.month());
    match (year, month).cmp(&current) {
        std::cmp::Ordering::Less => 0,
        std::cmp::Ordering::Greater => total,
        std::cmp::Ordering::Equal => total - today.day() + 1,
    }
}

/// `[first instant of the month, first instant of the next month)` in UTC.
pub fn month_bounds(year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((
        Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0)?),
        Utc.from_utc_datetime(&end.and_hms_opt(0, 0, 0)?),
    ))
}

/// Step a `(month, year)` pair by `delta` months.
pub fn shift_month(month: u32, year: i32, delta: i32) -> (u32, i32) {
    let idx = year * 12 + (month as i32 - 1) + delta;
    ((idx.rem_euclid(12) + 1) as u32, idx.div_euclid(12))
}
