//! Decimal strings to minimal units and back.
//!
//! `parse_units("0.5", 18)` is `500_000_000_000_000_000`; `format_units` is
//! its inverse and always keeps at least one fractional digit (`"1.0"`).

use crate::types::Amount;
use crate::{Error, Result};

fn scale(decimals: u8) -> Result<Amount> {
    10u128
        .checked_pow(u32::from(decimals))
        .ok_or(Error::Overflow)
}

fn digits(s: &str, input: &str) -> Result<Amount> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidUnits(input.to_string()));
    }
    if s.is_empty() {
        return Ok(0);
    }
    s.parse::<Amount>().map_err(|_| Error::Overflow)
}

pub fn parse_units(input: &str, decimals: u8) -> Result<Amount> {
    let s = input.trim();
    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(Error::InvalidUnits(input.to_string()));
    }
    if frac.len() > usize::from(decimals) {
        return Err(Error::InvalidUnits(format!(
            "{input}: more than {decimals} decimal places"
        )));
    }

    let unit = scale(decimals)?;
    let whole = digits(whole, input)?;
    let frac_scale = scale(decimals - frac.len() as u8)?;
    let frac = digits(frac, input)?;

    whole
        .checked_mul(unit)
        .and_then(|w| w.checked_add(frac * frac_scale))
        .ok_or(Error::Overflow)
}

pub fn format_units(amount: Amount, decimals: u8) -> String {
    let Ok(unit) = scale(decimals) else {
        return amount.to_string();
    };
    let whole = amount / unit;
    let frac = amount % unit;
    if frac == 0 {
        return format!("{whole}.0");
    }
    let frac = format!("{frac:0>width$}", width = usize::from(decimals));
    format!("{whole}.{}", frac.trim_end_matches('0'))
}
