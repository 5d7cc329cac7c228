use crate::error::EncodeError;
use crate::validation::is_numeric;

/// Fixed fungible-token precision. Callers always supply whole units.
pub const TOKEN_DECIMALS: u32 = 18;

const ONE_TOKEN: u128 = 10u128.pow(TOKEN_DECIMALS);

/// Scale a whole-unit digit string to base units.
pub fn parse_units(whole: &str) -> Result<u128, EncodeError> {
    if !is_numeric(whole) {
        return Err(EncodeError::NotAWholeAmount(whole.to_string()));
    }
    let mut units: u128 = 0;
    for digit in whole.bytes() {
        units = units
            .checked_mul(10)
            .and_then(|u| u.checked_add(u128::from(digit - b'0')))
            .ok_or_else(|| EncodeError::AmountOverflow(whole.to_string()))?;
    }
    units
        .checked_mul(ONE_TOKEN)
        .ok_or_else(|| EncodeError::AmountOverflow(whole.to_string()))
}

/// Scale whole units (already parsed) to base units.
pub fn whole_to_base(whole: u64) -> u128 {
    u128::from(whole) * ONE_TOKEN
}

/// Render base units as a decimal string, e.g. `1000.0` or `0.25`.
pub fn format_units(base: u128) -> String {
    let int = base / ONE_TOKEN;
    let frac = base % ONE_TOKEN;
    let mut frac_str = format!("{:0width$}", frac, width = TOKEN_DECIMALS as usize);
    while frac_str.len() > 1 && frac_str.ends_with('0') {
        frac_str.pop();
    }
    format!("{int}.{frac_str}")
}
