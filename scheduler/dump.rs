//! Read-only ordered iteration of the schedule, for debugging and tests
//! (spec.md §4.6). Aborts its read transaction on completion — reads never
//! block a concurrent write.

use std::io::Write;

use crate::error::{Error, Result};

use super::schedule::Schedule;
use super::store::Store;

/// Writes one `<score:%.2e> <hash:16 hex digits> <freq:%.2e>` line per entry,
/// in ascending key order (spec.md §6 "Dump format").
pub fn dump(store: &Store, schedule: &Schedule, out: &mut dyn Write) -> Result<()> {
    let rtxn = store.begin_read()?;
    for entry in schedule.iter(&rtxn)? {
        let (key, freq) = entry?;
        writeln!(
            out,
            "{} {:016x} {}",
            format_c_exp(key.score),
            key.hash,
            format_c_exp(freq as f64)
        )
        .map_err(|e| Error::Internal(format!("writing dump output: {e}")))?;
    }
    // Reads have nothing to commit; dropping the RoTxn aborts it implicitly.
    Ok(())
}

/// Formats `value` the way C's `printf("%.2e", value)` does: a signed
/// two-decimal mantissa followed by `e`, an explicit exponent sign, and the
/// exponent zero-padded to at least two digits (`2.00e+00`, `1.00e-04`).
/// Rust's `{:.2e}` omits both the sign and the padding, so the dump format
/// spec.md §6 pins verbatim has to be built by hand from it.
fn format_c_exp(value: f64) -> String {
    let formatted = format!("{value:.2e}");
    let (mantissa, exp_str) = formatted
        .split_once('e')
        .expect("LowerExp output always contains 'e'");
    let exp: i32 = exp_str.parse().expect("exponent is a valid integer");
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::format_c_exp;

    #[test]
    fn matches_c_printf_percent_2e() {
        assert_eq!(format_c_exp(2.0), "2.00e+00");
        assert_eq!(format_c_exp(0.0001), "1.00e-04");
        assert_eq!(format_c_exp(0.0), "0.00e+00");
        assert_eq!(format_c_exp(-1.5e10), "-1.50e+10");
        assert_eq!(format_c_exp(123.456), "1.23e+02");
    }
}
