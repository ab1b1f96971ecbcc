//! Milliunit currency helpers shared by response shaping and amount parsing.
//!
//! The budgeting API expresses every amount in milliunits (1/1000 of the
//! currency's major unit, so $1.00 is 1000). Responses echo the raw value and
//! attach a `*_formatted` display string produced here.

// self
use crate::_prelude::*;

/// Unit a caller-supplied amount is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountUnit {
	/// Raw API milliunits.
	Milliunits,
	/// Major currency units (dollars), scaled by 1000.
	Major,
}

/// Formats milliunits as a dollar display string, e.g. `-$1,234.56`.
pub fn format_milliunits(amount: i64) -> String {
	let negative = amount < 0;
	// Round half away from zero to the nearest cent.
	let cents = (amount.unsigned_abs() + 5) / 10;
	let dollars = group_thousands(cents / 100);
	let rem = cents % 100;

	if negative { format!("-${dollars}.{rem:02}") } else { format!("${dollars}.{rem:02}") }
}

/// Converts a caller-supplied amount to milliunits.
///
/// With an explicit unit the value converts directly. Without one, fractional
/// values are major units and values with magnitude >= 1000 are milliunits;
/// unit-less integral values under 1000 are ambiguous (is `500` $0.50 or
/// $500?) and rejected, except zero.
pub fn to_milliunits(amount: f64, unit: Option<AmountUnit>) -> Result<i64> {
	if !amount.is_finite() {
		return Err(Error::validation("Amount must be a finite number"));
	}

	match unit {
		Some(AmountUnit::Milliunits) => {
			if amount.fract() != 0.0 {
				return Err(Error::validation(format!(
					"Amount {amount} is not a whole number of milliunits"
				)));
			}

			Ok(amount as i64)
		},
		Some(AmountUnit::Major) => Ok((amount * 1_000.0).round() as i64),
		None =>
			if amount == 0.0 {
				Ok(0)
			} else if amount.fract() != 0.0 {
				Ok((amount * 1_000.0).round() as i64)
			} else if amount.abs() >= 1_000.0 {
				Ok(amount as i64)
			} else {
				Err(Error::validation(format!(
					"Amount {amount} is ambiguous; set \"unit\" to \"milliunits\" or \"major\""
				)))
			},
	}
}

fn group_thousands(value: u64) -> String {
	let digits = value.to_string();
	let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

	for (idx, ch) in digits.chars().enumerate() {
		if idx > 0 && (digits.len() - idx) % 3 == 0 {
			grouped.push(',');
		}

		grouped.push(ch);
	}

	grouped
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn formats_common_amounts() {
		assert_eq!(format_milliunits(0), "$0.00");
		assert_eq!(format_milliunits(1_000), "$1.00");
		assert_eq!(format_milliunits(-1_234_560), "-$1,234.56");
		assert_eq!(format_milliunits(25_990), "$25.99");
		assert_eq!(format_milliunits(1_234_567_890), "$1,234,567.89");
	}

	#[test]
	fn formats_round_sub_cent_amounts() {
		assert_eq!(format_milliunits(5), "$0.01");
		assert_eq!(format_milliunits(4), "$0.00");
		assert_eq!(format_milliunits(-5), "-$0.01");
	}

	#[test]
	fn explicit_units_convert_directly() {
		assert_eq!(
			to_milliunits(500.0, Some(AmountUnit::Milliunits))
				.expect("Explicit milliunits should convert."),
			500
		);
		assert_eq!(
			to_milliunits(500.0, Some(AmountUnit::Major))
				.expect("Explicit major units should convert."),
			500_000
		);
		assert_eq!(
			to_milliunits(-12.34, Some(AmountUnit::Major))
				.expect("Fractional major units should convert."),
			-12_340
		);
		assert!(to_milliunits(12.5, Some(AmountUnit::Milliunits)).is_err());
	}

	#[test]
	fn unitless_values_follow_the_legacy_heuristic() {
		assert_eq!(
			to_milliunits(2_500.0, None).expect("Large integral values are milliunits."),
			2_500
		);
		assert_eq!(
			to_milliunits(-1_000.0, None).expect("Negative large values are milliunits."),
			-1_000
		);
		assert_eq!(
			to_milliunits(12.34, None).expect("Fractional values are major units."),
			12_340
		);
		assert_eq!(to_milliunits(0.0, None).expect("Zero needs no unit."), 0);
	}

	#[test]
	fn ambiguous_unitless_values_are_rejected() {
		let err = to_milliunits(500.0, None)
			.expect_err("Unit-less integral values under 1000 are ambiguous.");

		assert!(matches!(err, Error::Validation { .. }));
		assert!(err.to_string().contains("ambiguous"));
		assert!(to_milliunits(-999.0, None).is_err());
	}
}
