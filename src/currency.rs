// 💱 Currency formatting for the list and summary views
//
// The two views do not agree: the list shows US dollars with western
// grouping, the summary shows Indian rupees with lakh/crore grouping. Both
// are kept as-is until the product picks one currency.

use num_format::{CustomFormat, Grouping, Locale, ToFormattedString};
use std::sync::LazyLock;

static INDIAN_GROUPING: LazyLock<CustomFormat> = LazyLock::new(|| {
    CustomFormat::builder()
        .grouping(Grouping::Indian)
        .separator(",")
        .minus_sign("-")
        .build()
        .expect("hardcoded number format should be valid")
});

/// Split into (negative, whole units, cents), rounding to the nearest cent
fn split_cents(amount: f64) -> (bool, i64, i64) {
    let cents = (amount.abs() * 100.0).round() as i64;
    (amount < 0.0 && cents != 0, cents / 100, cents % 100)
}

/// `$1,234.50` - used by the expense list
pub fn format_list_amount(amount: f64) -> String {
    let (negative, units, cents) = split_cents(amount);
    format!(
        "{}${}.{:02}",
        if negative { "-" } else { "" },
        units.to_formatted_string(&Locale::en),
        cents
    )
}

/// `₹1,23,456.78` - used by the summary view
pub fn format_summary_amount(amount: f64) -> String {
    let (negative, units, cents) = split_cents(amount);
    format!(
        "{}₹{}.{:02}",
        if negative { "-" } else { "" },
        units.to_formatted_string(&*INDIAN_GROUPING),
        cents
    )
}
