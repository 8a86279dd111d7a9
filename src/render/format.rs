//! Count formatting

const COMPACT_UNITS: [(u64, &str); 4] = [
    (1_000_000_000_000, "T"),
    (1_000_000_000, "B"),
    (1_000_000, "M"),
    (1_000, "K"),
];

/// Format a follower/post count for display.
///
/// Below 10,000 the full number is grouped with commas (`9,999`); above that
/// it is compacted to one decimal (`12.3K`, `1.5M`, `2.0B`), rounding half
/// away from zero.
pub fn format_count(n: u64) -> String {
    if n < 10_000 {
        return group_thousands(n);
    }

    for (index, &(unit, suffix)) in COMPACT_UNITS.iter().enumerate() {
        if n < unit {
            continue;
        }
        let tenths = (u128::from(n) * 10 + u128::from(unit) / 2) / u128::from(unit);
        // 999_950 rounds to 1000.0K, which reads as 1.0M
        if tenths >= 10_000 && index > 0 {
            let (bigger, bigger_suffix) = COMPACT_UNITS[index - 1];
            let tenths = (u128::from(n) * 10 + u128::from(bigger) / 2) / u128::from(bigger);
            return format!("{}.{}{}", tenths / 10, tenths % 10, bigger_suffix);
        }
        return format!("{}.{}{}", tenths / 10, tenths % 10, suffix);
    }

    group_thousands(n)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
