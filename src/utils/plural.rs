//! Count formatting for log lines.

/// `count` followed by `noun`, with an `s` unless the count is one.
///
/// `plural_count(1, "unit")` is `"1 unit"`, `plural_count(3, "unit")` is `"3 units"`.
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_count() {
        assert_eq!(plural_count(0, "unit"), "0 units");
        assert_eq!(plural_count(1, "template"), "1 template");
        assert_eq!(plural_count(12, "dependency set"), "12 dependency sets");
    }
}
