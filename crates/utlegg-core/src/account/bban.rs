//! Norwegian domestic account number (BBAN) validation.

/// Length of a Norwegian account number.
pub const BBAN_LENGTH: usize = 11;

/// MOD-11 weights for the first ten digits.
const WEIGHTS: [u32; 10] = [5, 4, 3, 2, 7, 6, 5, 4, 3, 2];

/// Validate a cleaned Norwegian account number using the MOD-11 checksum.
///
/// The number must be exactly 11 digits. The check digit is
/// `(11 - sum % 11) % 11` over the weighted first ten digits. A computed
/// value of 10 can never equal a single digit, so such numbers fail
/// without a special case.
pub fn validate_bban(bban: &str) -> bool {
    let digits: Vec<u32> = bban.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != BBAN_LENGTH || bban.len() != BBAN_LENGTH {
        return false;
    }

    check_digit(&digits[..10]) == digits[10]
}

/// Compute the MOD-11 check digit for ten digits. May return 10.
pub fn check_digit(digits: &[u32]) -> u32 {
    let sum: u32 = digits
        .iter()
        .zip(WEIGHTS.iter())
        .map(|(d, w)| d * w)
        .sum();

    (11 - sum % 11) % 11
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn digits(s: &str) -> Vec<u32> {
        s.chars().filter_map(|c| c.to_digit(10)).collect()
    }

    #[test]
    fn test_validate_bban_valid() {
        assert!(validate_bban("86011117947"));
        // Weighted sum divisible by 11 gives check digit 0
        assert!(validate_bban("00000000000"));
    }

    #[test]
    fn test_validate_bban_invalid() {
        assert!(!validate_bban("86011117948"));
        assert!(!validate_bban("8601111794")); // Too short
        assert!(!validate_bban("860111179470")); // Too long
        assert!(!validate_bban("8601111794A"));
    }

    #[test]
    fn test_check_digit_ten_never_matches() {
        // 6 * 2 = 12, 12 % 11 == 1, so the check digit is 10
        assert_eq!(check_digit(&digits("0000000006")), 10);
        for last in 0..=9 {
            assert!(!validate_bban(&format!("0000000006{}", last)));
        }
    }

    proptest! {
        #[test]
        fn prop_validation_matches_weighted_sum(account in "[0-9]{11}") {
            let d = digits(&account);
            let sum: u32 = d[..10]
                .iter()
                .zip([5, 4, 3, 2, 7, 6, 5, 4, 3, 2])
                .map(|(d, w)| d * w)
                .sum();
            let expected = (11 - sum % 11) % 11;
            prop_assert_eq!(validate_bban(&account), expected == d[10]);
        }

        #[test]
        fn prop_exactly_one_check_digit_or_none(prefix in "[0-9]{10}") {
            let valid = (0..=9)
                .filter(|last| validate_bban(&format!("{}{}", prefix, last)))
                .count();
            let expected = if check_digit(&digits(&prefix)) == 10 { 0 } else { 1 };
            prop_assert_eq!(valid, expected);
        }
    }
}
