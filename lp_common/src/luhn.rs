//! Luhn checksum validation for order numbers.
//!
//! Order numbers are digit strings validated with the standard Luhn algorithm: reading right to left,
//! every second digit is doubled (subtracting 9 when the double exceeds 9) and the total must be a
//! multiple of ten. Empty strings and strings with non-digit characters are rejected outright.

/// Returns true iff `number` is a non-empty digit string with a valid Luhn checksum.
pub fn is_valid(number: &str) -> bool {
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = number
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();
    sum % 10 == 0
}

#[cfg(test)]
mod test {
    use super::is_valid;

    #[test]
    fn known_valid_numbers() {
        assert!(is_valid("12345678903"));
        assert!(is_valid("4561261212345467"));
        assert!(is_valid("0"));
    }

    #[test]
    fn known_invalid_numbers() {
        assert!(!is_valid("12345678904"));
        assert!(!is_valid("4561261212345464"));
    }

    #[test]
    fn malformed_input() {
        assert!(!is_valid(""));
        assert!(!is_valid("12a"));
        assert!(!is_valid(" 12345678903"));
        assert!(!is_valid("-12345678903"));
    }
}
