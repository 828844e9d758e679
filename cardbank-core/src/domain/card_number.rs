//! Card number generation and validation
//!
//! Card numbers are 16 digits: a fixed 6-digit institution prefix, 9 random
//! account digits and a trailing mod-10 checksum digit. Doubling is applied
//! to digits at even positions (0, 2, ..., 14), counted from the left.

use rand::Rng;

/// Bank Identification Number shared by every card this institution issues
pub const INSTITUTION_PREFIX: &str = "400000";

/// Total number of digits in a card number
pub const CARD_NUMBER_LEN: usize = 16;

/// Number of random digits between the prefix and the checksum
const ACCOUNT_DIGITS: usize = 9;

/// Number of digits in a PIN
pub const PIN_LEN: usize = 4;

/// Generate a new card number that passes [`validate`]
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut number = String::with_capacity(CARD_NUMBER_LEN);
    number.push_str(INSTITUTION_PREFIX);
    for _ in 0..ACCOUNT_DIGITS {
        number.push(digit_char(rng.gen_range(0..10)));
    }

    let sum = weighted_sum(number.bytes().map(|b| u32::from(b - b'0')));
    number.push(digit_char((10 - sum % 10) % 10));
    number
}

/// Check that `number` is 16 ASCII digits with a valid checksum
pub fn validate(number: &str) -> bool {
    if number.len() != CARD_NUMBER_LEN || !number.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    weighted_sum(number.bytes().map(|b| u32::from(b - b'0'))) % 10 == 0
}

/// Generate a zero-padded 4-digit PIN
pub fn generate_pin<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{:0width$}", rng.gen_range(0..10_000u32), width = PIN_LEN)
}

/// Sum of digits with even positions doubled (minus 9 when above 9)
fn weighted_sum(digits: impl Iterator<Item = u32>) -> u32 {
    digits
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 0 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum()
}

fn digit_char(d: u32) -> char {
    char::from_digit(d, 10).unwrap_or('0')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_numbers_validate() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let number = generate(&mut rng);
            assert_eq!(number.len(), CARD_NUMBER_LEN);
            assert!(number.starts_with(INSTITUTION_PREFIX));
            assert!(validate(&number), "generated number {} should validate", number);
        }
    }

    #[test]
    fn test_known_numbers() {
        // Even-position doubling: 4000003972196501 sums to 50
        assert!(validate("4000003972196501"));
        assert!(validate("4000000000000002"));
        assert!(!validate("4000000000000000"));
        assert!(!validate("4000003972196504"));
    }

    #[test]
    fn test_rejects_wrong_length_and_non_digits() {
        assert!(!validate(""));
        assert!(!validate("400000000000002"));
        assert!(!validate("40000000000000020"));
        assert!(!validate("40000000000000a2"));
        assert!(!validate("4000 00000000002"));
        assert!(!validate("４000000000000002"));
    }

    #[test]
    fn test_single_digit_errors_are_detected() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut flips = 0usize;
        let mut detected = 0usize;

        for _ in 0..200 {
            let number = generate(&mut rng);
            let bytes = number.as_bytes();
            for pos in 0..CARD_NUMBER_LEN {
                for replacement in b'0'..=b'9' {
                    if replacement == bytes[pos] {
                        continue;
                    }
                    let mut altered = bytes.to_vec();
                    altered[pos] = replacement;
                    let altered = String::from_utf8(altered).unwrap();
                    flips += 1;
                    if !validate(&altered) {
                        detected += 1;
                    }
                }
            }
        }

        assert!(
            detected * 10 >= flips * 9,
            "only {} of {} single-digit errors detected",
            detected,
            flips
        );
    }

    #[test]
    fn test_pin_format() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let pin = generate_pin(&mut rng);
            assert_eq!(pin.len(), PIN_LEN);
            assert!(pin.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        assert_eq!(generate(&mut a), generate(&mut b));
        assert_eq!(generate_pin(&mut a), generate_pin(&mut b));
    }
}
