//! Account domain model

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::card_number;

/// A card account held by a customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// 16-digit card number, checksum-valid, never changes
    pub number: String,
    /// 4-digit PIN, never changes
    #[serde(skip_serializing, default)]
    pub pin: String,
    pub balance: Decimal,
}

impl Account {
    /// Issue a new account with a fresh card number, a fresh PIN and zero balance
    pub fn issue<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let number = card_number::generate(rng);
        let pin = card_number::generate_pin(rng);
        Self::new(number, pin, Decimal::new(0, 2))
    }

    /// Rebuild an account from stored fields
    pub fn new(number: impl Into<String>, pin: impl Into<String>, balance: Decimal) -> Self {
        Self {
            number: number.into(),
            pin: pin.into(),
            balance,
        }
    }

    /// Card number with everything but the last four digits hidden, safe for logs
    pub fn masked_number(&self) -> String {
        mask_number(&self.number)
    }

    /// Check a PIN against this account
    pub fn matches_pin(&self, pin: &str) -> bool {
        self.pin == pin
    }

    /// Validate account data
    pub fn validate(&self) -> Result<(), &'static str> {
        if !card_number::validate(&self.number) {
            return Err("card number fails checksum validation");
        }
        if self.pin.len() != card_number::PIN_LEN || !self.pin.bytes().all(|b| b.is_ascii_digit()) {
            return Err("PIN must be 4 digits");
        }
        Ok(())
    }
}

/// Hide all but the last four characters of a card number
pub fn mask_number(number: &str) -> String {
    let visible = number.len().saturating_sub(4);
    match number.get(visible..) {
        Some(tail) => format!("{}{}", "*".repeat(visible), tail),
        None => "*".repeat(number.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_issued_account_is_valid_and_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let account = Account::issue(&mut rng);
        assert!(account.validate().is_ok());
        assert_eq!(account.balance, Decimal::ZERO);
    }

    #[test]
    fn test_account_validation() {
        let mut account = Account::new("4000000000000002", "1234", Decimal::ZERO);
        assert!(account.validate().is_ok());

        account.pin = "12a4".to_string();
        assert!(account.validate().is_err());

        account.pin = "1234".to_string();
        account.number = "4000000000000001".to_string();
        assert!(account.validate().is_err());
    }

    #[test]
    fn test_masked_number() {
        let account = Account::new("4000000000000002", "1234", Decimal::ZERO);
        assert_eq!(account.masked_number(), "************0002");
        assert_eq!(mask_number("12"), "12");
    }

    #[test]
    fn test_pin_is_not_serialized() {
        let account = Account::new("4000000000000002", "1234", Decimal::new(1050, 2));
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("1234"));
        assert!(json.contains("4000000000000002"));
    }
}
