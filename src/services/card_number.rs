use chrono::{DateTime, Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use thiserror::Error;

const CARD_NUMBER_DIGITS: usize = 16;

/// How long a freshly issued card stays valid.
const VALIDITY_DAYS: i64 = 365 * 4;

#[derive(Error, Debug)]
pub enum CardNumberError {
    #[error("system RNG unavailable")]
    Rng,
}

/// Generates a 16-digit card number with a valid Luhn check digit.
pub fn generate() -> Result<i64, CardNumberError> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; CARD_NUMBER_DIGITS - 2];
    rng.fill(&mut bytes).map_err(|_| CardNumberError::Rng)?;

    // Leading digit is fixed non-zero so the number always has 16 digits.
    let mut digits = [0u8; CARD_NUMBER_DIGITS];
    digits[0] = 4;
    for (i, byte) in bytes.iter().enumerate() {
        digits[i + 1] = byte % 10;
    }
    digits[CARD_NUMBER_DIGITS - 1] = luhn_check_digit(&digits[..CARD_NUMBER_DIGITS - 1]);

    let mut number: i64 = 0;
    for digit in digits {
        number = number * 10 + i64::from(digit);
    }

    Ok(number)
}

/// Expiration for a card issued now
pub fn expiration_date() -> DateTime<Utc> {
    Utc::now() + Duration::days(VALIDITY_DAYS)
}

/// Standard Luhn check digit over the payload digits (most significant first).
fn luhn_check_digit(payload: &[u8]) -> u8 {
    let sum: u32 = payload
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            let mut d = u32::from(d);
            if i % 2 == 0 {
                d *= 2;
                if d > 9 {
                    d -= 9;
                }
            }
            d
        })
        .sum();

    ((10 - (sum % 10)) % 10) as u8
}

/// Whether a full number (check digit included) passes the Luhn check.
pub fn is_luhn_valid(number: i64) -> bool {
    if number <= 0 {
        return false;
    }

    let digits: Vec<u8> = number
        .to_string()
        .bytes()
        .map(|b| b - b'0')
        .collect();
    let (payload, check) = digits.split_at(digits.len() - 1);

    luhn_check_digit(payload) == check[0]
}
