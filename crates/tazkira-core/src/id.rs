//! Identifier generation.
//!
//! Two formats are supported:
//!
//! - provincial: `{province_code:02}-{birth_year}-{suffix}`, e.g.
//!   `43-1990-837482`, with a uniformly random 5- or 6-digit suffix;
//! - numeric: twelve independently random decimal digits.
//!
//! There is no collision detection. Two calls may return the same
//! identifier and callers must not rely on uniqueness.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, citizen::NationalId, province::Province};

/// Length of identifiers in the numeric format.
pub const NUMERIC_ID_DIGITS: usize = 12;

/// The shape of minted identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdFormat {
  Provincial { suffix_digits: u32 },
  Numeric,
}

impl Default for IdFormat {
  fn default() -> Self { Self::Provincial { suffix_digits: 6 } }
}

/// Mints [`NationalId`]s in a fixed [`IdFormat`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IdGenerator {
  format: IdFormat,
}

impl IdGenerator {
  /// Returns an error for provincial formats whose suffix is not 5 or 6
  /// digits wide.
  pub fn new(format: IdFormat) -> Result<Self> {
    if let IdFormat::Provincial { suffix_digits } = format
      && !(5..=6).contains(&suffix_digits)
    {
      return Err(Error::SuffixWidth(suffix_digits));
    }
    Ok(Self { format })
  }

  pub fn format(&self) -> IdFormat { self.format }

  /// Mint an identifier using the thread-local RNG.
  pub fn generate(
    &self,
    province: Province,
    birth_year: i32,
  ) -> Result<NationalId> {
    self.generate_with(&mut rand::rng(), province, birth_year)
  }

  /// Mint an identifier from an explicit random source.
  ///
  /// The numeric format ignores `province` and `birth_year`.
  pub fn generate_with<R: Rng>(
    &self,
    rng: &mut R,
    province: Province,
    birth_year: i32,
  ) -> Result<NationalId> {
    match self.format {
      IdFormat::Provincial { suffix_digits } => {
        if !(1000..=9999).contains(&birth_year) {
          return Err(Error::BirthYearOutOfRange(birth_year));
        }
        let low = 10u32.pow(suffix_digits - 1);
        let high = 10u32.pow(suffix_digits) - 1;
        let suffix = rng.random_range(low..=high);
        Ok(NationalId::new(format!(
          "{:02}-{birth_year}-{suffix}",
          province.code()
        )))
      }
      IdFormat::Numeric => {
        let digits: String = (0..NUMERIC_ID_DIGITS)
          .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
          .collect();
        Ok(NationalId::new(digits))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use rand::{SeedableRng, rngs::StdRng};

  use super::*;

  #[test]
  fn provincial_id_has_documented_shape() {
    let generator = IdGenerator::default();
    let mut rng = StdRng::seed_from_u64(7);
    for p in Province::all() {
      let id = generator.generate_with(&mut rng, p, 1990).unwrap();
      assert!(id.matches_format(generator.format()), "{id}");
      let year = id.as_str().split('-').nth(1).unwrap();
      assert_eq!(year, "1990");
      assert!(id.as_str().starts_with(&format!("{:02}-", p.code())));
    }
  }

  #[test]
  fn kabul_prefix() {
    let id = IdGenerator::default()
      .generate(Province::Kabul, 2001)
      .unwrap();
    assert!(id.as_str().starts_with("43-2001-"), "{id}");
  }

  #[test]
  fn five_digit_suffix() {
    let generator =
      IdGenerator::new(IdFormat::Provincial { suffix_digits: 5 }).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..200 {
      let id = generator
        .generate_with(&mut rng, Province::Herat, 1975)
        .unwrap();
      assert!(id.matches_format(generator.format()), "{id}");
    }
  }

  #[test]
  fn numeric_ids_are_twelve_digits() {
    let generator = IdGenerator::new(IdFormat::Numeric).unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
      // The year is ignored, even when it would be rejected otherwise.
      let id = generator
        .generate_with(&mut rng, Province::Balkh, 12)
        .unwrap();
      assert_eq!(id.as_str().len(), NUMERIC_ID_DIGITS);
      assert!(id.matches_format(IdFormat::Numeric), "{id}");
    }
  }

  #[test]
  fn same_seed_same_identifier() {
    let generator = IdGenerator::default();
    let a = generator
      .generate_with(&mut StdRng::seed_from_u64(9), Province::Ghor, 1988)
      .unwrap();
    let b = generator
      .generate_with(&mut StdRng::seed_from_u64(9), Province::Ghor, 1988)
      .unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn rejects_non_four_digit_year() {
    let generator = IdGenerator::default();
    assert!(matches!(
      generator.generate(Province::Kabul, 999),
      Err(Error::BirthYearOutOfRange(999))
    ));
    assert!(matches!(
      generator.generate(Province::Kabul, 10_000),
      Err(Error::BirthYearOutOfRange(10_000))
    ));
  }

  #[test]
  fn rejects_bad_suffix_width() {
    assert!(matches!(
      IdGenerator::new(IdFormat::Provincial { suffix_digits: 7 }),
      Err(Error::SuffixWidth(7))
    ));
  }
}
