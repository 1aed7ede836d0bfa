//! Aggregate statistics over the full registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{citizen::CitizenRecord, province::Province};

/// Read-only aggregate derived from the loaded collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
  pub total_count:             usize,
  pub distinct_province_count: usize,
  /// Registrations per province; provinces with none are absent.
  pub by_province:             BTreeMap<Province, usize>,
}

impl RegistryStats {
  pub fn from_records(records: &[CitizenRecord]) -> Self {
    let mut by_province = BTreeMap::new();
    for record in records {
      *by_province.entry(record.province).or_insert(0) += 1;
    }
    Self {
      total_count: records.len(),
      distinct_province_count: by_province.len(),
      by_province,
    }
  }
}
