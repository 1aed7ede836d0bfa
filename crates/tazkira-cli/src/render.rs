//! Plain-text rendering of API responses for the terminal.

use std::fmt::Write as _;

use tazkira_api::citizens::Verification;
use tazkira_core::{
  citizen::{CitizenRecord, PhotoRef},
  stats::RegistryStats,
};

/// The issued card shown after a successful registration.
pub fn card(record: &CitizenRecord) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "─── Tazkira ───────────────────────────────");
  let _ = writeln!(out, "National ID   {}", record.national_id);
  let _ = writeln!(out, "Name          {}", record.full_name);
  let _ = writeln!(out, "Father        {}", record.father_name);
  if let Some(grandfather) = &record.grandfather_name {
    let _ = writeln!(out, "Grandfather   {grandfather}");
  }
  let _ = writeln!(out, "Province      {}", record.province);
  let _ = writeln!(out, "Born          {}", record.date_of_birth);
  if let Some(gender) = record.gender {
    let _ = writeln!(out, "Gender        {gender}");
  }
  let _ = writeln!(out, "Photo         {}", photo(&record.photo));
  let _ = writeln!(
    out,
    "Registered    {}",
    record.registered_at.format("%Y-%m-%d %H:%M UTC")
  );
  out
}

pub fn verification(v: &Verification) -> String {
  format!(
    "{}  [{}]\n{} (father: {}), {}\n",
    v.national_id,
    v.status.to_uppercase(),
    v.full_name,
    v.father_name,
    v.province,
  )
}

pub fn stats(stats: &RegistryStats) -> String {
  let mut out = format!(
    "Registered citizens: {}\nProvinces covered:   {}\n",
    stats.total_count, stats.distinct_province_count
  );
  if !stats.by_province.is_empty() {
    out.push('\n');
    let width = stats
      .by_province
      .keys()
      .map(|p| p.as_ref().len())
      .max()
      .unwrap_or(0);
    for (province, count) in &stats.by_province {
      let _ = writeln!(out, "  {:<width$}  {count}", province.as_ref());
    }
  }
  out
}

/// One line per record, in storage order.
pub fn table(records: &[CitizenRecord]) -> String {
  let mut out = String::new();
  for r in records {
    let _ = writeln!(
      out,
      "{:<16} {:<24} {:<20} {:<12} {}",
      r.national_id.as_str(),
      r.full_name,
      r.father_name,
      r.province.as_ref(),
      r.date_of_birth,
    );
  }
  out
}

fn photo(photo: &PhotoRef) -> String {
  match photo {
    PhotoRef::Marker { label } => label.clone(),
    PhotoRef::File { path, content_hash } => {
      let short = content_hash.get(..12).unwrap_or(content_hash.as_str());
      format!("{path} (sha256 {short}…)")
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use chrono::{NaiveDate, TimeZone as _, Utc};
  use tazkira_core::{citizen::NationalId, province::Province};

  use super::*;

  fn record() -> CitizenRecord {
    CitizenRecord {
      national_id:      NationalId::new("43-1990-123456"),
      full_name:        "Ahmad Shah".into(),
      father_name:      "Mohammad".into(),
      grandfather_name: None,
      province:         Province::Kabul,
      date_of_birth:    NaiveDate::from_ymd_opt(1990, 3, 21).unwrap(),
      gender:           None,
      photo:            PhotoRef::marker(),
      registered_at:    Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
    }
  }

  #[test]
  fn card_omits_absent_optionals() {
    let text = card(&record());
    assert!(text.contains("43-1990-123456"));
    assert!(text.contains("biometric_data_secured"));
    assert!(!text.contains("Grandfather"));
    assert!(!text.contains("Gender"));
  }

  #[test]
  fn stats_lists_provinces() {
    let summary = RegistryStats {
      total_count:             3,
      distinct_province_count: 2,
      by_province:             BTreeMap::from([
        (Province::Kabul, 2),
        (Province::Herat, 1),
      ]),
    };
    let text = stats(&summary);
    assert!(text.contains("Registered citizens: 3"));
    assert!(text.contains("Kabul  2"));
  }
}
