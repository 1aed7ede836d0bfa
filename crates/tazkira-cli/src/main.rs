//! `tazkira` — command-line client for the Tazkira registry.
//!
//! # Usage
//!
//! ```
//! tazkira register --name "Ahmad Shah" --father Mohammad --province Kabul \
//!   --dob 1990-03-21 --photo face.jpg
//! tazkira verify 43-1990-123456
//! tazkira --admin-secret s3cret stats
//! tazkira generate --province Herat --year 1985
//! ```

mod client;
mod render;

use std::{
  io::Write as _,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig, PhotoPayload, RegisterRequest};
use serde::Deserialize;
use tazkira_core::{
  citizen::{Gender, NationalId},
  id::{IdFormat, IdGenerator},
  province::Province,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:8080";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "tazkira", about = "Command-line client for the Tazkira registry")]
struct Args {
  /// Path to a TOML config file (url, admin_secret).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the tazkira server (default: http://localhost:8080).
  #[arg(long, env = "TAZKIRA_URL")]
  url: Option<String>,

  /// Secret for the admin endpoints.
  #[arg(long, env = "TAZKIRA_ADMIN_SECRET", hide_env_values = true)]
  admin_secret: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Register a citizen and print the issued card.
  Register(RegisterArgs),
  /// Look up a national identifier.
  Verify { id: String },
  /// Registry totals (admin).
  Stats,
  /// Every stored record (admin).
  List,
  /// Download the record table as CSV (admin).
  Export {
    /// Write to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
  },
  /// Print the province table with identifier codes.
  Provinces,
  /// Mint an identifier locally without registering anyone.
  Generate {
    #[arg(long)]
    province: Province,
    #[arg(long)]
    year:     i32,
    /// Produce a 12-digit numeric identifier instead.
    #[arg(long)]
    numeric:  bool,
    /// Width of the random suffix for provincial identifiers.
    #[arg(long, default_value_t = 6)]
    digits:   u32,
  },
}

#[derive(clap::Args, Debug)]
struct RegisterArgs {
  #[arg(long)]
  name:        String,
  #[arg(long)]
  father:      String,
  #[arg(long)]
  grandfather: Option<String>,
  #[arg(long)]
  province:    Province,
  /// Date of birth, `YYYY-MM-DD`.
  #[arg(long)]
  dob:         NaiveDate,
  #[arg(long)]
  gender:      Option<Gender>,
  /// Image file to upload as the citizen's photo.
  #[arg(long, value_name = "FILE", required_unless_present = "marker")]
  photo:       Option<PathBuf>,
  /// Record a photo marker instead of uploading image bytes.
  #[arg(long, conflicts_with = "photo")]
  marker:      bool,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
struct ConfigFile {
  #[serde(default)]
  url:          String,
  #[serde(default)]
  admin_secret: String,
}

impl ConfigFile {
  fn read(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")
  }
}

/// CLI flags override the config file, which overrides defaults.
fn resolve_config(
  url: Option<String>,
  admin_secret: Option<String>,
  file_cfg: ConfigFile,
) -> ApiConfig {
  ApiConfig {
    base_url:     url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
    admin_secret: admin_secret
      .or_else(|| (!file_cfg.admin_secret.is_empty()).then(|| file_cfg.admin_secret.clone()))
      .unwrap_or_default(),
  }
}

/// True when `id` has the shape of any identifier the registry can issue.
fn looks_like_national_id(id: &str) -> bool {
  let id = NationalId::new(id);
  [
    IdFormat::Provincial { suffix_digits: 6 },
    IdFormat::Provincial { suffix_digits: 5 },
    IdFormat::Numeric,
  ]
  .into_iter()
  .any(|format| id.matches_format(format))
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg = match &args.config {
    Some(path) => ConfigFile::read(path)?,
    None => ConfigFile::default(),
  };
  let api_config = resolve_config(args.url, args.admin_secret, file_cfg);

  match args.command {
    Command::Register(reg) => {
      let photo = match (&reg.photo, reg.marker) {
        (Some(path), _) => PhotoPayload::from_file(path)?,
        (None, true) => PhotoPayload::Marker,
        (None, false) => bail!("either --photo or --marker is required"),
      };
      let request = RegisterRequest {
        full_name: reg.name,
        father_name: reg.father,
        grandfather_name: reg.grandfather,
        province: reg.province,
        date_of_birth: reg.dob,
        gender: reg.gender,
        photo,
      };
      let record = ApiClient::new(api_config)?.register(&request).await?;
      print!("{}", render::card(&record));
    }
    Command::Verify { id } => {
      let id = id.trim();
      if !looks_like_national_id(id) {
        tracing::warn!(id, "identifier does not match any issued format");
      }
      match ApiClient::new(api_config)?.verify(id).await? {
        Some(v) => print!("{}", render::verification(&v)),
        None => bail!("national id {id} is not registered"),
      }
    }
    Command::Stats => {
      let stats = ApiClient::new(api_config)?.stats().await?;
      print!("{}", render::stats(&stats));
    }
    Command::List => {
      let records = ApiClient::new(api_config)?.list().await?;
      print!("{}", render::table(&records));
    }
    Command::Export { output } => {
      let bytes = ApiClient::new(api_config)?.export().await?;
      match output {
        Some(path) => {
          std::fs::write(&path, &bytes)
            .with_context(|| format!("writing {}", path.display()))?;
          eprintln!("wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => std::io::stdout()
          .write_all(&bytes)
          .context("writing export to stdout")?,
      }
    }
    Command::Provinces => {
      for province in Province::all() {
        println!("{:02}  {province}", province.code());
      }
    }
    Command::Generate { province, year, numeric, digits } => {
      let format = if numeric {
        IdFormat::Numeric
      } else {
        IdFormat::Provincial { suffix_digits: digits }
      };
      let id = IdGenerator::new(format)?.generate(province, year)?;
      println!("{id}");
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn flags_override_file_which_overrides_defaults() {
    let cfg = resolve_config(None, None, ConfigFile::default());
    assert_eq!(cfg.base_url, DEFAULT_URL);
    assert_eq!(cfg.admin_secret, "");

    let file = ConfigFile {
      url:          "http://registry:9000".into(),
      admin_secret: "from-file".into(),
    };
    let cfg = resolve_config(None, Some("from-flag".into()), file);
    assert_eq!(cfg.base_url, "http://registry:9000");
    assert_eq!(cfg.admin_secret, "from-flag");
  }

  #[test]
  fn config_file_fields_are_optional() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cli.toml");
    std::fs::write(&path, "url = \"http://x:1\"\n").unwrap();
    let cfg = ConfigFile::read(&path).unwrap();
    assert_eq!(cfg.url, "http://x:1");
    assert!(cfg.admin_secret.is_empty());
  }

  #[test]
  fn recognises_issued_shapes() {
    assert!(looks_like_national_id("43-1990-123456"));
    assert!(looks_like_national_id("43-1990-12345"));
    assert!(looks_like_national_id("123456789012"));
    assert!(!looks_like_national_id("hello"));
  }

  #[test]
  fn register_requires_photo_or_marker() {
    let base = [
      "tazkira", "register", "--name", "A", "--father", "B", "--province", "kabul",
      "--dob", "1990-03-21",
    ];
    assert!(Args::try_parse_from(base).is_err());

    let with_marker = base.iter().copied().chain(["--marker"]);
    let args = Args::try_parse_from(with_marker).unwrap();
    let Command::Register(reg) = args.command else {
      panic!("expected register");
    };
    assert!(reg.marker);
    assert_eq!(reg.province, Province::Kabul);
  }
}
