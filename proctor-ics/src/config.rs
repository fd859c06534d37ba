use std::env;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "PROCTOR_DATA_DIR";
const DEFAULT_DATA_DIR: &str = "data";
pub const ABBREVIATIONS_FILE: &str = "building_abbreviations.csv";

/// Where inputs are looked up and calendars are written.
///
/// ```text
/// <data>/raw/        schedule workbooks, saved building index
/// <data>/interim/    building_abbreviations.csv, aggregate calendar
/// <data>/processed/  per-proctor calendars
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
}

impl Config {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The command-line value wins, then `PROCTOR_DATA_DIR`, then `./data`.
    pub fn resolve(cli_data_dir: Option<PathBuf>) -> Self {
        let data_dir = cli_data_dir.unwrap_or_else(|| {
            env::var(DATA_DIR_ENV).map_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from)
        });

        Self::new(data_dir)
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    pub fn interim_dir(&self) -> PathBuf {
        self.data_dir.join("interim")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir.join("processed")
    }

    pub fn abbreviations_path(&self) -> PathBuf {
        self.interim_dir().join(ABBREVIATIONS_FILE)
    }

    /// Paths that exist are used as-is; anything else is treated as a file
    /// name inside the raw directory.
    pub fn raw_path(&self, file: &Path) -> PathBuf {
        if file.exists() {
            file.to_path_buf()
        } else {
            self.raw_dir().join(file)
        }
    }
}
