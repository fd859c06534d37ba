use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use proctor_schedule::ics::{Audience, IcsFile};
use tempfile::NamedTempFile;

use crate::error::AppResult;

/// Target directories for the two kinds of calendar.
#[derive(Debug, Clone)]
pub struct OutputDirs {
    pub aggregate: PathBuf,
    pub per_proctor: PathBuf,
}

/// Writes `contents` next to its final location and renames it into place,
/// so a failed run never leaves a truncated file behind.
pub fn write_atomic(dir: &Path, file_name: &str, contents: &[u8]) -> AppResult<PathBuf> {
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;

    let path = dir.join(file_name);
    tmp.persist(&path)?;

    Ok(path)
}

pub fn write_calendars(files: &[IcsFile], dirs: &OutputDirs) -> AppResult<Vec<PathBuf>> {
    files
        .iter()
        .map(|file| -> AppResult<PathBuf> {
            let dir = match file.audience {
                Audience::Everyone => &dirs.aggregate,
                Audience::Proctor(_) => &dirs.per_proctor,
            };

            let path = write_atomic(dir, &file.file_name, file.contents.as_bytes())?;
            tracing::debug!(path = %path.display(), "wrote calendar");
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cal.ics"), "old").unwrap();

        let path = write_atomic(dir.path(), "cal.ics", b"new").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn routes_by_audience() {
        let root = tempfile::tempdir().unwrap();
        let dirs = OutputDirs {
            aggregate: root.path().join("interim"),
            per_proctor: root.path().join("processed"),
        };
        let files = [
            IcsFile {
                audience: Audience::Everyone,
                file_name: "2024-07_proctoring.ics".to_string(),
                contents: "all".to_string(),
            },
            IcsFile {
                audience: Audience::Proctor("Alice".to_string()),
                file_name: "2024-07_Alice_proctoring.ics".to_string(),
                contents: "alice".to_string(),
            },
        ];

        write_calendars(&files, &dirs).unwrap();

        assert!(dirs.aggregate.join("2024-07_proctoring.ics").is_file());
        assert!(dirs.per_proctor.join("2024-07_Alice_proctoring.ics").is_file());
    }
}
