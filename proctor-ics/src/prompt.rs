use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Names of the `.xlsx` workbooks in `dir`, sorted.
pub fn list_schedules(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx")))
        .filter_map(|path| path.file_name()?.to_str().map(str::to_string))
        .collect::<Vec<_>>();

    names.sort();
    Ok(names)
}

/// Asks for a 1-based choice until a valid one is entered.
pub fn prompt_for_file<R: BufRead, W: Write>(
    files: &[String],
    mut input: R,
    mut output: W,
) -> AppResult<String> {
    if files.is_empty() {
        return Err(AppError::Prompt("no schedules to choose from".to_string()));
    }

    writeln!(output, "Select a file to convert to ICS:")?;
    for (idx, file) in files.iter().enumerate() {
        writeln!(output, "{}. {}", idx + 1, file)?;
    }

    let mut line = String::new();
    loop {
        write!(output, "Enter the number of the file: ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(AppError::Prompt("input closed".to_string()));
        }

        match line.trim().parse::<usize>() {
            Ok(choice) if (1..=files.len()).contains(&choice) => {
                return Ok(files[choice - 1].clone());
            }
            Ok(_) => writeln!(output, "Invalid number. Try again.")?,
            Err(_) => writeln!(output, "Please enter a valid number.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files() -> Vec<String> {
        vec!["april.xlsx".to_string(), "june.xlsx".to_string()]
    }

    #[test]
    fn picks_numbered_file() {
        let mut out = Vec::new();
        let choice = prompt_for_file(&files(), "2\n".as_bytes(), &mut out).unwrap();

        assert_eq!(choice, "june.xlsx");
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("1. april.xlsx\n2. june.xlsx\n"));
    }

    #[test]
    fn retries_until_valid() {
        let mut out = Vec::new();
        let choice = prompt_for_file(&files(), "abc\n7\n1\n".as_bytes(), &mut out).unwrap();

        assert_eq!(choice, "april.xlsx");
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Please enter a valid number."));
        assert!(shown.contains("Invalid number. Try again."));
    }

    #[test]
    fn closed_input_is_an_error() {
        let result = prompt_for_file(&files(), "".as_bytes(), Vec::new());
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn lists_only_workbooks() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.xlsx", "a.xlsx", "notes.txt", "index.htm"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        assert_eq!(list_schedules(dir.path()).unwrap(), ["a.xlsx", "b.xlsx"]);
    }
}
