use std::env;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::process;

use getopts::Options;
use proctor_schedule::normalize::DEFAULT_START_OFFSET_MINUTES;
use proctor_schedule::sheet::DEFAULT_HEADER_ROW;

/// An event may start at most a day before its exam.
const START_OFFSET_RANGE: RangeInclusive<i64> = 0..=1440;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub schedule: Option<PathBuf>,
    pub start_offset: i64,
    pub data_dir: Option<PathBuf>,
    pub header_row: usize,
    pub extract_abbreviations: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help(String),
    Run(Args),
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "s",
        "schedule",
        "Schedule workbook to convert; bare names are looked up in <data-dir>/raw [Default: prompt]",
        "FILE",
    );
    opts.optopt(
        "o",
        "start-offset",
        "Minutes (0-1440) to subtract from each exam start for the event start [Default: 30]",
        "MINUTES",
    );
    opts.optopt(
        "d",
        "data-dir",
        "Root of the raw/interim/processed data directories [Default: $PROCTOR_DATA_DIR or data]",
        "DIR",
    );
    opts.optopt(
        "r",
        "header-row",
        "Zero-based worksheet row holding the column names [Default: 2]",
        "ROW",
    );
    opts.optopt(
        "x",
        "extract-abbreviations",
        "Build the building abbreviation table from a saved campus index page and exit",
        "HTML",
    );
    opts
}

pub fn usage() -> String {
    let opts = opts();
    opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME")))
}

/// Parses arguments, not including the program name.
pub fn try_parse<I: IntoIterator<Item = String>>(args: I) -> Result<Command, String> {
    let matches = opts().parse(args).map_err(|fail| fail.to_string())?;

    if matches.opt_present("help") {
        return Ok(Command::Help(usage()));
    }

    let start_offset = matches
        .opt_get_default("start-offset", DEFAULT_START_OFFSET_MINUTES)
        .map_err(|err| format!("Provided value for option 'start-offset' is invalid: {err}"))?;
    if !START_OFFSET_RANGE.contains(&start_offset) {
        return Err(format!(
            "Provided value for option 'start-offset' is invalid: expected {} to {} minutes",
            START_OFFSET_RANGE.start(),
            START_OFFSET_RANGE.end()
        ));
    }

    let header_row = matches
        .opt_get_default("header-row", DEFAULT_HEADER_ROW)
        .map_err(|err| format!("Provided value for option 'header-row' is invalid: {err}"))?;

    Ok(Command::Run(Args {
        schedule: matches.opt_str("schedule").map(PathBuf::from),
        start_offset,
        data_dir: matches.opt_str("data-dir").map(PathBuf::from),
        header_row,
        extract_abbreviations: matches.opt_str("extract-abbreviations").map(PathBuf::from),
    }))
}

pub fn parse(args: Vec<String>) -> Args {
    match try_parse(args) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help(usage)) => {
            println!("{usage}");
            process::exit(0);
        }
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults() {
        let Command::Run(parsed) = try_parse(args(&[])).unwrap() else {
            panic!("expected run");
        };

        assert_eq!(parsed.schedule, None);
        assert_eq!(parsed.start_offset, 30);
        assert_eq!(parsed.header_row, 2);
        assert_eq!(parsed.data_dir, None);
    }

    #[test]
    fn reads_options() {
        let argv = args(&["--schedule", "june.xlsx", "-o", "45", "--data-dir", "/tmp/d"]);
        let Command::Run(parsed) = try_parse(argv).unwrap() else {
            panic!("expected run");
        };

        assert_eq!(parsed.schedule, Some(PathBuf::from("june.xlsx")));
        assert_eq!(parsed.start_offset, 45);
        assert_eq!(parsed.data_dir, Some(PathBuf::from("/tmp/d")));
    }

    #[test]
    fn rejects_non_numeric_offset() {
        let err = try_parse(args(&["--start-offset", "half an hour"])).unwrap_err();
        assert!(err.contains("start-offset"));
    }

    #[test]
    fn rejects_offset_outside_a_day() {
        for value in ["--start-offset=-5", "--start-offset=1441", "--start-offset=999999999999"] {
            let err = try_parse(args(&[value])).unwrap_err();
            assert!(err.contains("start-offset"), "{value}: {err}");
        }
        assert!(try_parse(args(&["-o", "1440"])).is_ok());
    }

    #[test]
    fn help_returns_usage() {
        assert!(matches!(
            try_parse(args(&["-h"])),
            Ok(Command::Help(text)) if text.contains("--schedule")
        ));
    }
}
