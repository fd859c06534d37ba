//! Building abbreviation lookup used to expand room codes in descriptions.

use std::io;
use std::path::Path;

use crate::{BuildingAbbreviation, Result};

/// Abbreviations ordered longest code first.
///
/// Built once per run and passed by reference into the event builder.
#[derive(Debug, Clone, Default)]
pub struct Abbreviations {
    entries: Vec<BuildingAbbreviation>,
}

impl BuildingAbbreviation {
    /// Text that replaces the code: `"<name>: <address>"`, or just the name
    /// when no address is known.
    pub fn replacement(&self) -> String {
        if self.address.is_empty() {
            self.name.clone()
        } else {
            format!("{}: {}", self.name, self.address)
        }
    }
}

impl Abbreviations {
    pub fn new(entries: impl IntoIterator<Item = BuildingAbbreviation>) -> Self {
        let mut entries = entries
            .into_iter()
            .filter(|entry| !entry.code.is_empty())
            .collect::<Vec<_>>();

        // Stable, so equally long codes keep their file order.
        entries.sort_by(|a, b| b.code.chars().count().cmp(&a.code.chars().count()));

        Self { entries }
    }

    /// Reads a CSV with `Abbreviation,Building,Address` columns.
    pub fn from_csv<R: io::Read>(reader: R) -> Result<Self> {
        let entries = csv::Reader::from_reader(reader)
            .deserialize()
            .collect::<std::result::Result<Vec<BuildingAbbreviation>, _>>()?;

        Ok(Self::new(entries))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let entries = csv::Reader::from_path(path)?
            .deserialize()
            .collect::<std::result::Result<Vec<BuildingAbbreviation>, _>>()?;

        tracing::debug!(count = entries.len(), "loaded building abbreviations");
        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[BuildingAbbreviation] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces every known code in `text` with its building name.
    ///
    /// The scan is a single left-to-right pass: at each position the longest
    /// matching code wins, and replaced text is never rescanned. Unknown
    /// codes are left as they are.
    pub fn substitute(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(ch) = rest.chars().next() {
            match self.entries.iter().find(|entry| rest.starts_with(&entry.code)) {
                Some(entry) => {
                    out.push_str(&entry.replacement());
                    rest = &rest[entry.code.len()..];
                }
                None => {
                    out.push(ch);
                    rest = &rest[ch.len_utf8()..];
                }
            }
        }

        out
    }
}

/// Writes entries back out in the same CSV layout [`Abbreviations::from_csv`] reads.
pub fn write_csv<W: io::Write>(writer: W, entries: &[BuildingAbbreviation]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for entry in entries {
        writer.serialize(entry)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(feature = "html")]
mod html {
    use once_cell::sync::Lazy;
    use scraper::{ElementRef, Html, Node, Selector};

    use crate::BuildingAbbreviation;

    macro_rules! selector {
        ($query:expr) => {{
            static SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse($query).unwrap());
            &SELECTOR
        }};
    }

    /// Extracts every building from the campus building index page.
    pub fn parse_building_index<S: AsRef<str>>(html: S) -> Vec<BuildingAbbreviation> {
        let html = Html::parse_document(html.as_ref());

        html.select(selector!("div.ui-accordion-content"))
            .filter_map(parse_entry)
            .collect()
    }

    fn parse_entry(entry: ElementRef) -> Option<BuildingAbbreviation> {
        let mut name = String::new();
        let mut code = String::new();

        if let Some(left) = entry.select(selector!("div.left-2column")).next() {
            for strong in left.select(selector!("strong")) {
                let label = strong.text().collect::<String>();
                let Some(Node::Text(value)) = strong.next_sibling().map(|node| node.value()) else {
                    continue;
                };

                if label.contains("Full Name:") {
                    name = value.trim().to_string();
                } else if label.contains("Abbreviation:") {
                    code = value.trim().to_string();
                }
            }
        }

        let address = entry
            .select(selector!("div.right-2column"))
            .next()
            .map(|right| {
                right
                    .text()
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
                    .replace("Mailing Address:", "")
                    .trim()
                    .to_string()
            })
            .unwrap_or_default();

        (!code.is_empty() || !name.is_empty()).then_some(BuildingAbbreviation {
            code,
            name,
            address,
        })
    }
}

#[cfg(feature = "html")]
pub use html::parse_building_index;
