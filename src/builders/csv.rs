use std::path::PathBuf;

use super::{LicenseBuilder, OutputTarget};
use crate::error::{write_artifact, GenResult};
use crate::models::{LicenseTypes, ResolvedLicense};

/// Spreadsheet applications reject cells longer than this many characters.
pub const CELL_LIMIT: usize = 31_000;

const HEADERS: [&str; 4] = ["name", "version", "licenses", "text"];

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub name: String,
    pub version: String,
    pub licenses: String,
    pub text: String,
}

/// One row per package; text over [`CELL_LIMIT`] continues on
/// `"<name> (continued)"` rows with empty version and license columns.
#[derive(Debug, Default)]
pub struct CsvBuilder {
    rows: Vec<Row>,
}

impl CsvBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    fn push(&mut self, name: &str, version: &str, licenses: String, text: &str) {
        let mut chunks = split_cells(text).into_iter();
        let first = chunks.next().unwrap_or_default();

        self.rows.push(Row {
            name: name.to_string(),
            version: version.to_string(),
            licenses,
            text: first,
        });

        for chunk in chunks {
            self.rows.push(Row {
                name: format!("{} (continued)", name),
                version: String::new(),
                licenses: String::new(),
                text: chunk,
            });
        }
    }

    pub fn to_csv(&self) -> String {
        let mut out = HEADERS.join(",");
        out.push('\n');
        for row in &self.rows {
            let fields = [&row.name, &row.version, &row.licenses, &row.text];
            let line: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out
    }
}

/// Split on character (not byte) boundaries into chunks of at most [`CELL_LIMIT`].
fn split_cells(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(CELL_LIMIT)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

impl LicenseBuilder for CsvBuilder {
    fn add(&mut self, license: &ResolvedLicense) {
        let licenses = license
            .types
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        self.push(&license.name, &license.version, licenses, &license.text);
    }

    fn add_cached(&mut self, name: &str, version: &str, text: &str, types: Option<&LicenseTypes>) {
        let licenses = types.map(ToString::to_string).unwrap_or_default();
        self.push(name, version, licenses, text);
    }

    fn write(&self, target: &OutputTarget) -> GenResult<PathBuf> {
        write_artifact(target.path(&format!("{}.csv", target.name)), &self.to_csv())
    }
}
