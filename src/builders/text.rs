use std::path::PathBuf;

use super::{LicenseBuilder, OutputTarget};
use crate::error::{write_artifact, GenResult};
use crate::license::text::format_license_text;
use crate::models::{LicenseTypes, ResolvedLicense};

pub const FILE_NAME: &str = "licenses.txt";

const RULE: &str = "=====================================================";

/// Flat text stream: a banner per package followed by its license text.
#[derive(Debug, Default)]
pub struct TextBuilder {
    output: String,
}

impl TextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn output(&self) -> &str {
        &self.output
    }

    fn push_package(&mut self, name: &str, version: &str, text: &str) {
        self.output.push_str(&package_header(name, version));
        self.output.push_str(&format_license_text(text));
        self.output.push_str("\n\n");
    }
}

fn package_header(name: &str, version: &str) -> String {
    format!("{RULE}\n{name}@{version}\n{RULE}\n")
}

impl LicenseBuilder for TextBuilder {
    fn add(&mut self, license: &ResolvedLicense) {
        self.push_package(&license.name, &license.version, &license.text);
    }

    fn add_cached(&mut self, name: &str, version: &str, text: &str, _types: Option<&LicenseTypes>) {
        self.push_package(name, version, text);
    }

    fn write(&self, target: &OutputTarget) -> GenResult<PathBuf> {
        write_artifact(target.path(FILE_NAME), &self.output)
    }
}
