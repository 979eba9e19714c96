use std::path::PathBuf;

use super::{LicenseBuilder, OutputTarget};
use crate::error::{write_artifact, GenResult};
use crate::license::text::format_license_text;
use crate::models::{LicenseTypes, ResolvedLicense};

#[derive(Debug)]
struct Entry {
    name: String,
    version: String,
    text: String,
}

/// Single HTML page: an index of links followed by one anchored section per package.
#[derive(Debug, Default)]
pub struct HtmlBuilder {
    entries: Vec<Entry>,
}

impl HtmlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self) -> String {
        let mut html = String::from("<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body>");

        html.push_str("<div>");
        for e in &self.entries {
            html.push_str(&format!(
                "<div><a href='#{}'>{} {}</a></div>",
                escape(&e.name),
                escape(&e.name),
                escape(&e.version)
            ));
        }
        html.push_str("</div>");

        html.push_str("<div>");
        for e in &self.entries {
            html.push_str(&format!(
                "<div style=\"margin-bottom: 20px\"><div><a id='{}'>{} {}</a></div>\
                 <div style=\"white-space: pre-wrap\">{}</div></div>",
                escape(&e.name),
                escape(&e.name),
                escape(&e.version),
                escape(&e.text)
            ));
        }
        html.push_str("</div>");

        html.push_str("</body></html>");
        html
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl LicenseBuilder for HtmlBuilder {
    fn add(&mut self, license: &ResolvedLicense) {
        self.add_cached(&license.name, &license.version, &license.text, None);
    }

    fn add_cached(&mut self, name: &str, version: &str, text: &str, _types: Option<&LicenseTypes>) {
        self.entries.push(Entry {
            name: name.to_string(),
            version: version.to_string(),
            text: format_license_text(text),
        });
    }

    fn write(&self, target: &OutputTarget) -> GenResult<PathBuf> {
        write_artifact(target.path(&format!("{}.html", target.name)), &self.render())
    }
}
