use crate::models::LicenseTypes;

/// Marker appended to README-inferred license types: heuristic, not authoritative.
pub const INFERRED_MARKER: &str = "**";

/// License section isolated from a README.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadmeLicense {
    pub text: String,
    pub types: String,
}

/// Isolate the license section of a README and guess its license family.
///
/// The section starts at the first case-insensitive occurrence of `license`
/// and runs to the end of the document. Families are checked in order
/// (MIT, CC0, BSD-3-Clause, BSD-2-Clause, ISC) and the first match wins;
/// BSD-3 text also contains the BSD-2 binary-form clause, so a BSD-3 match
/// suppresses BSD-2. With no match the declared license is used instead.
pub fn extract(declared: Option<&LicenseTypes>, readme: &str) -> ReadmeLicense {
    // ASCII lowercasing keeps byte offsets aligned with the original text.
    let text = readme
        .to_ascii_lowercase()
        .find("license")
        .map(|idx| readme[idx..].trim().to_string())
        .unwrap_or_default();

    let inferred = classify(&text)
        .map(str::to_string)
        .or_else(|| declared.filter(|d| !d.is_empty()).map(|d| d.to_string()))
        .unwrap_or_default();

    ReadmeLicense {
        text,
        types: format!("{}{}", inferred, INFERRED_MARKER),
    }
}

fn classify(text: &str) -> Option<&'static str> {
    let bsd3 = text.contains("name of the copyright holder")
        || text.contains("names of its contributors");
    let bsd2 = !bsd3 && text.contains("binary form must reproduce the above copyright notice");

    let families = [
        ("MIT", text.contains("MIT")),
        ("CC0", text.contains("CC0")),
        ("BSD-3-Clause", bsd3),
        ("BSD-2-Clause", bsd2),
        (
            "ISC",
            text.contains("SOFTWARE INCLUDING ALL IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS"),
        ),
    ];

    families
        .into_iter()
        .find(|(_, matched)| *matched)
        .map(|(family, _)| family)
}
