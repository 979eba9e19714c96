/// Canonicalize raw license text: strip carriage returns and surrounding whitespace.
pub fn format_license_text(text: &str) -> String {
    text.replace('\r', "").trim().to_string()
}
