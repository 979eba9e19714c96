use std::sync::OnceLock;

use regex::Regex;

use super::Fetcher;

/// Refs and file names probed when downloading, in order.
const REFS: [&str; 2] = ["master", "latest"];
const FILES: [&str; 2] = ["LICENSE", "LICENSE.md"];

fn repo_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"github\.com[/:]([^/\s]+)/([^/#?\s]+?)(?:\.git)?(?:[/#?].*)?$")
            .expect("static regex")
    })
}

/// Extract `(user, repo)` from any GitHub repository URL form.
pub fn parse_repository(url: &str) -> Option<(String, String)> {
    let caps = repo_re().captures(url.trim())?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Raw-file URLs tried for a repository, in probe order.
pub fn license_candidates(repository: &str) -> Vec<String> {
    let Some((user, repo)) = parse_repository(repository) else {
        return Vec::new();
    };

    REFS.iter()
        .flat_map(|r| {
            let (user, repo) = (&user, &repo);
            FILES.iter().map(move |f| {
                format!("https://raw.githubusercontent.com/{user}/{repo}/{r}/{f}")
            })
        })
        .collect()
}

/// Probe the candidates one at a time and return the first body found with its URL.
pub async fn download_license<F: Fetcher + ?Sized>(
    fetcher: &F,
    repository: &str,
) -> Option<(String, String)> {
    for url in license_candidates(repository) {
        match fetcher.get_text(&url).await {
            Ok(Some(body)) => return Some((url, body)),
            Ok(None) => {}
            Err(e) => tracing::debug!(%url, error = %e, "license download failed"),
        }
    }
    None
}
