use std::path::Path;

use colored::Colorize;
use indicatif::ProgressBar;

use super::Fetcher;

/// Canonical "view" URL of a license file: `<repository>/blob/master/<file name>`.
pub fn license_link(repository: &str, license_file: &Path) -> Option<String> {
    let file_name = license_file.file_name()?.to_string_lossy();
    Some(format!(
        "{}/blob/master/{}",
        repository.trim_end_matches('/'),
        file_name
    ))
}

/// Confirms that a package's license file is reachable online.
///
/// One probe per package, no retries. Failures are reported on the progress
/// bar and yield `None`.
pub struct LinkVerifier<'a, F: Fetcher + ?Sized> {
    fetcher: &'a F,
    progress: ProgressBar,
}

impl<'a, F: Fetcher + ?Sized> LinkVerifier<'a, F> {
    pub fn new(fetcher: &'a F, progress: ProgressBar) -> Self {
        Self { fetcher, progress }
    }

    pub async fn verify(
        &self,
        name: &str,
        repository: Option<&str>,
        license_file: Option<&Path>,
    ) -> Option<String> {
        let link = license_link(repository?, license_file?)?;

        let reachable = match self.fetcher.exists(&link).await {
            Ok(ok) => ok,
            Err(e) => {
                tracing::debug!(package = name, %link, error = %e, "link probe failed");
                false
            }
        };
        self.progress.inc(1);

        if reachable {
            Some(link)
        } else {
            self.progress.println(format!(
                "{} {}",
                "Could not resolve license file at the following location:".yellow(),
                link
            ));
            None
        }
    }

    pub fn finish(&self) {
        self.progress.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::stub::StubFetcher;

    #[test]
    fn test_link_uses_basename() {
        assert_eq!(
            license_link("https://github.com/u/p", Path::new("/deep/node_modules/p/LICENSE.md")),
            Some("https://github.com/u/p/blob/master/LICENSE.md".to_string())
        );
    }

    #[tokio::test]
    async fn test_verify_success_and_failure() {
        let fetcher = StubFetcher::default()
            .with_page("https://github.com/u/ok/blob/master/LICENSE", "<html>");
        let verifier = LinkVerifier::new(&fetcher, ProgressBar::hidden());

        let ok = verifier
            .verify("ok", Some("https://github.com/u/ok"), Some(Path::new("/x/LICENSE")))
            .await;
        assert_eq!(ok.as_deref(), Some("https://github.com/u/ok/blob/master/LICENSE"));

        let bad = verifier
            .verify("bad", Some("https://github.com/u/bad"), Some(Path::new("/x/LICENSE")))
            .await;
        assert_eq!(bad, None);
    }

    #[tokio::test]
    async fn test_verify_needs_repository_and_file() {
        let fetcher = StubFetcher::default();
        let verifier = LinkVerifier::new(&fetcher, ProgressBar::hidden());
        assert_eq!(verifier.verify("p", None, Some(Path::new("/x/LICENSE"))).await, None);
        assert_eq!(verifier.verify("p", Some("https://github.com/u/p"), None).await, None);
        assert!(fetcher.requested().is_empty());
    }
}
