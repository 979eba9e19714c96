use colored::Colorize;

use crate::builders::json::PackageEntry;

/// Packages whose license data is incomplete.
#[derive(Debug, Default, PartialEq)]
pub struct MissingReport {
    /// No license text at all.
    pub empties: Vec<String>,
    /// Text present but no verified online link.
    pub missing_repos: Vec<String>,
}

/// Classify every package of the JSON builder's state.
pub fn audit(packages: &[(String, PackageEntry)]) -> MissingReport {
    let mut report = MissingReport::default();
    for (name, entry) in packages {
        if entry.is_empty() {
            report.empties.push(name.clone());
        } else if entry.repository.is_none() {
            report.missing_repos.push(name.clone());
        }
    }
    report
}

impl MissingReport {
    /// Print both groups. Missing links are only meaningful once links were checked.
    pub fn print(&self, links_checked: bool) {
        if links_checked && !self.missing_repos.is_empty() {
            eprintln!(
                "{}\n  {}",
                "The following packages did not have a verifiable online LICENSE link:".yellow(),
                self.missing_repos.join("\n  ").yellow()
            );
        }
        if !self.empties.is_empty() {
            eprintln!(
                "{}\n  {}",
                "The following packages appear to have no license data:".red(),
                self.empties.join("\n  ").red()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str, repository: Option<&str>) -> PackageEntry {
        PackageEntry {
            versions: vec![("1.0.0".to_string(), text.to_string())],
            types: None,
            repository: repository.map(str::to_string),
        }
    }

    #[test]
    fn test_classification() {
        let packages = vec![
            ("complete".to_string(), entry("MIT", Some("https://l"))),
            ("unlinked".to_string(), entry("MIT", None)),
            ("empty".to_string(), entry("", None)),
            ("empty-linked".to_string(), entry("", Some("https://l"))),
        ];
        assert_eq!(
            audit(&packages),
            MissingReport {
                empties: vec!["empty".into(), "empty-linked".into()],
                missing_repos: vec!["unlinked".into()],
            }
        );
    }

    #[test]
    fn test_any_version_text_counts() {
        let mut pkg = entry("", None);
        pkg.versions.push(("2.0.0".into(), "text".into()));
        let report = audit(&[("multi".to_string(), pkg)]);
        assert!(report.empties.is_empty());
        assert_eq!(report.missing_repos, vec!["multi".to_string()]);
    }
}
