use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use walkdir::WalkDir;

use super::document::license_types;
use super::Scanner;
use crate::error::{GenError, GenResult};
use crate::fetch::github::parse_repository;
use crate::models::DependencyRecord;

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    license: Option<Value>,
    licenses: Option<Value>,
    repository: Option<Value>,
    #[serde(default)]
    dependencies: HashMap<String, Value>,
}

/// Walks `<root>/node_modules`, including scoped and nested installs.
pub struct NodeModulesScanner {
    root: PathBuf,
    production: bool,
}

struct Installed {
    dir: PathBuf,
    record: DependencyRecord,
    dependencies: Vec<String>,
}

impl NodeModulesScanner {
    pub fn new(root: impl Into<PathBuf>, production: bool) -> Self {
        Self {
            root: root.into(),
            production,
        }
    }

    fn installed(&self) -> GenResult<Vec<Installed>> {
        let modules = self.root.join("node_modules");
        if !modules.is_dir() {
            return Err(GenError::scan(
                &self.root,
                "no node_modules directory; install dependencies first or pass --input",
            ));
        }

        let mut packages = Vec::new();
        for entry in WalkDir::new(&modules).sort_by_file_name() {
            let entry = entry.map_err(|e| GenError::scan(&modules, e))?;
            if entry.file_name() != "package.json" {
                continue;
            }
            let Some(dir) = entry.path().parent() else {
                continue;
            };
            if !is_package_dir(dir) {
                continue;
            }
            match read_package(dir) {
                Ok(pkg) => packages.push(pkg),
                Err(e) => tracing::debug!(dir = %dir.display(), error = %e, "skipping package"),
            }
        }

        // Parents before their nested installs
        packages.sort_by(|a, b| a.dir.cmp(&b.dir));
        Ok(packages)
    }
}

impl Scanner for NodeModulesScanner {
    fn scan(&self) -> GenResult<Vec<DependencyRecord>> {
        let packages = self.installed()?;

        if !self.production {
            return Ok(packages.into_iter().map(|p| p.record).collect());
        }

        let root_manifest = self.root.join("package.json");
        let content = std::fs::read_to_string(&root_manifest)
            .map_err(|e| GenError::scan(&root_manifest, e))?;
        let root: PackageJson =
            serde_json::from_str(&content).map_err(|e| GenError::scan(&root_manifest, e))?;

        let reachable = reachable_from(&self.root, root.dependencies.keys().cloned(), &packages);
        Ok(packages
            .into_iter()
            .filter(|p| reachable.contains(&p.dir))
            .map(|p| p.record)
            .collect())
    }
}

/// `node_modules/<name>` or `node_modules/@scope/<name>`.
fn is_package_dir(dir: &Path) -> bool {
    let Some(parent) = dir.parent() else {
        return false;
    };
    if parent.file_name().is_some_and(|n| n == "node_modules") {
        return true;
    }
    let scoped = parent
        .file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('@'));
    scoped
        && parent
            .parent()
            .and_then(Path::file_name)
            .is_some_and(|n| n == "node_modules")
}

fn read_package(dir: &Path) -> Result<Installed, String> {
    let content = std::fs::read_to_string(dir.join("package.json")).map_err(|e| e.to_string())?;
    let pkg: PackageJson = serde_json::from_str(&content).map_err(|e| e.to_string())?;

    let name = pkg.name.ok_or("package.json has no name")?;
    let version = pkg.version.unwrap_or_default();
    let declared_license = pkg
        .license
        .as_ref()
        .or(pkg.licenses.as_ref())
        .and_then(license_types);
    let repository = pkg.repository.as_ref().and_then(repository_url);

    let mut dependencies: Vec<String> = pkg.dependencies.into_keys().collect();
    dependencies.sort();

    Ok(Installed {
        dir: dir.to_path_buf(),
        record: DependencyRecord {
            name,
            version,
            declared_license,
            license_file: find_license_file(dir),
            repository,
            raw_text: None,
        },
        dependencies,
    })
}

/// First `LICENSE*`/`LICENCE*`/`COPYING*` file, else the first `README*`.
fn find_license_file(dir: &Path) -> Option<PathBuf> {
    let mut files: Vec<(String, PathBuf)> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .map(|e| (e.file_name().to_string_lossy().to_lowercase(), e.path()))
        .collect();
    files.sort();

    let starts = |prefixes: &[&str]| {
        files
            .iter()
            .find(|(name, _)| prefixes.iter().any(|p| name.starts_with(p)))
            .map(|(_, path)| path.clone())
    };

    starts(&["license", "licence", "copying"]).or_else(|| starts(&["readme"]))
}

/// Normalize the `repository` field; GitHub repositories become `https://github.com/<user>/<repo>`.
fn repository_url(value: &Value) -> Option<String> {
    let raw = match value {
        Value::String(s) => s.as_str(),
        Value::Object(o) => o.get("url").and_then(Value::as_str)?,
        _ => return None,
    };

    let github_form = match raw.strip_prefix("github:") {
        Some(short) => format!("https://github.com/{}", short),
        None if is_shorthand(raw) => format!("https://github.com/{}", raw),
        None => raw.to_string(),
    };

    match parse_repository(&github_form) {
        Some((user, repo)) => Some(format!("https://github.com/{}/{}", user, repo)),
        None => Some(raw.to_string()),
    }
}

/// npm's `user/repo` shorthand.
fn is_shorthand(raw: &str) -> bool {
    !raw.contains(':') && raw.matches('/').count() == 1 && !raw.starts_with('/')
}

/// Package directories reachable from `root` through `dependencies`, using
/// Node's lookup: the nearest `node_modules/<name>` walking up from the requirer.
fn reachable_from(
    root: &Path,
    root_deps: impl Iterator<Item = String>,
    packages: &[Installed],
) -> HashSet<PathBuf> {
    let by_dir: HashMap<&Path, &Installed> =
        packages.iter().map(|p| (p.dir.as_path(), p)).collect();

    let mut reachable = HashSet::new();
    let mut queue: VecDeque<(PathBuf, String)> =
        root_deps.map(|name| (root.to_path_buf(), name)).collect();

    while let Some((from, name)) = queue.pop_front() {
        let Some(pkg) = resolve(root, &from, &name, &by_dir) else {
            tracing::debug!(package = %name, from = %from.display(), "dependency not installed");
            continue;
        };
        if reachable.insert(pkg.dir.clone()) {
            for dep in &pkg.dependencies {
                queue.push_back((pkg.dir.clone(), dep.clone()));
            }
        }
    }

    reachable
}

fn resolve<'a>(
    root: &Path,
    from: &Path,
    name: &str,
    by_dir: &HashMap<&Path, &'a Installed>,
) -> Option<&'a Installed> {
    for dir in from.ancestors() {
        if dir.file_name().is_some_and(|n| n == "node_modules") {
            continue;
        }
        let candidate = dir.join("node_modules").join(name);
        if let Some(pkg) = by_dir.get(candidate.as_path()) {
            return Some(*pkg);
        }
        if dir == root {
            break;
        }
    }
    None
}
