//! Corpus Discovery
//!
//! Lists the instance files of the corpus directory.
//!
//! Ordering: whatever the platform's directory listing yields, unless
//! `sort` is set, in which case instances are sorted by name.

use crate::config::CorpusSpec;
use anyhow::Context;
use sweepbound_core::Instance;
use tracing::warn;

/// List the instances to process
pub fn list_instances(spec: &CorpusSpec) -> anyhow::Result<Vec<Instance>> {
    let entries = std::fs::read_dir(&spec.directory).with_context(|| {
        format!(
            "Failed to read corpus directory {}",
            spec.directory.display()
        )
    })?;

    let mut instances = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable corpus entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let instance = Instance::from_path(&path);
        if let Some(re) = &spec.filter {
            if !re.is_match(&instance.name) {
                continue;
            }
        }
        instances.push(instance);
    }

    if spec.sort {
        instances.sort_by(|a, b| a.name.cmp(&b.name));
    }

    Ok(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn corpus(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), "aag 0 0 0 0 0\n").unwrap();
        }
        dir
    }

    fn spec(dir: &tempfile::TempDir, filter: Option<&str>, sort: bool) -> CorpusSpec {
        CorpusSpec {
            directory: dir.path().to_path_buf(),
            filter: filter.map(|f| Regex::new(f).unwrap()),
            sort,
        }
    }

    #[test]
    fn test_sorted_listing() {
        let dir = corpus(&["c.aag", "a.aag", "b.aag"]);
        let instances = list_instances(&spec(&dir, None, true)).unwrap();
        let names: Vec<_> = instances.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a.aag", "b.aag", "c.aag"]);
        assert_eq!(instances[0].path, dir.path().join("a.aag"));
    }

    #[test]
    fn test_directories_are_skipped() {
        let dir = corpus(&["a.aag"]);
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        let instances = list_instances(&spec(&dir, None, false)).unwrap();
        assert_eq!(instances.len(), 1);
    }

    #[test]
    fn test_filter() {
        let dir = corpus(&["a.aag", "b.aig", "notes.txt"]);
        let instances = list_instances(&spec(&dir, Some(r"\.ai?g$"), true)).unwrap();
        assert_eq!(instances.len(), 2);
        assert!(instances.iter().all(|i| i.name != "notes.txt"));
    }

    #[test]
    fn test_empty_and_missing_corpus() {
        let dir = corpus(&[]);
        assert!(list_instances(&spec(&dir, None, false)).unwrap().is_empty());

        let missing = CorpusSpec {
            directory: dir.path().join("does-not-exist"),
            filter: None,
            sort: false,
        };
        assert!(list_instances(&missing).is_err());
    }
}
