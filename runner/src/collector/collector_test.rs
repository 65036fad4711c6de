use std::fs;

use tempfile::TempDir;

use super::collect_results;

#[test]
pub fn collects_matching_files_sorted() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("b.csv"), "").unwrap();
    fs::write(dir.path().join("b.log"), "").unwrap();
    fs::write(dir.path().join("a.csv"), "").unwrap();
    fs::write(dir.path().join("notes.txt"), "").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested/c.csv"), "").unwrap();

    let results = collect_results(dir.path(), "*.csv").unwrap();
    let names: Vec<String> = results
        .iter()
        .map(|path| {
            path.strip_prefix(dir.path())
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();

    assert_eq!(names, vec!["a.csv", "b.csv", "nested/c.csv"]);
}

#[test]
pub fn empty_directory_collects_nothing() {
    let dir = TempDir::new().unwrap();
    assert!(collect_results(dir.path(), "*.csv").unwrap().is_empty());
}

#[test]
pub fn invalid_glob_fails() {
    let dir = TempDir::new().unwrap();
    assert!(collect_results(dir.path(), "*.{csv").is_err());
}
