/// Acceptance tests for the libdoc cache batch
///
/// These drive `BatchRunner` end to end against a real cache directory, with
/// the host interpreter replaced by the fakes in `common`.
mod common;

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};
use tempfile::TempDir;

use common::{references, runner, write_library, FakeLoader};
use libdoc_cache::{CacheStatus, LibraryStatus};

fn age_file(path: &Path) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(UNIX_EPOCH + Duration::from_secs(1_000_000))
        .unwrap();
}

#[test]
fn test_mixed_batch_scenario() {
    let temp = TempDir::new().unwrap();
    let cache_dir = temp.path().join("libdoc");
    let custom = write_library(temp.path(), "custom.py");

    let loader = FakeLoader::default().with_module("robot.libraries.BuiltIn", None);
    let mut runner = runner(loader);

    let report = runner
        .run(&references(&["BuiltIn", "missing_lib", custom.as_str()]), &cache_dir)
        .unwrap();

    let libraries = report.libraries();
    assert_eq!(libraries.len(), 3);

    let builtin = libraries.get("BuiltIn").unwrap();
    assert_eq!(builtin.status, LibraryStatus::Success);
    assert_eq!(builtin.name, "BuiltIn");
    assert_eq!(builtin.xml_libdoc_path, Some(cache_dir.join("BuiltIn.xml")));
    assert!(!builtin.physical);

    let missing = libraries.get("missing_lib").unwrap();
    assert_eq!(missing.status, LibraryStatus::Error);
    assert!(missing.message.contains("Could not import 'missing_lib'"));
    assert!(missing.xml_libdoc_path.is_none());

    let physical = libraries.get(&custom).unwrap();
    assert_eq!(physical.status, LibraryStatus::Success);
    assert_eq!(physical.name, "custom");
    assert!(physical.physical);
    assert_eq!(physical.source_path, Some(PathBuf::from(&custom)));
    assert!(physical.xml_libdoc_path.as_ref().unwrap().exists());

    // Insertion order is input order
    let keys: Vec<&str> = libraries.iter().map(|r| r.library_key.as_str()).collect();
    assert_eq!(keys, vec!["BuiltIn", "missing_lib", custom.as_str()]);

    assert_eq!(runner.processor().generator().call_count(), 2);
}

#[test]
fn test_standard_alias_uses_canonical_import() {
    let temp = TempDir::new().unwrap();
    let loader = FakeLoader::default()
        .with_module("robot.libraries.Collections", None)
        .with_module("robot.libraries.XML", None);
    let mut runner = runner(loader);

    let report = runner
        .run(&references(&["Collections", "XML"]), temp.path())
        .unwrap();

    for alias in ["Collections", "XML"] {
        let record = report.libraries().get(alias).unwrap();
        assert_eq!(record.status, LibraryStatus::Success);
        assert_eq!(record.name, alias);
    }
    assert_eq!(
        runner.processor().resolver().loader().imports(),
        vec!["robot.libraries.Collections", "robot.libraries.XML"]
    );
}

#[test]
fn test_second_run_reuses_cache() {
    let temp = TempDir::new().unwrap();
    let cache_dir = temp.path().join("libdoc");
    let custom = write_library(temp.path(), "custom.py");
    let batch = references(&["BuiltIn", "missing_lib", custom.as_str()]);

    let loader = FakeLoader::default().with_module("robot.libraries.BuiltIn", None);
    let mut runner = runner(loader);

    let first = runner.run(&batch, &cache_dir).unwrap();
    let generated = runner.processor().generator().call_count();
    assert_eq!(generated, 2);

    let second = runner.run(&batch, &cache_dir).unwrap();
    assert_eq!(runner.processor().generator().call_count(), generated);

    for (before, after) in first.libraries().iter().zip(second.libraries().iter()) {
        assert_eq!(before.library_key, after.library_key);
        assert_eq!(before.status, after.status);
        assert_eq!(before.xml_libdoc_path, after.xml_libdoc_path);
        if after.is_success() {
            assert_eq!(before.cache_status, CacheStatus::Miss);
            assert_eq!(after.cache_status, CacheStatus::Hit);
        }
    }
}

#[test]
fn test_newer_source_regenerates_once() {
    let temp = TempDir::new().unwrap();
    let cache_dir = temp.path().join("libdoc");
    let custom = write_library(temp.path(), "custom.py");
    let batch = references(&[custom.as_str()]);

    let mut runner = runner(FakeLoader::default());

    let first = runner.run(&batch, &cache_dir).unwrap();
    let artifact = first
        .libraries()
        .get(&custom)
        .unwrap()
        .xml_libdoc_path
        .clone()
        .unwrap();
    assert_eq!(runner.processor().generator().call_count(), 1);

    // Source is now newer than the cached libdoc
    age_file(&artifact);

    let second = runner.run(&batch, &cache_dir).unwrap();
    let record = second.libraries().get(&custom).unwrap();

    assert_eq!(runner.processor().generator().call_count(), 2);
    assert_eq!(record.cache_status, CacheStatus::Miss);
    assert_eq!(record.xml_libdoc_path.as_ref(), Some(&artifact));
    assert!(fs::read_to_string(&artifact)
        .unwrap()
        .contains("generation=\"2\""));

    // The fresh libdoc is valid again
    runner.run(&batch, &cache_dir).unwrap();
    assert_eq!(runner.processor().generator().call_count(), 2);
}

#[test]
fn test_physical_then_named_with_same_name() {
    let temp = TempDir::new().unwrap();
    let foo_path = write_library(temp.path(), "local/foo.py");
    let site_foo = PathBuf::from(write_library(temp.path(), "site-packages/foo.py"));

    let loader = FakeLoader::default().with_module("foo", Some(site_foo.as_path()));
    let mut runner = runner(loader);

    let report = runner
        .run(&references(&[foo_path.as_str(), "foo"]), &temp.path().join("libdoc"))
        .unwrap();

    let physical = report.libraries().get(&foo_path).unwrap();
    let named = report.libraries().get("foo").unwrap();

    assert_eq!(physical.source_path, Some(PathBuf::from(&foo_path)));
    assert_eq!(named.source_path, Some(site_foo));
    assert_ne!(physical.xml_libdoc_path, named.xml_libdoc_path);
    assert_eq!(runner.processor().resolver().loader().imports(), vec!["foo"]);
    assert!(runner.processor().resolver().registry().is_empty());
}

#[test]
fn test_same_file_name_in_different_directories() {
    let temp = TempDir::new().unwrap();
    let first = write_library(temp.path(), "suite_a/keywords.py");
    let second = write_library(temp.path(), "suite_b/keywords.py");
    let cache_dir = temp.path().join("libdoc");

    let mut runner = runner(FakeLoader::default());
    let report = runner.run(&references(&[first.as_str(), second.as_str()]), &cache_dir).unwrap();

    let path_a = report.libraries().get(&first).unwrap().xml_libdoc_path.clone();
    let path_b = report.libraries().get(&second).unwrap().xml_libdoc_path.clone();

    assert_ne!(path_a, path_b);
    assert_eq!(fs::read_dir(&cache_dir).unwrap().count(), 2);
    assert_eq!(runner.processor().generator().call_count(), 2);
}

#[test]
fn test_class_reference_resolves_through_module() {
    let temp = TempDir::new().unwrap();
    let module_source = PathBuf::from(write_library(temp.path(), "company/keywords.py"));
    let loader = FakeLoader::default()
        .with_module("company.keywords", Some(module_source.as_path()))
        .with_attribute("company.keywords", "LoginKeywords");
    let mut runner = runner(loader);

    let report = runner
        .run(
            &references(&["company.keywords.LoginKeywords"]),
            &temp.path().join("libdoc"),
        )
        .unwrap();

    let record = report.libraries().get("company.keywords.LoginKeywords").unwrap();
    assert_eq!(record.status, LibraryStatus::Success);
    assert_eq!(record.name, "company.keywords.LoginKeywords");
    assert_eq!(record.source_path, Some(module_source));
    assert_eq!(
        runner.processor().generator().calls(),
        vec!["company.keywords.LoginKeywords"]
    );
}

#[test]
fn test_duplicate_reference_last_write_wins() {
    let temp = TempDir::new().unwrap();
    let loader = FakeLoader::default().with_module("robot.libraries.BuiltIn", None);
    let mut runner = runner(loader);

    let report = runner
        .run(&references(&["BuiltIn", "Process", "BuiltIn"]), temp.path())
        .unwrap();

    assert_eq!(report.libraries().len(), 2);
    let builtin = report.libraries().get("BuiltIn").unwrap();
    assert_eq!(builtin.cache_status, CacheStatus::Hit);
    assert_eq!(runner.processor().generator().call_count(), 1);
}

#[test]
fn test_missing_physical_file_is_recorded() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("gone.py").display().to_string();
    let mut runner = runner(FakeLoader::default());

    let report = runner
        .run(&references(&[missing.as_str()]), &temp.path().join("libdoc"))
        .unwrap();

    let record = report.libraries().get(&missing).unwrap();
    assert_eq!(record.status, LibraryStatus::Error);
    assert_eq!(record.name, "gone");
    assert!(record.message.starts_with("Could not import 'gone'"));
    assert_eq!(record.source_path, Some(PathBuf::from(&missing)));
    assert_eq!(runner.processor().generator().call_count(), 0);
}

#[test]
fn test_cache_dir_creation_failure_is_fatal() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not-a-dir");
    fs::write(&blocker, "").unwrap();

    let loader = FakeLoader::default().with_module("robot.libraries.BuiltIn", None);
    let mut runner = runner(loader);

    let err = runner
        .run(&references(&["BuiltIn"]), &blocker.join("libdoc"))
        .unwrap_err();

    assert!(err.to_string().contains("Failed to create cache directory"));
    assert_eq!(runner.processor().generator().call_count(), 0);
}

#[test]
fn test_report_json_includes_environment() {
    let temp = TempDir::new().unwrap();
    let mut runner = runner(FakeLoader::default());

    let report = runner
        .run(&references(&["missing_lib"]), temp.path())
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&report.to_json(true).unwrap()).unwrap();

    assert_eq!(json["libraries"]["missing_lib"]["status"], "error");
    assert_eq!(json["libraries"]["missing_lib"]["physical"], false);
    assert_eq!(json["environment"]["pythonExecutable"], "/usr/bin/python3");
    assert_eq!(json["environment"]["moduleSearchPath"][0], "/usr/lib/python3.12");
}
