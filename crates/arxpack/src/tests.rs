use std::fs;
use std::path::Path;

use super::ArtifactKind;
use super::ExecutionEnvironment;
use super::ExportProvider;
use super::NativeBinaryExporter;
use super::Package;
use super::PackageId;
use super::discover;

fn env() -> ExecutionEnvironment {
    ExecutionEnvironment::new("AnyCPU", "net")
}

/// Lays out a package content tree inside a temp directory.
fn package(dir: &Path, files: &[&str]) -> Package {
    for file in files {
        let path = dir.join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, b"binary").unwrap();
    }
    Package::new(PackageId::new("demo", "1.0.0"), dir)
}

#[test]
fn native_binaries_only_under_reserved_directory() {
    let dir = tempfile::tempdir().unwrap();
    let package = package(
        dir.path(),
        &["unmanaged/x.dll", "unmanaged/x.txt", "managed/y.dll"],
    );

    let groups = NativeBinaryExporter
        .items(&package, &env(), ArtifactKind::NativeBinary)
        .unwrap();

    assert_eq!(groups.len(), 1);
    let items = &groups["unmanaged/x.dll"];
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].logical_path, "unmanaged/x.dll");
    assert_eq!(items[0].package, *package.id());
    assert!(items[0].file.ends_with("unmanaged/x.dll"));
}

#[test]
fn foreign_kind_probe_is_empty_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let package = package(dir.path(), &["unmanaged/x.dll"]);

    let groups = NativeBinaryExporter
        .items(&package, &env(), ArtifactKind::Assembly)
        .unwrap();

    assert!(groups.is_empty());
}

#[test]
fn directory_and_extension_match_case_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    let package = package(dir.path(), &["Unmanaged/z.DLL", "unmanaged/lib.so"]);

    let groups = NativeBinaryExporter
        .items(&package, &env(), ArtifactKind::NativeBinary)
        .unwrap();

    assert_eq!(groups.len(), 2);
    assert!(groups.contains_key("Unmanaged/z.DLL"));
    assert!(groups.contains_key("unmanaged/lib.so"));
}

#[test]
fn nested_entries_keep_their_full_logical_path() {
    let dir = tempfile::tempdir().unwrap();
    let package = package(dir.path(), &["unmanaged/x64/native.so"]);

    let groups = NativeBinaryExporter
        .items(&package, &env(), ArtifactKind::NativeBinary)
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert!(groups.contains_key("unmanaged/x64/native.so"));
}

#[test]
fn file_named_like_reserved_directory_is_not_claimed() {
    let dir = tempfile::tempdir().unwrap();
    // A top-level file, not a directory entry.
    let package = package(dir.path(), &["unmanaged.dll"]);

    let groups = NativeBinaryExporter
        .items(&package, &env(), ArtifactKind::NativeBinary)
        .unwrap();

    assert!(groups.is_empty());
}

#[test]
fn discover_merges_over_the_provider_set() {
    let dir = tempfile::tempdir().unwrap();
    let package = package(dir.path(), &["unmanaged/x.dll", "managed/y.dll"]);

    let providers: [&dyn ExportProvider; 1] = [&NativeBinaryExporter];
    let native = discover(&providers, &package, &env(), ArtifactKind::NativeBinary).unwrap();
    assert_eq!(native.len(), 1);

    // No provider in the set owns assemblies: empty, not an error.
    let assemblies = discover(&providers, &package, &env(), ArtifactKind::Assembly).unwrap();
    assert!(assemblies.is_empty());
}
