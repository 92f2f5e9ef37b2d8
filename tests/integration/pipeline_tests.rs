use addonrepo::error::RepoError;
use addonrepo::repository::Pipeline;

use crate::fixture::{RepoFixture, block_versions, zip_entries};

#[test]
fn releases_accumulate_across_runs() {
    let repo = RepoFixture::new();
    let config = repo.config();

    for version in ["1.0.0", "1.1.0", "1.2.0", "1.3.0"] {
        repo.addon("plugin.a", version);
        Pipeline::new(config.clone()).run().unwrap();
    }

    // Retains two previous versions by default.
    assert_eq!(
        block_versions(&repo.combined_manifest(), "plugin.a"),
        vec!["1.3.0", "1.2.0", "1.1.0"]
    );
    for version in ["1.0.0", "1.1.0", "1.2.0", "1.3.0"] {
        crate::assert_file_exists!(&repo.zip_dir("plugin.a").join(format!("plugin.a-{version}.zip")));
    }
}

#[test]
fn rerun_of_same_version_does_not_duplicate_blocks() {
    let repo = RepoFixture::new();
    repo.addon("plugin.a", "2.0.0").archived("plugin.a", "1.0.0");
    let config = repo.config();

    Pipeline::new(config.clone()).run().unwrap();
    Pipeline::new(config).run().unwrap();

    assert_eq!(
        block_versions(&repo.combined_manifest(), "plugin.a"),
        vec!["2.0.0", "1.0.0"]
    );
}

#[test]
fn built_archive_is_found_by_next_lookup() {
    let repo = RepoFixture::new();
    repo.addon("plugin.a", "1.0.0")
        .file("plugin.a", "resources/settings.xml", "<settings/>");
    let config = repo.config();
    Pipeline::new(config.clone()).run().unwrap();

    let entries = zip_entries(&repo.zip_dir("plugin.a").join("plugin.a-1.0.0.zip"));
    assert!(entries.contains(&"plugin.a/addon.xml".to_string()));

    repo.addon("plugin.a", "1.0.1");
    let report = Pipeline::new(config).run().unwrap();
    assert_eq!(report.manifest.addons[0].previous_versions.len(), 1);
}

#[test]
fn aborted_aggregation_builds_nothing() {
    let repo = RepoFixture::new();
    repo.addon("plugin.a", "2.0.0").archive_with(
        "plugin.a",
        "plugin.a-1.0.0.zip",
        &[("other/addon.xml", "<addon version=\"1.0.0\"/>")],
    );

    let err = Pipeline::new(repo.config()).run().unwrap_err();
    assert!(matches!(err, RepoError::MalformedArchive { .. }));
    assert!(!repo.zip_dir("plugin.a").join("plugin.a-2.0.0.zip").exists());
    assert!(!repo.root().join("index.html").exists());
}

#[test]
fn isolated_failures_are_reported_per_stage() {
    let repo = RepoFixture::new();
    repo.addon("plugin.a", "1.0.0");
    repo.file("plugin.bad", "addon.xml", "<addon id=\"plugin.bad\"/>");

    let report = Pipeline::new(repo.config()).run().unwrap();
    assert_eq!(report.manifest.failures.len(), 1);
    assert_eq!(report.archives.failures.len(), 1);
    assert_eq!(report.archives.archives.len(), 1);
}

#[cfg(target_os = "linux")]
#[test]
fn failed_archive_does_not_poison_next_run() {
    let repo = RepoFixture::new();
    repo.addon("plugin.a", "1.0.0");
    let unreadable = repo.addon_dir("plugin.a").join("aaa.bin");
    std::os::unix::fs::symlink("/proc/self/mem", &unreadable).unwrap();
    let config = repo.config();

    let report = Pipeline::new(config.clone()).run().unwrap();
    assert_eq!(report.archives.failures.len(), 1);
    assert!(!repo.zip_dir("plugin.a").join("plugin.a-1.0.0.zip").exists());

    std::fs::remove_file(&unreadable).unwrap();
    repo.addon("plugin.a", "1.0.1");
    let report = Pipeline::new(config).run().unwrap();
    assert!(report.manifest.addons[0].previous_versions.is_empty());
    crate::assert_file_exists!(&repo.zip_dir("plugin.a").join("plugin.a-1.0.1.zip"));
}
