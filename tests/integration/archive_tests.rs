use addonrepo::repository::ArchiveBuilder;

use crate::fixture::{RepoFixture, zip_entries, zip_text};

#[test]
fn archive_is_named_by_addon_and_version() {
    let repo = RepoFixture::new();
    repo.addon("plugin.a", "1.4.2")
        .file("plugin.a", "default.py", "print('a')");

    let report = ArchiveBuilder::new(&repo.config()).build_all().unwrap();
    let path = repo.zip_dir("plugin.a").join("plugin.a-1.4.2.zip");
    assert_eq!(report.archives[0].path, path);
    crate::assert_file_exists!(&path);
}

#[test]
fn manifest_entry_is_rooted_at_addon_folder() {
    let repo = RepoFixture::new();
    repo.addon("plugin.a", "1.0.0")
        .file("plugin.a", "resources/lib/deep/nested/module.py", "x = 1");

    ArchiveBuilder::new(&repo.config()).build_all().unwrap();
    let path = repo.zip_dir("plugin.a").join("plugin.a-1.0.0.zip");
    let entries = zip_entries(&path);

    assert!(entries.contains(&"plugin.a/addon.xml".to_string()));
    assert!(entries.contains(&"plugin.a/resources/lib/deep/nested/module.py".to_string()));
    assert!(entries.iter().all(|name| name.starts_with("plugin.a/")));
    assert!(zip_text(&path, "plugin.a/addon.xml").contains("version=\"1.0.0\""));
}

#[test]
fn excluded_and_hidden_entries_never_appear() {
    let repo = RepoFixture::new();
    repo.addon("plugin.a", "1.0.0")
        .file("plugin.a", "default.py", "")
        .file("plugin.a", "secrets.txt", "")
        .file("plugin.a", ".env", "")
        .file("plugin.a", ".github/workflows/ci.yml", "")
        .file("plugin.a", "tests/test_default.py", "")
        .file("plugin.a", "resources/__pycache__/x.pyc", "")
        .file("plugin.a", "resources/lib/y.pyo", "");

    let mut config = repo.config();
    config
        .addons
        .excluded_files
        .insert("plugin.a".to_string(), vec!["secrets.txt".to_string()]);
    config
        .addons
        .excluded_dirs
        .insert("plugin.a".to_string(), vec!["tests".to_string()]);

    ArchiveBuilder::new(&config).build_all().unwrap();
    let entries = zip_entries(&repo.zip_dir("plugin.a").join("plugin.a-1.0.0.zip"));

    assert_eq!(entries, vec!["plugin.a/addon.xml", "plugin.a/default.py"]);
}

#[test]
fn exclusions_apply_only_to_their_addon() {
    let repo = RepoFixture::new();
    repo.addon("plugin.a", "1.0.0")
        .file("plugin.a", "notes.txt", "");
    repo.addon("plugin.b", "1.0.0")
        .file("plugin.b", "notes.txt", "");

    let mut config = repo.config();
    config
        .addons
        .excluded_files
        .insert("plugin.a".to_string(), vec!["notes.txt".to_string()]);

    ArchiveBuilder::new(&config).build_all().unwrap();
    let a = zip_entries(&repo.zip_dir("plugin.a").join("plugin.a-1.0.0.zip"));
    let b = zip_entries(&repo.zip_dir("plugin.b").join("plugin.b-1.0.0.zip"));
    assert!(!a.contains(&"plugin.a/notes.txt".to_string()));
    assert!(b.contains(&"plugin.b/notes.txt".to_string()));
}

#[test]
fn rebuilding_same_version_overwrites() {
    let repo = RepoFixture::new();
    repo.addon("plugin.a", "1.0.0")
        .file("plugin.a", "default.py", "old");
    let config = repo.config();

    ArchiveBuilder::new(&config).build_all().unwrap();
    repo.file("plugin.a", "default.py", "new");
    ArchiveBuilder::new(&config).build_all().unwrap();

    let zips: Vec<_> = std::fs::read_dir(repo.zip_dir("plugin.a"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .filter(|name| name.ends_with(".zip"))
        .collect();
    assert_eq!(zips, vec!["plugin.a-1.0.0.zip"]);
    let path = repo.zip_dir("plugin.a").join("plugin.a-1.0.0.zip");
    assert_eq!(zip_text(&path, "plugin.a/default.py"), "new");
}

#[test]
fn delete_compiled_purges_sources() {
    let repo = RepoFixture::new();
    repo.addon("plugin.a", "1.0.0")
        .file("plugin.a", "lib/mod.py", "")
        .file("plugin.a", "lib/mod.pyc", "");

    let mut config = repo.config();
    config.archive.delete_compiled = true;
    let report = ArchiveBuilder::new(&config).build_all().unwrap();

    assert!(!repo.addon_dir("plugin.a").join("lib/mod.pyc").exists());
    assert_eq!(report.archives[0].purged.len(), 1);
    let entries = zip_entries(&repo.zip_dir("plugin.a").join("plugin.a-1.0.0.zip"));
    assert!(!entries.iter().any(|name| name.ends_with(".pyc")));
}

#[test]
fn index_pages_list_repository_artifacts() {
    let repo = RepoFixture::new();
    repo.addon("plugin.a", "1.0.0");
    std::fs::write(repo.root().join("addons.xml"), "<addons/>").unwrap();

    ArchiveBuilder::new(&repo.config()).build_all().unwrap();

    crate::assert_file_contains!(
        repo.zip_dir("plugin.a").join("index.html"),
        r#"<a href="plugin.a-1.0.0.zip">plugin.a-1.0.0.zip</a>"#
    );
    crate::assert_file_contains!(
        repo.root().join("zip/index.html"),
        r#"<a href="plugin.a/">plugin.a</a>"#
    );
    crate::assert_file_contains!(
        repo.root().join("index.html"),
        r#"<a href="addons.xml">addons.xml</a>"#
    );
    crate::assert_file_contains!(repo.root().join("index.html"), r#"<a href="zip/">zip</a>"#);
}
