use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;

use addonrepo::config::Config;

// =============================================================================
// Assertion Macros
// =============================================================================

/// Assert that a file exists at the given path
#[macro_export]
macro_rules! assert_file_exists {
    ($path:expr) => {
        assert!(
            std::path::Path::new($path).exists(),
            "Expected file to exist: {:?}",
            $path
        );
    };
}

/// Assert that a file contains expected content
#[macro_export]
macro_rules! assert_file_contains {
    ($path:expr, $expected:expr) => {{
        let content = std::fs::read_to_string($path).unwrap();
        assert!(
            content.contains($expected),
            "File {:?} does not contain '{}'\nActual content:\n{}",
            $path,
            $expected,
            content
        );
    }};
}

// =============================================================================
// Repository fixture
// =============================================================================

/// A throwaway repository: `<root>/packages/<addon>/...` plus `<root>/zip`.
pub struct RepoFixture {
    pub temp: TempDir,
}

impl RepoFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("packages")).unwrap();
        Self { temp }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn addon_dir(&self, addon: &str) -> PathBuf {
        self.root().join("packages").join(addon)
    }

    pub fn zip_dir(&self, addon: &str) -> PathBuf {
        self.root().join("zip").join(addon)
    }

    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.paths.working_dir = self.root().to_path_buf();
        config
    }

    /// Write `addon.xml` for `addon` declaring `version`.
    pub fn addon(&self, addon: &str, version: &str) -> &Self {
        self.file(addon, "addon.xml", &manifest_xml(addon, version))
    }

    /// Write a source file under an add-on folder.
    pub fn file(&self, addon: &str, relative: &str, content: &str) -> &Self {
        let path = self.addon_dir(addon).join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
        self
    }

    /// Place a previously built archive for `addon` at `version`.
    pub fn archived(&self, addon: &str, version: &str) -> &Self {
        let manifest = manifest_xml(addon, version);
        self.archive_with(
            addon,
            &format!("{addon}-{version}.zip"),
            &[(&format!("{addon}/addon.xml"), &manifest)],
        )
    }

    pub fn archive_with(&self, addon: &str, file_name: &str, entries: &[(&str, &str)]) -> &Self {
        let dir = self.zip_dir(addon);
        std::fs::create_dir_all(&dir).unwrap();
        let mut zip = zip::ZipWriter::new(File::create(dir.join(file_name)).unwrap());
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        self
    }

    pub fn combined_manifest(&self) -> String {
        std::fs::read_to_string(self.root().join("addons.xml")).unwrap()
    }
}

pub fn manifest_xml(addon: &str, version: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<addon id="{addon}" name="{addon}" version="{version}" provider-name="tests">
    <requires>
        <import addon="xbmc.python" version="3.0.0"/>
    </requires>
    <extension point="xbmc.python.pluginsource" library="default.py"/>
</addon>
"#
    )
}

/// Entry names of a zip file, in stored order.
pub fn zip_entries(path: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Text of one entry of a zip file.
pub fn zip_text(path: &Path, entry: &str) -> String {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut text = String::new();
    archive
        .by_name(entry)
        .unwrap()
        .read_to_string(&mut text)
        .unwrap();
    text
}

/// Root `version` attributes of the `<addon>` blocks in a combined manifest, in order.
pub fn block_versions(combined: &str, addon: &str) -> Vec<String> {
    let marker = format!(r#"<addon id="{addon}" name="{addon}" version=""#);
    combined
        .match_indices(&marker)
        .map(|(start, _)| {
            let rest = &combined[start + marker.len()..];
            rest[..rest.find('"').unwrap()].to_string()
        })
        .collect()
}
