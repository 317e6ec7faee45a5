//! Package loading from a user-selected build output directory.
//!
//! The loader operates on an in-memory file set (relative path + content),
//! so the caller decides where the bytes come from: a directory walk for the
//! CLI, a browser-style file selection for a host UI, or fixtures in tests.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::error::PublishError;
use crate::metadata::PackageMetadata;

/// Fixed metadata filename written by the Move build.
pub const METADATA_FILE: &str = "package-metadata.bcs";

/// One user-selected file: path relative to the selection root, plus its
/// full content.
#[derive(Debug, Clone)]
pub struct PackageFile {
    pub path: String,
    pub content: Vec<u8>,
}

impl PackageFile {
    pub fn new(path: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            content,
        }
    }
}

/// A validated in-memory Move package, ready for payload encoding.
///
/// Immutable after creation; owned by one publish attempt and discarded
/// when the attempt ends.
#[derive(Debug, Clone)]
pub struct LoadedPackage {
    /// The undecoded metadata file content, re-sent verbatim on-chain.
    pub raw_metadata: Vec<u8>,
    pub metadata: PackageMetadata,
    /// Compiled module blobs, index-aligned with `metadata.modules`.
    pub bytecode: Vec<Vec<u8>>,
}

impl LoadedPackage {
    /// Locate and decode the metadata file, then collect the compiled
    /// bytecode for every module it names, in metadata order.
    pub fn load(files: &[PackageFile]) -> Result<Self, PublishError> {
        let mut candidates = files.iter().filter(|f| f.path.ends_with(METADATA_FILE));
        let metadata_file = candidates.next().ok_or(PublishError::MetadataNotFound)?;
        if let Some(other) = candidates.next() {
            return Err(PublishError::AmbiguousMetadata(
                metadata_file.path.clone(),
                other.path.clone(),
            ));
        }

        let metadata = PackageMetadata::decode(&metadata_file.content)?;
        debug!(
            package = %metadata.name,
            modules = metadata.modules.len(),
            policy = metadata.upgrade_policy.as_str(),
            "decoded package metadata"
        );

        let bytecode_dir = format!("build/{}/bytecode_modules", metadata.name);
        let mut bytecode = Vec::with_capacity(metadata.modules.len());
        for module in &metadata.modules {
            let expected = format!("{bytecode_dir}/{}.mv", module.name);
            let file = files
                .iter()
                .find(|f| f.path == expected)
                .ok_or_else(|| PublishError::BytecodeNotFound {
                    module: module.name.clone(),
                })?;
            debug!(path = %file.path, bytes = file.content.len(), "collected module bytecode");
            bytecode.push(file.content.clone());
        }

        Ok(LoadedPackage {
            raw_metadata: metadata_file.content.clone(),
            metadata,
            bytecode,
        })
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.metadata.module_names()
    }
}

/// Walk a local build output directory into the flat file set the loader
/// expects. Paths are recorded relative to `root` with `/` separators.
pub fn read_package_dir(root: impl AsRef<Path>) -> Result<Vec<PackageFile>> {
    let root = root.as_ref();
    let mut files = Vec::new();
    collect_files(root, root, &mut files)
        .with_context(|| format!("read package directory {}", root.display()))?;
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<PackageFile>) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(root, &path, out)?;
        } else {
            let relative = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace(std::path::MAIN_SEPARATOR, "/");
            let content =
                fs::read(&path).with_context(|| format!("read file {}", path.display()))?;
            out.push(PackageFile::new(relative, content));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ModuleMetadata, PackageMetadata, UpgradePolicy};

    fn fixture_metadata(name: &str, modules: &[&str]) -> PackageMetadata {
        PackageMetadata {
            name: name.to_string(),
            upgrade_policy: UpgradePolicy::Compatible,
            upgrade_number: 0,
            source_digest: String::new(),
            manifest: vec![],
            modules: modules
                .iter()
                .map(|m| ModuleMetadata {
                    name: m.to_string(),
                    source: vec![],
                    source_map: vec![],
                    extension: None,
                })
                .collect(),
            dependencies: vec![],
            extension: None,
        }
    }

    fn fixture_files() -> Vec<PackageFile> {
        let metadata = fixture_metadata("demo", &["alpha", "beta"]);
        vec![
            PackageFile::new(METADATA_FILE, metadata.encode()),
            PackageFile::new("build/demo/bytecode_modules/alpha.mv", vec![0xa1, 0xa1]),
            PackageFile::new("build/demo/bytecode_modules/beta.mv", vec![0xb2]),
        ]
    }

    #[test]
    fn loads_package_with_ordered_bytecode() {
        let pkg = LoadedPackage::load(&fixture_files()).unwrap();
        assert_eq!(pkg.metadata.name, "demo");
        assert_eq!(pkg.bytecode, vec![vec![0xa1, 0xa1], vec![0xb2]]);
        assert_eq!(
            pkg.raw_metadata,
            fixture_metadata("demo", &["alpha", "beta"]).encode()
        );
    }

    #[test]
    fn missing_metadata_file() {
        let files = vec![PackageFile::new("build/demo/readme.md", vec![1])];
        assert!(matches!(
            LoadedPackage::load(&files),
            Err(PublishError::MetadataNotFound)
        ));
    }

    #[test]
    fn ambiguous_metadata_is_an_error() {
        let mut files = fixture_files();
        files.push(PackageFile::new(
            "nested/package-metadata.bcs",
            files[0].content.clone(),
        ));
        assert!(matches!(
            LoadedPackage::load(&files),
            Err(PublishError::AmbiguousMetadata(_, _))
        ));
    }

    #[test]
    fn missing_bytecode_names_the_module() {
        let mut files = fixture_files();
        files.retain(|f| !f.path.ends_with("beta.mv"));
        match LoadedPackage::load(&files) {
            Err(PublishError::BytecodeNotFound { module }) => assert_eq!(module, "beta"),
            other => panic!("expected BytecodeNotFound, got {other:?}"),
        }
    }

    #[test]
    fn malformed_metadata_propagates() {
        let files = vec![PackageFile::new(METADATA_FILE, vec![0xff, 0xff, 0xff])];
        assert!(matches!(
            LoadedPackage::load(&files),
            Err(PublishError::MalformedMetadata(_))
        ));
    }

    #[test]
    fn read_package_dir_walks_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("build/demo/bytecode_modules");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(METADATA_FILE), b"meta").unwrap();
        fs::write(nested.join("alpha.mv"), b"code").unwrap();

        let files = read_package_dir(dir.path()).unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["build/demo/bytecode_modules/alpha.mv", "package-metadata.bcs"]
        );
        assert_eq!(files[1].content, b"meta");
    }
}
