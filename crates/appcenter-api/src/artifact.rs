//! Artifact type detection

use std::io::{Cursor, Write};
use std::path::Path;

use serde::Serialize;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{AppCenterError, Result};

/// Extensions accepted as release binaries
pub const BINARY_EXTENSIONS: &[&str] = &[
    ".apk",
    ".aab",
    ".ipa",
    ".app.zip",
    ".dmg",
    ".pkg",
    ".msi",
    ".msix",
    ".msixbundle",
    ".appx",
    ".appxbundle",
    ".zip",
];

/// Extensions accepted as Apple debug symbols
pub const DSYM_EXTENSIONS: &[&str] = &[".dsym", ".dsym.zip"];

/// Extensions accepted as Android mapping files
pub const MAPPING_EXTENSIONS: &[&str] = &[".txt"];

/// What an artifact path holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Binary,
    Dsym,
    Mapping,
}

impl ArtifactKind {
    /// Classify a path by its extension
    pub fn detect(path: &Path) -> Result<Self> {
        let ext = full_extension(path).to_lowercase();

        if DSYM_EXTENSIONS.contains(&ext.as_str()) {
            Ok(ArtifactKind::Dsym)
        } else if BINARY_EXTENSIONS.contains(&ext.as_str()) {
            Ok(ArtifactKind::Binary)
        } else if MAPPING_EXTENSIONS.contains(&ext.as_str()) {
            Ok(ArtifactKind::Mapping)
        } else {
            Err(AppCenterError::InvalidArtifact(format!(
                "Extension '{}' of {} is not supported",
                ext,
                path.display()
            )))
        }
    }

    /// Classify and require the expected kind and an existing file
    ///
    /// Only dSYM bundles may be directories; they are zipped before transfer.
    pub fn expect(path: &Path, kind: ArtifactKind) -> Result<()> {
        if !path.exists() {
            return Err(AppCenterError::InvalidArtifact(format!(
                "File not found: {}",
                path.display()
            )));
        }
        if path.is_dir() && kind != ArtifactKind::Dsym {
            return Err(AppCenterError::InvalidArtifact(format!(
                "{} is a directory, expected a file",
                path.display()
            )));
        }

        let detected = Self::detect(path)?;
        if detected != kind {
            return Err(AppCenterError::InvalidArtifact(format!(
                "{} is a {:?} artifact, expected {:?}",
                path.display(),
                detected,
                kind
            )));
        }
        Ok(())
    }
}

/// Extension including the inner one for zip archives
///
/// `app.dSYM.zip` gives `.dSYM.zip`, `build.zip` gives `.zip`.
pub fn full_extension(path: &Path) -> String {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();

    let single = |name: &str| -> String {
        match name.rfind('.') {
            Some(0) | None => String::new(),
            Some(i) => name[i..].to_string(),
        }
    };

    let ext = single(file_name);
    if ext != ".zip" {
        return ext;
    }

    let inner = &file_name[..file_name.len() - ext.len()];
    format!("{}{}", single(inner), ext)
}

/// Zip a bundle directory in memory
///
/// Entries keep the bundle name as their root (`App.dSYM/Contents/...`).
pub fn zip_bundle(dir: &Path) -> Result<Vec<u8>> {
    let root = dir.parent().unwrap_or(dir);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            AppCenterError::InvalidArtifact(format!("Failed to walk {}: {}", dir.display(), e))
        })?;
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let written = if entry.file_type().is_dir() {
            zip.add_directory(name, options)
        } else {
            let content = std::fs::read(entry.path())?;
            zip.start_file(name, options)
                .and_then(|()| zip.write_all(&content).map_err(Into::into))
        };
        written.map_err(|e| {
            AppCenterError::InvalidArtifact(format!("Failed to zip {}: {}", dir.display(), e))
        })?;
    }

    let cursor = zip.finish().map_err(|e| {
        AppCenterError::InvalidArtifact(format!("Failed to zip {}: {}", dir.display(), e))
    })?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_full_extension() {
        assert_eq!(full_extension(Path::new("app.ipa")), ".ipa");
        assert_eq!(full_extension(Path::new("build/App.app.zip")), ".app.zip");
        assert_eq!(full_extension(Path::new("App.dSYM.zip")), ".dSYM.zip");
        assert_eq!(full_extension(Path::new("bundle.zip")), ".zip");
        assert_eq!(full_extension(Path::new("noext")), "");
        assert_eq!(full_extension(Path::new(".hidden")), "");
    }

    #[test]
    fn test_detect_kinds() {
        assert_eq!(ArtifactKind::detect(Path::new("app.apk")).unwrap(), ArtifactKind::Binary);
        assert_eq!(ArtifactKind::detect(Path::new("app.AAB")).unwrap(), ArtifactKind::Binary);
        assert_eq!(ArtifactKind::detect(Path::new("App.app.zip")).unwrap(), ArtifactKind::Binary);
        assert_eq!(ArtifactKind::detect(Path::new("App.dSYM")).unwrap(), ArtifactKind::Dsym);
        assert_eq!(ArtifactKind::detect(Path::new("App.dSYM.zip")).unwrap(), ArtifactKind::Dsym);
        assert_eq!(ArtifactKind::detect(Path::new("mapping.txt")).unwrap(), ArtifactKind::Mapping);
        assert!(ArtifactKind::detect(Path::new("notes.md")).is_err());
    }

    #[test]
    fn test_expect_requires_existing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path: PathBuf = temp.path().join("app.apk");
        assert!(ArtifactKind::expect(&path, ArtifactKind::Binary).is_err());

        std::fs::write(&path, b"apk").unwrap();
        assert!(ArtifactKind::expect(&path, ArtifactKind::Binary).is_ok());
        assert!(ArtifactKind::expect(&path, ArtifactKind::Mapping).is_err());
    }

    fn dsym_bundle(dir: &Path) -> PathBuf {
        let bundle = dir.join("App.dSYM");
        let dwarf = bundle.join("Contents").join("Resources").join("DWARF");
        std::fs::create_dir_all(&dwarf).unwrap();
        std::fs::write(dwarf.join("App"), b"dwarf").unwrap();
        std::fs::write(bundle.join("Contents").join("Info.plist"), b"<plist/>").unwrap();
        bundle
    }

    #[test]
    fn test_expect_accepts_only_dsym_directories() {
        let temp = tempfile::TempDir::new().unwrap();
        let bundle = dsym_bundle(temp.path());
        assert!(ArtifactKind::expect(&bundle, ArtifactKind::Dsym).is_ok());

        let apk_dir = temp.path().join("app.apk");
        std::fs::create_dir_all(&apk_dir).unwrap();
        assert!(matches!(
            ArtifactKind::expect(&apk_dir, ArtifactKind::Binary),
            Err(AppCenterError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn test_zip_bundle_keeps_bundle_root() {
        let temp = tempfile::TempDir::new().unwrap();
        let bundle = dsym_bundle(temp.path());

        let bytes = zip_bundle(&bundle).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert!(names.contains(&"App.dSYM/Contents/Info.plist".to_string()));
        assert!(names.contains(&"App.dSYM/Contents/Resources/DWARF/App".to_string()));

        let mut dwarf = archive.by_name("App.dSYM/Contents/Resources/DWARF/App").unwrap();
        let mut content = Vec::new();
        std::io::Read::read_to_end(&mut dwarf, &mut content).unwrap();
        assert_eq!(content, b"dwarf");
    }
}
