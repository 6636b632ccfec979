//! glt-pack - build a `.glt` title container
//!
//! # Usage
//!
//! ```bash
//! glt-pack target/release/libcube.so title.json
//! ```
//!
//! Writes `<id>.glt` to the current directory (or `--output`), packing the
//! manifest's resource directory and icon alongside the code binary.

mod icon;
mod manifest;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use glint_shared::GLT_FORMAT;
use glt_common::{Container, ResourcePack, TitleMetadata};

use crate::manifest::TitleManifest;

/// glt-pack - package a title binary into a .glt container
#[derive(Parser)]
#[command(name = "glt-pack")]
#[command(about = "Package a title binary and its resources into a .glt container")]
#[command(version)]
struct Args {
    /// Compiled title (shared object)
    binary: PathBuf,

    /// Title manifest (JSON)
    manifest: PathBuf,

    /// Output file (defaults to ./<id>.glt)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let manifest = TitleManifest::load(&args.manifest)?;

    println!(
        "Packing title: {} ({})",
        manifest.title.name, manifest.title.id
    );

    let bytes = build_container(&manifest, &args.binary)?;

    let output = args.output.unwrap_or_else(|| {
        PathBuf::from(format!("{}.{}", manifest.title.id, GLT_FORMAT.extension))
    });
    std::fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Title container created: {} ({} bytes)", output.display(), bytes.len());

    if let Some(dir) = manifest.copy_target() {
        match copy_to(&output, dir)? {
            Some(dest) => println!("  Copied to: {}", dest.display()),
            None => println!("  Copy directory {} does not exist; skipped", dir.display()),
        }
    }

    Ok(())
}

/// Assemble the container bytes for a manifest and code binary
fn build_container(manifest: &TitleManifest, binary: &Path) -> Result<Vec<u8>> {
    let code = std::fs::read(binary)
        .with_context(|| format!("Failed to read binary: {}", binary.display()))?;
    println!("  Binary: {} ({} bytes)", binary.display(), code.len());

    let mut metadata = TitleMetadata::new(&manifest.title.id, &manifest.title.name)
        .with_description(&manifest.title.description)
        .with_tags(manifest.title.tags.iter().map(|tag| fit_tag(tag)));

    if let Some(icon_path) = &manifest.title.icon {
        println!("  Loading icon image: {}", icon_path.display());
        match icon::load_icon(icon_path) {
            Ok(icon) => metadata.icon = icon,
            Err(e) => println!("  Warning: {:#}; icon left blank", e),
        }
    }
    metadata.validate().context("Invalid title metadata")?;

    let pack = match &manifest.title.resources {
        Some(dir) => ResourcePack::from_dir(dir)
            .with_context(|| format!("Failed to pack resources: {}", dir.display()))?,
        None => ResourcePack::new(),
    };
    println!(
        "  Resources: {} files ({} bytes)",
        pack.len(),
        pack.data_len()
    );
    let resource = pack.to_bytes()?;

    Ok(Container::encode(&metadata, &code, &resource)?)
}

/// Cut a tag to fit its slot, as `strncpy` into the slot would
fn fit_tag(tag: &str) -> String {
    let max = GLT_FORMAT.tag_len - 1;
    if tag.len() <= max {
        return tag.to_string();
    }
    let mut end = max;
    while !tag.is_char_boundary(end) {
        end -= 1;
    }
    println!("  Warning: tag '{}' truncated to '{}'", tag, &tag[..end]);
    tag[..end].to_string()
}

/// Copy the container into `dir`, returning the destination if `dir` exists
fn copy_to(output: &Path, dir: &Path) -> Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let Some(name) = output.file_name() else {
        bail!("Output path {} has no file name", output.display());
    };
    let dest = dir.join(name);
    std::fs::copy(output, &dest)
        .with_context(|| format!("Failed to copy to {}", dest.display()))?;
    Ok(Some(dest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(dir: &Path, json: &str) -> TitleManifest {
        let path = dir.join("title.json");
        std::fs::write(&path, json).unwrap();
        TitleManifest::load(&path).unwrap()
    }

    #[test]
    fn test_build_container() {
        let dir = tempfile::tempdir().unwrap();
        let res = dir.path().join("res");
        std::fs::create_dir_all(res.join("ui")).unwrap();
        std::fs::write(res.join("AppEmpty.png"), b"png").unwrap();
        std::fs::write(res.join("ui").join("frame.bin"), b"frame").unwrap();
        std::fs::write(dir.path().join("libcube.so"), b"\x7fELF code").unwrap();

        let manifest = write_manifest(
            dir.path(),
            r#"{ "title": {
                "id": "cube", "name": "Cube", "description": "Spinning cube",
                "tags": ["demo", "graphics"], "resources": "res"
            } }"#,
        );
        let bytes = build_container(&manifest, &dir.path().join("libcube.so")).unwrap();

        let container = Container::from_bytes(bytes).unwrap();
        assert!(container.is_complete());
        assert_eq!(container.metadata().id, "cube");
        assert_eq!(container.metadata().tags, ["demo", "graphics"]);
        assert_eq!(container.code(), b"\x7fELF code");

        let pack = ResourcePack::parse(container.resource()).unwrap();
        let paths: Vec<_> = pack.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["AppEmpty.png", "ui/frame.bin"]);
    }

    #[test]
    fn test_build_without_resources_or_icon() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bin.so"), b"code").unwrap();
        let manifest = write_manifest(
            dir.path(),
            r#"{ "title": { "id": "bare", "name": "Bare", "icon": "missing.png" } }"#,
        );

        let bytes = build_container(&manifest, &dir.path().join("bin.so")).unwrap();
        let container = Container::from_bytes(bytes).unwrap();
        assert!(container.metadata().icon.iter().all(|&b| b == 0));
        assert!(ResourcePack::parse(container.resource()).unwrap().is_empty());
    }

    #[test]
    fn test_build_rejects_bad_metadata() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bin.so"), b"code").unwrap();

        let long_id = write_manifest(
            dir.path(),
            r#"{ "title": { "id": "an-id-that-is-too-long", "name": "Long" } }"#,
        );
        assert!(build_container(&long_id, &dir.path().join("bin.so")).is_err());

        let many_tags = write_manifest(
            dir.path(),
            r#"{ "title": { "id": "tags", "name": "Tags", "tags": ["a", "b", "c", "d"] } }"#,
        );
        assert!(build_container(&many_tags, &dir.path().join("bin.so")).is_err());

        let escaping_id = write_manifest(
            dir.path(),
            r#"{ "title": { "id": "../../pwn", "name": "Escape" } }"#,
        );
        assert!(build_container(&escaping_id, &dir.path().join("bin.so")).is_err());
    }

    #[test]
    fn test_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(dir.path(), r#"{ "title": { "id": "x", "name": "X" } }"#);
        assert!(build_container(&manifest, &dir.path().join("missing.so")).is_err());
    }

    #[test]
    fn test_fit_tag() {
        assert_eq!(fit_tag("short"), "short");
        assert_eq!(fit_tag("a-very-long-tag-name"), "a-very-long-tag");
        // Never splits a multi-byte character
        let tag = "ééééééééé";
        assert_eq!(fit_tag(tag), "ééééééé");
    }

    #[test]
    fn test_copy_to() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("cube.glt");
        std::fs::write(&output, b"GLTE").unwrap();

        let target = dir.path().join("titles");
        assert_eq!(copy_to(&output, &target).unwrap(), None);

        std::fs::create_dir(&target).unwrap();
        assert_eq!(copy_to(&output, &target).unwrap(), Some(target.join("cube.glt")));
        assert!(target.join("cube.glt").is_file());
    }
}
