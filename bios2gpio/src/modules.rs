//! Stage B: module enumeration.
//!
//! Yields the byte spans the detector scans. The whole BIOS region is always
//! span zero; when the volume unpacker produced a dump tree, sections whose
//! path matches a profile module pattern are appended as further spans.
//! Non-BIOS region subtrees (ME, descriptor, GbE) are skipped since their
//! pad-like data misleads detection.

use crate::Result;
use log::{debug, info};
use pad_types::PlatformProfile;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const IGNORED_SUBTREES: &[&str] = &["me region", "descriptor region", "gbe region", "padding"];

/// A read-only byte span the detector scans, labeled by origin.
pub struct ModuleSpan {
    pub name: String,
    pub data: Vec<u8>,
}

/// Builds the ordered span list: the whole region first, then every dump
/// file matching a module pattern.
pub fn enumerate_spans(
    bios_region: Vec<u8>,
    dump_root: Option<&Path>,
    profile: &PlatformProfile,
) -> Result<Vec<ModuleSpan>> {
    let mut spans = vec![ModuleSpan {
        name: "bios_region".to_string(),
        data: bios_region,
    }];

    if let Some(root) = dump_root {
        let mut files = Vec::new();
        collect_files(root, &mut files)?;

        let mut seen = BTreeSet::new();
        for path in files {
            let rel = path.strip_prefix(root).unwrap_or(&path);
            let rel_str = rel.to_string_lossy().to_lowercase();

            if IGNORED_SUBTREES.iter().any(|sub| rel_str.contains(sub)) {
                continue;
            }
            let matched = profile
                .module_patterns
                .iter()
                .any(|pattern| rel_str.contains(&pattern.to_lowercase()));
            if !matched || !seen.insert(path.clone()) {
                continue;
            }

            match std::fs::read(&path) {
                Ok(data) if !data.is_empty() => {
                    debug!("Module span: {} ({} bytes)", rel.display(), data.len());
                    spans.push(ModuleSpan {
                        name: rel.to_string_lossy().into_owned(),
                        data,
                    });
                }
                Ok(_) => {}
                Err(e) => debug!("Skipping unreadable section {:?}: {}", path, e),
            }
        }
    }

    info!(
        "Scanning {} span(s) ({} module sections)",
        spans.len(),
        spans.len() - 1
    );
    Ok(spans)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}
