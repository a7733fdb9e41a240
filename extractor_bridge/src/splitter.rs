//! Intel Flash Descriptor splitter invocation.

use crate::{resolve_tool, ErrorKind, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::Command;

const TOOL_NAME: &str = "ifdtool";

/// Region files the splitter leaves in the working directory.
#[derive(Debug, Clone)]
pub struct RegionFiles {
    pub descriptor: Option<PathBuf>,
    pub bios: PathBuf,
    pub me: Option<PathBuf>,
}

/// Wrapper around `ifdtool`, the descriptor splitter. The splitter is a
/// required helper: region extraction cannot proceed without it.
pub struct IfdSplitter {
    tool_path: PathBuf,
}

impl IfdSplitter {
    /// Locates the splitter binary.
    pub fn locate() -> Result<IfdSplitter> {
        let tool_path = resolve_tool(TOOL_NAME)
            .ok_or_else(|| ErrorKind::ToolNotFound(TOOL_NAME.to_string()))?;
        debug!("Using descriptor splitter at {:?}", tool_path);
        Ok(IfdSplitter { tool_path })
    }

    pub fn with_path(tool_path: PathBuf) -> IfdSplitter {
        IfdSplitter { tool_path }
    }

    /// Runs `ifdtool -x -p <platform_flag> <image>` in the working directory.
    ///
    /// The platform flag is part of the contract with the tool: without it
    /// the region files come out with the correct sizes but the wrong
    /// contents, so an empty flag is refused rather than defaulted.
    pub fn split(&self, image: &Path, platform_flag: &str, work_dir: &Path) -> Result<RegionFiles> {
        if platform_flag.is_empty() {
            return Err(ErrorKind::MissingPlatformFlag.into());
        }

        info!(
            "Splitting {:?} with platform flag '{}'",
            image, platform_flag
        );

        let output = Command::new(&self.tool_path)
            .arg("-x")
            .arg("-p")
            .arg(platform_flag)
            .arg(image)
            .current_dir(work_dir)
            .output()
            .map_err(|_| ErrorKind::ToolInvocationError(TOOL_NAME.to_string()))?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            return Err(ErrorKind::ToolFailed(TOOL_NAME.to_string(), code, stderr).into());
        }

        let bios = find_region_file(work_dir, "bios")?
            .ok_or_else(|| ErrorKind::RegionFileMissing(work_dir.to_owned()))?;
        info!("BIOS region extracted to {:?}", bios);

        Ok(RegionFiles {
            descriptor: find_region_file(work_dir, "flashdescriptor")?,
            bios,
            me: find_region_file(work_dir, "intel_me")?,
        })
    }
}

/// Finds a `flashregion_<n>_<kind>.bin` file. The region index depends on
/// the descriptor layout, so only the kind suffix is matched.
fn find_region_file(dir: &Path, kind: &str) -> Result<Option<PathBuf>> {
    let suffix = format!("_{}.bin", kind);
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_string()) {
            if name.starts_with("flashregion_") && name.ends_with(&suffix) {
                return Ok(Some(path));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_platform_flag_is_refused() {
        let splitter = IfdSplitter::with_path(PathBuf::from("/nonexistent/ifdtool"));
        let dir = tempfile::tempdir().unwrap();
        let err = splitter
            .split(Path::new("image.bin"), "", dir.path())
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MissingPlatformFlag));
    }

    #[test]
    fn region_files_are_found_by_kind_suffix() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "flashregion_0_flashdescriptor.bin",
            "flashregion_1_bios.bin",
            "flashregion_2_intel_me.bin",
            "unrelated.bin",
        ] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let bios = find_region_file(dir.path(), "bios").unwrap().unwrap();
        assert!(bios.ends_with("flashregion_1_bios.bin"));
        let me = find_region_file(dir.path(), "intel_me").unwrap().unwrap();
        assert!(me.ends_with("flashregion_2_intel_me.bin"));
        assert!(find_region_file(dir.path(), "gbe").unwrap().is_none());
    }
}
