//! UEFI volume unpacker invocation.

use crate::{resolve_tool, ErrorKind, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::process::Command;

const TOOL_NAME: &str = "UEFIExtract";

/// Wrapper around `UEFIExtract`. The unpacker is optional: when it is
/// absent the pipeline scans the raw BIOS region only.
pub struct VolumeUnpacker {
    tool_path: PathBuf,
}

impl VolumeUnpacker {
    /// Locates the unpacker, logging (not failing) when it is missing.
    pub fn locate() -> Option<VolumeUnpacker> {
        match resolve_tool(TOOL_NAME) {
            Some(tool_path) => {
                debug!("Using volume unpacker at {:?}", tool_path);
                Some(VolumeUnpacker { tool_path })
            }
            None => {
                warn!("{} not found; scanning the raw BIOS region only", TOOL_NAME);
                None
            }
        }
    }

    pub fn with_path(tool_path: PathBuf) -> VolumeUnpacker {
        VolumeUnpacker { tool_path }
    }

    /// Runs `UEFIExtract <region> all` next to the region file and returns
    /// the dump directory. The tool reports partial parse problems through
    /// its exit code while still producing usable output, so the exit code
    /// is ignored as long as the dump directory materializes.
    pub fn unpack(&self, region_file: &Path) -> Result<PathBuf> {
        info!("Unpacking UEFI volumes from {:?}", region_file);

        let cwd = region_file.parent().unwrap_or(Path::new("."));
        let output = Command::new(&self.tool_path)
            .arg(region_file)
            .arg("all")
            .current_dir(cwd)
            .output()
            .map_err(|_| ErrorKind::ToolInvocationError(TOOL_NAME.to_string()))?;

        if !output.status.success() {
            debug!(
                "{} exited with {:?}; checking for partial output",
                TOOL_NAME,
                output.status.code()
            );
        }

        let dump_dir = PathBuf::from(format!("{}.dump", region_file.display()));
        let has_content = dump_dir.is_dir()
            && std::fs::read_dir(&dump_dir)
                .map(|mut entries| entries.next().is_some())
                .unwrap_or(false);
        if !has_content {
            return Err(ErrorKind::DumpMissing(cwd.to_owned()).into());
        }

        info!("UEFI volumes unpacked to {:?}", dump_dir);
        Ok(dump_dir)
    }
}
