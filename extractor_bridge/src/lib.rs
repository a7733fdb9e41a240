//! # Extractor Bridge
//!
//! Interface between the GPIO pipeline and the two external firmware tools it
//! drives: the Intel Flash Descriptor splitter (`ifdtool`) and the UEFI
//! volume unpacker (`UEFIExtract`). Both run as child processes inside an
//! invocation-scoped working directory; this crate owns tool discovery, the
//! invocation contract, and the working-directory lifecycle.

use error_chain::error_chain;
use std::path::PathBuf;

mod splitter;
mod unpacker;
mod workdir;

pub use splitter::{IfdSplitter, RegionFiles};
pub use unpacker::VolumeUnpacker;
pub use workdir::WorkDir;

error_chain! {
    foreign_links {
        Io(std::io::Error);
    }

    errors {
        /// Error when an external tool cannot be found on PATH or via its
        /// override environment variable
        ToolNotFound(name: String) {
            description("external tool not found")
            display("External tool '{}' not found. Install it or point the {} environment variable at the binary.", name, name.to_uppercase())
        }
        /// Error when a tool process cannot be spawned or waited on
        ToolInvocationError(name: String) {
            description("tool invocation error")
            display("Failed to invoke external tool '{}'", name)
        }
        /// Error when a tool exits with a nonzero status
        ToolFailed(name: String, exit_code: i32, stderr: String) {
            description("tool failed")
            display("External tool '{}' failed with exit code {}:\n{}", name, exit_code, stderr)
        }
        /// Error when the splitter is invoked without a platform flag
        MissingPlatformFlag {
            description("missing platform flag")
            display("Refusing to run the descriptor splitter without a platform flag; region boundaries would be silently wrong")
        }
        /// Error when the splitter ran but produced no BIOS region file
        RegionFileMissing(dir: PathBuf) {
            description("BIOS region file missing")
            display("Descriptor splitter produced no flashregion_*_bios.bin in {:?}", dir)
        }
        /// Error when the unpacker ran but produced no dump directory
        DumpMissing(dir: PathBuf) {
            description("dump directory missing")
            display("Volume unpacker produced no dump directory under {:?}", dir)
        }
        /// Error when the working directory cannot be created
        WorkDirCreation(path: PathBuf, error: std::io::Error) {
            description("failed to create working directory")
            display("Failed to create working directory {:?}: {}", path, error)
        }
    }
}

/// Resolves a tool binary: an all-caps environment variable override wins,
/// then each entry of PATH is probed.
pub fn resolve_tool(name: &str) -> Option<PathBuf> {
    if let Ok(path) = std::env::var(name.to_uppercase()) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}
