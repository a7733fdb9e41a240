//! Stage A: BIOS region extraction.
//!
//! Splits the flash image into its descriptor-defined regions by driving the
//! external descriptor splitter, then loads the BIOS region bytes. The
//! platform tag is load-bearing here: the splitter decodes Alder Lake region
//! boundaries only when told so, and without the flag it produces region
//! files of the correct size with the wrong content.

use crate::{ErrorKind, Result};
use extractor_bridge::IfdSplitter;
use log::{debug, info};
use pad_types::PlatformProfile;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Flash descriptor signature, little-endian at byte 16 of the image.
const IFD_SIGNATURE: u32 = 0x0FF0_A55A;
const IFD_SIGNATURE_OFFSET: usize = 16;

/// The extracted BIOS region: its bytes plus the on-disk file the splitter
/// produced (the unpacker wants a file path).
pub struct BiosRegion {
    pub data: Vec<u8>,
    pub path: PathBuf,
}

/// Checks the descriptor signature without loading the whole image.
pub fn check_ifd_signature(image: &Path) -> Result<()> {
    let mut header = [0u8; IFD_SIGNATURE_OFFSET + 4];
    let mut file = std::fs::File::open(image)?;
    file.read_exact(&mut header)
        .map_err(|_| ErrorKind::NotDescriptorFormatted)?;

    let sig = u32::from_le_bytes([
        header[IFD_SIGNATURE_OFFSET],
        header[IFD_SIGNATURE_OFFSET + 1],
        header[IFD_SIGNATURE_OFFSET + 2],
        header[IFD_SIGNATURE_OFFSET + 3],
    ]);
    if sig != IFD_SIGNATURE {
        return Err(ErrorKind::NotDescriptorFormatted.into());
    }
    Ok(())
}

/// Extracts the BIOS region from a descriptor-formatted image.
pub fn extract_bios_region(
    image: &Path,
    profile: &PlatformProfile,
    work_dir: &Path,
) -> Result<BiosRegion> {
    check_ifd_signature(image)?;

    info!(
        "Extracting BIOS region for platform '{}' (splitter flag '{}')",
        profile.name, profile.ifd_platform_flag
    );

    let splitter = IfdSplitter::locate()?;
    let regions = splitter.split(image, profile.ifd_platform_flag, work_dir)?;

    let data = std::fs::read(&regions.bios)?;
    let image_len = std::fs::metadata(image)?.len() as usize;
    debug!(
        "BIOS region: {} bytes of a {} byte image",
        data.len(),
        image_len
    );

    // A region as large as the whole image (or empty) means the descriptor
    // did not decode as this platform's layout.
    if data.is_empty() || data.len() >= image_len {
        return Err(ErrorKind::DescriptorPlatformMismatch.into());
    }

    Ok(BiosRegion {
        data,
        path: regions.bios,
    })
}
