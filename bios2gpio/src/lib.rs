//! # bios2gpio
//!
//! Reverse-engineers Intel PCH GPIO pad configuration tables out of vendor
//! UEFI firmware images and emits a coreboot-compatible GPIO header.
//!
//! The pipeline runs in five stages, each consuming the previous stage's
//! output: region extraction, module enumeration, table detection, pad
//! validation (inside detection), and calibration/selection. One flash image
//! is processed end-to-end per invocation; given identical inputs the output
//! is bit-identical across runs.

use error_chain::error_chain;

pub mod calibrate;
pub mod detector;
pub mod extractor;
pub mod modules;
pub mod reference;
pub mod report;

#[cfg(test)]
pub(crate) mod testutil;

error_chain! {
    links {
        Bridge(extractor_bridge::Error, extractor_bridge::ErrorKind);
    }

    foreign_links {
        Io(std::io::Error);
        Json(serde_json::Error);
    }

    errors {
        /// Error when the flash image carries no Intel Flash Descriptor
        NotDescriptorFormatted {
            description("image is not descriptor-formatted")
            display("Input image carries no Intel Flash Descriptor signature; cannot locate the BIOS region")
        }
        /// Error when the descriptor decodes to an implausible BIOS region
        DescriptorPlatformMismatch {
            description("descriptor does not match the platform")
            display("Descriptor decoded to an implausible BIOS region; the image likely belongs to a different platform family")
        }
        /// Error when the platform tag names no known profile
        UnsupportedPlatform(tag: String) {
            description("unsupported platform")
            display("Unsupported platform '{}'", tag)
        }
        /// Error when detection and calibration produced no physical table
        NoPhysicalTableFound {
            description("no physical table found")
            display("Pipeline completed but no physical GPIO table survived detection and calibration")
        }
        /// Error when the reference header cannot be parsed
        ReferenceParseError(line: usize, text: String) {
            description("reference header parse error")
            display("Failed to parse reference header at line {}: {}", line, text)
        }
    }
}
