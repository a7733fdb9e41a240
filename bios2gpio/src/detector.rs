//! Stage C: table detection.
//!
//! Two complementary strategies run over every span, in order. The signature
//! scan anchors the physical table on the profile's exact mode+reset opening
//! pattern and extends it descriptor by descriptor. The VGPIO scan walks the
//! span linearly, growing validator-accepted runs and keeping only those
//! whose length lands in a profile VGPIO size band. Candidates from both
//! strategies are merged with duplicates dropped.

use log::{debug, info};
use pad_types::{PadDescriptor, PlatformProfile};
use std::collections::BTreeSet;

/// A contiguous run of validator-accepted descriptors.
#[derive(Debug, Clone)]
pub struct TableCandidate {
    /// Label of the span this candidate was found in.
    pub span: String,
    /// Byte offset of the first descriptor within the span.
    pub offset: usize,
    pub entry_size: usize,
    pub descriptors: Vec<PadDescriptor>,
    /// Whether the candidate was anchored by the signature scan.
    pub signature_match: bool,
}

impl TableCandidate {
    pub fn entry_count(&self) -> usize {
        self.descriptors.len()
    }
}

/// Runs both detection strategies over one span.
pub fn detect_tables(
    span_name: &str,
    data: &[u8],
    profile: &PlatformProfile,
    min_entries: usize,
) -> Vec<TableCandidate> {
    let mut candidates = signature_scan(span_name, data, profile);
    let vgpio = vgpio_scan(span_name, data, profile, min_entries);

    // duplicates: same offset and entry size; signature candidates win
    let mut seen: BTreeSet<(usize, usize)> = candidates
        .iter()
        .map(|c| (c.offset, c.entry_size))
        .collect();
    for candidate in vgpio {
        if seen.insert((candidate.offset, candidate.entry_size)) {
            candidates.push(candidate);
        }
    }

    candidates
}

/// Exact-signature scan for the physical pad table.
///
/// The canonical table begins at an entry-size-aligned offset, so the outer
/// loop steps by the entry size; finer strides cost proportionally more
/// iterations without finding anything new.
pub fn signature_scan(
    span_name: &str,
    data: &[u8],
    profile: &PlatformProfile,
) -> Vec<TableCandidate> {
    let mut candidates = Vec::new();
    for &entry_size in profile.physical_entry_sizes {
        candidates.extend(signature_scan_with_stride(
            span_name, data, profile, entry_size, entry_size,
        ));
    }
    candidates
}

/// Signature scan at an explicit outer-loop stride. Split out so the
/// stepping shortcut can be checked against an exhaustive byte-wise scan.
fn signature_scan_with_stride(
    span_name: &str,
    data: &[u8],
    profile: &PlatformProfile,
    entry_size: usize,
    stride: usize,
) -> Vec<TableCandidate> {
    let mut candidates = Vec::new();
    let signature = profile.signature;
    let window = signature.len() * entry_size;
    if signature.is_empty() || data.len() < window {
        return candidates;
    }

    let mut offset = 0;
    while offset + window <= data.len() {
        if matches_signature_at(data, offset, entry_size, profile) {
            let descriptors = extend_run(data, offset, entry_size, profile.physical_extension_cap);
            info!(
                "Signature match in '{}' at 0x{:x} (entry size {}), extended to {} entries",
                span_name,
                offset,
                entry_size,
                descriptors.len()
            );
            // a table that cannot even hold its own signature is noise
            if descriptors.len() >= signature.len() {
                candidates.push(TableCandidate {
                    span: span_name.to_string(),
                    offset,
                    entry_size,
                    descriptors,
                    signature_match: true,
                });
            }
        }
        offset += stride;
    }
    candidates
}

/// Checks the full signature at one anchor offset. Both the mode and the
/// reset domain must match at every position; checking the mode alone would
/// cut specificity enough for the pattern to fire on random data.
fn matches_signature_at(
    data: &[u8],
    offset: usize,
    entry_size: usize,
    profile: &PlatformProfile,
) -> bool {
    for (i, expected) in profile.signature.iter().enumerate() {
        let entry_offset = offset + i * entry_size;
        let descriptor = match PadDescriptor::parse(&data[entry_offset..]) {
            Some(d) => d,
            None => return false,
        };
        if descriptor.mode() != Some(expected.mode) || descriptor.reset() != expected.reset {
            return false;
        }
    }
    true
}

/// Targeted heuristic scan for VGPIO tables.
///
/// VGPIO tables do not share the physical signature, so runs are grown from
/// every position and accepted purely by length: only runs whose entry count
/// falls into a profile VGPIO band survive. Runs that stretch to the ceiling
/// are the dominant false-positive source and are dropped. Any run long
/// enough to be considered is skipped in full afterwards; re-entering it at
/// a later offset would only manufacture in-band suffixes of tables already
/// judged.
pub fn vgpio_scan(
    span_name: &str,
    data: &[u8],
    profile: &PlatformProfile,
    min_entries: usize,
) -> Vec<TableCandidate> {
    let mut candidates = Vec::new();
    let min_entries = min_entries.max(1);

    for &entry_size in profile.vgpio_entry_sizes {
        let mut offset = 0;
        while offset + entry_size * min_entries <= data.len() {
            let descriptors = extend_run(data, offset, entry_size, profile.vgpio_run_ceiling);
            let count = descriptors.len();

            if count < min_entries {
                offset += 4;
                continue;
            }

            if count < profile.vgpio_run_ceiling && profile.in_vgpio_band(count) {
                debug!(
                    "VGPIO run in '{}' at 0x{:x}: {} entries of {} bytes",
                    span_name, offset, count, entry_size
                );
                candidates.push(TableCandidate {
                    span: span_name.to_string(),
                    offset,
                    entry_size,
                    descriptors,
                    signature_match: false,
                });
            }
            offset += count * entry_size;
        }
    }

    candidates
}

/// Grows a run of consecutive validator-accepted descriptors, stopping at
/// the first rejection or at the cap.
fn extend_run(data: &[u8], offset: usize, entry_size: usize, cap: usize) -> Vec<PadDescriptor> {
    let mut descriptors = Vec::new();
    let mut current = offset;
    while descriptors.len() < cap && current + entry_size <= data.len() {
        match PadDescriptor::parse(&data[current..]) {
            Some(descriptor) if descriptor.is_valid() => {
                descriptors.push(descriptor);
                current += entry_size;
            }
            _ => break,
        }
    }
    descriptors
}
