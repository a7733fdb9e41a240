//! Platform profiles.
//!
//! A profile carries everything detection needs to know about one PCH
//! generation as plain data: candidate entry sizes, the signature pattern
//! opening the canonical physical table, the VGPIO table size bands, the
//! physical pad-group ordering, and the module-name patterns worth scanning.
//! Adding a platform means adding a profile, not touching the detector.

use crate::pad::{PadMode, PadReset};
use std::fmt;

/// One position of the physical-table signature: the mode and reset domain
/// the descriptor at this index must decode to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureEntry {
    pub mode: PadMode,
    pub reset: PadReset,
}

/// Classification of a detected table, derived from entry count alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableClass {
    Physical,
    Vgpio,
    VgpioUsb,
    VgpioPcie,
}

impl fmt::Display for TableClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TableClass::Physical => "PHYSICAL",
            TableClass::Vgpio => "VGPIO",
            TableClass::VgpioUsb => "VGPIO_USB",
            TableClass::VgpioPcie => "VGPIO_PCIE",
        };
        f.write_str(s)
    }
}

/// Inclusive entry-count band mapping to a table class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassBand {
    pub class: TableClass,
    pub min: usize,
    pub max: usize,
}

impl ClassBand {
    pub fn contains(&self, count: usize) -> bool {
        self.min <= count && count <= self.max
    }
}

/// A physical pad group and its pad count, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadGroup {
    pub name: &'static str,
    pub count: usize,
}

/// Platform-specific detection data. All slices reference `'static` tables
/// defined alongside the platform.
#[derive(Debug, Clone, Copy)]
pub struct PlatformProfile {
    pub name: &'static str,
    /// Flag handed to the descriptor splitter (`ifdtool -p <flag>`).
    pub ifd_platform_flag: &'static str,
    /// Entry sizes the physical signature scan tries.
    pub physical_entry_sizes: &'static [usize],
    /// Entry sizes the VGPIO heuristic scan tries.
    pub vgpio_entry_sizes: &'static [usize],
    /// Mode+reset pattern opening the canonical physical table.
    pub signature: &'static [SignatureEntry],
    /// Hard ceiling while extending a signature anchor.
    pub physical_extension_cap: usize,
    /// Hard ceiling while extending a heuristic VGPIO run.
    pub vgpio_run_ceiling: usize,
    /// Entry-count bands keyed by class.
    pub class_bands: &'static [ClassBand],
    /// Physical groups in the order the monolithic table stores them.
    pub physical_groups: &'static [PadGroup],
    /// Pad-name prefixes of the virtual classes.
    pub vgpio_prefixes: &'static [(TableClass, &'static str)],
    /// Substrings of section names worth scanning in addition to the whole
    /// BIOS region. GUID patterns belong here only once verified against
    /// public documentation; unverified GUIDs contribute noise.
    pub module_patterns: &'static [&'static str],
}

impl PlatformProfile {
    /// Looks up the class band an entry count falls into.
    pub fn classify(&self, entry_count: usize) -> Option<TableClass> {
        self.class_bands
            .iter()
            .find(|band| band.contains(entry_count))
            .map(|band| band.class)
    }

    /// Union test over the virtual-class bands, used by the heuristic scan.
    pub fn in_vgpio_band(&self, entry_count: usize) -> bool {
        self.class_bands
            .iter()
            .filter(|band| band.class != TableClass::Physical)
            .any(|band| band.contains(entry_count))
    }

    /// Total pad count of the physical group layout.
    pub fn physical_pad_count(&self) -> usize {
        self.physical_groups.iter().map(|g| g.count).sum()
    }

    /// Positional name assignment. The i-th descriptor of a table is always
    /// the i-th pad of the class layout; identity is never inferred from
    /// descriptor contents. Returns `None` past the end of the layout
    /// (trailing padding in an oversized table).
    pub fn pad_name(&self, class: TableClass, index: usize) -> Option<String> {
        match class {
            TableClass::Physical => {
                let mut base = 0usize;
                for group in self.physical_groups {
                    if index < base + group.count {
                        return Some(format!("{}{}", group.name, index - base));
                    }
                    base += group.count;
                }
                None
            }
            _ => self
                .vgpio_prefixes
                .iter()
                .find(|(c, _)| *c == class)
                .map(|(_, prefix)| format!("{}{}", prefix, index)),
        }
    }

    /// The physical group a positional index falls into, if any.
    pub fn group_of(&self, index: usize) -> Option<&'static str> {
        let mut base = 0usize;
        for group in self.physical_groups {
            if index < base + group.count {
                return Some(group.name);
            }
            base += group.count;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::alderlake;
    use crate::profile::TableClass;

    #[test]
    fn classify_uses_band_data() {
        let profile = alderlake::profile();
        assert_eq!(profile.classify(253), Some(TableClass::Physical));
        assert_eq!(profile.classify(12), Some(TableClass::VgpioUsb));
        assert_eq!(profile.classify(38), Some(TableClass::Vgpio));
        assert_eq!(profile.classify(80), Some(TableClass::VgpioPcie));
        assert_eq!(profile.classify(150), None);
        assert_eq!(profile.classify(0), None);
    }

    #[test]
    fn bands_do_not_overlap() {
        let profile = alderlake::profile();
        for count in 0..400 {
            let hits = profile
                .class_bands
                .iter()
                .filter(|band| band.contains(count))
                .count();
            assert!(hits <= 1, "entry count {} falls into {} bands", count, hits);
        }
    }

    #[test]
    fn physical_names_follow_group_order() {
        let profile = alderlake::profile();
        assert_eq!(
            profile.pad_name(TableClass::Physical, 0).as_deref(),
            Some("GPP_I0")
        );
        // GPP_I has 23 pads, so index 23 opens GPP_R
        assert_eq!(
            profile.pad_name(TableClass::Physical, 23).as_deref(),
            Some("GPP_R0")
        );
        // index 24 into the table is GPP_R1
        assert_eq!(
            profile.pad_name(TableClass::Physical, 24).as_deref(),
            Some("GPP_R1")
        );
        let last = profile.physical_pad_count() - 1;
        assert_eq!(
            profile.pad_name(TableClass::Physical, last).as_deref(),
            Some("GPP_D23")
        );
        assert_eq!(profile.pad_name(TableClass::Physical, last + 1), None);
    }

    #[test]
    fn vgpio_names_use_prefixes() {
        let profile = alderlake::profile();
        assert_eq!(
            profile.pad_name(TableClass::Vgpio, 7).as_deref(),
            Some("VGPIO_7")
        );
        assert_eq!(
            profile.pad_name(TableClass::VgpioUsb, 0).as_deref(),
            Some("VGPIO_USB_0")
        );
        assert_eq!(
            profile.pad_name(TableClass::VgpioPcie, 79).as_deref(),
            Some("VGPIO_PCIE_79")
        );
    }
}
