//! Alder Lake (PCH-S, Z690/H670/B660) platform data.
//!
//! Group layout and pad counts follow the Intel Alder Lake PCH datasheet;
//! the signature encodes the start of the canonical physical table (GPP_I0 in
//! GPIO mode followed by the four DDSP_HPD native-function pads, all on
//! PLTRST).

use crate::pad::{PadMode, PadReset};
use crate::profile::{ClassBand, PadGroup, PlatformProfile, SignatureEntry, TableClass};

const SIGNATURE: &[SignatureEntry] = &[
    SignatureEntry {
        mode: PadMode::Gpio,
        reset: PadReset::Pltrst,
    },
    SignatureEntry {
        mode: PadMode::Nf(1),
        reset: PadReset::Pltrst,
    },
    SignatureEntry {
        mode: PadMode::Nf(1),
        reset: PadReset::Pltrst,
    },
    SignatureEntry {
        mode: PadMode::Nf(1),
        reset: PadReset::Pltrst,
    },
    SignatureEntry {
        mode: PadMode::Nf(1),
        reset: PadReset::Pltrst,
    },
];

// Physical groups in monolithic table order, by community. The virtual
// groups are absent from the 8-byte table and live in their own tables.
const PHYSICAL_GROUPS: &[PadGroup] = &[
    // community 0
    PadGroup {
        name: "GPP_I",
        count: 23,
    },
    PadGroup {
        name: "GPP_R",
        count: 22,
    },
    PadGroup {
        name: "GPP_J",
        count: 12,
    },
    // community 1
    PadGroup {
        name: "GPP_B",
        count: 24,
    },
    PadGroup {
        name: "GPP_G",
        count: 8,
    },
    PadGroup {
        name: "GPP_H",
        count: 24,
    },
    // community 2
    PadGroup {
        name: "GPD",
        count: 13,
    },
    // community 3
    PadGroup {
        name: "GPP_A",
        count: 15,
    },
    PadGroup {
        name: "GPP_C",
        count: 24,
    },
    // community 4
    PadGroup {
        name: "GPP_S",
        count: 8,
    },
    PadGroup {
        name: "GPP_E",
        count: 22,
    },
    PadGroup {
        name: "GPP_K",
        count: 12,
    },
    PadGroup {
        name: "GPP_F",
        count: 24,
    },
    // community 5
    PadGroup {
        name: "GPP_D",
        count: 24,
    },
];

const CLASS_BANDS: &[ClassBand] = &[
    ClassBand {
        class: TableClass::VgpioUsb,
        min: 10,
        max: 15,
    },
    ClassBand {
        class: TableClass::Vgpio,
        min: 35,
        max: 40,
    },
    ClassBand {
        class: TableClass::VgpioPcie,
        min: 75,
        max: 85,
    },
    ClassBand {
        class: TableClass::Physical,
        min: 250,
        max: 260,
    },
];

const VGPIO_PREFIXES: &[(TableClass, &str)] = &[
    (TableClass::Vgpio, "VGPIO_"),
    (TableClass::VgpioUsb, "VGPIO_USB_"),
    (TableClass::VgpioPcie, "VGPIO_PCIE_"),
];

// Name substrings of UEFI sections that typically carry pad tables. These
// are verified against public firmware trees; FSP GUIDs stay out until they
// can be cited.
const MODULE_PATTERNS: &[&str] = &[
    "Gpio",
    "GPIO",
    "PchInit",
    "PchGpio",
    "SiliconInit",
    "GpioInit",
    "PlatformGpio",
    "PchSmi",
];

pub const PROFILE: PlatformProfile = PlatformProfile {
    name: "alderlake",
    ifd_platform_flag: "adl",
    physical_entry_sizes: &[8],
    vgpio_entry_sizes: &[12, 16],
    signature: SIGNATURE,
    physical_extension_cap: 350,
    vgpio_run_ceiling: 100,
    class_bands: CLASS_BANDS,
    physical_groups: PHYSICAL_GROUPS,
    vgpio_prefixes: VGPIO_PREFIXES,
    module_patterns: MODULE_PATTERNS,
};

pub fn profile() -> PlatformProfile {
    PROFILE
}
