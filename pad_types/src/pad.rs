//! Pad descriptor decoding and semantic validation.
//!
//! A pad descriptor is the pair of 32-bit configuration words (DW0, DW1) that
//! the PCH stores per GPIO line. Vendor firmware carries arrays of these in
//! 8/12/16/20-byte records; only the first eight bytes carry DW0 and DW1.
//! Both words are little-endian on flash.

use bitfield::bitfield;
use std::fmt;

bitfield! {
    /// Pad Configuration DW0
    ///
    /// Field layout follows the Intel PCH PADCFG_DW0 register:
    ///
    /// - TX state (bit 0) and RX state (bit 1) — GPIO-mode output/input latches
    /// - RX/TX buffer disable (bits 8-9)
    /// - Pad mode multiplexer (bits 10-13)
    /// - Interrupt routing: NMI/SMI/SCI/IOxAPIC (bits 17-20)
    /// - RX inversion (bit 23)
    /// - RX event trigger configuration (bits 25-26)
    /// - Pad reset domain (bits 30-31)
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct Dw0(u32);
    impl Debug;

    pub tx_state, _: 0;
    pub rx_state, _: 1;
    pub u8, rx_tx_dis, _: 9, 8;
    pub u8, pad_mode, _: 13, 10;
    pub route_nmi, _: 17;
    pub route_smi, _: 18;
    pub route_sci, _: 19;
    pub route_apic, _: 20;
    pub rx_invert, _: 23;
    pub u8, rx_ev_cfg, _: 26, 25;
    pub u8, pad_rst_cfg, _: 31, 30;
}

bitfield! {
    /// Pad Configuration DW1
    ///
    /// - Interrupt select (bits 0-7)
    /// - Termination / pull resistor configuration (bits 10-13)
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct Dw1(u32);
    impl Debug;

    pub u8, int_sel, _: 7, 0;
    pub u8, term, _: 13, 10;
}

/// Pad multiplexer selection. Raw values 8-15 do not name a function and mark
/// the descriptor as invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadMode {
    Gpio,
    Nf(u8),
}

impl PadMode {
    pub fn from_raw(raw: u8) -> Option<PadMode> {
        match raw {
            0 => Some(PadMode::Gpio),
            1..=7 => Some(PadMode::Nf(raw)),
            _ => None,
        }
    }

    pub fn raw(&self) -> u8 {
        match self {
            PadMode::Gpio => 0,
            PadMode::Nf(n) => *n,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, PadMode::Nf(_))
    }
}

impl fmt::Display for PadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PadMode::Gpio => write!(f, "GPIO"),
            PadMode::Nf(n) => write!(f, "NF{}", n),
        }
    }
}

/// Reset domain that returns the pad to its default configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadReset {
    Pwrok = 0b00,
    Deep = 0b01,
    Pltrst = 0b10,
    Rsmrst = 0b11,
}

impl PadReset {
    pub fn from_raw(raw: u8) -> PadReset {
        match raw & 0b11 {
            0b00 => PadReset::Pwrok,
            0b01 => PadReset::Deep,
            0b10 => PadReset::Pltrst,
            _ => PadReset::Rsmrst,
        }
    }
}

impl fmt::Display for PadReset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PadReset::Pwrok => "PWROK",
            PadReset::Deep => "DEEP",
            PadReset::Pltrst => "PLTRST",
            PadReset::Rsmrst => "RSMRST",
        };
        f.write_str(s)
    }
}

/// RX/TX buffer enables (DW0 bits 8-9; bit 8 disables TX, bit 9 disables RX).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxTxConfig {
    BothEnabled = 0b00,
    TxDisabled = 0b01,
    RxDisabled = 0b10,
    BothDisabled = 0b11,
}

impl RxTxConfig {
    pub fn from_raw(raw: u8) -> RxTxConfig {
        match raw & 0b11 {
            0b00 => RxTxConfig::BothEnabled,
            0b01 => RxTxConfig::TxDisabled,
            0b10 => RxTxConfig::RxDisabled,
            _ => RxTxConfig::BothDisabled,
        }
    }

    pub fn tx_enabled(&self) -> bool {
        matches!(self, RxTxConfig::BothEnabled | RxTxConfig::RxDisabled)
    }

    pub fn rx_enabled(&self) -> bool {
        matches!(self, RxTxConfig::BothEnabled | RxTxConfig::TxDisabled)
    }
}

/// GPIO direction derived from the buffer enables. Only meaningful for pads
/// in GPIO mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadDirection {
    Input,
    Output,
}

impl fmt::Display for PadDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PadDirection::Input => f.write_str("INPUT"),
            PadDirection::Output => f.write_str("OUTPUT"),
        }
    }
}

/// RX event trigger configuration (DW0 bits 25-26).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadTrigger {
    Level = 0b00,
    EdgeSingle = 0b01,
    Off = 0b10,
    EdgeBoth = 0b11,
}

impl PadTrigger {
    pub fn from_raw(raw: u8) -> PadTrigger {
        match raw & 0b11 {
            0b00 => PadTrigger::Level,
            0b01 => PadTrigger::EdgeSingle,
            0b10 => PadTrigger::Off,
            _ => PadTrigger::EdgeBoth,
        }
    }
}

impl fmt::Display for PadTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PadTrigger::Level => "LEVEL",
            PadTrigger::EdgeSingle => "EDGE_SINGLE",
            PadTrigger::Off => "OFF",
            PadTrigger::EdgeBoth => "EDGE_BOTH",
        };
        f.write_str(s)
    }
}

/// Termination / pull resistor configuration (DW1 bits 10-13). Encodings not
/// listed here are reserved on Alder Lake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadPull {
    None = 0x0,
    Down5K = 0x2,
    Down20K = 0x4,
    Up1K = 0x9,
    Up5K = 0xA,
    Up2K = 0xB,
    Up20K = 0xC,
    Up1K2K = 0xD,
    Native = 0xF,
}

impl PadPull {
    pub fn from_raw(raw: u8) -> Option<PadPull> {
        match raw & 0xF {
            0x0 => Some(PadPull::None),
            0x2 => Some(PadPull::Down5K),
            0x4 => Some(PadPull::Down20K),
            0x9 => Some(PadPull::Up1K),
            0xA => Some(PadPull::Up5K),
            0xB => Some(PadPull::Up2K),
            0xC => Some(PadPull::Up20K),
            0xD => Some(PadPull::Up1K2K),
            0xF => Some(PadPull::Native),
            _ => None,
        }
    }
}

impl fmt::Display for PadPull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PadPull::None => "NONE",
            PadPull::Down5K => "DN_5K",
            PadPull::Down20K => "DN_20K",
            PadPull::Up1K => "UP_1K",
            PadPull::Up5K => "UP_5K",
            PadPull::Up2K => "UP_2K",
            PadPull::Up20K => "UP_20K",
            PadPull::Up1K2K => "UP_1K_2K",
            PadPull::Native => "NATIVE",
        };
        f.write_str(s)
    }
}

/// Interrupt routing selections of a pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IrqRoutes {
    pub apic: bool,
    pub sci: bool,
    pub smi: bool,
    pub nmi: bool,
}

impl IrqRoutes {
    pub fn any(&self) -> bool {
        self.apic || self.sci || self.smi || self.nmi
    }
}

impl fmt::Display for IrqRoutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.apic {
            f.write_str("APIC")
        } else if self.sci {
            f.write_str("SCI")
        } else if self.smi {
            f.write_str("SMI")
        } else if self.nmi {
            f.write_str("NMI")
        } else {
            f.write_str("NONE")
        }
    }
}

/// A single pad configuration entry as stored by vendor firmware. Immutable
/// once parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadDescriptor {
    dw0: Dw0,
    dw1: Dw1,
}

impl PadDescriptor {
    /// Parses DW0/DW1 from the first eight bytes of a table entry. Returns
    /// `None` if fewer than eight bytes are available.
    pub fn parse(bytes: &[u8]) -> Option<PadDescriptor> {
        if bytes.len() < 8 {
            return None;
        }
        let dw0 = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let dw1 = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        Some(PadDescriptor::from_words(dw0, dw1))
    }

    pub fn from_words(dw0: u32, dw1: u32) -> PadDescriptor {
        PadDescriptor {
            dw0: Dw0(dw0),
            dw1: Dw1(dw1),
        }
    }

    pub fn dw0(&self) -> u32 {
        self.dw0.0
    }

    pub fn dw1(&self) -> u32 {
        self.dw1.0
    }

    pub fn mode_raw(&self) -> u8 {
        self.dw0.pad_mode()
    }

    pub fn mode(&self) -> Option<PadMode> {
        PadMode::from_raw(self.dw0.pad_mode())
    }

    pub fn reset(&self) -> PadReset {
        PadReset::from_raw(self.dw0.pad_rst_cfg())
    }

    pub fn rx_tx(&self) -> RxTxConfig {
        RxTxConfig::from_raw(self.dw0.rx_tx_dis())
    }

    /// Output iff the TX buffer drives and the RX buffer is off; everything
    /// else reads as input.
    pub fn direction(&self) -> PadDirection {
        match self.rx_tx() {
            RxTxConfig::RxDisabled => PadDirection::Output,
            _ => PadDirection::Input,
        }
    }

    pub fn tx_state(&self) -> bool {
        self.dw0.tx_state()
    }

    pub fn rx_state(&self) -> bool {
        self.dw0.rx_state()
    }

    pub fn rx_invert(&self) -> bool {
        self.dw0.rx_invert()
    }

    pub fn trigger(&self) -> PadTrigger {
        PadTrigger::from_raw(self.dw0.rx_ev_cfg())
    }

    pub fn irq_routes(&self) -> IrqRoutes {
        IrqRoutes {
            apic: self.dw0.route_apic(),
            sci: self.dw0.route_sci(),
            smi: self.dw0.route_smi(),
            nmi: self.dw0.route_nmi(),
        }
    }

    pub fn termination_raw(&self) -> u8 {
        self.dw1.term()
    }

    pub fn termination(&self) -> Option<PadPull> {
        PadPull::from_raw(self.dw1.term())
    }

    pub fn int_select(&self) -> u8 {
        self.dw1.int_sel()
    }

    /// Semantic validity check. Rejects bit patterns that cannot describe a
    /// real pad:
    ///
    /// 1. all-zero or erased-flash words,
    /// 2. a mode value outside GPIO/NF1..NF7,
    /// 3. a GPIO pad with both buffers disabled (functionally dead),
    /// 4. a native-function pad with stray GPIO latch bits,
    /// 5. a native-function pad with only one buffer enabled,
    /// 6. an interrupt route selected while the trigger is off,
    /// 7. a driven GPIO output with a pull resistor still attached.
    ///
    /// The reset-domain field is a two-bit decode and is always in range.
    pub fn is_valid(&self) -> bool {
        let dw0 = self.dw0.0;
        let dw1 = self.dw1.0;

        if dw0 == 0 && dw1 == 0 {
            return false;
        }
        if dw0 == 0xFFFF_FFFF || dw1 == 0xFFFF_FFFF {
            return false;
        }

        let mode = match self.mode() {
            Some(mode) => mode,
            None => return false,
        };

        let rx_tx = self.rx_tx();
        match mode {
            PadMode::Gpio => {
                if rx_tx == RxTxConfig::BothDisabled {
                    return false;
                }
                if rx_tx.tx_enabled() && self.termination_raw() != 0 {
                    return false;
                }
            }
            PadMode::Nf(_) => {
                if self.tx_state() || self.rx_state() {
                    return false;
                }
                if matches!(rx_tx, RxTxConfig::TxDisabled | RxTxConfig::RxDisabled) {
                    return false;
                }
            }
        }

        if self.irq_routes().any() && self.trigger() == PadTrigger::Off {
            return false;
        }

        true
    }
}
