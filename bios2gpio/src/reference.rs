//! Reference header parsing.
//!
//! A reference header is a coreboot-style `gpio.h` used purely for scoring
//! candidate tables. Only the pad name, mode, reset domain, and direction
//! are extracted from each macro invocation; every other argument is
//! ignored. The reference never influences classification.

use crate::{ErrorKind, Result};
use lazy_static::lazy_static;
use log::{debug, info};
use pad_types::{PadDescriptor, PadDirection, PadMode, PadReset};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

lazy_static! {
    static ref MACRO_REGEX: Regex =
        Regex::new(r"^\s*PAD_CFG_([A-Z0-9_]+)\s*\(\s*([A-Za-z0-9_]+)\s*,(.*)$").unwrap();
    static ref STRUCT_REGEX: Regex =
        Regex::new(r"^\s*_PAD_CFG_STRUCT\s*\(\s*([A-Za-z0-9_]+)\s*,(.*)$").unwrap();
    static ref NF_REGEX: Regex = Regex::new(r"\bNF(\d+)\b").unwrap();
    static ref PAD_FUNC_REGEX: Regex = Regex::new(r"PAD_FUNC\(NF(\d+)\)").unwrap();
    static ref PAD_RESET_REGEX: Regex = Regex::new(r"PAD_RESET\(([A-Z]+)\)").unwrap();
    static ref HEX_REGEX: Regex = Regex::new(r"0[xX]([0-9A-Fa-f]+)").unwrap();
}

/// Expected configuration of one reference pad. `mode` is the raw
/// multiplexer value (0 for GPIO, n for NFn); reset and direction are only
/// compared when the macro states them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefPad {
    pub mode: u8,
    pub reset: Option<PadReset>,
    pub direction: Option<PadDirection>,
}

/// Parsed reference header: pad name to expected configuration.
#[derive(Debug, Default)]
pub struct ReferenceHeader {
    pads: HashMap<String, RefPad>,
}

impl ReferenceHeader {
    pub fn parse_file(path: &Path) -> Result<ReferenceHeader> {
        let text = std::fs::read_to_string(path)?;
        let header = Self::parse_str(&text)?;
        info!(
            "Loaded {} reference pads from {:?}",
            header.pads.len(),
            path
        );
        Ok(header)
    }

    pub fn parse_str(text: &str) -> Result<ReferenceHeader> {
        let mut pads = HashMap::new();

        for (line_index, line) in text.lines().enumerate() {
            let line_number = line_index + 1;

            if let Some(caps) = MACRO_REGEX.captures(line) {
                let macro_type = &caps[1];
                let name = caps[2].trim().to_string();
                let rest = &caps[3];

                let pad = if macro_type.starts_with("GPO") {
                    RefPad {
                        mode: 0,
                        reset: reset_argument(rest),
                        direction: Some(PadDirection::Output),
                    }
                } else if macro_type.starts_with("GPI") {
                    RefPad {
                        mode: 0,
                        reset: reset_argument(rest),
                        direction: Some(PadDirection::Input),
                    }
                } else if macro_type.starts_with("NF") {
                    let mode = NF_REGEX
                        .captures(rest)
                        .and_then(|c| c[1].parse::<u8>().ok())
                        .ok_or_else(|| {
                            ErrorKind::ReferenceParseError(line_number, line.trim().to_string())
                        })?;
                    RefPad {
                        mode,
                        reset: reset_argument(rest),
                        direction: None,
                    }
                } else {
                    debug!(
                        "Ignoring unrecognized macro PAD_CFG_{} at line {}",
                        macro_type, line_number
                    );
                    continue;
                };

                pads.insert(name, pad);
                continue;
            }

            if let Some(caps) = STRUCT_REGEX.captures(line) {
                let name = caps[1].trim().to_string();
                let rest = &caps[2];
                pads.insert(name, parse_struct_config(rest));
            }
        }

        Ok(ReferenceHeader { pads })
    }

    /// Builds a reference directly from expected pad triples; used when
    /// scoring a table against itself.
    pub fn from_pads<I: IntoIterator<Item = (String, RefPad)>>(pads: I) -> ReferenceHeader {
        ReferenceHeader {
            pads: pads.into_iter().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RefPad> {
        self.pads.get(name)
    }

    pub fn len(&self) -> usize {
        self.pads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pads.is_empty()
    }
}

/// The reset domain is the third macro argument across all recognized
/// forms, i.e. the second element after the pad name.
fn reset_argument(rest: &str) -> Option<PadReset> {
    let arg = rest.split(',').nth(1)?;
    parse_reset_token(arg.trim().trim_end_matches(')').trim())
}

fn parse_reset_token(token: &str) -> Option<PadReset> {
    match token {
        "PWROK" => Some(PadReset::Pwrok),
        "DEEP" => Some(PadReset::Deep),
        "PLTRST" => Some(PadReset::Pltrst),
        "RSMRST" => Some(PadReset::Rsmrst),
        _ => None,
    }
}

/// `_PAD_CFG_STRUCT` carries either raw DW0/DW1 literals or an OR-chain of
/// field macros. Raw literals are decoded like a table entry; otherwise the
/// `PAD_FUNC`/`PAD_RESET` tokens are picked out.
fn parse_struct_config(rest: &str) -> RefPad {
    let mut hex = HEX_REGEX.captures_iter(rest);
    let dw0 = hex
        .next()
        .and_then(|c| u32::from_str_radix(&c[1], 16).ok());
    if rest.trim_start().starts_with("0x") || rest.trim_start().starts_with("0X") {
        if let Some(dw0) = dw0 {
            let dw1 = hex
                .next()
                .and_then(|c| u32::from_str_radix(&c[1], 16).ok())
                .unwrap_or(0);
            let descriptor = PadDescriptor::from_words(dw0, dw1);
            let mode = descriptor.mode().unwrap_or(PadMode::Gpio);
            let direction = match mode {
                PadMode::Gpio => Some(descriptor.direction()),
                _ => None,
            };
            return RefPad {
                mode: mode.raw(),
                reset: Some(descriptor.reset()),
                direction,
            };
        }
    }

    let mode = PAD_FUNC_REGEX
        .captures(rest)
        .and_then(|c| c[1].parse::<u8>().ok())
        .unwrap_or(0);
    let reset = PAD_RESET_REGEX
        .captures(rest)
        .and_then(|c| parse_reset_token(&c[1]));
    RefPad {
        mode,
        reset,
        direction: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
/* Pad configuration in ramstage */
static const struct pad_config gpio_table[] = {
	/* A0 : ESPI_IO0 */
	PAD_CFG_NF(GPP_A0, NONE, DEEP, NF1),
	/* B4 : recovery strap */
	PAD_CFG_GPI(GPP_B4, UP_20K, PLTRST),
	/* B12 : SLP_S0# */
	PAD_CFG_GPO(GPP_B12, 1, PLTRST),
	/* C8 : touchpad interrupt */
	PAD_CFG_GPI_APIC(GPP_C8, NONE, PLTRST, LEVEL, INVERT),
	/* E3 : SCI */
	PAD_CFG_GPI_SCI(GPP_E3, NONE, DEEP, EDGE_SINGLE, NONE),
	/* unrecognized forms are skipped */
	PAD_CFG_TERM_GPO(GPP_F9, 0, UP_5K, PLTRST),
	_PAD_CFG_STRUCT(VGPIO_3, PAD_FUNC(NF1) | PAD_RESET(DEEP) | PAD_CFG0_NAFVWE_ENABLE, 0),
	_PAD_CFG_STRUCT(VGPIO_USB_2, 0x40000400, 0x00000000),
};
"#;

    #[test]
    fn standard_macros_parse() {
        let header = ReferenceHeader::parse_str(SAMPLE).unwrap();

        let nf = header.get("GPP_A0").unwrap();
        assert_eq!(nf.mode, 1);
        assert_eq!(nf.reset, Some(PadReset::Deep));
        assert_eq!(nf.direction, None);

        let gpi = header.get("GPP_B4").unwrap();
        assert_eq!(gpi.mode, 0);
        assert_eq!(gpi.reset, Some(PadReset::Pltrst));
        assert_eq!(gpi.direction, Some(PadDirection::Input));

        let gpo = header.get("GPP_B12").unwrap();
        assert_eq!(gpo.mode, 0);
        assert_eq!(gpo.direction, Some(PadDirection::Output));

        let apic = header.get("GPP_C8").unwrap();
        assert_eq!(apic.direction, Some(PadDirection::Input));
        assert_eq!(apic.reset, Some(PadReset::Pltrst));

        let sci = header.get("GPP_E3").unwrap();
        assert_eq!(sci.reset, Some(PadReset::Deep));
    }

    #[test]
    fn struct_macros_parse_tokens_and_literals() {
        let header = ReferenceHeader::parse_str(SAMPLE).unwrap();

        let tokens = header.get("VGPIO_3").unwrap();
        assert_eq!(tokens.mode, 1);
        assert_eq!(tokens.reset, Some(PadReset::Deep));

        // 0x40000400 decodes as NF1 on DEEP
        let raw = header.get("VGPIO_USB_2").unwrap();
        assert_eq!(raw.mode, 1);
        assert_eq!(raw.reset, Some(PadReset::Deep));
        assert_eq!(raw.direction, None);
    }

    #[test]
    fn unrecognized_macros_are_skipped() {
        let header = ReferenceHeader::parse_str(SAMPLE).unwrap();
        assert!(header.get("GPP_F9").is_none());
        assert_eq!(header.len(), 7);
    }

    #[test]
    fn malformed_nf_macro_is_an_error() {
        let err = ReferenceHeader::parse_str("PAD_CFG_NF(GPP_A0, NONE, DEEP)\n").unwrap_err();
        match err.kind() {
            ErrorKind::ReferenceParseError(line, _) => assert_eq!(*line, 1),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn empty_input_is_empty_reference() {
        let header = ReferenceHeader::parse_str("").unwrap();
        assert!(header.is_empty());
    }
}
