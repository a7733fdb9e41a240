//! Output emission: the machine-readable JSON report and the
//! coreboot-compatible GPIO header.

use crate::calibrate::{ClassifiedTable, NamedPad, Selection};
use crate::Result;
use log::info;
use pad_types::{PadDirection, PadMode, PadPull, PlatformProfile, TableClass};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct Report {
    pub source: String,
    pub platform: String,
    pub physical_table_found: bool,
    pub tables: Vec<TableReport>,
    pub rejected: Vec<RejectedReport>,
}

#[derive(Debug, Serialize)]
pub struct TableReport {
    pub span: String,
    pub offset: String,
    pub entry_size: usize,
    pub entry_count: usize,
    pub classification: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<usize>,
    pub pads: Vec<PadReport>,
}

#[derive(Debug, Serialize)]
pub struct PadReport {
    pub name: String,
    pub mode: String,
    pub reset: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    pub termination: String,
    pub interrupt: String,
    pub dw0: String,
    pub dw1: String,
}

#[derive(Debug, Serialize)]
pub struct RejectedReport {
    pub span: String,
    pub offset: String,
    pub entry_size: usize,
    pub entry_count: usize,
    pub reason: String,
}

/// Builds the report from the calibration result. The construction is a
/// pure function of its inputs, so identical pipelines serialize to
/// identical bytes.
pub fn build_report(source: &str, profile: &PlatformProfile, selection: &Selection) -> Report {
    Report {
        source: source.to_string(),
        platform: profile.name.to_string(),
        physical_table_found: selection.has_physical(),
        tables: selection.winners.iter().map(table_report).collect(),
        rejected: selection
            .rejected
            .iter()
            .map(|r| RejectedReport {
                span: r.span.clone(),
                offset: format!("0x{:x}", r.offset),
                entry_size: r.entry_size,
                entry_count: r.entry_count,
                reason: r.reason.clone(),
            })
            .collect(),
    }
}

fn table_report(table: &ClassifiedTable) -> TableReport {
    TableReport {
        span: table.span.clone(),
        offset: format!("0x{:x}", table.offset),
        entry_size: table.entry_size,
        entry_count: table.entry_count,
        classification: table.class.to_string(),
        score: table.score,
        pads: table.pads.iter().map(pad_report).collect(),
    }
}

fn pad_report(pad: &NamedPad) -> PadReport {
    let descriptor = &pad.descriptor;
    let mode = descriptor.mode().map(|m| m.to_string()).unwrap_or_default();
    let direction = match descriptor.mode() {
        Some(PadMode::Gpio) => Some(descriptor.direction().to_string()),
        _ => None,
    };
    PadReport {
        name: pad.name.clone(),
        mode,
        reset: descriptor.reset().to_string(),
        direction,
        termination: descriptor
            .termination()
            .unwrap_or(PadPull::None)
            .to_string(),
        interrupt: descriptor.irq_routes().to_string(),
        dw0: format!("0x{:08x}", descriptor.dw0()),
        dw1: format!("0x{:08x}", descriptor.dw1()),
    }
}

pub fn write_json(report: &Report, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    info!("Wrote JSON report to {:?}", path);
    Ok(())
}

/// Renders the coreboot header: one macro per named pad, physical pads
/// grouped by pad group in layout order, virtual tables rendered through
/// `_PAD_CFG_STRUCT`.
pub fn render_coreboot_header(
    source: &str,
    profile: &PlatformProfile,
    selection: &Selection,
) -> String {
    let mut out = String::new();
    out.push_str("/* SPDX-License-Identifier: GPL-2.0-only */\n");
    let _ = writeln!(out, "/* GPIO configuration extracted from {} */\n", source);
    out.push_str("#ifndef CFG_GPIO_H\n#define CFG_GPIO_H\n\n#include <gpio.h>\n\n");

    if let Some(table) = selection.winner(TableClass::Physical) {
        out.push_str("/* Pad configuration in ramstage */\n");
        out.push_str("static const struct pad_config gpio_table[] = {\n");
        let mut current_group = None;
        for pad in &table.pads {
            let group = profile.group_of(pad.index);
            if group != current_group {
                if let Some(name) = group {
                    let _ = writeln!(out, "\t/* {} */", name);
                }
                current_group = group;
            }
            let _ = writeln!(out, "\t{}", physical_macro(pad));
        }
        out.push_str("};\n\n");
    }

    for class in [TableClass::Vgpio, TableClass::VgpioUsb, TableClass::VgpioPcie] {
        if let Some(table) = selection.winner(class) {
            let _ = writeln!(
                out,
                "/* {} pads ({} entries) */",
                class, table.entry_count
            );
            let _ = writeln!(
                out,
                "static const struct pad_config {}_table[] = {{",
                class.to_string().to_lowercase()
            );
            for pad in &table.pads {
                let _ = writeln!(
                    out,
                    "\t_PAD_CFG_STRUCT({}, 0x{:08x}, 0x{:08x}),",
                    pad.name,
                    pad.descriptor.dw0(),
                    pad.descriptor.dw1()
                );
            }
            out.push_str("};\n\n");
        }
    }

    out.push_str("#endif /* CFG_GPIO_H */\n");
    out
}

fn physical_macro(pad: &NamedPad) -> String {
    let descriptor = &pad.descriptor;
    let reset = descriptor.reset();
    let pull = descriptor.termination().unwrap_or(PadPull::None);

    match descriptor.mode() {
        Some(PadMode::Nf(n)) => {
            format!("PAD_CFG_NF({}, {}, {}, NF{}),", pad.name, pull, reset, n)
        }
        _ => match descriptor.direction() {
            PadDirection::Output => format!(
                "PAD_CFG_GPO({}, {}, {}),",
                pad.name,
                descriptor.tx_state() as u8,
                reset
            ),
            PadDirection::Input => {
                let routes = descriptor.irq_routes();
                let invert = if descriptor.rx_invert() {
                    "INVERT"
                } else {
                    "NONE"
                };
                if routes.any() {
                    format!(
                        "PAD_CFG_GPI_{}({}, {}, {}, {}, {}),",
                        routes,
                        pad.name,
                        pull,
                        reset,
                        descriptor.trigger(),
                        invert
                    )
                } else {
                    format!("PAD_CFG_GPI({}, {}, {}),", pad.name, pull, reset)
                }
            }
        },
    }
}

pub fn write_coreboot_header(
    source: &str,
    profile: &PlatformProfile,
    selection: &Selection,
    path: &Path,
) -> Result<()> {
    std::fs::write(path, render_coreboot_header(source, profile, selection))?;
    info!("Wrote coreboot header to {:?}", path);
    Ok(())
}
