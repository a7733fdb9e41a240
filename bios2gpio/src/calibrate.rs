//! Stage E: classification, naming, scoring, and selection.
//!
//! Surviving candidates are classified into the profile's count bands,
//! named positionally from the class group layout, optionally scored against
//! a reference header, and reduced to at most one winner per class. The
//! stages run strictly in that order; only classification may shrink the
//! candidate set.

use crate::detector::TableCandidate;
use crate::reference::{RefPad, ReferenceHeader};
use itertools::Itertools;
use log::{debug, info, warn};
use pad_types::{PadDescriptor, PadMode, PlatformProfile, TableClass};

/// A descriptor bound to its positional pad name.
#[derive(Debug, Clone)]
pub struct NamedPad {
    pub index: usize,
    pub name: String,
    pub descriptor: PadDescriptor,
}

/// A classified, named, optionally scored candidate.
#[derive(Debug, Clone)]
pub struct ClassifiedTable {
    pub class: TableClass,
    pub span: String,
    pub offset: usize,
    pub entry_size: usize,
    pub entry_count: usize,
    pub signature_match: bool,
    pub pads: Vec<NamedPad>,
    pub score: Option<usize>,
}

/// A candidate dropped during calibration, kept for diagnostic reporting.
#[derive(Debug, Clone)]
pub struct RejectedCandidate {
    pub span: String,
    pub offset: usize,
    pub entry_size: usize,
    pub entry_count: usize,
    pub reason: String,
}

/// Calibration result: winners (at most one per class) and the rejects.
#[derive(Debug, Default)]
pub struct Selection {
    pub winners: Vec<ClassifiedTable>,
    pub rejected: Vec<RejectedCandidate>,
}

impl Selection {
    pub fn winner(&self, class: TableClass) -> Option<&ClassifiedTable> {
        self.winners.iter().find(|t| t.class == class)
    }

    pub fn has_physical(&self) -> bool {
        self.winner(TableClass::Physical).is_some()
    }
}

/// Runs classification, naming, scoring, and selection over the merged
/// candidate list.
pub fn calibrate(
    candidates: Vec<TableCandidate>,
    profile: &PlatformProfile,
    reference: Option<&ReferenceHeader>,
) -> Selection {
    let mut selection = Selection::default();

    // classify: band lookup on the entry count; a signature anchor is
    // physical no matter how far it extended
    let mut classified = Vec::new();
    for candidate in candidates {
        let class = if candidate.signature_match {
            Some(TableClass::Physical)
        } else {
            profile.classify(candidate.entry_count())
        };
        match class {
            Some(class) => classified.push(classify_and_name(candidate, class, profile)),
            None => {
                debug!(
                    "Discarding candidate at 0x{:x} in '{}': {} entries fit no class band",
                    candidate.offset,
                    candidate.span,
                    candidate.entry_count()
                );
                selection.rejected.push(RejectedCandidate {
                    span: candidate.span,
                    offset: candidate.offset,
                    entry_size: candidate.entry_size,
                    entry_count: candidate.descriptors.len(),
                    reason: format!(
                        "entry count {} outside every class band",
                        candidate.descriptors.len()
                    ),
                });
            }
        }
    }

    // score
    if let Some(reference) = reference {
        for table in &mut classified {
            let score = table
                .pads
                .iter()
                .filter(|pad| {
                    reference
                        .get(&pad.name)
                        .map_or(false, |expected| reference_matches(expected, &pad.descriptor))
                })
                .count();
            debug!(
                "{} candidate at 0x{:x}: score {}/{}",
                table.class, table.offset, score, table.entry_count
            );
            table.score = Some(score);
        }
    }

    // select: per class, best score wins; ties fall to the larger table,
    // then to the smaller offset
    let by_class = classified
        .into_iter()
        .map(|t| (t.class, t))
        .into_group_map();
    for (class, mut tables) in by_class.into_iter().sorted_by_key(|(class, _)| *class) {
        tables.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(b.entry_count.cmp(&a.entry_count))
                .then(a.offset.cmp(&b.offset))
                .then(a.span.cmp(&b.span))
        });
        let mut tables = tables.into_iter();
        let winner = tables.next().expect("group is non-empty");
        info!(
            "{}: selected table at 0x{:x} in '{}' ({} entries{})",
            class,
            winner.offset,
            winner.span,
            winner.entry_count,
            winner
                .score
                .map(|s| format!(", score {}", s))
                .unwrap_or_default()
        );
        for loser in tables {
            selection.rejected.push(RejectedCandidate {
                span: loser.span,
                offset: loser.offset,
                entry_size: loser.entry_size,
                entry_count: loser.entry_count,
                reason: format!(
                    "{} table at 0x{:x} selected instead",
                    class, winner.offset
                ),
            });
        }
        selection.winners.push(winner);
    }

    if !selection.has_physical() {
        warn!("No physical table candidate survived calibration");
    }

    selection
}

fn classify_and_name(
    candidate: TableCandidate,
    class: TableClass,
    profile: &PlatformProfile,
) -> ClassifiedTable {
    let entry_count = candidate.entry_count();
    let pads = candidate
        .descriptors
        .iter()
        .enumerate()
        .filter_map(|(index, descriptor)| {
            profile.pad_name(class, index).map(|name| NamedPad {
                index,
                name,
                descriptor: *descriptor,
            })
        })
        .collect();

    ClassifiedTable {
        class,
        span: candidate.span,
        offset: candidate.offset,
        entry_size: candidate.entry_size,
        entry_count,
        signature_match: candidate.signature_match,
        pads,
        score: None,
    }
}

/// One reference pad against one decoded descriptor: the mode must agree,
/// the reset domain must agree when the reference states it, and the
/// direction must agree for GPIO-mode pads when the reference states it.
fn reference_matches(expected: &RefPad, descriptor: &PadDescriptor) -> bool {
    let mode = match descriptor.mode() {
        Some(mode) => mode,
        None => return false,
    };
    if expected.mode != mode.raw() {
        return false;
    }
    if let Some(reset) = expected.reset {
        if reset != descriptor.reset() {
            return false;
        }
    }
    if mode == PadMode::Gpio {
        if let Some(direction) = expected.direction {
            if direction != descriptor.direction() {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::RefPad;
    use crate::testutil::{triple_of, GPI_DW0, NF1_DEEP_DW0, NF1_PLTRST_DW0, SAFE_DW1};
    use pad_types::alderlake;

    fn physical_descriptors(count: usize) -> Vec<PadDescriptor> {
        (0..count)
            .map(|i| {
                let dw0 = match i {
                    0 => GPI_DW0,
                    1..=4 => NF1_PLTRST_DW0,
                    _ if i % 2 == 0 => GPI_DW0,
                    _ => NF1_PLTRST_DW0,
                };
                PadDescriptor::from_words(dw0, SAFE_DW1)
            })
            .collect()
    }

    fn vgpio_descriptors(count: usize) -> Vec<PadDescriptor> {
        (0..count)
            .map(|_| PadDescriptor::from_words(NF1_DEEP_DW0, SAFE_DW1))
            .collect()
    }

    fn candidate(
        offset: usize,
        entry_size: usize,
        descriptors: Vec<PadDescriptor>,
        signature_match: bool,
    ) -> TableCandidate {
        TableCandidate {
            span: "bios_region".to_string(),
            offset,
            entry_size,
            descriptors,
            signature_match,
        }
    }

    fn self_reference(table: &ClassifiedTable) -> ReferenceHeader {
        ReferenceHeader::from_pads(table.pads.iter().map(|pad| {
            let (mode, reset, direction) = triple_of(&pad.descriptor);
            (
                pad.name.clone(),
                RefPad {
                    mode,
                    reset: Some(reset),
                    direction,
                },
            )
        }))
    }

    #[test]
    fn classification_follows_bands() {
        let profile = alderlake::profile();
        let candidates = vec![
            candidate(0x1000, 8, physical_descriptors(253), true),
            candidate(0x9000, 12, vgpio_descriptors(38), false),
            candidate(0xA000, 16, vgpio_descriptors(12), false),
            candidate(0xB000, 16, vgpio_descriptors(80), false),
        ];
        let selection = calibrate(candidates, &profile, None);
        assert_eq!(selection.winners.len(), 4);
        assert!(selection.winner(TableClass::Physical).is_some());
        assert!(selection.winner(TableClass::Vgpio).is_some());
        assert!(selection.winner(TableClass::VgpioUsb).is_some());
        assert!(selection.winner(TableClass::VgpioPcie).is_some());
        assert!(selection.rejected.is_empty());
    }

    #[test]
    fn signature_anchor_is_physical_regardless_of_count() {
        let profile = alderlake::profile();
        // 38 entries would read as a VGPIO band, but the anchor decides
        let selection = calibrate(
            vec![candidate(0x2000, 8, physical_descriptors(38), true)],
            &profile,
            None,
        );
        let winner = selection.winner(TableClass::Physical).unwrap();
        assert_eq!(winner.entry_count, 38);
        assert!(selection.winner(TableClass::Vgpio).is_none());
    }

    #[test]
    fn out_of_band_candidates_are_rejected_with_reason() {
        let profile = alderlake::profile();
        let selection = calibrate(
            vec![candidate(0x3000, 12, vgpio_descriptors(20), false)],
            &profile,
            None,
        );
        assert!(selection.winners.is_empty());
        assert_eq!(selection.rejected.len(), 1);
        assert!(selection.rejected[0].reason.contains("outside every class band"));
    }

    #[test]
    fn physical_pads_are_named_positionally() {
        let profile = alderlake::profile();
        let selection = calibrate(
            vec![candidate(0x1000, 8, physical_descriptors(253), true)],
            &profile,
            None,
        );
        let winner = selection.winner(TableClass::Physical).unwrap();
        assert_eq!(winner.pads[0].name, "GPP_I0");
        assert_eq!(winner.pads[24].name, "GPP_R1");
        assert_eq!(winner.pads[252].name, "GPP_D21");
    }

    #[test]
    fn oversized_physical_table_drops_unnamed_tail() {
        let profile = alderlake::profile();
        let selection = calibrate(
            vec![candidate(0x1000, 8, physical_descriptors(260), true)],
            &profile,
            None,
        );
        let winner = selection.winner(TableClass::Physical).unwrap();
        assert_eq!(winner.entry_count, 260);
        // the layout ends at 255 pads; the rest have no positional identity
        assert_eq!(winner.pads.len(), 255);
    }

    #[test]
    fn vgpio_pads_are_named_with_class_prefix() {
        let profile = alderlake::profile();
        let selection = calibrate(
            vec![candidate(0x9000, 12, vgpio_descriptors(38), false)],
            &profile,
            None,
        );
        let winner = selection.winner(TableClass::Vgpio).unwrap();
        assert_eq!(winner.pads[0].name, "VGPIO_0");
        assert_eq!(winner.pads[37].name, "VGPIO_37");
    }

    #[test]
    fn scoring_a_table_against_itself_is_perfect() {
        let profile = alderlake::profile();
        let baseline = calibrate(
            vec![candidate(0x1000, 8, physical_descriptors(253), true)],
            &profile,
            None,
        );
        let reference = self_reference(baseline.winner(TableClass::Physical).unwrap());

        let selection = calibrate(
            vec![candidate(0x1000, 8, physical_descriptors(253), true)],
            &profile,
            Some(&reference),
        );
        let winner = selection.winner(TableClass::Physical).unwrap();
        assert_eq!(winner.score, Some(winner.entry_count));
    }

    #[test]
    fn score_ties_fall_to_larger_count_then_smaller_offset() {
        let profile = alderlake::profile();

        // same pad content lengths 253 vs 255: both score full marks against
        // a reference covering the common prefix, so the larger table wins
        let reference = {
            let baseline = calibrate(
                vec![candidate(0x1000, 8, physical_descriptors(253), true)],
                &profile,
                None,
            );
            self_reference(baseline.winner(TableClass::Physical).unwrap())
        };
        let selection = calibrate(
            vec![
                candidate(0x1000, 8, physical_descriptors(253), true),
                candidate(0x8000, 8, physical_descriptors(255), true),
            ],
            &profile,
            Some(&reference),
        );
        let winner = selection.winner(TableClass::Physical).unwrap();
        assert_eq!(winner.entry_count, 255);
        assert_eq!(selection.rejected.len(), 1);
        assert_eq!(selection.rejected[0].entry_count, 253);

        // identical counts: the smaller offset wins
        let selection = calibrate(
            vec![
                candidate(0x8000, 8, physical_descriptors(253), true),
                candidate(0x1000, 8, physical_descriptors(253), true),
            ],
            &profile,
            Some(&reference),
        );
        assert_eq!(selection.winner(TableClass::Physical).unwrap().offset, 0x1000);
    }

    #[test]
    fn without_reference_the_largest_table_wins() {
        let profile = alderlake::profile();
        let selection = calibrate(
            vec![
                candidate(0x8000, 8, physical_descriptors(250), true),
                candidate(0x1000, 8, physical_descriptors(253), true),
            ],
            &profile,
            None,
        );
        let winner = selection.winner(TableClass::Physical).unwrap();
        assert_eq!(winner.entry_count, 253);
        assert_eq!(winner.offset, 0x1000);
    }

    #[test]
    fn missing_vgpio_classes_are_simply_absent() {
        let profile = alderlake::profile();
        let selection = calibrate(
            vec![candidate(0x1000, 8, physical_descriptors(253), true)],
            &profile,
            None,
        );
        assert!(selection.has_physical());
        assert!(selection.winner(TableClass::Vgpio).is_none());
        assert!(selection.winner(TableClass::VgpioUsb).is_none());
        assert!(selection.winner(TableClass::VgpioPcie).is_none());
    }

    #[test]
    fn reference_mismatch_lowers_the_score() {
        let profile = alderlake::profile();
        let baseline = calibrate(
            vec![candidate(0x1000, 8, physical_descriptors(253), true)],
            &profile,
            None,
        );
        let mut pads: Vec<(String, RefPad)> = baseline
            .winner(TableClass::Physical)
            .unwrap()
            .pads
            .iter()
            .map(|pad| {
                let (mode, reset, direction) = triple_of(&pad.descriptor);
                (
                    pad.name.clone(),
                    RefPad {
                        mode,
                        reset: Some(reset),
                        direction,
                    },
                )
            })
            .collect();
        // flip one expected mode
        pads[0].1.mode = 5;
        let reference = ReferenceHeader::from_pads(pads);

        let selection = calibrate(
            vec![candidate(0x1000, 8, physical_descriptors(253), true)],
            &profile,
            Some(&reference),
        );
        let winner = selection.winner(TableClass::Physical).unwrap();
        assert_eq!(winner.score, Some(252));
    }
}
