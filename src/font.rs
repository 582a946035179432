use std::ops::Range;

use itertools::Itertools;

use crate::chunks::Pdta;
use crate::records::{Bag, Generator, Modulator, RecordName, SampleHeader};
use crate::LoadError;

/// Preset header with its zone range materialized.
#[derive(Clone, Debug)]
pub(crate) struct PresetSpan {
    pub name: RecordName,
    pub program: u16,
    pub bank: u16,
    pub zones: Range<usize>,
}

/// Instrument header with its zone range materialized.
#[derive(Clone, Debug)]
pub(crate) struct InstrumentSpan {
    pub name: RecordName,
    pub zones: Range<usize>,
}

/// Zone with its generator and modulator runs materialized.
#[derive(Clone, Debug)]
pub(crate) struct ZoneSpan {
    pub gens: Range<usize>,
    pub mods: Range<usize>,
}

/// Cross-checked tables with every index chain resolved to ranges. The
/// sentinel records that close each chain are consumed here and never reach
/// the resolver.
#[derive(Debug)]
pub(crate) struct Soundfont {
    pub presets: Vec<PresetSpan>,
    pub pzones: Vec<ZoneSpan>,
    pub pgens: Vec<Generator>,
    pub pmods: Vec<Modulator>,
    pub instruments: Vec<InstrumentSpan>,
    pub izones: Vec<ZoneSpan>,
    pub igens: Vec<Generator>,
    pub imods: Vec<Modulator>,
    pub samples: Vec<SampleHeader>,
}

impl Soundfont {
    /// Validates the raw arrays and links them. Any out-of-bounds or
    /// unsorted start index is a fatal consistency error.
    pub fn link(pdta: Pdta) -> Result<Soundfont, LoadError> {
        let Pdta {
            phdr,
            pbag,
            pmod,
            pgen,
            inst,
            ibag,
            imod,
            igen,
            mut shdr,
        } = pdta;

        let pstarts: Vec<u16> = phdr.iter().map(|h| h.zone_start).collect();
        check_chain("preset", "zone", &pstarts, pbag.len())?;
        let pzones = link_zones("preset zone", &pbag, pgen.len(), pmod.len())?;

        let istarts: Vec<u16> = inst.iter().map(|h| h.zone_start).collect();
        check_chain("instrument", "zone", &istarts, ibag.len())?;
        let izones = link_zones("instrument zone", &ibag, igen.len(), imod.len())?;

        let presets = spans(&pstarts)
            .zip(phdr)
            .map(|(zones, h)| PresetSpan {
                name: h.name,
                program: h.program,
                bank: h.bank,
                zones,
            })
            .collect();
        let instruments = spans(&istarts)
            .zip(inst)
            .map(|(zones, h)| InstrumentSpan {
                name: h.name,
                zones,
            })
            .collect();

        // The terminal sample record only closes the array.
        shdr.truncate(shdr.len().saturating_sub(1));

        Ok(Soundfont {
            presets,
            pzones,
            pgens: pgen,
            pmods: pmod,
            instruments,
            izones,
            igens: igen,
            imods: imod,
            samples: shdr,
        })
    }
}

/// Consecutive start indices become half-open ranges; the last record of a
/// chain only closes the one before it.
fn spans(starts: &[u16]) -> impl Iterator<Item = Range<usize>> + '_ {
    starts
        .iter()
        .copied()
        .tuple_windows()
        .map(|(a, b)| a as usize..b as usize)
}

fn check_chain(
    array: &'static str,
    field: &'static str,
    starts: &[u16],
    limit: usize,
) -> Result<(), LoadError> {
    for (i, (a, b)) in starts.iter().copied().tuple_windows().enumerate() {
        if a as usize >= limit {
            return Err(LoadError::BadIndex {
                array,
                field,
                index: i,
                value: a,
                limit,
            });
        }
        if b < a {
            return Err(LoadError::Unordered {
                array,
                field,
                index: i + 1,
                value: b,
                prev: a,
            });
        }
    }
    if let Some(&last) = starts.last() {
        if last as usize >= limit {
            return Err(LoadError::BadIndex {
                array,
                field,
                index: starts.len() - 1,
                value: last,
                limit,
            });
        }
    }
    Ok(())
}

fn link_zones(
    array: &'static str,
    bags: &[Bag],
    gen_limit: usize,
    mod_limit: usize,
) -> Result<Vec<ZoneSpan>, LoadError> {
    let gen_starts: Vec<u16> = bags.iter().map(|b| b.gen_start).collect();
    check_chain(array, "generator", &gen_starts, gen_limit)?;
    let mod_starts: Vec<u16> = bags.iter().map(|b| b.mod_start).collect();
    check_chain(array, "modulator", &mod_starts, mod_limit)?;
    Ok(spans(&gen_starts)
        .zip(spans(&mod_starts))
        .map(|(gens, mods)| ZoneSpan { gens, mods })
        .collect())
}
