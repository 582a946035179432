use std::collections::HashSet;
use std::ops::Range;

use crate::bank::{Param, SoundFactory, SoundShape};
use crate::font::{Soundfont, ZoneSpan};
use crate::genmod::GenModList;
use crate::records::{GenId, Generator, Modulator, RecordName, GEN_NAMES};

/// Generator id to synthesis parameter. Ids handled structurally (sample
/// offsets, ranges, the level selectors) stay unmapped here.
const GEN_PARAM: [Option<Param>; 60] = [
    None,
    None,
    None,
    None,
    None,
    Some(Param::ModLfoToPitch),
    Some(Param::VibLfoToPitch),
    Some(Param::ModEnvToPitch),
    Some(Param::FilterCutoff),
    Some(Param::FilterResonance),
    Some(Param::ModLfoToFilterCutoff),
    Some(Param::ModEnvToFilterCutoff),
    None,
    Some(Param::ModLfoToVolume),
    None,
    Some(Param::ChorusSend),
    Some(Param::ReverbSend),
    Some(Param::Pan),
    None,
    None,
    None,
    Some(Param::ModLfoDelay),
    Some(Param::ModLfoFrequency),
    Some(Param::VibLfoDelay),
    Some(Param::VibLfoFrequency),
    Some(Param::ModEnvDelay),
    Some(Param::ModEnvAttack),
    Some(Param::ModEnvHold),
    Some(Param::ModEnvDecay),
    Some(Param::ModEnvSustain),
    Some(Param::ModEnvRelease),
    Some(Param::KeyToModEnvHold),
    Some(Param::KeyToModEnvDecay),
    Some(Param::VolEnvDelay),
    Some(Param::VolEnvAttack),
    Some(Param::VolEnvHold),
    Some(Param::VolEnvDecay),
    Some(Param::VolEnvSustain),
    Some(Param::VolEnvRelease),
    Some(Param::KeyToVolEnvHold),
    Some(Param::KeyToVolEnvDecay),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    Some(Param::Attenuation),
    None,
    None,
    Some(Param::CoarseTune),
    Some(Param::FineTune),
    None,
    Some(Param::LoopMode),
    None,
    Some(Param::ScaleTuning),
    Some(Param::ExclusiveClass),
    Some(Param::RootKey),
    None,
];

/// Which level of the preset-to-instrument-to-sample chain a zone walk
/// operates on. The instrument level carries the preset-level list to
/// accumulate into each sample zone.
#[derive(Clone, Copy)]
enum Level<'a> {
    Preset,
    Instrument { parent: &'a GenModList },
}

impl Level<'_> {
    #[inline]
    fn leaf(&self) -> u16 {
        match self {
            Level::Preset => GenId::INSTRUMENT,
            Level::Instrument { .. } => GenId::SAMPLE_ID,
        }
    }

    #[inline]
    fn is_preset(&self) -> bool {
        matches!(self, Level::Preset)
    }

    fn label(&self) -> &'static str {
        match self {
            Level::Preset => "Preset",
            Level::Instrument { .. } => "Instrument",
        }
    }
}

struct Pool<'a> {
    zones: &'a [ZoneSpan],
    gens: &'a [Generator],
    mods: &'a [Modulator],
}

/// Walks every preset and resolves its zones into factory objects. Returns
/// the presets in file order; presets without a single resolvable sound
/// are left out.
pub(crate) fn resolve<F: SoundFactory>(font: &Soundfont, factory: &mut F) -> Vec<F::Preset> {
    let mut warned = HashSet::new();
    let mut presets = Vec::new();
    for preset in &font.presets {
        let mut sounds = Vec::new();
        resolve_zones(
            font,
            Level::Preset,
            &preset.name,
            preset.zones.clone(),
            factory,
            &mut sounds,
            &mut warned,
        );
        if sounds.is_empty() {
            continue;
        }
        presets.push(factory.create_preset(preset.bank, preset.program, sounds));
    }
    presets
}

fn resolve_zones<F: SoundFactory>(
    font: &Soundfont,
    level: Level<'_>,
    name: &RecordName,
    zones: Range<usize>,
    factory: &mut F,
    sounds: &mut Vec<F::Sound>,
    warned: &mut HashSet<u16>,
) {
    let pool = match level {
        Level::Preset => Pool {
            zones: &font.pzones,
            gens: &font.pgens,
            mods: &font.pmods,
        },
        Level::Instrument { .. } => Pool {
            zones: &font.izones,
            gens: &font.igens,
            mods: &font.imods,
        },
    };

    if zones.is_empty() {
        log::warn!("{} `{}` has no zones", level.label(), name.display());
        return;
    }

    // A leading zone without the leaf generator is the global zone; it
    // seeds the baseline for every other zone instead of sounding itself.
    let mut zones = zones;
    let mut base = GenModList::default();
    if zones.len() > 1 {
        let first = &pool.zones[zones.start];
        let global = !pool.gens[first.gens.clone()]
            .iter()
            .any(|g| g.id == level.leaf());
        if global {
            for gen in &pool.gens[first.gens.clone()] {
                base.insert_gen(*gen, level.is_preset());
            }
            for m in &pool.mods[first.mods.clone()] {
                base.insert_mod(*m);
            }
            zones.start += 1;
        }
    }

    'zones: for zone in &pool.zones[zones] {
        let mut local = base.clone();
        for m in &pool.mods[zone.mods.clone()] {
            local.insert_mod(*m);
        }
        for gen in &pool.gens[zone.gens.clone()] {
            if gen.id != level.leaf() {
                local.insert_gen(*gen, level.is_preset());
                continue;
            }
            match level {
                Level::Preset => {
                    let Some(instrument) = font.instruments.get(gen.amount as usize) else {
                        log::warn!(
                            "Preset `{}` has an invalid instrument index {} (max: {})",
                            name.display(),
                            gen.amount,
                            font.instruments.len()
                        );
                        continue 'zones;
                    };
                    resolve_zones(
                        font,
                        Level::Instrument { parent: &local },
                        &instrument.name,
                        instrument.zones.clone(),
                        factory,
                        sounds,
                        warned,
                    );
                }
                Level::Instrument { parent } => {
                    let Some(sample) = font.samples.get(gen.amount as usize) else {
                        log::warn!(
                            "Instrument `{}` has an invalid sample index {} (max: {})",
                            name.display(),
                            gen.amount,
                            font.samples.len()
                        );
                        continue 'zones;
                    };
                    for pgen in &parent.gens {
                        local.accum_gen(*pgen);
                    }
                    for pmod in &parent.mods {
                        local.accum_mod(*pmod);
                    }
                    if !ranges_valid(&local) {
                        continue 'zones;
                    }
                    let mut shape = SoundShape::from_sample(sample);
                    let assigns = fill_shape(&mut shape, &local, warned);
                    shape.mods = local.mods;
                    let mut sound = factory.create_sound(shape);
                    for (param, value) in assigns {
                        factory.set_parameter(&mut sound, param, value);
                    }
                    sounds.push(sound);
                }
            }
            // Generators after the leaf never apply.
            continue 'zones;
        }
        // No leaf generator: the zone contributes nothing.
    }
}

/// A disjoint or out-of-range key/velocity range after intersection means
/// the zone can never sound.
fn ranges_valid(list: &GenModList) -> bool {
    for gen in &list.gens {
        if gen.id != GenId::KEY_RANGE && gen.id != GenId::VEL_RANGE {
            continue;
        }
        let low = (gen.amount & 0x00ff) as u8;
        let high = (gen.amount >> 8) as u8;
        if low > high || low > 127 || high > 127 {
            let label = if gen.id == GenId::KEY_RANGE {
                "key range"
            } else {
                "velocity range"
            };
            log::debug!("Dropping zone with empty {label} {low}..{high}");
            return false;
        }
    }
    true
}

/// Applies a zone's final generator list to the shape, returning the
/// parameter assignments for the factory.
fn fill_shape(
    shape: &mut SoundShape,
    list: &GenModList,
    warned: &mut HashSet<u16>,
) -> Vec<(Param, i32)> {
    let mut assigns = Vec::new();
    for gen in &list.gens {
        let value = gen.amount as i16 as i32;
        match gen.id {
            GenId::START_OFFSET => shape.start = shape.start.wrapping_add_signed(value),
            GenId::END_OFFSET => shape.end = shape.end.wrapping_add_signed(value),
            GenId::LOOP_START_OFFSET => {
                shape.loop_start = shape.loop_start.wrapping_add_signed(value)
            }
            GenId::LOOP_END_OFFSET => shape.loop_end = shape.loop_end.wrapping_add_signed(value),
            GenId::START_COARSE_OFFSET => {
                shape.start = shape.start.wrapping_add_signed(value << 15)
            }
            GenId::END_COARSE_OFFSET => shape.end = shape.end.wrapping_add_signed(value << 15),
            GenId::LOOP_START_COARSE_OFFSET => {
                shape.loop_start = shape.loop_start.wrapping_add_signed(value << 15)
            }
            GenId::LOOP_END_COARSE_OFFSET => {
                shape.loop_end = shape.loop_end.wrapping_add_signed(value << 15)
            }
            GenId::KEY_RANGE => {
                shape.min_key = ((gen.amount & 0x00ff) as u8).min(127);
                shape.max_key = ((gen.amount >> 8) as u8).min(127);
            }
            GenId::VEL_RANGE => {
                shape.min_vel = ((gen.amount & 0x00ff) as u8).min(127);
                shape.max_vel = ((gen.amount >> 8) as u8).min(127);
            }
            id => {
                let param = GEN_PARAM.get(id as usize).copied().flatten();
                let Some(param) = param else {
                    if id < 256 && warned.insert(id) {
                        match GEN_NAMES.get(&id) {
                            Some(gen_name) => {
                                log::warn!("Unhandled generator {id} (`{gen_name}`)")
                            }
                            None => log::warn!("Unhandled generator {id}"),
                        }
                    }
                    continue;
                };
                let value = match param {
                    // -1 keeps the sample's own root key.
                    Param::RootKey if value == -1 => continue,
                    Param::FilterResonance | Param::Attenuation => value.max(0),
                    Param::ChorusSend | Param::ReverbSend => value.clamp(0, 1000),
                    Param::LoopMode if !matches!(value, 0 | 1 | 3) => 0,
                    _ => value,
                };
                assigns.push((param, value));
            }
        }
    }
    assigns
}
