use std::collections::BTreeMap;

use crate::records::{Modulator, RecordName, SampleHeader};

/// Synthesis parameter targets produced by the generator mapping table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Param {
    ModLfoToPitch,
    VibLfoToPitch,
    ModEnvToPitch,
    FilterCutoff,
    FilterResonance,
    ModLfoToFilterCutoff,
    ModEnvToFilterCutoff,
    ModLfoToVolume,
    ChorusSend,
    ReverbSend,
    Pan,
    ModLfoDelay,
    ModLfoFrequency,
    VibLfoDelay,
    VibLfoFrequency,
    ModEnvDelay,
    ModEnvAttack,
    ModEnvHold,
    ModEnvDecay,
    ModEnvSustain,
    ModEnvRelease,
    KeyToModEnvHold,
    KeyToModEnvDecay,
    VolEnvDelay,
    VolEnvAttack,
    VolEnvHold,
    VolEnvDecay,
    VolEnvSustain,
    VolEnvRelease,
    KeyToVolEnvHold,
    KeyToVolEnvDecay,
    Attenuation,
    CoarseTune,
    FineTune,
    LoopMode,
    ScaleTuning,
    ExclusiveClass,
    RootKey,
}

/// Resolved description of one sample zone, handed to
/// [`SoundFactory::create_sound`]. Key and velocity ranges default to the
/// full 0..=127 span; the loop mode starts out as the sample's raw type
/// field until a loop mode generator overrides it.
#[derive(Clone, Debug)]
pub struct SoundShape {
    pub name: RecordName,
    pub start: u32,
    pub end: u32,
    pub loop_start: u32,
    pub loop_end: u32,
    pub sample_rate: u32,
    pub root_key: u8,
    pub correction: i8,
    pub sample_type: u16,
    pub loop_mode: u16,
    pub min_key: u8,
    pub max_key: u8,
    pub min_vel: u8,
    pub max_vel: u8,
    pub mods: Vec<Modulator>,
}

impl SoundShape {
    pub(crate) fn from_sample(sample: &SampleHeader) -> Self {
        SoundShape {
            name: sample.name.clone(),
            start: sample.start,
            end: sample.end,
            loop_start: sample.loop_start,
            loop_end: sample.loop_end,
            sample_rate: sample.sample_rate,
            root_key: sample.original_key,
            correction: sample.correction,
            sample_type: sample.sample_type,
            loop_mode: sample.sample_type,
            min_key: 0,
            max_key: 127,
            min_vel: 0,
            max_vel: 127,
            mods: Vec::new(),
        }
    }
}

/// Materializes resolved sounds and presets for some audio backend.
///
/// The loader calls `create_sound` once per resolved zone, follows up with
/// one `set_parameter` call per mapped generator, groups sounds with
/// `create_preset`, and on success hands everything over in a single
/// `publish` call. A failed load never reaches `publish`; any handles
/// created before the failure are simply dropped.
pub trait SoundFactory {
    type Sound;
    type Preset;

    fn create_sound(&mut self, shape: SoundShape) -> Self::Sound;
    fn set_parameter(&mut self, sound: &mut Self::Sound, param: Param, value: i32);
    fn create_preset(&mut self, bank: u16, program: u16, sounds: Vec<Self::Sound>) -> Self::Preset;
    fn publish(&mut self, samples: Vec<i16>, presets: Vec<Self::Preset>);
}

/// One resolved sample zone with its final parameter assignments.
#[derive(Clone, Debug)]
pub struct Sound {
    pub shape: SoundShape,
    pub params: BTreeMap<Param, i32>,
}

impl Sound {
    /// Root key after any override generator.
    pub fn root_key(&self) -> i32 {
        self.params
            .get(&Param::RootKey)
            .copied()
            .unwrap_or(self.shape.root_key as i32)
    }

    /// Loop mode after any sample mode generator.
    pub fn loop_mode(&self) -> i32 {
        self.params
            .get(&Param::LoopMode)
            .copied()
            .unwrap_or(self.shape.loop_mode as i32)
    }
}

#[derive(Clone, Debug)]
pub struct Preset {
    pub bank: u16,
    pub program: u16,
    pub sounds: Vec<Sound>,
}

/// A fully loaded bank: shared sample data plus resolved presets.
#[derive(Clone, Debug, Default)]
pub struct Soundbank {
    pub samples: Vec<i16>,
    pub presets: Vec<Preset>,
}

/// In-memory [`SoundFactory`] producing a [`Soundbank`].
#[derive(Debug, Default)]
pub struct BankBuilder {
    bank: Option<Soundbank>,
}

impl BankBuilder {
    /// The published bank, if a load completed.
    pub fn take(self) -> Option<Soundbank> {
        self.bank
    }
}

impl SoundFactory for BankBuilder {
    type Sound = Sound;
    type Preset = Preset;

    fn create_sound(&mut self, shape: SoundShape) -> Sound {
        Sound {
            shape,
            params: BTreeMap::new(),
        }
    }

    fn set_parameter(&mut self, sound: &mut Sound, param: Param, value: i32) {
        sound.params.insert(param, value);
    }

    fn create_preset(&mut self, bank: u16, program: u16, sounds: Vec<Sound>) -> Preset {
        Preset {
            bank,
            program,
            sounds,
        }
    }

    fn publish(&mut self, samples: Vec<i16>, presets: Vec<Preset>) {
        self.bank = Some(Soundbank { samples, presets });
    }
}
