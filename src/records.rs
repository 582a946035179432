use std::borrow::Cow;
use std::fmt;

use arrayvec::ArrayVec;
use binrw::BinRead;

/// Four-byte chunk tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tag(pub [u8; 4]);

impl PartialEq<[u8; 4]> for Tag {
    fn eq(&self, other: &[u8; 4]) -> bool {
        &self.0 == other
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// Fixed 20-byte record name, trimmed at the first NUL.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RecordName(pub ArrayVec<u8, 20>);

impl RecordName {
    pub fn from_raw(raw: [u8; 20]) -> Self {
        RecordName(raw.iter().copied().take_while(|&c| c != 0).collect())
    }

    pub fn display(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

/// Preset header record from the `phdr` chunk (38 bytes on disk).
#[derive(Clone, Debug, BinRead)]
#[br(little)]
pub struct PresetHeader {
    #[br(map = |raw: [u8; 20]| RecordName::from_raw(raw))]
    pub name: RecordName,
    pub program: u16,
    pub bank: u16,
    pub zone_start: u16,
    pub library: u32,
    pub genre: u32,
    pub morphology: u32,
}

/// Instrument header record from the `inst` chunk (22 bytes on disk).
#[derive(Clone, Debug, BinRead)]
#[br(little)]
pub struct InstrumentHeader {
    #[br(map = |raw: [u8; 20]| RecordName::from_raw(raw))]
    pub name: RecordName,
    pub zone_start: u16,
}

/// Zone record from the `pbag`/`ibag` chunks (4 bytes on disk). The two
/// fields open runs into the generator and modulator arrays, closed by the
/// next record.
#[derive(Clone, Copy, Debug, BinRead)]
#[br(little)]
pub struct Bag {
    pub gen_start: u16,
    pub mod_start: u16,
}

/// Generator record from the `pgen`/`igen` chunks (4 bytes on disk). The
/// amount is reinterpreted per id: a signed value, or a low/high byte pair
/// for the range generators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct Generator {
    pub id: u16,
    pub amount: u16,
}

/// Modulator record from the `pmod`/`imod` chunks (10 bytes on disk).
/// Merge identity is every field except `amount`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct Modulator {
    pub src_op: u16,
    pub dst_op: u16,
    pub amount: i16,
    pub amt_src_op: u16,
    pub trans_op: u16,
}

/// Sample header record from the `shdr` chunk (46 bytes on disk). Offsets
/// are sample frames into the shared PCM blob.
#[derive(Clone, Debug, BinRead)]
#[br(little)]
pub struct SampleHeader {
    #[br(map = |raw: [u8; 20]| RecordName::from_raw(raw))]
    pub name: RecordName,
    pub start: u32,
    pub end: u32,
    pub loop_start: u32,
    pub loop_end: u32,
    pub sample_rate: u32,
    pub original_key: u8,
    pub correction: i8,
    pub link: u16,
    pub sample_type: u16,
}

bitflags::bitflags! {
    /// Link type flags from a sample header's `sample_type` field.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SampleType: u16 {
        const MONO = 0x0001;
        const RIGHT = 0x0002;
        const LEFT = 0x0004;
        const LINKED = 0x0008;
        const ROM = 0x8000;
    }
}

/// Generator ids with structural meaning during resolution.
pub struct GenId;

impl GenId {
    pub const START_OFFSET: u16 = 0;
    pub const END_OFFSET: u16 = 1;
    pub const LOOP_START_OFFSET: u16 = 2;
    pub const LOOP_END_OFFSET: u16 = 3;
    pub const START_COARSE_OFFSET: u16 = 4;
    pub const END_COARSE_OFFSET: u16 = 12;
    pub const INSTRUMENT: u16 = 41;
    pub const KEY_RANGE: u16 = 43;
    pub const VEL_RANGE: u16 = 44;
    pub const LOOP_START_COARSE_OFFSET: u16 = 45;
    pub const KEY_NUM: u16 = 46;
    pub const VELOCITY: u16 = 47;
    pub const LOOP_END_COARSE_OFFSET: u16 = 50;
    pub const SAMPLE_ID: u16 = 53;
    pub const SAMPLE_MODES: u16 = 54;
    pub const EXCLUSIVE_CLASS: u16 = 57;
    pub const ROOT_KEY: u16 = 58;
}

/// Canonical generator names, for diagnostics.
pub const GEN_NAMES: phf::Map<u16, &'static str> = phf::phf_map! {
    0u16 => "startAddrsOffset",
    1u16 => "endAddrsOffset",
    2u16 => "startloopAddrsOffset",
    3u16 => "endloopAddrsOffset",
    4u16 => "startAddrsCoarseOffset",
    5u16 => "modLfoToPitch",
    6u16 => "vibLfoToPitch",
    7u16 => "modEnvToPitch",
    8u16 => "initialFilterFc",
    9u16 => "initialFilterQ",
    10u16 => "modLfoToFilterFc",
    11u16 => "modEnvToFilterFc",
    12u16 => "endAddrsCoarseOffset",
    13u16 => "modLfoToVolume",
    15u16 => "chorusEffectsSend",
    16u16 => "reverbEffectsSend",
    17u16 => "pan",
    21u16 => "delayModLFO",
    22u16 => "freqModLFO",
    23u16 => "delayVibLFO",
    24u16 => "freqVibLFO",
    25u16 => "delayModEnv",
    26u16 => "attackModEnv",
    27u16 => "holdModEnv",
    28u16 => "decayModEnv",
    29u16 => "sustainModEnv",
    30u16 => "releaseModEnv",
    31u16 => "keynumToModEnvHold",
    32u16 => "keynumToModEnvDecay",
    33u16 => "delayVolEnv",
    34u16 => "attackVolEnv",
    35u16 => "holdVolEnv",
    36u16 => "decayVolEnv",
    37u16 => "sustainVolEnv",
    38u16 => "releaseVolEnv",
    39u16 => "keynumToVolEnvHold",
    40u16 => "keynumToVolEnvDecay",
    41u16 => "instrument",
    43u16 => "keyRange",
    44u16 => "velRange",
    45u16 => "startloopAddrsCoarseOffset",
    46u16 => "keynum",
    47u16 => "velocity",
    48u16 => "initialAttenuation",
    50u16 => "endloopAddrsCoarseOffset",
    51u16 => "coarseTune",
    52u16 => "fineTune",
    53u16 => "sampleID",
    54u16 => "sampleModes",
    56u16 => "scaleTuning",
    57u16 => "exclusiveClass",
    58u16 => "overridingRootKey",
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn record_name_stops_at_nul() {
        let mut raw = [0; 20];
        raw[..5].copy_from_slice(b"Piano");
        let name = RecordName::from_raw(raw);
        assert_eq!(name.display(), "Piano");
    }

    #[test]
    fn sample_header_layout() {
        let mut raw = vec![0; 46];
        raw[..4].copy_from_slice(b"Samp");
        raw[20..24].copy_from_slice(&100u32.to_le_bytes());
        raw[24..28].copy_from_slice(&200u32.to_le_bytes());
        raw[28..32].copy_from_slice(&110u32.to_le_bytes());
        raw[32..36].copy_from_slice(&190u32.to_le_bytes());
        raw[36..40].copy_from_slice(&44100u32.to_le_bytes());
        raw[40] = 60;
        raw[41] = (-4i8) as u8;
        raw[44..46].copy_from_slice(&1u16.to_le_bytes());
        let hdr = SampleHeader::read(&mut Cursor::new(&raw)).unwrap();
        assert_eq!(hdr.name.display(), "Samp");
        assert_eq!(hdr.start, 100);
        assert_eq!(hdr.end, 200);
        assert_eq!(hdr.loop_start, 110);
        assert_eq!(hdr.loop_end, 190);
        assert_eq!(hdr.sample_rate, 44100);
        assert_eq!(hdr.original_key, 60);
        assert_eq!(hdr.correction, -4);
        assert_eq!(hdr.sample_type, 1);
    }

    #[test]
    fn preset_header_layout() {
        let mut raw = vec![0; 38];
        raw[..3].copy_from_slice(b"Pre");
        raw[20..22].copy_from_slice(&7u16.to_le_bytes());
        raw[22..24].copy_from_slice(&128u16.to_le_bytes());
        raw[24..26].copy_from_slice(&3u16.to_le_bytes());
        let hdr = PresetHeader::read(&mut Cursor::new(&raw)).unwrap();
        assert_eq!(hdr.program, 7);
        assert_eq!(hdr.bank, 128);
        assert_eq!(hdr.zone_start, 3);
    }
}
