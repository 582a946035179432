use std::fmt;
use std::io::{Cursor, Read};

use binrw::BinRead;
use indexmap::IndexMap;

use crate::bank::SoundFactory;
use crate::font::Soundfont;
use crate::reader::Reader;
use crate::records::{
    Bag, Generator, InstrumentHeader, Modulator, PresetHeader, SampleHeader, Tag,
};
use crate::{resolve, LoadError};

/// INFO sub-chunks holding zero-terminated text.
const INFO_TEXT: [&[u8; 4]; 9] = [
    b"INAM", b"isng", b"irom", b"ICRD", b"IENG", b"IPRD", b"ICOP", b"ICMT", b"ISFT",
];

/// Format version from the `ifil` sub-chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.major, self.minor)
    }
}

/// Bank metadata collected from the INFO list, text entries in file order.
#[derive(Clone, Debug, Default)]
pub struct Info {
    pub version: Version,
    pub strings: IndexMap<Tag, String>,
}

/// Chunk header: four-byte tag plus little-endian payload size.
struct RiffHdr {
    tag: Tag,
    size: u32,
}

impl RiffHdr {
    fn read<R: Read>(r: &mut Reader<R>) -> RiffHdr {
        RiffHdr {
            tag: Tag(r.take()),
            size: r.u32(),
        }
    }
}

/// Raw record arrays from the nine pdta sub-chunks, in file order.
pub(crate) struct Pdta {
    pub phdr: Vec<PresetHeader>,
    pub pbag: Vec<Bag>,
    pub pmod: Vec<Modulator>,
    pub pgen: Vec<Generator>,
    pub inst: Vec<InstrumentHeader>,
    pub ibag: Vec<Bag>,
    pub imod: Vec<Modulator>,
    pub igen: Vec<Generator>,
    pub shdr: Vec<SampleHeader>,
}

/// Loads an SF2 bank from `source`, handing resolved presets to `factory`.
///
/// On success the factory receives exactly one [`SoundFactory::publish`]
/// call and the bank metadata is returned; on failure it receives none and
/// anything it created along the way is dropped.
pub fn load_sf2<R: Read, F: SoundFactory>(source: R, factory: &mut F) -> Result<Info, LoadError> {
    let mut r = Reader::new(source);

    let riff = RiffHdr::read(&mut r);
    expect_tag(b"RIFF", riff.tag)?;
    let form = Tag(r.take());
    expect_tag(b"sfbk", form)?;

    let info = read_info(&mut r)?;
    let samples = read_sample_data(&mut r)?;
    let pdta = read_pdta(&mut r)?;

    let font = Soundfont::link(pdta)?;
    let presets = resolve::resolve(&font, factory);
    factory.publish(samples, presets);
    Ok(info)
}

fn expect_tag(expected: &[u8; 4], found: Tag) -> Result<(), LoadError> {
    if found == *expected {
        Ok(())
    } else {
        Err(LoadError::BadTag {
            expected: Tag(*expected),
            found,
        })
    }
}

fn read_info<R: Read>(r: &mut Reader<R>) -> Result<Info, LoadError> {
    let list = RiffHdr::read(r);
    expect_tag(b"LIST", list.tag)?;
    let form = Tag(r.take());
    expect_tag(b"INFO", form)?;

    let mut info = Info::default();
    let mut remaining = i64::from(list.size) - 4;
    while remaining > 0 && !r.fault() {
        let sub = RiffHdr::read(r);
        remaining -= 8;
        if sub.tag == *b"ifil" {
            if sub.size != 4 {
                log::warn!("Invalid `ifil` chunk size {}", sub.size);
                r.skip(sub.size);
            } else {
                info.version = Version {
                    major: r.u16(),
                    minor: r.u16(),
                };
            }
        } else if INFO_TEXT.iter().any(|t| sub.tag == **t) {
            let mut raw = vec![0; sub.size as usize];
            r.read_into(&mut raw);
            let text = String::from_utf8_lossy(&raw);
            info.strings
                .insert(sub.tag, text.trim_end_matches('\0').to_string());
        } else {
            r.skip(sub.size);
        }
        remaining -= i64::from(sub.size);
    }
    if r.fault() {
        return Err(LoadError::Truncated("INFO list"));
    }
    if info.version.major != 2 {
        return Err(LoadError::UnsupportedVersion {
            major: info.version.major,
            minor: info.version.minor,
        });
    }
    log::debug!("Bank format version {}", info.version);
    Ok(info)
}

fn read_sample_data<R: Read>(r: &mut Reader<R>) -> Result<Vec<i16>, LoadError> {
    let list = RiffHdr::read(r);
    expect_tag(b"LIST", list.tag)?;
    let form = Tag(r.take());
    expect_tag(b"sdta", form)?;

    let smpl = RiffHdr::read(r);
    expect_tag(b"smpl", smpl.tag)?;
    let remaining = i64::from(list.size) - 12;
    if i64::from(smpl.size) > remaining {
        return Err(LoadError::BadChunkSize {
            chunk: smpl.tag,
            size: smpl.size,
        });
    }

    let mut raw = vec![0; smpl.size as usize];
    r.read_into(&mut raw);
    let samples = raw
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes(pair.try_into().unwrap()))
        .collect();
    r.skip((remaining - i64::from(smpl.size)) as u32);
    if r.fault() {
        return Err(LoadError::Truncated("sample data"));
    }
    Ok(samples)
}

fn read_pdta<R: Read>(r: &mut Reader<R>) -> Result<Pdta, LoadError> {
    let list = RiffHdr::read(r);
    expect_tag(b"LIST", list.tag)?;
    let form = Tag(r.take());
    expect_tag(b"pdta", form)?;

    let pdta = Pdta {
        phdr: read_records(r, b"phdr", 38)?,
        pbag: read_records(r, b"pbag", 4)?,
        pmod: read_records(r, b"pmod", 10)?,
        pgen: read_records(r, b"pgen", 4)?,
        inst: read_records(r, b"inst", 22)?,
        ibag: read_records(r, b"ibag", 4)?,
        imod: read_records(r, b"imod", 10)?,
        igen: read_records(r, b"igen", 4)?,
        shdr: read_records(r, b"shdr", 46)?,
    };
    if r.fault() {
        return Err(LoadError::Truncated("pdta list"));
    }
    Ok(pdta)
}

/// Reads one fixed-record-size sub-chunk into a record array. A size that
/// is not an exact multiple of the record size is fatal before any record
/// is decoded.
fn read_records<R: Read, T>(
    r: &mut Reader<R>,
    tag: &[u8; 4],
    rec_size: u32,
) -> Result<Vec<T>, LoadError>
where
    T: binrw::meta::ReadEndian,
    for<'a> T: BinRead<Args<'a> = ()>,
{
    let hdr = RiffHdr::read(r);
    expect_tag(tag, hdr.tag)?;
    if hdr.size % rec_size != 0 {
        return Err(LoadError::BadChunkSize {
            chunk: hdr.tag,
            size: hdr.size,
        });
    }
    let mut raw = vec![0; hdr.size as usize];
    r.read_into(&mut raw);
    Ok(raw
        .chunks_exact(rec_size as usize)
        .map(|rec| T::read(&mut Cursor::new(rec)).unwrap())
        .collect())
}
