//! Byte-level SF2 image builders shared by the integration tests.

/// Chunk header plus payload, size taken from the payload.
pub fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + payload.len());
    out.extend_from_slice(tag);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// LIST chunk wrapping a form tag and body.
pub fn list(form: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(4 + body.len());
    payload.extend_from_slice(form);
    payload.extend_from_slice(body);
    chunk(b"LIST", &payload)
}

/// Outer RIFF chunk with the sfbk form tag.
pub fn riff(body: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(4 + body.len());
    payload.extend_from_slice(b"sfbk");
    payload.extend_from_slice(body);
    chunk(b"RIFF", &payload)
}

pub fn name_bytes(name: &str) -> [u8; 20] {
    let mut out = [0; 20];
    out[..name.len()].copy_from_slice(name.as_bytes());
    out
}

/// One 38-byte preset header record.
pub fn phdr(name: &str, program: u16, bank: u16, zone_start: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(38);
    out.extend_from_slice(&name_bytes(name));
    out.extend_from_slice(&program.to_le_bytes());
    out.extend_from_slice(&bank.to_le_bytes());
    out.extend_from_slice(&zone_start.to_le_bytes());
    out.extend_from_slice(&[0; 12]);
    out
}

/// One 4-byte zone record.
pub fn bag(gen_start: u16, mod_start: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(4);
    out.extend_from_slice(&gen_start.to_le_bytes());
    out.extend_from_slice(&mod_start.to_le_bytes());
    out
}

/// One 4-byte generator record.
pub fn gen(id: u16, amount: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(4);
    out.extend_from_slice(&id.to_le_bytes());
    out.extend_from_slice(&amount.to_le_bytes());
    out
}

/// One 10-byte modulator record.
pub fn modr(src_op: u16, dst_op: u16, amount: i16, amt_src_op: u16, trans_op: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    out.extend_from_slice(&src_op.to_le_bytes());
    out.extend_from_slice(&dst_op.to_le_bytes());
    out.extend_from_slice(&amount.to_le_bytes());
    out.extend_from_slice(&amt_src_op.to_le_bytes());
    out.extend_from_slice(&trans_op.to_le_bytes());
    out
}

/// One 22-byte instrument header record.
pub fn inst(name: &str, zone_start: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(22);
    out.extend_from_slice(&name_bytes(name));
    out.extend_from_slice(&zone_start.to_le_bytes());
    out
}

/// One 46-byte sample header record.
#[allow(clippy::too_many_arguments)]
pub fn shdr_rec(
    name: &str,
    start: u32,
    end: u32,
    loop_start: u32,
    loop_end: u32,
    sample_rate: u32,
    original_key: u8,
    correction: i8,
    link: u16,
    sample_type: u16,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(46);
    out.extend_from_slice(&name_bytes(name));
    out.extend_from_slice(&start.to_le_bytes());
    out.extend_from_slice(&end.to_le_bytes());
    out.extend_from_slice(&loop_start.to_le_bytes());
    out.extend_from_slice(&loop_end.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.push(original_key);
    out.push(correction as u8);
    out.extend_from_slice(&link.to_le_bytes());
    out.extend_from_slice(&sample_type.to_le_bytes());
    out
}

/// A complete bank image assembled from raw record arrays. Every array
/// must carry its own terminal record; only the PCM data is serialized
/// here.
pub struct FontImage {
    pub version: (u16, u16),
    pub extra_info: Vec<u8>,
    pub samples: Vec<i16>,
    pub phdr: Vec<u8>,
    pub pbag: Vec<u8>,
    pub pmod: Vec<u8>,
    pub pgen: Vec<u8>,
    pub inst: Vec<u8>,
    pub ibag: Vec<u8>,
    pub imod: Vec<u8>,
    pub igen: Vec<u8>,
    pub shdr: Vec<u8>,
}

impl Default for FontImage {
    fn default() -> Self {
        FontImage {
            version: (2, 1),
            extra_info: Vec::new(),
            samples: Vec::new(),
            phdr: Vec::new(),
            pbag: Vec::new(),
            pmod: Vec::new(),
            pgen: Vec::new(),
            inst: Vec::new(),
            ibag: Vec::new(),
            imod: Vec::new(),
            igen: Vec::new(),
            shdr: Vec::new(),
        }
    }
}

impl FontImage {
    pub fn info_body(&self) -> Vec<u8> {
        let mut ifil = Vec::with_capacity(4);
        ifil.extend_from_slice(&self.version.0.to_le_bytes());
        ifil.extend_from_slice(&self.version.1.to_le_bytes());
        let mut body = chunk(b"ifil", &ifil);
        body.extend_from_slice(&self.extra_info);
        body
    }

    pub fn pcm(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.samples.len() * 2);
        for s in &self.samples {
            out.extend_from_slice(&s.to_le_bytes());
        }
        out
    }

    pub fn pdta_body(&self) -> Vec<u8> {
        let mut body = chunk(b"phdr", &self.phdr);
        body.extend(chunk(b"pbag", &self.pbag));
        body.extend(chunk(b"pmod", &self.pmod));
        body.extend(chunk(b"pgen", &self.pgen));
        body.extend(chunk(b"inst", &self.inst));
        body.extend(chunk(b"ibag", &self.ibag));
        body.extend(chunk(b"imod", &self.imod));
        body.extend(chunk(b"igen", &self.igen));
        body.extend(chunk(b"shdr", &self.shdr));
        body
    }

    pub fn build(&self) -> Vec<u8> {
        let mut body = list(b"INFO", &self.info_body());
        body.extend(list(b"sdta", &chunk(b"smpl", &self.pcm())));
        body.extend(list(b"pdta", &self.pdta_body()));
        riff(&body)
    }
}

/// Bank with one preset, one instrument and one sample, wired through a
/// single zone at each level. Extra generators go before the chain
/// selector of their zone.
pub fn one_zone(preset_gens: &[(u16, u16)], instrument_gens: &[(u16, u16)]) -> FontImage {
    let mut image = FontImage {
        samples: (0..200).map(|i| i as i16).collect(),
        ..FontImage::default()
    };

    image.phdr = phdr("Single", 0, 0, 0);
    image.phdr.extend(phdr("EOP", 0, 0, 1));
    image.pbag = bag(0, 0);
    image.pbag.extend(bag(preset_gens.len() as u16 + 1, 0));
    image.pmod = modr(0, 0, 0, 0, 0);
    for &(id, amount) in preset_gens {
        image.pgen.extend(gen(id, amount));
    }
    image.pgen.extend(gen(41, 0));
    image.pgen.extend(gen(0, 0));

    image.inst = inst("Inst", 0);
    image.inst.extend(inst("EOI", 1));
    image.ibag = bag(0, 0);
    image.ibag.extend(bag(instrument_gens.len() as u16 + 1, 0));
    image.imod = modr(0, 0, 0, 0, 0);
    for &(id, amount) in instrument_gens {
        image.igen.extend(gen(id, amount));
    }
    image.igen.extend(gen(53, 0));
    image.igen.extend(gen(0, 0));

    image.shdr = shdr_rec("Samp", 10, 110, 20, 100, 22050, 60, 0, 0, 1);
    image.shdr.extend([0; 46]);
    image
}
