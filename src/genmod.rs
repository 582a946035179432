use crate::records::{GenId, Generator, Modulator};

/// Default generator amounts, applied when accumulation first introduces an
/// id (SF2 2.01, section 8.1.3).
const DEFAULT_GEN_VALUE: [i16; 60] = [
    0, 0, 0, 0, 0, 0, 0, 0, 13500, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    -12000, 0, -12000, 0, -12000, -12000, -12000, -12000, 0, -12000, 0, 0,
    -12000, -12000, -12000, -12000, 0, -12000, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 100, 0, 0, 0,
];

/// Amount biases for the default modulators, applied when accumulation
/// first introduces the (src, dst) pair with no amount source and no
/// transform (SF2 2.01, section 8.4).
const DEFAULT_MOD_BIAS: [(u16, u16, i16); 9] = [
    (0x0502, 48, 960),
    (0x0102, 8, -2400),
    (0x000d, 6, 50),
    (0x0081, 6, 50),
    (0x0582, 48, 960),
    (0x028a, 17, 1000),
    (0x058b, 48, 960),
    (0x00db, 16, 200),
    (0x00dd, 15, 200),
];

/// Generator ids that only have meaning at instrument level. A preset-level
/// list never accepts them (SF2 2.01, section 8.5).
fn preset_excluded(id: u16) -> bool {
    matches!(
        id,
        GenId::START_OFFSET
            | GenId::END_OFFSET
            | GenId::LOOP_START_OFFSET
            | GenId::LOOP_END_OFFSET
            | GenId::START_COARSE_OFFSET
            | GenId::END_COARSE_OFFSET
            | GenId::LOOP_START_COARSE_OFFSET
            | GenId::KEY_NUM
            | GenId::VELOCITY
            | GenId::LOOP_END_COARSE_OFFSET
            | GenId::SAMPLE_MODES
            | GenId::EXCLUSIVE_CLASS
            | GenId::ROOT_KEY
    )
}

#[inline]
fn same_identity(a: &Modulator, b: &Modulator) -> bool {
    a.src_op == b.src_op
        && a.dst_op == b.dst_op
        && a.amt_src_op == b.amt_src_op
        && a.trans_op == b.trans_op
}

/// Working set of generators and modulators for one zone. Holds at most one
/// generator record per id and one modulator record per identity.
#[derive(Clone, Debug, Default)]
pub(crate) struct GenModList {
    pub gens: Vec<Generator>,
    pub mods: Vec<Modulator>,
}

impl GenModList {
    /// Overwrite-merge: a matching id replaces the stored amount, anything
    /// else is appended.
    pub fn insert_gen(&mut self, gen: Generator, preset_level: bool) {
        if let Some(slot) = self.gens.iter_mut().find(|g| g.id == gen.id) {
            slot.amount = gen.amount;
            return;
        }
        if preset_level && preset_excluded(gen.id) {
            return;
        }
        self.gens.push(gen);
    }

    /// Sum-merge: a matching id combines amounts, where the key and
    /// velocity range generators combine by intersection instead. The
    /// first occurrence of an id picks up its default amount.
    pub fn accum_gen(&mut self, gen: Generator) {
        if let Some(slot) = self.gens.iter_mut().find(|g| g.id == gen.id) {
            if gen.id == GenId::KEY_RANGE || gen.id == GenId::VEL_RANGE {
                let low = (slot.amount & 0x00ff).max(gen.amount & 0x00ff);
                let high = (slot.amount & 0xff00).min(gen.amount & 0xff00);
                slot.amount = low | high;
            } else {
                slot.amount = slot.amount.wrapping_add(gen.amount);
            }
            return;
        }
        let mut gen = gen;
        if (gen.id as usize) < DEFAULT_GEN_VALUE.len() {
            gen.amount = gen
                .amount
                .wrapping_add(DEFAULT_GEN_VALUE[gen.id as usize] as u16);
        }
        self.gens.push(gen);
    }

    /// Overwrite-merge on the modulator identity.
    pub fn insert_mod(&mut self, m: Modulator) {
        if let Some(slot) = self.mods.iter_mut().find(|o| same_identity(o, &m)) {
            slot.amount = m.amount;
            return;
        }
        self.mods.push(m);
    }

    /// Sum-merge on the modulator identity. The first occurrence of a
    /// default modulator picks up its bias.
    pub fn accum_mod(&mut self, m: Modulator) {
        if let Some(slot) = self.mods.iter_mut().find(|o| same_identity(o, &m)) {
            slot.amount = slot.amount.wrapping_add(m.amount);
            return;
        }
        let mut m = m;
        if m.amt_src_op == 0 && m.trans_op == 0 {
            for &(src, dst, bias) in &DEFAULT_MOD_BIAS {
                if m.src_op == src && m.dst_op == dst {
                    m.amount = m.amount.wrapping_add(bias);
                    break;
                }
            }
        }
        self.mods.push(m);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gen(id: u16, amount: u16) -> Generator {
        Generator { id, amount }
    }

    fn modr(src_op: u16, dst_op: u16, amount: i16) -> Modulator {
        Modulator {
            src_op,
            dst_op,
            amount,
            amt_src_op: 0,
            trans_op: 0,
        }
    }

    fn pack(low: u8, high: u8) -> u16 {
        low as u16 | (high as u16) << 8
    }

    #[test]
    fn insert_replaces_amount_for_same_id() {
        let mut list = GenModList::default();
        list.insert_gen(gen(48, 100), false);
        list.insert_gen(gen(48, 250), false);
        assert_eq!(list.gens, vec![gen(48, 250)]);
    }

    #[test]
    fn preset_append_drops_instrument_only_ids() {
        let mut list = GenModList::default();
        list.insert_gen(gen(GenId::START_OFFSET, 5), true);
        list.insert_gen(gen(GenId::SAMPLE_MODES, 1), true);
        list.insert_gen(gen(17, 500), true);
        assert_eq!(list.gens, vec![gen(17, 500)]);
    }

    #[test]
    fn instrument_append_keeps_sample_level_ids() {
        let mut list = GenModList::default();
        list.insert_gen(gen(GenId::START_OFFSET, 5), false);
        assert_eq!(list.gens, vec![gen(GenId::START_OFFSET, 5)]);
    }

    #[test]
    fn accum_sums_existing_amounts() {
        let mut list = GenModList::default();
        list.insert_gen(gen(48, 100), false);
        list.accum_gen(gen(48, 50));
        assert_eq!(list.gens[0].amount, 150);
    }

    #[test]
    fn accum_applies_default_on_first_occurrence() {
        let mut list = GenModList::default();
        list.accum_gen(gen(8, (-1000i16) as u16));
        assert_eq!(list.gens[0].amount as i16, 12500);
    }

    #[test]
    fn accum_without_default_keeps_amount() {
        let mut list = GenModList::default();
        list.accum_gen(gen(48, 75));
        assert_eq!(list.gens[0].amount, 75);
    }

    #[test]
    fn key_ranges_intersect() {
        let mut list = GenModList::default();
        list.insert_gen(gen(GenId::KEY_RANGE, pack(20, 100)), false);
        list.accum_gen(gen(GenId::KEY_RANGE, pack(40, 127)));
        assert_eq!(list.gens[0].amount, pack(40, 100));
    }

    #[test]
    fn range_intersection_is_commutative() {
        let mut a = GenModList::default();
        a.insert_gen(gen(GenId::VEL_RANGE, pack(10, 90)), false);
        a.accum_gen(gen(GenId::VEL_RANGE, pack(30, 120)));
        let mut b = GenModList::default();
        b.insert_gen(gen(GenId::VEL_RANGE, pack(30, 120)), false);
        b.accum_gen(gen(GenId::VEL_RANGE, pack(10, 90)));
        assert_eq!(a.gens[0].amount, b.gens[0].amount);
    }

    #[test]
    fn modulator_identity_ignores_amount() {
        let mut list = GenModList::default();
        list.insert_mod(modr(0x0502, 48, 100));
        list.insert_mod(modr(0x0502, 48, 300));
        assert_eq!(list.mods.len(), 1);
        assert_eq!(list.mods[0].amount, 300);
    }

    #[test]
    fn distinct_modulator_identities_both_kept() {
        let mut list = GenModList::default();
        list.insert_mod(modr(0x0502, 48, 100));
        let mut other = modr(0x0502, 48, 100);
        other.trans_op = 2;
        list.insert_mod(other);
        assert_eq!(list.mods.len(), 2);
    }

    #[test]
    fn accum_mod_applies_default_bias() {
        let mut list = GenModList::default();
        list.accum_mod(modr(0x0502, 48, 40));
        assert_eq!(list.mods[0].amount, 1000);
    }

    #[test]
    fn accum_mod_bias_requires_plain_identity() {
        let mut list = GenModList::default();
        let mut m = modr(0x0502, 48, 40);
        m.amt_src_op = 3;
        list.accum_mod(m);
        assert_eq!(list.mods[0].amount, 40);
    }

    #[test]
    fn accum_mod_sums_existing() {
        let mut list = GenModList::default();
        list.insert_mod(modr(0x0102, 8, 100));
        list.accum_mod(modr(0x0102, 8, 25));
        assert_eq!(list.mods[0].amount, 125);
    }
}
