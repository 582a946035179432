use std::path::PathBuf;

use crate::records::{SampleType, GEN_NAMES};
use crate::BankBuilder;

#[derive(clap::Args)]
pub struct Args {
    /// SF2 bank to inspect
    input: PathBuf,
    /// Glob patterns to include sound names
    #[arg(short, long)]
    include: Vec<String>,
}

#[inline]
fn channel(sample_type: u16) -> &'static str {
    let typ = SampleType::from_bits_truncate(sample_type);
    if typ.contains(SampleType::ROM) {
        "rom"
    } else if typ.contains(SampleType::LEFT) {
        "left"
    } else if typ.contains(SampleType::RIGHT) {
        "right"
    } else if typ.contains(SampleType::LINKED) {
        "link"
    } else {
        "mono"
    }
}

pub fn inspect(args: Args) -> std::io::Result<()> {
    let Args { input, include } = args;
    let verbose = crate::is_log_level(log::LevelFilter::Debug);
    let filters = crate::FileFilters {
        includes: include,
        excludes: Vec::new(),
    };

    let file = std::fs::File::open(&input)?;
    let mut builder = BankBuilder::default();
    let info = crate::load_sf2(std::io::BufReader::new(file), &mut builder)
        .map_err(|e| crate::invalid_data(format!("Failed to load `{}`: {e}", input.display())))?;
    let bank = builder.take().unwrap();

    log::info!("Format version: {}", info.version);
    for (tag, text) in &info.strings {
        log::info!("  {tag} {text}");
    }
    let hash = blake3::hash(bytemuck::cast_slice(&bank.samples));
    log::info!("Sample data: {} frames 0x{hash}", bank.samples.len());

    log::info!("Presets: {}", bank.presets.len());
    if !bank.presets.is_empty() {
        log::info!(
            "    NAME                 CHAN  RATE  ROOT LOOP KEYS    VELS    \
            START      END        HASH"
        );
        for preset in &bank.presets {
            log::info!("  PRESET {: <3} BANK {}", preset.program, preset.bank);
            for sound in &preset.sounds {
                let name = sound.shape.name.display();
                if !filters.is_empty() && !filters.matches(&name) {
                    continue;
                }
                // Sample bounds are never validated at load time, so clamp.
                let pcm = bank
                    .samples
                    .get(sound.shape.start as usize..sound.shape.end as usize)
                    .unwrap_or_default();
                let hash = blake3::hash(bytemuck::cast_slice(pcm));
                let keys = format!("{}-{}", sound.shape.min_key, sound.shape.max_key);
                let vels = format!("{}-{}", sound.shape.min_vel, sound.shape.max_vel);
                log::info!(
                    "    {name: <20} {: <5} {: <5} {: <4} {: <4} {keys: <7} {vels: <7} \
                    {: <10} {: <10} 0x{hash}",
                    channel(sound.shape.sample_type),
                    sound.shape.sample_rate,
                    sound.root_key(),
                    sound.loop_mode(),
                    sound.shape.start,
                    sound.shape.end,
                );
                if verbose {
                    for (param, value) in &sound.params {
                        log::debug!("      {param:?} = {value}");
                    }
                    for m in &sound.shape.mods {
                        let dst = GEN_NAMES.get(&m.dst_op).copied().unwrap_or("?");
                        log::debug!(
                            "      MOD 0x{:04x} -> {dst} {:+} (amount source 0x{:04x}, transform {})",
                            m.src_op,
                            m.amount,
                            m.amt_src_op,
                            m.trans_op,
                        );
                    }
                }
            }
        }
    }
    Ok(())
}
