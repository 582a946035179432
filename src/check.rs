use std::path::PathBuf;

use crate::BankBuilder;

#[derive(clap::Args)]
pub struct Args {
    /// SF2 bank to check
    input: PathBuf,
}

pub fn check(args: Args) -> std::io::Result<()> {
    let Args { input } = args;

    let file = std::fs::File::open(&input)?;
    let mut builder = BankBuilder::default();
    match crate::load_sf2(std::io::BufReader::new(file), &mut builder) {
        Ok(info) => {
            let bank = builder.take().unwrap();
            let sounds: usize = bank.presets.iter().map(|p| p.sounds.len()).sum();
            log::info!(
                "OK: version {}, {} presets, {} sounds, {} sample frames",
                info.version,
                bank.presets.len(),
                sounds,
                bank.samples.len(),
            );
            Ok(())
        }
        Err(e) => Err(crate::invalid_data(format!(
            "{} error in `{}`: {e}",
            e.severity(),
            input.display(),
        ))),
    }
}
