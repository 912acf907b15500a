use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use extraction::{
    aggregate::{Aggregator, TextExtractor},
    clock::{Clock, RealClock, stamped_file_name},
    csvout::CsvSink,
    pdftext::PdfTextExtractor,
    source::DirSource,
};
use simplelog::LevelFilter;

use super::logevents::LogEvents;
use crate::{
    config::{Config, ConfigArgs},
    logging,
};

/// Extracts the configured fields from every PDF in the source folder into a
/// timestamped CSV file in the output folder.
#[derive(Args, Debug)]
pub struct Command {
    #[command(flatten)]
    config: ConfigArgs,
}

/// How a batch extraction finished.
#[derive(Debug, Eq, PartialEq)]
pub enum Outcome {
    /// A CSV file holding `records` rows was written to `path`.
    Written { path: PathBuf, records: usize },
    /// No document produced a record, so nothing was written.
    NoRecords,
    /// The source folder could not be listed.
    SourceUnavailable,
}

/// Runs the subcommand.
pub fn run(cmd: &Command, log_level: LevelFilter) -> Result<()> {
    let config = cmd.config.load()?;
    let clock = RealClock::new();

    std::fs::create_dir_all(&config.output_folder)
        .with_context(|| format!("creating output folder {:?}", config.output_folder))?;
    let log_path = config
        .output_folder
        .join(stamped_file_name(&config.output_prefix, clock.now(), "log"));
    logging::init(log_level, Some(&log_path))?;

    log::info!("Source folder: {:?}", config.source_folder);
    log::info!("Output folder: {:?}", config.output_folder);
    log::info!("Fields to extract: {}", config.fields.join(", "));

    match extract_batch(&config, &PdfTextExtractor::new(), &clock)? {
        Outcome::Written { path, records } => {
            log::info!("CSV file written: {:?}", path);
            log::info!("Completed. {records} records processed");
        }
        Outcome::NoRecords | Outcome::SourceUnavailable => {
            log::info!("Completed. No records were produced");
        }
    }
    Ok(())
}

/// Extracts the configured fields from the source folder, writing a CSV file
/// if any record was produced. Unreadable sources and documents are logged
/// rather than returned; invalid patterns and CSV write failures are errors.
pub fn extract_batch(
    config: &Config,
    extractor: &dyn TextExtractor,
    clock: &dyn Clock,
) -> Result<Outcome> {
    let rules = config.field_rules()?;
    let aggregator = Aggregator::new(extractor, &rules, &config.fields)?
        .with_file_column(config.file_column.clone());

    let source = match DirSource::open(&config.source_folder) {
        Ok(source) => source,
        Err(err) => {
            log::error!(
                "Cannot read source folder {:?}: {:#}",
                config.source_folder,
                err
            );
            return Ok(Outcome::SourceUnavailable);
        }
    };
    log::info!("Found {} PDF file(s)", source.len());

    let results = aggregator.run(source.documents(), &mut LogEvents);
    if results.is_empty() {
        log::warn!("No data was extracted, no CSV file written");
        return Ok(Outcome::NoRecords);
    }

    let sink = CsvSink::new(&config.output_folder, config.output_prefix.clone())
        .with_not_found(config.not_found.clone());
    let path = sink.write(&results, clock).inspect_err(|err| {
        log::error!("Failed to write CSV file: {:#}", err);
    })?;

    Ok(Outcome::Written {
        path,
        records: results.len(),
    })
}
