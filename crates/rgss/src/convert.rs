//! Single-file conversions and the staleness model that decides whether to
//! run them.

use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};
use std::time::Duration;

use miette::{Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use rgss_marshal::{from_bytes, to_bytes, WriterOptions};
use rgss_scripts::{
    bundle_from_value, bundle_to_value, flatten_tree, is_loader, loader_bundle, reconstruct_tree,
};
use rgss_text::{parse_document, write_document};
use tracing::info;

use crate::project::Project;

/// Slack absorbing filesystem timestamp resolution differences.
const MTIME_SLACK: Duration = Duration::from_secs(1);

/// One source file and the destination its conversion produces.
#[derive(Debug, Clone)]
pub struct ConversionUnit {
    pub source: PathBuf,
    pub dest: PathBuf,
}

impl ConversionUnit {
    pub fn new(source: PathBuf, dest: PathBuf) -> ConversionUnit {
        ConversionUnit { source, dest }
    }

    /// Whether the destination is already up to date. A fresh unit is
    /// skippable; a missing destination or a forced run never is.
    pub fn is_fresh(&self, force: bool) -> Result<bool> {
        if force || !self.dest.exists() {
            return Ok(false);
        }
        let source = modified(&self.source)?;
        let dest = modified(&self.dest)?;
        Ok(source
            .checked_sub(MTIME_SLACK)
            .is_some_and(|slack| slack < dest))
    }

    /// Give the destination the source's mtime, so that repeated runs over
    /// unchanged inputs keep seeing a fresh destination.
    pub fn inherit_mtime(&self) -> Result<()> {
        let mtime = modified(&self.source)?;
        File::options()
            .write(true)
            .open(&self.dest)
            .into_diagnostic()
            .context(format!("opening {}", self.dest.display()))?
            .set_times(FileTimes::new().set_modified(mtime))
            .into_diagnostic()?;
        Ok(())
    }
}

fn modified(path: &Path) -> Result<std::time::SystemTime> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .into_diagnostic()
        .context(format!("reading mtime of {}", path.display()))
}

/// Convert one binary data file into its textual document.
pub fn extract_data_file(unit: &ConversionUnit) -> Result<()> {
    println!("{}", format!("Extracting {}", display_name(&unit.source)).green());

    let bytes = fs::read(&unit.source)
        .into_diagnostic()
        .context(format!("reading {}", unit.source.display()))?;
    let value = from_bytes(&bytes).context(format!("decoding {}", unit.source.display()))?;

    fs::write(&unit.dest, write_document(&value))
        .into_diagnostic()
        .context(format!("writing {}", unit.dest.display()))?;
    unit.inherit_mtime()
}

/// Convert one textual document back into its binary data file.
pub fn combine_text_file(unit: &ConversionUnit) -> Result<()> {
    println!("{}", format!("Combining {}", display_name(&unit.source)).green());

    let text = fs::read_to_string(&unit.source)
        .into_diagnostic()
        .context(format!("reading {}", unit.source.display()))?;
    let value = parse_document(&text).context(format!("parsing {}", unit.source.display()))?;

    fs::write(&unit.dest, to_bytes(&value, WriterOptions::default())?)
        .into_diagnostic()
        .context(format!("writing {}", unit.dest.display()))?;
    unit.inherit_mtime()
}

/// Unpack the script bundle into the project's script source tree, then
/// replace the bundle file with the loader stub. A bundle that already is a
/// loader stub is left alone.
pub fn extract_scripts(project: &Project, bundle_path: &Path) -> Result<()> {
    let bytes = fs::read(bundle_path)
        .into_diagnostic()
        .context(format!("reading {}", bundle_path.display()))?;
    let entries = bundle_from_value(&from_bytes(&bytes)?)?;

    if is_loader(&entries) {
        println!(
            "{}",
            format!("{} already extracted", display_name(bundle_path)).red()
        );
        return Ok(());
    }

    println!("{}", format!("Extracting {}", display_name(bundle_path)).green());
    reconstruct_tree(&entries, &project.script_dir)?;

    info!("installing loader stub for {}", display_name(bundle_path));
    let stub = bundle_to_value(&loader_bundle()?);
    fs::write(bundle_path, to_bytes(&stub, WriterOptions::default())?)
        .into_diagnostic()
        .context(format!("writing {}", bundle_path.display()))?;
    Ok(())
}

/// Pack the script source tree back into the bundle file. When the bundle
/// on disk still holds a full script collection, packing over it needs
/// `--force`.
pub fn combine_scripts(project: &Project, bundle_path: &Path, force: bool) -> Result<()> {
    if bundle_path.exists() {
        let bytes = fs::read(bundle_path)
            .into_diagnostic()
            .context(format!("reading {}", bundle_path.display()))?;
        let entries = bundle_from_value(&from_bytes(&bytes)?)?;
        if !is_loader(&entries) && !force {
            println!(
                "{}",
                format!(
                    "{} already combined, use --force to pack over it",
                    display_name(bundle_path)
                )
                .red()
            );
            return Ok(());
        }
    }

    println!("{}", format!("Combining {}", display_name(bundle_path)).green());
    let entries = flatten_tree(&project.script_dir)?;
    fs::write(
        bundle_path,
        to_bytes(&bundle_to_value(&entries), WriterOptions::default())?,
    )
    .into_diagnostic()
    .context(format!("writing {}", bundle_path.display()))?;
    Ok(())
}

/// Report a skipped, already-fresh unit. Skips are not errors.
pub fn report_fresh(unit: &ConversionUnit) {
    println!(
        "{}",
        format!("Skipping {} (up to date)", display_name(&unit.source)).yellow()
    );
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
