use std::path::PathBuf;

use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};

use crate::batch::{self, BackupRecord};
use crate::convert::display_name;
use crate::project::Project;

#[derive(Args)]
pub struct RevertArgs {
    /// The project directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    directory: PathBuf,

    /// Base names of the data files to restore (default: all of them)
    files: Vec<String>,
}

impl RevertArgs {
    pub fn handle(&self) -> Result<()> {
        let project = Project::open(&self.directory)
            .into_diagnostic()
            .context(format!("opening project {}", self.directory.display()))?;
        let files = project.data_files(&self.files).into_diagnostic()?;

        let records: Vec<BackupRecord> = files
            .iter()
            .map(|original| BackupRecord {
                original: original.clone(),
                backup: project.backup_file(original),
            })
            .collect();
        for record in &records {
            if !record.backup.exists() {
                return Err(miette!(
                    "no backup found for {}",
                    display_name(&record.original)
                ));
            }
        }

        batch::restore_backups(&records)
    }
}
