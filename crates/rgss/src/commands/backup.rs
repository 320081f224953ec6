use std::path::PathBuf;

use clap::Args;
use miette::{Context, IntoDiagnostic, Result};

use crate::batch;
use crate::project::Project;

#[derive(Args)]
pub struct BackupArgs {
    /// The project directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    directory: PathBuf,

    /// Base names of the data files to back up (default: all of them)
    files: Vec<String>,
}

impl BackupArgs {
    pub fn handle(&self) -> Result<()> {
        let project = Project::open(&self.directory)
            .into_diagnostic()
            .context(format!("opening project {}", self.directory.display()))?;
        let files = project.data_files(&self.files).into_diagnostic()?;

        batch::make_backups(&project, &files)?;
        Ok(())
    }
}
