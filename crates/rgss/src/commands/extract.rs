use std::path::PathBuf;

use clap::Args;
use miette::{Context, IntoDiagnostic, Result};

use crate::batch;
use crate::convert::{self, ConversionUnit};
use crate::project::{self, Project};

#[derive(Args)]
pub struct ExtractArgs {
    /// The project directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    directory: PathBuf,

    /// Base names of the data files to extract (default: all of them)
    files: Vec<String>,

    /// Re-run conversions whose destination is already up to date
    #[arg(long, default_value_t = false)]
    force: bool,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let project = Project::open(&self.directory)
            .into_diagnostic()
            .context(format!("opening project {}", self.directory.display()))?;
        let files = project.data_files(&self.files).into_diagnostic()?;

        batch::run_batch(&project, &files, |file| {
            let stem = project::stem_of(&convert::display_name(file));
            if project::is_scripts(&stem) {
                return convert::extract_scripts(&project, file);
            }

            let unit = ConversionUnit::new(file.to_path_buf(), project.text_file(&stem));
            if unit.is_fresh(self.force)? {
                convert::report_fresh(&unit);
                Ok(())
            } else {
                convert::extract_data_file(&unit)
            }
        })
    }
}
