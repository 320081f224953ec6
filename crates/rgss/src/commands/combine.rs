use std::path::PathBuf;

use clap::Args;
use miette::{Context, IntoDiagnostic, Result};

use crate::batch;
use crate::convert::{self, ConversionUnit};
use crate::project::{self, Project};

#[derive(Args)]
pub struct CombineArgs {
    /// The project directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    directory: PathBuf,

    /// Base names of the files to combine (default: every textual document,
    /// plus the script bundle when the source tree is non-empty)
    files: Vec<String>,

    /// Re-run conversions whose destination is already up to date, and pack
    /// the script bundle even over a full one
    #[arg(long, default_value_t = false)]
    force: bool,
}

impl CombineArgs {
    pub fn handle(&self) -> Result<()> {
        let project = Project::open(&self.directory)
            .into_diagnostic()
            .context(format!("opening project {}", self.directory.display()))?;
        let stems = project.combine_stems(&self.files).into_diagnostic()?;
        let targets: Vec<PathBuf> = stems.iter().map(|stem| project.data_file(stem)).collect();

        batch::run_batch(&project, &targets, |file| {
            let stem = project::stem_of(&convert::display_name(file));
            if project::is_scripts(&stem) {
                return convert::combine_scripts(&project, file, self.force);
            }

            let unit = ConversionUnit::new(project.text_file(&stem), file.to_path_buf());
            if unit.is_fresh(self.force)? {
                convert::report_fresh(&unit);
                Ok(())
            } else {
                convert::combine_text_file(&unit)
            }
        })
    }
}
