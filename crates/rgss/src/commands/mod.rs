pub mod backup;
pub mod combine;
pub mod extract;
pub mod revert;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Convert binary data files into editable text and unpack the script bundle
    Extract(extract::ExtractArgs),
    /// Convert textual documents back into binary data and pack the script bundle
    Combine(combine::CombineArgs),
    /// Back up binary data files without converting anything
    Backup(backup::BackupArgs),
    /// Restore binary data files from their backups
    Revert(revert::RevertArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Extract(extract) => extract.handle(),
            Commands::Combine(combine) => combine.handle(),
            Commands::Backup(backup) => backup.handle(),
            Commands::Revert(revert) => revert.handle(),
        }
    }
}
