//! Backup bookkeeping and the batch state machine.
//!
//! A batch runs `Backup -> Convert -> {Committed | RolledBack}`: every file
//! that may be overwritten is backed up first, conversions run file by file,
//! and the first error rolls the whole batch back from those backups.
//! Committed batches keep their backups; they are the target of a later
//! explicit revert.

use std::fs;
use std::path::{Path, PathBuf};

use miette::{Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use rgss_marshal::from_bytes;
use rgss_scripts::{bundle_from_value, is_loader};
use tracing::warn;

use crate::convert::display_name;
use crate::project::{self, Project};

/// One original file and its backup copy.
#[derive(Debug, Clone)]
pub struct BackupRecord {
    pub original: PathBuf,
    pub backup: PathBuf,
}

/// Back up every existing file of the batch into the backup directory.
///
/// A scripts bundle that is already a loader stub is not backed up; the real
/// bundle it replaced is what a backup should hold, and that backup was
/// taken when the stub was installed.
pub fn make_backups(project: &Project, files: &[PathBuf]) -> Result<Vec<BackupRecord>> {
    let mut records = Vec::new();
    for original in files {
        if !original.exists() {
            continue;
        }
        if is_loader_stub(original)? {
            println!(
                "{}",
                format!(
                    "{} is a loader stub, backup skipped",
                    display_name(original)
                )
                .yellow()
            );
            continue;
        }

        let backup = project.backup_file(original);
        println!("{}", format!("Backing up {}", display_name(original)).yellow());
        fs::copy(original, &backup)
            .into_diagnostic()
            .context(format!("backing up {}", original.display()))?;
        records.push(BackupRecord {
            original: original.clone(),
            backup,
        });
    }
    Ok(records)
}

/// Restore every record's original bytes from its backup.
pub fn restore_backups(records: &[BackupRecord]) -> Result<()> {
    for record in records {
        println!(
            "{}",
            format!("Reverting {}", display_name(&record.original)).yellow()
        );
        fs::copy(&record.backup, &record.original)
            .into_diagnostic()
            .context(format!("restoring {}", record.original.display()))?;
    }
    Ok(())
}

/// Run a conversion batch: back up `files`, then run `convert` over each
/// one. Any error reverts the entire batch before surfacing.
pub fn run_batch<F>(project: &Project, files: &[PathBuf], mut convert: F) -> Result<()>
where
    F: FnMut(&Path) -> Result<()>,
{
    let records = make_backups(project, files)?;

    for file in files {
        if let Err(error) = convert(file) {
            warn!("batch failed, rolling back {} backups", records.len());
            restore_backups(&records)?;
            return Err(error);
        }
    }
    Ok(())
}

/// Whether a file holds a script bundle that is only a loader stub.
fn is_loader_stub(path: &Path) -> Result<bool> {
    if !project::is_scripts(&project::stem_of(&display_name(path))) {
        return Ok(false);
    }
    let bytes = fs::read(path)
        .into_diagnostic()
        .context(format!("reading {}", path.display()))?;
    let entries = bundle_from_value(&from_bytes(&bytes)?)?;
    Ok(is_loader(&entries))
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::path::Path;

    use miette::miette;
    use pretty_assertions::assert_eq;

    use super::{make_backups, run_batch};
    use crate::project::Project;

    fn project_with_files(names: &[&str]) -> (tempfile::TempDir, Project, Vec<std::path::PathBuf>) {
        let base = tempfile::tempdir().unwrap();
        let project = Project::open(base.path()).unwrap();
        let files: Vec<_> = names
            .iter()
            .map(|name| {
                let path = project.data_file(name);
                fs::write(&path, format!("original {name}")).unwrap();
                path
            })
            .collect();
        (base, project, files)
    }

    #[test]
    fn backups_are_complete_copies() {
        let (_base, project, files) = project_with_files(&["Actors", "Items"]);

        let records = make_backups(&project, &files).unwrap();
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(
                fs::read(&record.backup).unwrap(),
                fs::read(&record.original).unwrap()
            );
        }
    }

    #[test]
    fn missing_files_are_not_backed_up() {
        let (_base, project, _) = project_with_files(&[]);
        let absent = project.data_file("Absent");

        let records = make_backups(&project, &[absent]).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn a_failing_file_rolls_back_the_whole_batch() {
        let (_base, project, files) = project_with_files(&["Actors", "Items", "Weapons"]);

        let result = run_batch(&project, &files, |file: &Path| {
            if file.ends_with("Items.rxdata") {
                return Err(miette!("injected failure"));
            }
            fs::write(file, b"converted").unwrap();
            Ok(())
        });
        assert!(result.is_err());

        // The first file was converted before the failure; rollback restored
        // its pre-batch bytes. Backups themselves are retained.
        assert_eq!(fs::read(&files[0]).unwrap(), b"original Actors");
        assert_eq!(fs::read(&files[2]).unwrap(), b"original Weapons");
        for file in &files {
            assert!(project.backup_file(file).exists());
        }
    }

    #[test]
    fn a_clean_batch_commits_and_keeps_backups() {
        let (_base, project, files) = project_with_files(&["Actors"]);

        run_batch(&project, &files, |file: &Path| {
            fs::write(file, b"converted").unwrap();
            Ok(())
        })
        .unwrap();

        assert_eq!(fs::read(&files[0]).unwrap(), b"converted");
        assert_eq!(
            fs::read(project.backup_file(&files[0])).unwrap(),
            b"original Actors"
        );
    }
}
