//! The project directory contract.
//!
//! A project base directory holds `Data/` with the binary files, and under
//! it `Text/` for textual tree documents, `Scripts/` for the reconstructed
//! script source tree and `Backup/` for flat backup copies.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Extension of binary object-graph files.
pub const DATA_EXT: &str = "rxdata";
/// Extension of textual tree documents.
pub const TEXT_EXT: &str = "rvtext";
/// Suffix appended to backup copies.
pub const BACKUP_EXT: &str = "backup";
/// Base name of the script bundle file, compared case-insensitively.
pub const SCRIPTS_BASENAME: &str = "Scripts";

/// Resolved directory layout of one project.
#[derive(Debug, Clone)]
pub struct Project {
    pub base: PathBuf,
    pub data_dir: PathBuf,
    pub text_dir: PathBuf,
    pub script_dir: PathBuf,
    pub backup_dir: PathBuf,
}

impl Project {
    /// Resolve a project rooted at `base`, creating any missing layout
    /// directories.
    pub fn open(base: impl AsRef<Path>) -> io::Result<Project> {
        let base = base.as_ref().to_path_buf();
        let data_dir = base.join("Data");
        let project = Project {
            text_dir: data_dir.join("Text"),
            script_dir: data_dir.join("Scripts"),
            backup_dir: data_dir.join("Backup"),
            data_dir,
            base,
        };

        for dir in [
            &project.data_dir,
            &project.text_dir,
            &project.script_dir,
            &project.backup_dir,
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(project)
    }

    /// The binary data file for a base name.
    pub fn data_file(&self, stem: &str) -> PathBuf {
        self.data_dir.join(format!("{stem}.{DATA_EXT}"))
    }

    /// The textual document for a base name.
    pub fn text_file(&self, stem: &str) -> PathBuf {
        self.text_dir.join(format!("{stem}.{TEXT_EXT}"))
    }

    /// The backup copy for a file. A file that already is a backup maps to
    /// itself inside the backup directory.
    pub fn backup_file(&self, original: &Path) -> PathBuf {
        let name = file_name(original);
        if name.ends_with(&format!(".{BACKUP_EXT}")) {
            self.backup_dir.join(name)
        } else {
            self.backup_dir.join(format!("{name}.{BACKUP_EXT}"))
        }
    }

    /// The binary data files a batch should cover: the explicitly requested
    /// base names, or every data file present, in lexical order.
    pub fn data_files(&self, requested: &[String]) -> io::Result<Vec<PathBuf>> {
        if requested.is_empty() {
            return list_by_extension(&self.data_dir, DATA_EXT);
        }
        Ok(requested
            .iter()
            .map(|name| self.data_file(&stem_of(name)))
            .collect())
    }

    /// The base names a combine run should cover: the explicitly requested
    /// ones, or every textual document present plus the scripts bundle when
    /// its source tree is non-empty.
    pub fn combine_stems(&self, requested: &[String]) -> io::Result<Vec<String>> {
        if !requested.is_empty() {
            return Ok(requested.iter().map(|name| stem_of(name)).collect());
        }

        let mut stems: Vec<String> = list_by_extension(&self.text_dir, TEXT_EXT)?
            .iter()
            .map(|path| stem_of(&file_name(path)))
            .collect();
        if self.script_dir.read_dir()?.next().is_some() {
            stems.push(SCRIPTS_BASENAME.to_owned());
        }
        stems.sort();
        Ok(stems)
    }
}

/// Whether a base name refers to the script bundle.
pub fn is_scripts(stem: &str) -> bool {
    stem.eq_ignore_ascii_case(SCRIPTS_BASENAME)
}

/// The base name of a path, extension removed.
pub fn stem_of(name: &str) -> String {
    let name = file_name(Path::new(name));
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_owned(),
        _ => name,
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn list_by_extension(dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::other)?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == extension)
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
