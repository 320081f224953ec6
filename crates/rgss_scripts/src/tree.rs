//! Flattening a script source tree into bundle entries and rebuilding the
//! tree from a bundle.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::bundle::ScriptEntry;
use crate::compress;
use crate::error::{Error, Result};
use crate::title::{filename_to_title, title_to_filename, UNNAMED};

/// Root-level divider row inserted before each top-level folder.
const DIVIDER: &str = "==================";

/// Sentinel prefix given to the very last materialized file, a terminal
/// marker convention inherited from the bundle's origin format.
const LAST_FILE_PREFIX: &str = "999";

/// Flatten a script source tree into an ordered entry list.
///
/// Files come before folders at every level, each group sorted lexically by
/// name, so repeated runs over an unchanged tree are identical. Before each
/// folder a divider row (at the root) or a blank spacer (one level down) and
/// an `[[ name ]]` marker are inserted. Ordinals are assigned sequentially
/// from 1.
#[instrument(skip_all, fields(root = %root.as_ref().display()), err)]
pub fn flatten_tree(root: impl AsRef<Path>) -> Result<Vec<ScriptEntry>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(Error::MissingFile(root.to_path_buf()));
    }

    let mut entries = Vec::new();
    let mut next_ordinal = 1;
    flatten_level(root, 0, &mut next_ordinal, &mut entries)?;
    Ok(entries)
}

fn flatten_level(
    path: &Path,
    level: usize,
    next_ordinal: &mut i64,
    entries: &mut Vec<ScriptEntry>,
) -> Result<()> {
    let mut files = Vec::new();
    let mut folders = Vec::new();
    for dir_entry in fs::read_dir(path)? {
        let dir_entry = dir_entry?;
        let name = dir_entry.file_name().to_string_lossy().into_owned();
        if dir_entry.file_type()?.is_dir() {
            folders.push(name);
        } else {
            files.push(name);
        }
    }
    files.sort();
    folders.sort();

    for name in files {
        let content = fs::read(path.join(&name))?;
        entries.push(ScriptEntry::new(
            take_ordinal(next_ordinal),
            filename_to_title(&name),
            compress::deflate(&content)?,
        ));
    }

    for name in folders {
        let spacer = compress::deflate(b"")?;
        if level == 0 {
            entries.push(ScriptEntry::new(
                take_ordinal(next_ordinal),
                DIVIDER,
                spacer.clone(),
            ));
        } else if level == 1 {
            entries.push(ScriptEntry::new(
                take_ordinal(next_ordinal),
                "",
                spacer.clone(),
            ));
        }
        entries.push(ScriptEntry::new(
            take_ordinal(next_ordinal),
            format!("[[ {} ]]", filename_to_title(&name)),
            spacer,
        ));
        flatten_level(&path.join(&name), level + 1, next_ordinal, entries)?;
    }
    Ok(())
}

fn take_ordinal(next: &mut i64) -> i64 {
    let ordinal = *next;
    *next += 1;
    ordinal
}

/// Where the reconstruction currently stands while folding over the entry
/// list. Folder nesting is capped at two marker levels below the root; a
/// marker arriving at the cap creates its folder without descending.
struct Layout {
    level: usize,
    folder_ids: [u32; 2],
    file_id: u32,
    dir_path: PathBuf,
    pending_dir: Option<String>,
}

/// Materialize a bundle's entries as a script source tree under `root`.
///
/// Folder markers become `NNN_name` directories numbered per level; entries
/// with a non-empty body become `NNN_title.rb` files numbered per folder,
/// except the last entry, which always gets the `999` sentinel. Spacer rows
/// produce nothing. The numbering follows arrival order, not the numbering
/// the tree had when it was flattened, so prefixes may shift across an
/// extract/combine cycle.
#[instrument(skip_all, fields(root = %root.as_ref().display()), err)]
pub fn reconstruct_tree(entries: &[ScriptEntry], root: impl AsRef<Path>) -> Result<()> {
    let root = root.as_ref();
    fs::create_dir_all(root)?;

    let mut layout = Layout {
        level: 0,
        folder_ids: [1, 1],
        file_id: 1,
        dir_path: root.to_path_buf(),
        pending_dir: None,
    };

    let last_index = entries.len().saturating_sub(1);
    for (index, entry) in entries.iter().enumerate() {
        let body = compress::inflate(&entry.body)?;
        if entry.title.trim().is_empty() && body.is_empty() {
            continue;
        }

        let mut marker_name = None;
        if let Some(name) = entry.folder_name() {
            let name = safe_name(name);
            let number = layout.folder_ids[layout.level];
            let dir_name = format!("{number:03}_{name}");
            let full_path = current_dir(&layout).join(&dir_name);
            debug!(folder = %full_path.display(), "creating script folder");
            fs::create_dir_all(&full_path)?;

            layout.folder_ids[layout.level] += 1;
            if layout.level + 1 < layout.folder_ids.len() {
                layout.level += 1;
                layout.folder_ids[layout.level] = 1;
                layout.dir_path = full_path;
                layout.pending_dir = None;
            } else {
                layout.pending_dir = Some(dir_name);
            }
            layout.file_id = 1;
            marker_name = Some(name);
        } else if entry.is_divider() {
            layout.level = 0;
            layout.dir_path = root.to_path_buf();
            layout.pending_dir = None;
        }

        if body.is_empty() {
            continue;
        }

        let name = marker_name.unwrap_or_else(|| safe_name(&entry.title));
        let number = if index < last_index {
            format!("{:03}", layout.file_id)
        } else {
            LAST_FILE_PREFIX.to_owned()
        };
        let file_path = current_dir(&layout).join(format!("{number}_{name}.rb"));
        debug!(file = %file_path.display(), "writing script file");
        fs::write(file_path, body)?;
        layout.file_id += 1;
    }
    Ok(())
}

fn current_dir(layout: &Layout) -> PathBuf {
    match &layout.pending_dir {
        Some(dir) => layout.dir_path.join(dir),
        None => layout.dir_path.clone(),
    }
}

fn safe_name(raw: &str) -> String {
    let name = title_to_filename(raw.trim());
    if name.is_empty() {
        UNNAMED.to_owned()
    } else {
        name
    }
}
