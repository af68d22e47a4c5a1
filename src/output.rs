//! Output destinations: stdout, or an ssh_config file merged in place.

use std::fs;
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::render::Section;
use crate::section::{self, MergeAction};

pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl Destination {
    pub fn new(output_file: Option<PathBuf>) -> Self {
        match output_file {
            Some(path) => Self::File(path),
            None => Self::Stdout,
        }
    }

    pub fn write(&self, section: &Section) -> Result<()> {
        match self {
            Self::Stdout => {
                print!("{}", section.to_text());
                std::io::stdout().flush()?;
                Ok(())
            }
            Self::File(path) => write_file(path, section),
        }
    }
}

fn write_file(path: &Path, section: &Section) -> Result<()> {
    // header + body + footer
    let line_count = section.body.len() + 2;
    println!("Preparing to write {} lines to {}..", line_count, path.display());

    let target = resolve_symlink(path)?;
    let existing = read_existing(&target)?;
    let merged = section::merge(existing.as_deref(), &section.key, &section.body)?;

    match merged.action {
        MergeAction::Replaced => {
            println!("{} section exists. Replacing generated content..", section.key)
        }
        MergeAction::Appended => {
            println!("{} section doesn't exist. Appending a new section..", section.key)
        }
    }

    println!("Committing changes..");
    write_atomically(&target, &merged.content)?;
    println!("Done.");
    Ok(())
}

const MAX_LINK_HOPS: usize = 40;

/// Follow a symlinked destination so the link itself is kept, including
/// links whose target does not exist yet.
fn resolve_symlink(path: &Path) -> Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(real) => return Ok(real),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(source) => return Err(AppError::Read { path: path.to_path_buf(), source }),
    }

    let mut current = path.to_path_buf();
    for _ in 0..MAX_LINK_HOPS {
        match fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => {
                let target = fs::read_link(&current)
                    .map_err(|source| AppError::Read { path: current.clone(), source })?;
                current = match current.parent() {
                    Some(parent) if target.is_relative() => parent.join(target),
                    _ => target,
                };
            }
            _ => return Ok(current),
        }
    }
    Err(AppError::Read {
        path: path.to_path_buf(),
        source: std::io::Error::new(ErrorKind::Other, "too many levels of symbolic links"),
    })
}

fn read_existing(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(AppError::Read { path: path.to_path_buf(), source }),
    }
}

/// Write via a sibling temp file and rename it over `path`. On any failure
/// the temp file is removed and `path` keeps its previous content.
pub fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let wrap = |source: std::io::Error| AppError::Write { path: path.to_path_buf(), source };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(wrap)?;
    tmp.write_all(content.as_bytes()).map_err(wrap)?;
    tmp.as_file().sync_all().map_err(wrap)?;

    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), meta.permissions()).map_err(wrap)?;
    }

    tmp.persist(path).map_err(|e| wrap(e.error))?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "file written");
    Ok(())
}
