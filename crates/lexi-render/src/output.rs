// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Writing a rendered document to a fresh file.
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::document::Document;
use crate::error::RenderError;

/// Creates `stem.ext` in `dir`, or `stem1.ext`, `stem2.ext`, … when taken,
/// giving up after `attempts` names.
pub fn create_unique(
    dir: &Path,
    stem: &str,
    ext: &str,
    attempts: usize,
) -> Result<(File, PathBuf), RenderError> {
    for n in 0..attempts.max(1) {
        let name = if n == 0 {
            format!("{stem}.{ext}")
        } else {
            format!("{stem}{n}.{ext}")
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((file, path)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "output name taken");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(RenderError::Io(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!(
            "no free name for {stem}.{ext} in {} after {attempts} attempts",
            dir.display()
        ),
    )))
}

/// Writes `doc.markup` to a fresh `stem.xhtml` in `primary`, falling back to
/// `fallback` when `primary` is unusable. Returns the path written.
pub fn write_document(
    doc: &Document,
    primary: &Path,
    fallback: &Path,
    stem: &str,
    attempts: usize,
) -> Result<PathBuf, RenderError> {
    let (file, path) = match create_unique(primary, stem, "xhtml", attempts) {
        Ok(created) => created,
        Err(err) => {
            warn!(dir = %primary.display(), error = %err, "falling back to alternate output directory");
            create_unique(fallback, stem, "xhtml", attempts)?
        }
    };
    let mut writer = BufWriter::new(file);
    writer.write_all(doc.markup.as_bytes())?;
    writer.flush()?;
    Ok(path)
}
