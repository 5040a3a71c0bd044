//! Zip archives of build output directories.

use std::fs::File;
use std::io;
use std::path::Path;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{RelayError, Result};

/// Archive every regular file under `src_dir` into `out_zip`.
///
/// Entry names are relative to `src_dir` with `/` separators. Returns the
/// number of files written.
pub fn zip_dir(src_dir: &Path, out_zip: &Path) -> Result<usize> {
    if !src_dir.is_dir() {
        return Err(RelayError::ArtifactNotFound {
            package: out_zip.display().to_string(),
            path: src_dir.to_path_buf(),
        });
    }

    let mut writer = ZipWriter::new(File::create(out_zip)?);

    let mut count = 0;
    for entry in WalkDir::new(src_dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(src_dir)
            .map_err(|e| anyhow::anyhow!("{}: {}", entry.path().display(), e))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        writer.start_file(
            name,
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        )?;
        let mut file = File::open(entry.path())?;
        io::copy(&mut file, &mut writer)?;
        count += 1;
    }

    writer.finish()?;
    tracing::debug!("Archived {} files into {}", count, out_zip.display());
    Ok(count)
}
