use std::fs;
use std::io;

use camino::Utf8Path;
use tempfile::{Builder, TempDir};
use tracing::debug;
use zip::ZipArchive;

use crate::error::GbifError;

pub fn extract_archive(zip_path: &Utf8Path, work_root: &Utf8Path) -> Result<TempDir, GbifError> {
    let archive_err = |message: String| GbifError::ArchiveFormat {
        path: zip_path.as_std_path().to_path_buf(),
        message,
    };
    let file = fs::File::open(zip_path.as_std_path())
        .map_err(|_| GbifError::ArchiveOpen(zip_path.as_std_path().to_path_buf()))?;
    let mut archive = ZipArchive::new(file).map_err(|err| archive_err(err.to_string()))?;

    fs::create_dir_all(work_root.as_std_path())
        .map_err(|err| GbifError::Filesystem(format!("create {work_root}: {err}")))?;
    let stem = zip_path.file_stem().unwrap_or("gbif-archive");
    let work_dir = Builder::new()
        .prefix(&format!("{stem}-"))
        .tempdir_in(work_root.as_std_path())
        .map_err(|err| GbifError::Filesystem(err.to_string()))?;

    // Darwin Core downloads are flat (tables plus meta.xml), so directory
    // entries only matter through the files inside them.
    for index in 0..archive.len() {
        let mut member = archive
            .by_index(index)
            .map_err(|err| archive_err(err.to_string()))?;
        if member.is_dir() {
            continue;
        }
        let Some(relative) = member.enclosed_name() else {
            return Err(archive_err(format!(
                "member {} escapes the archive",
                member.name()
            )));
        };
        let dest = work_dir.path().join(&relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|err| GbifError::Filesystem(err.to_string()))?;
        }
        let mut out =
            fs::File::create(&dest).map_err(|err| GbifError::Filesystem(err.to_string()))?;
        let bytes = io::copy(&mut member, &mut out).map_err(|err| archive_err(err.to_string()))?;
        debug!(member = %relative.display(), bytes, "extracted");
    }

    Ok(work_dir)
}

// `TempDir`'s drop swallows removal errors; this surfaces them.
pub fn remove_work_dir(work_dir: TempDir) -> Result<(), GbifError> {
    let path = work_dir.path().display().to_string();
    work_dir
        .close()
        .map_err(|err| GbifError::Filesystem(format!("remove {path}: {err}")))
}
