use crate::error::{CliError, Result};
use relion_star::core::io::parser::ParseOptions;
use relion_star::core::io::traits::StarFormat;
use relion_star::core::io::writer::WriteOptions;
use relion_star::core::models::star_file::StarFile;
use std::path::Path;
use tracing::info;

/// Reads a STAR file, attaching the path to parse failures.
pub fn read_star(path: &Path, options: &ParseOptions) -> Result<StarFile> {
    info!("Loading STAR file from {:?}", path);
    StarFile::read_from_path(path, options).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

pub fn write_star(path: &Path, star: &StarFile, options: &WriteOptions) -> Result<()> {
    info!("Writing {} data block(s) to {:?}", star.len(), path);
    star.write_to_path(path, options)?;
    Ok(())
}
