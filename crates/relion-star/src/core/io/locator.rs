use super::parser::ParseOptions;
use super::traits::StarFormat;
use crate::core::error::StarError;
use crate::core::models::star_file::StarFile;
use crate::core::models::table::Table;
use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

/// Addresses one table of a STAR file as `block@path`.
///
/// `particles@Refine3D/job019/run_data.star` names the `data_particles` block;
/// a bare path selects the file's only block. The `@` only separates a block
/// name when the text before it has no path separator, so paths that contain
/// `@` in a directory name still work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLocator {
    pub block: Option<String>,
    pub path: PathBuf,
}

impl TableLocator {
    pub fn new(block: Option<&str>, path: impl Into<PathBuf>) -> Self {
        Self {
            block: block.map(str::to_string),
            path: path.into(),
        }
    }

    /// Reads the whole file the locator points into.
    pub fn read_file(&self, options: &ParseOptions) -> Result<StarFile, StarError> {
        debug!("Reading STAR file {:?}", self.path);
        StarFile::read_from_path(&self.path, options)
    }

    /// Reads the file and returns the addressed table.
    pub fn read(&self, options: &ParseOptions) -> Result<Table, StarError> {
        self.read_file(options)?.into_table(self.block.as_deref())
    }
}

impl FromStr for TableLocator {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((block, path)) = s.split_once('@') {
            if !block.contains(['/', '\\']) && !path.is_empty() {
                let block = block.strip_prefix("data_").unwrap_or(block);
                return Ok(Self {
                    block: (!block.is_empty()).then(|| block.to_string()),
                    path: PathBuf::from(path),
                });
            }
        }
        Ok(Self {
            block: None,
            path: PathBuf::from(s),
        })
    }
}

impl fmt::Display for TableLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.block {
            Some(block) => write!(f, "{}@{}", block, self.path.display()),
            None => write!(f, "{}", self.path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_block_and_path() {
        let locator: TableLocator = "particles@Refine3D/job019/run_data.star".parse().unwrap();
        assert_eq!(locator.block.as_deref(), Some("particles"));
        assert_eq!(locator.path, PathBuf::from("Refine3D/job019/run_data.star"));
        assert_eq!(locator.to_string(), "particles@Refine3D/job019/run_data.star");
    }

    #[test]
    fn bare_path_has_no_block() {
        let locator: TableLocator = "run_data.star".parse().unwrap();
        assert_eq!(locator.block, None);
        assert_eq!(locator.to_string(), "run_data.star");
    }

    #[test]
    fn at_sign_inside_directories_is_part_of_the_path() {
        let locator: TableLocator = "/data/user@lab/run_data.star".parse().unwrap();
        assert_eq!(locator.block, None);
        assert_eq!(locator.path, PathBuf::from("/data/user@lab/run_data.star"));
    }

    #[test]
    fn data_prefix_and_empty_block_are_normalized() {
        let locator: TableLocator = "data_optics@run.star".parse().unwrap();
        assert_eq!(locator.block.as_deref(), Some("optics"));
        let locator: TableLocator = "@run.star".parse().unwrap();
        assert_eq!(locator.block, None);
    }

    #[test]
    fn read_returns_addressed_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run_data.star");
        std::fs::write(
            &path,
            "data_optics\nloop_\n_rlnOpticsGroup\n1\n\ndata_particles\nloop_\n_rlnClassNumber\n3\n4\n",
        )
        .unwrap();

        let table = TableLocator::new(Some("particles"), &path)
            .read(&ParseOptions::default())
            .unwrap();
        assert_eq!(table.int_column("rlnClassNumber").unwrap(), vec![3, 4]);

        let result = TableLocator::new(None, &path).read(&ParseOptions::default());
        assert!(matches!(result, Err(StarError::AmbiguousBlock { count: 2 })));
    }
}
