use super::table::Table;
use crate::core::error::StarError;

/// How a block is laid out on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlockStyle {
    /// A `loop_` header followed by labels and rows.
    #[default]
    Loop,
    /// `_label value` lines describing a single row.
    Pairs,
}

/// A named table inside a STAR file.
#[derive(Debug, Clone, PartialEq)]
pub struct DataBlock {
    name: String,
    style: BlockStyle,
    table: Table,
}

impl DataBlock {
    pub fn new(name: impl Into<String>, style: BlockStyle, table: Table) -> Self {
        Self {
            name: name.into(),
            style,
            table,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style(&self) -> BlockStyle {
        self.style
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut Table {
        &mut self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }
}

/// An ordered collection of uniquely named data blocks.
///
/// Block order is the file order and is preserved when writing. Block names
/// are stored without the `data_` prefix; a bare `data_` header yields an
/// empty name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StarFile {
    blocks: Vec<DataBlock>,
}

impl StarFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_blocks(blocks: Vec<DataBlock>) -> Self {
        Self { blocks }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[DataBlock] {
        &self.blocks
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(|b| b.name.as_str())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.name == name).or_else(|| {
            let bare = name.strip_prefix("data_")?;
            self.blocks.iter().position(|b| b.name == bare)
        })
    }

    pub fn block(&self, name: &str) -> Option<&DataBlock> {
        self.position(name).map(|i| &self.blocks[i])
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.block(name).map(|b| &b.table)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.position(name).map(|i| &mut self.blocks[i].table)
    }

    /// Inserts a loop block, replacing the table of an existing block with the
    /// same name in place. Returns the replaced table, if any.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        table: Table,
    ) -> Result<Option<Table>, StarError> {
        self.insert_block(DataBlock::new(name, BlockStyle::Loop, table))
    }

    /// Like [`StarFile::insert`] but marks the block as key/value pairs.
    pub fn insert_pairs(
        &mut self,
        name: impl Into<String>,
        table: Table,
    ) -> Result<Option<Table>, StarError> {
        self.insert_block(DataBlock::new(name, BlockStyle::Pairs, table))
    }

    /// # Errors
    ///
    /// Returns [`StarError::InvalidBlockName`] if the name contains whitespace;
    /// the file is left unchanged.
    pub fn insert_block(&mut self, block: DataBlock) -> Result<Option<Table>, StarError> {
        if block.name.contains(char::is_whitespace) {
            return Err(StarError::InvalidBlockName(block.name));
        }
        Ok(match self.position(&block.name) {
            Some(i) => Some(std::mem::replace(&mut self.blocks[i], block).table),
            None => {
                self.blocks.push(block);
                None
            }
        })
    }

    pub fn remove(&mut self, name: &str) -> Option<Table> {
        self.position(name).map(|i| self.blocks.remove(i).table)
    }

    fn resolve(&self, name: Option<&str>) -> Result<usize, StarError> {
        match name {
            Some(name) => self
                .position(name)
                .ok_or_else(|| StarError::BlockNotFound(name.to_string())),
            None => match self.blocks.len() {
                0 => Err(StarError::EmptyFile),
                1 => Ok(0),
                count => Err(StarError::AmbiguousBlock { count }),
            },
        }
    }

    /// Returns the named table, or the only table when `name` is `None`.
    ///
    /// # Errors
    ///
    /// * [`StarError::AmbiguousBlock`] if `name` is `None` and the file holds
    ///   more than one block.
    /// * [`StarError::BlockNotFound`] if the named block does not exist.
    pub fn table(&self, name: Option<&str>) -> Result<&Table, StarError> {
        let i = self.resolve(name)?;
        Ok(&self.blocks[i].table)
    }

    pub fn table_mut(&mut self, name: Option<&str>) -> Result<&mut Table, StarError> {
        let i = self.resolve(name)?;
        Ok(&mut self.blocks[i].table)
    }

    pub fn into_table(mut self, name: Option<&str>) -> Result<Table, StarError> {
        let i = self.resolve(name)?;
        Ok(self.blocks.swap_remove(i).table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::value::ColumnType;

    fn table_with(label: &str) -> Table {
        Table::with_columns([(label, ColumnType::Int)]).unwrap()
    }

    #[test]
    fn insert_appends_and_replaces_in_place() {
        let mut file = StarFile::new();
        assert!(file.insert("optics", table_with("rlnOpticsGroup")).unwrap().is_none());
        assert!(file.insert("particles", table_with("rlnClassNumber")).unwrap().is_none());

        let replaced = file.insert("optics", table_with("rlnVoltage")).unwrap();
        assert!(replaced.unwrap().has_column("rlnOpticsGroup"));

        let names: Vec<_> = file.names().collect();
        assert_eq!(names, vec!["optics", "particles"]);
        assert!(file.get("optics").unwrap().has_column("rlnVoltage"));
    }

    #[test]
    fn lookup_accepts_data_prefix() {
        let mut file = StarFile::new();
        file.insert("particles", table_with("rlnClassNumber")).unwrap();
        assert!(file.get("data_particles").is_some());
    }

    #[test]
    fn table_without_name_requires_single_block() {
        let mut file = StarFile::new();
        assert!(matches!(file.table(None), Err(StarError::EmptyFile)));

        file.insert("", table_with("rlnClassNumber")).unwrap();
        assert!(file.table(None).is_ok());

        file.insert("optics", table_with("rlnOpticsGroup")).unwrap();
        assert!(matches!(
            file.table(None),
            Err(StarError::AmbiguousBlock { count: 2 })
        ));
        assert!(file.table(Some("optics")).is_ok());
        assert!(matches!(
            file.table(Some("particles")),
            Err(StarError::BlockNotFound(name)) if name == "particles"
        ));
    }

    #[test]
    fn remove_and_into_table() {
        let mut file = StarFile::new();
        file.insert("optics", table_with("rlnOpticsGroup")).unwrap();
        file.insert_pairs("general", table_with("rlnFinalResolution"))
            .unwrap();
        assert_eq!(file.block("general").unwrap().style(), BlockStyle::Pairs);

        assert!(file.remove("optics").is_some());
        assert_eq!(file.len(), 1);
        let table = file.into_table(None).unwrap();
        assert!(table.has_column("rlnFinalResolution"));
    }

    #[test]
    fn block_names_with_whitespace_are_rejected() {
        let mut file = StarFile::new();
        file.insert("optics", table_with("rlnOpticsGroup")).unwrap();
        assert!(matches!(
            file.insert("my block", table_with("rlnClassNumber")),
            Err(StarError::InvalidBlockName(name)) if name == "my block"
        ));
        assert!(matches!(
            file.insert_pairs("general\n", table_with("rlnFinalResolution")),
            Err(StarError::InvalidBlockName(_))
        ));
        assert_eq!(file.names().collect::<Vec<_>>(), vec!["optics"]);
    }
}
