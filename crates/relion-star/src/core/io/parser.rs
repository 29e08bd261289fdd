use crate::core::error::{ParseErrorKind, StarError};
use crate::core::labels;
use crate::core::models::star_file::{BlockStyle, DataBlock, StarFile};
use crate::core::models::table::{Column, Table, normalize_label};
use crate::core::models::value::{ColumnType, Value};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, trace};

/// Options for a single parse call.
///
/// Type hints override inference for the labels they name; every other
/// column is typed from its first non-empty value.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    type_hints: HashMap<String, ColumnType>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TypeHintsFile {
    labels: HashMap<String, ColumnType>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options preloaded with the types of the known Relion labels.
    pub fn relion() -> Self {
        Self {
            type_hints: labels::all()
                .map(|(label, kind)| (label.to_string(), kind))
                .collect(),
        }
    }

    pub fn with_hint(mut self, label: &str, kind: ColumnType) -> Self {
        self.type_hints
            .insert(normalize_label(label).to_string(), kind);
        self
    }

    /// Adds hints from a TOML file with a `[labels]` table, e.g.
    /// `rlnMyScore = "float"`. Later hints override earlier ones.
    pub fn load_hints<P: AsRef<Path>>(mut self, path: P) -> Result<Self, StarError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let file: TypeHintsFile = toml::from_str(&content).map_err(|e| StarError::TypeHints {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!(
            "Loaded {} label type hints from {:?}",
            file.labels.len(),
            path
        );
        for (label, kind) in file.labels {
            self.type_hints
                .insert(normalize_label(&label).to_string(), kind);
        }
        Ok(self)
    }

    pub fn hint(&self, label: &str) -> Option<ColumnType> {
        self.type_hints.get(normalize_label(label)).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    text: String,
    quoted: bool,
}

/// Splits a line into fields, honouring STAR quoting.
///
/// A quote only closes when followed by whitespace or the end of the line, so
/// `'it's'` is read as `it's`. An unquoted token starting with `#` begins a
/// comment that runs to the end of the line.
fn tokenize(line: &str) -> Result<Vec<Token>, ParseErrorKind> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }
        match chars[i] {
            '#' => break,
            quote @ ('\'' | '"') => {
                let start = i + 1;
                let mut end = None;
                let mut j = start;
                while j < chars.len() {
                    if chars[j] == quote && chars.get(j + 1).is_none_or(|c| c.is_whitespace()) {
                        end = Some(j);
                        break;
                    }
                    j += 1;
                }
                let end = end.ok_or(ParseErrorKind::UnterminatedQuote)?;
                tokens.push(Token {
                    text: chars[start..end].iter().collect(),
                    quoted: true,
                });
                i = end + 1;
            }
            _ => {
                let start = i;
                while i < chars.len() && !chars[i].is_whitespace() {
                    i += 1;
                }
                tokens.push(Token {
                    text: chars[start..i].iter().collect(),
                    quoted: false,
                });
            }
        }
    }
    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    Empty,
    Pairs,
    LoopHeader { line: usize },
    LoopRows,
}

/// Accumulates the raw fields of one block until its types can be fixed.
struct PendingBlock {
    name: String,
    state: BlockState,
    labels: Vec<String>,
    rows: Vec<(usize, Vec<Token>)>,
}

impl PendingBlock {
    fn new(name: String) -> Self {
        Self {
            name,
            state: BlockState::Empty,
            labels: Vec::new(),
            rows: Vec::new(),
        }
    }

    fn push_label(&mut self, label: &str, line: usize) -> Result<(), StarError> {
        if self.labels.iter().any(|l| l == label) {
            return Err(StarError::parse(
                line,
                ParseErrorKind::DuplicateLabel(label.to_string()),
            ));
        }
        self.labels.push(label.to_string());
        Ok(())
    }
}

/// State for one parse call. Nothing outlives the call.
struct ParseContext<'o> {
    options: &'o ParseOptions,
    blocks: Vec<DataBlock>,
    seen_names: HashSet<String>,
    current: Option<PendingBlock>,
}

impl<'o> ParseContext<'o> {
    fn new(options: &'o ParseOptions) -> Self {
        Self {
            options,
            blocks: Vec::new(),
            seen_names: HashSet::new(),
            current: None,
        }
    }

    fn feed(&mut self, line_num: usize, line: &str) -> Result<(), StarError> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }

        let tokens = tokenize(trimmed).map_err(|kind| StarError::parse(line_num, kind))?;
        if tokens.is_empty() {
            return Ok(());
        }

        if !tokens[0].quoted {
            let head = &tokens[0].text;
            let keyword = keyword_suffix(head, "data_")
                .map(|name| Some(name.to_string()))
                .or_else(|| head.eq_ignore_ascii_case("loop_").then_some(None));
            if let Some(block_name) = keyword {
                if let Some(extra) = tokens.get(1) {
                    return Err(StarError::parse(
                        line_num,
                        ParseErrorKind::Unexpected(extra.text.clone()),
                    ));
                }
                return match block_name {
                    Some(name) => self.start_block(line_num, &name),
                    None => self.start_loop(line_num),
                };
            }
        }

        let Some(block) = self.current.as_mut() else {
            return Err(StarError::parse(
                line_num,
                ParseErrorKind::MissingBlockHeader(tokens[0].text.clone()),
            ));
        };

        if !tokens[0].quoted && tokens[0].text.starts_with('_') {
            let label = tokens[0].text[1..].to_string();
            match block.state {
                BlockState::LoopHeader { .. } => {
                    if tokens.len() > 1 {
                        return Err(StarError::parse(
                            line_num,
                            ParseErrorKind::Unexpected(tokens[1].text.clone()),
                        ));
                    }
                    block.push_label(&label, line_num)?;
                }
                BlockState::LoopRows => {
                    return Err(StarError::parse(
                        line_num,
                        ParseErrorKind::LabelAfterData(label),
                    ));
                }
                BlockState::Empty | BlockState::Pairs => {
                    let mut rest = tokens.into_iter().skip(1);
                    let value = rest.next().ok_or_else(|| {
                        StarError::parse(line_num, ParseErrorKind::MissingValue(label.clone()))
                    })?;
                    if let Some(extra) = rest.next() {
                        return Err(StarError::parse(
                            line_num,
                            ParseErrorKind::Unexpected(extra.text),
                        ));
                    }
                    block.push_label(&label, line_num)?;
                    match block.rows.first_mut() {
                        Some((_, row)) => row.push(value),
                        None => block.rows.push((line_num, vec![value])),
                    }
                    block.state = BlockState::Pairs;
                }
            }
            return Ok(());
        }

        match block.state {
            BlockState::LoopHeader { .. } | BlockState::LoopRows => {
                if block.labels.is_empty() {
                    return Err(StarError::parse(
                        line_num,
                        ParseErrorKind::LoopWithoutLabels,
                    ));
                }
                if tokens.len() != block.labels.len() {
                    return Err(StarError::parse(
                        line_num,
                        ParseErrorKind::FieldCount {
                            expected: block.labels.len(),
                            actual: tokens.len(),
                        },
                    ));
                }
                block.rows.push((line_num, tokens));
                block.state = BlockState::LoopRows;
                Ok(())
            }
            BlockState::Empty | BlockState::Pairs => Err(StarError::parse(
                line_num,
                ParseErrorKind::Unexpected(tokens[0].text.clone()),
            )),
        }
    }

    fn start_block(&mut self, line_num: usize, name: &str) -> Result<(), StarError> {
        self.finish_block()?;
        if !self.seen_names.insert(name.to_string()) {
            return Err(StarError::parse(
                line_num,
                ParseErrorKind::DuplicateBlock(name.to_string()),
            ));
        }
        trace!("Line {}: start of block 'data_{}'", line_num, name);
        self.current = Some(PendingBlock::new(name.to_string()));
        Ok(())
    }

    fn start_loop(&mut self, line_num: usize) -> Result<(), StarError> {
        let Some(block) = self.current.as_mut() else {
            return Err(StarError::parse(
                line_num,
                ParseErrorKind::MissingBlockHeader("loop_".to_string()),
            ));
        };
        if block.state != BlockState::Empty {
            return Err(StarError::parse(line_num, ParseErrorKind::MixedBlock));
        }
        block.state = BlockState::LoopHeader { line: line_num };
        Ok(())
    }

    fn finish_block(&mut self) -> Result<(), StarError> {
        let Some(block) = self.current.take() else {
            return Ok(());
        };
        if let BlockState::LoopHeader { line } = block.state {
            if block.labels.is_empty() {
                return Err(StarError::parse(line, ParseErrorKind::UnterminatedLoop));
            }
        }
        let style = match block.state {
            BlockState::Pairs => BlockStyle::Pairs,
            _ => BlockStyle::Loop,
        };
        let table = self.build_table(block.labels, block.rows)?;
        debug!(
            "Parsed block 'data_{}' ({:?}, {} columns, {} rows)",
            block.name,
            style,
            table.num_columns(),
            table.len()
        );
        self.blocks.push(DataBlock::new(block.name, style, table));
        Ok(())
    }

    fn build_table(
        &self,
        labels: Vec<String>,
        rows: Vec<(usize, Vec<Token>)>,
    ) -> Result<Table, StarError> {
        let columns: Vec<Column> = labels
            .iter()
            .enumerate()
            .map(|(col, label)| {
                let kind = self.options.hint(label).unwrap_or_else(|| {
                    rows.iter()
                        .map(|(_, fields)| &fields[col])
                        .find(|t| !t.text.is_empty())
                        .map(|t| {
                            if t.quoted {
                                ColumnType::Str
                            } else {
                                ColumnType::infer(&t.text)
                            }
                        })
                        .unwrap_or(ColumnType::Str)
                });
                Column::new(label.as_str(), kind)
            })
            .collect();

        let mut values = Vec::with_capacity(rows.len());
        for (line_num, fields) in rows {
            let row = fields
                .into_iter()
                .zip(&columns)
                .map(|(token, column)| {
                    Value::coerce(&token.text, column.kind()).ok_or_else(|| {
                        StarError::parse(
                            line_num,
                            ParseErrorKind::TypeCoercion {
                                column: column.label().to_string(),
                                value: token.text,
                                expected: column.kind(),
                            },
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            values.push(row);
        }
        Ok(Table::from_parts(columns, values))
    }

    fn finish(mut self) -> Result<StarFile, StarError> {
        self.finish_block()?;
        if self.blocks.is_empty() {
            return Err(StarError::EmptyFile);
        }
        Ok(StarFile::from_blocks(self.blocks))
    }
}

/// Case-insensitive keyword prefix match on a single token, returning the remainder.
fn keyword_suffix<'a>(token: &'a str, keyword: &str) -> Option<&'a str> {
    let head = token.get(..keyword.len())?;
    head.eq_ignore_ascii_case(keyword)
        .then(|| &token[keyword.len()..])
}

pub fn parse_reader(reader: &mut impl BufRead, options: &ParseOptions) -> Result<StarFile, StarError> {
    let mut context = ParseContext::new(options);
    for (index, line) in reader.lines().enumerate() {
        context.feed(index + 1, &line?)?;
    }
    context.finish()
}

pub fn parse_str(content: &str, options: &ParseOptions) -> Result<StarFile, StarError> {
    let mut context = ParseContext::new(options);
    for (index, line) in content.lines().enumerate() {
        context.feed(index + 1, line)?;
    }
    context.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARTICLES: &str = "\
# version 30001

data_particles

loop_
_rlnImageId #1
_rlnDefocusU #2
1 10000.0
2 12000.0
";

    fn parse(content: &str) -> Result<StarFile, StarError> {
        parse_str(content, &ParseOptions::default())
    }

    fn parse_error(content: &str) -> (usize, ParseErrorKind) {
        match parse(content) {
            Err(StarError::Parse { line, kind }) => (line, kind),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn parses_loop_block_with_inferred_types() {
        let file = parse(PARTICLES).unwrap();
        let table = file.table(Some("particles")).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_type("rlnImageId").unwrap(), ColumnType::Int);
        assert_eq!(table.column_type("rlnDefocusU").unwrap(), ColumnType::Float);
        assert_eq!(
            table.float_column("rlnDefocusU").unwrap(),
            vec![10000.0, 12000.0]
        );
    }

    #[test]
    fn infers_int_float_and_string_columns() {
        let file = parse("data_\nloop_\n_a\n_b\n_c\n1 1.0 abc\n2 2.5 def\n3 3 ghi\n").unwrap();
        let table = file.table(None).unwrap();
        assert_eq!(table.column_type("a").unwrap(), ColumnType::Int);
        assert_eq!(table.column_type("b").unwrap(), ColumnType::Float);
        assert_eq!(table.column_type("c").unwrap(), ColumnType::Str);
        assert_eq!(table.value(2, "b").unwrap(), &Value::Float(3.0));
    }

    #[test]
    fn parses_key_value_block_as_single_row() {
        let file = parse(
            "data_model_general\n\n_rlnReferenceDimensionality 3\n_rlnCurrentResolution 4.25\n_rlnTauFudge 'a b'\n",
        )
        .unwrap();
        let block = file.block("model_general").unwrap();
        assert_eq!(block.style(), BlockStyle::Pairs);
        let table = block.table();
        assert_eq!(table.len(), 1);
        let row = table.row(0).unwrap();
        assert_eq!(row.get_int("rlnReferenceDimensionality").unwrap(), 3);
        assert_eq!(row.get_float("rlnCurrentResolution").unwrap(), 4.25);
        assert_eq!(row.get_str("rlnTauFudge").unwrap(), "a b");
    }

    #[test]
    fn keeps_block_order_across_multiple_blocks() {
        let file = parse(
            "data_optics\nloop_\n_rlnOpticsGroup\n1\n\ndata_particles\nloop_\n_rlnOpticsGroup\n1\n1\n",
        )
        .unwrap();
        let names: Vec<_> = file.names().collect();
        assert_eq!(names, vec!["optics", "particles"]);
        assert_eq!(file.get("particles").unwrap().len(), 2);
        assert!(matches!(
            file.table(None),
            Err(StarError::AmbiguousBlock { count: 2 })
        ));
    }

    #[test]
    fn reports_field_count_mismatch_with_line_number() {
        let (line, kind) = parse_error("data_particles\nloop_\n_rlnImageId\n_rlnDefocusU\n1 10000.0\n2\n");
        assert_eq!(line, 6);
        assert_eq!(
            kind,
            ParseErrorKind::FieldCount {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn reports_coercion_failure_at_offending_row() {
        let (line, kind) = parse_error("data_\nloop_\n_rlnClassNumber\n1\n2\n2.5\n");
        assert_eq!(line, 6);
        assert_eq!(
            kind,
            ParseErrorKind::TypeCoercion {
                column: "rlnClassNumber".into(),
                value: "2.5".into(),
                expected: ColumnType::Int
            }
        );
    }

    #[test]
    fn quoted_values_are_single_string_fields() {
        let file = parse("data_\nloop_\n_name\n_n\n\"a b\" 1\n'123' 2\n").unwrap();
        let table = file.table(None).unwrap();
        assert_eq!(table.column_type("name").unwrap(), ColumnType::Str);
        assert_eq!(table.value(0, "name").unwrap(), &Value::Str("a b".into()));
        assert_eq!(table.value(1, "name").unwrap(), &Value::Str("123".into()));
    }

    #[test]
    fn quote_closes_only_before_whitespace() {
        let tokens = tokenize("'it's here' x").unwrap();
        assert_eq!(tokens[0].text, "it's here");
        assert_eq!(tokens[1].text, "x");
        assert_eq!(tokenize("'open"), Err(ParseErrorKind::UnterminatedQuote));
    }

    #[test]
    fn inline_comments_end_the_line() {
        let tokens = tokenize("_rlnVoltage #3").unwrap();
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn type_hints_override_inference() {
        let options = ParseOptions::relion();
        let file = parse_str("data_\nloop_\n_rlnDefocusU\n_rlnCustom\n10000 7\n", &options).unwrap();
        let table = file.table(None).unwrap();
        assert_eq!(table.column_type("rlnDefocusU").unwrap(), ColumnType::Float);
        assert_eq!(table.column_type("rlnCustom").unwrap(), ColumnType::Int);

        let options = ParseOptions::new().with_hint("_rlnCustom", ColumnType::Str);
        let file = parse_str("data_\nloop_\n_rlnCustom\n7\n", &options).unwrap();
        assert_eq!(
            file.table(None).unwrap().value(0, "rlnCustom").unwrap(),
            &Value::Str("7".into())
        );
    }

    #[test]
    fn loop_without_rows_gives_empty_string_columns() {
        let file = parse("data_\nloop_\n_rlnImageName\n").unwrap();
        let table = file.table(None).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_type("rlnImageName").unwrap(), ColumnType::Str);
    }

    #[test]
    fn empty_block_has_no_columns() {
        let file = parse("data_empty\n\ndata_full\n_a 1\n").unwrap();
        assert_eq!(file.get("empty").unwrap().num_columns(), 0);
        assert_eq!(file.block("empty").unwrap().style(), BlockStyle::Loop);
    }

    #[test]
    fn structural_errors_carry_line_numbers() {
        assert_eq!(
            parse_error("# header\n1 2 3\n"),
            (2, ParseErrorKind::MissingBlockHeader("1".into()))
        );
        assert_eq!(
            parse_error("data_a\n_x 1\ndata_a\n_x 2\n"),
            (3, ParseErrorKind::DuplicateBlock("a".into()))
        );
        assert_eq!(
            parse_error("data_a\nloop_\n_x\n_x\n"),
            (4, ParseErrorKind::DuplicateLabel("x".into()))
        );
        assert_eq!(
            parse_error("data_a\nloop_\n_x\n1\n_y\n"),
            (5, ParseErrorKind::LabelAfterData("y".into()))
        );
        assert_eq!(
            parse_error("data_a\nloop_\n\ndata_b\n"),
            (2, ParseErrorKind::UnterminatedLoop)
        );
        assert_eq!(
            parse_error("data_a\nloop_\n1 2\n"),
            (3, ParseErrorKind::LoopWithoutLabels)
        );
        assert_eq!(
            parse_error("data_a\n_x\n"),
            (2, ParseErrorKind::MissingValue("x".into()))
        );
        assert_eq!(
            parse_error("data_a\n_x 1\nloop_\n"),
            (3, ParseErrorKind::MixedBlock)
        );
        assert_eq!(
            parse_error("data_a\n_x 1 2\n"),
            (2, ParseErrorKind::Unexpected("2".into()))
        );
    }

    #[test]
    fn block_header_with_trailing_comment_starts_a_new_block() {
        let file = parse(
            "data_a\nloop_\n_rlnImageName\nfoo.mrc\ndata_b # optics\n_rlnVoltage 300\n",
        )
        .unwrap();
        assert_eq!(file.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(file.table(Some("a")).unwrap().len(), 1);
        assert_eq!(
            file.table(Some("b")).unwrap().value(0, "rlnVoltage").unwrap(),
            &Value::Int(300)
        );
    }

    #[test]
    fn loop_keyword_with_trailing_comment_opens_a_loop() {
        let file = parse("data_a\nloop_ # c\n_x\n1\n").unwrap();
        let table = file.table(None).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.value(0, "x").unwrap(), &Value::Int(1));
    }

    #[test]
    fn keywords_followed_by_values_are_rejected() {
        assert_eq!(
            parse_error("data_a extra\n"),
            (1, ParseErrorKind::Unexpected("extra".into()))
        );
        assert_eq!(
            parse_error("data_a\nloop_ _x\n"),
            (2, ParseErrorKind::Unexpected("_x".into()))
        );
    }

    #[test]
    fn quoted_keyword_text_is_a_value() {
        let file = parse("data_a\nloop_\n_x\n'data_b'\n").unwrap();
        let table = file.table(None).unwrap();
        assert_eq!(file.len(), 1);
        assert_eq!(table.value(0, "x").unwrap(), &Value::Str("data_b".into()));
    }

    #[test]
    fn content_without_blocks_is_an_error() {
        assert!(matches!(parse("# nothing\n\n"), Err(StarError::EmptyFile)));
    }

    #[test]
    fn load_hints_reads_toml_labels_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hints.toml");
        std::fs::write(&path, "[labels]\nrlnMyScore = \"float\"\n").unwrap();

        let options = ParseOptions::new().load_hints(&path).unwrap();
        assert_eq!(options.hint("rlnMyScore"), Some(ColumnType::Float));

        std::fs::write(&path, "[labels]\nrlnMyScore = \"complex\"\n").unwrap();
        assert!(matches!(
            ParseOptions::new().load_hints(&path),
            Err(StarError::TypeHints { .. })
        ));
    }

    #[test]
    fn reader_and_str_inputs_agree() {
        let mut cursor = std::io::Cursor::new(PARTICLES.as_bytes());
        let from_reader = parse_reader(&mut cursor, &ParseOptions::default()).unwrap();
        assert_eq!(from_reader, parse(PARTICLES).unwrap());
    }
}
