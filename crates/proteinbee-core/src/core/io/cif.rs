use crate::core::io::altloc::AltLocFilter;
use crate::core::io::traits::StructureFile;
use crate::core::models::atom::Atom;
use crate::core::models::structure::Structure;
use nalgebra::Point3;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::debug;

const ATOM_SITE_PREFIX: &str = "_atom_site.";
const DEFAULT_DATA_BLOCK: &str = "proteinbee";

/// Column order used when writing the `_atom_site` loop.
const WRITTEN_COLUMNS: [&str; 19] = [
    "group_PDB",
    "id",
    "type_symbol",
    "label_atom_id",
    "label_alt_id",
    "label_comp_id",
    "label_asym_id",
    "label_seq_id",
    "pdbx_PDB_ins_code",
    "Cartn_x",
    "Cartn_y",
    "Cartn_z",
    "occupancy",
    "B_iso_or_equiv",
    "auth_seq_id",
    "auth_comp_id",
    "auth_asym_id",
    "auth_atom_id",
    "pdbx_PDB_model_num",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CifMetadata {
    /// Name of the data block (the text after `data_`).
    pub data_block: Option<String>,
}

#[derive(Debug, Error)]
pub enum CifError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: CifParseErrorKind },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum CifParseErrorKind {
    #[error("Required column '_atom_site.{0}' is not present")]
    MissingColumn(String),
    #[error("Required field '{field}' has no value")]
    MissingValue { field: String },
    #[error("Invalid integer in field '{field}' (value: '{value}')")]
    InvalidInt { field: String, value: String },
    #[error("Invalid float in field '{field}' (value: '{value}')")]
    InvalidFloat { field: String, value: String },
    #[error("Unterminated quoted value")]
    UnterminatedQuote,
    #[error("Incomplete row: expected {expected} values, found {found}")]
    IncompleteRow { expected: usize, found: usize },
}

/// Splits one line into values. Unquoted `.` and `?` become `None`.
fn tokenize(line: &str) -> Result<Vec<Option<String>>, CifParseErrorKind> {
    let mut tokens = Vec::new();
    let mut rest = line.trim_start();

    while !rest.is_empty() {
        if rest.starts_with('#') {
            break;
        }
        let first = rest.chars().next().unwrap_or(' ');
        if first == '\'' || first == '"' {
            let body = &rest[1..];
            let close = body
                .char_indices()
                .find(|&(i, c)| {
                    c == first
                        && body[i + 1..]
                            .chars()
                            .next()
                            .is_none_or(char::is_whitespace)
                })
                .map(|(i, _)| i)
                .ok_or(CifParseErrorKind::UnterminatedQuote)?;
            tokens.push(Some(body[..close].to_string()));
            rest = body[close + 1..].trim_start();
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let value = &rest[..end];
            tokens.push(match value {
                "." | "?" => None,
                _ => Some(value.to_string()),
            });
            rest = rest[end..].trim_start();
        }
    }
    Ok(tokens)
}

fn needs_quotes(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    value.is_empty()
        || value == "."
        || value == "?"
        || value.chars().any(char::is_whitespace)
        || value.starts_with(['_', '#', '$', '\'', '"', '[', ']', ';'])
        || ["data_", "loop_", "save_", "global_", "stop_"]
            .iter()
            .any(|keyword| lower.starts_with(keyword))
}

fn quote(value: &str) -> Cow<'_, str> {
    if !needs_quotes(value) {
        Cow::Borrowed(value)
    } else if value.contains('\'') {
        Cow::Owned(format!("\"{}\"", value))
    } else {
        Cow::Owned(format!("'{}'", value))
    }
}

fn optional(value: Option<&str>) -> Cow<'_, str> {
    match value {
        Some(v) if !v.is_empty() => quote(v),
        _ => Cow::Borrowed("."),
    }
}

/// Column indices of the `_atom_site` loop, preferring author-assigned fields.
#[derive(Debug)]
struct AtomSiteColumns {
    count: usize,
    group: Option<usize>,
    id: Option<usize>,
    type_symbol: Option<usize>,
    atom_id: usize,
    alt_id: Option<usize>,
    comp_id: usize,
    asym_id: Option<usize>,
    seq_id: usize,
    ins_code: Option<usize>,
    x: usize,
    y: usize,
    z: usize,
    occupancy: Option<usize>,
    b_factor: Option<usize>,
    model: Option<usize>,
}

impl AtomSiteColumns {
    fn from_headers(headers: &[String]) -> Result<Self, CifParseErrorKind> {
        let index: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim_start_matches(ATOM_SITE_PREFIX), i))
            .collect();
        let find = |names: &[&str]| names.iter().find_map(|name| index.get(name).copied());
        let require = |names: &[&str]| {
            find(names).ok_or_else(|| CifParseErrorKind::MissingColumn(names[0].to_string()))
        };

        Ok(Self {
            count: headers.len(),
            group: find(&["group_PDB"]),
            id: find(&["id"]),
            type_symbol: find(&["type_symbol"]),
            atom_id: require(&["auth_atom_id", "label_atom_id"])?,
            alt_id: find(&["label_alt_id"]),
            comp_id: require(&["auth_comp_id", "label_comp_id"])?,
            asym_id: find(&["auth_asym_id", "label_asym_id"]),
            seq_id: require(&["auth_seq_id", "label_seq_id"])?,
            ins_code: find(&["pdbx_PDB_ins_code"]),
            x: require(&["Cartn_x"])?,
            y: require(&["Cartn_y"])?,
            z: require(&["Cartn_z"])?,
            occupancy: find(&["occupancy"]),
            b_factor: find(&["B_iso_or_equiv"]),
            model: find(&["pdbx_PDB_model_num"]),
        })
    }

    fn build_atom(&self, row: &[Option<String>], fallback_serial: usize) -> Result<Atom, CifParseErrorKind> {
        let value = |index: Option<usize>| index.and_then(|i| row[i].as_deref());
        let required = |index: usize, field: &str| {
            row[index].as_deref().ok_or_else(|| CifParseErrorKind::MissingValue {
                field: field.to_string(),
            })
        };
        let float = |index: usize, field: &str| -> Result<f64, CifParseErrorKind> {
            let raw = required(index, field)?;
            raw.parse().map_err(|_| CifParseErrorKind::InvalidFloat {
                field: field.to_string(),
                value: raw.to_string(),
            })
        };
        let single_char = |index: Option<usize>| value(index).and_then(|v| v.chars().next());

        let seq_raw = required(self.seq_id, "seq_id")?;
        let residue_id = seq_raw.parse().map_err(|_| CifParseErrorKind::InvalidInt {
            field: "seq_id".into(),
            value: seq_raw.to_string(),
        })?;
        let position = Point3::new(
            float(self.x, "Cartn_x")?,
            float(self.y, "Cartn_y")?,
            float(self.z, "Cartn_z")?,
        );

        let mut atom = Atom::new(
            required(self.atom_id, "atom_id")?,
            required(self.comp_id, "comp_id")?,
            value(self.asym_id).unwrap_or(""),
            residue_id,
            position,
        );
        atom.serial = value(self.id)
            .and_then(|v| v.parse().ok())
            .unwrap_or(fallback_serial);
        atom.alt_loc = single_char(self.alt_id);
        atom.insertion_code = single_char(self.ins_code);
        atom.occupancy = value(self.occupancy)
            .and_then(|v| v.parse().ok())
            .unwrap_or(1.0);
        atom.b_factor = value(self.b_factor)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.0);
        if let Some(symbol) = value(self.type_symbol) {
            atom.element = symbol.to_ascii_uppercase();
        }
        atom.hetero = value(self.group) == Some("HETATM");
        Ok(atom)
    }
}

enum ReadState {
    Scanning,
    LoopHeader(Vec<String>),
    AtomRows(AtomSiteColumns),
}

/// Reader and writer for the `_atom_site` category of mmCIF files.
///
/// Author-assigned chain, residue and atom names are used when present. Only
/// the first model is read and, as for PDB files, only the first alternate
/// location of each residue is kept.
pub struct CifFile;

impl StructureFile for CifFile {
    type Metadata = CifMetadata;
    type Error = CifError;

    fn read_from(reader: &mut impl BufRead) -> Result<(Structure, Self::Metadata), Self::Error> {
        let mut metadata = CifMetadata::default();
        let mut atoms = Vec::new();
        let mut alt_locs = AltLocFilter::new();
        let mut state = ReadState::Scanning;
        let mut pending: Vec<Option<String>> = Vec::new();
        let mut text_field: Option<String> = None;
        let mut first_model: Option<Option<String>> = None;
        let mut last_line = 0;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            last_line = line_num;

            if let Some(mut text) = text_field.take() {
                match line.strip_prefix(';') {
                    Some(rest) => {
                        pending.push(Some(text));
                        pending.extend(tokenize(rest).map_err(|kind| CifError::Parse { line: line_num, kind })?);
                    }
                    None => {
                        if !text.is_empty() {
                            text.push('\n');
                        }
                        text.push_str(&line);
                        text_field = Some(text);
                        continue;
                    }
                }
            } else {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    continue;
                }
                if metadata.data_block.is_none() {
                    if let Some(name) = trimmed.strip_prefix("data_") {
                        metadata.data_block = Some(name.to_string());
                        continue;
                    }
                }

                state = match state {
                    ReadState::Scanning if trimmed == "loop_" => ReadState::LoopHeader(Vec::new()),
                    ReadState::Scanning => ReadState::Scanning,
                    ReadState::LoopHeader(mut headers) => {
                        if trimmed.starts_with('_') {
                            headers.push(trimmed.to_string());
                            ReadState::LoopHeader(headers)
                        } else if headers.first().is_some_and(|h| h.starts_with(ATOM_SITE_PREFIX)) {
                            let columns = AtomSiteColumns::from_headers(&headers)
                                .map_err(|kind| CifError::Parse { line: line_num, kind })?;
                            debug!("Found _atom_site loop with {} columns", columns.count);
                            ReadState::AtomRows(columns)
                        } else if trimmed == "loop_" {
                            ReadState::LoopHeader(Vec::new())
                        } else {
                            ReadState::Scanning
                        }
                    }
                    rows @ ReadState::AtomRows(_) => rows,
                };

                if !matches!(state, ReadState::AtomRows(_)) {
                    continue;
                }
                if trimmed == "loop_" || trimmed.starts_with('_') || trimmed.starts_with("data_") {
                    break;
                }
                if let Some(rest) = line.strip_prefix(';') {
                    text_field = Some(rest.to_string());
                    continue;
                }
                pending.extend(tokenize(&line).map_err(|kind| CifError::Parse { line: line_num, kind })?);
            }

            let ReadState::AtomRows(columns) = &state else {
                continue;
            };
            while pending.len() >= columns.count {
                let row: Vec<Option<String>> = pending.drain(..columns.count).collect();
                if let Some(model_index) = columns.model {
                    let model = row[model_index].clone();
                    if *first_model.get_or_insert_with(|| model.clone()) != model {
                        continue;
                    }
                }
                let atom = columns
                    .build_atom(&row, atoms.len() + 1)
                    .map_err(|kind| CifError::Parse { line: line_num, kind })?;
                if alt_locs.accept(&atom) {
                    atoms.push(atom);
                }
            }
        }

        if let ReadState::AtomRows(columns) = &state {
            if !pending.is_empty() || text_field.is_some() {
                return Err(CifError::Parse {
                    line: last_line,
                    kind: CifParseErrorKind::IncompleteRow {
                        expected: columns.count,
                        found: pending.len(),
                    },
                });
            }
        }
        if atoms.is_empty() {
            return Err(CifError::MissingRecord("_atom_site".into()));
        }
        debug!(
            "Read {} atoms from mmCIF ({} alternate locations skipped)",
            atoms.len(),
            alt_locs.skipped()
        );
        Ok((Structure::new(atoms), metadata))
    }

    fn write_to(
        structure: &Structure,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let block = metadata.data_block.as_deref().unwrap_or(DEFAULT_DATA_BLOCK);
        writeln!(writer, "data_{}", block)?;
        writeln!(writer, "#")?;
        writeln!(writer, "loop_")?;
        for column in WRITTEN_COLUMNS {
            writeln!(writer, "{}{}", ATOM_SITE_PREFIX, column)?;
        }

        for (index, atom) in structure.atoms_iter().enumerate() {
            let alt_loc = atom.alt_loc.map(String::from);
            let ins_code = atom.insertion_code.map(String::from);
            let chain = optional(Some(atom.chain_id.as_str()));
            let residue_name = quote(&atom.residue_name);
            let name = quote(&atom.name);
            writeln!(
                writer,
                "{} {} {} {} {} {} {} {} {} {:.3} {:.3} {:.3} {:.2} {:.2} {} {} {} {} 1",
                if atom.hetero { "HETATM" } else { "ATOM" },
                index + 1,
                optional(Some(atom.element.as_str())),
                name,
                optional(alt_loc.as_deref()),
                residue_name,
                chain,
                atom.residue_id,
                optional(ins_code.as_deref()),
                atom.position.x,
                atom.position.y,
                atom.position.z,
                atom.occupancy,
                atom.b_factor,
                atom.residue_id,
                residue_name,
                chain,
                name,
            )?;
        }
        writeln!(writer, "#")?;
        Ok(())
    }

    fn write_structure_to(structure: &Structure, writer: &mut impl Write) -> Result<(), Self::Error> {
        Self::write_to(structure, &CifMetadata::default(), writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE_CIF: &str = r#"data_1TST
#
_entry.id 1TST
#
loop_
_struct_asym.id
_struct_asym.entity_id
A 1
#
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.type_symbol
_atom_site.label_atom_id
_atom_site.label_alt_id
_atom_site.label_comp_id
_atom_site.label_asym_id
_atom_site.label_seq_id
_atom_site.pdbx_PDB_ins_code
_atom_site.Cartn_x
_atom_site.Cartn_y
_atom_site.Cartn_z
_atom_site.occupancy
_atom_site.B_iso_or_equiv
_atom_site.auth_seq_id
_atom_site.auth_comp_id
_atom_site.auth_asym_id
_atom_site.auth_atom_id
_atom_site.pdbx_PDB_model_num
ATOM   1 N N   . LYS A 1 ? 11.104 6.134 -6.504 1.00 20.50 814 LYS A N   1
ATOM   2 C CA  . LYS A 1 ? 11.639 6.071 -5.147 1.00 21.00 814 LYS A CA  1
ATOM   3 C CA  A ARG A 2 ? 12.000 7.000 -4.000 0.60 22.00 815 ARG A CA  1
ATOM   4 C CA  B ARG A 2 ? 12.100 7.100 -4.100 0.40 22.00 815 ARG A CA  1
ATOM   5 O "O5'" . DG C 1 ? 1.0 1.0 1.0 1.00 10.00 3 DG X "O5'" 1
HETATM 6 O O   . HOH D . ? 1.000 2.000 3.000 1.00 30.00 901 HOH A O 1
ATOM   7 C CA  . LYS A 1 ? 0.0 0.0 0.0 1.00 20.50 814 LYS A CA 2
#
_pdbx_poly_seq_scheme.asym_id A
"#;

    fn read(text: &str) -> Result<(Structure, CifMetadata), CifError> {
        CifFile::read_from(&mut Cursor::new(text.as_bytes()))
    }

    #[test]
    fn tokenize_handles_quotes_and_missing_values() {
        let tokens = tokenize(r#"ATOM 'C1 X' "O5'" . ? 'it''s' x"#).unwrap();
        assert_eq!(
            tokens,
            vec![
                Some("ATOM".to_string()),
                Some("C1 X".to_string()),
                Some("O5'".to_string()),
                None,
                None,
                Some("it''s".to_string()),
                Some("x".to_string()),
            ]
        );
        assert!(tokenize("'open").is_err());
    }

    #[test]
    fn read_uses_author_fields_and_data_block() {
        let (structure, metadata) = read(SAMPLE_CIF).unwrap();
        assert_eq!(metadata.data_block.as_deref(), Some("1TST"));
        let first = &structure.atoms()[0];
        assert_eq!(first.residue_id, 814);
        assert_eq!(first.chain_id, "A");
        assert_eq!(first.position, Point3::new(11.104, 6.134, -6.504));
        assert_eq!(first.b_factor, 20.5);

        let water = structure.atoms_iter().find(|a| a.residue_name == "HOH").unwrap();
        assert_eq!(water.chain_id, "A");
        assert_eq!(water.residue_id, 901);
        assert!(water.hetero);
    }

    #[test]
    fn read_keeps_first_model_and_first_alternate_location() {
        let (structure, _) = read(SAMPLE_CIF).unwrap();
        assert_eq!(structure.get_number_of_atoms(), 5);
        assert_eq!(structure.sequence(), "KRXX");
        let arg = structure.atoms_iter().find(|a| a.residue_name == "ARG").unwrap();
        assert_eq!(arg.alt_loc, Some('A'));
        assert_eq!(arg.occupancy, 0.6);
    }

    #[test]
    fn read_unquotes_atom_names() {
        let (structure, _) = read(SAMPLE_CIF).unwrap();
        let atom = structure.atoms_iter().find(|a| a.chain_id == "X").unwrap();
        assert_eq!(atom.name, "O5'");
    }

    #[test]
    fn read_accepts_rows_split_across_lines() {
        let text = "data_x\nloop_\n_atom_site.label_atom_id\n_atom_site.label_comp_id\n\
                    _atom_site.label_asym_id\n_atom_site.label_seq_id\n_atom_site.Cartn_x\n\
                    _atom_site.Cartn_y\n_atom_site.Cartn_z\nCA ALA A 1\n1.0 2.0 3.0\n";
        let (structure, _) = read(text).unwrap();
        assert_eq!(structure.get_number_of_atoms(), 1);
        assert_eq!(structure.atoms()[0].position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(structure.atoms()[0].element, "C");
    }

    #[test]
    fn read_reports_missing_coordinate_column() {
        let text = "data_x\nloop_\n_atom_site.label_atom_id\n_atom_site.label_comp_id\n\
                    _atom_site.label_seq_id\n_atom_site.Cartn_x\n_atom_site.Cartn_y\nCA ALA 1 1.0 2.0\n";
        match read(text) {
            Err(CifError::Parse {
                kind: CifParseErrorKind::MissingColumn(column),
                ..
            }) => assert_eq!(column, "Cartn_z"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn read_reports_incomplete_rows() {
        let text = "data_x\nloop_\n_atom_site.label_atom_id\n_atom_site.label_comp_id\n\
                    _atom_site.label_seq_id\n_atom_site.Cartn_x\n_atom_site.Cartn_y\n\
                    _atom_site.Cartn_z\nCA ALA 1 1.0 2.0\n";
        assert!(matches!(
            read(text),
            Err(CifError::Parse {
                kind: CifParseErrorKind::IncompleteRow { expected: 6, found: 5 },
                ..
            })
        ));
    }

    #[test]
    fn read_requires_an_atom_site_loop() {
        assert!(matches!(
            read("data_empty\n_entry.id empty\n"),
            Err(CifError::MissingRecord(_))
        ));
    }

    #[test]
    fn write_quotes_values_and_reads_back() {
        let (structure, metadata) = read(SAMPLE_CIF).unwrap();
        let mut buffer = Vec::new();
        CifFile::write_to(&structure, &metadata, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.starts_with("data_1TST\n"));
        assert!(text.contains("\"O5'\""));

        let (reread, _) = read(&text).unwrap();
        assert_eq!(reread.get_number_of_atoms(), structure.get_number_of_atoms());
        for (a, b) in reread.atoms_iter().zip(structure.atoms_iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.chain_id, b.chain_id);
            assert_eq!(a.residue_id, b.residue_id);
            assert_eq!(a.alt_loc, b.alt_loc);
            assert!((a.position - b.position).norm() < 1e-3);
        }
    }

    #[test]
    fn write_structure_to_uses_default_block_name() {
        let (structure, _) = read(SAMPLE_CIF).unwrap();
        let mut buffer = Vec::new();
        CifFile::write_structure_to(&structure, &mut buffer).unwrap();
        assert!(String::from_utf8(buffer).unwrap().starts_with("data_proteinbee\n"));
    }

    #[test]
    fn quote_protects_reserved_values() {
        assert_eq!(quote("CA"), "CA");
        assert_eq!(quote("."), "'.'");
        assert_eq!(quote("data_x"), "'data_x'");
        assert_eq!(quote("O5'"), "\"O5'\"");
        assert_eq!(optional(None), ".");
    }
}
