use crate::core::io::altloc::AltLocFilter;
use crate::core::io::traits::StructureFile;
use crate::core::models::atom::Atom;
use crate::core::models::structure::Structure;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::{debug, warn};

/// Shortest ATOM/HETATM record that still carries all three coordinates.
const MIN_ATOM_RECORD_LENGTH: usize = 54;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdbMetadata {
    /// Non-coordinate records (HEADER, TITLE, REMARK, CRYST1, ...) preceding the
    /// first atom, verbatim.
    pub header_lines: Vec<String>,
}

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 54 chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn column_char(line: &str, index: usize) -> Option<char> {
    line.get(index..index + 1)
        .and_then(|s| s.chars().next())
        .filter(|c| !c.is_whitespace())
}

fn parse_float(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

fn parse_optional_float(line: &str, start: usize, end: usize, default: f64) -> f64 {
    slice_and_trim(line, start, end).parse().unwrap_or(default)
}

/// Reader and writer for the fixed-column PDB format.
///
/// Only the first MODEL is read, and of each residue's alternate locations only
/// the first one encountered is kept.
pub struct PdbFile;

impl PdbFile {
    fn parse_atom_record(line: &str, line_num: usize, hetero: bool, fallback_serial: usize) -> Result<Atom, PdbError> {
        if line.len() < MIN_ATOM_RECORD_LENGTH {
            return Err(PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::LineTooShort,
            });
        }

        let name = slice_and_trim(line, 12, 16);
        if name.is_empty() {
            return Err(PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::MissingRequiredField {
                    columns: "13-16".into(),
                },
            });
        }
        // Serials past 99999 are hybrid-36 encoded; fall back to file order.
        let serial = slice_and_trim(line, 6, 11)
            .parse()
            .unwrap_or(fallback_serial);

        let res_id_str = slice_and_trim(line, 22, 26);
        let residue_id: isize = res_id_str.parse().map_err(|_| PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::InvalidInt {
                columns: "23-26".into(),
                value: res_id_str.into(),
            },
        })?;

        let x = parse_float(line, line_num, 30, 38)?;
        let y = parse_float(line, line_num, 38, 46)?;
        let z = parse_float(line, line_num, 46, 54)?;

        let chain_id = column_char(line, 21).map(String::from).unwrap_or_default();
        let mut atom = Atom::new(name, slice_and_trim(line, 17, 20), &chain_id, residue_id, Point3::new(x, y, z));
        atom.serial = serial;
        atom.alt_loc = column_char(line, 16);
        atom.insertion_code = column_char(line, 26);
        atom.occupancy = parse_optional_float(line, 54, 60, 1.0);
        atom.b_factor = parse_optional_float(line, 60, 66, 0.0);
        atom.hetero = hetero;
        let element = slice_and_trim(line, 76, 78);
        if !element.is_empty() {
            atom.element = element.to_ascii_uppercase();
        }
        Ok(atom)
    }

    fn format_atom_name(atom: &Atom) -> String {
        if atom.name.len() >= 4 || atom.element.len() == 2 {
            format!("{:<4}", atom.name)
        } else {
            format!(" {:<3}", atom.name)
        }
    }

    fn chain_column(atom: &Atom) -> char {
        let mut chars = atom.chain_id.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            (Some(c), Some(_)) => {
                warn!(
                    "Chain ID '{}' does not fit the PDB format; writing '{}'",
                    atom.chain_id, c
                );
                c
            }
            (None, _) => ' ',
        }
    }

    fn write_ter(writer: &mut impl Write, serial: usize, atom: &Atom) -> io::Result<()> {
        writeln!(
            writer,
            "TER   {:>5}      {:>3} {}{:>4}{}",
            serial,
            atom.residue_name,
            Self::chain_column(atom),
            atom.residue_id,
            atom.insertion_code.unwrap_or(' ')
        )
    }
}

impl StructureFile for PdbFile {
    type Metadata = PdbMetadata;
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<(Structure, Self::Metadata), Self::Error> {
        let mut metadata = PdbMetadata::default();
        let mut atoms: Vec<Atom> = Vec::new();
        let mut alt_locs = AltLocFilter::new();
        let mut in_model = false;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            let record_type = slice_and_trim(&line, 0, 6);
            match record_type {
                "ATOM" | "HETATM" => {
                    let atom = Self::parse_atom_record(&line, line_num, record_type == "HETATM", atoms.len() + 1)?;
                    if alt_locs.accept(&atom) {
                        atoms.push(atom);
                    }
                }
                "MODEL" => {
                    if in_model || !atoms.is_empty() {
                        break;
                    }
                    in_model = true;
                }
                "ENDMDL" | "END" => break,
                "TER" | "ANISOU" | "CONECT" | "MASTER" => {}
                _ => {
                    if atoms.is_empty() && !line.trim().is_empty() {
                        metadata.header_lines.push(line);
                    }
                }
            }
        }

        if atoms.is_empty() {
            return Err(PdbError::MissingRecord("ATOM/HETATM records".into()));
        }
        debug!(
            "Read {} atoms from PDB ({} alternate locations skipped)",
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
        for line in &metadata.header_lines {
            writeln!(writer, "{}", line)?;
        }

        let mut serial = 0usize;
        let mut previous: Option<&Atom> = None;
        for atom in structure.atoms_iter() {
            if let Some(prev) = previous.filter(|prev| prev.chain_id != atom.chain_id) {
                serial += 1;
                Self::write_ter(writer, serial, prev)?;
            }
            serial += 1;

            let record_type = if atom.hetero { "HETATM" } else { "ATOM" };
            writeln!(
                writer,
                "{:<6}{:>5} {}{}{:>3} {}{:>4}{}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
                record_type,
                serial % 100_000,
                Self::format_atom_name(atom),
                atom.alt_loc.unwrap_or(' '),
                atom.residue_name,
                Self::chain_column(atom),
                atom.residue_id,
                atom.insertion_code.unwrap_or(' '),
                atom.position.x,
                atom.position.y,
                atom.position.z,
                atom.occupancy,
                atom.b_factor,
                atom.element
            )?;
            previous = Some(atom);
        }
        if let Some(prev) = previous {
            Self::write_ter(writer, (serial + 1) % 100_000, prev)?;
        }

        writeln!(writer, "END")?;
        Ok(())
    }

    fn write_structure_to(structure: &Structure, writer: &mut impl Write) -> Result<(), Self::Error> {
        let metadata = PdbMetadata {
            header_lines: vec!["REMARK   1 GENERATED BY PROTEINBEE".to_string()],
        };
        Self::write_to(structure, &metadata, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE_PDB: &str = "\
HEADER    TEST STRUCTURE                          01-JAN-24   1TST
REMARK   2 RESOLUTION. 2.00 ANGSTROMS.
ATOM      1  N   LYS A 814      11.104   6.134  -6.504  1.00 20.50           N
ATOM      2  CA  LYS A 814      11.639   6.071  -5.147  1.00 21.00           C
ATOM      3  CA AARG A 815      12.000   7.000  -4.000  0.60 22.00           C
ATOM      4  CA BARG A 815      12.100   7.100  -4.100  0.40 22.00           C
ATOM      5  CA  GLY A 815A     13.000   8.000  -3.000  1.00 19.00           C
HETATM    6  O   HOH A 901       1.000   2.000   3.000  1.00 30.00           O
TER       7      HOH A 901
ATOM      7  CA  PHE B   1      -1.500   0.250  99.999  1.00 10.00           C
HETATM    8 SE   MSE B   2       5.000   5.000   5.000  1.00 10.00          SE
END
";

    fn read(text: &str) -> Result<(Structure, PdbMetadata), PdbError> {
        PdbFile::read_from(&mut Cursor::new(text.as_bytes()))
    }

    #[test]
    fn read_parses_atom_fields() {
        let (structure, _) = read(SAMPLE_PDB).unwrap();
        let atom = &structure.atoms()[1];
        assert_eq!(atom.serial, 2);
        assert_eq!(atom.name, "CA");
        assert_eq!(atom.residue_name, "LYS");
        assert_eq!(atom.chain_id, "A");
        assert_eq!(atom.residue_id, 814);
        assert_eq!(atom.position, Point3::new(11.639, 6.071, -5.147));
        assert_eq!(atom.occupancy, 1.0);
        assert_eq!(atom.b_factor, 21.0);
        assert_eq!(atom.element, "C");
        assert!(!atom.hetero);
    }

    #[test]
    fn read_keeps_header_lines_as_metadata() {
        let (_, metadata) = read(SAMPLE_PDB).unwrap();
        assert_eq!(metadata.header_lines.len(), 2);
        assert!(metadata.header_lines[0].starts_with("HEADER"));
    }

    #[test]
    fn read_keeps_only_first_alternate_location() {
        let (structure, _) = read(SAMPLE_PDB).unwrap();
        assert_eq!(structure.get_number_of_atoms(), 7);
        let arg: Vec<_> = structure
            .atoms_iter()
            .filter(|a| a.residue_name == "ARG")
            .collect();
        assert_eq!(arg.len(), 1);
        assert_eq!(arg[0].alt_loc, Some('A'));
    }

    #[test]
    fn read_handles_insertion_codes_hetero_atoms_and_two_letter_elements() {
        let (structure, _) = read(SAMPLE_PDB).unwrap();
        let gly = structure.atoms_iter().find(|a| a.residue_name == "GLY").unwrap();
        assert_eq!(gly.insertion_code, Some('A'));
        let water = structure.atoms_iter().find(|a| a.residue_name == "HOH").unwrap();
        assert!(water.hetero);
        let selenium = structure.atoms_iter().find(|a| a.name == "SE").unwrap();
        assert_eq!(selenium.element, "SE");
        assert_eq!(structure.sequence(), "KRGXFM");
    }

    #[test]
    fn read_stops_after_first_model() {
        let text = "\
MODEL        1
ATOM      1  CA  ALA A   1       0.000   0.000   0.000  1.00  0.00           C
ENDMDL
MODEL        2
ATOM      1  CA  ALA A   1       9.000   9.000   9.000  1.00  0.00           C
ENDMDL
";
        let (structure, _) = read(text).unwrap();
        assert_eq!(structure.get_number_of_atoms(), 1);
        assert_eq!(structure.atoms()[0].position, Point3::origin());
    }

    #[test]
    fn read_reports_bad_coordinates_with_line_and_columns() {
        let text = "ATOM      1  CA  ALA A   1       0.000   abcde   0.000  1.00  0.00           C\n";
        match read(text) {
            Err(PdbError::Parse {
                line: 1,
                kind: PdbParseErrorKind::InvalidFloat { columns, value },
            }) => {
                assert_eq!(columns, "39-46");
                assert_eq!(value, "abcde");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn read_rejects_truncated_records() {
        let text = "ATOM      1  CA  ALA A   1       0.000\n";
        assert!(matches!(
            read(text),
            Err(PdbError::Parse {
                line: 1,
                kind: PdbParseErrorKind::LineTooShort
            })
        ));
    }

    #[test]
    fn read_requires_atoms() {
        assert!(matches!(
            read("HEADER    EMPTY\nEND\n"),
            Err(PdbError::MissingRecord(_))
        ));
    }

    #[test]
    fn write_emits_fixed_columns_and_reads_back() {
        let (structure, metadata) = read(SAMPLE_PDB).unwrap();
        let mut buffer = Vec::new();
        PdbFile::write_to(&structure, &metadata, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains(
            "ATOM      2  CA  LYS A 814      11.639   6.071  -5.147  1.00 21.00           C"
        ));
        assert!(text.contains(
            "HETATM    8 SE   MSE B   2       5.000   5.000   5.000  1.00 10.00          SE"
        ));
        assert_eq!(text.lines().filter(|l| l.starts_with("TER")).count(), 2);
        assert!(text.trim_end().ends_with("END"));

        let (reread, _) = read(&text).unwrap();
        assert_eq!(reread.get_number_of_atoms(), structure.get_number_of_atoms());
        assert_eq!(reread.sequence(), structure.sequence());
    }

    #[test]
    fn write_structure_to_adds_default_remark() {
        let (structure, _) = read(SAMPLE_PDB).unwrap();
        let mut buffer = Vec::new();
        PdbFile::write_structure_to(&structure, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("REMARK   1 GENERATED BY PROTEINBEE"));
    }
}
