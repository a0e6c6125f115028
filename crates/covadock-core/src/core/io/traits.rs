use crate::core::models::atom::AtomRecord;
use crate::core::models::structure::Structure;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing fixed-column structure formats.
///
/// Implementors parse the coordinate records of a format into [`AtomRecord`]s and
/// serialize atom lists back out. Non-coordinate records that a format needs (model
/// markers, torsion trees, terminators) are the writer's responsibility.
pub trait StructureFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads the atom records of the first model from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if a coordinate record is malformed or reading fails.
    fn read_from(reader: &mut impl BufRead) -> Result<Vec<AtomRecord>, Self::Error>;

    /// Writes atom records to a writer in this format.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(atoms: &[AtomRecord], writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads the atom records of a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<AtomRecord>, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Reads a file and groups its atoms into chains and residues.
    fn read_structure_from_path<P: AsRef<Path>>(path: P) -> Result<Structure, Self::Error> {
        Self::read_from_path(path).map(Structure::from_atoms)
    }

    /// Writes atom records to a file, replacing any existing content.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(atoms: &[AtomRecord], path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(atoms, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
