use crate::core::population::PottsBasedCellPopulation;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// File name used by [`VizElementsWriter::create`].
pub const VIZ_ELEMENTS_FILE_NAME: &str = "results.vizelements";

/// Streams population snapshots in the `.vizelements` line format.
///
/// # Examples
///
/// ```rust
/// use cellular_potts::prelude::*;
///
/// let mesh = PottsMeshGenerator::new(4, 1, 2, 4, 1, 2).generate().unwrap();
/// let cells = CellsGenerator::default().generate_basic(mesh.num_elements());
/// let population =
///     PottsBasedCellPopulation::new(mesh, cells, None, PopulationConfig::default()).unwrap();
///
/// let mut writer = VizElementsWriter::new(Vec::new());
/// writer.write_results(0.0, &population).unwrap();
/// let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(text, "0\t4 5 6 9 10 \n");
/// ```
#[derive(Debug)]
pub struct VizElementsWriter<W: Write> {
    out: W,
    lines_written: usize,
}

impl VizElementsWriter<BufWriter<File>> {
    /// Creates (or truncates) `results.vizelements` inside `directory`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while creating the file.
    pub fn create(directory: impl AsRef<Path>) -> io::Result<Self> {
        let path = directory.as_ref().join(VIZ_ELEMENTS_FILE_NAME);
        let file = File::create(&path)?;
        debug!(path = %path.display(), "Opened element results file");
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> VizElementsWriter<W> {
    /// Wraps an existing sink.
    pub const fn new(out: W) -> Self {
        Self { out, lines_written: 0 }
    }

    /// Number of result lines written so far.
    #[must_use]
    pub const fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Appends the result line for `population` at `time`.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the sink.
    pub fn write_results<const D: usize>(
        &mut self,
        time: f64,
        population: &PottsBasedCellPopulation<D>,
    ) -> io::Result<()> {
        population.write_results(time, &mut self.out)?;
        self.lines_written += 1;
        Ok(())
    }

    /// Flushes buffered output.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the sink.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Flushes and returns the underlying sink.
    ///
    /// # Errors
    ///
    /// Propagates the flush error.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cells_generator::CellsGenerator;
    use crate::core::mesh_generator::PottsMeshGenerator;
    use crate::core::population::PopulationConfig;

    fn population() -> PottsBasedCellPopulation<2> {
        let mesh = PottsMeshGenerator::new(4, 1, 2, 4, 2, 2).generate().unwrap();
        let cells = CellsGenerator::default().generate_basic(mesh.num_elements());
        PottsBasedCellPopulation::new(mesh, cells, None, PopulationConfig::default()).unwrap()
    }

    #[test]
    fn test_one_line_per_call() {
        let population = population();
        let mut writer = VizElementsWriter::new(Vec::new());
        writer.write_results(0.0, &population).unwrap();
        writer.write_results(0.5, &population).unwrap();
        assert_eq!(writer.lines_written(), 2);

        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(
            text,
            "0\t4 1 2 5 6 4 9 10 13 14 \n0.5\t4 1 2 5 6 4 9 10 13 14 \n"
        );
    }

    #[test]
    fn test_create_writes_named_file() {
        let directory = std::env::temp_dir().join(format!("cellular-potts-viz-{}", std::process::id()));
        std::fs::create_dir_all(&directory).unwrap();

        let mut writer = VizElementsWriter::create(&directory).unwrap();
        writer.write_results(1.0, &population()).unwrap();
        writer.flush().unwrap();
        drop(writer);

        let text = std::fs::read_to_string(directory.join(VIZ_ELEMENTS_FILE_NAME)).unwrap();
        assert!(text.starts_with("1\t4 1 2 5 6 "));
        std::fs::remove_dir_all(&directory).unwrap();
    }
}
