use crate::options::Tiles;
use anyhow::Result;
use std::io::Write;
use terrain::tiles::covering;

impl Tiles {
    pub fn run(&self) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        for cell in covering(&self.extent.0)? {
            let (min, max) = (cell.extent.min(), cell.extent.max());
            writeln!(
                stdout,
                "{} {} {} {} {}",
                cell.file_name(),
                min.y,
                min.x,
                max.y,
                max.x
            )?;
        }
        Ok(())
    }
}
