use std::io::Seek;

use embedded_io::{ErrorType, SeekFrom};

pub struct StdFile {
    file: std::io::BufReader<std::fs::File>,
    size: usize,
}

impl StdFile {
    pub fn open(path: &str) -> std::io::Result<Self> {
        Self::new(std::fs::File::open(path)?)
    }

    pub fn create(path: &str) -> std::io::Result<Self> {
        Self::new(
            std::fs::OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)?,
        )
    }

    fn new(mut file: std::fs::File) -> std::io::Result<Self> {
        let size = file.seek(std::io::SeekFrom::End(0))? as usize;
        file.seek(std::io::SeekFrom::Start(0))?;
        Ok(StdFile {
            file: std::io::BufReader::new(file),
            size,
        })
    }
}

impl nibblit_core::fs::File for StdFile {
    fn size(&self) -> usize {
        self.size
    }
}

impl ErrorType for StdFile {
    type Error = std::io::Error;
}

impl embedded_io::Seek for StdFile {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.file.seek(pos.into())
    }
}

impl embedded_io::Read for StdFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        use std::io::Read;
        self.file.read(buf)
    }
}

impl embedded_io::Write for StdFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        use std::io::Write;
        self.file.get_mut().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        use std::io::Write;
        self.file.get_mut().flush()
    }
}
