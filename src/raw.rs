//! Headerless int16 buffers: `count * 2` little-endian bytes, nothing else.
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

pub fn write_raw_i16<P: AsRef<Path>>(path: P, data: &[i16]) -> io::Result<u64> {
    write_raw_i16_to(File::create(path)?, data)
}

pub fn write_raw_i16_to<W: Write>(w: W, data: &[i16]) -> io::Result<u64> {
    let mut w = BufWriter::new(w);
    for v in data {
        w.write_all(&v.to_le_bytes())?;
    }
    w.flush()?;
    Ok(data.len() as u64 * 2)
}

pub fn read_raw_i16<P: AsRef<Path>>(path: P) -> io::Result<Vec<i16>> {
    let mut r = BufReader::new(File::open(path)?);
    let mut bytes = Vec::new();
    r.read_to_end(&mut bytes)?;
    if bytes.len() % 2 != 0 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "odd byte count in int16 raw file"));
    }
    Ok(bytes.chunks_exact(2).map(|c| i16::from_le_bytes([c[0], c[1]])).collect())
}
