use super::error::{PersistenceError, PersistenceResult};
use super::pipeline::PersistencePipeline;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::convert::TryInto;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

const MAGIC: &[u8; 8] = b"TRKFILE\0";
const FORMAT_VERSION: u32 = 1;
/// Header flag for a file saved with no payload; the body is empty.
const EMPTY_PAYLOAD_FLAG: u32 = 0x8000_0000;
#[cfg_attr(not(test), allow(dead_code))]
const HEADER_SIZE: usize = 32;

/// Whole-file container: a fixed header followed by the pipeline-encoded payload.
///
/// An absent payload is recorded in the header flags rather than encoded, so a
/// value that serializes as `null` stays distinct from "no payload".
pub struct BinaryContainer;

impl BinaryContainer {
    pub fn load<T: DeserializeOwned>(
        path: &Path,
        pipeline: &PersistencePipeline,
    ) -> PersistenceResult<Option<T>> {
        let file = File::open(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => PersistenceError::NotFound(path.to_path_buf()),
            _ => PersistenceError::Io(err),
        })?;
        let mut reader = BufReader::new(file);
        let header = FileHeader::read(&mut reader).map_err(|err| match err.kind() {
            ErrorKind::UnexpectedEof => PersistenceError::CorruptPayload("truncated header"),
            _ => PersistenceError::Io(err),
        })?;
        if header.magic != *MAGIC {
            return Err(PersistenceError::InvalidMagic);
        }
        if header.version != FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion(header.version));
        }
        if header.flags & !EMPTY_PAYLOAD_FLAG != pipeline.flags() {
            return Err(PersistenceError::UnsupportedFlags(header.flags));
        }
        let is_empty = header.flags & EMPTY_PAYLOAD_FLAG != 0;

        let mut body = Vec::new();
        reader.read_to_end(&mut body)?;
        let expected: usize = header
            .payload_len
            .try_into()
            .map_err(|_| PersistenceError::CorruptPayload("payload length overflow"))?;
        if body.len() != expected {
            return Err(PersistenceError::CorruptPayload("payload length mismatch"));
        }

        debug!(path = %path.display(), bytes = body.len(), "read tracked file");
        if is_empty {
            if !body.is_empty() {
                return Err(PersistenceError::CorruptPayload("empty file carries a body"));
            }
            return Ok(None);
        }
        pipeline.decode_value(body).map(Some)
    }

    /// Write `value` next to `path` under a temporary name, sync it, then rename it
    /// over `path`. The temporary file is removed if anything fails.
    pub fn store<T: Serialize>(
        path: &Path,
        pipeline: &PersistencePipeline,
        value: Option<&T>,
        create_missing_dirs: bool,
    ) -> PersistenceResult<()> {
        let (flags, body) = match value {
            Some(value) => (pipeline.flags(), pipeline.encode_value(value)?),
            None => (pipeline.flags() | EMPTY_PAYLOAD_FLAG, Vec::new()),
        };

        if create_missing_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|err| PersistenceError::write(path, err))?;
            }
        }

        let temp_path = staging_path(path);
        let header = FileHeader::new(flags, body.len() as u64);
        if let Err(err) = write_synced(&temp_path, &header, &body) {
            let _ = fs::remove_file(&temp_path);
            return Err(PersistenceError::write(path, err));
        }
        if let Err(err) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(PersistenceError::write(path, err));
        }

        debug!(path = %path.display(), bytes = body.len(), "wrote tracked file");
        Ok(())
    }
}

fn write_synced(temp_path: &Path, header: &FileHeader, body: &[u8]) -> io::Result<()> {
    let file = File::create(temp_path)?;
    let mut writer = BufWriter::new(file);
    header.write(&mut writer)?;
    writer.write_all(body)?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

/// Hidden sibling of `path` used while a save is in flight.
fn staging_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()))
}

struct FileHeader {
    magic: [u8; 8],
    version: u32,
    flags: u32,
    payload_len: u64,
    reserved0: u64,
}

impl FileHeader {
    fn new(flags: u32, payload_len: u64) -> Self {
        Self {
            magic: *MAGIC,
            version: FORMAT_VERSION,
            flags,
            payload_len,
            reserved0: 0,
        }
    }

    fn read(reader: &mut dyn Read) -> io::Result<Self> {
        let mut magic = [0u8; 8];
        reader.read_exact(&mut magic)?;
        let version = read_u32(reader)?;
        let flags = read_u32(reader)?;
        let payload_len = read_u64(reader)?;
        let reserved0 = read_u64(reader)?;
        Ok(Self {
            magic,
            version,
            flags,
            payload_len,
            reserved0,
        })
    }

    fn write(&self, writer: &mut dyn Write) -> io::Result<()> {
        writer.write_all(&self.magic)?;
        writer.write_all(&self.version.to_le_bytes())?;
        writer.write_all(&self.flags.to_le_bytes())?;
        writer.write_all(&self.payload_len.to_le_bytes())?;
        writer.write_all(&self.reserved0.to_le_bytes())?;
        Ok(())
    }
}

fn read_u32(reader: &mut dyn Read) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64(reader: &mut dyn Read) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}
