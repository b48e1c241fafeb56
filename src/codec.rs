//! Binary persistence substrate: typed writer/reader pair and the
//! file-backed storage that frames a stream with its format version.
//!
//! The first i32 of a stream is the *negated* format version. Streams from
//! before the header existed start with a non-negative shape count, so they
//! decode as `version <= 0` where `-version` is the count. Version policy
//! (which leading fields exist at which version) lives with the caller; this
//! module only moves primitives.

use std::fs;
use std::path::{Path, PathBuf};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::math::{Quat, Rgba, Vec3};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("unsupported future save version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: i32, supported: i32 },
    #[error("save stream truncated while reading {0}")]
    Truncated(&'static str),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Append-only typed writer. Writes cannot fail; the buffer grows as needed.
#[derive(Debug, Default)]
pub struct SaveWriter {
    buf: BytesMut,
}

impl SaveWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32_le(value);
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buf.put_f32_le(value);
    }

    pub fn write_vec3(&mut self, value: Vec3) {
        self.write_f32(value.x);
        self.write_f32(value.y);
        self.write_f32(value.z);
    }

    pub fn write_quat(&mut self, value: Quat) {
        self.write_f32(value.x);
        self.write_f32(value.y);
        self.write_f32(value.z);
        self.write_f32(value.w);
    }

    pub fn write_color(&mut self, value: Rgba) {
        self.write_f32(value.r);
        self.write_f32(value.g);
        self.write_f32(value.b);
        self.write_f32(value.a);
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Typed reader positioned after the version header. The declared version
/// is available to callers for their own branching; the reader itself never
/// branches on it.
#[derive(Debug)]
pub struct SaveReader {
    buf: Bytes,
    version: i32,
}

impl SaveReader {
    pub fn new(buf: Bytes, version: i32) -> Self {
        Self { buf, version }
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn read_i32(&mut self) -> Result<i32, PersistError> {
        if self.buf.remaining() < 4 {
            return Err(PersistError::Truncated("i32"));
        }
        Ok(self.buf.get_i32_le())
    }

    pub fn read_f32(&mut self) -> Result<f32, PersistError> {
        if self.buf.remaining() < 4 {
            return Err(PersistError::Truncated("f32"));
        }
        Ok(self.buf.get_f32_le())
    }

    pub fn read_vec3(&mut self) -> Result<Vec3, PersistError> {
        Ok(Vec3 {
            x: self.read_f32()?,
            y: self.read_f32()?,
            z: self.read_f32()?,
        })
    }

    pub fn read_quat(&mut self) -> Result<Quat, PersistError> {
        Ok(Quat {
            x: self.read_f32()?,
            y: self.read_f32()?,
            z: self.read_f32()?,
            w: self.read_f32()?,
        })
    }

    pub fn read_color(&mut self) -> Result<Rgba, PersistError> {
        Ok(Rgba {
            r: self.read_f32()?,
            g: self.read_f32()?,
            b: self.read_f32()?,
            a: self.read_f32()?,
        })
    }
}

/// Frame a save body with its version header.
pub fn encode(version: i32, write_body: impl FnOnce(&mut SaveWriter)) -> Bytes {
    let mut writer = SaveWriter::new();
    writer.write_i32(-version);
    write_body(&mut writer);
    writer.into_bytes()
}

/// Parse the version header off a raw stream, yielding a positioned reader.
pub fn decode(data: Bytes) -> Result<SaveReader, PersistError> {
    let mut header = SaveReader::new(data, 0);
    let raw = header.read_i32()?;
    Ok(SaveReader::new(header.buf, -raw))
}

/// File-backed save slot.
#[derive(Debug, Clone)]
pub struct PersistentStorage {
    path: PathBuf,
}

impl PersistentStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save_with(
        &self,
        version: i32,
        write_body: impl FnOnce(&mut SaveWriter),
    ) -> Result<(), PersistError> {
        let data = encode(version, write_body);
        fs::write(&self.path, &data)?;
        Ok(())
    }

    pub fn open(&self) -> Result<SaveReader, PersistError> {
        let data = fs::read(&self.path)?;
        decode(Bytes::from(data))
    }
}
