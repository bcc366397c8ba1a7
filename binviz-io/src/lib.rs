//! Loading binary files for visualization
//!
//! Any file is accepted; it is read as a flat byte stream with no header.
//! Files are either read into memory or, with the `io-mmap` feature, mapped.

pub mod mmap;

pub use mmap::{MmapReader, MIN_MMAP_SIZE};

use binviz_core::{ByteCloud, Error, LoadError, PointCloudBuilder, Result};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::ops::Deref;
use std::path::Path;

/// How file contents are brought into memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// Read the whole file into a heap buffer
    #[default]
    Buffered,
    /// Map the file when it is large enough and mapping is available,
    /// otherwise read it into a buffer
    PreferMmap,
}

/// The bytes of a file, owned or mapped
pub enum FileBytes {
    Buffered(Vec<u8>),
    Mapped(MmapReader),
}

impl FileBytes {
    pub fn is_mapped(&self) -> bool {
        matches!(self, FileBytes::Mapped(_))
    }
}

impl Deref for FileBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileBytes::Buffered(bytes) => bytes.as_slice(),
            FileBytes::Mapped(reader) => reader.as_bytes(),
        }
    }
}

/// Open `path`, turning a missing file into [`LoadError::NotFound`]
fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::Load(LoadError::NotFound {
            path: path.to_path_buf(),
        }),
        _ => Error::Io(e),
    })
}

/// Read the contents of `path`
pub fn read_bytes<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<FileBytes> {
    let path = path.as_ref();
    let mut file = open(path)?;

    if mode == ReadMode::PreferMmap {
        if let Some(reader) = MmapReader::new(&file)? {
            log::info!("Mapped {} bytes from {}", reader.len(), path.display());
            return Ok(FileBytes::Mapped(reader));
        }
    }

    let capacity = file.metadata().map(|m| m.len() as usize).unwrap_or(0);
    let mut buffer = Vec::with_capacity(capacity);
    file.read_to_end(&mut buffer)?;
    log::info!("Reading {} bytes from {}", buffer.len(), path.display());
    Ok(FileBytes::Buffered(buffer))
}

/// Read `path` and build its point cloud with `builder`
pub fn load_point_cloud_with<P: AsRef<Path>>(
    path: P,
    mode: ReadMode,
    builder: &PointCloudBuilder,
) -> Result<ByteCloud> {
    let bytes = read_bytes(path, mode)?;
    builder.build(&bytes)
}

/// Read `path` and build its point cloud
pub fn load_point_cloud<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<ByteCloud> {
    load_point_cloud_with(path, mode, &PointCloudBuilder::new())
}
