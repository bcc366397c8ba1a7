//! Memory-mapped reading of large input files
//!
//! Mapping avoids holding a second copy of the file on the heap while the
//! sort keys are built. Falls back to buffered reads on unsupported platforms,
//! for small files, or when the `io-mmap` feature is disabled.

#[cfg(feature = "io-mmap")]
use memmap2::Mmap;
use std::fs::File;
use binviz_core::Result;

/// Files smaller than this are read into memory instead of mapped
pub const MIN_MMAP_SIZE: u64 = 64 * 1024;

/// Read-only mapping of a whole file
pub struct MmapReader {
    #[cfg(feature = "io-mmap")]
    mmap: Mmap,
    #[cfg(not(feature = "io-mmap"))]
    _phantom: std::marker::PhantomData<()>,
}

impl MmapReader {
    /// Map an already opened file.
    ///
    /// Returns `None` when mapping is unavailable or the file is below
    /// [`MIN_MMAP_SIZE`], in which case the caller should read it normally.
    pub fn new(file: &File) -> Result<Option<Self>> {
        #[cfg(feature = "io-mmap")]
        {
            if !Self::is_supported() {
                return Ok(None);
            }

            let metadata = file.metadata()?;
            if metadata.len() < MIN_MMAP_SIZE {
                return Ok(None);
            }

            // The file may change under us; the mapping is only read once to
            // build the sort keys.
            let mmap = unsafe {
                match Mmap::map(file) {
                    Ok(mmap) => mmap,
                    Err(e) => {
                        log::debug!("mmap failed, falling back to buffered read: {}", e);
                        return Ok(None);
                    }
                }
            };

            Ok(Some(Self { mmap }))
        }

        #[cfg(not(feature = "io-mmap"))]
        {
            let _ = file;
            Ok(None)
        }
    }

    /// Check if memory mapping is supported on this platform
    pub fn is_supported() -> bool {
        #[cfg(feature = "io-mmap")]
        {
            cfg!(any(unix, windows))
        }

        #[cfg(not(feature = "io-mmap"))]
        {
            false
        }
    }

    /// The mapped bytes
    pub fn as_bytes(&self) -> &[u8] {
        #[cfg(feature = "io-mmap")]
        {
            &self.mmap
        }

        #[cfg(not(feature = "io-mmap"))]
        {
            &[]
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}
