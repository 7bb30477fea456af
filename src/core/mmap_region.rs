//! Memory-Mapped Backing Region untuk fifo
//!
//! Fifo tidak pernah alokasi sendiri; region ini salah satu penyedia
//! backing memory. Cocok untuk:
//! - Buffer besar tanpa membebani heap (anonymous mapping)
//! - Inspeksi isi fifo dari luar proses (file-backed mapping)

use memmap2::{MmapMut, MmapOptions};
use std::fs::OpenOptions;
use std::path::Path;
use tracing::debug;

use crate::error::{FifoError, Result};

/// Region mmap yang dipinjamkan ke [`RingBuffer`](crate::RingBuffer).
pub struct MmapRegion {
    mmap: MmapMut,
}

impl MmapRegion {
    /// Anonymous mapping sebesar `len` bytes, diisi nol oleh kernel.
    pub fn anonymous(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(FifoError::ZeroCapacity);
        }

        let mmap = MmapOptions::new().len(len).map_anon()?;
        debug!(len, "anonymous fifo region mapped");

        Ok(Self { mmap })
    }

    /// Membuat atau membuka file lalu memetakannya sebagai region.
    ///
    /// # Arguments
    /// * `path` - Path ke file backing
    /// * `len` - Panjang region dalam bytes
    pub fn open<P: AsRef<Path>>(path: P, len: usize) -> Result<Self> {
        if len == 0 {
            return Err(FifoError::ZeroCapacity);
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.as_ref())?;

        file.set_len(len as u64)?;

        // SAFETY: File dibuka read/write dan hanya dipetakan lewat region ini
        let mmap = unsafe { MmapOptions::new().len(len).map_mut(&file)? };
        debug!(len, path = %path.as_ref().display(), "file-backed fifo region mapped");

        Ok(Self { mmap })
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Slice yang diberikan ke `RingBuffer::init` / `FifoConfig::build`.
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.mmap[..]
    }

    /// Flush isi region ke file (no-op berarti untuk anonymous mapping).
    pub fn sync(&self) -> Result<()> {
        self.mmap.flush()?;
        Ok(())
    }
}
