//! Error types untuk permukaan di sekitar fifo
//!
//! Operasi inti (write/read/preview) tidak pernah gagal: buffer penuh atau
//! kosong hanya membuat caller menunggu. Error di sini hanya muncul dari
//! validasi konfigurasi, backing memory provider, dan decoding string.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FifoError {
    #[error("Fifo capacity must be greater than zero")]
    ZeroCapacity,

    #[error("Backing region too small (required: {required} bytes, available: {available} bytes)")]
    RegionTooSmall { required: usize, available: usize },

    #[error("Backing region I/O failed")]
    Io(#[from] std::io::Error),

    #[error("String read from fifo is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, FifoError>;
