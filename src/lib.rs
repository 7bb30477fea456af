//! bytefifo - Fixed-Capacity Circular Byte Fifo
//!
//! Arsitektur:
//! - Borrowed Region: Fifo bekerja di atas memory milik caller
//! - SPSC: Satu producer (mis. ISR) dan satu consumer (mis. main loop)
//! - Critical Section: Counter dan flag di-update atomik terhadap sisi lawan
//! - Pluggable Wait: Busy-spin atau hook yang dipanggil per iterasi polling
//!
//! ```
//! use bytefifo::RingBuffer;
//!
//! let mut mem = [0u8; 8];
//! let fifo = RingBuffer::new(&mut mem);
//!
//! fifo.write(b"ABCDEFGH");
//! assert!(fifo.is_full());
//!
//! let mut out = [0u8; 4];
//! assert_eq!(fifo.read(&mut out), b"ABCD");
//! ```

pub mod config;
pub mod core;
pub mod error;

pub use crate::config::FifoConfig;
pub use crate::core::{FifoSnapshot, Hook, MmapRegion, Occupancy, RingBuffer, WaitStrategy};
pub use crate::error::{FifoError, Result};
