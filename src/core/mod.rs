//! Core module: Fixed-Capacity Byte Fifo
//!
//! Prinsip desain:
//! - No-Allocation: Backing memory dipinjam dari caller
//! - Single-Producer Single-Consumer: head milik producer, tail milik consumer
//! - Polling: Tidak ada notifikasi, caller memilih strategi menunggu

mod critical;
mod mmap_region;
mod ring_buffer;
mod typed;
mod wait;

pub use mmap_region::MmapRegion;
pub use ring_buffer::{FifoSnapshot, Occupancy, RingBuffer};
pub use wait::{Hook, WaitStrategy};
