//! Konfigurasi fifo dengan validasi
//!
//! `RingBuffer::init` mengikuti kontrak caller (panic kalau region kurang).
//! Builder ini jalur yang dicek: error dikembalikan, dan bahaya deadlock
//! `capacity < 2 * max_transfer` dilaporkan lewat tracing.

use tracing::warn;

use crate::core::{Hook, RingBuffer, WaitStrategy};
use crate::error::{FifoError, Result};

#[derive(Default)]
pub struct FifoConfig<'a> {
    capacity: Option<usize>,
    post_write: Option<&'a Hook<'a>>,
    wait: WaitStrategy<'a>,
    max_transfer: Option<usize>,
}

impl<'a> FifoConfig<'a> {
    pub fn new() -> Self {
        FifoConfig::default()
    }

    /// Set capacity. Default: seluruh region yang diberikan ke `build`.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Hook yang dipanggil sekali setelah setiap write selesai.
    pub fn post_write(mut self, hook: &'a Hook<'a>) -> Self {
        self.post_write = Some(hook);
        self
    }

    /// Strategi menunggu. Default: [`WaitStrategy::Spin`].
    pub fn wait(mut self, wait: WaitStrategy<'a>) -> Self {
        self.wait = wait;
        self
    }

    /// Ukuran terbesar satu write/read yang akan dipakai aplikasi.
    /// Hanya untuk peringatan deadlock, tidak di-enforce.
    pub fn max_transfer(mut self, len: usize) -> Self {
        self.max_transfer = Some(len);
        self
    }

    pub fn build(self, memory: &'a mut [u8]) -> Result<RingBuffer<'a>> {
        let capacity = self.capacity.unwrap_or(memory.len());

        if capacity == 0 {
            return Err(FifoError::ZeroCapacity);
        }

        if memory.len() < capacity {
            return Err(FifoError::RegionTooSmall {
                required: capacity,
                available: memory.len(),
            });
        }

        if let Some(max) = self.max_transfer {
            if capacity < max.saturating_mul(2) {
                warn!(
                    capacity,
                    max_transfer = max,
                    "fifo capacity below 2x max transfer, writer and reader may deadlock"
                );
            }
        }

        Ok(RingBuffer::init(capacity, self.post_write, self.wait, memory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_defaults_use_whole_region() {
        let mut mem = [0u8; 24];
        let rb = FifoConfig::new().build(&mut mem).unwrap();
        assert_eq!(rb.capacity(), 24);
    }

    #[test]
    fn test_region_too_small() {
        let mut mem = [0u8; 8];
        let err = FifoConfig::new().capacity(16).build(&mut mem).unwrap_err();
        assert!(matches!(
            err,
            FifoError::RegionTooSmall {
                required: 16,
                available: 8
            }
        ));
    }

    #[test]
    fn test_zero_capacity() {
        let mut mem: [u8; 0] = [];
        assert!(matches!(
            FifoConfig::new().build(&mut mem),
            Err(FifoError::ZeroCapacity)
        ));
    }

    #[test]
    fn test_hooks_wired_through() {
        let posts = AtomicUsize::new(0);
        let post = || {
            posts.fetch_add(1, Ordering::Relaxed);
        };
        let wait = || {};

        let mut mem = [0u8; 16];
        let rb = FifoConfig::new()
            .capacity(8)
            .post_write(&post)
            .wait(WaitStrategy::Poll(&wait))
            .max_transfer(8) // Hanya warning
            .build(&mut mem)
            .unwrap();

        assert_eq!(rb.capacity(), 8);
        rb.write_string("abc");
        assert_eq!(posts.load(Ordering::Relaxed), 1);
    }
}
