//! Critical section untuk update counter dan flag
//!
//! Counter (`bytes_used`, `bytes_free`) dan flag (`empty`, `full`) disentuh
//! oleh kedua sisi. Setiap update harus terlihat atomik bagi sisi lawan,
//! jadi keempatnya diubah di dalam satu critical section yang sangat pendek.
//!
//! Guard ini hanya dipegang selama beberapa store. Tidak pernah dipegang
//! saat copy data atau saat memanggil hook.

use std::hint;
use std::sync::atomic::{AtomicBool, Ordering};

pub(crate) struct CriticalSection {
    locked: AtomicBool,
}

impl CriticalSection {
    pub(crate) const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    /// Jalankan `f` secara eksklusif terhadap sisi lawan.
    #[inline(always)]
    pub(crate) fn with<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.enter();
        f()
    }

    #[inline(always)]
    fn enter(&self) -> CriticalGuard<'_> {
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            // Spin di load biasa supaya cache line tidak terus di-invalidate
            while self.locked.load(Ordering::Relaxed) {
                hint::spin_loop();
            }
        }

        CriticalGuard { section: self }
    }
}

struct CriticalGuard<'a> {
    section: &'a CriticalSection,
}

impl Drop for CriticalGuard<'_> {
    #[inline(always)]
    fn drop(&mut self) {
        self.section.locked.store(false, Ordering::Release);
    }
}
