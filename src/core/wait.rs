//! Strategi menunggu saat fifo penuh/kosong
//!
//! Tidak ada mekanisme notifikasi: blocking murni polling. Caller memilih
//! antara busy-spin atau hook yang dipanggil sekali per iterasi polling
//! (yield ke scheduler kooperatif, kick watchdog, hitung timeout, dll).

/// Hook tanpa argumen yang dimiliki caller.
///
/// `Sync` karena hook bisa dipanggil dari sisi producer maupun consumer.
pub type Hook<'a> = dyn Fn() + Sync + 'a;

/// Apa yang dilakukan fifo selama operasi harus menunggu.
#[derive(Clone, Copy, Default)]
pub enum WaitStrategy<'a> {
    /// Busy-spin sampai kondisi terpenuhi
    #[default]
    Spin,
    /// Panggil hook berulang kali, sekali per iterasi
    Poll(&'a Hook<'a>),
}

impl<'a> WaitStrategy<'a> {
    /// Satu iterasi polling.
    #[inline(always)]
    pub(crate) fn pause(&self) {
        match self {
            WaitStrategy::Spin => std::hint::spin_loop(),
            WaitStrategy::Poll(hook) => hook(),
        }
    }

    /// Tunggu sampai `ready()` bernilai true.
    ///
    /// Kondisi dicek dulu sebelum pause pertama, jadi hook tidak dipanggil
    /// sama sekali kalau operasi tidak perlu menunggu.
    #[inline]
    pub(crate) fn until(&self, mut ready: impl FnMut() -> bool) {
        while !ready() {
            self.pause();
        }
    }
}

impl std::fmt::Debug for WaitStrategy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitStrategy::Spin => f.write_str("Spin"),
            WaitStrategy::Poll(_) => f.write_str("Poll(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_poll_called_once_per_iteration() {
        let calls = AtomicUsize::new(0);
        let hook = || {
            calls.fetch_add(1, Ordering::Relaxed);
        };
        let wait = WaitStrategy::Poll(&hook);

        let mut checks = 0;
        wait.until(|| {
            checks += 1;
            checks > 3
        });

        // 4 kali cek, 3 kali menunggu
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_no_pause_when_ready() {
        let calls = AtomicUsize::new(0);
        let hook = || {
            calls.fetch_add(1, Ordering::Relaxed);
        };
        WaitStrategy::Poll(&hook).until(|| true);
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_spin_terminates() {
        let mut n = 0;
        WaitStrategy::Spin.until(|| {
            n += 1;
            n == 10
        });
        assert_eq!(n, 10);
    }
}
