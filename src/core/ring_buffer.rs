//! Fixed-Capacity Circular Byte Fifo (Single-Producer Single-Consumer)
//!
//! Fifo ini memindahkan byte antara dua konteks yang berjalan bersamaan,
//! misalnya interrupt handler dan main loop, atau dua thread kooperatif.
//!
//! Aturan kepemilikan:
//! - `head` hanya ditulis oleh producer
//! - `tail` hanya ditulis oleh consumer
//! - Counter dan flag ditulis kedua sisi, selalu di dalam critical section
//!
//! Memory region dipinjam dari caller, fifo tidak pernah alokasi.

use std::fmt;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::{debug, trace};

use super::critical::CriticalSection;
use super::wait::{Hook, WaitStrategy};

/// Tiga state okupansi yang terlihat dari luar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    Empty,
    Partial,
    Full,
}

/// Potret state fifo yang konsisten, untuk diagnostik.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoSnapshot {
    pub capacity: usize,
    pub head: usize,
    pub tail: usize,
    pub bytes_used: usize,
    pub bytes_free: usize,
    pub empty: bool,
    pub full: bool,
}

/// Circular byte fifo di atas memory milik caller.
///
/// Region dibaca/ditulis lewat raw pointer, cursor disimpan sebagai index
/// `[0, capacity)` dan di-wrap dengan modulo.
pub struct RingBuffer<'a> {
    start: NonNull<u8>,
    capacity: usize,

    // Producer side
    head: AtomicUsize,
    // Consumer side
    tail: AtomicUsize,

    // Shared: hanya diubah di dalam `critical`
    bytes_used: AtomicUsize,
    bytes_free: AtomicUsize,
    empty: AtomicBool,
    full: AtomicBool,
    critical: CriticalSection,

    // Deteksi producer/consumer ganda
    producer: AtomicBool,
    consumer: AtomicBool,

    post_write: Option<&'a Hook<'a>>,
    wait: WaitStrategy<'a>,
    _region: PhantomData<&'a mut [u8]>,
}

// SAFETY: RingBuffer aman untuk Send/Sync karena:
// - Hanya satu producer (menulis head), dijaga oleh flag `producer`
// - Hanya satu consumer (menulis tail), dijaga oleh flag `consumer`
// - Producer hanya menyentuh byte yang free, consumer hanya byte yang used;
//   counter di-publish dengan Release dan dibaca dengan Acquire
// - Hook bertipe `dyn Fn() + Sync`
unsafe impl Send for RingBuffer<'_> {}
unsafe impl Sync for RingBuffer<'_> {}

/// Klaim eksklusif satu sisi (producer atau consumer) selama satu operasi.
struct SideClaim<'s> {
    flag: &'s AtomicBool,
}

impl Drop for SideClaim<'_> {
    #[inline(always)]
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl<'a> RingBuffer<'a> {
    /// Membuat fifo di atas `memory[..capacity]`.
    ///
    /// Fifo mulai kosong: `head = tail = 0`, `bytes_free = capacity`.
    ///
    /// # Panics
    /// Panic jika `capacity == 0` atau `memory` lebih kecil dari `capacity`.
    /// Gunakan [`FifoConfig`](crate::FifoConfig) untuk validasi tanpa panic.
    pub fn init(
        capacity: usize,
        post_write: Option<&'a Hook<'a>>,
        wait: WaitStrategy<'a>,
        memory: &'a mut [u8],
    ) -> Self {
        assert!(capacity > 0, "fifo capacity must be greater than zero");
        let region = &mut memory[..capacity];

        debug!(capacity, ?wait, has_post_write = post_write.is_some(), "fifo initialized");

        Self {
            start: NonNull::from(region).cast(),
            capacity,
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            bytes_used: AtomicUsize::new(0),
            bytes_free: AtomicUsize::new(capacity),
            empty: AtomicBool::new(true),
            full: AtomicBool::new(false),
            critical: CriticalSection::new(),
            producer: AtomicBool::new(false),
            consumer: AtomicBool::new(false),
            post_write,
            wait,
            _region: PhantomData,
        }
    }

    /// Fifo tanpa hook, busy-spin saat menunggu, memakai seluruh `memory`.
    pub fn new(memory: &'a mut [u8]) -> Self {
        let capacity = memory.len();
        Self::init(capacity, None, WaitStrategy::Spin, memory)
    }

    /// Tulis semua byte `data` ke fifo (Producer side).
    ///
    /// Jika `data` muat dalam capacity, tunggu sampai seluruhnya muat lalu
    /// tulis dalam satu langkah. Jika lebih besar dari capacity, write
    /// dipecah: tunggu ada ruang, tulis sebanyak yang muat (dibatasi ruang
    /// free dan sisa region sebelum wrap), ulangi sampai habis.
    ///
    /// `post_write` dipanggil sekali setelah semua byte tertulis.
    pub fn write(&self, data: &[u8]) {
        let claim = self.claim(&self.producer, "producer");

        if data.len() <= self.capacity {
            let len = data.len();
            self.wait.until(|| self.bytes_free.load(Ordering::Acquire) >= len);
            self.push_slice(data);
        } else {
            self.write_fragmented(data);
        }

        drop(claim);
        self.notify_written();
    }

    fn write_fragmented(&self, data: &[u8]) {
        let mut remaining = data;

        while !remaining.is_empty() {
            self.wait.until(|| self.bytes_free.load(Ordering::Acquire) > 0);

            let head = self.head.load(Ordering::Relaxed);
            let free = self.bytes_free.load(Ordering::Acquire);
            let run = (self.capacity - head).min(free).min(remaining.len());

            let (chunk, rest) = remaining.split_at(run);
            self.push_slice(chunk);

            trace!(chunk = run, remaining = rest.len(), "fragmented write");
            remaining = rest;
        }
    }

    /// Tulis tanpa menunggu. Returns `false` (tanpa menulis apapun) jika
    /// ruang free kurang dari `data.len()`.
    pub fn try_write(&self, data: &[u8]) -> bool {
        let claim = self.claim(&self.producer, "producer");

        if self.bytes_free.load(Ordering::Acquire) < data.len() {
            return false;
        }

        self.push_slice(data);
        drop(claim);
        self.notify_written();
        true
    }

    /// Baca tepat `buf.len()` byte dari fifo (Consumer side).
    ///
    /// Menunggu sampai byte yang tersedia cukup untuk seluruh permintaan,
    /// tidak ada partial read. Permintaan lebih besar dari capacity tidak
    /// akan pernah selesai.
    pub fn read<'b>(&self, buf: &'b mut [u8]) -> &'b [u8] {
        let _claim = self.claim(&self.consumer, "consumer");

        let len = buf.len();
        self.wait.until(|| self.bytes_used.load(Ordering::Acquire) >= len);
        self.pop_slice(buf);

        buf
    }

    /// Baca tanpa menunggu. Returns `false` jika byte tersedia kurang dari
    /// `buf.len()`; `buf` tidak disentuh.
    pub fn try_read(&self, buf: &mut [u8]) -> bool {
        let _claim = self.claim(&self.consumer, "consumer");

        if self.bytes_used.load(Ordering::Acquire) < buf.len() {
            return false;
        }

        self.pop_slice(buf);
        true
    }

    /// Seperti [`read`](Self::read) tapi `tail` dan counter tidak berubah.
    pub fn preview<'b>(&self, buf: &'b mut [u8]) -> &'b [u8] {
        let _claim = self.claim(&self.consumer, "consumer");

        let len = buf.len();
        self.wait.until(|| self.bytes_used.load(Ordering::Acquire) >= len);

        let tail = self.tail.load(Ordering::Relaxed);
        self.copy_out(tail, buf);

        buf
    }

    /// Reset ke state kosong tanpa realokasi.
    ///
    /// `&mut self` menjamin tidak ada producer/consumer yang sedang aktif.
    pub fn flush(&mut self) {
        *self.head.get_mut() = 0;
        *self.tail.get_mut() = 0;
        *self.bytes_used.get_mut() = 0;
        *self.bytes_free.get_mut() = self.capacity;
        *self.empty.get_mut() = true;
        *self.full.get_mut() = false;

        debug!(capacity = self.capacity, "fifo flushed");
    }

    /// Duplikasi seluruh descriptor `source` (cursor, counter, flag, hook,
    /// bounds) ke `self`.
    ///
    /// Hasilnya bukan buffer independen: kedua descriptor menunjuk memory
    /// yang sama. Begitu salah satu dipakai untuk write/read, cursor
    /// keduanya langsung tidak sinkron.
    ///
    /// # Safety
    /// Caller harus memastikan kedua descriptor tidak dipakai bersamaan
    /// sebagai producer (atau bersamaan sebagai consumer). Untuk inspeksi
    /// saja, pakai [`snapshot`](Self::snapshot).
    pub unsafe fn copy_from(&mut self, source: &RingBuffer<'a>) {
        let snap = source.snapshot();

        self.start = source.start;
        self.capacity = snap.capacity;
        *self.head.get_mut() = snap.head;
        *self.tail.get_mut() = snap.tail;
        *self.bytes_used.get_mut() = snap.bytes_used;
        *self.bytes_free.get_mut() = snap.bytes_free;
        *self.empty.get_mut() = snap.empty;
        *self.full.get_mut() = snap.full;
        self.post_write = source.post_write;
        self.wait = source.wait;

        debug!(head = snap.head, tail = snap.tail, used = snap.bytes_used, "fifo descriptor copied");
    }

    /// Potret state yang konsisten (diambil di dalam critical section).
    pub fn snapshot(&self) -> FifoSnapshot {
        self.critical.with(|| FifoSnapshot {
            capacity: self.capacity,
            head: self.head.load(Ordering::Relaxed),
            tail: self.tail.load(Ordering::Relaxed),
            bytes_used: self.bytes_used.load(Ordering::Relaxed),
            bytes_free: self.bytes_free.load(Ordering::Relaxed),
            empty: self.empty.load(Ordering::Relaxed),
            full: self.full.load(Ordering::Relaxed),
        })
    }

    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline(always)]
    pub fn bytes_used(&self) -> usize {
        self.bytes_used.load(Ordering::Acquire)
    }

    #[inline(always)]
    pub fn bytes_free(&self) -> usize {
        self.bytes_free.load(Ordering::Acquire)
    }

    /// Single-byte load, tidak perlu critical section
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.empty.load(Ordering::Acquire)
    }

    /// Single-byte load, tidak perlu critical section
    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.full.load(Ordering::Acquire)
    }

    pub fn occupancy(&self) -> Occupancy {
        match self.bytes_used() {
            0 => Occupancy::Empty,
            used if used == self.capacity => Occupancy::Full,
            _ => Occupancy::Partial,
        }
    }

    #[inline(always)]
    fn claim<'s>(&'s self, flag: &'s AtomicBool, role: &'static str) -> SideClaim<'s> {
        if flag
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            panic!("concurrent {role} detected: fifo supports exactly one {role} at a time");
        }

        SideClaim { flag }
    }

    #[inline(always)]
    fn notify_written(&self) {
        if let Some(hook) = self.post_write {
            hook();
        }
    }

    /// Copy `data` di `head`, lalu publish. Caller sudah memastikan
    /// `data.len() <= bytes_free`.
    #[inline(always)]
    fn push_slice(&self, data: &[u8]) {
        let len = data.len();
        let head = self.head.load(Ordering::Relaxed);
        let first = (self.capacity - head).min(len);

        // SAFETY: [head, head+len) mod capacity ada di ruang free, consumer
        // tidak membaca ruang ini sampai counter di-publish di bawah.
        unsafe {
            let base = self.start.as_ptr();
            ptr::copy_nonoverlapping(data.as_ptr(), base.add(head), first);

            // Handle wraparound
            if first < len {
                ptr::copy_nonoverlapping(data.as_ptr().add(first), base, len - first);
            }
        }

        let new_head = (head + len) % self.capacity;
        self.critical.with(|| {
            self.head.store(new_head, Ordering::Release);
            let used = self.bytes_used.load(Ordering::Relaxed) + len;
            self.publish(used);
        });
    }

    /// Copy ke `buf` dari `tail`, lalu majukan `tail`. Caller sudah
    /// memastikan `buf.len() <= bytes_used`.
    #[inline(always)]
    fn pop_slice(&self, buf: &mut [u8]) {
        let len = buf.len();
        let tail = self.tail.load(Ordering::Relaxed);
        self.copy_out(tail, buf);

        let new_tail = (tail + len) % self.capacity;
        self.critical.with(|| {
            self.tail.store(new_tail, Ordering::Release);
            let used = self.bytes_used.load(Ordering::Relaxed) - len;
            self.publish(used);
        });
    }

    #[inline(always)]
    fn copy_out(&self, tail: usize, buf: &mut [u8]) {
        let len = buf.len();
        let first = (self.capacity - tail).min(len);

        // SAFETY: [tail, tail+len) mod capacity sudah ditulis dan di-publish
        // producer, dan producer tidak menimpanya sampai tail maju.
        unsafe {
            let base = self.start.as_ptr();
            ptr::copy_nonoverlapping(base.add(tail), buf.as_mut_ptr(), first);

            if first < len {
                ptr::copy_nonoverlapping(base, buf.as_mut_ptr().add(first), len - first);
            }
        }
    }

    /// Harus dipanggil di dalam `critical`.
    #[inline(always)]
    fn publish(&self, used: usize) {
        self.bytes_used.store(used, Ordering::Release);
        self.bytes_free.store(self.capacity - used, Ordering::Release);
        self.empty.store(used == 0, Ordering::Release);
        self.full.store(used == self.capacity, Ordering::Release);
    }
}

impl fmt::Debug for RingBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snap = self.snapshot();
        f.debug_struct("RingBuffer")
            .field("capacity", &snap.capacity)
            .field("head", &snap.head)
            .field("tail", &snap.tail)
            .field("bytes_used", &snap.bytes_used)
            .field("bytes_free", &snap.bytes_free)
            .field("wait", &self.wait)
            .finish()
    }
}
