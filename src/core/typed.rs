//! Typed helpers di atas write/read byte-level
//!
//! Integer diserialisasi fixed-width dengan native byte order. Semua
//! helper mewarisi semantik blocking dan fragmentasi dari `write`/`read`.

use super::ring_buffer::RingBuffer;
use crate::error::Result;

/// Terminator untuk string di dalam fifo
const NUL: u8 = 0;

impl<'a> RingBuffer<'a> {
    #[inline]
    pub fn write_char(&self, value: u8) {
        self.write(&[value]);
    }

    #[inline]
    pub fn write_int(&self, value: i32) {
        self.write(&value.to_ne_bytes());
    }

    #[inline]
    pub fn write_long(&self, value: i64) {
        self.write(&value.to_ne_bytes());
    }

    /// Tulis byte `value` diikuti NUL terminator dalam satu write.
    ///
    /// String yang lebih panjang dari capacity ikut ter-fragmentasi.
    pub fn write_string(&self, value: &str) {
        let mut bytes = Vec::with_capacity(value.len() + 1);
        bytes.extend_from_slice(value.as_bytes());
        bytes.push(NUL);
        self.write(&bytes);
    }

    #[inline]
    pub fn read_char(&self) -> u8 {
        let mut buf = [0u8; 1];
        self.read(&mut buf);
        buf[0]
    }

    #[inline]
    pub fn read_int(&self) -> i32 {
        let mut buf = [0u8; 4];
        self.read(&mut buf);
        i32::from_ne_bytes(buf)
    }

    #[inline]
    pub fn read_long(&self) -> i64 {
        let mut buf = [0u8; 8];
        self.read(&mut buf);
        i64::from_ne_bytes(buf)
    }

    /// Baca string byte per byte ke `buf`.
    ///
    /// Berhenti saat bertemu NUL (dikonsumsi, tidak disimpan) atau saat
    /// `buf` penuh. Sisa string setelah batas tetap di fifo.
    ///
    /// Returns jumlah byte yang disimpan di `buf`.
    pub fn read_string_into(&self, buf: &mut [u8]) -> usize {
        for (stored, slot) in buf.iter_mut().enumerate() {
            let byte = self.read_char();
            if byte == NUL {
                return stored;
            }
            *slot = byte;
        }

        buf.len()
    }

    /// Seperti [`read_string_into`](Self::read_string_into), dibatasi `max`
    /// byte, lalu divalidasi sebagai UTF-8.
    pub fn read_string(&self, max: usize) -> Result<String> {
        let mut buf = vec![0u8; max];
        let len = self.read_string_into(&mut buf);
        buf.truncate(len);

        Ok(String::from_utf8(buf)?)
    }
}
