//! Bolero property test: RingBuffer vs VecDeque model
//!
//! Properties tested:
//! - Bytes keluar persis sama dengan model (FIFO, termasuk saat wrap)
//! - bytes_used + bytes_free == capacity setelah setiap operasi
//! - Flag empty/full selalu sesuai counter
//! - preview tidak mengubah state, flush selalu kembali ke kosong

use std::collections::VecDeque;

use bolero::check;
use bytefifo::{Occupancy, RingBuffer};

#[derive(Debug, Clone, Copy)]
enum FifoOp {
    Write { len: usize, seed: u8 },
    TryWrite { len: usize, seed: u8 },
    Read { len: usize },
    Preview { len: usize },
    Flush,
}

impl FifoOp {
    fn decode(kind: u8, len: u8, seed: u8) -> Self {
        let len = len as usize % 80;
        match kind % 8 {
            0 | 1 => FifoOp::Write { len, seed },
            2 => FifoOp::TryWrite { len, seed },
            3 | 4 | 5 => FifoOp::Read { len },
            6 => FifoOp::Preview { len },
            _ => FifoOp::Flush,
        }
    }
}

fn payload(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| seed.wrapping_add(i as u8)).collect()
}

fn check_invariants(fifo: &RingBuffer<'_>, model: &VecDeque<u8>) -> Result<(), String> {
    let snap = fifo.snapshot();

    if snap.bytes_used != model.len() {
        return Err(format!("used {} != model {}", snap.bytes_used, model.len()));
    }
    if snap.bytes_used + snap.bytes_free != snap.capacity {
        return Err(format!("used + free != capacity: {:?}", snap));
    }
    if snap.empty != (snap.bytes_used == 0) || snap.full != (snap.bytes_free == 0) {
        return Err(format!("flags disagree with counters: {:?}", snap));
    }
    if snap.head >= snap.capacity || snap.tail >= snap.capacity {
        return Err(format!("cursor out of bounds: {:?}", snap));
    }

    let expected = match snap.bytes_used {
        0 => Occupancy::Empty,
        n if n == snap.capacity => Occupancy::Full,
        _ => Occupancy::Partial,
    };
    if fifo.occupancy() != expected {
        return Err(format!("occupancy {:?} != {:?}", fifo.occupancy(), expected));
    }

    Ok(())
}

/// Jalankan `ops` terhadap fifo dan model, single-thread.
///
/// Operasi blocking hanya dijalankan kalau pasti tidak perlu menunggu;
/// selain itu varian `try_*` yang harus menolak.
fn execute_and_verify(capacity: usize, ops: &[FifoOp]) -> Result<(), String> {
    let mut mem = vec![0u8; capacity];
    let mut fifo = RingBuffer::new(&mut mem);
    let mut model: VecDeque<u8> = VecDeque::new();

    for op in ops {
        match *op {
            FifoOp::Write { len, seed } => {
                let data = payload(len, seed);
                if len <= fifo.bytes_free() {
                    fifo.write(&data);
                    model.extend(&data);
                } else if fifo.try_write(&data) {
                    return Err(format!("try_write of {} accepted with {} free", len, fifo.bytes_free()));
                }
            }
            FifoOp::TryWrite { len, seed } => {
                let data = payload(len, seed);
                let fits = len <= capacity - model.len();
                if fifo.try_write(&data) != fits {
                    return Err(format!("try_write({}) disagreed, fits = {}", len, fits));
                }
                if fits {
                    model.extend(&data);
                }
            }
            FifoOp::Read { len } => {
                let mut buf = vec![0u8; len];
                if len <= model.len() {
                    let got = fifo.read(&mut buf).to_vec();
                    let want: Vec<u8> = model.drain(..len).collect();
                    if got != want {
                        return Err(format!("read {:?} != model {:?}", got, want));
                    }
                } else if fifo.try_read(&mut buf) {
                    return Err(format!("try_read of {} accepted with {} used", len, model.len()));
                }
            }
            FifoOp::Preview { len } => {
                if len <= model.len() {
                    let before = fifo.snapshot();
                    let mut buf = vec![0u8; len];
                    let got = fifo.preview(&mut buf).to_vec();
                    let want: Vec<u8> = model.iter().take(len).copied().collect();
                    if got != want {
                        return Err(format!("preview {:?} != model {:?}", got, want));
                    }
                    if fifo.snapshot() != before {
                        return Err("preview changed fifo state".to_string());
                    }
                }
            }
            FifoOp::Flush => {
                fifo.flush();
                model.clear();
                if !fifo.is_empty() || fifo.bytes_used() != 0 {
                    return Err("flush did not empty the fifo".to_string());
                }
            }
        }

        check_invariants(&fifo, &model)?;
    }

    Ok(())
}

#[test]
fn fuzz_fifo_against_model() {
    check!()
        .with_type::<(u8, Vec<(u8, u8, u8)>)>()
        .for_each(|(capacity_byte, ops_data)| {
            let capacity = (*capacity_byte as usize % 64) + 1;

            let ops: Vec<FifoOp> = ops_data
                .iter()
                .map(|(kind, len, seed)| FifoOp::decode(*kind, *len, *seed))
                .collect();

            if let Err(e) = execute_and_verify(capacity, &ops) {
                panic!("Invariant violated: {}", e);
            }
        });
}

#[test]
fn fifo_model_basic() {
    let ops = vec![
        FifoOp::Write { len: 3, seed: 1 },
        FifoOp::Preview { len: 2 },
        FifoOp::Read { len: 2 },
        FifoOp::Write { len: 5, seed: 9 },
        FifoOp::Read { len: 6 },
        FifoOp::Read { len: 1 },
    ];
    execute_and_verify(8, &ops).unwrap();
}

#[test]
fn fifo_model_wraparound_traffic() {
    // Chunk 5 dan 3 bukan pembagi capacity 16, total traffic >= 4x capacity
    let mut ops = Vec::new();
    for round in 0..40u8 {
        ops.push(FifoOp::Write { len: 5, seed: round.wrapping_mul(5) });
        ops.push(FifoOp::Read { len: 3 });
        if round % 4 == 3 {
            ops.push(FifoOp::Read { len: 8 });
        }
    }
    execute_and_verify(16, &ops).unwrap();
}

#[test]
fn fifo_model_flush_mid_stream() {
    let ops = vec![
        FifoOp::Write { len: 7, seed: 0 },
        FifoOp::Read { len: 4 },
        FifoOp::Flush,
        FifoOp::Flush,
        FifoOp::TryWrite { len: 8, seed: 3 },
        FifoOp::TryWrite { len: 1, seed: 3 },
        FifoOp::Read { len: 8 },
    ];
    execute_and_verify(8, &ops).unwrap();
}
