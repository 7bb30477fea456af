//! UART Echo - Simulasi ISR <-> Main Loop
//!
//! Dua fifo seperti pada driver UART mikrokontroler:
//! - RX: "ISR" penerima (thread) menulis byte, main loop membaca per baris
//! - TX: main loop menulis balasan, post_write hook meng-arm "TX interrupt",
//!   thread TX menguras fifo hanya saat di-arm
//!
//! Usage:
//!   cargo run --release --example uart_echo

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use bytefifo::{FifoConfig, WaitStrategy};
use tracing::info;

const LINES: &[&str] = &["hello", "bytefifo over uart", "ping", "bye"];

fn main() {
    tracing_subscriber::fmt::init();

    println!("🔌 UART Echo Simulation");
    println!("=======================\n");

    let tx_armed = AtomicBool::new(false);
    let rx_stalls = AtomicU64::new(0);

    // post_write: sama seperti mengaktifkan interrupt TX-empty
    let arm_tx = || tx_armed.store(true, Ordering::Release);
    // Main loop "tidur" sebentar saat RX kosong
    let idle = || {
        rx_stalls.fetch_add(1, Ordering::Relaxed);
        thread::sleep(Duration::from_micros(50));
    };

    let mut rx_mem = [0u8; 16];
    let mut tx_mem = [0u8; 64];

    let rx = FifoConfig::new()
        .wait(WaitStrategy::Poll(&idle))
        .build(&mut rx_mem)
        .expect("rx fifo");
    let tx = FifoConfig::new()
        .post_write(&arm_tx)
        .build(&mut tx_mem)
        .expect("tx fifo");

    thread::scope(|s| {
        // RX ISR: byte datang satu per satu dari "wire"
        s.spawn(|| {
            for line in LINES {
                for &b in line.as_bytes() {
                    rx.write_char(b);
                    thread::sleep(Duration::from_micros(20));
                }
                rx.write_char(b'\n');
            }
        });

        // TX ISR: hanya jalan setelah di-arm oleh post_write
        s.spawn(|| {
            let mut echoed = 0;
            let mut line = Vec::new();
            while echoed < LINES.len() {
                if !tx_armed.swap(false, Ordering::Acquire) {
                    thread::yield_now();
                    continue;
                }

                let mut byte = [0u8; 1];
                while tx.try_read(&mut byte) {
                    if byte[0] == b'\n' {
                        println!("  TX <- {}", String::from_utf8_lossy(&line));
                        line.clear();
                        echoed += 1;
                    } else {
                        line.push(byte[0]);
                    }
                }
            }
        });

        // Main loop: rakit baris dari RX, balas lewat TX
        for _ in 0..LINES.len() {
            let mut line = Vec::new();
            loop {
                match rx.read_char() {
                    b'\n' => break,
                    b => line.push(b),
                }
            }

            let text = String::from_utf8_lossy(&line).to_uppercase();
            println!("  RX -> {}", String::from_utf8_lossy(&line));
            tx.write(text.as_bytes());
            tx.write_char(b'\n');
        }
    });

    info!(rx_stalls = rx_stalls.load(Ordering::Relaxed), "echo finished");
    println!("\n✅ Echoed {} lines", LINES.len());
}
