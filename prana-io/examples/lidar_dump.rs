//! Lidar serial dumper
//!
//! Opens the lidar port and prints every received chunk as hex and as
//! lossily decoded text, to inspect the line format before polling it.
//!
//! Usage: `cargo run --example lidar_dump -- [port] [seconds]`

use prana_io::devices::lidar::decode_lossy;
use prana_io::transport::{SerialTransport, Transport};
use std::time::{Duration, Instant};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args = std::env::args().skip(1);
    let port = args.next().unwrap_or_else(|| "/dev/ttyUSB0".to_string());
    let seconds: u64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(10);

    log::info!("=== Lidar Serial Dumper ===");
    log::info!("Opening {} at 115200 baud...", port);
    let mut transport = SerialTransport::open(&port, 115200, Duration::from_millis(100))?;

    let start = Instant::now();
    let duration = Duration::from_secs(seconds);
    let mut buffer = vec![0u8; 256];
    let mut total_bytes = 0;
    let mut newlines = 0;

    while start.elapsed() < duration {
        if transport.available()? == 0 {
            std::thread::sleep(Duration::from_millis(10));
            continue;
        }

        let bytes_read = transport.read(&mut buffer)?;
        if bytes_read == 0 {
            continue;
        }
        total_bytes += bytes_read;
        newlines += buffer[..bytes_read].iter().filter(|&&b| b == b'\n').count();

        let hex_line: String = buffer[..bytes_read]
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ");
        println!("[{:06}] {} bytes: {}", total_bytes, bytes_read, hex_line);
        println!("         text: {:?}", decode_lossy(&buffer[..bytes_read]));
    }

    transport.close()?;

    log::info!("=== Capture Complete ===");
    log::info!("Total bytes received: {}", total_bytes);
    log::info!("Lines (\\n) seen: {}", newlines);

    Ok(())
}
