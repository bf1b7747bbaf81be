use clap::Parser;
use sonar_driver::{run_driver, RadarConfig};
use std::time::{Duration, Instant};

/// Reads a sweeping ultrasonic sensor and logs the polar view each tick.
#[derive(Parser)]
#[command(about = "Reads distance readings from a serial sonar and logs sweep frames.")]
struct Args {
    /// The device path to a serial port
    port: String,
    #[arg(long, default_value_t = 9600)]
    baud: u32,
    /// Stop after this many seconds; run until the device goes away if omitted
    #[arg(long)]
    seconds: Option<u64>,
    /// Print each frame as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = RadarConfig {
        baud_rate: args.baud,
        ..RadarConfig::default()
    };
    let (mut driver_threads, streams) = match run_driver(&args.port, &config) {
        Ok(driver) => driver,
        Err(e) => {
            log::error!("Failed to establish serial connection on {}: {}", args.port, e);
            std::process::exit(1);
        }
    };

    let deadline = args.seconds.map(|s| Instant::now() + Duration::from_secs(s));
    let mut was_stale = true;
    while deadline.map_or(true, |d| Instant::now() < d) {
        let frame = match streams.frames.recv_timeout(Duration::from_secs(1)) {
            Ok(frame) => frame,
            Err(_) => break,
        };

        if frame.stale != was_stale {
            match frame.stale {
                true => log::warn!("NO DATA"),
                false => log::info!("Receiving data"),
            }
            was_stale = frame.stale;
        }
        if args.json {
            match serde_json::to_string(&frame) {
                Ok(line) => println!("{line}"),
                Err(e) => log::error!("{e}"),
            }
        } else if let Some(arm) = frame.arm {
            log::info!("Arm at {}°, {} points in view", arm.angle_deg, frame.points.len());
        }
        if !driver_threads.connection_state().is_connected() && frame.stale {
            log::error!("Serial connection lost");
            break;
        }
    }

    if let Err(e) = driver_threads.shutdown() {
        log::error!("{e}");
    }
}
