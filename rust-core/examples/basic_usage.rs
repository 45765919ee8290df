/// Basic usage example: feed accelerometer samples, toggle a torch on shakes
use std::cell::Cell;

use shake_sensing::{AccelSample, GestureDetector, Sensitivity};

fn main() {
    println!("=== Shake Gesture Engine: Basic Example ===\n");

    let torch_on = Cell::new(false);
    let sensitivity = Sensitivity::new(40).expect("slider position is in range");

    // Double-shake detector at the host's slider setting (threshold 23.0)
    let mut detector = GestureDetector::double_shake(sensitivity.threshold(), || {
        torch_on.set(!torch_on.get());
        println!("  -> torch {}", if torch_on.get() { "ON" } else { "OFF" });
    });

    // Simulated 50Hz stream: resting, a forward-back shake, resting
    let mut samples = Vec::new();
    for i in 0..50u64 {
        samples.push(AccelSample::new(i * 20, [0.05, 0.1, 9.81]));
    }
    samples.push(AccelSample::new(1000, [32.0, 0.3, 9.7]));
    for i in 1..25u64 {
        samples.push(AccelSample::new(1000 + i * 20, [0.05, 0.1, 9.81]));
    }
    samples.push(AccelSample::new(1500, [-30.0, -0.4, 9.9]));
    for i in 1..50u64 {
        samples.push(AccelSample::new(1500 + i * 20, [0.05, 0.1, 9.81]));
    }

    println!(
        "Processing {} samples at threshold {:.1}...\n",
        samples.len(),
        sensitivity.threshold()
    );

    for sample in &samples {
        if detector.ingest(sample) {
            println!("Gesture recognized at {} ms", sample.timestamp_ms);
        }
    }

    println!("\n=== Summary ===");
    println!("Gestures recognized: {}", detector.gestures_recognized());
    println!("Samples processed: {}", detector.samples_seen());
    drop(detector);
    println!("Torch is {}", if torch_on.get() { "on" } else { "off" });
}
