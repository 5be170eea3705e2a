use std::env;

fn main() {
    // Pass CPU frequency for timing calculations
    println!("cargo:rustc-env=MCU_FREQ_HZ=16000000");

    // The library and its tests also build on the host; only the firmware
    // image needs the AVR linker setup.
    let target = env::var("TARGET").unwrap_or_default();
    if target.contains("avr") {
        println!("cargo:rustc-link-arg=-mmcu=atmega32u4");
    }

    println!("cargo:rerun-if-changed=build.rs");
}
