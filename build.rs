fn main() {
    // Only the firmware build needs the ESP-IDF environment; host builds
    // (library + tests) have nothing to generate.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
