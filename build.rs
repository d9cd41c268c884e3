fn main() {
    // ESP-IDF link arguments are only needed for the device binaries.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
