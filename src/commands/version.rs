//! Command: print version information.

/// Print the usysconf version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("usysconf {}", crate::VERSION);
}
