//! Command: print version information.

/// Print the dotlayers version to stdout.
pub fn run() {
    println!("dotlayers {}", env!("CARGO_PKG_VERSION"));
}
