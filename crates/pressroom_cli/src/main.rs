//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `pressroom_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use pressroom_core::db::migrations::latest_version;
use pressroom_core::db::open_db_in_memory;

fn main() {
    println!("pressroom_core version={}", pressroom_core::core_version());
    match open_db_in_memory() {
        Ok(_conn) => println!("pressroom_core schema_version={}", latest_version()),
        Err(err) => {
            eprintln!("pressroom_core db_open failed: {err}");
            std::process::exit(1);
        }
    }
}
