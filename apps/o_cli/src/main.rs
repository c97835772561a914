//! `omind` — tick-driven entity runtime. Thin wrapper around [`o_cli::run`],
//! handling error display and exit codes. All runtime wiring lives in the
//! library crate for testability.
//!
//! Exit codes (`spec.md` §6): `0` normal completion or cancellation,
//! non-zero on initialization or persistence failure.

#[tokio::main]
async fn main() {
    if let Err(e) = o_cli::run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
