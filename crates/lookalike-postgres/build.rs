#![forbid(unsafe_code)]

/// `embed_migrations!` does not notice when only the migration files change,
/// so the crate is rebuilt whenever the migration directory does.
fn main() {
    println!("cargo:rerun-if-changed=./src/migrations");
}
