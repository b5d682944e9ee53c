use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

// The blocking driver is the async driver with `async` and `.await` removed
fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=src/async.rs");
    println!("cargo:rerun-if-changed=build.rs");

    let source = fs::read_to_string("src/async.rs")?
        .replace("embedded_hal_async", "embedded_hal")
        .replace("async", "")
        .replace(".await", "");

    let out_dir = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "OUT_DIR is not set"))?;

    fs::write(out_dir.join("de-asynced.rs"), source)
}
