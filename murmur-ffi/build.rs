// Build script that tries to generate the C header with `cbindgen`.
// If `cbindgen` is not on PATH (or fails), the checked-in
// `include/murmur.h` is copied to $OUT_DIR instead.
//
// Consumers can include the header from either:
//   - <repo>/murmur-ffi/include/murmur.h   (checked-in)
//   - $OUT_DIR/murmur.h

use std::{env, fs, path::PathBuf, process::Command};

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=include/murmur.h");

    let (Some(crate_dir), Some(out_dir)) = (
        env::var_os("CARGO_MANIFEST_DIR").map(PathBuf::from),
        env::var_os("OUT_DIR").map(PathBuf::from),
    ) else {
        return;
    };
    let header_repo = crate_dir.join("include").join("murmur.h");
    let header_out = out_dir.join("murmur.h");

    let generated = Command::new("cbindgen")
        .args(["--crate", "murmur-ffi", "--lang", "C", "--output"])
        .arg(&header_out)
        .current_dir(&crate_dir)
        .status()
        .map(|s| s.success())
        .unwrap_or(false);

    if generated {
        println!("cargo:warning=murmur-ffi: generated header with cbindgen -> {}", header_out.display());
        return;
    }

    if let Err(e) = fs::copy(&header_repo, &header_out) {
        println!("cargo:warning=murmur-ffi: could not stage include/murmur.h: {e}");
    }
}
