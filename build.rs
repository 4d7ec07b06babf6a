use std::env;
use std::path::PathBuf;

// ffmpeg-sys-next finds FFmpeg via pkg-config on Unix; Windows builds need
// FFMPEG_DIR or a vcpkg install. Emit actionable hints instead of letting
// the sys crate fail with a bare linker error.
fn main() {
    println!("cargo:rerun-if-env-changed=FFMPEG_DIR");
    println!("cargo:rerun-if-env-changed=VCPKG_ROOT");

    if env::var("CARGO_CFG_TARGET_OS").unwrap_or_default() != "windows" {
        return;
    }
    if env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    match env::var("VCPKG_ROOT") {
        Ok(root) => {
            let triplet =
                env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
            let installed = PathBuf::from(root).join("installed").join(triplet);
            if installed.exists() {
                println!(
                    "cargo:warning=Found vcpkg packages at {}. Set FFMPEG_DIR={} so ffmpeg-sys-next picks them up explicitly.",
                    installed.display(),
                    installed.display(),
                );
            } else {
                println!(
                    "cargo:warning=VCPKG_ROOT is set but {} does not exist; install FFmpeg via vcpkg first.",
                    installed.display(),
                );
            }
        }
        Err(_) => {
            println!(
                "cargo:warning=FFMPEG_DIR is not set. On Windows, install FFmpeg via vcpkg and set VCPKG_ROOT + FFMPEG_DIR."
            );
        }
    }
}
