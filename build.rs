//! Build script for detecting system dependencies and providing installation guidance.
//!
//! Checks for the system libraries behind the enabled features (`OpenCV` for
//! `vision`, X11 for `x11`) and for pkg-config, and prints
//! installation hints when they are missing.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Check for pkg-config
    check_pkg_config();

    // Check for OpenCV when the camera backend is enabled
    if env::var_os("CARGO_FEATURE_VISION").is_some() {
        check_opencv();
    }

    // Check for X11 when pointer injection is enabled
    if env::var_os("CARGO_FEATURE_X11").is_some() {
        check_x11();
    }

    // Print detected environment
    println!(
        "cargo:rustc-env=BUILD_TARGET={}",
        env::var("TARGET").unwrap_or_default()
    );
    println!("cargo:rustc-env=BUILD_HOST={}", env::var("HOST").unwrap_or_default());
}

fn pkg_config_version(package: &str) -> Option<String> {
    let output = Command::new("pkg-config").args(["--modversion", package]).output().ok()?;
    if output.status.success() {
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        None
    }
}

fn check_opencv() {
    println!("cargo:rerun-if-env-changed=PKG_CONFIG_PATH");
    println!("cargo:rerun-if-env-changed=OPENCV_LINK_PATHS");
    println!("cargo:rerun-if-env-changed=OPENCV_INCLUDE_PATHS");

    match pkg_config_version("opencv4").or_else(|| pkg_config_version("opencv")) {
        Some(version) => {
            println!("cargo:warning=Found OpenCV version: {version}");
            // SIFT::create gained the enable_precise_upscale argument in 4.8
            let mut parts = version.split('.').map(|part| part.parse::<u32>().unwrap_or(0));
            let (major, minor) = (parts.next().unwrap_or(0), parts.next().unwrap_or(0));
            if (major, minor) < (4, 8) {
                println!("cargo:warning=OpenCV 4.8 or newer is required for SIFT keypoints");
            }
        }
        None => {
            println!("cargo:warning=OpenCV not found via pkg-config. Make sure OpenCV is installed.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install libopencv-dev");
            println!("cargo:warning=On macOS: brew install opencv");
            println!("cargo:warning=The Haar cascades live in the opencv-data package on most distributions");
        }
    }
}

fn check_x11() {
    // Only check on Linux
    if !env::var("TARGET").unwrap_or_default().contains("linux") {
        return;
    }

    let output = Command::new("pkg-config").args(["--exists", "x11"]).output();

    match output {
        Ok(output) if output.status.success() => {
            println!("cargo:warning=Found X11 libraries");
        }
        _ => {
            println!("cargo:warning=X11 libraries not found. Pointer control needs an X server with XTest.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install libx11-dev libxtst-dev");
        }
    }
}

fn check_pkg_config() {
    let output = Command::new("pkg-config").arg("--version").output();

    match output {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout);
            println!("cargo:warning=Found pkg-config version: {}", version.trim());
        }
        _ => {
            println!("cargo:warning=pkg-config not found. This is required to find system libraries.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install pkg-config");
            println!("cargo:warning=On macOS: brew install pkg-config");
        }
    }
}
