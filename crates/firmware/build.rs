use std::io;

fn main() -> io::Result<()> {
    // memory.x carries the AXISRAM region and the .axisram section the
    // frame pool and DCMI line buffers are placed in.
    #[cfg(feature = "hardware")]
    {
        use std::env;
        use std::fs;
        use std::path::PathBuf;

        let out = PathBuf::from(
            env::var_os("OUT_DIR").ok_or_else(|| io::Error::other("OUT_DIR not set"))?,
        );
        fs::write(out.join("memory.x"), include_bytes!("../../memory.x"))?;
        println!("cargo:rustc-link-search={}", out.display());
        println!("cargo:rustc-link-arg-bins=-Tlink.x");
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
        println!("cargo:rerun-if-changed=../../memory.x");
    }

    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
