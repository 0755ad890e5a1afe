//! Build script rendering the `mkmk(1)` manual page from the CLI definition.

use clap::CommandFactory;
use clap_mangen::Man;
use std::{env, fs, path::PathBuf};

#[path = "src/cli.rs"]
#[expect(
    dead_code,
    reason = "Only type definitions are needed for man page generation"
)]
mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Regenerate the manual page when the CLI or metadata changes.
    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-env-changed=CARGO_PKG_VERSION");
    println!("cargo:rerun-if-env-changed=CARGO_PKG_NAME");
    println!("cargo:rerun-if-env-changed=CARGO_PKG_DESCRIPTION");

    let out_dir = PathBuf::from(env::var("OUT_DIR")?).join("man");
    fs::create_dir_all(&out_dir)?;

    let cmd = cli::Cli::command();
    let name = cmd.get_name().to_owned();
    let pkg = env::var("CARGO_PKG_NAME").unwrap_or_else(|_| name.clone());
    if name != pkg {
        return Err(format!("CLI name '{name}' differs from package name '{pkg}'").into());
    }
    let mut buf = Vec::new();
    Man::new(cmd).render(&mut buf)?;
    fs::write(out_dir.join(format!("{pkg}.1")), buf)?;

    Ok(())
}
