use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    // Rerun when the models, the gradient map or the config files change.
    println!("cargo:rerun-if-changed=assets/*");
    println!("cargo:rerun-if-changed=config/*");

    let out_dir = env::var("OUT_DIR")?;
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;

    let paths_to_copy: Vec<&str> = ["assets/", "config/"]
        .into_iter()
        .filter(|dir| manifest_dir.join(dir).exists())
        .collect();
    if !paths_to_copy.is_empty() {
        copy_items(&paths_to_copy, out_dir, &copy_options)?;
    }

    Ok(())
}
