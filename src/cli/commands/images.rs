//! Icon sizing commands.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::cover::{compute_target_size, load_thumbnails};

/// Print the icon size for an image of the given dimensions
pub fn cmd_fit(width: u32, height: u32, size: u32) -> anyhow::Result<()> {
    let (w, h) = compute_target_size(width, height, size)?;
    println!("{}x{}", w, h);
    Ok(())
}

/// Write a PNG icon for each image into `out_dir`
pub fn cmd_thumbnail(images: &[PathBuf], out_dir: &Path, size: u32) -> anyhow::Result<()> {
    std::fs::create_dir_all(out_dir)?;

    let thumbnails = load_thumbnails(images, size);
    let names = output_names(images);
    let mut placeholders = 0;
    for ((path, thumbnail), name) in images.iter().zip(thumbnails).zip(names) {
        let thumbnail = thumbnail?;
        let out = out_dir.join(name);
        thumbnail.save_png(&out)?;

        if thumbnail.is_placeholder() {
            placeholders += 1;
            println!("{} -> {} (placeholder)", path.display(), out.display());
        } else {
            println!(
                "{} -> {} ({}x{})",
                path.display(),
                out.display(),
                thumbnail.width(),
                thumbnail.height()
            );
        }
    }

    println!("\n{} icons written", images.len());
    if placeholders > 0 {
        println!("{} images could not be decoded", placeholders);
    }
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

/// One PNG name per input. Repeated stems get a numeric suffix.
fn output_names(paths: &[PathBuf]) -> Vec<String> {
    let mut used = HashSet::new();
    paths
        .iter()
        .map(|path| {
            let stem = file_stem(path);
            let mut name = format!("{}.png", stem);
            let mut n = 1;
            while !used.insert(name.clone()) {
                n += 1;
                name = format!("{}-{}.png", stem, n);
            }
            name
        })
        .collect()
}
