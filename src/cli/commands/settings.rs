//! Config and cache inspection commands.

use std::path::Path;

use crate::config::{self, Config};

/// Print the config location and the effective settings
pub fn cmd_config(config: &Config, path: Option<&Path>, write: bool) -> anyhow::Result<()> {
    let location = path.map(Path::to_path_buf).or_else(config::config_path);
    match &location {
        Some(p) => println!("Config file: {}", p.display()),
        None => println!("Config file: (no config directory)"),
    }
    println!("Image cache: {}\n", config.cache.open().dir().display());
    print!("{}", toml::to_string_pretty(config)?);

    if write {
        match path {
            Some(p) => config::save_to(config, p)?,
            None => config::save(config)?,
        }
    }
    Ok(())
}

/// Show the image cache size, optionally clearing it
pub fn cmd_cache(config: &Config, clear: bool) -> anyhow::Result<()> {
    let cache = config.cache.open();
    println!("Image cache: {}", cache.dir().display());
    println!("Size: {:.1} MiB", cache.size_bytes() as f64 / (1024.0 * 1024.0));

    if clear {
        cache.clear()?;
        println!("Cleared.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_to_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let mut config = Config::default();
        config.cache.image_dir = Some(temp.path().join("images"));
        config.appearance.album_icon_size = 72;

        cmd_config(&config, Some(&path), true).unwrap();
        assert_eq!(config::load_from(&path).appearance.album_icon_size, 72);
    }

    #[test]
    fn test_cache_clear() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.cache.image_dir = Some(temp.path().to_path_buf());
        config.cache.open().put("/images/a.png", b"png").unwrap();

        cmd_cache(&config, true).unwrap();
        assert_eq!(config.cache.open().size_bytes(), 0);
    }
}
