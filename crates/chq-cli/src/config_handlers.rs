//! `chq config` subcommands.
//!
//! The handlers are generic over [`ConfigManager`] and edit files through
//! [`ConfigTree`], so `set` keeps keys the typed config does not know about.

use std::path::PathBuf;

use crate::cli::ConfigAction;
use crate::config::{ChqConfig, ConfigManager, ConfigTree, render};
use crate::error::{Error, Result};

/// Runs a config subcommand against [`ChqConfig`].
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path::<ChqConfig>(config_path),
        ConfigAction::Get { key } => cmd_config_get::<ChqConfig>(config_path, &key),
        ConfigAction::Set { key, value } => cmd_config_set::<ChqConfig>(config_path, &key, &value),
        ConfigAction::Init { file, force } => cmd_config_init::<ChqConfig>(file.as_deref(), force),
        ConfigAction::Export { docker_env } => {
            cmd_config_export(&ChqConfig::load(config_path)?, docker_env)
        }
    }
}

fn config_file<C: ConfigManager>(config_path: Option<&str>) -> Result<PathBuf> {
    C::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("No config directory on this platform; pass --config"))
}

/// Prints where the config file is looked for.
pub fn cmd_config_path<C: ConfigManager>(config_path: Option<&str>) -> Result<()> {
    let path = config_file::<C>(config_path)?;
    println!("{}", path.display());
    if !path.exists() {
        eprintln!("note: nothing there yet; `{} config init` writes defaults", C::project_name());
    }
    Ok(())
}

/// Prints one setting, after file and environment layering.
pub fn cmd_config_get<C: ConfigManager>(config_path: Option<&str>, key: &str) -> Result<()> {
    let tree = ConfigTree::from_config(&C::load(config_path)?)?;
    let value = tree
        .get(key)
        .ok_or_else(|| Error::config(format!("No setting named '{key}'")))?;
    println!("{}", render(value));
    Ok(())
}

/// Changes one setting in the config file.
///
/// The edited file must still load as `C`; otherwise nothing is written.
pub fn cmd_config_set<C: ConfigManager>(
    config_path: Option<&str>,
    key: &str,
    value: &str,
) -> Result<()> {
    let path = config_file::<C>(config_path)?;
    if !path.exists() {
        return Err(Error::config(format!(
            "No config file at {}; `{} config init` writes one",
            path.display(),
            C::project_name()
        )));
    }

    let mut tree = ConfigTree::read(&path)?;
    tree.set_from_str(key, value)?;
    let _checked: C = tree
        .clone()
        .into_config()
        .map_err(|e| Error::config(format!("Rejected {key} = {value}: {e}")))?;
    tree.write(&path)?;

    tracing::info!(key, path = %path.display(), "Config updated");
    println!("{key} = {value} ({})", path.display());
    Ok(())
}

/// Writes the defaults to `file`, or to the default location.
pub fn cmd_config_init<C: ConfigManager>(file: Option<&str>, force: bool) -> Result<()> {
    let path = match file {
        Some(file) => PathBuf::from(file),
        None => C::default_config_path()
            .ok_or_else(|| Error::config("No config directory on this platform; pass --file"))?,
    };
    if path.exists() && !force {
        return Err(Error::config(format!(
            "{} is already there; --force replaces it",
            path.display()
        )));
    }

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| Error::io_with_path(e, dir))?;
    }
    std::fs::write(&path, C::default().to_toml_string()?)
        .map_err(|e| Error::io_with_path(e, &path))?;

    println!("Wrote defaults to {}", path.display());
    Ok(())
}

/// Prints every setting as an environment override, optionally as
/// `docker run` flags.
pub fn cmd_config_export<C: ConfigManager>(config: &C, docker_env: bool) -> Result<()> {
    let flag = if docker_env { "--env " } else { "" };
    for (name, value) in config.to_env_vars()? {
        println!("{flag}{name}={value}");
    }
    Ok(())
}
