use std::path::PathBuf;

use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DataformConfigs {
    pub profiles: Vec<DataformConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DataformConfig {
    pub name: String,
    pub project: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

impl DataformConfig {
    pub fn new(profile: String, project: String, location: String, repository: Option<String>) -> Self {
        Self { name: profile, project, location, repository }
    }

    pub fn load(profile: &str, config_path: Option<PathBuf>) -> anyhow::Result<DataformConfig> {
        let config_file_path = config_file_path(config_path)?;

        let config: DataformConfigs = Config::builder()
            .add_source(File::from(config_file_path.clone()).format(FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.profiles.into_iter().find(|c| c.name == profile).ok_or_else(|| {
            anyhow::anyhow!(format!(
                "Profile `{}` not found. Please check your configuration file at {}",
                profile,
                config_file_path.display()
            ))
        })
    }

    pub fn append(&self) -> anyhow::Result<()> {
        let config_file_path = config_file_path(None)?;
        let mut config: DataformConfigs = Config::builder()
            .add_source(File::from(config_file_path.clone()).format(FileFormat::Toml).required(false))
            .build()?
            .try_deserialize()
            .unwrap_or_default();
        config.profiles.push(self.clone());
        Ok(std::fs::write(config_file_path, toml::to_string(&config)?)?)
    }
}

pub fn load_all(config_path: Option<PathBuf>) -> anyhow::Result<DataformConfigs> {
    let config_file_path = config_file_path(config_path)?;

    Ok(Config::builder()
        .add_source(File::from(config_file_path).format(FileFormat::Toml).required(false))
        .build()?
        .try_deserialize()
        .unwrap_or_default())
}

pub fn has_profile(profile: &str, config_path: Option<PathBuf>) -> anyhow::Result<bool> {
    Ok(load_all(config_path)?.profiles.into_iter().any(|c| c.name == profile))
}

const DATAFORM_PATH: &str = "dataform";

fn config_file_path(config_path: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(path_override) = config_path {
        Ok(path_override)
    } else {
        Ok(dataform_config_dir()?.join("cli_config.toml"))
    }
}

fn token_file_path(profile: &str) -> anyhow::Result<PathBuf> {
    Ok(dataform_config_dir()?.join(format!(".token.{profile}")))
}

fn dataform_config_dir() -> anyhow::Result<PathBuf> {
    let user_config_dir = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Failed to get user config directory"))?;
    let dataform_config_dir = user_config_dir.join(DATAFORM_PATH);
    if !dataform_config_dir.exists() {
        std::fs::create_dir_all(&dataform_config_dir)?;
    }
    Ok(dataform_config_dir)
}

pub fn load_token(profile: &str) -> anyhow::Result<String> {
    let token_path = token_file_path(profile)?;

    Ok(std::fs::read_to_string(token_path)?.trim().to_owned())
}

pub fn save_token(profile: &str, token: &str) -> anyhow::Result<()> {
    let token_path = token_file_path(profile)?;

    Ok(std::fs::write(token_path, token)?)
}
