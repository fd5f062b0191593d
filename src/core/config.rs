use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub databases: Vec<DatabaseEntry>,
    pub links: LinksConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Root that site-relative links are resolved against
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseEntry {
    /// Name passed to the search tool (usually a path without extension)
    pub name: String,
    pub title: Option<String>,
    /// "nucleotide" or "protein"; guessed from the sequences when absent
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// FASTA file backing sequence retrieval (plain or .gz)
    pub fasta: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    /// Enable the organism-specific genome browser links
    pub genome_browser: bool,
    pub browser_base_url: String,
    /// SINV_<n> key to UniProt accession
    pub uniprot_sinv: BTreeMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4567/".to_string(),
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            genome_browser: false,
            browser_base_url: "http://genomes.arc.georgetown.edu/cgi-bin/gbrowse".to_string(),
            uniprot_sinv: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn database_names(&self) -> Vec<String> {
        self.databases.iter().map(|d| d.name.clone()).collect()
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, crate::SeqServerError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| crate::SeqServerError::Config(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), crate::SeqServerError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| crate::SeqServerError::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seqserver.toml");

        let mut config = default_config();
        config.links.genome_browser = true;
        config
            .links
            .uniprot_sinv
            .insert("SINV_10001".to_string(), "E9J1J2".to_string());
        config.databases.push(DatabaseEntry {
            name: "db/Solenopsis_invicta/genome".to_string(),
            title: Some("Fire ant genome".to_string()),
            kind: Some("nucleotide".to_string()),
            fasta: Some(PathBuf::from("db/genome.fa")),
        });

        save_config(&path, &config).unwrap();
        let loaded = load_config(&path).unwrap();

        assert!(loaded.links.genome_browser);
        assert_eq!(loaded.links.uniprot_sinv["SINV_10001"], "E9J1J2");
        assert_eq!(loaded.databases, config.databases);
        assert_eq!(loaded.server.base_url, "http://localhost:4567/");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
[server]
base_url = "https://blast.example.org/"

[[databases]]
name = "nt"
"#,
        )
        .unwrap();

        assert_eq!(config.server.base_url, "https://blast.example.org/");
        assert_eq!(config.database_names(), vec!["nt".to_string()]);
        assert!(config.databases[0].fasta.is_none());
        assert!(!config.links.genome_browser);
        assert!(config.links.browser_base_url.contains("gbrowse"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[server\nbase_url = 1").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, crate::SeqServerError::Config(_)));
    }
}
