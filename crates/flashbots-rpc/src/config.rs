use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::time::Duration;

use alloy_signer_local::PrivateKeySigner;
use eyre::{eyre, OptionExt, Result};
use serde::Deserialize;

use crate::client::{signer_from_hex, BuilderBroadcaster, ClientOptions, FlashbotsRpc};

#[derive(Clone, Debug, Deserialize)]
pub struct EndpointParams {
    pub name: Option<String>,
    pub url: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum EndpointConfig {
    Url(String),
    Params(EndpointParams),
}

impl EndpointConfig {
    pub fn url(&self) -> &str {
        match self {
            Self::Url(url) => url,
            Self::Params(params) => &params.url,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ClientConfig {
    pub url: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BroadcasterConfig {
    #[serde(default)]
    pub urls: Vec<EndpointConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EnvSignerConfig {
    /// Variable holding the hex private key.
    pub var: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum SignerConfig {
    #[serde(rename = "env")]
    Env(EnvSignerConfig),
}

/// File configuration for a relay client, a builder broadcaster and the
/// searcher key that signs for both.
///
/// ```toml
/// timeout_ms = 5000
///
/// [headers]
/// X-Searcher = "searcher-7"
///
/// [client]
/// url = "https://relay.flashbots.net"
///
/// [broadcaster]
/// urls = ["https://rpc.beaverbuild.org", { name = "titan", url = "https://rpc.titanbuilder.xyz" }]
///
/// [signer]
/// type = "env"
/// var = "SEARCHER_KEY"
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RpcConfig {
    pub client: Option<ClientConfig>,
    #[serde(default)]
    pub broadcaster: BroadcasterConfig,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub debug: bool,
    pub signer: Option<SignerConfig>,
}

impl RpcConfig {
    pub fn load_from_file(file_name: &str) -> Result<RpcConfig> {
        let contents = fs::read_to_string(file_name)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<RpcConfig> {
        let config: RpcConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn client_options(&self) -> ClientOptions {
        let mut options = ClientOptions::new().with_debug(self.debug);
        if let Some(timeout_ms) = self.timeout_ms {
            options = options.with_timeout(Duration::from_millis(timeout_ms));
        }
        for (name, value) in self.headers.iter() {
            options = options.with_header(name, value);
        }
        options
    }

    pub fn client(&self) -> Result<FlashbotsRpc> {
        let client = self.client.as_ref().ok_or_eyre("no [client] configured")?;
        Ok(FlashbotsRpc::with_options(&client.url, self.client_options())?)
    }

    pub fn broadcaster(&self) -> Result<BuilderBroadcaster> {
        Ok(BuilderBroadcaster::with_options(self.broadcaster.urls.iter().map(EndpointConfig::url), self.client_options())?)
    }

    pub fn signer(&self) -> Result<PrivateKeySigner> {
        match self.signer.as_ref().ok_or_eyre("no [signer] configured")? {
            SignerConfig::Env(env_config) => {
                let key = env::var(&env_config.var).map_err(|e| eyre!("{}: {e}", env_config.var))?;
                Ok(signer_from_hex(&key)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TEST_ADDRESS, TEST_KEY};

    const CONFIG: &str = r#"
timeout_ms = 1500
debug = true

[headers]
X-Searcher = "searcher-7"

[client]
url = "https://relay.flashbots.net"

[broadcaster]
urls = ["https://rpc.beaverbuild.org", { name = "titan", url = "https://rpc.titanbuilder.xyz" }]

[signer]
type = "env"
var = "FLASHBOTS_RPC_TEST_CONFIG_KEY"
"#;

    #[test]
    fn parse_full_config() -> eyre::Result<()> {
        let config = RpcConfig::from_toml_str(CONFIG)?;

        let options = config.client_options();
        assert_eq!(options.timeout, Duration::from_millis(1500));
        assert!(options.debug);
        assert_eq!(options.headers.get("X-Searcher").map(String::as_str), Some("searcher-7"));

        assert_eq!(config.client()?.url().as_str(), "https://relay.flashbots.net/");

        let broadcaster = config.broadcaster()?;
        let urls: Vec<String> = broadcaster.urls().map(|url| url.to_string()).collect();
        assert_eq!(urls, vec!["https://rpc.beaverbuild.org/", "https://rpc.titanbuilder.xyz/"]);
        Ok(())
    }

    #[test]
    fn signer_from_env() -> eyre::Result<()> {
        let config = RpcConfig::from_toml_str(CONFIG)?;
        env::set_var("FLASHBOTS_RPC_TEST_CONFIG_KEY", TEST_KEY);
        assert_eq!(config.signer()?.address().to_string(), TEST_ADDRESS);

        let missing = RpcConfig::from_toml_str("[signer]\ntype = \"env\"\nvar = \"FLASHBOTS_RPC_TEST_UNSET_KEY\"\n")?;
        assert!(missing.signer().is_err());
        Ok(())
    }

    #[test]
    fn empty_config() -> eyre::Result<()> {
        let config = RpcConfig::from_toml_str("")?;
        assert!(config.client().is_err());
        assert!(config.signer().is_err());
        assert!(config.broadcaster()?.is_empty());
        assert_eq!(config.client_options().timeout, crate::client::DEFAULT_TIMEOUT);
        Ok(())
    }

    #[test]
    fn unknown_signer_type() {
        assert!(RpcConfig::from_toml_str("[signer]\ntype = \"keystore\"\n").is_err());
    }

    #[test]
    fn load_from_file() -> eyre::Result<()> {
        let path = env::temp_dir().join("flashbots_rpc_config_test.toml");
        fs::write(&path, CONFIG)?;
        let config = RpcConfig::load_from_file(path.to_str().unwrap())?;
        assert_eq!(config.broadcaster.urls.len(), 2);
        assert!(RpcConfig::load_from_file("./does-not-exist.toml").is_err());
        Ok(())
    }
}
