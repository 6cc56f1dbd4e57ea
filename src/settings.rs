use crate::query::DataModelsQuery;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Key of the client secret in the decrypted secure settings.
pub const CLIENT_SECRET_KEY: &str = "oauthClientSecret";

/// Data source settings.
///
/// `clusterUrl`/`cogniteApiUrl` and `cogniteProject`/`defaultProject` are
/// alternate spellings of the same setting; the `cognite*` form wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginSettings {
    pub path: String,
    pub cluster_url: String,
    pub cognite_api_url: String,
    pub cognite_project: String,
    pub default_project: String,
    /// Forward the caller's `Authorization` and `X-ID-Token` headers upstream
    pub oauth_pass_thru: bool,
    /// Acquire tokens with the OAuth client-credentials flow
    pub oauth_client_creds: bool,
    pub oauth_client_id: String,
    pub oauth_token_url: String,
    pub oauth_scope: String,
    #[serde(skip)]
    pub secrets: SecretSettings,
}

/// Secret part of the settings, loaded separately from the plain JSON.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretSettings {
    pub oauth_client_secret: String,
}

impl std::fmt::Debug for SecretSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretSettings")
            .field("oauth_client_secret", &"<redacted>")
            .finish()
    }
}

impl SecretSettings {
    pub fn from_map(secure: &HashMap<String, String>) -> Self {
        SecretSettings {
            oauth_client_secret: secure.get(CLIENT_SECRET_KEY).cloned().unwrap_or_default(),
        }
    }
}

impl PluginSettings {
    /// Loads settings from their JSON form plus the decrypted secret map.
    ///
    /// # Errors
    /// Returns `SettingsError::Parse` if the JSON is not a settings object.
    pub fn load(json_data: &[u8], secure: &HashMap<String, String>) -> Result<Self, SettingsError> {
        let mut settings: PluginSettings =
            serde_json::from_slice(json_data).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.secrets = SecretSettings::from_map(secure);
        Ok(settings)
    }

    /// Loads settings from a JSON file.
    ///
    /// # Errors
    /// Returns `SettingsError::Io` if the file cannot be read, or
    /// `SettingsError::Parse` if its contents are not a settings object.
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        secure: &HashMap<String, String>,
    ) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json_data = std::fs::read(path)
            .map_err(|e| SettingsError::Io(format!("{}: {}", path.display(), e)))?;
        Self::load(&json_data, secure)
    }

    /// Cluster host, e.g. `api.cognitedata.com`.
    pub fn cluster(&self) -> &str {
        if !self.cognite_api_url.is_empty() {
            &self.cognite_api_url
        } else {
            &self.cluster_url
        }
    }

    pub fn project(&self) -> &str {
        if !self.cognite_project.is_empty() {
            &self.cognite_project
        } else {
            &self.default_project
        }
    }

    /// Base URL of the project API.
    ///
    /// A cluster given with an explicit scheme is used as-is, otherwise HTTPS
    /// is assumed.
    pub fn project_url(&self) -> String {
        let cluster = self.cluster().trim_end_matches('/');
        let base = if cluster.starts_with("http://") || cluster.starts_with("https://") {
            cluster.to_string()
        } else {
            format!("https://{}", cluster)
        };
        format!("{}/api/v1/projects/{}", base, self.project())
    }

    /// GraphQL endpoint of the data model a query targets.
    pub fn graphql_endpoint(&self, query: &DataModelsQuery) -> String {
        format!(
            "{}/userapis/spaces/{}/datamodels/{}/versions/{}/graphql",
            self.project_url(),
            query.space,
            query.external_id,
            query.version
        )
    }

    pub fn is_client_credentials_configured(&self) -> bool {
        self.oauth_client_creds
            && !self.oauth_client_id.is_empty()
            && !self.secrets.oauth_client_secret.is_empty()
            && !self.oauth_token_url.is_empty()
    }

    /// Checks that the settings needed to reach the upstream API are present.
    ///
    /// # Errors
    /// Returns `SettingsError::Missing` naming the first absent setting.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.cluster().is_empty() {
            return Err(SettingsError::Missing("clusterUrl".to_string()));
        }
        if self.project().is_empty() {
            return Err(SettingsError::Missing("cogniteProject".to_string()));
        }
        if self.oauth_client_creds {
            if self.oauth_client_id.is_empty() {
                return Err(SettingsError::Missing("oauthClientId".to_string()));
            }
            if self.oauth_token_url.is_empty() {
                return Err(SettingsError::Missing("oauthTokenUrl".to_string()));
            }
            if self.secrets.oauth_client_secret.is_empty() {
                return Err(SettingsError::Missing(CLIENT_SECRET_KEY.to_string()));
            }
        }
        Ok(())
    }
}

/// Errors that can occur while loading settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// Settings file could not be read
    Io(String),
    /// Settings JSON could not be parsed
    Parse(String),
    /// A required setting is absent
    Missing(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(msg) => write!(f, "could not read settings: {}", msg),
            SettingsError::Parse(msg) => {
                write!(f, "could not unmarshal PluginSettings json: {}", msg)
            }
            SettingsError::Missing(name) => write!(f, "missing setting: {}", name),
        }
    }
}

impl std::error::Error for SettingsError {}
