//! Platform configuration with build and runtime tiers

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use crate::credentials::{Credential, Relationships};
use crate::decode::decode_var;
use crate::env::EnvReader;
use crate::error::{ConfigError, ConfigResult};
use crate::formatter::FormatterRegistry;
use crate::routes::{self, Route, RouteType, Routes};

mod sealed {
    pub trait Sealed {}
}

/// Execution phase a [`PlatformConfig`] was created for
pub trait Context: sealed::Sealed + fmt::Debug + Send + Sync + 'static {}

/// Build hooks: no relationships, routes or runtime values yet
#[derive(Debug, Clone, Copy)]
pub struct Build;

/// Deploy hooks and the running application
#[derive(Debug, Clone, Copy)]
pub struct Runtime;

impl sealed::Sealed for Build {}
impl sealed::Sealed for Runtime {}
impl Context for Build {}
impl Context for Runtime {}

const ENTERPRISE_MODE: &str = "enterprise";
const ENTERPRISE_PRODUCTION_BRANCH: &str = "production";
const PRODUCTION_BRANCH: &str = "master";

/// Configuration read from the platform environment
///
/// Runtime-only accessors exist on `PlatformConfig<Runtime>` alone.
#[derive(Debug, Clone)]
pub struct PlatformConfig<C: Context = Runtime> {
    // Prefixed simple values, build or runtime
    application_name: String,
    tree_id: String,
    app_dir: String,
    project: String,
    project_entropy: String,

    // Prefixed simple values, runtime only
    branch: String,
    environment: String,
    document_root: String,
    smtp_host: String,
    mode: String,

    // Prefixed complex values
    relationships: Relationships,
    variables: HashMap<String, String>,
    routes: Routes,
    application: serde_json::Value,

    // Unprefixed simple values
    socket: String,
    port: String,

    prefix: String,
    formatters: FormatterRegistry,
    context: PhantomData<C>,
}

impl<C: Context> PlatformConfig<C> {
    /// Read every value from `env`
    ///
    /// Fails with [`ConfigError::InvalidEnvironment`] when
    /// `<prefix>APPLICATION_NAME` is empty.
    pub(crate) fn from_reader<E>(env: &E, prefix: &str) -> ConfigResult<Self>
    where
        E: EnvReader + ?Sized,
    {
        let var = |name: &str| env.get(&format!("{}{}", prefix, name));

        let application_name = var("APPLICATION_NAME");
        if application_name.is_empty() {
            log::debug!("{}APPLICATION_NAME is not set, not a platform environment", prefix);
            return Err(ConfigError::InvalidEnvironment);
        }

        let relationships = decode_var(env, &format!("{}RELATIONSHIPS", prefix))?;
        let variables = decode_var(env, &format!("{}VARIABLES", prefix))?;
        let routes = routes::index_urls(decode_var(env, &format!("{}ROUTES", prefix))?);
        let application = decode_var(env, &format!("{}APPLICATION", prefix))?;

        let config = Self {
            application_name,
            tree_id: var("TREE_ID"),
            app_dir: var("APP_DIR"),
            project: var("PROJECT"),
            project_entropy: var("PROJECT_ENTROPY"),
            branch: var("BRANCH"),
            environment: var("ENVIRONMENT"),
            document_root: var("DOCUMENT_ROOT"),
            smtp_host: var("SMTP_HOST"),
            mode: var("MODE"),
            relationships,
            variables,
            routes,
            application,
            socket: env.get("SOCKET"),
            port: env.get("PORT"),
            prefix: prefix.to_string(),
            formatters: FormatterRegistry::new(),
            context: PhantomData,
        };

        log::debug!(
            "Loaded platform config for {} (environment {:?}, {} relationship(s), {} variable(s))",
            config.application_name,
            config.environment,
            config.relationships.len(),
            config.variables.len()
        );

        Ok(config)
    }

    /// Prefix the platform variables were read with
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// True while build hooks run, before an environment is assigned
    pub fn in_build(&self) -> bool {
        self.environment.is_empty()
    }

    /// True in deploy hooks and the running application
    pub fn in_runtime(&self) -> bool {
        !self.in_build()
    }

    /// True on an Enterprise (dedicated) cluster
    pub fn on_enterprise(&self) -> bool {
        self.mode == ENTERPRISE_MODE
    }

    /// Same as [`on_enterprise`](Self::on_enterprise)
    pub fn on_dedicated(&self) -> bool {
        self.on_enterprise()
    }

    /// True on the production branch of the project
    ///
    /// Never true during build.
    pub fn on_production(&self) -> bool {
        if self.in_build() {
            return false;
        }

        let production_branch = if self.on_enterprise() {
            ENTERPRISE_PRODUCTION_BRANCH
        } else {
            PRODUCTION_BRANCH
        };

        self.branch == production_branch
    }

    /// Name of the application as declared in its configuration
    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    /// Identifier of the built source tree
    pub fn tree_id(&self) -> &str {
        &self.tree_id
    }

    /// Absolute path of the application directory
    pub fn app_dir(&self) -> &str {
        &self.app_dir
    }

    /// Project identifier
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Per-project random seed, for hashing and the like
    pub fn project_entropy(&self) -> &str {
        &self.project_entropy
    }

    /// A project variable, or `default` if it is not defined
    pub fn variable(&self, name: &str, default: &str) -> String {
        self.variables
            .get(name)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    /// All project variables
    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    /// The decoded application definition, `Null` when not provided
    pub fn application(&self) -> &serde_json::Value {
        &self.application
    }
}

impl PlatformConfig<Runtime> {
    /// Git branch the environment was deployed from
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Environment machine name, e.g. `main-bvxea6i`
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Absolute path of the web document root
    pub fn document_root(&self) -> &str {
        &self.document_root
    }

    /// SMTP relay host, empty when outgoing mail is disabled
    pub fn smtp_host(&self) -> &str {
        &self.smtp_host
    }

    /// Platform mode, `enterprise` on dedicated clusters
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Unix socket the application should listen on, from `SOCKET`
    pub fn socket(&self) -> &str {
        &self.socket
    }

    /// TCP port the application should listen on, from `PORT`
    pub fn port(&self) -> &str {
        &self.port
    }

    /// All relationships by name
    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// Whether a relationship with that name is defined
    pub fn has_relationship(&self, name: &str) -> bool {
        self.relationships.contains_key(name)
    }

    /// All credential entries of a relationship, primary first
    pub fn relationship(&self, name: &str) -> ConfigResult<&[Credential]> {
        self.relationships
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| ConfigError::RelationshipNotFound(name.to_string()))
    }

    /// First credential entry of a relationship
    pub fn credentials(&self, name: &str) -> ConfigResult<&Credential> {
        self.credentials_at(name, 0)
    }

    /// Credential entry `index` of a relationship
    pub fn credentials_at(&self, name: &str, index: usize) -> ConfigResult<&Credential> {
        let entries = self.relationship(name)?;
        if entries.is_empty() {
            return Err(ConfigError::EmptyRelationship(name.to_string()));
        }

        entries
            .get(index)
            .ok_or_else(|| ConfigError::CredentialIndexOutOfRange {
                name: name.to_string(),
                index,
                len: entries.len(),
            })
    }

    /// All routes by URL
    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// The route declared with `id: <id>`, lowest URL first if several match
    pub fn route(&self, id: &str) -> ConfigResult<&Route> {
        self.routes
            .values()
            .filter(|route| route.id.as_deref() == Some(id))
            .min_by(|a, b| a.url.cmp(&b.url))
            .ok_or_else(|| ConfigError::RouteNotFound(id.to_string()))
    }

    /// The route marked `primary`, lowest URL first if several are
    pub fn primary_route(&self) -> ConfigResult<&Route> {
        self.routes
            .values()
            .filter(|route| route.primary)
            .min_by(|a, b| a.url.cmp(&b.url))
            .ok_or_else(|| ConfigError::RouteNotFound("primary".to_string()))
    }

    /// Upstream routes served by `app`, sorted by URL
    pub fn upstream_routes(&self, app: &str) -> Vec<&Route> {
        let mut matching: Vec<&Route> = self
            .routes
            .values()
            .filter(|route| route.route_type == RouteType::Upstream)
            .filter(|route| route.upstream_app() == Some(app))
            .collect();
        matching.sort_by(|a, b| a.url.cmp(&b.url));
        matching
    }

    /// Register a credential formatter; an existing one with the same name is replaced
    pub fn register_formatter<F, R>(&self, name: impl Into<String>, formatter: F)
    where
        F: Fn(&Credential) -> R + Send + Sync + 'static,
        R: Any + Send,
    {
        self.formatters.register(name, formatter);
    }

    /// The formatter registry of this config
    pub fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }

    /// Apply a formatter to the first credential of a relationship
    pub fn formatted_credentials(
        &self,
        relationship: &str,
        formatter: &str,
    ) -> ConfigResult<Box<dyn Any + Send>> {
        let credential = self.credentials(relationship)?;
        let apply = self
            .formatters
            .get(formatter)
            .ok_or_else(|| ConfigError::FormatterNotFound(formatter.to_string()))?;
        Ok(apply(credential))
    }

    /// [`formatted_credentials`](Self::formatted_credentials) with the
    /// result downcast to `T`
    pub fn formatted_credentials_as<T: Any>(
        &self,
        relationship: &str,
        formatter: &str,
    ) -> ConfigResult<T> {
        self.formatted_credentials(relationship, formatter)?
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| ConfigError::FormatterOutputMismatch {
                formatter: formatter.to_string(),
                expected: type_name::<T>(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::SQL_DSN;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn encoded(value: serde_json::Value) -> String {
        STANDARD.encode(value.to_string())
    }

    fn runtime(pairs: &[(&str, &str)]) -> ConfigResult<PlatformConfig<Runtime>> {
        PlatformConfig::from_reader(&env(pairs), "PLATFORM_")
    }

    #[test]
    fn test_requires_application_name() {
        let err = runtime(&[("PLATFORM_BRANCH", "master")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvironment));

        let err = runtime(&[("PLATFORM_APPLICATION_NAME", "")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvironment));
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let config = runtime(&[("PLATFORM_APPLICATION_NAME", "app")]).unwrap();
        assert_eq!(config.application_name(), "app");
        assert_eq!(config.branch(), "");
        assert_eq!(config.port(), "");
        assert!(config.relationships().is_empty());
        assert!(config.variables().is_empty());
        assert!(config.routes().is_empty());
        assert!(config.application().is_null());
    }

    #[test]
    fn test_socket_and_port_are_unprefixed() {
        let config = runtime(&[
            ("PLATFORM_APPLICATION_NAME", "app"),
            ("PORT", "8888"),
            ("SOCKET", "/run/app.sock"),
            ("PLATFORM_PORT", "1"),
        ])
        .unwrap();
        assert_eq!(config.port(), "8888");
        assert_eq!(config.socket(), "/run/app.sock");
    }

    #[test]
    fn test_context_predicates() {
        let build = runtime(&[("PLATFORM_APPLICATION_NAME", "app"), ("PLATFORM_BRANCH", "master")])
            .unwrap();
        assert!(build.in_build());
        assert!(!build.in_runtime());
        assert!(!build.on_production());

        let standard = runtime(&[
            ("PLATFORM_APPLICATION_NAME", "app"),
            ("PLATFORM_ENVIRONMENT", "master-7rqtwti"),
            ("PLATFORM_BRANCH", "master"),
        ])
        .unwrap();
        assert!(standard.in_runtime());
        assert!(!standard.on_enterprise());
        assert!(standard.on_production());

        let enterprise = runtime(&[
            ("PLATFORM_APPLICATION_NAME", "app"),
            ("PLATFORM_ENVIRONMENT", "production"),
            ("PLATFORM_BRANCH", "master"),
            ("PLATFORM_MODE", "enterprise"),
        ])
        .unwrap();
        assert!(enterprise.on_enterprise());
        assert!(enterprise.on_dedicated());
        assert!(!enterprise.on_production());
    }

    #[test]
    fn test_variable_default() {
        let config = runtime(&[
            ("PLATFORM_APPLICATION_NAME", "app"),
            ("PLATFORM_VARIABLES", &encoded(json!({"somevar": "someval"}))),
        ])
        .unwrap();
        assert_eq!(config.variable("somevar", "d"), "someval");
        assert_eq!(config.variable("missing", "d"), "d");
    }

    #[test]
    fn test_bad_relationships_abort_construction() {
        let bad_json = STANDARD.encode("[1, 2");
        let err = runtime(&[
            ("PLATFORM_APPLICATION_NAME", "app"),
            ("PLATFORM_RELATIONSHIPS", &bad_json),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Decode { .. }));
    }

    #[test]
    fn test_credentials_lookup() {
        let config = runtime(&[
            ("PLATFORM_APPLICATION_NAME", "app"),
            ("PLATFORM_ENVIRONMENT", "main"),
            (
                "PLATFORM_RELATIONSHIPS",
                &encoded(json!({
                    "database": [
                        {"host": "db1", "port": 3306, "query": {"is_master": true}},
                        {"host": "db2", "port": 3306, "query": {"is_master": false}}
                    ],
                    "empty": []
                })),
            ),
        ])
        .unwrap();

        assert!(config.has_relationship("database"));
        assert_eq!(config.relationship("database").unwrap().len(), 2);
        assert_eq!(config.credentials("database").unwrap().host, "db1");
        assert!(config.credentials("database").unwrap().is_master());
        assert_eq!(config.credentials_at("database", 1).unwrap().host, "db2");
        assert!(matches!(
            config.credentials_at("database", 2),
            Err(ConfigError::CredentialIndexOutOfRange { len: 2, .. })
        ));
        assert!(matches!(
            config.credentials("empty"),
            Err(ConfigError::EmptyRelationship(_))
        ));
        assert!(matches!(
            config.credentials("cache"),
            Err(ConfigError::RelationshipNotFound(_))
        ));
    }

    #[test]
    fn test_formatted_credentials() {
        let config = runtime(&[
            ("PLATFORM_APPLICATION_NAME", "app"),
            (
                "PLATFORM_RELATIONSHIPS",
                &encoded(json!({
                    "database": [{
                        "username": "u", "password": "p", "host": "h", "port": 3306, "path": "db"
                    }]
                })),
            ),
        ])
        .unwrap();

        let dsn: String = config.formatted_credentials_as("database", SQL_DSN).unwrap();
        assert_eq!(dsn, "u:p@tcp(h:3306)/db?charset=utf8");

        let err = config.formatted_credentials_as::<u16>("database", SQL_DSN).unwrap_err();
        assert!(matches!(err, ConfigError::FormatterOutputMismatch { .. }));

        config.register_formatter("host", |c: &Credential| c.host.clone());
        let host = config.formatted_credentials("database", "host").unwrap();
        assert_eq!(host.downcast_ref::<String>().map(String::as_str), Some("h"));

        assert!(matches!(
            config.formatted_credentials("database", "nope"),
            Err(ConfigError::FormatterNotFound(_))
        ));
    }

    #[test]
    fn test_routes() {
        let config = runtime(&[
            ("PLATFORM_APPLICATION_NAME", "app"),
            (
                "PLATFORM_ROUTES",
                &encoded(json!({
                    "https://www.example.com/": {
                        "type": "upstream", "upstream": "app:http", "id": "main", "primary": true,
                        "original_url": "https://www.{default}/"
                    },
                    "https://api.example.com/": {
                        "type": "upstream", "upstream": "api", "original_url": "https://api.{default}/"
                    },
                    "https://example.com/": {
                        "type": "redirect", "to": "https://www.example.com/",
                        "original_url": "https://{default}/"
                    }
                })),
            ),
        ])
        .unwrap();

        assert_eq!(config.routes().len(), 3);
        assert_eq!(config.route("main").unwrap().url, "https://www.example.com/");
        assert!(matches!(config.route("missing"), Err(ConfigError::RouteNotFound(_))));
        assert_eq!(config.primary_route().unwrap().id.as_deref(), Some("main"));

        let upstreams = config.upstream_routes("app");
        assert_eq!(upstreams.len(), 1);
        assert_eq!(upstreams[0].url, "https://www.example.com/");
        assert_eq!(config.upstream_routes("api").len(), 1);
        assert!(config.upstream_routes("worker").is_empty());
    }

    #[test]
    fn test_primary_route_is_deterministic() {
        let config = runtime(&[
            ("PLATFORM_APPLICATION_NAME", "app"),
            (
                "PLATFORM_ROUTES",
                &encoded(json!({
                    "https://b.example.com/": {"type": "upstream", "upstream": "app", "primary": true, "id": "x"},
                    "https://a.example.com/": {"type": "upstream", "upstream": "app", "primary": true, "id": "x"},
                    "https://c.example.com/": {"type": "upstream", "upstream": "app", "primary": true, "id": "x"}
                })),
            ),
        ])
        .unwrap();

        assert_eq!(config.primary_route().unwrap().url, "https://a.example.com/");
        assert_eq!(config.route("x").unwrap().url, "https://a.example.com/");
    }

    #[test]
    fn test_lenient_routes_do_not_abort_construction() {
        let config = runtime(&[
            ("PLATFORM_APPLICATION_NAME", "app"),
            (
                "PLATFORM_ROUTES",
                &encoded(json!({
                    "https://a/": {
                        "type": "upstream", "upstream": "app", "primary": null,
                        "attributes": {"a": 1}
                    }
                })),
            ),
        ])
        .unwrap();

        let route = &config.routes()["https://a/"];
        assert!(!route.primary);
        assert_eq!(route.attributes["a"], json!(1));
        assert!(matches!(config.primary_route(), Err(ConfigError::RouteNotFound(_))));
    }

    #[test]
    fn test_null_relationships_and_query() {
        let config = runtime(&[
            ("PLATFORM_APPLICATION_NAME", "app"),
            ("PLATFORM_RELATIONSHIPS", &STANDARD.encode("null")),
        ])
        .unwrap();
        assert!(config.relationships().is_empty());

        let config = runtime(&[
            ("PLATFORM_APPLICATION_NAME", "app"),
            (
                "PLATFORM_RELATIONSHIPS",
                &encoded(json!({"db": [{"host": "h", "port": 1, "query": null}]})),
            ),
        ])
        .unwrap();
        let db = config.credentials("db").unwrap();
        assert_eq!(db.host, "h");
        assert!(!db.is_master());
    }

    #[test]
    fn test_build_tier_shares_predicates() {
        let config: PlatformConfig<Build> = PlatformConfig::from_reader(
            &env(&[("PLATFORM_APPLICATION_NAME", "app"), ("PLATFORM_TREE_ID", "abc")]),
            "PLATFORM_",
        )
        .unwrap();
        assert!(config.in_build());
        assert!(!config.on_production());
        assert_eq!(config.tree_id(), "abc");
    }
}
