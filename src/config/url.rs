//! URL-derived settings
//!
//! The public `url` setting seeds the base URL, relative path, asset prefix,
//! port and the origin policy advertised to the real-time transport.

use log::warn;
use url::{Host, Url};

use super::coerce::first_truthy;
use crate::store::{ConfigStore, ConfigValue, Table};

/// Port used when nothing else names one.
pub const DEFAULT_PORT: i64 = 4567;

/// Components of the configured URL. Parsing never fails: on malformed input
/// every component is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUrl {
    /// Scheme with its trailing colon, e.g. `https:`.
    pub protocol: Option<String>,
    /// Hostname plus `:port` when a port was given. IPv6 hosts keep brackets.
    pub host: Option<String>,
    /// Bare hostname; IPv6 addresses without brackets.
    pub hostname: Option<String>,
    /// Port as written in the URL, including one equal to the scheme default.
    pub port: Option<String>,
    pub pathname: Option<String>,
}

impl ParsedUrl {
    pub fn parse(raw: &str) -> Self {
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(e) => {
                warn!("Configured url {:?} could not be parsed: {}", raw, e);
                return Self::default();
            }
        };

        let hostname = url.host().map(|host| match host {
            Host::Ipv6(addr) => addr.to_string(),
            other => other.to_string(),
        });
        // The parser forgets a port equal to the scheme default, so check
        // whether one was written before asking for the known default.
        let port = if has_explicit_port(raw) {
            url.port_or_known_default().map(|p| p.to_string())
        } else {
            None
        };
        let host = url.host_str().map(|name| match &port {
            Some(port) => format!("{}:{}", name, port),
            None => name.to_string(),
        });

        Self {
            protocol: Some(format!("{}:", url.scheme())),
            host,
            hostname,
            port,
            pathname: Some(url.path().to_string()),
        }
    }

    /// Table form stored under `url_parsed`; absent components are omitted.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        let fields = [
            ("protocol", &self.protocol),
            ("host", &self.host),
            ("hostname", &self.hostname),
            ("port", &self.port),
            ("pathname", &self.pathname),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                table.insert(name.to_string(), ConfigValue::from(value.as_str()));
            }
        }
        table
    }

    pub fn from_table(table: &Table) -> Self {
        let field = |name: &str| table.get(name).map(ToString::to_string);
        Self {
            protocol: field("protocol"),
            host: field("host"),
            hostname: field("hostname"),
            port: field("port"),
            pathname: field("pathname"),
        }
    }

    /// Path with trailing slashes removed; empty for the root path.
    pub fn relative_path(&self) -> String {
        match self.pathname.as_deref() {
            Some("/") | None => String::new(),
            Some(path) => path.trim_end_matches('/').to_string(),
        }
    }

    /// `{protocol}//{host}`.
    pub fn base_url(&self) -> String {
        format!(
            "{}//{}",
            self.protocol.as_deref().unwrap_or_default(),
            self.host.as_deref().unwrap_or_default()
        )
    }

    pub fn is_secure(&self) -> bool {
        self.protocol.as_deref() == Some("https:")
    }
}

/// Whether the authority of `raw` spells out a port.
fn has_explicit_port(raw: &str) -> bool {
    let Some((_, rest)) = raw.split_once("://") else {
        return false;
    };
    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or_default();
    let after_host = match host_port.rfind(']') {
        Some(end) => &host_port[end + 1..],
        None => host_port,
    };
    after_host
        .rsplit_once(':')
        .is_some_and(|(_, port)| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
}

/// Derive every URL-dependent key. Does nothing when `url` is unset or empty,
/// leaving the derived keys absent.
pub fn derive_url_settings(store: &mut ConfigStore) {
    if !store.is_truthy("url") {
        return;
    }
    let raw = store
        .get("url")
        .map(ToString::to_string)
        .unwrap_or_default();
    let url = raw.strip_suffix('/').unwrap_or(&raw).to_string();
    store.set("url", url.as_str());

    let parsed = ParsedUrl::parse(&url);
    store.set("url_parsed", parsed.to_table());

    let relative_path = parsed.relative_path();
    store.set("base_url", parsed.base_url());
    store.set("secure", parsed.is_secure());
    store.set("use_port", parsed.port.is_some());
    store.set("relative_path", relative_path.as_str());
    if !store.is_truthy("asset_base_url") {
        store.set("asset_base_url", format!("{}/assets", relative_path));
    }

    let port = resolve_port(store, &parsed);
    store.set("port", port);

    // Cookies are not isolated by port, so any port on the domain is allowed.
    let domain = match store.get("cookieDomain").filter(|v| v.is_truthy()) {
        Some(domain) => domain.to_string(),
        None => parsed.hostname.clone().unwrap_or_default(),
    };
    if !store.is_truthy("socket.io:origins") {
        let origins = format!(
            "{}//{}:*",
            parsed.protocol.as_deref().unwrap_or_default(),
            domain
        );
        store.set("socket.io:origins", origins);
    }
}

/// First truthy of: `PORT`, the configured `port`, the URL's port, the
/// variable named by `PORT_ENV_VAR`, then [`DEFAULT_PORT`].
pub fn resolve_port(store: &ConfigStore, parsed: &ParsedUrl) -> ConfigValue {
    first_truthy(&[
        &|| store.get("PORT").cloned(),
        &|| store.get("port").cloned(),
        &|| parsed.port.as_deref().map(ConfigValue::from),
        &|| {
            let name = store.get("PORT_ENV_VAR").filter(|v| v.is_truthy())?;
            store.get(&name.to_string()).cloned()
        },
    ])
    .unwrap_or(ConfigValue::Int(DEFAULT_PORT))
}
