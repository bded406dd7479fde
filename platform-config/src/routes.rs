//! Route descriptors from the `ROUTES` variable

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::utils::null_to_default;

/// URL to route descriptor
pub type Routes = HashMap<String, Route>;

/// How a route is served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteType {
    /// Served by an application
    #[default]
    Upstream,
    /// Redirects elsewhere
    Redirect,
    #[serde(other)]
    Unknown,
}

/// One resolved route
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Route {
    /// The resolved URL, copied from the map key
    #[serde(skip)]
    pub url: String,

    #[serde(rename = "type", deserialize_with = "null_to_default")]
    pub route_type: RouteType,

    /// `app` or `app:http` for upstream routes
    pub upstream: Option<String>,

    /// Redirect target
    pub to: Option<String>,

    pub id: Option<String>,

    /// The route as written in the routes configuration
    #[serde(deserialize_with = "null_to_default")]
    pub original_url: String,

    #[serde(deserialize_with = "null_to_default")]
    pub primary: bool,

    /// Free-form attributes from the routes configuration
    #[serde(deserialize_with = "null_to_default")]
    pub attributes: serde_json::Map<String, serde_json::Value>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Route {
    /// Application name this route sends traffic to, without the endpoint suffix
    pub fn upstream_app(&self) -> Option<&str> {
        if self.route_type != RouteType::Upstream {
            return None;
        }
        self.upstream
            .as_deref()
            .map(|upstream| upstream.split(':').next().unwrap_or(upstream))
    }
}

/// Fill in each route's `url` from its key
pub(crate) fn index_urls(mut routes: Routes) -> Routes {
    for (url, route) in routes.iter_mut() {
        route.url = url.clone();
    }
    routes
}
