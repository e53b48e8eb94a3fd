//! # Routes and Match Subcommands

use apiguard_validate::{Compiled, CompiledRoute};
use clap::Args;
use serde::Serialize;

/// Arguments for the match subcommand.
#[derive(Args, Debug)]
pub struct MatchArgs {
    /// Inbound request path, including the base path (e.g. `/v1/pets/3`).
    pub path: String,
}

/// One line of `routes` output.
#[derive(Debug, Serialize, PartialEq)]
pub struct RouteSummary {
    pub name: String,
    pub pattern: String,
    pub methods: Vec<String>,
}

impl From<&CompiledRoute> for RouteSummary {
    fn from(route: &CompiledRoute) -> Self {
        Self {
            name: route.name().to_string(),
            pattern: route.pattern().as_str().to_string(),
            methods: route.methods().map(|m| m.to_string()).collect(),
        }
    }
}

/// Summaries of every compiled route.
pub fn list_routes(compiled: &Compiled) -> Vec<RouteSummary> {
    compiled.routes().iter().map(RouteSummary::from).collect()
}

/// The route an inbound path selects, if exactly one does.
pub fn match_route(compiled: &Compiled, args: &MatchArgs) -> Option<RouteSummary> {
    compiled
        .matches(&args.path)
        .map(|matched| RouteSummary::from(matched.route()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiguard_core::Document;
    use apiguard_validate::compile;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn compiled() -> Compiled {
        let document = Document::try_from(json!({
            "basePath": "/api",
            "paths": {
                "/users": {"get": {"responses": {}}, "post": {"responses": {}}},
                "/users/{id}": {"delete": {"responses": {}}}
            }
        }))
        .unwrap();
        compile(&document).unwrap()
    }

    #[test]
    fn test_list_routes() {
        assert_eq!(
            list_routes(&compiled()),
            vec![
                RouteSummary {
                    name: "/users".into(),
                    pattern: "/api/users$".into(),
                    methods: vec!["get".into(), "post".into()],
                },
                RouteSummary {
                    name: "/users/{id}".into(),
                    pattern: "/api/users/[^/]+$".into(),
                    methods: vec!["delete".into()],
                },
            ]
        );
    }

    #[test]
    fn test_match_route() {
        let compiled = compiled();
        let hit = match_route(&compiled, &MatchArgs { path: "/api/users/9".into() });
        assert_eq!(hit.map(|r| r.name), Some("/users/{id}".to_string()));
        assert!(match_route(&compiled, &MatchArgs { path: "/users/9/x".into() }).is_none());
    }
}
