//! Knowledge briefings: the infrastructure reference and per-stack briefings
//! checked against the live catalog.

use std::collections::{HashMap, HashSet};

use zcp_common::ServiceStackType;

use crate::domain::catalog::{HIDDEN_CATEGORIES, base_name, managed_base_names};
use crate::domain::context::PLATFORM_PRIMER;
use crate::domain::error::{ErrorCode, ZcpError};

/// The only platform reference scope.
pub const INFRASTRUCTURE_SCOPE: &str = "infrastructure";

const YAML_REFERENCE: &str = "## YAML Reference

### import.yml

```yaml
services:
  - hostname: api
    type: nodejs@22
    enableSubdomainAccess: true
  - hostname: db
    type: postgresql@16
    mode: NON_HA
```

- Only a top-level `services:` list. A `project:` section is rejected.
- Managed types (databases, caches, storage) need `mode: NON_HA` or `mode: HA`.
- Secrets belong in `envSecrets` of the service entry, not in zerops.yml.

### zerops.yml

```yaml
zerops:
  - setup: api
    build:
      base: nodejs@22
      buildCommands:
        - npm ci
      deployFiles: [.]
    run:
      base: nodejs@22
      ports:
        - port: 3000
          httpSupport: true
      start: node index.js
```

- One `setup` entry per service. A deploy uses the entry named after its target.
- Dev services keep the whole source tree with `deployFiles: [.]`.
- Reference another service's variables as `${db_hostname}` or `${db_password}`.
";

const NEXT_STEP: &str = "\nNext: Generate import.yml and zerops.yml using the rules above. \
Use only validated versions. Then import the services.";

/// What a knowledge request asks for. Exactly one mode per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnowledgeMode<'a> {
    /// The platform reference.
    Scope,
    /// Rules for one stack: a runtime, managed services, or both.
    Briefing {
        runtime: &'a str,
        services: &'a [String],
    },
}

/// Picks the mode from raw request fields.
///
/// # Errors
///
/// `INVALID_PARAMETER` when no mode or both modes are given, or for a scope
/// other than [`INFRASTRUCTURE_SCOPE`].
pub fn knowledge_mode<'a>(
    runtime: &'a str,
    services: &'a [String],
    scope: &str,
) -> Result<KnowledgeMode<'a>, ZcpError> {
    let briefing = !runtime.is_empty() || !services.is_empty();
    match (briefing, !scope.is_empty()) {
        (false, false) => Err(ZcpError::new(
            ErrorCode::InvalidParameter,
            "Must provide runtime/services or scope",
            "Use runtime/services for a stack briefing, or scope=\"infrastructure\" for the platform reference",
        )),
        (true, true) => Err(ZcpError::new(
            ErrorCode::InvalidParameter,
            "Cannot mix briefing and scope modes",
            "Use only one mode per call",
        )),
        (false, true) if scope != INFRASTRUCTURE_SCOPE => Err(ZcpError::new(
            ErrorCode::InvalidParameter,
            format!("Unknown scope {scope:?}"),
            "Use scope=\"infrastructure\" for platform reference",
        )),
        (false, true) => Ok(KnowledgeMode::Scope),
        (true, false) => Ok(KnowledgeMode::Briefing { runtime, services }),
    }
}

/// Primer plus the YAML grammar.
#[must_use]
pub fn infrastructure_reference() -> String {
    format!("{PLATFORM_PRIMER}\n{YAML_REFERENCE}")
}

/// Reference-section name for a runtime type, `None` when unknown.
#[must_use]
pub fn runtime_display_name(runtime: &str) -> Option<&'static str> {
    let name = match base_name(runtime) {
        "php" | "php-nginx" | "php-apache" => "PHP",
        "nodejs" => "Node.js",
        "bun" => "Bun",
        "deno" => "Deno",
        "python" => "Python",
        "go" => "Go",
        "java" => "Java",
        "dotnet" => ".NET",
        "rust" => "Rust",
        "elixir" => "Elixir",
        "gleam" => "Gleam",
        "static" => "Static",
        "docker" => "Docker",
        "alpine" => "Alpine",
        "ubuntu" => "Ubuntu",
        _ => return None,
    };
    Some(name)
}

/// Reference-section name for a managed service type. Unknown types are
/// title-cased per dash-separated part.
#[must_use]
pub fn service_display_name(service: &str) -> String {
    let base = base_name(service);
    let known = match base {
        "postgresql" => "PostgreSQL",
        "mariadb" => "MariaDB",
        "valkey" => "Valkey",
        "keydb" => "KeyDB",
        "elasticsearch" => "Elasticsearch",
        "object-storage" => "Object Storage",
        "shared-storage" => "Shared Storage",
        "kafka" => "Kafka",
        "nats" => "NATS",
        "meilisearch" => "Meilisearch",
        "clickhouse" => "ClickHouse",
        "qdrant" => "Qdrant",
        "typesense" => "Typesense",
        _ => {
            return base
                .split('-')
                .map(|part| {
                    let mut chars = part.chars();
                    chars.next().map_or_else(String::new, |first| {
                        first.to_uppercase().chain(chars).collect()
                    })
                })
                .collect::<Vec<_>>()
                .join("-");
        }
    };
    known.to_string()
}

/// Active versions of the visible catalog, in catalog order.
struct VersionIndex<'a> {
    active: HashSet<&'a str>,
    by_base: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> VersionIndex<'a> {
    fn new(types: &'a [ServiceStackType]) -> Self {
        let mut active = HashSet::new();
        let mut by_base: HashMap<&str, Vec<&str>> = HashMap::new();
        for st in types
            .iter()
            .filter(|st| !HIDDEN_CATEGORIES.contains(&st.category.as_str()))
        {
            for v in st.versions.iter().filter(|v| v.is_active()) {
                active.insert(v.name.as_str());
                by_base.entry(base_name(&v.name)).or_default().push(&v.name);
            }
        }
        Self { active, by_base }
    }

    /// A bare name resolves to its last listed version.
    fn resolve<'b>(&'b self, requested: &'b str) -> &'b str {
        if requested.contains('@') {
            return requested;
        }
        self.by_base
            .get(requested)
            .and_then(|versions| versions.last().copied())
            .unwrap_or(requested)
    }

    fn line(&self, requested: &str) -> String {
        let requested = self.resolve(requested);
        if self.active.contains(requested) {
            return format!("- ✓ `{requested}`");
        }
        match self.by_base.get(base_name(requested)) {
            Some(available) => format!(
                "- ⚠ `{requested}` not found. Available: {}",
                available.join(", ")
            ),
            None => format!("- ⚠ `{requested}` unknown type"),
        }
    }
}

/// One line per requested type: present, present under other versions, or
/// unknown. Empty for an empty catalog.
#[must_use]
pub fn format_version_check<S: AsRef<str>>(
    runtime: &str,
    services: &[S],
    types: &[ServiceStackType],
) -> String {
    if types.is_empty() {
        return String::new();
    }
    let index = VersionIndex::new(types);
    let mut out = String::from("## Version Check\n\n");
    let requested = std::iter::once(runtime).chain(services.iter().map(AsRef::as_ref));
    for name in requested.filter(|n| !n.is_empty()) {
        out.push_str(&index.line(name));
        out.push('\n');
    }
    out
}

fn stack_section<S: AsRef<str>>(
    runtime: &str,
    services: &[S],
    types: &[ServiceStackType],
) -> String {
    let mut lines = Vec::new();
    if !runtime.is_empty() {
        let name = runtime_display_name(runtime).unwrap_or("Custom runtime");
        lines.push(format!("- Runtime: {name} (`{runtime}`)"));
    }
    let managed = managed_base_names(types);
    for svc in services.iter().map(AsRef::as_ref).filter(|s| !s.is_empty()) {
        let name = service_display_name(svc);
        if managed.contains(base_name(svc)) {
            lines.push(format!("- {name} (`{svc}`): managed, set `mode` in import.yml"));
        } else {
            lines.push(format!("- {name} (`{svc}`)"));
        }
    }
    format!("## Your Stack\n\n{}\n", lines.join("\n"))
}

/// Reference, the requested stack, and a version check when the catalog is
/// known, followed by the next step.
#[must_use]
pub fn compose_briefing<S: AsRef<str>>(
    runtime: &str,
    services: &[S],
    types: &[ServiceStackType],
) -> String {
    let mut out = infrastructure_reference();
    out.push('\n');
    out.push_str(&stack_section(runtime, services, types));
    let check = format_version_check(runtime, services, types);
    if !check.is_empty() {
        out.push_str("\n---\n\n");
        out.push_str(&check);
    }
    out.push_str(NEXT_STEP);
    out
}
