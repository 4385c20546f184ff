//! Platform primer handed to agents before they touch a project.

use zcp_common::ServiceStackType;

use crate::domain::catalog::format_service_stacks;

/// Fixed part of the context. Always present.
pub const PLATFORM_PRIMER: &str = "# Platform Context

## Concepts

Zerops runs full Linux containers on bare metal. Resources nest as
Project -> Services -> Containers.

- Project: an isolated private network. Services reach each other by hostname.
- Service: a named unit (api, db, cache) with a type, a mode and scaling limits.
- Container: one instance of a service, scaled horizontally and vertically.

Public traffic enters through an L7 balancer that terminates TLS.

## Critical Rules

- Internal networking is plain HTTP: connect with http://hostname:port, never https.
- Ports 0-9 and 65436+ are reserved; use 10-65435.
- HA/NON_HA mode is fixed at creation. Recreate the service to change it.
- Databases and caches in import.yml need `mode: NON_HA` or `mode: HA`.
- Env var references use underscores: ${db_hostname}, even for hostnames with dashes.
- There is no localhost between services. Always use the hostname.
- prepareCommands are cached; put per-start logic in initCommands.

## Configuration Files

- zerops.yml: per-service build and run pipeline (base, buildCommands,
  deployFiles, start, ports).
- import.yml: a `services:` list (hostname, type, mode, scaling). It must not
  contain a `project:` section.

## Defaults

- postgresql@16, valkey@7.2, meilisearch@1.10, nats@2.10
- NON_HA mode, SHARED CPU mode
- alpine base for custom containers
";

/// Primer followed by the live catalog section when one is available.
#[must_use]
pub fn compose_context(types: Option<&[ServiceStackType]>) -> String {
    let Some(types) = types else {
        return PLATFORM_PRIMER.to_string();
    };
    let section = format_service_stacks(types);
    if section.is_empty() {
        return PLATFORM_PRIMER.to_string();
    }
    format!("{PLATFORM_PRIMER}\n{section}")
}
