//! Rendering and checks over the live service-type catalog.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use zcp_common::ServiceStackType;

/// Catalog categories never shown in the main list.
pub const HIDDEN_CATEGORIES: &[&str] = &[
    "CORE",
    "INTERNAL",
    "BUILD",
    "PREPARE_RUNTIME",
    "HTTP_L7_BALANCER",
];

/// Display order for the known user-facing categories.
const CATEGORY_ORDER: &[(&str, &str)] = &[
    ("USER", "Runtime"),
    ("STANDARD", "Managed"),
    ("SHARED_STORAGE", "Shared storage"),
    ("OBJECT_STORAGE", "Object storage"),
];

const BUILD_CATEGORY: &str = "BUILD";
const BUILD_TYPE_PREFIX: &str = "zbuild ";

fn is_hidden(category: &str) -> bool {
    HIDDEN_CATEGORIES.contains(&category)
}

fn active_versions(st: &ServiceStackType) -> Vec<&str> {
    st.versions
        .iter()
        .filter(|v| v.is_active())
        .map(|v| v.name.as_str())
        .collect()
}

/// Compacts version names sharing a `name@` prefix into brace notation.
///
/// `["nodejs@18", "nodejs@22"]` becomes `"nodejs@{18,22}"`; anything
/// without a common prefix is comma-joined.
#[must_use]
pub fn compact_versions<S: AsRef<str>>(versions: &[S]) -> String {
    if let [only] = versions {
        return only.as_ref().to_string();
    }
    let joined = || {
        versions
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut prefix: Option<&str> = None;
    let mut suffixes = Vec::with_capacity(versions.len());
    for v in versions {
        let Some((p, suffix)) = v.as_ref().split_once('@') else {
            return joined();
        };
        match prefix {
            None => prefix = Some(p),
            Some(existing) if existing != p => return joined(),
            Some(_) => {}
        }
        suffixes.push(suffix);
    }
    match prefix {
        Some(p) => format!("{p}@{{{}}}", suffixes.join(",")),
        None => String::new(),
    }
}

/// Renders the catalog as a compact Markdown section.
///
/// Returns an empty string when nothing is displayable.
#[must_use]
pub fn format_service_stacks<'a>(types: &'a [ServiceStackType]) -> String {
    let build_versions: HashSet<&str> = types
        .iter()
        .filter(|st| st.category == BUILD_CATEGORY)
        .flat_map(active_versions)
        .collect();

    let mut grouped: HashMap<&str, Vec<&ServiceStackType>> = HashMap::new();
    for st in types.iter().filter(|st| !is_hidden(&st.category)) {
        grouped.entry(st.category.as_str()).or_default().push(st);
    }
    if grouped.is_empty() {
        return String::new();
    }

    let mut matched_build: HashSet<&str> = HashSet::new();
    let mut lines: Vec<String> = Vec::new();

    let mut render = |label: &str, stacks: &[&'a ServiceStackType]| {
        let entries: Vec<String> = stacks
            .iter()
            .filter_map(|st| {
                let versions = active_versions(st);
                if versions.is_empty() {
                    return None;
                }
                let mut has_build = false;
                for &v in &versions {
                    if build_versions.contains(v) {
                        has_build = true;
                        matched_build.insert(v);
                    }
                }
                let mut entry = compact_versions(&versions);
                if has_build {
                    entry.push_str(" [B]");
                }
                Some(entry)
            })
            .collect();
        if !entries.is_empty() {
            lines.push(format!("{label}: {}", entries.join(" | ")));
        }
    };

    for &(category, label) in CATEGORY_ORDER {
        if let Some(stacks) = grouped.get(category) {
            render(label, stacks.as_slice());
        }
    }
    let mut remaining: Vec<&str> = grouped
        .keys()
        .copied()
        .filter(|c| !CATEGORY_ORDER.iter().any(|(known, _)| known == c))
        .collect();
    remaining.sort_unstable();
    for category in remaining {
        render(category, grouped[category].as_slice());
    }

    if lines.is_empty() {
        return String::new();
    }

    let mut out = String::from("## Service Stacks (live)\n[B]=also usable as build.base in zerops.yml\n");
    for line in &lines {
        out.push('\n');
        out.push_str(line);
    }

    let build_only: Vec<String> = types
        .iter()
        .filter(|st| st.category == BUILD_CATEGORY && st.name.starts_with(BUILD_TYPE_PREFIX))
        .filter_map(|st| {
            let unmatched: Vec<&str> = active_versions(st)
                .into_iter()
                .filter(|v| !matched_build.contains(v))
                .collect();
            (!unmatched.is_empty()).then(|| compact_versions(&unmatched))
        })
        .collect();
    if !build_only.is_empty() {
        out.push_str("\nBuild-only: ");
        out.push_str(&build_only.join(" | "));
    }

    out.push('\n');
    out
}

/// Base names (before `@`) of active managed types in the catalog.
#[must_use]
pub fn managed_base_names(types: &[ServiceStackType]) -> HashSet<String> {
    types
        .iter()
        .filter(|st| matches!(st.category.as_str(), "STANDARD" | "SHARED_STORAGE" | "OBJECT_STORAGE"))
        .flat_map(active_versions)
        .map(|v| base_name(v).to_string())
        .collect()
}

/// The part of a type name before `@`.
#[must_use]
pub fn base_name(type_name: &str) -> &str {
    type_name.split_once('@').map_or(type_name, |(base, _)| base)
}

/// A service entry of an import manifest, reduced to what type checks need.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportService {
    pub hostname: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// Warns about import entries whose type is not in the catalog, and about
/// managed types declared without `mode`.
///
/// Returns no warnings for an empty catalog.
#[must_use]
pub fn validate_service_types(services: &[ImportService], types: &[ServiceStackType]) -> Vec<String> {
    if types.is_empty() {
        return Vec::new();
    }

    let mut active: HashSet<&str> = HashSet::new();
    let mut by_base: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut managed: HashSet<&str> = HashSet::new();
    for st in types.iter().filter(|st| !is_hidden(&st.category)) {
        for v in active_versions(st) {
            active.insert(v);
            by_base.entry(base_name(v)).or_default().push(v);
            if st.category == "STANDARD" {
                managed.insert(base_name(v));
            }
        }
    }

    let mut warnings = Vec::new();
    for svc in services.iter().filter(|s| !s.type_name.is_empty()) {
        let base = base_name(&svc.type_name);
        if !active.contains(svc.type_name.as_str()) {
            match by_base.get(base) {
                Some(available) => warnings.push(format!(
                    "service \"{}\": type \"{}\" not found, available: {}",
                    svc.hostname,
                    svc.type_name,
                    available.join(", ")
                )),
                None => warnings.push(format!(
                    "service \"{}\": unknown type \"{}\"",
                    svc.hostname, svc.type_name
                )),
            }
        }
        if managed.contains(base) && svc.mode.is_none() {
            warnings.push(format!(
                "service \"{}\": managed type \"{}\" requires 'mode: NON_HA' or 'mode: HA'",
                svc.hostname, svc.type_name
            ));
        }
    }
    warnings
}
