//! Schema linking
//!
//! Attaches the targets of `xs:include`, `xs:import`, `xs:redefine` and
//! `xs:override` from a pool of parsed schemas. A `schemaLocation` selects
//! the pool schema whose `$filename` equals it, else the one sharing the
//! longest trailing run of path segments, else one with the same file stem.
//! So `../common/types.xsd`, `http://host/types.xsd` and `types` all select
//! a schema registered as `types.xsd`, while `v2/types.xsd` prefers
//! `v2/types.xsd` over `v1/types.xsd`. Imports without a location fall back
//! to matching the imported namespace.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use url::Url;

use crate::model::Schema;

/// Link `schema` against `pool`, returning a copy with every resolvable
/// directive attached (recursively). Unresolvable directives stay unlinked.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use xsd_bind::{link_schema, parse_xsd};
///
/// let main = parse_xsd(r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
///     <xs:include schemaLocation="common.xsd"/>
/// </xs:schema>"#).unwrap();
/// let common = parse_xsd(r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
///     <xs:complexType name="Shared"/>
/// </xs:schema>"#).unwrap().with_filename("common.xsd");
///
/// let linked = link_schema(&main, &[Arc::new(common)]);
/// assert!(linked.includes[0].linked.is_some());
/// ```
pub fn link_schema(schema: &Schema, pool: &[Arc<Schema>]) -> Schema {
    let mut linker = Linker::new(pool);
    let own = schema
        .filename
        .as_deref()
        .and_then(|name| linker.by_location(name, None));
    if let Some(index) = own {
        linker.in_progress.push((index, None));
    }
    linker.link(schema)
}

/// Pool index plus the namespace a chameleon include adopted
type Key = (usize, Option<String>);

struct Linker<'p> {
    pool: &'p [Arc<Schema>],
    memo: HashMap<Key, Arc<Schema>>,
    in_progress: Vec<Key>,
}

impl<'p> Linker<'p> {
    fn new(pool: &'p [Arc<Schema>]) -> Self {
        Self {
            pool,
            memo: HashMap::new(),
            in_progress: Vec::new(),
        }
    }

    fn link(&mut self, schema: &Schema) -> Schema {
        let mut linked = schema.clone();
        let own_filename = schema.filename.as_deref();
        let namespace = schema.target_namespace.clone();

        for include in &mut linked.includes {
            include.linked = self.attach(
                include.schema_location.as_deref(),
                own_filename,
                namespace.as_deref(),
            );
        }
        for redefinition in linked.redefines.iter_mut().chain(linked.overrides.iter_mut()) {
            redefinition.linked = self.attach(
                redefinition.schema_location.as_deref(),
                own_filename,
                namespace.as_deref(),
            );
        }
        for import in &mut linked.imports {
            let index = import
                .schema_location
                .as_deref()
                .and_then(|location| self.by_location(location, own_filename))
                .or_else(|| self.by_namespace(import.namespace.as_deref(), own_filename));
            import.linked = match index {
                Some(index) => Some(self.resolve(index, None)),
                None => {
                    tracing::debug!(
                        namespace = import.namespace.as_deref().unwrap_or_default(),
                        location = import.schema_location.as_deref().unwrap_or_default(),
                        "import left unlinked"
                    );
                    None
                }
            };
        }
        linked
    }

    /// Resolve an include-like directive, adopting `namespace` if the target has none
    fn attach(
        &mut self,
        location: Option<&str>,
        own_filename: Option<&str>,
        namespace: Option<&str>,
    ) -> Option<Arc<Schema>> {
        let Some(index) = location.and_then(|l| self.by_location(l, own_filename)) else {
            tracing::debug!(location, "directive left unlinked");
            return None;
        };
        let adopt = match (&self.pool[index].target_namespace, namespace) {
            (None, Some(ns)) => Some(ns.to_string()),
            _ => None,
        };
        Some(self.resolve(index, adopt))
    }

    fn resolve(&mut self, index: usize, adopt: Option<String>) -> Arc<Schema> {
        let key = (index, adopt);
        if let Some(done) = self.memo.get(&key) {
            return Arc::clone(done);
        }
        let pool = self.pool;
        let candidate = &pool[index];
        if self.in_progress.contains(&key) {
            tracing::debug!(
                filename = candidate.filename.as_deref().unwrap_or_default(),
                "cyclic directive, attaching unlinked schema"
            );
            return match &key.1 {
                Some(ns) => Arc::new(candidate.adopted(ns)),
                None => Arc::clone(candidate),
            };
        }

        let base = match &key.1 {
            Some(ns) => candidate.adopted(ns),
            None => candidate.as_ref().clone(),
        };
        self.in_progress.push(key.clone());
        let linked = Arc::new(self.link(&base));
        self.in_progress.pop();
        tracing::debug!(
            filename = base.filename.as_deref().unwrap_or_default(),
            chameleon = key.1.is_some(),
            "linked schema"
        );
        self.memo.insert(key, Arc::clone(&linked));
        linked
    }

    fn by_location(&self, location: &str, own_filename: Option<&str>) -> Option<usize> {
        let candidates: Vec<(usize, &str)> = self
            .pool
            .iter()
            .enumerate()
            .filter_map(|(i, candidate)| {
                candidate
                    .filename
                    .as_deref()
                    .filter(|filename| Some(*filename) != own_filename)
                    .map(|filename| (i, filename))
            })
            .collect();

        if let Some((i, _)) = candidates.iter().find(|(_, filename)| *filename == location) {
            return Some(*i);
        }

        let wanted = location_segments(location);
        let best = candidates
            .iter()
            .map(|(i, filename)| (*i, shared_suffix(&location_segments(filename), &wanted)))
            .filter(|(_, shared)| *shared > 0)
            // First in pool order on ties
            .max_by_key(|(i, shared)| (*shared, Reverse(*i)));
        if let Some((i, _)) = best {
            return Some(i);
        }

        let stem = location_stem(location);
        candidates
            .iter()
            .find(|(_, filename)| location_stem(filename) == stem)
            .map(|(i, _)| *i)
    }

    fn by_namespace(&self, namespace: Option<&str>, own_filename: Option<&str>) -> Option<usize> {
        let namespace = namespace?;
        self.pool.iter().position(|candidate| {
            candidate.target_namespace.as_deref() == Some(namespace)
                && (own_filename.is_none() || candidate.filename.as_deref() != own_filename)
        })
    }
}

/// File stem of a schema location: last path segment without `.xsd`
pub fn location_stem(location: &str) -> String {
    let path = location_path(location);
    let file = path.rsplit(['/', '\\']).next().unwrap_or_default();
    if file.to_ascii_lowercase().ends_with(".xsd") {
        file[..file.len() - 4].to_string()
    } else {
        file.to_string()
    }
}

fn location_path(location: &str) -> String {
    // Single letter schemes are Windows drive letters, not URLs
    Url::parse(location)
        .ok()
        .filter(|url| url.scheme().len() > 1)
        .map(|url| url.path().to_string())
        .unwrap_or_else(|| location.to_string())
}

fn location_segments(location: &str) -> Vec<String> {
    location_path(location)
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .map(str::to_string)
        .collect()
}

fn shared_suffix(a: &[String], b: &[String]) -> usize {
    a.iter().rev().zip(b.iter().rev()).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_xsd;

    fn pooled(name: &str, text: &str) -> Arc<Schema> {
        Arc::new(parse_xsd(text).unwrap().with_filename(name))
    }

    #[test]
    fn test_location_stem() {
        assert_eq!(location_stem("types.xsd"), "types");
        assert_eq!(location_stem("../common/types.xsd"), "types");
        assert_eq!(location_stem("http://example.com/x/Types.XSD"), "Types");
        assert_eq!(location_stem("C:\\schemas\\atom.xsd"), "atom");
        assert_eq!(location_stem("plain"), "plain");
    }

    #[test]
    fn test_links_include_import_redefine() {
        let main = parse_xsd(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:m">
              <xs:include schemaLocation="sub/part.xsd"/>
              <xs:import namespace="urn:o"/>
              <xs:redefine schemaLocation="base.xsd"/>
              <xs:include schemaLocation="missing.xsd"/>
            </xs:schema>"#,
        )
        .unwrap();
        let pool = vec![
            pooled("part.xsd", r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:m"/>"#),
            pooled("other.xsd", r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:o"/>"#),
            pooled("base.xsd", r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:m"/>"#),
        ];
        let linked = link_schema(&main, &pool);
        assert_eq!(
            linked.includes[0].linked.as_ref().unwrap().filename.as_deref(),
            Some("part.xsd")
        );
        assert!(linked.includes[1].linked.is_none());
        assert_eq!(
            linked.imports[0].linked.as_ref().unwrap().filename.as_deref(),
            Some("other.xsd")
        );
        assert_eq!(
            linked.redefines[0].linked.as_ref().unwrap().filename.as_deref(),
            Some("base.xsd")
        );
        assert_eq!(linked.included().count(), 2);
        assert_eq!(linked.imported().count(), 1);
    }

    #[test]
    fn test_location_prefers_closest_path() {
        let empty = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"/>"#;
        let main = parse_xsd(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
              <xs:include schemaLocation="v2/types.xsd"/>
              <xs:include schemaLocation="http://host/lib/v1/types.xsd"/>
              <xs:include schemaLocation="../shared/types.xsd"/>
              <xs:include schemaLocation="common"/>
            </xs:schema>"#,
        )
        .unwrap();
        let pool = vec![
            pooled("v1/types.xsd", empty),
            pooled("v2/types.xsd", empty),
            pooled("common.xsd", empty),
        ];
        let linked = link_schema(&main, &pool);
        let filenames: Vec<_> = linked
            .includes
            .iter()
            .map(|include| include.linked.as_ref().and_then(|s| s.filename.clone()))
            .collect();
        assert_eq!(
            filenames,
            vec![
                Some("v2/types.xsd".to_string()),
                Some("v1/types.xsd".to_string()),
                Some("v1/types.xsd".to_string()),
                Some("common.xsd".to_string()),
            ]
        );
    }

    #[test]
    fn test_chameleon_include_adopts_namespace() {
        let main = parse_xsd(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:host">
              <xs:include schemaLocation="chameleon.xsd"/>
            </xs:schema>"#,
        )
        .unwrap();
        let pool = vec![pooled(
            "chameleon.xsd",
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"><xs:complexType name="C"/></xs:schema>"#,
        )];
        let linked = link_schema(&main, &pool);
        let included = linked.includes[0].linked.as_ref().unwrap();
        assert_eq!(included.target_namespace.as_deref(), Some("urn:host"));
        assert!(pool[0].target_namespace.is_none());
    }

    #[test]
    fn test_cyclic_includes_terminate() {
        let a = pooled(
            "a.xsd",
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"><xs:include schemaLocation="b.xsd"/></xs:schema>"#,
        );
        let b = pooled(
            "b.xsd",
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"><xs:include schemaLocation="a.xsd"/></xs:schema>"#,
        );
        let pool = vec![Arc::clone(&a), b];
        let linked = link_schema(&a, &pool);
        let b_linked = linked.includes[0].linked.as_ref().unwrap();
        let back = b_linked.includes[0].linked.as_ref().unwrap();
        assert_eq!(back.filename.as_deref(), Some("a.xsd"));
        assert!(back.includes[0].linked.is_none());
    }
}
