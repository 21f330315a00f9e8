//! Foreign-key dependency ordering.
//!
//! Used by the SQL-directory bootstrap to decide in which order raw
//! `CREATE` statements run, and by the migration generator to order
//! `CREATE TABLE` and `DROP TABLE` statements.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, SchemaError};

// A name after REFERENCES: quoted or bare, optionally schema-qualified.
static REFERENCES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bREFERENCES\s+((?:`(?:[^`]|``)+`|[\w$]+)(?:\s*\.\s*(?:`(?:[^`]|``)+`|[\w$]+))?)",
    )
    .expect("valid regex")
});

static NAME_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`((?:[^`]|``)+)`|([\w$]+)").expect("valid regex"));

// Quoted identifiers anywhere, and bare names right after FROM or JOIN.
static VIEW_SOURCES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)`((?:[^`]|``)+)`|\b(?:FROM|JOIN)\s+([\w$]+)").expect("valid regex")
});

static CREATE_VIEW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*CREATE\s+(OR\s+REPLACE\s+)?(ALGORITHM\s*=|DEFINER\s*=|SQL\s+SECURITY|VIEW\b)")
        .expect("valid regex")
});

fn unquote(caps: &regex::Captures<'_>) -> Option<String> {
    caps.get(1)
        .map(|quoted| quoted.as_str().replace("``", "`"))
        .or_else(|| caps.get(2).map(|bare| bare.as_str().to_string()))
}

/// Returns every table named after a `REFERENCES` keyword.
///
/// Schema qualifiers are dropped: `` `shop`.`users` `` yields `users`.
#[must_use]
pub fn extract_references(sql: &str) -> BTreeSet<String> {
    REFERENCES
        .captures_iter(sql)
        .filter_map(|caps| caps.get(1))
        .filter_map(|name| NAME_SEGMENT.captures_iter(name.as_str()).last())
        .filter_map(|segment| unquote(&segment))
        .collect()
}

/// Returns the names a view query may read from.
///
/// Every quoted identifier counts, plus bare names after `FROM` and
/// `JOIN`. Callers keep only the names they know to be views or tables.
#[must_use]
pub fn extract_view_sources(sql: &str) -> BTreeSet<String> {
    VIEW_SOURCES
        .captures_iter(sql)
        .filter_map(|caps| unquote(&caps))
        .collect()
}

/// Returns whether a DDL statement creates a view.
#[must_use]
pub fn is_view_statement(sql: &str) -> bool {
    sql.contains("CREATE ALGORITHM") || CREATE_VIEW.is_match(sql)
}

/// One raw DDL statement waiting to run against the scratch database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingStatement {
    /// The statement text.
    pub text: String,
    /// Whether it creates a view.
    pub is_view: bool,
    /// Names it depends on: foreign-key targets for a table, sources for
    /// a view.
    pub references: BTreeSet<String>,
    /// Set once the statement has been executed.
    pub created: bool,
}

impl PendingStatement {
    /// Classifies `text`, the statement that creates `name`.
    ///
    /// Tables reference the targets of their foreign keys. Views reference
    /// the names their query reads from. A statement never references its
    /// own name.
    #[must_use]
    pub fn new(name: &str, text: impl Into<String>) -> Self {
        let text = text.into();
        let is_view = is_view_statement(&text);
        let mut references = if is_view {
            extract_view_sources(&text)
        } else {
            extract_references(&text)
        };
        references.remove(name);
        Self {
            is_view,
            references,
            text,
            created: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Sorts a dependency graph so that every node comes after the nodes it
/// depends on.
///
/// `graph` maps each node to its dependencies. Roots are visited in name
/// order, so the result is deterministic. Self-edges are ignored.
///
/// # Errors
///
/// Returns [`SchemaError::MissingReference`] when a dependency is not a
/// key of `graph`, and [`SchemaError::CyclicDependency`] when the
/// dependencies form a cycle.
pub fn dependency_order(graph: &BTreeMap<String, BTreeSet<String>>) -> Result<Vec<String>> {
    let mut marks: BTreeMap<&str, Mark> = BTreeMap::new();
    let mut order = Vec::with_capacity(graph.len());

    for (root, dependencies) in graph {
        if marks.contains_key(root.as_str()) {
            continue;
        }
        marks.insert(root, Mark::Visiting);
        let mut stack = vec![(root.as_str(), dependencies.iter())];

        while let Some((node, pending)) = stack.last_mut() {
            let node = *node;
            let Some(dependency) = pending.next() else {
                marks.insert(node, Mark::Done);
                order.push(node.to_string());
                stack.pop();
                continue;
            };
            let dependency = dependency.as_str();
            if dependency == node {
                continue;
            }
            match marks.get(dependency) {
                Some(Mark::Done) => {}
                Some(Mark::Visiting) => {
                    let start = stack
                        .iter()
                        .position(|(name, _)| *name == dependency)
                        .unwrap_or(0);
                    let mut cycle: Vec<String> =
                        stack[start..].iter().map(|(name, _)| (*name).to_string()).collect();
                    cycle.push(dependency.to_string());
                    return Err(SchemaError::CyclicDependency { cycle });
                }
                None => {
                    let Some((key, next)) = graph.get_key_value(dependency) else {
                        return Err(SchemaError::MissingReference {
                            table: node.to_string(),
                            reference: dependency.to_string(),
                        });
                    };
                    marks.insert(key, Mark::Visiting);
                    stack.push((key.as_str(), next.iter()));
                }
            }
        }
    }

    Ok(order)
}

/// Returns the execution order of pending statements: tables in
/// dependency order, then views in dependency order.
///
/// A view only waits for other pending views; every table already
/// exists when views run.
///
/// # Errors
///
/// Fails like [`dependency_order`] when a table references a name that is
/// not one of the pending tables, or when tables or views reference each
/// other in a cycle.
pub fn creation_order(pending: &BTreeMap<String, PendingStatement>) -> Result<Vec<String>> {
    let tables: BTreeMap<String, BTreeSet<String>> = pending
        .iter()
        .filter(|(_, statement)| !statement.is_view)
        .map(|(name, statement)| (name.clone(), statement.references.clone()))
        .collect();

    let views: BTreeMap<String, BTreeSet<String>> = pending
        .iter()
        .filter(|(_, statement)| statement.is_view)
        .map(|(name, statement)| {
            let sources = statement
                .references
                .iter()
                .filter(|source| pending.get(*source).is_some_and(|s| s.is_view))
                .cloned()
                .collect();
            (name.clone(), sources)
        })
        .collect();

    let mut order = dependency_order(&tables)?;
    order.extend(dependency_order(&views)?);
    Ok(order)
}
