//! Dependency closure using depth-first search (DFS)
//!
//! ## Algorithm
//!
//! Uses DFS with three-color marking to detect cycles:
//!
//! 1. **WHITE** (unvisited): bundle hasn't been fetched
//! 2. **GRAY** (on the current path): bundle's includes are being walked
//! 3. **BLACK** (done): bundle and all its includes are in the closure
//!
//! Meeting a GRAY bundle again means an `includes` cycle. Bundles are appended to the
//! closure when first reached (pre-order), so the seeds come first.
//!
//! ```text
//! editor  includes os-core, lib-ncurses
//! lib-ncurses includes os-core
//!
//! seed editor -> [editor, os-core, lib-ncurses]
//! ```

use std::collections::HashSet;

use super::Resolver;
use crate::error::{self, Result};
use crate::manifest::{File, Manifest};

/// State shared by one closure walk
struct ClosureContext<'r, 'a> {
    resolver: &'r mut Resolver<'a>,
    mom: &'r Manifest,
    /// Fully processed bundles (BLACK)
    done: HashSet<String>,
    /// Bundles on the current DFS path (GRAY), in order
    path: Vec<String>,
    /// Closure in first-seen order
    result: Vec<Manifest>,
}

/// Resolve the closure of `seeds`, each carrying the version to fetch it at
pub(super) fn resolve(
    resolver: &mut Resolver<'_>,
    mom: &Manifest,
    seeds: &[File],
) -> Result<Vec<Manifest>> {
    let mut ctx = ClosureContext {
        resolver,
        mom,
        done: HashSet::new(),
        path: Vec::new(),
        result: Vec::new(),
    };

    for seed in seeds {
        visit(&mut ctx, seed)?;
    }

    Ok(ctx.result)
}

fn visit(ctx: &mut ClosureContext<'_, '_>, entry: &File) -> Result<()> {
    let name = entry.filename.as_str();

    if ctx.path.iter().any(|n| n == name) {
        return Err(error::bundle::resolution_failed(
            name,
            format!("circular dependency: {}", cycle_chain(&ctx.path, name)),
        ));
    }

    if ctx.done.contains(name) {
        return Ok(());
    }

    let manifest = ctx.resolver.load_manifest(entry)?;
    let includes = manifest.includes.clone();
    ctx.result.push(manifest);
    ctx.path.push(name.to_string());

    for include in &includes {
        let Some(dep) = ctx.mom.search_bundle(include).cloned() else {
            return Err(error::bundle::resolution_failed(
                name,
                format!("included bundle '{include}' not found in Manifest.MoM"),
            ));
        };
        visit(ctx, &dep)?;
    }

    ctx.path.pop();
    ctx.done.insert(name.to_string());
    Ok(())
}

/// `a -> b -> a` from the GRAY path and the bundle that closed the loop
pub(super) fn cycle_chain(path: &[String], repeated: &str) -> String {
    let start = path.iter().position(|n| n == repeated).unwrap_or(0);
    let mut chain: Vec<&str> = path[start..].iter().map(String::as_str).collect();
    chain.push(repeated);
    chain.join(" -> ")
}
