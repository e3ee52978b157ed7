use anyhow::{Context as _, Result};
use resgraph::{DependencyGraph, ResourceState, Urn};
use serde::Serialize;
use std::collections::HashSet;

use crate::Context;
use crate::cli::{DependenciesArgs, DependentsArgs};
use crate::commands::{parse_urn, parse_urns, print_json};
use crate::ui;

/// Result of a single-resource graph query
#[derive(Debug, Serialize)]
pub struct QueryReport<'a> {
    pub urn: &'a Urn,
    pub relation: &'static str,
    pub resources: Vec<&'a Urn>,
}

/// Every resource that depends on `urn`, in snapshot order
pub fn find_dependents<'a>(
    resources: &'a [ResourceState],
    urn: &Urn,
    ignore: &HashSet<Urn>,
    include_children: bool,
) -> Result<Vec<&'a ResourceState>> {
    let graph = DependencyGraph::new(resources);
    graph
        .depending_on_urn(urn, ignore, include_children)
        .with_context(|| format!("Failed to find dependents of {}", urn))
}

/// Everything `urn` depends on, in snapshot order
pub fn find_dependencies<'a>(
    resources: &'a [ResourceState],
    urn: &Urn,
) -> Result<Vec<&'a ResourceState>> {
    let graph = DependencyGraph::new(resources);
    let set = graph
        .dependencies_of_urn(urn)
        .with_context(|| format!("Failed to find dependencies of {}", urn))?;

    let members = set.urns();
    Ok(resources
        .iter()
        .filter(|res| members.contains(&res.urn))
        .collect())
}

pub fn dependents(ctx: &Context, args: DependentsArgs) -> Result<()> {
    let urn = parse_urn(&args.urn);
    let ignore: HashSet<Urn> = parse_urns(&args.ignore).into_iter().collect();

    let snapshot = ctx.load_snapshot()?;
    let found = find_dependents(&snapshot.resources, &urn, &ignore, args.include_children)?;

    report(ctx, args.output.json, &urn, "dependents", &found)
}

pub fn dependencies(ctx: &Context, args: DependenciesArgs) -> Result<()> {
    let urn = parse_urn(&args.urn);

    let snapshot = ctx.load_snapshot()?;
    let found = find_dependencies(&snapshot.resources, &urn)?;

    report(ctx, args.output.json, &urn, "dependencies", &found)
}

fn report(
    ctx: &Context,
    json: bool,
    urn: &Urn,
    relation: &'static str,
    found: &[&ResourceState],
) -> Result<()> {
    if json || ctx.config.json {
        return print_json(&QueryReport {
            urn,
            relation,
            resources: found.iter().map(|r| &r.urn).collect(),
        });
    }

    if ctx.quiet {
        for res in found {
            println!("{}", res.urn);
        }
        return Ok(());
    }

    ui::header(&format!("{} of {}", capitalize(relation), urn));
    if found.is_empty() {
        ui::dim(&format!("No {}", relation));
        return Ok(());
    }

    for res in found {
        ui::resource("•", res);
        if ctx.verbose > 0 {
            ui::dim(res.urn.as_str());
        }
    }

    println!();
    ui::info(&ui::count(found.len(), "resource"));
    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urn(name: &str) -> Urn {
        Urn::new(format!("urn:pulumi:dev::app::aws:ec2/instance:Instance::{name}"))
    }

    fn stack() -> Vec<ResourceState> {
        let vpc = ResourceState::new(urn("vpc"));
        let mut subnet = ResourceState::new(urn("subnet"));
        subnet.dependencies = vec![vpc.urn.clone()];
        let mut web = ResourceState::new(urn("web"));
        web.dependencies = vec![subnet.urn.clone()];
        let mut tag = ResourceState::new(urn("tag"));
        tag.parent = Some(vpc.urn.clone());
        vec![vpc, subnet, web, tag]
    }

    fn names(found: &[&ResourceState]) -> Vec<String> {
        found
            .iter()
            .filter_map(|r| r.urn.name().map(ToString::to_string))
            .collect()
    }

    #[test]
    fn test_find_dependents() {
        let resources = stack();
        let found = find_dependents(&resources, &urn("vpc"), &HashSet::new(), false).unwrap();
        assert_eq!(names(&found), vec!["subnet", "web"]);
    }

    #[test]
    fn test_find_dependents_with_children_and_ignore() {
        let resources = stack();
        let ignore: HashSet<Urn> = [urn("subnet")].into_iter().collect();

        let found = find_dependents(&resources, &urn("vpc"), &ignore, true).unwrap();
        assert_eq!(names(&found), vec!["tag"]);
    }

    #[test]
    fn test_find_dependencies() {
        let resources = stack();
        let found = find_dependencies(&resources, &urn("web")).unwrap();
        assert_eq!(names(&found), vec!["subnet"]);
    }

    #[test]
    fn test_find_dependencies_in_snapshot_order() {
        let resources = stack();
        let mut late = ResourceState::new(urn("late"));
        late.dependencies = vec![urn("web"), urn("vpc"), urn("subnet")];
        let resources: Vec<ResourceState> = resources.into_iter().chain([late]).collect();

        let found = find_dependencies(&resources, &urn("late")).unwrap();
        assert_eq!(names(&found), vec!["vpc", "subnet", "web"]);
    }

    #[test]
    fn test_unknown_urn_is_error() {
        let resources = stack();
        let err = find_dependencies(&resources, &urn("ghost")).unwrap_err();
        assert!(err.to_string().contains("Failed to find dependencies"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("dependents"), "Dependents");
        assert_eq!(capitalize(""), "");
    }
}
