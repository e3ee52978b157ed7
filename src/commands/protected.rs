use anyhow::Result;
use colored::Colorize;
use resgraph::{Partition, ResourceState, Urn, separate_protected};
use serde::Serialize;

use crate::Context;
use crate::cli::OutputArgs;
use crate::commands::print_json;
use crate::ui;

/// Partition of a snapshot, with URNs sorted for stable output
#[derive(Debug, Serialize)]
pub struct PartitionReport<'a> {
    pub unprotected: Vec<&'a Urn>,
    pub protected: Vec<&'a Urn>,
}

impl<'a> PartitionReport<'a> {
    pub fn new(partition: &Partition<'a>) -> Self {
        Self {
            unprotected: sorted_urns(&partition.unprotected),
            protected: sorted_urns(&partition.protected),
        }
    }
}

fn sorted_urns<'a>(resources: &[&'a ResourceState]) -> Vec<&'a Urn> {
    let mut urns: Vec<&Urn> = resources.iter().map(|r| &r.urn).collect();
    urns.sort();
    urns
}

fn sorted<'a>(resources: &[&'a ResourceState]) -> Vec<&'a ResourceState> {
    let mut sorted = resources.to_vec();
    sorted.sort_by(|a, b| a.urn.cmp(&b.urn));
    sorted
}

pub fn run(ctx: &Context, args: OutputArgs) -> Result<()> {
    let snapshot = ctx.load_snapshot()?;
    let partition = separate_protected(&snapshot.resources);

    if args.json || ctx.config.json {
        return print_json(&PartitionReport::new(&partition));
    }

    if ctx.quiet {
        for urn in PartitionReport::new(&partition).protected {
            println!("{}", urn);
        }
        return Ok(());
    }

    ui::header("Protection");

    ui::section(&format!("Protected ({})", partition.protected.len()));
    for res in sorted(&partition.protected) {
        ui::resource(&"=".yellow().to_string(), res);
    }

    ui::section(&format!("Unprotected ({})", partition.unprotected.len()));
    for res in sorted(&partition.unprotected) {
        ui::resource(&"-".red().to_string(), res);
    }

    println!();
    if partition.unprotected.is_empty() && !partition.protected.is_empty() {
        ui::warn("Every resource in this stack is protected");
    } else {
        ui::info(&format!(
            "{} of {} can be destroyed with --exclude-protected",
            ui::count(partition.unprotected.len(), "resource"),
            partition.len()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_report_is_sorted() {
        let stack = ResourceState::new("urn:pulumi:dev::app::pulumi:pulumi:Stack::app-dev");
        let mut zeta = ResourceState::new("urn:pulumi:dev::app::aws:s3/bucket:Bucket::zeta");
        zeta.parent = Some(stack.urn.clone());
        zeta.protect = true;
        let mut alpha = ResourceState::new("urn:pulumi:dev::app::aws:s3/bucket:Bucket::alpha");
        alpha.parent = Some(stack.urn.clone());
        let resources = vec![stack, zeta, alpha];

        let partition = separate_protected(&resources);
        let report = PartitionReport::new(&partition);

        assert_eq!(
            report.protected,
            vec![
                &Urn::from("urn:pulumi:dev::app::aws:s3/bucket:Bucket::zeta"),
                &Urn::from("urn:pulumi:dev::app::pulumi:pulumi:Stack::app-dev"),
            ]
        );
        assert_eq!(
            report.unprotected,
            vec![&Urn::from("urn:pulumi:dev::app::aws:s3/bucket:Bucket::alpha")]
        );
    }
}
