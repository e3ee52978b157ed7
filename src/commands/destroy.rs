use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use resgraph::{DestroyPlan, DestroyRequest, PlanMode, Urn, plan_destroy};
use serde::Serialize;

use crate::Context;
use crate::cli::DestroyArgs;
use crate::commands::{parse_urns, print_json};
use crate::snapshot;
use crate::ui;

/// Machine-readable destroy plan
#[derive(Debug, Serialize)]
pub struct DestroyReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub stack: Option<&'a str>,
    pub mode: PlanMode,
    /// URNs in deletion order
    pub deletes: Vec<&'a Urn>,
    pub kept: Vec<&'a Urn>,
}

impl<'a> DestroyReport<'a> {
    pub fn new(stack: Option<&'a str>, plan: &DestroyPlan<'a>) -> Self {
        Self {
            generated_at: Utc::now(),
            stack,
            mode: plan.mode,
            deletes: plan.deletes.iter().map(|r| &r.urn).collect(),
            kept: plan.kept.iter().map(|r| &r.urn).collect(),
        }
    }
}

/// Build the request from flags, falling back to config defaults
pub fn build_request(args: &DestroyArgs, ctx: &Context) -> DestroyRequest {
    DestroyRequest {
        targets: parse_urns(&args.targets),
        target_dependents: args.target_dependents || ctx.config.target_dependents,
        exclude_protected: args.exclude_protected,
    }
}

/// Message for a plan with nothing to delete
pub fn empty_plan_message(plan: &DestroyPlan<'_>) -> String {
    if plan.mode == PlanMode::ExcludeProtected && !plan.kept.is_empty() {
        format!(
            "There were no unprotected resources to destroy. There are still {} protected \
             resources associated with this stack.",
            plan.kept.len()
        )
    } else {
        "There are no resources to destroy.".to_string()
    }
}

pub fn run(ctx: &Context, args: DestroyArgs) -> Result<()> {
    let request = build_request(&args, ctx);

    // Reject impossible flag combinations before touching the snapshot
    request.validate()?;

    let snapshot = ctx.load_snapshot()?;
    let plan = plan_destroy(&snapshot.resources, &request)?;
    let stack = snapshot::stack_name(&snapshot);

    if args.output.json || ctx.config.json {
        return print_json(&DestroyReport::new(stack, &plan));
    }

    if ctx.quiet {
        for urn in plan.delete_urns() {
            println!("{}", urn);
        }
        return Ok(());
    }

    if plan.is_empty() {
        ui::info(&empty_plan_message(&plan));
        return Ok(());
    }

    ui::header(&format!("Destroy plan for stack {}", stack.unwrap_or("<unknown>")));

    ui::section("Delete (in order)");
    for res in &plan.deletes {
        ui::resource(&"-".red().to_string(), res);
        if ctx.verbose > 0 {
            ui::dim(res.urn.as_str());
        }
    }

    if !plan.kept.is_empty() {
        ui::section("Keep");
        for res in &plan.kept {
            ui::resource(&"=".yellow().to_string(), res);
            if ctx.verbose > 0 {
                ui::dim(res.urn.as_str());
            }
        }
    }

    println!();
    ui::success(&format!(
        "{} would be deleted",
        ui::count(plan.deletes.len(), "resource")
    ));
    if !plan.kept.is_empty() {
        ui::warn(&format!(
            "{} protected resources will be kept.",
            plan.kept.len()
        ));
    }

    Ok(())
}
