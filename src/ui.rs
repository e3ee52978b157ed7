use colored::Colorize;
use resgraph::ResourceState;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

// ============================================================================
// Resource Formatting
// ============================================================================

/// Short `type name` label for a resource, falling back to the raw URN
pub fn resource_label(res: &ResourceState) -> String {
    match (res.urn.resource_type(), res.urn.name()) {
        (Some(resource_type), Some(name)) => format!("{} {}", resource_type, name),
        _ => res.urn.to_string(),
    }
}

/// Attribute tags shown next to a resource
pub fn resource_tags(res: &ResourceState) -> Vec<&'static str> {
    let mut tags = Vec::new();
    if res.protect {
        tags.push("protected");
    }
    if res.is_component() {
        tags.push("component");
    }
    if res.urn.is_provider() {
        tags.push("provider");
    }
    tags
}

/// Print one resource line with its tags
pub fn resource(symbol: &str, res: &ResourceState) {
    let tags = resource_tags(res);
    let suffix = if tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", tags.join(", "))
    };
    println!("  {} {}{}", symbol, resource_label(res), suffix.dimmed());
}

/// "1 resource" / "3 resources"
pub fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

// ============================================================================
// Tests
// ============================================================================
