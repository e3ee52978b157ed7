// Destroy planning
pub mod destroy;

// Graph inspection
pub mod protected;
pub mod query;

use anyhow::Result;
use resgraph::Urn;
use serde::Serialize;

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Turn a raw command-line URN into a typed one, warning on odd shapes
pub fn parse_urn(raw: &str) -> Urn {
    let urn = Urn::from(raw);
    if !urn.is_valid() {
        log::warn!("'{}' does not look like a resource URN", urn);
    }
    urn
}

/// [`parse_urn`] over repeated arguments
pub fn parse_urns<'s>(raw: impl IntoIterator<Item = &'s String>) -> Vec<Urn> {
    raw.into_iter().map(|s| parse_urn(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_urns_keeps_order() {
        let raw = vec![
            "urn:pulumi:dev::app::aws:s3/bucket:Bucket::b".to_string(),
            "not-a-urn".to_string(),
        ];
        let urns = parse_urns(&raw);
        assert_eq!(urns.len(), 2);
        assert_eq!(urns[0].as_str(), "urn:pulumi:dev::app::aws:s3/bucket:Bucket::b");
        assert_eq!(urns[1].as_str(), "not-a-urn");
    }

    #[test]
    fn test_parse_urn_keeps_malformed_input() {
        let urn = parse_urn("not-a-urn");
        assert!(!urn.is_valid());
        assert_eq!(urn.as_str(), "not-a-urn");
    }
}
