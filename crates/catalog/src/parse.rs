use anyhow::{Context, bail};

use crate::types::Frontmatter;

/// A parsed skill document: open frontmatter mapping plus markdown body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillDocument {
    pub frontmatter: Frontmatter,
    pub body: String,
}

/// Split SKILL.md content at `---` delimiters into (frontmatter, body).
pub fn split_frontmatter(content: &str) -> anyhow::Result<(String, String)> {
    let trimmed = content.trim_start();
    if !trimmed.starts_with("---") {
        bail!("SKILL.md must start with YAML frontmatter delimited by ---");
    }

    // Skip the opening ---
    let after_open = &trimmed[3..];
    let close_pos = after_open
        .find("\n---")
        .context("SKILL.md missing closing --- for frontmatter")?;

    let frontmatter = after_open[..close_pos].trim().to_string();
    let body = after_open[close_pos + 4..].trim().to_string();
    Ok((frontmatter, body))
}

/// Parse a SKILL.md into an open frontmatter map and body text.
///
/// The internal `_excerpt` key is stripped; everything else is carried
/// through untyped so new frontmatter vocabularies never break discovery.
pub fn parse_document(content: &str) -> anyhow::Result<SkillDocument> {
    let (raw_frontmatter, body) = split_frontmatter(content)?;
    let mut frontmatter: Frontmatter = if raw_frontmatter.is_empty() {
        Frontmatter::new()
    } else {
        serde_yaml::from_str(&raw_frontmatter).context("invalid SKILL.md frontmatter")?
    };
    frontmatter.remove("_excerpt");
    Ok(SkillDocument { frontmatter, body })
}

/// Append a source URL to the `_from` provenance array in a SKILL.md's
/// frontmatter, returning the rewritten document. Existing entries are kept
/// and duplicates are not added.
pub fn append_provenance(content: &str, source_url: &str) -> anyhow::Result<String> {
    let (raw_frontmatter, body) = split_frontmatter(content)?;
    let mut mapping: serde_yaml::Mapping = if raw_frontmatter.is_empty() {
        serde_yaml::Mapping::new()
    } else {
        serde_yaml::from_str(&raw_frontmatter).context("invalid SKILL.md frontmatter")?
    };

    let key = serde_yaml::Value::String("_from".into());
    let mut from = match mapping.remove(&key) {
        Some(serde_yaml::Value::Sequence(seq)) => seq,
        Some(serde_yaml::Value::Null) | None => Vec::new(),
        // Scalar `_from` becomes a one-element list.
        Some(other) => vec![other],
    };
    let url = serde_yaml::Value::String(source_url.into());
    if !from.contains(&url) {
        from.push(url);
    }
    mapping.insert(key, serde_yaml::Value::Sequence(from));

    let frontmatter = serde_yaml::to_string(&mapping)?;
    Ok(format!("---\n{frontmatter}---\n\n{body}\n"))
}
