//! Variant-tag parsing and selection.
//!
//! Source basenames may carry a trailing variant tag, `name<tag>`, selecting
//! the file for a specific user, host, or user@host combination. This module
//! owns the delimiter convention: it parses basenames into [`Variant`]s,
//! classifies each tag against the active username/hostname, and picks the
//! winning variant per base name. Pure string logic — no I/O, no environment
//! queries.

/// How precisely a variant tag matches the active context.
///
/// The derived ordering encodes the precedence ladder:
/// `user@host` > `user` > `host` > untagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Specificity {
    /// No tag at all — matches every context.
    Untagged,
    /// Tag equals the active hostname.
    Host,
    /// Tag equals the active username.
    User,
    /// Tag equals `username@hostname` exactly.
    UserHost,
}

/// A basename parsed into its base identity and tag classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// The raw basename as found in the source tree.
    pub name: String,
    /// Basename with the tag stripped — the destination name and the
    /// identity used to group sibling variants.
    pub base: String,
    /// Raw tag content, if a tag was present. May be empty (`name<>`).
    pub tag: Option<String>,
    /// Match tier against the active context, or `None` when the tag names
    /// some other user/host and the entry must not be deployed.
    pub specificity: Option<Specificity>,
}

/// Split a trailing `<tag>` off a basename.
///
/// The tag starts at the last `<` and the closing `>` must be the final
/// character; the base must be non-empty. Anything else is a plain name.
/// `name<>` yields an empty (present) tag.
#[must_use]
pub fn split_tag(name: &str) -> (&str, Option<&str>) {
    if let Some(stripped) = name.strip_suffix('>')
        && let Some(open) = stripped.rfind('<')
        && open > 0
    {
        let (base, rest) = stripped.split_at(open);
        // rest starts with the '<' delimiter
        return (base, rest.get(1..));
    }
    (name, None)
}

/// Parse `name` and classify its tag against the active context.
///
/// A tag is active when it equals the username, the hostname, or
/// `username@hostname` (exact, case-sensitive). An absent tag is always
/// active at the lowest tier. A present-but-empty tag matches nothing.
#[must_use]
pub fn resolve(name: &str, username: &str, hostname: &str) -> Variant {
    let (base, tag) = split_tag(name);
    let specificity = match tag {
        None => Some(Specificity::Untagged),
        Some(t) => classify(t, username, hostname),
    };
    Variant {
        name: name.to_owned(),
        base: base.to_owned(),
        tag: tag.map(str::to_owned),
        specificity,
    }
}

/// Classify a present tag, or `None` when it matches neither user nor host.
fn classify(tag: &str, username: &str, hostname: &str) -> Option<Specificity> {
    if let Some((user, host)) = tag.split_once('@') {
        return (user == username && host == hostname).then_some(Specificity::UserHost);
    }
    if tag == username {
        Some(Specificity::User)
    } else if tag == hostname {
        Some(Specificity::Host)
    } else {
        None
    }
}

/// Pick the single active variant with the highest specificity.
///
/// Returns `Ok(None)` when no variant is active for this context (the whole
/// group is skipped). Returns the competing variants as `Err` when two or
/// more are active at the winning tier — a configuration error the caller
/// must report rather than resolve arbitrarily.
///
/// # Errors
///
/// Returns the tied variants when the winning specificity tier holds more
/// than one active entry.
pub fn select(variants: &[Variant]) -> Result<Option<&Variant>, Vec<&Variant>> {
    let Some(top) = variants.iter().filter_map(|v| v.specificity).max() else {
        return Ok(None);
    };
    let mut winners = variants.iter().filter(|v| v.specificity == Some(top));
    let first = winners.next();
    if winners.next().is_some() {
        let tied: Vec<&Variant> = variants
            .iter()
            .filter(|v| v.specificity == Some(top))
            .collect();
        return Err(tied);
    }
    Ok(first)
}
