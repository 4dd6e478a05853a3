//! Quoted-excerpt composition for nested replies
//!
//! Thread assembly flattens deep nesting into two display levels, which
//! loses the visual link between a reply and its nested target. Replying
//! to a nested reply therefore prefixes the new body with a quoted excerpt
//! of the target: `@author:` on the first line, the excerpt on a `> ` line,
//! a blank line, then the new text. The excerpt carries no id-level link to
//! the quoted reply.

/// Maximum excerpt length in characters before truncation
pub const MAX_QUOTE_LENGTH: usize = 120;

const ELLIPSIS: char = '…';

/// Build the stored body for a reply to a nested reply
pub fn compose_reply_body(parent_author: &str, parent_body: &str, text: &str) -> String {
    let excerpt = truncate_excerpt(authored_text(parent_body));
    format!("@{}:\n> {}\n\n{}", parent_author, excerpt, text)
}

/// Return the text the target's author actually wrote
///
/// A body produced by an earlier composition starts with an `@name:` line
/// followed by `> ` lines; that block and the blank separator are stripped
/// so quotes never compound across a reply chain.
fn authored_text(body: &str) -> &str {
    let mut lines = body.split_inclusive('\n');
    let Some(header) = lines.next() else {
        return body;
    };
    if !is_quote_header(header) {
        return body;
    }

    let mut offset = header.len();
    let mut saw_quote_line = false;
    for line in lines {
        let trimmed = line.trim();
        if trimmed.starts_with('>') {
            saw_quote_line = true;
            offset += line.len();
        } else if trimmed.is_empty() && saw_quote_line {
            offset += line.len();
        } else {
            break;
        }
    }

    if saw_quote_line {
        &body[offset..]
    } else {
        body
    }
}

fn is_quote_header(line: &str) -> bool {
    let line = line.trim_end();
    line.len() > 2 && line.starts_with('@') && line.ends_with(':')
}

/// Collapse the excerpt onto one line and cap its length
///
/// Truncation counts characters, not bytes, so multibyte text never splits
/// mid-character.
fn truncate_excerpt(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX_QUOTE_LENGTH {
        flat
    } else {
        let mut excerpt: String = flat.chars().take(MAX_QUOTE_LENGTH).collect();
        excerpt.push(ELLIPSIS);
        excerpt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_author_quote_and_text() {
        let body = compose_reply_body("alice", "the original point", "I agree");
        assert_eq!(body, "@alice:\n> the original point\n\nI agree");
    }

    #[test]
    fn long_excerpts_are_truncated_with_ellipsis() {
        let long = "x".repeat(MAX_QUOTE_LENGTH + 40);
        let body = compose_reply_body("bob", &long, "reply");

        let quote_line = body.lines().nth(1).unwrap();
        let quoted = quote_line.strip_prefix("> ").unwrap();
        assert_eq!(quoted.chars().count(), MAX_QUOTE_LENGTH + 1);
        assert!(quoted.ends_with('…'));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let long = "é".repeat(MAX_QUOTE_LENGTH + 10);
        let body = compose_reply_body("bob", &long, "reply");
        let quoted = body.lines().nth(1).unwrap().strip_prefix("> ").unwrap();
        assert_eq!(quoted.chars().count(), MAX_QUOTE_LENGTH + 1);
    }

    #[test]
    fn short_excerpts_are_left_alone() {
        let body = compose_reply_body("carol", "short", "ok");
        assert!(body.contains("> short\n"));
        assert!(!body.contains('…'));
    }

    #[test]
    fn requoting_never_nests_quotes() {
        let first = compose_reply_body("alice", "the original point", "my response to alice");
        let second = compose_reply_body("bob", &first, "and my response to bob");

        // Only bob's own words are quoted, not alice's quoted excerpt.
        assert_eq!(second, "@bob:\n> my response to alice\n\nand my response to bob");
        assert_eq!(second.matches("> ").count(), 1);
    }

    #[test]
    fn multiline_bodies_collapse_onto_one_quote_line() {
        let body = compose_reply_body("dave", "first line\nsecond line", "ack");
        assert_eq!(body, "@dave:\n> first line second line\n\nack");
    }

    #[test]
    fn at_mention_without_quote_lines_is_not_a_quote_block() {
        // A body that merely starts with "@someone:" but has no "> " line
        // was written by hand; quote it verbatim.
        let target = "@alice: you around?\nping";
        let body = compose_reply_body("erin", target, "yes");
        assert_eq!(body, "@erin:\n> @alice: you around? ping\n\nyes");
    }

    #[test]
    fn quoting_a_quote_only_body_yields_an_empty_excerpt() {
        let target = "@alice:\n> something\n\n";
        let body = compose_reply_body("bob", target, "hm");
        assert_eq!(body, "@bob:\n> \n\nhm");
    }
}
