//! Reply-thread assembly
//!
//! Replies reference their parent by id and can nest arbitrarily deep, but
//! the forum renders at most two levels. This module flattens a post's full
//! reply list into that presentation shape: the top-level replies, plus the
//! descendants of each top-level reply collected under its id in
//! chronological order.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::models::Reply;

/// Two-level presentation of a post's replies
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadView {
    /// Replies with no effective parent, oldest first
    pub top_level: Vec<Reply>,
    /// Descendants keyed by their effective top-level ancestor, oldest first
    pub children: HashMap<Uuid, Vec<Reply>>,
}

/// Flatten a post's unordered reply list into a [`ThreadView`]
///
/// A reply with no parent is top-level. A reply whose parent is top-level
/// attaches under that parent. A reply whose parent is itself nested walks
/// the parent chain upward and attaches under the top-level ancestor, so
/// deeper nesting collapses into one level. A reply citing a parent id
/// that is not in the set is promoted to top level.
pub fn assemble(mut replies: Vec<Reply>) -> ThreadView {
    replies.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let parents: HashMap<Uuid, Option<Uuid>> = replies
        .iter()
        .map(|reply| (reply.id, reply.parent_reply_id))
        .collect();

    let mut top_level = Vec::new();
    let mut children: HashMap<Uuid, Vec<Reply>> = HashMap::new();

    for reply in replies {
        match reply.parent_reply_id {
            Some(parent_id) if parents.contains_key(&parent_id) => {
                match effective_ancestor(parent_id, &parents) {
                    Some(ancestor) => children.entry(ancestor).or_default().push(reply),
                    // Corrupt parent chain (cycle): degrade to top level
                    // rather than dropping the reply.
                    None => top_level.push(reply),
                }
            }
            _ => top_level.push(reply),
        }
    }

    ThreadView {
        top_level,
        children,
    }
}

/// Walk the parent chain upward from `current` until a top-level reply is
/// reached. A reply whose parent is missing from the set counts as top
/// level. Returns `None` if the chain never terminates (a cycle).
fn effective_ancestor(mut current: Uuid, parents: &HashMap<Uuid, Option<Uuid>>) -> Option<Uuid> {
    for _ in 0..parents.len() {
        match parents.get(&current) {
            Some(Some(parent)) if parents.contains_key(parent) => current = *parent,
            _ => return Some(current),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reply(id: Uuid, parent: Option<Uuid>, seconds: i64) -> Reply {
        Reply {
            id,
            post_id: Uuid::nil(),
            author_id: "user-1".to_string(),
            parent_reply_id: parent,
            body: "body".to_string(),
            is_solution: false,
            upvotes: 0,
            downvotes: 0,
            created_at: Utc.timestamp_opt(seconds, 0).unwrap(),
        }
    }

    fn ids(replies: &[Reply]) -> Vec<Uuid> {
        replies.iter().map(|r| r.id).collect()
    }

    #[test]
    fn nested_chain_flattens_under_top_level_ancestor() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let view = assemble(vec![
            reply(a, None, 1),
            reply(b, Some(a), 2),
            reply(c, Some(b), 3),
        ]);

        assert_eq!(ids(&view.top_level), vec![a]);
        assert_eq!(ids(&view.children[&a]), vec![b, c]);
    }

    #[test]
    fn direct_children_attach_under_their_parent() {
        let (a, b, x, y) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let view = assemble(vec![
            reply(a, None, 1),
            reply(b, None, 2),
            reply(x, Some(a), 3),
            reply(y, Some(b), 4),
        ]);

        assert_eq!(ids(&view.top_level), vec![a, b]);
        assert_eq!(ids(&view.children[&a]), vec![x]);
        assert_eq!(ids(&view.children[&b]), vec![y]);
    }

    #[test]
    fn buckets_are_chronological_regardless_of_input_order() {
        let (a, x, y, z) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let view = assemble(vec![
            reply(z, Some(a), 30),
            reply(a, None, 1),
            reply(y, Some(a), 20),
            reply(x, Some(a), 10),
        ]);

        assert_eq!(ids(&view.children[&a]), vec![x, y, z]);
    }

    #[test]
    fn unknown_parent_is_promoted_to_top_level() {
        let (a, orphan) = (Uuid::new_v4(), Uuid::new_v4());
        let view = assemble(vec![
            reply(a, None, 1),
            reply(orphan, Some(Uuid::new_v4()), 2),
        ]);

        assert_eq!(ids(&view.top_level), vec![a, orphan]);
        assert!(view.children.is_empty());
    }

    #[test]
    fn grandchild_of_orphaned_parent_buckets_under_the_orphan() {
        // The orphan becomes effectively top-level, so its child lands in
        // the orphan's bucket.
        let (orphan, child) = (Uuid::new_v4(), Uuid::new_v4());
        let view = assemble(vec![
            reply(orphan, Some(Uuid::new_v4()), 1),
            reply(child, Some(orphan), 2),
        ]);

        assert_eq!(ids(&view.top_level), vec![orphan]);
        assert_eq!(ids(&view.children[&orphan]), vec![child]);
    }

    #[test]
    fn cyclic_parent_chain_degrades_to_top_level() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let view = assemble(vec![reply(a, Some(b), 1), reply(b, Some(a), 2)]);

        // Nothing is lost and nothing loops forever.
        assert_eq!(view.top_level.len() + view.children.values().map(Vec::len).sum::<usize>(), 2);
    }

    #[test]
    fn every_reply_lands_in_exactly_one_bucket() {
        let top: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let mut replies = Vec::new();
        let mut t = 0;
        for &root in &top {
            t += 1;
            replies.push(reply(root, None, t));
            let mut parent = root;
            // A five-deep chain under each root.
            for _ in 0..5 {
                let id = Uuid::new_v4();
                t += 1;
                replies.push(reply(id, Some(parent), t));
                parent = id;
            }
        }

        let total = replies.len();
        let view = assemble(replies);
        let bucketed: usize = view.children.values().map(Vec::len).sum();
        assert_eq!(view.top_level.len() + bucketed, total);
        assert_eq!(view.top_level.len(), 3);
        for root in top {
            assert_eq!(view.children[&root].len(), 5);
        }
    }
}
