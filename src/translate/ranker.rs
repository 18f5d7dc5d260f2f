// src/translate/ranker.rs
//! Entity selection: one representative per category first, then fill by mentions.
//!
//! Order of operations:
//! 1) group by category (groups keep first-appearance order),
//! 2) per group pick the entity with the most mentions (first seen wins ties),
//! 3) order groups by descending size, take `count` representatives,
//! 4) if short, fill from the remaining entities by descending mentions,
//! 5) drop repeated names, keeping the first occurrence.
//!
//! All sorts are stable, so the analysis service's return order is the tie-break.

use std::collections::HashSet;

use crate::remote::{Entity, EntityType};

/// Pure selection over entities already returned by the analysis service.
pub fn select_entities(entities: &[Entity], count: usize) -> Vec<Entity> {
    if count == 0 || entities.is_empty() {
        return Vec::new();
    }

    // (category, member indices) in first-appearance order.
    let mut groups: Vec<(&EntityType, Vec<usize>)> = Vec::new();
    for (idx, e) in entities.iter().enumerate() {
        match groups.iter_mut().find(|(t, _)| **t == e.entity_type) {
            Some((_, members)) => members.push(idx),
            None => groups.push((&e.entity_type, vec![idx])),
        }
    }

    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let mut picked: Vec<usize> = groups
        .iter()
        .map(|(_, members)| most_mentioned(entities, members))
        .take(count)
        .collect();

    if picked.len() < count {
        let mut rest: Vec<usize> = (0..entities.len())
            .filter(|i| !picked.contains(i))
            .collect();
        rest.sort_by(|&a, &b| entities[b].mention_count.cmp(&entities[a].mention_count));
        let missing = count - picked.len();
        picked.extend(rest.into_iter().take(missing));
    }

    dedup_by_name(picked.into_iter().map(|i| entities[i].clone()))
}

/// Index of the member with the highest mention count; earliest on ties.
fn most_mentioned(entities: &[Entity], members: &[usize]) -> usize {
    let mut best = members[0];
    for &i in &members[1..] {
        if entities[i].mention_count > entities[best].mention_count {
            best = i;
        }
    }
    best
}

pub fn dedup_by_name(entities: impl IntoIterator<Item = Entity>) -> Vec<Entity> {
    let mut seen = HashSet::new();
    entities
        .into_iter()
        .filter(|e| seen.insert(e.name.clone()))
        .collect()
}
