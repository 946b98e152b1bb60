/// Number of individuals kept from a population of `population`. At least one
/// survives so reproduction always has a parent.
pub fn survivor_count(population: usize) -> usize {
    (population / 2).max(1)
}

/// Population indices ordered by descending score. Equal scores keep their
/// population order (`sort_by` is stable).
pub fn rank(scores: &[i64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].cmp(&scores[a]));
    order
}

/// Top `survivor_count` indices of the ranking.
pub fn select_survivors(scores: &[i64]) -> Vec<usize> {
    let mut ranked = rank(scores);
    ranked.truncate(survivor_count(scores.len()));
    ranked
}

/// Parent index for each slot of the next generation: survivors are reused
/// round-robin in rank order.
pub fn parent_slots(survivors: &[usize], population: usize) -> Vec<usize> {
    (0..population)
        .map(|i| survivors[i % survivors.len()])
        .collect()
}
