use pagegraph_common::{CooccurrencePair, PageRef};

/// Every unordered pair of distinct ids, each oriented `a_id < b_id`.
///
/// Ids are sorted and deduplicated first, so N distinct ids yield exactly
/// N·(N−1)/2 pairs. Fewer than two ids yield none.
pub fn derive_pairs<'a>(
    ids: impl IntoIterator<Item = &'a str>,
    page_ref: &PageRef,
) -> Vec<CooccurrencePair> {
    let mut ids: Vec<&str> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let reference = page_ref.encode();
    let mut pairs = Vec::with_capacity(ids.len() * ids.len().saturating_sub(1) / 2);

    for (i, a) in ids.iter().enumerate() {
        for b in &ids[i + 1..] {
            pairs.push(CooccurrencePair {
                a_id: a.to_string(),
                b_id: b.to_string(),
                reference: reference.clone(),
            });
        }
    }

    pairs
}
