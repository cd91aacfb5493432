use std::collections::HashMap;

use nftledger_core::EventTransfer;

use crate::model::AddressTokens;

/// Group transfers by recipient. Addresses keep first-seen order and each
/// address lists its distinct token ids in first-seen order.
pub fn group_transfers<'a, I>(transfers: I) -> Vec<AddressTokens>
where
    I: IntoIterator<Item = &'a EventTransfer>,
{
    let mut groups: Vec<AddressTokens> = Vec::new();
    let mut slot: HashMap<&'a str, usize> = HashMap::new();

    for t in transfers {
        let i = *slot.entry(t.to.as_str()).or_insert_with(|| {
            groups.push(AddressTokens {
                address: t.to.clone(),
                token_count: 0,
                tokens: Vec::new(),
            });
            groups.len() - 1
        });
        let group = &mut groups[i];
        if !group.tokens.contains(&t.token_id) {
            group.tokens.push(t.token_id.clone());
            group.token_count += 1;
        }
    }
    groups
}

/// Top `n` groups by token count. Ties keep first-seen order.
pub fn top_by_count(groups: &[AddressTokens], n: usize) -> Vec<&AddressTokens> {
    let mut ranked: Vec<&AddressTokens> = groups.iter().collect();
    ranked.sort_by(|a, b| b.token_count.cmp(&a.token_count));
    ranked.truncate(n);
    ranked
}
