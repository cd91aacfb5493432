use std::collections::HashSet;

use crate::model::SupplyReport;

impl SupplyReport {
    /// Circulating supply from the minted total and the burn address holdings.
    ///
    /// This is arithmetic, not a set diff. Holdings larger than the total
    /// yield a negative circulating figure instead of an error.
    pub fn compute<I, S>(total_supply: u64, burn_token_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: HashSet<String> = burn_token_ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .collect();
        let burned_tokens = distinct.len() as u64;

        let circulating_supply = i64::try_from(total_supply)
            .unwrap_or(i64::MAX)
            .saturating_sub(i64::try_from(burned_tokens).unwrap_or(i64::MAX));
        let burn_percentage = if total_supply == 0 {
            None
        } else {
            Some(burned_tokens as f64 * 100.0 / total_supply as f64)
        };

        Self {
            total_supply,
            burned_tokens,
            circulating_supply,
            burn_percentage,
        }
    }
}
