// supply, balance

use nftledger_client::{OwnedTokenFilter, OwnedTokens};
use nftledger_core::{CollectionData, Fetcher, Record};
use nftledger_recon::SupplyReport;
use serde::Serialize;
use tracing::info;

use super::Context;
use crate::CliError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SupplyOutput<'a> {
    collection: &'a CollectionData,
    burn_address: &'a str,
    #[serde(flatten)]
    supply: &'a SupplyReport,
    burned_token_ids: Vec<&'a str>,
}

/// Circulating = minted total minus distinct tokens held by the burn address.
pub async fn cmd_supply(ctx: &Context, creator: &str, collection_name: &str) -> Result<(), CliError> {
    let client = ctx.client()?;
    let collection = client
        .collection_data(creator, collection_name)
        .await
        .map_err(CliError::client)?;
    info!(collection = %collection.collection_id, minted = collection.total_minted, "collection found");

    let burn_address = ctx.settings.burn_address.as_str();
    let filter = OwnedTokenFilter::owner(burn_address).in_collection(&collection.collection_id);
    let burned = Fetcher::new(ctx.fetch_options(None))
        .fetch_all(&OwnedTokens::new(&client, filter))
        .await
        .map_err(CliError::fetch)?
        .into_records();

    let report = SupplyReport::compute(collection.total_minted, burned.iter().map(Record::id));

    println!("Collection:  {}", collection.collection_name);
    println!("Address:     {}", collection.collection_id);
    println!("Total:       {}", report.total_supply);
    println!("Burned:      {}", report.burned_tokens);
    println!("Circulating: {}", report.circulating_supply);
    if let Some(pct) = report.burn_percentage {
        println!("Burn rate:   {:.2}%", pct);
    }
    if report.circulating_supply < 0 {
        println!("warning: burn address holds more tokens than were minted");
    }

    let output = SupplyOutput {
        collection: &collection,
        burn_address,
        supply: &report,
        burned_token_ids: burned.iter().map(Record::id).collect(),
    };
    let path = ctx
        .reports
        .write_json("collection-supply", &output)
        .map_err(CliError::file)?;
    println!("Saved: {}", path.display());
    Ok(())
}

pub async fn cmd_balance(ctx: &Context, address: &str, coin: &str) -> Result<(), CliError> {
    let client = ctx.client()?;
    let balance = client.account_balance(address, coin).await.map_err(CliError::client)?;

    println!("Account: {}", balance.address);
    println!("Coin:    {}", balance.coin_type);
    println!("Balance: {} ({} octas)", balance.apt, balance.octas);
    Ok(())
}
