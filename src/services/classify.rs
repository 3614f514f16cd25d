use super::retry::{with_retry, RetryPolicy};
use crate::gateway::{GatewayError, TokenGateway};
use std::collections::HashMap;

/// Flag batches kept in flight at once.
pub const BATCHES_IN_FLIGHT: usize = 4;

/// Looks up executable flags for `owners` in gateway-sized batches.
///
/// Each batch carries its own retry budget, so a failed batch is re-fetched
/// alone and batches that already answered are kept. Owners without an
/// account are left out of the map.
pub async fn classify_owners<G>(
    gateway: &G,
    owners: &[String],
    retry: &RetryPolicy,
) -> Result<HashMap<String, bool>, GatewayError>
where
    G: TokenGateway + ?Sized,
{
    let chunk_size = gateway.flag_batch_size().max(1);
    let mut flags = HashMap::with_capacity(owners.len());

    for (round, group) in owners.chunks(chunk_size * BATCHES_IN_FLIGHT).enumerate() {
        let futures: Vec<_> = group
            .chunks(chunk_size)
            .map(|chunk| with_retry(retry, "getMultipleAccounts", move || gateway.get_executable_flags(chunk)))
            .collect();

        let calls = futures.len();
        let results = futures::future::join_all(futures).await;
        tracing::info!(
            "Processing batch {}: {} accounts total ({} RPC calls)",
            round + 1,
            group.len(),
            calls
        );

        for result in results {
            flags.extend(result?);
        }
    }

    let programs = flags.values().filter(|&&executable| executable).count();
    tracing::info!("Classified {} owners ({} program accounts)", flags.len(), programs);
    Ok(flags)
}
