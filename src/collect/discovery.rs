//! Apex-league player discovery.

use std::collections::HashSet;

use tracing::info;

use crate::models::LeagueList;
use crate::riot::{ApexTier, Platform, QueueType, RiotClient, RiotError};

/// Lists challenger, grandmaster and master for one queue on one platform.
pub struct LeagueDiscovery {
    client: RiotClient,
    platform: Platform,
    queue: QueueType,
}

impl LeagueDiscovery {
    pub fn new(client: RiotClient, platform: Platform, queue: QueueType) -> Self {
        Self {
            client,
            platform,
            queue,
        }
    }

    /// Unique player ids across the three apex leagues. A league that does
    /// not exist on the platform contributes nothing.
    pub async fn discover(&self) -> Result<HashSet<String>, RiotError> {
        let (challenger, grandmaster, master) = tokio::try_join!(
            self.client
                .league(ApexTier::Challenger, self.queue, self.platform),
            self.client
                .league(ApexTier::Grandmaster, self.queue, self.platform),
            self.client.league(ApexTier::Master, self.queue, self.platform),
        )?;

        for (tier, list) in ApexTier::ALL.into_iter().zip([&challenger, &grandmaster, &master]) {
            info!(
                platform = %self.platform,
                tier = %tier,
                players = list.as_ref().map(|l| l.entries.len()).unwrap_or(0),
                "League listed"
            );
        }

        let players = union_of([challenger, grandmaster, master]);
        info!(platform = %self.platform, players = players.len(), "Discovery complete");
        Ok(players)
    }
}

fn union_of(lists: impl IntoIterator<Item = Option<LeagueList>>) -> HashSet<String> {
    lists
        .into_iter()
        .flatten()
        .flat_map(|list| list.entries.into_iter().map(|entry| entry.puuid))
        .collect()
}
