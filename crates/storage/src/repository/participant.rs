use crate::error::{Result, StorageError};
use crate::keys;
use crate::kv::KvStore;
use crate::models::Participant;

/// Registry of participants who linked their Strava account.
pub struct ParticipantRepository<'a> {
    kv: &'a dyn KvStore,
}

impl<'a> ParticipantRepository<'a> {
    pub fn new(kv: &'a dyn KvStore) -> Self {
        Self { kv }
    }

    /// All registered participants, ordered by Strava id
    pub async fn list(&self) -> Result<Vec<Participant>> {
        let mut ids: Vec<u64> = self
            .kv
            .smembers(keys::PARTICIPANT_IDS)
            .await?
            .iter()
            .filter_map(|id| match id.parse() {
                Ok(id) => Some(id),
                Err(_) => {
                    tracing::warn!("Ignoring malformed participant id '{}'", id);
                    None
                }
            })
            .collect();

        if ids.is_empty() {
            return Ok(Vec::new());
        }
        ids.sort_unstable();

        let participant_keys: Vec<String> = ids.iter().map(|id| keys::participant(*id)).collect();
        let raw = self.kv.mget(&participant_keys).await?;

        let mut participants = Vec::with_capacity(raw.len());
        for (id, value) in ids.iter().zip(raw) {
            match value {
                Some(json) => participants.push(serde_json::from_str(&json)?),
                None => tracing::warn!("Participant {} is listed but has no record", id),
            }
        }

        Ok(participants)
    }

    pub async fn find(&self, strava_id: u64) -> Result<Participant> {
        let json = self
            .kv
            .get(&keys::participant(strava_id))
            .await?
            .ok_or(StorageError::NotFound)?;

        Ok(serde_json::from_str(&json)?)
    }

    /// Inserts or replaces a participant record
    pub async fn save(&self, participant: &Participant) -> Result<()> {
        let json = serde_json::to_string(participant)?;
        self.kv
            .set(&keys::participant(participant.strava_id), &json, None)
            .await?;
        self.kv
            .sadd(keys::PARTICIPANT_IDS, &participant.strava_id.to_string())
            .await?;

        tracing::info!("Saved participant {}", participant.strava_id);
        Ok(())
    }
}
