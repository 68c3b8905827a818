// Shared fixtures for the integration tests.
#![allow(dead_code)]

use serde_json::Value;
use vestige_toll::host::FLAG_SCOPE;
use vestige_toll::ledger::{self, EFFECTIVE_MAX_KEY, FlagMap, PRESENCE_KEY, TOTAL_TOLL_KEY};
use vestige_toll::*;

pub type TestVestige = Vestige<MemoryHost, RecordingNotifier>;

pub fn vestige_with(records: Vec<CharacterRecord>) -> TestVestige {
    vestige_with_settings(records, Settings::default())
}

pub fn vestige_with_settings(records: Vec<CharacterRecord>, settings: Settings) -> TestVestige {
    let host = MemoryHost::with_characters(records).with_vestige_hook();
    Vestige::new(host, RecordingNotifier::default(), settings)
}

pub fn fresh(id: &str, max: i32, hp: i32) -> CharacterRecord {
    CharacterRecord::new(id, id, HitPoints::new(max, hp, 0), RestProfile::new(2, 3))
}

// A character that already carries a toll, flags written the way the ledger writes them.
pub fn tolled(id: &str, max: i32, hp: i32, temp: i32, toll: i32) -> CharacterRecord {
    let mut record = CharacterRecord::new(id, id, HitPoints::new(max, hp, temp), RestProfile::new(2, 3));
    let mut flags = FlagMap::new();
    flags.insert(PRESENCE_KEY.to_string(), Value::Bool(true));
    flags.insert(TOTAL_TOLL_KEY.to_string(), Value::from(toll));
    flags.insert(
        EFFECTIVE_MAX_KEY.to_string(),
        Value::from(ledger::effective_max_hp(max, toll)),
    );
    record.flags.insert(FLAG_SCOPE.to_string(), flags);
    record
}

pub fn target(id: &str) -> TargetContext {
    TargetContext::assigned(CharacterId::new(id))
}

pub async fn record(vestige: &TestVestige, id: &str) -> CharacterRecord {
    vestige
        .host()
        .character(&CharacterId::new(id))
        .await
        .expect("character should exist")
}

pub async fn ledger_of(vestige: &TestVestige, id: &str) -> Option<TollLedger> {
    let record = record(vestige, id).await;
    record
        .scoped_flags(FLAG_SCOPE)
        .and_then(|flags| ledger::from_flags(flags, record.hp.max))
}

pub fn has_notification(vestige: &TestVestige, needle: &str) -> bool {
    vestige
        .notifier()
        .notifications()
        .iter()
        .any(|n| n.content.contains(needle))
}
