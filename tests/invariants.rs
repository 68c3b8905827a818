mod common;

use common::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vestige_toll::host::{CharacterStore, FLAG_SCOPE};
use vestige_toll::ledger;
use vestige_toll::*;

// `min_hp` is 1 until damage has been dealt; damage may leave a character at 0.
async fn assert_invariants(vestige: &TestVestige, id: &str, step: &str, min_hp: i32) {
    let mira = record(vestige, id).await;
    let hp = mira.hp;
    let toll = mira
        .scoped_flags(FLAG_SCOPE)
        .and_then(|flags| ledger::from_flags(flags, hp.max));

    assert!(hp.value >= min_hp, "{step}: hp dropped to {}", hp.value);
    assert!(hp.temp >= 0, "{step}: negative temp {}", hp.temp);
    match toll {
        Some(toll) => {
            assert!(toll.total_toll > 0, "{step}: zero toll left flags behind");
            assert!(toll.total_toll <= hp.max - 1, "{step}: toll {} too large", toll.total_toll);
            assert_eq!(
                toll.effective_max_hp,
                ledger::effective_max_hp(hp.max, toll.total_toll),
                "{step}: effective max out of sync"
            );
            assert!(hp.temp <= toll.total_toll, "{step}: temp {} over toll {}", hp.temp, toll.total_toll);
            assert!(hp.value <= toll.effective_max_hp, "{step}: hp over effective max");
            assert_eq!(mira.toll_markers().len(), 1, "{step}: marker count");
        }
        None => {
            assert_eq!(hp.temp, 0, "{step}: temp hp without a toll");
            assert!(hp.value <= hp.max, "{step}: hp over max");
            assert!(mira.toll_markers().is_empty(), "{step}: marker without a toll");
        }
    }
}

#[tokio::test]
async fn invariants_hold_over_random_sequences() {
    for seed in 0..20u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let max = rng.random_range(2..=60);
        let mut mira = fresh("mira", max, max);
        mira.rest = RestProfile::new(rng.random_range(0..=4), rng.random_range(1..=5));
        let vestige = vestige_with(vec![mira]);
        let id = CharacterId::new("mira");
        let mut min_hp = 1;

        for turn in 0..40 {
            let step = format!("seed {seed} turn {turn}");
            match rng.random_range(0..5) {
                0 => {
                    let amount = rng.random_range(1..=15);
                    vestige
                        .apply_toll(&target("mira"), amount)
                        .await
                        .expect("toll should not fail");
                }
                1 => {
                    // The host caps healing at the nominal maximum; the interceptor does the rest.
                    let hp = vestige.host().snapshot(&id).await.expect("snapshot").hp;
                    let update = HpUpdate::heal(hp, rng.random_range(1..=20));
                    vestige
                        .host()
                        .update_hit_points(&id, update, UpdateTag::Untagged)
                        .await
                        .expect("heal should commit");
                }
                2 => {
                    let hp = vestige.host().snapshot(&id).await.expect("snapshot").hp;
                    let update = HpUpdate::damage(hp, rng.random_range(1..=12));
                    vestige
                        .host()
                        .update_hit_points(&id, update, UpdateTag::Untagged)
                        .await
                        .expect("damage should commit");
                    min_hp = 0;
                }
                3 => {
                    vestige
                        .perform_rest(&target("mira"))
                        .await
                        .expect("rest should not fail");
                }
                _ => {
                    vestige
                        .discharge(&target("mira"))
                        .await
                        .expect("discharge should not fail");
                }
            }
            assert_invariants(&vestige, "mira", &step, min_hp).await;
        }
    }
}
