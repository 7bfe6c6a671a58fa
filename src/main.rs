//! Spellclash Simulator
//!
//! Runs a short two-player duel locally through the trusted-state
//! boundary, the same path the orchestration layer drives in production.

use anyhow::Context;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use spellclash::{
    game::spell::spell_id,
    game::state::SpellSlot,
    trusted::{generate_trusted_state, Action, KeyedSigner},
    CharacterClass, Coord, PlayerId, PlayerState, VERSION,
};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Spellclash Engine v{}", VERSION);

    demo_duel()
}

/// Demo function to exercise one full duel locally.
fn demo_duel() -> anyhow::Result<()> {
    info!("=== Starting Demo Duel ===");

    let match_id = [1u8; 16];
    info!("Match ID: {}", hex::encode(match_id));

    // Create both players. In production each engine instance holds only
    // its own private state; here we hold both sides.
    let arcanist_id = PlayerId::new([0xA1; 16]);
    let trickster_id = PlayerId::new([0xB2; 16]);

    let mut arcanist = PlayerState::new(arcanist_id, CharacterClass::Arcanist, &match_id);
    arcanist.push_spell(SpellSlot::new(spell_id("strike"), 1)).expect("empty table");
    arcanist.push_spell(SpellSlot::new(spell_id("fireball"), 2)).expect("slot free");
    arcanist.push_spell(SpellSlot::new(spell_id("blink"), 3)).expect("slot free");

    let mut trickster = PlayerState::new(trickster_id, CharacterClass::Trickster, &match_id);
    trickster.push_spell(SpellSlot::new(spell_id("strike"), 1)).expect("empty table");
    trickster.push_spell(SpellSlot::new(spell_id("vanish"), 4)).expect("slot free");
    trickster.push_spell(SpellSlot::new(spell_id("ambush"), 3)).expect("slot free");

    let arcanist_signer = KeyedSigner::new([0x0A; 32]);
    let trickster_signer = KeyedSigner::new([0x0B; 32]);

    // Scripted action batches, one per round. Both engines replay the
    // same combined batch against the opponent's round-start state.
    let rounds: Vec<Vec<Action>> = vec![
        vec![
            action(arcanist_id, trickster_id, "fireball", vec![]),
            action(trickster_id, trickster_id, "vanish", vec![]),
        ],
        vec![
            action(arcanist_id, arcanist_id, "blink", bincode::serialize(&Coord::new(5, 5))?),
            action(trickster_id, arcanist_id, "ambush", vec![]),
        ],
        vec![
            action(arcanist_id, trickster_id, "strike", vec![]),
            action(trickster_id, arcanist_id, "strike", vec![]),
        ],
        vec![],
    ];

    for (round, batch) in rounds.iter().enumerate() {
        let arcanist_snapshot = arcanist.clone();
        let trickster_snapshot = trickster.clone();

        let arcanist_out =
            generate_trusted_state(&mut arcanist, batch, &trickster_snapshot, &arcanist_signer)?;
        let trickster_out =
            generate_trusted_state(&mut trickster, batch, &arcanist_snapshot, &trickster_signer)?;

        info!(
            "round {}: arcanist hp={} commit={} | trickster hp={} commit={}",
            round + 1,
            arcanist.stats.hp,
            hex::encode(&arcanist_out.commitment[..8]),
            trickster.stats.hp,
            hex::encode(&trickster_out.commitment[..8]),
        );
    }

    // Show what the opponent actually gets to see.
    let final_view = generate_trusted_state(&mut trickster, &[], &arcanist, &trickster_signer)?;
    let view: PlayerState =
        bincode::deserialize(&final_view.public_state).context("decode public view")?;
    info!(
        "trickster public view:\n{}",
        serde_json::to_string_pretty(&view.stats).context("encode view stats")?
    );

    info!("=== Demo Duel Complete ===");
    Ok(())
}

fn action(caster: PlayerId, target: PlayerId, name: &str, payload: Vec<u8>) -> Action {
    Action {
        caster,
        target,
        spell: spell_id(name),
        payload,
    }
}
