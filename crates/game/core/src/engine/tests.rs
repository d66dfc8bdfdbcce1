use std::sync::Arc;

use chrono::TimeDelta;

use super::*;
use crate::capability::Capability;
use crate::clock::ManualClock;
use crate::deity::{DeityDescriptor, Domain, RelationshipKind};
use crate::ids::DeityId;
use crate::snapshot::PlayerSnapshot;

fn deities() -> DeityRelationshipGraph {
    let mut graph = DeityRelationshipGraph::new();
    graph.register(
        DeityDescriptor::new("khoras", "Khoras", Domain::War)
            .with_relationship("morthen", RelationshipKind::Rival),
    );
    graph.register(
        DeityDescriptor::new("morthen", "Morthen", Domain::Death)
            .with_relationship("khoras", RelationshipKind::Rival),
    );
    graph
}

fn catalog() -> CapabilityCatalog {
    let mut catalog = CapabilityCatalog::new();
    catalog.register(
        Capability::new("khoras_battle_fury", "Battle Fury", Scope::Player, "khoras")
            .with_stat("damage", 0.10),
    );
    catalog.register(
        Capability::new("khoras_war_banner", "War Banner", Scope::Faction, "khoras")
            .with_stat("damage", 0.05),
    );
    catalog.register(
        Capability::new("khoras_iron_skin", "Iron Skin", Scope::Player, "khoras")
            .with_favor_rank(FavorRank::Disciple)
            .with_prerequisite("khoras_battle_fury")
            .with_stat("armor", 0.15),
    );
    catalog
}

fn setup_with(config: ProgressionConfig) -> (ProgressionEngine, ManualClock) {
    let clock = ManualClock::at_epoch();
    let engine = ProgressionEngine::new(config, deities(), catalog(), Arc::new(clock.clone()));
    (engine, clock)
}

fn setup() -> (ProgressionEngine, ManualClock) {
    setup_with(ProgressionConfig::default())
}

fn p(id: &str) -> PlayerId {
    PlayerId::from(id)
}

fn khoras() -> DeityId {
    DeityId::from("khoras")
}

#[test]
fn create_faction_validates_deity() {
    let (mut engine, _) = setup();
    assert_eq!(
        engine.create_faction(&p("ada"), "Nobody", &DeityId::from("none"), true),
        Err(ProgressionError::InvalidDeity(DeityId::from("none")))
    );
    assert_eq!(
        engine.create_faction(&p("ada"), "Strangers", &DeityId::from("zorp"), true),
        Err(ProgressionError::UnknownDeity(DeityId::from("zorp")))
    );
    assert!(engine.directory().is_empty());
}

#[test]
fn founder_is_aligned_after_creation() {
    let (mut engine, _) = setup();
    let faction = engine
        .create_faction(&p("ada"), "Iron Vanguard", &khoras(), true)
        .unwrap();
    let record = engine.player(&p("ada")).unwrap();
    assert_eq!(record.faction(), Some(&faction));
    assert_eq!(record.active_deity(), Some(&khoras()));
    assert!(engine.faction(&faction).unwrap().is_founder(&p("ada")));

    let events = engine.drain_events();
    assert!(events.iter().any(|event| matches!(event, ProgressionEvent::FactionCreated { .. })));
    assert!(events.contains(&ProgressionEvent::PlayerJoinedFaction {
        player: p("ada"),
        faction,
    }));
}

#[test]
fn private_faction_requires_invitation() {
    let (mut engine, _) = setup();
    let faction = engine
        .create_faction(&p("ada"), "Closed Circle", &khoras(), false)
        .unwrap();
    assert_eq!(
        engine.join_faction(&p("bo"), &faction),
        Err(ProgressionError::InviteRequired {
            faction: faction.clone()
        })
    );
    engine.invite(&p("ada"), &p("bo")).unwrap();
    engine.join_faction(&p("bo"), &faction).unwrap();
    assert!(engine.faction(&faction).unwrap().is_member(&p("bo")));
    assert!(engine.directory().list_invitations(&p("bo")).is_empty());
}

#[test]
fn switching_respects_cooldown() {
    let (mut engine, clock) = setup();
    let first = engine
        .create_faction(&p("ada"), "Iron Vanguard", &khoras(), true)
        .unwrap();
    let second = engine
        .create_faction(&p("bo"), "Grave Choir", &DeityId::from("morthen"), true)
        .unwrap();
    engine.join_faction(&p("cy"), &first).unwrap();

    clock.advance(TimeDelta::days(6));
    assert_eq!(
        engine.join_faction(&p("cy"), &second),
        Err(ProgressionError::SwitchCooldown { remaining_hours: 24 })
    );

    clock.advance(TimeDelta::days(1));
    engine.join_faction(&p("cy"), &second).unwrap();
    assert_eq!(engine.faction_of(&p("cy")).unwrap().id(), &second);
    assert!(!engine.faction(&first).unwrap().is_member(&p("cy")));
}

#[test]
fn leaving_keeps_lifetime_and_faction_prestige() {
    let (mut engine, _) = setup();
    let faction = engine
        .create_faction(&p("ada"), "Iron Vanguard", &khoras(), true)
        .unwrap();
    engine.join_faction(&p("bo"), &faction).unwrap();
    engine.add_favor(&p("bo"), 600, "test");
    engine.add_prestige(&faction, 700, "test");
    engine
        .unlock_player_capability(&p("bo"), &CapabilityId::from("khoras_battle_fury"))
        .unwrap();

    engine.leave_faction(&p("bo")).unwrap();
    let record = engine.player(&p("bo")).unwrap();
    assert_eq!(record.favor(), 0);
    assert_eq!(record.lifetime_favor(), 600);
    assert_eq!(record.favor_rank(), FavorRank::Disciple);
    assert!(record.unlocked().is_empty());
    assert_eq!(engine.faction_progression(&faction).unwrap().prestige(), 700);
    assert!(engine.combined_modifiers(&p("bo")).is_empty());
}

#[test]
fn unlock_runs_eligibility_first() {
    let (mut engine, _) = setup();
    engine
        .create_faction(&p("ada"), "Iron Vanguard", &khoras(), true)
        .unwrap();
    let iron_skin = CapabilityId::from("khoras_iron_skin");

    let err = engine
        .unlock_player_capability(&p("ada"), &iron_skin)
        .unwrap_err();
    assert_eq!(
        err,
        ProgressionError::Ineligible {
            capability: iron_skin.clone(),
            reason: Ineligibility::RequiresFavorRank(FavorRank::Disciple),
        }
    );

    let err = engine
        .unlock_player_capability(&p("ada"), &CapabilityId::from("khoras_war_banner"))
        .unwrap_err();
    assert!(matches!(
        err,
        ProgressionError::Ineligible {
            reason: Ineligibility::NotFound,
            ..
        }
    ));
}

#[test]
fn unlock_is_visible_on_next_modifier_read() {
    let (mut engine, _) = setup();
    let faction = engine
        .create_faction(&p("ada"), "Iron Vanguard", &khoras(), true)
        .unwrap();
    assert!(engine.combined_modifiers(&p("ada")).is_empty());

    engine
        .unlock_player_capability(&p("ada"), &CapabilityId::from("khoras_battle_fury"))
        .unwrap();
    assert_eq!(engine.combined_modifiers(&p("ada"))["damage"], 0.10);

    engine
        .unlock_faction_capability(&p("ada"), &CapabilityId::from("khoras_war_banner"))
        .unwrap();
    let combined = engine.combined_modifiers(&p("ada"));
    assert!((combined["damage"] - 0.15).abs() < 1e-9);
    assert_eq!(engine.faction_modifiers(&faction)["damage"], 0.05);
}

#[test]
fn available_capabilities_lists_deity_catalog() {
    let (mut engine, _) = setup();
    assert!(engine.available_capabilities(&p("ada")).is_empty());
    engine
        .create_faction(&p("ada"), "Iron Vanguard", &khoras(), true)
        .unwrap();
    let listings = engine.available_capabilities(&p("ada"));
    assert_eq!(listings.len(), 3);
    let available: Vec<_> = listings
        .iter()
        .filter(|listing| listing.is_available())
        .map(|listing| listing.capability.id.as_str())
        .collect();
    assert_eq!(available, vec!["khoras_battle_fury", "khoras_war_banner"]);
}

#[test]
fn kick_and_transfer_are_founder_only() {
    let (mut engine, _) = setup();
    let faction = engine
        .create_faction(&p("ada"), "Iron Vanguard", &khoras(), true)
        .unwrap();
    engine.join_faction(&p("bo"), &faction).unwrap();
    engine.join_faction(&p("cy"), &faction).unwrap();

    assert!(matches!(
        engine.kick(&p("bo"), &p("cy")),
        Err(ProgressionError::NotFounder { .. })
    ));
    assert_eq!(
        engine.kick(&p("ada"), &p("ada")),
        Err(ProgressionError::CannotKickSelf)
    );

    engine.kick(&p("ada"), &p("cy")).unwrap();
    assert!(engine.faction_of(&p("cy")).is_none());
    assert!(engine.player(&p("cy")).unwrap().faction().is_none());

    engine.transfer_founder(&p("ada"), &p("bo")).unwrap();
    assert!(engine.faction(&faction).unwrap().is_founder(&p("bo")));
    assert!(matches!(
        engine.set_public(&p("ada"), false),
        Err(ProgressionError::NotFounder { .. })
    ));
    engine.set_public(&p("bo"), false).unwrap();
    assert!(!engine.faction(&faction).unwrap().is_public());
}

#[test]
fn disband_runs_leave_flow_for_everyone() {
    let (mut engine, _) = setup();
    let faction = engine
        .create_faction(&p("ada"), "Iron Vanguard", &khoras(), true)
        .unwrap();
    engine.join_faction(&p("bo"), &faction).unwrap();
    engine.add_favor(&p("bo"), 40, "test");
    engine.add_prestige(&faction, 100, "test");
    engine.drain_events();

    assert!(matches!(
        engine.disband(&p("bo")),
        Err(ProgressionError::NotFounder { .. })
    ));
    assert_eq!(engine.disband(&p("ada")), Ok(faction.clone()));
    assert!(engine.faction(&faction).is_none());
    assert!(engine.faction_progression(&faction).is_none());
    assert_eq!(engine.player(&p("bo")).unwrap().favor(), 0);

    let events = engine.drain_events();
    let left = events
        .iter()
        .filter(|event| matches!(event, ProgressionEvent::PlayerLeftFaction { .. }))
        .count();
    assert_eq!(left, 2);
    assert!(events.iter().any(|event| matches!(
        event,
        ProgressionEvent::FactionDisbanded { faction: disbanded, .. } if disbanded == &faction
    )));
}

#[test]
fn rival_kill_rewards_attacker_and_faction() {
    let (mut engine, _) = setup();
    let vanguard = engine
        .create_faction(&p("ada"), "Iron Vanguard", &khoras(), true)
        .unwrap();
    engine
        .create_faction(&p("bo"), "Grave Choir", &DeityId::from("morthen"), true)
        .unwrap();

    assert_eq!(
        engine.record_kill(&p("ada"), &p("bo")),
        KillOutcome::Rewarded {
            favor: 20,
            prestige: 30
        }
    );
    assert_eq!(engine.player(&p("ada")).unwrap().favor(), 20);
    assert_eq!(engine.faction_progression(&vanguard).unwrap().prestige(), 30);

    assert_eq!(engine.record_death(&p("bo")), 0);
    assert_eq!(engine.record_death(&p("ada")), 5);
    assert_eq!(engine.player(&p("ada")).unwrap().favor(), 15);
}

#[test]
fn tick_awards_passive_favor_to_aligned_players() {
    let (mut engine, _) = setup_with(ProgressionConfig::default().with_passive_favor(36.0));
    engine
        .create_faction(&p("ada"), "Iron Vanguard", &khoras(), true)
        .unwrap();
    let online = [p("ada"), p("drifter")];

    // 36 favor per hour is 0.01 per second.
    assert_eq!(engine.tick(&online, 50.0), 0);
    assert_eq!(engine.tick(&online, 60.0), 1);
    assert_eq!(engine.player(&p("ada")).unwrap().favor(), 1);
    assert!(engine.player(&p("drifter")).is_none());
}

#[test]
fn tick_total_saturates_instead_of_overflowing() {
    let (mut engine, _) = setup_with(ProgressionConfig::default().with_passive_favor(3.0e9));
    let faction = engine
        .create_faction(&p("ada"), "Iron Vanguard", &khoras(), true)
        .unwrap();
    engine.join_faction(&p("bo"), &faction).unwrap();
    let online = [p("ada"), p("bo")];

    // Each player earns 3e9, which fits a u32; the sum of both does not.
    assert_eq!(engine.tick(&online, 3600.0), u32::MAX);
    assert_eq!(engine.player(&p("ada")).unwrap().favor(), 3_000_000_000);
    assert_eq!(engine.player(&p("bo")).unwrap().favor(), 3_000_000_000);
}

#[test]
fn tick_is_disabled_by_default() {
    let (mut engine, _) = setup();
    engine
        .create_faction(&p("ada"), "Iron Vanguard", &khoras(), true)
        .unwrap();
    assert_eq!(engine.tick(&[p("ada")], 3_600.0), 0);
}

#[test]
fn snapshots_round_trip_and_reconcile() {
    let (mut engine, _) = setup();
    let faction = engine
        .create_faction(&p("ada"), "Iron Vanguard", &khoras(), false)
        .unwrap();
    engine.invite(&p("ada"), &p("bo")).unwrap();
    engine.add_prestige(&faction, 600, "test");
    engine.add_favor(&p("ada"), 25, "test");

    let factions = engine.snapshot_factions();
    let ada = engine.snapshot_player(&p("ada")).unwrap();

    let (mut restored, _) = setup();
    assert_eq!(restored.restore_factions(factions), 1);
    restored.restore_player(ada);
    assert_eq!(restored.player(&p("ada")).unwrap().favor(), 25);
    assert_eq!(
        restored.faction_progression(&faction).unwrap().prestige_rank(),
        PrestigeRank::Established
    );
    assert!(restored.directory().has_invitation(&p("bo"), &faction));

    let next = restored
        .create_faction(&p("cy"), "Grave Choir", &DeityId::from("morthen"), true)
        .unwrap();
    assert_ne!(next, faction);

    let mut orphan = PlayerSnapshot::from(restored.player(&p("ada")).unwrap());
    orphan.player = p("ghost");
    restored.restore_player(orphan);
    let ghost = restored.player(&p("ghost")).unwrap();
    assert!(ghost.faction().is_none());
    assert_eq!(ghost.favor(), 0);
    assert_eq!(ghost.lifetime_favor(), 25);
}
