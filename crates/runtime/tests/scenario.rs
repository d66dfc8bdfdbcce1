//! End-to-end scenarios: game events in, progression, notices and stats out.

use std::sync::Arc;

use pantheon_content::ContentFactory;
use pantheon_core::{
    CapabilityId, Clock, DeityId, FavorRank, ManualClock, PlayerId, ProgressionError,
    ProgressionEvent,
};
use pantheon_runtime::repository::{FACTIONS_KEY, player_key};
use pantheon_runtime::{
    Collaborator, Command, Event, FileWorldStorage, GameEvent, InMemoryNotifier,
    InMemoryStatSink, InMemoryWorldStorage, Runtime, RuntimeError, Topic, WorldStorage,
};

struct Harness {
    runtime: Runtime,
    notifier: InMemoryNotifier,
    sink: InMemoryStatSink,
    clock: ManualClock,
}

fn harness() -> Harness {
    harness_on(Arc::new(InMemoryWorldStorage::new()))
}

fn harness_on(storage: Arc<dyn WorldStorage>) -> Harness {
    let notifier = InMemoryNotifier::new();
    let sink = InMemoryStatSink::new();
    let clock = ManualClock::at_epoch();
    let runtime = Runtime::builder()
        .content(ContentFactory::builtin().load_all().unwrap())
        .storage(storage)
        .notifier(notifier.clone())
        .stat_sink(sink.clone())
        .clock(Arc::new(clock.clone()) as Arc<dyn Clock>)
        .build()
        .unwrap();
    Harness {
        runtime,
        notifier,
        sink,
        clock,
    }
}

fn p(id: &str) -> PlayerId {
    PlayerId::from(id)
}

fn join(h: &mut Harness, player: &str) {
    h.runtime
        .dispatch(GameEvent::PlayerJoined { player: p(player) })
        .unwrap();
}

fn found(h: &mut Harness, player: &str, name: &str, deity: &str) {
    h.runtime
        .execute(
            &p(player),
            &Command::CreateFaction {
                name: name.into(),
                deity: DeityId::from(deity),
                is_public: true,
            },
        )
        .unwrap();
}

fn favor(h: &Harness, player: &str) -> u32 {
    h.runtime
        .engine()
        .player(&p(player))
        .map(|record| record.favor())
        .unwrap_or(0)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn rival_kill_rewards_killer_and_penalizes_victim() {
    let mut h = harness();
    join(&mut h, "ada");
    join(&mut h, "bob");
    found(&mut h, "ada", "Red Tide", "khoras");
    found(&mut h, "bob", "Grave Watch", "morthen");
    h.runtime.with_engine(|engine| engine.add_favor(&p("bob"), 12, "test"));

    h.runtime
        .dispatch(GameEvent::PlayerDied {
            victim: p("bob"),
            killer: Some(p("ada")),
        })
        .unwrap();

    assert_eq!(favor(&h, "ada"), 20);
    assert_eq!(favor(&h, "bob"), 7);
    let red_tide = h.runtime.engine().faction_of(&p("ada")).unwrap().id().clone();
    assert_eq!(
        h.runtime
            .engine()
            .faction_progression(&red_tide)
            .unwrap()
            .prestige(),
        30
    );
    assert_eq!(h.runtime.engine().player(&p("ada")).unwrap().kill_count(), 1);

    assert!(
        h.notifier
            .messages_for(&p("ada"))
            .contains(&"+20 favor, +30 prestige for Red Tide (slew bob).".to_owned())
    );
    let bob = h.notifier.messages_for(&p("bob"));
    assert!(bob.contains(&"You were slain by a follower of Khoras, the Blood Tide.".to_owned()));
    assert!(bob.contains(&"You lost 5 favor.".to_owned()));
}

#[test]
fn death_without_player_killer_only_costs_the_penalty() {
    let mut h = harness();
    join(&mut h, "ada");
    found(&mut h, "ada", "Red Tide", "khoras");
    h.runtime.with_engine(|engine| engine.add_favor(&p("ada"), 3, "test"));

    h.runtime
        .dispatch(GameEvent::PlayerDied {
            victim: p("ada"),
            killer: None,
        })
        .unwrap();

    assert_eq!(favor(&h, "ada"), 0);
    assert!(
        h.notifier
            .messages_for(&p("ada"))
            .contains(&"You lost 3 favor.".to_owned())
    );
}

#[test]
fn unaligned_killer_is_prompted_to_join() {
    let mut h = harness();
    join(&mut h, "ada");
    join(&mut h, "bob");

    h.runtime
        .dispatch(GameEvent::PlayerDied {
            victim: p("bob"),
            killer: Some(p("ada")),
        })
        .unwrap();

    assert_eq!(favor(&h, "ada"), 0);
    assert_eq!(
        h.notifier.messages_for(&p("ada")),
        vec!["Join a faction to earn favor and prestige from PvP kills.".to_owned()]
    );
}

#[test]
fn unlocks_reach_the_stat_sink_immediately() {
    let mut h = harness();
    join(&mut h, "ada");
    found(&mut h, "ada", "Red Tide", "khoras");

    h.runtime
        .execute(
            &p("ada"),
            &Command::Unlock {
                capability: CapabilityId::from("khoras_battle_fury"),
            },
        )
        .unwrap();
    assert!(approx(h.sink.total(&p("ada"), "damage"), 0.05));
    assert_eq!(
        h.sink.modifier(&p("ada"), "damage", "pantheon:ada"),
        Some(0.05)
    );

    let faction = h.runtime.engine().faction_of(&p("ada")).unwrap().id().clone();
    h.runtime
        .with_engine(|engine| engine.add_prestige(&faction, 500, "test"));
    h.runtime
        .execute(
            &p("ada"),
            &Command::Unlock {
                capability: CapabilityId::from("khoras_war_banner"),
            },
        )
        .unwrap();
    assert!(approx(h.sink.total(&p("ada"), "damage"), 0.08));
}

#[test]
fn faction_unlock_refreshes_online_members_only() {
    let mut h = harness();
    join(&mut h, "ada");
    join(&mut h, "bob");
    found(&mut h, "ada", "Red Tide", "khoras");
    h.runtime
        .execute(
            &p("bob"),
            &Command::Join {
                faction: "red tide".into(),
            },
        )
        .unwrap();
    h.runtime
        .dispatch(GameEvent::PlayerDisconnected { player: p("bob") })
        .unwrap();

    let faction = h.runtime.engine().faction_of(&p("ada")).unwrap().id().clone();
    h.runtime
        .with_engine(|engine| engine.add_prestige(&faction, 600, "test"));
    h.runtime
        .execute(
            &p("ada"),
            &Command::Unlock {
                capability: CapabilityId::from("khoras_war_banner"),
            },
        )
        .unwrap();

    assert!(approx(h.sink.total(&p("ada"), "damage"), 0.03));
    assert!(h.sink.stats_for(&p("bob")).is_empty());
}

#[test]
fn leaving_strips_favor_and_modifiers() {
    let mut h = harness();
    join(&mut h, "ada");
    found(&mut h, "ada", "Red Tide", "khoras");
    h.runtime.with_engine(|engine| engine.add_favor(&p("ada"), 650, "test"));
    h.runtime
        .execute(
            &p("ada"),
            &Command::Unlock {
                capability: CapabilityId::from("khoras_iron_resolve"),
            },
        )
        .unwrap();
    assert!(approx(h.sink.total(&p("ada"), "armor"), 0.05));

    h.runtime.execute(&p("ada"), &Command::Leave).unwrap();

    let record = h.runtime.engine().player(&p("ada")).unwrap();
    assert_eq!(record.favor(), 0);
    assert_eq!(record.lifetime_favor(), 650);
    assert_eq!(record.favor_rank(), FavorRank::Disciple);
    assert!(record.unlocked().is_empty());
    assert!(h.sink.stats_for(&p("ada")).is_empty());
}

#[test]
fn rejected_commands_tell_the_player_why() {
    let mut h = harness();
    join(&mut h, "ada");

    let err = h
        .runtime
        .execute(
            &p("ada"),
            &Command::CreateFaction {
                name: "Nobody's".into(),
                deity: DeityId::from("none"),
                is_public: true,
            },
        )
        .unwrap_err();
    assert!(matches!(err, ProgressionError::InvalidDeity(_)));
    assert_eq!(h.notifier.messages_for(&p("ada")), vec![err.to_string()]);
}

#[test]
fn switch_cooldown_blocks_quick_rejoin() {
    let mut h = harness();
    join(&mut h, "ada");
    join(&mut h, "bob");
    found(&mut h, "ada", "Red Tide", "khoras");
    found(&mut h, "bob", "Grave Watch", "morthen");

    h.runtime.execute(&p("ada"), &Command::Leave).unwrap();
    h.clock.advance(chrono::TimeDelta::days(1));
    let err = h
        .runtime
        .execute(
            &p("ada"),
            &Command::Join {
                faction: "Grave Watch".into(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, ProgressionError::SwitchCooldown { .. }));

    h.clock.advance(chrono::TimeDelta::days(6));
    h.runtime
        .execute(
            &p("ada"),
            &Command::Join {
                faction: "Grave Watch".into(),
            },
        )
        .unwrap();
}

#[test]
fn passive_favor_reaches_online_aligned_players() {
    let mut h = harness();
    join(&mut h, "ada");
    join(&mut h, "carl");
    found(&mut h, "ada", "Red Tide", "khoras");

    // 6 favor per hour: ten minutes earn exactly one.
    h.runtime
        .dispatch(GameEvent::Tick { delta_secs: 600.0 })
        .unwrap();

    assert_eq!(favor(&h, "ada"), 1);
    assert_eq!(favor(&h, "carl"), 0);
}

#[test]
fn progression_events_follow_cache_invalidation() {
    let mut h = harness();
    let mut events = h.runtime.subscribe(Topic::Progression);
    join(&mut h, "ada");
    found(&mut h, "ada", "Red Tide", "khoras");

    let mut saw_created = false;
    while let Ok(event) = events.try_recv() {
        if let Event::Progression(ProgressionEvent::FactionCreated { founder, .. }) = event {
            assert_eq!(founder, p("ada"));
            saw_created = true;
        }
    }
    assert!(saw_created);
}

#[test]
fn autosave_stores_factions_after_interval() {
    let storage = Arc::new(InMemoryWorldStorage::new());
    let mut h = harness_on(storage.clone());
    join(&mut h, "ada");
    found(&mut h, "ada", "Red Tide", "khoras");

    h.runtime
        .dispatch(GameEvent::Tick { delta_secs: 200.0 })
        .unwrap();
    assert!(!storage.exists(FACTIONS_KEY));

    h.runtime
        .dispatch(GameEvent::Tick { delta_secs: 100.0 })
        .unwrap();
    assert!(storage.exists(FACTIONS_KEY));
    assert!(storage.exists(&player_key(&p("ada"))));
}

#[test]
fn progression_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let storage = Arc::new(FileWorldStorage::new(dir.path()).unwrap());
        let mut h = harness_on(storage);
        join(&mut h, "ada");
        found(&mut h, "ada", "Red Tide", "khoras");
        h.runtime.with_engine(|engine| engine.add_favor(&p("ada"), 700, "test"));
        h.runtime
            .execute(
                &p("ada"),
                &Command::Unlock {
                    capability: CapabilityId::from("khoras_battle_fury"),
                },
            )
            .unwrap();
        h.runtime.shutdown().unwrap();
    }

    let storage = Arc::new(FileWorldStorage::new(dir.path()).unwrap());
    let mut h = harness_on(storage);
    assert_eq!(h.runtime.engine().directory().len(), 1);
    assert!(h.runtime.engine().player(&p("ada")).is_none());

    join(&mut h, "ada");
    let record = h.runtime.engine().player(&p("ada")).unwrap();
    assert_eq!(record.favor(), 700);
    assert_eq!(record.favor_rank(), FavorRank::Disciple);
    assert_eq!(
        h.runtime.engine().faction_of(&p("ada")).unwrap().name(),
        "Red Tide"
    );
    assert!(approx(h.sink.total(&p("ada"), "damage"), 0.05));
}

#[test]
fn corrupted_record_keeps_player_offline() {
    let storage = Arc::new(InMemoryWorldStorage::new());
    storage.store(&player_key(&p("ada")), &[1, 2, 3]).unwrap();
    let mut h = harness_on(storage);

    let err = h
        .runtime
        .dispatch(GameEvent::PlayerJoined { player: p("ada") })
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Handler { handler: "session", .. }));
    assert!(!h.runtime.is_online(&p("ada")));
}

#[test]
fn builder_requires_every_collaborator() {
    let result = Runtime::builder()
        .content(ContentFactory::builtin().load_all().unwrap())
        .notifier(InMemoryNotifier::new())
        .stat_sink(InMemoryStatSink::new())
        .build();
    assert!(matches!(
        result,
        Err(RuntimeError::MissingCollaborator(Collaborator::WorldStorage))
    ));

    let result = Runtime::builder()
        .storage(Arc::new(InMemoryWorldStorage::new()))
        .notifier(InMemoryNotifier::new())
        .stat_sink(InMemoryStatSink::new())
        .build();
    assert!(matches!(
        result,
        Err(RuntimeError::MissingCollaborator(Collaborator::Content))
    ));
}
