//! End-to-end: the access service running against the sled-backed store,
//! including reopen-and-survive persistence.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use mushcore::world::{
    ObjRef, ObjectAccess, ObjectKind, PropRead, SledWorldStore, SledWorldStoreBuilder, WorldStore,
};

/// Bootstrap a world with one room and one self-owned player standing in it.
fn seed_world(rt: &Runtime, store: &Arc<SledWorldStore>) -> (ObjRef, ObjRef) {
    let cancel = CancellationToken::new();
    rt.block_on(async {
        let mut room = store.create_room("Gatehouse").await.expect("create room");
        let mut player = store.create_thing("player").await.expect("create player");

        room.owner = player.id;
        room.location = room.id;
        room.parent = room.id;
        store.save(&room, &cancel).await.expect("save room");

        player.owner = player.id;
        player.location = room.id;
        store.save(&player, &cancel).await.expect("save player");

        (room.id, player.id)
    })
}

fn reload(store: &Arc<SledWorldStore>, rt: &Runtime, id: ObjRef) -> mushcore::world::ObjectRecord {
    let cancel = CancellationToken::new();
    rt.block_on(store.fetch(id, &cancel))
        .expect("fetch")
        .expect("present")
}

#[test]
fn script_session_builds_a_world_that_survives_reopen() {
    common::init_logging();
    let dir = TempDir::new().expect("tempdir");
    let rt = Runtime::new().expect("runtime");
    let store = Arc::new(SledWorldStoreBuilder::new(dir.path()).open().expect("store"));

    let (room_id, player_id) = seed_world(&rt, &store);

    let caller = reload(&store, &rt, player_id);
    let mut access = ObjectAccess::with_handle(caller, store.clone(), rt.handle().clone())
        .with_deadline(Duration::from_secs(2));

    let study = access.create_room("Study");
    assert!(!study.is_nothing());
    let sword = access.create_thing("sword");
    assert!(!sword.is_nothing());
    assert!(access.rename(room_id, "Old Gatehouse"));
    assert!(access.set_property(sword, "edge", json!("keen")));

    // Close everything and reopen the same directory.
    drop(access);
    drop(store);
    let store = Arc::new(SledWorldStoreBuilder::new(dir.path()).open().expect("reopen"));

    let study_obj = reload(&store, &rt, study);
    assert_eq!(study_obj.kind, ObjectKind::Room);
    assert_eq!(study_obj.owner, player_id);
    assert_eq!(study_obj.location, reload(&store, &rt, room_id).location);

    let sword_obj = reload(&store, &rt, sword);
    assert_eq!(sword_obj.location, player_id);
    assert!(reload(&store, &rt, player_id).contents.contains(&sword));

    assert_eq!(reload(&store, &rt, room_id).name, "Old Gatehouse");

    let caller = reload(&store, &rt, player_id);
    let access = ObjectAccess::with_handle(caller, store.clone(), rt.handle().clone())
        .with_deadline(Duration::from_secs(2));
    assert_eq!(
        access.get_property(sword, "edge"),
        PropRead::Value(json!("keen"))
    );
}

#[test]
fn identifiers_are_never_reused_across_reopen() {
    common::init_logging();
    let dir = TempDir::new().expect("tempdir");
    let rt = Runtime::new().expect("runtime");

    let first = {
        let store = SledWorldStoreBuilder::new(dir.path()).open().expect("store");
        rt.block_on(store.create_thing("a")).expect("create").id
    };
    let second = {
        let store = SledWorldStoreBuilder::new(dir.path()).open().expect("reopen");
        rt.block_on(store.create_thing("b")).expect("create").id
    };
    assert!(second > first, "{} should come after {}", second, first);
}
