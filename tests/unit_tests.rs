// Unit tests for the Tindev deck and renderer

use tindev_client::core::CandidateQueue;
use tindev_client::models::{AvatarSource, MatchNotification, Profile, ScreenPhase, ViewState};
use tindev_client::services::realtime::packet::{EnginePacket, SocketPacket};
use tindev_client::view::{render, EMPTY_MESSAGE, MATCH_TITLE};

fn create_test_profile(id: &str) -> Profile {
    Profile {
        id: id.to_string(),
        name: format!("Dev {}", id),
        bio: "Rust, TypeScript and coffee".to_string(),
        avatar_uri: format!("https://avatars.test/{}.png", id),
    }
}

fn loaded_queue(ids: &[&str]) -> CandidateQueue {
    let mut queue = CandidateQueue::new();
    queue.replace(ids.iter().map(|id| create_test_profile(id)).collect());
    queue
}

#[test]
fn test_queue_drains_monotonically() {
    let ids = ["a", "b", "c", "d"];
    let mut queue = loaded_queue(&ids);

    for consumed in 1..=ids.len() {
        let before = queue.len();
        queue.pop_front();
        assert_eq!(queue.len(), before - 1);
        assert_eq!(queue.ids(), ids[consumed..].to_vec());
    }

    assert!(queue.pop_front().is_none());
    assert_eq!(queue.len(), 0);
}

#[test]
fn test_queue_ids_unique_after_replace() {
    let mut queue = CandidateQueue::new();
    queue.replace(vec![
        create_test_profile("a"),
        create_test_profile("b"),
        create_test_profile("b"),
        create_test_profile("a"),
    ]);

    assert_eq!(queue.ids(), vec!["a", "b"]);
}

#[test]
fn test_visible_stack_matches_queue_order() {
    let queue = loaded_queue(&["a", "b", "c"]);
    let stack = queue.visible_stack();

    assert_eq!(stack.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(), vec!["a", "b", "c"]);
    assert!(stack.windows(2).all(|w| w[0].z_index > w[1].z_index));
    assert_eq!(stack[0].avatar, AvatarSource::Remote("https://avatars.test/a.png".to_string()));
}

#[test]
fn test_render_loading_and_logged_out() {
    let loading = render(&ViewState::loading());
    assert!(loading.contains("Loading"));
    assert!(!loading.contains(EMPTY_MESSAGE));

    let mut state = ViewState::loading();
    state.phase = ScreenPhase::LoggedOut;
    state.active_match = Some(MatchNotification::new(create_test_profile("m")));
    let frame = render(&state);
    assert!(frame.contains("Logged out"));
    assert!(!frame.contains(MATCH_TITLE));
}

#[test]
fn test_render_match_over_empty_deck() {
    let queue = CandidateQueue::new();
    let state = ViewState {
        phase: ScreenPhase::Active,
        cards: queue.visible_stack(),
        is_empty: queue.is_empty(),
        active_match: Some(MatchNotification::new(create_test_profile("c"))),
        load_error: None,
        realtime_connected: true,
    };

    let frame = render(&state);
    assert!(frame.contains(EMPTY_MESSAGE));
    assert!(frame.contains(MATCH_TITLE));
    assert!(frame.contains("Dev c"));
}

#[test]
fn test_match_frame_decodes_to_profile() {
    let frame = r#"42["match",{"_id":"c","name":"Carla","bio":"Rustacean","avatar":"https://a.test/c.png"}]"#;

    let EnginePacket::Message(data) = EnginePacket::decode(frame).unwrap() else {
        panic!("expected a message frame");
    };
    let SocketPacket::Event { name, mut args, .. } = SocketPacket::decode(&data).unwrap() else {
        panic!("expected an event");
    };

    assert_eq!(name, "match");
    let profile: Profile = serde_json::from_value(args.remove(0)).unwrap();
    assert_eq!(profile, Profile {
        id: "c".to_string(),
        name: "Carla".to_string(),
        bio: "Rustacean".to_string(),
        avatar_uri: "https://a.test/c.png".to_string(),
    });
}
