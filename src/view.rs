//! Text rendering of a [`ViewState`]
//!
//! Pure function of the snapshot; nothing here touches the view-model.

use crate::models::{AvatarSource, CardView, MatchNotification, ScreenPhase, ViewState};

pub const EMPTY_MESSAGE: &str = "It's Over! :(";
pub const MATCH_TITLE: &str = "It's a Match!";
pub const CLOSE_LABEL: &str = "Close";

const BIO_MAX_LINES: usize = 3;
const BIO_LINE_WIDTH: usize = 40;

/// Render one frame
pub fn render(state: &ViewState) -> String {
    let mut out = String::new();

    line(&mut out, "[ tindev ]  (logo: logout)");

    match state.phase {
        ScreenPhase::Loading => {
            line(&mut out, "Loading...");
        }
        ScreenPhase::LoggedOut => {
            line(&mut out, "Logged out.");
            return out;
        }
        ScreenPhase::Active if state.is_empty => {
            line(&mut out, EMPTY_MESSAGE);
            if let Some(error) = &state.load_error {
                line(&mut out, format!("(could not load candidates: {})", error));
            }
        }
        ScreenPhase::Active => {
            // Paint back to front so the top card ends up last
            let mut cards: Vec<&CardView> = state.cards.iter().collect();
            cards.sort_by_key(|c| c.z_index);
            for card in cards {
                render_card(&mut out, card);
            }
        }
    }

    if state.shows_decision_buttons() {
        line(&mut out, "   [ (d) dislike ]   [ (l) like ]");
    }

    if let Some(notification) = &state.active_match {
        render_match(&mut out, notification);
    }

    out
}

fn render_card(out: &mut String, card: &CardView) {
    line(out, "+----------------------------------------+");
    line(out, format!("| {} {}", avatar_label(&card.avatar), card.name));
    for text in wrap(&card.bio, BIO_LINE_WIDTH, BIO_MAX_LINES) {
        line(out, format!("|   {}", text));
    }
    line(out, "+----------------------------------------+");
}

fn render_match(out: &mut String, notification: &MatchNotification) {
    let profile = &notification.profile;
    line(out, format!("========== {} ==========", MATCH_TITLE));
    line(out, format!("{} {}", avatar_label(&profile.avatar_source()), profile.name));
    line(out, &profile.bio);
    line(out, format!("[ (c) {} ]", CLOSE_LABEL));
}

fn line(out: &mut String, text: impl AsRef<str>) {
    out.push_str(text.as_ref());
    out.push('\n');
}

fn avatar_label(avatar: &AvatarSource) -> String {
    match avatar {
        AvatarSource::Remote(uri) => format!("<{}>", uri),
        AvatarSource::Local(asset) => format!("<asset:{}>", asset),
        AvatarSource::Missing => "<no avatar>".to_string(),
    }
}

/// Greedy word wrap, truncated to `max_lines` with an ellipsis
fn wrap(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            last.push_str("...");
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Profile;

    fn card(id: &str, z_index: usize) -> CardView {
        CardView {
            id: id.to_string(),
            name: format!("Dev {}", id),
            bio: "Loves Rust".to_string(),
            avatar: AvatarSource::Remote(format!("https://a.test/{}.png", id)),
            z_index,
        }
    }

    fn active(cards: Vec<CardView>) -> ViewState {
        ViewState {
            phase: ScreenPhase::Active,
            is_empty: cards.is_empty(),
            cards,
            active_match: None,
            load_error: None,
            realtime_connected: true,
        }
    }

    #[test]
    fn test_empty_state_hides_buttons() {
        let frame = render(&active(vec![]));
        assert!(frame.contains(EMPTY_MESSAGE));
        assert!(!frame.contains("like ]"));
    }

    #[test]
    fn test_load_error_is_shown_with_empty_state() {
        let mut state = active(vec![]);
        state.load_error = Some("API returned 500".to_string());

        let frame = render(&state);
        assert!(frame.contains(EMPTY_MESSAGE));
        assert!(frame.contains("API returned 500"));
    }

    #[test]
    fn test_top_card_is_painted_last() {
        let frame = render(&active(vec![card("a", 2), card("b", 1)]));

        let a = frame.find("Dev a").unwrap();
        let b = frame.find("Dev b").unwrap();
        assert!(b < a);
        assert!(frame.contains("(l) like"));
    }

    #[test]
    fn test_match_overlay() {
        let mut state = active(vec![card("a", 1)]);
        state.active_match = Some(MatchNotification::new(Profile {
            id: "c".to_string(),
            name: "Carla".to_string(),
            bio: "Rustacean".to_string(),
            avatar_uri: "assets/carla.png".to_string(),
        }));

        let frame = render(&state);
        assert!(frame.contains(MATCH_TITLE));
        assert!(frame.contains("<asset:assets/carla.png> Carla"));
        assert!(frame.contains(CLOSE_LABEL));
    }

    #[test]
    fn test_wrap_truncates_bio() {
        let bio = "word ".repeat(60);
        let lines = wrap(&bio, 20, 3);
        assert_eq!(lines.len(), 3);
        assert!(lines[2].ends_with("..."));
        assert!(lines[0].chars().count() <= 20);
    }
}
