use std::collections::{HashSet, VecDeque};
use crate::models::{CardView, Profile};

/// Ordered deck of candidates; the front is the card currently on top
///
/// The deck only changes in two ways: a bulk replace when candidates are
/// loaded, and a pop of the front card when a decision is made. Ids are
/// unique while enqueued.
#[derive(Debug, Clone, Default)]
pub struct CandidateQueue {
    profiles: VecDeque<Profile>,
}

impl CandidateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole deck, keeping server order
    ///
    /// Later duplicates of an id are dropped. Returns how many were dropped.
    pub fn replace(&mut self, profiles: Vec<Profile>) -> usize {
        let mut seen = HashSet::with_capacity(profiles.len());
        let total = profiles.len();

        self.profiles = profiles
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();

        total - self.profiles.len()
    }

    /// Card currently on top
    pub fn front(&self) -> Option<&Profile> {
        self.profiles.front()
    }

    /// Remove and return the top card
    pub fn pop_front(&mut self) -> Option<Profile> {
        self.profiles.pop_front()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.profiles.iter().map(|p| p.id.clone()).collect()
    }

    /// Cards in queue order with stacking priority: index `i` of `n` gets `n - i`
    pub fn visible_stack(&self) -> Vec<CardView> {
        let n = self.profiles.len();
        self.profiles
            .iter()
            .enumerate()
            .map(|(i, p)| CardView::from_profile(p, n - i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str) -> Profile {
        Profile {
            id: id.to_string(),
            name: format!("Dev {}", id),
            bio: String::new(),
            avatar_uri: String::new(),
        }
    }

    #[test]
    fn test_replace_keeps_order_and_drops_duplicates() {
        let mut queue = CandidateQueue::new();
        let dropped = queue.replace(vec![profile("a"), profile("b"), profile("a"), profile("c")]);

        assert_eq!(dropped, 1);
        assert_eq!(queue.ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_replace_overwrites_previous_contents() {
        let mut queue = CandidateQueue::new();
        queue.replace(vec![profile("a"), profile("b")]);
        queue.replace(vec![profile("z")]);

        assert_eq!(queue.ids(), vec!["z"]);
    }

    #[test]
    fn test_pop_front_in_order() {
        let mut queue = CandidateQueue::new();
        queue.replace(vec![profile("a"), profile("b")]);

        assert_eq!(queue.pop_front().map(|p| p.id), Some("a".to_string()));
        assert_eq!(queue.front().map(|p| p.id.as_str()), Some("b"));
        assert_eq!(queue.pop_front().map(|p| p.id), Some("b".to_string()));
        assert!(queue.pop_front().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_visible_stack_top_card_paints_highest() {
        let mut queue = CandidateQueue::new();
        queue.replace(vec![profile("a"), profile("b"), profile("c")]);

        let stack = queue.visible_stack();
        let z: Vec<usize> = stack.iter().map(|c| c.z_index).collect();
        assert_eq!(z, vec![3, 2, 1]);
        assert_eq!(stack[0].id, "a");
    }
}
