//! Reusable transforms over wrapped users.

use repository_facade::{Formula, Result, Subject};

use crate::model::User;

/// Narrows a collection or page to active users. A single entity is left alone.
pub struct ActiveOnly;

impl Formula<User> for ActiveOnly {
    fn apply(&self, subject: &Subject<User>) -> Result<Option<Subject<User>>> {
        if !subject.is_list() {
            return Ok(None);
        }
        let active = subject
            .items()
            .iter()
            .filter(|user| user.active)
            .cloned()
            .collect();
        Ok(Some(Subject::Collection(active)))
    }
}

/// Narrows the subject to users with an address at `domain`.
pub struct EmailDomain {
    suffix: String,
}

impl EmailDomain {
    pub fn new(domain: &str) -> Self {
        Self {
            suffix: format!("@{}", domain.trim_start_matches('@')),
        }
    }
}

impl Formula<User> for EmailDomain {
    fn apply(&self, subject: &Subject<User>) -> Result<Option<Subject<User>>> {
        let matching = subject
            .items()
            .iter()
            .filter(|user| user.email.ends_with(&self.suffix))
            .cloned()
            .collect();
        Ok(Some(Subject::Collection(matching)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Subject<User> {
        let mut bob = User::new("Bob", "bob@corp.example");
        bob.active = false;
        Subject::Collection(vec![
            User::new("Alice", "alice@corp.example"),
            bob,
            User::new("Carol", "carol@home.example"),
        ])
    }

    #[test]
    fn active_only_drops_inactive_users() {
        let narrowed = ActiveOnly.apply(&users()).unwrap().unwrap();
        let names: Vec<_> = narrowed.items().iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["Alice", "Carol"]);
    }

    #[test]
    fn active_only_keeps_single_entities() {
        let single = Subject::Entity(User::new("Alice", "alice@corp.example"));
        assert!(ActiveOnly.apply(&single).unwrap().is_none());
    }

    #[test]
    fn email_domain_accepts_a_leading_at() {
        let narrowed = EmailDomain::new("@corp.example").apply(&users()).unwrap().unwrap();
        assert_eq!(narrowed.items().len(), 2);
    }
}
