use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendStatus {
    Online,
    Offline,
}

impl fmt::Display for FriendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FriendStatus::Online => f.write_str("online"),
            FriendStatus::Offline => f.write_str("offline"),
        }
    }
}

/// Someone the user shares notes with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id: &'static str,
    pub name: &'static str,
    pub common_notes: u32,
    pub status: FriendStatus,
}

pub static FRIENDS: [Friend; 4] = [
    Friend {
        id: "1",
        name: "Selin",
        common_notes: 4,
        status: FriendStatus::Online,
    },
    Friend {
        id: "2",
        name: "Yusuf",
        common_notes: 2,
        status: FriendStatus::Offline,
    },
    Friend {
        id: "3",
        name: "Derya",
        common_notes: 5,
        status: FriendStatus::Online,
    },
    Friend {
        id: "4",
        name: "Emir",
        common_notes: 1,
        status: FriendStatus::Offline,
    },
];

/// The friends list is only shown to logged-in users.
pub fn visible_friends(logged_in: bool) -> &'static [Friend] {
    if logged_in {
        &FRIENDS
    } else {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friends_hidden_when_logged_out() {
        assert!(visible_friends(false).is_empty());
        assert_eq!(visible_friends(true).len(), 4);
        assert_eq!(visible_friends(true)[0].name, "Selin");
    }
}
