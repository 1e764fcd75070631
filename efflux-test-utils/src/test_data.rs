// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Small user/comment domain shared by tests, docs and examples.

use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct User {
    pub first_name: String,
    pub last_name: String,
}

impl User {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User[{} {}]", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Comment {
    pub body: String,
}

impl Comment {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Comment[{}]", self.body)
    }
}

/// A user joined with the comments they wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserComments {
    pub user: User,
    pub comments: Vec<Comment>,
}

impl UserComments {
    pub fn new(user: User, comments: Vec<Comment>) -> Self {
        Self { user, comments }
    }
}

impl Display for UserComments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserComments[{}, {} comments]", self.user, self.comments.len())
    }
}

pub fn alice() -> User {
    User::new("Alice", "Moreau")
}

pub fn bruno() -> User {
    User::new("Bruno", "Diaz")
}

pub fn carla() -> User {
    User::new("Carla", "Santos")
}

pub fn diego() -> User {
    User::new("Diego", "Fuentes")
}

pub fn everyone() -> Vec<User> {
    vec![alice(), bruno(), carla(), diego()]
}

pub fn greeting_comments() -> Vec<Comment> {
    vec![
        Comment::new("Hello there, how is it going?"),
        Comment::new("Lunch tomorrow?"),
        Comment::new("Finished the course at last."),
    ]
}
