mod common;

mod comments;
mod likes;
mod tweets;
mod users;
