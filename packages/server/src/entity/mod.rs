pub mod comment;
pub mod like;
pub mod playlist;
pub mod playlist_video;
pub mod session;
pub mod subscription;
pub mod tweet;
pub mod user;
pub mod video;
pub mod watch_history;
